// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// EXIF inspection for raster inputs. Orientation feeds the geometry
// corrector; the remaining primary-IFD fields are preserved as strings on
// the normalized document.

use docnorm_core::Metadata;
use exif::{In, Reader, Tag};
use tracing::debug;

/// Read the EXIF orientation tag, if the container carries one.
///
/// Returns the raw tag value (1 through 8); callers only act on the
/// rotation-only values 3, 6 and 8.
pub fn read_orientation(data: &[u8]) -> Option<u32> {
    let mut cursor = std::io::Cursor::new(data);
    let exif = Reader::new().read_from_container(&mut cursor).ok()?;
    let field = exif.get_field(Tag::Orientation, In::PRIMARY)?;
    let value = field.value.get_uint(0)?;
    debug!(orientation = value, "EXIF orientation read");
    Some(value)
}

/// Extract all primary-IFD EXIF fields as display strings.
///
/// Keys carry an `exif:` prefix so they never collide with pipeline-level
/// metadata when merged into a page map.
pub fn extract_exif_fields(data: &[u8]) -> Metadata {
    let mut fields = Metadata::new();
    let mut cursor = std::io::Cursor::new(data);
    let Ok(exif) = Reader::new().read_from_container(&mut cursor) else {
        return fields;
    };
    for field in exif.fields() {
        if field.ifd_num != In::PRIMARY {
            continue;
        }
        fields.insert(
            format!("exif:{}", field.tag),
            field.display_value().to_string(),
        );
    }
    debug!(count = fields.len(), "EXIF fields extracted");
    fields
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test fixtures — minimal in-memory PDFs and raster images used across the
// module tests. Compiled only for tests.

use image::{DynamicImage, Rgb, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

/// Build an in-memory PDF with `page_count` US-letter pages, each carrying
/// `text` in its content stream.
pub(crate) fn pdf_document(page_count: usize, text: &str) -> Document {
    let mut document = Document::with_version("1.5");
    let pages_id = document.new_object_id();

    let font_id = document.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = document.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(page_count);
    for _ in 0..page_count {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = document.add_object(Stream::new(
            dictionary! {},
            content.encode().unwrap(),
        ));
        let page_id = document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );

    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);

    document
}

/// Serialized form of [`pdf_document`].
pub(crate) fn pdf_with_text(page_count: usize, text: &str) -> Vec<u8> {
    let mut bytes = Vec::new();
    pdf_document(page_count, text)
        .save_to(&mut bytes)
        .unwrap();
    bytes
}

/// A PDF whose trailer carries an /Info dictionary.
pub(crate) fn pdf_with_info(title: &str, author: &str, producer: &str) -> Vec<u8> {
    let mut document = pdf_document(1, "metadata fixture");
    let info_id = document.add_object(dictionary! {
        "Title" => Object::string_literal(title),
        "Author" => Object::string_literal(author),
        "Producer" => Object::string_literal(producer),
    });
    document.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    document.save_to(&mut bytes).unwrap();
    bytes
}

/// A flat light-grey RGB image of the given dimensions.
pub(crate) fn grey_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 200, 200])))
}

/// PNG-encoded bytes of a flat grey image.
pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(grey_image(width, height), image::ImageFormat::Png)
}

/// BMP-encoded bytes, used to exercise the unsupported-format path.
pub(crate) fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(grey_image(width, height), image::ImageFormat::Bmp)
}

fn encode(image: DynamicImage, format: image::ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut bytes), format)
        .unwrap();
    bytes
}

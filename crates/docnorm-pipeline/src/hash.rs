// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Content hashing — streaming digests of the original input bytes, used as
// deduplication keys.

use std::io::Read;

use docnorm_core::HashAlgorithm;
use sha2::{Digest, Sha256, Sha512};

/// Chunk size for streaming reads. Bounds memory regardless of input size.
const READ_CHUNK_BYTES: usize = 8192;

/// Compute the digest of an in-memory buffer as a lowercase hex string.
///
/// Pure function of the bytes: the result is independent of every pipeline
/// configuration knob except the algorithm itself.
pub fn hash_bytes(algorithm: HashAlgorithm, data: &[u8]) -> String {
    match algorithm {
        HashAlgorithm::Sha256 => hex::encode(Sha256::digest(data)),
        HashAlgorithm::Sha512 => hex::encode(Sha512::digest(data)),
    }
}

/// Compute the digest of a byte stream, reading in bounded chunks.
///
/// The reader is consumed; callers that need the bytes again must supply a
/// fresh stream. I/O failures propagate as-is — there is no hashing-specific
/// error.
pub fn hash_reader<R: Read>(algorithm: HashAlgorithm, reader: &mut R) -> std::io::Result<String> {
    match algorithm {
        HashAlgorithm::Sha256 => hash_reader_with(Sha256::new(), reader),
        HashAlgorithm::Sha512 => hash_reader_with(Sha512::new(), reader),
    }
}

fn hash_reader_with<D: Digest, R: Read>(
    mut hasher: D,
    reader: &mut R,
) -> std::io::Result<String> {
    let mut chunk = [0u8; READ_CHUNK_BYTES];
    loop {
        let n = reader.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        hasher.update(&chunk[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// SHA-256 of the empty byte slice (well-known constant).
    const EMPTY_SHA256: &str =
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn sha256_empty_input() {
        assert_eq!(hash_bytes(HashAlgorithm::Sha256, b""), EMPTY_SHA256);
    }

    #[test]
    fn sha256_known_value() {
        // SHA-256("hello") — verified against coreutils sha256sum.
        let expected = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";
        assert_eq!(hash_bytes(HashAlgorithm::Sha256, b"hello"), expected);
    }

    #[test]
    fn reader_digest_matches_buffer_digest() {
        // Larger than one chunk so the streaming loop actually iterates.
        let data: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        let from_bytes = hash_bytes(HashAlgorithm::Sha256, &data);
        let from_reader =
            hash_reader(HashAlgorithm::Sha256, &mut Cursor::new(&data)).unwrap();
        assert_eq!(from_bytes, from_reader);
    }

    #[test]
    fn sha512_differs_from_sha256() {
        let data = b"docnorm";
        let h256 = hash_bytes(HashAlgorithm::Sha256, data);
        let h512 = hash_bytes(HashAlgorithm::Sha512, data);
        assert_ne!(h256, h512);
        assert_eq!(h256.len(), 64);
        assert_eq!(h512.len(), 128);
    }
}

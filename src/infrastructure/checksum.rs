//! Content checksums

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};

/// Hex-encoded md5, sha1 and sha256 of a blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksums {
    pub md5: String,
    pub sha1: String,
    pub sha256: String,
}

impl Checksums {
    pub fn compute(data: &[u8]) -> Self {
        Self {
            md5: hex::encode(Md5::digest(data)),
            sha1: hex::encode(Sha1::digest(data)),
            sha256: sha256_hex(data),
        }
    }
}

pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

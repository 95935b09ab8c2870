//! DCT-based perceptual hash (pHash).
//!
//! The image is shrunk, run through a discrete cosine transform and each
//! low-frequency coefficient is compared to the mean. This survives
//! re-encoding, resizing and small brightness changes, so re-saved copies
//! of a photo land within a few bits of each other.
//!
//! The DCT and hashing come from the image_hasher crate.

use super::traits::{ImageHasher, PerceptualHash};
use crate::error::HashError;
use image_hasher::{HashAlg, HasherConfig};
use std::path::Path;

/// Perceptual hasher producing `hash_size * hash_size` bit codes
pub struct DctHasher {
    hasher: image_hasher::Hasher,
}

impl DctHasher {
    /// Create a new pHash hasher. 8 gives the usual 64-bit code.
    pub fn new(hash_size: u32) -> Self {
        let hasher = HasherConfig::new()
            .hash_size(hash_size, hash_size)
            .hash_alg(HashAlg::Mean)
            .preproc_dct()
            .to_hasher();

        Self { hasher }
    }
}

impl Default for DctHasher {
    fn default() -> Self {
        Self::new(8)
    }
}

impl ImageHasher for DctHasher {
    fn hash_file(&self, path: &Path) -> Result<PerceptualHash, HashError> {
        let image = image::open(path).map_err(|e| HashError::DecodeError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let hash = self.hasher.hash_image(&image);
        Ok(PerceptualHash::new(hash.as_bytes().to_vec()))
    }

    fn name(&self) -> &'static str {
        "pHash"
    }
}

//! # Hasher Module
//!
//! Computes the two fingerprints used for duplicate detection.
//!
//! - **Content hash** - SHA-256 of the file bytes. Cheap and exact.
//! - **Perceptual hash** - 64-bit DCT hash of the decoded image. Finds
//!   visually similar photos whose bytes differ. Only available when the
//!   crate is built with the `perceptual` feature (on by default).
//!
//! ## Example
//! ```rust,ignore
//! use photo_sorter::core::hasher::{content_hash, perceptual_hasher};
//!
//! let sha256 = content_hash(&path)?;
//! if let Some(hasher) = perceptual_hasher() {
//!     let phash = hasher.hash_file(&path)?;
//! }
//! ```

mod content;
#[cfg(feature = "perceptual")]
mod perceptual;
mod traits;

pub use content::content_hash;
#[cfg(feature = "perceptual")]
pub use perceptual::DctHasher;
pub use traits::{ImageHasher, PerceptualHash};

/// The perceptual hasher available in this build, if any
pub fn perceptual_hasher() -> Option<Box<dyn ImageHasher>> {
    #[cfg(feature = "perceptual")]
    {
        Some(Box::new(DctHasher::default()))
    }
    #[cfg(not(feature = "perceptual"))]
    {
        None
    }
}

/// Both hashes of one file, as stored in the hash index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    /// SHA-256, lowercase hex
    pub content_hash: String,
    /// Perceptual hash, lowercase hex
    pub perceptual_hash: Option<String>,
}

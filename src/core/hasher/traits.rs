//! Perceptual hash value and hasher trait.

use crate::error::HashError;
use std::fmt;
use std::path::Path;

/// A fixed-width perceptual hash code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerceptualHash {
    bytes: Vec<u8>,
}

impl PerceptualHash {
    /// Create a hash from raw bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Parse a lowercase or uppercase hex string
    pub fn from_hex(value: &str) -> Result<Self, HashError> {
        let invalid = || HashError::InvalidHex {
            value: value.to_string(),
        };

        if value.is_empty() || value.len() % 2 != 0 || !value.is_ascii() {
            return Err(invalid());
        }

        let bytes = (0..value.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&value[i..i + 2], 16))
            .collect::<Result<Vec<u8>, _>>()
            .map_err(|_| invalid())?;

        Ok(Self { bytes })
    }

    /// Get the hash as a hexadecimal string
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Get the raw hash bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Hamming distance: the number of bits that differ.
    ///
    /// Codes of different widths are not comparable and yield `None`.
    pub fn distance(&self, other: &Self) -> Option<u32> {
        if self.bytes.len() != other.bytes.len() {
            return None;
        }

        Some(
            self.bytes
                .iter()
                .zip(other.bytes.iter())
                .map(|(a, b)| (a ^ b).count_ones())
                .sum(),
        )
    }
}

impl fmt::Display for PerceptualHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Something that can derive a perceptual hash from an image file
pub trait ImageHasher: Send + Sync {
    /// Decode the image at `path` and hash it
    fn hash_file(&self, path: &Path) -> Result<PerceptualHash, HashError>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

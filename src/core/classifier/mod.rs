//! # Duplicate Classifier Module
//!
//! Decides whether a photo duplicates one that has already been sorted.
//!
//! ## Algorithm
//! 1. SHA-256 the file. Unreadable file: not a duplicate.
//! 2. Same digest in the index: exact duplicate. Perceptual hashing is
//!    skipped, exact subsumes similar.
//! 3. If a perceptual hasher is available, hash the image and look for the
//!    closest stored code within the threshold: similar duplicate.
//!
//! Detection is best-effort. Nothing here returns an error; a failure to
//! hash just means "not a duplicate".

use crate::core::hasher::{content_hash, perceptual_hasher, Fingerprint, ImageHasher};
use crate::core::index::HashIndex;
use crate::error::HashError;
use crate::events::DuplicateKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default perceptual distance threshold (bits of a 64-bit code)
pub const DEFAULT_THRESHOLD: u32 = 5;

/// Outcome of checking one photo against the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Not a known duplicate
    None,
    /// Byte-identical to `original`
    Exact { original: PathBuf },
    /// Visually similar to `original`
    Similar { original: PathBuf, distance: u32 },
}

impl Classification {
    pub fn is_duplicate(&self) -> bool {
        !matches!(self, Classification::None)
    }

    /// The already-sorted photo this one duplicates
    pub fn original(&self) -> Option<&Path> {
        match self {
            Classification::None => None,
            Classification::Exact { original } | Classification::Similar { original, .. } => {
                Some(original)
            }
        }
    }

    pub fn kind(&self) -> Option<DuplicateKind> {
        match self {
            Classification::None => None,
            Classification::Exact { .. } => Some(DuplicateKind::Exact),
            Classification::Similar { distance, .. } => {
                Some(DuplicateKind::Similar { distance: *distance })
            }
        }
    }
}

/// Classification together with whatever hashes were computed on the way
#[derive(Debug, Clone)]
pub struct Inspection {
    pub classification: Classification,
    /// `None` when the file could not be read
    pub fingerprint: Option<Fingerprint>,
}

/// Checks photos against a [`HashIndex`]
pub struct DuplicateClassifier {
    threshold: u32,
    perceptual: Option<Box<dyn ImageHasher>>,
}

impl DuplicateClassifier {
    /// Classifier using the perceptual hasher of this build, if any
    pub fn new(threshold: u32) -> Self {
        Self::with_hasher(threshold, perceptual_hasher())
    }

    /// Classifier with an explicit perceptual hasher (or none)
    pub fn with_hasher(threshold: u32, perceptual: Option<Box<dyn ImageHasher>>) -> Self {
        Self {
            threshold,
            perceptual,
        }
    }

    /// Classifier that only detects byte-identical duplicates
    pub fn exact_only() -> Self {
        Self::with_hasher(DEFAULT_THRESHOLD, None)
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Whether similar (not just identical) photos can be detected
    pub fn perceptual_available(&self) -> bool {
        self.perceptual.is_some()
    }

    /// Classify `file` against `index`
    pub fn classify(&self, file: &Path, index: &HashIndex) -> Classification {
        self.inspect(file, index).classification
    }

    /// Classify `file` and keep the hashes for indexing it later
    pub fn inspect(&self, file: &Path, index: &HashIndex) -> Inspection {
        let sha256 = match content_hash(file) {
            Ok(sha256) => sha256,
            Err(e) => {
                warn!("Duplicate check skipped: {}", e);
                return Inspection {
                    classification: Classification::None,
                    fingerprint: None,
                };
            }
        };

        if let Some(original) = index.find_exact_excluding(&sha256, Some(file)) {
            debug!("{} is an exact duplicate of {}", file.display(), original.display());
            return Inspection {
                classification: Classification::Exact { original },
                fingerprint: Some(Fingerprint {
                    content_hash: sha256,
                    perceptual_hash: None,
                }),
            };
        }

        let phash = self.perceptual_hash(file);
        let classification = phash
            .as_ref()
            .and_then(|hash| index.find_similar_excluding(hash, self.threshold, Some(file)))
            .map(|(original, distance)| {
                debug!(
                    "{} is similar to {} (distance {})",
                    file.display(),
                    original.display(),
                    distance
                );
                Classification::Similar { original, distance }
            })
            .unwrap_or(Classification::None);

        Inspection {
            classification,
            fingerprint: Some(Fingerprint {
                content_hash: sha256,
                perceptual_hash: phash.map(|h| h.to_hex()),
            }),
        }
    }

    /// Compute both hashes of `file`. Only the content hash is required.
    pub fn fingerprint(&self, file: &Path) -> Result<Fingerprint, HashError> {
        Ok(Fingerprint {
            content_hash: content_hash(file)?,
            perceptual_hash: self.perceptual_hash(file).map(|h| h.to_hex()),
        })
    }

    fn perceptual_hash(&self, file: &Path) -> Option<crate::core::hasher::PerceptualHash> {
        let hasher = self.perceptual.as_ref()?;
        match hasher.hash_file(file) {
            Ok(hash) => Some(hash),
            Err(e) => {
                debug!("No {} for {}: {}", hasher.name(), file.display(), e);
                None
            }
        }
    }
}

impl Default for DuplicateClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hasher::PerceptualHash;
    use std::fs;
    use tempfile::TempDir;

    /// Hashes every file to the code written in its first line
    struct FixedHasher;

    impl ImageHasher for FixedHasher {
        fn hash_file(&self, path: &Path) -> Result<PerceptualHash, HashError> {
            let text = fs::read_to_string(path).map_err(|source| HashError::IoError {
                path: path.to_path_buf(),
                source,
            })?;
            PerceptualHash::from_hex(text.lines().next().unwrap_or_default())
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    fn setup() -> (TempDir, HashIndex) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join(".photosorter/cache/image_hashes.json");
        let index = HashIndex::empty(temp_dir.path(), &db_path);
        (temp_dir, index)
    }

    fn index_file(index: &mut HashIndex, classifier: &DuplicateClassifier, path: &Path) {
        let fp = classifier.fingerprint(path).unwrap();
        index
            .add(path, &fp.content_hash, fp.perceptual_hash.as_deref())
            .unwrap();
    }

    #[test]
    fn unknown_photo_is_not_a_duplicate() {
        let (temp_dir, index) = setup();
        let photo = temp_dir.path().join("a.jpg");
        fs::write(&photo, "0000000000000000\nA").unwrap();

        let classifier = DuplicateClassifier::with_hasher(5, Some(Box::new(FixedHasher)));
        assert_eq!(classifier.classify(&photo, &index), Classification::None);
    }

    #[test]
    fn identical_bytes_are_exact_duplicates() {
        let (temp_dir, mut index) = setup();
        let sorted = temp_dir.path().join("Vacation/a.jpg");
        fs::create_dir_all(sorted.parent().unwrap()).unwrap();
        fs::write(&sorted, "0000000000000000\nsame").unwrap();
        let candidate = temp_dir.path().join("b.jpg");
        fs::write(&candidate, "0000000000000000\nsame").unwrap();

        let classifier = DuplicateClassifier::with_hasher(5, Some(Box::new(FixedHasher)));
        index_file(&mut index, &classifier, &sorted);

        let inspection = classifier.inspect(&candidate, &index);
        assert_eq!(
            inspection.classification,
            Classification::Exact { original: sorted }
        );
        // exact match short-circuits perceptual hashing
        assert_eq!(inspection.fingerprint.unwrap().perceptual_hash, None);
    }

    #[test]
    fn close_codes_are_similar_duplicates() {
        let (temp_dir, mut index) = setup();
        let sorted = temp_dir.path().join("a.jpg");
        fs::write(&sorted, "0000000000000000\noriginal").unwrap();
        let candidate = temp_dir.path().join("b.jpg");
        fs::write(&candidate, "0000000000000003\nre-encoded").unwrap();

        let classifier = DuplicateClassifier::with_hasher(5, Some(Box::new(FixedHasher)));
        index_file(&mut index, &classifier, &sorted);

        assert_eq!(
            classifier.classify(&candidate, &index),
            Classification::Similar {
                original: sorted,
                distance: 2
            }
        );
    }

    #[test]
    fn distant_codes_are_not_duplicates() {
        let (temp_dir, mut index) = setup();
        let sorted = temp_dir.path().join("a.jpg");
        fs::write(&sorted, "0000000000000000\noriginal").unwrap();
        let candidate = temp_dir.path().join("b.jpg");
        fs::write(&candidate, "00000000000000ff\nother").unwrap();

        let classifier = DuplicateClassifier::with_hasher(5, Some(Box::new(FixedHasher)));
        index_file(&mut index, &classifier, &sorted);

        assert_eq!(classifier.classify(&candidate, &index), Classification::None);
    }

    #[test]
    fn without_perceptual_hasher_only_exact_is_detected() {
        let (temp_dir, mut index) = setup();
        let sorted = temp_dir.path().join("a.jpg");
        fs::write(&sorted, "0000000000000000\noriginal").unwrap();
        let similar = temp_dir.path().join("b.jpg");
        fs::write(&similar, "0000000000000001\nre-encoded").unwrap();

        let classifier = DuplicateClassifier::exact_only();
        assert!(!classifier.perceptual_available());
        index_file(&mut index, &classifier, &sorted);

        assert_eq!(classifier.classify(&similar, &index), Classification::None);
    }

    #[test]
    fn unreadable_file_is_not_a_duplicate() {
        let (temp_dir, index) = setup();
        let missing = temp_dir.path().join("gone.jpg");

        let inspection = DuplicateClassifier::exact_only().inspect(&missing, &index);
        assert_eq!(inspection.classification, Classification::None);
        assert!(inspection.fingerprint.is_none());
    }

    #[test]
    fn a_photo_never_duplicates_its_own_record() {
        let (temp_dir, mut index) = setup();
        let sorted = temp_dir.path().join("Trip/a.jpg");
        fs::create_dir_all(sorted.parent().unwrap()).unwrap();
        fs::write(&sorted, "0000000000000000\nA").unwrap();

        let classifier = DuplicateClassifier::with_hasher(5, Some(Box::new(FixedHasher)));
        index_file(&mut index, &classifier, &sorted);

        assert_eq!(classifier.classify(&sorted, &index), Classification::None);
    }

    #[test]
    fn classification_accessors() {
        let exact = Classification::Exact {
            original: PathBuf::from("/photos/a.jpg"),
        };
        assert!(exact.is_duplicate());
        assert_eq!(exact.original(), Some(Path::new("/photos/a.jpg")));
        assert_eq!(exact.kind(), Some(DuplicateKind::Exact));
        assert_eq!(Classification::None.kind(), None);
    }
}

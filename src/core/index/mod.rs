//! # Hash Index Module
//!
//! Remembers the hashes of every photo that has been sorted, so later
//! photos can be checked against them.
//!
//! ## Storage
//! One JSON object, `relative path -> { sha256, phash }`, read wholesale on
//! open and rewritten wholesale on every change. Records are kept in a
//! `BTreeMap`, so "storage order" is path order both in memory and on disk.
//!
//! ## Lookups
//! Both lookups are linear scans. That is fine for the thousands of photos
//! in a typical year folder; a bucketed or vantage-point structure would be
//! the next step for much larger libraries.

use crate::core::hasher::PerceptualHash;
use crate::error::IndexError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Hashes stored for one sorted photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashEntry {
    /// SHA-256 of the file bytes
    pub sha256: String,
    /// Perceptual hash, when one could be computed
    #[serde(default)]
    pub phash: Option<String>,
}

/// Content-addressed and perceptual lookup store
#[derive(Debug)]
pub struct HashIndex {
    root: PathBuf,
    db_path: PathBuf,
    records: BTreeMap<String, HashEntry>,
}

impl HashIndex {
    /// Open the index stored at `db_path`, keyed relative to `root`.
    ///
    /// A missing file gives an empty index. An unreadable or corrupt file
    /// also gives an empty index, together with the error so the caller can
    /// warn about it. Opening never fails.
    pub fn open(root: &Path, db_path: &Path) -> (Self, Option<IndexError>) {
        let mut index = Self::empty(root, db_path);

        if !db_path.exists() {
            return (index, None);
        }

        let contents = match fs::read_to_string(db_path) {
            Ok(contents) => contents,
            Err(source) => {
                let error = IndexError::Read {
                    path: db_path.to_path_buf(),
                    source,
                };
                warn!("{}", error);
                return (index, Some(error));
            }
        };

        match serde_json::from_str::<BTreeMap<String, HashEntry>>(&contents) {
            Ok(records) => {
                debug!("Loaded {} hash records from {}", records.len(), db_path.display());
                index.records = records;
                (index, None)
            }
            Err(e) => {
                let error = IndexError::Corrupted {
                    path: db_path.to_path_buf(),
                    reason: e.to_string(),
                };
                warn!("{}", error);
                (index, Some(error))
            }
        }
    }

    /// An index with no records that will persist to `db_path`
    pub fn empty(root: &Path, db_path: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            db_path: db_path.to_path_buf(),
            records: BTreeMap::new(),
        }
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the index has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in storage order, with paths as stored
    pub fn records(&self) -> impl Iterator<Item = (&str, &HashEntry)> {
        self.records.iter().map(|(path, entry)| (path.as_str(), entry))
    }

    /// Insert or overwrite the record for `path`, then persist.
    ///
    /// The in-memory index is updated even when persisting fails, so
    /// lookups for the rest of the session still see the record.
    pub fn add(
        &mut self,
        path: &Path,
        content_hash: &str,
        perceptual_hash: Option<&str>,
    ) -> Result<(), IndexError> {
        let key = self.key_for(path);
        let entry = HashEntry {
            sha256: content_hash.to_string(),
            phash: perceptual_hash.map(str::to_string),
        };

        if self.records.get(&key) == Some(&entry) {
            return Ok(());
        }

        self.records.insert(key, entry);
        self.save()
    }

    /// Drop the record for `path`, then persist. Returns whether one existed.
    pub fn remove(&mut self, path: &Path) -> Result<bool, IndexError> {
        let key = self.key_for(path);
        if self.records.remove(&key).is_none() {
            return Ok(false);
        }
        self.save().map(|_| true)
    }

    /// First stored path whose content hash equals `content_hash`
    pub fn find_exact(&self, content_hash: &str) -> Option<PathBuf> {
        self.find_exact_excluding(content_hash, None)
    }

    /// Like [`find_exact`](Self::find_exact), ignoring the record for `exclude`
    pub fn find_exact_excluding(
        &self,
        content_hash: &str,
        exclude: Option<&Path>,
    ) -> Option<PathBuf> {
        let excluded = exclude.map(|p| self.key_for(p));

        self.records
            .iter()
            .filter(|(key, _)| Some(*key) != excluded.as_ref())
            .find(|(_, entry)| entry.sha256 == content_hash)
            .map(|(key, _)| self.resolve(key))
    }

    /// Closest stored perceptual hash within `threshold` bits
    pub fn find_similar(&self, query: &PerceptualHash, threshold: u32) -> Option<(PathBuf, u32)> {
        self.find_similar_excluding(query, threshold, None)
    }

    /// Like [`find_similar`](Self::find_similar), ignoring the record for `exclude`.
    ///
    /// Ties go to the record that comes first in storage order. Records
    /// without a perceptual hash, or with one that cannot be parsed or has a
    /// different width, are ignored.
    pub fn find_similar_excluding(
        &self,
        query: &PerceptualHash,
        threshold: u32,
        exclude: Option<&Path>,
    ) -> Option<(PathBuf, u32)> {
        let excluded = exclude.map(|p| self.key_for(p));
        let mut best: Option<(&str, u32)> = None;

        for (key, entry) in &self.records {
            if Some(key) == excluded.as_ref() {
                continue;
            }

            let Some(stored) = entry
                .phash
                .as_deref()
                .and_then(|hex| PerceptualHash::from_hex(hex).ok())
            else {
                continue;
            };

            let Some(distance) = query.distance(&stored) else {
                continue;
            };

            if best.map_or(true, |(_, best_distance)| distance < best_distance) {
                best = Some((key.as_str(), distance));
            }
        }

        best.filter(|(_, distance)| *distance <= threshold)
            .map(|(key, distance)| (self.resolve(key), distance))
    }

    fn save(&self) -> Result<(), IndexError> {
        if let Some(parent) = self.db_path.parent() {
            fs::create_dir_all(parent).map_err(|source| IndexError::Write {
                path: self.db_path.clone(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(&self.records)
            .map_err(|e| IndexError::SerializationFailed(e.to_string()))?;

        fs::write(&self.db_path, json).map_err(|source| IndexError::Write {
            path: self.db_path.clone(),
            source,
        })
    }

    /// Portable key: `/`-separated and relative to root when under it
    fn key_for(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(relative) => relative
                .components()
                .filter_map(|c| match c {
                    Component::Normal(part) => Some(part.to_string_lossy()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("/"),
            Err(_) => path.to_string_lossy().into_owned(),
        }
    }

    fn resolve(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SHA_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const SHA_B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    fn new_index(temp_dir: &TempDir) -> HashIndex {
        let db_path = temp_dir.path().join(".photosorter/cache/image_hashes.json");
        HashIndex::open(temp_dir.path(), &db_path).0
    }

    fn phash(hex: &str) -> PerceptualHash {
        PerceptualHash::from_hex(hex).unwrap()
    }

    #[test]
    fn add_stores_relative_path_and_persists() {
        let temp_dir = TempDir::new().unwrap();
        let mut index = new_index(&temp_dir);

        index
            .add(&temp_dir.path().join("Trip/a.jpg"), SHA_A, Some("ff00ff00ff00ff00"))
            .unwrap();

        let keys: Vec<_> = index.records().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["Trip/a.jpg"]);

        let on_disk = fs::read_to_string(temp_dir.path().join(".photosorter/cache/image_hashes.json")).unwrap();
        assert!(on_disk.contains("\"Trip/a.jpg\""));
        assert!(on_disk.contains("\"sha256\""));
        assert!(on_disk.contains("\"phash\""));
    }

    #[test]
    fn index_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        {
            let mut index = new_index(&temp_dir);
            index.add(&temp_dir.path().join("a.jpg"), SHA_A, None).unwrap();
        }

        let index = new_index(&temp_dir);
        assert_eq!(index.len(), 1);
        assert_eq!(index.find_exact(SHA_A), Some(temp_dir.path().join("a.jpg")));
    }

    #[test]
    fn find_exact_matches_only_equal_digests() {
        let temp_dir = TempDir::new().unwrap();
        let mut index = new_index(&temp_dir);
        index.add(&temp_dir.path().join("a.jpg"), SHA_A, None).unwrap();

        assert!(index.find_exact(SHA_A).is_some());
        assert!(index.find_exact(SHA_B).is_none());
    }

    #[test]
    fn find_exact_tie_goes_to_first_in_storage_order() {
        let temp_dir = TempDir::new().unwrap();
        let mut index = new_index(&temp_dir);
        index.add(&temp_dir.path().join("z.jpg"), SHA_A, None).unwrap();
        index.add(&temp_dir.path().join("m.jpg"), SHA_A, None).unwrap();

        assert_eq!(index.find_exact(SHA_A), Some(temp_dir.path().join("m.jpg")));
    }

    #[test]
    fn find_exact_excluding_ignores_own_record() {
        let temp_dir = TempDir::new().unwrap();
        let mut index = new_index(&temp_dir);
        let own = temp_dir.path().join("Trip/a.jpg");
        index.add(&own, SHA_A, None).unwrap();

        assert!(index.find_exact_excluding(SHA_A, Some(&own)).is_none());
    }

    #[test]
    fn find_similar_without_perceptual_hashes_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let mut index = new_index(&temp_dir);
        index.add(&temp_dir.path().join("a.jpg"), SHA_A, None).unwrap();

        assert!(index.find_similar(&phash("0000000000000000"), 64).is_none());
    }

    #[test]
    fn find_similar_picks_closest_within_threshold() {
        let temp_dir = TempDir::new().unwrap();
        let mut index = new_index(&temp_dir);
        // 3 bits away
        index
            .add(&temp_dir.path().join("far.jpg"), SHA_A, Some("0000000000000007"))
            .unwrap();
        // 1 bit away
        index
            .add(&temp_dir.path().join("near.jpg"), SHA_B, Some("0000000000000001"))
            .unwrap();

        let (path, distance) = index.find_similar(&phash("0000000000000000"), 5).unwrap();
        assert_eq!(path, temp_dir.path().join("near.jpg"));
        assert_eq!(distance, 1);
    }

    #[test]
    fn find_similar_never_exceeds_threshold() {
        let temp_dir = TempDir::new().unwrap();
        let mut index = new_index(&temp_dir);
        index
            .add(&temp_dir.path().join("a.jpg"), SHA_A, Some("000000000000003f"))
            .unwrap();

        assert!(index.find_similar(&phash("0000000000000000"), 5).is_none());
        assert_eq!(
            index.find_similar(&phash("0000000000000000"), 6).map(|(_, d)| d),
            Some(6)
        );
    }

    #[test]
    fn find_similar_tie_goes_to_first_in_storage_order() {
        let temp_dir = TempDir::new().unwrap();
        let mut index = new_index(&temp_dir);
        index
            .add(&temp_dir.path().join("b.jpg"), SHA_B, Some("0000000000000002"))
            .unwrap();
        index
            .add(&temp_dir.path().join("a.jpg"), SHA_A, Some("0000000000000001"))
            .unwrap();

        let (path, _) = index.find_similar(&phash("0000000000000000"), 5).unwrap();
        assert_eq!(path, temp_dir.path().join("a.jpg"));
    }

    #[test]
    fn malformed_stored_phash_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let mut index = new_index(&temp_dir);
        index
            .add(&temp_dir.path().join("a.jpg"), SHA_A, Some("not-hex"))
            .unwrap();

        assert!(index.find_similar(&phash("0000000000000000"), 64).is_none());
    }

    #[test]
    fn adding_same_record_twice_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let mut index = new_index(&temp_dir);
        let path = temp_dir.path().join("a.jpg");

        index.add(&path, SHA_A, Some("0000000000000001")).unwrap();
        index.add(&path, SHA_A, Some("0000000000000001")).unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.find_exact(SHA_A), Some(path.clone()));
        assert_eq!(
            index.find_similar(&phash("0000000000000000"), 5),
            Some((path, 1))
        );
    }

    #[test]
    fn remove_drops_record() {
        let temp_dir = TempDir::new().unwrap();
        let mut index = new_index(&temp_dir);
        let path = temp_dir.path().join("Trip/a.jpg");
        index.add(&path, SHA_A, None).unwrap();

        assert!(index.remove(&path).unwrap());
        assert!(!index.remove(&path).unwrap());
        assert!(index.find_exact(SHA_A).is_none());
    }

    #[test]
    fn corrupt_file_degrades_to_empty_index() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("image_hashes.json");
        fs::write(&db_path, "{ not json").unwrap();

        let (index, warning) = HashIndex::open(temp_dir.path(), &db_path);

        assert!(index.is_empty());
        assert!(matches!(warning, Some(IndexError::Corrupted { .. })));
    }

    #[test]
    fn paths_outside_root_are_stored_as_given() {
        let temp_dir = TempDir::new().unwrap();
        let mut index = new_index(&temp_dir);

        index.add(Path::new("/elsewhere/a.jpg"), SHA_A, None).unwrap();

        assert_eq!(index.find_exact(SHA_A), Some(PathBuf::from("/elsewhere/a.jpg")));
    }
}

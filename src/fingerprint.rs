use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;

/// SHA-256 digest of a string, used as a fixed-size dedup key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Parse a hex-encoded digest
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        let digest: [u8; 32] = bytes.try_into().ok()?;
        Some(Self(digest))
    }

    /// Hex-encoded digest
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Fingerprint::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid fingerprint: {}", s)))
    }
}

/// Computes the fingerprint of `text`. Pure and deterministic; no normalization
/// is applied, so `"a"` and `"a "` differ.
pub fn fingerprint(text: &str) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    Fingerprint(hasher.finalize().into())
}

/// Set of strings bucketed by fingerprint.
///
/// A string is present only if its bucket exists and holds an equal string,
/// so a digest collision never turns a new string into a false duplicate.
#[derive(Debug, Default, Clone)]
pub struct FingerprintIndex {
    buckets: HashMap<Fingerprint, Vec<String>>,
    len: usize,
}

impl FingerprintIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.contains_with(&fingerprint(text), text)
    }

    /// Membership test when the caller already holds the fingerprint
    pub fn contains_with(&self, fp: &Fingerprint, text: &str) -> bool {
        self.buckets
            .get(fp)
            .is_some_and(|bucket| bucket.iter().any(|s| s == text))
    }

    /// Inserts `text`, returning false if it was already present
    pub fn insert(&mut self, text: &str) -> bool {
        self.insert_with(fingerprint(text), text)
    }

    pub fn insert_with(&mut self, fp: Fingerprint, text: &str) -> bool {
        let bucket = self.buckets.entry(fp).or_default();
        if bucket.iter().any(|s| s == text) {
            return false;
        }
        bucket.push(text.to_string());
        self.len += 1;
        true
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<S: AsRef<str>> FromIterator<S> for FingerprintIndex {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut index = FingerprintIndex::new();
        for s in iter {
            index.insert(s.as_ref());
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(fingerprint("News Title"), fingerprint("News Title"));
        // Known SHA-256 of "abc"
        assert_eq!(
            fingerprint("abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_trailing_space_changes_digest() {
        assert_ne!(fingerprint("News Title"), fingerprint("News Title "));
    }

    #[test]
    fn test_hex_round_trip_and_rejects_garbage() {
        let fp = fingerprint("T1");
        assert_eq!(Fingerprint::from_hex(&fp.to_hex()), Some(fp));
        assert_eq!(Fingerprint::from_hex("not hex"), None);
        assert_eq!(Fingerprint::from_hex("abcd"), None);
    }

    #[test]
    fn test_index_guards_against_shared_bucket() {
        let mut index = FingerprintIndex::new();
        let fp = fingerprint("first");

        // Force two different strings into the same bucket
        assert!(index.insert_with(fp, "first"));
        assert!(index.insert_with(fp, "second"));
        assert!(!index.insert_with(fp, "first"));

        assert!(index.contains_with(&fp, "second"));
        assert!(!index.contains_with(&fp, "third"));
        assert!(!index.contains("second"), "second lives under another bucket");
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_index_from_iter() {
        let index: FingerprintIndex = ["a", "b", "a"].into_iter().collect();
        assert_eq!(index.len(), 2);
        assert!(index.contains("a"));
        assert!(!index.contains("c"));
    }
}

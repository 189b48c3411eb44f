use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::Dictionary;

/// An in-memory dictionary.
///
/// Records keep insertion order, so the first record added under a key is
/// the first candidate returned for it.
#[derive(Debug, Clone, Default)]
pub struct MemoryDictionary {
    records: Vec<(String, String)>,
    exact: HashMap<String, Vec<usize>>,
    folded: HashMap<String, Vec<usize>>,
    resources: HashMap<String, Vec<u8>>,
    source: Option<PathBuf>,
}

impl MemoryDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record. Repeated keys keep every record.
    pub fn add_entry(&mut self, key: impl Into<String>, text: impl Into<String>) {
        let key = key.into();
        let index = self.records.len();
        self.exact.entry(key.clone()).or_default().push(index);
        self.folded.entry(key.to_lowercase()).or_default().push(index);
        self.records.push((key, text.into()));
    }

    /// Add a companion resource under an already-normalized key.
    pub fn add_resource(&mut self, key: impl Into<String>, data: Vec<u8>) {
        self.resources.insert(key.into(), data);
    }

    pub fn with_entry(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.add_entry(key, text);
        self
    }

    pub fn with_resource(mut self, key: impl Into<String>, data: Vec<u8>) -> Self {
        self.add_resource(key, data);
        self
    }

    pub fn with_source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Dictionary for MemoryDictionary {
    fn entries(&self, key: &str, ignore_case: bool) -> Vec<String> {
        let hits = if ignore_case {
            self.folded.get(&key.to_lowercase())
        } else {
            self.exact.get(key)
        };
        hits.map(|indices| {
            indices
                .iter()
                .map(|&i| self.records[i].1.clone())
                .collect()
        })
        .unwrap_or_default()
    }

    fn resource(&self, key: &str) -> Option<Vec<u8>> {
        self.resources.get(key).cloned()
    }

    fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_and_folded_entries() {
        let dict = MemoryDictionary::new()
            .with_entry("Apple", "<b>1</b>")
            .with_entry("apple", "<b>2</b>");

        assert_eq!(dict.entries("Apple", false), ["<b>1</b>"]);
        assert_eq!(dict.entries("APPLE", false), Vec::<String>::new());
        assert_eq!(dict.entries("APPLE", true), ["<b>1</b>", "<b>2</b>"]);
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn test_resources() {
        let dict = MemoryDictionary::new().with_resource("\\a.png", vec![1, 2, 3]);
        assert_eq!(dict.resource("\\a.png"), Some(vec![1, 2, 3]));
        assert_eq!(dict.resource("\\b.png"), None);
        assert!(dict.source_path().is_none());
    }
}

//! Dictionaries loaded from MDict plain-text sources.
//!
//! The source format is the one MDict builders consume: an entry key on its
//! own line, the definition on the following lines, and a line holding only
//! `</>` closing the record. Companion resources live in a directory whose
//! layout mirrors the resource keys (`\img\a.png` is `<dir>/img/a.png`).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::Result;
use crate::util::decode_text;

use super::{Dictionary, MemoryDictionary};

const RECORD_END: &str = "</>";

/// A dictionary read from an MDict text source plus a resource directory.
#[derive(Debug, Clone)]
pub struct SourceDictionary {
    path: PathBuf,
    records: MemoryDictionary,
    resource_dir: Option<PathBuf>,
}

impl SourceDictionary {
    /// Open a source file. Resources are looked up in a directory named after
    /// the file stem, next to it, when one exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let dir = path.with_extension("");
        let resource_dir = (dir != path && dir.is_dir()).then_some(dir);
        Self::open_with_resources(path, resource_dir)
    }

    /// Open a source file with an explicit resource directory.
    pub fn open_with_resources(
        path: impl AsRef<Path>,
        resource_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening dictionary source: {}", path.display());

        let bytes = fs::read(path)?;
        let records = parse_source(&decode_text(&bytes));
        info!(
            "Dictionary opened: {} records, resources {}",
            records.len(),
            resource_dir
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| "none".to_string())
        );

        Ok(Self {
            path: path.to_path_buf(),
            records,
            resource_dir,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn read_resource(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        let Some(dir) = &self.resource_dir else {
            return Ok(None);
        };

        let mut path = dir.clone();
        for part in key.split(['\\', '/']).filter(|p| !p.is_empty()) {
            if part == ".." || part == "." {
                return Ok(None);
            }
            path.push(part);
        }

        match fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl Dictionary for SourceDictionary {
    fn entries(&self, key: &str, ignore_case: bool) -> Vec<String> {
        self.records.entries(key, ignore_case)
    }

    fn resource(&self, key: &str) -> Option<Vec<u8>> {
        match self.read_resource(key) {
            Ok(data) => data,
            Err(e) => {
                debug!("Resource {key:?} unreadable: {e}");
                None
            }
        }
    }

    fn source_path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// Split MDict source text into records.
fn parse_source(text: &str) -> MemoryDictionary {
    let mut dict = MemoryDictionary::new();
    let mut key: Option<String> = None;
    let mut body: Vec<&str> = Vec::new();

    for line in text.lines() {
        if key.is_none() {
            let line = line.trim();
            if !line.is_empty() {
                key = Some(line.to_string());
            }
            continue;
        }

        if line.trim() == RECORD_END {
            if let Some(k) = key.take() {
                dict.add_entry(k, body.join("\n"));
            }
            body.clear();
        } else {
            body.push(line);
        }
    }

    // Tolerate a final record without its terminator
    if let Some(k) = key
        && !body.is_empty()
    {
        dict.add_entry(k, body.join("\n"));
    }

    dict
}

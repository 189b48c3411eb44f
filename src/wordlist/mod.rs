//! Word lists: ordered lessons of words to look up.
//!
//! Three source encodings are understood:
//!
//! - **Text / Markdown** (`.txt`, `.md`): `#name` header lines start a lesson,
//!   every other non-blank line is a word. Words before the first header land
//!   in a lesson named after the current timestamp.
//! - **Structured list** (`.json`): an array of `{"name": ..., "words": [...]}`.
//! - **Spreadsheet** (`.xlsx`, `.xls`, `.ods`, ...): one lesson per worksheet,
//!   words taken from the first column.
//!
//! [`parse_word_list`] reports failures as errors; [`read_word_list`] is the
//! forgiving front door that logs them and yields an empty list instead.

mod sheet;
mod structured;
mod text;

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::decode_text;

pub use text::{parse_text, write_text};

/// A named, ordered group of words.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub name: String,
    #[serde(default)]
    pub words: Vec<String>,
}

impl Lesson {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            words: Vec::new(),
        }
    }

    pub fn with_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.words.extend(words.into_iter().map(Into::into));
        self
    }
}

/// Ordered sequence of lessons. Lesson names are not required to be unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordList {
    pub lessons: Vec<Lesson>,
}

impl WordList {
    pub fn new(lessons: Vec<Lesson>) -> Self {
        Self { lessons }
    }

    /// True when there are no lessons at all.
    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    /// Total number of words across all lessons.
    pub fn word_count(&self) -> usize {
        self.lessons.iter().map(|l| l.words.len()).sum()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Lesson> {
        self.lessons.iter()
    }
}

impl<'a> IntoIterator for &'a WordList {
    type Item = &'a Lesson;
    type IntoIter = std::slice::Iter<'a, Lesson>;

    fn into_iter(self) -> Self::IntoIter {
        self.lessons.iter()
    }
}

/// Source encodings a word list can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Text,
    Structured,
    Spreadsheet,
}

impl SourceFormat {
    /// Detect the source format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" | "text" | "md" | "markdown" => Some(SourceFormat::Text),
            "json" => Some(SourceFormat::Structured),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(SourceFormat::Spreadsheet),
            _ => None,
        }
    }
}

/// Parse a word list, reporting why it could not be read.
///
/// `Ok` with an empty list means the file legitimately holds no lessons.
pub fn parse_word_list(path: impl AsRef<Path>) -> Result<WordList> {
    let path = path.as_ref();
    let format = SourceFormat::from_path(path)
        .ok_or_else(|| Error::UnsupportedFormat(format!("word list {}", path.display())))?;

    match format {
        SourceFormat::Text => {
            let bytes = fs::read(path)?;
            Ok(parse_text(&decode_text(&bytes)))
        }
        SourceFormat::Structured => {
            let bytes = fs::read(path)?;
            structured::parse_structured(&decode_text(&bytes))
        }
        SourceFormat::Spreadsheet => sheet::parse_workbook(path),
    }
}

/// Read a word list, never failing.
///
/// Any error (missing file, malformed JSON, unsupported extension) is logged
/// and an empty list returned.
pub fn read_word_list(path: impl AsRef<Path>) -> WordList {
    let path = path.as_ref();
    match parse_word_list(path) {
        Ok(list) => {
            info!(
                "Read {} lessons ({} words) from {}",
                list.lessons.len(),
                list.word_count(),
                path.display()
            );
            list
        }
        Err(e) => {
            warn!("Could not read word list {}: {e}", path.display());
            WordList::default()
        }
    }
}

/// Words that could not be found, grouped by lesson name in first-seen order.
///
/// Lessons sharing a name share one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidWordLog {
    lessons: IndexMap<String, Vec<String>>,
}

impl InvalidWordLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a missing word under `lesson`.
    pub fn record(&mut self, lesson: &str, word: &str) {
        self.lessons
            .entry(lesson.to_string())
            .or_default()
            .push(word.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    /// Number of missing words across all lessons.
    pub fn word_count(&self) -> usize {
        self.lessons.values().map(Vec::len).sum()
    }

    pub fn get(&self, lesson: &str) -> Option<&[String]> {
        self.lessons.get(lesson).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.lessons
            .iter()
            .map(|(name, words)| (name.as_str(), words.as_slice()))
    }

    /// Render in the text word-list grammar, so the file can be fed back in.
    pub fn to_text(&self) -> String {
        write_text(self.iter())
    }

    /// Convert into a word list with one lesson per logged lesson name.
    pub fn to_word_list(&self) -> WordList {
        WordList::new(
            self.iter()
                .map(|(name, words)| Lesson::new(name).with_words(words.iter().cloned()))
                .collect(),
        )
    }

    /// Write the log to `path`, creating parent directories as needed.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_text())?;
        Ok(())
    }
}

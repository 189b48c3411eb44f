//! Structured word lists: a JSON array of `{name, words}` records.

use crate::error::Result;

use super::{Lesson, WordList};

/// Parse a structured list. Records are taken as-is, in order.
pub fn parse_structured(text: &str) -> Result<WordList> {
    let lessons: Vec<Lesson> = serde_json::from_str(text)?;
    Ok(WordList::new(lessons))
}

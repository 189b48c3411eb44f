//! The `#lesson` / word-per-line grammar, both directions.

use log::warn;

use crate::util::timestamp_name;

use super::{Lesson, WordList};

/// Parse the text grammar.
///
/// Blank lines are skipped. Word lines seen before any header are collected
/// into a lesson named by the current timestamp.
pub fn parse_text(text: &str) -> WordList {
    let mut lessons: Vec<Lesson> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('#') {
            let name = line.trim_start_matches('#').trim();
            lessons.push(Lesson::new(name));
            continue;
        }

        match lessons.last_mut() {
            Some(lesson) => lesson.words.push(line.to_string()),
            None => {
                let mut lesson = Lesson::new(timestamp_name());
                lesson.words.push(line.to_string());
                lessons.push(lesson);
            }
        }
    }

    WordList::new(lessons)
}

/// Write lessons in the text grammar, a blank line between lessons.
///
/// The grammar has no escape for a word starting with `#`, which would read
/// back as a lesson header. Such words are left out with a warning.
pub fn write_text<'a, I, W>(lessons: I) -> String
where
    I: IntoIterator<Item = (&'a str, W)>,
    W: AsRef<[String]>,
{
    let mut out = String::new();
    for (name, words) in lessons {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push('#');
        out.push_str(name);
        out.push('\n');
        for word in words.as_ref() {
            if word.trim_start().starts_with('#') {
                warn!("Word {word:?} in lesson {name:?} looks like a header, not written");
                continue;
            }
            out.push_str(word);
            out.push('\n');
        }
    }
    out
}

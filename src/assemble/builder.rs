//! Append-only builders for the two panes of the document.
//!
//! Navigation and content are separate trees with their own roots. Nothing is
//! shared between them; they only meet in [`super::document::Document`].

use markup5ever_rcdom::Handle;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use super::dom::{append, create_element, create_text_element};

/// Characters escaped in URL fragments.
const FRAGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'%');

/// Class carried by navigation links to words that were not found.
pub const INVALID_CLASS: &str = "invalid";

pub fn lesson_anchor(name: &str) -> String {
    format!("lesson_{name}")
}

pub fn word_anchor(word: &str) -> String {
    format!("word_{word}")
}

fn fragment_href(id: &str) -> String {
    format!("#{}", utf8_percent_encode(id, FRAGMENT))
}

/// The navigation pane: a flat run of links separated by line breaks.
pub struct Navigation {
    root: Handle,
    links: usize,
}

impl Navigation {
    pub fn new() -> Self {
        Self {
            root: create_element("div", &[("class", "toc")]),
            links: 0,
        }
    }

    /// Link to a lesson heading.
    pub fn lesson(&mut self, name: &str) {
        self.link(&lesson_anchor(name), name, "lesson");
    }

    /// Link to a word entry, flagged when the word was not found.
    pub fn word(&mut self, word: &str, invalid: bool) {
        let class = if invalid { INVALID_CLASS } else { "word" };
        self.link(&word_anchor(word), word, class);
    }

    fn link(&mut self, id: &str, label: &str, class: &str) {
        let href = fragment_href(id);
        append(
            &self.root,
            create_text_element("a", &[("href", &href), ("class", class)], label),
        );
        append(&self.root, create_element("br", &[]));
        self.links += 1;
    }

    /// Number of links emitted.
    pub fn len(&self) -> usize {
        self.links
    }

    pub fn is_empty(&self) -> bool {
        self.links == 0
    }

    pub fn root(&self) -> &Handle {
        &self.root
    }
}

impl Default for Navigation {
    fn default() -> Self {
        Self::new()
    }
}

/// The content pane: lesson headings followed by entry blocks.
pub struct Content {
    root: Handle,
}

impl Content {
    pub fn new() -> Self {
        Self {
            root: create_element("div", &[("class", "content")]),
        }
    }

    /// Heading that opens a lesson.
    pub fn lesson(&mut self, name: &str) {
        let id = lesson_anchor(name);
        append(
            &self.root,
            create_text_element("h1", &[("id", &id), ("class", "lesson")], name),
        );
    }

    /// Block wrapping the body nodes of a found entry.
    pub fn entry(&mut self, word: &str, body: Vec<Handle>) {
        let id = word_anchor(word);
        let block = create_element("div", &[("id", &id), ("class", "entry")]);
        block.children.borrow_mut().extend(body);
        append(&self.root, block);
    }

    /// Visible placeholder for a word that was not found.
    pub fn warning(&mut self, word: &str) {
        let id = word_anchor(word);
        let block = create_element("div", &[("id", &id), ("class", "entry invalid")]);
        append(
            &block,
            create_text_element("p", &[("class", "warning")], &format!("\"{word}\" not found")),
        );
        append(&self.root, block);
    }

    pub fn root(&self) -> &Handle {
        &self.root
    }
}

impl Default for Content {
    fn default() -> Self {
        Self::new()
    }
}

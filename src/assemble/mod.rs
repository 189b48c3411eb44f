//! Document assembly: lessons and lookups in, a two-pane HTML page out.
//!
//! For each lesson the assembler emits a heading into the content pane and a
//! link into the navigation pane, then resolves every word:
//!
//! - found words get an entry block anchored `word_<word>` and a plain link;
//! - missing words are logged per lesson and get a link marked `invalid`,
//!   plus, under [`InvalidWordPolicy::Warn`], a visible warning block.
//!
//! The document head is taken from the first entry of the first lesson that
//! brings one. Its linked stylesheet is inlined (see [`style`]) and every
//! image in the content is embedded as a `data:` URI (see [`images`]).

mod builder;
mod document;
mod dom;
mod images;
mod style;

pub use builder::{Content, INVALID_CLASS, Navigation, lesson_anchor, word_anchor};
pub use document::Document;
pub use images::ImageEmbedder;
pub use style::merge_stylesheets;

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};
use markup5ever_rcdom::{Handle, RcDom};

use crate::dict::{Dictionary, Lookup};
use crate::error::{Error, Result};
use crate::wordlist::{InvalidWordLog, WordList};

use dom::{
    append, create_element, create_text_element, deep_clone, element_children, find_first_element,
    get_attribute, is_element, parse_html,
};

/// Layout for the navigation pane and the not-found markers.
pub const DEFAULT_LAYOUT_CSS: &str = "\
.toc { position: fixed; top: 0; left: 0; bottom: 0; width: 16em; overflow-y: auto; \
padding: 0.5em; border-right: 1px solid #ccc; }
.toc + .content { margin-left: 17.5em; }
.toc a { text-decoration: none; }
.toc a.lesson { font-weight: bold; }
a.invalid, .entry.invalid .warning { color: #c00; }
h1.lesson { border-bottom: 1px solid #ccc; }
";

/// What to do with a word the dictionary does not know.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidWordPolicy {
    /// Skip the entry and log the word.
    #[default]
    Collect,
    /// Log the word and show a warning block in its place.
    Warn,
    /// Stop the whole run at the first missing word.
    Abort,
}

/// Configuration for document assembly.
#[derive(Debug, Clone)]
pub struct AssembleConfig {
    /// Include the navigation pane. Paged formats turn this off.
    pub toc: bool,
    pub policy: InvalidWordPolicy,
    /// CSS appended to the dictionary stylesheet.
    pub extra_css: String,
    /// CSS for the page layout, placed before any dictionary CSS.
    pub layout_css: String,
    pub title: String,
    /// Redirect hops followed per word.
    pub max_redirects: usize,
    /// Checked between lessons; when set the run stops with [`Error::Cancelled`].
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for AssembleConfig {
    fn default() -> Self {
        Self {
            toc: true,
            policy: InvalidWordPolicy::default(),
            extra_css: String::new(),
            layout_css: DEFAULT_LAYOUT_CSS.to_string(),
            title: "Word list".to_string(),
            max_redirects: 1,
            cancel: None,
        }
    }
}

impl AssembleConfig {
    pub fn with_toc(mut self, toc: bool) -> Self {
        self.toc = toc;
        self
    }

    pub fn with_policy(mut self, policy: InvalidWordPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_extra_css(mut self, css: impl Into<String>) -> Self {
        self.extra_css = css.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_max_redirects(mut self, hops: usize) -> Self {
        self.max_redirects = hops;
        self
    }

    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }
}

/// Found / not-found counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupStats {
    pub found: usize,
    pub not_found: usize,
}

impl LookupStats {
    pub fn total(&self) -> usize {
        self.found + self.not_found
    }

    /// Fraction of words found, `0.0` for an empty run.
    pub fn success_rate(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.found as f64 / total as f64,
        }
    }
}

/// A serialized document with the bookkeeping of the run that built it.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub html: Vec<u8>,
    pub stats: LookupStats,
    pub invalid_words: InvalidWordLog,
}

/// Builds documents from word lists against one dictionary.
pub struct Assembler<'d> {
    dict: &'d dyn Dictionary,
    config: AssembleConfig,
}

impl<'d> Assembler<'d> {
    pub fn new(dict: &'d dyn Dictionary) -> Self {
        Self {
            dict,
            config: AssembleConfig::default(),
        }
    }

    /// Configure the assembler with custom settings.
    pub fn with_config(mut self, config: AssembleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AssembleConfig {
        &self.config
    }

    /// Build and serialize the document for `list`.
    pub fn assemble(&self, list: &WordList) -> Result<Assembly> {
        let (document, stats, invalid_words) = self.build(list)?;
        let html = document.to_bytes(self.config.toc)?;
        info!(
            "Assembled {} lessons: {} found, {} not found",
            list.lessons.len(),
            stats.found,
            stats.not_found
        );
        Ok(Assembly {
            html,
            stats,
            invalid_words,
        })
    }

    /// Assemble and write the document to `path`, creating directories.
    pub fn write(&self, list: &WordList, path: &Path) -> Result<Assembly> {
        let assembly = self.assemble(list)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &assembly.html)?;
        Ok(assembly)
    }

    fn build(&self, list: &WordList) -> Result<(Document, LookupStats, InvalidWordLog)> {
        let lookup = Lookup::new(self.dict).with_max_redirects(self.config.max_redirects);
        let mut navigation = Navigation::new();
        let mut content = Content::new();
        let mut stats = LookupStats::default();
        let mut invalid_words = InvalidWordLog::new();
        let mut record_head: Option<Vec<Handle>> = None;

        for (index, lesson) in list.iter().enumerate() {
            self.check_cancelled()?;
            content.lesson(&lesson.name);
            navigation.lesson(&lesson.name);

            // Set by a miss, consumed by the next navigation link
            let mut mark_invalid = false;

            for word in &lesson.words {
                let html = lookup.lookup(word);
                if html.is_empty() {
                    stats.not_found += 1;
                    match self.config.policy {
                        InvalidWordPolicy::Abort => {
                            return Err(Error::WordNotFound {
                                lesson: lesson.name.clone(),
                                word: word.clone(),
                            });
                        }
                        InvalidWordPolicy::Warn => content.warning(word),
                        InvalidWordPolicy::Collect => {}
                    }
                    invalid_words.record(&lesson.name, word);
                    mark_invalid = true;
                } else {
                    stats.found += 1;
                    let record = parse_html(&html);
                    if index == 0 && record_head.is_none() {
                        record_head = head_of(&record);
                    }
                    content.entry(word, body_of(&record));
                }
                navigation.word(word, std::mem::take(&mut mark_invalid));
            }
        }

        let head = self.build_head(record_head.unwrap_or_default());
        let embedded = ImageEmbedder::new(self.dict).embed(content.root());
        debug!("Embedded {embedded} images");

        Ok((
            Document {
                head,
                navigation,
                content,
            },
            stats,
            invalid_words,
        ))
    }

    fn build_head(&self, record_head: Vec<Handle>) -> Handle {
        let head = create_element("head", &[]);
        append(&head, create_element("meta", &[("charset", "utf-8")]));
        append(&head, create_text_element("title", &[], &self.config.title));
        if !self.config.layout_css.is_empty() {
            append(
                &head,
                create_text_element("style", &[], &self.config.layout_css),
            );
        }

        for child in record_head {
            if !is_charset_or_title(&child) {
                append(&head, child);
            }
        }

        merge_stylesheets(&head, self.dict, &self.config.extra_css);
        head
    }

    fn check_cancelled(&self) -> Result<()> {
        match &self.config.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(Error::Cancelled),
            _ => Ok(()),
        }
    }
}

/// Copies of the record's head elements, when it carries any.
///
/// The record tree is dropped after each word, so everything kept from it is
/// copied out.
fn head_of(record: &RcDom) -> Option<Vec<Handle>> {
    let head = find_first_element(&record.document, "head")?;
    let children: Vec<Handle> = element_children(&head).iter().map(deep_clone).collect();
    (!children.is_empty()).then_some(children)
}

fn body_of(record: &RcDom) -> Vec<Handle> {
    find_first_element(&record.document, "body")
        .map(|body| body.children.borrow().iter().map(deep_clone).collect())
        .unwrap_or_default()
}

fn is_charset_or_title(handle: &Handle) -> bool {
    if is_element(handle, "title") {
        return true;
    }
    is_element(handle, "meta")
        && (get_attribute(handle, "charset").is_some()
            || get_attribute(handle, "http-equiv")
                .is_some_and(|v| v.eq_ignore_ascii_case("content-type")))
}

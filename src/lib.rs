//! # wordbook
//!
//! Build navigable word books from dictionary lookups.
//!
//! A word list (text, JSON or spreadsheet) is resolved word by word against a
//! dictionary, assembled into a two-pane HTML document with a navigation pane
//! and a content pane, and exported as HTML, PDF or a raster image.
//!
//! ## Quick Start
//!
//! ```
//! use wordbook::{Assembler, MemoryDictionary, parse_text};
//!
//! let list = parse_text("#Fruit\napple\nbanana");
//! let dict = MemoryDictionary::new().with_entry("apple", "<div>fruit</div>");
//!
//! let assembly = Assembler::new(&dict).assemble(&list).unwrap();
//! assert_eq!(assembly.stats.found, 1);
//! assert_eq!(assembly.invalid_words.get("Fruit").unwrap(), ["banana"]);
//! ```
//!
//! ## Pipeline
//!
//! - [`wordlist`] parses lesson files and writes the missing-word log.
//! - [`dict`] holds the [`Dictionary`] trait, stores, and the [`Lookup`]
//!   engine with its case, hyphen and redirect fallbacks.
//! - [`assemble`] builds the document: anchors, stylesheet merge, image
//!   embedding.
//! - [`export`] picks the output strategy from the extension and drives the
//!   external renderer for paged and raster formats.

pub mod assemble;
pub mod dict;
pub mod error;
pub mod export;
pub mod util;
pub mod wordlist;

pub use assemble::{AssembleConfig, Assembler, Assembly, InvalidWordPolicy, LookupStats};
pub use dict::{Dictionary, Lookup, LookupResult, MemoryDictionary, SourceDictionary};
pub use error::{Error, Result};
pub use export::{ExportConfig, ExportOptions, ExportReport, Exporter, ImageFormat, OutputFormat};
pub use wordlist::{
    InvalidWordLog, Lesson, WordList, parse_text, parse_word_list, read_word_list,
};

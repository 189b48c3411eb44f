//! Read-only dictionary stores and the word lookup engine.
//!
//! The binary dictionary index is not implemented here; a store is anything
//! implementing [`Dictionary`]: a key to HTML-fragment map with an optional
//! companion key to binary-resource map.

mod lookup;
mod memory;
mod source;

pub use lookup::{Lookup, LookupResult, REDIRECT_MARKER};
pub use memory::MemoryDictionary;
pub use source::SourceDictionary;

use std::path::Path;

/// A read-only keyed dictionary.
///
/// Handles are opened once per run and queried many times. They are not
/// required to be thread-safe; do not share one between concurrent runs.
pub trait Dictionary {
    /// All records stored under `key`, in index order.
    ///
    /// With `ignore_case`, keys are compared case-insensitively.
    fn entries(&self, key: &str, ignore_case: bool) -> Vec<String>;

    /// Raw bytes of a companion resource (image, stylesheet, ...).
    ///
    /// Keys use the backslash convention, e.g. `\images\cat.png`.
    fn resource(&self, key: &str) -> Option<Vec<u8>>;

    /// Location the dictionary was loaded from, if any.
    ///
    /// Stylesheets sitting next to this file take precedence over resources.
    fn source_path(&self) -> Option<&Path> {
        None
    }
}

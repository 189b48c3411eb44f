//! Word resolution with case and hyphen fallbacks and redirect following.

use log::{debug, warn};

use super::Dictionary;

/// Prefix of a record whose definition lives under another key.
pub const REDIRECT_MARKER: &str = "@@@LINK=";

/// Result of resolving one word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResult {
    pub word: String,
    pub html: String,
    pub found: bool,
}

/// Resolves words against a [`Dictionary`].
///
/// Each key is tried, in order, as an exact key, case-insensitively, and
/// case-insensitively with every hyphen removed. The first record of the first
/// step that yields a non-empty record wins. A redirect record is followed by
/// running the same chain on its target, up to `max_redirects` hops
/// (default one).
pub struct Lookup<'d> {
    dict: &'d dyn Dictionary,
    max_redirects: usize,
}

impl<'d> Lookup<'d> {
    pub fn new(dict: &'d dyn Dictionary) -> Self {
        Self {
            dict,
            max_redirects: 1,
        }
    }

    /// Allow `hops` redirects per lookup.
    pub fn with_max_redirects(mut self, hops: usize) -> Self {
        self.max_redirects = hops;
        self
    }

    /// Resolve `word` to its HTML, or an empty string if it is not found.
    pub fn lookup(&self, word: &str) -> String {
        let Some(mut text) = self.find(word) else {
            return String::new();
        };

        let mut hops = 0;
        while let Some(target) = redirect_target(&text) {
            if hops == self.max_redirects {
                warn!("{word:?}: redirect chain longer than {hops} hop(s) at {target:?}");
                return String::new();
            }
            hops += 1;

            let target = target.to_string();
            match self.find(&target) {
                Some(next) => text = next,
                None => {
                    debug!("{word:?}: redirect target {target:?} not found");
                    return String::new();
                }
            }
        }

        text
    }

    /// Resolve `word` into a [`LookupResult`].
    pub fn resolve(&self, word: &str) -> LookupResult {
        let html = self.lookup(word);
        LookupResult {
            word: word.to_string(),
            found: !html.is_empty(),
            html,
        }
    }

    /// Run the fallback chain for one key, without following redirects.
    pub fn find(&self, key: &str) -> Option<String> {
        first_record(self.dict.entries(key, false))
            .or_else(|| first_record(self.dict.entries(key, true)))
            .or_else(|| {
                let stripped = key.replace('-', "");
                first_record(self.dict.entries(&stripped, true))
            })
    }
}

/// The first candidate, cleaned; `None` if there is none or it is blank.
fn first_record(records: Vec<String>) -> Option<String> {
    let first = records.into_iter().next()?;
    let text = first.trim_end_matches('\0').trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn redirect_target(text: &str) -> Option<&str> {
    text.strip_prefix(REDIRECT_MARKER).map(str::trim)
}

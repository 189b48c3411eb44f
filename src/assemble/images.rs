//! Image embedding: `<img src>` references become `data:` URIs.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::debug;
use markup5ever_rcdom::Handle;

use crate::dict::Dictionary;
use crate::util::{mime_for_path, normalize_resource_key};

use super::dom::{find_elements_by_name, get_attribute, set_attribute};

/// Embeds dictionary resources into one document.
///
/// Lookups are memoized by normalized resource key, so every distinct image
/// costs exactly one resource query per document, found or not.
pub struct ImageEmbedder<'d> {
    dict: &'d dyn Dictionary,
    cache: HashMap<String, Option<String>>,
}

impl<'d> ImageEmbedder<'d> {
    pub fn new(dict: &'d dyn Dictionary) -> Self {
        Self {
            dict,
            cache: HashMap::new(),
        }
    }

    /// Rewrite every embeddable `<img>` under `root`. Returns how many were
    /// rewritten; unresolved references are left untouched.
    pub fn embed(&mut self, root: &Handle) -> usize {
        let mut rewritten = 0;
        for img in find_elements_by_name(root, "img") {
            let Some(src) = get_attribute(&img, "src") else {
                continue;
            };
            if let Some(uri) = self.data_uri(&src) {
                set_attribute(&img, "src", &uri);
                rewritten += 1;
            }
        }
        rewritten
    }

    /// The `data:` URI for an image reference, if the resource exists.
    pub fn data_uri(&mut self, src: &str) -> Option<String> {
        if !is_embeddable(src) {
            return None;
        }

        let path = percent_encoding::percent_decode_str(src.trim()).decode_utf8_lossy();
        let key = normalize_resource_key(&path);
        if let Some(cached) = self.cache.get(&key) {
            return cached.clone();
        }

        let uri = self.dict.resource(&key).map(|data| {
            format!("data:{};base64,{}", mime_for_path(&path), STANDARD.encode(data))
        });
        if uri.is_none() {
            debug!("Image resource {key} not found");
        }
        self.cache.insert(key, uri.clone());
        uri
    }

    /// Number of distinct resource keys queried so far.
    pub fn queried(&self) -> usize {
        self.cache.len()
    }
}

/// Inline data and remote URLs are left alone.
fn is_embeddable(src: &str) -> bool {
    let src = src.trim();
    if src.is_empty() {
        return false;
    }
    let lower = src.get(..8).unwrap_or(src).to_ascii_lowercase();
    !(lower.starts_with("data:") || lower.starts_with("http://") || lower.starts_with("https://"))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::path::Path;

    use super::*;
    use crate::assemble::dom::{find_first_element, node_to_string, parse_html};
    use crate::dict::MemoryDictionary;

    /// Counts resource queries made against the wrapped dictionary.
    struct CountingDictionary {
        inner: MemoryDictionary,
        queries: Cell<usize>,
    }

    impl Dictionary for CountingDictionary {
        fn entries(&self, key: &str, ignore_case: bool) -> Vec<String> {
            self.inner.entries(key, ignore_case)
        }

        fn resource(&self, key: &str) -> Option<Vec<u8>> {
            self.queries.set(self.queries.get() + 1);
            self.inner.resource(key)
        }

        fn source_path(&self) -> Option<&Path> {
            None
        }
    }

    #[test]
    fn test_embed_rewrites_to_data_uri() {
        let dict = MemoryDictionary::new().with_resource("\\img\\a.png", b"abc".to_vec());
        let dom = parse_html(r#"<p><img src="img/a.png"><img src="img/missing.gif"></p>"#);
        let body = find_first_element(&dom.document, "body").unwrap();

        let rewritten = ImageEmbedder::new(&dict).embed(&body);
        assert_eq!(rewritten, 1);
        assert_eq!(
            node_to_string(&body),
            r#"<body><p><img src="data:image/png;base64,YWJj"><img src="img/missing.gif"></p></body>"#
        );
    }

    #[test]
    fn test_repeated_references_query_once() {
        let dict = CountingDictionary {
            inner: MemoryDictionary::new().with_resource("\\a.jpg", vec![0xFF, 0xD8]),
            queries: Cell::new(0),
        };
        let dom = parse_html(
            r#"<img src="a.jpg"><img src="/a.jpg"><img src="\a.jpg"><img src="b.jpg"><img src="b.jpg">"#,
        );

        let mut embedder = ImageEmbedder::new(&dict);
        assert_eq!(embedder.embed(&dom.document), 3);
        assert_eq!(dict.queries.get(), 2);
        assert_eq!(embedder.queried(), 2);
    }

    #[test]
    fn test_unknown_extension_defaults_to_jpeg() {
        let dict = MemoryDictionary::new().with_resource("\\pic.raw", vec![1]);
        let uri = ImageEmbedder::new(&dict).data_uri("pic.raw").unwrap();
        assert!(uri.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_percent_encoded_src() {
        let dict = MemoryDictionary::new().with_resource("\\my pic.svg", b"<svg/>".to_vec());
        let uri = ImageEmbedder::new(&dict).data_uri("my%20pic.svg").unwrap();
        assert!(uri.starts_with("data:image/svg+xml;base64,"));
    }

    #[test]
    fn test_skips_inline_and_remote() {
        assert!(!is_embeddable("data:image/png;base64,AA"));
        assert!(!is_embeddable("HTTPS://example.com/a.png"));
        assert!(!is_embeddable("  "));
        assert!(is_embeddable("img/a.png"));
    }
}

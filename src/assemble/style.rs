//! Stylesheet merging: linked dictionary CSS becomes inline `<style>`.

use std::fs;
use std::io;
use std::path::Path;

use log::{debug, warn};
use markup5ever_rcdom::Handle;

use crate::dict::Dictionary;
use crate::error::Result;
use crate::util::{decode_text, normalize_resource_key};

use super::dom::{create_text_element, get_attribute, is_element};

/// Inline the stylesheets linked from `head`, appending `extra_css`.
///
/// Each stylesheet is looked for next to the dictionary source first, then in
/// the dictionary's resources. A stylesheet found in neither place keeps its
/// `<link>`; the extra CSS then gets a `<style>` block of its own. If anything
/// fails the head is left exactly as it was.
pub fn merge_stylesheets(head: &Handle, dict: &dyn Dictionary, extra_css: &str) {
    match merged_children(head, dict, extra_css) {
        Ok(children) => *head.children.borrow_mut() = children,
        Err(e) => warn!("Stylesheet merge skipped: {e}"),
    }
}

/// Compute the new head children without touching the tree.
fn merged_children(head: &Handle, dict: &dyn Dictionary, extra_css: &str) -> Result<Vec<Handle>> {
    let original: Vec<Handle> = head.children.borrow().clone();
    let mut children = Vec::with_capacity(original.len() + 1);
    let mut extra = (!extra_css.trim().is_empty()).then_some(extra_css);

    for child in original {
        let Some(href) = stylesheet_href(&child) else {
            children.push(child);
            continue;
        };

        match load_stylesheet(&href, dict)? {
            Some(css) => {
                let mut text = css;
                if let Some(extra_css) = extra.take() {
                    text.push('\n');
                    text.push_str(extra_css);
                }
                debug!("Inlined stylesheet {href} ({} bytes)", text.len());
                children.push(create_text_element("style", &[], &text));
            }
            None => {
                debug!("Stylesheet {href} not found, keeping link");
                children.push(child);
            }
        }
    }

    if let Some(extra_css) = extra {
        children.push(create_text_element("style", &[], extra_css));
    }

    Ok(children)
}

/// The `href` of a `<link rel="stylesheet">` element.
fn stylesheet_href(handle: &Handle) -> Option<String> {
    if !is_element(handle, "link") {
        return None;
    }
    let rel = get_attribute(handle, "rel")?;
    if !rel
        .split_ascii_whitespace()
        .any(|r| r.eq_ignore_ascii_case("stylesheet"))
    {
        return None;
    }
    get_attribute(handle, "href").filter(|h| !h.trim().is_empty())
}

/// Load stylesheet text: sibling file of the dictionary source, then resource.
fn load_stylesheet(href: &str, dict: &dyn Dictionary) -> Result<Option<String>> {
    let path = href.split(['?', '#']).next().unwrap_or(href);

    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    if let Some(dir) = dict.source_path().and_then(Path::parent)
        && !file_name.is_empty()
    {
        match fs::read(dir.join(file_name)) {
            Ok(bytes) => return Ok(Some(decode_text(&bytes))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(dict
        .resource(&normalize_resource_key(path))
        .map(|bytes| decode_text(&bytes)))
}

//! The assembled document and its serialization.

use std::io::Write;

use markup5ever_rcdom::Handle;

use crate::error::Result;

use super::builder::{Content, Navigation};
use super::dom::{serialize_children, serialize_node};

/// Head, navigation pane and content pane, kept apart until serialization.
pub struct Document {
    pub head: Handle,
    pub navigation: Navigation,
    pub content: Content,
}

impl Document {
    /// Serialize to bytes.
    ///
    /// With `toc`, the body holds the navigation pane followed by the content
    /// container. Without it, navigation is dropped and the content nodes are
    /// written straight into the body, without their container.
    pub fn to_bytes(&self, toc: bool) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        out.write_all(b"<!DOCTYPE html>\n<html>")?;
        serialize_node(&mut out, &self.head)?;
        out.write_all(b"<body>")?;
        if toc {
            serialize_node(&mut out, self.navigation.root())?;
            serialize_node(&mut out, self.content.root())?;
        } else {
            serialize_children(&mut out, self.content.root())?;
        }
        out.write_all(b"</body></html>\n")?;
        Ok(out)
    }
}

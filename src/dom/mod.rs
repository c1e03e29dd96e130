//! Document model the loader composes into.
//!
//! [`Document`] is the seam between the loader and whatever holds the page.
//! [`HtmlDocument`] is an in-memory element tree that parses fragments and
//! renders back to HTML.

mod document;
mod parse;
pub mod selector;

use std::fmt;

use thiserror::Error;

pub use document::HtmlDocument;
pub use selector::Selector;

/// Handle to a node inside a document.
///
/// A handle outlives its node: once the node is removed its slot may be
/// reused, and the generation tells the two apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.index)
    }
}

/// Errors raised by document operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("Target element not found: {0}")]
    TargetNotFound(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("{0} is not attached to the document")]
    StaleNode(NodeId),

    #[error("{0} is not an element")]
    NotAnElement(NodeId),
}

pub type Result<T> = std::result::Result<T, DomError>;

/// Mutable view of a page.
pub trait Document {
    /// Every attached element matching `selector`, in document order.
    fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>>;

    /// First attached element matching `selector`.
    fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    fn is_attached(&self, node: NodeId) -> bool;

    fn get_attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()>;

    /// Replace the children of `node` with parsed `html`.
    fn set_inner_html(&mut self, node: NodeId, html: &str) -> Result<()>;

    /// Replace `node` itself with parsed `html`, returning the inserted
    /// top-level nodes.
    fn replace_with_html(&mut self, node: NodeId, html: &str) -> Result<Vec<NodeId>>;

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.get_attribute(node, "class")
            .map(|list| list.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    fn add_class(&mut self, node: NodeId, class: &str) -> Result<()> {
        if self.has_class(node, class) {
            return Ok(());
        }
        let list = match self.get_attribute(node, "class") {
            Some(existing) if !existing.trim().is_empty() => {
                format!("{} {}", existing.trim(), class)
            }
            _ => class.to_string(),
        };
        self.set_attribute(node, "class", &list)
    }

    fn remove_class(&mut self, node: NodeId, class: &str) -> Result<()> {
        let Some(existing) = self.get_attribute(node, "class") else {
            return Ok(());
        };
        let list: Vec<&str> = existing.split_whitespace().filter(|c| *c != class).collect();
        self.set_attribute(node, "class", &list.join(" "))
    }
}

/// Where to insert a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    Selector(&'a str),
    Node(NodeId),
}

impl<'a> From<&'a str> for Target<'a> {
    fn from(selector: &'a str) -> Self {
        Target::Selector(selector)
    }
}

impl From<NodeId> for Target<'_> {
    fn from(node: NodeId) -> Self {
        Target::Node(node)
    }
}

impl fmt::Display for Target<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Selector(selector) => write!(f, "{}", selector),
            Target::Node(node) => write!(f, "{}", node),
        }
    }
}

impl Target<'_> {
    /// Resolve to an attached node.
    pub fn resolve<D: Document + ?Sized>(&self, doc: &D) -> Result<NodeId> {
        match *self {
            Target::Selector(selector) => doc
                .query_selector(selector)?
                .ok_or_else(|| DomError::TargetNotFound(selector.to_string())),
            Target::Node(node) if doc.is_attached(node) => Ok(node),
            Target::Node(node) => Err(DomError::TargetNotFound(node.to_string())),
        }
    }
}

/// Escape text for inclusion in HTML content or attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

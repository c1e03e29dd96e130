//! In-memory HTML document.

use super::parse::{is_void_element, parse_fragment, Attribute, ParsedNode};
use super::selector::Selector;
use super::{Document, DomError, NodeId, Result};

#[derive(Debug, Clone)]
enum NodeKind {
    Root,
    Element {
        tag: String,
        attributes: Vec<Attribute>,
    },
    Text(String),
    Raw(String),
    /// Slot on the free list
    Free,
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<usize>,
    children: Vec<usize>,
    generation: u32,
}

/// An HTML element tree stored in an arena.
///
/// Removed subtrees return their slots to a free list that later parses
/// draw from. Handles to removed nodes report [`DomError::StaleNode`].
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    nodes: Vec<NodeData>,
    free: Vec<usize>,
}

const ROOT: usize = 0;

impl Default for HtmlDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
                generation: 0,
            }],
            free: Vec::new(),
        }
    }

    /// Parse markup into a new document.
    pub fn parse(html: &str) -> Self {
        let mut doc = Self::new();
        let children = doc.build_all(ROOT, parse_fragment(html));
        doc.nodes[ROOT].children = children;
        doc
    }

    pub fn root(&self) -> NodeId {
        self.id(ROOT)
    }

    /// Number of live nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Serialize the whole document.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write_children(ROOT, &mut out);
        out
    }

    pub fn inner_html(&self, node: NodeId) -> Result<String> {
        let index = self.attached_index(node)?;
        let mut out = String::new();
        self.write_children(index, &mut out);
        Ok(out)
    }

    pub fn outer_html(&self, node: NodeId) -> Result<String> {
        let index = self.attached_index(node)?;
        let mut out = String::new();
        self.write_node(index, &mut out);
        Ok(out)
    }

    /// Lowercase tag name of an element node.
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[self.index_of(node)?].kind {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// Concatenated text below `node`.
    pub fn text_content(&self, node: NodeId) -> Result<String> {
        let index = self.attached_index(node)?;
        let mut out = String::new();
        self.collect_text(index, &mut out);
        Ok(out)
    }

    fn id(&self, index: usize) -> NodeId {
        NodeId {
            index,
            generation: self.nodes[index].generation,
        }
    }

    /// Slot of a live node, whether attached or not.
    fn index_of(&self, node: NodeId) -> Option<usize> {
        self.nodes
            .get(node.index)
            .filter(|n| n.generation == node.generation && !matches!(n.kind, NodeKind::Free))
            .map(|_| node.index)
    }

    fn attached_index(&self, node: NodeId) -> Result<usize> {
        if self.is_attached(node) {
            Ok(node.index)
        } else {
            Err(DomError::StaleNode(node))
        }
    }

    fn collect_text(&self, index: usize, out: &mut String) {
        match &self.nodes[index].kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Raw(_) | NodeKind::Free => {}
            NodeKind::Root | NodeKind::Element { .. } => {
                for &child in &self.nodes[index].children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    fn element_attributes_mut(&mut self, node: NodeId) -> Result<&mut Vec<Attribute>> {
        let index = self.attached_index(node)?;
        match &mut self.nodes[index].kind {
            NodeKind::Element { attributes, .. } => Ok(attributes),
            _ => Err(DomError::NotAnElement(node)),
        }
    }

    fn alloc(&mut self, kind: NodeKind, parent: usize) -> usize {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.nodes[index];
                slot.kind = kind;
                slot.parent = Some(parent);
                slot.children.clear();
                index
            }
            None => {
                self.nodes.push(NodeData {
                    kind,
                    parent: Some(parent),
                    children: Vec::new(),
                    generation: 0,
                });
                self.nodes.len() - 1
            }
        }
    }

    /// Return a subtree's slots to the free list.
    fn release(&mut self, index: usize) {
        let mut pending = vec![index];
        while let Some(current) = pending.pop() {
            let slot = &mut self.nodes[current];
            pending.append(&mut slot.children);
            slot.kind = NodeKind::Free;
            slot.parent = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(current);
        }
    }

    fn build_all(&mut self, parent: usize, parsed: Vec<ParsedNode>) -> Vec<usize> {
        parsed
            .into_iter()
            .map(|node| self.build(parent, node))
            .collect()
    }

    fn build(&mut self, parent: usize, parsed: ParsedNode) -> usize {
        let (kind, children) = match parsed {
            ParsedNode::Element {
                tag,
                attributes,
                children,
            } => (NodeKind::Element { tag, attributes }, children),
            ParsedNode::Text(text) => (NodeKind::Text(text), Vec::new()),
            ParsedNode::Raw(raw) => (NodeKind::Raw(raw), Vec::new()),
        };

        let index = self.alloc(kind, parent);
        let child_indices = self.build_all(index, children);
        self.nodes[index].children = child_indices;
        index
    }

    fn write_children(&self, index: usize, out: &mut String) {
        for &child in &self.nodes[index].children {
            self.write_node(child, out);
        }
    }

    fn write_node(&self, index: usize, out: &mut String) {
        match &self.nodes[index].kind {
            NodeKind::Root => self.write_children(index, out),
            NodeKind::Text(text) | NodeKind::Raw(text) => out.push_str(text),
            NodeKind::Free => {}
            NodeKind::Element { tag, attributes } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push(' ');
                    out.push_str(name);
                    if let Some(value) = value {
                        let quote = if value.contains('"') { '\'' } else { '"' };
                        out.push('=');
                        out.push(quote);
                        out.push_str(value);
                        out.push(quote);
                    }
                }
                out.push('>');
                if is_void_element(tag) {
                    return;
                }
                self.write_children(index, out);
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    fn visit_elements(&self, index: usize, visit: &mut impl FnMut(usize, &str, &[Attribute])) {
        for &child in &self.nodes[index].children {
            if let NodeKind::Element { tag, attributes } = &self.nodes[child].kind {
                visit(child, tag, attributes);
            }
            self.visit_elements(child, visit);
        }
    }
}

impl Document for HtmlDocument {
    fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let selector = Selector::parse(selector)?;
        let mut found = Vec::new();
        self.visit_elements(ROOT, &mut |index, tag, attributes| {
            if selector.matches(tag, attributes) {
                found.push(index);
            }
        });
        Ok(found.into_iter().map(|index| self.id(index)).collect())
    }

    fn is_attached(&self, node: NodeId) -> bool {
        let Some(mut current) = self.index_of(node) else {
            return false;
        };
        loop {
            if current == ROOT {
                return true;
            }
            match self.nodes[current].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn get_attribute(&self, node: NodeId, name: &str) -> Option<String> {
        match &self.nodes[self.index_of(node)?].kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone().unwrap_or_default()),
            _ => None,
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        let name = name.to_ascii_lowercase();
        let attributes = self.element_attributes_mut(node)?;
        match attributes.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => *existing = Some(value.to_string()),
            None => attributes.push((name, Some(value.to_string()))),
        }
        Ok(())
    }

    fn set_inner_html(&mut self, node: NodeId, html: &str) -> Result<()> {
        let index = self.attached_index(node)?;
        if matches!(self.nodes[index].kind, NodeKind::Text(_) | NodeKind::Raw(_)) {
            return Err(DomError::NotAnElement(node));
        }

        let old_children = std::mem::take(&mut self.nodes[index].children);
        for child in old_children {
            self.release(child);
        }
        let children = self.build_all(index, parse_fragment(html));
        self.nodes[index].children = children;
        Ok(())
    }

    fn replace_with_html(&mut self, node: NodeId, html: &str) -> Result<Vec<NodeId>> {
        let index = self.attached_index(node)?;
        let Some(parent) = self.nodes[index].parent else {
            return Err(DomError::NotAnElement(node));
        };
        let Some(position) = self.nodes[parent]
            .children
            .iter()
            .position(|&c| c == index)
        else {
            return Err(DomError::StaleNode(node));
        };

        self.nodes[parent].children.remove(position);
        self.release(index);

        let replacements = self.build_all(parent, parse_fragment(html));
        let inserted = replacements.iter().map(|&i| self.id(i)).collect();
        self.nodes[parent]
            .children
            .splice(position..position, replacements);
        Ok(inserted)
    }
}

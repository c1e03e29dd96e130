//! Tolerant HTML fragment parser.
//!
//! Good enough for well-formed component fragments: elements, attributes,
//! text, comments, void elements and raw text elements. Text and attribute
//! values are kept verbatim so that rendering reproduces the input.

use std::sync::OnceLock;

use regex::Regex;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

pub(crate) type Attribute = (String, Option<String>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ParsedNode {
    Element {
        tag: String,
        attributes: Vec<Attribute>,
        children: Vec<ParsedNode>,
    },
    Text(String),
    /// Comments, doctypes and processing instructions
    Raw(String),
}

pub(crate) fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

fn start_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"^<([a-zA-Z][a-zA-Z0-9:-]*)((?:\s+[^\s"'>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*)\s*(/)?>"#,
        )
        .expect("start tag regex is valid")
    })
}

fn end_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^</([a-zA-Z][a-zA-Z0-9:-]*)\s*>").expect("end tag regex is valid")
    })
}

fn attribute_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
            .expect("attribute regex is valid")
    })
}

fn parse_attributes(source: &str) -> Vec<Attribute> {
    attribute_regex()
        .captures_iter(source)
        .map(|caps| {
            let name = caps[1].to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str().to_string());
            (name, value)
        })
        .collect()
}

struct OpenElement {
    tag: String,
    attributes: Vec<Attribute>,
    children: Vec<ParsedNode>,
}

impl OpenElement {
    fn finish(self) -> ParsedNode {
        ParsedNode::Element {
            tag: self.tag,
            attributes: self.attributes,
            children: self.children,
        }
    }
}

struct TreeBuilder {
    roots: Vec<ParsedNode>,
    open: Vec<OpenElement>,
}

impl TreeBuilder {
    fn push(&mut self, node: ParsedNode) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    /// Close `tag` and anything left open inside it. Stray end tags are
    /// dropped.
    fn close(&mut self, tag: &str) {
        let Some(index) = self.open.iter().rposition(|e| e.tag == tag) else {
            return;
        };
        while self.open.len() > index {
            if let Some(element) = self.open.pop() {
                let node = element.finish();
                self.push(node);
            }
        }
    }

    fn finish(mut self) -> Vec<ParsedNode> {
        while let Some(element) = self.open.pop() {
            let node = element.finish();
            self.push(node);
        }
        self.roots
    }
}

/// Parse an HTML fragment into a node list.
pub(crate) fn parse_fragment(html: &str) -> Vec<ParsedNode> {
    let mut builder = TreeBuilder {
        roots: Vec::new(),
        open: Vec::new(),
    };
    let mut pos = 0;

    while pos < html.len() {
        let rest = &html[pos..];

        if rest.starts_with("<!--") {
            let end = rest.find("-->").map(|i| i + 3).unwrap_or(rest.len());
            builder.push(ParsedNode::Raw(rest[..end].to_string()));
            pos += end;
            continue;
        }

        if rest.starts_with("<!") || rest.starts_with("<?") {
            let end = rest.find('>').map(|i| i + 1).unwrap_or(rest.len());
            builder.push(ParsedNode::Raw(rest[..end].to_string()));
            pos += end;
            continue;
        }

        if rest.starts_with("</") {
            if let Some(caps) = end_tag_regex().captures(rest) {
                let tag = caps[1].to_ascii_lowercase();
                pos += caps[0].len();
                builder.close(&tag);
                continue;
            }
        } else if rest.starts_with('<') {
            if let Some(caps) = start_tag_regex().captures(rest) {
                let tag = caps[1].to_ascii_lowercase();
                let attributes = caps
                    .get(2)
                    .map(|m| parse_attributes(m.as_str()))
                    .unwrap_or_default();
                let self_closing = caps.get(3).is_some();
                pos += caps[0].len();

                if is_void_element(&tag) || self_closing {
                    builder.push(ParsedNode::Element {
                        tag,
                        attributes,
                        children: Vec::new(),
                    });
                } else if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
                    let remaining = &html[pos..];
                    let closing = format!("</{}", tag);
                    let close_at = remaining.to_ascii_lowercase().find(&closing);
                    let text_end = close_at.unwrap_or(remaining.len());

                    let mut children = Vec::new();
                    if text_end > 0 {
                        children.push(ParsedNode::Text(remaining[..text_end].to_string()));
                    }
                    pos += text_end;
                    if close_at.is_some() {
                        let after = &html[pos..];
                        pos += after.find('>').map(|i| i + 1).unwrap_or(after.len());
                    }

                    builder.push(ParsedNode::Element {
                        tag,
                        attributes,
                        children,
                    });
                } else {
                    builder.open.push(OpenElement {
                        tag,
                        attributes,
                        children: Vec::new(),
                    });
                }
                continue;
            }
        }

        // Plain text up to the next tag. A '<' that did not start a tag is
        // kept as text.
        let skip = usize::from(rest.starts_with('<'));
        let end = rest[skip..]
            .find('<')
            .map(|i| i + skip)
            .unwrap_or(rest.len());
        builder.push(ParsedNode::Text(rest[..end].to_string()));
        pos += end;
    }

    builder.finish()
}

//! Simple CSS selectors.
//!
//! Supports compound selectors (`tag`, `*`, `#id`, `.class`, `[attr]`,
//! `[attr="value"]`) and comma separated lists of them. Combinators are
//! rejected.

use super::parse::Attribute;
use super::DomError;

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeMatch {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeMatch>,
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Compound>,
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn read_ident(chars: &[char], start: usize) -> (String, usize) {
    let mut end = start;
    while end < chars.len() && is_ident_char(chars[end]) {
        end += 1;
    }
    (chars[start..end].iter().collect(), end)
}

/// Unquote an attribute value, resolving backslash escapes inside quotes.
fn attribute_value(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let Some(quote) = raw.chars().next().filter(|c| *c == '"' || *c == '\'') else {
        return (!raw.is_empty() && raw.chars().all(is_ident_char)).then(|| raw.to_string());
    };

    let mut value = String::new();
    let mut chars = raw[1..].chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => value.push(chars.next()?),
            c if c == quote => return chars.as_str().is_empty().then_some(value),
            c => value.push(c),
        }
    }
    None
}

/// Position of the `]` closing a bracket opened just before `chars[start]`,
/// skipping quoted text.
fn closing_bracket(chars: &[char], start: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut i = start;
    while i < chars.len() {
        match (quote, chars[i]) {
            (Some(_), '\\') => i += 1,
            (Some(q), c) if c == q => quote = None,
            (None, '"' | '\'') => quote = Some(chars[i]),
            (None, ']') => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Split a selector list on commas outside brackets and quotes.
fn split_list(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (Some(_), '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

/// Attribute selector matching `name` exactly equal to `value`.
pub fn attribute_selector(name: &str, value: &str) -> String {
    let mut out = format!("[{}=\"", name);
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push_str("\"]");
    out
}

/// Class selector for `class`, if it can be written without escapes.
pub fn class_selector(class: &str) -> Option<String> {
    let first = class.chars().next()?;
    (!first.is_ascii_digit() && first != '-' && class.chars().all(is_ident_char))
        .then(|| format!(".{}", class))
}

fn parse_compound(input: &str, full: &str) -> Result<Compound, DomError> {
    let invalid = || DomError::InvalidSelector(full.to_string());
    let chars: Vec<char> = input.trim().chars().collect();
    if chars.is_empty() {
        return Err(invalid());
    }

    let mut compound = Compound::default();
    let mut i = 0;

    if chars[0] == '*' {
        i = 1;
    } else if chars[0].is_alphabetic() {
        let (tag, end) = read_ident(&chars, 0);
        compound.tag = Some(tag.to_ascii_lowercase());
        i = end;
    }

    while i < chars.len() {
        match chars[i] {
            '#' => {
                let (id, end) = read_ident(&chars, i + 1);
                if id.is_empty() {
                    return Err(invalid());
                }
                compound.id = Some(id);
                i = end;
            }
            '.' => {
                let (class, end) = read_ident(&chars, i + 1);
                if class.is_empty() {
                    return Err(invalid());
                }
                compound.classes.push(class);
                i = end;
            }
            '[' => {
                let close = closing_bracket(&chars, i + 1).ok_or_else(invalid)?;
                let inner: String = chars[i + 1..close].iter().collect();
                let (name, value) = match inner.split_once('=') {
                    Some((name, raw)) => {
                        let value = attribute_value(raw).ok_or_else(invalid)?;
                        (name.trim(), Some(value))
                    }
                    None => (inner.trim(), None),
                };
                if name.is_empty() || !name.chars().all(is_ident_char) {
                    return Err(invalid());
                }
                compound.attributes.push(AttributeMatch {
                    name: name.to_ascii_lowercase(),
                    value,
                });
                i = close + 1;
            }
            _ => return Err(invalid()),
        }
    }

    Ok(compound)
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, DomError> {
        let alternatives = split_list(input)
            .into_iter()
            .map(|part| parse_compound(part, input))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { alternatives })
    }

    pub(crate) fn matches(&self, tag: &str, attributes: &[Attribute]) -> bool {
        self.alternatives
            .iter()
            .any(|compound| compound.matches(tag, attributes))
    }
}

impl Compound {
    fn matches(&self, tag: &str, attributes: &[Attribute]) -> bool {
        let attribute = |name: &str| {
            attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_deref().unwrap_or(""))
        };

        if let Some(ref expected) = self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(ref id) = self.id {
            if attribute("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class_list = attribute("class").unwrap_or("");
            if !self
                .classes
                .iter()
                .all(|c| class_list.split_whitespace().any(|have| have == c))
            {
                return false;
            }
        }
        self.attributes.iter().all(|m| match (attribute(&m.name), &m.value) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(actual), Some(expected)) => actual == expected,
        })
    }
}

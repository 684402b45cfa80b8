//! CSS selector subset understood by the in-memory DOM.
//!
//! Supported: type selectors, `*`, `#id`, `.class`, `[attr]`,
//! `[attr=value]` (quoted or bare), descendant and child (`>`) combinators,
//! and comma-separated selector lists.

use std::iter::Peekable;
use std::str::Chars;

use super::dom::{Dom, NodeId};

/// One compound selector, e.g. `p.price[data-id="3"]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

impl Compound {
    fn matches(&self, dom: &Dom, node: NodeId) -> bool {
        if self.tag.as_deref().is_some_and(|tag| dom.tag(node) != tag) {
            return false;
        }
        if self
            .id
            .as_deref()
            .is_some_and(|id| dom.attr(node, "id") != Some(id))
        {
            return false;
        }
        let classes = dom.attr(node, "class").unwrap_or_default();
        if !self
            .classes
            .iter()
            .all(|wanted| classes.split_whitespace().any(|c| c == wanted))
        {
            return false;
        }
        self.attrs
            .iter()
            .all(|(name, value)| match (dom.attr(node, name), value) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == expected,
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// A complex selector: compounds joined by combinators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Complex {
    compounds: Vec<Compound>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

impl Complex {
    /// Whether `node` is the subject of this selector
    pub fn matches(&self, dom: &Dom, node: NodeId) -> bool {
        self.compounds
            .len()
            .checked_sub(1)
            .is_some_and(|last| self.matches_at(last, dom, node))
    }

    fn matches_at(&self, index: usize, dom: &Dom, node: NodeId) -> bool {
        if !self.compounds[index].matches(dom, node) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match self.combinators[index - 1] {
            Combinator::Child => dom
                .parent(node)
                .is_some_and(|parent| self.matches_at(index - 1, dom, parent)),
            Combinator::Descendant => dom
                .ancestors(node)
                .any(|ancestor| self.matches_at(index - 1, dom, ancestor)),
        }
    }
}

/// Parse a selector list
pub fn parse(selector: &str) -> Result<Vec<Complex>, String> {
    selector
        .split(',')
        .map(|part| parse_complex(part.trim()).map_err(|e| format!("{e} in '{selector}'")))
        .collect()
}

fn parse_complex(input: &str) -> Result<Complex, String> {
    let mut chars = input.chars().peekable();
    let mut compounds = Vec::new();
    let mut combinators = Vec::new();
    let mut current = Compound::default();
    let mut in_compound = false;
    let mut pending: Option<Combinator> = None;

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() || c == '>' {
            chars.next();
            if in_compound {
                compounds.push(std::mem::take(&mut current));
                in_compound = false;
            }
            if c == '>' {
                if compounds.is_empty() || pending == Some(Combinator::Child) {
                    return Err("unexpected '>'".to_string());
                }
                pending = Some(Combinator::Child);
            } else if !compounds.is_empty() && pending.is_none() {
                pending = Some(Combinator::Descendant);
            }
            continue;
        }

        if !in_compound && !compounds.is_empty() {
            combinators.push(pending.take().unwrap_or(Combinator::Descendant));
        }

        match c {
            '*' => {
                chars.next();
            }
            '#' => {
                chars.next();
                current.id = Some(read_ident(&mut chars)?);
            }
            '.' => {
                chars.next();
                current.classes.push(read_ident(&mut chars)?);
            }
            '[' => {
                chars.next();
                current.attrs.push(read_attr(&mut chars)?);
            }
            c if is_ident_char(c) => {
                if in_compound {
                    return Err(format!("unexpected type selector after '{c}'"));
                }
                current.tag = Some(read_ident(&mut chars)?.to_ascii_lowercase());
            }
            other => return Err(format!("unsupported character '{other}'")),
        }
        in_compound = true;
    }

    if in_compound {
        compounds.push(current);
    } else if pending == Some(Combinator::Child) {
        return Err("dangling '>'".to_string());
    }
    if compounds.is_empty() {
        return Err("empty selector".to_string());
    }
    Ok(Complex {
        compounds,
        combinators,
    })
}

const fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn read_ident(chars: &mut Peekable<Chars<'_>>) -> Result<String, String> {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if !is_ident_char(c) {
            break;
        }
        ident.push(c);
        chars.next();
    }
    if ident.is_empty() {
        Err("expected an identifier".to_string())
    } else {
        Ok(ident)
    }
}

fn read_attr(chars: &mut Peekable<Chars<'_>>) -> Result<(String, Option<String>), String> {
    let name = read_ident(chars)?;
    match chars.next() {
        Some(']') => Ok((name, None)),
        Some('=') => {
            let value = match chars.peek() {
                Some(&quote @ ('"' | '\'')) => {
                    chars.next();
                    chars.by_ref().take_while(|&c| c != quote).collect()
                }
                _ => read_ident(chars)?,
            };
            match chars.next() {
                Some(']') => Ok((name, Some(value))),
                _ => Err("unterminated attribute selector".to_string()),
            }
        }
        _ => Err("unterminated attribute selector".to_string()),
    }
}

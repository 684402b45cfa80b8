//! Arena DOM used by the in-memory storefront.
//!
//! Elements are stored in document (pre-)order: a node's subtree is the
//! contiguous id range `id + 1 .. end`, so sorting ids sorts by document
//! order and containment is a range check.
//!
//! Resolution follows the same rules as the in-page resolver used over
//! CDP: implicit ARIA roles, accessible names from `aria-label`, labels,
//! `alt` and text, deepest-match text lookup, placeholder and test id.

use std::collections::BTreeMap;

use super::css;
use super::storefront::Trigger;
use crate::driver::ElementState;
use crate::locator::{normalize_whitespace, Locator, Selector, Step};

/// Element description a [`Dom`] is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    tag: String,
    attrs: BTreeMap<String, String>,
    children: Vec<Child>,
    hidden: bool,
    on_click: Option<Trigger>,
}

/// Element content: text or a nested element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    Text(String),
    Element(Node),
}

impl Node {
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
            hidden: false,
            on_click: None,
        }
    }

    #[must_use]
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.insert(name.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    #[must_use]
    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Child::Text(text.into()));
        self
    }

    #[must_use]
    pub fn child(mut self, node: Self) -> Self {
        self.children.push(Child::Element(node));
        self
    }

    #[must_use]
    pub fn children(mut self, nodes: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(nodes.into_iter().map(Child::Element));
        self
    }

    /// Rendered with `display: none`
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Storefront behavior fired when the element is clicked
    #[must_use]
    pub fn on_click(mut self, trigger: Trigger) -> Self {
        self.on_click = Some(trigger);
        self
    }
}

/// Index of an element in document order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum Content {
    Text(String),
    Element(NodeId),
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attrs: BTreeMap<String, String>,
    parent: Option<NodeId>,
    content: Vec<Content>,
    end: usize,
    hidden: bool,
    on_click: Option<Trigger>,
    value: String,
    checked: bool,
}

/// A rendered screen
#[derive(Debug, Clone)]
pub struct Dom {
    elements: Vec<Element>,
}

impl Dom {
    /// Flatten a node tree into an arena
    #[must_use]
    pub fn new(root: Node) -> Self {
        let mut dom = Self {
            elements: Vec::new(),
        };
        dom.insert(root, None);
        dom
    }

    fn insert(&mut self, node: Node, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.elements.len());
        let value = node.attrs.get("value").cloned().unwrap_or_default();
        let checked = node.attrs.contains_key("checked");
        self.elements.push(Element {
            tag: node.tag,
            attrs: node.attrs,
            parent,
            content: Vec::new(),
            end: id.0 + 1,
            hidden: node.hidden,
            on_click: node.on_click,
            value,
            checked,
        });

        let content = node
            .children
            .into_iter()
            .map(|child| match child {
                Child::Text(text) => Content::Text(text),
                Child::Element(node) => Content::Element(self.insert(node, Some(id))),
            })
            .collect();

        let end = self.elements.len();
        let el = &mut self.elements[id.0];
        el.content = content;
        el.end = end;

        if self.tag(id) == "select" {
            let options = self.options(id);
            let selected = options
                .iter()
                .find(|&&(option, _, _)| self.attr(option, "selected").is_some())
                .or_else(|| options.first())
                .map(|(_, _, value)| value.clone())
                .unwrap_or_default();
            self.elements[id.0].value = selected;
        }
        id
    }

    fn el(&self, id: NodeId) -> &Element {
        &self.elements[id.0]
    }

    /// The document element
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Lowercase tag name
    #[must_use]
    pub fn tag(&self, id: NodeId) -> &str {
        &self.el(id).tag
    }

    /// Attribute value
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.el(id).attrs.get(name).map(String::as_str)
    }

    /// Parent element
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.el(id).parent
    }

    /// Ancestors from the parent up to the root
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), |&n| self.parent(n))
    }

    fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> {
        (id.0 + 1..self.el(id).end).map(NodeId)
    }

    fn all(&self) -> impl Iterator<Item = NodeId> {
        (0..self.elements.len()).map(NodeId)
    }

    /// Whether `id` is a strict descendant of `ancestor`
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, id: NodeId) -> bool {
        ancestor.0 < id.0 && id.0 < self.el(ancestor).end
    }

    /// First element with the given `id` attribute
    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.all().find(|&n| self.attr(n, "id") == Some(id))
    }

    /// Concatenated text of the element and its descendants
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        for content in &self.el(id).content {
            match content {
                Content::Text(text) => out.push_str(text),
                Content::Element(child) => self.collect_text(*child, out),
            }
        }
    }

    /// Neither the element nor any ancestor is hidden
    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> bool {
        std::iter::successors(Some(id), |&n| self.parent(n)).all(|n| !self.el(n).hidden)
    }

    /// Current value of a form control
    #[must_use]
    pub fn value(&self, id: NodeId) -> &str {
        &self.el(id).value
    }

    /// Current checked state
    #[must_use]
    pub fn is_checked(&self, id: NodeId) -> bool {
        self.el(id).checked
    }

    /// Behavior attached to the element
    #[must_use]
    pub fn trigger(&self, id: NodeId) -> Option<Trigger> {
        self.el(id).on_click
    }

    fn input_type(&self, id: NodeId) -> Option<String> {
        (self.tag(id) == "input").then(|| {
            self.attr(id, "type")
                .unwrap_or("text")
                .to_ascii_lowercase()
        })
    }

    fn is_checkable(&self, id: NodeId) -> bool {
        matches!(self.input_type(id).as_deref(), Some("checkbox" | "radio"))
    }

    fn is_form_control(&self, id: NodeId) -> bool {
        matches!(self.tag(id), "input" | "textarea" | "select")
    }

    /// Implicit or explicit ARIA role
    #[must_use]
    pub fn role(&self, id: NodeId) -> Option<&str> {
        if let Some(explicit) = self
            .attr(id, "role")
            .and_then(|r| r.split_whitespace().next())
        {
            return Some(explicit);
        }
        match self.tag(id) {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Some("heading"),
            "button" => Some("button"),
            "a" => self.attr(id, "href").map(|_| "link"),
            "img" => Some(if self.attr(id, "alt") == Some("") {
                "presentation"
            } else {
                "img"
            }),
            "select" => Some("combobox"),
            "textarea" => Some("textbox"),
            "input" => match self.input_type(id).as_deref() {
                Some("checkbox") => Some("checkbox"),
                Some("radio") => Some("radio"),
                Some("button" | "submit" | "reset" | "image") => Some("button"),
                Some("hidden") => None,
                Some("number") => Some("spinbutton"),
                Some("range") => Some("slider"),
                Some("search") => Some("searchbox"),
                _ => Some("textbox"),
            },
            _ => None,
        }
    }

    fn heading_level(&self, id: NodeId) -> Option<u8> {
        let tag = self.tag(id);
        match tag.strip_prefix('h').and_then(|n| n.parse::<u8>().ok()) {
            Some(level @ 1..=6) => Some(level),
            _ => self.attr(id, "aria-level").and_then(|l| l.parse().ok()),
        }
    }

    fn labels(&self, id: NodeId) -> Vec<NodeId> {
        let mut labels: Vec<NodeId> = self
            .attr(id, "id")
            .map(|own| {
                self.all()
                    .filter(|&n| self.tag(n) == "label" && self.attr(n, "for") == Some(own))
                    .collect()
            })
            .unwrap_or_default();
        if let Some(wrapping) = self.ancestors(id).find(|&n| self.tag(n) == "label") {
            if !labels.contains(&wrapping) {
                labels.push(wrapping);
            }
        }
        labels.sort();
        labels
    }

    /// Accessible name
    #[must_use]
    pub fn accessible_name(&self, id: NodeId) -> String {
        if let Some(label) = self.attr(id, "aria-label").filter(|l| !l.trim().is_empty()) {
            return normalize_whitespace(label);
        }
        if let Some(ids) = self.attr(id, "aria-labelledby") {
            let text: Vec<String> = ids
                .split_whitespace()
                .filter_map(|target| self.find_by_id(target))
                .map(|target| self.text_content(target))
                .collect();
            return normalize_whitespace(&text.join(" "));
        }
        if self.is_form_control(id) || self.tag(id) == "button" {
            let labels = self.labels(id);
            if !labels.is_empty() {
                let text: Vec<String> = labels.iter().map(|&l| self.text_content(l)).collect();
                return normalize_whitespace(&text.join(" "));
            }
        }
        if self.tag(id) == "img" {
            return normalize_whitespace(self.attr(id, "alt").unwrap_or_default());
        }
        if matches!(
            self.input_type(id).as_deref(),
            Some("button" | "submit" | "reset")
        ) {
            return normalize_whitespace(self.value(id));
        }
        if matches!(self.role(id), Some("button" | "link" | "heading")) {
            return normalize_whitespace(&self.text_content(id));
        }
        normalize_whitespace(
            self.attr(id, "title")
                .or_else(|| self.attr(id, "placeholder"))
                .unwrap_or_default(),
        )
    }

    /// `(option, label, value)` for each option of a select
    fn options(&self, select: NodeId) -> Vec<(NodeId, String, String)> {
        self.descendants(select)
            .filter(|&n| self.tag(n) == "option")
            .map(|n| {
                let label = self
                    .attr(n, "label")
                    .map_or_else(|| normalize_whitespace(&self.text_content(n)), str::to_string);
                let value = self
                    .attr(n, "value")
                    .map_or_else(|| label.clone(), str::to_string);
                (n, label, value)
            })
            .collect()
    }

    /// Elements a locator resolves to, in document order
    pub fn resolve(&self, locator: &Locator) -> Result<Vec<NodeId>, String> {
        self.resolve_steps(None, locator.steps())
    }

    fn resolve_steps(&self, scope: Option<NodeId>, steps: &[Step]) -> Result<Vec<NodeId>, String> {
        // `None` is the whole document before the first step narrows it
        let mut current: Option<Vec<NodeId>> = scope.map(|s| vec![s]);
        for step in steps {
            current = Some(match step {
                Step::Select { selector } => match &current {
                    None => self.select(None, selector)?,
                    Some(scopes) => {
                        let mut found = Vec::new();
                        for &s in scopes {
                            found.extend(self.select(Some(s), selector)?);
                        }
                        found.sort();
                        found.dedup();
                        found
                    }
                },
                Step::FilterHas { inner } => {
                    let mut kept = Vec::new();
                    for candidate in current.take().unwrap_or_else(|| vec![self.root()]) {
                        if !self.resolve_steps(Some(candidate), inner.steps())?.is_empty() {
                            kept.push(candidate);
                        }
                    }
                    kept
                }
                Step::Nth { index } => current
                    .take()
                    .unwrap_or_else(|| vec![self.root()])
                    .get(*index)
                    .map(|&n| vec![n])
                    .unwrap_or_default(),
            });
        }
        Ok(current.unwrap_or_default())
    }

    fn select(&self, scope: Option<NodeId>, selector: &Selector) -> Result<Vec<NodeId>, String> {
        let candidates: Vec<NodeId> = match scope {
            None => self.all().collect(),
            Some(s) => self.descendants(s).collect(),
        };
        let found = match selector {
            Selector::Css { value } => {
                let list = css::parse(value)?;
                candidates
                    .into_iter()
                    .filter(|&n| list.iter().any(|complex| complex.matches(self, n)))
                    .collect()
            }
            Selector::Role {
                role,
                name,
                exact,
                level,
            } => candidates
                .into_iter()
                .filter(|&n| self.role(n) == Some(role.as_str()))
                .filter(|&n| self.is_visible(n))
                .filter(|&n| level.is_none() || self.heading_level(n) == *level)
                .filter(|&n| {
                    name.as_deref().map_or(true, |wanted| {
                        let actual = self.accessible_name(n);
                        if *exact {
                            actual == wanted
                        } else {
                            actual.to_lowercase().contains(&wanted.to_lowercase())
                        }
                    })
                })
                .collect(),
            Selector::Text { matcher } => {
                let hits: Vec<NodeId> = candidates
                    .into_iter()
                    .filter(|&n| matcher.is_match(&self.text_content(n)))
                    .collect();
                hits.iter()
                    .copied()
                    .filter(|&n| !hits.iter().any(|&other| self.contains(n, other)))
                    .collect()
            }
            Selector::Placeholder { value } => {
                let wanted = value.to_lowercase();
                candidates
                    .into_iter()
                    .filter(|&n| {
                        self.attr(n, "placeholder")
                            .is_some_and(|p| p.to_lowercase().contains(&wanted))
                    })
                    .collect()
            }
            Selector::TestId { value } => candidates
                .into_iter()
                .filter(|&n| self.attr(n, "data-testid") == Some(value.as_str()))
                .collect(),
        };
        Ok(found)
    }

    /// What a query reports for one element
    #[must_use]
    pub fn snapshot(&self, id: NodeId) -> ElementState {
        ElementState {
            text: self.text_content(id),
            visible: self.is_visible(id),
            checked: self.is_checkable(id).then(|| self.is_checked(id)),
            value: self
                .is_form_control(id)
                .then(|| self.value(id).to_string()),
        }
    }

    /// Replace the value of a text control
    pub fn fill(&mut self, id: NodeId, value: &str) -> Result<(), String> {
        let fillable = match self.tag(id) {
            "textarea" => true,
            "input" => !matches!(
                self.input_type(id).as_deref(),
                Some("checkbox" | "radio" | "button" | "submit" | "reset" | "image" | "hidden")
            ),
            _ => false,
        };
        if !fillable {
            return Err("element is not an <input> or <textarea>".to_string());
        }
        self.elements[id.0].value = value.to_string();
        Ok(())
    }

    /// Flip a checkbox or radio
    pub fn toggle(&mut self, id: NodeId) -> Result<(), String> {
        if !self.is_checkable(id) {
            return Err("element is not a checkbox or radio".to_string());
        }
        let el = &mut self.elements[id.0];
        el.checked = !el.checked;
        Ok(())
    }

    /// Choose a `<select>` option by label (falling back to value)
    pub fn select_option(&mut self, id: NodeId, label: &str) -> Result<(), String> {
        if self.tag(id) != "select" {
            return Err("element is not a <select>".to_string());
        }
        let options = self.options(id);
        let value = options
            .iter()
            .find(|(_, l, _)| l == label)
            .or_else(|| options.iter().find(|(_, _, v)| v == label))
            .map(|(_, _, v)| v.clone())
            .ok_or_else(|| format!("no option labelled {label:?}"))?;
        self.elements[id.0].value = value;
        Ok(())
    }

    /// Value of the form control with this `id` attribute
    #[must_use]
    pub fn value_of(&self, id: &str) -> Option<&str> {
        self.find_by_id(id).map(|n| self.value(n))
    }

    /// Checked state of the control with this `id` attribute
    #[must_use]
    pub fn checked_of(&self, id: &str) -> Option<bool> {
        self.find_by_id(id).map(|n| self.is_checked(n))
    }
}

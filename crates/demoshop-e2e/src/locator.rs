//! Locator abstraction for element selection.
//!
//! A [`Locator`] is a deferred query: a chain of steps describing how to
//! reach zero or more elements, resolved by the driver every time an action
//! or assertion runs. Nothing is looked up when a locator is built, so page
//! objects can create all their locators up front and survive re-renders.
//!
//! # Design Philosophy
//!
//! - **Lazy**: resolution happens per call, never at construction
//! - **Strict actions**: acting on a locator that matches several elements fails
//! - **Fluent API**: chainable methods mirror how a user describes the page

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// ARIA roles the storefront screens are queried by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Button,
    Checkbox,
    Combobox,
    Heading,
    Img,
    Link,
    Textbox,
}

impl Role {
    /// Role name as used in the accessibility tree
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::Checkbox => "checkbox",
            Self::Combobox => "combobox",
            Self::Heading => "heading",
            Self::Img => "img",
            Self::Link => "link",
            Self::Textbox => "textbox",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How element text is matched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TextMatch {
    /// Case-insensitive substring of the whitespace-normalized text
    Substring(String),
    /// Regular expression tested against the whitespace-normalized text
    Pattern(String),
}

impl TextMatch {
    /// Test a raw text against this matcher.
    ///
    /// An invalid pattern never matches.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        let text = normalize_whitespace(text);
        match self {
            Self::Substring(needle) => text
                .to_lowercase()
                .contains(&normalize_whitespace(needle).to_lowercase()),
            Self::Pattern(pattern) => Regex::new(pattern).is_ok_and(|re| re.is_match(&text)),
        }
    }
}

/// Collapse runs of whitespace into single spaces and trim the ends
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Selector type for one resolution step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selector {
    /// CSS selector (e.g., "#item-price", ".price", "p")
    Css {
        /// Selector text
        value: String,
    },
    /// Role with optional accessible name and heading level
    Role {
        /// Role to match
        role: Role,
        /// Accessible name (substring, case-insensitive unless `exact`)
        name: Option<String>,
        /// Require the accessible name to match exactly
        exact: bool,
        /// Heading level (headings only)
        level: Option<u8>,
    },
    /// Text content selector (deepest matching elements)
    Text {
        /// Text matcher
        matcher: TextMatch,
    },
    /// Input placeholder selector
    Placeholder {
        /// Placeholder text (substring, case-insensitive)
        value: String,
    },
    /// Test ID selector (data-testid attribute)
    TestId {
        /// Test id
        value: String,
    },
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css { value } => write!(f, "locator({value:?})"),
            Self::Role {
                role,
                name,
                exact,
                level,
            } => {
                write!(f, "getByRole({:?}", role.as_str())?;
                let mut opts = Vec::new();
                if let Some(name) = name {
                    opts.push(format!("name: {name:?}"));
                }
                if *exact {
                    opts.push("exact: true".to_string());
                }
                if let Some(level) = level {
                    opts.push(format!("level: {level}"));
                }
                if !opts.is_empty() {
                    write!(f, ", {{ {} }}", opts.join(", "))?;
                }
                f.write_str(")")
            }
            Self::Text { matcher } => match matcher {
                TextMatch::Substring(text) => write!(f, "getByText({text:?})"),
                TextMatch::Pattern(pattern) => write!(f, "getByText(/{pattern}/)"),
            },
            Self::Placeholder { value } => write!(f, "getByPlaceholder({value:?})"),
            Self::TestId { value } => write!(f, "getByTestId({value:?})"),
        }
    }
}

/// One step of a locator chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Replace the current scope with matching descendants
    Select {
        /// What to select
        selector: Selector,
    },
    /// Keep only elements that contain a match of `inner`
    FilterHas {
        /// Locator resolved relative to each candidate
        inner: Locator,
    },
    /// Keep only the element at `index` (0-based)
    Nth {
        /// Index into the current matches
        index: usize,
    },
}

/// A deferred reference to zero or more elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    steps: Vec<Step>,
    description: Option<String>,
}

impl Locator {
    fn from_selector(selector: Selector) -> Self {
        Self {
            steps: vec![Step::Select { selector }],
            description: None,
        }
    }

    /// Locate by CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::Css {
            value: selector.into(),
        })
    }

    /// Locate by ARIA role
    #[must_use]
    pub fn role(role: Role) -> Self {
        Self::from_selector(Selector::Role {
            role,
            name: None,
            exact: false,
            level: None,
        })
    }

    /// Locate by text content (case-insensitive substring)
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::from_selector(Selector::Text {
            matcher: TextMatch::Substring(text.into()),
        })
    }

    /// Locate by text content matching a regular expression
    #[must_use]
    pub fn text_pattern(pattern: impl Into<String>) -> Self {
        Self::from_selector(Selector::Text {
            matcher: TextMatch::Pattern(pattern.into()),
        })
    }

    /// Locate an input by placeholder
    #[must_use]
    pub fn placeholder(text: impl Into<String>) -> Self {
        Self::from_selector(Selector::Placeholder { value: text.into() })
    }

    /// Locate by `data-testid`
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::from_selector(Selector::TestId { value: id.into() })
    }

    fn map_role(mut self, f: impl FnOnce(&mut Option<String>, &mut bool, &mut Option<u8>)) -> Self {
        if let Some(Step::Select {
            selector:
                Selector::Role {
                    name, exact, level, ..
                },
        }) = self.steps.last_mut()
        {
            f(name, exact, level);
        }
        self
    }

    /// Restrict a role step to an accessible name
    #[must_use]
    pub fn with_name(self, accessible_name: impl Into<String>) -> Self {
        let accessible_name = accessible_name.into();
        self.map_role(|name, _, _| *name = Some(accessible_name))
    }

    /// Require the accessible name to match exactly
    #[must_use]
    pub fn exact(self) -> Self {
        self.map_role(|_, exact, _| *exact = true)
    }

    /// Restrict a heading role step to a level
    #[must_use]
    pub fn with_level(self, heading_level: u8) -> Self {
        self.map_role(|_, _, level| *level = Some(heading_level))
    }

    /// Descend into matching children by CSS selector
    #[must_use]
    pub fn locator(mut self, css: impl Into<String>) -> Self {
        self.steps.push(Step::Select {
            selector: Selector::Css { value: css.into() },
        });
        self
    }

    /// Keep only matches that contain an element matching `inner`
    #[must_use]
    pub fn filter_has(mut self, inner: Self) -> Self {
        self.steps.push(Step::FilterHas { inner });
        self
    }

    /// The `index`-th match (0-based)
    #[must_use]
    pub fn nth(&self, index: usize) -> Self {
        let mut steps = self.steps.clone();
        steps.push(Step::Nth { index });
        Self {
            steps,
            description: None,
        }
    }

    /// Attach a human description used in logs and failure messages
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Resolution steps
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Description if set, otherwise the selector chain
    #[must_use]
    pub fn description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| self.selector_chain())
    }

    /// Selector chain in a readable form
    #[must_use]
    pub fn selector_chain(&self) -> String {
        self.steps
            .iter()
            .map(|step| match step {
                Step::Select { selector } => selector.to_string(),
                Step::FilterHas { inner } => format!("filter({{ has: {} }})", inner.selector_chain()),
                Step::Nth { index } => format!("nth({index})"),
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

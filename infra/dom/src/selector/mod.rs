//! Selector subset used by directive blocks.
//!
//! Grammar (whitespace around `>` and `,` is optional):
//!
//! ```text
//! list      = complex ("," complex)*
//! complex   = compound (combinator compound)*
//! combinator= ">" | whitespace
//! compound  = (type | "*")? (#id | .class | [attr] | [attr op value])*
//! op        = "=" | "~=" | "^=" | "$=" | "*="
//! ```

mod parser;

use crate::document::{Document, Element};
use crate::error::DomError;
use weld_domain::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttrOp {
    Equals,
    Includes,
    Prefix,
    Suffix,
    Substring,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Simple {
    Id(String),
    Class(String),
    Attribute { name: String, test: Option<(AttrOp, String)> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Compound {
    /// `None` matches any element.
    pub(crate) tag: Option<String>,
    pub(crate) simple: Vec<Simple>,
}

/// `compounds[i]` and `compounds[i + 1]` are joined by `combinators[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Complex {
    pub(crate) compounds: Vec<Compound>,
    pub(crate) combinators: Vec<Combinator>,
}

/// A parsed, comma-separated selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(Vec<Complex>);

impl SelectorList {
    /// # Errors
    /// [`DomError::Selector`] for empty input or syntax outside the subset
    /// (pseudo-classes, sibling combinators, namespaces and so on).
    pub fn parse(selector: &str) -> Result<Self, DomError> {
        parser::selector_list(selector.trim()).map(Self).ok_or_else(|| DomError::Selector {
            message: format!("'{selector}' is not a supported selector").into(),
            context: None,
        })
    }

    /// Whether the element matches any selector of the list.
    #[must_use]
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.0.iter().any(|complex| complex.matches(doc, node))
    }
}

impl Complex {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.compounds.len().checked_sub(1).is_some_and(|last| self.matches_at(doc, node, last))
    }

    // Right-to-left: `index` is the compound `node` must satisfy.
    fn matches_at(&self, doc: &Document, node: NodeId, index: usize) -> bool {
        if !doc.element(node).is_some_and(|element| self.compounds[index].matches(element)) {
            return false;
        }
        let Some(previous) = index.checked_sub(1) else { return true };

        match self.combinators[previous] {
            Combinator::Child => {
                doc.parent(node).is_some_and(|parent| self.matches_at(doc, parent, previous))
            },
            Combinator::Descendant => {
                let mut ancestor = doc.parent(node);
                while let Some(id) = ancestor {
                    if self.matches_at(doc, id, previous) {
                        return true;
                    }
                    ancestor = doc.parent(id);
                }
                false
            },
        }
    }
}

impl Compound {
    fn matches(&self, element: &Element) -> bool {
        self.tag.as_deref().is_none_or(|tag| element.name() == tag)
            && self.simple.iter().all(|simple| simple.matches(element))
    }
}

impl Simple {
    fn matches(&self, element: &Element) -> bool {
        match self {
            Self::Id(id) => element.attribute("id") == Some(id.as_str()),
            Self::Class(class) => element.has_class(class),
            Self::Attribute { name, test } => {
                let Some(actual) = element.attribute(name) else { return false };
                let Some((op, expected)) = test else { return true };
                let expected = expected.as_str();
                match op {
                    AttrOp::Equals => actual == expected,
                    AttrOp::Includes => actual.split_ascii_whitespace().any(|word| word == expected),
                    AttrOp::Prefix => !expected.is_empty() && actual.starts_with(expected),
                    AttrOp::Suffix => !expected.is_empty() && actual.ends_with(expected),
                    AttrOp::Substring => !expected.is_empty() && actual.contains(expected),
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <div id="main" class="page wide">
          <ul class="menu">
            <li class="item first" data-role="link">A</li>
            <li class="item"><a href="/cart" data-mage-init='{"x":{}}'>B</a></li>
          </ul>
          <form id="search" action="/search?q=1"><input name="q" type="text"></form>
        </div>
        <p class="item">outside</p>
    "#;

    fn select(selector: &str) -> Vec<String> {
        let doc = Document::parse(PAGE).unwrap();
        doc.query_selector_all(doc.root(), selector)
            .unwrap()
            .into_iter()
            .map(|id| doc.describe(id))
            .collect()
    }

    #[test]
    fn simple_selectors() {
        assert_eq!(select("#search"), ["<form#search>"]);
        assert_eq!(select(".item").len(), 3);
        assert_eq!(select("li.first"), ["<li.item.first>"]);
        assert_eq!(select("INPUT"), ["<input>"]);
    }

    #[test]
    fn universal_matches_every_element() {
        let doc = Document::parse(PAGE).unwrap();
        let all = doc.query_selector_all(doc.root(), "*").unwrap();
        assert_eq!(all.len(), doc.elements(doc.root()).count());
    }

    #[test]
    fn attribute_operators() {
        assert_eq!(select("[data-mage-init]"), ["<a>"]);
        assert_eq!(select("[href='/cart']"), ["<a>"]);
        assert_eq!(select("[class~=wide]"), ["<div#main.page.wide>"]);
        assert_eq!(select("[action^=\"/search\"]"), ["<form#search>"]);
        assert_eq!(select("[href$=cart]"), ["<a>"]);
        assert_eq!(select("[action*='q=']"), ["<form#search>"]);
        assert!(select("[href^='']").is_empty());
    }

    #[test]
    fn combinators() {
        assert_eq!(select("#main .item").len(), 2);
        assert_eq!(select("ul > li > a"), ["<a>"]);
        assert_eq!(select("div>a").len(), 0);
        assert_eq!(select("div a").len(), 1);
    }

    #[test]
    fn lists_keep_document_order() {
        assert_eq!(select("input, #main, a"), ["<div#main.page.wide>", "<a>", "<input>"]);
    }

    #[test]
    fn scope_is_inclusive_and_bounded() {
        let doc = Document::parse(PAGE).unwrap();
        let ul = doc.query_selector_all(doc.root(), "ul").unwrap()[0];

        let items = doc.query_selector_all(ul, ".item").unwrap();
        assert_eq!(items.len(), 2);

        assert_eq!(doc.query_selector_all(ul, ".menu").unwrap(), [ul]);
        assert_eq!(doc.query_selector_all(ul, "#main li").unwrap().len(), 2);
        assert!(doc.query_selector_all(ul, "p").unwrap().is_empty());
    }

    #[test]
    fn rejects_unsupported_syntax() {
        for selector in ["", "   ", "a:hover", "a + b", "a ~ b", "[x", "div,", ">a", "#", "a >"] {
            assert!(
                matches!(SelectorList::parse(selector), Err(DomError::Selector { .. })),
                "{selector:?}"
            );
        }
    }
}

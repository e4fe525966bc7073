use crate::error::DomError;
use crate::markup;
use crate::selector::SelectorList;
use std::fmt::Write as _;
use weld_domain::NodeId;

/// A single `name="value"` pair. Names are stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Element payload: lowercase tag name plus attributes in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<Attribute>,
}

impl Element {
    pub(crate) fn new(name: &str) -> Self {
        Self { name: name.to_ascii_lowercase(), attributes: Vec::new() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
            .map(|attr| attr.value.as_str())
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class").is_some_and(|list| list.split_ascii_whitespace().any(|c| c == class))
    }

    /// Sets or replaces an attribute. Returns the previous value.
    pub(crate) fn set_attribute(&mut self, name: &str, value: String) -> Option<String> {
        let name = name.to_ascii_lowercase();
        match self.attributes.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => Some(std::mem::replace(&mut attr.value, value)),
            None => {
                self.attributes.push(Attribute { name, value });
                None
            },
        }
    }

    /// First occurrence wins, like a browser parsing duplicate attributes.
    pub(crate) fn push_parsed_attribute(&mut self, name: &str, value: String) {
        if self.attribute(name).is_none() {
            self.attributes.push(Attribute { name: name.to_ascii_lowercase(), value });
        }
    }

    fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|attr| attr.name.eq_ignore_ascii_case(name))?;
        Some(self.attributes.remove(index).value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

impl Node {
    const fn new(data: NodeData) -> Self {
        Self { parent: None, children: Vec::new(), data }
    }
}

/// Arena-backed document tree.
///
/// Nodes are never freed: detaching a subtree keeps its ids valid, so
/// components holding a [`NodeId`] to removed content can still read it.
/// The document node is always [`Document::root`].
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    const ROOT: NodeId = NodeId::new(0);

    /// An empty document holding only the document node.
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: vec![Node::new(NodeData::Document)] }
    }

    /// Parses a full page.
    ///
    /// # Errors
    /// [`DomError::Markup`] for an unterminated comment, tag, declaration or
    /// raw-text element.
    pub fn parse(markup: &str) -> Result<Self, DomError> {
        let mut doc = Self::new();
        doc.append_markup(Self::ROOT, markup)?;
        Ok(doc)
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        Self::ROOT
    }

    /// Number of nodes ever allocated, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn exists(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    #[must_use]
    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.index()).map(|node| &node.data)
    }

    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.data(id)? {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(Element::name)
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.index()).and_then(|node| node.parent)
    }

    /// Children in document order; empty for unknown ids.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id.index()).map_or(&[], |node| node.children.as_slice())
    }

    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.alloc(NodeData::Element(Element::new(name)))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text(text.into()))
    }

    pub(crate) fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node::new(data));
        id
    }

    /// Moves `child` (and its subtree) to the end of `parent`'s children.
    ///
    /// # Errors
    /// * [`DomError::UnknownNode`] if either id is foreign.
    /// * [`DomError::Hierarchy`] if `parent` cannot hold children, `child` is
    ///   the document node, or `child` is an inclusive ancestor of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check(parent)?;
        self.check(child)?;
        if !matches!(self.nodes[parent.index()].data, NodeData::Document | NodeData::Element(_)) {
            return Err(DomError::Hierarchy {
                message: format!("{parent} cannot have children").into(),
                context: None,
            });
        }
        if child == Self::ROOT || self.contains(child, parent) {
            return Err(DomError::Hierarchy {
                message: format!("Appending {child} under {parent} would create a cycle").into(),
                context: None,
            });
        }
        self.unlink(child);
        self.link(parent, child);
        Ok(())
    }

    /// Removes `node` from its parent. Detached nodes stay readable.
    ///
    /// # Errors
    /// [`DomError::UnknownNode`] for foreign ids, [`DomError::Hierarchy`] for
    /// the document node.
    pub fn detach(&mut self, node: NodeId) -> Result<(), DomError> {
        self.check(node)?;
        if node == Self::ROOT {
            return Err(DomError::Hierarchy {
                message: "The document node cannot be detached".into(),
                context: None,
            });
        }
        self.unlink(node);
        Ok(())
    }

    /// Parses `markup` and appends the resulting nodes to `parent`.
    /// Returns the new top-level nodes.
    ///
    /// # Errors
    /// [`DomError::Markup`] if the markup is malformed; the tree is left
    /// untouched in that case.
    pub fn append_markup(&mut self, parent: NodeId, markup: &str) -> Result<Vec<NodeId>, DomError> {
        self.check_container(parent)?;
        let tokens = markup::tokenize(markup)?;
        let top = markup::build(self, tokens);
        for &node in &top {
            self.link(parent, node);
        }
        Ok(top)
    }

    /// Replaces all children of `node` with parsed `markup`, the way an
    /// asynchronous content update swaps a region of the page.
    ///
    /// # Errors
    /// Same as [`Document::append_markup`]; on error the old children stay.
    pub fn set_inner_markup(&mut self, node: NodeId, markup: &str) -> Result<Vec<NodeId>, DomError> {
        self.check_container(node)?;
        let tokens = markup::tokenize(markup)?;
        for child in std::mem::take(&mut self.nodes[node.index()].children) {
            self.nodes[child.index()].parent = None;
        }
        let top = markup::build(self, tokens);
        for &child in &top {
            self.link(node, child);
        }
        Ok(top)
    }

    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attribute(name)
    }

    #[must_use]
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// # Errors
    /// [`DomError::UnknownNode`] for foreign ids, [`DomError::Hierarchy`] if
    /// the node is not an element.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<Option<String>, DomError> {
        Ok(self.element_mut(id)?.set_attribute(name, value.into()))
    }

    /// Removes an attribute, returning its value. Non-elements have none.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        self.element_mut(id).ok()?.remove_attribute(name)
    }

    /// Concatenated text of all descendant text nodes.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        for node in self.descendants(id) {
            if let Some(NodeData::Text(value)) = self.data(node) {
                text.push_str(value);
            }
        }
        text
    }

    /// Whether `node` is `ancestor` or lies inside its subtree.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Whether the node is reachable from the document node.
    #[must_use]
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.exists(id) && self.contains(Self::ROOT, id)
    }

    /// Pre-order walk of `scope` and everything below it.
    #[must_use]
    pub fn descendants(&self, scope: NodeId) -> Descendants<'_> {
        let stack = if self.exists(scope) { vec![scope] } else { Vec::new() };
        Descendants { doc: self, stack }
    }

    /// Elements of the inclusive subtree of `scope`, in document order.
    pub fn elements(&self, scope: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.descendants(scope).filter(|&id| self.is_element(id))
    }

    /// Elements in the inclusive subtree of `scope` matching `selector`, in
    /// document order. Combinators may look at ancestors outside the scope.
    ///
    /// # Errors
    /// [`DomError::Selector`] when the selector is outside the supported
    /// subset, [`DomError::UnknownNode`] for a foreign scope.
    pub fn query_selector_all(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, DomError> {
        self.check(scope)?;
        let selector = SelectorList::parse(selector)?;
        Ok(self.select(scope, &selector))
    }

    /// Same as [`Document::query_selector_all`] with a pre-parsed selector.
    #[must_use]
    pub fn select(&self, scope: NodeId, selector: &SelectorList) -> Vec<NodeId> {
        self.elements(scope).filter(|&id| selector.matches(self, id)).collect()
    }

    /// Serializes the node and its subtree.
    #[must_use]
    pub fn outer_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        markup::serialize(self, id, &mut out);
        out
    }

    /// Serializes the children of the node.
    #[must_use]
    pub fn inner_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            markup::serialize(self, child, &mut out);
        }
        out
    }

    /// Short label such as `<div#cart.panel>` for diagnostics.
    #[must_use]
    pub fn describe(&self, id: NodeId) -> String {
        match self.data(id) {
            Some(NodeData::Element(element)) => {
                let mut label = format!("<{}", element.name());
                if let Some(id) = element.attribute("id") {
                    let _ = write!(label, "#{id}");
                }
                for class in element.attribute("class").unwrap_or_default().split_ascii_whitespace() {
                    let _ = write!(label, ".{class}");
                }
                label.push('>');
                label
            },
            Some(NodeData::Document) => "#document".to_owned(),
            Some(NodeData::Text(_)) => "#text".to_owned(),
            Some(NodeData::Comment(_)) => "#comment".to_owned(),
            None => format!("unknown node {id}"),
        }
    }

    fn check(&self, id: NodeId) -> Result<(), DomError> {
        if self.exists(id) {
            Ok(())
        } else {
            Err(DomError::UnknownNode {
                message: format!("{id} does not belong to this document").into(),
                context: None,
            })
        }
    }

    fn check_container(&self, id: NodeId) -> Result<(), DomError> {
        self.check(id)?;
        match self.nodes[id.index()].data {
            NodeData::Document | NodeData::Element(_) => Ok(()),
            _ => Err(DomError::Hierarchy {
                message: format!("{id} cannot have children").into(),
                context: None,
            }),
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element, DomError> {
        self.check(id)?;
        match &mut self.nodes[id.index()].data {
            NodeData::Element(element) => Ok(element),
            _ => Err(DomError::Hierarchy {
                message: format!("{id} is not an element").into(),
                context: None,
            }),
        }
    }

    pub(crate) fn element_data_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(id.index())?.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Links an orphan under `parent` without validation.
    pub(crate) fn link(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    fn unlink(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.index()].parent.take() {
            self.nodes[parent.index()].children.retain(|&child| child != node);
        }
    }
}

/// Pre-order iterator returned by [`Document::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack.extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Document {
        Document::parse(
            r#"<div id="a"><p class="x y">one</p><!-- note --><span>two</span></div><div id="b"></div>"#,
        )
        .unwrap()
    }

    #[test]
    fn preorder_walk_includes_scope() {
        let doc = page();
        let a = doc.children(doc.root())[0];
        let tags: Vec<_> = doc.elements(a).filter_map(|id| doc.tag_name(id)).collect();
        assert_eq!(tags, ["div", "p", "span"]);
    }

    #[test]
    fn append_child_moves_node() {
        let mut doc = page();
        let [a, b] = [doc.children(doc.root())[0], doc.children(doc.root())[1]];
        let p = doc.children(a)[0];

        doc.append_child(b, p).unwrap();

        assert_eq!(doc.parent(p), Some(b));
        assert!(!doc.children(a).contains(&p));
        assert_eq!(doc.children(b), [p]);
    }

    #[test]
    fn append_child_rejects_cycles() {
        let mut doc = page();
        let a = doc.children(doc.root())[0];
        let p = doc.children(a)[0];

        assert!(matches!(doc.append_child(p, a), Err(DomError::Hierarchy { .. })));
        assert!(matches!(doc.append_child(a, a), Err(DomError::Hierarchy { .. })));
        assert!(matches!(doc.append_child(a, doc.root()), Err(DomError::Hierarchy { .. })));
    }

    #[test]
    fn text_nodes_cannot_hold_children() {
        let mut doc = Document::new();
        let text = doc.create_text("t");
        let div = doc.create_element("div");
        assert!(matches!(doc.append_child(text, div), Err(DomError::Hierarchy { .. })));
    }

    #[test]
    fn detached_nodes_stay_readable() {
        let mut doc = page();
        let a = doc.children(doc.root())[0];
        let p = doc.children(a)[0];

        doc.detach(a).unwrap();

        assert!(!doc.is_connected(a));
        assert!(!doc.is_connected(p));
        assert_eq!(doc.text_content(p), "one");
        assert!(doc.detach(doc.root()).is_err());
    }

    #[test]
    fn attributes_are_case_insensitive() {
        let mut doc = Document::parse(r#"<div Data-Role="main"></div>"#).unwrap();
        let div = doc.children(doc.root())[0];

        assert_eq!(doc.attribute(div, "data-role"), Some("main"));
        assert_eq!(doc.set_attribute(div, "DATA-ROLE", "aside").unwrap().as_deref(), Some("main"));
        assert_eq!(doc.attribute(div, "data-role"), Some("aside"));
        assert_eq!(doc.remove_attribute(div, "data-role").as_deref(), Some("aside"));
        assert!(!doc.has_attribute(div, "data-role"));
    }

    #[test]
    fn set_attribute_on_text_fails() {
        let mut doc = Document::new();
        let text = doc.create_text("t");
        assert!(matches!(doc.set_attribute(text, "a", "b"), Err(DomError::Hierarchy { .. })));
        assert!(matches!(
            doc.set_attribute(NodeId::new(99), "a", "b"),
            Err(DomError::UnknownNode { .. })
        ));
    }

    #[test]
    fn set_inner_markup_replaces_children() {
        let mut doc = page();
        let a = doc.children(doc.root())[0];
        let old = doc.children(a).to_vec();

        let new = doc.set_inner_markup(a, "<b>bold</b> tail").unwrap();

        assert_eq!(doc.children(a), new.as_slice());
        assert_eq!(doc.inner_markup(a), "<b>bold</b> tail");
        assert!(old.iter().all(|&id| doc.parent(id).is_none()));
    }

    #[test]
    fn failed_inner_markup_keeps_old_children() {
        let mut doc = page();
        let a = doc.children(doc.root())[0];
        let before = doc.inner_markup(a);

        assert!(matches!(doc.set_inner_markup(a, "<div class=\"x"), Err(DomError::Markup { .. })));
        assert_eq!(doc.inner_markup(a), before);
    }

    #[test]
    fn describe_labels_elements() {
        let doc = page();
        let a = doc.children(doc.root())[0];
        let p = doc.children(a)[0];
        assert_eq!(doc.describe(a), "<div#a>");
        assert_eq!(doc.describe(p), "<p.x.y>");
        assert_eq!(doc.describe(doc.root()), "#document");
    }
}

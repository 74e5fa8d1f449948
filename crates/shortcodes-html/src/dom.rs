//! Arena-backed document tree.
//!
//! Nodes live in a single `Vec` and refer to each other by [`NodeId`]. Moving
//! a node only rewrites links; cloning allocates a new arena slot. Detached
//! nodes stay in the arena until the document is dropped.

use crate::serializer;

/// Identifier of a node inside a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Element attribute. The value is kept as written in the source (entities
/// are not decoded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name (lower-cased).
    pub name: String,
    /// Raw attribute value.
    pub value: String,
}

impl Attribute {
    /// Create an attribute.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Payload of a tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// Fragment root. Only the node at index 0 has this kind.
    Root,
    /// Element with lower-cased name and ordered attributes.
    Element {
        /// Tag name.
        name: String,
        /// Attributes in source order.
        attrs: Vec<Attribute>,
    },
    /// Text exactly as written in the source, entities included.
    Text(String),
    /// Comment body (without `<!--` and `-->`).
    Comment(String),
    /// Doctype body (without `<!DOCTYPE` and `>`).
    Doctype(String),
    /// Markup written out verbatim.
    Raw(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// HTML fragment tree.
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
    /// Create an empty document containing only the root node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Root)],
        }
    }

    /// The fragment root.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Payload of a node.
    #[must_use]
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    /// Mutable payload of a node.
    pub fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0].data
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(data));
        id
    }

    /// Allocate a detached element.
    pub fn create_element(&mut self, name: impl Into<String>, attrs: Vec<Attribute>) -> NodeId {
        self.alloc(NodeData::Element {
            name: name.into(),
            attrs,
        })
    }

    /// Allocate a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text(text.into()))
    }

    /// Allocate a detached comment node.
    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Comment(text.into()))
    }

    /// Allocate a detached doctype node.
    pub fn create_doctype(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Doctype(text.into()))
    }

    /// Allocate a detached node that is serialized verbatim.
    pub fn create_raw(&mut self, markup: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Raw(markup.into()))
    }

    /// Parent of a node, `None` for the root and detached nodes.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Children of a node in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    fn position(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let index = self.children(parent).iter().position(|&c| c == id)?;
        Some((parent, index))
    }

    /// Sibling immediately after `id`.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.position(id)?;
        self.children(parent).get(index + 1).copied()
    }

    /// Remove a node (and its subtree) from its parent.
    pub fn detach(&mut self, id: NodeId) {
        if let Some((parent, index)) = self.position(id) {
            self.nodes[parent.0].children.remove(index);
        }
        self.nodes[id.0].parent = None;
    }

    /// Move `child` to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Move `node` so it directly precedes `reference`.
    ///
    /// No-op when `reference` has no parent.
    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) {
        if reference == node || self.parent(reference).is_none() {
            return;
        }
        self.detach(node);
        if let Some((parent, index)) = self.position(reference) {
            self.nodes[node.0].parent = Some(parent);
            self.nodes[parent.0].children.insert(index, node);
        }
    }

    /// Move `node` so it directly follows `reference`.
    ///
    /// No-op when `reference` has no parent.
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) {
        if reference == node || self.parent(reference).is_none() {
            return;
        }
        self.detach(node);
        if let Some((parent, index)) = self.position(reference) {
            self.nodes[node.0].parent = Some(parent);
            self.nodes[parent.0].children.insert(index + 1, node);
        }
    }

    /// Allocate a detached copy of a node without its children.
    pub fn shallow_clone(&mut self, id: NodeId) -> NodeId {
        let data = self.nodes[id.0].data.clone();
        self.alloc(data)
    }

    /// Deep-copy `node` of `other` into this arena, returning the detached copy.
    pub fn import(&mut self, other: &Document, node: NodeId) -> NodeId {
        let copy = self.alloc(other.data(node).clone());
        for &child in other.children(node) {
            let child_copy = self.import(other, child);
            self.append_child(copy, child_copy);
        }
        copy
    }

    /// Deep-copy every top-level node of `other`, returning the detached copies
    /// in order.
    pub fn import_fragment(&mut self, other: &Document) -> Vec<NodeId> {
        other
            .children(other.root())
            .iter()
            .map(|&child| self.import(other, child))
            .collect()
    }

    /// Element name, `None` for non-element nodes.
    #[must_use]
    pub fn element_name(&self, id: NodeId) -> Option<&str> {
        match self.data(id) {
            NodeData::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Attributes of an element (empty for other nodes).
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        match self.data(id) {
            NodeData::Element { attrs, .. } => attrs,
            _ => &[],
        }
    }

    /// Mutable attributes of an element.
    pub fn attributes_mut(&mut self, id: NodeId) -> Option<&mut Vec<Attribute>> {
        match self.data_mut(id) {
            NodeData::Element { attrs, .. } => Some(attrs),
            _ => None,
        }
    }

    /// Value of an attribute.
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Ancestors of a node, nearest first. The node itself is excluded.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), |&n| self.parent(n))
    }

    /// Descendants of a node in document order. The node itself is excluded.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// First attached element, in document order, matching a predicate on
    /// its name and attributes.
    pub fn find_element<F>(&self, mut predicate: F) -> Option<NodeId>
    where
        F: FnMut(&str, &[Attribute]) -> bool,
    {
        self.descendants(self.root())
            .into_iter()
            .find(|&id| match self.data(id) {
                NodeData::Element { name, attrs } => predicate(name, attrs),
                _ => false,
            })
    }

    /// Serialized children of a node.
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            serializer::write_node(self, child, &mut out);
        }
        out
    }

    /// Serialize the whole fragment.
    #[must_use]
    pub fn to_html(&self) -> String {
        serializer::serialize(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn paragraph_with_span() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new();
        let p = doc.create_element("p", Vec::new());
        let root = doc.root();
        doc.append_child(root, p);
        let a = doc.create_text("A");
        doc.append_child(p, a);
        let span = doc.create_element("span", vec![Attribute::new("class", "x")]);
        doc.append_child(p, span);
        let b = doc.create_text("B");
        doc.append_child(span, b);
        (doc, p, span)
    }

    #[test]
    fn test_build_and_serialize() {
        let (doc, _, _) = paragraph_with_span();
        assert_eq!(doc.to_html(), r#"<p>A<span class="x">B</span></p>"#);
    }

    #[test]
    fn test_siblings() {
        let (doc, p, span) = paragraph_with_span();
        let a = doc.children(p)[0];
        assert_eq!(doc.next_sibling(a), Some(span));
        assert_eq!(doc.next_sibling(span), None);
        assert_eq!(doc.next_sibling(doc.root()), None);
    }

    #[test]
    fn test_insert_before_and_after() {
        let (mut doc, p, span) = paragraph_with_span();
        doc.insert_before(p, span);
        assert_eq!(doc.to_html(), r#"<span class="x">B</span><p>A</p>"#);

        doc.insert_after(p, span);
        assert_eq!(doc.to_html(), r#"<p>A</p><span class="x">B</span>"#);
    }

    #[test]
    fn test_insert_next_to_detached_is_noop() {
        let (mut doc, _, span) = paragraph_with_span();
        let lonely = doc.create_element("div", Vec::new());
        doc.insert_after(lonely, span);
        assert_eq!(doc.parent(span).map(|p| doc.element_name(p)), Some(Some("p")));
    }

    #[test]
    fn test_shallow_clone_copies_attributes_only() {
        let (mut doc, _, span) = paragraph_with_span();
        let clone = doc.shallow_clone(span);
        assert_eq!(doc.element_name(clone), Some("span"));
        assert_eq!(doc.attr(clone, "class"), Some("x"));
        assert!(doc.children(clone).is_empty());
        assert!(doc.parent(clone).is_none());
        assert_ne!(clone, span);
    }

    #[test]
    fn test_ancestors_and_detach() {
        let (mut doc, p, span) = paragraph_with_span();
        let ancestors: Vec<_> = doc.ancestors(span).collect();
        assert_eq!(ancestors, vec![p, doc.root()]);

        doc.detach(p);
        assert_eq!(doc.ancestors(span).collect::<Vec<_>>(), vec![p]);
        assert_eq!(doc.to_html(), "");
    }

    #[test]
    fn test_attributes_mut_edits_in_place() {
        let (mut doc, p, span) = paragraph_with_span();
        if let Some(attrs) = doc.attributes_mut(span) {
            attrs[0].value = "y".to_owned();
            attrs.push(Attribute::new("id", "one"));
        }
        assert_eq!(doc.inner_html(p), r#"A<span class="y" id="one">B</span>"#);
        let text = doc.children(p)[0];
        assert!(doc.attributes_mut(text).is_none());
    }

    #[test]
    fn test_find_element_and_inner_html() {
        let (doc, p, span) = paragraph_with_span();
        let found = doc.find_element(|name, attrs| {
            name == "span" && attrs.iter().any(|a| a.value == "x")
        });
        assert_eq!(found, Some(span));
        assert_eq!(doc.inner_html(p), r#"A<span class="x">B</span>"#);
    }

    #[test]
    fn test_import_fragment() {
        let (source, _, _) = paragraph_with_span();
        let mut target = Document::new();
        let copies = target.import_fragment(&source);
        assert_eq!(copies.len(), 1);
        let root = target.root();
        target.append_child(root, copies[0]);
        assert_eq!(target.to_html(), source.to_html());
    }

    #[test]
    fn test_descendants_in_document_order() {
        let (doc, p, span) = paragraph_with_span();
        let a = doc.children(p)[0];
        let b = doc.children(span)[0];
        assert_eq!(doc.descendants(doc.root()), vec![p, a, span, b]);
    }
}

//! Arena-backed document tree.
//!
//! This module provides the structure both conversion directions operate on.
//! Nodes live in a flat vector owned by [`Document`] and are addressed by
//! [`NodeId`]. Every append allocates a fresh node, so each node has exactly
//! one parent and the tree can never contain cycles. Copying, diffing or
//! rebuilding a tree is plain vector work.

use indexmap::IndexMap;

use crate::escape::{escape_attribute, escape_for_import};

/// Tag of the virtual root element
pub const DOCUMENT_TAG: &str = "#document";

/// Void (self-closing) elements, rendered without a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Error raised by tree mutations
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("node {0:?} is a text node and cannot hold children or attributes")]
    NotAnElement(NodeId),

    #[error("node {0:?} does not belong to this document")]
    UnknownNode(NodeId),
}

/// Index of a node inside its [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Element or text payload of a node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Element with lowercase tag name and ordered attributes
    Element {
        tag: String,
        attributes: IndexMap<String, String>,
    },
    /// Text leaf
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A document tree rooted at a virtual `#document` element
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Document {
    /// Create a document holding only the root element
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Element {
                    tag: DOCUMENT_TAG.to_string(),
                    attributes: IndexMap::new(),
                },
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the root has no children
    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    /// Borrow a node, or `None` if the id belongs to another document
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id.0 < self.nodes.len()).then_some(NodeRef { doc: self, id })
    }

    /// Borrow a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this document.
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        assert!(id.0 < self.nodes.len(), "node {id:?} out of bounds");
        NodeRef { doc: self, id }
    }

    /// Borrow the root element
    pub fn root_ref(&self) -> NodeRef<'_> {
        self.node(self.root())
    }

    /// Append a new element under `parent`
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> Result<NodeId, TreeError> {
        self.append_element_with_attrs(parent, tag, std::iter::empty::<(&str, &str)>())
    }

    /// Append a new element with attributes under `parent`
    pub fn append_element_with_attrs<I, K, V>(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: I,
    ) -> Result<NodeId, TreeError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut attributes = IndexMap::new();
        for (name, value) in attrs {
            attributes.insert(name.into(), value.into());
        }

        self.push(
            parent,
            NodeKind::Element {
                tag: tag.to_lowercase(),
                attributes,
            },
        )
    }

    /// Append a new text leaf under `parent`
    pub fn append_text(
        &mut self,
        parent: NodeId,
        content: impl Into<String>,
    ) -> Result<NodeId, TreeError> {
        self.push(parent, NodeKind::Text(content.into()))
    }

    /// Set an attribute, replacing the value in place if the key exists
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), TreeError> {
        let data = self.nodes.get_mut(id.0).ok_or(TreeError::UnknownNode(id))?;
        match &mut data.kind {
            NodeKind::Element { attributes, .. } => {
                attributes.insert(name.to_string(), value.to_string());
                Ok(())
            }
            NodeKind::Text(_) => Err(TreeError::NotAnElement(id)),
        }
    }

    /// Copy the subtree at `id` into a fresh document.
    ///
    /// Copying the root copies all of its children; any other node becomes
    /// the single child of the new root.
    pub fn copy_subtree(&self, id: NodeId) -> Result<Document, TreeError> {
        let source = self.get(id).ok_or(TreeError::UnknownNode(id))?;
        let mut copy = Document::new();
        let root = copy.root();

        if id == self.root() {
            for child in source.children() {
                copy.copy_from(child, root)?;
            }
        } else {
            copy.copy_from(source, root)?;
        }

        Ok(copy)
    }

    /// Graft copies of the root children of `other` under `parent`
    pub fn append_document(&mut self, parent: NodeId, other: &Document) -> Result<(), TreeError> {
        for child in other.root_ref().children() {
            self.copy_from(child, parent)?;
        }
        Ok(())
    }

    /// Render the document as markup
    pub fn to_html(&self) -> String {
        self.root_ref().inner_html()
    }

    fn copy_from(&mut self, source: NodeRef<'_>, parent: NodeId) -> Result<NodeId, TreeError> {
        let id = self.push(parent, source.kind().clone())?;
        for child in source.children() {
            self.copy_from(child, id)?;
        }
        Ok(id)
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> Result<NodeId, TreeError> {
        let parent_data = self.nodes.get(parent.0).ok_or(TreeError::UnknownNode(parent))?;
        if matches!(parent_data.kind, NodeKind::Text(_)) {
            return Err(TreeError::NotAnElement(parent));
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// A borrowed view of one node with access to its neighbours
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &'a NodeKind {
        &self.data().kind
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind(), NodeKind::Element { .. })
    }

    /// Lowercase tag name, or `#text` for text nodes
    pub fn tag_name(&self) -> &'a str {
        match self.kind() {
            NodeKind::Element { tag, .. } => tag.as_str(),
            NodeKind::Text(_) => "#text",
        }
    }

    /// Content of a text node
    pub fn text(&self) -> Option<&'a str> {
        match self.kind() {
            NodeKind::Text(content) => Some(content.as_str()),
            NodeKind::Element { .. } => None,
        }
    }

    /// Get an attribute value by name (case-insensitive)
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        match self.kind() {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn attributes(&self) -> Option<&'a IndexMap<String, String>> {
        match self.kind() {
            NodeKind::Element { attributes, .. } => Some(attributes),
            NodeKind::Text(_) => None,
        }
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.data().parent.map(|id| self.doc.node(id))
    }

    /// Tag name of the parent element, if any
    pub fn parent_tag(&self) -> Option<&'a str> {
        self.parent().map(|p| p.tag_name())
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let doc = self.doc;
        self.data().children.iter().map(move |&id| doc.node(id))
    }

    /// Only element children
    pub fn element_children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.children().filter(|n| n.is_element())
    }

    /// All descendants in document order, excluding this node
    pub fn descendants(&self) -> Descendants<'a> {
        let mut stack = self.data().children.clone();
        stack.reverse();
        Descendants {
            doc: self.doc,
            stack,
        }
    }

    /// 1-based position among the siblings sharing `tag`.
    ///
    /// Returns 1 for the root or when this node does not carry `tag`.
    pub fn index_among(&self, tag: &str) -> usize {
        let Some(parent) = self.parent() else {
            return 1;
        };

        let mut position = 0;
        for sibling in parent.children() {
            if sibling.tag_name() == tag {
                position += 1;
            }
            if sibling.id == self.id {
                return position.max(1);
            }
        }
        1
    }

    /// All text content from this node and descendants
    pub fn text_content(&self) -> String {
        match self.kind() {
            NodeKind::Text(content) => content.clone(),
            NodeKind::Element { .. } => self
                .descendants()
                .filter_map(|n| n.text())
                .collect::<Vec<_>>()
                .concat(),
        }
    }

    /// Reconstruct outer markup
    pub fn outer_html(&self) -> String {
        match self.kind() {
            NodeKind::Text(content) => escape_for_import(content),
            NodeKind::Element { tag, .. } if tag == DOCUMENT_TAG => self.inner_html(),
            NodeKind::Element { tag, attributes } => {
                let mut html = format!("<{tag}");
                for (name, value) in attributes {
                    if value.is_empty() {
                        html.push_str(&format!(" {name}"));
                    } else {
                        html.push_str(&format!(" {name}=\"{}\"", escape_attribute(value)));
                    }
                }
                html.push('>');

                if !VOID_ELEMENTS.contains(&tag.as_str()) {
                    html.push_str(&self.inner_html());
                    html.push_str(&format!("</{tag}>"));
                }
                html
            }
        }
    }

    /// Reconstruct inner markup
    pub fn inner_html(&self) -> String {
        self.children().map(|child| child.outer_html()).collect()
    }

    fn data(&self) -> &'a NodeData {
        &self.doc.nodes[self.id.0]
    }
}

/// Pre-order iterator over a node's descendants
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.doc.node(id);
        self.stack.extend(node.data().children.iter().rev());
        Some(node)
    }
}

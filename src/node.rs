//! The base structural layer and the node-level dispatch table.
//!
//! Every structural facade is built bottom-up: a [`BasicNode`] wraps the
//! handle, [`BasicElement`](crate::element::BasicElement) wraps the node, and
//! so on. Capability traits expose provided methods on top of one accessor
//! per layer, so a concrete facade only forwards the accessors.

use tracing::debug;

use crate::collection;
use crate::document::{AnyDocument, BasicDocument, DocumentFragment};
use crate::element::AnyElement;
use crate::error::{BridgeError, Result};
use crate::host::{FromValue, Handle, Value};
use crate::realm::Realm;
use crate::relation::downcast_from_node;
use crate::tag::{NodeTag, TypeTag};

pub const DOCUMENT_POSITION_DISCONNECTED: u32 = 0x01;
pub const DOCUMENT_POSITION_PRECEDING: u32 = 0x02;
pub const DOCUMENT_POSITION_FOLLOWING: u32 = 0x04;
pub const DOCUMENT_POSITION_CONTAINS: u32 = 0x08;
pub const DOCUMENT_POSITION_CONTAINED_BY: u32 = 0x10;
pub const DOCUMENT_POSITION_IMPLEMENTATION_SPECIFIC: u32 = 0x20;

/// The host's numeric `nodeType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Element,
    Attribute,
    Text,
    CDataSection,
    EntityReference,
    Entity,
    ProcessingInstruction,
    Comment,
    Document,
    DocumentType,
    DocumentFragment,
    Notation,
    Other(u16),
}

impl NodeType {
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => NodeType::Element,
            2 => NodeType::Attribute,
            3 => NodeType::Text,
            4 => NodeType::CDataSection,
            5 => NodeType::EntityReference,
            6 => NodeType::Entity,
            7 => NodeType::ProcessingInstruction,
            8 => NodeType::Comment,
            9 => NodeType::Document,
            10 => NodeType::DocumentType,
            11 => NodeType::DocumentFragment,
            12 => NodeType::Notation,
            other => NodeType::Other(other),
        }
    }

    pub fn code(self) -> u16 {
        match self {
            NodeType::Element => 1,
            NodeType::Attribute => 2,
            NodeType::Text => 3,
            NodeType::CDataSection => 4,
            NodeType::EntityReference => 5,
            NodeType::Entity => 6,
            NodeType::ProcessingInstruction => 7,
            NodeType::Comment => 8,
            NodeType::Document => 9,
            NodeType::DocumentType => 10,
            NodeType::DocumentFragment => 11,
            NodeType::Notation => 12,
            NodeType::Other(code) => code,
        }
    }
}

/// The layer that wraps the handle itself.
#[derive(Debug, Clone)]
pub struct BasicNode {
    handle: Handle,
    realm: Realm,
    tag: TypeTag,
}

impl BasicNode {
    pub(crate) fn new(realm: Realm, handle: Handle, tag: TypeTag) -> Self {
        Self { handle, realm, tag }
    }

    pub(crate) fn from_handle(realm: &Realm, handle: Handle) -> Result<Self> {
        let tag = realm.resolver().tag_of_object(&handle)?;
        Ok(Self::new(realm.clone(), handle, tag))
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    /// The tag this facade was dispatched on.
    pub fn tag(&self) -> &TypeTag {
        &self.tag
    }

    pub(crate) fn read<T: FromValue>(&self, name: &str) -> Result<T> {
        self.handle.get_as(name)
    }

    pub(crate) fn write(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        Ok(self.handle.set(name, value)?)
    }

    pub(crate) fn invoke<T: FromValue>(&self, method: &str, args: &[Value]) -> Result<T> {
        self.handle.call_as(method, args)
    }

    /// A string property the host may report as null.
    pub(crate) fn read_optional_string(&self, name: &str) -> Result<Option<String>> {
        match self.handle.get(name)? {
            Value::Undefined | Value::Null => Ok(None),
            other => String::from_value(other)
                .map(Some)
                .map_err(|found| BridgeError::UnexpectedValue {
                    property: name.to_string(),
                    expected: "string or null",
                    found,
                }),
        }
    }

    pub(crate) fn read_node(&self, name: &str) -> Result<Option<AnyNode>> {
        self.realm.wrap_node(&self.handle.get(name)?)
    }

    pub(crate) fn read_element(&self, name: &str) -> Result<Option<AnyElement>> {
        self.realm.wrap_element(&self.handle.get(name)?)
    }

    pub(crate) fn read_nodes(&self, name: &str) -> Result<Vec<AnyNode>> {
        collection::snapshot_nodes(&self.realm, &self.handle.get(name)?)
    }

    pub(crate) fn read_elements(&self, name: &str) -> Result<Vec<AnyElement>> {
        collection::snapshot_elements(&self.realm, &self.handle.get(name)?)
    }

    pub(crate) fn invoke_elements(&self, method: &str, args: &[Value]) -> Result<Vec<AnyElement>> {
        collection::snapshot_elements(&self.realm, &self.handle.call(method, args)?)
    }

    /// Wrap a method result that must be a node.
    pub(crate) fn invoke_node(&self, method: &str, args: &[Value]) -> Result<AnyNode> {
        let handle: Handle = self.invoke(method, args)?;
        AnyNode::from_handle(&self.realm, handle)
    }
}

/// The base structural capability set.
pub trait Node {
    fn as_node(&self) -> &BasicNode;

    fn handle(&self) -> &Handle {
        self.as_node().handle()
    }

    fn tag(&self) -> &TypeTag {
        self.as_node().tag()
    }

    fn base_uri(&self) -> Result<String> {
        self.as_node().read("baseURI")
    }

    /// The children at this instant. Later host mutation is not reflected.
    fn child_nodes(&self) -> Result<Vec<AnyNode>> {
        self.as_node().read_nodes("childNodes")
    }

    fn first_child(&self) -> Result<Option<AnyNode>> {
        self.as_node().read_node("firstChild")
    }

    fn last_child(&self) -> Result<Option<AnyNode>> {
        self.as_node().read_node("lastChild")
    }

    fn next_sibling(&self) -> Result<Option<AnyNode>> {
        self.as_node().read_node("nextSibling")
    }

    fn previous_sibling(&self) -> Result<Option<AnyNode>> {
        self.as_node().read_node("previousSibling")
    }

    fn node_name(&self) -> Result<String> {
        self.as_node().read("nodeName")
    }

    fn node_type(&self) -> Result<NodeType> {
        self.as_node().read::<u32>("nodeType").map(|code| NodeType::from_code(code as u16))
    }

    /// `None` for elements and documents.
    fn node_value(&self) -> Result<Option<String>> {
        self.as_node().read_optional_string("nodeValue")
    }

    fn set_node_value(&self, value: &str) -> Result<()> {
        self.as_node().write("nodeValue", value)
    }

    fn owner_document(&self) -> Result<Option<AnyDocument>> {
        let node = self.as_node();
        node.realm().wrap_document(&node.handle().get("ownerDocument")?)
    }

    fn parent_node(&self) -> Result<Option<AnyNode>> {
        self.as_node().read_node("parentNode")
    }

    fn parent_element(&self) -> Result<Option<AnyElement>> {
        self.as_node().read_element("parentElement")
    }

    fn text_content(&self) -> Result<String> {
        self.as_node().read("textContent")
    }

    fn set_text_content(&self, text: &str) -> Result<()> {
        self.as_node().write("textContent", text)
    }

    fn is_connected(&self) -> Result<bool> {
        self.as_node().read("isConnected")
    }

    fn append_child(&self, child: &dyn Node) -> Result<()> {
        self.as_node()
            .invoke::<Value>("appendChild", &[Value::from(child.handle())])
            .map(drop)
    }

    fn remove_child(&self, child: &dyn Node) -> Result<()> {
        self.as_node()
            .invoke::<Value>("removeChild", &[Value::from(child.handle())])
            .map(drop)
    }

    fn replace_child(&self, new_child: &dyn Node, old_child: &dyn Node) -> Result<()> {
        self.as_node()
            .invoke::<Value>(
                "replaceChild",
                &[Value::from(new_child.handle()), Value::from(old_child.handle())],
            )
            .map(drop)
    }

    /// Insert before `reference`, or append when it is `None`.
    fn insert_before(&self, new_child: &dyn Node, reference: Option<&dyn Node>) -> Result<()> {
        let reference = reference.map(|node| Value::from(node.handle()));
        self.as_node()
            .invoke::<Value>(
                "insertBefore",
                &[Value::from(new_child.handle()), Value::from(reference)],
            )
            .map(drop)
    }

    fn clone_node(&self, deep: bool) -> Result<AnyNode> {
        self.as_node().invoke_node("cloneNode", &[Value::from(deep)])
    }

    /// A bit set of the `DOCUMENT_POSITION_*` constants.
    fn compare_document_position(&self, other: &dyn Node) -> Result<u32> {
        self.as_node()
            .invoke("compareDocumentPosition", &[Value::from(other.handle())])
    }

    fn contains(&self, other: &dyn Node) -> Result<bool> {
        self.as_node().invoke("contains", &[Value::from(other.handle())])
    }

    fn has_child_nodes(&self) -> Result<bool> {
        self.as_node().invoke("hasChildNodes", &[])
    }

    fn is_default_namespace(&self, namespace: &str) -> Result<bool> {
        self.as_node()
            .invoke("isDefaultNamespace", &[Value::from(namespace)])
    }

    fn is_equal_node(&self, other: &dyn Node) -> Result<bool> {
        self.as_node().invoke("isEqualNode", &[Value::from(other.handle())])
    }

    /// Host identity, without a host call.
    fn is_same_node(&self, other: &dyn Node) -> bool {
        self.handle() == other.handle()
    }

    fn lookup_prefix(&self, namespace: &str) -> Result<Option<String>> {
        let value: Value = self
            .as_node()
            .invoke("lookupPrefix", &[Value::from(namespace)])?;
        optional_string(value, "lookupPrefix()")
    }

    fn lookup_namespace_uri(&self, prefix: Option<&str>) -> Result<Option<String>> {
        let value: Value = self
            .as_node()
            .invoke("lookupNamespaceURI", &[Value::from(prefix)])?;
        optional_string(value, "lookupNamespaceURI()")
    }

    fn normalize(&self) -> Result<()> {
        self.as_node().invoke("normalize", &[])
    }
}

fn optional_string(value: Value, property: &str) -> Result<Option<String>> {
    match value {
        Value::Undefined | Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text)),
        other => Err(BridgeError::UnexpectedValue {
            property: property.to_string(),
            expected: "string or null",
            found: other.kind(),
        }),
    }
}

impl Node for BasicNode {
    fn as_node(&self) -> &BasicNode {
        self
    }
}

/// Shared surface of text and comment nodes.
pub trait CharacterData: Node {
    fn data(&self) -> Result<String> {
        self.as_node().read("data")
    }

    fn set_data(&self, data: &str) -> Result<()> {
        self.as_node().write("data", data)
    }

    /// Length in characters.
    fn length(&self) -> Result<usize> {
        self.as_node().read("length")
    }
}

#[derive(Debug, Clone)]
pub struct Text {
    node: BasicNode,
}

impl Node for Text {
    fn as_node(&self) -> &BasicNode {
        &self.node
    }
}

impl CharacterData for Text {}

#[derive(Debug, Clone)]
pub struct Comment {
    node: BasicNode,
}

impl Node for Comment {
    fn as_node(&self) -> &BasicNode {
        &self.node
    }
}

impl CharacterData for Comment {}

#[derive(Debug, Clone)]
pub struct DocumentType {
    node: BasicNode,
}

impl DocumentType {
    pub fn name(&self) -> Result<String> {
        self.node.read("name")
    }
}

impl Node for DocumentType {
    fn as_node(&self) -> &BasicNode {
        &self.node
    }
}

/// Every node facade the structural dispatch table can produce.
#[derive(Debug, Clone)]
pub enum AnyNode {
    Element(AnyElement),
    Text(Text),
    Comment(Comment),
    Document(AnyDocument),
    DocumentFragment(DocumentFragment),
    DocumentType(DocumentType),
    /// The base layer alone.
    Other(BasicNode),
}

impl AnyNode {
    pub(crate) fn from_handle(realm: &Realm, handle: Handle) -> Result<Self> {
        Self::from_layer(BasicNode::from_handle(realm, handle)?)
    }

    pub(crate) fn from_layer(node: BasicNode) -> Result<Self> {
        let any = match node.tag().node() {
            Some(NodeTag::Node) => AnyNode::Other(node),
            Some(NodeTag::Text) => AnyNode::Text(Text { node }),
            Some(NodeTag::Comment) => AnyNode::Comment(Comment { node }),
            Some(NodeTag::DocumentType) => AnyNode::DocumentType(DocumentType { node }),
            Some(NodeTag::DocumentFragment) => {
                AnyNode::DocumentFragment(DocumentFragment::from_layer(node))
            }
            Some(tag) if tag.is_a(NodeTag::Document) => {
                AnyNode::Document(AnyDocument::from_layer(node))
            }
            Some(tag) if tag.is_a(NodeTag::Element) => {
                AnyNode::Element(AnyElement::from_layer(node)?)
            }
            _ => return Self::fallback(node),
        };
        Ok(any)
    }

    /// Unrecognized tags still get a facade; `nodeType` picks which one.
    fn fallback(node: BasicNode) -> Result<Self> {
        let node_type = match node.handle().get("nodeType")? {
            Value::Number(code) => Some(NodeType::from_code(code as u16)),
            _ => None,
        };
        debug!(target: "dom_facade", tag = %node.tag(), ?node_type, "unrecognized node tag, using a generic facade");
        let any = match node_type {
            Some(NodeType::Element) => AnyNode::Element(AnyElement::fallback(node)?),
            Some(NodeType::Text) => AnyNode::Text(Text { node }),
            Some(NodeType::Comment) => AnyNode::Comment(Comment { node }),
            Some(NodeType::Document) => AnyNode::Document(AnyDocument::Generic(BasicDocument::from_layer(node))),
            Some(NodeType::DocumentFragment) => {
                AnyNode::DocumentFragment(DocumentFragment::from_layer(node))
            }
            Some(NodeType::DocumentType) => AnyNode::DocumentType(DocumentType { node }),
            _ => AnyNode::Other(node),
        };
        Ok(any)
    }

    pub fn as_element(&self) -> Option<&AnyElement> {
        match self {
            AnyNode::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn into_element(self) -> Option<AnyElement> {
        match self {
            AnyNode::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<Text> {
        match self {
            AnyNode::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn into_document(self) -> Option<AnyDocument> {
        match self {
            AnyNode::Document(document) => Some(document),
            _ => None,
        }
    }
}

impl Node for AnyNode {
    fn as_node(&self) -> &BasicNode {
        match self {
            AnyNode::Element(inner) => inner.as_node(),
            AnyNode::Text(inner) => inner.as_node(),
            AnyNode::Comment(inner) => inner.as_node(),
            AnyNode::Document(inner) => inner.as_node(),
            AnyNode::DocumentFragment(inner) => inner.as_node(),
            AnyNode::DocumentType(inner) => inner.as_node(),
            AnyNode::Other(inner) => inner,
        }
    }
}

downcast_from_node!(AnyNode, "Node", node => node);
downcast_from_node!(Text, "Text", AnyNode::Text(text) => text);
downcast_from_node!(Comment, "Comment", AnyNode::Comment(comment) => comment);
downcast_from_node!(DocumentType, "DocumentType", AnyNode::DocumentType(doctype) => doctype);

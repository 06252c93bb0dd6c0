//! Documents and document fragments.

use tracing::debug;

use crate::element::{AnyElement, ParentNode};
use crate::error::{BridgeError, Result};
use crate::host::{Handle, Value};
use crate::html::{
    AnyHtmlElement, HtmlEmbedElement, HtmlFormElement, HtmlHeadElement, HtmlImageElement,
    HtmlScriptElement,
};
use crate::node::{AnyNode, BasicNode, Comment, DocumentType, Node, Text};
use crate::realm::Realm;
use crate::relation::{self, downcast_from_node, Downcast};
use crate::tag::NodeTag;
use crate::window::{Location, Window};

/// Call a character-data factory and narrow the node it returns.
fn created<T: Downcast>(node: &BasicNode, method: &str, data: &str) -> Result<T> {
    let value = node.invoke::<Value>(method, &[Value::from(data)])?;
    let kind = value.kind();
    relation::narrow_value(node.realm(), value, &format!("{method}()"))?.ok_or_else(|| {
        BridgeError::UnexpectedValue {
            property: format!("{method}()"),
            expected: T::EXPECTED,
            found: kind,
        }
    })
}

/// The document layer.
#[derive(Debug, Clone)]
pub struct BasicDocument {
    node: BasicNode,
}

impl BasicDocument {
    pub(crate) fn from_layer(node: BasicNode) -> Self {
        Self { node }
    }
}

impl Node for BasicDocument {
    fn as_node(&self) -> &BasicNode {
        &self.node
    }
}

impl Document for BasicDocument {
    fn as_document(&self) -> &BasicDocument {
        self
    }
}

/// Operations every document supports, HTML or not.
pub trait Document: Node {
    fn as_document(&self) -> &BasicDocument;

    fn document_element(&self) -> Result<Option<AnyElement>> {
        self.as_node().read_element("documentElement")
    }

    fn doctype(&self) -> Result<Option<DocumentType>> {
        let node = self.as_node();
        relation::resolve_related(node.realm(), node.handle(), "doctype")
    }

    fn create_element(&self, local_name: &str) -> Result<AnyElement> {
        let node = self.as_node();
        let handle: Handle = node.invoke("createElement", &[Value::from(local_name)])?;
        AnyElement::from_handle(node.realm(), handle)
    }

    fn create_element_ns(&self, namespace: &str, qualified_name: &str) -> Result<AnyElement> {
        let node = self.as_node();
        let handle: Handle = node.invoke(
            "createElementNS",
            &[Value::from(namespace), Value::from(qualified_name)],
        )?;
        AnyElement::from_handle(node.realm(), handle)
    }

    fn create_text_node(&self, data: &str) -> Result<Text> {
        created(self.as_node(), "createTextNode", data)
    }

    fn create_comment(&self, data: &str) -> Result<Comment> {
        created(self.as_node(), "createComment", data)
    }

    fn create_document_fragment(&self) -> Result<DocumentFragment> {
        let node = self.as_node();
        let handle: Handle = node.invoke("createDocumentFragment", &[])?;
        DocumentFragment::from_handle(node.realm(), handle)
    }

    fn get_element_by_id(&self, id: &str) -> Result<Option<AnyElement>> {
        let node = self.as_node();
        node.realm()
            .wrap_element(&node.handle().call("getElementById", &[Value::from(id)])?)
    }

    fn get_elements_by_name(&self, name: &str) -> Result<Vec<AnyElement>> {
        self.as_node()
            .invoke_elements("getElementsByName", &[Value::from(name)])
    }

    /// A copy of `node` owned by this document.
    fn import_node(&self, node: &dyn Node, deep: bool) -> Result<AnyNode> {
        self.as_node()
            .invoke_node("importNode", &[Value::from(node.handle()), Value::from(deep)])
    }

    /// Moves `node` into this document, detaching it from its parent.
    fn adopt_node(&self, node: &dyn Node) -> Result<AnyNode> {
        self.as_node()
            .invoke_node("adoptNode", &[Value::from(node.handle())])
    }

    fn element_from_point(&self, x: f64, y: f64) -> Result<Option<AnyElement>> {
        let node = self.as_node();
        node.realm().wrap_element(
            &node
                .handle()
                .call("elementFromPoint", &[Value::from(x), Value::from(y)])?,
        )
    }

    fn url(&self) -> Result<String> {
        self.as_node().read("URL")
    }

    fn character_set(&self) -> Result<String> {
        self.as_node().read("characterSet")
    }

    fn content_type(&self) -> Result<String> {
        self.as_node().read("contentType")
    }

    /// `"loading"`, `"interactive"` or `"complete"`.
    fn ready_state(&self) -> Result<String> {
        self.as_node().read("readyState")
    }
}

/// A document holding an HTML tree.
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    document: BasicDocument,
}

impl HtmlDocument {
    pub(crate) fn from_layer(document: BasicDocument) -> Self {
        Self { document }
    }

    fn related<T: Downcast>(&self, relationship: &str) -> Result<Option<T>> {
        let node = self.as_node();
        relation::resolve_related(node.realm(), node.handle(), relationship)
    }

    fn related_all<T: Downcast>(&self, relationship: &str) -> Result<Vec<T>> {
        let node = self.as_node();
        relation::resolve_related_all(node.realm(), node.handle(), relationship)
    }

    /// The focused element, or the body when nothing is focused.
    pub fn active_element(&self) -> Result<Option<AnyHtmlElement>> {
        self.related("activeElement")
    }

    /// The `<body>`, or the `<frameset>` of a frameset document.
    pub fn body(&self) -> Result<Option<AnyHtmlElement>> {
        self.related("body")
    }

    pub fn head(&self) -> Result<Option<HtmlHeadElement>> {
        self.related("head")
    }

    pub fn forms(&self) -> Result<Vec<HtmlFormElement>> {
        self.related_all("forms")
    }

    pub fn images(&self) -> Result<Vec<HtmlImageElement>> {
        self.related_all("images")
    }

    /// Anchors and areas with an `href`.
    pub fn links(&self) -> Result<Vec<AnyHtmlElement>> {
        self.related_all("links")
    }

    pub fn plugins(&self) -> Result<Vec<HtmlEmbedElement>> {
        self.related_all("plugins")
    }

    pub fn scripts(&self) -> Result<Vec<HtmlScriptElement>> {
        self.related_all("scripts")
    }

    pub fn cookie(&self) -> Result<String> {
        self.as_node().read("cookie")
    }

    pub fn set_cookie(&self, cookie: &str) -> Result<()> {
        self.as_node().write("cookie", cookie)
    }

    pub fn design_mode(&self) -> Result<String> {
        self.as_node().read("designMode")
    }

    pub fn set_design_mode(&self, mode: &str) -> Result<()> {
        self.as_node().write("designMode", mode)
    }

    pub fn domain(&self) -> Result<String> {
        self.as_node().read("domain")
    }

    pub fn referrer(&self) -> Result<String> {
        self.as_node().read("referrer")
    }

    pub fn title(&self) -> Result<String> {
        self.as_node().read("title")
    }

    pub fn set_title(&self, title: &str) -> Result<()> {
        self.as_node().write("title", title)
    }

    pub fn location(&self) -> Result<Option<Location>> {
        let location: Option<Handle> = self.as_node().read("location")?;
        Ok(location.map(Location::new))
    }

    pub fn default_view(&self) -> Result<Option<Window>> {
        let node = self.as_node();
        let window: Option<Handle> = node.read("defaultView")?;
        Ok(window.map(|handle| Window::new(node.realm().clone(), handle)))
    }

    pub fn has_focus(&self) -> Result<bool> {
        self.as_node().invoke("hasFocus", &[])
    }
}

impl Node for HtmlDocument {
    fn as_node(&self) -> &BasicNode {
        self.document.as_node()
    }
}

impl Document for HtmlDocument {
    fn as_document(&self) -> &BasicDocument {
        &self.document
    }
}

/// Every document facade the dispatch table can produce.
#[derive(Debug, Clone)]
pub enum AnyDocument {
    Html(HtmlDocument),
    Generic(BasicDocument),
}

impl AnyDocument {
    pub(crate) fn from_handle(realm: &Realm, handle: Handle) -> Result<Self> {
        Ok(Self::from_layer(BasicNode::from_handle(realm, handle)?))
    }

    pub(crate) fn from_layer(node: BasicNode) -> Self {
        let document = BasicDocument::from_layer(node);
        match document.tag().node() {
            Some(NodeTag::HtmlDocument) => AnyDocument::Html(HtmlDocument::from_layer(document)),
            Some(NodeTag::Document) => AnyDocument::Generic(document),
            _ => {
                debug!(target: "dom_facade", tag = %document.tag(), "unexpected document tag, using a generic facade");
                AnyDocument::Generic(document)
            }
        }
    }

    pub fn as_html(&self) -> Option<&HtmlDocument> {
        match self {
            AnyDocument::Html(html) => Some(html),
            AnyDocument::Generic(_) => None,
        }
    }

    pub fn into_html(self) -> Option<HtmlDocument> {
        match self {
            AnyDocument::Html(html) => Some(html),
            AnyDocument::Generic(_) => None,
        }
    }
}

impl Node for AnyDocument {
    fn as_node(&self) -> &BasicNode {
        self.as_document().as_node()
    }
}

impl Document for AnyDocument {
    fn as_document(&self) -> &BasicDocument {
        match self {
            AnyDocument::Html(html) => html.as_document(),
            AnyDocument::Generic(document) => document,
        }
    }
}

/// A parentless container for building subtrees.
#[derive(Debug, Clone)]
pub struct DocumentFragment {
    node: BasicNode,
}

impl DocumentFragment {
    pub(crate) fn from_layer(node: BasicNode) -> Self {
        Self { node }
    }

    pub(crate) fn from_handle(realm: &Realm, handle: Handle) -> Result<Self> {
        Ok(Self::from_layer(BasicNode::from_handle(realm, handle)?))
    }

    pub fn get_element_by_id(&self, id: &str) -> Result<Option<AnyElement>> {
        self.node
            .realm()
            .wrap_element(&self.node.handle().call("getElementById", &[Value::from(id)])?)
    }
}

impl Node for DocumentFragment {
    fn as_node(&self) -> &BasicNode {
        &self.node
    }
}

impl ParentNode for BasicDocument {}
impl ParentNode for HtmlDocument {}
impl ParentNode for AnyDocument {}
impl ParentNode for DocumentFragment {}

downcast_from_node!(AnyDocument, "Document", AnyNode::Document(document) => document);
downcast_from_node!(HtmlDocument, "HTMLDocument", AnyNode::Document(AnyDocument::Html(document)) => document);
downcast_from_node!(DocumentFragment, "DocumentFragment", AnyNode::DocumentFragment(fragment) => fragment);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;
    use crate::element::Element;
    use crate::host::memory::MemoryHost;
    use crate::html::HtmlElement;

    fn document(host: &MemoryHost) -> HtmlDocument {
        let realm = Realm::new(host.global(), BridgeConfig::default());
        match realm.document().unwrap() {
            Some(AnyDocument::Html(document)) => document,
            other => panic!("expected an HTML document, got {other:?}"),
        }
    }

    #[test]
    fn html_documents_expose_their_structure() {
        let host = MemoryHost::from_html(
            r#"<!DOCTYPE html><html><head><title>Home</title></head>
               <body><form id="a"></form><img src="x.png"><a href="/x">x</a><form id="b"></form></body></html>"#,
        )
        .unwrap();
        let document = document(&host);
        assert_eq!(document.title().unwrap(), "Home");
        assert_eq!(document.doctype().unwrap().unwrap().name().unwrap(), "html");
        assert_eq!(document.body().unwrap().unwrap().tag_name().unwrap(), "BODY");
        assert!(document.head().unwrap().is_some());

        let forms = document.forms().unwrap();
        let ids: Vec<String> = forms.iter().map(|form| form.id().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(document.images().unwrap().len(), 1);
        assert_eq!(document.links().unwrap().len(), 1);
        assert!(document.scripts().unwrap().is_empty());
        assert_eq!(document.ready_state().unwrap(), "complete");
        assert_eq!(document.character_set().unwrap(), "UTF-8");

        let root = document.document_element().unwrap().unwrap();
        assert_eq!(root.local_name().unwrap(), "html");
    }

    #[test]
    fn factories_wrap_what_they_create() {
        let host = MemoryHost::new();
        let document = document(&host);
        let element = document.create_element("section").unwrap();
        assert!(element.as_html().is_some());
        let svg = document
            .create_element_ns(crate::element::SVG_NAMESPACE, "svg:rect")
            .unwrap();
        assert!(matches!(svg, AnyElement::Svg(_)));

        let text = document.create_text_node("hello").unwrap();
        let fragment = document.create_document_fragment().unwrap();
        fragment.append_child(&element).unwrap();
        element.append_child(&text).unwrap();
        assert_eq!(fragment.child_element_count().unwrap(), 1);
        assert_eq!(fragment.text_content().unwrap(), "hello");

        let body = document.body().unwrap().unwrap();
        body.append_child(&fragment).unwrap();
        assert_eq!(fragment.child_element_count().unwrap(), 0);
        assert!(body.contains(&text).unwrap());

        assert!(document.create_element("not valid").is_err());
        assert!(document.create_comment("note").is_ok());
    }

    #[test]
    fn import_copies_and_adopt_moves() {
        let host = MemoryHost::from_html("<body><p id=p>text</p></body>").unwrap();
        let document = document(&host);
        let paragraph = document.get_element_by_id("p").unwrap().unwrap();

        let copy = document.import_node(&paragraph, true).unwrap();
        assert!(!copy.is_same_node(&paragraph));
        assert_eq!(copy.text_content().unwrap(), "text");
        assert!(paragraph.is_connected().unwrap());

        let adopted = document.adopt_node(&paragraph).unwrap();
        assert!(adopted.is_same_node(&paragraph));
        assert!(!paragraph.is_connected().unwrap());
        assert!(document.get_element_by_id("p").unwrap().is_none());

        assert!(document.import_node(&document, false).is_err());
    }

    #[test]
    fn writable_document_properties_round_trip() {
        let host = MemoryHost::new();
        host.set_url("https://example.com/start").unwrap();
        let document = document(&host);
        document.set_title("Renamed").unwrap();
        assert_eq!(document.title().unwrap(), "Renamed");
        document.set_cookie("a=1").unwrap();
        assert_eq!(document.cookie().unwrap(), "a=1");
        assert_eq!(document.domain().unwrap(), "example.com");
        assert_eq!(document.url().unwrap(), "https://example.com/start");
        assert!(document.has_focus().unwrap());

        let active = document.active_element().unwrap().unwrap();
        assert!(matches!(active, AnyHtmlElement::Body(_)));
        assert!(active.hidden().is_ok());
        assert!(document.default_view().unwrap().is_some());
    }
}

//! The element layer, the parent-node surface, and element dispatch.

use std::collections::HashMap;

use tracing::debug;

use crate::collection;
use crate::error::Result;
use crate::host::{Handle, Value};
use crate::html::{AnyHtmlElement, BasicHtmlElement};
use crate::node::{BasicNode, Node};
use crate::realm::Realm;
use crate::relation::downcast_from_node;
use crate::tag::NodeTag;
use crate::token_list::TokenList;

pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// A `DOMRect` read out of the host.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DomRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl DomRect {
    fn from_handle(rect: &Handle) -> Result<Self> {
        Ok(Self {
            x: rect.get_as("x")?,
            y: rect.get_as("y")?,
            width: rect.get_as("width")?,
            height: rect.get_as("height")?,
            top: rect.get_as("top")?,
            right: rect.get_as("right")?,
            bottom: rect.get_as("bottom")?,
            left: rect.get_as("left")?,
        })
    }
}

/// Children and queries, shared by elements, documents and fragments.
pub trait ParentNode: Node {
    fn children(&self) -> Result<Vec<AnyElement>> {
        self.as_node().read_elements("children")
    }

    fn first_element_child(&self) -> Result<Option<AnyElement>> {
        self.as_node().read_element("firstElementChild")
    }

    fn last_element_child(&self) -> Result<Option<AnyElement>> {
        self.as_node().read_element("lastElementChild")
    }

    fn child_element_count(&self) -> Result<usize> {
        self.as_node().read("childElementCount")
    }

    fn query_selector(&self, selectors: &str) -> Result<Option<AnyElement>> {
        let node = self.as_node();
        let found = node.invoke::<Value>("querySelector", &[Value::from(selectors)])?;
        node.realm().wrap_element(&found)
    }

    fn query_selector_all(&self, selectors: &str) -> Result<Vec<AnyElement>> {
        self.as_node()
            .invoke_elements("querySelectorAll", &[Value::from(selectors)])
    }

    fn get_elements_by_class_name(&self, names: &str) -> Result<Vec<AnyElement>> {
        self.as_node()
            .invoke_elements("getElementsByClassName", &[Value::from(names)])
    }

    fn get_elements_by_tag_name(&self, name: &str) -> Result<Vec<AnyElement>> {
        self.as_node()
            .invoke_elements("getElementsByTagName", &[Value::from(name)])
    }

    fn get_elements_by_tag_name_ns(&self, namespace: &str, name: &str) -> Result<Vec<AnyElement>> {
        self.as_node().invoke_elements(
            "getElementsByTagNameNS",
            &[Value::from(namespace), Value::from(name)],
        )
    }
}

#[derive(Debug, Clone)]
pub struct BasicElement {
    node: BasicNode,
}

impl BasicElement {
    pub(crate) fn from_layer(node: BasicNode) -> Self {
        Self { node }
    }
}

impl Node for BasicElement {
    fn as_node(&self) -> &BasicNode {
        &self.node
    }
}

impl Element for BasicElement {
    fn as_element(&self) -> &BasicElement {
        self
    }
}

/// The element capability set.
pub trait Element: Node {
    fn as_element(&self) -> &BasicElement;

    /// Attribute names to values, as of now.
    fn attributes(&self) -> Result<HashMap<String, String>> {
        let node = self.as_node();
        let map = node.handle().get("attributes")?;
        collection::snapshot(node.realm(), &map, |attribute| {
            Ok((attribute.get_as("name")?, attribute.get_as("value")?))
        })
        .map(|pairs| pairs.into_iter().collect())
    }

    /// The class list, reading and writing through `className`.
    fn class_list(&self) -> Result<TokenList> {
        let node = self.as_node();
        let list: Handle = node.read("classList")?;
        Ok(TokenList::new(
            node.realm().clone(),
            list,
            node.handle().clone(),
            Some("className"),
        ))
    }

    fn class_name(&self) -> Result<String> {
        self.as_node().read("className")
    }

    fn set_class_name(&self, class_name: &str) -> Result<()> {
        self.as_node().write("className", class_name)
    }

    fn id(&self) -> Result<String> {
        self.as_node().read("id")
    }

    fn set_id(&self, id: &str) -> Result<()> {
        self.as_node().write("id", id)
    }

    fn tag_name(&self) -> Result<String> {
        self.as_node().read("tagName")
    }

    fn local_name(&self) -> Result<String> {
        self.as_node().read("localName")
    }

    fn namespace_uri(&self) -> Result<Option<String>> {
        self.as_node().read_optional_string("namespaceURI")
    }

    fn get_attribute(&self, name: &str) -> Result<Option<String>> {
        let value: Value = self.as_node().invoke("getAttribute", &[Value::from(name)])?;
        Ok(match value {
            Value::String(text) => Some(text),
            _ => None,
        })
    }

    fn get_attribute_ns(&self, namespace: &str, name: &str) -> Result<Option<String>> {
        let value: Value = self
            .as_node()
            .invoke("getAttributeNS", &[Value::from(namespace), Value::from(name)])?;
        Ok(match value {
            Value::String(text) => Some(text),
            _ => None,
        })
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<()> {
        self.as_node()
            .invoke("setAttribute", &[Value::from(name), Value::from(value)])
    }

    fn set_attribute_ns(&self, namespace: &str, name: &str, value: &str) -> Result<()> {
        self.as_node().invoke(
            "setAttributeNS",
            &[Value::from(namespace), Value::from(name), Value::from(value)],
        )
    }

    fn has_attribute(&self, name: &str) -> Result<bool> {
        self.as_node().invoke("hasAttribute", &[Value::from(name)])
    }

    fn has_attribute_ns(&self, namespace: &str, name: &str) -> Result<bool> {
        self.as_node()
            .invoke("hasAttributeNS", &[Value::from(namespace), Value::from(name)])
    }

    fn remove_attribute(&self, name: &str) -> Result<()> {
        self.as_node().invoke("removeAttribute", &[Value::from(name)])
    }

    fn remove_attribute_ns(&self, namespace: &str, name: &str) -> Result<()> {
        self.as_node()
            .invoke("removeAttributeNS", &[Value::from(namespace), Value::from(name)])
    }

    fn get_bounding_client_rect(&self) -> Result<DomRect> {
        let rect: Handle = self.as_node().invoke("getBoundingClientRect", &[])?;
        DomRect::from_handle(&rect)
    }

    fn inner_html(&self) -> Result<String> {
        self.as_node().read("innerHTML")
    }

    fn set_inner_html(&self, html: &str) -> Result<()> {
        self.as_node().write("innerHTML", html)
    }

    fn outer_html(&self) -> Result<String> {
        self.as_node().read("outerHTML")
    }

    fn set_outer_html(&self, html: &str) -> Result<()> {
        self.as_node().write("outerHTML", html)
    }

    fn previous_element_sibling(&self) -> Result<Option<AnyElement>> {
        self.as_node().read_element("previousElementSibling")
    }

    fn next_element_sibling(&self) -> Result<Option<AnyElement>> {
        self.as_node().read_element("nextElementSibling")
    }

    fn matches(&self, selectors: &str) -> Result<bool> {
        self.as_node().invoke("matches", &[Value::from(selectors)])
    }

    fn closest(&self, selectors: &str) -> Result<Option<AnyElement>> {
        let node = self.as_node();
        let found = node.invoke::<Value>("closest", &[Value::from(selectors)])?;
        node.realm().wrap_element(&found)
    }

    /// Detach from the parent, if any.
    fn remove(&self) -> Result<()> {
        self.as_node().invoke("remove", &[])
    }
}

impl<T: Element + ?Sized> ParentNode for T {}

#[derive(Debug, Clone)]
pub struct SvgElement {
    element: BasicElement,
}

impl Node for SvgElement {
    fn as_node(&self) -> &BasicNode {
        self.element.as_node()
    }
}

impl Element for SvgElement {
    fn as_element(&self) -> &BasicElement {
        &self.element
    }
}

/// Every element facade the dispatch table can produce.
#[derive(Debug, Clone)]
pub enum AnyElement {
    Html(AnyHtmlElement),
    Svg(SvgElement),
    /// Elements in any other namespace.
    Other(BasicElement),
}

impl AnyElement {
    pub(crate) fn from_handle(realm: &Realm, handle: Handle) -> Result<Self> {
        Self::from_layer(BasicNode::from_handle(realm, handle)?)
    }

    pub(crate) fn from_layer(node: BasicNode) -> Result<Self> {
        let any = match node.tag().node() {
            Some(NodeTag::Element) => AnyElement::Other(BasicElement::from_layer(node)),
            Some(NodeTag::SvgElement) => AnyElement::Svg(SvgElement {
                element: BasicElement::from_layer(node),
            }),
            Some(tag) if tag.is_a(NodeTag::HtmlElement) => {
                AnyElement::Html(AnyHtmlElement::from_layer(BasicHtmlElement::from_layer(
                    BasicElement::from_layer(node),
                )))
            }
            _ => return Self::fallback(node),
        };
        Ok(any)
    }

    /// Unrecognized tags are sorted by namespace; no namespace counts as HTML.
    pub(crate) fn fallback(node: BasicNode) -> Result<Self> {
        let namespace = node.read_optional_string("namespaceURI")?;
        debug!(target: "dom_facade", tag = %node.tag(), ?namespace, "unrecognized element tag, using a generic facade");
        let element = BasicElement::from_layer(node);
        let any = match namespace.as_deref() {
            None | Some("") | Some(HTML_NAMESPACE) => {
                AnyElement::Html(AnyHtmlElement::Generic(BasicHtmlElement::from_layer(element)))
            }
            Some(SVG_NAMESPACE) => AnyElement::Svg(SvgElement { element }),
            Some(_) => AnyElement::Other(element),
        };
        Ok(any)
    }

    pub fn as_html(&self) -> Option<&AnyHtmlElement> {
        match self {
            AnyElement::Html(html) => Some(html),
            _ => None,
        }
    }

    pub fn into_html(self) -> Option<AnyHtmlElement> {
        match self {
            AnyElement::Html(html) => Some(html),
            _ => None,
        }
    }
}

impl Node for AnyElement {
    fn as_node(&self) -> &BasicNode {
        match self {
            AnyElement::Html(inner) => inner.as_node(),
            AnyElement::Svg(inner) => inner.as_node(),
            AnyElement::Other(inner) => inner.as_node(),
        }
    }
}

impl Element for AnyElement {
    fn as_element(&self) -> &BasicElement {
        match self {
            AnyElement::Html(inner) => inner.as_element(),
            AnyElement::Svg(inner) => inner.as_element(),
            AnyElement::Other(inner) => inner,
        }
    }
}

downcast_from_node!(AnyElement, "Element", crate::node::AnyNode::Element(element) => element);
downcast_from_node!(
    SvgElement,
    "SVGElement",
    crate::node::AnyNode::Element(AnyElement::Svg(svg)) => svg
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;
    use crate::host::memory::MemoryHost;

    fn element(host: &MemoryHost, html: &str) -> AnyElement {
        let realm = Realm::new(host.global(), BridgeConfig::default());
        let container = host.create_element("div");
        container.set("innerHTML", html).unwrap();
        realm
            .wrap_element(&container.get("firstElementChild").unwrap())
            .unwrap()
            .unwrap()
    }

    #[test]
    fn attributes_are_snapshotted_into_a_map() {
        let host = MemoryHost::new();
        let link = element(&host, r#"<a href="/x" title="t">x</a>"#);
        let attributes = link.attributes().unwrap();
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes["href"], "/x");
        link.set_attribute("title", "changed").unwrap();
        assert_eq!(attributes["title"], "t");
        assert_eq!(link.get_attribute("title").unwrap().as_deref(), Some("changed"));
        assert_eq!(link.get_attribute("missing").unwrap(), None);
        link.remove_attribute("title").unwrap();
        assert!(!link.has_attribute("title").unwrap());
    }

    #[test]
    fn queries_wrap_their_results() {
        let host = MemoryHost::new();
        let list = element(&host, r#"<ul><li class="a">1</li><li class="a b">2</li></ul>"#);
        let items = list.query_selector_all("li.a").unwrap();
        assert_eq!(items.len(), 2);
        let second = list.query_selector(".b").unwrap().unwrap();
        assert!(second.matches("li").unwrap());
        assert!(second.closest("ul").unwrap().unwrap().is_same_node(&list));
        assert!(second
            .previous_element_sibling()
            .unwrap()
            .unwrap()
            .is_same_node(&items[0]));
        assert!(list.query_selector("p").unwrap().is_none());
        assert_eq!(list.get_elements_by_class_name("b").unwrap().len(), 1);
        assert_eq!(list.child_element_count().unwrap(), 2);
    }

    #[test]
    fn svg_elements_dispatch_by_descriptor() {
        let host = MemoryHost::new();
        let svg = element(&host, "<svg><circle></circle></svg>");
        assert!(matches!(svg, AnyElement::Svg(_)));
        assert_eq!(svg.namespace_uri().unwrap().as_deref(), Some(SVG_NAMESPACE));
    }

    #[test]
    fn bounding_rect_reads_every_edge() {
        let host = MemoryHost::new();
        let div = element(&host, "<div></div>");
        div.handle().set("offsetLeft", 10.0).unwrap();
        div.handle().set("offsetWidth", 5.0).unwrap();
        let rect = div.get_bounding_client_rect().unwrap();
        assert_eq!(rect.left, 10.0);
        assert_eq!(rect.right, 15.0);
        assert_eq!(rect.height, 0.0);
    }
}

//! The HTML element layer and its dispatch table.
//!
//! [`BasicHtmlElement`] is the third structural layer. Each concrete
//! interface gets its own struct holding the layer (or an intermediate layer
//! such as [`HtmlMediaElement`]) plus any side-by-side capability such as
//! [`UrlUtils`](crate::url_utils::UrlUtils), and forwards the capability
//! accessors explicitly.

use std::collections::HashMap;

use tracing::debug;

use crate::element::{AnyElement, BasicElement, Element};
use crate::error::Result;
use crate::host::{Handle, Value};
use crate::node::{AnyNode, BasicNode, Node};
use crate::realm::Realm;
use crate::relation::{self, Downcast};
use crate::tag::{NodeTag, TypeTag};

/// Forward the three structural accessors of a concrete facade to the
/// field holding its HTML layer.
macro_rules! html_layers {
    ($ty:ident, $($path:ident).+) => {
        impl $crate::node::Node for $ty {
            fn as_node(&self) -> &$crate::node::BasicNode {
                $crate::node::Node::as_node(&self.$($path).+)
            }
        }

        impl $crate::element::Element for $ty {
            fn as_element(&self) -> &$crate::element::BasicElement {
                $crate::element::Element::as_element(&self.$($path).+)
            }
        }

        impl $crate::html::HtmlElement for $ty {
            fn as_html_element(&self) -> &$crate::html::BasicHtmlElement {
                $crate::html::HtmlElement::as_html_element(&self.$($path).+)
            }
        }
    };
}

/// A concrete facade with nothing beyond the HTML layer and its own
/// reflected properties.
macro_rules! html_element {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            html: $crate::html::BasicHtmlElement,
        }

        impl $name {
            pub(crate) fn from_layer(html: $crate::html::BasicHtmlElement) -> Self {
                Self { html }
            }
        }

        html_layers!($name, html);
    };
}

/// Getters (and optional setters) for properties the host reflects from
/// content attributes.
macro_rules! reflect {
    ($($getter:ident $(/ $setter:ident)? : $ty:ty = $prop:literal;)*) => {
        $(
            pub fn $getter(&self) -> $crate::error::Result<$ty> {
                $crate::node::Node::as_node(self).read($prop)
            }

            $(
                pub fn $setter(&self, value: impl Into<$ty>) -> $crate::error::Result<()> {
                    let value: $ty = value.into();
                    $crate::node::Node::as_node(self).write($prop, value)
                }
            )?
        )*
    };
}

mod content;
mod form;
mod link;
mod media;
mod table;

pub use content::*;
pub use form::*;
pub use link::*;
pub use media::*;
pub use table::*;

#[derive(Debug, Clone)]
pub struct BasicHtmlElement {
    element: BasicElement,
}

impl BasicHtmlElement {
    pub(crate) fn from_layer(element: BasicElement) -> Self {
        Self { element }
    }
}

impl Node for BasicHtmlElement {
    fn as_node(&self) -> &BasicNode {
        self.element.as_node()
    }
}

impl Element for BasicHtmlElement {
    fn as_element(&self) -> &BasicElement {
        &self.element
    }
}

impl HtmlElement for BasicHtmlElement {
    fn as_html_element(&self) -> &BasicHtmlElement {
        self
    }
}

/// The HTML element capability set.
pub trait HtmlElement: Element {
    fn as_html_element(&self) -> &BasicHtmlElement;

    fn access_key(&self) -> Result<String> {
        self.as_node().read("accessKey")
    }

    fn set_access_key(&self, key: &str) -> Result<()> {
        self.as_node().write("accessKey", key)
    }

    fn access_key_label(&self) -> Result<String> {
        self.as_node().read("accessKeyLabel")
    }

    fn content_editable(&self) -> Result<String> {
        self.as_node().read("contentEditable")
    }

    fn set_content_editable(&self, value: &str) -> Result<()> {
        self.as_node().write("contentEditable", value)
    }

    fn is_content_editable(&self) -> Result<bool> {
        self.as_node().read("isContentEditable")
    }

    /// The `data-*` attributes, keyed by their camel-cased names.
    fn dataset(&self) -> Result<HashMap<String, String>> {
        let node = self.as_node();
        let dataset: Handle = node.read("dataset")?;
        let keys: Handle = node
            .realm()
            .global()
            .get_as::<Handle>("Object")?
            .call_as("keys", &[Value::from(&dataset)])?;
        let length: usize = keys.get_as("length")?;
        let mut entries = HashMap::with_capacity(length);
        for index in 0..length {
            let key: String = keys.get_as(&index.to_string())?;
            let value: String = dataset.get_as(&key)?;
            entries.insert(key, value);
        }
        Ok(entries)
    }

    fn dir(&self) -> Result<String> {
        self.as_node().read("dir")
    }

    fn set_dir(&self, dir: &str) -> Result<()> {
        self.as_node().write("dir", dir)
    }

    fn draggable(&self) -> Result<bool> {
        self.as_node().read("draggable")
    }

    fn set_draggable(&self, draggable: bool) -> Result<()> {
        self.as_node().write("draggable", draggable)
    }

    fn hidden(&self) -> Result<bool> {
        self.as_node().read("hidden")
    }

    fn set_hidden(&self, hidden: bool) -> Result<()> {
        self.as_node().write("hidden", hidden)
    }

    fn lang(&self) -> Result<String> {
        self.as_node().read("lang")
    }

    fn set_lang(&self, lang: &str) -> Result<()> {
        self.as_node().write("lang", lang)
    }

    fn offset_height(&self) -> Result<f64> {
        self.as_node().read("offsetHeight")
    }

    fn offset_left(&self) -> Result<f64> {
        self.as_node().read("offsetLeft")
    }

    fn offset_top(&self) -> Result<f64> {
        self.as_node().read("offsetTop")
    }

    fn offset_width(&self) -> Result<f64> {
        self.as_node().read("offsetWidth")
    }

    fn offset_parent(&self) -> Result<Option<AnyElement>> {
        self.as_node().read_element("offsetParent")
    }

    fn tab_index(&self) -> Result<i32> {
        self.as_node().read("tabIndex")
    }

    fn set_tab_index(&self, index: i32) -> Result<()> {
        self.as_node().write("tabIndex", index)
    }

    fn title(&self) -> Result<String> {
        self.as_node().read("title")
    }

    fn set_title(&self, title: &str) -> Result<()> {
        self.as_node().write("title", title)
    }

    fn blur(&self) -> Result<()> {
        self.as_node().invoke("blur", &[])
    }

    fn click(&self) -> Result<()> {
        self.as_node().invoke("click", &[])
    }

    fn focus(&self) -> Result<()> {
        self.as_node().invoke("focus", &[])
    }
}

macro_rules! html_dispatch {
    ($($variant:ident($ty:ident) = $tag:ident,)*) => {
        /// Every HTML element facade the dispatch table can produce.
        #[derive(Debug, Clone)]
        pub enum AnyHtmlElement {
            $($variant($ty),)*
            /// `HTMLElement` itself, and the fallback for unrecognized tags.
            Generic(BasicHtmlElement),
        }

        impl AnyHtmlElement {
            pub(crate) fn from_layer(html: BasicHtmlElement) -> Self {
                match html.as_node().tag().node() {
                    $(Some(NodeTag::$tag) => AnyHtmlElement::$variant($ty::from_layer(html)),)*
                    Some(NodeTag::HtmlElement) => AnyHtmlElement::Generic(html),
                    _ => {
                        debug!(target: "dom_facade", tag = %html.as_node().tag(), "unrecognized HTML element tag, using a generic facade");
                        AnyHtmlElement::Generic(html)
                    }
                }
            }

            fn layer(&self) -> &BasicHtmlElement {
                match self {
                    $(AnyHtmlElement::$variant(inner) => inner.as_html_element(),)*
                    AnyHtmlElement::Generic(inner) => inner,
                }
            }
        }

        $(
            impl Downcast for $ty {
                const EXPECTED: &'static str = NodeTag::$tag.name();

                fn narrow(realm: &Realm, handle: Handle) -> Result<std::result::Result<Self, TypeTag>> {
                    match AnyNode::from_handle(realm, handle)? {
                        AnyNode::Element(AnyElement::Html(AnyHtmlElement::$variant(inner))) => Ok(Ok(inner)),
                        other => Ok(Err(other.tag().clone())),
                    }
                }
            }
        )*
    };
}

html_dispatch! {
    Anchor(HtmlAnchorElement) = Anchor,
    Applet(HtmlAppletElement) = Applet,
    Area(HtmlAreaElement) = Area,
    Media(HtmlMediaElement) = Media,
    Audio(HtmlAudioElement) = Audio,
    Video(HtmlVideoElement) = Video,
    Base(HtmlBaseElement) = Base,
    Body(HtmlBodyElement) = Body,
    Br(HtmlBrElement) = Br,
    Button(HtmlButtonElement) = Button,
    Canvas(HtmlCanvasElement) = Canvas,
    Data(HtmlDataElement) = Data,
    DataList(HtmlDataListElement) = DataList,
    Directory(HtmlDirectoryElement) = Directory,
    Div(HtmlDivElement) = Div,
    DList(HtmlDListElement) = DList,
    Embed(HtmlEmbedElement) = Embed,
    FieldSet(HtmlFieldSetElement) = FieldSet,
    Font(HtmlFontElement) = Font,
    Form(HtmlFormElement) = Form,
    Frame(HtmlFrameElement) = Frame,
    FrameSet(HtmlFrameSetElement) = FrameSet,
    Head(HtmlHeadElement) = Head,
    Heading(HtmlHeadingElement) = Heading,
    Html(HtmlHtmlElement) = Html,
    Hr(HtmlHrElement) = Hr,
    IFrame(HtmlIFrameElement) = IFrame,
    Image(HtmlImageElement) = Image,
    Input(HtmlInputElement) = Input,
    Keygen(HtmlKeygenElement) = Keygen,
    Label(HtmlLabelElement) = Label,
    Legend(HtmlLegendElement) = Legend,
    Li(HtmlLiElement) = Li,
    Link(HtmlLinkElement) = Link,
    Map(HtmlMapElement) = Map,
    Menu(HtmlMenuElement) = Menu,
    Meta(HtmlMetaElement) = Meta,
    Meter(HtmlMeterElement) = Meter,
    Mod(HtmlModElement) = Mod,
    Object(HtmlObjectElement) = Object,
    OList(HtmlOListElement) = OList,
    OptGroup(HtmlOptGroupElement) = OptGroup,
    Option(HtmlOptionElement) = Option,
    Output(HtmlOutputElement) = Output,
    Paragraph(HtmlParagraphElement) = Paragraph,
    Param(HtmlParamElement) = Param,
    Pre(HtmlPreElement) = Pre,
    Progress(HtmlProgressElement) = Progress,
    Quote(HtmlQuoteElement) = Quote,
    Script(HtmlScriptElement) = Script,
    Select(HtmlSelectElement) = Select,
    Source(HtmlSourceElement) = Source,
    Span(HtmlSpanElement) = Span,
    Style(HtmlStyleElement) = Style,
    Table(HtmlTableElement) = Table,
    TableCaption(HtmlTableCaptionElement) = TableCaption,
    TableCell(HtmlTableCellElement) = TableCell,
    TableDataCell(HtmlTableDataCellElement) = TableDataCell,
    TableHeaderCell(HtmlTableHeaderCellElement) = TableHeaderCell,
    TableCol(HtmlTableColElement) = TableCol,
    TableRow(HtmlTableRowElement) = TableRow,
    TableSection(HtmlTableSectionElement) = TableSection,
    TextArea(HtmlTextAreaElement) = TextArea,
    Time(HtmlTimeElement) = Time,
    Title(HtmlTitleElement) = Title,
    Track(HtmlTrackElement) = Track,
    UList(HtmlUListElement) = UList,
    Unknown(HtmlUnknownElement) = Unknown,
}

impl AnyHtmlElement {
    pub(crate) fn from_handle(realm: &Realm, handle: Handle) -> Result<Self> {
        let element = BasicElement::from_layer(BasicNode::from_handle(realm, handle)?);
        Ok(Self::from_layer(BasicHtmlElement::from_layer(element)))
    }
}

impl Node for AnyHtmlElement {
    fn as_node(&self) -> &BasicNode {
        self.layer().as_node()
    }
}

impl Element for AnyHtmlElement {
    fn as_element(&self) -> &BasicElement {
        self.layer().as_element()
    }
}

impl HtmlElement for AnyHtmlElement {
    fn as_html_element(&self) -> &BasicHtmlElement {
        self.layer()
    }
}

impl Downcast for AnyHtmlElement {
    const EXPECTED: &'static str = "HTMLElement";

    fn narrow(realm: &Realm, handle: Handle) -> Result<std::result::Result<Self, TypeTag>> {
        match AnyNode::from_handle(realm, handle)? {
            AnyNode::Element(AnyElement::Html(html)) => Ok(Ok(html)),
            other => Ok(Err(other.tag().clone())),
        }
    }
}

/// Follow a relationship from an HTML facade.
fn related<T: Downcast>(owner: &BasicNode, relationship: &str) -> Result<Option<T>> {
    relation::resolve_related(owner.realm(), owner.handle(), relationship)
}

fn related_all<T: Downcast>(owner: &BasicNode, relationship: &str) -> Result<Vec<T>> {
    relation::resolve_related_all(owner.realm(), owner.handle(), relationship)
}

/// Call `method` and narrow what it returns.
fn invoke_related<T: Downcast>(owner: &BasicNode, method: &str, args: &[Value]) -> Result<Option<T>> {
    let value = owner.invoke::<Value>(method, args)?;
    relation::narrow_value(owner.realm(), value, &format!("{method}()"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;
    use crate::host::memory::MemoryHost;

    #[test]
    fn every_html_tag_gets_its_own_variant() {
        let host = MemoryHost::new();
        let realm = Realm::new(host.global(), BridgeConfig::default());
        for tag in NodeTag::ALL {
            if !tag.is_a(NodeTag::HtmlElement) {
                continue;
            }
            let handle = host.create_element_as("x-sample", tag.name());
            let wrapped = realm.wrap_html_element(&Value::from(handle)).unwrap().unwrap();
            assert_eq!(wrapped.tag(), &TypeTag::Node(*tag));
            let generic = matches!(wrapped, AnyHtmlElement::Generic(_));
            assert_eq!(generic, *tag == NodeTag::HtmlElement, "{tag}");
        }
    }

    #[test]
    fn dataset_reads_data_attributes() {
        let host = MemoryHost::new();
        let realm = Realm::new(host.global(), BridgeConfig::default());
        let div = host.create_element("div");
        div.call("setAttribute", &[Value::from("data-user-id"), Value::from("7")])
            .unwrap();
        div.call("setAttribute", &[Value::from("title"), Value::from("t")])
            .unwrap();
        let wrapped = realm.wrap_html_element(&Value::from(div)).unwrap().unwrap();
        let dataset = wrapped.dataset().unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset["userId"], "7");
        assert_eq!(wrapped.title().unwrap(), "t");
    }

    #[test]
    fn reflected_globals_round_trip_through_attributes() {
        let host = MemoryHost::new();
        let realm = Realm::new(host.global(), BridgeConfig::default());
        let span = realm
            .wrap_html_element(&Value::from(host.create_element("span")))
            .unwrap()
            .unwrap();
        span.set_lang("fr").unwrap();
        span.set_hidden(true).unwrap();
        span.set_tab_index(3).unwrap();
        assert_eq!(span.get_attribute("lang").unwrap().as_deref(), Some("fr"));
        assert!(span.hidden().unwrap());
        assert_eq!(span.tab_index().unwrap(), 3);
        assert!(matches!(span, AnyHtmlElement::Span(_)));
    }
}

//! Node, element and document behaviour for [`MemoryHost`](super::MemoryHost).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tracing::debug;
use url::{quirks, Url};

use super::select::{Mirror, SelectorList};
use super::{
    fixture, index_arg, string_arg, HostState, Kind, LiveList, MemObject,
    TokenBacking, TokenSource,
};
use crate::host::{FromValue, HostError, HostObject, Value};

pub(super) const ELEMENT_NODE: u16 = 1;
pub(super) const TEXT_NODE: u16 = 3;
pub(super) const COMMENT_NODE: u16 = 8;
pub(super) const DOCUMENT_NODE: u16 = 9;
pub(super) const DOCUMENT_TYPE_NODE: u16 = 10;
pub(super) const DOCUMENT_FRAGMENT_NODE: u16 = 11;

pub(super) const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
pub(super) const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
const MATHML_NAMESPACE: &str = "http://www.w3.org/1998/Math/MathML";

const POSITION_DISCONNECTED: u32 = 1;
const POSITION_PRECEDING: u32 = 2;
const POSITION_FOLLOWING: u32 = 4;
const POSITION_CONTAINS: u32 = 8;
const POSITION_CONTAINED_BY: u32 = 16;
const POSITION_IMPLEMENTATION_SPECIFIC: u32 = 32;

pub(super) const URL_COMPONENTS: &[&str] = &[
    "protocol", "host", "hostname", "port", "pathname", "search", "hash", "origin", "username",
    "password",
];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta", "param",
    "source", "track", "wbr",
];

const FORM_ASSOCIATED: &[&str] = &[
    "button", "fieldset", "input", "keygen", "label", "legend", "object", "option", "output",
    "select", "textarea",
];

const FORM_CONTROLS: &[&str] = &[
    "button", "fieldset", "input", "keygen", "object", "output", "select", "textarea",
];

const LABELABLE: &[&str] = &[
    "button", "input", "keygen", "meter", "output", "progress", "select", "textarea",
];

const TABLE_SECTIONS: &[&str] = &["thead", "tbody", "tfoot"];

/// Property name to content attribute, for string-valued reflection.
const REFLECTED_STRINGS: &[(&str, &str)] = &[
    ("src", "src"),
    ("name", "name"),
    ("alt", "alt"),
    ("target", "target"),
    ("rel", "rel"),
    ("action", "action"),
    ("method", "method"),
    ("enctype", "enctype"),
    ("placeholder", "placeholder"),
    ("content", "content"),
    ("httpEquiv", "http-equiv"),
    ("charset", "charset"),
    ("media", "media"),
    ("hreflang", "hreflang"),
    ("download", "download"),
    ("type", "type"),
    ("label", "label"),
    ("dateTime", "datetime"),
    ("cite", "cite"),
    ("autocomplete", "autocomplete"),
    ("pattern", "pattern"),
    ("accept", "accept"),
    ("kind", "kind"),
    ("srclang", "srclang"),
    ("scope", "scope"),
    ("headers", "headers"),
    ("abbr", "abbr"),
    ("coords", "coords"),
    ("shape", "shape"),
    ("useMap", "usemap"),
    ("poster", "poster"),
    ("preload", "preload"),
    ("wrap", "wrap"),
    ("form", "form"),
    ("align", "align"),
    ("color", "color"),
    ("face", "face"),
    ("size", "size"),
    ("min", "min"),
    ("max", "max"),
];

/// Property name to content attribute, for presence-valued reflection.
const REFLECTED_BOOLS: &[(&str, &str)] = &[
    ("disabled", "disabled"),
    ("required", "required"),
    ("multiple", "multiple"),
    ("readOnly", "readonly"),
    ("autofocus", "autofocus"),
    ("async", "async"),
    ("defer", "defer"),
    ("controls", "controls"),
    ("autoplay", "autoplay"),
    ("loop", "loop"),
    ("muted", "muted"),
    ("open", "open"),
    ("noValidate", "novalidate"),
    ("formNoValidate", "formnovalidate"),
    ("reversed", "reversed"),
    ("default", "default"),
    ("isMap", "ismap"),
    ("noModule", "nomodule"),
    ("compact", "compact"),
];

/// Property name, content attribute, default and the elements it applies to,
/// for numeric reflection. An empty element list applies everywhere; numeric
/// entries win over string ones.
const REFLECTED_NUMBERS: &[(&str, &str, f64, &[&str])] = &[
    ("start", "start", 1.0, &[]),
    ("span", "span", 1.0, &[]),
    ("colSpan", "colspan", 1.0, &[]),
    ("rowSpan", "rowspan", 1.0, &[]),
    ("high", "high", 1.0, &[]),
    ("low", "low", 0.0, &[]),
    ("min", "min", 0.0, &["meter"]),
    ("max", "max", 1.0, &["meter", "progress"]),
    ("optimum", "optimum", 0.5, &[]),
    ("width", "width", 0.0, &[]),
    ("height", "height", 0.0, &[]),
    ("size", "size", 20.0, &["input"]),
    ("size", "size", 0.0, &["select"]),
];

fn reflected_number(tag: &str, name: &str) -> Option<(&'static str, f64)> {
    REFLECTED_NUMBERS
        .iter()
        .find(|(prop, _, _, tags)| *prop == name && (tags.is_empty() || tags.contains(&tag)))
        .map(|(_, attribute, default, _)| (*attribute, *default))
}

pub(super) struct NodeData {
    pub node_type: u16,
    /// Local name for elements, `#text` and friends otherwise.
    pub name: String,
    pub namespace: Option<&'static str>,
    pub data: RefCell<String>,
    pub attributes: RefCell<Vec<(String, String)>>,
    pub parent: RefCell<Weak<MemObject>>,
    pub children: RefCell<Vec<Rc<MemObject>>>,
    cached: RefCell<HashMap<&'static str, Rc<MemObject>>>,
}

impl NodeData {
    pub fn new(node_type: u16, name: &str, namespace: Option<&'static str>) -> Self {
        Self {
            node_type,
            name: name.to_string(),
            namespace,
            data: RefCell::default(),
            attributes: RefCell::default(),
            parent: RefCell::default(),
            children: RefCell::default(),
            cached: RefCell::default(),
        }
    }
}

/// Host collections that re-query the tree on every access.
pub(super) enum Query {
    ChildNodes,
    Children,
    TagName(String),
    ClassNames(Vec<String>),
    Options,
    SelectedOptions,
    FormControls,
    Areas,
    Cells,
    Rows,
    Forms,
    Images,
    Links,
    Scripts,
    Embeds,
}

impl Query {
    fn accepts(&self, element: &MemObject) -> bool {
        let tag = local_name(element);
        match self {
            Query::TagName(name) => name == "*" || tag.eq_ignore_ascii_case(name),
            Query::ClassNames(names) => {
                let classes = class_tokens(element);
                !names.is_empty() && names.iter().all(|name| classes.contains(name))
            }
            Query::Options => tag == "option",
            Query::SelectedOptions => tag == "option" && is_selected(element),
            Query::FormControls => FORM_CONTROLS.contains(&tag),
            Query::Areas => tag == "area",
            Query::Forms => tag == "form",
            Query::Images => tag == "img",
            Query::Links => (tag == "a" || tag == "area") && attr(element, "href").is_some(),
            Query::Scripts => tag == "script",
            Query::Embeds => tag == "embed",
            Query::ChildNodes | Query::Children | Query::Cells | Query::Rows => false,
        }
    }
}

pub(super) fn resolve(root: &Rc<MemObject>, query: &Query) -> Vec<Rc<MemObject>> {
    match query {
        Query::ChildNodes => children(root),
        Query::Children => element_children(root),
        Query::Cells => element_children(root)
            .into_iter()
            .filter(|cell| matches!(local_name(cell), "td" | "th"))
            .collect(),
        Query::Rows => table_rows(root),
        _ => descendant_elements(root)
            .into_iter()
            .filter(|element| query.accepts(element))
            .collect(),
    }
}

fn table_rows(root: &Rc<MemObject>) -> Vec<Rc<MemObject>> {
    let mut rows = Vec::new();
    for child in element_children(root) {
        match local_name(&child) {
            "tr" => rows.push(child),
            section if local_name(root) == "table" && TABLE_SECTIONS.contains(&section) => rows
                .extend(
                    element_children(&child)
                        .into_iter()
                        .filter(|row| local_name(row) == "tr"),
                ),
            _ => {}
        }
    }
    rows
}

// ---- construction ----

pub(super) fn interface_for(tag: &str) -> &'static str {
    match tag {
        "a" => "HTMLAnchorElement",
        "applet" => "HTMLAppletElement",
        "area" => "HTMLAreaElement",
        "audio" => "HTMLAudioElement",
        "base" => "HTMLBaseElement",
        "body" => "HTMLBodyElement",
        "br" => "HTMLBRElement",
        "button" => "HTMLButtonElement",
        "canvas" => "HTMLCanvasElement",
        "data" => "HTMLDataElement",
        "datalist" => "HTMLDataListElement",
        "dir" => "HTMLDirectoryElement",
        "div" => "HTMLDivElement",
        "dl" => "HTMLDListElement",
        "embed" => "HTMLEmbedElement",
        "fieldset" => "HTMLFieldSetElement",
        "font" => "HTMLFontElement",
        "form" => "HTMLFormElement",
        "frame" => "HTMLFrameElement",
        "frameset" => "HTMLFrameSetElement",
        "head" => "HTMLHeadElement",
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => "HTMLHeadingElement",
        "html" => "HTMLHtmlElement",
        "hr" => "HTMLHRElement",
        "iframe" => "HTMLIFrameElement",
        "img" => "HTMLImageElement",
        "input" => "HTMLInputElement",
        "keygen" => "HTMLKeygenElement",
        "label" => "HTMLLabelElement",
        "legend" => "HTMLLegendElement",
        "li" => "HTMLLIElement",
        "link" => "HTMLLinkElement",
        "map" => "HTMLMapElement",
        "menu" => "HTMLMenuElement",
        "meta" => "HTMLMetaElement",
        "meter" => "HTMLMeterElement",
        "del" | "ins" => "HTMLModElement",
        "object" => "HTMLObjectElement",
        "ol" => "HTMLOListElement",
        "optgroup" => "HTMLOptGroupElement",
        "option" => "HTMLOptionElement",
        "output" => "HTMLOutputElement",
        "p" => "HTMLParagraphElement",
        "param" => "HTMLParamElement",
        "pre" => "HTMLPreElement",
        "progress" => "HTMLProgressElement",
        "q" | "blockquote" => "HTMLQuoteElement",
        "script" => "HTMLScriptElement",
        "select" => "HTMLSelectElement",
        "source" => "HTMLSourceElement",
        "span" => "HTMLSpanElement",
        "style" => "HTMLStyleElement",
        "table" => "HTMLTableElement",
        "caption" => "HTMLTableCaptionElement",
        "td" => "HTMLTableDataCellElement",
        "th" => "HTMLTableHeaderCellElement",
        "col" | "colgroup" => "HTMLTableColElement",
        "tr" => "HTMLTableRowElement",
        "thead" | "tbody" | "tfoot" => "HTMLTableSectionElement",
        "textarea" => "HTMLTextAreaElement",
        "time" => "HTMLTimeElement",
        "title" => "HTMLTitleElement",
        "track" => "HTMLTrackElement",
        "ul" => "HTMLUListElement",
        "video" => "HTMLVideoElement",
        "abbr" | "address" | "article" | "aside" | "b" | "bdi" | "bdo" | "cite" | "code" | "dd"
        | "details" | "dfn" | "dt" | "em" | "figcaption" | "figure" | "footer" | "header" | "i"
        | "kbd" | "main" | "mark" | "nav" | "noscript" | "rp" | "rt" | "ruby" | "s" | "samp"
        | "section" | "small" | "strong" | "sub" | "summary" | "sup" | "u" | "var" | "wbr" => {
            "HTMLElement"
        }
        custom if custom.contains('-') => "HTMLElement",
        _ => "HTMLUnknownElement",
    }
}

pub(super) fn static_namespace(namespace: &str) -> Option<&'static str> {
    match namespace {
        HTML_NAMESPACE => Some(HTML_NAMESPACE),
        SVG_NAMESPACE => Some(SVG_NAMESPACE),
        MATHML_NAMESPACE => Some(MATHML_NAMESPACE),
        _ => None,
    }
}

pub(super) fn create_element(
    state: &Rc<HostState>,
    tag: &str,
    interface: Option<&str>,
) -> Rc<MemObject> {
    create_element_ns(state, Some(HTML_NAMESPACE), &tag.to_ascii_lowercase(), interface)
}

pub(super) fn create_element_ns(
    state: &Rc<HostState>,
    namespace: Option<&'static str>,
    tag: &str,
    interface: Option<&str>,
) -> Rc<MemObject> {
    let default_interface = match namespace {
        Some(HTML_NAMESPACE) => interface_for(tag),
        Some(SVG_NAMESPACE) => "SVGElement",
        _ => "Element",
    };
    state.alloc(
        Kind::Node(NodeData::new(ELEMENT_NODE, tag, namespace)),
        Some(interface.unwrap_or(default_interface)),
    )
}

fn create_character_data(
    state: &Rc<HostState>,
    node_type: u16,
    data: &str,
) -> Rc<MemObject> {
    let (name, interface) = if node_type == TEXT_NODE {
        ("#text", "Text")
    } else {
        ("#comment", "Comment")
    };
    let node = NodeData::new(node_type, name, None);
    *node.data.borrow_mut() = data.to_string();
    state.alloc(Kind::Node(node), Some(interface))
}

pub(super) fn create_text(state: &Rc<HostState>, data: &str) -> Rc<MemObject> {
    create_character_data(state, TEXT_NODE, data)
}

pub(super) fn create_comment(state: &Rc<HostState>, data: &str) -> Rc<MemObject> {
    create_character_data(state, COMMENT_NODE, data)
}

pub(super) fn create_fragment(state: &Rc<HostState>) -> Rc<MemObject> {
    state.alloc(
        Kind::Node(NodeData::new(
            DOCUMENT_FRAGMENT_NODE,
            "#document-fragment",
            None,
        )),
        Some("DocumentFragment"),
    )
}

pub(super) fn create_doctype(state: &Rc<HostState>, name: &str) -> Rc<MemObject> {
    state.alloc(
        Kind::Node(NodeData::new(DOCUMENT_TYPE_NODE, name, None)),
        Some("DocumentType"),
    )
}

// ---- tree helpers ----

fn opt(node: Option<Rc<MemObject>>) -> Value {
    node.map(|node| node.value()).unwrap_or(Value::Null)
}

fn values(nodes: &[Rc<MemObject>]) -> Vec<Value> {
    nodes.iter().map(MemObject::value).collect()
}

pub(super) fn is_element(object: &MemObject) -> bool {
    object
        .node()
        .is_some_and(|node| node.node_type == ELEMENT_NODE)
}

fn node_type(object: &MemObject) -> Option<u16> {
    object.node().map(|node| node.node_type)
}

pub(super) fn local_name(object: &MemObject) -> &str {
    match object.node() {
        Some(node) if node.node_type == ELEMENT_NODE => node.name.as_str(),
        _ => "",
    }
}

fn node_name(node: &NodeData) -> String {
    if node.node_type == ELEMENT_NODE && node.namespace == Some(HTML_NAMESPACE) {
        node.name.to_ascii_uppercase()
    } else {
        node.name.clone()
    }
}

fn is_html(object: &MemObject) -> bool {
    object
        .node()
        .is_some_and(|node| node.namespace == Some(HTML_NAMESPACE))
}

fn normalize_attr_name(object: &MemObject, name: &str) -> String {
    if is_html(object) {
        name.to_ascii_lowercase()
    } else {
        name.to_string()
    }
}

pub(super) fn attr(object: &MemObject, name: &str) -> Option<String> {
    let node = object.node()?;
    let attributes = node.attributes.borrow();
    attributes
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.clone())
}

fn attr_string(object: &MemObject, name: &str) -> Value {
    Value::from(attr(object, name).unwrap_or_default())
}

pub(super) fn set_attr(object: &MemObject, name: &str, value: String) {
    let Some(node) = object.node() else {
        return;
    };
    let mut attributes = node.attributes.borrow_mut();
    match attributes.iter_mut().find(|(key, _)| key == name) {
        Some(entry) => entry.1 = value,
        None => attributes.push((name.to_string(), value)),
    }
}

fn remove_attr(object: &MemObject, name: &str) {
    if let Some(node) = object.node() {
        node.attributes.borrow_mut().retain(|(key, _)| key != name);
    }
}

fn set_bool_attr(object: &MemObject, name: &str, present: bool) {
    if present {
        set_attr(object, name, String::new());
    } else {
        remove_attr(object, name);
    }
}

fn class_tokens(object: &MemObject) -> Vec<String> {
    attr(object, "class")
        .unwrap_or_default()
        .split_ascii_whitespace()
        .map(str::to_string)
        .collect()
}

fn is_selected(option: &MemObject) -> bool {
    match option.prop("selected") {
        Some(Value::Bool(selected)) => selected,
        _ => attr(option, "selected").is_some(),
    }
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Undefined) | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => *n != 0.0 && !n.is_nan(),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Object(_)) | Some(Value::Function(_)) => true,
    }
}

pub(super) fn parent(object: &MemObject) -> Option<Rc<MemObject>> {
    object.node()?.parent.borrow().upgrade()
}

pub(super) fn children(object: &MemObject) -> Vec<Rc<MemObject>> {
    object
        .node()
        .map(|node| node.children.borrow().clone())
        .unwrap_or_default()
}

fn element_children(object: &MemObject) -> Vec<Rc<MemObject>> {
    children(object)
        .into_iter()
        .filter(|child| is_element(child))
        .collect()
}

fn collect_descendants(object: &MemObject, out: &mut Vec<Rc<MemObject>>) {
    for child in children(object) {
        out.push(child.clone());
        collect_descendants(&child, out);
    }
}

/// Descendants in tree order, excluding `object` itself.
fn descendants(object: &MemObject) -> Vec<Rc<MemObject>> {
    let mut out = Vec::new();
    collect_descendants(object, &mut out);
    out
}

fn descendant_elements(object: &MemObject) -> Vec<Rc<MemObject>> {
    descendants(object)
        .into_iter()
        .filter(|node| is_element(node))
        .collect()
}

fn sibling(object: &Rc<MemObject>, forward: bool, elements_only: bool) -> Option<Rc<MemObject>> {
    let parent = parent(object)?;
    let siblings = children(&parent);
    let index = siblings.iter().position(|node| Rc::ptr_eq(node, object))?;
    let mut candidates: Box<dyn Iterator<Item = &Rc<MemObject>>> = if forward {
        Box::new(siblings[index + 1..].iter())
    } else {
        Box::new(siblings[..index].iter().rev())
    };
    candidates
        .find(|node| !elements_only || is_element(node))
        .cloned()
}

pub(super) fn root(object: &Rc<MemObject>) -> Rc<MemObject> {
    let mut current = object.clone();
    while let Some(next) = parent(&current) {
        current = next;
    }
    current
}

fn is_connected(state: &HostState, object: &Rc<MemObject>) -> bool {
    state
        .document()
        .is_some_and(|document| Rc::ptr_eq(&root(object), &document))
}

pub(super) fn is_inclusive_ancestor(ancestor: &Rc<MemObject>, node: &Rc<MemObject>) -> bool {
    let mut current = Some(node.clone());
    while let Some(candidate) = current {
        if Rc::ptr_eq(&candidate, ancestor) {
            return true;
        }
        current = parent(&candidate);
    }
    false
}

fn is_child(parent: &MemObject, node: &Rc<MemObject>) -> bool {
    parent
        .node()
        .is_some_and(|data| data.children.borrow().iter().any(|c| Rc::ptr_eq(c, node)))
}

pub(super) fn text_content(object: &MemObject) -> String {
    descendants(object)
        .iter()
        .filter_map(|node| node.node())
        .filter(|node| node.node_type == TEXT_NODE)
        .map(|node| node.data.borrow().clone())
        .collect()
}

fn find_by_id(state: &HostState, id: &str) -> Option<Rc<MemObject>> {
    if id.is_empty() {
        return None;
    }
    let document = state.document()?;
    descendant_elements(&document)
        .into_iter()
        .find(|element| attr(element, "id").as_deref() == Some(id))
}

fn document_url(state: &HostState) -> String {
    state
        .url()
        .map(|url| url.to_string())
        .unwrap_or_else(|| String::from("about:blank"))
}

// ---- mutation ----

fn hierarchy_error(message: &str) -> HostError {
    HostError::Exception(format!("HierarchyRequestError: {message}"))
}

fn not_found() -> HostError {
    HostError::Exception(String::from(
        "NotFoundError: The node to be removed is not a child of this node.",
    ))
}

/// Append without validity checks. Used while building trees.
pub(super) fn append(parent: &Rc<MemObject>, child: &Rc<MemObject>) {
    detach(child);
    if let (Some(parent_data), Some(child_data)) = (parent.node(), child.node()) {
        parent_data.children.borrow_mut().push(child.clone());
        *child_data.parent.borrow_mut() = Rc::downgrade(parent);
    }
}

pub(super) fn detach(child: &Rc<MemObject>) {
    if let Some(parent) = parent(child) {
        if let Some(parent_data) = parent.node() {
            parent_data
                .children
                .borrow_mut()
                .retain(|node| !Rc::ptr_eq(node, child));
        }
    }
    if let Some(child_data) = child.node() {
        *child_data.parent.borrow_mut() = Weak::new();
    }
}

fn insert(
    parent: &Rc<MemObject>,
    child: &Rc<MemObject>,
    before: Option<&Rc<MemObject>>,
) -> Result<(), HostError> {
    let parent_type = node_type(parent).unwrap_or(0);
    if !matches!(
        parent_type,
        ELEMENT_NODE | DOCUMENT_NODE | DOCUMENT_FRAGMENT_NODE
    ) {
        return Err(hierarchy_error("this node type does not support children"));
    }
    if node_type(child) == Some(DOCUMENT_NODE) {
        return Err(hierarchy_error("a document cannot be inserted"));
    }
    if is_inclusive_ancestor(child, parent) {
        return Err(hierarchy_error("the new child contains the parent"));
    }
    if let Some(reference) = before {
        if !is_child(parent, reference) {
            return Err(HostError::Exception(String::from(
                "NotFoundError: The node before which the new node is to be inserted is not a child of this node.",
            )));
        }
    }

    let nodes = if node_type(child) == Some(DOCUMENT_FRAGMENT_NODE) {
        let moved = children(child);
        for node in &moved {
            detach(node);
        }
        moved
    } else {
        detach(child);
        vec![child.clone()]
    };

    let Some(parent_data) = parent.node() else {
        return Ok(());
    };
    let mut siblings = parent_data.children.borrow_mut();
    let index = before
        .and_then(|reference| siblings.iter().position(|node| Rc::ptr_eq(node, reference)))
        .unwrap_or(siblings.len());
    for (offset, node) in nodes.iter().enumerate() {
        siblings.insert(index + offset, node.clone());
        if let Some(data) = node.node() {
            *data.parent.borrow_mut() = Rc::downgrade(parent);
        }
    }
    Ok(())
}

fn replace_children(state: &Rc<HostState>, object: &Rc<MemObject>, text: &str) {
    for child in children(object) {
        detach(&child);
    }
    if !text.is_empty() {
        append(object, &create_text(state, text));
    }
}

fn clone_node(state: &Rc<HostState>, object: &Rc<MemObject>, deep: bool) -> Rc<MemObject> {
    let Some(source) = object.node() else {
        return object.clone();
    };
    let data = NodeData::new(source.node_type, &source.name, source.namespace);
    *data.data.borrow_mut() = source.data.borrow().clone();
    *data.attributes.borrow_mut() = source.attributes.borrow().clone();
    let copy = state.alloc(Kind::Node(data), None);
    if let Some(constructor) = object.prop("constructor") {
        copy.props
            .borrow_mut()
            .insert(String::from("constructor"), constructor);
    }
    if deep {
        for child in children(object) {
            append(&copy, &clone_node(state, &child, true));
        }
    }
    copy
}

fn is_equal(left: &Rc<MemObject>, right: &Rc<MemObject>) -> bool {
    let (Some(a), Some(b)) = (left.node(), right.node()) else {
        return false;
    };
    if a.node_type != b.node_type
        || a.name != b.name
        || a.namespace != b.namespace
        || *a.data.borrow() != *b.data.borrow()
    {
        return false;
    }
    let mut left_attrs = a.attributes.borrow().clone();
    let mut right_attrs = b.attributes.borrow().clone();
    left_attrs.sort();
    right_attrs.sort();
    if left_attrs != right_attrs {
        return false;
    }
    let (left_children, right_children) = (children(left), children(right));
    left_children.len() == right_children.len()
        && left_children
            .iter()
            .zip(&right_children)
            .all(|(l, r)| is_equal(l, r))
}

fn compare_position(this: &Rc<MemObject>, other: &Rc<MemObject>) -> u32 {
    if Rc::ptr_eq(this, other) {
        return 0;
    }
    if is_inclusive_ancestor(this, other) {
        return POSITION_CONTAINED_BY | POSITION_FOLLOWING;
    }
    if is_inclusive_ancestor(other, this) {
        return POSITION_CONTAINS | POSITION_PRECEDING;
    }
    let this_root = root(this);
    if !Rc::ptr_eq(&this_root, &root(other)) {
        let direction = if other.id > this.id {
            POSITION_FOLLOWING
        } else {
            POSITION_PRECEDING
        };
        return POSITION_DISCONNECTED | POSITION_IMPLEMENTATION_SPECIFIC | direction;
    }
    let order = descendants(&this_root);
    let position = |node: &Rc<MemObject>| order.iter().position(|n| Rc::ptr_eq(n, node));
    if position(other) > position(this) {
        POSITION_FOLLOWING
    } else {
        POSITION_PRECEDING
    }
}

fn normalize(object: &Rc<MemObject>) {
    let mut pending_text: Option<Rc<MemObject>> = None;
    for child in children(object) {
        let Some(data) = child.node() else { continue };
        if data.node_type != TEXT_NODE {
            pending_text = None;
            normalize(&child);
            continue;
        }
        if data.data.borrow().is_empty() {
            detach(&child);
            continue;
        }
        match &pending_text {
            Some(previous) => {
                if let Some(previous_data) = previous.node() {
                    previous_data.data.borrow_mut().push_str(&data.data.borrow());
                }
                detach(&child);
            }
            None => pending_text = Some(child.clone()),
        }
    }
}

// ---- serialization ----

fn serialize(object: &Rc<MemObject>, out: &mut String) {
    let Some(node) = object.node() else { return };
    match node.node_type {
        ELEMENT_NODE => {
            out.push('<');
            out.push_str(&node.name);
            for (name, value) in node.attributes.borrow().iter() {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&html_escape::encode_double_quoted_attribute(value));
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&node.name.as_str()) {
                return;
            }
            serialize_children(object, out);
            out.push_str("</");
            out.push_str(&node.name);
            out.push('>');
        }
        TEXT_NODE => {
            let raw = parent(object)
                .is_some_and(|parent| matches!(local_name(&parent), "script" | "style"));
            let data = node.data.borrow();
            if raw {
                out.push_str(&data);
            } else {
                out.push_str(&html_escape::encode_text(data.as_str()));
            }
        }
        COMMENT_NODE => {
            out.push_str("<!--");
            out.push_str(&node.data.borrow());
            out.push_str("-->");
        }
        DOCUMENT_TYPE_NODE => {
            out.push_str("<!DOCTYPE ");
            out.push_str(&node.name);
            out.push('>');
        }
        _ => serialize_children(object, out),
    }
}

fn serialize_children(object: &Rc<MemObject>, out: &mut String) {
    for child in children(object) {
        serialize(&child, out);
    }
}

// ---- URLs ----

pub(super) fn url_component(url: &Url, name: &str) -> Option<String> {
    let component = match name {
        "href" => quirks::href(url),
        "protocol" => quirks::protocol(url),
        "host" => quirks::host(url),
        "hostname" => quirks::hostname(url),
        "port" => quirks::port(url),
        "pathname" => quirks::pathname(url),
        "search" => quirks::search(url),
        "hash" => quirks::hash(url),
        "username" => quirks::username(url),
        "password" => quirks::password(url),
        "origin" => return Some(quirks::origin(url)),
        _ => return None,
    };
    Some(component.to_string())
}

/// Rejected values leave the URL unchanged.
pub(super) fn set_url_component(url: &mut Url, name: &str, value: &str) {
    let accepted = match name {
        "href" => match url.join(value) {
            Ok(next) => {
                *url = next;
                true
            }
            Err(_) => false,
        },
        "protocol" => quirks::set_protocol(url, value).is_ok(),
        "host" => quirks::set_host(url, value).is_ok(),
        "hostname" => quirks::set_hostname(url, value).is_ok(),
        "port" => quirks::set_port(url, value).is_ok(),
        "username" => quirks::set_username(url, value).is_ok(),
        "password" => quirks::set_password(url, value).is_ok(),
        "pathname" => {
            quirks::set_pathname(url, value);
            true
        }
        "search" => {
            quirks::set_search(url, value);
            true
        }
        "hash" => {
            quirks::set_hash(url, value);
            true
        }
        _ => return,
    };
    if !accepted {
        debug!(component = name, value, url = %url, "rejected URL component");
    }
}

fn element_url(state: &HostState, element: &MemObject) -> Option<Url> {
    let href = attr(element, "href")?;
    match state.url() {
        Some(base) => base.join(&href).ok(),
        None => Url::parse(&href).ok(),
    }
}

// ---- cached collections ----

fn cached(
    this: &Rc<MemObject>,
    key: &'static str,
    make: impl FnOnce() -> Rc<MemObject>,
) -> Value {
    let Some(node) = this.node() else {
        return Value::Null;
    };
    if let Some(existing) = node.cached.borrow().get(key) {
        return existing.value();
    }
    let created = make();
    node.cached.borrow_mut().insert(key, created.clone());
    created.value()
}

fn live(
    state: &Rc<HostState>,
    this: &Rc<MemObject>,
    key: &'static str,
    query: Query,
    interface: &str,
) -> Value {
    cached(this, key, || fresh_live(state, this, query, interface))
}

fn fresh_live(
    state: &Rc<HostState>,
    this: &Rc<MemObject>,
    query: Query,
    interface: &str,
) -> Rc<MemObject> {
    state.alloc(
        Kind::Live(LiveList {
            root: Rc::downgrade(this),
            query,
        }),
        Some(interface),
    )
}

fn token_list(
    state: &Rc<HostState>,
    this: &Rc<MemObject>,
    key: &'static str,
    attribute: &'static str,
    settable: bool,
) -> Value {
    cached(this, key, || {
        let interface = if settable {
            "DOMSettableTokenList"
        } else {
            "DOMTokenList"
        };
        state.alloc(
            Kind::Tokens(TokenSource {
                backing: TokenBacking::Attribute {
                    owner: Rc::downgrade(this),
                    attribute,
                },
                settable,
            }),
            Some(interface),
        )
    })
}

// ---- property reads ----

pub(super) fn get(
    state: &Rc<HostState>,
    this: &Rc<MemObject>,
    name: &str,
) -> Result<Option<Value>, HostError> {
    let Some(node) = this.node() else {
        return Ok(None);
    };
    let character_data = matches!(node.node_type, TEXT_NODE | COMMENT_NODE);
    let value = match name {
        "nodeType" => Value::from(u32::from(node.node_type)),
        "nodeName" => Value::from(node_name(node)),
        "nodeValue" if character_data => Value::from(node.data.borrow().clone()),
        "nodeValue" => Value::Null,
        "data" if character_data => Value::from(node.data.borrow().clone()),
        "length" if character_data => Value::from(node.data.borrow().chars().count()),
        "textContent" => match node.node_type {
            DOCUMENT_NODE | DOCUMENT_TYPE_NODE => Value::Null,
            TEXT_NODE | COMMENT_NODE => Value::from(node.data.borrow().clone()),
            _ => Value::from(text_content(this)),
        },
        "parentNode" => opt(parent(this)),
        "parentElement" => opt(parent(this).filter(|parent| is_element(parent))),
        "childNodes" => live(state, this, "childNodes", Query::ChildNodes, "NodeList"),
        "firstChild" => opt(children(this).first().cloned()),
        "lastChild" => opt(children(this).last().cloned()),
        "previousSibling" => opt(sibling(this, false, false)),
        "nextSibling" => opt(sibling(this, true, false)),
        "ownerDocument" if node.node_type == DOCUMENT_NODE => Value::Null,
        "ownerDocument" => opt(state.document()),
        "baseURI" => Value::from(document_url(state)),
        "isConnected" => Value::from(is_connected(state, this)),
        "namespaceURI" => node.namespace.map(Value::from).unwrap_or(Value::Null),
        "name" if node.node_type == DOCUMENT_TYPE_NODE => Value::from(node.name.as_str()),
        _ => {
            return Ok(match node.node_type {
                ELEMENT_NODE => element_get(state, this, node, name),
                DOCUMENT_NODE => document_get(state, this, name),
                DOCUMENT_FRAGMENT_NODE => parent_node_get(state, this, name),
                _ => None,
            })
        }
    };
    Ok(Some(value))
}

fn parent_node_get(state: &Rc<HostState>, this: &Rc<MemObject>, name: &str) -> Option<Value> {
    let value = match name {
        "children" => live(state, this, "children", Query::Children, "HTMLCollection"),
        "firstElementChild" => opt(element_children(this).first().cloned()),
        "lastElementChild" => opt(element_children(this).last().cloned()),
        "childElementCount" => Value::from(element_children(this).len()),
        _ => return None,
    };
    Some(value)
}

fn element_get(
    state: &Rc<HostState>,
    this: &Rc<MemObject>,
    node: &NodeData,
    name: &str,
) -> Option<Value> {
    let value = match name {
        "tagName" => Value::from(node_name(node)),
        "localName" => Value::from(node.name.as_str()),
        "id" => attr_string(this, "id"),
        "className" => attr_string(this, "class"),
        "classList" => token_list(state, this, "classList", "class", false),
        "attributes" => {
            let attributes: Vec<Value> = node
                .attributes
                .borrow()
                .iter()
                .map(|(key, value)| {
                    let attribute = state.new_plain("Attr");
                    let mut props = attribute.props.borrow_mut();
                    props.insert(String::from("name"), Value::from(key.as_str()));
                    props.insert(String::from("localName"), Value::from(key.as_str()));
                    props.insert(String::from("value"), Value::from(value.as_str()));
                    drop(props);
                    attribute.value()
                })
                .collect();
            state.new_sequence("NamedNodeMap", attributes).value()
        }
        "previousElementSibling" => opt(sibling(this, false, true)),
        "nextElementSibling" => opt(sibling(this, true, true)),
        "innerHTML" => {
            let mut out = String::new();
            serialize_children(this, &mut out);
            Value::from(out)
        }
        "outerHTML" => {
            let mut out = String::new();
            serialize(this, &mut out);
            Value::from(out)
        }
        "dataset" => {
            let dataset = state.new_plain("DOMStringMap");
            for (key, value) in node.attributes.borrow().iter() {
                if let Some(suffix) = key.strip_prefix("data-") {
                    dataset
                        .props
                        .borrow_mut()
                        .insert(camel_case(suffix), Value::from(value.as_str()));
                }
            }
            dataset.value()
        }
        "title" | "lang" | "dir" => attr_string(this, name),
        "accessKey" | "accessKeyLabel" => attr_string(this, "accesskey"),
        "tabIndex" => {
            let default = match local_name(this) {
                "a" | "area" | "button" | "input" | "select" | "textarea" | "iframe" => 0,
                _ => -1,
            };
            let index = attr(this, "tabindex")
                .and_then(|value| value.trim().parse::<i32>().ok())
                .unwrap_or(default);
            Value::from(index)
        }
        "draggable" => Value::from(attr(this, "draggable").as_deref() == Some("true")),
        "contentEditable" => Value::from(content_editable(this)),
        "isContentEditable" => Value::from(is_content_editable(this)),
        "hidden" => Value::from(attr(this, "hidden").is_some()),
        "offsetParent" => opt(parent(this).filter(|parent| {
            is_element(parent) && !matches!(local_name(this), "body" | "html")
        })),
        "offsetTop" | "offsetLeft" | "offsetWidth" | "offsetHeight" | "clientTop"
        | "clientLeft" | "clientWidth" | "clientHeight" | "scrollTop" | "scrollLeft" => {
            Value::from(0.0)
        }
        _ => {
            return parent_node_get(state, this, name).or_else(|| html_get(state, this, name));
        }
    };
    Some(value)
}

fn camel_case(dashed: &str) -> String {
    let mut out = String::with_capacity(dashed.len());
    let mut upper = false;
    for c in dashed.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn content_editable(element: &MemObject) -> &'static str {
    match attr(element, "contenteditable").as_deref() {
        Some("") | Some("true") => "true",
        Some("false") => "false",
        _ => "inherit",
    }
}

fn is_content_editable(element: &Rc<MemObject>) -> bool {
    let mut current = Some(element.clone());
    while let Some(node) = current {
        match content_editable(&node) {
            "true" => return true,
            "false" => return false,
            _ => current = parent(&node).filter(|parent| is_element(parent)),
        }
    }
    false
}

fn form_owner(state: &HostState, element: &Rc<MemObject>) -> Option<Rc<MemObject>> {
    if let Some(id) = attr(element, "form") {
        return find_by_id(state, &id).filter(|form| local_name(form) == "form");
    }
    let mut current = parent(element);
    while let Some(node) = current {
        if local_name(&node) == "form" {
            return Some(node);
        }
        current = parent(&node);
    }
    None
}

fn label_control(state: &HostState, label: &Rc<MemObject>) -> Option<Rc<MemObject>> {
    match attr(label, "for") {
        Some(id) => find_by_id(state, &id).filter(|control| LABELABLE.contains(&local_name(control))),
        None => descendant_elements(label)
            .into_iter()
            .find(|control| LABELABLE.contains(&local_name(control))),
    }
}

fn labels_for(state: &HostState, control: &Rc<MemObject>) -> Vec<Rc<MemObject>> {
    let Some(document) = state.document() else {
        return Vec::new();
    };
    descendant_elements(&document)
        .into_iter()
        .filter(|label| local_name(label) == "label")
        .filter(|label| {
            label_control(state, label).is_some_and(|target| Rc::ptr_eq(&target, control))
        })
        .collect()
}

fn option_value(option: &MemObject) -> String {
    attr(option, "value").unwrap_or_else(|| text_content(option).trim().to_string())
}

fn control_value(control: &MemObject) -> String {
    control
        .get("value")
        .ok()
        .and_then(|value| String::from_value(value).ok())
        .unwrap_or_default()
}

fn validity(control: &MemObject) -> (bool, Option<String>) {
    let required = attr(control, "required").is_some();
    let missing = required
        && match attr(control, "type").as_deref() {
            Some("checkbox") | Some("radio") => !matches!(
                control.get("checked"),
                Ok(Value::Bool(true))
            ),
            _ => control_value(control).is_empty(),
        };
    let custom = match control.prop("customValidity") {
        Some(Value::String(message)) if !message.is_empty() => Some(message),
        _ => None,
    };
    (missing, custom)
}

fn check_control(state: &Rc<HostState>, control: &Rc<MemObject>) -> Result<bool, HostError> {
    let (missing, custom) = validity(control);
    let valid = !missing && custom.is_none();
    if !valid {
        state.fire(control, "Event", "invalid", false, true)?;
    }
    Ok(valid)
}

fn html_get(state: &Rc<HostState>, this: &Rc<MemObject>, name: &str) -> Option<Value> {
    let tag = local_name(this);
    let value = match name {
        "form" if FORM_ASSOCIATED.contains(&tag) => opt(form_owner(state, this)),
        "labels" if LABELABLE.contains(&tag) => {
            let labels = labels_for(state, this);
            state.new_sequence("NodeList", values(&labels)).value()
        }
        "control" if tag == "label" => opt(label_control(state, this)),
        "htmlFor" if tag == "label" => attr_string(this, "for"),
        "htmlFor" if tag == "output" => token_list(state, this, "htmlFor", "for", true),
        "options" if tag == "select" || tag == "datalist" => {
            live(state, this, "options", Query::Options, "HTMLCollection")
        }
        "selectedOptions" if tag == "select" => live(
            state,
            this,
            "selectedOptions",
            Query::SelectedOptions,
            "HTMLCollection",
        ),
        "selectedIndex" if tag == "select" => {
            let index = resolve(this, &Query::Options)
                .iter()
                .position(|option| is_selected(option))
                .map(|index| index as f64)
                .unwrap_or(-1.0);
            Value::from(index)
        }
        "length" if tag == "select" => Value::from(resolve(this, &Query::Options).len()),
        "length" if tag == "form" => Value::from(resolve(this, &Query::FormControls).len()),
        "elements" if tag == "form" || tag == "fieldset" => {
            live(state, this, "elements", Query::FormControls, "HTMLCollection")
        }
        "areas" if tag == "map" => live(state, this, "areas", Query::Areas, "HTMLCollection"),
        "cells" if tag == "tr" => live(state, this, "cells", Query::Cells, "HTMLCollection"),
        "rows" if tag == "table" || TABLE_SECTIONS.contains(&tag) => {
            live(state, this, "rows", Query::Rows, "HTMLCollection")
        }
        "list" if tag == "input" => opt(attr(this, "list")
            .and_then(|id| find_by_id(state, &id))
            .filter(|list| local_name(list) == "datalist")),
        "relList" if matches!(tag, "a" | "area" | "link") => {
            token_list(state, this, "relList", "rel", false)
        }
        "sizes" if tag == "link" => token_list(state, this, "sizes", "sizes", true),
        "value" => match tag {
            "select" => Value::from(
                resolve(this, &Query::Options)
                    .iter()
                    .find(|option| is_selected(option))
                    .map(|option| option_value(option))
                    .unwrap_or_default(),
            ),
            "option" => Value::from(option_value(this)),
            "textarea" | "output" => Value::from(text_content(this)),
            "input" | "button" | "data" | "param" | "li" | "meter" | "progress" => {
                attr_string(this, "value")
            }
            _ => return None,
        },
        "defaultValue" if tag == "input" => attr_string(this, "value"),
        "defaultValue" if tag == "textarea" || tag == "output" => Value::from(text_content(this)),
        "checked" | "defaultChecked" if tag == "input" => Value::from(attr(this, "checked").is_some()),
        "selected" if tag == "option" => Value::from(attr(this, "selected").is_some()),
        "defaultSelected" if tag == "option" => Value::from(attr(this, "selected").is_some()),
        "index" if tag == "option" => {
            let select = parent(this).and_then(|container| {
                if local_name(&container) == "select" {
                    Some(container)
                } else {
                    parent(&container).filter(|grand| local_name(grand) == "select")
                }
            });
            let index = select
                .and_then(|select| {
                    resolve(&select, &Query::Options)
                        .iter()
                        .position(|option| Rc::ptr_eq(option, this))
                })
                .unwrap_or(0);
            Value::from(index)
        }
        "label" if tag == "option" => {
            Value::from(attr(this, "label").unwrap_or_else(|| text_content(this).trim().to_string()))
        }
        "type" if tag == "input" => {
            Value::from(attr(this, "type").unwrap_or_else(|| String::from("text")))
        }
        "type" if tag == "button" => {
            Value::from(attr(this, "type").unwrap_or_else(|| String::from("submit")))
        }
        "type" if tag == "select" => Value::from(if attr(this, "multiple").is_some() {
            "select-multiple"
        } else {
            "select-one"
        }),
        "type" if tag == "textarea" => Value::from("textarea"),
        "paused" if tag == "audio" || tag == "video" => Value::from(true),
        "ended" if tag == "audio" || tag == "video" => Value::from(false),
        "currentTime" if tag == "audio" || tag == "video" => Value::from(0.0),
        "duration" if tag == "audio" || tag == "video" => Value::from(f64::NAN),
        "volume" if tag == "audio" || tag == "video" => Value::from(1.0),
        "currentSrc" if tag == "audio" || tag == "video" => attr_string(this, "src"),
        "contentDocument" | "contentWindow"
            if matches!(tag, "iframe" | "frame" | "object" | "embed") =>
        {
            Value::Null
        }
        "validity" if FORM_CONTROLS.contains(&tag) => {
            let (missing, custom) = validity(this);
            let state_object = state.new_plain("ValidityState");
            let mut props = state_object.props.borrow_mut();
            for flag in [
                "typeMismatch",
                "patternMismatch",
                "tooLong",
                "tooShort",
                "rangeUnderflow",
                "rangeOverflow",
                "stepMismatch",
                "badInput",
            ] {
                props.insert(String::from(flag), Value::from(false));
            }
            props.insert(String::from("valueMissing"), Value::from(missing));
            props.insert(String::from("customError"), Value::from(custom.is_some()));
            props.insert(
                String::from("valid"),
                Value::from(!missing && custom.is_none()),
            );
            drop(props);
            state_object.value()
        }
        "willValidate" if FORM_CONTROLS.contains(&tag) => Value::from(true),
        "validationMessage" if FORM_CONTROLS.contains(&tag) => {
            let (missing, custom) = validity(this);
            Value::from(match (custom, missing) {
                (Some(message), _) => message,
                (None, true) => String::from("Please fill out this field."),
                (None, false) => String::new(),
            })
        }
        "href" if matches!(tag, "a" | "area" | "link" | "base") => Value::from(
            element_url(state, this)
                .map(|url| url.to_string())
                .or_else(|| attr(this, "href"))
                .unwrap_or_default(),
        ),
        component if (tag == "a" || tag == "area") && URL_COMPONENTS.contains(&component) => {
            Value::from(
                element_url(state, this)
                    .and_then(|url| url_component(&url, component))
                    .unwrap_or_default(),
            )
        }
        "text" if matches!(tag, "a" | "option" | "title" | "script") => {
            Value::from(text_content(this))
        }
        _ => {
            if let Some((attribute, default)) = reflected_number(tag, name) {
                Value::from(
                    attr(this, attribute)
                        .and_then(|value| value.trim().parse::<f64>().ok())
                        .unwrap_or(default),
                )
            } else if let Some((_, attribute)) =
                REFLECTED_STRINGS.iter().find(|(prop, _)| *prop == name)
            {
                attr_string(this, attribute)
            } else if let Some((_, attribute)) =
                REFLECTED_BOOLS.iter().find(|(prop, _)| *prop == name)
            {
                Value::from(attr(this, attribute).is_some())
            } else {
                return None;
            }
        }
    };
    Some(value)
}

fn document_body(document: &MemObject) -> Option<Rc<MemObject>> {
    let html = element_children(document).into_iter().next()?;
    element_children(&html)
        .into_iter()
        .find(|child| matches!(local_name(child), "body" | "frameset"))
}

fn document_title(document: &MemObject) -> String {
    descendant_elements(document)
        .into_iter()
        .find(|element| local_name(element) == "title")
        .map(|title| {
            text_content(&title)
                .split_ascii_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

fn set_document_title(state: &Rc<HostState>, document: &Rc<MemObject>, text: &str) {
    let existing = descendant_elements(document)
        .into_iter()
        .find(|element| local_name(element) == "title");
    let title = match existing {
        Some(title) => title,
        None => {
            let title = create_element(state, "title", None);
            let head = element_children(document)
                .into_iter()
                .next()
                .and_then(|html| {
                    element_children(&html)
                        .into_iter()
                        .find(|child| local_name(child) == "head")
                });
            match head {
                Some(head) => append(&head, &title),
                None => return,
            }
            title
        }
    };
    replace_children(state, &title, text);
}

fn document_get(state: &Rc<HostState>, this: &Rc<MemObject>, name: &str) -> Option<Value> {
    let value = match name {
        "documentElement" => opt(element_children(this).into_iter().next()),
        "head" => opt(element_children(this)
            .into_iter()
            .next()
            .and_then(|html| {
                element_children(&html)
                    .into_iter()
                    .find(|child| local_name(child) == "head")
            })),
        "body" => opt(document_body(this)),
        "title" => Value::from(document_title(this)),
        "forms" => live(state, this, "forms", Query::Forms, "HTMLCollection"),
        "images" => live(state, this, "images", Query::Images, "HTMLCollection"),
        "links" => live(state, this, "links", Query::Links, "HTMLCollection"),
        "scripts" => live(state, this, "scripts", Query::Scripts, "HTMLCollection"),
        "plugins" | "embeds" => live(state, this, "embeds", Query::Embeds, "HTMLCollection"),
        "activeElement" => opt(state
            .active_element
            .borrow()
            .upgrade()
            .filter(|element| is_connected(state, element))
            .or_else(|| document_body(this))),
        "cookie" | "referrer" => Value::from(""),
        "designMode" => Value::from("off"),
        "domain" => Value::from(
            state
                .url()
                .and_then(|url| url.host_str().map(str::to_string))
                .unwrap_or_default(),
        ),
        "URL" | "documentURI" => Value::from(document_url(state)),
        "location" => state
            .location
            .borrow()
            .upgrade()
            .map(|location| location.value())
            .unwrap_or(Value::Null),
        "readyState" => Value::from("complete"),
        "defaultView" => opt(state.window()),
        "characterSet" | "charset" => Value::from("UTF-8"),
        "contentType" => Value::from("text/html"),
        "compatMode" => Value::from("CSS1Compat"),
        "doctype" => opt(children(this)
            .into_iter()
            .find(|child| node_type(child) == Some(DOCUMENT_TYPE_NODE))),
        "hidden" => Value::from(false),
        "visibilityState" => Value::from("visible"),
        _ => return parent_node_get(state, this, name),
    };
    Some(value)
}

// ---- property writes ----

pub(super) fn set(
    state: &Rc<HostState>,
    this: &Rc<MemObject>,
    name: &str,
    value: &Value,
) -> Result<bool, HostError> {
    let Some(node) = this.node() else {
        return Ok(false);
    };
    let text = String::from_value(value.clone()).unwrap_or_default();
    match (node.node_type, name) {
        (TEXT_NODE | COMMENT_NODE, "nodeValue" | "data" | "textContent") => {
            *node.data.borrow_mut() = text;
        }
        (ELEMENT_NODE | DOCUMENT_FRAGMENT_NODE, "textContent") => {
            replace_children(state, this, &text);
        }
        (DOCUMENT_NODE, "title") => set_document_title(state, this, &text),
        (ELEMENT_NODE, _) => return element_set(state, this, name, value, text),
        _ => return Ok(false),
    }
    Ok(true)
}

fn element_set(
    state: &Rc<HostState>,
    this: &Rc<MemObject>,
    name: &str,
    value: &Value,
    text: String,
) -> Result<bool, HostError> {
    let tag = local_name(this).to_string();
    match name {
        "id" => set_attr(this, "id", text),
        "className" => set_attr(this, "class", text),
        "innerHTML" => {
            for child in children(this) {
                detach(&child);
            }
            for parsed in fixture::parse_fragment(state, &text) {
                append(this, &parsed);
            }
        }
        "outerHTML" => {
            let Some(parent) = parent(this) else {
                return Ok(true);
            };
            for parsed in fixture::parse_fragment(state, &text) {
                insert(&parent, &parsed, Some(this))?;
            }
            detach(this);
        }
        "title" | "lang" | "dir" => set_attr(this, name, text),
        "accessKey" => set_attr(this, "accesskey", text),
        "tabIndex" => set_attr(this, "tabindex", text),
        "draggable" => set_attr(this, "draggable", truthy(Some(value)).to_string()),
        "contentEditable" => set_attr(this, "contenteditable", text),
        "hidden" => set_bool_attr(this, "hidden", truthy(Some(value))),
        "htmlFor" if tag == "label" => set_attr(this, "for", text),
        "href" if matches!(tag.as_str(), "a" | "area" | "link" | "base") => {
            set_attr(this, "href", text)
        }
        component if (tag == "a" || tag == "area") && URL_COMPONENTS.contains(&component) => {
            if let Some(mut url) = element_url(state, this) {
                set_url_component(&mut url, component, &text);
                set_attr(this, "href", url.to_string());
            }
        }
        "text" if matches!(tag.as_str(), "a" | "option" | "title" | "script") => {
            replace_children(state, this, &text)
        }
        "value" if tag == "select" => {
            for option in resolve(this, &Query::Options) {
                let selected = option_value(&option) == text;
                option
                    .props
                    .borrow_mut()
                    .insert(String::from("selected"), Value::from(selected));
            }
        }
        _ => {
            if let Some((attribute, _)) = reflected_number(&tag, name) {
                set_attr(this, attribute, text);
            } else if let Some((_, attribute)) =
                REFLECTED_STRINGS.iter().find(|(prop, _)| *prop == name)
            {
                set_attr(this, attribute, text);
            } else if let Some((_, attribute)) =
                REFLECTED_BOOLS.iter().find(|(prop, _)| *prop == name)
            {
                set_bool_attr(this, attribute, truthy(Some(value)));
            } else {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

// ---- method calls ----

fn node_arg(
    state: &HostState,
    args: &[Value],
    position: usize,
) -> Result<Rc<MemObject>, HostError> {
    optional_node_arg(state, args, position).ok_or_else(|| {
        HostError::Exception(format!(
            "TypeError: parameter {} is not of type 'Node'",
            position + 1
        ))
    })
}

fn optional_node_arg(state: &HostState, args: &[Value], position: usize) -> Option<Rc<MemObject>> {
    args.get(position)
        .and_then(|value| state.lookup(value))
        .filter(|object| object.node().is_some())
}

fn default_namespace(object: &Rc<MemObject>) -> Option<&'static str> {
    match object.node()?.node_type {
        ELEMENT_NODE => object.node()?.namespace,
        DOCUMENT_NODE => element_children(object)
            .first()
            .and_then(|root| root.node().and_then(|node| node.namespace)),
        _ => parent(object).and_then(|parent| default_namespace(&parent)),
    }
}

pub(super) fn call(
    state: &Rc<HostState>,
    this: &Rc<MemObject>,
    method: &str,
    args: &[Value],
) -> Result<Option<Value>, HostError> {
    let Some(node) = this.node() else {
        return Ok(None);
    };
    let value = match method {
        "appendChild" => {
            let child = node_arg(state, args, 0)?;
            insert(this, &child, None)?;
            child.value()
        }
        "insertBefore" => {
            let child = node_arg(state, args, 0)?;
            let reference = optional_node_arg(state, args, 1);
            insert(this, &child, reference.as_ref())?;
            child.value()
        }
        "removeChild" => {
            let child = node_arg(state, args, 0)?;
            if !is_child(this, &child) {
                return Err(not_found());
            }
            detach(&child);
            child.value()
        }
        "replaceChild" => {
            let new_child = node_arg(state, args, 0)?;
            let old_child = node_arg(state, args, 1)?;
            if !is_child(this, &old_child) {
                return Err(not_found());
            }
            if !Rc::ptr_eq(&new_child, &old_child) {
                insert(this, &new_child, Some(&old_child))?;
                detach(&old_child);
            }
            old_child.value()
        }
        "hasChildNodes" => Value::from(!node.children.borrow().is_empty()),
        "contains" => Value::from(
            optional_node_arg(state, args, 0)
                .is_some_and(|other| is_inclusive_ancestor(this, &other)),
        ),
        "cloneNode" => clone_node(state, this, truthy(args.first())).value(),
        "isEqualNode" => Value::from(
            optional_node_arg(state, args, 0).is_some_and(|other| is_equal(this, &other)),
        ),
        "isSameNode" => Value::from(
            optional_node_arg(state, args, 0).is_some_and(|other| Rc::ptr_eq(this, &other)),
        ),
        "compareDocumentPosition" => {
            Value::from(compare_position(this, &node_arg(state, args, 0)?))
        }
        "normalize" => {
            normalize(this);
            Value::Undefined
        }
        "lookupPrefix" => Value::Null,
        "lookupNamespaceURI" => {
            let prefix = string_arg(args, 0);
            if prefix.is_empty() {
                default_namespace(this).map(Value::from).unwrap_or(Value::Null)
            } else {
                Value::Null
            }
        }
        "isDefaultNamespace" => {
            let namespace = string_arg(args, 0);
            Value::from(default_namespace(this).unwrap_or("") == namespace)
        }
        _ => {
            return match node.node_type {
                ELEMENT_NODE => element_call(state, this, method, args),
                DOCUMENT_NODE => document_call(state, this, method, args),
                DOCUMENT_FRAGMENT_NODE => parent_node_call(state, this, method, args),
                TEXT_NODE | COMMENT_NODE if method == "remove" => {
                    detach(this);
                    Ok(Some(Value::Undefined))
                }
                _ => Ok(None),
            }
        }
    };
    Ok(Some(value))
}

fn validate_name(name: &str) -> Result<(), HostError> {
    if name.is_empty() || name.chars().any(|c| c.is_ascii_whitespace() || c == '<' || c == '>') {
        return Err(HostError::Exception(format!(
            "InvalidCharacterError: '{name}' is not a valid name"
        )));
    }
    Ok(())
}

fn parent_node_call(
    state: &Rc<HostState>,
    this: &Rc<MemObject>,
    method: &str,
    args: &[Value],
) -> Result<Option<Value>, HostError> {
    let value = match method {
        "querySelector" => {
            let selectors = SelectorList::parse(&string_arg(args, 0))?;
            opt(Mirror::of(this).select(&selectors, this).into_iter().next())
        }
        "querySelectorAll" => {
            let selectors = SelectorList::parse(&string_arg(args, 0))?;
            let found = Mirror::of(this).select(&selectors, this);
            state.new_sequence("NodeList", values(&found)).value()
        }
        "getElementsByTagName" => {
            fresh_live(state, this, Query::TagName(string_arg(args, 0)), "HTMLCollection").value()
        }
        "getElementsByTagNameNS" => {
            fresh_live(state, this, Query::TagName(string_arg(args, 1)), "HTMLCollection").value()
        }
        "getElementsByClassName" => {
            let names = string_arg(args, 0)
                .split_ascii_whitespace()
                .map(str::to_string)
                .collect();
            fresh_live(state, this, Query::ClassNames(names), "HTMLCollection").value()
        }
        "getElementById" if !is_element(this) => {
            let id = string_arg(args, 0);
            opt(descendant_elements(this)
                .into_iter()
                .find(|element| !id.is_empty() && attr(element, "id").as_deref() == Some(id.as_str())))
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn element_call(
    state: &Rc<HostState>,
    this: &Rc<MemObject>,
    method: &str,
    args: &[Value],
) -> Result<Option<Value>, HostError> {
    let namespaced = method.ends_with("NS");
    let name_position = usize::from(namespaced);
    let value = match method {
        "getAttribute" | "getAttributeNS" => {
            let name = normalize_attr_name(this, &string_arg(args, name_position));
            attr(this, &name).map(Value::from).unwrap_or(Value::Null)
        }
        "setAttribute" | "setAttributeNS" => {
            let name = string_arg(args, name_position);
            validate_name(&name)?;
            let name = normalize_attr_name(this, &name);
            set_attr(this, &name, string_arg(args, name_position + 1));
            Value::Undefined
        }
        "hasAttribute" | "hasAttributeNS" => {
            let name = normalize_attr_name(this, &string_arg(args, name_position));
            Value::from(attr(this, &name).is_some())
        }
        "removeAttribute" | "removeAttributeNS" => {
            let name = normalize_attr_name(this, &string_arg(args, name_position));
            remove_attr(this, &name);
            Value::Undefined
        }
        "getBoundingClientRect" => {
            let read = |name: &str| match this.prop(name) {
                Some(Value::Number(n)) => n,
                _ => 0.0,
            };
            let (left, top) = (read("offsetLeft"), read("offsetTop"));
            let (width, height) = (read("offsetWidth"), read("offsetHeight"));
            let rect = state.new_plain("DOMRect");
            let mut props = rect.props.borrow_mut();
            for (key, value) in [
                ("x", left),
                ("y", top),
                ("left", left),
                ("top", top),
                ("width", width),
                ("height", height),
                ("right", left + width),
                ("bottom", top + height),
            ] {
                props.insert(String::from(key), Value::from(value));
            }
            drop(props);
            rect.value()
        }
        "matches" => {
            let selectors = SelectorList::parse(&string_arg(args, 0))?;
            Value::from(Mirror::of(this).matches(&selectors, this))
        }
        "closest" => {
            let selectors = SelectorList::parse(&string_arg(args, 0))?;
            let mirror = Mirror::of(this);
            let mut current = Some(this.clone());
            let mut found = None;
            while let Some(candidate) = current {
                if is_element(&candidate) && mirror.matches(&selectors, &candidate) {
                    found = Some(candidate);
                    break;
                }
                current = parent(&candidate);
            }
            opt(found)
        }
        "click" => {
            state.fire(this, "MouseEvent", "click", true, true)?;
            Value::Undefined
        }
        "focus" => {
            *state.active_element.borrow_mut() = Rc::downgrade(this);
            state.fire(this, "FocusEvent", "focus", false, false)?;
            Value::Undefined
        }
        "blur" => {
            let focused = state
                .active_element
                .borrow()
                .upgrade()
                .is_some_and(|active| Rc::ptr_eq(&active, this));
            if focused {
                *state.active_element.borrow_mut() = Weak::new();
                state.fire(this, "FocusEvent", "blur", false, false)?;
            }
            Value::Undefined
        }
        _ => {
            if let Some(value) = parent_node_call(state, this, method, args)? {
                return Ok(Some(value));
            }
            return html_call(state, this, method, args);
        }
    };
    Ok(Some(value))
}

fn index_size_error(index: i64) -> HostError {
    HostError::Exception(format!(
        "IndexSizeError: The index provided ({index}) is outside the range."
    ))
}

/// Insert `node` at `index` among `existing` siblings; `-1` appends to
/// `container`.
fn insert_at(
    container: &Rc<MemObject>,
    node: &Rc<MemObject>,
    index: i64,
    existing: &[Rc<MemObject>],
) -> Result<(), HostError> {
    if index == -1 || index == existing.len() as i64 {
        let target = match existing.last() {
            Some(last) if index != -1 || local_name(container) == "table" => {
                parent(last).unwrap_or_else(|| container.clone())
            }
            _ => container.clone(),
        };
        return insert(&target, node, None);
    }
    if index < -1 || index > existing.len() as i64 {
        return Err(index_size_error(index));
    }
    let reference = &existing[index as usize];
    let target = parent(reference).unwrap_or_else(|| container.clone());
    insert(&target, node, Some(reference))
}

fn signed_index(args: &[Value]) -> i64 {
    match args.first() {
        Some(Value::Number(n)) if n.is_finite() => *n as i64,
        _ => -1,
    }
}

fn html_call(
    state: &Rc<HostState>,
    this: &Rc<MemObject>,
    method: &str,
    args: &[Value],
) -> Result<Option<Value>, HostError> {
    let tag = local_name(this).to_string();
    let value = match (tag.as_str(), method) {
        ("select", "item") => opt(index_arg(args, 0)
            .and_then(|index| resolve(this, &Query::Options).get(index).cloned())),
        ("select", "namedItem") => {
            let wanted = string_arg(args, 0);
            opt(resolve(this, &Query::Options).into_iter().find(|option| {
                attr(option, "id").as_deref() == Some(wanted.as_str())
                    || attr(option, "name").as_deref() == Some(wanted.as_str())
            }))
        }
        ("select", "add") => {
            let option = node_arg(state, args, 0)?;
            let before = match args.get(1) {
                Some(Value::Number(_)) => {
                    index_arg(args, 1).and_then(|index| resolve(this, &Query::Options).get(index).cloned())
                }
                _ => optional_node_arg(state, args, 1),
            };
            match before {
                Some(reference) => {
                    let target = parent(&reference).unwrap_or_else(|| this.clone());
                    insert(&target, &option, Some(&reference))?;
                }
                None => insert(this, &option, None)?,
            }
            Value::Undefined
        }
        ("select", "remove") if !args.is_empty() => {
            if let Some(option) =
                index_arg(args, 0).and_then(|index| resolve(this, &Query::Options).get(index).cloned())
            {
                detach(&option);
            }
            Value::Undefined
        }
        ("form", "submit") => {
            tracing::trace!(target: "dom_facade", form = %this.id, "host form submitted");
            this.props
                .borrow_mut()
                .insert(String::from("submitted"), Value::from(true));
            Value::Undefined
        }
        ("form", "requestSubmit") => {
            if state.fire(this, "Event", "submit", true, true)? {
                this.props
                    .borrow_mut()
                    .insert(String::from("submitted"), Value::from(true));
            }
            Value::Undefined
        }
        ("form", "reset") => {
            if state.fire(this, "Event", "reset", true, true)? {
                for control in resolve(this, &Query::FormControls) {
                    let mut props = control.props.borrow_mut();
                    props.remove("value");
                    props.remove("checked");
                    drop(props);
                    for option in resolve(&control, &Query::Options) {
                        option.props.borrow_mut().remove("selected");
                    }
                }
            }
            Value::Undefined
        }
        ("form", "checkValidity" | "reportValidity") => {
            let mut valid = true;
            for control in resolve(this, &Query::FormControls) {
                valid &= check_control(state, &control)?;
            }
            Value::from(valid)
        }
        (control, "checkValidity" | "reportValidity") if FORM_CONTROLS.contains(&control) => {
            Value::from(check_control(state, this)?)
        }
        (control, "setCustomValidity") if FORM_CONTROLS.contains(&control) => {
            this.props.borrow_mut().insert(
                String::from("customValidity"),
                Value::from(string_arg(args, 0)),
            );
            Value::Undefined
        }
        ("tr", "insertCell") => {
            let cell = create_element(state, "td", None);
            insert_at(this, &cell, signed_index(args), &resolve(this, &Query::Cells))?;
            cell.value()
        }
        ("tr", "deleteCell") => {
            let cells = resolve(this, &Query::Cells);
            let index = signed_index(args);
            let victim = if index == -1 {
                cells.last().cloned()
            } else {
                cells.get(index as usize).cloned()
            };
            match victim {
                Some(cell) if index >= -1 => detach(&cell),
                _ => return Err(index_size_error(index)),
            }
            Value::Undefined
        }
        (section, "insertRow") if section == "table" || TABLE_SECTIONS.contains(&section) => {
            let row = create_element(state, "tr", None);
            let rows = resolve(this, &Query::Rows);
            let container = if section == "table" && rows.is_empty() {
                element_children(this)
                    .into_iter()
                    .filter(|child| local_name(child) == "tbody")
                    .last()
                    .unwrap_or_else(|| this.clone())
            } else {
                this.clone()
            };
            insert_at(&container, &row, signed_index(args), &rows)?;
            row.value()
        }
        (section, "deleteRow") if section == "table" || TABLE_SECTIONS.contains(&section) => {
            let rows = resolve(this, &Query::Rows);
            let index = signed_index(args);
            let victim = if index == -1 {
                rows.last().cloned()
            } else {
                rows.get(index as usize).cloned()
            };
            match victim {
                Some(row) if index >= -1 => detach(&row),
                _ => return Err(index_size_error(index)),
            }
            Value::Undefined
        }
        ("audio" | "video", "play" | "pause") => {
            let playing = method == "play";
            this.props
                .borrow_mut()
                .insert(String::from("paused"), Value::from(!playing));
            state.fire(this, "Event", method, false, false)?;
            Value::Undefined
        }
        ("audio" | "video", "load") => Value::Undefined,
        ("audio" | "video", "canPlayType") => Value::from(""),
        ("canvas", "getContext") => Value::Null,
        (_, "remove") => {
            detach(this);
            Value::Undefined
        }
        (_, "scrollIntoView") => Value::Undefined,
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn document_call(
    state: &Rc<HostState>,
    this: &Rc<MemObject>,
    method: &str,
    args: &[Value],
) -> Result<Option<Value>, HostError> {
    let value = match method {
        "createElement" => {
            let tag = string_arg(args, 0);
            validate_name(&tag)?;
            create_element(state, &tag, None).value()
        }
        "createElementNS" => {
            let namespace = string_arg(args, 0);
            let qualified = string_arg(args, 1);
            validate_name(&qualified)?;
            let local = qualified
                .rsplit_once(':')
                .map(|(_, local)| local)
                .unwrap_or(&qualified);
            match static_namespace(&namespace) {
                Some(HTML_NAMESPACE) => create_element(state, local, None).value(),
                resolved => create_element_ns(state, resolved, local, None).value(),
            }
        }
        "createTextNode" => create_text(state, &string_arg(args, 0)).value(),
        "createComment" => create_comment(state, &string_arg(args, 0)).value(),
        "createDocumentFragment" => create_fragment(state).value(),
        "importNode" => {
            let node = node_arg(state, args, 0)?;
            if node_type(&node) == Some(DOCUMENT_NODE) {
                return Err(HostError::Exception(String::from(
                    "NotSupportedError: a document cannot be imported",
                )));
            }
            clone_node(state, &node, truthy(args.get(1))).value()
        }
        "adoptNode" => {
            let node = node_arg(state, args, 0)?;
            if node_type(&node) == Some(DOCUMENT_NODE) {
                return Err(HostError::Exception(String::from(
                    "NotSupportedError: a document cannot be adopted",
                )));
            }
            detach(&node);
            node.value()
        }
        "elementFromPoint" => Value::Null,
        "hasFocus" => Value::from(true),
        "getElementsByName" => {
            let wanted = string_arg(args, 0);
            let found: Vec<Rc<MemObject>> = descendant_elements(this)
                .into_iter()
                .filter(|element| attr(element, "name").as_deref() == Some(wanted.as_str()))
                .collect();
            state.new_sequence("NodeList", values(&found)).value()
        }
        _ => return parent_node_call(state, this, method, args),
    };
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::super::MemoryHost;
    use crate::host::{Handle, HostError, Value};

    fn element(host: &MemoryHost, html: &str) -> Handle {
        let container = host.create_element("div");
        container.set("innerHTML", html).unwrap();
        container
            .get("firstElementChild")
            .unwrap()
            .into_handle()
            .unwrap()
    }

    fn count(document: &Handle, selector: &str) -> usize {
        document
            .call_as::<Handle>("querySelectorAll", &[Value::from(selector)])
            .unwrap()
            .get_as::<usize>("length")
            .unwrap()
    }

    #[test]
    fn selectors_match_compounds_and_combinators() {
        let host = MemoryHost::from_html(
            r#"<html><body><ul id="menu"><li class="item active" title="a,b">One</li><li class="item x">Two</li></ul><p class="item">x</p><p>y</p></body></html>"#,
        )
        .unwrap();
        let document = host.document();
        let active = document
            .call_as::<Handle>("querySelector", &[Value::from("#menu > li.item.active")])
            .unwrap();
        assert_eq!(active.get_as::<String>("textContent").unwrap(), "One");

        assert_eq!(count(&document, "ul .item"), 2);
        assert_eq!(count(&document, "li, p"), 4);
        assert_eq!(count(&document, "li:first-child"), 1);
        assert_eq!(count(&document, "ul + p"), 1);
        assert_eq!(count(&document, "ul ~ p"), 2);
        assert_eq!(count(&document, r#"[title="a,b"]"#), 1);
        assert_eq!(count(&document, "li:not(.x)"), 1);
        assert_eq!(count(&document, r#"[title^="a"]"#), 1);
        assert_eq!(count(&document, "p:last-child"), 1);

        assert!(matches!(
            document.call("querySelector", &[Value::from("li >")]),
            Err(HostError::Exception(message)) if message.starts_with("SyntaxError")
        ));
    }

    #[test]
    fn matches_and_closest_see_the_whole_tree() {
        let host = MemoryHost::from_html(
            r#"<body><section class="card"><h2>Title</h2><p><em>hi</em></p></section></body>"#,
        )
        .unwrap();
        let em = host
            .document()
            .call_as::<Handle>("querySelector", &[Value::from("em")])
            .unwrap();
        assert!(em
            .call_as::<bool>("matches", &[Value::from("h2 + p > em")])
            .unwrap());
        let card = em
            .call_as::<Handle>("closest", &[Value::from(".card")])
            .unwrap();
        assert_eq!(card.get_as::<String>("tagName").unwrap(), "SECTION");

        let detached = host.create_element("span");
        assert!(detached
            .call_as::<bool>("matches", &[Value::from("div span, span")])
            .unwrap());
        assert_eq!(
            detached.call("closest", &[Value::from("section")]).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn child_lists_are_live_and_query_results_are_not() {
        let host = MemoryHost::new();
        let list = host.create_element("ul");
        let live = list.get_as::<Handle>("childNodes").unwrap();
        let frozen = list
            .call_as::<Handle>("querySelectorAll", &[Value::from("li")])
            .unwrap();
        list.call("appendChild", &[Value::from(host.create_element("li"))])
            .unwrap();
        assert_eq!(live.get_as::<usize>("length").unwrap(), 1);
        assert_eq!(frozen.get_as::<usize>("length").unwrap(), 0);
        assert_eq!(list.get("childNodes").unwrap(), Value::from(live));
    }

    #[test]
    fn class_list_reflects_class_name() {
        let host = MemoryHost::new();
        let div = host.create_element("div");
        div.set("className", "a b").unwrap();
        let class_list = div.get_as::<Handle>("classList").unwrap();
        class_list.call("remove", &[Value::from("a")]).unwrap();
        class_list.call("add", &[Value::from("c")]).unwrap();
        assert_eq!(div.get_as::<String>("className").unwrap(), "b c");
        assert_eq!(
            div.call_as::<String>("getAttribute", &[Value::from("CLASS")])
                .unwrap(),
            "b c"
        );
    }

    #[test]
    fn inner_html_round_trips_through_the_parser() {
        let host = MemoryHost::new();
        let div = host.create_element("div");
        div.set("innerHTML", r#"<b title="a&quot;b">bold</b> &amp; text<br>"#)
            .unwrap();
        assert_eq!(
            div.get_as::<String>("innerHTML").unwrap(),
            r#"<b title="a&quot;b">bold</b> &amp; text<br>"#
        );
        assert_eq!(div.get_as::<usize>("childElementCount").unwrap(), 2);
    }

    #[test]
    fn inserting_an_ancestor_is_a_hierarchy_error() {
        let host = MemoryHost::new();
        let outer = host.create_element("div");
        let inner = host.create_element("span");
        outer.call("appendChild", &[Value::from(&inner)]).unwrap();
        let result = inner.call("appendChild", &[Value::from(&outer)]);
        assert!(matches!(result, Err(HostError::Exception(message)) if message.starts_with("HierarchyRequestError")));
    }

    #[test]
    fn anchors_expose_url_components() {
        let host = MemoryHost::new();
        host.set_url("https://example.com/base/index.html").unwrap();
        let anchor = element(&host, r#"<a href="../docs/page?q=1#top">docs</a>"#);
        assert_eq!(
            anchor.get_as::<String>("href").unwrap(),
            "https://example.com/docs/page?q=1#top"
        );
        assert_eq!(anchor.get_as::<String>("pathname").unwrap(), "/docs/page");
        assert_eq!(anchor.get_as::<String>("search").unwrap(), "?q=1");
        anchor.set("hash", "#bottom").unwrap();
        assert_eq!(
            anchor.call_as::<String>("getAttribute", &[Value::from("href")])
                .unwrap(),
            "https://example.com/docs/page?q=1#bottom"
        );
    }

    #[test]
    fn table_rows_and_cells_can_be_inserted() {
        let host = MemoryHost::new();
        let table = element(&host, "<table><tbody><tr><td>a</td></tr></tbody></table>");
        let row = table
            .call_as::<Handle>("insertRow", &[Value::from(-1)])
            .unwrap();
        row.call("insertCell", &[Value::from(-1)]).unwrap();
        row.call("insertCell", &[Value::from(0)]).unwrap();
        let rows = table.get_as::<Handle>("rows").unwrap();
        assert_eq!(rows.get_as::<usize>("length").unwrap(), 2);
        let cells = row.get_as::<Handle>("cells").unwrap();
        assert_eq!(cells.get_as::<usize>("length").unwrap(), 2);
        assert!(row.call("insertCell", &[Value::from(7)]).is_err());
    }

    #[test]
    fn compare_document_position_reports_containment() {
        let host = MemoryHost::new();
        let outer = element(&host, "<div><span></span></div>");
        let inner = outer.get_as::<Handle>("firstChild").unwrap();
        assert_eq!(
            outer
                .call_as::<u32>("compareDocumentPosition", &[Value::from(&inner)])
                .unwrap(),
            20
        );
        assert_eq!(
            inner
                .call_as::<u32>("compareDocumentPosition", &[Value::from(&outer)])
                .unwrap(),
            10
        );
    }
}

//! Fixture loading: HTML text and JSON literals into host objects.

use std::rc::Rc;

use anyhow::{anyhow, Result};
use kuchiki::parse_html;
use kuchiki::traits::*;
use kuchiki::NodeRef;

use super::{tree, HostState, MemObject};
use crate::host::Value;

pub(super) fn load_document(
    state: &Rc<HostState>,
    document: &Rc<MemObject>,
    html: &str,
) -> Result<()> {
    let parsed = parse_html().one(html);
    parsed
        .select_first("body, frameset")
        .map_err(|_| anyhow!("parsed document has no <body>"))?;

    for child in parsed.children() {
        if let Some(node) = convert(state, &child) {
            tree::append(document, &node);
        }
    }
    Ok(())
}

/// Parse `html` as the contents of a `<body>`.
pub(super) fn parse_fragment(state: &Rc<HostState>, html: &str) -> Vec<Rc<MemObject>> {
    let parsed = parse_html().one(format!("<body>{html}</body>"));
    let Ok(body) = parsed.select_first("body") else {
        return Vec::new();
    };
    body.as_node()
        .children()
        .filter_map(|child| convert(state, &child))
        .collect()
}

fn convert(state: &Rc<HostState>, node: &NodeRef) -> Option<Rc<MemObject>> {
    let converted = match node.data() {
        kuchiki::NodeData::Element(element) => {
            let local = &*element.name.local;
            let created = match tree::static_namespace(&element.name.ns) {
                Some(tree::HTML_NAMESPACE) => tree::create_element(state, local, None),
                namespace => tree::create_element_ns(state, namespace, local, None),
            };
            for (name, attribute) in element.attributes.borrow().map.iter() {
                tree::set_attr(&created, &name.local, attribute.value.clone());
            }
            for child in node.children() {
                if let Some(converted) = convert(state, &child) {
                    tree::append(&created, &converted);
                }
            }
            created
        }
        kuchiki::NodeData::Text(text) => tree::create_text(state, &text.borrow()),
        kuchiki::NodeData::Comment(text) => tree::create_comment(state, &text.borrow()),
        kuchiki::NodeData::Doctype(doctype) => tree::create_doctype(state, &doctype.name),
        _ => return None,
    };
    Some(converted)
}

/// JSON objects become plain `Object`s and arrays become `Array` sequences.
pub(super) fn value_from_json(state: &Rc<HostState>, json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(flag) => Value::from(*flag),
        serde_json::Value::Number(number) => Value::from(number.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(text) => Value::from(text.as_str()),
        serde_json::Value::Array(items) => {
            let items = items
                .iter()
                .map(|item| value_from_json(state, item))
                .collect();
            state.new_sequence("Array", items).value()
        }
        serde_json::Value::Object(entries) => {
            let object = state.new_plain("Object");
            for (key, entry) in entries {
                let value = value_from_json(state, entry);
                object.props.borrow_mut().insert(key.clone(), value);
            }
            object.value()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::MemoryHost;
    use crate::host::{Handle, Value};

    #[test]
    fn documents_keep_doctype_and_structure() {
        let host = MemoryHost::from_html(
            "<!DOCTYPE html><html><head><title> Hello   world </title></head><body><!-- note --><p>text</p></body></html>",
        )
        .unwrap();
        let document = host.document();
        assert_eq!(document.get_as::<String>("title").unwrap(), "Hello world");
        let doctype = document.get_as::<Handle>("doctype").unwrap();
        assert_eq!(doctype.get_as::<String>("name").unwrap(), "html");
        let body = document.get_as::<Handle>("body").unwrap();
        let comment = body.get_as::<Handle>("firstChild").unwrap();
        assert_eq!(comment.get_as::<u32>("nodeType").unwrap(), 8);
        assert_eq!(comment.get_as::<String>("data").unwrap(), " note ");
    }

    #[test]
    fn svg_elements_get_their_namespace() {
        let host = MemoryHost::from_html("<body><svg><circle r=\"2\"></circle></svg></body>").unwrap();
        let circle = host
            .document()
            .call_as::<Handle>("querySelector", &[Value::from("circle")])
            .unwrap();
        assert_eq!(
            circle.get_as::<String>("namespaceURI").unwrap(),
            "http://www.w3.org/2000/svg"
        );
        let constructor = circle.get_as::<Handle>("constructor").unwrap();
        assert_eq!(constructor.get_as::<String>("name").unwrap(), "SVGElement");
    }

    #[test]
    fn json_objects_become_plain_objects() {
        let host = MemoryHost::new();
        let value = host.value_from_json(&serde_json::json!({"list": [1, "two"], "flag": true}));
        let object = value.into_handle().unwrap();
        assert!(object.get_as::<bool>("flag").unwrap());
        let list = object.get_as::<Handle>("list").unwrap();
        assert_eq!(list.get_as::<usize>("length").unwrap(), 2);
        assert_eq!(list.get_as::<String>("1").unwrap(), "two");
    }
}

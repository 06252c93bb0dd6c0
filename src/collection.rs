//! Freezing host collections into snapshots.
//!
//! Hosts hand out collections in two shapes: array-likes that are read by
//! index (`get("0")`), and list objects with an `item(i)` accessor. Both are
//! often live. A snapshot reads `length` once and copies every entry out, so
//! later host mutation never shows through. Entry `i` of a snapshot is entry
//! `i` of the host collection.

use crate::element::AnyElement;
use crate::error::{BridgeError, Result};
use crate::host::{Handle, Value};
use crate::html::AnyHtmlElement;
use crate::node::AnyNode;
use crate::realm::Realm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionShape {
    /// Built by the configured array constructor; entries are properties.
    Indexed,
    /// Entries come from `item(i)`.
    ItemAccessor,
}

pub fn shape_of(realm: &Realm, collection: &Handle) -> Result<CollectionShape> {
    let array = &realm.config().array_constructor;
    if realm.resolver().has_descriptor(collection, array)? {
        Ok(CollectionShape::Indexed)
    } else {
        Ok(CollectionShape::ItemAccessor)
    }
}

/// Upper bound on capacity reserved up front; `length` comes from the host.
const PREALLOCATED_ENTRIES: usize = 1024;

/// The handles in `collection`, in order. Null and undefined collections
/// are empty. An entry that is not an object fails the whole snapshot with
/// [`BridgeError::CollectionHole`].
pub fn snapshot_handles(realm: &Realm, collection: &Value) -> Result<Vec<Handle>> {
    let Some(list) = collection.as_handle() else {
        return Ok(Vec::new());
    };
    let shape = shape_of(realm, list)?;
    let length: usize = list.get_as("length")?;
    let mut handles = Vec::with_capacity(length.min(PREALLOCATED_ENTRIES));
    for index in 0..length {
        let entry = match shape {
            CollectionShape::Indexed => list.get(&index.to_string())?,
            CollectionShape::ItemAccessor => list.call("item", &[Value::from(index)])?,
        };
        match entry {
            Value::Object(handle) => handles.push(handle),
            other => {
                return Err(BridgeError::CollectionHole {
                    index,
                    length,
                    found: other.kind(),
                })
            }
        }
    }
    Ok(handles)
}

/// Snapshot `collection`, wrapping each entry with `wrap`.
pub fn snapshot<T, F>(realm: &Realm, collection: &Value, wrap: F) -> Result<Vec<T>>
where
    F: FnMut(Handle) -> Result<T>,
{
    snapshot_handles(realm, collection)?
        .into_iter()
        .map(wrap)
        .collect()
}

pub fn snapshot_nodes(realm: &Realm, collection: &Value) -> Result<Vec<AnyNode>> {
    snapshot(realm, collection, |handle| AnyNode::from_handle(realm, handle))
}

pub fn snapshot_elements(realm: &Realm, collection: &Value) -> Result<Vec<AnyElement>> {
    snapshot(realm, collection, |handle| AnyElement::from_handle(realm, handle))
}

pub fn snapshot_html_elements(realm: &Realm, collection: &Value) -> Result<Vec<AnyHtmlElement>> {
    snapshot(realm, collection, |handle| {
        AnyHtmlElement::from_handle(realm, handle)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;
    use crate::host::memory::MemoryHost;
    use crate::node::Node;
    use crate::tag::{NodeTag, TypeTag};

    #[test]
    fn both_shapes_are_detected() {
        let host = MemoryHost::new();
        let realm = Realm::new(host.global(), BridgeConfig::default());
        let array = host.create_array(Vec::new());
        let children = host.create_element("div").get_as::<Handle>("children").unwrap();
        assert_eq!(shape_of(&realm, &array).unwrap(), CollectionShape::Indexed);
        assert_eq!(shape_of(&realm, &children).unwrap(), CollectionShape::ItemAccessor);
    }

    #[test]
    fn live_lists_are_frozen() {
        let host = MemoryHost::new();
        let realm = Realm::new(host.global(), BridgeConfig::default());
        let list = host.create_element("ul");
        list.call("appendChild", &[Value::from(host.create_element("li"))])
            .unwrap();
        let live = list.get("children").unwrap();
        let frozen = snapshot_elements(&realm, &live).unwrap();
        list.call("appendChild", &[Value::from(host.create_element("li"))])
            .unwrap();
        assert_eq!(frozen.len(), 1);
        assert_eq!(snapshot_elements(&realm, &live).unwrap().len(), 2);
    }

    #[test]
    fn entries_keep_their_own_types() {
        let host = MemoryHost::new();
        let realm = Realm::new(host.global(), BridgeConfig::default());
        let array = host.create_array(vec![
            Value::from(host.create_element("a")),
            Value::from(host.create_text("t")),
        ]);
        let nodes = snapshot_nodes(&realm, &Value::from(array)).unwrap();
        let tags: Vec<&TypeTag> = nodes.iter().map(|node| node.tag()).collect();
        assert_eq!(
            tags,
            vec![&TypeTag::Node(NodeTag::Anchor), &TypeTag::Node(NodeTag::Text)]
        );
    }

    #[test]
    fn oversized_lengths_only_fail_at_the_first_hole() {
        let host = MemoryHost::new();
        let realm = Realm::new(host.global(), BridgeConfig::default());
        let array = host.create_object(&host.constructor("Array").unwrap());
        array.set("0", host.create_element("a")).unwrap();
        array.set("length", 1e12).unwrap();
        assert_eq!(shape_of(&realm, &array).unwrap(), CollectionShape::Indexed);
        match snapshot_handles(&realm, &Value::from(array)) {
            Err(BridgeError::CollectionHole { index, found, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(found, "undefined");
            }
            other => panic!("expected a hole, got {other:?}"),
        }
    }

    #[test]
    fn absent_collections_are_empty() {
        let host = MemoryHost::new();
        let realm = Realm::new(host.global(), BridgeConfig::default());
        assert!(snapshot_nodes(&realm, &Value::Null).unwrap().is_empty());
        assert!(snapshot_nodes(&realm, &Value::Undefined).unwrap().is_empty());
    }
}

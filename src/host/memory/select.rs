//! CSS selector matching for the memory host.
//!
//! Selectors are compiled by kuchiki. Matching runs against a kuchiki copy of
//! the tree that holds the element, so combinators and structural
//! pseudo-classes see the same ancestors and siblings as the host tree.

use std::rc::Rc;

use html5ever::{LocalName, Namespace, QualName};
use kuchiki::{Attribute, ElementData, ExpandedName, NodeData, NodeDataRef, NodeRef, Selectors};
use tracing::trace;

use super::tree::{self, DOCUMENT_FRAGMENT_NODE, DOCUMENT_NODE, ELEMENT_NODE, TEXT_NODE};
use super::MemObject;
use crate::host::HostError;

pub(super) struct SelectorList(Selectors);

impl SelectorList {
    pub fn parse(source: &str) -> Result<Self, HostError> {
        Selectors::compile(source).map(SelectorList).map_err(|()| {
            HostError::Exception(format!("SyntaxError: '{source}' is not a valid selector"))
        })
    }
}

pub(super) struct Mirror {
    // Copies only hold weak parent links; the root keeps them alive.
    _root: Option<NodeRef>,
    /// Host elements and their copies, in tree order.
    elements: Vec<(Rc<MemObject>, NodeDataRef<ElementData>)>,
}

impl Mirror {
    pub fn of(object: &Rc<MemObject>) -> Self {
        let top = tree::root(object);
        let mut elements = Vec::new();
        let root = copy(&top, &mut elements);
        trace!(elements = elements.len(), "mirrored tree for selector matching");
        Self {
            _root: root,
            elements,
        }
    }

    fn copy_of(&self, object: &Rc<MemObject>) -> Option<&NodeDataRef<ElementData>> {
        self.elements
            .iter()
            .find(|(original, _)| Rc::ptr_eq(original, object))
            .map(|(_, copy)| copy)
    }

    pub fn matches(&self, selectors: &SelectorList, object: &Rc<MemObject>) -> bool {
        self.copy_of(object)
            .is_some_and(|copy| selectors.0.matches(copy))
    }

    /// Matching elements strictly inside `scope`.
    pub fn select(&self, selectors: &SelectorList, scope: &Rc<MemObject>) -> Vec<Rc<MemObject>> {
        self.elements
            .iter()
            .filter(|(original, copy)| {
                !Rc::ptr_eq(original, scope)
                    && tree::is_inclusive_ancestor(scope, original)
                    && selectors.0.matches(copy)
            })
            .map(|(original, _)| original.clone())
            .collect()
    }
}

fn copy(
    object: &Rc<MemObject>,
    elements: &mut Vec<(Rc<MemObject>, NodeDataRef<ElementData>)>,
) -> Option<NodeRef> {
    let data = object.node()?;
    let copied = match data.node_type {
        ELEMENT_NODE => {
            let name = QualName::new(
                None,
                Namespace::from(data.namespace.unwrap_or_default()),
                LocalName::from(data.name.as_str()),
            );
            let attributes: Vec<(ExpandedName, Attribute)> = data
                .attributes
                .borrow()
                .iter()
                .map(|(name, value)| {
                    let attribute = Attribute {
                        prefix: None,
                        value: value.clone(),
                    };
                    (ExpandedName::new("", name.as_str()), attribute)
                })
                .collect();
            NodeRef::new_element(name, attributes)
        }
        TEXT_NODE => NodeRef::new_text(data.data.borrow().as_str()),
        DOCUMENT_NODE => NodeRef::new_document(),
        DOCUMENT_FRAGMENT_NODE => NodeRef::new(NodeData::DocumentFragment),
        // Comments and doctypes never match and do not count for `:empty`.
        _ => NodeRef::new_comment(""),
    };
    if let Some(element) = copied.clone().into_element_ref() {
        elements.push((object.clone(), element));
    }
    for child in tree::children(object) {
        if let Some(child) = copy(&child, elements) {
            copied.append(child);
        }
    }
    Some(copied)
}

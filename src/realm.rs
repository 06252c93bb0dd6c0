//! The per-host context every facade carries.

use std::fmt;
use std::rc::Rc;

use crate::config::BridgeConfig;
use crate::document::{AnyDocument, DocumentFragment};
use crate::element::AnyElement;
use crate::error::Result;
use crate::event::{AnyEvent, EventInit};
use crate::host::{Handle, Value};
use crate::html::AnyHtmlElement;
use crate::node::AnyNode;
use crate::tag::{TagResolver, TypeTag};
use crate::window::Window;

struct RealmInner {
    global: Handle,
    config: BridgeConfig,
    resolver: TagResolver,
}

/// One host global plus the configuration used to read it.
///
/// Cloning is cheap. Facades keep a clone so they can wrap whatever their
/// accessors return without threading the global through every call.
#[derive(Clone)]
pub struct Realm(Rc<RealmInner>);

impl fmt::Debug for Realm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Realm")
            .field("global", &self.0.global)
            .field("tag_strategy", &self.0.config.tag_strategy)
            .finish()
    }
}

impl Realm {
    pub fn new(global: Handle, config: BridgeConfig) -> Self {
        let resolver = TagResolver::new(global.clone(), &config);
        Self(Rc::new(RealmInner {
            global,
            config,
            resolver,
        }))
    }

    pub fn global(&self) -> &Handle {
        &self.0.global
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.0.config
    }

    pub fn resolver(&self) -> &TagResolver {
        &self.0.resolver
    }

    pub fn tag_of(&self, value: &Value) -> Result<Option<TypeTag>> {
        self.0.resolver.tag_of(value)
    }

    /// Wrap any node. Null and undefined are "no object".
    pub fn wrap_node(&self, value: &Value) -> Result<Option<AnyNode>> {
        match value.as_handle() {
            Some(handle) => AnyNode::from_handle(self, handle.clone()).map(Some),
            None => Ok(None),
        }
    }

    pub fn wrap_element(&self, value: &Value) -> Result<Option<AnyElement>> {
        match value.as_handle() {
            Some(handle) => AnyElement::from_handle(self, handle.clone()).map(Some),
            None => Ok(None),
        }
    }

    pub fn wrap_html_element(&self, value: &Value) -> Result<Option<AnyHtmlElement>> {
        match value.as_handle() {
            Some(handle) => AnyHtmlElement::from_handle(self, handle.clone()).map(Some),
            None => Ok(None),
        }
    }

    pub fn wrap_document(&self, value: &Value) -> Result<Option<AnyDocument>> {
        match value.as_handle() {
            Some(handle) => AnyDocument::from_handle(self, handle.clone()).map(Some),
            None => Ok(None),
        }
    }

    pub fn wrap_document_fragment(&self, value: &Value) -> Result<Option<DocumentFragment>> {
        match value.as_handle() {
            Some(handle) => DocumentFragment::from_handle(self, handle.clone()).map(Some),
            None => Ok(None),
        }
    }

    pub fn wrap_event(&self, value: &Value) -> Result<Option<AnyEvent>> {
        match value.as_handle() {
            Some(handle) => AnyEvent::from_handle(self, handle.clone()).map(Some),
            None => Ok(None),
        }
    }

    /// The global object as a window.
    pub fn window(&self) -> Window {
        Window::new(self.clone(), self.0.global.clone())
    }

    pub fn document(&self) -> Result<Option<AnyDocument>> {
        self.window().document()
    }

    /// Construct an event through the global `Event` constructor.
    pub fn create_event(&self, event_type: &str, init: &EventInit) -> Result<AnyEvent> {
        self.create_event_as("Event", event_type, init)
    }

    /// Construct an event through the global constructor `interface`, e.g.
    /// `KeyboardEvent`.
    pub fn create_event_as(
        &self,
        interface: &str,
        event_type: &str,
        init: &EventInit,
    ) -> Result<AnyEvent> {
        let constructor: Handle = self.0.global.get_as(interface)?;
        let dictionary: Handle = self.0.global.get_as::<Handle>("Object")?.call_as("new", &[])?;
        init.write_to(self, &dictionary)?;
        let event: Handle = constructor.call_as(
            "new",
            &[Value::from(event_type), Value::from(dictionary)],
        )?;
        AnyEvent::from_handle(self, event)
    }
}

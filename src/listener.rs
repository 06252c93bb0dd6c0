//! Listener registration.
//!
//! Registering a handler builds a host-callable adapter that wraps the raw
//! event through the event dispatch table before calling the handler. The
//! adapter's identity is handed back as a [`ListenerHandle`], and removal
//! must present that same handle. Nothing is tracked on the Rust side: a
//! dropped handle leaves the listener registered.

use tracing::{error, trace};

use crate::error::Result;
use crate::event::{AnyEvent, Event};
use crate::host::{Callback, Handle, Value};
use crate::node::{AnyNode, Node};
use crate::realm::Realm;
use crate::tag::TypeTag;
use crate::window::Window;

/// The identity of one registered adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerHandle {
    adapter: Callback,
}

impl ListenerHandle {
    /// The function the host holds.
    pub fn callback(&self) -> &Callback {
        &self.adapter
    }
}

fn adapter<F>(realm: Realm, event_type: &str, handler: F) -> Callback
where
    F: Fn(AnyEvent) + 'static,
{
    let event_type = event_type.to_string();
    Callback::new(move |args: &[Value]| {
        let raw = args.first().cloned().unwrap_or_default();
        match realm.wrap_event(&raw) {
            Ok(Some(event)) => handler(event),
            Ok(None) => {
                error!(target: "dom_facade", %event_type, found = raw.kind(), "listener invoked without an event")
            }
            Err(err) => {
                error!(target: "dom_facade", %event_type, error = %err, "listener could not wrap its event")
            }
        }
        Ok(Value::Undefined)
    })
}

/// Anything the host lets listeners attach to.
pub trait EventTarget {
    fn target_handle(&self) -> &Handle;

    fn target_realm(&self) -> &Realm;

    /// Register `handler` for `event_type` in the capture or bubble phase.
    /// Keep the returned handle to remove it again.
    fn add_event_listener<F>(
        &self,
        event_type: &str,
        capture: bool,
        handler: F,
    ) -> Result<ListenerHandle>
    where
        F: Fn(AnyEvent) + 'static,
    {
        let adapter = adapter(self.target_realm().clone(), event_type, handler);
        self.target_handle().call(
            "addEventListener",
            &[
                Value::from(event_type),
                Value::from(adapter.clone()),
                Value::from(capture),
            ],
        )?;
        trace!(target: "dom_facade", %event_type, capture, ?adapter, "listener registered");
        Ok(ListenerHandle { adapter })
    }

    /// `capture` must match the registration; the host keys listeners by
    /// type, phase and function.
    fn remove_event_listener(
        &self,
        event_type: &str,
        capture: bool,
        listener: &ListenerHandle,
    ) -> Result<()> {
        self.target_handle().call(
            "removeEventListener",
            &[
                Value::from(event_type),
                Value::from(listener.adapter.clone()),
                Value::from(capture),
            ],
        )?;
        trace!(target: "dom_facade", %event_type, capture, adapter = ?listener.adapter, "listener removed");
        Ok(())
    }

    /// Fire `event` here. `false` when a listener prevented the default.
    fn dispatch_event(&self, event: &dyn Event) -> Result<bool> {
        self.target_handle()
            .call_as("dispatchEvent", &[Value::from(event.handle())])
    }
}

impl<T: Node> EventTarget for T {
    fn target_handle(&self) -> &Handle {
        Node::handle(self)
    }

    fn target_realm(&self) -> &Realm {
        self.as_node().realm()
    }
}

impl EventTarget for Window {
    fn target_handle(&self) -> &Handle {
        self.handle()
    }

    fn target_realm(&self) -> &Realm {
        self.realm()
    }
}

/// What an event's `target` or `relatedTarget` can point at.
#[derive(Debug, Clone)]
pub enum AnyTarget {
    Node(AnyNode),
    Window(Window),
    /// Any other target, such as a socket or a request.
    Other { realm: Realm, handle: Handle },
}

impl AnyTarget {
    pub(crate) fn from_value(realm: &Realm, value: &Value) -> Result<Option<Self>> {
        let Some(handle) = value.as_handle() else {
            return Ok(None);
        };
        let target = match realm.resolver().tag_of_object(handle)? {
            TypeTag::Node(_) => AnyTarget::Node(AnyNode::from_handle(realm, handle.clone())?),
            _ if realm.resolver().has_descriptor(handle, "Window")? => {
                AnyTarget::Window(Window::new(realm.clone(), handle.clone()))
            }
            _ => AnyTarget::Other {
                realm: realm.clone(),
                handle: handle.clone(),
            },
        };
        Ok(Some(target))
    }

    pub fn as_node(&self) -> Option<&AnyNode> {
        match self {
            AnyTarget::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_window(&self) -> Option<&Window> {
        match self {
            AnyTarget::Window(window) => Some(window),
            _ => None,
        }
    }
}

impl EventTarget for AnyTarget {
    fn target_handle(&self) -> &Handle {
        match self {
            AnyTarget::Node(node) => Node::handle(node),
            AnyTarget::Window(window) => window.handle(),
            AnyTarget::Other { handle, .. } => handle,
        }
    }

    fn target_realm(&self) -> &Realm {
        match self {
            AnyTarget::Node(node) => node.as_node().realm(),
            AnyTarget::Window(window) => window.realm(),
            AnyTarget::Other { realm, .. } => realm,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::config::BridgeConfig;
    use crate::event::EventInit;
    use crate::host::memory::MemoryHost;

    fn setup() -> (MemoryHost, Realm, AnyNode) {
        let host = MemoryHost::new();
        let realm = Realm::new(host.global(), BridgeConfig::default());
        let button = realm
            .wrap_node(&Value::from(host.create_element("button")))
            .unwrap()
            .unwrap();
        (host, realm, button)
    }

    fn click(realm: &Realm) -> AnyEvent {
        let init = EventInit {
            bubbles: true,
            cancelable: true,
            ..EventInit::default()
        };
        realm.create_event_as("MouseEvent", "click", &init).unwrap()
    }

    #[test]
    fn removed_listeners_never_fire() {
        let (_host, realm, button) = setup();
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        let listener = button
            .add_event_listener("click", false, move |_| seen.set(seen.get() + 1))
            .unwrap();
        button.dispatch_event(&click(&realm)).unwrap();
        assert_eq!(calls.get(), 1);

        button.remove_event_listener("click", false, &listener).unwrap();
        button.dispatch_event(&click(&realm)).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn removal_must_match_the_phase() {
        let (host, _realm, button) = setup();
        let listener = button.add_event_listener("click", true, |_| {}).unwrap();
        button.remove_event_listener("click", false, &listener).unwrap();
        assert_eq!(host.listener_count(Node::handle(&button), "click"), 1);
        button.remove_event_listener("click", true, &listener).unwrap();
        assert_eq!(host.listener_count(Node::handle(&button), "click"), 0);
    }

    #[test]
    fn each_registration_gets_its_own_identity() {
        let (host, _realm, button) = setup();
        let first = button.add_event_listener("focus", false, |_| {}).unwrap();
        let second = button.add_event_listener("focus", false, |_| {}).unwrap();
        assert_ne!(first, second);
        assert_eq!(first, first.clone());
        assert_eq!(host.listener_count(Node::handle(&button), "focus"), 2);
    }

    #[test]
    fn handlers_receive_wrapped_events() {
        let (_host, realm, button) = setup();
        let received = Rc::new(RefCell::new(None));
        let slot = received.clone();
        button
            .add_event_listener("click", false, move |event| {
                *slot.borrow_mut() = Some(event);
            })
            .unwrap();
        button.dispatch_event(&click(&realm)).unwrap();

        let event = received.borrow_mut().take().unwrap();
        assert!(matches!(event, AnyEvent::Mouse(_)));
        let target = event.target().unwrap().unwrap();
        assert!(target.as_node().unwrap().is_same_node(&button));
        assert!(event.current_target().unwrap().is_none());
    }

    #[test]
    fn prevented_dispatch_reports_false() {
        let (_host, realm, button) = setup();
        button
            .add_event_listener("click", false, |event| {
                event.prevent_default().unwrap();
            })
            .unwrap();
        assert!(!button.dispatch_event(&click(&realm)).unwrap());
    }

    #[test]
    fn window_targets_resolve_to_the_window() {
        let (_host, realm, _button) = setup();
        let window = realm.window();
        let target = Rc::new(RefCell::new(None));
        let slot = target.clone();
        window
            .add_event_listener("resize", false, move |event| {
                *slot.borrow_mut() = event.target().unwrap();
            })
            .unwrap();
        let resize = realm.create_event("resize", &EventInit::default()).unwrap();
        assert!(window.dispatch_event(&resize).unwrap());
        let target = target.borrow_mut().take().unwrap();
        assert_eq!(target.as_window().unwrap().handle(), window.handle());
        assert!(target.as_node().is_none());
    }
}

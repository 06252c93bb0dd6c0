//! An in-process host object graph.
//!
//! [`MemoryHost`] models just enough of a browser document to drive every
//! facade operation headlessly: constructor descriptors on a global window,
//! an element tree with attributes and live collections, token lists, events
//! with listener bookkeeping, and timers on a manually advanced clock.
//!
//! Host objects are constructed with `call("new", args)` on a constructor
//! descriptor; that is how facades create events and plain objects.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use anyhow::Context;
use tracing::{trace, warn};
use url::Url;

use super::{Callback, FromValue, Handle, HostError, HostObject, ObjectId, Value};
use crate::tag::{EventTag, NodeTag};

mod fixture;
mod select;
mod timers;
mod tree;

use timers::TimerQueue;
use tree::{NodeData, Query};

/// Descriptors defined on every global besides the node and event interfaces.
const HELPER_CONSTRUCTORS: &[&str] = &[
    "Object",
    "Array",
    "NodeList",
    "HTMLCollection",
    "DOMTokenList",
    "DOMSettableTokenList",
    "NamedNodeMap",
    "Attr",
    "DOMStringMap",
    "DOMRect",
    "ValidityState",
    "Location",
    "Window",
    "Touch",
    "TouchList",
];

const EVENT_PHASE_NONE: u32 = 0;
const EVENT_PHASE_AT_TARGET: u32 = 2;

const SWEEP_FLOOR: usize = 256;

struct HostState {
    next_id: Cell<u64>,
    /// Every object by id, weakly. Entries for released objects are swept
    /// once the map reaches `sweep_at`.
    objects: RefCell<HashMap<ObjectId, Weak<MemObject>>>,
    sweep_at: Cell<usize>,
    constructors: RefCell<HashMap<String, Rc<MemObject>>>,
    timers: RefCell<TimerQueue>,
    window: RefCell<Weak<MemObject>>,
    document: RefCell<Weak<MemObject>>,
    location: RefCell<Weak<MemObject>>,
    /// `None` is `about:blank`.
    url: RefCell<Option<Url>>,
    active_element: RefCell<Weak<MemObject>>,
    scroll: Cell<(f64, f64)>,
    dialogs: RefCell<Vec<String>>,
    dialog_answer: RefCell<Option<String>>,
}

impl HostState {
    fn alloc(self: &Rc<Self>, kind: Kind, interface: Option<&str>) -> Rc<MemObject> {
        let id = ObjectId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let object = Rc::new_cyclic(|this| MemObject {
            id,
            this: this.clone(),
            state: Rc::downgrade(self),
            props: RefCell::default(),
            listeners: RefCell::default(),
            kind,
        });
        if let Some(constructor) = interface.and_then(|name| self.constructor(name)) {
            object
                .props
                .borrow_mut()
                .insert(String::from("constructor"), constructor.value());
        }
        let mut objects = self.objects.borrow_mut();
        if objects.len() >= self.sweep_at.get() {
            let before = objects.len();
            objects.retain(|_, entry| entry.strong_count() > 0);
            self.sweep_at.set((objects.len() * 2).max(SWEEP_FLOOR));
            trace!(
                released = before - objects.len(),
                live = objects.len(),
                "swept released host objects"
            );
        }
        objects.insert(id, Rc::downgrade(&object));
        drop(objects);
        object
    }

    fn define_constructor(self: &Rc<Self>, name: &str) -> Rc<MemObject> {
        if let Some(existing) = self.constructor(name) {
            return existing;
        }
        let constructor = self.alloc(Kind::Constructor(name.to_string()), None);
        self.constructors
            .borrow_mut()
            .insert(name.to_string(), constructor.clone());
        constructor
    }

    fn constructor(&self, name: &str) -> Option<Rc<MemObject>> {
        self.constructors.borrow().get(name).cloned()
    }

    /// Map a handle that crossed the boundary back to the object behind it.
    fn lookup(&self, value: &Value) -> Option<Rc<MemObject>> {
        let handle = value.as_handle()?;
        self.objects.borrow().get(&handle.id())?.upgrade()
    }

    fn document(&self) -> Option<Rc<MemObject>> {
        self.document.borrow().upgrade()
    }

    fn window(&self) -> Option<Rc<MemObject>> {
        self.window.borrow().upgrade()
    }

    fn url(&self) -> Option<Url> {
        self.url.borrow().clone()
    }

    fn new_plain(self: &Rc<Self>, interface: &str) -> Rc<MemObject> {
        self.alloc(Kind::Plain, Some(interface))
    }

    fn new_sequence(self: &Rc<Self>, interface: &str, items: Vec<Value>) -> Rc<MemObject> {
        self.alloc(Kind::Sequence(RefCell::new(items)), Some(interface))
    }

    fn new_event(
        self: &Rc<Self>,
        interface: &str,
        event_type: &str,
        bubbles: bool,
        cancelable: bool,
    ) -> Rc<MemObject> {
        let event = EventState {
            event_type: event_type.to_string(),
            bubbles,
            cancelable,
            time_stamp: self.timers.borrow().now_ms() as f64,
            default_prevented: Cell::new(false),
            immediate_stopped: Cell::new(false),
            propagation_stopped: Cell::new(false),
            phase: Cell::new(EVENT_PHASE_NONE),
            target: RefCell::new(Value::Null),
            current_target: RefCell::new(Value::Null),
        };
        self.alloc(Kind::Event(event), Some(interface))
    }

    fn construct_event(
        self: &Rc<Self>,
        interface: &str,
        args: &[Value],
    ) -> Result<Rc<MemObject>, HostError> {
        let event_type = match args.first() {
            Some(value) if !value.is_nullish() => String::from_value(value.clone())
                .map_err(|found| {
                    HostError::Exception(format!(
                        "TypeError: event type must be a string, got {found}"
                    ))
                })?,
            _ => {
                return Err(HostError::Exception(format!(
                    "TypeError: Failed to construct '{interface}': 1 argument required"
                )))
            }
        };
        let init = args.get(1).and_then(|value| self.lookup(value));
        let flag = |key: &str| {
            init.as_ref()
                .is_some_and(|init| matches!(init.prop(key), Some(Value::Bool(true))))
        };
        let event = self.new_event(interface, &event_type, flag("bubbles"), flag("cancelable"));
        if let Some(init) = init {
            let extras: Vec<(String, Value)> = init
                .props
                .borrow()
                .iter()
                .filter(|(key, _)| {
                    !matches!(
                        key.as_str(),
                        "bubbles" | "cancelable" | "composed" | "constructor"
                    )
                })
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            event.props.borrow_mut().extend(extras);
        }
        Ok(event)
    }

    /// Create and dispatch a fresh event at `target`.
    fn fire(
        self: &Rc<Self>,
        target: &Rc<MemObject>,
        interface: &str,
        event_type: &str,
        bubbles: bool,
        cancelable: bool,
    ) -> Result<bool, HostError> {
        let event = self.new_event(interface, event_type, bubbles, cancelable);
        target.dispatch(&event)
    }
}

enum Kind {
    Plain,
    Constructor(String),
    /// A static sequence: arrays and static node lists.
    Sequence(RefCell<Vec<Value>>),
    Live(LiveList),
    Tokens(TokenSource),
    Node(NodeData),
    Event(EventState),
    Window,
    Location,
}

impl Kind {
    fn label(&self) -> &'static str {
        match self {
            Kind::Plain => "plain",
            Kind::Constructor(_) => "constructor",
            Kind::Sequence(_) => "sequence",
            Kind::Live(_) => "live-list",
            Kind::Tokens(_) => "token-list",
            Kind::Node(_) => "node",
            Kind::Event(_) => "event",
            Kind::Window => "window",
            Kind::Location => "location",
        }
    }
}

/// A collection re-evaluated against the tree on every access.
struct LiveList {
    root: Weak<MemObject>,
    query: Query,
}

impl LiveList {
    fn items(&self) -> Vec<Value> {
        self.root
            .upgrade()
            .map(|root| tree::resolve(&root, &self.query))
            .unwrap_or_default()
            .iter()
            .map(MemObject::value)
            .collect()
    }
}

enum TokenBacking {
    Attribute {
        owner: Weak<MemObject>,
        attribute: &'static str,
    },
    Own(RefCell<String>),
}

struct TokenSource {
    backing: TokenBacking,
    /// Settable lists expose the joined string as `value`.
    settable: bool,
}

impl TokenSource {
    fn read(&self) -> String {
        match &self.backing {
            TokenBacking::Attribute { owner, attribute } => owner
                .upgrade()
                .and_then(|owner| tree::attr(&owner, attribute))
                .unwrap_or_default(),
            TokenBacking::Own(value) => value.borrow().clone(),
        }
    }

    fn write(&self, value: String) {
        match &self.backing {
            TokenBacking::Attribute { owner, attribute } => {
                if let Some(owner) = owner.upgrade() {
                    tree::set_attr(&owner, attribute, value);
                }
            }
            TokenBacking::Own(current) => *current.borrow_mut() = value,
        }
    }

    fn tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = Vec::new();
        for token in self.read().split_ascii_whitespace() {
            if !tokens.iter().any(|existing| existing == token) {
                tokens.push(token.to_string());
            }
        }
        tokens
    }

    fn get(&self, name: &str) -> Option<Value> {
        match name {
            "length" => Some(Value::from(self.tokens().len())),
            "value" if self.settable => Some(Value::from(self.read())),
            _ => name
                .parse::<usize>()
                .ok()
                .map(|index| self.tokens().get(index).cloned().into()),
        }
    }

    fn set(&self, name: &str, value: &Value) -> bool {
        if name == "value" && self.settable {
            self.write(String::from_value(value.clone()).unwrap_or_default());
            return true;
        }
        false
    }

    fn call(&self, method: &str, args: &[Value]) -> Result<Option<Value>, HostError> {
        let mut tokens = self.tokens();
        let value = match method {
            "item" => index_arg(args, 0)
                .and_then(|index| tokens.get(index).cloned())
                .into(),
            "contains" => {
                let token = string_arg(args, 0);
                Value::from(tokens.contains(&token))
            }
            "add" => {
                for token in validated_tokens(args)? {
                    if !tokens.contains(&token) {
                        tokens.push(token);
                    }
                }
                self.write(tokens.join(" "));
                Value::Undefined
            }
            "remove" => {
                let removed = validated_tokens(args)?;
                tokens.retain(|token| !removed.contains(token));
                self.write(tokens.join(" "));
                Value::Undefined
            }
            "toggle" => {
                let token = validate_token(&string_arg(args, 0))?;
                let present = tokens.contains(&token);
                let wanted = match args.get(1) {
                    Some(Value::Bool(force)) => *force,
                    _ => !present,
                };
                if wanted && !present {
                    tokens.push(token);
                } else if !wanted && present {
                    tokens.retain(|existing| *existing != token);
                }
                self.write(tokens.join(" "));
                Value::from(wanted)
            }
            "replace" => {
                let old = validate_token(&string_arg(args, 0))?;
                let new = validate_token(&string_arg(args, 1))?;
                let Some(position) = tokens.iter().position(|token| *token == old) else {
                    return Ok(Some(Value::from(false)));
                };
                tokens[position] = new;
                self.write(tokens.join(" "));
                Value::from(true)
            }
            "toString" => Value::from(self.read()),
            _ => return Ok(None),
        };
        Ok(Some(value))
    }
}

fn validate_token(token: &str) -> Result<String, HostError> {
    if token.is_empty() {
        return Err(HostError::Exception(String::from(
            "SyntaxError: The token provided must not be empty.",
        )));
    }
    if token.chars().any(|c| c.is_ascii_whitespace()) {
        return Err(HostError::Exception(format!(
            "InvalidCharacterError: The token provided ('{token}') contains HTML space characters."
        )));
    }
    Ok(token.to_string())
}

fn validated_tokens(args: &[Value]) -> Result<Vec<String>, HostError> {
    args.iter()
        .map(|arg| validate_token(&String::from_value(arg.clone()).unwrap_or_default()))
        .collect()
}

struct EventState {
    event_type: String,
    bubbles: bool,
    cancelable: bool,
    time_stamp: f64,
    default_prevented: Cell<bool>,
    immediate_stopped: Cell<bool>,
    propagation_stopped: Cell<bool>,
    phase: Cell<u32>,
    target: RefCell<Value>,
    current_target: RefCell<Value>,
}

impl EventState {
    fn get(&self, name: &str) -> Option<Value> {
        let value = match name {
            "type" => Value::from(self.event_type.as_str()),
            "bubbles" => Value::from(self.bubbles),
            "cancelable" => Value::from(self.cancelable),
            "timeStamp" => Value::from(self.time_stamp),
            "defaultPrevented" => Value::from(self.default_prevented.get()),
            "eventPhase" => Value::from(self.phase.get()),
            "target" | "srcElement" => self.target.borrow().clone(),
            "currentTarget" => self.current_target.borrow().clone(),
            "isTrusted" => Value::from(false),
            "cancelBubble" => Value::from(self.propagation_stopped.get()),
            _ => return None,
        };
        Some(value)
    }
}

#[derive(Clone)]
struct Listener {
    event_type: String,
    callback: Callback,
    capture: bool,
}

impl Listener {
    fn matches(&self, event_type: &str, callback: &Callback, capture: bool) -> bool {
        self.event_type == event_type && self.callback == *callback && self.capture == capture
    }
}

struct MemObject {
    id: ObjectId,
    this: Weak<MemObject>,
    state: Weak<HostState>,
    props: RefCell<HashMap<String, Value>>,
    listeners: RefCell<Vec<Listener>>,
    kind: Kind,
}

impl fmt::Debug for MemObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemObject({}, {})", self.id, self.kind.label())
    }
}

impl MemObject {
    fn context(&self) -> Result<(Rc<HostState>, Rc<MemObject>), HostError> {
        let state = self.state.upgrade().ok_or(HostError::Detached)?;
        let this = self.this.upgrade().ok_or(HostError::Detached)?;
        Ok((state, this))
    }

    fn handle(self: &Rc<Self>) -> Handle {
        Handle::new(self.clone())
    }

    fn value(self: &Rc<Self>) -> Value {
        Value::Object(self.handle())
    }

    fn node(&self) -> Option<&NodeData> {
        match &self.kind {
            Kind::Node(node) => Some(node),
            _ => None,
        }
    }

    fn prop(&self, name: &str) -> Option<Value> {
        self.props.borrow().get(name).cloned()
    }

    fn is_event_target(&self) -> bool {
        matches!(self.kind, Kind::Node(_) | Kind::Window)
    }

    fn add_listener(&self, args: &[Value]) -> Value {
        let event_type = string_arg(args, 0);
        let Some(Value::Function(callback)) = args.get(1).cloned() else {
            return Value::Undefined;
        };
        let capture = capture_flag(args.get(2));
        let mut listeners = self.listeners.borrow_mut();
        if !listeners
            .iter()
            .any(|listener| listener.matches(&event_type, &callback, capture))
        {
            trace!(target: "dom_facade", object = %self.id, %event_type, capture, "host listener added");
            listeners.push(Listener {
                event_type,
                callback,
                capture,
            });
        }
        Value::Undefined
    }

    fn remove_listener(&self, args: &[Value]) -> Value {
        let event_type = string_arg(args, 0);
        let Some(Value::Function(callback)) = args.get(1).cloned() else {
            return Value::Undefined;
        };
        let capture = capture_flag(args.get(2));
        self.listeners
            .borrow_mut()
            .retain(|listener| !listener.matches(&event_type, &callback, capture));
        Value::Undefined
    }

    /// Invoke this object's listeners for `event`. There is no capture or
    /// bubble path: only the target's own listeners run.
    fn dispatch(self: &Rc<Self>, event: &Rc<MemObject>) -> Result<bool, HostError> {
        let Kind::Event(state) = &event.kind else {
            return Err(HostError::Exception(String::from(
                "TypeError: parameter 1 is not of type 'Event'",
            )));
        };
        *state.target.borrow_mut() = self.value();
        *state.current_target.borrow_mut() = self.value();
        state.phase.set(EVENT_PHASE_AT_TARGET);
        state.immediate_stopped.set(false);

        let matching: Vec<Callback> = self
            .listeners
            .borrow()
            .iter()
            .filter(|listener| listener.event_type == state.event_type)
            .map(|listener| listener.callback.clone())
            .collect();
        let args = [event.value()];
        for callback in matching {
            if state.immediate_stopped.get() {
                break;
            }
            if let Err(err) = callback.invoke(&args) {
                warn!(target: "dom_facade", event = %state.event_type, error = %err, "listener threw during dispatch");
            }
        }

        *state.current_target.borrow_mut() = Value::Null;
        state.phase.set(EVENT_PHASE_NONE);
        Ok(!state.default_prevented.get())
    }

    fn event_call(&self, state: &EventState, method: &str, args: &[Value]) -> Option<Value> {
        match method {
            "preventDefault" => {
                if state.cancelable {
                    state.default_prevented.set(true);
                }
            }
            "stopPropagation" => state.propagation_stopped.set(true),
            "stopImmediatePropagation" => {
                state.propagation_stopped.set(true);
                state.immediate_stopped.set(true);
            }
            "getModifierState" => {
                let flag = match string_arg(args, 0).as_str() {
                    "Control" => "ctrlKey",
                    "Shift" => "shiftKey",
                    "Alt" => "altKey",
                    "Meta" => "metaKey",
                    _ => return Some(Value::from(false)),
                };
                return Some(Value::from(matches!(self.prop(flag), Some(Value::Bool(true)))));
            }
            _ => return None,
        }
        Some(Value::Undefined)
    }

    fn window_get(&self, state: &Rc<HostState>, this: &Rc<MemObject>, name: &str) -> Option<Value> {
        if let Some(constructor) = state.constructor(name) {
            return Some(constructor.value());
        }
        let (scroll_x, scroll_y) = state.scroll.get();
        let value = match name {
            "window" | "self" | "parent" | "top" | "frames" => this.value(),
            "document" => state.document().map(|doc| doc.value()).into(),
            "location" => state
                .location
                .borrow()
                .upgrade()
                .map(|location| location.value())
                .into(),
            "frameElement" | "opener" => Value::Null,
            "name" => Value::from(""),
            "closed" => Value::from(false),
            "innerWidth" | "outerWidth" => Value::from(1024.0),
            "innerHeight" | "outerHeight" => Value::from(768.0),
            "devicePixelRatio" => Value::from(1.0),
            "scrollX" | "pageXOffset" => Value::from(scroll_x),
            "scrollY" | "pageYOffset" => Value::from(scroll_y),
            _ => return None,
        };
        Some(value)
    }

    fn window_call(
        &self,
        state: &Rc<HostState>,
        method: &str,
        args: &[Value],
    ) -> Result<Option<Value>, HostError> {
        let value = match method {
            "setTimeout" | "setInterval" => {
                let callback = callback_arg(args, method)?;
                let delay = number_arg(args, 1).max(0.0) as u64;
                let mut timers = state.timers.borrow_mut();
                let timer_id = if method == "setTimeout" {
                    timers.set_timeout(callback, delay)
                } else {
                    timers.set_interval(callback, delay)
                };
                trace!(target: "dom_facade", timer_id, delay, method, "host timer scheduled");
                Value::from(timer_id)
            }
            "clearTimeout" | "clearInterval" => {
                if let Some(timer_id) = index_arg(args, 0) {
                    state.timers.borrow_mut().clear_timer(timer_id as u32);
                }
                Value::Undefined
            }
            "requestAnimationFrame" => {
                let callback = callback_arg(args, method)?;
                Value::from(state.timers.borrow_mut().request_frame(callback))
            }
            "cancelAnimationFrame" => {
                if let Some(frame_id) = index_arg(args, 0) {
                    state.timers.borrow_mut().cancel_frame(frame_id as u32);
                }
                Value::Undefined
            }
            "alert" => {
                state
                    .dialogs
                    .borrow_mut()
                    .push(format!("alert: {}", string_arg(args, 0)));
                Value::Undefined
            }
            "confirm" => {
                state
                    .dialogs
                    .borrow_mut()
                    .push(format!("confirm: {}", string_arg(args, 0)));
                Value::from(state.dialog_answer.borrow().is_some())
            }
            "prompt" => {
                state
                    .dialogs
                    .borrow_mut()
                    .push(format!("prompt: {}", string_arg(args, 0)));
                state.dialog_answer.borrow().clone().into()
            }
            "scrollTo" | "scroll" => {
                state.scroll.set((number_arg(args, 0), number_arg(args, 1)));
                Value::Undefined
            }
            "scrollBy" => {
                let (x, y) = state.scroll.get();
                state
                    .scroll
                    .set((x + number_arg(args, 0), y + number_arg(args, 1)));
                Value::Undefined
            }
            "close" => {
                self.props
                    .borrow_mut()
                    .insert(String::from("closed"), Value::from(true));
                Value::Undefined
            }
            "focus" | "blur" | "print" | "stop" => Value::Undefined,
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    fn location_get(state: &HostState, name: &str) -> Option<Value> {
        match state.url() {
            Some(url) => tree::url_component(&url, name).map(Value::from),
            None => match name {
                "href" => Some(Value::from("about:blank")),
                "protocol" => Some(Value::from("about:")),
                "pathname" => Some(Value::from("blank")),
                "origin" => Some(Value::from("null")),
                _ if tree::URL_COMPONENTS.contains(&name) => Some(Value::from("")),
                _ => None,
            },
        }
    }

    fn location_set(state: &HostState, name: &str, value: &Value) -> bool {
        if name != "href" && !tree::URL_COMPONENTS.contains(&name) {
            return false;
        }
        let text = String::from_value(value.clone()).unwrap_or_default();
        let mut current = state.url.borrow_mut();
        match current.as_mut() {
            Some(url) => {
                tree::set_url_component(url, name, &text);
            }
            None if name == "href" => *current = Url::parse(&text).ok(),
            None => {}
        }
        true
    }

    fn constructor_call(
        &self,
        state: &Rc<HostState>,
        name: &str,
        method: &str,
        args: &[Value],
    ) -> Result<Option<Value>, HostError> {
        let value = match (name, method) {
            ("Object", "new") => state.new_plain("Object").value(),
            ("Object", "keys") => {
                let mut keys: Vec<String> = args
                    .first()
                    .and_then(|value| state.lookup(value))
                    .map(|object| {
                        object
                            .props
                            .borrow()
                            .keys()
                            .filter(|key| *key != "constructor")
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();
                keys.sort();
                state
                    .new_sequence("Array", keys.into_iter().map(Value::from).collect())
                    .value()
            }
            ("Array", "new") => state.new_sequence("Array", args.to_vec()).value(),
            (_, "new") if EventTag::from_name(name).is_some() => {
                state.construct_event(name, args)?.value()
            }
            (_, "new") => {
                return Err(HostError::Exception(format!(
                    "TypeError: Illegal constructor '{name}'"
                )))
            }
            _ => return Ok(None),
        };
        Ok(Some(value))
    }
}

impl HostObject for MemObject {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn get(&self, name: &str) -> Result<Value, HostError> {
        let (state, this) = self.context()?;
        if let Some(value) = self.prop(name) {
            return Ok(value);
        }
        let computed = match &self.kind {
            Kind::Plain => None,
            Kind::Constructor(constructor) => {
                (name == "name").then(|| Value::from(constructor.as_str()))
            }
            Kind::Sequence(items) => sequence_get(&items.borrow(), name),
            Kind::Live(list) => sequence_get(&list.items(), name),
            Kind::Tokens(tokens) => tokens.get(name),
            Kind::Node(_) => tree::get(&state, &this, name)?,
            Kind::Event(event) => event.get(name),
            Kind::Window => self.window_get(&state, &this, name),
            Kind::Location => Self::location_get(&state, name),
        };
        Ok(computed.unwrap_or_default())
    }

    fn set(&self, name: &str, value: Value) -> Result<(), HostError> {
        let (state, this) = self.context()?;
        let handled = match &self.kind {
            Kind::Node(_) => tree::set(&state, &this, name, &value)?,
            Kind::Tokens(tokens) => tokens.set(name, &value),
            Kind::Location => Self::location_set(&state, name, &value),
            _ => false,
        };
        if !handled {
            self.props.borrow_mut().insert(name.to_string(), value);
        }
        Ok(())
    }

    fn call(&self, method: &str, args: &[Value]) -> Result<Value, HostError> {
        let (state, this) = self.context()?;
        if self.is_event_target() {
            match method {
                "addEventListener" => return Ok(self.add_listener(args)),
                "removeEventListener" => return Ok(self.remove_listener(args)),
                "dispatchEvent" => {
                    let event = args
                        .first()
                        .and_then(|value| state.lookup(value))
                        .ok_or_else(|| {
                            HostError::Exception(String::from(
                                "TypeError: parameter 1 is not of type 'Event'",
                            ))
                        })?;
                    return this.dispatch(&event).map(Value::from);
                }
                _ => {}
            }
        }

        let result = match &self.kind {
            Kind::Plain => None,
            Kind::Constructor(name) => self.constructor_call(&state, name, method, args)?,
            Kind::Sequence(items) => sequence_call(&items.borrow(), method, args),
            Kind::Live(list) => sequence_call(&list.items(), method, args),
            Kind::Tokens(tokens) => tokens.call(method, args)?,
            Kind::Node(_) => tree::call(&state, &this, method, args)?,
            Kind::Event(event) => self.event_call(event, method, args),
            Kind::Window => self.window_call(&state, method, args)?,
            Kind::Location => match method {
                "assign" | "replace" => {
                    Self::location_set(&state, "href", args.first().unwrap_or(&Value::Undefined));
                    Some(Value::Undefined)
                }
                "reload" => Some(Value::Undefined),
                "toString" => Self::location_get(&state, "href"),
                _ => None,
            },
        };
        if let Some(value) = result {
            return Ok(value);
        }
        match self.prop(method) {
            Some(Value::Function(callback)) => callback.invoke(args),
            _ => Err(HostError::NotCallable {
                name: method.to_string(),
            }),
        }
    }
}

fn sequence_get(items: &[Value], name: &str) -> Option<Value> {
    if name == "length" {
        return Some(Value::from(items.len()));
    }
    name.parse::<usize>()
        .ok()
        .map(|index| items.get(index).cloned().unwrap_or_default())
}

fn sequence_call(items: &[Value], method: &str, args: &[Value]) -> Option<Value> {
    match method {
        "item" => Some(
            index_arg(args, 0)
                .and_then(|index| items.get(index).cloned())
                .unwrap_or(Value::Null),
        ),
        "namedItem" => {
            let wanted = string_arg(args, 0);
            let found = items.iter().find(|item| {
                item.as_handle().is_some_and(|handle| {
                    let id = handle.get_as::<String>("id").unwrap_or_default();
                    let name = handle.get_as::<String>("name").unwrap_or_default();
                    id == wanted || name == wanted
                })
            });
            Some(found.cloned().unwrap_or(Value::Null))
        }
        _ => None,
    }
}

fn string_arg(args: &[Value], position: usize) -> String {
    args.get(position)
        .cloned()
        .and_then(|value| String::from_value(value).ok())
        .unwrap_or_default()
}

fn number_arg(args: &[Value], position: usize) -> f64 {
    match args.get(position) {
        Some(Value::Number(n)) if n.is_finite() => *n,
        _ => 0.0,
    }
}

fn index_arg(args: &[Value], position: usize) -> Option<usize> {
    match args.get(position) {
        Some(Value::Number(n)) if *n >= 0.0 && n.is_finite() => Some(*n as usize),
        _ => None,
    }
}

fn callback_arg(args: &[Value], method: &str) -> Result<Callback, HostError> {
    match args.first() {
        Some(Value::Function(callback)) => Ok(callback.clone()),
        _ => Err(HostError::Exception(format!(
            "TypeError: {method}: parameter 1 is not a function"
        ))),
    }
}

fn capture_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(capture)) => *capture,
        Some(Value::Object(options)) => options.get_as::<bool>("capture").unwrap_or(false),
        _ => false,
    }
}

/// An in-process host: one window, one document, one clock.
#[derive(Clone)]
pub struct MemoryHost {
    state: Rc<HostState>,
    window: Rc<MemObject>,
    document: Rc<MemObject>,
    location: Rc<MemObject>,
}

impl fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryHost")
            .field("window", &self.window.id)
            .field("document", &self.document.id)
            .field("objects", &self.state.objects.borrow().len())
            .finish()
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    fn bare() -> Self {
        let state = Rc::new(HostState {
            next_id: Cell::new(1),
            objects: RefCell::default(),
            sweep_at: Cell::new(SWEEP_FLOOR),
            constructors: RefCell::default(),
            timers: RefCell::default(),
            window: RefCell::default(),
            document: RefCell::default(),
            location: RefCell::default(),
            url: RefCell::default(),
            active_element: RefCell::default(),
            scroll: Cell::new((0.0, 0.0)),
            dialogs: RefCell::default(),
            dialog_answer: RefCell::default(),
        });
        for name in HELPER_CONSTRUCTORS {
            state.define_constructor(name);
        }
        for tag in NodeTag::ALL {
            state.define_constructor(tag.name());
        }
        for tag in EventTag::ALL {
            state.define_constructor(tag.name());
        }

        let window = state.alloc(Kind::Window, Some("Window"));
        let document = state.alloc(
            Kind::Node(NodeData::new(tree::DOCUMENT_NODE, "#document", None)),
            Some("HTMLDocument"),
        );
        let location = state.alloc(Kind::Location, Some("Location"));
        *state.window.borrow_mut() = Rc::downgrade(&window);
        *state.document.borrow_mut() = Rc::downgrade(&document);
        *state.location.borrow_mut() = Rc::downgrade(&location);

        Self {
            state,
            window,
            document,
            location,
        }
    }

    /// An `about:blank` document with empty `<head>` and `<body>`.
    pub fn new() -> Self {
        let host = Self::bare();
        let html = tree::create_element(&host.state, "html", None);
        let head = tree::create_element(&host.state, "head", None);
        let body = tree::create_element(&host.state, "body", None);
        tree::append(&html, &head);
        tree::append(&html, &body);
        tree::append(&host.document, &html);
        host
    }

    /// Parse a full HTML document into the host tree.
    pub fn from_html(html: &str) -> anyhow::Result<Self> {
        let host = Self::bare();
        fixture::load_document(&host.state, &host.document, html)
            .context("failed to load HTML fixture")?;
        Ok(host)
    }

    pub fn set_url(&self, url: &str) -> anyhow::Result<()> {
        let parsed = Url::parse(url).with_context(|| format!("invalid document URL '{url}'"))?;
        *self.state.url.borrow_mut() = Some(parsed);
        Ok(())
    }

    pub fn global(&self) -> Handle {
        self.window.handle()
    }

    pub fn document(&self) -> Handle {
        self.document.handle()
    }

    pub fn location(&self) -> Handle {
        self.location.handle()
    }

    pub fn constructor(&self, name: &str) -> Option<Handle> {
        self.state.constructor(name).map(|constructor| constructor.handle())
    }

    /// Register a new global constructor descriptor.
    pub fn define_constructor(&self, name: &str) -> Handle {
        self.state.define_constructor(name).handle()
    }

    /// A descriptor whose printable name is `name` but which is not the
    /// global of that name.
    pub fn forge_constructor(&self, name: &str) -> Handle {
        self.state
            .alloc(Kind::Constructor(name.to_string()), None)
            .handle()
    }

    /// A plain object whose `constructor` is `constructor`.
    pub fn create_object(&self, constructor: &Handle) -> Handle {
        let object = self.state.alloc(Kind::Plain, None);
        object
            .props
            .borrow_mut()
            .insert(String::from("constructor"), Value::from(constructor));
        object.handle()
    }

    pub fn create_element(&self, tag: &str) -> Handle {
        tree::create_element(&self.state, tag, None).handle()
    }

    /// An element of `tag` whose descriptor is the global `interface`,
    /// defining that global when missing.
    pub fn create_element_as(&self, tag: &str, interface: &str) -> Handle {
        self.state.define_constructor(interface);
        tree::create_element(&self.state, tag, Some(interface)).handle()
    }

    pub fn create_text(&self, data: &str) -> Handle {
        tree::create_text(&self.state, data).handle()
    }

    /// Construct an event through its global descriptor, as script would.
    pub fn create_event(
        &self,
        interface: &str,
        event_type: &str,
        init: &serde_json::Value,
    ) -> Result<Handle, HostError> {
        self.state.define_constructor(interface);
        let init = self.value_from_json(init);
        let event = self
            .state
            .construct_event(interface, &[Value::from(event_type), init])?;
        Ok(event.handle())
    }

    pub fn create_array(&self, items: Vec<Value>) -> Handle {
        self.state.new_sequence("Array", items).handle()
    }

    /// A token list over its own string, not tied to any element.
    pub fn create_token_list(&self, value: &str, settable: bool) -> Handle {
        let interface = if settable {
            "DOMSettableTokenList"
        } else {
            "DOMTokenList"
        };
        self.state
            .alloc(
                Kind::Tokens(TokenSource {
                    backing: TokenBacking::Own(RefCell::new(value.to_string())),
                    settable,
                }),
                Some(interface),
            )
            .handle()
    }

    /// A Polymer-style wrapper exposing `inner` through its `node` property.
    pub fn wrap_in_node(&self, inner: &Handle) -> Handle {
        let wrapper = self.state.new_plain("Object");
        wrapper
            .props
            .borrow_mut()
            .insert(String::from("node"), Value::from(inner));
        wrapper.handle()
    }

    pub fn value_from_json(&self, json: &serde_json::Value) -> Value {
        fixture::value_from_json(&self.state, json)
    }

    /// Move the clock forward, firing every timer that falls due on the way.
    pub fn advance(&self, ms: u64) -> Result<usize, HostError> {
        let deadline = self.state.timers.borrow().now_ms() + ms;
        let mut fired = 0;
        loop {
            let next = self.state.timers.borrow_mut().next_due(deadline);
            let Some((timer_id, callback)) = next else {
                break;
            };
            trace!(target: "dom_facade", timer_id, "host timer fired");
            callback.invoke(&[])?;
            fired += 1;
        }
        self.state.timers.borrow_mut().finish_advance(deadline);
        Ok(fired)
    }

    /// Run every animation frame callback requested so far.
    pub fn run_animation_frame(&self, timestamp_ms: f64) -> Result<usize, HostError> {
        let frames = self.state.timers.borrow_mut().take_frames();
        let count = frames.len();
        for callback in frames {
            callback.invoke(&[Value::from(timestamp_ms)])?;
        }
        Ok(count)
    }

    pub fn now_ms(&self) -> u64 {
        self.state.timers.borrow().now_ms()
    }

    pub fn pending_timers(&self) -> usize {
        self.state.timers.borrow().pending_timers()
    }

    pub fn clear_timers(&self) {
        self.state.timers.borrow_mut().clear_all();
    }

    /// Objects the host can still resolve by id, including released ones
    /// that have not been swept yet.
    pub fn tracked_objects(&self) -> usize {
        self.state.objects.borrow().len()
    }

    /// Listeners registered on `target` for `event_type`, both phases.
    pub fn listener_count(&self, target: &Handle, event_type: &str) -> usize {
        self.state
            .lookup(&Value::from(target))
            .map(|object| {
                object
                    .listeners
                    .borrow()
                    .iter()
                    .filter(|listener| listener.event_type == event_type)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Every `alert`, `confirm` and `prompt` shown so far.
    pub fn dialogs(&self) -> Vec<String> {
        self.state.dialogs.borrow().clone()
    }

    /// What `confirm` (accepted when `Some`) and `prompt` answer.
    pub fn set_dialog_answer(&self, answer: Option<&str>) {
        *self.state.dialog_answer.borrow_mut() = answer.map(str::to_string);
    }
}

//! Event facades and the event dispatch table.
//!
//! The layering mirrors the node side over a disjoint tag vocabulary:
//! [`BasicEvent`] wraps the handle, [`BasicUiEvent`] and [`MouseEvent`]
//! extend it, and leaf interfaces hold whichever layer they extend.
//!
//! Hosts are not required to fill in every member of an event, so numeric
//! and flag members that are absent read as their zero value.

use keyboard_types::{Location, Modifiers};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collection;
use crate::error::{BridgeError, Result};
use crate::host::{FromValue, Handle, Value};
use crate::listener::AnyTarget;
use crate::node::AnyNode;
use crate::realm::Realm;
use crate::relation::downcast_from_event;
use crate::tag::{EventTag, TypeTag};
use crate::window::Window;

/// Where dispatch currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventPhase {
    None,
    Capturing,
    AtTarget,
    Bubbling,
}

impl EventPhase {
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => EventPhase::Capturing,
            2 => EventPhase::AtTarget,
            3 => EventPhase::Bubbling,
            _ => EventPhase::None,
        }
    }

    pub fn code(self) -> u32 {
        match self {
            EventPhase::None => 0,
            EventPhase::Capturing => 1,
            EventPhase::AtTarget => 2,
            EventPhase::Bubbling => 3,
        }
    }
}

/// The dictionary passed to a host event constructor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventInit {
    pub bubbles: bool,
    pub cancelable: bool,
    pub composed: bool,
    /// Interface-specific members such as `key` or `clientX`.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl EventInit {
    pub fn with(mut self, member: &str, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(member.to_string(), value.into());
        self
    }

    pub(crate) fn write_to(&self, realm: &Realm, dictionary: &Handle) -> Result<()> {
        dictionary.set("bubbles", self.bubbles)?;
        dictionary.set("cancelable", self.cancelable)?;
        dictionary.set("composed", self.composed)?;
        for (member, value) in &self.extra {
            dictionary.set(member, json_to_value(realm, value)?)?;
        }
        Ok(())
    }
}

fn json_to_value(realm: &Realm, json: &serde_json::Value) -> Result<Value> {
    let value = match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(flag) => Value::Bool(*flag),
        serde_json::Value::Number(number) => Value::Number(number.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(text) => Value::String(text.clone()),
        serde_json::Value::Array(items) => {
            let items = items
                .iter()
                .map(|item| json_to_value(realm, item))
                .collect::<Result<Vec<_>>>()?;
            let array: Handle = realm.global().get_as("Array")?;
            array.call("new", &items)?
        }
        serde_json::Value::Object(members) => {
            let object: Handle = realm
                .global()
                .get_as::<Handle>("Object")?
                .call_as("new", &[])?;
            for (member, value) in members {
                object.set(member, json_to_value(realm, value)?)?;
            }
            Value::Object(object)
        }
    };
    Ok(value)
}

/// The event layer that wraps the handle itself.
#[derive(Debug, Clone)]
pub struct BasicEvent {
    handle: Handle,
    realm: Realm,
    tag: TypeTag,
}

impl BasicEvent {
    pub(crate) fn new(realm: Realm, handle: Handle, tag: TypeTag) -> Self {
        Self { handle, realm, tag }
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    pub fn tag(&self) -> &TypeTag {
        &self.tag
    }

    pub(crate) fn read<T: FromValue>(&self, name: &str) -> Result<T> {
        self.handle.get_as(name)
    }

    /// Absent members read as `T::default()`.
    pub(crate) fn read_or_default<T: FromValue + Default>(&self, name: &str) -> Result<T> {
        match self.handle.get(name)? {
            Value::Undefined => Ok(T::default()),
            other => T::from_value(other).map_err(|found| BridgeError::UnexpectedValue {
                property: name.to_string(),
                expected: T::EXPECTED,
                found,
            }),
        }
    }

    pub(crate) fn read_optional_string(&self, name: &str) -> Result<Option<String>> {
        match self.handle.get(name)? {
            Value::Undefined | Value::Null => Ok(None),
            other => String::from_value(other).map(Some).map_err(|found| {
                BridgeError::UnexpectedValue {
                    property: name.to_string(),
                    expected: "string or null",
                    found,
                }
            }),
        }
    }

    pub(crate) fn read_target(&self, name: &str) -> Result<Option<AnyTarget>> {
        AnyTarget::from_value(&self.realm, &self.handle.get(name)?)
    }

    pub(crate) fn invoke<T: FromValue>(&self, method: &str, args: &[Value]) -> Result<T> {
        self.handle.call_as(method, args)
    }

    fn modifiers(&self) -> Result<Modifiers> {
        let mut modifiers = Modifiers::empty();
        for (member, flag) in [
            ("altKey", Modifiers::ALT),
            ("ctrlKey", Modifiers::CONTROL),
            ("metaKey", Modifiers::META),
            ("shiftKey", Modifiers::SHIFT),
        ] {
            if self.read_or_default::<bool>(member)? {
                modifiers.insert(flag);
            }
        }
        Ok(modifiers)
    }
}

/// The base event capability set.
pub trait Event {
    fn as_event(&self) -> &BasicEvent;

    fn handle(&self) -> &Handle {
        self.as_event().handle()
    }

    fn tag(&self) -> &TypeTag {
        self.as_event().tag()
    }

    fn event_type(&self) -> Result<String> {
        self.as_event().read("type")
    }

    fn bubbles(&self) -> Result<bool> {
        self.as_event().read("bubbles")
    }

    fn cancelable(&self) -> Result<bool> {
        self.as_event().read("cancelable")
    }

    fn default_prevented(&self) -> Result<bool> {
        self.as_event().read("defaultPrevented")
    }

    fn is_trusted(&self) -> Result<bool> {
        self.as_event().read("isTrusted")
    }

    fn event_phase(&self) -> Result<EventPhase> {
        Ok(EventPhase::from_code(self.as_event().read_or_default("eventPhase")?))
    }

    /// Milliseconds, on the host's clock.
    fn time_stamp(&self) -> Result<f64> {
        self.as_event().read_or_default("timeStamp")
    }

    fn target(&self) -> Result<Option<AnyTarget>> {
        self.as_event().read_target("target")
    }

    fn current_target(&self) -> Result<Option<AnyTarget>> {
        self.as_event().read_target("currentTarget")
    }

    fn prevent_default(&self) -> Result<()> {
        self.as_event().invoke("preventDefault", &[])
    }

    fn stop_propagation(&self) -> Result<()> {
        self.as_event().invoke("stopPropagation", &[])
    }

    fn stop_immediate_propagation(&self) -> Result<()> {
        self.as_event().invoke("stopImmediatePropagation", &[])
    }
}

impl Event for BasicEvent {
    fn as_event(&self) -> &BasicEvent {
        self
    }
}

/// Forward [`Event`] (and [`UiEvent`] with `ui`) to an inner layer.
macro_rules! event_layers {
    ($ty:ident, ui: $($path:ident).+) => {
        event_layers!($ty, $($path).+);

        impl UiEvent for $ty {
            fn as_ui_event(&self) -> &BasicUiEvent {
                UiEvent::as_ui_event(&self.$($path).+)
            }
        }
    };
    ($ty:ident, $($path:ident).+) => {
        impl Event for $ty {
            fn as_event(&self) -> &BasicEvent {
                Event::as_event(&self.$($path).+)
            }
        }
    };
}

/// A leaf interface directly over the base layer.
macro_rules! event_leaf {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            event: BasicEvent,
        }

        impl $name {
            pub(crate) fn from_layer(event: BasicEvent) -> Self {
                Self { event }
            }
        }

        event_layers!($name, event);
    };
}

/// A leaf interface over the UI layer.
macro_rules! ui_leaf {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            ui: BasicUiEvent,
        }

        impl $name {
            pub(crate) fn from_layer(event: BasicEvent) -> Self {
                Self {
                    ui: BasicUiEvent::from_layer(event),
                }
            }
        }

        event_layers!($name, ui: ui);
    };
}

/// A leaf interface over the mouse layer, reached through `mouse()`.
macro_rules! mouse_leaf {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            mouse: MouseEvent,
        }

        impl $name {
            pub(crate) fn from_layer(event: BasicEvent) -> Self {
                Self {
                    mouse: MouseEvent::from_layer(event),
                }
            }

            pub fn mouse(&self) -> &MouseEvent {
                &self.mouse
            }
        }

        event_layers!($name, ui: mouse.ui);
    };
}

/// Member getters that read absent values as zero.
macro_rules! members {
    ($($getter:ident: $ty:ty = $prop:literal;)*) => {
        $(
            pub fn $getter(&self) -> Result<$ty> {
                Event::as_event(self).read_or_default($prop)
            }
        )*
    };
}

/// The UI event layer.
#[derive(Debug, Clone)]
pub struct BasicUiEvent {
    event: BasicEvent,
}

impl BasicUiEvent {
    pub(crate) fn from_layer(event: BasicEvent) -> Self {
        Self { event }
    }
}

event_layers!(BasicUiEvent, event);

impl UiEvent for BasicUiEvent {
    fn as_ui_event(&self) -> &BasicUiEvent {
        self
    }
}

/// Events tied to a view.
pub trait UiEvent: Event {
    fn as_ui_event(&self) -> &BasicUiEvent;

    fn detail(&self) -> Result<f64> {
        self.as_event().read_or_default("detail")
    }

    fn view(&self) -> Result<Option<Window>> {
        let event = self.as_event();
        let view: Option<Handle> = event.read("view")?;
        Ok(view.map(|handle| Window::new(event.realm().clone(), handle)))
    }
}

/// The mouse layer. Wheel, drag and pointer events extend it.
#[derive(Debug, Clone)]
pub struct MouseEvent {
    ui: BasicUiEvent,
}

impl MouseEvent {
    pub(crate) fn from_layer(event: BasicEvent) -> Self {
        Self {
            ui: BasicUiEvent::from_layer(event),
        }
    }

    members! {
        client_x: f64 = "clientX";
        client_y: f64 = "clientY";
        screen_x: f64 = "screenX";
        screen_y: f64 = "screenY";
        page_x: f64 = "pageX";
        page_y: f64 = "pageY";
        offset_x: f64 = "offsetX";
        offset_y: f64 = "offsetY";
        movement_x: f64 = "movementX";
        movement_y: f64 = "movementY";
        button: i32 = "button";
        buttons: u32 = "buttons";
    }

    pub fn modifiers(&self) -> Result<Modifiers> {
        self.as_event().modifiers()
    }

    pub fn related_target(&self) -> Result<Option<AnyTarget>> {
        self.as_event().read_target("relatedTarget")
    }

    /// `key` is a modifier name such as `"Shift"`.
    pub fn get_modifier_state(&self, key: &str) -> Result<bool> {
        self.as_event()
            .invoke("getModifierState", &[Value::from(key)])
    }
}

event_layers!(MouseEvent, ui: ui);

ui_leaf!(KeyboardEvent);

impl KeyboardEvent {
    members! {
        key: String = "key";
        code: String = "code";
        repeat: bool = "repeat";
        is_composing: bool = "isComposing";
    }

    pub fn location(&self) -> Result<Location> {
        Ok(match self.as_event().read_or_default::<u32>("location")? {
            1 => Location::Left,
            2 => Location::Right,
            3 => Location::Numpad,
            _ => Location::Standard,
        })
    }

    pub fn modifiers(&self) -> Result<Modifiers> {
        self.as_event().modifiers()
    }

    pub fn get_modifier_state(&self, key: &str) -> Result<bool> {
        self.as_event()
            .invoke("getModifierState", &[Value::from(key)])
    }
}

/// One touch point, copied out of the host.
#[derive(Debug, Clone)]
pub struct Touch {
    pub identifier: i64,
    pub client_x: f64,
    pub client_y: f64,
    pub page_x: f64,
    pub page_y: f64,
    pub screen_x: f64,
    pub screen_y: f64,
    pub target: Option<AnyNode>,
}

impl Touch {
    fn read_from(realm: &Realm, touch: &Handle) -> Result<Self> {
        let number = |name: &str| -> Result<f64> {
            match touch.get(name)? {
                Value::Number(value) => Ok(value),
                _ => Ok(0.0),
            }
        };
        Ok(Self {
            identifier: number("identifier")? as i64,
            client_x: number("clientX")?,
            client_y: number("clientY")?,
            page_x: number("pageX")?,
            page_y: number("pageY")?,
            screen_x: number("screenX")?,
            screen_y: number("screenY")?,
            target: realm.wrap_node(&touch.get("target")?)?,
        })
    }
}

ui_leaf!(TouchEvent);

impl TouchEvent {
    fn touch_list(&self, name: &str) -> Result<Vec<Touch>> {
        let event = self.as_event();
        let list = event.handle().get(name)?;
        collection::snapshot(event.realm(), &list, |touch| {
            Touch::read_from(event.realm(), &touch)
        })
    }

    pub fn touches(&self) -> Result<Vec<Touch>> {
        self.touch_list("touches")
    }

    pub fn target_touches(&self) -> Result<Vec<Touch>> {
        self.touch_list("targetTouches")
    }

    pub fn changed_touches(&self) -> Result<Vec<Touch>> {
        self.touch_list("changedTouches")
    }

    pub fn modifiers(&self) -> Result<Modifiers> {
        self.as_event().modifiers()
    }
}

ui_leaf!(FocusEvent);

impl FocusEvent {
    pub fn related_target(&self) -> Result<Option<AnyTarget>> {
        self.as_event().read_target("relatedTarget")
    }
}

ui_leaf!(CompositionEvent);

impl CompositionEvent {
    members! {
        data: String = "data";
    }
}

ui_leaf!(SvgZoomEvent);

impl SvgZoomEvent {
    members! {
        previous_scale: f64 = "previousScale";
        new_scale: f64 = "newScale";
    }
}

mouse_leaf!(WheelEvent);

impl WheelEvent {
    members! {
        delta_x: f64 = "deltaX";
        delta_y: f64 = "deltaY";
        delta_z: f64 = "deltaZ";
        delta_mode: u32 = "deltaMode";
    }
}

mouse_leaf!(DragEvent);

impl DragEvent {
    /// The raw `DataTransfer`, when the host attached one.
    pub fn data_transfer(&self) -> Result<Option<Handle>> {
        self.as_event().read("dataTransfer")
    }
}

mouse_leaf!(PointerEvent);

impl PointerEvent {
    members! {
        pointer_id: i64 = "pointerId";
        width: f64 = "width";
        height: f64 = "height";
        pressure: f64 = "pressure";
        pointer_type: String = "pointerType";
        is_primary: bool = "isPrimary";
    }
}

event_leaf!(
    /// A WebSocket closing.
    CloseEvent
);

impl CloseEvent {
    members! {
        code: u32 = "code";
        reason: String = "reason";
        was_clean: bool = "wasClean";
    }
}

event_leaf!(MessageEvent);

impl MessageEvent {
    /// The payload, as the host handed it over.
    pub fn data(&self) -> Result<Value> {
        self.as_event().read("data")
    }

    members! {
        origin: String = "origin";
        last_event_id: String = "lastEventId";
    }
}

event_leaf!(CustomEvent);

impl CustomEvent {
    pub fn detail(&self) -> Result<Value> {
        self.as_event().read("detail")
    }
}

event_leaf!(ErrorEvent);

impl ErrorEvent {
    members! {
        message: String = "message";
        filename: String = "filename";
        lineno: u32 = "lineno";
        colno: u32 = "colno";
    }

    pub fn error(&self) -> Result<Value> {
        self.as_event().read("error")
    }
}

event_leaf!(HashChangeEvent);

impl HashChangeEvent {
    members! {
        old_url: String = "oldURL";
        new_url: String = "newURL";
    }
}

event_leaf!(PopStateEvent);

impl PopStateEvent {
    pub fn state(&self) -> Result<Value> {
        self.as_event().read("state")
    }
}

event_leaf!(ProgressEvent);

impl ProgressEvent {
    members! {
        length_computable: bool = "lengthComputable";
        loaded: f64 = "loaded";
        total: f64 = "total";
    }
}

event_leaf!(StorageEvent);

impl StorageEvent {
    /// `None` when the whole storage area was cleared.
    pub fn key(&self) -> Result<Option<String>> {
        self.as_event().read_optional_string("key")
    }

    pub fn old_value(&self) -> Result<Option<String>> {
        self.as_event().read_optional_string("oldValue")
    }

    pub fn new_value(&self) -> Result<Option<String>> {
        self.as_event().read_optional_string("newValue")
    }

    members! {
        url: String = "url";
    }
}

event_leaf!(AnimationEvent);

impl AnimationEvent {
    members! {
        animation_name: String = "animationName";
        elapsed_time: f64 = "elapsedTime";
        pseudo_element: String = "pseudoElement";
    }
}

event_leaf!(TransitionEvent);

impl TransitionEvent {
    members! {
        property_name: String = "propertyName";
        elapsed_time: f64 = "elapsedTime";
        pseudo_element: String = "pseudoElement";
    }
}

event_leaf!(PageTransitionEvent);

impl PageTransitionEvent {
    members! {
        persisted: bool = "persisted";
    }
}

event_leaf!(BeforeUnloadEvent);

impl BeforeUnloadEvent {
    members! {
        return_value: String = "returnValue";
    }

    pub fn set_return_value(&self, value: &str) -> Result<()> {
        Ok(self.as_event().handle().set("returnValue", value)?)
    }
}

event_leaf!(ClipboardEvent);

impl ClipboardEvent {
    pub fn clipboard_data(&self) -> Result<Option<Handle>> {
        self.as_event().read("clipboardData")
    }
}

event_leaf!(AudioProcessingEvent);
event_leaf!(BeforeInputEvent);
event_leaf!(BlobEvent);
event_leaf!(CssFontFaceLoadEvent);
event_leaf!(DeviceLightEvent);
event_leaf!(DeviceMotionEvent);
event_leaf!(DeviceOrientationEvent);
event_leaf!(DeviceProximityEvent);
event_leaf!(DomTransactionEvent);
event_leaf!(EditingBeforeInputEvent);
event_leaf!(GamepadEvent);
event_leaf!(IdbVersionChangeEvent);
event_leaf!(MediaStreamEvent);
event_leaf!(MutationEvent);
event_leaf!(OfflineAudioCompletionEvent);
event_leaf!(RelatedEvent);
event_leaf!(RtcPeerConnectionIceEvent);
event_leaf!(SensorEvent);
event_leaf!(SvgEvent);
event_leaf!(TimeEvent);
event_leaf!(TrackEvent);
event_leaf!(UserProximityEvent);

macro_rules! event_dispatch {
    ($($variant:ident($ty:ident) = $tag:ident,)*) => {
        /// Every event facade the dispatch table can produce.
        #[derive(Debug, Clone)]
        pub enum AnyEvent {
            $($variant($ty),)*
            /// `Event` itself, and the fallback for unrecognized tags.
            Generic(BasicEvent),
        }

        impl AnyEvent {
            pub(crate) fn from_layer(event: BasicEvent) -> Self {
                #[allow(unreachable_patterns)]
                match event.tag().event() {
                    $(Some(EventTag::$tag) => AnyEvent::$variant($ty::from_layer(event)),)*
                    Some(EventTag::Event) => AnyEvent::Generic(event),
                    _ => {
                        debug!(target: "dom_facade", tag = %event.tag(), "unrecognized event tag, using a generic facade");
                        AnyEvent::Generic(event)
                    }
                }
            }

            fn layer(&self) -> &BasicEvent {
                match self {
                    $(AnyEvent::$variant(inner) => inner.as_event(),)*
                    AnyEvent::Generic(inner) => inner,
                }
            }
        }

        $(downcast_from_event!($ty, EventTag::$tag.name(), AnyEvent::$variant(inner) => inner);)*
    };
}

event_dispatch! {
    Animation(AnimationEvent) = Animation,
    AudioProcessing(AudioProcessingEvent) = AudioProcessing,
    BeforeInput(BeforeInputEvent) = BeforeInput,
    BeforeUnload(BeforeUnloadEvent) = BeforeUnload,
    Blob(BlobEvent) = Blob,
    Clipboard(ClipboardEvent) = Clipboard,
    Close(CloseEvent) = Close,
    Composition(CompositionEvent) = Composition,
    CssFontFaceLoad(CssFontFaceLoadEvent) = CssFontFaceLoad,
    Custom(CustomEvent) = Custom,
    DeviceLight(DeviceLightEvent) = DeviceLight,
    DeviceMotion(DeviceMotionEvent) = DeviceMotion,
    DeviceOrientation(DeviceOrientationEvent) = DeviceOrientation,
    DeviceProximity(DeviceProximityEvent) = DeviceProximity,
    DomTransaction(DomTransactionEvent) = DomTransaction,
    Drag(DragEvent) = Drag,
    EditingBeforeInput(EditingBeforeInputEvent) = EditingBeforeInput,
    Error(ErrorEvent) = Error,
    Focus(FocusEvent) = Focus,
    Gamepad(GamepadEvent) = Gamepad,
    HashChange(HashChangeEvent) = HashChange,
    IdbVersionChange(IdbVersionChangeEvent) = IdbVersionChange,
    Keyboard(KeyboardEvent) = Keyboard,
    MediaStream(MediaStreamEvent) = MediaStream,
    Message(MessageEvent) = Message,
    Mouse(MouseEvent) = Mouse,
    Mutation(MutationEvent) = Mutation,
    OfflineAudioCompletion(OfflineAudioCompletionEvent) = OfflineAudioCompletion,
    PageTransition(PageTransitionEvent) = PageTransition,
    Pointer(PointerEvent) = Pointer,
    PopState(PopStateEvent) = PopState,
    Progress(ProgressEvent) = Progress,
    Related(RelatedEvent) = Related,
    RtcPeerConnectionIce(RtcPeerConnectionIceEvent) = RtcPeerConnectionIce,
    Sensor(SensorEvent) = Sensor,
    Storage(StorageEvent) = Storage,
    Svg(SvgEvent) = Svg,
    SvgZoom(SvgZoomEvent) = SvgZoom,
    Time(TimeEvent) = Time,
    Touch(TouchEvent) = Touch,
    Track(TrackEvent) = Track,
    Transition(TransitionEvent) = Transition,
    Ui(BasicUiEvent) = Ui,
    UserProximity(UserProximityEvent) = UserProximity,
    Wheel(WheelEvent) = Wheel,
}

impl AnyEvent {
    pub(crate) fn from_handle(realm: &Realm, handle: Handle) -> Result<Self> {
        let tag = realm.resolver().tag_of_object(&handle)?;
        Ok(Self::from_layer(BasicEvent::new(realm.clone(), handle, tag)))
    }

    /// The UI layer, for events that have one.
    pub fn as_ui_event(&self) -> Option<&dyn UiEvent> {
        match self {
            AnyEvent::Ui(inner) => Some(inner),
            AnyEvent::Mouse(inner) => Some(inner),
            AnyEvent::Keyboard(inner) => Some(inner),
            AnyEvent::Touch(inner) => Some(inner),
            AnyEvent::Focus(inner) => Some(inner),
            AnyEvent::Composition(inner) => Some(inner),
            AnyEvent::SvgZoom(inner) => Some(inner),
            AnyEvent::Wheel(inner) => Some(inner),
            AnyEvent::Drag(inner) => Some(inner),
            AnyEvent::Pointer(inner) => Some(inner),
            _ => None,
        }
    }

    /// The mouse layer, for mouse events and their extensions.
    pub fn as_mouse_event(&self) -> Option<&MouseEvent> {
        match self {
            AnyEvent::Mouse(inner) => Some(inner),
            AnyEvent::Wheel(inner) => Some(inner.mouse()),
            AnyEvent::Drag(inner) => Some(inner.mouse()),
            AnyEvent::Pointer(inner) => Some(inner.mouse()),
            _ => None,
        }
    }
}

impl Event for AnyEvent {
    fn as_event(&self) -> &BasicEvent {
        self.layer()
    }
}

downcast_from_event!(AnyEvent, "Event", event => event);

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::BridgeConfig;
    use crate::host::memory::MemoryHost;

    fn realm(host: &MemoryHost) -> Realm {
        Realm::new(host.global(), BridgeConfig::default())
    }

    fn event(host: &MemoryHost, interface: &str, event_type: &str, init: serde_json::Value) -> AnyEvent {
        let handle = host.create_event(interface, event_type, &init).unwrap();
        realm(host).wrap_event(&Value::from(handle)).unwrap().unwrap()
    }

    #[test]
    fn every_event_tag_gets_its_own_variant() {
        let host = MemoryHost::new();
        for tag in EventTag::ALL {
            let wrapped = event(&host, tag.name(), "sample", json!({}));
            assert_eq!(wrapped.tag(), &TypeTag::Event(*tag));
            let generic = matches!(wrapped, AnyEvent::Generic(_));
            assert_eq!(generic, *tag == EventTag::Event, "{tag}");
        }
    }

    #[test]
    fn keyboard_events_expose_key_and_modifiers() {
        let host = MemoryHost::new();
        let AnyEvent::Keyboard(keyboard) = event(
            &host,
            "KeyboardEvent",
            "keydown",
            json!({"key": "a", "code": "KeyA", "ctrlKey": true, "shiftKey": true, "location": 1}),
        ) else {
            panic!("expected a keyboard event");
        };
        assert_eq!(keyboard.key().unwrap(), "a");
        assert_eq!(keyboard.code().unwrap(), "KeyA");
        assert_eq!(
            keyboard.modifiers().unwrap(),
            Modifiers::CONTROL | Modifiers::SHIFT
        );
        assert_eq!(keyboard.location().unwrap(), Location::Left);
        assert!(!keyboard.repeat().unwrap());
        assert!(keyboard.get_modifier_state("Control").unwrap());
        assert!(!keyboard.get_modifier_state("Alt").unwrap());
        assert_eq!(keyboard.detail().unwrap(), 0.0);
    }

    #[test]
    fn mouse_extensions_reach_the_mouse_layer() {
        let host = MemoryHost::new();
        let wrapped = event(
            &host,
            "WheelEvent",
            "wheel",
            json!({"clientX": 10, "clientY": 20, "deltaY": -3, "button": 1}),
        );
        let mouse = wrapped.as_mouse_event().unwrap();
        assert_eq!(mouse.client_x().unwrap(), 10.0);
        assert_eq!(mouse.button().unwrap(), 1);
        assert!(mouse.related_target().unwrap().is_none());
        let AnyEvent::Wheel(wheel) = &wrapped else {
            panic!("expected a wheel event");
        };
        assert_eq!(wheel.delta_y().unwrap(), -3.0);
        assert!(wrapped.as_ui_event().is_some());

        let plain = event(&host, "Event", "load", json!({}));
        assert!(plain.as_mouse_event().is_none());
        assert!(plain.as_ui_event().is_none());
    }

    #[test]
    fn close_and_custom_events_carry_their_members() {
        let host = MemoryHost::new();
        let AnyEvent::Close(close) = event(
            &host,
            "CloseEvent",
            "close",
            json!({"code": 1006, "reason": "gone", "wasClean": false}),
        ) else {
            panic!("expected a close event");
        };
        assert_eq!(close.code().unwrap(), 1006);
        assert_eq!(close.reason().unwrap(), "gone");
        assert!(!close.was_clean().unwrap());

        let AnyEvent::Custom(custom) =
            event(&host, "CustomEvent", "ready", json!({"detail": "payload"}))
        else {
            panic!("expected a custom event");
        };
        assert_eq!(custom.detail().unwrap(), Value::from("payload"));
    }

    #[test]
    fn default_prevention_needs_a_cancelable_event() {
        let host = MemoryHost::new();
        let realm = realm(&host);
        let init = EventInit {
            cancelable: true,
            ..EventInit::default()
        }
        .with("key", "Enter");
        let event = realm.create_event_as("KeyboardEvent", "keydown", &init).unwrap();
        assert_eq!(event.event_phase().unwrap(), EventPhase::None);
        event.prevent_default().unwrap();
        assert!(event.default_prevented().unwrap());
        let AnyEvent::Keyboard(keyboard) = &event else {
            panic!("expected a keyboard event");
        };
        assert_eq!(keyboard.key().unwrap(), "Enter");

        let passive = realm.create_event("scroll", &EventInit::default()).unwrap();
        passive.prevent_default().unwrap();
        assert!(!passive.default_prevented().unwrap());
    }

    #[test]
    fn event_init_deserializes_from_camel_case() {
        let init: EventInit =
            serde_json::from_value(json!({"bubbles": true, "clientX": 4})).unwrap();
        assert!(init.bubbles);
        assert!(!init.cancelable);
        assert_eq!(init.extra.get("clientX"), Some(&json!(4)));
    }
}

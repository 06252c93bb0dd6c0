//! The window facade over the host global, plus `Location`.

use std::time::Duration;

use tracing::{error, trace};

use crate::document::AnyDocument;
use crate::element::AnyElement;
use crate::error::{BridgeError, Result};
use crate::host::{Callback, FromValue, Handle, Value};
use crate::realm::Realm;
use crate::url_utils::UrlUtils;

/// A host timer, for [`Window::clear_timeout`] and [`Window::clear_interval`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u32);

impl TimerId {
    pub fn get(self) -> u32 {
        self.0
    }
}

/// A pending animation frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationFrameId(u32);

impl AnimationFrameId {
    pub fn get(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Window {
    handle: Handle,
    realm: Realm,
}

impl Window {
    pub(crate) fn new(realm: Realm, handle: Handle) -> Self {
        Self { handle, realm }
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    fn read<T: FromValue>(&self, name: &str) -> Result<T> {
        self.handle.get_as(name)
    }

    fn invoke<T: FromValue>(&self, method: &str, args: &[Value]) -> Result<T> {
        self.handle.call_as(method, args)
    }

    fn related_window(&self, name: &str) -> Result<Option<Window>> {
        let window: Option<Handle> = self.read(name)?;
        Ok(window.map(|handle| Window::new(self.realm.clone(), handle)))
    }

    pub fn document(&self) -> Result<Option<AnyDocument>> {
        self.realm.wrap_document(&self.handle.get("document")?)
    }

    pub fn location(&self) -> Result<Option<Location>> {
        let location: Option<Handle> = self.read("location")?;
        Ok(location.map(Location::new))
    }

    pub fn name(&self) -> Result<String> {
        self.read("name")
    }

    pub fn set_name(&self, name: &str) -> Result<()> {
        Ok(self.handle.set("name", name)?)
    }

    pub fn closed(&self) -> Result<bool> {
        self.read("closed")
    }

    pub fn inner_width(&self) -> Result<f64> {
        self.read("innerWidth")
    }

    pub fn inner_height(&self) -> Result<f64> {
        self.read("innerHeight")
    }

    pub fn outer_width(&self) -> Result<f64> {
        self.read("outerWidth")
    }

    pub fn outer_height(&self) -> Result<f64> {
        self.read("outerHeight")
    }

    pub fn device_pixel_ratio(&self) -> Result<f64> {
        self.read("devicePixelRatio")
    }

    pub fn scroll_x(&self) -> Result<f64> {
        self.read("scrollX")
    }

    pub fn scroll_y(&self) -> Result<f64> {
        self.read("scrollY")
    }

    /// The embedding element, for a window inside a frame.
    pub fn frame_element(&self) -> Result<Option<AnyElement>> {
        self.realm.wrap_element(&self.handle.get("frameElement")?)
    }

    /// A top-level window is its own parent.
    pub fn parent(&self) -> Result<Option<Window>> {
        self.related_window("parent")
    }

    pub fn top(&self) -> Result<Option<Window>> {
        self.related_window("top")
    }

    pub fn opener(&self) -> Result<Option<Window>> {
        self.related_window("opener")
    }

    pub fn alert(&self, message: &str) -> Result<()> {
        self.invoke("alert", &[Value::from(message)])
    }

    pub fn confirm(&self, message: &str) -> Result<bool> {
        self.invoke("confirm", &[Value::from(message)])
    }

    /// `None` when the prompt was dismissed.
    pub fn prompt(&self, message: &str, default: &str) -> Result<Option<String>> {
        match self.handle.call("prompt", &[Value::from(message), Value::from(default)])? {
            Value::Undefined | Value::Null => Ok(None),
            Value::String(answer) => Ok(Some(answer)),
            other => Err(BridgeError::UnexpectedValue {
                property: String::from("prompt()"),
                expected: "string or null",
                found: other.kind(),
            }),
        }
    }

    pub fn focus(&self) -> Result<()> {
        self.invoke("focus", &[])
    }

    pub fn blur(&self) -> Result<()> {
        self.invoke("blur", &[])
    }

    pub fn close(&self) -> Result<()> {
        self.invoke("close", &[])
    }

    pub fn print(&self) -> Result<()> {
        self.invoke("print", &[])
    }

    pub fn stop(&self) -> Result<()> {
        self.invoke("stop", &[])
    }

    pub fn scroll_to(&self, x: f64, y: f64) -> Result<()> {
        self.invoke("scrollTo", &[Value::from(x), Value::from(y)])
    }

    pub fn scroll_by(&self, dx: f64, dy: f64) -> Result<()> {
        self.invoke("scrollBy", &[Value::from(dx), Value::from(dy)])
    }

    fn schedule<F>(&self, method: &str, handler: F, delay: Duration) -> Result<TimerId>
    where
        F: Fn() + 'static,
    {
        let callback = Callback::new(move |_| {
            handler();
            Ok(Value::Undefined)
        });
        let delay_ms = delay.as_millis() as f64;
        let timer_id: u32 = self.invoke(method, &[Value::from(callback), Value::from(delay_ms)])?;
        trace!(target: "dom_facade", method, timer_id, delay_ms, "timer scheduled");
        Ok(TimerId(timer_id))
    }

    /// Run `handler` once after `delay`. The host decides when that is.
    pub fn set_timeout<F>(&self, handler: F, delay: Duration) -> Result<TimerId>
    where
        F: Fn() + 'static,
    {
        self.schedule("setTimeout", handler, delay)
    }

    /// Run `handler` every `period` until cleared.
    pub fn set_interval<F>(&self, handler: F, period: Duration) -> Result<TimerId>
    where
        F: Fn() + 'static,
    {
        self.schedule("setInterval", handler, period)
    }

    pub fn clear_timeout(&self, timer: TimerId) -> Result<()> {
        self.invoke("clearTimeout", &[Value::from(timer.0)])
    }

    pub fn clear_interval(&self, timer: TimerId) -> Result<()> {
        self.invoke("clearInterval", &[Value::from(timer.0)])
    }

    /// `handler` gets the frame timestamp on the host's clock.
    pub fn request_animation_frame<F>(&self, handler: F) -> Result<AnimationFrameId>
    where
        F: Fn(Duration) + 'static,
    {
        let callback = Callback::new(move |args: &[Value]| {
            let timestamp = match args.first() {
                Some(Value::Number(ms)) => match Duration::try_from_secs_f64(ms / 1000.0) {
                    Ok(timestamp) => timestamp,
                    Err(err) => {
                        error!(
                            target: "dom_facade",
                            ms,
                            error = %err,
                            "animation frame timestamp out of range"
                        );
                        Duration::ZERO
                    }
                },
                other => {
                    error!(
                        target: "dom_facade",
                        found = other.map_or("nothing", crate::host::Value::kind),
                        "animation frame without a usable timestamp"
                    );
                    Duration::ZERO
                }
            };
            handler(timestamp);
            Ok(Value::Undefined)
        });
        let frame_id: u32 = self.invoke("requestAnimationFrame", &[Value::from(callback)])?;
        trace!(target: "dom_facade", frame_id, "animation frame requested");
        Ok(AnimationFrameId(frame_id))
    }

    pub fn cancel_animation_frame(&self, frame: AnimationFrameId) -> Result<()> {
        self.invoke("cancelAnimationFrame", &[Value::from(frame.0)])
    }
}

/// The window's (or document's) `location`.
#[derive(Debug, Clone)]
pub struct Location {
    handle: Handle,
    url: UrlUtils,
}

impl Location {
    pub(crate) fn new(handle: Handle) -> Self {
        Self {
            url: UrlUtils::new(handle.clone()),
            handle,
        }
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn url_utils(&self) -> &UrlUtils {
        &self.url
    }

    pub fn assign(&self, url: &str) -> Result<()> {
        self.handle.call_as("assign", &[Value::from(url)])
    }

    pub fn replace(&self, url: &str) -> Result<()> {
        self.handle.call_as("replace", &[Value::from(url)])
    }

    pub fn reload(&self) -> Result<()> {
        self.handle.call_as("reload", &[])
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::config::BridgeConfig;
    use crate::document::Document;
    use crate::host::memory::MemoryHost;

    fn window(host: &MemoryHost) -> Window {
        Realm::new(host.global(), BridgeConfig::default()).window()
    }

    #[test]
    fn timeouts_fire_once_and_can_be_cleared() {
        let host = MemoryHost::new();
        let window = window(&host);
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        window
            .set_timeout(move || counter.set(counter.get() + 1), Duration::from_millis(20))
            .unwrap();
        let cancelled = window.set_timeout(|| panic!("cleared"), Duration::from_millis(5)).unwrap();
        window.clear_timeout(cancelled).unwrap();

        assert_eq!(host.advance(10).unwrap(), 0);
        assert_eq!(host.advance(10).unwrap(), 1);
        assert_eq!(host.advance(100).unwrap(), 0);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn intervals_repeat_until_cleared() {
        let host = MemoryHost::new();
        let window = window(&host);
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        let interval = window
            .set_interval(move || counter.set(counter.get() + 1), Duration::from_millis(10))
            .unwrap();
        host.advance(35).unwrap();
        assert_eq!(fired.get(), 3);
        window.clear_interval(interval).unwrap();
        host.advance(100).unwrap();
        assert_eq!(fired.get(), 3);
        assert_eq!(host.pending_timers(), 0);
    }

    #[test]
    fn animation_frames_receive_the_timestamp() {
        let host = MemoryHost::new();
        let window = window(&host);
        let stamps = Rc::new(RefCell::new(Vec::new()));
        let sink = stamps.clone();
        window
            .request_animation_frame(move |at| sink.borrow_mut().push(at))
            .unwrap();
        let skipped = window.request_animation_frame(|_| panic!("cancelled")).unwrap();
        window.cancel_animation_frame(skipped).unwrap();

        assert_eq!(host.run_animation_frame(16.0).unwrap(), 1);
        assert_eq!(*stamps.borrow(), vec![Duration::from_millis(16)]);
    }

    #[test]
    fn dialogs_go_through_the_host() {
        let host = MemoryHost::new();
        let window = window(&host);
        window.alert("saved").unwrap();
        assert!(!window.confirm("discard?").unwrap());
        assert_eq!(window.prompt("name?", "").unwrap(), None);
        host.set_dialog_answer(Some("Ada"));
        assert!(window.confirm("discard?").unwrap());
        assert_eq!(window.prompt("name?", "").unwrap().as_deref(), Some("Ada"));
        assert_eq!(host.dialogs().len(), 5);
        assert_eq!(host.dialogs()[0], "alert: saved");
    }

    #[test]
    fn top_level_windows_are_their_own_parent() {
        let host = MemoryHost::new();
        let window = window(&host);
        assert_eq!(window.parent().unwrap().unwrap().handle(), window.handle());
        assert_eq!(window.top().unwrap().unwrap().handle(), window.handle());
        assert!(window.opener().unwrap().is_none());
        assert!(window.frame_element().unwrap().is_none());
        assert!(!window.closed().unwrap());
        window.close().unwrap();
        assert!(window.closed().unwrap());
    }

    #[test]
    fn scrolling_and_geometry() {
        let host = MemoryHost::new();
        let window = window(&host);
        window.scroll_to(10.0, 20.0).unwrap();
        window.scroll_by(5.0, -5.0).unwrap();
        assert_eq!(window.scroll_x().unwrap(), 15.0);
        assert_eq!(window.scroll_y().unwrap(), 15.0);
        assert_eq!(window.inner_width().unwrap(), 1024.0);
        window.set_name("main").unwrap();
        assert_eq!(window.name().unwrap(), "main");
    }

    #[test]
    fn location_navigates_the_document() {
        let host = MemoryHost::new();
        let window = window(&host);
        let location = window.location().unwrap().unwrap();
        location.assign("https://example.com/a?x=1").unwrap();
        assert_eq!(location.url_utils().pathname().unwrap(), "/a");
        location.replace("https://example.com/b").unwrap();
        location.reload().unwrap();

        let document = window.document().unwrap().unwrap();
        assert_eq!(document.url().unwrap(), "https://example.com/b");
    }
}

//! Media and embedded content.
//!
//! Audio and video sit on an intermediate [`HtmlMediaElement`] layer, so
//! their structural accessors forward through two fields.

use std::time::Duration;

use tracing::error;

use super::form::{FormAssociated, Validatable};
use super::{related_all, BasicHtmlElement, HtmlAreaElement};
use crate::document::AnyDocument;
use crate::error::Result;
use crate::host::{Handle, Value};
use crate::node::{BasicNode, Node};
use crate::window::Window;

fn content_document(node: &BasicNode) -> Result<Option<AnyDocument>> {
    node.realm().wrap_document(&node.read::<Value>("contentDocument")?)
}

fn content_window(node: &BasicNode) -> Result<Option<Window>> {
    let window: Option<Handle> = node.read("contentWindow")?;
    Ok(window.map(|handle| Window::new(node.realm().clone(), handle)))
}

/// Playback shared by audio and video. Also what the dispatch table yields
/// for a bare `HTMLMediaElement`.
#[derive(Debug, Clone)]
pub struct HtmlMediaElement {
    html: BasicHtmlElement,
}

impl HtmlMediaElement {
    pub(crate) fn from_layer(html: BasicHtmlElement) -> Self {
        Self { html }
    }

    pub fn play(&self) -> Result<()> {
        self.as_node().invoke("play", &[])
    }

    pub fn pause(&self) -> Result<()> {
        self.as_node().invoke("pause", &[])
    }

    pub fn load(&self) -> Result<()> {
        self.as_node().invoke("load", &[])
    }

    /// `""`, `"maybe"` or `"probably"`.
    pub fn can_play_type(&self, mime: &str) -> Result<String> {
        self.as_node().invoke("canPlayType", &[Value::from(mime)])
    }

    pub fn paused(&self) -> Result<bool> {
        self.as_node().read("paused")
    }

    pub fn ended(&self) -> Result<bool> {
        self.as_node().read("ended")
    }

    pub fn current_time(&self) -> Result<Duration> {
        let seconds: f64 = self.as_node().read("currentTime")?;
        match Duration::try_from_secs_f64(seconds) {
            Ok(time) => Ok(time),
            Err(err) => {
                error!(target: "dom_facade", seconds, error = %err, "currentTime out of range");
                Ok(Duration::ZERO)
            }
        }
    }

    pub fn set_current_time(&self, time: Duration) -> Result<()> {
        self.as_node().write("currentTime", time.as_secs_f64())
    }

    /// `None` while the duration is unknown.
    pub fn duration(&self) -> Result<Option<Duration>> {
        let seconds: f64 = self.as_node().read("duration")?;
        Ok(Duration::try_from_secs_f64(seconds).ok())
    }

    pub fn current_src(&self) -> Result<String> {
        self.as_node().read("currentSrc")
    }

    reflect! {
        autoplay / set_autoplay: bool = "autoplay";
        controls / set_controls: bool = "controls";
        looping / set_looping: bool = "loop";
        muted / set_muted: bool = "muted";
        preload / set_preload: String = "preload";
        src / set_src: String = "src";
        volume / set_volume: f64 = "volume";
    }
}

html_layers!(HtmlMediaElement, html);

#[derive(Debug, Clone)]
pub struct HtmlAudioElement {
    media: HtmlMediaElement,
}

impl HtmlAudioElement {
    pub(crate) fn from_layer(html: BasicHtmlElement) -> Self {
        Self {
            media: HtmlMediaElement::from_layer(html),
        }
    }

    pub fn media(&self) -> &HtmlMediaElement {
        &self.media
    }
}

html_layers!(HtmlAudioElement, media.html);

#[derive(Debug, Clone)]
pub struct HtmlVideoElement {
    media: HtmlMediaElement,
}

impl HtmlVideoElement {
    pub(crate) fn from_layer(html: BasicHtmlElement) -> Self {
        Self {
            media: HtmlMediaElement::from_layer(html),
        }
    }

    pub fn media(&self) -> &HtmlMediaElement {
        &self.media
    }

    reflect! {
        poster / set_poster: String = "poster";
        width / set_width: f64 = "width";
        height / set_height: f64 = "height";
    }
}

html_layers!(HtmlVideoElement, media.html);

html_element!(HtmlTrackElement);

impl HtmlTrackElement {
    reflect! {
        default / set_default: bool = "default";
        kind / set_kind: String = "kind";
        label / set_label: String = "label";
        src / set_src: String = "src";
        src_lang / set_src_lang: String = "srclang";
    }
}

html_element!(HtmlSourceElement);

impl HtmlSourceElement {
    reflect! {
        media / set_media: String = "media";
        src / set_src: String = "src";
        source_type / set_source_type: String = "type";
    }
}

html_element!(HtmlCanvasElement);

impl HtmlCanvasElement {
    /// The raw rendering context, when the host provides one.
    pub fn get_context(&self, kind: &str) -> Result<Option<Handle>> {
        self.as_node().invoke("getContext", &[Value::from(kind)])
    }

    reflect! {
        width / set_width: f64 = "width";
        height / set_height: f64 = "height";
    }
}

html_element!(HtmlImageElement);

impl HtmlImageElement {
    reflect! {
        alt / set_alt: String = "alt";
        height / set_height: f64 = "height";
        is_map / set_is_map: bool = "isMap";
        src / set_src: String = "src";
        use_map / set_use_map: String = "useMap";
        width / set_width: f64 = "width";
    }
}

html_element!(HtmlMapElement);

impl HtmlMapElement {
    pub fn areas(&self) -> Result<Vec<HtmlAreaElement>> {
        related_all(self.as_node(), "areas")
    }

    reflect! {
        name / set_name: String = "name";
    }
}

html_element!(HtmlIFrameElement);

impl HtmlIFrameElement {
    pub fn content_document(&self) -> Result<Option<AnyDocument>> {
        content_document(self.as_node())
    }

    pub fn content_window(&self) -> Result<Option<Window>> {
        content_window(self.as_node())
    }

    reflect! {
        height / set_height: f64 = "height";
        name / set_name: String = "name";
        src / set_src: String = "src";
        width / set_width: f64 = "width";
    }
}

html_element!(HtmlFrameElement);

impl HtmlFrameElement {
    pub fn content_document(&self) -> Result<Option<AnyDocument>> {
        content_document(self.as_node())
    }

    pub fn content_window(&self) -> Result<Option<Window>> {
        content_window(self.as_node())
    }

    reflect! {
        name / set_name: String = "name";
        src / set_src: String = "src";
    }
}

html_element!(HtmlEmbedElement);

impl HtmlEmbedElement {
    reflect! {
        height / set_height: f64 = "height";
        src / set_src: String = "src";
        embed_type / set_embed_type: String = "type";
        width / set_width: f64 = "width";
    }
}

html_element!(HtmlObjectElement);

impl HtmlObjectElement {
    pub fn content_document(&self) -> Result<Option<AnyDocument>> {
        content_document(self.as_node())
    }

    pub fn content_window(&self) -> Result<Option<Window>> {
        content_window(self.as_node())
    }

    reflect! {
        height / set_height: f64 = "height";
        name / set_name: String = "name";
        object_type / set_object_type: String = "type";
        use_map / set_use_map: String = "useMap";
        width / set_width: f64 = "width";
    }
}

impl FormAssociated for HtmlObjectElement {}
impl Validatable for HtmlObjectElement {}

html_element!(HtmlParamElement);

impl HtmlParamElement {
    reflect! {
        name / set_name: String = "name";
        value / set_value: String = "value";
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::config::BridgeConfig;
    use crate::element::Element;
    use crate::html::{AnyHtmlElement, HtmlElement};
    use crate::host::memory::MemoryHost;
    use crate::listener::EventTarget;
    use crate::realm::Realm;

    fn wrap(host: &MemoryHost, realm: &Realm, tag: &str) -> AnyHtmlElement {
        realm
            .wrap_html_element(&Value::from(host.create_element(tag)))
            .unwrap()
            .unwrap()
    }

    #[test]
    fn out_of_range_media_times_fall_back() {
        let host = MemoryHost::new();
        let realm = Realm::new(host.global(), BridgeConfig::default());
        let AnyHtmlElement::Audio(audio) = wrap(&host, &realm, "audio") else {
            panic!("expected an audio facade");
        };
        let handle = Node::handle(&audio);
        handle.set("currentTime", 1e300).unwrap();
        handle.set("duration", f64::INFINITY).unwrap();
        assert_eq!(audio.media().current_time().unwrap(), Duration::ZERO);
        assert_eq!(audio.media().duration().unwrap(), None);

        audio
            .media()
            .set_current_time(Duration::from_millis(1500))
            .unwrap();
        assert_eq!(
            audio.media().current_time().unwrap(),
            Duration::from_millis(1500)
        );
    }

    #[test]
    fn video_reaches_the_media_layer() {
        let host = MemoryHost::new();
        let realm = Realm::new(host.global(), BridgeConfig::default());
        let AnyHtmlElement::Video(video) = wrap(&host, &realm, "video") else {
            panic!("expected a video facade");
        };
        let played = Rc::new(Cell::new(0));
        let seen = played.clone();
        video
            .add_event_listener("play", false, move |_| seen.set(seen.get() + 1))
            .unwrap();

        assert!(video.media().paused().unwrap());
        video.media().play().unwrap();
        assert!(!video.media().paused().unwrap());
        assert_eq!(played.get(), 1);
        assert_eq!(video.media().duration().unwrap(), None);
        assert_eq!(video.media().current_time().unwrap(), Duration::ZERO);

        video.set_poster("poster.png").unwrap();
        video.set_width(640.0).unwrap();
        assert_eq!(video.width().unwrap(), 640.0);
        assert_eq!(video.get_attribute("poster").unwrap().as_deref(), Some("poster.png"));
        video.set_hidden(true).unwrap();
        assert!(video.hidden().unwrap());
    }

    #[test]
    fn bare_media_interface_dispatches_to_the_shared_layer() {
        let host = MemoryHost::new();
        let realm = Realm::new(host.global(), BridgeConfig::default());
        let handle = host.create_element_as("x-player", "HTMLMediaElement");
        let wrapped = realm.wrap_html_element(&Value::from(handle)).unwrap().unwrap();
        assert!(matches!(wrapped, AnyHtmlElement::Media(_)));
    }

    #[test]
    fn maps_list_their_areas() {
        let host = MemoryHost::from_html(
            r#"<body><map id="m" name="nav"><area href="/a"><area href="/b"></map></body>"#,
        )
        .unwrap();
        host.set_url("https://example.com/").unwrap();
        let realm = Realm::new(host.global(), BridgeConfig::default());
        let handle = host
            .document()
            .call("getElementById", &[Value::from("m")])
            .unwrap();
        let Some(AnyHtmlElement::Map(map)) = realm.wrap_html_element(&handle).unwrap() else {
            panic!("expected a map facade");
        };
        assert_eq!(map.name().unwrap(), "nav");
        let areas = map.areas().unwrap();
        assert_eq!(areas.len(), 2);
        assert_eq!(areas[1].url_utils().pathname().unwrap(), "/b");
    }

    #[test]
    fn frames_without_content_have_no_document() {
        let host = MemoryHost::new();
        let realm = Realm::new(host.global(), BridgeConfig::default());
        let AnyHtmlElement::IFrame(frame) = wrap(&host, &realm, "iframe") else {
            panic!("expected an iframe facade");
        };
        assert!(frame.content_document().unwrap().is_none());
        assert!(frame.content_window().unwrap().is_none());

        let AnyHtmlElement::Canvas(canvas) = wrap(&host, &realm, "canvas") else {
            panic!("expected a canvas facade");
        };
        assert!(canvas.get_context("2d").unwrap().is_none());
    }
}

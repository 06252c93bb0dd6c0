//! Type tags: the dispatch keys read off host objects.
//!
//! A tag is computed once per wrap, at this boundary, and everything past it
//! is ordinary pattern matching. Tags are never used as a stand-in for
//! object identity; two distinct elements of the same type share a tag.

use std::fmt;

use crate::config::{BridgeConfig, TagStrategy};
use crate::error::Result;
use crate::host::{Handle, Value};

macro_rules! tag_vocabulary {
    (@parent $enum:ident) => {
        None
    };
    (@parent $enum:ident $parent:ident) => {
        Some($enum::$parent)
    };
    (
        $(#[$meta:meta])*
        pub enum $enum:ident {
            $($variant:ident => $name:literal $(< $parent:ident)?,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $enum {
            $($variant,)*
        }

        impl $enum {
            pub const ALL: &'static [$enum] = &[$($enum::$variant,)*];

            /// The host interface name, e.g. `HTMLDivElement`.
            pub const fn name(self) -> &'static str {
                match self {
                    $($enum::$variant => $name,)*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some($enum::$variant),)*
                    _ => None,
                }
            }

            /// The next capability layer down, if any.
            pub fn parent(self) -> Option<Self> {
                match self {
                    $($enum::$variant => tag_vocabulary!(@parent $enum $($parent)?),)*
                }
            }

            /// Every layer below this one, nearest first.
            pub fn ancestors(self) -> Vec<Self> {
                let mut chain = Vec::new();
                let mut current = self.parent();
                while let Some(tag) = current {
                    chain.push(tag);
                    current = tag.parent();
                }
                chain
            }

            /// Whether a facade for `self` also satisfies `other`.
            pub fn is_a(self, other: Self) -> bool {
                self == other || self.ancestors().contains(&other)
            }
        }

        impl fmt::Display for $enum {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

tag_vocabulary! {
    /// Structural type tags.
    pub enum NodeTag {
        Node => "Node",
        Text => "Text" < Node,
        Comment => "Comment" < Node,
        Document => "Document" < Node,
        HtmlDocument => "HTMLDocument" < Document,
        DocumentFragment => "DocumentFragment" < Node,
        DocumentType => "DocumentType" < Node,
        Element => "Element" < Node,
        SvgElement => "SVGElement" < Element,
        HtmlElement => "HTMLElement" < Element,
        Anchor => "HTMLAnchorElement" < HtmlElement,
        Applet => "HTMLAppletElement" < HtmlElement,
        Area => "HTMLAreaElement" < HtmlElement,
        Media => "HTMLMediaElement" < HtmlElement,
        Audio => "HTMLAudioElement" < Media,
        Video => "HTMLVideoElement" < Media,
        Base => "HTMLBaseElement" < HtmlElement,
        Body => "HTMLBodyElement" < HtmlElement,
        Br => "HTMLBRElement" < HtmlElement,
        Button => "HTMLButtonElement" < HtmlElement,
        Canvas => "HTMLCanvasElement" < HtmlElement,
        Data => "HTMLDataElement" < HtmlElement,
        DataList => "HTMLDataListElement" < HtmlElement,
        Directory => "HTMLDirectoryElement" < HtmlElement,
        Div => "HTMLDivElement" < HtmlElement,
        DList => "HTMLDListElement" < HtmlElement,
        Embed => "HTMLEmbedElement" < HtmlElement,
        FieldSet => "HTMLFieldSetElement" < HtmlElement,
        Font => "HTMLFontElement" < HtmlElement,
        Form => "HTMLFormElement" < HtmlElement,
        Frame => "HTMLFrameElement" < HtmlElement,
        FrameSet => "HTMLFrameSetElement" < HtmlElement,
        Head => "HTMLHeadElement" < HtmlElement,
        Heading => "HTMLHeadingElement" < HtmlElement,
        Html => "HTMLHtmlElement" < HtmlElement,
        Hr => "HTMLHRElement" < HtmlElement,
        IFrame => "HTMLIFrameElement" < HtmlElement,
        Image => "HTMLImageElement" < HtmlElement,
        Input => "HTMLInputElement" < HtmlElement,
        Keygen => "HTMLKeygenElement" < HtmlElement,
        Label => "HTMLLabelElement" < HtmlElement,
        Legend => "HTMLLegendElement" < HtmlElement,
        Li => "HTMLLIElement" < HtmlElement,
        Link => "HTMLLinkElement" < HtmlElement,
        Map => "HTMLMapElement" < HtmlElement,
        Menu => "HTMLMenuElement" < HtmlElement,
        Meta => "HTMLMetaElement" < HtmlElement,
        Meter => "HTMLMeterElement" < HtmlElement,
        Mod => "HTMLModElement" < HtmlElement,
        Object => "HTMLObjectElement" < HtmlElement,
        OList => "HTMLOListElement" < HtmlElement,
        OptGroup => "HTMLOptGroupElement" < HtmlElement,
        Option => "HTMLOptionElement" < HtmlElement,
        Output => "HTMLOutputElement" < HtmlElement,
        Paragraph => "HTMLParagraphElement" < HtmlElement,
        Param => "HTMLParamElement" < HtmlElement,
        Pre => "HTMLPreElement" < HtmlElement,
        Progress => "HTMLProgressElement" < HtmlElement,
        Quote => "HTMLQuoteElement" < HtmlElement,
        Script => "HTMLScriptElement" < HtmlElement,
        Select => "HTMLSelectElement" < HtmlElement,
        Source => "HTMLSourceElement" < HtmlElement,
        Span => "HTMLSpanElement" < HtmlElement,
        Style => "HTMLStyleElement" < HtmlElement,
        Table => "HTMLTableElement" < HtmlElement,
        TableCaption => "HTMLTableCaptionElement" < HtmlElement,
        TableCell => "HTMLTableCellElement" < HtmlElement,
        TableDataCell => "HTMLTableDataCellElement" < TableCell,
        TableHeaderCell => "HTMLTableHeaderCellElement" < TableCell,
        TableCol => "HTMLTableColElement" < HtmlElement,
        TableRow => "HTMLTableRowElement" < HtmlElement,
        TableSection => "HTMLTableSectionElement" < HtmlElement,
        TextArea => "HTMLTextAreaElement" < HtmlElement,
        Time => "HTMLTimeElement" < HtmlElement,
        Title => "HTMLTitleElement" < HtmlElement,
        Track => "HTMLTrackElement" < HtmlElement,
        UList => "HTMLUListElement" < HtmlElement,
        Unknown => "HTMLUnknownElement" < HtmlElement,
    }
}

tag_vocabulary! {
    /// Event type tags. Disjoint from [`NodeTag`].
    pub enum EventTag {
        Event => "Event",
        Animation => "AnimationEvent" < Event,
        AudioProcessing => "AudioProcessingEvent" < Event,
        BeforeInput => "BeforeInputEvent" < Event,
        BeforeUnload => "BeforeUnloadEvent" < Event,
        Blob => "BlobEvent" < Event,
        Clipboard => "ClipboardEvent" < Event,
        Close => "CloseEvent" < Event,
        Composition => "CompositionEvent" < Ui,
        CssFontFaceLoad => "CSSFontFaceLoadEvent" < Event,
        Custom => "CustomEvent" < Event,
        DeviceLight => "DeviceLightEvent" < Event,
        DeviceMotion => "DeviceMotionEvent" < Event,
        DeviceOrientation => "DeviceOrientationEvent" < Event,
        DeviceProximity => "DeviceProximityEvent" < Event,
        DomTransaction => "DOMTransactionEvent" < Event,
        Drag => "DragEvent" < Mouse,
        EditingBeforeInput => "EditingBeforeInputEvent" < Event,
        Error => "ErrorEvent" < Event,
        Focus => "FocusEvent" < Ui,
        Gamepad => "GamepadEvent" < Event,
        HashChange => "HashChangeEvent" < Event,
        IdbVersionChange => "IDBVersionChangeEvent" < Event,
        Keyboard => "KeyboardEvent" < Ui,
        MediaStream => "MediaStreamEvent" < Event,
        Message => "MessageEvent" < Event,
        Mouse => "MouseEvent" < Ui,
        Mutation => "MutationEvent" < Event,
        OfflineAudioCompletion => "OfflineAudioCompletionEvent" < Event,
        PageTransition => "PageTransitionEvent" < Event,
        Pointer => "PointerEvent" < Mouse,
        PopState => "PopStateEvent" < Event,
        Progress => "ProgressEvent" < Event,
        Related => "RelatedEvent" < Event,
        RtcPeerConnectionIce => "RTCPeerConnectionIceEvent" < Event,
        Sensor => "SensorEvent" < Event,
        Storage => "StorageEvent" < Event,
        Svg => "SVGEvent" < Event,
        SvgZoom => "SVGZoomEvent" < Ui,
        Time => "TimeEvent" < Event,
        Touch => "TouchEvent" < Ui,
        Track => "TrackEvent" < Event,
        Transition => "TransitionEvent" < Event,
        Ui => "UIEvent" < Event,
        UserProximity => "UserProximityEvent" < Event,
        Wheel => "WheelEvent" < Mouse,
    }
}

/// The dispatch key of one host object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Node(NodeTag),
    Event(EventTag),
    /// A descriptor outside both vocabularies, carrying its printable name.
    Unrecognized(String),
}

impl TypeTag {
    pub fn from_name(name: &str) -> Self {
        if let Some(tag) = NodeTag::from_name(name) {
            TypeTag::Node(tag)
        } else if let Some(tag) = EventTag::from_name(name) {
            TypeTag::Event(tag)
        } else {
            TypeTag::Unrecognized(name.to_string())
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TypeTag::Node(tag) => tag.name(),
            TypeTag::Event(tag) => tag.name(),
            TypeTag::Unrecognized(name) => name,
        }
    }

    pub fn node(&self) -> Option<NodeTag> {
        match self {
            TypeTag::Node(tag) => Some(*tag),
            _ => None,
        }
    }

    pub fn event(&self) -> Option<EventTag> {
        match self {
            TypeTag::Event(tag) => Some(*tag),
            _ => None,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Unrecognized(name) if name.is_empty() => f.write_str("<anonymous>"),
            other => f.write_str(other.name()),
        }
    }
}

/// Reads type descriptors off host objects.
#[derive(Debug, Clone)]
pub struct TagResolver {
    global: Handle,
    strategy: TagStrategy,
    unwrap_wrapped_nodes: bool,
}

impl TagResolver {
    pub fn new(global: Handle, config: &BridgeConfig) -> Self {
        Self {
            global,
            strategy: config.tag_strategy,
            unwrap_wrapped_nodes: config.unwrap_wrapped_nodes,
        }
    }

    /// `None` for null/undefined; no descriptor is read in that case.
    pub fn tag_of(&self, value: &Value) -> Result<Option<TypeTag>> {
        let Some(handle) = value.as_handle() else {
            return Ok(None);
        };
        self.tag_of_object(handle).map(Some)
    }

    /// The tag of a known object, after any wrapper unwrapping.
    pub fn tag_of_object(&self, handle: &Handle) -> Result<TypeTag> {
        let target = self.descriptor_source(handle)?;
        self.tag_of_handle(&target)
    }

    fn descriptor_source(&self, handle: &Handle) -> Result<Handle> {
        if self.unwrap_wrapped_nodes {
            if let Value::Object(inner) = handle.get("node")? {
                return Ok(inner);
            }
        }
        Ok(handle.clone())
    }

    fn tag_of_handle(&self, handle: &Handle) -> Result<TypeTag> {
        let Some(descriptor) = handle.get_as::<Option<Handle>>("constructor")? else {
            return Ok(TypeTag::Unrecognized(String::new()));
        };
        let name: String = descriptor.get_as("name")?;
        match self.strategy {
            TagStrategy::TypeName => Ok(TypeTag::from_name(&name)),
            TagStrategy::Descriptor => {
                if name.is_empty() || !self.is_global_descriptor(&name, &descriptor)? {
                    return Ok(TypeTag::Unrecognized(name));
                }
                Ok(TypeTag::from_name(&name))
            }
        }
    }

    fn is_global_descriptor(&self, name: &str, descriptor: &Handle) -> Result<bool> {
        Ok(self.global.get(name)?.as_handle() == Some(descriptor))
    }

    /// Whether `handle` was built by the global constructor `global_name`.
    pub fn has_descriptor(&self, handle: &Handle, global_name: &str) -> Result<bool> {
        let Some(descriptor) = handle.get_as::<Option<Handle>>("constructor")? else {
            return Ok(false);
        };
        match self.strategy {
            TagStrategy::Descriptor => self.is_global_descriptor(global_name, &descriptor),
            TagStrategy::TypeName => Ok(descriptor.get_as::<String>("name")? == global_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabularies_are_disjoint() {
        for tag in NodeTag::ALL {
            assert!(EventTag::from_name(tag.name()).is_none(), "{tag}");
        }
        for tag in EventTag::ALL {
            assert!(NodeTag::from_name(tag.name()).is_none(), "{tag}");
        }
    }

    #[test]
    fn names_round_trip() {
        for tag in NodeTag::ALL {
            assert_eq!(NodeTag::from_name(tag.name()), Some(*tag));
        }
        for tag in EventTag::ALL {
            assert_eq!(EventTag::from_name(tag.name()), Some(*tag));
        }
    }

    #[test]
    fn layering_chains_end_at_the_root() {
        assert_eq!(
            NodeTag::Video.ancestors(),
            vec![NodeTag::Media, NodeTag::HtmlElement, NodeTag::Element, NodeTag::Node]
        );
        assert_eq!(
            EventTag::Wheel.ancestors(),
            vec![EventTag::Mouse, EventTag::Ui, EventTag::Event]
        );
        for tag in NodeTag::ALL {
            assert!(tag.is_a(NodeTag::Node));
        }
        for tag in EventTag::ALL {
            assert!(tag.is_a(EventTag::Event));
        }
    }

    #[test]
    fn event_vocabulary_size() {
        assert_eq!(EventTag::ALL.len(), 46);
    }

    #[test]
    fn unknown_names_are_unrecognized() {
        assert_eq!(
            TypeTag::from_name("MyWidget"),
            TypeTag::Unrecognized(String::from("MyWidget"))
        );
        assert_eq!(TypeTag::from_name("KeyboardEvent").event(), Some(EventTag::Keyboard));
        assert_eq!(TypeTag::from_name("HTMLDivElement").node(), Some(NodeTag::Div));
    }
}

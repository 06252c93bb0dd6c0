//! Typed facades over a dynamically typed host DOM.
//!
//! A host hands out opaque [`Handle`]s. Wrapping a handle reads its type tag
//! once, picks the facade for that tag from a dispatch table, and returns a
//! value whose traits ([`Node`], [`Element`], [`HtmlElement`], [`Event`], ...)
//! expose exactly the capabilities of the host interface. Collections come
//! back as snapshots, relationships such as `form` or `labels` are narrowed
//! to their static type, token lists are read through one abstraction, and
//! listeners are registered through adapters whose identity the caller
//! keeps.
//!
//! [`host::memory::MemoryHost`] is an in-process host for tests and headless
//! embedding.

pub mod collection;
pub mod config;
pub mod document;
pub mod element;
pub mod error;
pub mod event;
pub mod host;
pub mod html;
pub mod listener;
pub mod node;
pub mod realm;
pub mod relation;
pub mod tag;
pub mod token_list;
pub mod url_utils;
pub mod window;

pub use config::{BridgeConfig, ConfigError, TagStrategy};
pub use document::{AnyDocument, Document, DocumentFragment, HtmlDocument};
pub use element::{AnyElement, Element, ParentNode};
pub use error::{BridgeError, Result};
pub use event::{AnyEvent, Event, EventInit, EventPhase, UiEvent};
pub use host::{Callback, FromValue, Handle, HostError, HostObject, Value};
pub use html::{AnyHtmlElement, HtmlElement};
pub use listener::{AnyTarget, EventTarget, ListenerHandle};
pub use node::{AnyNode, Node, NodeType};
pub use realm::Realm;
pub use tag::{EventTag, NodeTag, TypeTag};
pub use token_list::TokenList;
pub use window::{AnimationFrameId, Location, TimerId, Window};

//! Following named relationships between host objects.
//!
//! A relationship such as `form` or `labels` is statically known to produce
//! one facade type. The host is trusted to honour that, and a host that does
//! not is reported as a contract violation instead of being coerced.

use tracing::error;

use crate::collection;
use crate::error::{BridgeError, Result};
use crate::host::{Handle, Value};
use crate::realm::Realm;
use crate::tag::TypeTag;

/// Narrowing from a handle to one statically expected facade type.
pub trait Downcast: Sized {
    /// Host interface name reported on mismatch.
    const EXPECTED: &'static str;

    /// Wrap `handle` through the dispatch table and narrow the result.
    /// The inner `Err` carries the tag that was found instead.
    fn narrow(realm: &Realm, handle: Handle) -> Result<std::result::Result<Self, TypeTag>>;
}

/// Implement [`Downcast`] for a structural facade by matching on the
/// [`AnyNode`](crate::node::AnyNode) the dispatch table produces.
macro_rules! downcast_from_node {
    ($ty:ty, $expected:expr, $pattern:pat => $out:expr) => {
        impl $crate::relation::Downcast for $ty {
            const EXPECTED: &'static str = $expected;

            fn narrow(
                realm: &$crate::realm::Realm,
                handle: $crate::host::Handle,
            ) -> $crate::error::Result<::std::result::Result<Self, $crate::tag::TypeTag>> {
                #[allow(unreachable_patterns)]
                match $crate::node::AnyNode::from_handle(realm, handle)? {
                    $pattern => Ok(Ok($out)),
                    other => Ok(Err($crate::node::Node::tag(&other).clone())),
                }
            }
        }
    };
}

/// The event-side twin of [`downcast_from_node`].
macro_rules! downcast_from_event {
    ($ty:ty, $expected:expr, $pattern:pat => $out:expr) => {
        impl $crate::relation::Downcast for $ty {
            const EXPECTED: &'static str = $expected;

            fn narrow(
                realm: &$crate::realm::Realm,
                handle: $crate::host::Handle,
            ) -> $crate::error::Result<::std::result::Result<Self, $crate::tag::TypeTag>> {
                #[allow(unreachable_patterns)]
                match $crate::event::AnyEvent::from_handle(realm, handle)? {
                    $pattern => Ok(Ok($out)),
                    other => Ok(Err($crate::event::Event::tag(&other).clone())),
                }
            }
        }
    };
}

pub(crate) use downcast_from_event;
pub(crate) use downcast_from_node;

fn narrow_related<T: Downcast>(realm: &Realm, handle: Handle, relationship: &str) -> Result<T> {
    match T::narrow(realm, handle)? {
        Ok(found) => Ok(found),
        Err(tag) => {
            error!(
                target: "dom_facade",
                relationship,
                expected = T::EXPECTED,
                found = %tag,
                "relationship resolved to an object of the wrong type"
            );
            Err(BridgeError::RelationshipTypeMismatch {
                relationship: relationship.to_string(),
                expected: T::EXPECTED,
                found: tag.to_string(),
            })
        }
    }
}

/// Follow a single-valued relationship. Absent is `Ok(None)`; present with
/// the wrong type is [`BridgeError::RelationshipTypeMismatch`].
pub fn resolve_related<T: Downcast>(
    realm: &Realm,
    owner: &Handle,
    relationship: &str,
) -> Result<Option<T>> {
    narrow_value(realm, owner.get(relationship)?, relationship)
}

/// Narrow a value the host already returned, e.g. from `item(i)`.
/// `relationship` names it in errors.
pub fn narrow_value<T: Downcast>(
    realm: &Realm,
    value: Value,
    relationship: &str,
) -> Result<Option<T>> {
    match value {
        Value::Object(related) => narrow_related(realm, related, relationship).map(Some),
        Value::Undefined | Value::Null => Ok(None),
        other => Err(BridgeError::UnexpectedValue {
            property: relationship.to_string(),
            expected: T::EXPECTED,
            found: other.kind(),
        }),
    }
}

/// Follow a multi-valued relationship into a snapshot where every entry is
/// expected to be `T`.
pub fn resolve_related_all<T: Downcast>(
    realm: &Realm,
    owner: &Handle,
    relationship: &str,
) -> Result<Vec<T>> {
    let related = owner.get(relationship)?;
    collection::snapshot(realm, &related, |handle| {
        narrow_related(realm, handle, relationship)
    })
}

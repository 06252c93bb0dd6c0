//! An ordered set of tokens over either host representation.
//!
//! Hosts expose a token list object (`classList`, `relList`, ...) whose
//! set operations are uniform, but the joined string lives in different
//! places: a companion string attribute on the owner, or a `value` property
//! on the list itself when it is a settable list. Lists with neither can
//! still be edited token by token; only the whole-string accessors are
//! unavailable, and the two directions fail differently (see
//! [`TokenList::value`] and [`TokenList::set_value`]).

use tracing::warn;

use crate::error::{BridgeError, Result};
use crate::host::{Handle, Value};
use crate::node::BasicNode;
use crate::realm::Realm;

/// Where the joined string of a list is read and written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenListShape {
    /// A string property on the owner, e.g. `className`.
    Companion(&'static str),
    /// The list's own `value`.
    Settable,
    Unsupported,
}

#[derive(Debug, Clone)]
pub struct TokenList {
    list: Handle,
    owner: Handle,
    companion: Option<&'static str>,
    realm: Realm,
}

impl TokenList {
    pub fn new(
        realm: Realm,
        list: Handle,
        owner: Handle,
        companion: Option<&'static str>,
    ) -> Self {
        Self {
            list,
            owner,
            companion,
            realm,
        }
    }

    pub(crate) fn from_property(
        owner: &BasicNode,
        property: &str,
        companion: Option<&'static str>,
    ) -> Result<Self> {
        let list: Handle = owner.read(property)?;
        Ok(Self::new(
            owner.realm().clone(),
            list,
            owner.handle().clone(),
            companion,
        ))
    }

    pub fn handle(&self) -> &Handle {
        &self.list
    }

    pub fn shape(&self) -> Result<TokenListShape> {
        if let Some(companion) = self.companion {
            return Ok(TokenListShape::Companion(companion));
        }
        let settable = &self.realm.config().settable_token_list;
        if self.realm.resolver().has_descriptor(&self.list, settable)? {
            Ok(TokenListShape::Settable)
        } else {
            Ok(TokenListShape::Unsupported)
        }
    }

    pub fn length(&self) -> Result<usize> {
        self.list.get_as("length")
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.length()? == 0)
    }

    pub fn item(&self, index: usize) -> Result<Option<String>> {
        match self.list.call("item", &[Value::from(index)])? {
            Value::String(token) => Ok(Some(token)),
            _ => Ok(None),
        }
    }

    pub fn contains(&self, token: &str) -> Result<bool> {
        self.list.call_as("contains", &[Value::from(token)])
    }

    pub fn add(&self, token: &str) -> Result<()> {
        self.list.call_as("add", &[Value::from(token)])
    }

    pub fn remove(&self, token: &str) -> Result<()> {
        self.list.call_as("remove", &[Value::from(token)])
    }

    /// Flip `token`; returns whether it is present afterwards.
    pub fn toggle(&self, token: &str) -> Result<bool> {
        self.list.call_as("toggle", &[Value::from(token)])
    }

    /// The tokens as of now.
    pub fn to_vec(&self) -> Result<Vec<String>> {
        let length = self.length()?;
        let mut tokens = Vec::with_capacity(length);
        for index in 0..length {
            if let Some(token) = self.item(index)? {
                tokens.push(token);
            }
        }
        Ok(tokens)
    }

    /// The joined string. An unsupported shape reads as empty.
    pub fn value(&self) -> Result<String> {
        match self.shape()? {
            TokenListShape::Companion(attribute) => self.owner.get_as(attribute),
            TokenListShape::Settable => self.list.get_as("value"),
            TokenListShape::Unsupported => {
                warn!(
                    target: "dom_facade",
                    owner = %self.owner.id(),
                    "token list has no companion attribute and is not settable; reading as empty"
                );
                Ok(String::new())
            }
        }
    }

    /// Replace the whole list with `value`. An unsupported shape is an error.
    pub fn set_value(&self, value: &str) -> Result<()> {
        match self.shape()? {
            TokenListShape::Companion(attribute) => Ok(self.owner.set(attribute, value)?),
            TokenListShape::Settable => Ok(self.list.set("value", value)?),
            TokenListShape::Unsupported => Err(BridgeError::UnsupportedTokenListShape {
                owner: self.owner_description(),
            }),
        }
    }

    /// Replace the whole list with `tokens`, joined by single spaces.
    pub fn replace_all<I, S>(&self, tokens: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = tokens
            .into_iter()
            .map(|token| token.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        self.set_value(&joined)
    }

    fn owner_description(&self) -> String {
        match self.owner.get_as::<String>("nodeName") {
            Ok(name) if !name.is_empty() => format!("{name} {}", self.owner.id()),
            _ => self.owner.id().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;
    use crate::host::memory::MemoryHost;

    fn realm(host: &MemoryHost) -> Realm {
        Realm::new(host.global(), BridgeConfig::default())
    }

    #[test]
    fn companion_lists_write_through_the_attribute() {
        let host = MemoryHost::new();
        let div = host.create_element("div");
        let list = TokenList::new(
            realm(&host),
            div.get_as("classList").unwrap(),
            div.clone(),
            Some("className"),
        );
        list.set_value("alpha").unwrap();
        assert_eq!(list.value().unwrap(), "alpha");
        assert_eq!(div.get_as::<String>("className").unwrap(), "alpha");

        list.add("beta").unwrap();
        assert!(list.toggle("gamma").unwrap());
        assert!(!list.toggle("alpha").unwrap());
        assert_eq!(list.to_vec().unwrap(), vec!["beta", "gamma"]);
        assert_eq!(list.item(5).unwrap(), None);
        assert_eq!(list.shape().unwrap(), TokenListShape::Companion("className"));
    }

    #[test]
    fn unsupported_lists_read_empty_and_refuse_writes() {
        let host = MemoryHost::new();
        let owner = host.create_element("div");
        let list = TokenList::new(
            realm(&host),
            host.create_token_list("a b", false),
            owner,
            None,
        );
        assert_eq!(list.shape().unwrap(), TokenListShape::Unsupported);
        assert_eq!(list.value().unwrap(), "");
        assert_eq!(list.length().unwrap(), 2);
        assert!(list.contains("b").unwrap());
        let err = list.set_value("c").unwrap_err();
        assert!(matches!(err, BridgeError::UnsupportedTokenListShape { .. }));
        assert!(err.to_string().contains("DIV"));
    }

    #[test]
    fn settable_lists_use_their_own_value() {
        let host = MemoryHost::new();
        let list = TokenList::new(
            realm(&host),
            host.create_token_list("x", true),
            host.create_element("output"),
            None,
        );
        list.replace_all(["one", "two"]).unwrap();
        assert_eq!(list.value().unwrap(), "one two");
        assert_eq!(list.length().unwrap(), 2);
    }

    #[test]
    fn invalid_tokens_surface_host_errors() {
        let host = MemoryHost::new();
        let div = host.create_element("div");
        let list = TokenList::new(
            realm(&host),
            div.get_as("classList").unwrap(),
            div,
            Some("className"),
        );
        assert!(matches!(list.add("has space"), Err(BridgeError::Host(_))));
    }
}

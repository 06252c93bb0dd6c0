//! URL-component accessors shared by anchors, areas and `Location`.

use tracing::debug;
use url::Url;

use crate::error::Result;
use crate::host::Handle;

macro_rules! components {
    ($($getter:ident / $setter:ident = $prop:literal;)*) => {
        $(
            pub fn $getter(&self) -> Result<String> {
                self.handle.get_as($prop)
            }

            pub fn $setter(&self, value: &str) -> Result<()> {
                Ok(self.handle.set($prop, value)?)
            }
        )*
    };
}

/// A capability layer over any host object exposing URL components as
/// properties. It sits beside the structural layers, not inside them.
#[derive(Debug, Clone)]
pub struct UrlUtils {
    handle: Handle,
}

impl UrlUtils {
    pub(crate) fn new(handle: Handle) -> Self {
        Self { handle }
    }

    components! {
        href / set_href = "href";
        protocol / set_protocol = "protocol";
        host / set_host = "host";
        hostname / set_hostname = "hostname";
        port / set_port = "port";
        pathname / set_pathname = "pathname";
        search / set_search = "search";
        hash / set_hash = "hash";
        username / set_username = "username";
        password / set_password = "password";
    }

    pub fn origin(&self) -> Result<String> {
        self.handle.get_as("origin")
    }

    /// `href` parsed. `None` when it is empty or not an absolute URL.
    pub fn url(&self) -> Result<Option<Url>> {
        let href = self.href()?;
        if href.is_empty() {
            return Ok(None);
        }
        match Url::parse(&href) {
            Ok(url) => Ok(Some(url)),
            Err(err) => {
                debug!(target: "dom_facade", %href, error = %err, "href is not an absolute URL");
                Ok(None)
            }
        }
    }
}

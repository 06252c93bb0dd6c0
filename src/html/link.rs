//! Hyperlink elements. Anchors and areas carry a [`UrlUtils`] layer beside
//! their HTML layer.

use super::BasicHtmlElement;
use crate::error::Result;
use crate::node::Node;
use crate::token_list::TokenList;
use crate::url_utils::UrlUtils;

fn rel_list(owner: &dyn Node) -> Result<TokenList> {
    TokenList::from_property(owner.as_node(), "relList", Some("rel"))
}

#[derive(Debug, Clone)]
pub struct HtmlAnchorElement {
    html: BasicHtmlElement,
    url: UrlUtils,
}

impl HtmlAnchorElement {
    pub(crate) fn from_layer(html: BasicHtmlElement) -> Self {
        let url = UrlUtils::new(html.as_node().handle().clone());
        Self { html, url }
    }

    pub fn url_utils(&self) -> &UrlUtils {
        &self.url
    }

    /// Link types, written through `rel`.
    pub fn rel_list(&self) -> Result<TokenList> {
        rel_list(self)
    }

    reflect! {
        href_lang / set_href_lang: String = "hreflang";
        media / set_media: String = "media";
        target / set_target: String = "target";
        text / set_text: String = "text";
        link_type / set_link_type: String = "type";
        download / set_download: String = "download";
    }
}

html_layers!(HtmlAnchorElement, html);

#[derive(Debug, Clone)]
pub struct HtmlAreaElement {
    html: BasicHtmlElement,
    url: UrlUtils,
}

impl HtmlAreaElement {
    pub(crate) fn from_layer(html: BasicHtmlElement) -> Self {
        let url = UrlUtils::new(html.as_node().handle().clone());
        Self { html, url }
    }

    pub fn url_utils(&self) -> &UrlUtils {
        &self.url
    }

    pub fn rel_list(&self) -> Result<TokenList> {
        rel_list(self)
    }

    reflect! {
        alt / set_alt: String = "alt";
        coords / set_coords: String = "coords";
        href_lang / set_href_lang: String = "hreflang";
        media / set_media: String = "media";
        shape / set_shape: String = "shape";
        target / set_target: String = "target";
        link_type / set_link_type: String = "type";
    }
}

html_layers!(HtmlAreaElement, html);

html_element!(HtmlAppletElement);

impl HtmlAppletElement {
    pub fn rel_list(&self) -> Result<TokenList> {
        rel_list(self)
    }

    reflect! {
        alt / set_alt: String = "alt";
        coords / set_coords: String = "coords";
        shape / set_shape: String = "shape";
        target / set_target: String = "target";
    }
}

html_element!(HtmlBaseElement);

impl HtmlBaseElement {
    reflect! {
        href / set_href: String = "href";
        target / set_target: String = "target";
    }
}

html_element!(HtmlLinkElement);

impl HtmlLinkElement {
    pub fn rel_list(&self) -> Result<TokenList> {
        rel_list(self)
    }

    /// Icon sizes. There is no companion attribute on the facade side; the
    /// host's settable list carries the string.
    pub fn sizes(&self) -> Result<TokenList> {
        TokenList::from_property(self.as_node(), "sizes", None)
    }

    reflect! {
        disabled / set_disabled: bool = "disabled";
        href / set_href: String = "href";
        href_lang / set_href_lang: String = "hreflang";
        media / set_media: String = "media";
        link_type / set_link_type: String = "type";
    }
}

#[cfg(test)]
mod tests {
    use crate::config::BridgeConfig;
    use crate::host::memory::MemoryHost;
    use crate::host::Value;
    use crate::html::AnyHtmlElement;
    use crate::realm::Realm;

    fn wrap(host: &MemoryHost, tag: &str) -> AnyHtmlElement {
        let realm = Realm::new(host.global(), BridgeConfig::default());
        realm
            .wrap_html_element(&Value::from(host.create_element(tag)))
            .unwrap()
            .unwrap()
    }

    #[test]
    fn anchors_expose_both_layers() {
        let host = MemoryHost::new();
        host.set_url("https://example.com/").unwrap();
        let AnyHtmlElement::Anchor(anchor) = wrap(&host, "a") else {
            panic!("expected an anchor facade");
        };
        anchor.url_utils().set_href("/a/b?x=1").unwrap();
        assert_eq!(anchor.url_utils().pathname().unwrap(), "/a/b");
        assert_eq!(anchor.url_utils().hostname().unwrap(), "example.com");
        anchor.set_target("_blank").unwrap();
        assert_eq!(anchor.target().unwrap(), "_blank");

        let rel = anchor.rel_list().unwrap();
        rel.add("noopener").unwrap();
        rel.add("nofollow").unwrap();
        assert_eq!(rel.value().unwrap(), "noopener nofollow");
    }

    #[test]
    fn link_sizes_use_the_settable_list() {
        let host = MemoryHost::new();
        let AnyHtmlElement::Link(link) = wrap(&host, "link") else {
            panic!("expected a link facade");
        };
        let sizes = link.sizes().unwrap();
        sizes.set_value("16x16 32x32").unwrap();
        assert_eq!(sizes.to_vec().unwrap(), vec!["16x16", "32x32"]);
        assert_eq!(sizes.value().unwrap(), "16x16 32x32");
    }
}

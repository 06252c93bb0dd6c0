//! Document-structure and text-level elements. Most add nothing beyond
//! a few reflected attributes.

html_element!(HtmlBodyElement);
html_element!(HtmlBrElement);
html_element!(HtmlDirectoryElement);
html_element!(HtmlDivElement);
html_element!(HtmlDListElement);
html_element!(HtmlFontElement);
html_element!(HtmlFrameSetElement);
html_element!(HtmlHeadElement);
html_element!(HtmlHeadingElement);
html_element!(HtmlHtmlElement);
html_element!(HtmlHrElement);
html_element!(HtmlMenuElement);
html_element!(HtmlParagraphElement);
html_element!(HtmlPreElement);
html_element!(HtmlSpanElement);
html_element!(HtmlStyleElement);
html_element!(HtmlUListElement);
html_element!(
    /// Elements the host parsed but does not know.
    HtmlUnknownElement
);
html_element!(HtmlDataElement);
html_element!(HtmlLiElement);
html_element!(HtmlMetaElement);
html_element!(HtmlModElement);
html_element!(HtmlOListElement);
html_element!(HtmlQuoteElement);
html_element!(HtmlScriptElement);
html_element!(HtmlTimeElement);
html_element!(HtmlTitleElement);

impl HtmlDataElement {
    reflect! {
        value / set_value: String = "value";
    }
}

impl HtmlLiElement {
    /// The ordinal as written; the host does not coerce it.
    pub fn value(&self) -> crate::error::Result<String> {
        crate::node::Node::as_node(self).read("value")
    }
}

impl HtmlMetaElement {
    reflect! {
        content / set_content: String = "content";
        http_equiv / set_http_equiv: String = "httpEquiv";
        name / set_name: String = "name";
    }
}

impl HtmlModElement {
    reflect! {
        cite / set_cite: String = "cite";
        date_time / set_date_time: String = "dateTime";
    }
}

impl HtmlOListElement {
    reflect! {
        reversed / set_reversed: bool = "reversed";
        start / set_start: f64 = "start";
        list_type / set_list_type: String = "type";
    }
}

impl HtmlQuoteElement {
    reflect! {
        cite / set_cite: String = "cite";
    }
}

impl HtmlScriptElement {
    reflect! {
        script_type / set_script_type: String = "type";
        src / set_src: String = "src";
        charset / set_charset: String = "charset";
        is_async / set_async: bool = "async";
        defer / set_defer: bool = "defer";
        text / set_text: String = "text";
    }
}

impl HtmlTimeElement {
    reflect! {
        date_time / set_date_time: String = "dateTime";
    }
}

impl HtmlTitleElement {
    reflect! {
        text / set_text: String = "text";
    }
}

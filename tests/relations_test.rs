use dom_facade::host::memory::MemoryHost;
use dom_facade::html::{
    AnyHtmlElement, FormAssociated, HtmlFormElement, HtmlInputElement, HtmlOptionElement,
    Labelable,
};
use dom_facade::relation;
use dom_facade::{
    AnyDocument, BridgeConfig, BridgeError, Element, Handle, Node, Realm, Value,
};
use tracing_subscriber::EnvFilter;

const PAGE: &str = r#"<!DOCTYPE html>
<html>
  <body>
    <form id="order">
      <label id="qty-label" for="qty">Quantity</label>
      <input id="qty" list="amounts">
      <label id="wrap-label">Note <input id="note"></label>
    </form>
    <input id="outside" form="order">
    <input id="orphan">
    <datalist id="amounts">
      <option id="one">1</option>
      <option id="two">2</option>
    </datalist>
  </body>
</html>"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn setup() -> (MemoryHost, Realm) {
    init_tracing();
    let host = MemoryHost::from_html(PAGE).expect("page parses");
    let realm = Realm::new(host.global(), BridgeConfig::default());
    (host, realm)
}

fn by_id(host: &MemoryHost, id: &str) -> Handle {
    host.document()
        .call_as::<Handle>("getElementById", &[Value::from(id)])
        .expect("lookup")
}

fn input(host: &MemoryHost, realm: &Realm, id: &str) -> HtmlInputElement {
    relation::narrow_value(realm, Value::from(by_id(host, id)), id)
        .expect("narrow")
        .expect("present")
}

#[test]
fn form_owners_come_from_ancestry_or_the_form_attribute() {
    let (host, realm) = setup();
    let nested: HtmlFormElement = input(&host, &realm, "qty")
        .form()
        .expect("form")
        .expect("has an owner");
    assert_eq!(nested.id().expect("id"), "order");

    let pointed = input(&host, &realm, "outside")
        .form()
        .expect("form")
        .expect("has an owner");
    assert!(pointed.is_same_node(&nested));

    assert!(input(&host, &realm, "orphan").form().expect("form").is_none());
}

#[test]
fn labels_resolve_both_ways() {
    let (host, realm) = setup();
    let qty = input(&host, &realm, "qty");
    let labels = qty.labels().expect("labels");
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].id().expect("id"), "qty-label");

    let control = labels[0].control().expect("control").expect("labelled");
    assert!(matches!(control, AnyHtmlElement::Input(_)));
    assert!(control.is_same_node(&qty));

    let note = input(&host, &realm, "note");
    let wrapping = note.labels().expect("labels");
    assert_eq!(wrapping.len(), 1);
    assert_eq!(wrapping[0].id().expect("id"), "wrap-label");
    assert!(input(&host, &realm, "orphan").labels().expect("labels").is_empty());
}

#[test]
fn suggestion_lists_narrow_to_datalists() {
    let (host, realm) = setup();
    let list = input(&host, &realm, "qty")
        .list()
        .expect("list")
        .expect("has suggestions");
    let options: Vec<String> = list
        .options()
        .expect("options")
        .iter()
        .map(|option| option.id().expect("id"))
        .collect();
    assert_eq!(options, vec!["one", "two"]);
    assert!(input(&host, &realm, "orphan").list().expect("list").is_none());
}

#[test]
fn a_host_breaking_the_relationship_contract_is_reported() {
    let (host, realm) = setup();
    let qty = by_id(&host, "qty");
    qty.set("partner", by_id(&host, "order")).expect("set");

    let err = relation::resolve_related::<HtmlOptionElement>(&realm, &qty, "partner")
        .expect_err("a form is not an option");
    assert!(err.is_contract_violation());
    assert!(matches!(
        err,
        BridgeError::RelationshipTypeMismatch { expected: "HTMLOptionElement", .. }
    ));

    qty.set("partner", "not an object").expect("set");
    let err = relation::resolve_related::<HtmlOptionElement>(&realm, &qty, "partner")
        .expect_err("strings are not objects");
    assert!(matches!(err, BridgeError::UnexpectedValue { .. }));
}

#[test]
fn narrowing_to_the_wrong_facade_fails() {
    let (host, realm) = setup();
    let result = relation::narrow_value::<HtmlFormElement>(
        &realm,
        Value::from(by_id(&host, "qty")),
        "qty",
    );
    match result {
        Err(BridgeError::RelationshipTypeMismatch { found, .. }) => {
            assert_eq!(found, "HTMLInputElement");
        }
        other => panic!("expected a mismatch, got {other:?}"),
    }
    let node = realm
        .wrap_node(&Value::from(by_id(&host, "qty")))
        .expect("wrap")
        .expect("present");
    assert_eq!(node.node_name().expect("nodeName"), "INPUT");
}

#[test]
fn frameset_documents_report_their_frameset_as_the_body() {
    init_tracing();
    let host = MemoryHost::from_html("<html><head></head><frameset><frame></frameset></html>")
        .expect("page parses");
    let realm = Realm::new(host.global(), BridgeConfig::default());
    let AnyDocument::Html(document) = realm.document().expect("document").expect("present") else {
        panic!("expected an HTML document");
    };
    let body = document.body().expect("body").expect("present");
    assert!(matches!(body, AnyHtmlElement::FrameSet(_)));
    assert_eq!(body.tag_name().expect("tagName"), "FRAMESET");

    let (_host, realm) = setup();
    let AnyDocument::Html(document) = realm.document().expect("document").expect("present") else {
        panic!("expected an HTML document");
    };
    let body = document.body().expect("body").expect("present");
    assert!(matches!(body, AnyHtmlElement::Body(_)));
}

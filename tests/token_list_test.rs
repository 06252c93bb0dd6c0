use dom_facade::host::memory::MemoryHost;
use dom_facade::html::AnyHtmlElement;
use dom_facade::token_list::TokenListShape;
use dom_facade::{BridgeConfig, BridgeError, Element, Handle, Realm, TokenList, Value};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn setup() -> (MemoryHost, Realm) {
    init_tracing();
    let host = MemoryHost::new();
    let realm = Realm::new(host.global(), BridgeConfig::default());
    (host, realm)
}

fn html(realm: &Realm, handle: Handle) -> AnyHtmlElement {
    realm
        .wrap_html_element(&Value::from(handle))
        .expect("wrap should succeed")
        .expect("element is present")
}

#[test]
fn class_list_writes_through_class_name() {
    let (host, realm) = setup();
    let div = html(&realm, host.create_element("div"));
    let classes = div.class_list().expect("classList");
    assert_eq!(classes.shape().expect("shape"), TokenListShape::Companion("className"));

    classes.add("card").expect("add");
    classes.add("wide").expect("add");
    assert!(classes.contains("card").expect("contains"));
    assert_eq!(div.class_name().expect("className"), "card wide");

    classes.replace_all(["narrow", "flat"]).expect("replace");
    assert_eq!(classes.to_vec().expect("tokens"), vec!["narrow", "flat"]);
    assert_eq!(div.get_attribute("class").expect("attr").as_deref(), Some("narrow flat"));

    classes.remove("narrow").expect("remove");
    assert_eq!(classes.value().expect("value"), "flat");
    assert_eq!(classes.length().expect("length"), 1);
}

#[test]
fn rel_lists_write_through_rel() {
    let (host, realm) = setup();
    let anchor = match html(&realm, host.create_element("a")) {
        AnyHtmlElement::Anchor(anchor) => anchor,
        other => panic!("expected an anchor, got {other:?}"),
    };
    let rel = anchor.rel_list().expect("relList");
    rel.set_value("noopener noreferrer").expect("set");
    assert_eq!(
        anchor.get_attribute("rel").expect("attr").as_deref(),
        Some("noopener noreferrer")
    );
    assert!(!rel.toggle("noopener").expect("toggle"));
    assert_eq!(rel.item(0).expect("item").as_deref(), Some("noreferrer"));
    assert_eq!(rel.item(5).expect("item"), None);
}

#[test]
fn settable_lists_use_their_own_value() {
    let (host, realm) = setup();
    let output = match html(&realm, host.create_element("output")) {
        AnyHtmlElement::Output(output) => output,
        other => panic!("expected an output, got {other:?}"),
    };
    let sources = output.html_for().expect("htmlFor");
    assert_eq!(sources.shape().expect("shape"), TokenListShape::Settable);

    sources.set_value("a b").expect("set");
    assert_eq!(sources.value().expect("value"), "a b");
    assert_eq!(output.get_attribute("for").expect("attr").as_deref(), Some("a b"));
}

#[test]
fn unsupported_lists_read_empty_but_refuse_writes() {
    let (host, realm) = setup();
    let owner = host.create_element("span");
    let list = TokenList::new(
        realm,
        host.create_token_list("x y", false),
        owner,
        None,
    );
    assert_eq!(list.shape().expect("shape"), TokenListShape::Unsupported);

    assert_eq!(list.value().expect("value"), "");
    assert_eq!(list.to_vec().expect("tokens"), vec!["x", "y"]);
    list.add("z").expect("set operations still work");
    assert!(list.contains("z").expect("contains"));

    let err = list.set_value("a").expect_err("whole-string writes are refused");
    assert!(matches!(err, BridgeError::UnsupportedTokenListShape { .. }));
    assert!(list.replace_all(["a"]).is_err());
}

#[test]
fn standalone_settable_lists_round_their_value() {
    let (host, realm) = setup();
    let owner = host.create_element("span");
    let list = TokenList::new(realm, host.create_token_list("", true), owner, None);
    assert!(list.is_empty().expect("empty"));
    list.replace_all(vec![String::from("one"), String::from("two")])
        .expect("replace");
    assert_eq!(list.value().expect("value"), "one two");
    assert_eq!(list.length().expect("length"), 2);
}

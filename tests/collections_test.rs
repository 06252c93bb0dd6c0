use dom_facade::collection::{self, CollectionShape};
use dom_facade::host::memory::MemoryHost;
use dom_facade::html::{AnyHtmlElement, HtmlFormElement, HtmlSelectElement};
use dom_facade::relation;
use dom_facade::{
    BridgeConfig, BridgeError, Document, Element, Handle, Node, ParentNode, Realm, Value,
};
use tracing_subscriber::EnvFilter;

const PAGE: &str = r#"<!DOCTYPE html>
<html>
  <body>
    <ul id="menu">
      <li class="item">one</li>
      <li class="item active">two</li>
      <li class="item">three</li>
    </ul>
    <form id="signup">
      <input name="email">
      <select id="plan">
        <option id="free">Free</option>
        <option id="pro" selected>Pro</option>
      </select>
      <button id="go">Go</button>
    </form>
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

fn ids(elements: &[impl Element]) -> Vec<String> {
    elements
        .iter()
        .map(|element| element.id().expect("id is readable"))
        .collect()
}

#[test]
fn query_results_keep_document_order() {
    let (_host, realm) = setup();
    let document = realm.document().expect("document").expect("present");
    let items = document.query_selector_all("li.item").expect("query");
    let texts: Vec<String> = items
        .iter()
        .map(|item| item.text_content().expect("text"))
        .collect();
    assert_eq!(texts, vec!["one", "two", "three"]);

    let active = document
        .query_selector("#menu .active")
        .expect("query")
        .expect("match");
    assert_eq!(active.text_content().expect("text"), "two");
    assert!(document.query_selector("table").expect("query").is_none());
}

#[test]
fn sibling_and_negation_selectors_are_understood() {
    let (_host, realm) = setup();
    let document = realm.document().expect("document").expect("present");
    let first = document
        .query_selector("#menu li:first-child")
        .expect("query")
        .expect("match");
    assert_eq!(first.text_content().expect("text"), "one");

    let later: Vec<String> = document
        .query_selector_all("li.item ~ li:not(.active)")
        .expect("query")
        .iter()
        .map(|item| item.text_content().expect("text"))
        .collect();
    assert_eq!(later, vec!["three"]);

    let adjacent = document.query_selector_all("ul + form").expect("query");
    assert_eq!(ids(&adjacent), vec!["signup"]);
    let prefixed = document.query_selector_all(r#"[id^="p"]"#).expect("query");
    assert_eq!(ids(&prefixed), vec!["plan", "pro"]);
}

#[test]
fn snapshots_do_not_follow_later_mutation() {
    let (_host, realm) = setup();
    let document = realm.document().expect("document").expect("present");
    let menu = document
        .get_element_by_id("menu")
        .expect("lookup")
        .expect("menu exists");

    let before = menu.children().expect("children");
    let extra = document.create_element("li").expect("create");
    menu.append_child(&extra).expect("append");
    let after = menu.children().expect("children");

    assert_eq!(before.len(), 3);
    assert_eq!(after.len(), 4);
    assert!(after[3].is_same_node(&extra));
}

#[test]
fn item_accessor_and_indexed_collections_read_alike() {
    let (host, realm) = setup();
    let menu = host
        .document()
        .call_as::<Handle>("getElementById", &[Value::from("menu")])
        .expect("lookup");

    let live = menu.get("children").expect("children");
    let live_handle = live.as_handle().expect("collection object");
    assert_eq!(
        collection::shape_of(&realm, live_handle).expect("shape"),
        CollectionShape::ItemAccessor
    );

    let entries: Vec<Value> = collection::snapshot_handles(&realm, &live)
        .expect("snapshot")
        .into_iter()
        .map(Value::from)
        .collect();
    let array = Value::from(host.create_array(entries));
    assert_eq!(
        collection::shape_of(&realm, array.as_handle().expect("array")).expect("shape"),
        CollectionShape::Indexed
    );

    let from_list = collection::snapshot_elements(&realm, &live).expect("list snapshot");
    let from_array = collection::snapshot_elements(&realm, &array).expect("array snapshot");
    assert_eq!(from_list.len(), from_array.len());
    for (left, right) in from_list.iter().zip(&from_array) {
        assert!(left.is_same_node(right));
    }
}

#[test]
fn form_controls_come_back_typed() {
    let (host, realm) = setup();
    let form_handle = host
        .document()
        .call_as::<Handle>("getElementById", &[Value::from("signup")])
        .expect("lookup");
    let form: HtmlFormElement =
        relation::narrow_value(&realm, Value::from(form_handle), "signup")
            .expect("narrow")
            .expect("present");

    let controls = form.elements().expect("elements");
    assert_eq!(form.length().expect("length"), controls.len());
    assert!(matches!(controls[0], AnyHtmlElement::Input(_)));
    assert!(matches!(controls[1], AnyHtmlElement::Select(_)));
    assert!(matches!(controls[2], AnyHtmlElement::Button(_)));

    let select: HtmlSelectElement = match &controls[1] {
        AnyHtmlElement::Select(select) => select.clone(),
        other => panic!("expected a select, got {:?}", other.tag()),
    };
    assert_eq!(ids(&select.options().expect("options")), vec!["free", "pro"]);
    assert_eq!(ids(&select.selected_options().expect("selected")), vec!["pro"]);
    assert_eq!(select.selected_index().expect("index"), 1);
}

#[test]
fn missing_collections_are_empty_snapshots() {
    let (_host, realm) = setup();
    assert!(collection::snapshot_nodes(&realm, &Value::Undefined)
        .expect("undefined")
        .is_empty());
    assert!(collection::snapshot_html_elements(&realm, &Value::Null)
        .expect("null")
        .is_empty());
}

#[test]
fn collections_with_holes_are_rejected_rather_than_compacted() {
    let (host, realm) = setup();
    let array = host.create_array(vec![
        Value::from(host.create_element("a")),
        Value::Null,
        Value::from(host.create_element("b")),
    ]);
    assert_eq!(array.get_as::<usize>("length").expect("length"), 3);

    let err = collection::snapshot_elements(&realm, &Value::from(array))
        .expect_err("the null entry has no element");
    assert!(err.is_contract_violation());
    assert!(matches!(
        err,
        BridgeError::CollectionHole { index: 1, length: 3, found: "null" }
    ));
}

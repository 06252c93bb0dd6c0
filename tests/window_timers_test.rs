use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use dom_facade::host::memory::MemoryHost;
use dom_facade::{BridgeConfig, Document, Element, Node, Realm, Window};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn setup(html: &str) -> (MemoryHost, Window) {
    init_tracing();
    let host = MemoryHost::from_html(html).expect("page parses");
    let realm = Realm::new(host.global(), BridgeConfig::default());
    (host, realm.window())
}

#[test]
fn timers_fire_in_due_order() {
    let (host, window) = setup("<body></body>");
    let order = Rc::new(RefCell::new(Vec::new()));

    for (label, delay) in [("slow", 30), ("fast", 10), ("middle", 20)] {
        let sink = order.clone();
        window
            .set_timeout(move || sink.borrow_mut().push(label), Duration::from_millis(delay))
            .expect("schedule");
    }
    assert_eq!(host.pending_timers(), 3);
    assert_eq!(host.advance(30).expect("advance"), 3);
    assert_eq!(*order.borrow(), vec!["fast", "middle", "slow"]);
    assert_eq!(host.now_ms(), 30);
}

#[test]
fn handlers_can_schedule_more_work() {
    let (host, window) = setup("<body></body>");
    let fired = Rc::new(RefCell::new(Vec::new()));

    let outer_sink = fired.clone();
    let outer_window = window.clone();
    window
        .set_timeout(
            move || {
                outer_sink.borrow_mut().push("first");
                let inner_sink = outer_sink.clone();
                outer_window
                    .set_timeout(
                        move || inner_sink.borrow_mut().push("second"),
                        Duration::from_millis(10),
                    )
                    .expect("nested schedule");
            },
            Duration::from_millis(10),
        )
        .expect("schedule");

    assert_eq!(host.advance(15).expect("advance"), 1);
    assert_eq!(*fired.borrow(), vec!["first"]);
    assert_eq!(host.pending_timers(), 1);
    assert_eq!(host.advance(5).expect("advance"), 1);
    assert_eq!(*fired.borrow(), vec!["first", "second"]);
    assert_eq!(host.pending_timers(), 0);
}

#[test]
fn timer_handlers_can_mutate_the_document() {
    let (host, window) = setup("<body><p id=status>idle</p></body>");
    let document = window.document().expect("document").expect("present");
    let status = document
        .get_element_by_id("status")
        .expect("lookup")
        .expect("status exists");

    let target = status.clone();
    let ticks = Rc::new(RefCell::new(0u32));
    let ticker = window
        .set_interval(
            move || {
                *ticks.borrow_mut() += 1;
                let text = format!("tick {}", ticks.borrow());
                target.set_text_content(&text).expect("write");
            },
            Duration::from_millis(100),
        )
        .expect("schedule");

    host.advance(250).expect("advance");
    assert_eq!(status.text_content().expect("text"), "tick 2");
    window.clear_interval(ticker).expect("clear");
    host.advance(1_000).expect("advance");
    assert_eq!(status.text_content().expect("text"), "tick 2");
    assert_eq!(status.tag_name().expect("tagName"), "P");
}

#[test]
fn animation_frames_run_once_per_request() {
    let (host, window) = setup("<body></body>");
    let frames = Rc::new(RefCell::new(Vec::new()));

    let sink = frames.clone();
    let again = window.clone();
    window
        .request_animation_frame(move |at| {
            sink.borrow_mut().push(at);
            let sink = sink.clone();
            again
                .request_animation_frame(move |at| sink.borrow_mut().push(at))
                .expect("next frame");
        })
        .expect("request");

    assert_eq!(host.run_animation_frame(16.0).expect("frame"), 1);
    assert_eq!(host.run_animation_frame(32.0).expect("frame"), 1);
    assert_eq!(host.run_animation_frame(48.0).expect("frame"), 0);
    assert_eq!(
        *frames.borrow(),
        vec![Duration::from_millis(16), Duration::from_millis(32)]
    );
}

#[test]
fn location_tracks_the_document_url() {
    let (host, window) = setup("<body></body>");
    host.set_url("https://example.com/start?q=1#top").expect("url");
    let location = window.location().expect("location").expect("present");
    let url = location.url_utils();

    assert_eq!(url.pathname().expect("pathname"), "/start");
    assert_eq!(url.search().expect("search"), "?q=1");
    assert_eq!(url.hash().expect("hash"), "#top");
    assert_eq!(url.origin().expect("origin"), "https://example.com");

    url.set_hash("#bottom").expect("set hash");
    let parsed = url.url().expect("parse").expect("absolute");
    assert_eq!(parsed.fragment(), Some("bottom"));
}

#[test]
fn location_setters_follow_url_parsing_rules() {
    let (host, window) = setup("<body></body>");
    host.set_url("http://example.com:8080/app").expect("url");
    let location = window
        .location()
        .expect("location")
        .expect("present");
    let url = location.url_utils();

    url.set_host("[::1]:9000").expect("set host");
    assert_eq!(url.host().expect("host"), "[::1]:9000");
    assert_eq!(url.hostname().expect("hostname"), "[::1]");
    assert_eq!(url.port().expect("port"), "9000");

    url.set_port("99999").expect("rejected ports are not errors");
    assert_eq!(url.port().expect("port"), "9000");
    url.set_hostname("bad host").expect("rejected hosts are not errors");
    assert_eq!(url.hostname().expect("hostname"), "[::1]");

    url.set_port("80").expect("set port");
    assert_eq!(url.host().expect("host"), "[::1]");
    assert_eq!(url.href().expect("href"), "http://[::1]/app");
}

#[test]
fn unrepresentable_frame_timestamps_become_zero() {
    let (host, window) = setup("<body></body>");
    let frames = Rc::new(RefCell::new(Vec::new()));

    for timestamp in [1e300, -5.0, f64::INFINITY] {
        let sink = frames.clone();
        window
            .request_animation_frame(move |at| sink.borrow_mut().push(at))
            .expect("request");
        assert_eq!(host.run_animation_frame(timestamp).expect("frame"), 1);
    }
    assert_eq!(*frames.borrow(), vec![Duration::ZERO; 3]);
}

mod common;

use common::{Calls, select};
use std::sync::Arc;
use weld_dom::Document;
use weld_domain::PageSignal;
use weld_domain::config::InitializerConfig;
use weld_event_bus::{DEFAULT_CAPACITY, EventBus};
use weld_initializer::{ComponentRegistry, Initializer, Page};

fn page(calls: &Calls, markup: &str) -> Page {
    let calls = calls.clone();
    let registry = ComponentRegistry::builder()
        .module("widget", move |_, config, target| {
            calls.record("widget", config, target);
            Ok(())
        })
        .build()
        .unwrap();
    let initializer = Initializer::new(&InitializerConfig::default(), Arc::new(registry));
    Page::new(Document::parse(markup).unwrap(), initializer, EventBus::new())
}

#[tokio::test]
async fn listener_applies_signals_in_order() {
    let calls = Calls::default();
    let page = page(&calls, r#"<div id="slot"></div><p data-mage-init='{"widget": {"n": 1}}'></p>"#);
    let mut listener = page.listen().unwrap();

    assert_eq!(page.signal(PageSignal::Ready).unwrap(), 1);
    let handled = listener.next().await.unwrap();
    assert_eq!(handled.signal, PageSignal::Ready);
    assert_eq!(handled.report.unwrap().dispatched.len(), 1);

    let document = page.document();
    let producer = page.bus().clone();
    tokio::spawn(async move {
        let root = {
            let mut doc = document.lock();
            let slot = select(&doc, "#slot")[0];
            doc.set_inner_markup(slot, r#"<em data-mage-init='{"widget": {"n": 2}}'></em>"#).unwrap();
            slot
        };
        producer.publish(PageSignal::ContentUpdated { root }).unwrap();
    })
    .await
    .unwrap();

    let handled = listener.next().await.unwrap();
    assert!(matches!(handled.signal, PageSignal::ContentUpdated { .. }));
    assert_eq!(handled.report.unwrap().dispatched.len(), 1);

    let configs: Vec<_> = calls.take().into_iter().map(|call| call.config["n"].clone()).collect();
    assert_eq!(configs, [1, 2]);
}

#[tokio::test]
async fn repeated_ready_is_ignored() {
    let calls = Calls::default();
    let page = page(&calls, r#"<p data-mage-init='{"widget": {}}'></p>"#);
    let mut listener = page.listen().unwrap();

    page.signal(PageSignal::Ready).unwrap();
    page.signal(PageSignal::Ready).unwrap();

    assert!(listener.next().await.unwrap().report.is_some());
    assert!(listener.next().await.unwrap().report.is_none());
    assert_eq!(calls.len(), 1);
}

#[tokio::test]
async fn early_content_update_is_skipped() {
    let calls = Calls::default();
    let page = page(&calls, r#"<p data-mage-init='{"widget": {}}'></p>"#);
    let mut listener = page.listen().unwrap();
    let root = page.document().lock().root();

    page.signal(PageSignal::ContentUpdated { root }).unwrap();
    page.signal(PageSignal::Ready).unwrap();

    assert!(listener.next().await.unwrap().report.is_none());
    assert!(listener.next().await.unwrap().report.is_some());
    assert_eq!(calls.len(), 1);
}

#[tokio::test]
async fn run_drains_until_shutdown() {
    let calls = Calls::default();
    let page = page(&calls, "<main></main>");
    let listener = page.listen().unwrap();
    let root = page.document().lock().root();

    page.signal(PageSignal::Ready).unwrap();
    page.signal(PageSignal::ContentUpdated { root }).unwrap();
    page.signal(PageSignal::ContentUpdated { root }).unwrap();
    let _ = page.bus().shutdown();

    assert_eq!(listener.run().await, 3);
}

#[tokio::test]
async fn burst_beyond_capacity_still_runs_the_ready_scan() {
    let calls = Calls::default();
    let page = page(&calls, r#"<p data-mage-init='{"widget": {}}'></p>"#);
    let mut listener = page.listen().unwrap();
    let root = page.document().lock().root();

    page.signal(PageSignal::Ready).unwrap();
    for _ in 0..DEFAULT_CAPACITY {
        page.signal(PageSignal::ContentUpdated { root }).unwrap();
    }

    let first = listener.next().await.unwrap();
    assert_eq!(first.lost, 1);
    assert_eq!(first.signal, PageSignal::Ready);
    assert_eq!(first.report.unwrap().dispatched.len(), 1);

    let _ = page.bus().shutdown();
    assert_eq!(listener.run().await, DEFAULT_CAPACITY);
    assert!(page.initializer().is_ready());
    assert_eq!(calls.len(), 1);
}

#[tokio::test]
async fn lost_updates_after_ready_trigger_a_full_rescan() {
    let calls = Calls::default();
    let page = page(&calls, r#"<div id="slot"></div>"#);
    let mut listener = page.listen().unwrap();

    page.signal(PageSignal::Ready).unwrap();
    assert_eq!(listener.next().await.unwrap().lost, 0);

    let document = page.document();
    let (root, slot) = {
        let mut doc = document.lock();
        let slot = select(&doc, "#slot")[0];
        doc.set_inner_markup(slot, r#"<em data-mage-init='{"widget": {"n": 2}}'></em>"#).unwrap();
        (doc.root(), slot)
    };
    for _ in 0..=DEFAULT_CAPACITY {
        page.signal(PageSignal::ContentUpdated { root: slot }).unwrap();
    }

    let caught_up = listener.next().await.unwrap();
    assert_eq!(caught_up.lost, 1);
    assert_eq!(caught_up.signal, PageSignal::ContentUpdated { root });
    assert_eq!(caught_up.report.unwrap().dispatched.len(), 1);
    assert_eq!(calls.take()[0].config["n"], 2);
}

#[test]
fn direct_entry_points_share_the_ready_state() {
    let calls = Calls::default();
    let page = page(&calls, r#"<div id="a"></div>"#);
    let root = page.document().lock().root();

    assert!(page.content_updated(root).is_none());
    assert!(page.ready().is_some());
    assert!(page.initializer().is_ready());
    assert!(page.ready().is_none());
    assert!(page.content_updated(root).is_some());
}

use serde_json::Value;
use weld::dom::Document;
use weld::domain::PageSignal;
use weld::domain::config::WeldConfig;
use weld::initializer::{ComponentRegistry, ErrorKind};

#[test]
fn custom_markup_names_come_from_config() {
    let mut config = WeldConfig::default();
    config.initializer.attribute = "data-widget".to_owned();
    config.initializer.block_type = "application/x-widgets".to_owned();

    let registry = ComponentRegistry::builder()
        .extension("badge", |doc, element, config: &Value| {
            doc.set_attribute(element, "data-badge", config.to_string())?;
            Ok(())
        })
        .build()
        .unwrap();
    let doc = Document::parse(
        r#"<b data-widget='{"badge": 3}'></b>
           <i data-mage-init='{"badge": 4}'></i>
           <script type="application/x-widgets">{"i": {"badge": 5}}</script>"#,
    )
    .unwrap();

    let page = weld::bootstrap(&config, registry, doc);
    let report = page.ready().unwrap();

    assert!(report.is_clean());
    let doc = page.document();
    let doc = doc.lock();
    let badges: Vec<_> = doc
        .query_selector_all(doc.root(), "[data-badge]")
        .unwrap()
        .into_iter()
        .map(|id| doc.attribute(id, "data-badge").unwrap_or_default().to_owned())
        .collect();
    assert_eq!(badges, ["3", "5"]);
}

#[test]
fn unregistered_components_surface_in_the_report() {
    let doc = Document::parse(r#"<div data-mage-init='{"Vendor_Module/js/slider": {}}'></div>"#).unwrap();
    let page = weld::bootstrap(&WeldConfig::default(), ComponentRegistry::default(), doc);

    let report = page.ready().unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind(), ErrorKind::UnresolvedComponent);
}

#[tokio::test]
async fn bootstrapped_page_listens_on_its_bus() {
    let doc = Document::parse("<main></main>").unwrap();
    let page = weld::bootstrap(&WeldConfig::default(), ComponentRegistry::default(), doc);
    let mut listener = page.listen().unwrap();

    page.signal(PageSignal::Ready).unwrap();

    let handled = listener.next().await.unwrap();
    assert_eq!(handled.signal, PageSignal::Ready);
    assert!(page.initializer().is_ready());
}

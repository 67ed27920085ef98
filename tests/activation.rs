use std::time::Duration;

use depth_images::{
    Dom, ImageActivator, ImageDocument, LocationContext, ResolverConfig, RetryDecision, SiteLayout,
};

fn gallery(dom: &mut Dom, declared: &str) -> depth_images::NodeId {
    let root = dom.root();
    let figure = dom.append_element(root, "figure");
    let spinner = dom.append_element(figure, "div");
    dom.set_attribute(spinner, "class", "image-loading");
    let img = dom.append_element(figure, "img");
    dom.with_attribute(img, "data-src", declared)
}

#[test]
fn late_placeholders_are_picked_up_by_rescans() {
    let layout = SiteLayout::default();
    let context = LocationContext::from_url("https://site.test/game/arcade.html", &layout).unwrap();
    let mut dom = Dom::new();
    let early = gallery(&mut dom, "/images/cover.png");
    let mut late = None;
    let mut activator = ImageActivator::new(layout);

    let reports = activator.run_schedule(&mut dom, &context, |delay, dom| {
        if delay == Duration::from_millis(150) {
            late = Some(gallery(dom, "/images/late.png"));
        }
    });

    let late = late.expect("late placeholder inserted before the 200ms pass");
    assert_eq!(reports[0].assigned[0].handle, early);
    assert!(reports[1].assigned.is_empty());
    assert_eq!(reports[2].assigned.len(), 1);
    assert_eq!(reports[2].assigned[0].handle, late);
    assert_eq!(reports[3].already_loaded, 2);
    assert_eq!(
        dom.attribute(late, "src").as_deref(),
        Some("../explore/images/late.png")
    );
}

#[test]
fn activated_markup_renders_resolved_sources() {
    let layout = SiteLayout::default();
    let context = LocationContext::from_url("/explore/map.html", &layout).unwrap();
    let mut dom = Dom::new();
    let img = gallery(&mut dom, "/images/map.png");
    let mut activator = ImageActivator::new(layout);

    activator.activate(&mut dom, &context);
    activator.on_load(&mut dom, img);

    assert_eq!(
        dom.to_html(),
        "<figure><img data-src=\"/images/map.png\" src=\"images/map.png\" data-loaded=\"true\" \
          style=\"display: block; visibility: visible; opacity: 1\"></figure>"
    );
}

#[test]
fn failed_loads_fall_back_to_declared_and_explore_paths() {
    let layout = SiteLayout::default();
    let context = LocationContext::from_url("file:///srv/site/index.html", &layout).unwrap();
    let mut dom = Dom::new();
    let img = gallery(&mut dom, "/images/cover.png");
    let mut activator = ImageActivator::new(layout);

    activator.activate(&mut dom, &context);
    assert_eq!(dom.attribute(img, "src").as_deref(), Some("explore/images/cover.png"));

    assert_eq!(
        activator.on_error(&mut dom, img),
        RetryDecision::Retried("/images/cover.png".into())
    );
    assert_eq!(activator.on_error(&mut dom, img), RetryDecision::Exhausted);
    assert_eq!(dom.attribute(img, "src").as_deref(), Some("/images/cover.png"));
}

#[test]
fn custom_configuration_changes_names_and_schedule() {
    let temp = tempfile::tempdir().unwrap();
    std::fs::write(
        temp.path().join("depth_images.config.json"),
        r#"{"explore_dir": "atlas", "declared_path_attribute": "data-image", "rescan_delays_ms": [25]}"#,
    )
    .unwrap();
    let layout = ResolverConfig::discover(temp.path()).into_layout();
    let context = LocationContext::from_url("https://site.test/index.html", &layout).unwrap();

    let mut dom = Dom::new();
    let img = dom.append_element(dom.root(), "img");
    dom.set_attribute(img, "data-image", "/images/a.png");
    let mut waits = Vec::new();
    let mut activator = ImageActivator::new(layout);

    let reports = activator.run_schedule(&mut dom, &context, |delay, _| waits.push(delay));

    assert_eq!(waits, vec![Duration::ZERO, Duration::from_millis(25)]);
    assert_eq!(reports.len(), 2);
    assert_eq!(dom.attribute(img, "src").as_deref(), Some("atlas/images/a.png"));
}

//! Placeholder activation: resolve declared image paths and assign them as sources.

use std::collections::HashMap;
use std::time::Duration;

use crate::asset_paths::{FallbackChain, PathResolver};
use crate::document::ImageDocument;
use crate::location::LocationContext;
use crate::project::SiteLayout;

const SOURCE_ATTRIBUTE: &str = "src";
const LOADED_VALUE: &str = "true";

/// Source assignment performed for one placeholder during an activation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment<H> {
    /// Element that received the source.
    pub handle: H,
    /// Path declared on the element.
    pub declared: String,
    /// Path assigned as the element's source.
    pub resolved: String,
}

/// Outcome of one activation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationReport<H> {
    /// Placeholders activated by this pass, in document order.
    pub assigned: Vec<Assignment<H>>,
    /// Placeholders skipped because an earlier pass already activated them.
    pub already_loaded: usize,
}

impl<H> Default for ActivationReport<H> {
    fn default() -> Self {
        Self {
            assigned: Vec::new(),
            already_loaded: 0,
        }
    }
}

/// Reaction to a failed load notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// A fallback source was assigned to the element.
    Retried(String),
    /// Every fallback has been attempted; the element keeps its broken source.
    Exhausted,
    /// The element has no pending load, so the notification was ignored.
    Untracked,
}

/// Scans a document for placeholders and drives their loading.
///
/// Activation is idempotent: activated placeholders carry the loaded flag and are skipped
/// by later passes, which makes repeated scans safe for elements inserted after page ready.
#[derive(Debug)]
pub struct ImageActivator<H> {
    resolver: PathResolver,
    pending: HashMap<H, FallbackChain>,
}

impl<H> ImageActivator<H>
where
    H: Copy + Eq + std::hash::Hash + std::fmt::Debug,
{
    /// Create an activator for the provided site layout.
    pub fn new(layout: SiteLayout) -> Self {
        Self {
            resolver: PathResolver::new(layout),
            pending: HashMap::new(),
        }
    }

    fn layout(&self) -> &SiteLayout {
        self.resolver.layout()
    }

    /// Activate every placeholder with a declared path that is not flagged as loaded.
    pub fn activate<D>(
        &mut self,
        document: &mut D,
        context: &LocationContext,
    ) -> ActivationReport<H>
    where
        D: ImageDocument<Handle = H>,
    {
        let declared_attribute = self.layout().declared_path_attribute.clone();
        let loaded_attribute = self.layout().loaded_attribute.clone();
        let mut report = ActivationReport::default();

        for handle in document.query_attribute(&declared_attribute) {
            if document.attribute(handle, &loaded_attribute).as_deref() == Some(LOADED_VALUE) {
                report.already_loaded += 1;
                continue;
            }
            let Some(declared) = document.attribute(handle, &declared_attribute) else {
                continue;
            };

            let resolved = self.resolver.resolve(&declared, context);
            tracing::debug!(?handle, %declared, %resolved, "activating image placeholder");

            document.reveal(handle);
            document.set_attribute(handle, SOURCE_ATTRIBUTE, &resolved);
            document.set_attribute(handle, &loaded_attribute, LOADED_VALUE);

            let chain = FallbackChain::new(self.layout(), &declared, &resolved);
            self.pending.insert(handle, chain);
            report.assigned.push(Assignment {
                handle,
                declared,
                resolved,
            });
        }

        report
    }

    /// Handle a successful load, clearing the loading indicators next to the element.
    ///
    /// Returns the number of indicators removed.
    pub fn on_load<D>(&mut self, document: &mut D, handle: H) -> usize
    where
        D: ImageDocument<Handle = H>,
    {
        self.pending.remove(&handle);
        let class = self.layout().loading_indicator_class.clone();
        document.remove_sibling_indicators(handle, &class)
    }

    /// Handle a failed load by assigning the next fallback source, if any.
    pub fn on_error<D>(&mut self, document: &mut D, handle: H) -> RetryDecision
    where
        D: ImageDocument<Handle = H>,
    {
        let Some(chain) = self.pending.get_mut(&handle) else {
            return RetryDecision::Untracked;
        };

        match chain.next_source() {
            Some(source) => {
                tracing::debug!(?handle, %source, "retrying image with fallback source");
                document.set_attribute(handle, SOURCE_ATTRIBUTE, &source);
                RetryDecision::Retried(source)
            }
            None => {
                tracing::debug!(?handle, "no fallback source left for image");
                self.pending.remove(&handle);
                RetryDecision::Exhausted
            }
        }
    }

    /// Whether the element is waiting for a load or error notification.
    pub fn is_pending(&self, handle: H) -> bool {
        self.pending.contains_key(&handle)
    }

    /// Run the page-ready pass and every re-scan pass in order.
    ///
    /// `wait` is called before each pass with the time elapsed since the previous one (zero
    /// for the page-ready pass) and may insert elements into the document between scans.
    pub fn run_schedule<D, W>(
        &mut self,
        document: &mut D,
        context: &LocationContext,
        mut wait: W,
    ) -> Vec<ActivationReport<H>>
    where
        D: ImageDocument<Handle = H>,
        W: FnMut(Duration, &mut D),
    {
        let passes = self.layout().activation_passes();
        let mut previous = Duration::ZERO;
        let mut reports = Vec::with_capacity(passes.len());

        for at in passes {
            wait(at.saturating_sub(previous), document);
            previous = at;
            reports.push(self.activate(document, context));
        }

        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Dom, NodeId};

    fn explore_game() -> LocationContext {
        LocationContext::from_url(
            "https://site.test/explore/game/level.html",
            &SiteLayout::default(),
        )
        .unwrap()
    }

    fn placeholder(dom: &mut Dom, declared: &str) -> (NodeId, NodeId) {
        let root = dom.root();
        let figure = dom.append_element(root, "figure");
        let spinner = dom.append_element(figure, "span");
        dom.set_attribute(spinner, "class", "image-loading");
        let img = dom.append_element(figure, "img");
        dom.set_attribute(img, "data-src", declared);
        (img, spinner)
    }

    #[test]
    fn assigns_resolved_sources_and_flags_elements() {
        let mut dom = Dom::new();
        let (img, _) = placeholder(&mut dom, "/images/a.png");
        let mut activator = ImageActivator::new(SiteLayout::default());

        let report = activator.activate(&mut dom, &explore_game());

        assert_eq!(report.assigned.len(), 1);
        assert_eq!(dom.attribute(img, "src").as_deref(), Some("../../images/a.png"));
        assert_eq!(dom.attribute(img, "data-loaded").as_deref(), Some("true"));
        assert_eq!(dom.style(img, "display"), Some("block"));
        assert!(activator.is_pending(img));
    }

    #[test]
    fn second_pass_skips_loaded_placeholders() {
        let mut dom = Dom::new();
        placeholder(&mut dom, "/images/a.png");
        let mut activator = ImageActivator::new(SiteLayout::default());

        activator.activate(&mut dom, &explore_game());
        let report = activator.activate(&mut dom, &explore_game());

        assert!(report.assigned.is_empty());
        assert_eq!(report.already_loaded, 1);
    }

    #[test]
    fn load_clears_sibling_indicators() {
        let mut dom = Dom::new();
        let (img, spinner) = placeholder(&mut dom, "a.png");
        let mut activator = ImageActivator::new(SiteLayout::default());
        activator.activate(&mut dom, &explore_game());

        assert_eq!(activator.on_load(&mut dom, img), 1);
        assert!(!dom.is_attached(spinner));
        assert!(!activator.is_pending(img));
        assert_eq!(activator.on_error(&mut dom, img), RetryDecision::Untracked);
    }

    #[test]
    fn errors_walk_the_fallback_chain_once() {
        let mut dom = Dom::new();
        let (img, spinner) = placeholder(&mut dom, "/images/a.png");
        let mut activator = ImageActivator::new(SiteLayout::default());
        activator.activate(&mut dom, &explore_game());

        assert_eq!(
            activator.on_error(&mut dom, img),
            RetryDecision::Retried("/images/a.png".into())
        );
        assert_eq!(
            activator.on_error(&mut dom, img),
            RetryDecision::Retried("explore/images/a.png".into())
        );
        assert_eq!(activator.on_error(&mut dom, img), RetryDecision::Exhausted);
        assert_eq!(activator.on_error(&mut dom, img), RetryDecision::Untracked);
        assert_eq!(dom.attribute(img, "src").as_deref(), Some("explore/images/a.png"));
        assert!(dom.is_attached(spinner));
    }

    #[test]
    fn unchanged_paths_have_no_fallback() {
        let mut dom = Dom::new();
        let (img, _) = placeholder(&mut dom, "https://cdn.test/a.png");
        let mut activator = ImageActivator::new(SiteLayout::default());
        activator.activate(&mut dom, &explore_game());

        assert_eq!(activator.on_error(&mut dom, img), RetryDecision::Exhausted);
    }

    #[test]
    fn schedule_waits_between_passes() {
        let mut dom = Dom::new();
        placeholder(&mut dom, "/images/a.png");
        let mut activator = ImageActivator::new(SiteLayout::default());
        let mut waits = Vec::new();

        let reports =
            activator.run_schedule(&mut dom, &explore_game(), |delay, _| waits.push(delay));

        let millis: Vec<u128> = waits.iter().map(Duration::as_millis).collect();
        assert_eq!(millis, vec![0, 50, 150, 300]);
        assert_eq!(reports.len(), 4);
        assert_eq!(reports[0].assigned.len(), 1);
        assert!(reports[1..].iter().all(|report| report.assigned.is_empty()));
    }

    #[test]
    fn schedule_runs_out_of_order_delays_ascending() {
        let mut dom = Dom::new();
        placeholder(&mut dom, "/images/a.png");
        let layout = SiteLayout {
            rescan_delays: vec![Duration::from_millis(500), Duration::from_millis(50)],
            ..SiteLayout::default()
        };
        let mut activator = ImageActivator::new(layout);
        let mut waits = Vec::new();

        activator.run_schedule(&mut dom, &explore_game(), |delay, _| waits.push(delay));

        let millis: Vec<u128> = waits.iter().map(Duration::as_millis).collect();
        assert_eq!(millis, vec![0, 50, 450]);
    }
}

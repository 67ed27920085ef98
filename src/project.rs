//! Site layout description shared by the resolver and the activator.

use std::time::Duration;

/// Directory and attribute names describing how a site lays out its pages and images.
///
/// Pages live at the root, under the explore directory, under a game directory nested
/// inside explore, or under a root-level game directory. Images always live in the images
/// directory inside explore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLayout {
    /// Directory holding the explore pages and the canonical images directory.
    pub explore_dir: String,
    /// Directory name for game pages, either at the root or nested inside explore.
    pub game_dir: String,
    /// Directory holding every image asset, nested inside the explore directory.
    pub images_dir: String,
    /// Attribute carrying the logical image path on placeholder elements.
    pub declared_path_attribute: String,
    /// Attribute flagging a placeholder that has already been activated.
    pub loaded_attribute: String,
    /// Class carried by loading-indicator elements placed next to placeholders.
    pub loading_indicator_class: String,
    /// Delays after page ready at which placeholders are scanned again.
    pub rescan_delays: Vec<Duration>,
}

impl Default for SiteLayout {
    fn default() -> Self {
        Self {
            explore_dir: "explore".into(),
            game_dir: "game".into(),
            images_dir: "images".into(),
            declared_path_attribute: "data-src".into(),
            loaded_attribute: "data-loaded".into(),
            loading_indicator_class: "image-loading".into(),
            rescan_delays: vec![
                Duration::from_millis(50),
                Duration::from_millis(200),
                Duration::from_millis(500),
            ],
        }
    }
}

impl SiteLayout {
    /// Prefix of absolute image references, e.g. `/images/`.
    pub fn absolute_images_prefix(&self) -> String {
        format!("/{}/", self.images_dir)
    }

    /// Canonical image directory relative to the site root, e.g. `explore/images/`.
    pub fn canonical_images_dir(&self) -> String {
        format!("{}/{}/", self.explore_dir, self.images_dir)
    }

    /// Every activation pass delay in ascending order, starting with the page-ready pass.
    ///
    /// Duplicate delays collapse into a single pass.
    pub fn activation_passes(&self) -> Vec<Duration> {
        let mut passes: Vec<Duration> = std::iter::once(Duration::ZERO)
            .chain(self.rescan_delays.iter().copied())
            .collect();
        passes.sort();
        passes.dedup();
        passes
    }
}

use crate::asset_paths::has_network_scheme;
use crate::location::{DirectoryContext, LocationContext};
use crate::project::SiteLayout;

/// Rewrites image references so they reach the canonical images directory from any page.
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    layout: SiteLayout,
}

impl PathResolver {
    /// Create a resolver for the provided site layout.
    pub fn new(layout: SiteLayout) -> Self {
        Self { layout }
    }

    /// Layout the resolver was created with.
    pub fn layout(&self) -> &SiteLayout {
        &self.layout
    }

    /// Rewrite `path` for a document located at `context`.
    ///
    /// Scheme references and parent-relative paths are returned untouched. Absolute paths are
    /// always re-rooted at the images directory; bare relative paths only when the document
    /// sits inside the explore directory.
    pub fn resolve(&self, path: &str, context: &LocationContext) -> String {
        if path.is_empty() || has_network_scheme(path) {
            return path.to_string();
        }

        if path.starts_with('/') {
            let image = self.strip_images_root(path);
            return format!("{}{}", self.context_prefix(context.directory()), image);
        }

        if path.starts_with("../") {
            return path.to_string();
        }

        let mut bare = path;
        while let Some(rest) = bare.strip_prefix("./") {
            bare = rest;
        }

        if bare.starts_with("../") {
            return bare.to_string();
        }

        match context.directory() {
            directory @ (DirectoryContext::Explore | DirectoryContext::ExploreGame) => {
                let image = self.strip_images_root(bare);
                format!("{}{}", self.context_prefix(directory), image)
            }
            DirectoryContext::Root | DirectoryContext::RootGame => bare.to_string(),
        }
    }

    /// Relative prefix leading from a page in `directory` to the images directory.
    pub fn context_prefix(&self, directory: DirectoryContext) -> String {
        let images = &self.layout.images_dir;
        match directory {
            DirectoryContext::Root => self.layout.canonical_images_dir(),
            DirectoryContext::Explore => format!("{images}/"),
            DirectoryContext::ExploreGame => format!("../../{images}/"),
            DirectoryContext::RootGame => format!("../{}", self.layout.canonical_images_dir()),
        }
    }

    /// Remove leading separators and redundant images directory segments.
    fn strip_images_root<'p>(&self, path: &'p str) -> &'p str {
        let images = self.layout.images_dir.as_str();
        let mut rest = path;
        loop {
            let trimmed = rest.trim_start_matches('/');
            let stripped = match trimmed.strip_prefix(images) {
                Some("") => "",
                Some(after) if after.starts_with('/') => after,
                _ => trimmed,
            };
            if stripped.len() == rest.len() {
                return stripped;
            }
            rest = stripped;
        }
    }
}

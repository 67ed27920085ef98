//! Classification of the document location into a directory context.

use std::path::Component;

use url::Url;

use crate::project::SiteLayout;

const RELATIVE_BASE: &str = "http://localhost/";

/// Directory context of the rendered document, used to pick a relative prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DirectoryContext {
    /// Page served from the site root, or from any directory outside explore and game.
    Root,
    /// Page inside the explore directory.
    Explore,
    /// Page inside a game directory nested within explore.
    ExploreGame,
    /// Page inside a game directory with no explore ancestor.
    RootGame,
}

/// Errors raised while deriving a location context from a document URL.
#[derive(Debug)]
pub enum LocationError {
    /// The URL could not be parsed.
    Parse {
        /// Input that failed to parse.
        input: String,
        /// Source parse error.
        source: url::ParseError,
    },
    /// The URL has no hierarchical path, e.g. `mailto:` or `data:` URLs.
    Opaque {
        /// Input that was rejected.
        input: String,
    },
}

impl std::fmt::Display for LocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse { input, source } => {
                write!(f, "failed to parse location {input}: {source}")
            }
            Self::Opaque { input } => write!(f, "location {input} has no directory path"),
        }
    }
}

impl std::error::Error for LocationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse { source, .. } => Some(source),
            Self::Opaque { .. } => None,
        }
    }
}

/// Directory segments of the current document together with the derived classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationContext {
    segments: Vec<String>,
    special_scheme: bool,
    in_explore: bool,
    in_explore_game: bool,
    in_root_game: bool,
}

impl LocationContext {
    /// Context of a page served from the site root.
    pub fn root() -> Self {
        Self::from_segments(Vec::<String>::new(), false, &SiteLayout::default())
    }

    /// Derive the context from a document URL.
    ///
    /// Bare paths such as `/explore/page.html` are accepted and treated as served over HTTP.
    /// The final path segment is always treated as the document file name and dropped.
    pub fn from_url(input: &str, layout: &SiteLayout) -> Result<Self, LocationError> {
        let url = parse_location(input)?;
        if url.cannot_be_a_base() {
            return Err(LocationError::Opaque {
                input: input.to_string(),
            });
        }

        let special_scheme = url.scheme() == "file";
        let mut segments = if special_scheme {
            file_url_segments(&url)
        } else {
            url
                .path_segments()
                .map(|parts| parts.map(str::to_string).collect())
                .unwrap_or_default()
        };

        segments.pop();
        segments.retain(|segment| !segment.is_empty());

        Ok(Self::from_segments(segments, special_scheme, layout))
    }

    /// Build a context from already split directory segments.
    pub fn from_segments<I, S>(segments: I, special_scheme: bool, layout: &SiteLayout) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        let explore_index = segments.iter().position(|s| *s == layout.explore_dir);
        let game_index = segments.iter().position(|s| *s == layout.game_dir);

        let in_explore = explore_index.is_some();
        let in_explore_game = matches!(
            (explore_index, game_index),
            (Some(explore), Some(game)) if game > explore
        );
        let in_root_game = !in_explore && game_index.is_some();

        tracing::trace!(
            ?segments,
            in_explore,
            in_explore_game,
            in_root_game,
            "classified document location"
        );

        Self {
            segments,
            special_scheme,
            in_explore,
            in_explore_game,
            in_root_game,
        }
    }

    /// Directory segments of the document, file name removed.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether the document was loaded through the `file:` scheme.
    pub fn is_special_scheme(&self) -> bool {
        self.special_scheme
    }

    /// Whether the explore directory appears among the document's directories.
    pub fn in_explore(&self) -> bool {
        self.in_explore
    }

    /// Whether a game directory appears after the explore directory.
    pub fn in_explore_game(&self) -> bool {
        self.in_explore_game
    }

    /// Whether a game directory appears without any explore directory.
    pub fn in_root_game(&self) -> bool {
        self.in_root_game
    }

    /// Four-way classification, nested game pages taking precedence over explore pages.
    pub fn directory(&self) -> DirectoryContext {
        if self.in_explore_game {
            DirectoryContext::ExploreGame
        } else if self.in_explore {
            DirectoryContext::Explore
        } else if self.in_root_game {
            DirectoryContext::RootGame
        } else {
            DirectoryContext::Root
        }
    }
}

fn parse_location(input: &str) -> Result<Url, LocationError> {
    match Url::parse(input) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(RELATIVE_BASE)
            .and_then(|base| base.join(input))
            .map_err(|source| LocationError::Parse {
                input: input.to_string(),
                source,
            }),
        Err(source) => Err(LocationError::Parse {
            input: input.to_string(),
            source,
        }),
    }
}

fn file_url_segments(url: &Url) -> Vec<String> {
    if let Some(host) = url.host_str().filter(|host| !host.is_empty() && *host != "localhost") {
        tracing::warn!(host, "file URL carries a host; classifying its path only");
    }

    match url.to_file_path() {
        Ok(path) => path
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(match part.to_str() {
                    Some(value) => value.to_string(),
                    None => {
                        tracing::warn!(?part, "file URL segment is not valid UTF-8");
                        part.to_string_lossy().into_owned()
                    }
                }),
                _ => None,
            })
            .collect(),
        Err(()) => {
            tracing::warn!(url = %url, "file URL has no local path; using raw segments");
            url
                .path_segments()
                .map(|parts| parts.map(str::to_string).collect())
                .unwrap_or_default()
        }
    }
}

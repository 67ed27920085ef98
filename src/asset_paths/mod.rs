//! Helpers for rewriting image references relative to the page that displays them.
//!
//! Filtering of scheme references, context-aware rewriting, and the retry chain used after
//! a failed load live in separate submodules so each can be tested on its own.

mod fallback;
mod filters;
mod resolver;

pub use fallback::FallbackChain;
pub use filters::has_network_scheme;
pub use resolver::PathResolver;

#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod activator;
pub mod asset_paths;
pub mod config;
pub mod document;
pub mod location;
pub mod project;

pub use activator::{ActivationReport, Assignment, ImageActivator, RetryDecision};
pub use asset_paths::{FallbackChain, PathResolver};
pub use config::ResolverConfig;
pub use document::{Dom, ImageDocument, NodeId};
pub use location::{DirectoryContext, LocationContext, LocationError};
pub use project::SiteLayout;

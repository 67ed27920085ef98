use std::collections::{BTreeSet, VecDeque};

use crate::project::SiteLayout;

/// Ordered retry sources for an image whose resolved source failed to load.
///
/// Each source is offered at most once, and never one that has already been attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FallbackChain {
    attempted: BTreeSet<String>,
    pending: VecDeque<String>,
}

impl FallbackChain {
    /// Build the chain for a declared path that was first attempted as `resolved`.
    ///
    /// The declared path itself is retried first. References under the absolute images
    /// prefix additionally get a copy rooted at the explore directory.
    pub fn new(layout: &SiteLayout, declared: &str, resolved: &str) -> Self {
        let mut chain = Self::default();
        chain.attempted.insert(resolved.to_string());

        chain.push(declared.to_string());
        if declared.starts_with(&layout.absolute_images_prefix()) {
            chain.push(format!("{}{}", layout.explore_dir, declared));
        }

        chain
    }

    /// Take the next source to try, recording it as attempted.
    pub fn next_source(&mut self) -> Option<String> {
        while let Some(candidate) = self.pending.pop_front() {
            if self.attempted.insert(candidate.clone()) {
                return Some(candidate);
            }
        }
        None
    }

    /// Whether any untried source remains.
    pub fn is_exhausted(&self) -> bool {
        self
            .pending
            .iter()
            .all(|candidate| self.attempted.contains(candidate))
    }

    /// Remaining sources in retry order, without consuming them.
    pub fn remaining(&self) -> Vec<String> {
        let mut seen = self.attempted.clone();
        self
            .pending
            .iter()
            .filter(|candidate| seen.insert((*candidate).clone()))
            .cloned()
            .collect()
    }

    fn push(&mut self, candidate: String) {
        if candidate.is_empty() || self.attempted.contains(&candidate) {
            return;
        }
        if !self.pending.contains(&candidate) {
            self.pending.push_back(candidate);
        }
    }
}

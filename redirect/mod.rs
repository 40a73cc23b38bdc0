/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Redirect resolution: one URL in, one [`RedirectDecision`] out.
//!
//! Resolution is synchronous, deterministic for fixed registry answers,
//! and side-effect-free apart from the registry queries themselves. A
//! failing query disqualifies one candidate, never the chain.

mod browser_probe;
mod candidates;

pub use browser_probe::BrowserExclusionSet;

use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::descriptor::{DescriptorParseError, LaunchDescriptor, SchemeClass};
use crate::registry::AppRegistry;

/// The resolved outcome of redirect resolution.
///
/// Any combination of presence is legal; absence of both fields means the
/// navigation proceeds unmodified in-app. Resolution never blocks a
/// navigation outright.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectDecision {
    /// Descriptor to hand to the OS, absent when no non-browser handler
    /// exists anywhere in the chain.
    pub external_target: Option<LaunchDescriptor>,
    /// Best URL for in-app loading when the external target is absent or
    /// rejected by the user.
    pub fallback_web_url: Option<String>,
    /// True iff `fallback_web_url` differs from the requested URL: the
    /// deep link changed the effective destination.
    pub is_redirect: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The input was not a URI under any recognized scheme grammar.
    Parse(DescriptorParseError),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<DescriptorParseError> for ResolveError {
    fn from(err: DescriptorParseError) -> Self {
        Self::Parse(err)
    }
}

/// Resolves navigated URLs against the injected app registry.
///
/// The browser-exclusion set is probed lazily, at most once per resolver;
/// a precomputed set can be injected instead.
pub struct RedirectResolver<R> {
    registry: R,
    browsers: OnceLock<BrowserExclusionSet>,
}

impl<R: AppRegistry> RedirectResolver<R> {
    pub fn new(registry: R) -> Self {
        Self {
            registry,
            browsers: OnceLock::new(),
        }
    }

    pub fn with_browser_exclusions(registry: R, browsers: BrowserExclusionSet) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(browsers);
        Self {
            registry,
            browsers: cell,
        }
    }

    fn browsers(&self) -> &BrowserExclusionSet {
        self.browsers
            .get_or_init(|| BrowserExclusionSet::probe(&self.registry))
    }

    pub fn resolve(&self, url: &str) -> Result<RedirectDecision, ResolveError> {
        let descriptor = LaunchDescriptor::parse(url)?;
        let chain = candidates::build_candidates(&descriptor);
        let browsers = self.browsers();

        let external_target = chain
            .iter()
            .find(|candidate| self.has_non_browser_handler(candidate, browsers))
            .cloned();

        // Compare against the parsed target so URL normalization (for
        // example a trailing slash added by the parser) does not read as a
        // self-redirect.
        let requested = descriptor
            .target()
            .map(|target| target.to_string())
            .unwrap_or_else(|| url.to_string());
        let web_urls: Vec<String> = chain
            .iter()
            .filter(|candidate| candidate.scheme_class() == SchemeClass::Web)
            .filter_map(|candidate| candidate.target().map(|target| target.to_string()))
            .collect();
        let fallback_web_url = web_urls
            .iter()
            .find(|candidate_url| **candidate_url != requested)
            .or_else(|| web_urls.first())
            .cloned();
        let is_redirect = fallback_web_url
            .as_deref()
            .is_some_and(|fallback| fallback != requested);

        Ok(RedirectDecision {
            external_target,
            fallback_web_url,
            is_redirect,
        })
    }

    fn has_non_browser_handler(
        &self,
        candidate: &LaunchDescriptor,
        browsers: &BrowserExclusionSet,
    ) -> bool {
        let handlers = match self.registry.resolve_handlers(candidate) {
            Ok(handlers) => handlers,
            Err(err) => {
                log::warn!("handler query failed for {candidate}, skipping candidate: {err}");
                return false;
            }
        };
        handlers.iter().any(|id| !browsers.contains(id))
    }
}

/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Candidate-chain construction.
//!
//! The chain order encodes launch precedence: direct target first, then
//! the candidates extracted from its declared web fallback, then a
//! synthesized marketplace listing when a package hint exists.

use url::Url;

use crate::descriptor::{LaunchDescriptor, SchemeClass};

/// Depth cap on nested `browser_fallback_url` extraction. Real inputs
/// nest once or twice; past the cap the tail is "no further candidates",
/// never an error.
pub(crate) const MAX_FALLBACK_DEPTH: usize = 10;

pub(crate) fn build_candidates(descriptor: &LaunchDescriptor) -> Vec<LaunchDescriptor> {
    let mut chain = Vec::new();
    push_candidates(descriptor, 0, &mut chain);
    chain
}

fn push_candidates(descriptor: &LaunchDescriptor, depth: usize, chain: &mut Vec<LaunchDescriptor>) {
    if depth > MAX_FALLBACK_DEPTH {
        log::debug!("fallback chain deeper than {MAX_FALLBACK_DEPTH}, truncating");
        return;
    }
    match descriptor.scheme_class() {
        // Web URLs never need fallback expansion; mark browsable so the
        // registry reports generic browsers alongside verified-link apps.
        SchemeClass::Web => chain.push(descriptor.clone().into_browsable()),
        SchemeClass::None => {}
        SchemeClass::External => {
            chain.push(descriptor.clone());
            if let Some(fallback) = descriptor.fallback_url() {
                match LaunchDescriptor::parse(fallback) {
                    Ok(nested) => push_candidates(&nested, depth + 1, chain),
                    Err(err) => log::debug!("dropping unparseable fallback url: {err}"),
                }
            }
            if let Some(package) = descriptor.package()
                && let Some(market) = market_descriptor(package)
            {
                chain.push(market);
            }
        }
    }
}

/// `market://details?id=<package>`, the marketplace listing for an app
/// that handles the original descriptor but is not installed.
fn market_descriptor(package: &str) -> Option<LaunchDescriptor> {
    let mut url = Url::parse("market://details").ok()?;
    url.query_pairs_mut().append_pair("id", package);
    Some(LaunchDescriptor::from_url(url).with_package(package))
}

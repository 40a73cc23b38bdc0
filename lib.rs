/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Resolution of navigated URLs to external-application launch targets.
//!
//! Three layers, built bottom-up:
//!
//! - [`redirect::BrowserExclusionSet`] probes the platform app registry to
//!   learn which installed applications are generic web browsers (the host
//!   app included), so they are never chosen as hand-off targets.
//! - [`redirect::RedirectResolver`] turns a URL string into an ordered
//!   candidate chain (direct target, declared web fallback, marketplace
//!   listing) and selects the first candidate with a non-browser handler.
//! - [`confirm::RedirectConfirmController`] gates the actual hand-off per
//!   session: immediate launch in regular sessions, a user confirmation
//!   surface in private ones, with re-binding across surface recreation.
//!
//! The platform pieces (app registry, launcher, session, confirmation UI)
//! are trait seams injected by the embedder; nothing here owns a window.

pub mod confirm;
pub mod descriptor;
pub mod redirect;
pub mod registry;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use confirm::{
    ConfirmationState, NavigationFlags, RedirectConfirmController, RedirectOutcome,
};
pub use descriptor::{AppId, LaunchDescriptor};
pub use redirect::{BrowserExclusionSet, RedirectDecision, RedirectResolver, ResolveError};
pub use registry::{AppRegistry, RegistryError};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

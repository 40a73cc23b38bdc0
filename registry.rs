/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Seam to the OS-level application resolution service.
//!
//! Kept as a trait so the platform binding can be plugged in without
//! touching resolution logic, and so tests can script handler sets.

use std::collections::HashSet;
use std::fmt;

use crate::descriptor::{AppId, LaunchDescriptor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The platform service could not be reached.
    Unavailable,
    /// The platform rejected the query.
    Rejected(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => f.write_str("app registry unavailable"),
            Self::Rejected(reason) => write!(f, "app registry rejected query: {reason}"),
        }
    }
}

impl std::error::Error for RegistryError {}

/// `resolve_handlers` returns every installed application capable of
/// handling the descriptor. An empty set is the normal "nothing matches"
/// answer, not an error; errors are reserved for platform-level faults.
///
/// Calls may block on OS I/O. Callers needing latency guarantees run the
/// query off their hot path; no timeout policy lives here.
pub trait AppRegistry: Send + Sync {
    fn resolve_handlers(
        &self,
        descriptor: &LaunchDescriptor,
    ) -> Result<HashSet<AppId>, RegistryError>;
}

impl<F> AppRegistry for F
where
    F: Fn(&LaunchDescriptor) -> Result<HashSet<AppId>, RegistryError> + Send + Sync,
{
    fn resolve_handlers(
        &self,
        descriptor: &LaunchDescriptor,
    ) -> Result<HashSet<AppId>, RegistryError> {
        self(descriptor)
    }
}

/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Browser-exclusion probing.
//!
//! A randomized, globally-unique https URL is claimed by no installed app
//! through an explicit scheme/host registration; the only handlers the
//! registry can report for it are general-purpose browsers. Their ids form
//! the exclusion set so a web URL is never "handed off" to another browser
//! (or back to the host app itself).

use std::collections::HashSet;

use url::Url;
use uuid::Uuid;

use crate::descriptor::{AppId, LaunchDescriptor};
use crate::registry::AppRegistry;

/// Application ids treated as generic web browsers. Immutable after
/// construction; shared read-only with every resolution call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowserExclusionSet {
    ids: HashSet<AppId>,
}

impl BrowserExclusionSet {
    /// Build from a precomputed id set (injection point for tests and for
    /// embedders that already track installed browsers).
    pub fn from_ids(ids: impl IntoIterator<Item = AppId>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// Query the registry with a random `https://<uuid>.net` probe wrapped
    /// in a browsable descriptor. A failed or empty query excludes nothing.
    pub fn probe(registry: &dyn AppRegistry) -> Self {
        let sample = format!("https://{}.net", Uuid::new_v4());
        let Ok(url) = Url::parse(&sample) else {
            return Self::default();
        };
        let descriptor = LaunchDescriptor::from_url(url).into_browsable();
        match registry.resolve_handlers(&descriptor) {
            Ok(ids) => Self { ids },
            Err(err) => {
                log::warn!("browser probe failed, excluding nothing: {err}");
                Self::default()
            }
        }
    }

    pub fn contains(&self, id: &AppId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

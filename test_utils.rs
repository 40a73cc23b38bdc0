/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Scripted collaborators for exercising resolution and confirmation
//! without a platform. Compiled for unit tests and behind the
//! `test-utils` feature for the scenario suite.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::confirm::{
    ConfirmationPresenter, ConfirmationSurface, ExternalLauncher, SessionLoader,
};
use crate::descriptor::{AppId, LaunchDescriptor};
use crate::redirect::RedirectDecision;
use crate::registry::{AppRegistry, RegistryError};

/// In-memory app registry scripted per scheme and per exact URL.
#[derive(Default)]
pub struct ScriptedRegistry {
    by_scheme: HashMap<String, HashSet<AppId>>,
    by_url: HashMap<String, HashSet<AppId>>,
    failing_schemes: HashSet<String>,
    queries: AtomicUsize,
}

impl ScriptedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register handlers for every URI of `scheme`.
    pub fn scheme_handlers<'a>(
        mut self,
        scheme: &str,
        ids: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        self.by_scheme
            .entry(scheme.to_ascii_lowercase())
            .or_default()
            .extend(ids.into_iter().map(AppId::from));
        self
    }

    /// Register handlers for one exact URL (a verified-link app).
    pub fn url_handlers<'a>(mut self, url: &str, ids: impl IntoIterator<Item = &'a str>) -> Self {
        self.by_url
            .entry(url.to_string())
            .or_default()
            .extend(ids.into_iter().map(AppId::from));
        self
    }

    /// Make every query for `scheme` fail with a platform fault.
    pub fn failing_scheme(mut self, scheme: &str) -> Self {
        self.failing_schemes.insert(scheme.to_ascii_lowercase());
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }
}

impl AppRegistry for ScriptedRegistry {
    fn resolve_handlers(
        &self,
        descriptor: &LaunchDescriptor,
    ) -> Result<HashSet<AppId>, RegistryError> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        let Some(target) = descriptor.target() else {
            return Ok(HashSet::new());
        };
        if self.failing_schemes.contains(target.scheme()) {
            return Err(RegistryError::Unavailable);
        }
        let mut handlers = self
            .by_scheme
            .get(target.scheme())
            .cloned()
            .unwrap_or_default();
        if let Some(exact) = self.by_url.get(target.as_str()) {
            handlers.extend(exact.iter().cloned());
        }
        Ok(handlers)
    }
}

/// Records launched descriptors as their target URI strings.
#[derive(Default)]
pub struct RecordingLauncher {
    opened: Mutex<Vec<String>>,
}

impl RecordingLauncher {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().clone()
    }
}

impl ExternalLauncher for RecordingLauncher {
    fn open_external(&self, target: &LaunchDescriptor) {
        self.opened.lock().push(target.to_string());
    }
}

/// Records URLs loaded into the session.
#[derive(Default)]
pub struct RecordingSession {
    loaded: Mutex<Vec<String>>,
}

impl RecordingSession {
    pub fn loaded(&self) -> Vec<String> {
        self.loaded.lock().clone()
    }
}

impl SessionLoader for RecordingSession {
    fn load_url(&self, url: &str) {
        self.loaded.lock().push(url.to_string());
    }
}

/// A confirmation surface whose visibility the test drives directly.
pub struct TestSurface {
    tag: String,
    showing: AtomicBool,
}

impl TestSurface {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            showing: AtomicBool::new(true),
        }
    }

    pub fn hide(&self) {
        self.showing.store(false, Ordering::Relaxed);
    }
}

impl ConfirmationSurface for TestSurface {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn is_showing(&self) -> bool {
        self.showing.load(Ordering::Relaxed)
    }
}

/// Presenter that owns the surfaces it creates, like a real UI layer.
/// Dropping the owned surface simulates teardown; `recreate_surface`
/// simulates the UI toolkit restoring a surface on start-up.
#[derive(Default)]
pub struct TestPresenter {
    current: Mutex<Option<Arc<TestSurface>>>,
    presented: AtomicUsize,
}

impl TestPresenter {
    pub fn presented_count(&self) -> usize {
        self.presented.load(Ordering::Relaxed)
    }

    pub fn destroy_surface(&self) {
        *self.current.lock() = None;
    }

    pub fn recreate_surface(&self, tag: &str) -> Arc<dyn ConfirmationSurface> {
        let surface = Arc::new(TestSurface::new(tag));
        *self.current.lock() = Some(surface.clone());
        surface
    }
}

impl ConfirmationPresenter for TestPresenter {
    fn present(&self, tag: &str, _decision: &RedirectDecision) -> Arc<dyn ConfirmationSurface> {
        self.presented.fetch_add(1, Ordering::Relaxed);
        let surface = Arc::new(TestSurface::new(tag));
        *self.current.lock() = Some(surface.clone());
        surface
    }
}

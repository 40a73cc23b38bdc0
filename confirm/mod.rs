/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Per-session gating of resolved redirects.
//!
//! Regular sessions launch the external target immediately; private
//! sessions first present a confirmation surface. The controller owns the
//! pending state, never the surface: the surface is held weakly and can be
//! destroyed and recreated (process death, rotation) while a confirmation
//! is pending, then re-bound by tag on start-up without re-prompting.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::descriptor::LaunchDescriptor;
use crate::redirect::RedirectDecision;

/// Hands a launch descriptor to the OS.
pub trait ExternalLauncher: Send + Sync {
    fn open_external(&self, target: &LaunchDescriptor);
}

/// Loads a URL into the owning session.
pub trait SessionLoader: Send + Sync {
    fn load_url(&self, url: &str);
}

/// The UI collaborator asking the user to approve leaving the app.
pub trait ConfirmationSurface: Send + Sync {
    /// Stable identity used to re-associate a recreated surface with its
    /// controller.
    fn tag(&self) -> &str;

    /// True while the surface is visible to the user.
    fn is_showing(&self) -> bool;
}

/// Creates (or reuses) and shows a confirmation surface for `tag`. The
/// presenter keeps ownership of the surface; the controller only ever
/// holds a weak reference to what is returned.
pub trait ConfirmationPresenter: Send + Sync {
    fn present(&self, tag: &str, decision: &RedirectDecision) -> Arc<dyn ConfirmationSurface>;
}

/// Lifecycle of one pending confirmation.
///
/// `Resolved` sits between a confirm and the surface teardown that
/// follows it, so the teardown's dismiss does not fire the fallback load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmationState {
    Idle,
    AwaitingConfirmation(RedirectDecision),
    Resolved,
}

/// Flags the navigation collaborator attaches to each redirect event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationFlags {
    /// Set only for explicit user interaction; programmatic and background
    /// navigations never trigger a hand-off.
    pub user_triggered: bool,
    /// Private/ephemeral sessions require confirmation before leaving.
    pub private_session: bool,
}

/// What the controller did with a redirect event. Callers use this to
/// decide whether the in-app navigation should still proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// Not user-triggered; nothing considered.
    Ignored,
    /// No external target, no redirecting fallback; proceed unmodified.
    PassThrough,
    /// No external target; the redirecting fallback was sent to the session.
    FallbackLoaded,
    /// External target launched without prompting.
    Launched,
    /// Confirmation surface presented; waiting on the user.
    AwaitingConfirmation,
    /// A confirmation of the same identity is already pending; dropped.
    Dropped,
}

struct ControllerInner {
    state: ConfirmationState,
    surface: Option<Weak<dyn ConfirmationSurface>>,
}

/// One controller per session. Transitions are serialized behind a mutex;
/// concurrent redirect events for the same session cannot race the state.
pub struct RedirectConfirmController<L, S, P> {
    launcher: L,
    session: S,
    presenter: P,
    tag: String,
    inner: Mutex<ControllerInner>,
}

impl<L, S, P> RedirectConfirmController<L, S, P>
where
    L: ExternalLauncher,
    S: SessionLoader,
    P: ConfirmationPresenter,
{
    pub fn new(tag: impl Into<String>, launcher: L, session: S, presenter: P) -> Self {
        Self {
            launcher,
            session,
            presenter,
            tag: tag.into(),
            inner: Mutex::new(ControllerInner {
                state: ConfirmationState::Idle,
                surface: None,
            }),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn state(&self) -> ConfirmationState {
        self.inner.lock().state.clone()
    }

    /// Feed one resolved redirect event through the gate.
    ///
    /// Transitions are decided under the state lock; every collaborator
    /// callback (presenter, launcher, session, surface) runs with the
    /// lock released, so a collaborator may synchronously re-enter the
    /// controller (inspect `state()`, or decline to show and `dismiss()`).
    pub fn on_redirect(
        &self,
        decision: &RedirectDecision,
        flags: NavigationFlags,
    ) -> RedirectOutcome {
        if !flags.user_triggered {
            log::debug!("ignoring programmatic redirect for {}", self.tag);
            return RedirectOutcome::Ignored;
        }

        // While a confirmation is pending, every redirect event is
        // dropped, not queued: dialogs never stack and nothing loads
        // underneath the one that is showing.
        let surface = {
            let inner = self.inner.lock();
            if matches!(inner.state, ConfirmationState::AwaitingConfirmation(_)) {
                log::debug!("dropping redirect for {}: confirmation already pending", self.tag);
                return RedirectOutcome::Dropped;
            }
            inner.surface.clone()
        };
        if surface
            .and_then(|weak| weak.upgrade())
            .is_some_and(|surface| surface.is_showing())
        {
            log::debug!("dropping redirect for {}: surface already showing", self.tag);
            return RedirectOutcome::Dropped;
        }

        let Some(target) = decision.external_target.as_ref() else {
            if decision.is_redirect
                && let Some(fallback) = decision.fallback_web_url.as_deref()
            {
                self.session.load_url(fallback);
                return RedirectOutcome::FallbackLoaded;
            }
            return RedirectOutcome::PassThrough;
        };

        if !flags.private_session {
            self.launcher.open_external(target);
            return RedirectOutcome::Launched;
        }

        {
            let mut inner = self.inner.lock();
            if matches!(inner.state, ConfirmationState::AwaitingConfirmation(_)) {
                log::debug!("dropping redirect for {}: confirmation already pending", self.tag);
                return RedirectOutcome::Dropped;
            }
            inner.state = ConfirmationState::AwaitingConfirmation(decision.clone());
        }
        let surface = self.presenter.present(&self.tag, decision);
        let mut inner = self.inner.lock();
        // The presenter may have declined and dismissed synchronously;
        // only a still-pending confirmation keeps the surface binding.
        if matches!(inner.state, ConfirmationState::AwaitingConfirmation(_)) {
            inner.surface = Some(Arc::downgrade(&surface));
        }
        RedirectOutcome::AwaitingConfirmation
    }

    /// One-shot confirm from the surface: launch the pending target.
    /// Calling without a pending confirmation is a no-op.
    pub fn confirm(&self) {
        let pending = {
            let mut inner = self.inner.lock();
            match std::mem::replace(&mut inner.state, ConfirmationState::Resolved) {
                ConfirmationState::AwaitingConfirmation(decision) => Some(decision),
                other => {
                    inner.state = other;
                    None
                }
            }
            // Stays Resolved until the surface teardown acknowledges
            // through dismiss().
        };
        if let Some(target) = pending.as_ref().and_then(|d| d.external_target.as_ref()) {
            self.launcher.open_external(target);
        }
    }

    /// One-shot dismiss: cancel, surface destroyed without a choice, or
    /// the teardown that follows a confirm. Only a genuine cancel loads
    /// the fallback, and only once.
    pub fn dismiss(&self) {
        let fallback = {
            let mut inner = self.inner.lock();
            inner.surface = None;
            match std::mem::replace(&mut inner.state, ConfirmationState::Idle) {
                ConfirmationState::AwaitingConfirmation(decision) => decision.fallback_web_url,
                // Resolved: the launch already happened, nothing to replay.
                // Idle: stray dismiss, no-op.
                ConfirmationState::Resolved | ConfirmationState::Idle => None,
            }
        };
        if let Some(fallback) = fallback.as_deref() {
            self.session.load_url(fallback);
        }
    }

    /// Re-bind a surface that survived (or was recreated after) process or
    /// window teardown. Restores the weak association for a still-pending
    /// confirmation without re-presenting or replaying side effects.
    /// Returns false when the tag does not match or nothing is pending.
    pub fn adopt_surface(&self, surface: &Arc<dyn ConfirmationSurface>) -> bool {
        if surface.tag() != self.tag {
            return false;
        }
        let mut inner = self.inner.lock();
        if !matches!(inner.state, ConfirmationState::AwaitingConfirmation(_)) {
            return false;
        }
        inner.surface = Some(Arc::downgrade(surface));
        true
    }

    /// Session replacement: abandon any pending confirmation without side
    /// effects.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.state = ConfirmationState::Idle;
        inner.surface = None;
    }
}

impl<T: ExternalLauncher + ?Sized> ExternalLauncher for Arc<T> {
    fn open_external(&self, target: &LaunchDescriptor) {
        (**self).open_external(target)
    }
}

impl<T: SessionLoader + ?Sized> SessionLoader for Arc<T> {
    fn load_url(&self, url: &str) {
        (**self).load_url(url)
    }
}

impl<T: ConfirmationPresenter + ?Sized> ConfirmationPresenter for Arc<T> {
    fn present(&self, tag: &str, decision: &RedirectDecision) -> Arc<dyn ConfirmationSurface> {
        (**self).present(tag, decision)
    }
}

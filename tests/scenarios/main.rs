/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! End-to-end scenarios: resolve a navigated URL, then push the decision
//! through a session's confirmation controller.

use std::sync::Arc;

use applink::test_utils::{
    RecordingLauncher, RecordingSession, ScriptedRegistry, TestPresenter,
};
use applink::{
    BrowserExclusionSet, ConfirmationState, NavigationFlags, RedirectConfirmController,
    RedirectDecision, RedirectOutcome, RedirectResolver, VERSION,
};

const BROWSER: &str = "org.browser.generic";

struct Session {
    controller: RedirectConfirmController<
        Arc<RecordingLauncher>,
        Arc<RecordingSession>,
        Arc<TestPresenter>,
    >,
    launcher: Arc<RecordingLauncher>,
    loader: Arc<RecordingSession>,
    presenter: Arc<TestPresenter>,
}

fn session(tag: &str) -> Session {
    let launcher = Arc::new(RecordingLauncher::default());
    let loader = Arc::new(RecordingSession::default());
    let presenter = Arc::new(TestPresenter::default());
    Session {
        controller: RedirectConfirmController::new(
            tag,
            launcher.clone(),
            loader.clone(),
            presenter.clone(),
        ),
        launcher,
        loader,
        presenter,
    }
}

const USER: NavigationFlags = NavigationFlags {
    user_triggered: true,
    private_session: false,
};
const USER_PRIVATE: NavigationFlags = NavigationFlags {
    user_triggered: true,
    private_session: true,
};

#[test]
fn scenarios_binary_smoke_runs() {
    assert!(!VERSION.is_empty());
}

#[test]
fn web_navigation_with_browsers_only_stays_in_app() {
    let registry = ScriptedRegistry::new().scheme_handlers("https", [BROWSER]);
    let resolver = RedirectResolver::new(registry);

    let decision = resolver.resolve("https://example.com/a").unwrap();
    assert_eq!(decision.external_target, None);
    assert_eq!(decision.fallback_web_url.as_deref(), Some("https://example.com/a"));
    assert!(!decision.is_redirect);

    let session = session("tab-1");
    let outcome = session.controller.on_redirect(&decision, USER);
    assert_eq!(outcome, RedirectOutcome::PassThrough);
    assert!(session.loader.loaded().is_empty());
}

#[test]
fn deep_link_in_regular_session_launches_installed_app() {
    let registry = ScriptedRegistry::new()
        .scheme_handlers("https", [BROWSER])
        .scheme_handlers("myapp", ["com.example.app"]);
    let resolver = RedirectResolver::new(registry);

    let decision = resolver
        .resolve("myapp://open?browser_fallback_url=https://example.com/x")
        .unwrap();
    assert!(decision.external_target.is_some());

    let session = session("tab-1");
    let outcome = session.controller.on_redirect(&decision, USER);
    assert_eq!(outcome, RedirectOutcome::Launched);
    assert_eq!(session.controller.state(), ConfirmationState::Idle);
    assert_eq!(session.launcher.opened().len(), 1);
}

#[test]
fn deep_link_in_private_session_confirms_then_launches() {
    let registry = ScriptedRegistry::new()
        .scheme_handlers("https", [BROWSER])
        .scheme_handlers("myapp", ["com.example.app"]);
    let resolver = RedirectResolver::new(registry);
    let decision = resolver
        .resolve("myapp://open?browser_fallback_url=https://example.com/x")
        .unwrap();

    let session = session("private-tab");
    let outcome = session.controller.on_redirect(&decision, USER_PRIVATE);
    assert_eq!(outcome, RedirectOutcome::AwaitingConfirmation);
    assert_eq!(session.presenter.presented_count(), 1);

    session.controller.confirm();
    session.controller.dismiss();
    assert_eq!(session.launcher.opened().len(), 1);
    assert!(session.loader.loaded().is_empty());
    assert_eq!(session.controller.state(), ConfirmationState::Idle);
}

#[test]
fn declined_private_deep_link_falls_back_in_app() {
    let registry = ScriptedRegistry::new()
        .scheme_handlers("https", [BROWSER])
        .scheme_handlers("myapp", ["com.example.app"]);
    let resolver = RedirectResolver::new(registry);
    let decision = resolver
        .resolve("myapp://open?browser_fallback_url=https://example.com/x")
        .unwrap();

    let session = session("private-tab");
    session.controller.on_redirect(&decision, USER_PRIVATE);
    session.controller.dismiss();
    assert!(session.launcher.opened().is_empty());
    assert_eq!(
        session.loader.loaded(),
        vec!["https://example.com/x".to_string()]
    );
}

#[test]
fn uninstalled_deep_link_redirects_to_declared_fallback() {
    let registry = ScriptedRegistry::new().scheme_handlers("https", [BROWSER]);
    let resolver = RedirectResolver::new(registry);

    let decision = resolver
        .resolve("myapp://open?browser_fallback_url=https://example.com/x")
        .unwrap();
    assert_eq!(decision.external_target, None);
    assert_eq!(decision.fallback_web_url.as_deref(), Some("https://example.com/x"));
    assert!(decision.is_redirect);

    let session = session("tab-1");
    let outcome = session.controller.on_redirect(&decision, USER);
    assert_eq!(outcome, RedirectOutcome::FallbackLoaded);
    assert_eq!(
        session.loader.loaded(),
        vec!["https://example.com/x".to_string()]
    );
}

#[test]
fn verified_link_app_beats_browsers_for_a_web_url() {
    let registry = ScriptedRegistry::new()
        .scheme_handlers("https", [BROWSER])
        .url_handlers("https://shop.example/item/1", ["com.shop.app", BROWSER]);
    let resolver = RedirectResolver::new(registry);

    let decision = resolver.resolve("https://shop.example/item/1").unwrap();
    let target = decision.external_target.unwrap();
    assert_eq!(target.target().unwrap().as_str(), "https://shop.example/item/1");
}

#[test]
fn pending_decision_survives_serialization_across_surface_teardown() {
    let registry = ScriptedRegistry::new().scheme_handlers("myapp", ["com.example.app"]);
    let resolver =
        RedirectResolver::with_browser_exclusions(registry, BrowserExclusionSet::default());
    let decision = resolver
        .resolve("myapp://open?browser_fallback_url=https://example.com/x")
        .unwrap();

    let persisted = serde_json::to_string(&decision).unwrap();
    let restored: RedirectDecision = serde_json::from_str(&persisted).unwrap();
    assert_eq!(restored, decision);
}

#[test]
fn recreated_surface_resumes_pending_confirmation() {
    let registry = ScriptedRegistry::new().scheme_handlers("myapp", ["com.example.app"]);
    let resolver =
        RedirectResolver::with_browser_exclusions(registry, BrowserExclusionSet::default());
    let decision = resolver.resolve("myapp://open").unwrap();

    let session = session("private-tab");
    session.controller.on_redirect(&decision, USER_PRIVATE);

    // Window teardown destroys the dialog, then start-up recreates it.
    session.presenter.destroy_surface();
    let recreated = session.presenter.recreate_surface("private-tab");
    assert!(session.controller.adopt_surface(&recreated));
    assert_eq!(session.presenter.presented_count(), 1);

    session.controller.confirm();
    assert_eq!(
        session.launcher.opened(),
        vec!["myapp://open".to_string()]
    );
}

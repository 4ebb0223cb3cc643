//! Integration tests for day switches whose fetches overlap.

mod common;

use common::{captures, mounted, GatedSource};
use lapse_catalog::{CatalogClient, StaticCatalog};
use lapse_timeline::{Dispatch, NavInput, SwitchOutcome};
use lapse_types::{
    capture::{DateKey, Step},
    config::{NavigationConfig, StaleResponsePolicy},
    events::EventPayload,
};

fn three_day_catalog() -> StaticCatalog {
    StaticCatalog::new()
        .with_day("2024-01-01", captures("2024-01-01", 4))
        .with_day("2024-01-02", captures("2024-01-02", 2))
        .with_day("2024-01-03", captures("2024-01-03", 3))
}

fn policy(stale_responses: StaleResponsePolicy) -> NavigationConfig {
    NavigationConfig {
        stale_responses,
        ..NavigationConfig::default()
    }
}

fn pending(dispatch: Dispatch) -> lapse_timeline::DayRequest {
    match dispatch {
        Dispatch::Pending(request) => request,
        other => panic!("expected a pending day switch, got {other:?}"),
    }
}

#[tokio::test]
async fn tokens_increase_per_issued_fetch() {
    let catalog = CatalogClient::from_source(three_day_catalog());
    let mut controller = mounted(catalog, "2024-01-01", 4, &NavigationConfig::default()).await;

    let first = pending(controller.handle(NavInput::StepDay(Step::Next)));
    let second = pending(controller.handle(NavInput::JumpToDate(DateKey::from("2024-01-03"))));

    assert!(second.token > first.token);
    assert_eq!(first.date.as_str(), "2024-01-02");
    assert_eq!(second.date.as_str(), "2024-01-03");
}

#[tokio::test]
async fn discard_policy_keeps_latest_request_when_it_resolves_first() {
    let catalog = CatalogClient::from_source(three_day_catalog());
    let mut controller = mounted(
        catalog.clone(),
        "2024-01-01",
        4,
        &policy(StaleResponsePolicy::Discard),
    )
    .await;

    let older = pending(controller.handle(NavInput::StepDay(Step::Next)));
    let newer = pending(controller.handle(NavInput::JumpToDate(DateKey::from("2024-01-03"))));

    let newer_response = newer.resolve(&catalog).await;
    assert_eq!(controller.complete(newer_response), SwitchOutcome::Committed);
    let older_response = older.resolve(&catalog).await;
    assert_eq!(controller.complete(older_response), SwitchOutcome::Stale);

    assert_eq!(controller.state().current_date().as_str(), "2024-01-03");
    assert_eq!(controller.view().date_display, "2024-01-03");
    let discarded = controller
        .journal()
        .snapshot()
        .into_iter()
        .any(|event| matches!(event.payload, EventPayload::StaleResponseDiscarded { .. }));
    assert!(discarded);
}

#[tokio::test]
async fn discard_policy_ignores_older_request_resolving_first() {
    let catalog = CatalogClient::from_source(three_day_catalog());
    let mut controller = mounted(
        catalog.clone(),
        "2024-01-01",
        4,
        &policy(StaleResponsePolicy::Discard),
    )
    .await;

    let older = pending(controller.handle(NavInput::StepDay(Step::Next)));
    let newer = pending(controller.handle(NavInput::JumpToDate(DateKey::from("2024-01-03"))));

    let older_response = older.resolve(&catalog).await;
    assert_eq!(controller.complete(older_response), SwitchOutcome::Stale);
    assert_eq!(controller.state().current_date().as_str(), "2024-01-01");

    let newer_response = newer.resolve(&catalog).await;
    assert_eq!(controller.complete(newer_response), SwitchOutcome::Committed);
    assert_eq!(controller.state().current_date().as_str(), "2024-01-03");
}

#[tokio::test]
async fn last_resolved_policy_lets_the_slowest_fetch_win() {
    let catalog = CatalogClient::from_source(three_day_catalog());
    let mut controller = mounted(
        catalog.clone(),
        "2024-01-01",
        4,
        &policy(StaleResponsePolicy::LastResolved),
    )
    .await;

    let older = pending(controller.handle(NavInput::StepDay(Step::Next)));
    let newer = pending(controller.handle(NavInput::JumpToDate(DateKey::from("2024-01-03"))));

    let newer_response = newer.resolve(&catalog).await;
    assert_eq!(controller.complete(newer_response), SwitchOutcome::Committed);
    let older_response = older.resolve(&catalog).await;
    assert_eq!(controller.complete(older_response), SwitchOutcome::Committed);

    assert_eq!(controller.state().current_date().as_str(), "2024-01-02");
    assert_eq!(controller.state().images().len(), 2);
}

#[tokio::test]
async fn concurrent_fetches_resolving_out_of_order() {
    let source = GatedSource::new(three_day_catalog());
    let release_older = source.gate("2024-01-02");
    let release_newer = source.gate("2024-01-03");
    let catalog = CatalogClient::from_source(source);
    let mut controller = mounted(
        catalog.clone(),
        "2024-01-01",
        4,
        &policy(StaleResponsePolicy::Discard),
    )
    .await;

    let older = pending(controller.handle(NavInput::StepDay(Step::Next)));
    let newer = pending(controller.handle(NavInput::JumpToDate(DateKey::from("2024-01-03"))));

    let older_task = tokio::spawn({
        let catalog = catalog.clone();
        async move { older.resolve(&catalog).await }
    });
    let newer_task = tokio::spawn({
        let catalog = catalog.clone();
        async move { newer.resolve(&catalog).await }
    });

    // While both fetches hang the previous day stays on screen.
    tokio::task::yield_now().await;
    assert_eq!(controller.state().current_date().as_str(), "2024-01-01");

    release_newer.send(()).expect("release newer");
    let newer_response = newer_task.await.expect("newer task");
    release_older.send(()).expect("release older");
    let older_response = older_task.await.expect("older task");

    assert_eq!(controller.complete(newer_response), SwitchOutcome::Committed);
    assert_eq!(controller.complete(older_response), SwitchOutcome::Stale);
    assert_eq!(controller.state().current_date().as_str(), "2024-01-03");
    assert_eq!(controller.state().current_index(), Some(0));
}

#[tokio::test]
async fn joined_fetches_commit_only_the_latest_request() {
    let source = GatedSource::new(three_day_catalog());
    let release_older = source.gate("2024-01-02");
    let release_newer = source.gate("2024-01-03");
    let catalog = CatalogClient::from_source(source);
    let mut controller = mounted(
        catalog.clone(),
        "2024-01-01",
        4,
        &policy(StaleResponsePolicy::Discard),
    )
    .await;

    let older = pending(controller.handle(NavInput::StepDay(Step::Next)));
    let newer = pending(controller.handle(NavInput::JumpToDate(DateKey::from("2024-01-03"))));

    let release = async move {
        tokio::task::yield_now().await;
        release_newer.send(()).expect("release newer");
        tokio::task::yield_now().await;
        release_older.send(()).expect("release older");
    };
    let (older_response, newer_response, ()) = futures::join!(
        older.resolve(&catalog),
        newer.resolve(&catalog),
        release
    );

    assert_eq!(controller.complete(newer_response), SwitchOutcome::Committed);
    assert_eq!(controller.complete(older_response), SwitchOutcome::Stale);
    assert_eq!(controller.state().current_date().as_str(), "2024-01-03");
    assert_eq!(controller.state().images().len(), 3);
}

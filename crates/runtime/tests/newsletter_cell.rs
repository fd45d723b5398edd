use std::sync::Arc;
use std::time::Duration;

use account_core::{Newsletter, NewsletterSubscriptions, User};
use client_api_core::{ApiError, ErrorEnvelope, InMemoryApiService};
use settings_runtime::{
    CellConfig, CellError, CellPhase, DEFAULT_SAVE_ERROR_MESSAGE, Event, NewsletterCell,
    NewsletterCellHandle, SessionEnv, Topic,
};
use tokio::sync::broadcast;

fn subscriber() -> User {
    User::new(1, "Ada").with_subscriptions(NewsletterSubscriptions::all(false))
}

async fn start(api: &InMemoryApiService, env: impl FnOnce(SessionEnv) -> SessionEnv) -> NewsletterCell {
    let session = env(SessionEnv::new(Arc::new(api.clone())));
    NewsletterCell::builder()
        .config(CellConfig::default())
        .env(session)
        .build()
        .await
        .expect("cell should start")
}

async fn next(rx: &mut broadcast::Receiver<Event>) -> Event {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

/// Lets spawned remote calls run to completion under a paused clock.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

async fn ready_on(handle: &NewsletterCellHandle, topic: Newsletter) -> broadcast::Receiver<Event> {
    let mut switch = handle.subscribe(Topic::SwitchState);
    handle.set_topic(topic).await.unwrap();
    handle.on_ready().await.unwrap();
    assert_eq!(next(&mut switch).await, Event::SwitchState(Some(false)));
    switch
}

async fn stop(cell: NewsletterCell, handle: NewsletterCellHandle) {
    drop(handle);
    cell.shutdown().await.expect("worker should stop cleanly");
}

#[tokio::test]
async fn successful_toggle_commits_server_record() {
    let api = InMemoryApiService::new(subscriber());
    let cell = start(&api, |env| env).await;
    let handle = cell.handle();
    let mut users = handle.subscribe(Topic::CurrentUser);
    let mut switch = ready_on(&handle, Newsletter::Weekly).await;

    handle.on_topic_toggled(true).await.unwrap();

    // Optimistic value first, then the committed one.
    assert_eq!(next(&mut switch).await, Event::SwitchState(Some(true)));
    assert_eq!(next(&mut switch).await, Event::SwitchState(Some(true)));

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.phase, CellPhase::Committed);
    assert_eq!(snapshot.switch_state, Some(true));
    let current = snapshot.current_user.unwrap();
    assert_eq!(current.newsletters.weekly, Some(true));
    assert_eq!(api.stored_user(), Some(current.clone()));

    // fetched, derived, committed
    let mut seen = Vec::new();
    while let Ok(Event::CurrentUser(user)) = users.try_recv() {
        seen.push(user);
    }
    assert_eq!(seen.len(), 3);
    assert_eq!(seen.last(), Some(&current));

    stop(cell, handle).await;
}

#[tokio::test]
async fn failed_toggle_reports_message_and_rolls_back() {
    let api = InMemoryApiService::new(subscriber());
    api.fail_next_update(ApiError::message("server error"));
    let cell = start(&api, |env| env).await;
    let handle = cell.handle();
    let mut errors = handle.subscribe(Topic::SaveError);
    let mut switch = ready_on(&handle, Newsletter::Weekly).await;
    let before = handle.snapshot().await.unwrap().current_user;

    handle.on_topic_toggled(true).await.unwrap();

    assert_eq!(next(&mut switch).await, Event::SwitchState(Some(true)));
    assert_eq!(next(&mut errors).await, Event::SaveError("server error".into()));
    assert_eq!(next(&mut switch).await, Event::SwitchState(Some(false)));

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.phase, CellPhase::RolledBack);
    assert_eq!(snapshot.current_user, before);
    assert_eq!(api.stored_user(), Some(subscriber()));

    stop(cell, handle).await;
}

#[tokio::test]
async fn failure_without_message_uses_fallback() {
    let api = InMemoryApiService::new(subscriber());
    api.fail_next_update(ApiError::Server(ErrorEnvelope::default().with_http_code(500)));
    api.fail_next_update(ApiError::Network("connection reset".into()));
    let cell = start(&api, |env| env).await;
    let handle = cell.handle();
    let mut errors = handle.subscribe(Topic::SaveError);
    let _switch = ready_on(&handle, Newsletter::Promo).await;

    handle.on_topic_toggled(true).await.unwrap();
    assert_eq!(
        next(&mut errors).await,
        Event::SaveError(DEFAULT_SAVE_ERROR_MESSAGE.into())
    );

    handle.on_topic_toggled(true).await.unwrap();
    assert_eq!(
        next(&mut errors).await,
        Event::SaveError(DEFAULT_SAVE_ERROR_MESSAGE.into())
    );

    stop(cell, handle).await;
}

#[tokio::test]
async fn configured_fallback_message_is_used() {
    let api = InMemoryApiService::new(subscriber());
    api.fail_next_update(ApiError::Network("offline".into()));
    let cell = NewsletterCell::builder()
        .config(CellConfig::default().with_fallback_error_message("Try again later."))
        .env(SessionEnv::new(Arc::new(api.clone())))
        .build()
        .await
        .unwrap();
    let handle = cell.handle();
    let mut errors = handle.subscribe(Topic::SaveError);
    let _switch = ready_on(&handle, Newsletter::Arts).await;

    handle.on_topic_toggled(false).await.unwrap();

    assert_eq!(next(&mut errors).await, Event::SaveError("Try again later.".into()));
    stop(cell, handle).await;
}

#[tokio::test(start_paused = true)]
async fn only_latest_of_rapid_toggles_commits() {
    let api = InMemoryApiService::new(subscriber());
    api.delay_next_update(Duration::from_secs(1));
    let cell = start(&api, |env| env).await;
    let handle = cell.handle();
    let _switch = ready_on(&handle, Newsletter::Weekly).await;

    handle.on_topic_toggled(true).await.unwrap();
    handle.on_topic_toggled(false).await.unwrap();

    // Give the slow first call ample time to resolve if it were still alive.
    tokio::time::sleep(Duration::from_secs(3)).await;

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.latest_version, 2);
    assert_eq!(snapshot.phase, CellPhase::Committed);
    assert_eq!(snapshot.switch_state, Some(false));
    assert_eq!(
        api.updates().last().and_then(|u| u.newsletters.weekly),
        Some(false)
    );
    assert_eq!(api.stored_user().and_then(|u| u.newsletters.weekly), Some(false));

    stop(cell, handle).await;
}

#[tokio::test]
async fn opt_in_prompt_only_for_on_in_region() {
    let api = InMemoryApiService::new(subscriber());
    let cell = start(&api, |env| env.with_country_code("DE")).await;
    let handle = cell.handle();
    let mut prompts = handle.subscribe(Topic::OptInPrompt);
    let _switch = ready_on(&handle, Newsletter::Weekly).await;

    handle.on_topic_toggled(true).await.unwrap();
    assert_eq!(next(&mut prompts).await, Event::OptInPrompt("Projects We Love".into()));

    handle.on_topic_toggled(false).await.unwrap();
    handle.on_all_toggled(true).await.unwrap();
    handle.snapshot().await.unwrap();
    assert!(prompts.try_recv().is_err());

    stop(cell, handle).await;
}

#[tokio::test]
async fn no_opt_in_prompt_outside_region() {
    let api = InMemoryApiService::new(subscriber());
    let cell = start(&api, |env| env.with_country_code("US")).await;
    let handle = cell.handle();
    let mut prompts = handle.subscribe(Topic::OptInPrompt);
    let _switch = ready_on(&handle, Newsletter::Happening).await;

    handle.on_topic_toggled(true).await.unwrap();
    handle.snapshot().await.unwrap();
    assert!(prompts.try_recv().is_err());

    stop(cell, handle).await;
}

#[tokio::test]
async fn region_code_must_match_exactly() {
    let api = InMemoryApiService::new(subscriber());
    let cell = start(&api, |env| env.with_country_code("de")).await;
    let handle = cell.handle();
    let mut prompts = handle.subscribe(Topic::OptInPrompt);
    let _switch = ready_on(&handle, Newsletter::Weekly).await;

    handle.on_topic_toggled(true).await.unwrap();
    handle.snapshot().await.unwrap();
    assert!(prompts.try_recv().is_err());

    stop(cell, handle).await;
}

#[tokio::test]
async fn unknown_flag_publishes_empty_switch_state() {
    let user = User::new(1, "Ada").with_newsletter(Newsletter::Arts, true);
    let api = InMemoryApiService::new(user);
    let cell = start(&api, |env| env).await;
    let handle = cell.handle();
    let mut switch = handle.subscribe(Topic::SwitchState);

    handle.set_topic(Newsletter::Weekly).await.unwrap();
    handle.on_ready().await.unwrap();
    assert_eq!(next(&mut switch).await, Event::SwitchState(None));

    handle.set_topic(Newsletter::Arts).await.unwrap();
    assert_eq!(next(&mut switch).await, Event::SwitchState(Some(true)));
    assert_eq!(handle.snapshot().await.unwrap().switch_state, Some(true));

    stop(cell, handle).await;
}

#[tokio::test]
async fn all_toggle_updates_every_topic() {
    let api = InMemoryApiService::new(subscriber());
    let cell = start(&api, |env| env).await;
    let handle = cell.handle();
    let mut switch = ready_on(&handle, Newsletter::Invent).await;

    handle.on_all_toggled(true).await.unwrap();

    assert_eq!(next(&mut switch).await, Event::SwitchState(Some(true)));
    assert_eq!(next(&mut switch).await, Event::SwitchState(Some(true)));
    assert_eq!(
        api.stored_user().map(|u| u.newsletters),
        Some(NewsletterSubscriptions::all(true))
    );

    stop(cell, handle).await;
}

#[tokio::test(start_paused = true)]
async fn ready_fetches_once() {
    let api = InMemoryApiService::new(subscriber());
    let cell = start(&api, |env| env).await;
    let handle = cell.handle();

    handle.on_ready().await.unwrap();
    handle.on_ready().await.unwrap();
    settle().await;

    assert_eq!(api.fetch_calls(), 1);
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.phase, CellPhase::Fetched);
    assert_eq!(snapshot.current_user, Some(subscriber()));
    // No topic yet, so nothing to render.
    assert_eq!(snapshot.switch_state, None);

    stop(cell, handle).await;
}

#[tokio::test(start_paused = true)]
async fn fetch_failure_keeps_session_user() {
    let cached = subscriber().with_newsletter(Newsletter::Games, true);
    let api = InMemoryApiService::new(subscriber());
    api.fail_next_fetch(ApiError::Network("offline".into()));
    let cell = start(&api, |env| env.with_current_user(Some(cached.clone()))).await;
    let handle = cell.handle();
    let mut users = handle.subscribe(Topic::CurrentUser);

    handle.on_ready().await.unwrap();
    assert_eq!(next(&mut users).await, Event::CurrentUser(cached.clone()));
    settle().await;

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.current_user, Some(cached));
    assert_eq!(snapshot.phase, CellPhase::Fetched);
    assert!(users.try_recv().is_err());

    stop(cell, handle).await;
}

#[tokio::test(start_paused = true)]
async fn fetch_failure_without_session_user_leaves_cell_idle() {
    let api = InMemoryApiService::signed_out();
    let cell = start(&api, |env| env).await;
    let handle = cell.handle();
    let mut users = handle.subscribe(Topic::CurrentUser);

    handle.set_topic(Newsletter::Weekly).await.unwrap();
    handle.on_ready().await.unwrap();
    settle().await;
    handle.on_topic_toggled(true).await.unwrap();

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.phase, CellPhase::Idle);
    assert_eq!(snapshot.current_user, None);
    assert_eq!(snapshot.latest_version, 0);
    assert!(users.try_recv().is_err());
    assert!(api.updates().is_empty());

    stop(cell, handle).await;
}

#[tokio::test]
async fn build_requires_environment() {
    let result = NewsletterCell::builder().build().await;
    assert!(matches!(result, Err(CellError::MissingEnvironment)));
}

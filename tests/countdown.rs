//! Countdown driver behaviour against the paused tokio clock

use std::{sync::Arc, time::Duration};
use tokio::time::sleep;

use pomodoro_timer::{
    services::LocalStorage,
    state::{AppState, Durations, Locale, PreferenceStore, SessionType, TimerSettings},
};

/// 3 s work, 1 s short break, 2 s long break, long break every second work session
fn quick_state(auto_cycle: bool) -> Arc<AppState> {
    let defaults = TimerSettings {
        durations: Durations::new(0.05, 0.0167, 0.0333),
        long_break_interval: 2,
        auto_cycle,
    };
    Arc::new(AppState::new(
        0,
        "127.0.0.1".to_string(),
        Locale::En,
        defaults,
        PreferenceStore::load(LocalStorage::in_memory()),
    ))
}

async fn advance_to(millis: u64, start: tokio::time::Instant) {
    let target = start + Duration::from_millis(millis);
    tokio::time::sleep_until(target).await;
}

#[tokio::test(start_paused = true)]
async fn test_full_cycle_ends_idle_after_long_break() {
    let state = quick_state(true);
    let start = tokio::time::Instant::now();

    let timer = state.toggle(None).unwrap();
    assert!(timer.running);
    assert_eq!(timer.remaining_seconds, 3);
    assert!(state.has_driver());

    advance_to(3_500, start).await;
    let timer = state.get_timer().unwrap();
    assert_eq!(timer.session, SessionType::ShortBreak);
    assert_eq!(timer.remaining_seconds, 1);

    advance_to(4_500, start).await;
    let timer = state.get_timer().unwrap();
    assert_eq!(timer.session, SessionType::Work);
    assert_eq!(timer.remaining_seconds, 3);
    assert_eq!(timer.completed_work, 1);

    advance_to(7_500, start).await;
    let timer = state.get_timer().unwrap();
    assert_eq!(timer.session, SessionType::LongBreak);
    assert_eq!(timer.completed_work, 0);
    assert!(timer.running);

    advance_to(9_500, start).await;
    let timer = state.get_timer().unwrap();
    assert_eq!(timer.session, SessionType::Work);
    assert_eq!(timer.formatted_time, "00:03");
    assert!(!timer.running);
    assert!(!state.has_driver());

    // nothing moves once idle
    advance_to(15_000, start).await;
    assert_eq!(state.get_timer().unwrap().remaining_seconds, 3);
}

#[tokio::test(start_paused = true)]
async fn test_pause_freezes_remaining_time() {
    let state = quick_state(true);
    let start = tokio::time::Instant::now();

    state.toggle(None).unwrap();
    advance_to(1_500, start).await;
    let timer = state.toggle(None).unwrap();
    assert!(!timer.running);
    assert_eq!(timer.remaining_seconds, 2);
    assert_eq!(timer.button_label, "Start");
    assert!(!state.has_driver());

    advance_to(6_500, start).await;
    assert_eq!(state.get_timer().unwrap().remaining_seconds, 2);

    state.toggle(None).unwrap();
    advance_to(7_600, start).await;
    assert_eq!(state.get_timer().unwrap().remaining_seconds, 1);
}

#[tokio::test(start_paused = true)]
async fn test_restarting_never_leaves_two_drivers() {
    let state = quick_state(true);
    let start = tokio::time::Instant::now();

    state.toggle(None).unwrap();
    state.toggle(None).unwrap();
    state.toggle(None).unwrap();
    assert!(state.has_driver());

    advance_to(1_500, start).await;
    assert_eq!(state.get_timer().unwrap().remaining_seconds, 2);
}

#[tokio::test(start_paused = true)]
async fn test_reset_cancels_driver_and_keeps_session() {
    let state = quick_state(true);
    let start = tokio::time::Instant::now();

    state.toggle(None).unwrap();
    advance_to(3_500, start).await;
    assert_eq!(state.get_timer().unwrap().session, SessionType::ShortBreak);

    let timer = state.reset().unwrap();
    assert_eq!(timer.session, SessionType::ShortBreak);
    assert_eq!(timer.remaining_seconds, 1);
    assert!(!timer.running);
    assert!(!state.has_driver());

    advance_to(6_000, start).await;
    assert_eq!(state.get_timer().unwrap().session, SessionType::ShortBreak);
}

#[tokio::test(start_paused = true)]
async fn test_single_break_without_auto_cycle_stops() {
    let state = quick_state(false);
    let start = tokio::time::Instant::now();

    let (applied, _) = state.select_session(SessionType::ShortBreak).unwrap();
    assert!(applied);
    state.toggle(None).unwrap();

    advance_to(1_500, start).await;
    let timer = state.get_timer().unwrap();
    assert_eq!(timer.session, SessionType::ShortBreak);
    assert_eq!(timer.remaining_seconds, 0);
    assert!(!timer.running);
    assert!(!state.has_driver());
}

#[tokio::test(start_paused = true)]
async fn test_watchers_see_every_tick() {
    let state = quick_state(true);
    let mut rx = state.subscribe_timer();

    state.toggle(None).unwrap();
    assert!(rx.borrow_and_update().running);

    sleep(Duration::from_millis(1_100)).await;
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().remaining_seconds, 2);

    state.shutdown();
    assert!(!state.has_driver());
}

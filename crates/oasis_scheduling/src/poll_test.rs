// --- File: crates/oasis_scheduling/src/poll_test.rs ---
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::poll::RefreshTicker;

#[tokio::test]
async fn ticker_fires_repeatedly_until_stopped() {
    let ticks = Arc::new(AtomicUsize::new(0));
    let counter = ticks.clone();
    let ticker = RefreshTicker::start(Duration::from_millis(10), move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    tokio::time::sleep(Duration::from_millis(55)).await;
    ticker.stop().await;
    let seen = ticks.load(Ordering::SeqCst);
    assert!(seen >= 2, "expected at least 2 ticks, saw {seen}");

    // No further ticks after stop.
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(ticks.load(Ordering::SeqCst), seen);
}

#[tokio::test]
async fn dropping_the_ticker_stops_the_task() {
    let ticks = Arc::new(AtomicUsize::new(0));
    let counter = ticks.clone();
    let ticker = RefreshTicker::start(Duration::from_millis(10), move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    tokio::time::sleep(Duration::from_millis(25)).await;
    drop(ticker);
    tokio::time::sleep(Duration::from_millis(5)).await;
    let seen = ticks.load(Ordering::SeqCst);

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(ticks.load(Ordering::SeqCst), seen);
}

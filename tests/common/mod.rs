#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use catfocus_lib::{init_logging, ControllerOptions, FixedClock, TimerConfig, TimerController};

pub const TODAY: &str = "2025/01/02";

pub fn controller() -> TimerController {
    init_logging();
    TimerController::with_clock(ControllerOptions::default(), Arc::new(FixedClock::new(TODAY)))
}

/// Controller holding a configured, not yet started task of `total` seconds.
pub async fn configured(task: &str, total: u64) -> TimerController {
    let controller = controller();
    assert!(controller
        .set_task(task, TimerConfig::new(0, 0, total))
        .await
        .unwrap());
    controller
}

/// Moves the paused test clock forward one tick at a time so the ticker task
/// gets to run after each boundary.
pub async fn advance_ticks(n: u64) {
    for _ in 0..n {
        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
    }
}

pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of VoltGuard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use voltguard_core::{ControllerError, DashboardController, DashboardFeed, FeedError, FeedResult};
use voltguard_types::{CameraStatus, CameraStatusSnapshot, DeviceMetric, LocationData, MetricsSnapshot};

// ---------------------------------------------------------------------------
// Scripted feed
// ---------------------------------------------------------------------------

/// Answers each call with the next queued result; an empty queue is a failure.
#[derive(Default)]
struct ScriptedFeed {
    metrics: Mutex<VecDeque<FeedResult<MetricsSnapshot>>>,
    cameras: Mutex<VecDeque<FeedResult<CameraStatusSnapshot>>>,
    locations: Mutex<VecDeque<FeedResult<Vec<LocationData>>>>,
    metrics_calls: AtomicUsize,
    camera_calls: AtomicUsize,
    location_calls: AtomicUsize,
    /// When set, camera status calls wait for a permit before answering
    camera_gate: Option<Arc<Notify>>,
}

impl ScriptedFeed {
    fn gated(gate: Arc<Notify>) -> Self {
        Self {
            camera_gate: Some(gate),
            ..Self::default()
        }
    }

    fn push_metrics(&self, result: FeedResult<MetricsSnapshot>) {
        self.metrics.lock().push_back(result);
    }

    fn push_cameras(&self, result: FeedResult<CameraStatusSnapshot>) {
        self.cameras.lock().push_back(result);
    }

    fn push_locations(&self, result: FeedResult<Vec<LocationData>>) {
        self.locations.lock().push_back(result);
    }

    fn calls(&self) -> (usize, usize, usize) {
        (
            self.metrics_calls.load(Ordering::SeqCst),
            self.camera_calls.load(Ordering::SeqCst),
            self.location_calls.load(Ordering::SeqCst),
        )
    }
}

fn exhausted() -> FeedError {
    FeedError::Transport("script exhausted".to_owned())
}

fn offline() -> FeedError {
    FeedError::Status {
        endpoint: "/test".to_owned(),
        status: 503,
    }
}

#[async_trait]
impl DashboardFeed for ScriptedFeed {
    async fn metrics(&self) -> FeedResult<MetricsSnapshot> {
        self.metrics_calls.fetch_add(1, Ordering::SeqCst);
        self.metrics.lock().pop_front().unwrap_or_else(|| Err(exhausted()))
    }

    async fn camera_status(&self) -> FeedResult<CameraStatusSnapshot> {
        self.camera_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.camera_gate {
            gate.notified().await;
        }
        self.cameras.lock().pop_front().unwrap_or_else(|| Err(exhausted()))
    }

    async fn today_locations(&self) -> FeedResult<Vec<LocationData>> {
        self.location_calls.fetch_add(1, Ordering::SeqCst);
        self.locations.lock().pop_front().unwrap_or_else(|| Err(exhausted()))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn metrics_for(device_id: &str, voltage: f64) -> MetricsSnapshot {
    MetricsSnapshot {
        device_status: Some(DeviceMetric {
            device_id: Some(device_id.to_owned()),
            battery_voltage: Some(voltage),
            ..DeviceMetric::default()
        }),
        host_status: None,
    }
}

fn one_camera() -> CameraStatusSnapshot {
    CameraStatusSnapshot {
        statuses: vec![CameraStatus {
            camera_id: 1,
            camera_name: "Cabin".to_owned(),
            camera_ip: "192.168.1.20".to_owned(),
            camera_port: Some(554),
            is_connected: true,
            is_active: Some(true),
            response_time_ms: Some(120.0),
            timestamp: Some("2025-03-01T10:00:00Z".to_owned()),
        }],
        total_count: 1,
    }
}

fn track() -> Vec<LocationData> {
    vec![LocationData {
        device_id: "D1".to_owned(),
        latitude: 50.08,
        longitude: 14.43,
        speed: 38.0,
        hdop: 0.9,
        sats: 10,
        timestamp: "2025-03-01T10:00:00Z".to_owned(),
    }]
}

fn mount(
    feed: &Arc<ScriptedFeed>,
    metrics: MetricsSnapshot,
) -> DashboardController<Arc<ScriptedFeed>> {
    DashboardController::new(Arc::clone(feed), metrics, Duration::from_secs(10))
}

/// Lets spawned fetch tasks run to completion.
async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

// ---------------------------------------------------------------------------
// Failure policy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_metrics_keep_last_success() {
    let feed = Arc::new(ScriptedFeed::default());
    feed.push_metrics(Ok(metrics_for("D1", 12.1)));
    feed.push_metrics(Err(offline()));
    feed.push_metrics(Ok(metrics_for("D1", 12.7)));
    feed.push_metrics(Err(offline()));

    let controller = mount(&feed, MetricsSnapshot::default());

    controller.fetch_metrics().await;
    assert_eq!(controller.snapshot().metrics, metrics_for("D1", 12.1));

    controller.fetch_metrics().await;
    assert_eq!(controller.snapshot().metrics, metrics_for("D1", 12.1));

    controller.fetch_metrics().await;
    assert_eq!(controller.snapshot().metrics, metrics_for("D1", 12.7));

    controller.fetch_metrics().await;
    assert_eq!(controller.snapshot().metrics, metrics_for("D1", 12.7));
}

#[tokio::test]
async fn test_camera_failure_resets_to_empty() {
    let feed = Arc::new(ScriptedFeed::default());
    feed.push_cameras(Ok(one_camera()));
    feed.push_cameras(Err(offline()));

    let controller = mount(&feed, MetricsSnapshot::default());

    controller.fetch_camera_status().await;
    assert_eq!(controller.snapshot().camera_status, one_camera());

    controller.fetch_camera_status().await;
    let status = controller.snapshot().camera_status;
    assert!(status.statuses.is_empty());
    assert_eq!(status.total_count, 0);
}

#[tokio::test]
async fn test_location_failure_resets_to_empty() {
    let feed = Arc::new(ScriptedFeed::default());
    feed.push_locations(Ok(track()));
    feed.push_locations(Err(FeedError::Decode {
        endpoint: "/test".to_owned(),
        message: "expected array".to_owned(),
    }));

    let controller = mount(&feed, MetricsSnapshot::default());

    controller.fetch_today_locations().await;
    assert_eq!(controller.snapshot().locations, track());

    controller.fetch_today_locations().await;
    assert!(controller.snapshot().locations.is_empty());
}

#[tokio::test]
async fn test_streams_fail_independently() {
    let feed = Arc::new(ScriptedFeed::default());
    feed.push_metrics(Err(offline()));
    feed.push_cameras(Ok(one_camera()));
    feed.push_locations(Err(offline()));

    let controller = mount(&feed, metrics_for("D1", 12.0));
    controller.refresh_all().await;

    let state = controller.snapshot();
    assert_eq!(state.metrics, metrics_for("D1", 12.0));
    assert_eq!(state.camera_status, one_camera());
    assert!(state.locations.is_empty());
}

#[tokio::test]
async fn test_refresh_all_settles_when_everything_fails() {
    let feed = Arc::new(ScriptedFeed::default());
    let controller = mount(&feed, metrics_for("D1", 12.0));

    controller.refresh_all().await;

    assert_eq!(feed.calls(), (1, 1, 1));
    let state = controller.snapshot();
    assert_eq!(state.metrics, metrics_for("D1", 12.0));
    assert_eq!(state.camera_status, CameraStatusSnapshot::empty());
    assert!(state.locations.is_empty());
}

#[tokio::test]
async fn test_refresh_camera_status_only_touches_cameras() {
    let feed = Arc::new(ScriptedFeed::default());
    feed.push_cameras(Ok(one_camera()));

    let controller = mount(&feed, MetricsSnapshot::default());
    controller.refresh_camera_status().await;

    assert_eq!(feed.calls(), (0, 1, 0));
    assert_eq!(controller.snapshot().camera_status, one_camera());
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_mount_then_camera_outage() {
    let feed = Arc::new(ScriptedFeed::default());
    feed.push_cameras(Ok(one_camera()));
    feed.push_locations(Ok(track()));

    let controller = mount(&feed, metrics_for("D1", 12.4));
    assert!(controller.snapshot().camera_status.is_empty());

    controller.start().unwrap();
    settle().await;

    let state = controller.snapshot();
    assert_eq!(state.metrics, metrics_for("D1", 12.4));
    assert_eq!(state.camera_status, one_camera());
    assert_eq!(state.locations, track());
    assert_eq!(feed.calls(), (0, 1, 1));

    feed.push_cameras(Err(offline()));
    controller.refresh_camera_status().await;
    assert_eq!(controller.snapshot().camera_status, CameraStatusSnapshot::empty());

    controller.stop();
}

#[tokio::test]
async fn test_start_twice_and_after_stop() {
    let feed = Arc::new(ScriptedFeed::default());
    let controller = mount(&feed, MetricsSnapshot::default());

    controller.start().unwrap();
    assert!(controller.is_running());
    assert_eq!(controller.start(), Err(ControllerError::AlreadyRunning));

    controller.stop();
    assert!(!controller.is_running());
    assert!(!controller.is_mounted());
    assert_eq!(controller.start(), Err(ControllerError::Unmounted));

    controller.stop();
}

#[tokio::test]
async fn test_zero_interval_rejected() {
    let feed = Arc::new(ScriptedFeed::default());
    let controller = DashboardController::new(feed, MetricsSnapshot::default(), Duration::ZERO);
    assert_eq!(controller.start(), Err(ControllerError::InvalidInterval));
    assert!(controller.is_mounted());

    controller.stop();
    assert_eq!(controller.start(), Err(ControllerError::Unmounted));
}

#[tokio::test]
async fn test_late_result_after_stop_is_dropped() {
    let gate = Arc::new(Notify::new());
    let feed = Arc::new(ScriptedFeed::gated(Arc::clone(&gate)));
    feed.push_cameras(Ok(one_camera()));

    let controller = mount(&feed, MetricsSnapshot::default());
    let mut updates = controller.subscribe();

    let in_flight = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.refresh_camera_status().await })
    };
    settle().await;
    assert_eq!(feed.calls(), (0, 1, 0));

    controller.stop();
    gate.notify_one();
    in_flight.await.unwrap();

    assert!(controller.snapshot().camera_status.is_empty());
    assert!(!updates.has_changed().unwrap_or(true));
}

#[tokio::test]
async fn test_subscribers_see_changes() {
    let feed = Arc::new(ScriptedFeed::default());
    feed.push_locations(Ok(track()));

    let controller = mount(&feed, MetricsSnapshot::default());
    let mut updates = controller.subscribe();

    controller.fetch_today_locations().await;
    assert!(updates.has_changed().unwrap());
    assert_eq!(updates.borrow_and_update().locations, track());

    // Same empty state again: nothing to announce.
    controller.fetch_camera_status().await;
    assert!(!updates.has_changed().unwrap());
}

// ---------------------------------------------------------------------------
// Scheduling
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_timer_fires_every_period() {
    let feed = Arc::new(ScriptedFeed::default());
    let controller = mount(&feed, metrics_for("D1", 12.0));

    controller.start().unwrap();
    settle().await;
    assert_eq!(feed.calls(), (0, 1, 1));

    tokio::time::sleep(Duration::from_millis(9_500)).await;
    settle().await;
    assert_eq!(feed.calls(), (0, 1, 1));

    tokio::time::sleep(Duration::from_secs(1)).await;
    settle().await;
    assert_eq!(feed.calls(), (1, 2, 2));

    tokio::time::sleep(Duration::from_secs(10)).await;
    settle().await;
    assert_eq!(feed.calls(), (2, 3, 3));

    controller.stop();
    tokio::time::sleep(Duration::from_secs(30)).await;
    settle().await;
    assert_eq!(feed.calls(), (2, 3, 3));
}

#[tokio::test(start_paused = true)]
async fn test_slow_stream_does_not_block_tick() {
    let gate = Arc::new(Notify::new());
    let feed = Arc::new(ScriptedFeed::gated(Arc::clone(&gate)));
    let controller = mount(&feed, MetricsSnapshot::default());

    controller.start().unwrap();
    tokio::time::sleep(Duration::from_millis(20_500)).await;
    settle().await;

    // Camera calls never answer, yet every tick still reached all three streams.
    assert_eq!(feed.calls(), (2, 3, 3));
    controller.stop();
}

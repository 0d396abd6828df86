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

//! Dashboard data controller.
//!
//! Owns the metrics, camera status and location snapshots shown on the dashboard and keeps
//! them fresh with a fixed-interval poll. Each stream fails independently:
//!
//! * metrics keep their last good value when a fetch fails,
//! * camera status falls back to the empty snapshot,
//! * locations fall back to an empty list.
//!
//! All writes go through `watch::Sender::send_if_modified` and check the liveness flag
//! inside that closure, so once [`DashboardController::stop`] returns no fetch that is
//! still in flight can touch the state or wake subscribers.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use voltguard_types::{CameraStatusSnapshot, LocationData, MetricsSnapshot};

use crate::feed::DashboardFeed;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Everything the dashboard renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardState {
    pub metrics: MetricsSnapshot,
    pub camera_status: CameraStatusSnapshot,
    /// Today's fixes in arrival order
    pub locations: Vec<LocationData>,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerError {
    #[error("polling already started")]
    AlreadyRunning,

    #[error("controller has been stopped")]
    Unmounted,

    #[error("poll interval must be greater than zero")]
    InvalidInterval,
}

pub type ControllerResult<T> = Result<T, ControllerError>;

enum Lifecycle {
    Mounted,
    Polling(JoinHandle<()>),
    Unmounted,
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Metrics,
    CameraStatus,
    Locations,
}

struct Inner<F> {
    feed: F,
    poll_interval: Duration,
    state: watch::Sender<DashboardState>,
    alive: AtomicBool,
    lifecycle: Mutex<Lifecycle>,
}

/// Handle to a mounted dashboard. Clones share the same state and timer.
pub struct DashboardController<F: DashboardFeed> {
    inner: Arc<Inner<F>>,
}

impl<F: DashboardFeed> Clone for DashboardController<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: DashboardFeed> fmt::Debug for DashboardController<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DashboardController")
            .field("feed", &self.inner.feed.name())
            .field("poll_interval", &self.inner.poll_interval)
            .field("mounted", &self.is_mounted())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl<F: DashboardFeed> DashboardController<F> {
    /// Mounts a controller seeded with server-side metrics.
    ///
    /// Camera status and locations start empty until their first fetch resolves.
    pub fn new(feed: F, initial_metrics: MetricsSnapshot, poll_interval: Duration) -> Self {
        let (state, _) = watch::channel(DashboardState {
            metrics: initial_metrics,
            ..DashboardState::default()
        });

        Self {
            inner: Arc::new(Inner {
                feed,
                poll_interval,
                state,
                alive: AtomicBool::new(true),
                lifecycle: Mutex::new(Lifecycle::Mounted),
            }),
        }
    }

    /// Fetches camera status and locations right away, then polls all three streams
    /// every `poll_interval`, starting one full period from now.
    pub fn start(&self) -> ControllerResult<()> {
        let mut lifecycle = self.lock_lifecycle();
        match *lifecycle {
            Lifecycle::Polling(_) => return Err(ControllerError::AlreadyRunning),
            Lifecycle::Unmounted => return Err(ControllerError::Unmounted),
            Lifecycle::Mounted => {}
        }
        if self.inner.poll_interval.is_zero() {
            return Err(ControllerError::InvalidInterval);
        }

        self.spawn_fetch(Stream::CameraStatus);
        self.spawn_fetch(Stream::Locations);

        let weak = Arc::downgrade(&self.inner);
        let handle = tokio::spawn(poll_loop(weak, self.inner.poll_interval));
        *lifecycle = Lifecycle::Polling(handle);

        info!(
            feed = self.inner.feed.name(),
            interval_secs = self.inner.poll_interval.as_secs_f64(),
            "Dashboard polling started"
        );
        Ok(())
    }

    /// Unmounts the controller. Safe to call more than once.
    pub fn stop(&self) {
        let previous = std::mem::replace(&mut *self.lock_lifecycle(), Lifecycle::Unmounted);
        if let Lifecycle::Polling(handle) = previous {
            handle.abort();
        }

        // Flip the flag under the state lock so no write can interleave with it.
        self.inner.state.send_if_modified(|_| {
            self.inner.alive.store(false, Ordering::Release);
            false
        });
        info!(feed = self.inner.feed.name(), "Dashboard controller stopped");
    }

    pub fn is_running(&self) -> bool {
        matches!(*self.lock_lifecycle(), Lifecycle::Polling(_))
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.alive.load(Ordering::Acquire)
    }

    pub fn poll_interval(&self) -> Duration {
        self.inner.poll_interval
    }

    pub fn feed(&self) -> &F {
        &self.inner.feed
    }

    pub fn snapshot(&self) -> DashboardState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.inner.state.subscribe()
    }

    /// Replaces the metrics snapshot on success; keeps the old one on failure.
    pub async fn fetch_metrics(&self) {
        match self.inner.feed.metrics().await {
            Ok(metrics) => {
                self.apply(|state| replace_if_changed(&mut state.metrics, metrics));
            }
            Err(e) => {
                warn!(
                    feed = self.inner.feed.name(),
                    error = %e,
                    "Failed to fetch device metrics, keeping last snapshot"
                );
            }
        }
    }

    /// Replaces the camera status on success; clears it on failure.
    pub async fn fetch_camera_status(&self) {
        let next = match self.inner.feed.camera_status().await {
            Ok(status) => status,
            Err(e) => {
                warn!(
                    feed = self.inner.feed.name(),
                    error = %e,
                    "Failed to fetch camera status"
                );
                CameraStatusSnapshot::empty()
            }
        };
        self.apply(|state| replace_if_changed(&mut state.camera_status, next));
    }

    /// Replaces today's locations on success; clears them on failure.
    pub async fn fetch_today_locations(&self) {
        let next = match self.inner.feed.today_locations().await {
            Ok(locations) => locations,
            Err(e) => {
                warn!(
                    feed = self.inner.feed.name(),
                    error = %e,
                    "Failed to fetch today's locations"
                );
                Vec::new()
            }
        };
        self.apply(|state| replace_if_changed(&mut state.locations, next));
    }

    /// Runs all three fetches concurrently and waits for every one to settle.
    pub async fn refresh_all(&self) {
        tokio::join!(
            self.fetch_metrics(),
            self.fetch_camera_status(),
            self.fetch_today_locations()
        );
    }

    /// Used after camera and alert mutations.
    pub async fn refresh_camera_status(&self) {
        self.fetch_camera_status().await;
    }

    fn apply(&self, update: impl FnOnce(&mut DashboardState) -> bool) -> bool {
        self.inner.state.send_if_modified(|state| {
            if !self.inner.alive.load(Ordering::Acquire) {
                debug!("Dropping fetch result after unmount");
                return false;
            }
            update(state)
        })
    }

    fn spawn_fetch(&self, stream: Stream) {
        let controller = self.clone();
        tokio::spawn(async move {
            match stream {
                Stream::Metrics => controller.fetch_metrics().await,
                Stream::CameraStatus => controller.fetch_camera_status().await,
                Stream::Locations => controller.fetch_today_locations().await,
            }
        });
    }

    fn lock_lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.inner.lifecycle.lock()
    }
}

/// Assigns `next` and reports whether anything changed.
fn replace_if_changed<T: PartialEq>(slot: &mut T, next: T) -> bool {
    if *slot == next {
        false
    } else {
        *slot = next;
        true
    }
}

async fn poll_loop<F: DashboardFeed>(inner: Weak<Inner<F>>, period: Duration) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let Some(inner) = inner.upgrade() else {
            break;
        };
        let controller = DashboardController { inner };
        if !controller.is_mounted() {
            break;
        }

        debug!(feed = controller.inner.feed.name(), "Dashboard poll tick");
        // Independent tasks: a slow stream never delays the others or the next tick.
        controller.spawn_fetch(Stream::Metrics);
        controller.spawn_fetch(Stream::CameraStatus);
        controller.spawn_fetch(Stream::Locations);
    }
}

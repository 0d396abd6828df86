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

//! Dashboard data controller and the display logic built on top of it.
//!
//! The controller owns three independently refreshed snapshots (device metrics, camera
//! status and today's GPS track) and publishes them through a `watch` channel. Data comes
//! from any [`DashboardFeed`]; [`ApiFeed`] reads the JSON routes of a running dashboard.

pub mod controller;
pub mod derived;
pub mod feed;
pub mod validation;

pub use controller::{
    ControllerError, ControllerResult, DEFAULT_POLL_INTERVAL, DashboardController, DashboardState,
};
pub use feed::{ApiFeed, DashboardFeed, FeedError, FeedResult};
pub use validation::ValidationIssue;

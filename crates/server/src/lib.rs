//! HTTP service for tester reminder campaigns.
//!
//! Holds the single active campaign in process-lifetime state, fires a
//! daily cron trigger in the campaign's timezone, and exposes a small API
//! to configure, inspect, trigger, and stop the campaign.

pub mod api;
pub mod app_config;
pub mod router;
pub mod schedule;
pub mod state;

//! Application jobs launchers.
//!
//! The main application setup has only two main stages:
//!
//! 1. Setup the domain layer: the [`Seeder`](crate::core::Seeder) context.
//! 2. Launch all the application services as concurrent jobs.
//!
//! This module contains all the functions needed to start those jobs:
//!
//! - [`seeding`]: one job per configured source.
//! - [`stats_flush`]: persists the uploaded bytes on an interval.
//! - [`health_monitor`]: re-announces under-peered swarms on an interval.
//!
//! Every job receives a [`ShutdownSignal`](crate::shutdown::ShutdownSignal)
//! and ends soon after the shutdown is triggered.
pub mod health_monitor;
pub mod seeding;
pub mod stats_flush;

//! Seeder application bootstrapping.
//!
//! This module includes all the functions to build the application, its
//! dependencies, and run the jobs.
//!
//! Jobs are tasks executed concurrently: one per configured source plus the
//! two periodic jobs, the stats flush and the health monitor.
pub mod app;
pub mod config;
pub mod jobs;
pub mod logging;

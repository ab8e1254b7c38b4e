//! # Shift planning engine
//!
//! Tenant-scoped staff scheduling: employees are assigned shifts on dates,
//! subject to working days, public holidays, approved leaves and recovery
//! days. On top of plain planning the crate generates work/rest rotations,
//! manages replacements between employees, imports plannings from CSV and
//! reports labour-law alerts.
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`models`]: Domain entities, typed identifiers and calendar helpers
//! - [`db`]: Repository traits and the in-memory backend
//! - [`services`]: Planning rules (exclusion chain, rotation, alerts, replacements, import)
//! - [`routes`]: Request/response types and route paths
//! - [`api`]: Consolidated public DTO surface
//! - [`config`]: TOML configuration
//! - [`http`]: Axum-based HTTP server and request handlers
//!

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;
pub mod config;

pub mod db;
pub mod models;

pub mod routes;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;

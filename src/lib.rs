//! Lead Relay Library
//!
//! Validates loan-lead form submissions against the partner's field schema,
//! relays them to the partner lead API and normalizes its answer. Also issues
//! and redeems encrypted redirect tokens.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and shared state.
//! - `lead_client`: Partner lead API client.
//! - `models`: Submission and upstream data models.
//! - `relay`: Relay workflow and outcome mapping.
//! - `routes`: Router and shared middleware.
//! - `token`: Redirect token codec.
//! - `validation`: Partner field schema.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod lead_client;
pub mod models;
pub mod relay;
pub mod routes;
pub mod token;
pub mod validation;

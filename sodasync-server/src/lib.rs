//! HTTP trigger service for the crime records sync pipeline.
//!
//! Exposes a small REST surface: a health check and an endpoint that kicks off
//! one incremental sync run against the configured source and destination.

pub mod config;
pub mod routes;
pub mod startup;

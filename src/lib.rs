//! Travel-plan agent: accepts trip requests over HTTP, turns them into a
//! narrative travel plan and a budget range through chained and ensembled
//! LLM calls, and persists the finished records to `SQLite`.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(unused_must_use)]
#![deny(non_snake_case)]
#![deny(non_camel_case_types)]
#![warn(clippy::all)]

/// Environment-driven configuration, read once at startup.
pub mod config;
/// Plan generation pipeline: prompt chaining and budget ensembling.
pub mod pipeline;
/// Domain types for trips, plans, and budget ranges.
pub mod plan;
/// Generative text provider clients.
pub mod providers;
/// HTTP server and API routes.
pub mod server;
/// Entry helpers to start the agent server.
pub mod startup;
/// Plan persistence.
pub mod storage;

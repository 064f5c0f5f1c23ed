//! Core library for atlasmcp
//!
//! This crate implements the **Functional Core** of the atlasmcp application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The atlasmcp project uses a two-crate architecture to enforce separation of concerns:
//!
//! - **`atlasmcp_core`** (this crate): Pure request builders, projections and error classification
//! - **`atlasmcp`**: HTTP sessions, tool dispatch and the MCP server (the Imperative Shell)
//!
//! ## Functional Core Principles
//!
//! All functions in this crate adhere to these principles:
//!
//! - **Pure functions**: Same input always produces the same output
//! - **No side effects**: No network access, no environment reads, no logging
//! - **Testable**: Can be tested with fixture data, no mock servers required
//!
//! # Module Organization
//!
//! - [`config`]: Service configuration resolved from an environment-like source
//! - [`error`]: The error taxonomy shared by every layer
//! - [`http`]: Request envelopes, URL joining and HTTP status classification
//! - [`atlassian`]: Jira and Confluence payload builders and response projections
//! - [`envelope`]: The JSON envelope returned to tool callers
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use atlasmcp_core::atlassian::confluence::build_cql;
//!
//! assert_eq!(build_cql("hello"), "siteSearch ~ \"hello\"");
//! assert_eq!(build_cql("space = DEV"), "space = DEV");
//! ```

pub mod atlassian;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;

pub use error::{Error, ErrorKind};

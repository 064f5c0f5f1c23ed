/// Atlassian-related request builders and projections (Confluence, Jira)
///
/// This module contains pure functions for Atlassian products.
/// All functions are free of I/O operations and testable with fixture data.
pub mod confluence;
pub mod jira;

//! Core domain types
//!
//! Plain value holders describing what the harness drives on a Jenkins
//! deployment. They carry no connections; collaborators are passed to
//! probes explicitly.

pub mod agent;
pub mod job;

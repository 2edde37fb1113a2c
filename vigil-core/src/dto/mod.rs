//! Data Transfer Objects for the Jenkins REST API
//!
//! Lightweight views of the JSON documents Jenkins serves under
//! `.../api/json`, plus the request payloads the harness sends. Only the
//! fields the harness reads are modelled; unknown fields are ignored.

pub mod job;
pub mod node;
pub mod system;

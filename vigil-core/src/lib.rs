//! Vigil Core
//!
//! Core types and abstractions for the Vigil Jenkins system-test harness.
//!
//! This crate contains:
//! - Poll: the bounded polling engine used to wait on eventually-consistent systems
//! - Domain types: plain value holders (jobs, agents)
//! - DTOs: payloads exchanged with the Jenkins REST API

pub mod domain;
pub mod dto;
pub mod poll;

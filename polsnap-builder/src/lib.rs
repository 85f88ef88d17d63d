//! polsnap-builder library interface
//!
//! Exposes the field resolution and merge engine for the binary and for
//! integration tests.

pub mod config;
pub mod fusion;
pub mod models;
pub mod resolvers;
pub mod services;
pub mod sources;
pub mod validators;
pub mod workflow;

pub use crate::workflow::{Pipeline, PipelineConfig, RunContext, Sources};

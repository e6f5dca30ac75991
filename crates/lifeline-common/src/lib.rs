//! # lifeline-common
//!
//! Shared types for the Lifeline container notification pipeline.
//!
//! This crate provides functionality used across all Lifeline crates:
//! - Container and record ID validation and generation
//! - The entity, audit record and channel data model
//! - Standard data-directory paths
//! - The common error type

#![warn(missing_docs)]

pub mod error;
pub mod id;
pub mod model;
pub mod paths;

pub use error::{LifelineError, LifelineResult};
pub use id::{ContainerId, RecordId};
pub use model::{
    Entity, EventRecord, EventStatus, EventType, LifecycleState, NotificationChannel, Preferences,
};
pub use paths::LifelinePaths;

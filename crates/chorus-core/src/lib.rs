//! # chorus-core
//!
//! Core types for the chorus music catalog audit log.
//!
//! This crate has no I/O. It provides:
//! - The `AuditRecord` row shape and its null-polarity classification
//! - Tracked catalog entities with static field manifests (`Tracked`)
//! - Pure change-capture diffing from entity snapshots to `Mutation`s
//! - Single-entity replay of an audit history
//! - Timeline event types and the date window used by history reconstruction
//! - A `Clock` abstraction so timestamps can be driven by tests
//! - Cross-cutting error types

pub mod audit;
pub mod capture;
pub mod clock;
pub mod entities;
pub mod errors;
pub mod replay;
pub mod timeline;
pub mod tracked;

//! Update builder types for catalog mutations.
//!
//! Each builder produces an update struct with `Option` fields. Only `Some`
//! fields are applied; unchanged values produce no audit rows.

pub mod song;
pub mod user;

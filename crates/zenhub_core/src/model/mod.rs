//! Hub domain model.
//!
//! # Responsibility
//! - Define the catalog cards and their stable ids.
//! - Build the catalog once per hub session.
//!
//! # Invariants
//! - Every card is identified by an `ActivityId` in `1..=99`.
//! - Cards never change after the catalog is built.

pub mod activity;
pub mod catalog;

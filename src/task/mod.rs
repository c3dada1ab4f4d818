//! Task lifecycle and ordering for the one-task-at-a-time list.
//!
//! Tasks move from pending to completed, from completed into the bin, and
//! from the bin back to pending or out of existence. Pending tasks form a
//! per-owner order whose head is the current task; skipping rotates the head
//! to the tail. Every operation is scoped to the owning account. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

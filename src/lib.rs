//! Onetask: a to-do list that shows one task at a time.
//!
//! This crate provides the task lifecycle and ordering engine behind the
//! list: persisted tasks, their completion and bin states, and the pending
//! order whose head is the task the user sees.
//!
//! # Architecture
//!
//! Onetask follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, memory)
//!
//! # Modules
//!
//! - [`task`]: Task lifecycle, ordering, and storage
//! - [`config`]: File and environment configuration

pub mod config;
pub mod task;

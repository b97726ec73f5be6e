//! # trellis-std
//!
//! The routing machinery of trellis, built on the traits in `trellis-core`.
//!
//! This crate provides:
//! - **Pattern compiler**: [`compile`] turns `/user/{id}`-style patterns into
//!   [`CompiledPattern`]s, rejecting malformed ones up front
//! - **Route table**: [`RouteTable`], a per-method segment trie with
//!   literal > constrained param > param > wildcard precedence and
//!   backtracking
//! - **Router**: [`Router`], with scoped middleware, groups, sub-routers and
//!   mounting
//! - **Standard middleware**: [`middleware`]
//! - **Test helpers**: [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use trellis_core;

// Modules
pub mod config;
pub mod middleware;
pub mod pattern;
pub mod router;
pub mod testing;
pub mod tree;

pub use config::RouterConfig;
pub use pattern::{CompiledPattern, Segment, compile};
pub use router::{AllowedMethods, Router};
pub use tree::{Lookup, RouteTable};

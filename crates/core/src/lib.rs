//! Yotech Quote Core - Shared types library.
//!
//! This crate provides the types shared by every Yotech Quote component:
//! - `quote` - Cart store, storage backends, catalog, and export
//! - `cli` - Command-line front end for building and exporting quotes
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no storage,
//! no clocks. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Line item identities, prices, line items, and slugs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

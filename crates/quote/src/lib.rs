//! Yotech Quote library.
//!
//! This crate holds the quote cart and everything around it: the slot
//! stores it persists to, the catalog it is filled from, the per-category
//! selection cache, the table view, and CSV export.
//!
//! Start from [`state::QuoteContext`] and call
//! [`open_cart`](state::QuoteContext::open_cart) once per tab.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod persisted;
pub mod selection;
pub mod state;
pub mod storage;
pub mod view;

pub use cart::{QuoteCart, SaveStatus};
pub use error::{QuoteError, Result};
pub use state::QuoteContext;

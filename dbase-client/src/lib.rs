//! Deta Base client library
//!
//! This crate provides an async Rust client for Deta Base. Single logical
//! operations (put many records, fetch many keys, delete many keys, scan a
//! whole Base) are decomposed into concurrent HTTP calls and their results
//! merged into one response.

pub mod error;
pub mod config;
pub mod transport;
pub mod fanout;
pub mod client;
pub mod base;
pub mod fetch;
mod batch;
mod delete;
mod insert;
mod query;
mod scan;
mod update;

// Re-export key types
pub use base::Base;
pub use client::{Deta, PROJECT_KEY_ENV};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use fetch::{KeyedFetch, Lookup};
pub use transport::{Headers, Method, ReqwestTransport, Request, Response, Transport, SUCCESS_FAMILY};
pub use dbase_core::{BatchResult, Item, Paging, Query, QueryPage, QueryRequest, Record, Updater};

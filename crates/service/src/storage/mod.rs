//! Storage abstractions for service layer
//!
//! Contains the reusable file-backed sequence store so domain stores that
//! persist ordered collections as JSON share one implementation.

pub mod json_seq_store;

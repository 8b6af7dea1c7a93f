//! Core types shared across the SmartCompare crates
//!
//! This crate provides the foundational types used by the comparison engine,
//! its error facility and its logging facility:
//!
//! - **Correlation types**: ComparisonId, used to tie together every log event
//!   emitted while one pair of object graphs is compared
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::ComparisonId;

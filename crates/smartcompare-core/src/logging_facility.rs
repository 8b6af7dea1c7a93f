//! Structured logging for comparisons
//!
//! One `init(profile)` call per process installs the subscriber. The engine
//! reports each comparison through the `log_op_start!`, `log_op_end!` and
//! `log_op_error!` macros so every run yields exactly one start event and one
//! terminal event, both tagged with the run's `comparison_id`.
//!
//! ```rust
//! use smartcompare_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```
//!
//! Tests install the in-memory capture layer instead, via
//! [`init_test_capture`], and assert on the recorded events.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};

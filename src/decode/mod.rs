//! Decode module
//!
//! Turns raw listing-endpoint bodies into typed [`Page`]s.
//!
//! # Overview
//!
//! The upstream body is a JSON object with a `results` array of item objects
//! and an optional `next_url` continuation. Decoding is pure: the same body
//! always yields the same records and cursor.

mod page;

pub use page::{parse_page, Page};

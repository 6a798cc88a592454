//! Report output.
//!
//! # Submodules
//!
//! - [`json`]: Writes an aggregated [`crate::models::FeedReport`] to disk
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2026-10-18/
//!     ├── latest_morning.json
//!     └── monsoon-floods_evening.json
//! ```

pub mod json;

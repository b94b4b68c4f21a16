//! Output generation.
//!
//! # Submodules
//!
//! - [`json`]: Writes the final [`Report`](crate::report::Report) to a dated JSON file
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     └── tesla.json
//! ```
//!
//! Without an output directory the binary prints the report to stdout instead.

pub mod json;

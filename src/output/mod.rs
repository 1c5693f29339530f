//! Report output
//!
//! The text report goes to stdout; the JSON report goes to a file when
//! `--json` is given.

pub mod json;
pub mod text;

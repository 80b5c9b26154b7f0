//! Text manipulation utilities.
//!
//! This module provides utilities for working with line-addressed text:
//! - Line counting and newline normalization for edit content
//! - Column mapping between 1-based character columns and byte offsets

pub mod lines;
pub mod position;

pub use lines::{count_lines, insertion_text, replacement_text};
pub use position::{column_to_byte_in_line, max_column};

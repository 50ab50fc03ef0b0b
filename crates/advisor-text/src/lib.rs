//! Advisor Text: size-bounded chunking for the semantic index
//!
//! Flattened recommendation text is cut into lines, then lines are grouped
//! into paragraphs, each bounded by an approximate token count so a single
//! memory record stays within the embedding model's input limit.
//!
//! # Example
//!
//! ```
//! use advisor_text::{split_lines, split_paragraphs};
//!
//! let lines = split_lines("a b c\nd e", 2);
//! assert_eq!(lines, vec!["a b", "c", "d e"]);
//!
//! let paragraphs = split_paragraphs(&lines, 3);
//! assert_eq!(paragraphs, vec!["a b\nc", "d e"]);
//! ```

pub mod chunker;

pub use chunker::{count_units, split_lines, split_paragraphs};

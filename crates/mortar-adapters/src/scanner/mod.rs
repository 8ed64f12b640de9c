//! Marker scanning.
//!
//! [`RegexScanner`] locates delimited regions; [`body`] parses what is
//! between the delimiters into a name, arguments and filters.

pub mod body;
mod pattern;

pub use pattern::RegexScanner;

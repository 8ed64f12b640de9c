//! Infrastructure adapters for Mortar.
//!
//! This crate implements the ports defined in `mortar_core::application::ports`:
//! the regex marker scanner, the standard blocks and filters, template
//! loaders, a `tracing` listener, and directory rendering.

pub mod blocks;
pub mod filters;
pub mod listener;
pub mod loader;
pub mod scanner;
pub mod tree;

// Re-export commonly used adapters
pub use blocks::standard_blocks;
pub use filters::standard_filters;
pub use listener::TracingListener;
pub use loader::{FileLoader, MemoryLoader};
pub use scanner::RegexScanner;
pub use tree::{FileOutcome, FileReport, TreeReport, render_tree};

use mortar_core::{
    application::{Engine, EngineBuilder},
    error::MortarResult,
};

/// Builder preloaded with the regex scanner, standard blocks and standard
/// filters. Delimiters, policy, values and listeners are still open.
pub fn standard_builder() -> EngineBuilder {
    Engine::builder()
        .scanner(Box::new(RegexScanner::new()))
        .blocks(standard_blocks())
        .filters(standard_filters())
}

/// Engine with default delimiters and every standard block and filter.
pub fn standard_engine() -> MortarResult<Engine> {
    standard_builder().build()
}

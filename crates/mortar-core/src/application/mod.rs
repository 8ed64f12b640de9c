//! Application layer for Mortar.
//!
//! This layer contains:
//! - **Engine**: the marker-resolution driver and its configuration
//! - **Registries**: block handlers and filters, looked up by name
//! - **Ports**: traits for the scanner, loaders, listeners and extensions
//! - **Services**: load-then-render entry points
//! - **Errors**: application-specific error types
//!
//! The engine knows nothing about loops, conditionals or string transforms.
//! Those are supplied through the extension ports.

mod block_stack;
mod driver;

pub mod engine;
pub mod error;
pub mod events;
pub mod filter_pipeline;
pub mod ports;
pub mod registry;
pub mod services;

pub use engine::{Engine, EngineBuilder};
pub use error::ApplicationError;
pub use events::{BlockInfo, EngineEvent, EventLog, Rendered};
pub use filter_pipeline::{FilterFailure, FilterRegistry};
pub use registry::BlockRegistry;
pub use services::RenderService;

// Re-export port traits (for adapter implementation)
pub use ports::{
    ArgumentError, BlockHandler, Disposition, EndContext, EngineListener, Filter, FnFilter,
    MarkerScanner, Opening, StartContext, TemplateLoader,
};

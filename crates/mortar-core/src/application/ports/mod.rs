//! Application ports (traits) for external collaborators.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `mortar-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by the engine, implemented by infrastructure
//!   - `MarkerScanner`: locates markers in template text
//!   - `TemplateLoader`: fetches template text from paths/URLs
//!   - `EngineListener`: receives lifecycle notifications
//!
//! - **Extension Ports**: Pluggable semantics looked up by name at dispatch time
//!   - `BlockHandler`: control-flow blocks and inline markers
//!   - `Filter`: value transforms

pub mod extensions;
pub mod output;

pub use extensions::{
    ArgumentError, BlockHandler, Disposition, EndContext, Filter, FnFilter, Opening, StartContext,
};
pub use output::{EngineListener, MarkerScanner, TemplateLoader};

//! Mortar Core - marker-resolution template engine.
//!
//! This crate provides the domain and application layers of Mortar, following
//! hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           mortar-cli (CLI)              │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     Engine / RenderService              │
//! │  scan loop, block stack, filter chain   │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │  MarkerScanner, BlockHandler, Filter,   │
//! │  TemplateLoader, EngineListener         │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    mortar-adapters (Infrastructure)     │
//! │  RegexScanner, for/if/set, filters,     │
//! │  FileLoader, TracingListener            │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mortar_core::prelude::*;
//! # fn scanner() -> Box<dyn MarkerScanner> { unimplemented!() }
//!
//! let mut engine = Engine::builder().scanner(scanner()).build()?;
//! engine.set("site", "example.org");
//!
//! let rendered = engine.process("Hello {{ name }}!", frame([("name", "World")]))?;
//! assert_eq!(rendered.output, "Hello World!");
//! # Ok::<(), MortarError>(())
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ArgumentError, BlockHandler, BlockInfo, Disposition, EndContext, Engine, EngineBuilder,
        EngineEvent, EngineListener, EventLog, Filter, FnFilter, MarkerScanner, Opening,
        RenderService, Rendered, StartContext, TemplateLoader,
    };
    pub use crate::domain::{
        Delimiters, ErrorPolicy, FilterSpec, Frame, MalformedMarker, Marker, MarkerKind,
        RenderError, RenderErrorKind, ScanResult, Scope, Span, Value, frame,
    };
    pub use crate::error::{MortarError, MortarResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

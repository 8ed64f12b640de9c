//! Application services - orchestrate use cases.
//!
//! Services pair the engine with the ports it needs for a use case, such
//! as "load this file, then render it".

pub mod render_service;

pub use render_service::RenderService;

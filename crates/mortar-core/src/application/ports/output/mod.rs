//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the engine needs from external systems.
//! The `mortar-adapters` crate provides implementations.

use std::path::Path;

use crate::application::{ApplicationError, events::BlockInfo};
use crate::domain::{Delimiters, RenderError, ScanResult, Span};
use crate::error::MortarResult;

/// Port for locating markers in template text.
///
/// Implemented by:
/// - `mortar_adapters::scanner::RegexScanner` (production)
///
/// ## Contract
///
/// - `configuration_changed` is called at least once at the start of every
///   `process` call, before any `next_marker` call, even if the delimiters
///   did not change since the previous call.
/// - `next_marker` returns the first marker whose span starts at or after
///   `from`. Spans are byte offsets into `template` and must be non-empty.
///   The engine ignores results that would not advance past `from`.
/// - `find_literal_end` looks for the closing tag of a literal region only.
///   No other marker is recognised inside the region, balanced or not.
#[cfg_attr(test, mockall::automock)]
pub trait MarkerScanner: Send + Sync {
    /// Adopt the engine's current delimiters.
    fn configuration_changed(&mut self, delimiters: &Delimiters) -> MortarResult<()>;

    /// Find the next marker at or after `from`, or `None` when the rest of
    /// the template is plain text.
    fn next_marker(&self, template: &str, from: usize) -> Option<ScanResult>;

    /// Span of the first `marker_start literal_end marker_end` tag at or
    /// after `from`, whitespace allowed on both sides of the name.
    ///
    /// `delimiters` are the ones last passed to `configuration_changed`.
    fn find_literal_end(
        &self,
        template: &str,
        from: usize,
        delimiters: &Delimiters,
    ) -> Option<Span> {
        let open = delimiters.marker_start.as_str();
        let mut search = from;
        while let Some(offset) = template.get(search..)?.find(open) {
            let start = search + offset;
            let body = &template[start + open.len()..];
            let tail = body
                .trim_start()
                .strip_prefix(delimiters.literal_end.as_str())
                .map(str::trim_start)
                .filter(|tail| tail.starts_with(delimiters.marker_end.as_str()));
            if let Some(tail) = tail {
                let end = template.len() - tail.len() + delimiters.marker_end.len();
                return Some(Span::new(start, end));
            }
            search = start + open.len();
        }
        None
    }
}

/// Port for fetching template text before processing.
///
/// Implemented by:
/// - `mortar_adapters::loader::FileLoader` (local filesystem, `file://` URLs)
/// - `mortar_adapters::loader::MemoryLoader` (testing, embedded templates)
#[cfg_attr(test, mockall::automock)]
pub trait TemplateLoader: Send + Sync {
    /// Load template text from a filesystem-like path.
    fn load_path(&self, path: &Path) -> MortarResult<String>;

    /// Load template text from a URL. Loaders without URL support reject
    /// every URL.
    fn load_url(&self, url: &str) -> MortarResult<String> {
        Err(ApplicationError::UnsupportedScheme { url: url.into() }.into())
    }
}

/// Port for lifecycle notifications.
///
/// Every method has a no-op default, so a listener implements only the
/// events it cares about. Methods take `&self`: listeners that record
/// state use interior mutability.
#[cfg_attr(test, mockall::automock)]
pub trait EngineListener: Send + Sync {
    /// A block was opened (or an else-chain segment re-opened).
    fn block_started(&self, _info: &BlockInfo) {}

    /// A block (or segment) was closed by a matching end marker.
    fn block_ended(&self, _info: &BlockInfo) {}

    /// A `process` call finished, whether or not it halted.
    fn finished(&self) {}

    /// A problem was found in the template. `error.continuing` tells
    /// whether processing carried on.
    fn error_encountered(&self, _error: &RenderError) {}
}

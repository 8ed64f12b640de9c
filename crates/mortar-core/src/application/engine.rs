//! The template engine.
//!
//! An [`Engine`] owns everything that outlives a single `process` call: the
//! delimiters, the error policy, persistent values, the block and filter
//! registries, the marker scanner, and the registered listeners. Each call
//! gets its own cursor, output buffer, block stack and scope (see
//! `driver.rs`).

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::driver::Run;
use crate::application::events::Rendered;
use crate::application::filter_pipeline::FilterRegistry;
use crate::application::ports::{
    ArgumentError, BlockHandler, EngineListener, Filter, FnFilter, MarkerScanner,
};
use crate::application::registry::BlockRegistry;
use crate::domain::{Delimiters, DomainError, ErrorPolicy, Frame, Value};
use crate::error::{MortarError, MortarResult};

/// Marker-resolution engine.
///
/// Not internally synchronized: `process` takes `&mut self`, so callers
/// sharing an engine across threads wrap it in a `Mutex`.
pub struct Engine {
    delimiters: Delimiters,
    policy: ErrorPolicy,
    persistent: Frame,
    blocks: BlockRegistry,
    filters: FilterRegistry,
    scanner: Box<dyn MarkerScanner>,
    listeners: Vec<Arc<dyn EngineListener>>,
}

impl Engine {
    /// Engine with default delimiters and policy and empty registries.
    pub fn new(scanner: Box<dyn MarkerScanner>) -> Self {
        Self {
            delimiters: Delimiters::default(),
            policy: ErrorPolicy::default(),
            persistent: Frame::new(),
            blocks: BlockRegistry::new(),
            filters: FilterRegistry::new(),
            scanner,
            listeners: Vec::new(),
        }
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    // ── Configuration ─────────────────────────────────────────────────────────

    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    /// Changes take effect at the start of the next `process` call.
    pub fn delimiters_mut(&mut self) -> &mut Delimiters {
        &mut self.delimiters
    }

    pub fn set_delimiters(&mut self, delimiters: Delimiters) {
        self.delimiters = delimiters;
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    pub fn policy_mut(&mut self) -> &mut ErrorPolicy {
        &mut self.policy
    }

    pub fn set_policy(&mut self, policy: ErrorPolicy) {
        self.policy = policy;
    }

    // ── Persistent values ─────────────────────────────────────────────────────

    /// Bind a value visible to every later `process` call.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.persistent.insert(name.into(), value.into());
    }

    /// Bind several persistent values at once.
    pub fn extend<K, V, I>(&mut self, values: I)
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.persistent
            .extend(values.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.persistent.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.persistent.remove(name)
    }

    pub fn persistent(&self) -> &Frame {
        &self.persistent
    }

    // ── Extensions ────────────────────────────────────────────────────────────

    /// Register a block handler under all of its names.
    ///
    /// The literal-region names are reserved.
    pub fn register_block(&mut self, handler: Arc<dyn BlockHandler>) -> MortarResult<()> {
        if let Some(reserved) = handler.names().iter().find(|n| {
            **n == self.delimiters.literal_start || **n == self.delimiters.literal_end
        }) {
            return Err(DomainError::ReservedBlockName {
                name: (*reserved).to_owned(),
            }
            .into());
        }
        self.blocks.register(handler)?;
        Ok(())
    }

    pub fn register_filter(&mut self, filter: Arc<dyn Filter>) {
        self.filters.register(filter);
    }

    /// Register a closure as a single-name filter.
    pub fn register_filter_fn<F>(&mut self, name: &'static str, apply: F)
    where
        F: Fn(Value, &[String]) -> Result<Value, ArgumentError> + Send + Sync + 'static,
    {
        self.filters.register(Arc::new(FnFilter::new(name, apply)));
    }

    pub fn add_listener(&mut self, listener: Arc<dyn EngineListener>) {
        self.listeners.push(listener);
    }

    pub fn blocks(&self) -> &BlockRegistry {
        &self.blocks
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    pub(crate) fn scanner(&self) -> &dyn MarkerScanner {
        self.scanner.as_ref()
    }

    pub(crate) fn listeners(&self) -> &[Arc<dyn EngineListener>] {
        &self.listeners
    }

    // ── Processing ────────────────────────────────────────────────────────────

    /// Resolve every marker in `template`.
    ///
    /// Problems in the template itself never produce `Err`: they are listed
    /// in [`Rendered::errors`] next to the best-effort output. `Err` means the
    /// engine could not start (invalid delimiters, scanner setup failure).
    #[instrument(skip_all, fields(template_len = template.len(), variables = variables.len()))]
    pub fn process(&mut self, template: &str, variables: Frame) -> MortarResult<Rendered> {
        self.delimiters.validate()?;
        self.scanner.configuration_changed(&self.delimiters)?;

        let rendered = Run::new(self, template, variables).execute();
        debug!(
            output_len = rendered.output.len(),
            errors = rendered.errors.len(),
            halted = rendered.halted,
            "Template processed"
        );
        Ok(rendered)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("delimiters", &self.delimiters)
            .field("policy", &self.policy)
            .field("persistent", &self.persistent)
            .field("blocks", &self.blocks)
            .field("filters", &self.filters)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Step-by-step [`Engine`] construction.
///
/// ```rust,no_run
/// use mortar_core::prelude::*;
/// # fn scanner() -> Box<dyn MarkerScanner> { unimplemented!() }
///
/// let engine = Engine::builder()
///     .scanner(scanner())
///     .policy(ErrorPolicy::lenient())
///     .value("site", "example.org")
///     .build()?;
/// # Ok::<(), MortarError>(())
/// ```
#[derive(Default)]
pub struct EngineBuilder {
    scanner: Option<Box<dyn MarkerScanner>>,
    delimiters: Delimiters,
    policy: ErrorPolicy,
    persistent: Frame,
    blocks: Vec<Arc<dyn BlockHandler>>,
    filters: Vec<Arc<dyn Filter>>,
    listeners: Vec<Arc<dyn EngineListener>>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scanner(mut self, scanner: Box<dyn MarkerScanner>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    pub fn delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    pub fn policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.persistent.insert(name.into(), value.into());
        self
    }

    pub fn values(mut self, values: Frame) -> Self {
        self.persistent.extend(values);
        self
    }

    pub fn block(mut self, handler: Arc<dyn BlockHandler>) -> Self {
        self.blocks.push(handler);
        self
    }

    pub fn blocks(mut self, handlers: impl IntoIterator<Item = Arc<dyn BlockHandler>>) -> Self {
        self.blocks.extend(handlers);
        self
    }

    pub fn filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn filters(mut self, filters: impl IntoIterator<Item = Arc<dyn Filter>>) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn listener(mut self, listener: Arc<dyn EngineListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Validate and assemble the engine.
    ///
    /// # Errors
    ///
    /// - No scanner was given
    /// - The delimiters are invalid
    /// - A block handler is nameless, duplicated, or uses a reserved name
    pub fn build(self) -> MortarResult<Engine> {
        let scanner = self.scanner.ok_or_else(|| MortarError::Configuration {
            message: "no marker scanner configured".into(),
        })?;
        self.delimiters.validate()?;

        let mut engine = Engine::new(scanner);
        engine.delimiters = self.delimiters;
        engine.policy = self.policy;
        engine.persistent = self.persistent;
        for handler in self.blocks {
            engine.register_block(handler)?;
        }
        for filter in self.filters {
            engine.register_filter(filter);
        }
        engine.listeners = self.listeners;
        Ok(engine)
    }
}

impl std::fmt::Debug for EngineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineBuilder")
            .field("scanner", &self.scanner.is_some())
            .field("delimiters", &self.delimiters)
            .field("policy", &self.policy)
            .field("blocks", &self.blocks.len())
            .field("filters", &self.filters.len())
            .finish_non_exhaustive()
    }
}

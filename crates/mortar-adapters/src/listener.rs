//! Listener that forwards engine notifications to `tracing`.

use tracing::{debug, error, warn};

use mortar_core::{
    application::{BlockInfo, ports::EngineListener},
    domain::RenderError,
};

/// Logs block events at debug level and render errors at warn (continuing)
/// or error (halting) level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingListener;

impl TracingListener {
    pub fn new() -> Self {
        Self
    }
}

impl EngineListener for TracingListener {
    fn block_started(&self, info: &BlockInfo) {
        debug!(
            block = %info.name,
            args = ?info.args,
            span = %info.span,
            closing = ?info.closing_names,
            "Block started"
        );
    }

    fn block_ended(&self, info: &BlockInfo) {
        debug!(block = %info.name, span = %info.span, "Block ended");
    }

    fn finished(&self) {
        debug!("Processing finished");
    }

    fn error_encountered(&self, e: &RenderError) {
        if e.continuing {
            warn!(kind = %e.kind, span = %e.span, "{}", e.message);
        } else {
            error!(kind = %e.kind, span = %e.span, "{}", e.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standard_builder;
    use mortar_core::domain::frame;
    use std::sync::Arc;

    #[test]
    fn listener_observes_a_full_render() {
        let mut engine = standard_builder()
            .listener(Arc::new(TracingListener::new()))
            .build()
            .unwrap();

        let rendered = engine
            .process(
                "{% if flag %}yes{% endif %}{{ missing }}",
                frame([("flag", true)]),
            )
            .unwrap();

        assert_eq!(rendered.output, "yes");
        assert_eq!(rendered.errors.len(), 1);
    }
}

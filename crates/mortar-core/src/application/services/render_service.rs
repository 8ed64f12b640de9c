//! Render Service - load-then-process entry points.
//!
//! The engine only ever sees template text. This service resolves paths and
//! URLs through a [`TemplateLoader`] first. Loading failures are
//! `MortarError`s; problems inside the loaded template are reported in
//! [`Rendered::errors`] like any other `process` call.

use std::path::Path;

use tracing::{info, instrument};

use crate::{
    application::{Engine, events::Rendered, ports::TemplateLoader},
    domain::Frame,
    error::MortarResult,
};

/// Engine plus template loader.
pub struct RenderService {
    engine: Engine,
    loader: Box<dyn TemplateLoader>,
}

impl RenderService {
    pub fn new(engine: Engine, loader: Box<dyn TemplateLoader>) -> Self {
        Self { engine, loader }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn into_engine(self) -> Engine {
        self.engine
    }

    /// Render template text directly.
    pub fn render(&mut self, template: &str, variables: Frame) -> MortarResult<Rendered> {
        self.engine.process(template, variables)
    }

    /// Load a template from `path`, then render it.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn render_path(
        &mut self,
        path: impl AsRef<Path>,
        variables: Frame,
    ) -> MortarResult<Rendered> {
        let template = self.loader.load_path(path.as_ref())?;
        info!(bytes = template.len(), "Template loaded");
        self.engine.process(&template, variables)
    }

    /// Load a template from `url`, then render it.
    #[instrument(skip_all, fields(url = %url))]
    pub fn render_url(&mut self, url: &str, variables: Frame) -> MortarResult<Rendered> {
        let template = self.loader.load_url(url)?;
        info!(bytes = template.len(), "Template loaded");
        self.engine.process(&template, variables)
    }
}

impl std::fmt::Debug for RenderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderService")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ApplicationError;
    use crate::application::ports::output::{MockMarkerScanner, MockTemplateLoader};
    use crate::error::MortarError;
    use mockall::predicate::eq;
    use std::path::PathBuf;

    /// A scanner that never finds a marker: every template is plain text.
    fn plain_text_scanner() -> Box<MockMarkerScanner> {
        let mut scanner = MockMarkerScanner::new();
        scanner.expect_configuration_changed().returning(|_| Ok(()));
        scanner.expect_next_marker().returning(|_, _| None);
        Box::new(scanner)
    }

    #[test]
    fn render_path_loads_then_processes() {
        let mut loader = MockTemplateLoader::new();
        loader
            .expect_load_path()
            .with(eq(PathBuf::from("greeting.txt")))
            .times(1)
            .returning(|_| Ok("hello there".into()));

        let mut service = RenderService::new(Engine::new(plain_text_scanner()), Box::new(loader));
        let rendered = service
            .render_path("greeting.txt", Frame::new())
            .unwrap();

        assert_eq!(rendered.output, "hello there");
        assert!(rendered.is_clean());
    }

    #[test]
    fn load_failure_is_an_error_not_a_render_problem() {
        let mut loader = MockTemplateLoader::new();
        loader.expect_load_url().returning(|url| {
            Err(ApplicationError::UnsupportedScheme { url: url.into() }.into())
        });

        let mut service = RenderService::new(Engine::new(plain_text_scanner()), Box::new(loader));
        let err = service
            .render_url("https://example.org/t", Frame::new())
            .unwrap_err();

        assert!(matches!(
            err,
            MortarError::Application(ApplicationError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn render_uses_engine_directly() {
        let loader = MockTemplateLoader::new();
        let mut service = RenderService::new(Engine::new(plain_text_scanner()), Box::new(loader));

        assert_eq!(service.render("", Frame::new()).unwrap().output, "");
        assert_eq!(service.engine().policy(), Default::default());
    }
}

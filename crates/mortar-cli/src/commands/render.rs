//! `mortar render`: render one template to stdout or a file.

use std::{
    fs,
    io::{self, Read},
    path::Path,
    sync::Arc,
};

use tracing::{info, instrument};

use mortar_adapters::FileLoader;
use mortar_core::application::{EventLog, Rendered, ports::TemplateLoader};

use crate::{
    cli::RenderArgs,
    commands::{collect_vars, engine_builder},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

const STDIN_NAME: &str = "<stdin>";

#[instrument(skip_all)]
pub fn execute(args: RenderArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let (name, template) = read_template(args.template_path().map(|p| p.as_path()))?;
    let vars = collect_vars(&args.vars)?;

    let events = Arc::new(EventLog::new());
    let mut builder = engine_builder(&config, args.policy);
    if args.events {
        builder = builder.listener(events.clone());
    }
    let mut engine = builder.build()?;

    let rendered = engine.process(&template, vars)?;
    info!(
        template = %name,
        bytes = rendered.output.len(),
        errors = rendered.errors.len(),
        "Template rendered"
    );

    for event in events.take() {
        output.event(&event)?;
    }
    report(&name, &template, &rendered, &output)?;

    match &args.output {
        Some(path) => fs::write(path, &rendered.output)
            .with_cli_context(|| format!("Failed to write '{}'", path.display()))?,
        None => output.rendered(&rendered.output)?,
    }

    halting(&name, &rendered)
}

/// Read the template at `path`, or stdin when `path` is `None`.
pub(crate) fn read_template(path: Option<&Path>) -> CliResult<(String, String)> {
    match path {
        Some(path) => {
            let text = FileLoader::new().load_path(path)?;
            Ok((path.display().to_string(), text))
        }
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .with_cli_context(|| "Failed to read the template from stdin")?;
            Ok((STDIN_NAME.to_owned(), text))
        }
    }
}

/// Print every reported problem to stderr.
pub(crate) fn report(
    name: &str,
    template: &str,
    rendered: &Rendered,
    output: &OutputManager,
) -> CliResult<()> {
    for error in &rendered.errors {
        output.problem(name, template, error)?;
    }
    Ok(())
}

/// Fail when a halting problem was reported, including unclosed blocks
/// found at the end of the template.
pub(crate) fn halting(name: &str, rendered: &Rendered) -> CliResult<()> {
    match rendered.halting_error() {
        Some(error) => Err(CliError::RenderHalted {
            template: name.to_owned(),
            reason: error.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mortar_core::domain::{RenderError, RenderErrorKind, Span};

    #[test]
    fn continuing_errors_do_not_fail() {
        let rendered = Rendered {
            output: "x".into(),
            errors: vec![RenderError::new(
                RenderErrorKind::UnresolvedVariable,
                "'y' is not defined",
                Span::new(0, 7),
            )],
            halted: false,
        };
        assert!(halting("t", &rendered).is_ok());
    }

    #[test]
    fn unclosed_blocks_fail_with_exit_code_five() {
        let rendered = Rendered {
            output: String::new(),
            errors: vec![
                RenderError::new(RenderErrorKind::UnclosedBlock, "'for' never closed", Span::new(0, 5))
                    .halting(),
            ],
            halted: false,
        };
        let err = halting("page.tmpl", &rendered).unwrap_err();
        assert_eq!(err.exit_code(), 5);
        assert!(err.to_string().contains("page.tmpl"));
    }

    #[test]
    fn missing_template_maps_to_not_found() {
        let err = read_template(Some(Path::new("/definitely/not/here.tmpl"))).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}

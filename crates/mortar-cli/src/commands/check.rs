//! `mortar check`: process a template and report problems without writing
//! any rendered output.

use serde_json::json;
use tracing::instrument;

use crate::{
    cli::{CheckArgs, OutputFormat},
    commands::{
        collect_vars, engine_builder,
        render::{halting, read_template, report},
    },
    config::AppConfig,
    error::{CliError, CliResult},
    output::{OutputManager, problem_json},
};

#[instrument(skip_all, fields(template = %args.template.display()))]
pub fn execute(args: CheckArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let (name, template) = read_template(Some(args.template.as_path()))?;
    let vars = collect_vars(&args.vars)?;
    let mut engine = engine_builder(&config, args.policy).build()?;

    let rendered = engine.process(&template, vars)?;

    if output.format() == OutputFormat::Json {
        let problems: Vec<_> = rendered
            .errors
            .iter()
            .map(|e| problem_json(&template, e))
            .collect();
        output.json(&json!({
            "template": name,
            "halted": rendered.halting_error().is_some(),
            "errors": problems,
        }))?;
    } else {
        report(&name, &template, &rendered, &output)?;
    }

    halting(&name, &rendered)?;
    if !rendered.is_clean() {
        return Err(CliError::TemplateErrors {
            template: name,
            count: rendered.errors.len(),
        });
    }

    output.success(&format!("{name}: no problems found"))?;
    Ok(())
}

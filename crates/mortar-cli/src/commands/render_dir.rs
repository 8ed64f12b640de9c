//! `mortar render-dir`: render a directory tree.

use std::fs;

use serde_json::json;
use tracing::instrument;

use mortar_adapters::{FileOutcome, TreeReport, render_tree};

use crate::{
    cli::{OutputFormat, RenderDirArgs},
    commands::{collect_vars, engine_builder},
    config::AppConfig,
    error::{CliError, CliResult},
    output::{OutputManager, problem_json},
};

#[instrument(skip_all, fields(src = %args.src.display(), dst = %args.dst.display()))]
pub fn execute(args: RenderDirArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let vars = collect_vars(&args.vars)?;
    let mut engine = engine_builder(&config, args.policy).build()?;
    // Every file shares the command-line variables.
    engine.extend(vars);

    let report = render_tree(&mut engine, &args.src, &args.dst, &args.extension)?;

    if output.format() == OutputFormat::Json {
        output.json(&report_json(&args, &report))?;
    } else {
        for file in &report.files {
            if file.errors().is_empty() {
                continue;
            }
            let name = file.source.display().to_string();
            let template = fs::read_to_string(args.src.join(&file.source)).unwrap_or_default();
            for error in file.errors() {
                output.problem(&name, &template, error)?;
            }
        }
        output.success(&format!(
            "Rendered {} file(s), copied {} into {}",
            report.rendered(),
            report.copied(),
            args.dst.display()
        ))?;
        if report.error_count() > 0 {
            output.warning(&format!("{} template error(s) reported", report.error_count()))?;
        }
    }

    if report.any_halted() {
        return Err(CliError::RenderHalted {
            template: args.src.display().to_string(),
            reason: "at least one file stopped at a halting error".into(),
        });
    }
    Ok(())
}

fn report_json(args: &RenderDirArgs, report: &TreeReport) -> serde_json::Value {
    let files: Vec<_> = report
        .files
        .iter()
        .map(|file| {
            let template =
                fs::read_to_string(args.src.join(&file.source)).unwrap_or_default();
            json!({
                "source": file.source.display().to_string(),
                "target": file.target.display().to_string(),
                "action": match file.outcome {
                    FileOutcome::Rendered { .. } => "rendered",
                    FileOutcome::Copied => "copied",
                },
                "errors": file
                    .errors()
                    .iter()
                    .map(|e| problem_json(&template, e))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();

    json!({
        "src": args.src.display().to_string(),
        "dst": args.dst.display().to_string(),
        "rendered": report.rendered(),
        "copied": report.copied(),
        "files": files,
    })
}

//! Command handlers, one module per subcommand.
//!
//! Shared here: engine construction from configuration and the variable
//! sources (`--vars`, `--set`) used by every rendering command.

use std::{fs, path::Path, sync::Arc};

use tracing::debug;

use mortar_adapters::{TracingListener, standard_builder};
use mortar_core::{
    application::EngineBuilder,
    domain::{ErrorPolicy, Frame, Value, parse_literal},
};

use crate::{
    cli::{PolicyArgs, VarArgs},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
};

pub mod check;
pub mod completions;
pub mod config;
pub mod init;
pub mod list;
pub mod render;
pub mod render_dir;

/// Standard engine configured from `config`, with command-line policy
/// overrides applied and a tracing listener attached.
pub(crate) fn engine_builder(config: &AppConfig, policy: PolicyArgs) -> EngineBuilder {
    standard_builder()
        .delimiters(config.delimiters.clone())
        .policy(resolve_policy(config.policy, policy))
        .values(config.globals.clone())
        .listener(Arc::new(TracingListener::new()))
}

fn resolve_policy(configured: ErrorPolicy, flags: PolicyArgs) -> ErrorPolicy {
    if flags.strict {
        ErrorPolicy::strict()
    } else if flags.lenient {
        ErrorPolicy::lenient()
    } else {
        configured
    }
}

/// Merge every `--vars` file in order, then every `--set`.
pub(crate) fn collect_vars(args: &VarArgs) -> CliResult<Frame> {
    let mut vars = Frame::new();
    for path in &args.vars {
        vars.extend(read_vars_file(path)?);
    }
    for assignment in &args.set {
        let (name, value) = parse_assignment(assignment)?;
        vars.insert(name, value);
    }
    debug!(count = vars.len(), "Variables collected");
    Ok(vars)
}

fn read_vars_file(path: &Path) -> CliResult<Frame> {
    let text = fs::read_to_string(path)
        .with_cli_context(|| format!("Failed to read variables from '{}'", path.display()))?;
    let invalid = |reason: String| CliError::InvalidVarsFile {
        path: path.to_path_buf(),
        reason,
    };

    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&text).map_err(|e| invalid(e.to_string())),
        Some("json") | None => serde_json::from_str(&text).map_err(|e| invalid(e.to_string())),
        Some(other) => Err(invalid(format!(
            "unsupported extension '.{other}', expected .json or .toml"
        ))),
    }
}

/// `name=value`. The value is a literal when it parses as one, else a
/// plain string.
fn parse_assignment(assignment: &str) -> CliResult<(String, Value)> {
    let invalid = || CliError::InvalidAssignment {
        assignment: assignment.to_owned(),
    };
    let (name, raw) = assignment.split_once('=').ok_or_else(invalid)?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(invalid());
    }
    let value = parse_literal(raw).unwrap_or_else(|| Value::from(raw));
    Ok((name.to_owned(), value))
}

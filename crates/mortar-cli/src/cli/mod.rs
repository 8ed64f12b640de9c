//! CLI argument definitions using the clap derive API.
//!
//! Argument names, help text and value enums live here. No rendering logic.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name    = "mortar",
    bin_name = "mortar",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Marker-driven text templating",
    long_about = "Mortar renders text templates containing {{ expressions | filters }} \
                  and {% blocks %}, with configurable delimiters.",
    after_help = "EXAMPLES:\n\
        \x20 mortar render page.html.tmpl --vars site.json -o page.html\n\
        \x20 echo 'Hi {{ name | upper }}' | mortar render --set name=ada\n\
        \x20 mortar check page.html.tmpl --strict\n\
        \x20 mortar render-dir templates/ out/ --ext tmpl",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render one template to stdout or a file.
    #[command(
        visible_alias = "r",
        after_help = "EXAMPLES:\n\
            \x20 mortar render page.tmpl --set title=Home\n\
            \x20 mortar render page.tmpl --vars data.toml --output page.html\n\
            \x20 cat page.tmpl | mortar render - --events"
    )]
    Render(RenderArgs),

    /// Process a template and report every problem without writing output.
    #[command(after_help = "EXAMPLES:\n\
            \x20 mortar check page.tmpl\n\
            \x20 mortar check page.tmpl --strict --output-format json")]
    Check(CheckArgs),

    /// Render a directory tree, copying non-template files verbatim.
    #[command(
        name = "render-dir",
        after_help = "EXAMPLES:\n\
            \x20 mortar render-dir skeleton/ my-project/ --set name=my-project\n\
            \x20 mortar render-dir site/ public/ --ext mortar --vars site.json"
    )]
    RenderDir(RenderDirArgs),

    /// List the built-in blocks and filters.
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Write a default configuration file.
    #[command(after_help = "EXAMPLES:\n\
            \x20 mortar init           # default location\n\
            \x20 mortar init --local   # ./mortar.toml")]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(after_help = "EXAMPLES:\n\
            \x20 mortar completions bash > ~/.local/share/bash-completion/completions/mortar\n\
            \x20 mortar completions zsh  > ~/.zfunc/_mortar")]
    Completions(CompletionsArgs),

    /// Inspect the active configuration.
    #[command(subcommand)]
    Config(ConfigCommands),
}

// ── shared argument groups ────────────────────────────────────────────────────

/// Where template variables come from.
#[derive(Debug, Args, Default)]
pub struct VarArgs {
    /// JSON or TOML documents whose top-level tables become variables.
    /// Later files override earlier ones.
    #[arg(long = "vars", value_name = "FILE", help = "Variables file (.json or .toml)")]
    pub vars: Vec<PathBuf>,

    /// Applied after every `--vars` file.
    #[arg(
        short = 's',
        long = "set",
        value_name = "NAME=VALUE",
        help = "Set one variable (literal or plain string)"
    )]
    pub set: Vec<String>,
}

/// Overrides for the configured error policy.
#[derive(Debug, Args, Default, Clone, Copy)]
pub struct PolicyArgs {
    #[arg(
        long = "strict",
        conflicts_with = "lenient",
        help = "Stop on every error, including missing variables"
    )]
    pub strict: bool,

    #[arg(long = "lenient", help = "Never stop; skip broken markers")]
    pub lenient: bool,
}

// ── render ────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// `-` or nothing reads stdin.
    #[arg(value_name = "TEMPLATE", help = "Template file, or - for stdin")]
    pub template: Option<PathBuf>,

    #[command(flatten)]
    pub vars: VarArgs,

    #[command(flatten)]
    pub policy: PolicyArgs,

    #[arg(short = 'o', long = "output", value_name = "FILE", help = "Write to FILE instead of stdout")]
    pub output: Option<PathBuf>,

    #[arg(long = "events", help = "Print block and error events to stderr")]
    pub events: bool,
}

impl RenderArgs {
    /// The template path, or `None` for stdin.
    pub fn template_path(&self) -> Option<&PathBuf> {
        self.template
            .as_ref()
            .filter(|path| path.as_os_str() != "-")
    }
}

// ── check ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CheckArgs {
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    #[command(flatten)]
    pub vars: VarArgs,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

// ── render-dir ────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RenderDirArgs {
    #[arg(value_name = "SRC")]
    pub src: PathBuf,

    #[arg(value_name = "DST")]
    pub dst: PathBuf,

    #[arg(
        long = "ext",
        value_name = "EXT",
        default_value = "tmpl",
        help = "Extension marking files to render"
    )]
    pub extension: String,

    #[command(flatten)]
    pub vars: VarArgs,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

// ── list ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long = "blocks", conflicts_with = "filters", help = "Only list blocks")]
    pub blocks: bool,

    #[arg(long = "filters", help = "Only list filters")]
    pub filters: bool,

    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One name per line.
    List,
    /// JSON array.
    Json,
}

// ── init ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InitArgs {
    #[arg(long = "local", help = "Write ./mortar.toml instead of the user config")]
    pub local: bool,

    #[arg(short = 'f', long = "force", help = "Overwrite an existing file")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one value by dotted key, e.g. `policy.strict_variables`.
    Get { key: String },
    /// Print the whole resolved configuration as TOML.
    List,
    /// Print the default configuration file path.
    Path,
}

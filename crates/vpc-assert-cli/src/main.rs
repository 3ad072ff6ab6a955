// crates/vpc-assert-cli/src/main.rs
// ============================================================================
// Module: VPC Assert CLI Entry Point
// Description: Command dispatcher for evaluating VPC controls.
// Purpose: Load configuration and snapshots, run the engine, and report.
// Dependencies: clap, tokio, thiserror, vpc-assert-{config,controls,core,providers}
// ============================================================================

//! ## Overview
//! `vpc-assert` reads a provisioning snapshot, derives the expected state of
//! every selected control, compares it with observed state from the
//! configured provider, and prints a report. Exit codes: `0` all checks
//! passed, `1` assertion failures, `2` provider or structural errors, `3` a
//! fatal error before any report existed. All user-facing strings are routed
//! through the i18n catalog.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use thiserror::Error;
use vpc_assert_cli::EXIT_FATAL;
use vpc_assert_cli::exit_code;
use vpc_assert_cli::i18n::Locale;
use vpc_assert_cli::i18n::set_locale;
use vpc_assert_cli::render::OutputFormat;
use vpc_assert_cli::render::RenderError;
use vpc_assert_cli::render::render_plan;
use vpc_assert_cli::render::render_report;
use vpc_assert_cli::t;
use vpc_assert_config::AuditSettings;
use vpc_assert_config::ModuleInputs;
use vpc_assert_config::SchemaChoice;
use vpc_assert_config::VpcAssertConfig;
use vpc_assert_config::load_module_inputs;
use vpc_assert_controls::ControlSelection;
use vpc_assert_controls::build_plan;
use vpc_assert_core::AuditSink;
use vpc_assert_core::Engine;
use vpc_assert_core::EvaluationPlan;
use vpc_assert_core::FileAuditSink;
use vpc_assert_core::NoopAuditSink;
use vpc_assert_core::StderrAuditSink;
use vpc_assert_core::hashing::canonical_json_bytes;
use vpc_assert_providers::build_provider;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable for CLI locale selection.
const LANG_ENV: &str = "VPC_ASSERT_LANG";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "vpc-assert", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print the version and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Output language.
    #[arg(long, value_enum, value_name = "LANG", global = true)]
    lang: Option<LangArg>,
    /// Command to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate controls against observed state.
    Run(RunCommand),
    /// Print the expectations derived from a snapshot.
    Plan(PlanCommand),
    /// Snapshot utilities.
    Snapshot {
        /// Selected snapshot subcommand.
        #[command(subcommand)]
        command: SnapshotCommand,
    },
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Locale values accepted by `--lang`.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LangArg {
    /// English.
    En,
    /// Catalan.
    Ca,
}

impl LangArg {
    /// Returns the catalog locale.
    const fn locale(self) -> Locale {
        match self {
            Self::En => Locale::En,
            Self::Ca => Locale::Ca,
        }
    }
}

/// Schema versions accepted by `--schema-version`.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SchemaArg {
    /// Use the snapshot's pinned version or detect it.
    Auto,
    /// Force the V1 adapter.
    V1,
    /// Force the V2 adapter.
    V2,
}

impl SchemaArg {
    /// Returns the config-level schema choice.
    const fn choice(self) -> SchemaChoice {
        match self {
            Self::Auto => SchemaChoice::Auto,
            Self::V1 => SchemaChoice::V1,
            Self::V2 => SchemaChoice::V2,
        }
    }
}

/// Arguments locating the run configuration and snapshot.
#[derive(Args, Debug)]
struct SourceArgs {
    /// Run configuration path (defaults to `VPC_ASSERT_CONFIG` or `vpc-assert.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Snapshot path; overrides `snapshot.path`.
    #[arg(long, value_name = "PATH")]
    snapshot: Option<PathBuf>,
    /// Snapshot schema version; overrides `snapshot.schema_version`.
    #[arg(long = "schema-version", value_enum, value_name = "VERSION")]
    schema_version: Option<SchemaArg>,
}

/// Arguments for `run`.
#[derive(Args, Debug)]
struct RunCommand {
    /// Configuration and snapshot sources.
    #[command(flatten)]
    source: SourceArgs,
    /// Observed-state fixture path; overrides `provider.fixture.path`.
    #[arg(long, value_name = "PATH")]
    observed: Option<PathBuf>,
    /// Control to evaluate; repeat to select several (default: all).
    #[arg(long = "control", value_name = "NAME")]
    controls: Vec<String>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Fetch observed state one check at a time.
    #[arg(long, action = ArgAction::SetTrue)]
    sequential: bool,
}

/// Arguments for `plan`.
#[derive(Args, Debug)]
struct PlanCommand {
    /// Configuration and snapshot sources.
    #[command(flatten)]
    source: SourceArgs,
    /// Control to include; repeat to select several (default: all).
    #[arg(long = "control", value_name = "NAME")]
    controls: Vec<String>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Snapshot subcommands.
#[derive(Subcommand, Debug)]
enum SnapshotCommand {
    /// Load and adapt a snapshot without evaluating it.
    Check(SnapshotCheckCommand),
}

/// Arguments for `snapshot check`.
#[derive(Args, Debug)]
struct SnapshotCheckCommand {
    /// Configuration and snapshot sources.
    #[command(flatten)]
    source: SourceArgs,
    /// Output format; JSON prints the adapted module inputs.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a run configuration.
    Validate(ConfigValidateCommand),
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Run configuration path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() { ExitCode::from(EXIT_FATAL) } else { ExitCode::SUCCESS };
        }
    };
    match run(cli) {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run(cli: Cli) -> CliResult<ExitCode> {
    let env_lang = std::env::var(LANG_ENV).ok();
    let locale = resolve_locale(cli.lang, env_lang.as_deref())?;
    set_locale(locale);
    if locale != Locale::En {
        write_stderr_line(&t!("i18n.disclaimer.machine_translated"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Run(command) => command_run(&command),
        Commands::Plan(command) => command_plan(&command),
        Commands::Snapshot {
            command,
        } => match command {
            SnapshotCommand::Check(command) => command_snapshot_check(&command),
        },
        Commands::Config {
            command,
        } => match command {
            ConfigCommand::Validate(command) => command_config_validate(&command),
        },
    }
}

/// Resolves the locale from the flag, then the environment.
fn resolve_locale(flag: Option<LangArg>, env_value: Option<&str>) -> CliResult<Locale> {
    if let Some(lang) = flag {
        return Ok(lang.locale());
    }
    match env_value {
        Some(value) if !value.trim().is_empty() => Locale::parse(value).ok_or_else(|| {
            CliError::new(t!("i18n.lang.invalid_env", env = LANG_ENV, value = value))
        }),
        _ => Ok(Locale::En),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Shared Loading
// ============================================================================

/// Configuration and adapted snapshot for one invocation.
struct Prepared {
    /// Validated run configuration.
    config: VpcAssertConfig,
    /// Adapted module inputs.
    inputs: ModuleInputs,
}

/// Loads the run configuration and adapts the snapshot.
fn prepare(source: &SourceArgs) -> CliResult<Prepared> {
    let config = VpcAssertConfig::load(source.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let path = source
        .snapshot
        .clone()
        .or_else(|| config.snapshot.path.as_deref().map(PathBuf::from))
        .ok_or_else(|| CliError::new(t!("snapshot.path_missing")))?;
    let choice = source.schema_version.map_or(config.snapshot.schema_version, SchemaArg::choice);
    let inputs = load_module_inputs(&path, choice).map_err(|err| {
        CliError::new(t!("snapshot.load_failed", path = path.display(), error = err))
    })?;
    Ok(Prepared {
        config,
        inputs,
    })
}

/// Builds the evaluation plan for the selected controls.
fn plan_for(inputs: &ModuleInputs, controls: &[String]) -> CliResult<EvaluationPlan> {
    let selection = ControlSelection::only(controls.iter().cloned())
        .map_err(|err| CliError::new(t!("controls.invalid", error = err)))?;
    build_plan(inputs, &selection).map_err(|err| CliError::new(t!("plan.build_failed", error = err)))
}

/// Builds the audit sink selected by configuration.
fn audit_sink(settings: &AuditSettings) -> CliResult<Arc<dyn AuditSink>> {
    if !settings.enabled {
        return Ok(Arc::new(NoopAuditSink));
    }
    match &settings.path {
        Some(path) => {
            let sink = FileAuditSink::new(Path::new(path))
                .map_err(|err| CliError::new(t!("audit.open_failed", path = path, error = err)))?;
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(StderrAuditSink)),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `run` command.
fn command_run(command: &RunCommand) -> CliResult<ExitCode> {
    let prepared = prepare(&command.source)?;
    let plan = plan_for(&prepared.inputs, &command.controls)?;
    let provider =
        build_provider(&prepared.config.provider, command.observed.as_deref()).map_err(|err| {
            CliError::new(t!(
                "provider.init_failed",
                kind = prepared.config.provider.kind.as_str(),
                error = err
            ))
        })?;
    let audit = audit_sink(&prepared.config.audit)?;
    let engine = Engine::new(provider, prepared.config.engine.engine_config()).with_audit(audit);
    let report = if command.sequential {
        engine.run_sequential(&plan)
    } else {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_time()
            .build()
            .map_err(|err| CliError::new(t!("runtime.init_failed", error = err)))?;
        runtime.block_on(engine.run(&plan))
    };
    let output = render_report(&report, command.format).map_err(render_error)?;
    write_output(&output)?;
    Ok(ExitCode::from(exit_code(report.status)))
}

/// Executes the `plan` command.
fn command_plan(command: &PlanCommand) -> CliResult<ExitCode> {
    let prepared = prepare(&command.source)?;
    let plan = plan_for(&prepared.inputs, &command.controls)?;
    let output = render_plan(&plan, command.format).map_err(render_error)?;
    write_output(&output)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `snapshot check` command.
fn command_snapshot_check(command: &SnapshotCheckCommand) -> CliResult<ExitCode> {
    let prepared = prepare(&command.source)?;
    let inputs = &prepared.inputs;
    if command.format == OutputFormat::Json {
        let bytes = canonical_json_bytes(inputs)
            .map_err(|err| CliError::new(t!("render.failed", error = err)))?;
        let text = String::from_utf8(bytes)
            .map_err(|err| CliError::new(t!("render.failed", error = err)))?;
        write_output(&text)?;
        return Ok(ExitCode::SUCCESS);
    }
    let network = inputs.network_self_link.as_deref().unwrap_or(&inputs.name);
    let mut output = t!(
        "snapshot.check.ok",
        version = inputs.schema_version.as_str(),
        project = inputs.project_id,
        network = network,
        regions = inputs.regions.join(",")
    );
    output.push('\n');
    output.push_str(&t!(
        "snapshot.check.features",
        nat = inputs.nat.is_some(),
        psc = inputs.psc_address().is_some(),
        flow_logs = inputs.options.flow_logs
    ));
    write_output(&output)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `config validate` command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let config = VpcAssertConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    write_stdout_line(&t!(
        "config.validate.ok",
        provider = config.provider.kind.as_str(),
        workers = config.engine.max_workers
    ))
    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Maps a rendering failure to a localized error.
fn render_error(err: RenderError) -> CliError {
    CliError::new(t!("render.failed", error = err))
}

/// Writes command output to stdout with exactly one trailing newline.
fn write_output(output: &str) -> CliResult<()> {
    write_stdout_line(output.trim_end_matches('\n'))
        .map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns the fatal exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::from(EXIT_FATAL)
}

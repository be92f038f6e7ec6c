mod input;
mod logging;
mod output;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use contentvar_core::{
    Direction, ValidationError, ValidationOptions, apply_defaults_contents, clean_contents,
    remove_unknown_fields_contents, service_json_schema, validate_contents,
    validate_report_contents,
};
use settings::{LogFormat, Settings, SettingsError, load_settings};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("message rejected with {0} issue(s)")]
    Rejected(usize),
}

impl CliError {
    /// 1 for a message the schema rejects, 2 for everything else.
    fn exit_code(&self) -> u8 {
        match self {
            CliError::Validation(ValidationError::InvalidSchema(_)) => 2,
            CliError::Validation(_) | CliError::Rejected(_) => 1,
            CliError::Io(_)
            | CliError::Json(_)
            | CliError::Settings(_)
            | CliError::Logging(_)
            | CliError::InvalidInput(_) => 2,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "contentvar",
    version,
    about = "Validate, default and clean device-service payloads"
)]
struct Cli {
    /// TOML settings file.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Log output format; overrides the configured one.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a message against the service schema.
    Validate(ValidateArgs),
    /// Fill declared defaults for absent fields.
    Defaults(TransformArgs),
    /// Drop fields the schema does not declare.
    Strip(TransformArgs),
    /// Strip unknown fields, then fill defaults.
    Clean(TransformArgs),
    /// Print the JSON Schema of service documents.
    Schema(SchemaArgs),
}

#[derive(Args, Debug)]
struct PayloadArgs {
    /// Service document (JSON).
    #[arg(long, value_name = "FILE")]
    service: PathBuf,
    /// Message to process (JSON object).
    #[arg(long, value_name = "FILE")]
    message: PathBuf,
    /// Which side of the service the message belongs to.
    #[arg(long, value_enum, default_value_t = DirectionArg::Outputs)]
    direction: DirectionArg,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    #[command(flatten)]
    payload: PayloadArgs,
    /// Accept fields the schema does not declare.
    #[arg(long, overrides_with = "no_allow_additional_fields")]
    allow_additional_fields: bool,
    /// Reject undeclared fields even if the settings file allows them.
    #[arg(long)]
    no_allow_additional_fields: bool,
    /// Accept absent or null fields.
    #[arg(long, overrides_with = "no_allow_missing_fields")]
    allow_missing_fields: bool,
    /// Reject absent or null fields even if the settings file allows them.
    #[arg(long)]
    no_allow_missing_fields: bool,
    /// Report every issue instead of stopping at the first.
    #[arg(long, default_value_t = false)]
    all: bool,
}

#[derive(Args, Debug)]
struct TransformArgs {
    #[command(flatten)]
    payload: PayloadArgs,
    /// Write the result here instead of stdout.
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Write the schema here instead of stdout.
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DirectionArg {
    Outputs,
    Inputs,
}

impl From<DirectionArg> for Direction {
    fn from(value: DirectionArg) -> Self {
        match value {
            DirectionArg::Outputs => Direction::Outputs,
            DirectionArg::Inputs => Direction::Inputs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transform {
    Defaults,
    Strip,
    Clean,
}

impl Transform {
    fn as_str(self) -> &'static str {
        match self {
            Transform::Defaults => "defaults",
            Transform::Strip => "strip",
            Transform::Clean => "clean",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = match &cli.config {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };
    let log_format = cli.log_format.unwrap_or(settings.logging.format);
    logging::init_logging(&settings.logging, log_format)?;

    let run_id = Uuid::new_v4().to_string();
    let command = command_name(&cli.command);
    tracing::info!(event = "run_started", run_id = %run_id, command);
    let timer = Instant::now();

    let result = match cli.command {
        Command::Validate(args) => run_validate(args, settings.validation),
        Command::Defaults(args) => run_transform(args, Transform::Defaults),
        Command::Strip(args) => run_transform(args, Transform::Strip),
        Command::Clean(args) => run_transform(args, Transform::Clean),
        Command::Schema(args) => output::emit_json(args.out.as_deref(), &service_json_schema()),
    };

    let duration_ms = timer.elapsed().as_millis();
    match &result {
        Ok(()) => tracing::info!(
            event = "run_finished",
            run_id = %run_id,
            status = "success",
            duration_ms = duration_ms
        ),
        Err(err) => tracing::info!(
            event = "run_finished",
            run_id = %run_id,
            status = "failed",
            error = %err,
            duration_ms = duration_ms
        ),
    }
    result
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Validate(_) => "validate",
        Command::Defaults(_) => Transform::Defaults.as_str(),
        Command::Strip(_) => Transform::Strip.as_str(),
        Command::Clean(_) => Transform::Clean.as_str(),
        Command::Schema(_) => "schema",
    }
}

/// Flags given on the command line win over the settings file.
fn resolve_options(args: &ValidateArgs, configured: ValidationOptions) -> ValidationOptions {
    ValidationOptions::new(
        flag_override(
            args.allow_additional_fields,
            args.no_allow_additional_fields,
            configured.allow_additional_fields,
        ),
        flag_override(
            args.allow_missing_fields,
            args.no_allow_missing_fields,
            configured.allow_missing_fields,
        ),
    )
}

fn flag_override(enable: bool, disable: bool, configured: bool) -> bool {
    match (enable, disable) {
        (true, _) => true,
        (_, true) => false,
        (false, false) => configured,
    }
}

fn run_validate(args: ValidateArgs, configured: ValidationOptions) -> Result<(), CliError> {
    let options = resolve_options(&args, configured);
    let service = input::load_service(&args.payload.service)?;
    let msg = input::load_message(&args.payload.message)?;
    let contents = service.contents(args.payload.direction.into());

    if args.all {
        let report = validate_report_contents(&msg, contents, options);
        if report.is_ok() {
            tracing::info!(event = "message_accepted");
            return Ok(());
        }
        output::emit_json(None, &report)?;
        return Err(CliError::Rejected(report.issues.len()));
    }

    validate_contents(&msg, contents, options)?;
    tracing::info!(event = "message_accepted");
    Ok(())
}

fn run_transform(args: TransformArgs, transform: Transform) -> Result<(), CliError> {
    let service = input::load_service(&args.payload.service)?;
    let msg = input::load_message(&args.payload.message)?;
    let contents = service.contents(args.payload.direction.into());

    let transformed = match transform {
        Transform::Defaults => {
            let mut msg = msg;
            apply_defaults_contents(&mut msg, contents)?;
            msg
        }
        Transform::Strip => remove_unknown_fields_contents(msg, contents)?,
        Transform::Clean => clean_contents(msg, contents)?,
    };

    tracing::info!(
        event = "message_transformed",
        transform = transform.as_str(),
        fields = transformed.len()
    );
    output::emit_json(args.out.as_deref(), &transformed)
}

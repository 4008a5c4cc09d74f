use bitte_spec::{
    bitte_extension_json_schema, example_bitte_spec, SpecConfig, SpecInput, SpecValidator,
};
use clap::{Parser, Subcommand};
use eyre::Context as _;
use std::{
    io::Read as _,
    path::{Path, PathBuf},
    process::ExitCode,
};
use tracing_subscriber::prelude::*;

mod cli_output;

#[derive(Parser, Debug)]
#[command(name = "bitte-spec", version, about = "Validate agent plugin specs (OpenAPI + x-mb)")]
struct Cli {
    /// Also write JSON logs to this file. Filtering follows `RUST_LOG`.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a spec from a URL, a JSON file, or stdin (`-`).
    ///
    /// Exits 0 when the spec is valid and 1 when it is not.
    Validate {
        spec: String,

        /// Print the full validation result as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// TOML config with a `[fetch]` section (retries, delays, timeout, headers).
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the JSON Schema of the `x-mb` extension.
    Schema,

    /// Print a reference spec with every optional field populated.
    Example,
}

fn init_logging(
    log_file: Option<&Path>,
) -> eyre::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_filter(env_filter.clone());

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("log file has no file name: {}", path.display()))?;
            std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(env_filter);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

/// `http(s)` URLs are fetched; anything else is a file path, or `-` for stdin.
fn read_input(spec: &str) -> eyre::Result<SpecInput> {
    let url = reqwest::Url::parse(spec)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"));
    if let Some(url) = url {
        return Ok(SpecInput::Url(url));
    }
    if spec == "-" {
        let mut s = String::new();
        std::io::stdin()
            .lock()
            .read_to_string(&mut s)
            .context("read spec from stdin")?;
        return Ok(SpecInput::Text(s));
    }
    let s = std::fs::read_to_string(spec).with_context(|| format!("read {spec}"))?;
    Ok(SpecInput::Text(s))
}

async fn validate(spec: &str, json: bool, config: Option<&Path>) -> eyre::Result<ExitCode> {
    let cfg = match config {
        Some(p) => SpecConfig::load(p)?,
        None => SpecConfig::default(),
    };
    let validator = SpecValidator::from_config(&cfg)?;
    let input = read_input(spec)?;

    let result = validator.validate(Some(input)).await;
    if json {
        cli_output::print_json(&result)?;
    } else {
        cli_output::print_verdict(&result)?;
    }

    Ok(if result.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[tokio::main]
async fn main() -> eyre::Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.log_file.as_deref())?;

    match cli.cmd {
        Command::Validate { spec, json, config } => validate(&spec, json, config.as_deref())
            .await
            .context("validate failed"),
        Command::Schema => {
            cli_output::print_json(&bitte_extension_json_schema())?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Example => {
            cli_output::print_json(&example_bitte_spec())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

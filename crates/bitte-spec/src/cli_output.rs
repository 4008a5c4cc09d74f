//! Centralised helpers for CLI output. Results go to stdout, logs stay on stderr.

use bitte_spec::ValidationResult;
use eyre::Context as _;
use serde::Serialize;
use std::io::Write as _;

fn stdout_writeln(s: &str) -> eyre::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(s.as_bytes()).context("write stdout")?;
    stdout.write_all(b"\n").context("write stdout")?;
    stdout.flush().context("flush stdout")
}

pub fn print_json(value: &impl Serialize) -> eyre::Result<()> {
    let s = serde_json::to_string_pretty(value).context("serialize output")?;
    stdout_writeln(&s)
}

/// Human-readable verdict: a one-line summary when valid, the combined error message otherwise.
pub fn print_verdict(result: &ValidationResult) -> eyre::Result<()> {
    match (&result.schema, &result.error_message) {
        (Some(spec), _) if result.valid => {
            let tools = spec.x_mb.assistant.tools.as_ref().map_or(0, Vec::len);
            stdout_writeln(&format!(
                "valid: {} v{} (agent '{}', {tools} tool(s))",
                spec.info.title, spec.info.version, spec.x_mb.assistant.name
            ))
        }
        (_, Some(msg)) => stdout_writeln(&format!("invalid:\n{msg}")),
        (_, None) => stdout_writeln("invalid"),
    }
}

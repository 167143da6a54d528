use std::{
    fs,
    path::Path,
    process::{Command, Stdio},
};

use anyhow::Context as _;

use crate::blocks;

/// How the minified bundle is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The built-in textual stripper.
    Builtin,
    /// An external formatter subprocess, falling back to [`Strategy::Builtin`]
    /// on any failure.
    Formatter,
}

const FORMATTER_CMD: &str = "npx";
const FORMATTER_ARGS: [&str; 1] = ["postcss"];

/// Minify `input` into `output` using the chosen strategy.
///
/// A formatter failure is logged and silently degrades to the built-in
/// strategy; only reading the input or writing the output can fail.
pub fn minify_file(
    strategy: Strategy,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    if strategy == Strategy::Formatter {
        match run_formatter(input, output) {
            Ok(()) => {
                log::info!("minified with formatter: {}", output.display());
                return Ok(());
            }
            Err(err) => {
                log::warn!("formatter failed, falling back to built-in minifier: {err:#}");
            }
        }
    }

    let css = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    fs::write(output, minify(&css))
        .with_context(|| format!("failed to write {}", output.display()))?;
    log::info!("minified: {}", output.display());

    Ok(())
}

fn run_formatter(input: &Path, output: &Path) -> anyhow::Result<()> {
    let status = Command::new(FORMATTER_CMD)
        .args(FORMATTER_ARGS)
        .arg(input)
        .arg("-o")
        .arg(output)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .with_context(|| format!("failed to run {FORMATTER_CMD}"))?;

    if !status.success() {
        anyhow::bail!("formatter exited with {status}");
    }
    if !output.exists() {
        anyhow::bail!("formatter produced no output file");
    }

    Ok(())
}

/// Strip comments and collapse whitespace. Purely textual; assumes no
/// `/*` or `*/` sequences inside string values. Idempotent on its own
/// output.
pub fn minify(css: &str) -> String {
    let mut out = blocks::strip_block_comments(css);
    out = out.replace("\r\n", "").replace('\n', "");

    for separator in ['{', '}', ':', ';', ','] {
        out = collapse_around(&out, separator);
    }

    out = out.replace(";}", "}");
    collapse_runs(&out).trim().to_string()
}

/// Drop whitespace on both sides of every occurrence of `separator`.
fn collapse_around(input: &str, separator: char) -> String {
    let mut out = String::with_capacity(input.len());

    for c in input.chars() {
        if c == separator {
            while out.ends_with(|c: char| c.is_whitespace()) {
                out.pop();
            }
            out.push(c);
        } else if c.is_whitespace() && out.ends_with(separator) {
            // skip
        } else {
            out.push(c);
        }
    }

    out
}

fn collapse_runs(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_run = false;

    for c in input.chars() {
        if c.is_whitespace() {
            if !in_run {
                out.push(' ');
                in_run = true;
            }
        } else {
            out.push(c);
            in_run = false;
        }
    }

    out
}

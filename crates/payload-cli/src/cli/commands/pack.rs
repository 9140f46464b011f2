use super::super::args::{FormatArg, PackArgs};
use super::super::sources::{load_config, populate};
use crate::exit_codes;
use anyhow::{bail, Context};
use payload_core::{EntryPolicy, OutputFormat, Payload};
use std::io::Write;
use std::path::Path;

pub fn run(args: PackArgs) -> anyhow::Result<i32> {
    let mut config = load_config(&args.source)?;
    if let Some(version) = &args.version_string {
        config.version = version.clone();
    }
    if args.strict {
        config.entry_policy = EntryPolicy::Strict;
    }
    let format = args.format.unwrap_or(match config.format {
        OutputFormat::Zip => FormatArg::Zip,
        OutputFormat::Plain => FormatArg::Plain,
    });

    let payload = Payload::new(config);
    populate(&payload, &args.source)?;

    match format {
        FormatArg::Zip => pack_zip(&payload, &args.output),
        FormatArg::Plain => pack_plain(&payload, &args.output),
        FormatArg::Dir => pack_dir(&payload, &args.output),
    }
}

fn is_stdout(output: &Path) -> bool {
    output.as_os_str() == "-"
}

fn pack_zip(payload: &Payload, output: &Path) -> anyhow::Result<i32> {
    // Build fully in memory first so a failed build never truncates `output`.
    let mut buffer = Vec::new();
    let report = payload
        .write_zip(&mut buffer)
        .context("failed to build payload archive")?;

    if is_stdout(output) {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&buffer).context("failed to write archive to stdout")?;
        stdout.flush()?;
    } else {
        std::fs::write(output, &buffer)
            .with_context(|| format!("failed to write archive: {}", output.display()))?;
    }

    for omitted in &report.omitted {
        eprintln!("warning: omitted {}: {}", omitted.key, omitted.reason);
    }
    eprintln!(
        "payload: {} entries, {} bytes, {}",
        report.entries.len(),
        report.bytes,
        report.sha256
    );

    Ok(if report.is_complete() {
        exit_codes::SUCCESS
    } else {
        exit_codes::PARTIAL
    })
}

fn pack_plain(payload: &Payload, output: &Path) -> anyhow::Result<i32> {
    if is_stdout(output) {
        payload
            .write_plain(&mut std::io::stdout().lock())
            .context("failed to write plain payload")?;
    } else {
        let mut file = std::fs::File::create(output)
            .with_context(|| format!("failed to create output: {}", output.display()))?;
        payload
            .write_plain(&mut file)
            .context("failed to write plain payload")?;
    }
    Ok(exit_codes::SUCCESS)
}

fn pack_dir(payload: &Payload, output: &Path) -> anyhow::Result<i32> {
    if is_stdout(output) {
        bail!("--format dir requires --output <directory>");
    }
    std::fs::create_dir_all(output)
        .with_context(|| format!("failed to create output directory: {}", output.display()))?;

    let report = payload.write_plain_dir(output);
    for failed in &report.failed {
        eprintln!("error: unable to write {}: {}", failed.key, failed.reason);
    }
    eprintln!(
        "payload: wrote {} files to {}",
        report.written.len(),
        output.display()
    );

    Ok(if report.is_complete() {
        exit_codes::SUCCESS
    } else {
        exit_codes::PARTIAL
    })
}

use clap::Parser;
use lsp_edit::config::parse_file_mode;
use lsp_edit::{
    ApplyConfig, ApplyRequest, ApplyResponse, ChangeOutcome, OffsetEncoding, WorkspaceApplier,
    generate_execution_id,
};
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Apply LSP workspace edits to files on disk
#[derive(Parser, Debug)]
#[command(name = "lsp-edit")]
#[command(version)]
#[command(about = "Apply LSP workspace edits with overlap checks and line-ending preservation", long_about = None)]
struct Args {
    /// JSON file containing the apply request (omit to read from stdin)
    #[arg(short, long)]
    edits: Option<String>,

    /// Output structured JSON instead of human-readable
    #[arg(short, long)]
    json: bool,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Unit of `character` in positions
    #[arg(long, value_enum, default_value_t = OffsetEncoding::Utf16)]
    encoding: OffsetEncoding,

    /// Permission bits (octal) for files the tool creates
    #[arg(long, value_parser = parse_file_mode, default_value = "644")]
    file_mode: u32,
}

/// Read ApplyRequest from file path or stdin
fn read_apply_request(path: Option<&String>) -> Result<ApplyRequest, Box<dyn std::error::Error>> {
    let json_str = if let Some(p) = path {
        fs::read_to_string(p)?
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    };

    let request: ApplyRequest = serde_json::from_str(&json_str)?;
    Ok(request)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let request = match read_apply_request(args.edits.as_ref()) {
        Ok(request) => request,
        Err(e) => {
            let response = ApplyResponse::failure(
                generate_execution_id(),
                format!("Error reading apply request: {}", e),
            );
            return finish(&response, &args);
        }
    };

    let execution_id = request.resolved_execution_id();
    let config = ApplyConfig {
        encoding: args.encoding,
        file_mode: args.file_mode,
    };
    tracing::debug!(%execution_id, ?config, operations = request.workspace_edit.operation_count(), "apply request");

    let applier = WorkspaceApplier::new(config);
    let response = match applier.apply_workspace_edit(&request.workspace_edit) {
        Ok(report) => ApplyResponse::success(execution_id, &report),
        Err(e) => ApplyResponse::from_workspace_error(execution_id, &e),
    };

    finish(&response, &args)
}

/// Emit the response and map it to an exit code
fn finish(response: &ApplyResponse, args: &Args) -> ExitCode {
    if let Err(e) = output_response(response, args.json, args.output.as_ref()) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    if response.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Format and output the response
fn output_response(
    response: &ApplyResponse,
    json_mode: bool,
    output_path: Option<&String>,
) -> Result<(), String> {
    let output = if json_mode {
        serde_json::to_string_pretty(response)
            .map_err(|e| format!("Failed to serialize response: {}", e))?
    } else {
        human_output(response)
    };

    match output_path {
        Some(path) => fs::write(path, &output)
            .map_err(|e| format!("Failed to write output to '{}': {}", path, e)),
        None => {
            println!("{}", output);
            Ok(())
        }
    }
}

fn human_output(response: &ApplyResponse) -> String {
    if !response.success {
        let mut text = format!("Error: {}", response.error.as_deref().unwrap_or("Unknown error"));
        if !response.outcomes.is_empty() {
            text.push_str(&format!(
                "\n{} operation(s) completed before the failure were not rolled back",
                response.outcomes.len()
            ));
            for outcome in &response.outcomes {
                text.push('\n');
                text.push_str(&describe_outcome(outcome));
            }
        }
        return text;
    }

    let mut lines = vec![format!(
        "Applied {} operation(s), skipped {}",
        response.applied_count, response.skipped_count
    )];
    lines.extend(response.outcomes.iter().map(describe_outcome));
    lines.join("\n")
}

fn describe_outcome(outcome: &ChangeOutcome) -> String {
    match outcome {
        ChangeOutcome::Edited {
            path,
            edit_count,
            checksum_after,
            ..
        } => format!(
            "  edited  {} ({} edit(s), checksum {})",
            path.display(),
            edit_count,
            checksum_after
        ),
        ChangeOutcome::Created { path, overwritten } => {
            let note = if *overwritten { " (overwritten)" } else { "" };
            format!("  created {}{}", path.display(), note)
        }
        ChangeOutcome::Deleted { path, recursive } => {
            let note = if *recursive { " (recursive)" } else { "" };
            format!("  deleted {}{}", path.display(), note)
        }
        ChangeOutcome::Renamed { from, to } => {
            format!("  renamed {} -> {}", from.display(), to.display())
        }
        ChangeOutcome::Skipped { path, reason } => {
            format!("  skipped {}: {}", path.display(), reason)
        }
    }
}

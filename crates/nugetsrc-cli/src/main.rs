mod output;
mod table;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use nugetsrc_config::{ConfigLocator, Operation, Outcome, DEFAULT_PROTOCOL_VERSION};
use output::{Output, Verbosity};

#[derive(Parser, Debug)]
#[command(name = "nuget-sources")]
#[command(version, about = "Manage the package sources and credentials of a NuGet.Config file")]
struct Args {
    /// NuGet Configuration File
    #[arg(short = 'f', long = "nugetConfigFile", value_name = "FILE")]
    config_file: Option<PathBuf>,

    /// Operation
    #[arg(short = 'o', long = "operation", value_enum, ignore_case = true, default_value_t = OperationType::List)]
    operation: OperationType,

    /// Name of the NuGet Repository or Credential Key
    #[arg(short = 'n', long = "name")]
    name: Option<String>,

    /// Source of the NuGet Repository
    #[arg(short = 's', long = "source")]
    source: Option<String>,

    /// Username for accessing the NuGet Repository
    #[arg(short = 'u', long = "username")]
    username: Option<String>,

    /// Password for accessing the NuGet Repository
    #[arg(short = 'p', long = "password")]
    password: Option<String>,

    /// Protocol Version of the NuGet Repository
    #[arg(short = 'v', long = "protocolVersion", default_value_t = DEFAULT_PROTOCOL_VERSION)]
    protocol_version: u32,

    /// When removing a source, also remove its disabled flag and credentials
    #[arg(long)]
    cascade: bool,

    /// Print the source list as JSON
    #[arg(long)]
    json: bool,

    /// Only print errors
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    quiet: bool,

    /// Increase log output (repeatable)
    #[arg(long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OperationType {
    #[value(name = "List")]
    List,
    #[value(name = "Add")]
    Add,
    #[value(name = "AddCredentials")]
    AddCredentials,
    #[value(name = "Remove")]
    Remove,
    #[value(name = "RemoveCredentials")]
    RemoveCredentials,
    #[value(name = "Enable")]
    Enable,
    #[value(name = "Disable")]
    Disable,
    #[value(name = "Update")]
    Update,
    #[value(name = "UpdateCredentials")]
    UpdateCredentials,
    #[value(name = "Create")]
    Create,
}

impl Args {
    fn to_operation(&self) -> Operation {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        let name = text(&self.name);

        match self.operation {
            OperationType::List => Operation::List,
            OperationType::Add => Operation::Add {
                name,
                source: text(&self.source),
                protocol_version: self.protocol_version,
            },
            OperationType::Update => Operation::Update { name, source: text(&self.source) },
            OperationType::Remove => Operation::Remove { name, cascade: self.cascade },
            OperationType::Enable => Operation::Enable { name },
            OperationType::Disable => Operation::Disable { name },
            OperationType::AddCredentials => Operation::AddCredentials {
                name,
                username: text(&self.username),
                password: text(&self.password),
            },
            OperationType::UpdateCredentials => Operation::UpdateCredentials {
                name,
                username: text(&self.username),
                password: text(&self.password),
            },
            OperationType::RemoveCredentials => Operation::RemoveCredentials { name },
            OperationType::Create => Operation::Create,
        }
    }
}

fn init_logging(verbosity: Verbosity) {
    let env = env_logger::Env::default().default_filter_or(verbosity.log_filter());
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

/// Absolute form of the path for display; the file may not exist yet
fn display_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn run(args: Args) -> Result<i32> {
    let verbosity = Verbosity::from_flags(args.quiet, args.verbose);
    init_logging(verbosity);

    let operation = args.to_operation();

    let mut output = Output::new();
    output.set_verbosity(verbosity);
    output.set_json_mode(args.json && operation == Operation::List);

    let path = ConfigLocator::default()
        .resolve(args.config_file.as_deref())
        .context("Failed to locate the NuGet configuration file")?;
    output.writeln(&format!("NuGet Configuration File: {}", display_path(&path).display()));
    output.verbose(&format!("Operation: {}", operation.as_str()));

    match nugetsrc_config::run(&path, &operation) {
        Ok(Outcome::Listed(rows)) => {
            if output.is_json() {
                output.json(&rows);
            } else {
                output.writeln("Listing NuGet Sources");
                output.writeln("");
                output.writeln(&table::render_sources(&rows));
            }
            Ok(0)
        }
        Ok(Outcome::Changed(message)) => {
            output.success(&message);
            Ok(0)
        }
        Ok(Outcome::Unchanged(message)) => {
            output.info(&message);
            Ok(0)
        }
        Err(e) => {
            log::debug!("{} failed: {:?}", operation.as_str(), e);
            output.error(&e.to_string());
            Ok(1)
        }
    }
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("Error: {}", e);
            for cause in e.chain().skip(1) {
                eprintln!("  Caused by: {}", cause);
            }
            ExitCode::FAILURE
        }
    }
}

//! Command-line interface for MInDes
//! This binary extracts input files from MInDes `input_report.txt` dumps and prints the
//! editor snippets the language server expects.
//!
//! Usage:
//!   mindes extract-raw `<input>` [-o `<output>`] [--strict]   - Write the macro-expanded input
//!   mindes extract-full `<input>` [-o `<output>`] [--strict]  - Write the echoed prompts and comments
//!   mindes sections `<input>`                                 - Dump the report buckets as JSON
//!   mindes tokens `<input>`                                   - List dotted-key tokens
//!   mindes theme [-c `<config>`]                              - Semantic token colour rules
//!   mindes associations [-c `<config>`]                       - files.associations snippet

mod views;

use std::path::{Path, PathBuf};

use clap::{Arg, ArgAction, ArgMatches, Command};
use mindes_config::{Loader, MindesConfig};
use mindes_parser::{default_output_path, ReportLoader};
use tracing_subscriber::EnvFilter;

use views::CliError;

fn input_arg() -> Arg {
    Arg::new("input")
        .help("Path to the input_report.txt file")
        .required(true)
        .value_parser(clap::value_parser!(PathBuf))
        .index(1)
}

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .short('c')
        .help("TOML file layered over the built-in defaults")
        .value_parser(clap::value_parser!(PathBuf))
}

fn extract_command(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(input_arg())
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Destination file (default: <run directory>.<extension> next to the run)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Fail without writing if any row is malformed")
                .action(ArgAction::SetTrue),
        )
        .arg(config_arg())
}

fn cli() -> Command {
    Command::new("mindes")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for inspecting MInDes input reports")
        .arg_required_else_help(true)
        .subcommand_required(true)
        .subcommand(extract_command(
            "extract-raw",
            "Extract the input file as the solver read it",
        ))
        .subcommand(extract_command(
            "extract-full",
            "Extract the input file as the user wrote it",
        ))
        .subcommand(
            Command::new("sections")
                .about("Print the report buckets as JSON")
                .arg(input_arg()),
        )
        .subcommand(
            Command::new("tokens")
                .about("List the dotted-key tokens of a document")
                .arg(input_arg()),
        )
        .subcommand(
            Command::new("theme")
                .about("Print editor.semanticTokenColorCustomizations for the configured colours")
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("associations")
                .about("Print the files.associations entry for reports")
                .arg(config_arg()),
        )
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let matches = cli().get_matches();
    if let Err(err) = run(&matches) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<(), CliError> {
    match matches.subcommand() {
        Some(("extract-raw", sub)) => handle_extract_command(sub, ReportLoader::raw_input),
        Some(("extract-full", sub)) => handle_extract_command(sub, ReportLoader::full_input),
        Some(("sections", sub)) => {
            let loader = ReportLoader::from_path(input_path(sub))?;
            println!("{}", views::sections_json(&loader)?);
            Ok(())
        }
        Some(("tokens", sub)) => {
            let loader = ReportLoader::from_path(input_path(sub))?;
            print!("{}", views::token_listing(loader.source()));
            Ok(())
        }
        Some(("theme", sub)) => {
            println!("{}", views::theme_json(&load_config(sub)?)?);
            Ok(())
        }
        Some(("associations", sub)) => {
            println!("{}", views::associations_json(&load_config(sub)?)?);
            Ok(())
        }
        _ => unreachable!("clap requires a known subcommand"),
    }
}

fn input_path(matches: &ArgMatches) -> &Path {
    matches
        .get_one::<PathBuf>("input")
        .expect("input is a required argument")
}

fn load_config(matches: &ArgMatches) -> Result<MindesConfig, CliError> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<PathBuf>("config") {
        loader = loader.with_file(path);
    }
    Ok(loader.build()?)
}

/// Handle extract-raw and extract-full
fn handle_extract_command(
    matches: &ArgMatches,
    extract: fn(&ReportLoader) -> mindes_parser::Extraction,
) -> Result<(), CliError> {
    let config = load_config(matches)?;
    let input = input_path(matches);
    let loader = ReportLoader::from_path(input)?;

    let (rendered, malformed) = views::checked(extract(&loader), matches.get_flag("strict"))?;
    for row in &malformed {
        eprintln!("Warning: {}", row);
    }

    let output = matches
        .get_one::<PathBuf>("output")
        .cloned()
        .unwrap_or_else(|| default_output_path(input, &config.extract.output_extension));
    tracing::debug!(
        output = %output.display(),
        malformed = malformed.len(),
        "writing extraction"
    );
    std::fs::write(&output, rendered).map_err(|err| CliError::Write {
        path: output.clone(),
        message: err.to_string(),
    })?;

    println!("Extracted contents written to: {}", output.display());
    Ok(())
}

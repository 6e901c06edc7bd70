use mindes_parser::{default_output_path, Extraction, LoaderError, MalformedRow, ReportLoader};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

pub const COMMAND_EXTRACT_RAW_INPUT: &str = "mindes.extractRawInput";
pub const COMMAND_EXTRACT_FULL_INPUT: &str = "mindes.extractFullInput";

pub const COMMANDS: &[&str] = &[COMMAND_EXTRACT_RAW_INPUT, COMMAND_EXTRACT_FULL_INPUT];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractKind {
    Raw,
    Full,
}

/// An extraction request decoded from `workspace/executeCommand` arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractRequest {
    pub kind: ExtractKind,
    pub input: PathBuf,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOutcome {
    pub output: PathBuf,
    pub lines: usize,
    pub malformed: Vec<MalformedRow>,
}

#[derive(Debug, Clone)]
pub enum CommandError {
    UnknownCommand(String),
    MissingInput,
    Load(LoaderError),
    Write { path: PathBuf, message: String },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnknownCommand(command) => write!(f, "unknown command {}", command),
            CommandError::MissingInput => write!(f, "No input file selected."),
            CommandError::Load(err) => write!(f, "{}", err),
            CommandError::Write { path, message } => {
                write!(f, "cannot write {}: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for CommandError {}

impl From<LoaderError> for CommandError {
    fn from(err: LoaderError) -> Self {
        CommandError::Load(err)
    }
}

fn path_argument(arguments: &[Value], index: usize) -> Option<PathBuf> {
    arguments
        .get(index)
        .and_then(Value::as_str)
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
}

pub fn parse_command(command: &str, arguments: &[Value]) -> Result<ExtractRequest, CommandError> {
    let kind = match command {
        COMMAND_EXTRACT_RAW_INPUT => ExtractKind::Raw,
        COMMAND_EXTRACT_FULL_INPUT => ExtractKind::Full,
        _ => return Err(CommandError::UnknownCommand(command.to_string())),
    };
    let input = path_argument(arguments, 0).ok_or(CommandError::MissingInput)?;
    Ok(ExtractRequest {
        kind,
        input,
        output: path_argument(arguments, 1),
    })
}

/// Read the report, extract, and write the result. Nothing is written if the report can't be read.
pub fn run_extraction(
    request: &ExtractRequest,
    output_extension: &str,
) -> Result<ExtractOutcome, CommandError> {
    let loader = ReportLoader::from_path(&request.input)?;
    let extraction: Extraction = match request.kind {
        ExtractKind::Raw => loader.raw_input(),
        ExtractKind::Full => loader.full_input(),
    };
    let output = request
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&request.input, output_extension));

    std::fs::write(&output, extraction.render()).map_err(|err| CommandError::Write {
        path: output.clone(),
        message: err.to_string(),
    })?;

    Ok(ExtractOutcome {
        output,
        lines: extraction.items.len(),
        malformed: extraction.malformed,
    })
}

mod store;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use form_spec::{
    CUSTOM_SCHEMA_KEY, DraftRecord, DraftStore, FORM_VALUES_KEY, FieldError, FormSchema,
    SchemaCheck, check_schema, parse_json,
};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Value, json};
use store::FileDraftStore;
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const DRAFT_DIR_ENV: &str = "FORM_DRAFT_DIR";
const DEFAULT_DRAFT_DIR: &str = ".form-drafts";

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Dynamic form schema helper",
    long_about = "Checks form schemas, resolves field visibility, validates values and builds submission payloads"
)]
struct Cli {
    /// Output format for command results.
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Log filter directive (overrides RUST_LOG), e.g. `debug` or `form_spec=debug`.
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Check a schema document for structural problems.
    Check {
        /// Path to the form schema JSON.
        #[arg(long, value_name = "SCHEMA")]
        schema: PathBuf,
    },
    /// Show which fields are visible for a set of values.
    Visible {
        /// Path to the form schema JSON.
        #[arg(long, value_name = "SCHEMA")]
        schema: PathBuf,
        /// Path to the JSON object holding the current values.
        #[arg(long, value_name = "VALUES")]
        values: PathBuf,
    },
    /// Validate values against the visible fields of a schema.
    Validate {
        /// Path to the form schema JSON.
        #[arg(long, value_name = "SCHEMA")]
        schema: PathBuf,
        /// Path to the JSON object holding the current values.
        #[arg(long, value_name = "VALUES")]
        values: PathBuf,
    },
    /// Print the submission payload built from a set of values.
    ///
    /// With `--format json` the payload is wrapped with its submission time.
    Structure {
        /// Path to the form schema JSON.
        #[arg(long, value_name = "SCHEMA")]
        schema: PathBuf,
        /// Path to the JSON object holding the current values.
        #[arg(long, value_name = "VALUES")]
        values: PathBuf,
        /// Refuse to build the payload while required visible fields are empty.
        #[arg(long)]
        strict: bool,
    },
    /// Save, load or clear drafts.
    Draft {
        #[command(subcommand)]
        action: DraftCommand,
    },
    /// Print the JSON Schema describing form schema documents.
    JsonSchema,
}

#[derive(Args)]
struct DraftLocation {
    /// Draft key; `custom-schema` stores raw schema text.
    #[arg(long, default_value = FORM_VALUES_KEY)]
    key: String,
    /// Directory holding drafts (defaults to FORM_DRAFT_DIR or `.form-drafts`).
    #[arg(long, value_name = "DIR")]
    dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum DraftCommand {
    /// Store the contents of a file as a draft.
    Save {
        #[command(flatten)]
        location: DraftLocation,
        /// File with the values (or schema text) to keep.
        #[arg(long, value_name = "VALUES")]
        values: PathBuf,
    },
    /// Print a stored draft.
    Load {
        #[command(flatten)]
        location: DraftLocation,
    },
    /// Remove a stored draft.
    Clear {
        #[command(flatten)]
        location: DraftLocation,
    },
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref())?;
    let format = cli.format;
    match cli.command {
        Command::Check { schema } => run_check(&schema, format),
        Command::Visible { schema, values } => run_visible(&schema, &values, format),
        Command::Validate { schema, values } => run_validate(&schema, &values, format),
        Command::Structure {
            schema,
            values,
            strict,
        } => run_structure(&schema, &values, strict, format),
        Command::Draft { action } => run_draft(action, format),
        Command::JsonSchema => print_json(&schemars::schema_for!(FormSchema)),
    }
}

fn init_tracing(level: Option<&str>) -> CliResult<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| err.to_string())?;
    Ok(())
}

fn run_check(schema_path: &Path, format: OutputFormat) -> CliResult<()> {
    let text = read_file(schema_path)?;
    let check = match parse_json(&text) {
        Ok(document) => check_schema(&document),
        Err(err) => SchemaCheck {
            valid: false,
            errors: vec![err.to_string()],
            warnings: Vec::new(),
        },
    };

    match format {
        OutputFormat::Json => print_json(&check)?,
        OutputFormat::Text => describe_check(&check),
    }

    if check.valid {
        Ok(())
    } else {
        Err("schema check failed".into())
    }
}

fn describe_check(check: &SchemaCheck) {
    println!(
        "Schema check: {}",
        if check.valid { "valid" } else { "invalid" }
    );
    if !check.errors.is_empty() {
        println!("Errors:");
        for error in &check.errors {
            println!("  - {}", error);
        }
    }
    if !check.warnings.is_empty() {
        println!("Warnings:");
        for warning in &check.warnings {
            println!("  - {}", warning);
        }
    }
}

fn run_visible(schema_path: &Path, values_path: &Path, format: OutputFormat) -> CliResult<()> {
    let schema = load_schema(schema_path)?;
    let values = load_values(values_path)?;
    let visibility = schema.visibility(&values);

    match format {
        OutputFormat::Json => print_json(&json!({
            "visibility": visibility,
            "fields": schema.visible_fields(&values),
        })),
        OutputFormat::Text => {
            for (path, visible) in &visibility {
                println!("{}: {}", path, if *visible { "visible" } else { "hidden" });
            }
            Ok(())
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidationOutput {
    valid: bool,
    errors: IndexMap<String, FieldError>,
    missing_fields: Vec<String>,
}

fn run_validate(schema_path: &Path, values_path: &Path, format: OutputFormat) -> CliResult<()> {
    let schema = load_schema(schema_path)?;
    let values = load_values(values_path)?;
    let report = schema.validate(&values);
    let required = schema.check_required(&values);
    let output = ValidationOutput {
        valid: report.valid && required.valid,
        errors: report.errors,
        missing_fields: required.missing_fields,
    };

    match format {
        OutputFormat::Json => print_json(&output)?,
        OutputFormat::Text => describe_validation(&output),
    }

    if output.valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn describe_validation(output: &ValidationOutput) {
    println!(
        "Validation result: {}",
        if output.valid { "valid" } else { "invalid" }
    );
    if !output.errors.is_empty() {
        println!("Errors:");
        for (path, error) in &output.errors {
            println!("  {} - {}", path, error.message);
        }
    }
    if !output.missing_fields.is_empty() {
        println!(
            "Missing required fields: {}",
            output.missing_fields.join(", ")
        );
    }
}

fn run_structure(
    schema_path: &Path,
    values_path: &Path,
    strict: bool,
    format: OutputFormat,
) -> CliResult<()> {
    let schema = load_schema(schema_path)?;
    let values = load_values(values_path)?;
    if strict {
        let missing = schema.missing_required(&values);
        if !missing.is_empty() {
            return Err(format!("missing required fields: {}", missing.join(", ")).into());
        }
    }
    match format {
        OutputFormat::Json => print_json(&schema.submission(&values)),
        OutputFormat::Text => print_json(&schema.structure(&values)),
    }
}

fn run_draft(action: DraftCommand, format: OutputFormat) -> CliResult<()> {
    match action {
        DraftCommand::Save { location, values } => {
            let mut store = FileDraftStore::new(resolve_draft_dir(location.dir)?);
            let text = read_file(&values)?;
            let payload = if location.key == CUSTOM_SCHEMA_KEY {
                Value::String(text)
            } else {
                serde_json::from_str(&text)?
            };
            let record = DraftRecord::now(payload);
            store.save(&location.key, &record)?;
            match format {
                OutputFormat::Json => print_json(&json!({
                    "key": location.key,
                    "savedAt": record.saved_at,
                })),
                OutputFormat::Text => {
                    println!(
                        "Saved draft '{}' at {}",
                        location.key,
                        record.saved_at.to_rfc3339()
                    );
                    Ok(())
                }
            }
        }
        DraftCommand::Load { location } => {
            let store = FileDraftStore::new(resolve_draft_dir(location.dir)?);
            let Some(record) = store.load(&location.key)? else {
                return Err(format!("no draft stored for '{}'", location.key).into());
            };
            match format {
                OutputFormat::Json => println!("{}", record.to_json_pretty()?),
                OutputFormat::Text => {
                    println!(
                        "Draft '{}' saved at {}",
                        location.key,
                        record.saved_at.to_rfc3339()
                    );
                    if record.is_empty() {
                        println!("(draft is empty)");
                    }
                    match &record.values {
                        Value::String(text) => println!("{}", text),
                        values => println!("{}", serde_json::to_string_pretty(values)?),
                    }
                }
            }
            Ok(())
        }
        DraftCommand::Clear { location } => {
            let mut store = FileDraftStore::new(resolve_draft_dir(location.dir)?);
            let cleared = store.clear(&location.key)?;
            match format {
                OutputFormat::Json => print_json(&json!({
                    "key": location.key,
                    "cleared": cleared,
                })),
                OutputFormat::Text => {
                    if cleared {
                        println!("Cleared draft '{}'", location.key);
                    } else {
                        println!("No draft stored for '{}'", location.key);
                    }
                    Ok(())
                }
            }
        }
    }
}

fn resolve_draft_dir(dir: Option<PathBuf>) -> CliResult<PathBuf> {
    let candidate = match dir {
        Some(path) => path,
        None => env::var_os(DRAFT_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DRAFT_DIR)),
    };
    if candidate.as_os_str().is_empty() {
        return Err("draft directory cannot be empty".into());
    }
    Ok(candidate)
}

fn read_file(path: &Path) -> CliResult<String> {
    fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {}", path.display(), err).into())
}

fn load_schema(path: &Path) -> CliResult<FormSchema> {
    let text = read_file(path)?;
    Ok(FormSchema::from_json_str(&text)?)
}

fn load_values(path: &Path) -> CliResult<Value> {
    let text = read_file(path)?;
    let values: Value = serde_json::from_str(&text)?;
    if !values.is_object() {
        return Err(format!("{} must contain a JSON object", path.display()).into());
    }
    Ok(values)
}

fn print_json(value: &impl Serialize) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn explicit_draft_dir_wins() {
        let dir = resolve_draft_dir(Some(PathBuf::from("drafts"))).expect("dir");
        assert_eq!(dir, PathBuf::from("drafts"));
        assert!(resolve_draft_dir(Some(PathBuf::new())).is_err());
    }

    #[test]
    fn draft_key_defaults_to_form_values() {
        let cli = Cli::try_parse_from(["greentic-form", "draft", "load"]).expect("parse");
        match cli.command {
            Command::Draft {
                action: DraftCommand::Load { location },
            } => {
                assert_eq!(location.key, FORM_VALUES_KEY);
                assert!(location.dir.is_none());
            }
            _ => panic!("unexpected command"),
        }
    }
}

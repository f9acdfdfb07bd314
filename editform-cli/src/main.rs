use std::fmt;
use std::fmt::Write as FmtWrite;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};
use color_eyre::eyre::{Report, Result, eyre};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use editform::form::{StoredFile, UploadedFileMap};
use editform::io::{
    catalog_from_str, entity_from_str, parse_document_str, raw_inputs_from_str,
    uploads_from_value,
};
use editform::{
    DocumentFormat, EditForm, Entity, FieldCatalog, OutputDestination, OutputOptions, RawInputSet,
    catalog_from_entity, emit_entity,
};

const LOG_ENV: &str = "EDITFORM_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Parser)]
#[command(
    name = "editform",
    version,
    about = "Reconcile raw form input into an entity document"
)]
struct Cli {
    /// Field catalog spec: file path, inline payload, or "-" for stdin
    #[arg(short = 'c', long = "catalog", value_name = "SPEC")]
    catalog: Option<String>,

    /// Entity being edited: file path, inline payload, or "-" for stdin
    #[arg(short = 'e', long = "entity", alias = "data", value_name = "SPEC")]
    entity: Option<String>,

    /// Raw inputs: a document of name/value pairs or a urlencoded body
    #[arg(short = 'i', long = "inputs", value_name = "SPEC")]
    inputs: Option<String>,

    /// Uploaded files: a document mapping field names to stored paths
    #[arg(short = 'u', long = "uploads", value_name = "SPEC")]
    uploads: Option<String>,

    /// Visible row count of a list field (defaults to the entity's list length)
    #[arg(long = "list-size", value_name = "ATTR=N", action = ArgAction::Append)]
    list_sizes: Vec<String>,

    /// Mark a checkbox field as checked
    #[arg(long = "checked", value_name = "ATTR", action = ArgAction::Append)]
    checked: Vec<String>,

    /// Attach a stored file to a file or gallery field
    #[arg(long = "attach", value_name = "ATTR=PATH", action = ArgAction::Append)]
    attachments: Vec<String>,

    /// Infer the catalog from the entity when no catalog is given
    #[arg(long = "infer")]
    infer: bool,

    /// Output destinations ("-" writes to stdout). Accepts multiple values per flag use.
    #[arg(short = 'o', long = "output", value_name = "DEST", num_args = 1.., action = ArgAction::Append)]
    outputs: Vec<String>,

    /// Emit compact JSON/TOML rather than pretty formatting
    #[arg(long = "no-pretty")]
    no_pretty: bool,

    /// Overwrite output files even if they already exist
    #[arg(short = 'f', long = "force", short_alias = 'y', alias = "yes")]
    force: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();
    let cli = Cli::parse();

    let mut problems = Problems::default();
    let documents = Documents::load(&cli, &mut problems);

    let list_sizes = parse_assignments(&cli.list_sizes, "list-size", &mut problems)
        .into_iter()
        .filter_map(|(attr, raw)| match raw.parse::<usize>() {
            Ok(size) => Some((attr, size)),
            Err(_) => {
                problems.input("list-size", format!("'{raw}' is not a row count"));
                None
            }
        })
        .collect::<Vec<_>>();
    let attachments = parse_assignments(&cli.attachments, "attach", &mut problems);
    let output = plan_output(&cli, &mut problems);

    problems.into_result()?;

    let catalog = match (documents.catalog, documents.entity.as_ref()) {
        (Some(catalog), _) => catalog,
        (None, Some(existing)) if cli.infer => {
            catalog_from_entity(&existing.to_value()).map_err(Report::msg)?
        }
        (None, _) => return Err(eyre!("provide --catalog, or --infer together with --entity")),
    };
    let entity = documents.entity.unwrap_or_default();

    let mut form = EditForm::new(catalog, entity);
    apply_list_sizes(&mut form, &list_sizes)?;
    apply_checked(&mut form, &cli.checked)?;
    apply_attachments(&mut form, attachments)?;
    for (field_name, path) in documents.uploads.unwrap_or_default() {
        form.state_mut().record_upload(field_name, path);
    }

    let inputs = documents.inputs.unwrap_or_default();
    debug!(inputs = inputs.len(), "submitting raw inputs");
    let entity = form
        .submit(&inputs, |_| Ok(()))
        .map_err(|err| Report::new(err).wrap_err("submission rejected"))?;

    if let Some(options) = output {
        emit_entity(&entity, &options).map_err(Report::msg)?;
        info!(destinations = options.destinations.len(), "entity written");
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn position_of(form: &EditForm, attribute: &str, flag: &str) -> Result<usize> {
    form.catalog()
        .position(attribute)
        .ok_or_else(|| eyre!("--{flag}: '{attribute}' is not a catalog attribute"))
}

fn apply_list_sizes(form: &mut EditForm, sizes: &[(String, usize)]) -> Result<()> {
    for (attribute, size) in sizes {
        let index = position_of(form, attribute, "list-size")?;
        if !form.catalog().fields()[index].kind.is_list() {
            return Err(eyre!("--list-size: '{attribute}' is not a list field"));
        }
        form.state_mut().set_visible_len(index, *size);
    }
    Ok(())
}

fn apply_checked(form: &mut EditForm, attributes: &[String]) -> Result<()> {
    for attribute in attributes {
        position_of(form, attribute, "checked")?;
        form.toggle_checkbox(attribute, true);
    }
    Ok(())
}

fn apply_attachments(form: &mut EditForm, attachments: Vec<(String, String)>) -> Result<()> {
    let mut grouped: Vec<(String, Vec<StoredFile>)> = Vec::new();
    for (attribute, path) in attachments {
        let index = position_of(form, &attribute, "attach")?;
        if !form.catalog().fields()[index].kind.takes_files() {
            return Err(eyre!("--attach: '{attribute}' does not take files"));
        }
        match grouped.iter_mut().find(|(name, _)| *name == attribute) {
            Some((_, files)) => files.push(StoredFile::new(path)),
            None => grouped.push((attribute, vec![StoredFile::new(path)])),
        }
    }
    for (attribute, files) in grouped {
        form.attach_files(&attribute, files);
    }
    Ok(())
}

fn parse_assignments(
    raw: &[String],
    label: &str,
    problems: &mut Problems,
) -> Vec<(String, String)> {
    raw.iter()
        .filter_map(|item| match item.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                Some((name.trim().to_string(), value.to_string()))
            }
            _ => {
                problems.input(label, format!("expected ATTR=VALUE, got '{item}'"));
                None
            }
        })
        .collect()
}

/// Where a document argument comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DocumentSource {
    Stdin,
    File(PathBuf),
    Inline(String),
}

impl DocumentSource {
    /// `-` is stdin and an existing file is read; anything else is the
    /// payload itself.
    fn resolve(spec: &str) -> Self {
        if spec == "-" {
            DocumentSource::Stdin
        } else if Path::new(spec).is_file() {
            DocumentSource::File(PathBuf::from(spec))
        } else {
            DocumentSource::Inline(spec.to_string())
        }
    }

    /// Format named by a file extension, JSON otherwise.
    fn preferred_format(&self) -> DocumentFormat {
        match self {
            DocumentSource::File(path) => DocumentFormat::from_path(path).unwrap_or_default(),
            DocumentSource::Stdin | DocumentSource::Inline(_) => DocumentFormat::default(),
        }
    }

    fn read(&self) -> io::Result<String> {
        match self {
            DocumentSource::Stdin => {
                let mut buffer = String::new();
                io::stdin().read_to_string(&mut buffer)?;
                Ok(buffer)
            }
            DocumentSource::File(path) => fs::read_to_string(path),
            DocumentSource::Inline(payload) => Ok(payload.clone()),
        }
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentSource::Stdin => write!(f, "stdin"),
            DocumentSource::File(path) => write!(f, "{}", path.display()),
            DocumentSource::Inline(_) => write!(f, "inline payload"),
        }
    }
}

/// Everything the command line asked to load, already typed.
#[derive(Debug, Default)]
struct Documents {
    catalog: Option<FieldCatalog>,
    entity: Option<Entity>,
    inputs: Option<RawInputSet>,
    uploads: Option<UploadedFileMap>,
}

impl Documents {
    fn load(cli: &Cli, problems: &mut Problems) -> Self {
        let specs = [
            ("catalog", cli.catalog.as_deref()),
            ("entity", cli.entity.as_deref()),
            ("inputs", cli.inputs.as_deref()),
            ("uploads", cli.uploads.as_deref()),
        ];
        let from_stdin: Vec<&str> = specs
            .iter()
            .filter(|(_, spec)| *spec == Some("-"))
            .map(|(label, _)| *label)
            .collect();
        if from_stdin.len() > 1 {
            problems.input(
                &from_stdin.join("/"),
                "only one of catalog, entity, inputs and uploads can be read from stdin",
            );
            return Self::default();
        }

        Self {
            catalog: load(cli.catalog.as_deref(), "catalog", problems, catalog_from_str),
            entity: load(cli.entity.as_deref(), "entity", problems, entity_from_str),
            inputs: load(cli.inputs.as_deref(), "inputs", problems, |contents, format| {
                raw_inputs_from_str(contents, format)
                    .or_else(|_| RawInputSet::from_urlencoded(contents))
            }),
            uploads: load(cli.uploads.as_deref(), "uploads", problems, |contents, format| {
                parse_document_str(contents, format).and_then(|value| uploads_from_value(&value))
            }),
        }
    }
}

fn load<T, E: fmt::Display>(
    spec: Option<&str>,
    label: &str,
    problems: &mut Problems,
    parse: impl Fn(&str, DocumentFormat) -> Result<T, E>,
) -> Option<T> {
    let source = DocumentSource::resolve(spec?);
    let contents = match source.read() {
        Ok(contents) => contents,
        Err(err) => {
            problems.input(label, format!("cannot read {source}: {err}"));
            return None;
        }
    };
    match parse_in_any_format(&contents, source.preferred_format(), parse) {
        Ok(document) => Some(document),
        Err(err) => {
            problems.input(label, format!("{source}: {err:#}"));
            None
        }
    }
}

/// Try the preferred format, then every other compiled-in one. The
/// preferred format's error is the one reported.
fn parse_in_any_format<T, E>(
    contents: &str,
    preferred: DocumentFormat,
    parse: impl Fn(&str, DocumentFormat) -> Result<T, E>,
) -> Result<T, E> {
    let first_error = match parse(contents, preferred) {
        Ok(document) => return Ok(document),
        Err(err) => err,
    };
    DocumentFormat::available_formats()
        .into_iter()
        .filter(|format| *format != preferred)
        .find_map(|format| parse(contents, format).ok())
        .ok_or(first_error)
}

/// Problems found before anything is submitted, reported together.
#[derive(Debug, Default)]
struct Problems {
    messages: Vec<String>,
}

impl Problems {
    fn input(&mut self, label: &str, message: impl Into<String>) {
        self.messages
            .push(format!("input ({label}): {}", message.into()));
    }

    fn output(&mut self, message: impl Into<String>) {
        self.messages.push(format!("output: {}", message.into()));
    }

    fn into_result(self) -> Result<()> {
        if self.messages.is_empty() {
            return Ok(());
        }
        let mut body = String::from("nothing was submitted:\n");
        for (idx, msg) in self.messages.iter().enumerate() {
            let _ = writeln!(body, "  {}. {}", idx + 1, msg);
        }
        Err(eyre!(body))
    }
}

/// Output options for the `--output` flags, or `None` when they are unusable.
/// Stdout-only output follows the entity file's format.
fn plan_output(cli: &Cli, problems: &mut Problems) -> Option<OutputOptions> {
    let mut destinations = Vec::new();
    for raw in &cli.outputs {
        if raw.trim().is_empty() {
            problems.output("output destination cannot be empty");
        } else {
            destinations.push(OutputDestination::parse(raw));
        }
    }
    if destinations.is_empty() {
        if !cli.outputs.is_empty() {
            return None;
        }
        destinations.push(OutputDestination::Stdout);
    }

    let fallback = cli
        .entity
        .as_deref()
        .map(DocumentSource::resolve)
        .map_or_else(DocumentFormat::default, |source| source.preferred_format());
    let options = match OutputOptions::for_destinations(destinations, fallback) {
        Ok(options) => options.with_pretty(!cli.no_pretty),
        Err(err) => {
            problems.output(format!("{err:#}"));
            return None;
        }
    };
    if !cli.force {
        for path in options.existing_files() {
            problems.output(format!(
                "file {} already exists (pass --force to overwrite)",
                path.display()
            ));
        }
    }
    Some(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignments_need_a_name_and_an_equals_sign() {
        let mut problems = Problems::default();
        let parsed = parse_assignments(
            &["tags=3".to_string(), "=2".to_string(), "oops".to_string()],
            "list-size",
            &mut problems,
        );
        assert_eq!(parsed, vec![("tags".to_string(), "3".to_string())]);
        assert_eq!(problems.messages.len(), 2);
    }

    #[test]
    fn long_payloads_that_name_no_file_are_inline() {
        let payload = format!(r#"{{"fields": [], "title": "{}"}}"#, "x".repeat(400));
        assert_eq!(
            DocumentSource::resolve(&payload),
            DocumentSource::Inline(payload.clone())
        );
        assert_eq!(DocumentSource::resolve("-"), DocumentSource::Stdin);
        assert_eq!(
            DocumentSource::resolve("missing/catalog.json"),
            DocumentSource::Inline("missing/catalog.json".to_string())
        );
    }

    #[test]
    fn existing_files_are_read_in_their_extension_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entity.json");
        fs::write(&path, r#"{"id": "u1"}"#).unwrap();
        let spec = path.to_string_lossy().into_owned();

        let source = DocumentSource::resolve(&spec);
        assert_eq!(source, DocumentSource::File(path));
        assert_eq!(source.preferred_format(), DocumentFormat::Json);
        assert_eq!(source.read().unwrap(), r#"{"id": "u1"}"#);
    }

    #[test]
    fn unreadable_documents_are_collected_as_problems() {
        let mut problems = Problems::default();
        let catalog = load(Some("not a catalog"), "catalog", &mut problems, catalog_from_str);
        assert!(catalog.is_none());
        assert_eq!(problems.messages.len(), 1);
        assert!(problems.messages[0].starts_with("input (catalog): inline payload"));
    }

    #[test]
    fn unknown_output_extensions_are_reported() {
        let cli = Cli::parse_from(["editform", "--output", "out.txt"]);
        let mut problems = Problems::default();
        assert!(plan_output(&cli, &mut problems).is_none());
        assert_eq!(problems.messages.len(), 1);
    }
}

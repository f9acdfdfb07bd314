use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::form::{Entity, EntityValue, Scalar};

use super::DocumentFormat;

/// Where a reconciled entity is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDestination {
    Stdout,
    File(PathBuf),
}

impl OutputDestination {
    pub fn file(path: impl AsRef<Path>) -> Self {
        OutputDestination::File(path.as_ref().to_path_buf())
    }

    /// `-` is stdout, anything else a file path.
    pub fn parse(spec: &str) -> Self {
        match spec {
            "-" => OutputDestination::Stdout,
            path => OutputDestination::file(path),
        }
    }

    fn write(&self, payload: &str) -> Result<()> {
        match self {
            OutputDestination::Stdout => {
                let mut stdout = io::stdout().lock();
                writeln!(stdout, "{payload}")
                    .and_then(|_| stdout.flush())
                    .context("failed to write entity to stdout")
            }
            OutputDestination::File(path) => fs::write(path, format!("{payload}\n"))
                .with_context(|| format!("failed to write entity to {}", path.display())),
        }
    }
}

/// How and where the reconciled entity is written.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format: DocumentFormat,
    pub pretty: bool,
    pub destinations: Vec<OutputDestination>,
}

impl OutputOptions {
    pub fn new(format: DocumentFormat) -> Self {
        Self {
            format,
            pretty: true,
            destinations: vec![OutputDestination::Stdout],
        }
    }

    /// Write to `destinations`, in the format their file extensions agree on.
    /// Stdout-only output uses `fallback`.
    pub fn for_destinations(
        destinations: Vec<OutputDestination>,
        fallback: DocumentFormat,
    ) -> Result<Self> {
        let mut format = None;
        for destination in &destinations {
            let OutputDestination::File(path) = destination else {
                continue;
            };
            let Some(detected) = DocumentFormat::from_path(path) else {
                bail!(
                    "cannot tell the format of {}; use one of the {} extensions",
                    path.display(),
                    extension_list()
                );
            };
            match format {
                Some(existing) if existing != detected => bail!(
                    "{} is {detected} but another destination is {existing}",
                    path.display()
                ),
                _ => format = Some(detected),
            }
        }
        Ok(Self::new(format.unwrap_or(fallback)).with_destinations(destinations))
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_destinations(mut self, destinations: Vec<OutputDestination>) -> Self {
        self.destinations = destinations;
        self
    }

    /// Files among the destinations that would be overwritten.
    pub fn existing_files(&self) -> Vec<&Path> {
        self.destinations
            .iter()
            .filter_map(|destination| match destination {
                OutputDestination::File(path) if path.exists() => Some(path.as_path()),
                _ => None,
            })
            .collect()
    }
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self::new(DocumentFormat::Json)
    }
}

/// Render the entity once and write it to every destination.
pub fn emit_entity(entity: &Entity, options: &OutputOptions) -> Result<()> {
    if options.destinations.is_empty() {
        return Ok(());
    }
    let payload = render_entity(entity, options.format, options.pretty)?;
    for destination in &options.destinations {
        destination.write(&payload)?;
    }
    Ok(())
}

/// Serialize an entity, attributes in entity order. YAML ignores `pretty`.
pub fn render_entity(entity: &Entity, format: DocumentFormat, pretty: bool) -> Result<String> {
    match format {
        DocumentFormat::Json if pretty => {
            serde_json::to_string_pretty(entity).context("failed to serialize entity as JSON")
        }
        DocumentFormat::Json => {
            serde_json::to_string(entity).context("failed to serialize entity as JSON")
        }
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => {
            serde_yaml::to_string(entity).context("failed to serialize entity as YAML")
        }
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => {
            let nulls = null_attributes(entity);
            if !nulls.is_empty() {
                bail!("TOML has no null; clear {} first", nulls.join(", "));
            }
            let rendered = if pretty {
                toml::to_string_pretty(entity)
            } else {
                toml::to_string(entity)
            };
            rendered.context("failed to serialize entity as TOML")
        }
    }
}

#[cfg_attr(not(feature = "toml"), allow(dead_code))]
fn null_attributes(entity: &Entity) -> Vec<&str> {
    entity
        .iter()
        .filter(|(_, value)| matches!(value, EntityValue::Scalar(Scalar::Null)))
        .map(|(attribute, _)| attribute.as_str())
        .collect()
}

fn extension_list() -> String {
    DocumentFormat::available_formats()
        .iter()
        .map(|format| format!(".{format}"))
        .collect::<Vec<_>>()
        .join("/")
}

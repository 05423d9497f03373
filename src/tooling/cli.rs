//! CLI Tooling
//!
//! Command-line interface over a workspace artifact tree. Every command runs
//! against a freshly loaded [`TaxonomyService`] and renders text (tables) or json.

use crate::config::{ConfigLoader, TaxonomyConfig};
use crate::error::TaxonomyError;
use crate::model::{AnyArtifact, Artifact, TokenSpecification};
use crate::mutation::{DeleteArtifactRequest, MutationResponse, NewArtifactRequest};
use crate::query::QueryOptions;
use crate::service::TaxonomyService;
use crate::types::{ArtifactSymbol, ArtifactType};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::info;

/// Taxonomy CLI - inspect and maintain a token taxonomy artifact tree
#[derive(Parser)]
#[command(name = "taxonomy")]
#[command(about = "Inspect and maintain a token taxonomy artifact tree")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the loaded version and collection sizes
    Summary {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List one page of a collection
    List {
        /// Artifact type (base, behavior, behavior-group, property-set, token-template)
        artifact_type: String,
        /// Page size (0 uses the configured default)
        #[arg(long, default_value_t = 0)]
        max: usize,
        /// Index of the first item
        #[arg(long, default_value_t = 0)]
        start: usize,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show one artifact by tooling symbol
    Get {
        artifact_type: String,
        symbol: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show a token template's formula
    Formula {
        /// Formula id (template tooling symbol)
        id: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show a token template with its references resolved
    Definition {
        id: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show a fully resolved token specification
    Spec {
        id: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Check whether a name and tooling symbol are free in a collection
    Check {
        artifact_type: String,
        name: String,
        symbol: String,
    },
    /// Create an artifact from a descriptor file
    Create {
        artifact_type: String,
        /// Descriptor json file
        #[arg(long)]
        descriptor: PathBuf,
        /// Generate a unique name and symbol on collision
        #[arg(long)]
        resolve_collisions: bool,
    },
    /// Delete an artifact by tooling symbol
    Delete { artifact_type: String, symbol: String },
    /// Commit local artifact changes
    Commit {
        #[arg(long, short)]
        message: String,
    },
    /// Pull remote artifact changes and reload
    Pull,
}

/// Resolve configuration for a CLI invocation, applying logging flags
pub fn load_config(cli: &Cli) -> Result<TaxonomyConfig, TaxonomyError> {
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load(&cli.workspace)?,
    };
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }
    if let Some(output) = &cli.log_output {
        config.logging.output = output.clone();
    }
    if let Some(file) = &cli.log_file {
        config.logging.file = Some(file.clone());
    }
    Ok(config)
}

/// CLI context holding the loaded service
pub struct CliContext {
    service: TaxonomyService,
}

impl CliContext {
    pub fn new(workspace_root: &Path, config: TaxonomyConfig) -> Result<Self, TaxonomyError> {
        let service = TaxonomyService::load(config, workspace_root)?;
        Ok(Self { service })
    }

    pub fn service(&self) -> &TaxonomyService {
        &self.service
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, TaxonomyError> {
        match command {
            Commands::Summary { format } => self.summary(format),
            Commands::List {
                artifact_type,
                max,
                start,
                format,
            } => self.list(artifact_type, *max, *start, format),
            Commands::Get {
                artifact_type,
                symbol,
                format,
            } => self.get(artifact_type, symbol, format),
            Commands::Formula { id, format } => {
                let formula = self.service.get_template_formula_artifact(id)?;
                if is_json(format)? {
                    return to_json(&formula);
                }
                let mut table = table(vec!["Part", "Symbols"]);
                table.add_row(vec!["Formula".to_string(), formula.formula.clone()]);
                table.add_row(vec!["Base".to_string(), formula.base.tooling.clone()]);
                table.add_row(vec!["Behaviors".to_string(), join_symbols(&formula.behaviors)]);
                table.add_row(vec![
                    "Behavior groups".to_string(),
                    join_symbols(&formula.behavior_groups),
                ]);
                table.add_row(vec!["Property sets".to_string(), join_symbols(&formula.property_sets)]);
                table.add_row(vec!["Children".to_string(), join_symbols(&formula.child_tokens)]);
                Ok(format!("{}\n{}", formula.artifact.name, table))
            }
            Commands::Definition { id, format } => {
                let definition = self.service.get_template_definition_artifact(id)?;
                if is_json(format)? {
                    return to_json(&definition);
                }
                let mut table = table(vec!["Kind", "Symbol", "Name"]);
                let base = &definition.base.artifact;
                table.add_row(vec!["Base", base.tooling(), base.name.as_str()]);
                for b in &definition.behaviors {
                    table.add_row(vec!["Behavior", b.artifact.tooling(), b.artifact.name.as_str()]);
                }
                for g in &definition.behavior_groups {
                    table.add_row(vec!["BehaviorGroup", g.artifact.tooling(), g.artifact.name.as_str()]);
                }
                for p in &definition.property_sets {
                    table.add_row(vec!["PropertySet", p.artifact.tooling(), p.artifact.name.as_str()]);
                }
                Ok(format!("{} ({})\n{}", definition.artifact.name, definition.formula, table))
            }
            Commands::Spec { id, format } => {
                let spec = self.service.get_token_specification(id)?;
                if is_json(format)? {
                    return to_json(&spec);
                }
                let mut output = String::new();
                render_specification(&spec, 0, &mut output);
                Ok(output)
            }
            Commands::Check {
                artifact_type,
                name,
                symbol,
            } => {
                let artifact_type: ArtifactType = artifact_type.parse()?;
                if self.service.check_unique(artifact_type, name, symbol) {
                    Ok(format!("{} {} ({}) is available", artifact_type, name, symbol))
                } else {
                    Ok(format!("{} {} ({}) is already taken", artifact_type, name, symbol))
                }
            }
            Commands::Create {
                artifact_type,
                descriptor,
                resolve_collisions,
            } => {
                let artifact_type: ArtifactType = artifact_type.parse()?;
                let json = std::fs::read_to_string(descriptor)?;
                let artifact = AnyArtifact::from_descriptor(artifact_type, &json)?;
                info!(descriptor = %descriptor.display(), "Creating artifact from descriptor");
                let response = self.service.create_artifact(NewArtifactRequest {
                    artifact,
                    resolve_collisions: *resolve_collisions,
                });
                match (response.success, response.artifact) {
                    (true, Some(created)) => Ok(format!(
                        "Created {} {} ({}) in {}",
                        created.artifact_type(),
                        created.artifact().name,
                        created.tooling(),
                        created.artifact().folder.as_deref().unwrap_or_default()
                    )),
                    _ => Err(failure("Create", response.reason)),
                }
            }
            Commands::Delete {
                artifact_type,
                symbol,
            } => {
                let artifact_type: ArtifactType = artifact_type.parse()?;
                let response = self.service.delete_artifact(DeleteArtifactRequest {
                    artifact_type,
                    symbol: ArtifactSymbol::tooling(symbol.as_str()),
                });
                respond(response, format!("Deleted {} {}", artifact_type, symbol))
            }
            Commands::Commit { message } => respond(
                self.service.commit_local_updates(message),
                "Committed local updates".to_string(),
            ),
            Commands::Pull => respond(
                self.service.pull_updates(),
                format!("Pulled updates, now at version {}", self.service.current_version()),
            ),
        }
    }

    fn summary(&self, format: &str) -> Result<String, TaxonomyError> {
        let store = self.service.live();
        let taxonomy = store.read();
        if is_json(format)? {
            return to_json(&json!({
                "version": taxonomy.version,
                "root": self.service.artifact_root().display().to_string(),
                "counts": taxonomy.counts(),
            }));
        }

        let mut table = table(vec!["Type", "Folder", "Count"]);
        for artifact_type in ArtifactType::ALL {
            table.add_row(vec![
                artifact_type.to_string(),
                artifact_type.folder_name().to_string(),
                taxonomy.len(artifact_type).to_string(),
            ]);
        }
        Ok(format!(
            "Taxonomy {} at {}\n{}",
            taxonomy.version,
            self.service.artifact_root().display(),
            table
        ))
    }

    fn list(&self, artifact_type: &str, max: usize, start: usize, format: &str) -> Result<String, TaxonomyError> {
        let json_output = is_json(format)?;
        let result = self.service.list_by_type(&QueryOptions {
            artifact_type: artifact_type.to_string(),
            max_item_return: max,
            last_item_index: start,
        })?;
        if json_output {
            return to_json(&result);
        }

        let store = self.service.live();
        let taxonomy = store.read();
        let mut table = table(vec!["Symbol", "Visual", "Name", "Folder"]);
        for tooling in result.artifact_collection.symbols() {
            if let Some(artifact) = taxonomy.find_artifact(result.artifact_type, tooling) {
                table.add_row(vec![
                    artifact.tooling(),
                    artifact.artifact_symbol.visual.as_str(),
                    artifact.name.as_str(),
                    artifact.folder.as_deref().unwrap_or("-"),
                ]);
            }
        }
        Ok(format!(
            "{}\nItems {}..{} of {}",
            table, result.first_item_index, result.last_item_index, result.total_items_in_collection
        ))
    }

    fn get(&self, artifact_type: &str, symbol: &str, format: &str) -> Result<String, TaxonomyError> {
        let artifact_type: ArtifactType = artifact_type.parse()?;
        let json_output = is_json(format)?;
        let record = self
            .service
            .live()
            .read()
            .record(artifact_type, symbol)
            .ok_or_else(|| {
                TaxonomyError::NotFound(format!("{} with tooling symbol {}", artifact_type, symbol))
            })?;
        if json_output {
            return to_json(&record);
        }
        Ok(format_artifact(record.artifact()))
    }
}

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(header);
    table
}

fn is_json(format: &str) -> Result<bool, TaxonomyError> {
    match format {
        "json" => Ok(true),
        "text" => Ok(false),
        other => Err(TaxonomyError::InvalidArgument(format!(
            "Invalid output format: {} (must be 'text' or 'json')",
            other
        ))),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, TaxonomyError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn join_symbols(symbols: &[ArtifactSymbol]) -> String {
    if symbols.is_empty() {
        return "-".to_string();
    }
    symbols
        .iter()
        .map(|s| s.tooling.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn failure(operation: &str, reason: Option<String>) -> TaxonomyError {
    TaxonomyError::InvalidArgument(format!(
        "{} failed: {}",
        operation,
        reason.unwrap_or_else(|| "unknown reason".to_string())
    ))
}

fn respond(response: MutationResponse, message: String) -> Result<String, TaxonomyError> {
    if response.success {
        Ok(message)
    } else {
        Err(failure("Operation", response.reason))
    }
}

fn format_artifact(artifact: &Artifact) -> String {
    let mut table = table(vec!["Field", "Value"]);
    table.add_row(vec!["Name", artifact.name.as_str()]);
    let artifact_type = artifact.artifact_type.to_string();
    table.add_row(vec!["Type", artifact_type.as_str()]);
    table.add_row(vec!["Tooling symbol", artifact.tooling()]);
    table.add_row(vec!["Visual symbol", artifact.artifact_symbol.visual.as_str()]);
    table.add_row(vec!["Folder", artifact.folder.as_deref().unwrap_or("-")]);
    table.add_row(vec![
        "Description",
        artifact.artifact_definition.business_description.as_str(),
    ]);
    let aliases = artifact.aliases.join(", ");
    table.add_row(vec!["Aliases", aliases.as_str()]);
    let files = artifact
        .artifact_files
        .iter()
        .map(|f| format!("{} ({:?}, {} bytes)", f.file_name, f.content, f.file_data.len()))
        .collect::<Vec<_>>()
        .join("\n");
    table.add_row(vec!["Files", files.as_str()]);
    table.to_string()
}

fn render_specification(spec: &TokenSpecification, depth: usize, output: &mut String) {
    let indent = "  ".repeat(depth);
    output.push_str(&format!(
        "{}{} [{}]\n",
        indent, spec.artifact.name, spec.formula
    ));
    output.push_str(&format!(
        "{}  base: {} ({})\n",
        indent,
        spec.base.artifact.name,
        spec.base.artifact.tooling()
    ));
    for behavior in &spec.behaviors {
        output.push_str(&format!(
            "{}  behavior: {} ({})\n",
            indent,
            behavior.artifact.name,
            behavior.artifact.tooling()
        ));
    }
    for property_set in &spec.property_sets {
        output.push_str(&format!(
            "{}  property set: {} ({})\n",
            indent,
            property_set.artifact.name,
            property_set.artifact.tooling()
        ));
    }
    for child in &spec.child_tokens {
        render_specification(child, depth + 1, output);
    }
}

//! refschema CLI
//!
//! Validates data documents against a JSON Schema, registering auxiliary
//! schema documents so cross-document `$ref`s resolve.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use refschema::config::{CliConfig, OutputFormat};
use refschema::registry::refs_in;
use refschema::Validator;

#[derive(Parser)]
#[command(name = "refschema")]
#[command(about = "Validate JSON documents against schemas with $ref resolution")]
struct Cli {
    /// Path to a config file (refschema.toml)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate data documents against a schema
    Validate {
        /// Schema document
        #[arg(short = 'S', long)]
        schema: PathBuf,

        /// Data documents to validate
        #[arg(required = true)]
        data: Vec<PathBuf>,

        /// Register an auxiliary schema: URI=PATH (repeatable)
        #[arg(short = 's', long = "register", value_name = "URI=PATH")]
        register: Vec<String>,

        /// Register every *.json document under this directory
        #[arg(long)]
        schemas_dir: Option<PathBuf>,

        /// Emit the result as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List every $ref in a schema and whether it resolves
    Refs {
        /// Schema document
        #[arg(short = 'S', long)]
        schema: PathBuf,

        /// Register an auxiliary schema: URI=PATH (repeatable)
        #[arg(short = 's', long = "register", value_name = "URI=PATH")]
        register: Vec<String>,

        /// Register every *.json document under this directory
        #[arg(long)]
        schemas_dir: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::load_from(cli.config.as_deref())?;

    match cli.command {
        Commands::Validate {
            schema,
            data,
            register,
            schemas_dir,
            json,
        } => {
            let schema_doc = load_json(&schema)?;
            let validator = build_validator(&config, &schema_doc, &register, schemas_dir.as_deref())?;

            let format = if json {
                OutputFormat::Json
            } else {
                config.output.format
            };

            let mut all_valid = true;
            for path in &data {
                let doc = load_json(path)?;
                let result = validator.validate(&doc, &schema_doc)?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&result)?);
                    }
                    OutputFormat::Text => {
                        if result.valid {
                            println!("✅ {} - valid", path.display());
                        } else {
                            println!("❌ {} - {} error(s)", path.display(), result.errors.len());
                            for error in &result.errors {
                                let prop = if error.property.is_empty() {
                                    "(root)"
                                } else {
                                    &error.property
                                };
                                println!("   └─ {}: {} [{}]", prop, error.message, error.keyword);
                            }
                        }
                    }
                }

                if !result.valid {
                    all_valid = false;
                    if config.validation.fail_fast {
                        break;
                    }
                }
            }

            if !all_valid {
                std::process::exit(1);
            }
            Ok(())
        }

        Commands::Refs {
            schema,
            register,
            schemas_dir,
        } => {
            let schema_doc = load_json(&schema)?;
            let validator = build_validator(&config, &schema_doc, &register, schemas_dir.as_deref())?;

            let current_uri = document_uri(&schema_doc);
            let refs = refs_in(&schema_doc);

            if refs.is_empty() {
                println!("No $refs in {}", schema.display());
                return Ok(());
            }

            let mut all_resolved = true;
            for reference in &refs {
                match validator.registry().resolve(reference, &current_uri) {
                    Ok(_) => println!("✅ {}", reference),
                    Err(e) => {
                        println!("❌ {} - {}", reference, e);
                        all_resolved = false;
                    }
                }
            }

            if !all_resolved {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

/// Build a validator with the root schema and all auxiliary documents registered
fn build_validator(
    config: &CliConfig,
    schema_doc: &Value,
    register: &[String],
    schemas_dir: Option<&Path>,
) -> anyhow::Result<Validator> {
    let mut validator = Validator::new().max_ref_depth(config.validation.max_ref_depth);

    if let Some(dir) = schemas_dir.or(config.schemas.dir.as_deref()) {
        register_directory(&mut validator, dir)?;
    }

    for entry in register {
        let (uri, path) = entry
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("--register expects URI=PATH, got '{}'", entry))?;
        let doc = load_json(Path::new(path))?;
        validator.add_schema(doc, uri);
    }

    // Register the root schema so same-document refs resolve.
    let uri = document_uri(schema_doc);
    validator.add_schema(schema_doc.clone(), &uri);

    Ok(validator)
}

/// Register every *.json file under `dir`, keyed by its path relative to `dir`
fn register_directory(validator: &mut Validator, dir: &Path) -> anyhow::Result<()> {
    for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() || path.extension().map(|e| e != "json").unwrap_or(true) {
            continue;
        }
        let doc = load_json(path)?;
        let relative = path.strip_prefix(dir).unwrap_or(path);
        let uri = format!("/{}", relative.to_string_lossy());
        validator.add_schema(doc, &uri);
    }
    Ok(())
}

/// URI a document knows itself by: its `id`/`$id`, or empty
fn document_uri(doc: &Value) -> String {
    doc.get("id")
        .or_else(|| doc.get("$id"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn load_json(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
    let doc = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {}", path.display(), e))?;
    Ok(doc)
}

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use neuroform_client::{FileSessionIdStore, HttpSessionStore, RemoteConfig, SchemaCatalog};
use neuroform_core::actions;
use neuroform_core::schema::SchemaSource;
use neuroform_core::session::{SectionValues, SessionStore};
use neuroform_core::value::parse_field_value;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "neuroform")]
#[command(about = "Neuroform CLI - inspect and edit the EEG pipeline session", long_about = None)]
struct Cli {
    /// Backend URL (overrides config file and environment)
    #[arg(long, global = true)]
    backend: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the field schema of a section
    Schema {
        /// Section name, e.g. "filter" or "epochs"
        section: String,
    },
    /// Dump the current remote session document
    Session,
    /// Patch section values directly (no debounce)
    Set {
        /// Section name, e.g. "filter"
        section: String,
        /// Field assignments, e.g. l_freq=1.5 notch=
        #[arg(required = true)]
        assignments: Vec<String>,
    },
    /// List actions and the tabs they require
    Actions {
        /// Limit the listing to one action
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = match cli.backend {
        Some(backend_url) => RemoteConfig { backend_url },
        None => RemoteConfig::load().context("failed to load configuration")?,
    };

    match cli.command {
        Commands::Schema { section } => print_schema(&config, &section).await,
        Commands::Session => print_session(&config).await,
        Commands::Set {
            section,
            assignments,
        } => set_values(&config, &section, &assignments).await,
        Commands::Actions { name } => {
            print_actions(name.as_deref());
            Ok(())
        }
    }
}

fn session_store(config: &RemoteConfig) -> Result<HttpSessionStore> {
    let ids = FileSessionIdStore::default_location()
        .context("failed to open the session id store")?;
    Ok(HttpSessionStore::from_config(config, Arc::new(ids)))
}

async fn print_schema(config: &RemoteConfig, section: &str) -> Result<()> {
    let catalog = SchemaCatalog::new(config.backend_url.clone());
    let schema = catalog.fetch(section).await?;

    if let Some(title) = &schema.title {
        println!("{} ({})", title, section);
    } else {
        println!("{}", section);
    }

    for (name, field) in schema.editable_fields() {
        let Some(kind) = field.kind else { continue };
        let mut line = format!("  {:24} {}", name, kind);
        if let Some(group) = &field.group {
            line.push_str(&format!("  group={}", group));
        }
        if let Some(default) = field.default_value() {
            line.push_str(&format!("  default={}", default));
        }
        if let Some(unit) = &field.unit {
            line.push_str(&format!("  [{}]", unit));
        }
        println!("{}", line);
    }

    Ok(())
}

async fn print_session(config: &RemoteConfig) -> Result<()> {
    let store = session_store(config)?;
    let document = store.load().await?;

    if let Some(id) = &document.session_id {
        eprintln!("note: server issued replacement session id {}", id);
    }

    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

async fn set_values(config: &RemoteConfig, section: &str, assignments: &[String]) -> Result<()> {
    let catalog = SchemaCatalog::new(config.backend_url.clone());
    let schema = catalog.fetch(section).await?;

    let mut values = SectionValues::new();
    for assignment in assignments {
        let Some((field, raw)) = assignment.split_once('=') else {
            bail!("expected field=value, got '{}'", assignment);
        };

        let Some(descriptor) = schema.field(field) else {
            bail!("section '{}' has no field '{}'", section, field);
        };
        let Some(kind) = descriptor.kind else {
            bail!("field '{}' is not editable", field);
        };

        values.insert(field.to_string(), parse_field_value(kind, field, raw)?);
    }

    let store = session_store(config)?;
    if let Some(new_id) = store.patch(section, &values).await? {
        eprintln!("note: server issued replacement session id {}", new_id);
    }

    println!("patched {} field(s) in '{}'", values.len(), section);
    Ok(())
}

fn print_actions(name: Option<&str>) {
    match name {
        Some(action) => {
            let tabs = actions::required_tabs(action);
            if tabs.is_empty() {
                println!("{}: no configuration needed", action);
                return;
            }
            println!("{}:", action);
            for tab in tabs {
                match actions::tab_spec(tab).and_then(|spec| spec.section) {
                    Some(section) => println!("  {} (section '{}')", tab, section),
                    None => println!("  {}", tab),
                }
            }
        }
        None => {
            for mode in actions::ACTION_MODES {
                println!("{} - {}", mode.name, mode.description);
                for (action, _) in mode.actions {
                    let tabs = actions::required_tabs(action);
                    if tabs.is_empty() {
                        println!("  {}", action);
                    } else {
                        println!("  {} -> {}", action, tabs.join(", "));
                    }
                }
            }
        }
    }
}

//! CLI module for catalog-guard.
//!
//! Subcommands:
//! - `check`: List the records referencing an entity
//! - `delete`: Delete an entity unless something references it
//! - `edit-check`: Decide whether an edit may change key fields
//! - `scanners`: Print the entity type -> scanners table
//!
//! Results are printed as JSON on stdout; logs go to stderr.

mod check;
mod delete;
mod scanners;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use serde::Serialize;

use crate::config::Config;
use crate::context::Context;
use crate::models::EntityKey;
use crate::resources::MemoryResources;

/// catalog-guard - referential usage guard for the ground-service catalog
#[derive(Parser)]
#[command(name = "catalog-guard")]
#[command(about = "Refuse catalog deletes and key edits while other records still reference the entity")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Read collections from a JSON fixture instead of the API (deletes are recorded, not sent)
    #[arg(long, global = true)]
    pub fixture: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the records referencing an entity
    Check {
        /// Entity type, e.g. service-type
        entity_type: String,
        /// Entity key
        key: String,
    },

    /// Delete an entity after checking it is unused
    Delete {
        /// Entity type, e.g. service-type
        entity_type: String,
        /// Entity key
        key: String,
        /// Label used in messages (defaults to the key)
        #[arg(long)]
        label: Option<String>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Check whether an edit of the given fields is allowed
    EditCheck {
        /// Entity type, e.g. service-type
        entity_type: String,
        /// Entity key
        key: String,
        /// Label used in messages (defaults to the key)
        #[arg(long)]
        label: Option<String>,
        /// Changed field (repeatable)
        #[arg(long = "field", required = true)]
        fields: Vec<String>,
    },

    /// Print the scanners registered for one or all entity types
    Scanners {
        /// Entity type to show (all when omitted)
        entity_type: Option<String>,
    },
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> Result<()> {
        match &self.command {
            Command::Check { entity_type, key } => self.run_check(entity_type, key).await,
            Command::Delete {
                entity_type,
                key,
                label,
                yes,
            } => {
                self.run_delete(entity_type, key, label.as_deref(), *yes)
                    .await
            }
            Command::EditCheck {
                entity_type,
                key,
                label,
                fields,
            } => {
                self.run_edit_check(entity_type, key, label.as_deref(), fields)
                    .await
            }
            Command::Scanners { entity_type } => self.run_scanners(entity_type.as_deref()),
        }
    }

    /// Build the context from configuration, or from the fixture when given.
    fn context(&self) -> Result<Context> {
        let config = Config::load()?;
        let context = match &self.fixture {
            Some(path) => {
                tracing::info!("Using fixture {}", path.display());
                let resources = Arc::new(MemoryResources::from_fixture(path)?);
                Context::with_resources(resources, config)?
            }
            None => {
                tracing::debug!("Using catalog API at {}", config.api.base_url);
                Context::from_config(config)?
            }
        };
        Ok(context)
    }
}

fn parse_key(raw: &str) -> Result<EntityKey> {
    let key = EntityKey::parse(raw);
    if key.is_empty() {
        return Err(color_eyre::eyre::eyre!("entity key must not be empty"));
    }
    Ok(key)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

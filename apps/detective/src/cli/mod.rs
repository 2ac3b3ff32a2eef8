//! # Detective CLI Module
//!
//! This module implements the command-line interface.
//!
//! ## Available Commands
//!
//! - `login` / `register` / `logout` / `profile` - Account session
//! - `cases` / `case` - List cases, select the active one
//! - `docs` / `read` / `entities` / `search` - Browse case material
//! - `pin` / `unpin` / `suspect` - Evidence and suspects
//! - `chat` / `hint` - Talk to the case assistant
//! - `board` - Investigation board (show, hubs, expand, path, find, layout,
//!   move, remove, clear, sync)
//! - `status` / `submit` / `reset` - Progress, final accusation, start over

mod commands;

use crate::api::{ApiError, Language};
use crate::config::{Config, ConfigOverrides};
use clap::{Parser, Subcommand};
use detective_core::primitives::DEFAULT_HUB_LIMIT;
use detective_core::{DocType, EntityType, ItemKind};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Office Detective - investigate corporate cases from the terminal.
#[derive(Parser, Debug)]
#[command(name = "detective")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the TOML configuration file
    #[arg(long, global = true, env = "DETECTIVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the local state database
    #[arg(short = 'S', long = "state", global = true, env = "DETECTIVE_STATE_PATH")]
    pub state: Option<PathBuf>,

    /// Base URL of the backend API
    #[arg(long, global = true, env = "DETECTIVE_API_URL")]
    pub api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "DETECTIVE_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Keep state in memory only (nothing is written to disk)
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Environment and flag values for the config layers.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            api_url: self.api_url.clone(),
            state_path: self.state.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the session
    Login {
        email: String,

        #[arg(short, long, env = "DETECTIVE_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and store the session
    Register {
        email: String,

        #[arg(short, long)]
        name: String,

        #[arg(short, long, env = "DETECTIVE_PASSWORD", hide_env_values = true)]
        password: String,

        /// Preferred language (en, es)
        #[arg(short, long)]
        language: Option<Language>,
    },

    /// Forget the stored session
    Logout,

    /// Show the profile, or update it when options are given
    Profile {
        #[arg(long)]
        name: Option<String>,

        /// Preferred language (en, es)
        #[arg(long)]
        language: Option<Language>,
    },

    /// List available cases
    Cases {
        #[arg(long, default_value = "0")]
        skip: usize,

        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Select the active case (switching clears local progress)
    Case { case_id: String },

    /// List documents of the active case
    Docs {
        /// Only this document type
        #[arg(short = 't', long)]
        doc_type: Option<DocType>,

        /// Page size
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Follow pagination until every document is listed
        #[arg(short, long)]
        all: bool,
    },

    /// Read a document and mark it as opened
    Read { doc_id: String },

    /// List entities of the active case
    Entities {
        /// Only this entity type
        #[arg(short = 't', long)]
        entity_type: Option<EntityType>,
    },

    /// Semantic search over case documents
    Search {
        query: String,

        /// Number of results
        #[arg(short)]
        k: Option<u32>,

        /// Only these document types
        #[arg(short = 't', long = "doc-type")]
        doc_types: Vec<DocType>,

        /// Minimum relevance score (0.0 - 1.0)
        #[arg(long)]
        min_score: Option<f64>,
    },

    /// Pin evidence (document, entity or chunk)
    Pin {
        kind: ItemKind,
        id: String,

        /// Label to show (required for chunks, looked up otherwise)
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Unpin evidence
    Unpin { id: String },

    /// Toggle whether a person is suspected
    Suspect { entity_id: String },

    /// Ask the assistant for a hint
    Hint {
        /// What you are stuck on
        context: Option<String>,
    },

    /// Talk to the case assistant
    Chat {
        message: Vec<String>,

        /// Start a new conversation
        #[arg(long)]
        clear: bool,
    },

    /// Work on the investigation board
    Board {
        #[command(subcommand)]
        action: Option<BoardCommand>,
    },

    /// Show investigation progress
    Status,

    /// Validate the final accusation
    Submit {
        /// Accused entity (repeatable; defaults to suspected entities)
        #[arg(short, long = "culprit")]
        culprits: Vec<String>,

        /// Evidence item id (repeatable)
        #[arg(short, long = "evidence")]
        evidence: Vec<String>,

        /// Use every pinned item as evidence
        #[arg(long)]
        all_evidence: bool,

        /// How it was done
        #[arg(short = 'x', long)]
        explanation: String,
    },

    /// Clear all local progress on the active case
    Reset,
}

/// Board subcommands.
#[derive(Subcommand, Debug)]
pub enum BoardCommand {
    /// Show nodes and edges
    Show,

    /// Place the best connected entities around the centre
    Hubs {
        #[arg(short, long, default_value_t = DEFAULT_HUB_LIMIT)]
        limit: u32,
    },

    /// Add the neighbors of an entity (once per board session)
    Expand { entity_id: String },

    /// Draw the shortest path between two entities
    Path {
        from: String,
        to: String,

        #[arg(short = 'd', long)]
        max_depth: Option<u32>,
    },

    /// Add entities whose name or type matches
    Find { query: String },

    /// Arrange all nodes on a grid
    Layout,

    /// Move a node
    Move { id: String, x: f64, y: f64 },

    /// Remove a node and its edges
    Remove { id: String },

    /// Remove everything from the board
    Clear,

    /// Rebuild the backend graph and show its statistics
    Sync,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), ApiError> {
    let config = Config::load(cli.config.as_deref(), cli.overrides())?;
    let mut ctx = Context::open(config, cli.json_mode, cli.ephemeral).await?;

    match cli.command {
        Some(Commands::Login { email, password }) => cmd_login(&mut ctx, &email, &password).await,
        Some(Commands::Register {
            email,
            name,
            password,
            language,
        }) => cmd_register(&mut ctx, &email, &name, &password, language).await,
        Some(Commands::Logout) => cmd_logout(&mut ctx).await,
        Some(Commands::Profile { name, language }) => cmd_profile(&mut ctx, name, language).await,
        Some(Commands::Cases { skip, limit }) => cmd_cases(&ctx, skip, limit).await,
        Some(Commands::Case { case_id }) => cmd_case(&mut ctx, &case_id).await,
        Some(Commands::Docs {
            doc_type,
            limit,
            all,
        }) => cmd_docs(&ctx, doc_type, limit, all).await,
        Some(Commands::Read { doc_id }) => cmd_read(&mut ctx, &doc_id).await,
        Some(Commands::Entities { entity_type }) => cmd_entities(&ctx, entity_type).await,
        Some(Commands::Search {
            query,
            k,
            doc_types,
            min_score,
        }) => cmd_search(&ctx, query, k, doc_types, min_score).await,
        Some(Commands::Pin { kind, id, label }) => cmd_pin(&mut ctx, kind, &id, label).await,
        Some(Commands::Unpin { id }) => cmd_unpin(&mut ctx, &id),
        Some(Commands::Suspect { entity_id }) => cmd_suspect(&mut ctx, &entity_id).await,
        Some(Commands::Hint { context }) => cmd_hint(&mut ctx, context).await,
        Some(Commands::Chat { message, clear }) => cmd_chat(&mut ctx, &message.join(" "), clear).await,
        Some(Commands::Board { action }) => {
            cmd_board(&mut ctx, action.unwrap_or(BoardCommand::Show)).await
        }
        Some(Commands::Status) | None => cmd_status(&ctx),
        Some(Commands::Submit {
            culprits,
            evidence,
            all_evidence,
            explanation,
        }) => cmd_submit(&ctx, culprits, evidence, all_evidence, explanation).await,
        Some(Commands::Reset) => cmd_reset(&mut ctx),
    }
}

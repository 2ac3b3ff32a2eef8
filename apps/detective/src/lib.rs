//! # Office Detective Client
//!
//! Everything above the game core: the REST client, the auth and chat
//! sessions, the case resource loaders, the board controller and the CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    apps/detective (THE CLIENT)                  │
//! │                                                                 │
//! │  ┌─────────────┐   ┌──────────────┐   ┌─────────────────────┐  │
//! │  │    CLI      │   │ auth / chat  │   │ controller /        │  │
//! │  │   (clap)    │──▶│  sessions    │   │ resources           │  │
//! │  └──────┬──────┘   └──────┬───────┘   └──────────┬──────────┘  │
//! │         │                 └───────────┬──────────┘             │
//! │         │                             ▼                        │
//! │         │                   ┌──────────────────┐               │
//! │         │                   │  api (reqwest)   │──▶ backend    │
//! │         │                   └──────────────────┘               │
//! │         ▼                                                      │
//! │  ┌────────────────┐                                            │
//! │  │ detective-core │  store, board, persistence (redb)          │
//! │  └────────────────┘                                            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod auth;
pub mod chat;
pub mod cli;
pub mod config;
pub mod controller;
pub mod resources;

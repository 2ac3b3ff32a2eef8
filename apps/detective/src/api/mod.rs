//! # Backend API Module
//!
//! REST client for the Office Detective backend.
//!
//! ## Endpoints
//!
//! - `POST /api/auth/login`, `POST /api/auth/register`, `PATCH /api/auth/me`
//! - `GET /api/cases`, `GET /api/cases/{id}`
//! - `GET /api/cases/{id}/documents`, `GET /api/cases/{id}/documents/{doc}/full`
//! - `GET /api/cases/{id}/entities`, `GET /api/cases/{id}/entities/{entity}`
//! - `POST /api/cases/{id}/search`
//! - `POST /api/cases/{id}/chat`, `POST /api/cases/{id}/chat/hint`
//! - `POST /api/cases/{id}/graph/sync`, `POST /api/cases/{id}/graph/path`
//! - `GET /api/cases/{id}/graph/neighbors/{entity}`, `GET /api/cases/{id}/graph/hubs`,
//!   `GET /api/cases/{id}/graph/stats`

mod client;
mod error;
mod types;

pub use client::{DetectiveClient, DocumentQuery, TokenSlot};
pub use error::ApiError;
pub use types::*;

//! sminfo - company performance lookup on the SME status information portal.
//!
//! The portal has no API: a logged-in browser session searches for a
//! company, the candidate list is resolved to one company, and the tables on
//! its detail page are ranked by how likely they hold financial figures.
//! The heuristics work on parsed frame snapshots ([`document`]); the browser
//! sits behind the traits in [`browser`].

pub mod browser;
pub mod candidates;
pub mod config;
pub mod document;
pub mod error;
pub mod models;
pub mod portal;
pub mod session;
pub mod tables;
pub mod text;

pub use config::{PortalConfig, Settings};
pub use error::{BrowserError, PortalError, SearchError};
pub use models::{Candidate, SearchResult, TableData};
pub use portal::{LoginRequest, PortalClient};

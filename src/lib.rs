/// Campus Careers
///
/// Role-based student career management service: student signup and
/// profiles, admin record management, clerk read access and bulk account
/// provisioning from CSV.

pub mod account;
pub mod api;
pub mod auth;
pub mod config;
pub mod consent;
pub mod context;
pub mod db;
pub mod documents;
pub mod error;
pub mod import;
pub mod jobs;
pub mod mailer;
pub mod profile;
pub mod server;
pub mod validation;

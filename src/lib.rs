use diesel_migrations::{EmbeddedMigrations, embed_migrations};

pub mod auth;
pub mod coaches;
pub mod config;
pub mod dashboard;
pub mod matches;
pub mod schema;
pub mod state;
pub mod storage;
pub mod summaries;
pub mod teams;
pub mod template;
pub mod upload;
pub mod util_resp;
pub mod validation;
pub mod widgets;

#[cfg(test)]
mod test;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

use std::path::{Path, PathBuf};

use axum::{Router, middleware, routing::get, routing::post};
use serde::Deserialize;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    auth::{
        login::{do_login, do_logout, login_page},
        register::{do_register, register_page},
    },
    coaches::manage::{create_coach_page, do_create_coach, do_edit_coach, edit_coach_page},
    dashboard::dashboard_page,
    matches::{
        export::export_matches,
        import::{do_import, do_preview, import_page},
        manage::{
            create_match_page, do_create_match, do_edit_match, edit_match_page,
            matches_page,
        },
    },
    state::{AppState, tx_commit},
    storage::PUBLIC_PREFIX,
    summaries::manage::{do_save_summary, summary_page},
    teams::manage::{
        create_team_page, do_create_team, do_edit_team, edit_team_page, teams_page,
    },
};

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub database_url: String,
    pub bind: String,
    /// Where uploaded logos, photos and visuals are written.
    pub assets_dir: PathBuf,
    /// Signs and encrypts the session cookie. Must be at least 64 bytes;
    /// sessions do not survive a restart without it.
    pub secret_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_url: "matchday.sqlite".to_string(),
            bind: "127.0.0.1:8000".to_string(),
            assets_dir: PathBuf::from("assets/uploads"),
            secret_key: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl AppConfig {
    /// Reads the configuration file (if any), then applies the
    /// `DATABASE_URL` and `SECRET_KEY` environment variables on top.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| {
                    ConfigError::Read {
                        path: path.to_path_buf(),
                        source,
                    }
                })?;
                AppConfig::from_toml(&text).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            None => AppConfig::default(),
        };

        Ok(config.with_env_overrides(
            std::env::var("DATABASE_URL").ok(),
            std::env::var("SECRET_KEY").ok(),
        ))
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn with_env_overrides(
        mut self,
        database_url: Option<String>,
        secret_key: Option<String>,
    ) -> Self {
        if let Some(url) = database_url {
            self.database_url = url;
        }
        if let Some(secret) = secret_key {
            self.secret_key = Some(secret);
        }
        self
    }
}

pub fn create_app(state: AppState) -> Router {
    let assets = ServeDir::new(state.store.root());

    let dashboard = Router::new()
        .route("/", get(dashboard_page))
        .route("/teams", get(teams_page))
        .route("/teams/new", get(create_team_page).post(do_create_team))
        .route("/teams/:id/edit", get(edit_team_page).post(do_edit_team))
        .route("/coaches/new", get(create_coach_page).post(do_create_coach))
        .route("/coaches/:id/edit", get(edit_coach_page).post(do_edit_coach))
        .route("/matches", get(matches_page))
        .route("/matches/export.csv", get(export_matches))
        .route("/matches/new", get(create_match_page).post(do_create_match))
        .route("/matches/import", get(import_page).post(do_import))
        .route("/matches/import/preview", post(do_preview))
        .route("/matches/:id/edit", get(edit_match_page).post(do_edit_match))
        .route("/matches/:id/summary", get(summary_page).post(do_save_summary));

    Router::new()
        .route("/", get(login_page))
        .route("/login", post(do_login))
        .route("/register", get(register_page).post(do_register))
        .route("/logout", post(do_logout))
        .nest("/dashboard", dashboard)
        .nest_service(PUBLIC_PREFIX, assets)
        .layer(middleware::from_fn(tx_commit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

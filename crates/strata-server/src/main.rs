//! STRATA Server — Application entry point.

use std::env;
use std::process::ExitCode;

use strata_auth::{AuthConfig, SigningKeys};
use strata_db::{DbConfig, DbManager};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.into())
}

fn auth_config_from_env() -> Result<AuthConfig, String> {
    let private_pem = env::var("STRATA_JWT_PRIVATE_KEY")
        .map_err(|_| "STRATA_JWT_PRIVATE_KEY is not set".to_string())?;
    let public_pem = env::var("STRATA_JWT_PUBLIC_KEY")
        .map_err(|_| "STRATA_JWT_PUBLIC_KEY is not set".to_string())?;

    Ok(AuthConfig {
        jwt_private_key_pem: private_pem,
        jwt_public_key_pem: public_pem,
        jwt_issuer: env_or("STRATA_JWT_ISSUER", "strata"),
        pepper: env::var("STRATA_PASSWORD_PEPPER").ok(),
        ..AuthConfig::default()
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("strata=info".parse().unwrap()),
        )
        .json()
        .init();

    info!("Starting STRATA server...");

    let auth_config = match auth_config_from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid auth configuration");
            return ExitCode::FAILURE;
        }
    };
    // Key material is validated up front; a corrupt key must never
    // surface on the first issued token.
    if let Err(e) = SigningKeys::from_config(&auth_config) {
        error!(error = %e, "Invalid JWT signing keys");
        return ExitCode::FAILURE;
    }

    let db_config = DbConfig::from_env();
    let manager = match DbManager::connect(&db_config).await {
        Ok(manager) => manager,
        Err(e) => {
            error!(error = %e, "Failed to connect to SurrealDB");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = strata_db::run_migrations(manager.client()).await {
        error!(error = %e, "Failed to run migrations");
        return ExitCode::FAILURE;
    }

    // TODO: Start REST API server (resolver + admission middleware in
    // front of the tenant-scoped handlers).

    info!("STRATA server stopped.");
    ExitCode::SUCCESS
}

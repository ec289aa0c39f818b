//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};
use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::api::{ApiServer, AuthManager};
use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{
    APP_NAME_LOWER, DEFAULT_ADMIN_LOGIN, ENV_ADMIN_PASSWORD, ENV_LOG,
};
use crate::data::sqlite::{NewUser, SqliteService, count_users, insert_user};

pub struct CoreApp {
    pub config: AppConfig,
    pub database: Arc<SqliteService>,
    pub auth: Arc<AuthManager>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("application starting");

        let (cli_config, command) = cli::parse();
        match command {
            Some(Commands::Start) | None => {}
        }

        let app = Self::init(&cli_config).await?;
        ApiServer::new(app).start().await
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;

        let database = Arc::new(
            SqliteService::init(&config.db_path())
                .await
                .context("failed to initialize database")?,
        );
        Self::seed_admin(&database).await?;

        let auth = Arc::new(AuthManager::new(&config.auth));
        if !auth.is_enabled() {
            tracing::warn!("authentication disabled, all requests run as admin");
        }

        Ok(Self {
            config,
            database,
            auth,
        })
    }

    /// Create the bootstrap admin account on first run
    async fn seed_admin(database: &SqliteService) -> Result<()> {
        if count_users(database.pool()).await? > 0 {
            return Ok(());
        }

        let (password, generated) = match std::env::var(ENV_ADMIN_PASSWORD) {
            Ok(password) if !password.is_empty() => (password, false),
            _ => {
                let password: String = rand::thread_rng()
                    .sample_iter(&Alphanumeric)
                    .take(16)
                    .map(char::from)
                    .collect();
                (password, true)
            }
        };

        insert_user(
            database.pool(),
            &NewUser {
                name: "Admin",
                surname: "Admin",
                patronymic: None,
                email: "admin@localhost",
                login: DEFAULT_ADMIN_LOGIN,
                password: &password,
                role: "admin",
            },
        )
        .await?;

        if generated {
            tracing::info!(
                login = DEFAULT_ADMIN_LOGIN,
                password = %password,
                "created bootstrap admin account with a generated password"
            );
        } else {
            tracing::info!(login = DEFAULT_ADMIN_LOGIN, "created bootstrap admin account");
        }
        Ok(())
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }
}

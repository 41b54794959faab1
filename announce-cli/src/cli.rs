use anyhow::{Context, bail};
use announce_core::{
    AccuWeatherClient, Config, LocationStore, Notifier, NycParkingClient, Report, Settings,
    SmtpNotifier, config, http, pipeline, provider,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::Level;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "announce", version, about = "Morning weather and parking announcements by email")]
pub struct Cli {
    /// Env file holding credentials and the cached location key.
    /// Defaults to ./.env, or announce.env in the platform config directory.
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// TOML settings file. Defaults to settings.toml in the platform config directory.
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Logging verbosity. Allowed values are 'trace', 'debug', 'info', 'warn', and 'error'
    /// (case insensitive)
    #[arg(long, global = true, default_value_t = Level::INFO)]
    pub log_level: Level,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build today's announcements and email them.
    Send,

    /// Build today's announcements and print them instead of sending.
    Preview,

    /// Resolve a location to an AccuWeather key and save it to the env file.
    Locate {
        /// Zip code or "City, State". Prompted for when absent.
        location: Option<String>,
    },

    /// Write a settings file with default values.
    Init {
        /// Overwrite an existing settings file.
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let settings_path = match self.settings {
            Some(path) => path,
            None => config::default_settings_path()?,
        };

        let env_file = || match &self.env_file {
            Some(path) => Ok(path.clone()),
            None => config::default_env_file(),
        };

        match self.command {
            Command::Init { force } => {
                if settings_path.exists() && !force {
                    bail!(
                        "Settings file already exists: {}\n\
                         Hint: pass --force to overwrite it.",
                        settings_path.display()
                    );
                }

                Settings::default().save(&settings_path)?;
                println!("Wrote default settings to {}", settings_path.display());
            }
            Command::Locate { location } => {
                let env_file = env_file()?;
                config::load_env_file(&env_file)?;
                let settings = Settings::load(&settings_path)?;
                let http = http::build_client(settings.timeout())?;
                let weather = AccuWeatherClient::new(
                    http,
                    &settings.accuweather_url,
                    config::require_env(config::ACCU_API_KEY)?,
                )?;

                let location = match location {
                    Some(location) => location,
                    None => prompt_location()?,
                };

                let store = LocationStore::new(&env_file);
                let key = pipeline::locate(&weather, &store, location.trim()).await?;
                println!("Saved location key {key} to {}", env_file.display());
            }
            Command::Send => {
                let (config, report) = prepare(&env_file()?, &settings_path).await?;
                let notifier = SmtpNotifier::from_config(&config)?;
                notifier.send(&report).await?;
            }
            Command::Preview => {
                let (_, report) = prepare(&env_file()?, &settings_path).await?;
                println!("Subject: {}\n\n{}", report.subject, report.body);
            }
        }

        Ok(())
    }
}

/// Load configuration, make sure a location key exists and build today's report.
async fn prepare(env_file: &Path, settings_path: &Path) -> anyhow::Result<(Config, Report)> {
    config::load_env_file(env_file)?;
    let settings = Settings::load(settings_path)?;
    let config = Config::from_env(settings)?;
    tracing::debug!(message = "loaded configuration", config = ?config);

    let http = http::build_client(config.settings.timeout())?;
    let weather = provider::provider_from_config(&config, http.clone())?;
    let parking = NycParkingClient::from_config(&config, http)?;
    let store = LocationStore::new(env_file);

    let key = pipeline::resolve_location_key(
        config.location_key.as_ref(),
        weather.as_ref(),
        &store,
        prompt_location,
    )
    .await?;

    let today = chrono::Local::now().date_naive();
    let report = pipeline::build_report(weather.as_ref(), &parking, &key, today).await?;

    Ok((config, report))
}

fn prompt_location() -> anyhow::Result<String> {
    inquire::Text::new("There is no location specified. Please add a zipcode or City, State:")
        .prompt()
        .context("Failed to read location")
}

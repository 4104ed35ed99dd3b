use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::PathBuf;

pub mod models;
pub use models::*;

/// Loads the application configuration.
///
/// Layering, lowest precedence first: `config/default`, `config/{RUN_ENV}`,
/// then environment variables prefixed with `OASIS` (double underscore as
/// separator, e.g. `OASIS_SERVER__PORT=9090`). A `.env` file is loaded once
/// before anything else.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env::var("PREFIX").unwrap_or_else(|_| "OASIS".to_string());

    let manifest_dir = PathBuf::from(
        env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string()),
    );
    let workspace_root = manifest_dir
        .ancestors()
        .nth(2) // go from crates/oasis_config to workspace root
        .unwrap_or(&manifest_dir)
        .to_path_buf();

    let default_path = workspace_root.join("config/default");
    let env_path = workspace_root.join(format!("config/{}", run_env));

    let builder = Config::builder()
        .add_source(File::with_name(default_path.to_str().unwrap()).required(false))
        .add_source(File::with_name(env_path.to_str().unwrap()).required(false))
        .add_source(Environment::with_prefix(&prefix).separator("__"));

    let raw_config: AppConfig = builder.build()?.try_deserialize()?;
    Ok(raw_config)
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Ensures that the dotenv file is loaded into the environment variables.
///
/// The path can be overridden with `DOTENV_OVERRIDE`; otherwise `.env` is
/// used. Loading happens at most once per process.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

/// Parses the configured time zone, falling back to the default when the
/// string is not a known IANA name.
pub fn resolve_time_zone(config: &SchedulingConfig) -> chrono_tz::Tz {
    config
        .time_zone
        .parse()
        .unwrap_or(chrono_tz::Asia::Ho_Chi_Minh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduling_defaults_apply() {
        let scheduling = SchedulingConfig::default();
        assert_eq!(scheduling.slot_size_minutes, 30);
        assert_eq!(scheduling.poll_interval_seconds, 5);
        assert_eq!(scheduling.upsell_fallback_duration_minutes, 60);
    }

    #[test]
    fn unknown_time_zone_falls_back() {
        let scheduling = SchedulingConfig {
            time_zone: "Not/AZone".to_string(),
            ..SchedulingConfig::default()
        };
        assert_eq!(resolve_time_zone(&scheduling), chrono_tz::Asia::Ho_Chi_Minh);
    }

    #[test]
    fn explicit_time_zone_parses() {
        let scheduling = SchedulingConfig {
            time_zone: "Europe/Zurich".to_string(),
            ..SchedulingConfig::default()
        };
        assert_eq!(resolve_time_zone(&scheduling), chrono_tz::Europe::Zurich);
    }
}

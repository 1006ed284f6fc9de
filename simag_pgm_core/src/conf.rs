use std::convert::TryFrom;
use std::str::FromStr;

use log::LevelFilter;
use once_cell::sync::Lazy;

const DEFAULT_CPT_TOLERANCE: f64 = 1e-8;
const DEFAULT_PAR_THRESHOLD: usize = 1 << 16;

static CONF: Lazy<Config> = Lazy::new(Config::load);

/// Process wide settings, read once from the `SIMAG_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: LevelFilter,
    /// Allowed deviation from 1 of the sum of a conditional probability vector.
    pub cpt_tolerance: f64,
    /// Output length from which factor products and reductions are computed
    /// across the rayon thread pool.
    pub par_threshold: usize,
}

impl Config {
    fn load() -> Config {
        let mut settings = config::Config::new();
        if let Err(err) = settings.merge(config::Environment::with_prefix("SIMAG")) {
            eprintln!("simag: ignoring environment settings: {}", err);
        }

        let log_level = settings
            .get_str("log_level")
            .or_else::<config::ConfigError, _>(|_| Ok("info".to_owned()))
            .ok()
            .map(|l| LevelFilter::from_str(&l).unwrap_or(LevelFilter::Debug))
            .unwrap_or(LevelFilter::Debug);

        let cpt_tolerance = settings
            .get_float("cpt_tolerance")
            .ok()
            .filter(|t| t.is_finite() && *t >= 0.0)
            .unwrap_or(DEFAULT_CPT_TOLERANCE);

        let par_threshold = settings
            .get_int("par_threshold")
            .ok()
            .and_then(|t| usize::try_from(t).ok())
            .unwrap_or(DEFAULT_PAR_THRESHOLD);

        Config {
            log_level,
            cpt_tolerance,
            par_threshold,
        }
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            log_level: LevelFilter::Info,
            cpt_tolerance: DEFAULT_CPT_TOLERANCE,
            par_threshold: DEFAULT_PAR_THRESHOLD,
        }
    }
}

pub fn settings() -> &'static Config {
    &CONF
}

/// Initializes the global logger at the configured level; calling it more
/// than once is harmless.
pub fn init_logger() {
    tracing::Logger::get_logger();
}

pub(crate) mod tracing {
    use super::*;

    #[derive(Clone, Copy)]
    pub struct Logger;

    impl Logger {
        pub fn get_logger() -> &'static Logger {
            Lazy::force(&LOGGER)
        }
    }

    #[allow(unused_must_use)]
    static LOGGER: Lazy<Logger> = Lazy::new(|| {
        env_logger::builder()
            .format_module_path(true)
            .format_timestamp_nanos()
            .target(env_logger::Target::Stderr)
            .filter(None, CONF.log_level)
            .try_init();

        Logger
    });
}

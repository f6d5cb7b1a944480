//! Driver configuration read from the process environment.
use std::env;
use std::path::PathBuf;

/// Settings for one headless run.
#[derive(Clone, Debug)]
pub struct SimConfig {
    pub data_dir: PathBuf,
    pub level: String,
    /// Script file with one input step per line. The built-in demo script
    /// runs when unset.
    pub script: Option<PathBuf>,
    /// Number of ticks to run. Defaults to the script length.
    pub ticks: Option<u64>,
    /// Respawn instead of stopping once the entity reaches game over.
    pub respawn: bool,
    /// Log every tick outcome at debug level instead of only state changes.
    pub trace_ticks: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/data")),
            level: "demo".to_string(),
            script: None,
            ticks: None,
            respawn: false,
            trace_ticks: false,
        }
    }
}

impl SimConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `SIM_DATA_DIR` - Directory holding `config.toml` and `levels/` (default: bundled data)
    /// - `SIM_LEVEL` - Level name under `levels/` (default: demo)
    /// - `SIM_SCRIPT` - Input script path (default: built-in demo script)
    /// - `SIM_TICKS` - Ticks to run (default: script length)
    /// - `SIM_RESPAWN` - Respawn after game over (default: false)
    /// - `SIM_TRACE_TICKS` - Log every tick (default: false)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("SIM_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(level) = env::var("SIM_LEVEL") {
            config.level = level;
        }
        config.script = env::var("SIM_SCRIPT").ok().map(PathBuf::from);
        config.ticks = read_env::<u64>("SIM_TICKS");

        if let Some(respawn) = read_env::<bool>("SIM_RESPAWN") {
            config.respawn = respawn;
        } else if env::var("SIM_RESPAWN").is_ok() {
            // Also accept just setting the variable without value as "true"
            config.respawn = true;
        }
        if let Some(trace) = read_env::<bool>("SIM_TRACE_TICKS") {
            config.trace_ticks = trace;
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

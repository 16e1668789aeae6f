//! Runtime settings, read from flags or the environment (a `.env` file is loaded first).

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use crate::runtime::{FixedDelay, Immediate, Latency};

#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Directory of the Sled database holding the key-value namespace
    #[arg(long, env = "STAFFDESK_DATA_DIR", default_value = "staffdesk_data", global = true)]
    pub data_dir: PathBuf,

    /// Simulated backend latency in milliseconds (0 disables it)
    #[arg(long, env = "STAFFDESK_LATENCY_MS", default_value_t = crate::DEFAULT_LATENCY_MS, global = true)]
    pub latency_ms: u64,

    /// Also write JSON logs to daily-rotated files in this directory
    #[arg(long, env = "STAFFDESK_LOG_DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    /// Emit JSON instead of human-readable logs on stderr
    #[arg(long, env = "STAFFDESK_LOG_JSON", global = true)]
    pub log_json: bool,
}

impl Settings {
    pub fn latency(&self) -> Arc<dyn Latency> {
        if self.latency_ms == 0 {
            Arc::new(Immediate)
        } else {
            Arc::new(FixedDelay::from_millis(self.latency_ms))
        }
    }

    pub fn data_path(&self) -> String {
        self.data_dir.to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        settings: Settings,
    }

    #[test]
    fn test_flags_override_defaults() {
        let harness = Harness::parse_from([
            "staffdesk",
            "--data-dir",
            "/tmp/staffdesk",
            "--latency-ms",
            "0",
            "--log-json",
        ]);
        assert_eq!(harness.settings.data_path(), "/tmp/staffdesk");
        assert_eq!(harness.settings.latency_ms, 0);
        assert!(harness.settings.log_json);
        assert!(harness.settings.log_dir.is_none());
    }
}

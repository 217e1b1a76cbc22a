//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "caredesk.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Caredesk configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Point [api] base_url at your clinical-record API");
                println!("  2. Validate configuration: caredesk validate-config");
                println!("  3. Pick a patient: caredesk context set-patient <id>");
                println!("  4. Open a page: caredesk page workspace");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    fn generate_minimal_config() -> String {
        r#"# Caredesk Configuration File

[application]
log_level = "info"
user_display = "Dr. Sample User"

[api]
base_url = "http://localhost:8000"

[polling]
interval_ms = 750

[session]
storage_path = ".caredesk/session.json"
"#
        .to_string()
    }

    fn generate_config_with_examples() -> String {
        r#"# Caredesk Configuration File
#
# Values of the form ${VAR} are replaced from the environment (a .env file is
# loaded first). Any setting can also be overridden with CAREDESK_<SECTION>_<KEY>,
# e.g. CAREDESK_API_BASE_URL.

[application]
# trace | debug | info | warn | error
log_level = "info"
# Shown when the stored session has no user yet
user_display = "Dr. Sample User"

[api]
# Base URL of the clinical-record and job API; a trailing slash is ignored
base_url = "http://localhost:8000"
timeout_seconds = 30
connect_timeout_seconds = 10

[polling]
# Delay between job status requests
interval_ms = 750
# 1.0 keeps the cadence fixed; 2.0 doubles the delay after every tick
backoff_multiplier = 1.0
max_interval_ms = 5000
# Give up after this many status requests (0 = never)
max_attempts = 800
# Random extra delay per tick, spreads out many sessions
jitter_ms = 0

[session]
# JSON file holding the persisted context
storage_path = ".caredesk/session.json"
storage_key = "ehr.ui.context.v1"

[logging]
# JSON log files in addition to the console
local_enabled = false
local_path = "./logs"
# daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}

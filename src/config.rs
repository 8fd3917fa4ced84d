// Settings loaded with the 'config' crate, layered over .env via 'dotenv'

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server_address: String,
    // Seed for the synthetic spot occupancy; same seed, same catalog
    pub catalog_seed: u64,
    // Simulated round-trip latencies
    pub refresh_latency_ms: u64,
    pub login_latency_ms: u64,
    pub payment_latency_ms: u64,
    // How long a booking stays payable before it expires
    pub booking_hold_secs: u64,
    pub admin_email: String,
    pub admin_password: String,
}

impl Settings {
    pub fn new() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let builder = Config::builder()
            .set_default("server_address", "127.0.0.1:3000")?
            .set_default("catalog_seed", 42)?
            .set_default("refresh_latency_ms", 800)?
            .set_default("login_latency_ms", 800)?
            .set_default("payment_latency_ms", 1500)?
            .set_default("booking_hold_secs", 600)?
            .set_default("admin_email", "admin@example.com")?
            .set_default("admin_password", "1234")?
            // Load from a configuration file (e.g., config.toml)
            .add_source(File::with_name("config").required(false))
            // Load from environment variables (e.g., APP_CATALOG_SEED)
            .add_source(Environment::with_prefix("APP").try_parsing(true));

        let settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    pub fn booking_hold(&self) -> Duration {
        Duration::from_secs(self.booking_hold_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_load_without_sources() {
        let settings = Settings::new().unwrap();
        assert!(!settings.server_address.is_empty());
        assert!(!settings.admin_email.is_empty());
        assert!(settings.booking_hold() > Duration::ZERO);
    }
}

//! Runtime configuration.
//!
//! Every setting can come from a flag or an environment variable; a `.env`
//! file in the working directory is loaded first.

use crate::analyzer::DEFAULT_BATCH_SIZE;
use crate::client::{GeminiClient, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::domains::ClassificationMode;
use crate::types::*;
use clap::Args;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Gemini API key; without it the offline heuristic answers every prompt
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<SecureApiKey>,

    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub gemini_model: String,

    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub gemini_base_url: String,

    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://econsult.db?mode=rwc")]
    pub database_url: String,

    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 4000)]
    pub port: u16,

    #[arg(long, env = "CLASSIFICATION_MODE", value_enum, default_value_t = ClassificationMode::Batch)]
    pub classification_mode: ClassificationMode,

    #[arg(long, env = "BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,
}

impl Config {
    /// Load `.env` if present and return its path; a missing file is not an error
    pub fn load_dotenv() -> Option<PathBuf> {
        dotenvy::dotenv().ok()
    }

    pub fn socket_addr(&self) -> ConsultResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConsultError::Config(format!("Invalid listen address {}:{}: {}", self.host, self.port, e)))
    }

    /// Gateway client described by this configuration
    pub fn gemini_client(&self) -> ConsultResult<GeminiClient> {
        Ok(GeminiClient::new(self.gemini_api_key.as_ref().map(|k| k.as_str().to_string()))?
            .with_base_url(&self.gemini_base_url)
            .with_model(&self.gemini_model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: Config,
    }

    #[test]
    fn flags_override_defaults() {
        let cli = TestCli::try_parse_from([
            "econsult",
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
            "--classification-mode",
            "single",
            "--batch-size",
            "3",
        ])
        .unwrap();

        assert_eq!(cli.config.socket_addr().unwrap().to_string(), "127.0.0.1:9000");
        assert_eq!(cli.config.classification_mode, ClassificationMode::Single);
        assert_eq!(cli.config.batch_size, 3);
    }

    #[test]
    fn api_key_is_hidden_from_debug_output() {
        let cli = TestCli::try_parse_from(["econsult", "--gemini-api-key", "AIza-secret-123"]).unwrap();

        assert_eq!(cli.config.gemini_api_key.as_ref().map(|k| k.as_str()), Some("AIza-secret-123"));
        assert!(!format!("{:?}", cli.config).contains("AIza-secret-123"));
        assert!(cli.config.gemini_client().unwrap().is_online());
    }

    #[test]
    fn bad_host_is_config_error() {
        let cli = TestCli::try_parse_from(["econsult", "--host", "not a host", "--port", "1"]).unwrap();
        assert!(matches!(cli.config.socket_addr(), Err(ConsultError::Config(_))));
    }
}

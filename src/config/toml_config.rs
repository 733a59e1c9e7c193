use crate::adapters::gemini::{GeminiSettings, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::utils::error::{Result, TryOnError};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    validate_required_field, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

const TEN_MIB: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub assets: AssetsSection,
    pub model: ModelSection,
    pub database: DatabaseSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: String,
    pub json_logs: bool,
    pub max_upload_bytes: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            json_logs: false,
            max_upload_bytes: TEN_MIB,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsSection {
    /// Public asset directory; `/uploads/x.png` resolves to `<root>/uploads/x.png`.
    pub root: String,
    pub max_image_bytes: usize,
}

impl Default for AssetsSection {
    fn default() -> Self {
        Self {
            root: "./public".to_string(),
            max_image_bytes: TEN_MIB,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSection {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: "sqlite://tryon.db".to_string(),
        }
    }
}

impl ServerConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TryOnError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TryOnError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GEMINI_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TryOnError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 若未設定 API key，從 GEMINI_API_KEY 取得
    pub fn apply_env(&mut self) {
        let missing = self
            .model
            .api_key
            .as_deref()
            .map_or(true, |key| key.trim().is_empty());
        if missing {
            if let Ok(key) = std::env::var(API_KEY_ENV) {
                self.model.api_key = Some(key);
            }
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("server.bind", &self.server.bind)?;
        self.server
            .bind
            .parse::<SocketAddr>()
            .map_err(|e| TryOnError::InvalidConfigValueError {
                field: "server.bind".to_string(),
                value: self.server.bind.clone(),
                reason: format!("Invalid socket address: {}", e),
            })?;
        validate_positive_number("server.max_upload_bytes", self.server.max_upload_bytes, 1)?;

        validate_path("assets.root", &self.assets.root)?;
        validate_positive_number("assets.max_image_bytes", self.assets.max_image_bytes, 1)?;

        validate_url("model.base_url", &self.model.base_url)?;
        validate_non_empty_string("model.model", &self.model.model)?;
        let api_key = validate_required_field("model.api_key", &self.model.api_key)?;
        validate_non_empty_string("model.api_key", api_key)?;
        validate_range("model.timeout_seconds", self.model.timeout_seconds, 1, 600)?;

        validate_non_empty_string("database.url", &self.database.url)?;

        Ok(())
    }

    pub fn gemini_settings(&self) -> Result<GeminiSettings> {
        let api_key = validate_required_field("model.api_key", &self.model.api_key)?;
        Ok(GeminiSettings {
            base_url: self.model.base_url.clone(),
            model: self.model.model.clone(),
            api_key: api_key.clone(),
            timeout: Duration::from_secs(self.model.timeout_seconds),
        })
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_toml_str("").unwrap();

        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert_eq!(config.assets.root, "./public");
        assert_eq!(config.assets.max_image_bytes, 10 * 1024 * 1024);
        assert_eq!(config.model.timeout_seconds, 60);
        assert_eq!(config.model.model, DEFAULT_MODEL);
        assert!(config.model.api_key.is_none());
    }

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[server]
bind = "0.0.0.0:8080"
json_logs = true
max_upload_bytes = 2048

[assets]
root = "/srv/public"
max_image_bytes = 1024

[model]
base_url = "https://models.example.com"
model = "image-model"
api_key = "secret"
timeout_seconds = 30

[database]
url = "sqlite://data/app.db"
"#;

        let config = ServerConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert!(config.server.json_logs);
        assert_eq!(config.assets.root, "/srv/public");
        assert_eq!(config.model.api_key.as_deref(), Some("secret"));
        assert!(config.validate().is_ok());

        let settings = config.gemini_settings().unwrap();
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.model, "image-model");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TRYON_TEST_API_KEY", "from-env");

        let toml_content = r#"
[model]
api_key = "${TRYON_TEST_API_KEY}"
"#;

        let config = ServerConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.model.api_key.as_deref(), Some("from-env"));

        std::env::remove_var("TRYON_TEST_API_KEY");
    }

    #[test]
    fn test_missing_api_key_fails_validation() {
        let mut config = ServerConfig::default();
        config.model.api_key = None;

        assert!(matches!(
            config.validate(),
            Err(TryOnError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_config_validation_rejects_bad_values() {
        let mut config = ServerConfig::default();
        config.model.api_key = Some("key".to_string());
        assert!(config.validate().is_ok());

        let mut bad_url = config.clone();
        bad_url.model.base_url = "invalid-url".to_string();
        assert!(bad_url.validate().is_err());

        let mut bad_bind = config.clone();
        bad_bind.server.bind = "not an address".to_string();
        assert!(bad_bind.validate().is_err());

        let mut bad_timeout = config.clone();
        bad_timeout.model.timeout_seconds = 0;
        assert!(bad_timeout.validate().is_err());

        let mut bad_ceiling = config;
        bad_ceiling.assets.max_image_bytes = 0;
        assert!(bad_ceiling.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[assets]
root = "./static"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = ServerConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.assets.root, "./static");
    }
}

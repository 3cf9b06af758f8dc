use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Fitted feature preprocessor artifact
    #[serde(default = "default_preprocessor_path")]
    pub preprocessor_path: String,

    /// Fitted gradient-boosted classifier artifact
    #[serde(default = "default_model_path")]
    pub model_path: String,

    /// Static JSON array of course records
    #[serde(default = "default_courses_data_path")]
    pub courses_data_path: String,

    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_preprocessor_path() -> String {
    "artifacts/preprocessor.json".to_string()
}

fn default_model_path() -> String {
    "artifacts/course_recommender.onnx".to_string()
}

fn default_courses_data_path() -> String {
    "artifacts/courses.json".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Address the HTTP listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_when_env_is_empty() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8000);
        assert_eq!(config.courses_data_path, "artifacts/courses.json");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.bind_address(), "127.0.0.1:8000");
    }

    #[test]
    fn test_overrides_from_env() {
        let vars = vec![
            ("PORT".to_string(), "9100".to_string()),
            ("MODEL_PATH".to_string(), "/srv/model.onnx".to_string()),
            ("LOG_FORMAT".to_string(), "json".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.model_path, "/srv/model.onnx");
        assert_eq!(config.log_format, LogFormat::Json);
    }
}

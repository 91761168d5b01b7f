use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub model: ModelConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let model = ModelConfig {
            api_key: std::env::var("MODEL_API_KEY")?,
            base_url: std::env::var("MODEL_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            model: std::env::var("MODEL_NAME").unwrap_or_else(|_| "gpt-4o".into()),
            max_tokens: std::env::var("MODEL_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(600),
        };
        Ok(Self {
            database_url,
            model,
        })
    }
}

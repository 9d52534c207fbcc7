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

    /// Remote embedding endpoint. The local hashing embedder is used when unset.
    #[serde(default)]
    pub embedding_url: Option<String>,

    /// Remote emotion classifier endpoint. The local lexicon classifier is used when unset.
    #[serde(default)]
    pub classifier_url: Option<String>,

    /// Vector dimension of the local hashing embedder
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: usize,

    /// Maximum number of in-flight calls into each model
    #[serde(default = "default_model_concurrency")]
    pub model_concurrency: usize,

    /// HTTP timeout for remote model calls, in seconds
    #[serde(default = "default_model_timeout_secs")]
    pub model_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8001
}

fn default_embedding_dimensions() -> usize {
    512
}

fn default_model_concurrency() -> usize {
    1
}

fn default_model_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            embedding_url: None,
            classifier_url: None,
            embedding_dimensions: default_embedding_dimensions(),
            model_concurrency: default_model_concurrency(),
            model_timeout_secs: default_model_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        if config.embedding_dimensions == 0 {
            anyhow::bail!("EMBEDDING_DIMENSIONS must be greater than zero");
        }
        if config.model_concurrency == 0 {
            anyhow::bail!("MODEL_CONCURRENCY must be greater than zero");
        }

        Ok(config)
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

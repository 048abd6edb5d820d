use serde::Deserialize;

#[derive(Deserialize)]
pub struct TalonConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    pub s3: Option<S3Config>,
}

#[derive(Deserialize)]
pub struct InputConfig {
    /// Local directory of `<date>-*.json.gz` files; omit to read from S3.
    #[serde(default)]
    pub local_dir: Option<String>,
    /// Key prefix ahead of the date when reading from S3.
    #[serde(default = "default_raw_prefix")]
    pub prefix: String,
    /// Partition date (YYYY-MM-DD); `--date` on the command line wins.
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_local_path")]
    pub local_path: String,
    #[serde(default = "default_output_key")]
    pub key: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            local_path: default_local_path(),
            key: default_output_key(),
        }
    }
}

#[derive(Deserialize)]
pub struct S3Config {
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

fn default_raw_prefix() -> String {
    "raw/".to_string()
}
fn default_local_path() -> String {
    "./talon-data/bot_analysis.json".to_string()
}
fn default_output_key() -> String {
    "gold/bot_analysis/summary.json".to_string()
}
fn default_region() -> String {
    "us-east-1".to_string()
}

impl TalonConfig {
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}

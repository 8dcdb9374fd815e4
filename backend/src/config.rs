use std::path::PathBuf;

use log::warn;

pub const DEFAULT_MODEL_PATH: &str = "models/baseline_cnn.onnx";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub model_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Config {
            model_path: lookup("MODEL_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or("PORT", lookup("PORT"), DEFAULT_PORT),
            workers: parse_or("WORKERS", lookup("WORKERS"), num_cpus::get()).max(1),
            max_upload_bytes: parse_or(
                "MAX_UPLOAD_BYTES",
                lookup("MAX_UPLOAD_BYTES"),
                DEFAULT_MAX_UPLOAD_BYTES,
            ),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match value {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}={:?}", key, raw);
            default
        }),
    }
}

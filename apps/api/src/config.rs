use anyhow::{bail, Context, Result};

use crate::export::raster::parse_hex_color;
use crate::export::PageSize;
use crate::photos::DEFAULT_MAX_PHOTO_BYTES;

/// S3 / MinIO connection settings. Present only when every variable is set.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Application configuration loaded from environment variables.
/// Startup fails on malformed values; optional backends fall back to memory.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub redis_url: Option<String>,
    pub s3: Option<S3Config>,
    pub default_page_size: PageSize,
    pub raster_scale: f32,
    pub raster_background: String,
    pub draft_ttl_hours: i64,
    pub max_photo_bytes: usize,
    pub max_upload_bytes: usize,
}

const S3_VARS: [&str; 4] = [
    "S3_BUCKET",
    "S3_ENDPOINT",
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
];

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let s3_values: Vec<Option<String>> = S3_VARS.iter().map(|&k| var(k)).collect();
        let s3 = match s3_values.as_slice() {
            [Some(bucket), Some(endpoint), Some(key_id), Some(secret)] => Some(S3Config {
                bucket: bucket.clone(),
                endpoint: endpoint.clone(),
                access_key_id: key_id.clone(),
                secret_access_key: secret.clone(),
            }),
            values if values.iter().all(Option::is_none) => None,
            values => {
                let missing: Vec<&str> = S3_VARS
                    .iter()
                    .zip(values)
                    .filter(|(_, v)| v.is_none())
                    .map(|(k, _)| *k)
                    .collect();
                bail!("Incomplete S3 configuration, missing: {}", missing.join(", "));
            }
        };

        let default_page_size = match var("DEFAULT_PAGE_SIZE") {
            Some(v) => v
                .parse::<PageSize>()
                .map_err(anyhow::Error::msg)
                .context("DEFAULT_PAGE_SIZE is invalid")?,
            None => PageSize::A4,
        };

        let raster_scale = parse_or("RASTER_SCALE", var("RASTER_SCALE"), 1.0_f32)?;
        if !(raster_scale.is_finite() && raster_scale > 0.0) {
            bail!("RASTER_SCALE must be a positive number, got {raster_scale}");
        }

        let raster_background = var("RASTER_BACKGROUND").unwrap_or_else(|| "#ffffff".to_string());
        parse_hex_color(&raster_background).context("RASTER_BACKGROUND is invalid")?;

        Ok(Config {
            port: parse_or("PORT", var("PORT"), 8080_u16)
                .context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            redis_url: var("REDIS_URL"),
            s3,
            default_page_size,
            raster_scale,
            raster_background,
            draft_ttl_hours: parse_or("DRAFT_TTL_HOURS", var("DRAFT_TTL_HOURS"), 24_i64)?,
            max_photo_bytes: parse_or(
                "MAX_PHOTO_BYTES",
                var("MAX_PHOTO_BYTES"),
                DEFAULT_MAX_PHOTO_BYTES,
            )?,
            max_upload_bytes: parse_or(
                "MAX_UPLOAD_BYTES",
                var("MAX_UPLOAD_BYTES"),
                25 * 1024 * 1024,
            )?,
        })
    }

    pub fn draft_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.draft_ttl_hours)
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(v) => v
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{v}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Defaults with every optional backend disabled.
    pub(crate) fn for_tests() -> Self {
        Self::from_lookup(|_| None).unwrap()
    }
}

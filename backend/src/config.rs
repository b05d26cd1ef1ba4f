//! Process configuration, built once at startup from environment variables
//! and passed down explicitly. The text-generation API key lives behind the
//! `SecretStore` trait so the credential source can be swapped without
//! touching pipeline code.

use std::env;
use std::sync::Mutex;

/// Where the text-generation credential comes from.
pub trait SecretStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, value: String);
    fn clear(&self);
}

/// Reads the secret from an environment variable, with an in-process
/// override so `set`/`clear` work without mutating the process environment.
pub struct EnvSecretStore {
    var: String,
    override_value: Mutex<Option<String>>,
}

impl EnvSecretStore {
    pub fn new(var: impl Into<String>) -> Self {
        EnvSecretStore {
            var: var.into(),
            override_value: Mutex::new(None),
        }
    }
}

impl SecretStore for EnvSecretStore {
    fn get(&self) -> Option<String> {
        if let Ok(guard) = self.override_value.lock() {
            if let Some(v) = guard.as_ref() {
                return Some(v.clone());
            }
        }
        env::var(&self.var).ok().filter(|v| !v.is_empty())
    }

    fn set(&self, value: String) {
        if let Ok(mut guard) = self.override_value.lock() {
            *guard = Some(value);
        }
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.override_value.lock() {
            *guard = None;
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Base URL of the OpenAI-compatible text-generation service.
    pub generation_base_url: String,
    /// Model identifier sent with each completion request.
    pub generation_model: String,
    /// Directory holding the TTF families used by the rasterizer and genpdf.
    pub fonts_dir: String,
    /// Oversampling factor for rasterization; at least 2 for print quality.
    pub render_scale: u32,
    /// JPEG encoder quality, 1-100.
    pub jpeg_quality: u8,
    /// Pause between recipients to bound peak resource usage.
    pub inter_item_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            generation_base_url: "https://api.openai.com".to_string(),
            generation_model: "gpt-4o".to_string(),
            fonts_dir: "./fonts".to_string(),
            render_scale: 2,
            jpeg_quality: 90,
            inter_item_delay_ms: 100,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = AppConfig::default();
        AppConfig {
            host: env::var("BIND_HOST").unwrap_or(defaults.host),
            port: env::var("BIND_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            generation_base_url: env::var("GENERATION_BASE_URL")
                .unwrap_or(defaults.generation_base_url),
            generation_model: env::var("GENERATION_MODEL").unwrap_or(defaults.generation_model),
            fonts_dir: env::var("FONTS_DIR").unwrap_or(defaults.fonts_dir),
            render_scale: env::var("RENDER_SCALE")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(|v: u32| v.max(2))
                .unwrap_or(defaults.render_scale),
            jpeg_quality: env::var("JPEG_QUALITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.jpeg_quality),
            inter_item_delay_ms: env::var("INTER_ITEM_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.inter_item_delay_ms),
        }
    }
}

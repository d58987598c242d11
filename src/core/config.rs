use std::env;

use crate::features::catalog::models::Language;
use crate::shared::constants::DEFAULT_API_URL;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub api: ApiConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub max_request_body_size: usize,
}

/// Remote marketplace API the dashboard administers
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    pub base_url: String,
    /// Prefix for relative icon paths returned by the API
    pub file_base_url: String,
    /// Bearer token seeding the admin session (optional)
    pub access_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub default_language: Language,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            api: ApiConfig::from_env()?,
            dashboard: DashboardConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 10 * 1024 * 1024; // 10MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        Ok(Self {
            host,
            port,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, String> {
        let base_url = env::var("API_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let base_url = base_url.trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(format!("API_URL must be an http(s) URL, got '{}'", base_url));
        }

        let file_base_url = env::var("API_FILE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| base_url.clone());

        let access_token = env::var("API_ACCESS_TOKEN")
            .ok()
            .filter(|s| !s.is_empty());

        Ok(Self {
            base_url,
            file_base_url,
            access_token,
        })
    }
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("DASHBOARD_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("DASHBOARD_PASSWORD").ok().filter(|s| !s.is_empty());

        let default_language = match env::var("DEFAULT_LANGUAGE") {
            Ok(raw) if !raw.trim().is_empty() => raw
                .parse::<Language>()
                .map_err(|e| format!("Invalid DEFAULT_LANGUAGE: {}", e))?,
            _ => Language::default(),
        };

        Ok(Self {
            username,
            password,
            default_language,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(super) http: HttpSettings,
    pub(super) environment: Environment,
    pub(super) api: ApiSettings,
    pub(super) cors_origins: Vec<String>,
    pub(super) uploads: UploadSettings,
    pub(super) telemetry: TelemetrySettings,
}

#[derive(Debug, Clone)]
pub(crate) struct HttpSettings {
    pub(crate) host: String,
    pub(crate) port: u16,
}

#[derive(Debug, Clone)]
pub(crate) struct ApiSettings {
    pub(crate) project_name: String,
    pub(crate) version: String,
    /// Mount point of the versioned routes, e.g. `/api/v1`.
    pub(crate) prefix: String,
}

/// Where uploaded exam documents live and how large one file may be.
#[derive(Debug, Clone)]
pub(crate) struct UploadSettings {
    pub(crate) dir: PathBuf,
    pub(crate) max_file_mb: u64,
}

#[derive(Debug, Clone)]
pub(crate) struct TelemetrySettings {
    pub(crate) log_filter: String,
    pub(crate) json_logs: bool,
    pub(crate) prometheus: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("{key} must not be empty")]
    Empty { key: &'static str },
    #[error("{key} has invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
    #[error("{key} must be a JSON array or a comma separated list of origins, got '{value}'")]
    InvalidOrigins { key: &'static str, value: String },
}

impl HttpSettings {
    pub(crate) fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl UploadSettings {
    pub(crate) fn max_file_bytes(&self) -> u64 {
        self.max_file_mb.saturating_mul(1024 * 1024)
    }
}

impl Environment {
    /// Unknown or missing names fall back to development.
    pub(crate) fn from_name(name: Option<&str>) -> Self {
        match name.map(str::to_ascii_lowercase).as_deref() {
            Some("production" | "prod") => Self::Production,
            Some("staging") => Self::Staging,
            Some("test" | "testing") => Self::Test,
            _ => Self::Development,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_names() {
        assert_eq!(Environment::from_name(Some("PROD")), Environment::Production);
        assert_eq!(Environment::from_name(Some("staging")), Environment::Staging);
        assert_eq!(Environment::from_name(Some("testing")), Environment::Test);
        assert_eq!(Environment::from_name(Some("qa")), Environment::Development);
        assert_eq!(Environment::from_name(None), Environment::Development);
    }

    #[test]
    fn upload_limit_in_bytes() {
        let uploads = UploadSettings { dir: PathBuf::from("uploads"), max_file_mb: 10 };
        assert_eq!(uploads.max_file_bytes(), 10_485_760);

        let huge = UploadSettings { dir: PathBuf::from("uploads"), max_file_mb: u64::MAX };
        assert_eq!(huge.max_file_bytes(), u64::MAX);
    }
}

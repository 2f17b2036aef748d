use std::path::PathBuf;

use super::parsing::{first_var, flag, number, origins, var, var_or};
use super::types::{
    ApiSettings, ConfigError, Environment, HttpSettings, Settings, TelemetrySettings,
    UploadSettings,
};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let http = HttpSettings {
            host: var_or("EXAM_HELPER_HOST", "0.0.0.0"),
            port: match first_var(&["EXAM_HELPER_PORT", "PORT"]) {
                Some(raw) => number("EXAM_HELPER_PORT", raw)?,
                None => 8080,
            },
        };

        let environment =
            Environment::from_name(first_var(&["EXAM_HELPER_ENV", "ENVIRONMENT"]).as_deref());

        let api = ApiSettings {
            project_name: var_or("PROJECT_NAME", "Exam Helper API"),
            version: var_or("VERSION", env!("CARGO_PKG_VERSION")),
            prefix: var_or("API_V1_STR", "/api/v1"),
        };

        let cors_origins = origins(
            "BACKEND_CORS_ORIGINS",
            first_var(&["BACKEND_CORS_ORIGINS", "FRONTEND_URL"]),
        )?;

        let uploads = UploadSettings {
            dir: PathBuf::from(var_or("UPLOAD_DIR", "./uploads")),
            max_file_mb: match var("MAX_UPLOAD_SIZE_MB") {
                Some(raw) => number("MAX_UPLOAD_SIZE_MB", raw)?,
                None => 10,
            },
        };

        let telemetry = TelemetrySettings {
            log_filter: var_or("EXAM_HELPER_LOG_LEVEL", "info"),
            json_logs: var("EXAM_HELPER_LOG_JSON").is_some_and(|raw| flag(&raw)),
            prometheus: var("PROMETHEUS_ENABLED").is_some_and(|raw| flag(&raw)),
        };

        let settings = Self { http, environment, api, cors_origins, uploads, telemetry };
        settings.validate()?;

        Ok(settings)
    }

    pub(crate) fn http(&self) -> &HttpSettings {
        &self.http
    }

    pub(crate) fn environment(&self) -> Environment {
        self.environment
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }

    pub(crate) fn uploads(&self) -> &UploadSettings {
        &self.uploads
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::Invalid { key: "EXAM_HELPER_PORT", value: "0".to_string() });
        }

        if !self.api.prefix.starts_with('/') {
            return Err(ConfigError::Invalid { key: "API_V1_STR", value: self.api.prefix.clone() });
        }

        if self.uploads.max_file_mb == 0 {
            return Err(ConfigError::Invalid { key: "MAX_UPLOAD_SIZE_MB", value: "0".to_string() });
        }

        if self.uploads.dir.as_os_str().is_empty() {
            return Err(ConfigError::Empty { key: "UPLOAD_DIR" });
        }

        Ok(())
    }
}

#[cfg(test)]
impl Settings {
    /// Local settings rooted at `upload_dir` with a 1 MB per-file limit.
    pub(crate) fn for_tests(upload_dir: PathBuf) -> Self {
        Self {
            http: HttpSettings { host: "127.0.0.1".to_string(), port: 8080 },
            environment: Environment::Test,
            api: ApiSettings {
                project_name: "Exam Helper API".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                prefix: "/api/v1".to_string(),
            },
            cors_origins: vec!["http://localhost:3000".to_string()],
            uploads: UploadSettings { dir: upload_dir, max_file_mb: 1 },
            telemetry: TelemetrySettings {
                log_filter: "info".to_string(),
                json_logs: false,
                prometheus: false,
            },
        }
    }

    pub(crate) fn with_prometheus(mut self, enabled: bool) -> Self {
        self.telemetry.prometheus = enabled;
        self
    }
}

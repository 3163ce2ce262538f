use super::parsing::{
    env_optional, env_or_default, parse_bool, parse_cors_origins, parse_environment, parse_f64,
    parse_u16, parse_u32, parse_u64,
};
use super::secret::load_or_create_secret_key;
use super::types::{
    AdminSettings, ApiSettings, ConfigError, CorsSettings, DatabaseSettings, EvaluatorSettings,
    RedisSettings, RuntimeSettings, SecuritySettings, ServerHost, ServerPort, ServerSettings,
    Settings, TelemetrySettings,
};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("ASSESSLY_HOST", "0.0.0.0");
        let port = env_or_default("ASSESSLY_PORT", "8000");

        let environment =
            parse_environment(env_optional("ASSESSLY_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("ASSESSLY_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "Assessly API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_v1_str = env_or_default("API_V1_STR", "/api/v1");

        let secret_key = match env_optional("SECRET_KEY") {
            Some(value) => value,
            None => load_or_create_secret_key(),
        };

        let access_token_expire_minutes = parse_u64(
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            env_or_default("ACCESS_TOKEN_EXPIRE_MINUTES", "1440"),
        )?;
        let algorithm = env_or_default("ALGORITHM", "HS256");

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = parse_u16("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?;
        let postgres_user = env_or_default("POSTGRES_USER", "assessly");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "assessly_db");
        let database_url = env_optional("DATABASE_URL");

        let redis_host = env_or_default("REDIS_HOST", "localhost");
        let redis_port = parse_u16("REDIS_PORT", env_or_default("REDIS_PORT", "6379"))?;
        let redis_db = parse_u16("REDIS_DB", env_or_default("REDIS_DB", "0"))?;
        let redis_password = env_or_default("REDIS_PASSWORD", "");

        let evaluator_api_key = env_or_default("EVALUATOR_API_KEY", "");
        let evaluator_base_url = env_or_default("EVALUATOR_BASE_URL", "");
        let evaluator_model = env_or_default("EVALUATOR_MODEL", "gpt-4o-mini");
        let evaluator_max_tokens =
            parse_u32("EVALUATOR_MAX_TOKENS", env_or_default("EVALUATOR_MAX_TOKENS", "1024"))?;
        let evaluator_temperature =
            parse_f64("EVALUATOR_TEMPERATURE", env_or_default("EVALUATOR_TEMPERATURE", "0.2"))?;
        let evaluator_request_timeout = parse_u64(
            "EVALUATOR_REQUEST_TIMEOUT",
            env_or_default("EVALUATOR_REQUEST_TIMEOUT", "60"),
        )?;
        let evaluator_max_retries =
            parse_u32("EVALUATOR_MAX_RETRIES", env_or_default("EVALUATOR_MAX_RETRIES", "2"))?;

        let first_reviewer_username = env_or_default("FIRST_REVIEWER_USERNAME", "admin");
        let first_reviewer_email = env_or_default("FIRST_REVIEWER_EMAIL", "admin@example.com");
        let first_reviewer_password = env_or_default("FIRST_REVIEWER_PASSWORD", "");

        let log_level = env_or_default("ASSESSLY_LOG_LEVEL", "info");
        let json = env_optional("ASSESSLY_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_v1_str },
            security: SecuritySettings { secret_key, access_token_expire_minutes, algorithm },
            cors: CorsSettings { origins: cors_origins },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
            },
            redis: RedisSettings {
                host: redis_host,
                port: redis_port,
                db: redis_db,
                password: redis_password,
            },
            evaluator: EvaluatorSettings {
                api_key: evaluator_api_key,
                base_url: evaluator_base_url,
                model: evaluator_model,
                max_tokens: evaluator_max_tokens,
                temperature: evaluator_temperature,
                request_timeout: evaluator_request_timeout,
                max_retries: evaluator_max_retries,
            },
            admin: AdminSettings {
                first_reviewer_username,
                first_reviewer_email,
                first_reviewer_password,
            },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn security(&self) -> &SecuritySettings {
        &self.security
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn redis(&self) -> &RedisSettings {
        &self.redis
    }

    pub(crate) fn evaluator(&self) -> &EvaluatorSettings {
        &self.evaluator
    }

    pub(crate) fn admin(&self) -> &AdminSettings {
        &self.admin
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.evaluator.request_timeout == 0 {
            return Err(ConfigError::InvalidValue {
                field: "EVALUATOR_REQUEST_TIMEOUT",
                value: "0".to_string(),
            });
        }

        if self.evaluator.max_retries > 10 {
            return Err(ConfigError::InvalidValue {
                field: "EVALUATOR_MAX_RETRIES",
                value: self.evaluator.max_retries.to_string(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.database.database_url.is_none() && self.database.postgres_password.is_empty() {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }
        if self.evaluator.api_key.is_empty() {
            return Err(ConfigError::MissingSecret("EVALUATOR_API_KEY"));
        }
        if self.evaluator.base_url.is_empty() {
            return Err(ConfigError::MissingSecret("EVALUATOR_BASE_URL"));
        }
        if self.admin.first_reviewer_password.is_empty() {
            return Err(ConfigError::MissingSecret("FIRST_REVIEWER_PASSWORD"));
        }

        Ok(())
    }
}

use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Parent domain every tenant subdomain is created under
    pub base_domain: String,
    /// HMAC secret for signing JWTs
    pub jwt_secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
    pub trial_days: i64,
    pub invitation_ttl_days: i64,
    /// Frontend base URL used in invitation links
    pub frontend_url: String,
    pub default_from_email: String,
    /// HTTP mail relay endpoint. Mail is only logged when unset.
    pub mail_relay_url: Option<String>,
    pub mail_relay_token: Option<String>,
    /// Drop the Postgres schema when its tenant is deleted
    pub auto_drop_schema: bool,
    /// Apply the public-schema migration on startup
    pub run_migrations: bool,
    pub cors_allowed_origins: Vec<String>,
    pub sweep_interval_secs: u64,
    pub bootstrap_superuser_email: Option<String>,
    pub bootstrap_superuser_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: parse_or("PORT", 8080),
            base_domain: env::var("BASE_DOMAIN").unwrap_or_else(|_| "localhost".to_string()),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "dev-secret-not-for-production".to_string()),
            access_token_minutes: parse_or("ACCESS_TOKEN_MINUTES", 60),
            refresh_token_days: parse_or("REFRESH_TOKEN_DAYS", 1),
            trial_days: parse_or("TRIAL_DAYS", 30),
            invitation_ttl_days: parse_or("INVITATION_TTL_DAYS", 7),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            default_from_email: env::var("DEFAULT_FROM_EMAIL")
                .unwrap_or_else(|_| "noreply@budgenus.local".to_string()),
            mail_relay_url: env::var("MAIL_RELAY_URL").ok(),
            mail_relay_token: env::var("MAIL_RELAY_TOKEN").ok(),
            auto_drop_schema: parse_or("AUTO_DROP_SCHEMA", false),
            run_migrations: parse_or("RUN_MIGRATIONS", true),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|v| split_list(&v))
                .unwrap_or_else(|_| {
                    vec![
                        "http://localhost:3000".to_string(),
                        "http://127.0.0.1:3000".to_string(),
                    ]
                }),
            sweep_interval_secs: parse_or("SWEEP_INTERVAL_SECS", 3600),
            bootstrap_superuser_email: env::var("BOOTSTRAP_SUPERUSER_EMAIL").ok(),
            bootstrap_superuser_password: env::var("BOOTSTRAP_SUPERUSER_PASSWORD").ok(),
        }
    }

    /// Check if an HTTP mail relay is configured
    pub fn mail_relay_enabled(&self) -> bool {
        self.mail_relay_url.is_some()
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

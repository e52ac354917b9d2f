use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    /// Directory holding the storage partitions.
    pub data_dir: String,
    /// Password given to the seeded administrator account.
    pub seed_admin_password: String,
    pub default_company: String,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()),
            seed_admin_password: env::var("SEED_ADMIN_PASSWORD")
                .unwrap_or_else(|_| "admin123".to_string()),
            default_company: env::var("DEFAULT_COMPANY_NAME")
                .unwrap_or_else(|_| "Company Name".to_string()),

            rate_login_per_min: env::var("RATE_LOGIN_PER_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap(),
            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
        }
    }
}

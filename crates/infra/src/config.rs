use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_env: String,
    pub port: u16,
    pub log_level: String,
    pub mastodon_base_url: String,
    pub directus_base_url: String,
    pub directus_admin_email: String,
    pub directus_admin_password: String,
    pub directus_timeout_ms: u64,
    pub hubs_base_url: String,
    pub restore_page_size: i64,
    pub backup_interval_ms: u64,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let cfg = config::Config::builder()
            .set_default("app_env", "development")?
            .set_default("port", 3000)?
            .set_default("log_level", "info")?
            .set_default("mastodon_base_url", "http://127.0.0.1:3001")?
            .set_default("directus_base_url", "http://127.0.0.1:8055")?
            .set_default("directus_admin_email", "admin@example.com")?
            .set_default("directus_admin_password", "admin")?
            .set_default("directus_timeout_ms", 10_000)?
            .set_default("hubs_base_url", "http://127.0.0.1:4000")?
            .set_default("restore_page_size", 100)?
            .set_default("backup_interval_ms", 86_400_000)?
            .add_source(config::Environment::default().separator("__"))
            .build()?;
        cfg.try_deserialize()
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_check_ignores_case() {
        let mut config = AppConfig {
            app_env: "Production".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            mastodon_base_url: String::new(),
            directus_base_url: String::new(),
            directus_admin_email: String::new(),
            directus_admin_password: String::new(),
            directus_timeout_ms: 10_000,
            hubs_base_url: String::new(),
            restore_page_size: 100,
            backup_interval_ms: 86_400_000,
        };
        assert!(config.is_production());
        config.app_env = "development".to_string();
        assert!(!config.is_production());
    }
}

use rocket::serde::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::str::FromStr;

fn default_max_connections() -> u32 {
    16
}

/// User customizable settings,
/// read from `Rocket.toml` and `ROCKET_*` environment variables.
#[derive(Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct Config {
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Config {
    fn connect_options(&self) -> Result<SqliteConnectOptions, String> {
        let options = SqliteConnectOptions::from_str(&self.database_url)
            .map_err(|e| format!("failed to build database options: {:?}", e))?
            .create_if_missing(true)
            .disable_statement_logging();
        Ok(options)
    }

    pub async fn database_pool(&self) -> Result<SqlitePool, String> {
        let options = self.connect_options()?;
        // Build database connection pool
        let pool = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| format!("failed to get database pool: {:?}", e))?;

        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use rocket::figment::Figment;

    #[test]
    fn test_default_max_connections() {
        let config: Config = Figment::new()
            .merge(("database_url", "sqlite::memory:"))
            .extract()
            .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.max_connections, 16);
    }

    #[test]
    fn test_database_url_is_required() {
        let config: Result<Config, _> = Figment::new().merge(("max_connections", 2)).extract();
        assert!(config.is_err());
    }
}

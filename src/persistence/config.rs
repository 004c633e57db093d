use crate::domain::Config;
use crate::error::PlannerResult;
use rusqlite::{params, types::Type, Connection, OptionalExtension};

/// Load the settings row, falling back to defaults when it was never written
pub fn load_config(conn: &Connection) -> PlannerResult<Config> {
    let raw: Option<String> = conn
        .query_row("SELECT value FROM config WHERE id = 1", [], |row| row.get(0))
        .optional()?;

    match raw {
        Some(json) => serde_json::from_str(&json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)).into()
        }),
        None => Ok(Config::default()),
    }
}

/// Save the settings row
pub fn save_config(conn: &Connection, config: &Config) -> PlannerResult<()> {
    let json = serde_json::to_string(config)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
    conn.execute(
        "INSERT INTO config (id, value) VALUES (1, ?1) \
         ON CONFLICT(id) DO UPDATE SET value = excluded.value",
        params![json],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WeekStart;
    use crate::persistence::Store;

    #[test]
    fn test_load_missing_config() {
        let store = Store::open_in_memory().unwrap();
        let config = load_config(store.conn()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load_config() {
        let store = Store::open_in_memory().unwrap();

        let config = Config {
            week_start: WeekStart::Monday,
            auto_rollover: false,
        };
        save_config(store.conn(), &config).unwrap();
        save_config(store.conn(), &config).unwrap();

        let loaded = load_config(store.conn()).unwrap();
        assert_eq!(loaded, config);

        let rows: i64 = store
            .conn()
            .query_row("SELECT COUNT(*) FROM config", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }
}

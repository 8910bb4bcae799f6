use crate::error::{InventoryError, Result};
use crate::role::Role;
use box_inventory_common::{SearchFields, SessionOptions, TimeDisplay};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const BASE_URL_ENV: &str = "BOX_INVENTORY_API_URL";
pub const TOKEN_ENV: &str = "BOX_INVENTORY_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub timeout_seconds: u64,
    pub role: Role,
    /// 役割の既定値（admin 5件、user 10件）を上書き
    pub page_size: Option<usize>,
    pub search_fields: SearchFields,
    pub export_name: Option<String>,
    /// 日時表示のUTCオフセット（分）。未設定ならローカル時刻
    pub utc_offset_minutes: Option<i32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            timeout_seconds: 30,
            role: Role::default(),
            page_size: None,
            search_fields: SearchFields::default(),
            export_name: None,
            utc_offset_minutes: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| InventoryError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("box-inventory").join("config.json"))
    }

    pub fn get_base_url(&self) -> Result<String> {
        // 環境変数を優先
        let url = std::env::var(BASE_URL_ENV)
            .ok()
            .or_else(|| self.base_url.clone())
            .filter(|u| !u.trim().is_empty())
            .ok_or(InventoryError::MissingBaseUrl)?;

        Ok(url.trim().trim_end_matches('/').to_string())
    }

    pub fn get_token(&self) -> Option<String> {
        std::env::var(TOKEN_ENV).ok().or_else(|| self.token.clone())
    }

    pub fn set_base_url(&mut self, url: String) -> Result<()> {
        self.base_url = Some(url);
        self.save()
    }

    pub fn page_size_for(&self, role: Role) -> usize {
        self.page_size.unwrap_or_else(|| role.default_page_size()).max(1)
    }

    pub fn time_display(&self) -> Result<TimeDisplay> {
        match self.utc_offset_minutes {
            None => Ok(TimeDisplay::local()),
            Some(minutes) => TimeDisplay::with_offset_minutes(minutes).ok_or_else(|| {
                InventoryError::Config(format!("UTCオフセットが不正です: {}分", minutes))
            }),
        }
    }

    pub fn session_options(&self, role: Role) -> Result<SessionOptions> {
        Ok(SessionOptions {
            page_size: self.page_size_for(role),
            search_fields: self.search_fields.clone(),
            time_display: self.time_display()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use box_inventory_common::Field;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(config.role, Role::User);
        assert_eq!(config.search_fields, SearchFields::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            base_url: Some("http://localhost:5000".into()),
            role: Role::Admin,
            search_fields: SearchFields::box_number_only(),
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.base_url.as_deref(), Some("http://localhost:5000"));
        assert_eq!(loaded.role, Role::Admin);
        assert!(loaded.search_fields.contains(Field::BoxNumber));
        assert!(!loaded.search_fields.contains(Field::Status));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "role": "admin", "page_size": 25 }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.page_size_for(config.role), 25);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_page_size_follows_role() {
        let config = Config::default();
        assert_eq!(config.page_size_for(Role::Admin), 5);
        assert_eq!(config.page_size_for(Role::User), 10);

        let zero = Config { page_size: Some(0), ..Default::default() };
        assert_eq!(zero.page_size_for(Role::User), 1);
    }

    #[test]
    fn test_invalid_utc_offset() {
        let config = Config { utc_offset_minutes: Some(100_000), ..Default::default() };
        assert!(matches!(config.time_display(), Err(InventoryError::Config(_))));

        let config = Config { utc_offset_minutes: Some(540), ..Default::default() };
        assert_eq!(config.time_display().unwrap().format("2024-05-01T00:00:00Z"), "5/1/2024, 9:00:00 AM");
    }
}

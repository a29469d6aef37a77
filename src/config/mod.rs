use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::api::WorkspaceKey;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub supabase_url: String,
    #[serde(default)]
    pub anon_key: Option<String>,
    #[serde(default = "default_workspace_key")]
    pub workspace_key: String,
    #[serde(default = "default_partners")]
    pub partners: [String; 2],
    /// Index into `partners`
    #[serde(default)]
    pub current_user: usize,
    #[serde(default = "default_home_place")]
    pub home_place: String,
    #[serde(default = "default_away_place")]
    pub away_place: String,
    #[serde(default = "default_font_scale")]
    pub font_scale: f32,
}

fn default_workspace_key() -> String {
    "veyd-and-manasi".to_string()
}

fn default_partners() -> [String; 2] {
    ["Veyd".to_string(), "Manasi".to_string()]
}

fn default_home_place() -> String {
    "NYU".to_string()
}

fn default_away_place() -> String {
    "IU".to_string()
}

fn default_font_scale() -> f32 {
    1.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            anon_key: None,
            workspace_key: default_workspace_key(),
            partners: default_partners(),
            current_user: 0,
            home_place: default_home_place(),
            away_place: default_away_place(),
            font_scale: default_font_scale(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            serde_json::from_str(&contents)
                .context("Failed to parse config file")
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    /// Remote backend credentials present; otherwise the app runs offline
    pub fn is_configured(&self) -> bool {
        !self.supabase_url.trim().is_empty()
            && self.anon_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "tripboard", "tripboard")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.json"))
    }

    pub fn workspace(&self) -> WorkspaceKey {
        WorkspaceKey::new(self.workspace_key.trim())
    }

    pub fn current_user_name(&self) -> &str {
        self.partners
            .get(self.current_user)
            .map(String::as_str)
            .unwrap_or("Us")
    }

    /// PostgREST root, e.g. "https://abc.supabase.co/rest/v1"
    pub fn rest_url(&self) -> String {
        let project = self.supabase_url
            .trim()
            .trim_end_matches('/')
            .trim_end_matches("/rest/v1");

        if project.starts_with("http://") || project.starts_with("https://") {
            format!("{}/rest/v1", project)
        } else {
            format!("https://{}/rest/v1", project)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: Config = serde_json::from_str(r#"{"supabase_url":"x.supabase.co"}"#).unwrap();
        assert_eq!(config.workspace_key, "veyd-and-manasi");
        assert_eq!(config.current_user_name(), "Veyd");
        assert!(!config.is_configured());
    }

    #[test]
    fn rest_url_normalizes_project_url() {
        let mut config = Config::default();
        config.supabase_url = "abc.supabase.co".into();
        assert_eq!(config.rest_url(), "https://abc.supabase.co/rest/v1");
        config.supabase_url = "https://abc.supabase.co/rest/v1/".into();
        assert_eq!(config.rest_url(), "https://abc.supabase.co/rest/v1");
        config.supabase_url = "http://localhost:54321".into();
        assert_eq!(config.rest_url(), "http://localhost:54321/rest/v1");
    }

    #[test]
    fn out_of_range_user_reads_as_us() {
        let config = Config {
            current_user: 5,
            ..Config::default()
        };
        assert_eq!(config.current_user_name(), "Us");
    }
}

use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use common::config::{ConfigManager, FileContentConfigProvider, Validate, YamlConfigSerializer};

pub const DEFAULT_CONFIG_FILE_NAME: &str = "gomoku_server_config.yaml";

pub fn get_config_manager(
    path: &str,
) -> ConfigManager<FileContentConfigProvider, ServerConfig, YamlConfigSerializer> {
    ConfigManager::from_yaml_file(path)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_address: String,
    pub static_files_path: Option<String>,
    /// Create rooms on the first join to an unknown id instead of ignoring the join.
    pub auto_create_rooms: bool,
    pub cleanup_check_interval_secs: u64,
    pub empty_room_ttl_secs: u64,
    pub outbound_queue_capacity: usize,
}

impl ServerConfig {
    pub fn cleanup_check_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_check_interval_secs)
    }

    pub fn empty_room_ttl(&self) -> Duration {
        Duration::from_secs(self.empty_room_ttl_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: "0.0.0.0:5000".to_string(),
            static_files_path: None,
            auto_create_rooms: true,
            cleanup_check_interval_secs: 300,
            empty_room_ttl_secs: 3600,
            outbound_queue_capacity: 128,
        }
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        self.listen_address
            .parse::<SocketAddr>()
            .map_err(|e| format!("Invalid listen_address '{}': {}", self.listen_address, e))?;

        if self.cleanup_check_interval_secs == 0 {
            return Err("cleanup_check_interval_secs must be greater than 0".to_string());
        }
        if self.empty_room_ttl_secs == 0 {
            return Err("empty_room_ttl_secs must be greater than 0".to_string());
        }
        if self.outbound_queue_capacity == 0 {
            return Err("outbound_queue_capacity must be greater than 0".to_string());
        }
        if let Some(path) = &self.static_files_path
            && path.trim().is_empty()
        {
            return Err("static_files_path must not be blank".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_temp_file_path() -> String {
        let mut path = std::env::temp_dir();
        let random_number: u32 = rand::random();
        path.push(format!("temp_gomoku_server_config_{}.yaml", random_number));
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_missing_file_yields_default() {
        let manager = get_config_manager(&get_temp_file_path());
        assert_eq!(manager.get_config().unwrap(), ServerConfig::default());
    }

    #[test]
    fn test_saved_config_is_read_back() {
        let path = get_temp_file_path();
        let config = ServerConfig {
            listen_address: "127.0.0.1:7000".to_string(),
            auto_create_rooms: false,
            empty_room_ttl_secs: 60,
            ..ServerConfig::default()
        };

        get_config_manager(&path).set_config(&config).unwrap();
        let loaded = get_config_manager(&path).get_config().unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
        assert_eq!(loaded.empty_room_ttl(), Duration::from_secs(60));
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let path = get_temp_file_path();
        std::fs::write(&path, "listen_address: 127.0.0.1:9000\n").unwrap();
        let loaded = get_config_manager(&path).get_config().unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.listen_address, "127.0.0.1:9000");
        assert!(loaded.auto_create_rooms);
        assert_eq!(loaded.outbound_queue_capacity, 128);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let bad_address = ServerConfig {
            listen_address: "not an address".to_string(),
            ..ServerConfig::default()
        };
        assert!(bad_address.validate().is_err());

        let zero_capacity = ServerConfig {
            outbound_queue_capacity: 0,
            ..ServerConfig::default()
        };
        assert!(zero_capacity.validate().is_err());

        let path = get_temp_file_path();
        std::fs::write(&path, "cleanup_check_interval_secs: 0\n").unwrap();
        let result = get_config_manager(&path).get_config();
        let _ = std::fs::remove_file(&path);
        assert!(result.unwrap_err().starts_with("Config validation error"));
    }
}

mod config_content_provider;
mod config_manager;
mod config_serializer;

pub use config_content_provider::{ConfigContentProvider, FileContentConfigProvider};
pub use config_manager::ConfigManager;
pub use config_serializer::{ConfigSerializer, YamlConfigSerializer};

/// Checked every time a config is loaded or saved through `ConfigManager`.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

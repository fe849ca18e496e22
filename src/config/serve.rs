//! `[serve]` section configuration.
//!
//! Contains the local authoring API settings.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[serve]` section in folio.toml - authoring API settings.
///
/// # Example
/// ```toml
/// [serve]
/// interface = "127.0.0.1"  # The API has no auth, keep it local
/// port = 3000
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ServeConfig {
    /// Network interface to bind.
    #[serde(default = "defaults::serve::interface")]
    #[educe(Default = defaults::serve::interface())]
    pub interface: String,

    /// HTTP port number (default: 3000).
    #[serde(default = "defaults::serve::port")]
    #[educe(Default = defaults::serve::port())]
    pub port: u16,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;

    #[test]
    fn test_serve_config() {
        let config = r#"
            [serve]
            interface = "0.0.0.0"
            port = 8080
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.serve.interface, "0.0.0.0");
        assert_eq!(config.serve.port, 8080);
    }

    #[test]
    fn test_serve_config_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();

        assert_eq!(config.serve.interface, "127.0.0.1");
        assert_eq!(config.serve.port, 3000);
    }

    #[test]
    fn test_unknown_field_rejection() {
        let config = r#"
            [serve]
            watch = true
        "#;
        let result: Result<SiteConfig, _> = toml::from_str(config);

        assert!(result.is_err());
    }
}

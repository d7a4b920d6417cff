// crates/pcbook-daemon/src/config.rs
//
// Runtime configuration for the pcbook daemon.
// Loaded from a TOML file or populated with sensible defaults.

use serde::Deserialize;
use std::fs;

use pcbook_rpc::TlsConfig;

/// Runtime configuration for the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Host address for the RPC server.
    #[serde(default = "default_rpc_host")]
    pub rpc_host: String,

    /// Port for the RPC server.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Directory uploaded laptop images are written to.
    #[serde(default = "default_image_dir")]
    pub image_dir: String,

    /// Secret the token signing key is derived from.
    #[serde(default = "default_token_secret")]
    pub token_secret: String,

    /// Lifetime of issued access tokens, in seconds.
    #[serde(default = "default_token_duration_secs")]
    pub token_duration_secs: u64,

    /// Serve over TLS when present.
    #[serde(default)]
    pub tls: Option<TlsConfig>,

    /// Users seeded into the credential store at startup.
    #[serde(default = "default_users")]
    pub users: Vec<UserConfig>,
}

/// A user account created at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserConfig {
    pub username: String,
    pub password: String,
    pub role: String,
}

fn default_rpc_host() -> String {
    "0.0.0.0".to_string()
}

fn default_rpc_port() -> u16 {
    8080
}

fn default_image_dir() -> String {
    "~/.pcbook/img".to_string()
}

fn default_token_secret() -> String {
    "secret".to_string()
}

fn default_token_duration_secs() -> u64 {
    15 * 60
}

fn default_users() -> Vec<UserConfig> {
    vec![
        UserConfig {
            username: "admin1".to_string(),
            password: "secret".to_string(),
            role: "admin".to_string(),
        },
        UserConfig {
            username: "user1".to_string(),
            password: "secret".to_string(),
            role: "user".to_string(),
        },
    ]
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            rpc_host: default_rpc_host(),
            rpc_port: default_rpc_port(),
            image_dir: default_image_dir(),
            token_secret: default_token_secret(),
            token_duration_secs: default_token_duration_secs(),
            tls: None,
            users: default_users(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration text, rejecting values that cannot be represented.
    pub fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: DaemonConfig = toml::from_str(contents)?;
        config.token_duration()?;
        Ok(config)
    }

    pub fn token_duration(&self) -> Result<chrono::Duration, Box<dyn std::error::Error>> {
        i64::try_from(self.token_duration_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| {
                format!(
                    "token_duration_secs {} is out of range",
                    self.token_duration_secs
                )
                .into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = DaemonConfig::parse("").unwrap();
        assert_eq!(config.rpc_port, 8080);
        assert_eq!(config.token_duration().unwrap(), chrono::Duration::minutes(15));
        assert!(config.tls.is_none());
        assert_eq!(config.users.len(), 2);
        assert_eq!(config.users[0].username, "admin1");
        assert_eq!(config.users[1].role, "user");
    }

    #[test]
    fn test_parse_full_file() {
        let config = DaemonConfig::parse(
            r#"
            rpc_host = "127.0.0.1"
            rpc_port = 9090
            image_dir = "/tmp/pcbook-img"
            token_secret = "s3cr3t"
            token_duration_secs = 60

            [tls]
            cert_path = "cert/server-cert.pem"
            key_path = "cert/server-key.pem"

            [[users]]
            username = "root"
            password = "toor"
            role = "admin"
            "#,
        )
        .unwrap();

        assert_eq!(config.rpc_host, "127.0.0.1");
        assert_eq!(config.rpc_port, 9090);
        assert_eq!(config.token_secret, "s3cr3t");
        assert_eq!(config.token_duration().unwrap(), chrono::Duration::seconds(60));
        let tls = config.tls.unwrap();
        assert!(tls.client_ca_path.is_none());
        assert_eq!(config.users.len(), 1);
        assert_eq!(config.users[0].username, "root");
    }

    #[test]
    fn test_out_of_range_token_duration_rejected() {
        let config = DaemonConfig {
            token_duration_secs: 100_000_000_000_000_000,
            ..Default::default()
        };
        assert!(config.token_duration().is_err());

        let err = DaemonConfig::parse("token_duration_secs = 100000000000000000\n").unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(DaemonConfig::load("/nonexistent/pcbook/server.toml").is_err());
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        fs::write(&path, "rpc_port = 7000\n").unwrap();
        let config = DaemonConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.rpc_port, 7000);
        assert_eq!(config.image_dir, "~/.pcbook/img");
    }
}

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::Duration,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("io error {0}")]
    IO(#[from] std::io::Error),

    #[error("toml error {0}")]
    Toml(#[from] toml::de::Error),

    #[error("release period must be greater than zero")]
    ZeroPeriod,

    #[error("display duration must be a positive number of seconds, got {0}")]
    InvalidDuration(f32),

    #[error("retry multiplier must be at least 1, got {0}")]
    InvalidRetryMultiplier(f64),
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct EndpointConfig {
    /// WebSocket url of the hub, e.g. `ws://localhost:8080/api/ws`.
    #[serde(default = "default_url")]
    pub url: String,

    /// Attempts made after the first failed connect; `None` retries forever.
    #[serde(default = "default_connect_retries")]
    pub connect_retries: Option<usize>,

    /// Wait before the first retry.
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,

    /// Growth of the wait after each retry; unset keeps it constant.
    #[serde(default)]
    pub retry_multiplier: Option<f64>,

    /// Cap on the wait when it grows.
    #[serde(default = "default_max_retry_interval_ms")]
    pub max_retry_interval_ms: u64,
}

impl EndpointConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn max_retry_interval(&self) -> Duration {
        Duration::from_millis(self.max_retry_interval_ms)
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            connect_retries: default_connect_retries(),
            retry_interval_ms: default_retry_interval_ms(),
            retry_multiplier: None,
            max_retry_interval_ms: default_max_retry_interval_ms(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PacingConfig {
    /// Minimum time each state stays on display when states arrive in bursts.
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,

    /// Exit once the hub has gone away and every queued state was shown.
    #[serde(default)]
    pub exit_when_drained: bool,
}

impl PacingConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            period_ms: default_period_ms(),
            exit_when_drained: false,
        }
    }
}

/// Content of one panel, either inline or read from a file at startup.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(untagged)]
pub enum PanelConfig {
    Text { text: String },
    File { file: PathBuf },
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct DisplayConfig {
    /// Prepended to a state identifier to form the panel address.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    #[serde(default = "default_clear_screen")]
    pub clear_screen: bool,

    #[serde(default = "default_init_panel")]
    pub init: PanelConfig,

    /// Panels keyed by state identifier.
    #[serde(default)]
    pub panels: BTreeMap<String, PanelConfig>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            clear_screen: default_clear_screen(),
            init: default_init_panel(),
            panels: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub endpoint: EndpointConfig,

    #[serde(default)]
    pub pacing: PacingConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

impl ClientConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, Error> {
        let config = toml::from_str::<Self>(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.pacing.period_ms == 0 {
            return Err(Error::ZeroPeriod);
        }
        if let Some(multiplier) = self.endpoint.retry_multiplier {
            if !(multiplier >= 1.0 && multiplier.is_finite()) {
                return Err(Error::InvalidRetryMultiplier(multiplier));
            }
        }
        Ok(())
    }

    /// Overrides the release period with `secs` seconds, rounded to the
    /// millisecond.
    pub fn set_duration_secs(&mut self, secs: f32) -> Result<(), Error> {
        if !(secs > 0.0 && secs.is_finite()) {
            return Err(Error::InvalidDuration(secs));
        }

        self.pacing.period_ms = (f64::from(secs) * 1000.0).round() as u64;
        self.validate()
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct HubConfig {
    #[serde(default = "default_host")]
    pub host: String,

    /// Port serving the `/api/ws` WebSocket for display clients.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Port serving `POST /api/send` for publishers.
    #[serde(default = "default_publish_port")]
    pub publish_port: u16,

    /// States buffered per subscriber before new ones are dropped for it.
    #[serde(default = "default_subscriber_capacity")]
    pub subscriber_capacity: usize,

    /// Threads per listener. Each open connection holds one.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Limit on a display's handshake and on every write to it.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            publish_port: default_publish_port(),
            subscriber_capacity: default_subscriber_capacity(),
            workers: default_workers(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl HubConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str::<Self>(&contents)?)
    }

    /// Like [`HubConfig::load`] but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

fn default_url() -> String {
    "ws://127.0.0.1:8080/api/ws".to_owned()
}

fn default_connect_retries() -> Option<usize> {
    Some(10)
}

fn default_retry_interval_ms() -> u64 {
    500
}

fn default_max_retry_interval_ms() -> u64 {
    30_000
}

fn default_period_ms() -> u64 {
    1000
}

fn default_prefix() -> String {
    "bstate:".to_owned()
}

fn default_clear_screen() -> bool {
    true
}

fn default_init_panel() -> PanelConfig {
    PanelConfig::Text {
        text: "waiting for the first state...".to_owned(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

fn default_port() -> u16 {
    8080
}

fn default_publish_port() -> u16 {
    8081
}

fn default_subscriber_capacity() -> usize {
    100
}

fn default_workers() -> usize {
    16
}

fn default_timeout_ms() -> u64 {
    5000
}

#[cfg(test)]
pub mod test {
    use std::{collections::BTreeMap, io::Write, path::PathBuf};

    use matches::assert_matches;
    use tempfile::NamedTempFile;

    use super::{
        ClientConfig, DisplayConfig, EndpointConfig, Error, HubConfig, PacingConfig, PanelConfig,
    };

    #[test]
    fn test_client_config() {
        let expected = ClientConfig {
            endpoint: EndpointConfig {
                url: "ws://demo.local:8080/api/ws".to_owned(),
                connect_retries: Some(3),
                retry_interval_ms: 250,
                retry_multiplier: Some(2.0),
                max_retry_interval_ms: 4000,
            },
            pacing: PacingConfig {
                period_ms: 1500,
                exit_when_drained: true,
            },
            display: DisplayConfig {
                prefix: "panel:".to_owned(),
                clear_screen: false,
                init: PanelConfig::Text {
                    text: "connecting...".to_owned(),
                },
                panels: BTreeMap::from([
                    (
                        "amber".to_owned(),
                        PanelConfig::File {
                            file: PathBuf::from("panels/amber.txt"),
                        },
                    ),
                    (
                        "green".to_owned(),
                        PanelConfig::Text {
                            text: "GO".to_owned(),
                        },
                    ),
                    (
                        "red".to_owned(),
                        PanelConfig::Text {
                            text: "STOP".to_owned(),
                        },
                    ),
                ]),
            },
        };

        let example = include_str!("../test/example.toml");
        let actual = ClientConfig::parse(example).expect("valid config");
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::parse("").expect("valid config");
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.pacing.period().as_millis(), 1000);
        assert_eq!(config.display.prefix, "bstate:");
        assert!(!config.pacing.exit_when_drained);
    }

    #[test]
    fn test_zero_period_is_rejected() {
        let config = ClientConfig::parse("[pacing]\nperiod_ms = 0");
        assert_matches!(config, Err(Error::ZeroPeriod));
    }

    #[test]
    fn test_duration_override() {
        let mut config = ClientConfig::default();

        config.set_duration_secs(1.5).expect("valid duration");
        assert_eq!(config.pacing.period_ms, 1500);
        config.set_duration_secs(0.25).expect("valid duration");
        assert_eq!(config.pacing.period(), std::time::Duration::from_millis(250));

        for secs in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert_matches!(
                config.set_duration_secs(secs),
                Err(Error::InvalidDuration(_))
            );
        }
        assert_matches!(config.set_duration_secs(0.0001), Err(Error::ZeroPeriod));
    }

    #[test]
    fn test_bad_retry_multiplier_is_rejected() {
        let config = ClientConfig::parse("[endpoint]\nretry_multiplier = 0.5");
        assert_matches!(config, Err(Error::InvalidRetryMultiplier(_)));
    }

    #[test]
    fn test_load_client_config() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "[endpoint]\nurl = \"ws://10.0.0.2:9000/api/ws\"").expect("write");

        let config = ClientConfig::load(file.path()).expect("valid config");
        assert_eq!(config.endpoint.url, "ws://10.0.0.2:9000/api/ws");
        assert_eq!(config.endpoint.connect_retries, Some(10));
    }

    #[test]
    fn test_hub_config() {
        let config =
            toml::from_str::<HubConfig>("port = 9000\npublish_port = 9001").expect("valid config");
        assert_eq!(
            config,
            HubConfig {
                host: "0.0.0.0".to_owned(),
                port: 9000,
                publish_port: 9001,
                subscriber_capacity: 100,
                workers: 16,
                timeout_ms: 5000,
            }
        );
    }

    #[test]
    fn test_missing_hub_config_uses_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = HubConfig::load_or_default(dir.path().join("hub.toml")).expect("defaults");
        assert_eq!(config, HubConfig::default());
    }
}

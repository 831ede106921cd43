use tracing::trace;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Emulator connection settings (optional - defaults to localhost)
    #[serde(default)]
    pub emulator: EmulatorConfig,

    /// Topology build parameters (required by the builder binary)
    pub build: Option<BuildConfig>,

    /// Monitoring parameters (required by the hub binary)
    pub monitor: Option<MonitorConfig>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct EmulatorConfig {
    #[serde(default = "crate::util::get_emulator_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        EmulatorConfig {
            url: crate::util::get_emulator_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct BuildConfig {
    pub project_name: String,
    #[serde(default = "default_switch_template")]
    pub switch_template: String,
    #[serde(default = "default_endpoint_template")]
    pub endpoint_template: String,
    /// Ports per switch; one port of every access switch is reserved for
    /// the core uplink.
    #[serde(default = "default_switch_ports")]
    pub switch_ports: u32,
    pub target_devices: u32,
    /// Address prefix including the trailing dot, e.g. "192.168.1.".
    #[serde(default = "default_base_ip")]
    pub base_ip: String,
    #[serde(default = "default_subnet_mask")]
    pub subnet_mask: String,
    /// Grace period after project creation before nodes are created.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

impl BuildConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.switch_ports < 2 {
            anyhow::bail!("switch_ports must be at least 2 (uplink + one device port)");
        }
        if self.target_devices < 1 {
            anyhow::bail!("target_devices must be at least 1");
        }
        if !self.base_ip.ends_with('.') {
            anyhow::bail!("base_ip must be a prefix ending with '.', e.g. \"192.168.1.\"");
        }
        Ok(())
    }

    pub fn gateway_ip(&self) -> String {
        format!("{}1", self.base_ip)
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct MonitorConfig {
    /// Name of the emulator project to monitor.
    pub project: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_idle_interval_secs")]
    pub idle_interval_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_switch_template() -> String {
    String::from("Ethernet switch")
}

fn default_endpoint_template() -> String {
    String::from("VPCS")
}

fn default_switch_ports() -> u32 {
    8
}

fn default_base_ip() -> String {
    String::from("192.168.1.")
}

fn default_subnet_mask() -> String {
    String::from("255.255.255.0")
}

fn default_settle_delay_ms() -> u64 {
    2000
}

fn default_poll_interval_secs() -> u64 {
    3
}

fn default_idle_interval_secs() -> u64 {
    3
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)?;
    serde_json::from_str(&file_content)
        .map_err(|_| anyhow::anyhow!("Invalid configuration file provided!"))
        .inspect(|config| trace!("loaded config: {config:?}"))
}

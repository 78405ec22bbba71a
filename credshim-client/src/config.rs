//! Shim configuration.

/// Well-known name the port to the privileged context is opened under.
pub const DEFAULT_CHANNEL_NAME: &str = "credential_manager_shim";

/// Configuration for installing the API surface.
#[derive(Debug, Clone)]
pub struct ShimConfig {
    /// Name the long-lived port is registered under.
    ///
    /// Informational for the host-side connector: the `Transport` handed
    /// to `install` arrives already connected, so this layer only logs
    /// the name. Hosts that open the port themselves should register it
    /// under this name so both ends agree.
    pub channel_name: String,
    /// Whether the capability-query entry point is exposed. Mirrors the
    /// host-side guard that the platform capability API exists at all.
    pub expose_client_capabilities: bool,
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            channel_name: DEFAULT_CHANNEL_NAME.to_string(),
            expose_client_capabilities: true,
        }
    }
}

impl ShimConfig {
    /// Read overrides from the environment.
    ///
    /// Optional: `CREDSHIM_CHANNEL_NAME`,
    /// `CREDSHIM_EXPOSE_CAPABILITIES` (`0`/`false`/`no` disable).
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(name) = std::env::var("CREDSHIM_CHANNEL_NAME") {
            if !name.is_empty() {
                config.channel_name = name;
            }
        }
        if let Ok(flag) = std::env::var("CREDSHIM_EXPOSE_CAPABILITIES") {
            config.expose_client_capabilities =
                !matches!(flag.to_ascii_lowercase().as_str(), "0" | "false" | "no");
        }
        config
    }
}

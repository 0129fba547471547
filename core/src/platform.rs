//! Execution-context capabilities consulted while assembling requests.

/// `User-Agent` sent when the platform exposes process identity.
pub const USER_AGENT: &str = concat!("WooCommerce REST API - Rust Client/", env!("CARGO_PKG_VERSION"));

/// What the surrounding runtime lets the client reveal about itself.
pub trait Platform: Send + Sync {
    /// True when the client runs as an identifiable process and may announce
    /// itself with a `User-Agent` header.
    fn exposes_process_identity(&self) -> bool;
}

/// The platform the crate was compiled for. Native targets expose process
/// identity; `wasm32` builds run inside a host that owns the user agent.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostPlatform;

impl Platform for HostPlatform {
    fn exposes_process_identity(&self) -> bool {
        !cfg!(target_arch = "wasm32")
    }
}

/// A context that never exposes process identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct SandboxedPlatform;

impl Platform for SandboxedPlatform {
    fn exposes_process_identity(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_agent_names_crate_version() {
        assert!(USER_AGENT.starts_with("WooCommerce REST API - Rust Client/"));
        assert!(USER_AGENT.ends_with(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn host_platform_exposes_identity_on_native_targets() {
        assert!(HostPlatform.exposes_process_identity());
    }

    #[test]
    fn sandboxed_platform_hides_identity() {
        assert!(!SandboxedPlatform.exposes_process_identity());
    }
}

//! Host power control abstraction trait.

use async_trait::async_trait;

use super::Result;

/// Powers the host machine down.
///
/// Invoked on a long button press. In normal operation the process does not
/// outlive the call by much; the implementation only initiates the shutdown
/// and returns.
#[async_trait]
pub trait HostPower: Send {
    async fn power_off(&mut self) -> Result<()>;
}

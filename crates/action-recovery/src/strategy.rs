use async_trait::async_trait;
use resilience_core_types::{Device, DeviceError};

/// One category of environment repair
///
/// Returns `Ok(true)` when it found and fixed something, `Ok(false)` when
/// its condition does not apply. Errors count as "not recovered".
#[async_trait]
pub trait RecoveryStrategy: Send + Sync {
    async fn recover(&self, device: &dyn Device) -> Result<bool, DeviceError>;
}

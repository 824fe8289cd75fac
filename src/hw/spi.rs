//! SPI bus abstraction trait.

use async_trait::async_trait;

use super::Result;

/// Full-duplex SPI transfer capability.
///
/// The converter is the only device on this bus and is accessed by exactly
/// one task at a time, so no locking happens at this level.
#[async_trait]
pub trait SpiBus: Send {
    /// Clock out `write` while filling `read` with the bytes returned by
    /// the device. Both slices must have the same length.
    async fn transfer(&mut self, write: &[u8], read: &mut [u8]) -> Result<()>;
}

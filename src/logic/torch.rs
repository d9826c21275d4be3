//! Flashlight Control
//!
//! Toggle đèn flash của camera. Lỗi phần cứng chỉ log, không crash.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TorchError {
    #[error("torch is not available")]
    Unavailable,

    #[error("torch could not be used: {0}")]
    LockFailed(String),
}

/// Camera torch hardware
pub trait TorchDevice: Send {
    fn has_torch(&self) -> bool;
    fn set_torch(&mut self, on: bool) -> Result<(), TorchError>;
}

/// Flash button state bound to a torch device
pub struct FlashControl {
    device: Box<dyn TorchDevice>,
    selected: bool,
}

impl FlashControl {
    pub fn new(device: Box<dyn TorchDevice>) -> Self {
        Self { device, selected: false }
    }

    pub fn is_on(&self) -> bool {
        self.selected
    }

    /// Flip the torch. On hardware errors the state is left as it was.
    pub fn toggle(&mut self) -> bool {
        let target = !self.selected;
        match self.apply(target) {
            Ok(()) => {
                self.selected = target;
                log::debug!("Torch {}", if target { "on" } else { "off" });
            }
            Err(e) => log::warn!("{}", e),
        }
        self.selected
    }

    fn apply(&mut self, on: bool) -> Result<(), TorchError> {
        if !self.device.has_torch() {
            return Err(TorchError::Unavailable);
        }
        self.device.set_torch(on)
    }
}

// ============================================================================
// DEVICES
// ============================================================================

/// Device without flash hardware
#[derive(Debug, Default)]
pub struct NoTorch;

impl TorchDevice for NoTorch {
    fn has_torch(&self) -> bool {
        false
    }

    fn set_torch(&mut self, _on: bool) -> Result<(), TorchError> {
        Err(TorchError::Unavailable)
    }
}

/// In-memory torch for demos and tests
#[derive(Debug, Default)]
pub struct SimulatedTorch {
    pub lit: bool,
}

impl TorchDevice for SimulatedTorch {
    fn has_torch(&self) -> bool {
        true
    }

    fn set_torch(&mut self, on: bool) -> Result<(), TorchError> {
        self.lit = on;
        Ok(())
    }
}

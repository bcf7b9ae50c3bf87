//! Fatal startup errors
//!
//! Nothing here is recoverable: construction either fully succeeds or the
//! composition root reports the cause and exits non-zero. The context
//! unwinds completed phases before any of these reach the caller.

use ash::vk;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Vulkan loader unavailable: {0}")]
    Loader(#[from] ash::LoadingError),
    #[error("Instance creation failed: {0}")]
    InstanceCreation(#[source] vk::Result),
    #[error("Missing extension function: {0}")]
    MissingExtensionFunction(&'static str),
    #[error("Debug callback registration failed: {0}")]
    CallbackRegistration(#[source] vk::Result),
    #[error("No Vulkan-capable physical device found")]
    NoDeviceFound,
    #[error("No graphics-capable queue family on the selected device")]
    NoGraphicsQueue,
    #[error("Logical device creation failed: {0}")]
    DeviceCreation(#[source] vk::Result),
}

pub type Result<T> = std::result::Result<T, ContextError>;

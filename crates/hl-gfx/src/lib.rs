//! Vulkan graphics context bootstrap
//!
//! Four construction phases run in order: build the layer/extension
//! configuration, create the API instance, register the diagnostic
//! callback, then select a physical device and open a logical device with
//! one graphics queue. Teardown retraces the completed phases in strict
//! reverse order; a failure mid-construction unwinds before the error is
//! returned, so callers never see a partially built context.
//!
//! The context talks to the driver through the [`backend::GpuBackend`]
//! seam. [`backend::VulkanBackend`] drives a real Vulkan implementation;
//! [`backend::NullBackend`] records calls for tests.

pub mod backend;
pub mod context;
pub mod debug;
pub mod error;
pub mod policy;

pub use backend::{GpuBackend, NullBackend, VulkanBackend};
pub use context::{ContextDesc, ContextPhase, GraphicsContext};
pub use error::{ContextError, Result};

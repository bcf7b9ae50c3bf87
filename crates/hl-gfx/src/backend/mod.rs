//! Driver backends
//!
//! [`GpuBackend`] is the seam between the context state machine and the
//! native driver. The real implementation talks to Vulkan through `ash`;
//! the null implementation records calls so tests can assert ordering and
//! handle balance without a driver present.

use bitflags::bitflags;

use crate::debug::DebugOptions;
use crate::error::Result;

pub mod null;
pub mod vulkan;

pub use null::NullBackend;
pub use vulkan::VulkanBackend;

/// Validation layer enabled when diagnostics are requested
pub const VALIDATION_LAYER: &str = "VK_LAYER_KHRONOS_validation";

/// Instance extension carrying the diagnostic callback machinery
pub const DEBUG_EXTENSION: &str = "VK_EXT_debug_utils";

bitflags! {
    /// Capability set of a queue family
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct QueueCaps: u32 {
        const GRAPHICS = 1 << 0;
        const COMPUTE = 1 << 1;
        const TRANSFER = 1 << 2;
        const SPARSE_BINDING = 1 << 3;
    }
}

/// Broad adapter category, mirrored from the driver's device type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterKind {
    DiscreteGpu,
    IntegratedGpu,
    VirtualGpu,
    Cpu,
    Other,
}

/// One queue family of an adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueFamilyInfo {
    pub caps: QueueCaps,
    pub queue_count: u32,
}

/// Read-only snapshot of a physical device. Queried, never destroyed.
#[derive(Debug, Clone)]
pub struct AdapterInfo {
    pub name: String,
    pub kind: AdapterKind,
    /// Ordered as the driver reports them; indices into this list are the
    /// queue family indices passed back at device creation.
    pub queue_families: Vec<QueueFamilyInfo>,
}

/// Layer and extension names enabled at instance and device creation.
/// Built once before instance creation, immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct LayerLists {
    pub instance_layers: Vec<String>,
    pub instance_extensions: Vec<String>,
    pub device_layers: Vec<String>,
    pub device_extensions: Vec<String>,
}

impl LayerLists {
    /// Lists for a context with validation and the debug channel enabled
    pub fn for_validation() -> Self {
        Self {
            instance_layers: vec![VALIDATION_LAYER.to_string()],
            instance_extensions: vec![DEBUG_EXTENSION.to_string()],
            device_layers: vec![VALIDATION_LAYER.to_string()],
            device_extensions: Vec::new(),
        }
    }

    /// Empty lists for a context without diagnostics
    pub fn bare() -> Self {
        Self::default()
    }
}

/// Everything needed to create the API instance
#[derive(Debug, Clone)]
pub struct InstanceDesc {
    pub app_name: String,
    pub app_version: (u32, u32, u32),
    pub api_version: (u32, u32, u32),
    pub lists: LayerLists,
    /// When present, the callback descriptor is attached to instance
    /// creation so creation-time messages are captured (best effort).
    pub debug: Option<DebugOptions>,
}

/// Seam between the context and the native driver.
///
/// Handle types are associated so the null backend can use plain values
/// where the Vulkan backend uses driver handles. Destruction methods take
/// handles by value; a destroyed handle cannot be reused.
pub trait GpuBackend {
    type Instance;
    type Adapter: Clone;
    type Device;
    type Messenger;

    fn create_instance(&mut self, desc: &InstanceDesc) -> Result<Self::Instance>;
    fn destroy_instance(&mut self, instance: Self::Instance);

    /// Resolve the debug extension entry points against the instance and
    /// register the diagnostic callback.
    fn install_messenger(
        &mut self,
        instance: &Self::Instance,
        options: &DebugOptions,
    ) -> Result<Self::Messenger>;

    /// Must run strictly before the owning instance is destroyed.
    fn remove_messenger(&mut self, instance: &Self::Instance, messenger: Self::Messenger);

    fn enumerate_adapters(
        &mut self,
        instance: &Self::Instance,
    ) -> Result<Vec<(Self::Adapter, AdapterInfo)>>;

    /// Open a logical device with exactly one queue (priority 1.0) from
    /// the given family.
    fn create_device(
        &mut self,
        instance: &Self::Instance,
        adapter: &Self::Adapter,
        family_index: u32,
        lists: &LayerLists,
    ) -> Result<Self::Device>;

    fn destroy_device(&mut self, device: Self::Device);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_lists_carry_layer_and_extension() {
        let lists = LayerLists::for_validation();
        assert_eq!(lists.instance_layers, [VALIDATION_LAYER]);
        assert_eq!(lists.instance_extensions, [DEBUG_EXTENSION]);
        assert_eq!(lists.device_layers, [VALIDATION_LAYER]);
        assert!(lists.device_extensions.is_empty());
    }

    #[test]
    fn bare_lists_are_empty() {
        let lists = LayerLists::bare();
        assert!(lists.instance_layers.is_empty());
        assert!(lists.instance_extensions.is_empty());
        assert!(lists.device_layers.is_empty());
        assert!(lists.device_extensions.is_empty());
    }
}

//! Vulkan backend over `ash`
//!
//! The loader entry is resolved once at construction. The debug extension
//! dispatch table is resolved per instance and owned by the backend value,
//! never held in process-wide state, so multiple contexts do not alias.

use std::borrow::Cow;
use std::ffi::{c_char, c_void, CStr, CString};
use std::panic;

use ash::vk;

use super::{
    AdapterInfo, AdapterKind, GpuBackend, InstanceDesc, LayerLists, QueueCaps, QueueFamilyInfo,
};
use crate::debug::{self, DebugOptions, DebugSeverity, MessageTier};
use crate::error::{ContextError, Result};

/// Backend driving a real Vulkan implementation
pub struct VulkanBackend {
    entry: ash::Entry,
    debug_loader: Option<ash::ext::debug_utils::Instance>,
}

impl VulkanBackend {
    /// Resolve the system Vulkan loader
    pub fn new() -> Result<Self> {
        let entry = unsafe { ash::Entry::load()? };
        Ok(Self {
            entry,
            debug_loader: None,
        })
    }
}

impl GpuBackend for VulkanBackend {
    type Instance = ash::Instance;
    type Adapter = vk::PhysicalDevice;
    type Device = ash::Device;
    type Messenger = vk::DebugUtilsMessengerEXT;

    fn create_instance(&mut self, desc: &InstanceDesc) -> Result<ash::Instance> {
        log_instance_layers(&self.entry);

        let app_name = CString::new(desc.app_name.as_str()).unwrap_or_default();
        let (app_major, app_minor, app_patch) = desc.app_version;
        let (api_major, api_minor, api_patch) = desc.api_version;
        let app_info = vk::ApplicationInfo::default()
            .application_name(app_name.as_c_str())
            .application_version(vk::make_api_version(0, app_major, app_minor, app_patch))
            .api_version(vk::make_api_version(0, api_major, api_minor, api_patch));

        let layer_names = to_cstrings(&desc.lists.instance_layers);
        let layer_ptrs = to_pointers(&layer_names);
        let extension_names = to_cstrings(&desc.lists.instance_extensions);
        let extension_ptrs = to_pointers(&extension_names);

        let mut create_info = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_layer_names(&layer_ptrs)
            .enabled_extension_names(&extension_ptrs);

        // Attaching the messenger descriptor to the pNext chain captures
        // messages emitted during instance creation itself (best effort).
        let mut creation_debug = desc.debug.as_ref().map(messenger_create_info);
        if let Some(info) = creation_debug.as_mut() {
            create_info = create_info.push_next(info);
        }

        let instance = unsafe { self.entry.create_instance(&create_info, None) }
            .map_err(ContextError::InstanceCreation)?;
        tracing::debug!(target: "vk", "instance created for {:?}", desc.app_name);
        Ok(instance)
    }

    fn destroy_instance(&mut self, instance: ash::Instance) {
        self.debug_loader = None;
        unsafe { instance.destroy_instance(None) };
        tracing::debug!(target: "vk", "instance destroyed");
    }

    fn install_messenger(
        &mut self,
        instance: &ash::Instance,
        options: &DebugOptions,
    ) -> Result<vk::DebugUtilsMessengerEXT> {
        // Extension functions are not statically exported; a null result
        // means the debug extension was not actually enabled or supported.
        const ENTRY_POINTS: [(&str, &CStr); 2] = [
            ("vkCreateDebugUtilsMessengerEXT", c"vkCreateDebugUtilsMessengerEXT"),
            ("vkDestroyDebugUtilsMessengerEXT", c"vkDestroyDebugUtilsMessengerEXT"),
        ];
        for (label, symbol) in ENTRY_POINTS {
            let resolved = unsafe {
                (self.entry.static_fn().get_instance_proc_addr)(
                    instance.handle(),
                    symbol.as_ptr(),
                )
            };
            if resolved.is_none() {
                return Err(ContextError::MissingExtensionFunction(label));
            }
        }

        let loader = self
            .debug_loader
            .get_or_insert_with(|| ash::ext::debug_utils::Instance::new(&self.entry, instance));

        let create_info = messenger_create_info(options);
        let messenger = unsafe { loader.create_debug_utils_messenger(&create_info, None) }
            .map_err(ContextError::CallbackRegistration)?;
        tracing::debug!(target: "vk", "debug messenger installed");
        Ok(messenger)
    }

    fn remove_messenger(&mut self, _instance: &ash::Instance, messenger: vk::DebugUtilsMessengerEXT) {
        if let Some(loader) = &self.debug_loader {
            unsafe { loader.destroy_debug_utils_messenger(messenger, None) };
            tracing::debug!(target: "vk", "debug messenger removed");
        }
    }

    fn enumerate_adapters(
        &mut self,
        instance: &ash::Instance,
    ) -> Result<Vec<(vk::PhysicalDevice, AdapterInfo)>> {
        let devices = unsafe { instance.enumerate_physical_devices() }
            .map_err(|_| ContextError::NoDeviceFound)?;

        let mut adapters = Vec::with_capacity(devices.len());
        for device in devices {
            let properties = unsafe { instance.get_physical_device_properties(device) };
            let families = unsafe { instance.get_physical_device_queue_family_properties(device) };
            let name = properties
                .device_name_as_c_str()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|_| "unknown".to_string());
            let info = AdapterInfo {
                name,
                kind: adapter_kind(properties.device_type),
                queue_families: families
                    .iter()
                    .map(|family| QueueFamilyInfo {
                        caps: queue_caps(family.queue_flags),
                        queue_count: family.queue_count,
                    })
                    .collect(),
            };
            tracing::debug!(target: "vk", "adapter {:?} ({:?})", info.name, info.kind);
            adapters.push((device, info));
        }
        Ok(adapters)
    }

    fn create_device(
        &mut self,
        instance: &ash::Instance,
        adapter: &vk::PhysicalDevice,
        family_index: u32,
        lists: &LayerLists,
    ) -> Result<ash::Device> {
        log_device_layers(instance, *adapter);

        let priorities = [1.0f32];
        let queue_info = vk::DeviceQueueCreateInfo::default()
            .queue_family_index(family_index)
            .queue_priorities(&priorities);

        let layer_names = to_cstrings(&lists.device_layers);
        let layer_ptrs = to_pointers(&layer_names);
        let extension_names = to_cstrings(&lists.device_extensions);
        let extension_ptrs = to_pointers(&extension_names);

        let create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(std::slice::from_ref(&queue_info))
            .enabled_layer_names(&layer_ptrs)
            .enabled_extension_names(&extension_ptrs);

        let device = unsafe { instance.create_device(*adapter, &create_info, None) }
            .map_err(ContextError::DeviceCreation)?;
        tracing::debug!(target: "vk", "logical device created on family {family_index}");
        Ok(device)
    }

    fn destroy_device(&mut self, device: ash::Device) {
        unsafe { device.destroy_device(None) };
        tracing::debug!(target: "vk", "logical device destroyed");
    }
}

/// Callback handed to the driver. Classifies the message, emits one log
/// line, and reports "handled, continue". A panic must never unwind into
/// driver code, so everything runs under `catch_unwind`.
unsafe extern "system" fn vulkan_debug_callback(
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    kind: vk::DebugUtilsMessageTypeFlagsEXT,
    data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _user_data: *mut c_void,
) -> vk::Bool32 {
    let _ = panic::catch_unwind(|| {
        let message = unsafe {
            if data.is_null() || (*data).p_message.is_null() {
                Cow::Borrowed("")
            } else {
                CStr::from_ptr((*data).p_message).to_string_lossy()
            }
        };
        debug::emit(MessageTier::classify(severity, kind), &message);
    });
    vk::FALSE
}

fn messenger_create_info(options: &DebugOptions) -> vk::DebugUtilsMessengerCreateInfoEXT<'static> {
    vk::DebugUtilsMessengerCreateInfoEXT::default()
        .message_severity(severity_bits(options.severities))
        .message_type(type_bits(options.severities))
        .pfn_user_callback(Some(vulkan_debug_callback))
}

fn severity_bits(severities: DebugSeverity) -> vk::DebugUtilsMessageSeverityFlagsEXT {
    let mut bits = vk::DebugUtilsMessageSeverityFlagsEXT::empty();
    if severities.contains(DebugSeverity::INFO) {
        bits |= vk::DebugUtilsMessageSeverityFlagsEXT::INFO;
    }
    if severities.intersects(DebugSeverity::WARNING | DebugSeverity::PERFORMANCE) {
        bits |= vk::DebugUtilsMessageSeverityFlagsEXT::WARNING;
    }
    if severities.contains(DebugSeverity::ERROR) {
        bits |= vk::DebugUtilsMessageSeverityFlagsEXT::ERROR;
    }
    if severities.contains(DebugSeverity::DEBUG) {
        bits |= vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE;
    }
    bits
}

fn type_bits(severities: DebugSeverity) -> vk::DebugUtilsMessageTypeFlagsEXT {
    let mut bits = vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
        | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION;
    if severities.contains(DebugSeverity::PERFORMANCE) {
        bits |= vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE;
    }
    bits
}

fn adapter_kind(device_type: vk::PhysicalDeviceType) -> AdapterKind {
    match device_type {
        vk::PhysicalDeviceType::DISCRETE_GPU => AdapterKind::DiscreteGpu,
        vk::PhysicalDeviceType::INTEGRATED_GPU => AdapterKind::IntegratedGpu,
        vk::PhysicalDeviceType::VIRTUAL_GPU => AdapterKind::VirtualGpu,
        vk::PhysicalDeviceType::CPU => AdapterKind::Cpu,
        _ => AdapterKind::Other,
    }
}

fn queue_caps(flags: vk::QueueFlags) -> QueueCaps {
    let mut caps = QueueCaps::empty();
    if flags.contains(vk::QueueFlags::GRAPHICS) {
        caps |= QueueCaps::GRAPHICS;
    }
    if flags.contains(vk::QueueFlags::COMPUTE) {
        caps |= QueueCaps::COMPUTE;
    }
    if flags.contains(vk::QueueFlags::TRANSFER) {
        caps |= QueueCaps::TRANSFER;
    }
    if flags.contains(vk::QueueFlags::SPARSE_BINDING) {
        caps |= QueueCaps::SPARSE_BINDING;
    }
    caps
}

fn to_cstrings(names: &[String]) -> Vec<CString> {
    names
        .iter()
        .filter_map(|name| CString::new(name.as_str()).ok())
        .collect()
}

fn to_pointers(names: &[CString]) -> Vec<*const c_char> {
    names.iter().map(|name| name.as_ptr()).collect()
}

fn log_instance_layers(entry: &ash::Entry) {
    let Ok(layers) = (unsafe { entry.enumerate_instance_layer_properties() }) else {
        return;
    };
    for layer in &layers {
        let name = layer.layer_name_as_c_str().unwrap_or(c"?");
        let description = layer.description_as_c_str().unwrap_or(c"");
        tracing::debug!(target: "vk", "instance layer {:?}: {:?}", name, description);
    }
}

fn log_device_layers(instance: &ash::Instance, adapter: vk::PhysicalDevice) {
    let Ok(layers) = (unsafe { instance.enumerate_device_layer_properties(adapter) }) else {
        return;
    };
    for layer in &layers {
        let name = layer.layer_name_as_c_str().unwrap_or(c"?");
        let description = layer.description_as_c_str().unwrap_or(c"");
        tracing::debug!(target: "vk", "device layer {:?}: {:?}", name, description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_bits_cover_all_tiers() {
        let bits = severity_bits(DebugSeverity::all());
        assert!(bits.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO));
        assert!(bits.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING));
        assert!(bits.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR));
        assert!(bits.contains(vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE));
    }

    #[test]
    fn performance_tier_toggles_type_bit() {
        let with = type_bits(DebugSeverity::all());
        assert!(with.contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE));

        let without = type_bits(DebugSeverity::ERROR | DebugSeverity::WARNING);
        assert!(!without.contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE));
        assert!(without.contains(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION));
    }

    #[test]
    fn queue_caps_mirror_driver_flags() {
        let caps = queue_caps(vk::QueueFlags::GRAPHICS | vk::QueueFlags::TRANSFER);
        assert!(caps.contains(QueueCaps::GRAPHICS));
        assert!(caps.contains(QueueCaps::TRANSFER));
        assert!(!caps.contains(QueueCaps::COMPUTE));
    }

    #[test]
    fn adapter_kind_mapping() {
        assert_eq!(
            adapter_kind(vk::PhysicalDeviceType::DISCRETE_GPU),
            AdapterKind::DiscreteGpu
        );
        assert_eq!(
            adapter_kind(vk::PhysicalDeviceType::INTEGRATED_GPU),
            AdapterKind::IntegratedGpu
        );
        assert_eq!(adapter_kind(vk::PhysicalDeviceType::OTHER), AdapterKind::Other);
    }

    #[test]
    fn cstring_conversion_drops_interior_nul() {
        let names = vec!["ok".to_string(), "bad\0name".to_string()];
        let converted = to_cstrings(&names);
        assert_eq!(converted.len(), 1);
        assert_eq!(converted[0].as_c_str(), c"ok");
    }
}

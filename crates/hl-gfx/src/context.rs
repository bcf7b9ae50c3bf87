//! Graphics context construction and teardown
//!
//! Construction runs four phases in order: layer/extension configuration,
//! instance creation, debug channel registration, device selection and
//! creation. Each phase depends on the handle produced by the previous
//! one, so they execute strictly sequentially. Teardown is the exact
//! reverse and is treated as a strict protocol: device and messenger are
//! children of the instance and must go first.

use crate::backend::{AdapterInfo, GpuBackend, InstanceDesc, LayerLists};
use crate::debug::DebugOptions;
use crate::error::{ContextError, Result};
use crate::policy::{self, AdapterPolicy, QueueFamilyPolicy};

/// Construction phase the context has reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextPhase {
    Uninitialized,
    InstanceCreated,
    DebugChannelActive,
    DeviceReady,
}

/// Inputs for context construction
#[derive(Debug, Clone)]
pub struct ContextDesc {
    pub app_name: String,
    /// Application version as major/minor/patch
    pub app_version: (u32, u32, u32),
    /// Target API version as major/minor/patch
    pub api_version: (u32, u32, u32),
    /// Enable the validation layer and the diagnostic callback
    pub validation: bool,
    pub adapter_policy: AdapterPolicy,
    pub queue_policy: QueueFamilyPolicy,
}

impl Default for ContextDesc {
    fn default() -> Self {
        Self {
            app_name: "helios".to_string(),
            app_version: (0, 1, 0),
            api_version: (1, 2, 0),
            validation: true,
            adapter_policy: policy::first_adapter,
            queue_policy: policy::first_graphics_family,
        }
    }
}

/// Owner of the instance and its child resources.
///
/// The instance is created once and destroyed exactly once; the messenger
/// and logical device are destroyed strictly before it. Adapters are
/// borrowed from the driver and never destroyed.
pub struct GraphicsContext<B: GpuBackend> {
    backend: B,
    phase: ContextPhase,
    instance: Option<B::Instance>,
    messenger: Option<B::Messenger>,
    adapter: Option<B::Adapter>,
    adapter_info: Option<AdapterInfo>,
    graphics_family: Option<u32>,
    device: Option<B::Device>,
}

impl<B: GpuBackend> GraphicsContext<B> {
    /// Run all construction phases. On failure, the phases that already
    /// completed are torn down in reverse order before the error is
    /// returned; no partially built context is ever handed out.
    pub fn new(mut backend: B, desc: &ContextDesc) -> Result<Self> {
        // Phase 1: pure configuration, no driver calls.
        let lists = if desc.validation {
            LayerLists::for_validation()
        } else {
            LayerLists::bare()
        };
        let debug = desc.validation.then(DebugOptions::default);

        // Phase 2: instance.
        let instance = backend.create_instance(&InstanceDesc {
            app_name: desc.app_name.clone(),
            app_version: desc.app_version,
            api_version: desc.api_version,
            lists: lists.clone(),
            debug: debug.clone(),
        })?;

        // Phase 3: debug channel.
        let messenger = match &debug {
            Some(options) => match backend.install_messenger(&instance, options) {
                Ok(messenger) => Some(messenger),
                Err(err) => {
                    backend.destroy_instance(instance);
                    return Err(err);
                }
            },
            None => None,
        };

        // Phase 4: adapter selection and device creation.
        let (adapter, adapter_info, graphics_family) =
            match Self::select_adapter(&mut backend, &instance, desc) {
                Ok(selection) => selection,
                Err(err) => {
                    Self::unwind(&mut backend, instance, messenger);
                    return Err(err);
                }
            };

        let device = match backend.create_device(&instance, &adapter, graphics_family, &lists) {
            Ok(device) => device,
            Err(err) => {
                Self::unwind(&mut backend, instance, messenger);
                return Err(err);
            }
        };

        tracing::info!(
            adapter = %adapter_info.name,
            queue_family = graphics_family,
            "graphics context ready"
        );

        Ok(Self {
            backend,
            phase: ContextPhase::DeviceReady,
            instance: Some(instance),
            messenger,
            adapter: Some(adapter),
            adapter_info: Some(adapter_info),
            graphics_family: Some(graphics_family),
            device: Some(device),
        })
    }

    /// Tear down whatever phases completed, in reverse order: device,
    /// debug channel, instance. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(device) = self.device.take() {
            self.backend.destroy_device(device);
            self.phase = ContextPhase::DebugChannelActive;
        }
        if let Some(instance) = self.instance.take() {
            if let Some(messenger) = self.messenger.take() {
                self.backend.remove_messenger(&instance, messenger);
                self.phase = ContextPhase::InstanceCreated;
            }
            self.backend.destroy_instance(instance);
        }
        self.adapter = None;
        self.adapter_info = None;
        self.graphics_family = None;
        self.phase = ContextPhase::Uninitialized;
    }

    pub fn phase(&self) -> ContextPhase {
        self.phase
    }

    /// Native handle of the selected adapter
    pub fn adapter(&self) -> Option<&B::Adapter> {
        self.adapter.as_ref()
    }

    /// Snapshot of the selected adapter
    pub fn adapter_info(&self) -> Option<&AdapterInfo> {
        self.adapter_info.as_ref()
    }

    /// Queue family index the device's single queue was opened on
    pub fn graphics_family(&self) -> Option<u32> {
        self.graphics_family
    }

    /// Logical device handle, for downstream consumers
    pub fn device(&self) -> Option<&B::Device> {
        self.device.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn select_adapter(
        backend: &mut B,
        instance: &B::Instance,
        desc: &ContextDesc,
    ) -> Result<(B::Adapter, AdapterInfo, u32)> {
        let adapters = backend.enumerate_adapters(instance)?;
        if adapters.is_empty() {
            return Err(ContextError::NoDeviceFound);
        }

        let infos: Vec<AdapterInfo> = adapters.iter().map(|(_, info)| info.clone()).collect();
        let index = (desc.adapter_policy)(&infos).ok_or(ContextError::NoDeviceFound)?;
        let (adapter, info) = adapters
            .into_iter()
            .nth(index)
            .ok_or(ContextError::NoDeviceFound)?;

        let family =
            (desc.queue_policy)(&info.queue_families).ok_or(ContextError::NoGraphicsQueue)?;
        tracing::debug!(
            adapter = %info.name,
            kind = ?info.kind,
            queue_family = family,
            "selected adapter"
        );
        Ok((adapter, info, family))
    }

    /// Reverse-order unwind for construction failures after the instance
    /// exists: messenger first, then the instance.
    fn unwind(backend: &mut B, instance: B::Instance, messenger: Option<B::Messenger>) {
        if let Some(messenger) = messenger {
            backend.remove_messenger(&instance, messenger);
        }
        backend.destroy_instance(instance);
    }
}

impl<B: GpuBackend> std::fmt::Debug for GraphicsContext<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphicsContext")
            .field("phase", &self.phase)
            .field("adapter_info", &self.adapter_info)
            .field("graphics_family", &self.graphics_family)
            .finish_non_exhaustive()
    }
}

impl<B: GpuBackend> Drop for GraphicsContext<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

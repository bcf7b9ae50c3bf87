//! Null backend with call accounting for tests

use std::sync::Arc;

use ash::vk;
use parking_lot::Mutex;

use super::{AdapterInfo, GpuBackend, InstanceDesc, LayerLists};
use crate::debug::DebugOptions;
use crate::error::{ContextError, Result};

/// Inspectable state shared between a [`NullBackend`] and its probes
#[derive(Debug, Default)]
pub struct NullState {
    /// Ordered log of every backend call, successful or not
    pub calls: Vec<&'static str>,
    pub instances_created: u32,
    pub instances_destroyed: u32,
    pub messengers_created: u32,
    pub messengers_destroyed: u32,
    pub devices_created: u32,
    pub devices_destroyed: u32,
    pub fail_instance: bool,
    pub fail_messenger: bool,
    pub fail_device: bool,
    pub adapters: Vec<AdapterInfo>,
}

/// Backend that performs no driver calls. Failures can be scripted per
/// phase; every call is recorded so tests can assert ordering and that
/// each create is balanced by a destroy.
#[derive(Clone, Default)]
pub struct NullBackend {
    state: Arc<Mutex<NullState>>,
}

impl NullBackend {
    pub fn new(adapters: Vec<AdapterInfo>) -> Self {
        let backend = Self::default();
        backend.state.lock().adapters = adapters;
        backend
    }

    /// Handle for inspecting state after the backend has been moved into
    /// a context, including after failed construction.
    pub fn probe(&self) -> Arc<Mutex<NullState>> {
        Arc::clone(&self.state)
    }

    pub fn fail_instance(self) -> Self {
        self.state.lock().fail_instance = true;
        self
    }

    pub fn fail_messenger(self) -> Self {
        self.state.lock().fail_messenger = true;
        self
    }

    pub fn fail_device(self) -> Self {
        self.state.lock().fail_device = true;
        self
    }
}

impl GpuBackend for NullBackend {
    type Instance = ();
    type Adapter = usize;
    type Device = ();
    type Messenger = ();

    fn create_instance(&mut self, _desc: &InstanceDesc) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push("create_instance");
        if state.fail_instance {
            return Err(ContextError::InstanceCreation(
                vk::Result::ERROR_INITIALIZATION_FAILED,
            ));
        }
        state.instances_created += 1;
        Ok(())
    }

    fn destroy_instance(&mut self, _instance: ()) {
        let mut state = self.state.lock();
        state.calls.push("destroy_instance");
        state.instances_destroyed += 1;
    }

    fn install_messenger(&mut self, _instance: &(), _options: &DebugOptions) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push("install_messenger");
        if state.fail_messenger {
            return Err(ContextError::CallbackRegistration(
                vk::Result::ERROR_INITIALIZATION_FAILED,
            ));
        }
        state.messengers_created += 1;
        Ok(())
    }

    fn remove_messenger(&mut self, _instance: &(), _messenger: ()) {
        let mut state = self.state.lock();
        state.calls.push("remove_messenger");
        state.messengers_destroyed += 1;
    }

    fn enumerate_adapters(&mut self, _instance: &()) -> Result<Vec<(usize, AdapterInfo)>> {
        let mut state = self.state.lock();
        state.calls.push("enumerate_adapters");
        Ok(state.adapters.iter().cloned().enumerate().collect())
    }

    fn create_device(
        &mut self,
        _instance: &(),
        _adapter: &usize,
        _family_index: u32,
        _lists: &LayerLists,
    ) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push("create_device");
        if state.fail_device {
            return Err(ContextError::DeviceCreation(
                vk::Result::ERROR_INITIALIZATION_FAILED,
            ));
        }
        state.devices_created += 1;
        Ok(())
    }

    fn destroy_device(&mut self, _device: ()) {
        let mut state = self.state.lock();
        state.calls.push("destroy_device");
        state.devices_destroyed += 1;
    }
}

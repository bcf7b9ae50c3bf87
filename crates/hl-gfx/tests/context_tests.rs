//! Construction and teardown protocol tests against the null backend

use hl_gfx::backend::{AdapterInfo, AdapterKind, NullBackend, QueueCaps, QueueFamilyInfo};
use hl_gfx::context::{ContextDesc, ContextPhase, GraphicsContext};
use hl_gfx::error::ContextError;
use hl_gfx::policy;

fn graphics_adapter(name: &str, kind: AdapterKind) -> AdapterInfo {
    AdapterInfo {
        name: name.to_string(),
        kind,
        queue_families: vec![
            QueueFamilyInfo {
                caps: QueueCaps::TRANSFER,
                queue_count: 2,
            },
            QueueFamilyInfo {
                caps: QueueCaps::GRAPHICS | QueueCaps::COMPUTE,
                queue_count: 1,
            },
        ],
    }
}

fn compute_only_adapter() -> AdapterInfo {
    AdapterInfo {
        name: "compute-only".to_string(),
        kind: AdapterKind::DiscreteGpu,
        queue_families: vec![QueueFamilyInfo {
            caps: QueueCaps::COMPUTE | QueueCaps::TRANSFER,
            queue_count: 4,
        }],
    }
}

#[test]
fn test_construct_then_destroy_balances_handles() {
    let backend = NullBackend::new(vec![graphics_adapter("stub", AdapterKind::DiscreteGpu)]);
    let probe = backend.probe();

    let mut context = GraphicsContext::new(backend, &ContextDesc::default()).unwrap();
    assert_eq!(context.phase(), ContextPhase::DeviceReady);
    assert_eq!(context.graphics_family(), Some(1));
    assert_eq!(context.adapter_info().unwrap().name, "stub");

    context.shutdown();
    assert_eq!(context.phase(), ContextPhase::Uninitialized);
    drop(context);

    let state = probe.lock();
    assert_eq!(state.instances_created, 1);
    assert_eq!(state.instances_destroyed, 1);
    assert_eq!(state.messengers_created, 1);
    assert_eq!(state.messengers_destroyed, 1);
    assert_eq!(state.devices_created, 1);
    assert_eq!(state.devices_destroyed, 1);
}

#[test]
fn test_teardown_is_exact_reverse_of_setup() {
    let backend = NullBackend::new(vec![graphics_adapter("stub", AdapterKind::DiscreteGpu)]);
    let probe = backend.probe();

    let context = GraphicsContext::new(backend, &ContextDesc::default()).unwrap();
    drop(context);

    let state = probe.lock();
    assert_eq!(
        state.calls,
        [
            "create_instance",
            "install_messenger",
            "enumerate_adapters",
            "create_device",
            "destroy_device",
            "remove_messenger",
            "destroy_instance",
        ]
    );
}

#[test]
fn test_shutdown_is_idempotent() {
    let backend = NullBackend::new(vec![graphics_adapter("stub", AdapterKind::DiscreteGpu)]);
    let probe = backend.probe();

    let mut context = GraphicsContext::new(backend, &ContextDesc::default()).unwrap();
    context.shutdown();
    context.shutdown();
    drop(context);

    let state = probe.lock();
    assert_eq!(state.instances_destroyed, 1);
    assert_eq!(state.messengers_destroyed, 1);
    assert_eq!(state.devices_destroyed, 1);
}

#[test]
fn test_instance_failure_tears_down_nothing() {
    let backend =
        NullBackend::new(vec![graphics_adapter("stub", AdapterKind::DiscreteGpu)]).fail_instance();
    let probe = backend.probe();

    let err = GraphicsContext::new(backend, &ContextDesc::default()).unwrap_err();
    assert!(matches!(err, ContextError::InstanceCreation(_)));

    let state = probe.lock();
    assert_eq!(state.calls, ["create_instance"]);
    assert_eq!(state.instances_destroyed, 0);
}

#[test]
fn test_messenger_failure_still_destroys_instance() {
    let backend =
        NullBackend::new(vec![graphics_adapter("stub", AdapterKind::DiscreteGpu)]).fail_messenger();
    let probe = backend.probe();

    let err = GraphicsContext::new(backend, &ContextDesc::default()).unwrap_err();
    assert!(matches!(err, ContextError::CallbackRegistration(_)));

    let state = probe.lock();
    assert_eq!(
        state.calls,
        ["create_instance", "install_messenger", "destroy_instance"]
    );
    assert_eq!(state.instances_created, 1);
    assert_eq!(state.instances_destroyed, 1);
    assert_eq!(state.messengers_created, 0);
}

#[test]
fn test_device_failure_unwinds_messenger_then_instance() {
    let backend =
        NullBackend::new(vec![graphics_adapter("stub", AdapterKind::DiscreteGpu)]).fail_device();
    let probe = backend.probe();

    let err = GraphicsContext::new(backend, &ContextDesc::default()).unwrap_err();
    assert!(matches!(err, ContextError::DeviceCreation(_)));

    let state = probe.lock();
    assert_eq!(
        state.calls,
        [
            "create_instance",
            "install_messenger",
            "enumerate_adapters",
            "create_device",
            "remove_messenger",
            "destroy_instance",
        ]
    );
    assert_eq!(state.devices_created, 0);
    assert_eq!(state.messengers_destroyed, 1);
    assert_eq!(state.instances_destroyed, 1);
}

#[test]
fn test_zero_adapters_fails_before_device_phase() {
    let backend = NullBackend::new(Vec::new());
    let probe = backend.probe();

    let err = GraphicsContext::new(backend, &ContextDesc::default()).unwrap_err();
    assert!(matches!(err, ContextError::NoDeviceFound));

    let state = probe.lock();
    assert!(!state.calls.contains(&"create_device"));
    // Completed phases still unwind in reverse.
    assert_eq!(
        state.calls,
        [
            "create_instance",
            "install_messenger",
            "enumerate_adapters",
            "remove_messenger",
            "destroy_instance",
        ]
    );
}

#[test]
fn test_no_graphics_family_fails_before_device_creation() {
    let backend = NullBackend::new(vec![compute_only_adapter()]);
    let probe = backend.probe();

    let err = GraphicsContext::new(backend, &ContextDesc::default()).unwrap_err();
    assert!(matches!(err, ContextError::NoGraphicsQueue));

    let state = probe.lock();
    assert!(state.calls.contains(&"enumerate_adapters"));
    assert!(!state.calls.contains(&"create_device"));
    assert_eq!(state.instances_destroyed, 1);
}

#[test]
fn test_validation_disabled_skips_debug_channel() {
    let backend = NullBackend::new(vec![graphics_adapter("stub", AdapterKind::DiscreteGpu)]);
    let probe = backend.probe();
    let desc = ContextDesc {
        validation: false,
        ..ContextDesc::default()
    };

    let context = GraphicsContext::new(backend, &desc).unwrap();
    drop(context);

    let state = probe.lock();
    assert_eq!(state.messengers_created, 0);
    assert_eq!(
        state.calls,
        [
            "create_instance",
            "enumerate_adapters",
            "create_device",
            "destroy_device",
            "destroy_instance",
        ]
    );
}

#[test]
fn test_adapter_policy_is_honored() {
    let backend = NullBackend::new(vec![
        graphics_adapter("igpu", AdapterKind::IntegratedGpu),
        graphics_adapter("dgpu", AdapterKind::DiscreteGpu),
    ]);
    let desc = ContextDesc {
        adapter_policy: policy::prefer_discrete,
        ..ContextDesc::default()
    };

    let context = GraphicsContext::new(backend, &desc).unwrap();
    assert_eq!(context.adapter_info().unwrap().name, "dgpu");
}

#[test]
fn test_default_policy_takes_first_adapter() {
    let backend = NullBackend::new(vec![
        graphics_adapter("first", AdapterKind::IntegratedGpu),
        graphics_adapter("second", AdapterKind::DiscreteGpu),
        graphics_adapter("third", AdapterKind::DiscreteGpu),
    ]);

    let context = GraphicsContext::new(backend, &ContextDesc::default()).unwrap();
    assert_eq!(context.adapter_info().unwrap().name, "first");
}

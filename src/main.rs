//! Helios - minimal Vulkan renderer bootstrap
//!
//! Main entry point: loads configuration, initializes logging, constructs
//! the graphics context, and exits non-zero on any fatal startup error.

use hl_core::config::{AdapterPreference, Config};
use hl_gfx::backend::VulkanBackend;
use hl_gfx::context::{ContextDesc, GraphicsContext};
use hl_gfx::policy;

fn main() {
    // Load config to get the log level before anything else
    let config = Config::load().unwrap_or_default();

    hl_core::logging::init(&config);

    tracing::info!("Starting helios");

    if let Err(err) = run(&config) {
        tracing::error!("Fatal startup error: {err:#}");
        std::process::exit(1);
    }
}

fn run(config: &Config) -> anyhow::Result<()> {
    let desc = ContextDesc {
        app_name: config.app.name.clone(),
        app_version: triple(config.app.version),
        api_version: triple(config.app.api_version),
        validation: config.gfx.validation,
        adapter_policy: match config.gfx.adapter {
            AdapterPreference::First => policy::first_adapter,
            AdapterPreference::Discrete => policy::prefer_discrete,
        },
        queue_policy: policy::first_graphics_family,
    };

    let backend = VulkanBackend::new()?;
    let mut context = GraphicsContext::new(backend, &desc)?;

    if let Some(info) = context.adapter_info() {
        tracing::info!("Using adapter {} ({:?})", info.name, info.kind);
    }
    if let Some(family) = context.graphics_family() {
        tracing::info!("Graphics queue family {family}");
    }

    // Downstream consumers (surface, swapchain, pipelines) would take the
    // device handle and queue family index from here.
    context.shutdown();
    Ok(())
}

fn triple(version: [u32; 3]) -> (u32, u32, u32) {
    (version[0], version[1], version[2])
}

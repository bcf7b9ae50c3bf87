//! Diagnostic message classification and reporting
//!
//! Driver messages are sorted into one of five tiers and emitted as a
//! single log line under the `vk` target. Classification checks the tiers
//! in a fixed priority order: info, warning, performance, error, debug.

use ash::vk;
use bitflags::bitflags;

bitflags! {
    /// Severities reported through the debug channel
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DebugSeverity: u32 {
        const INFO = 1 << 0;
        const WARNING = 1 << 1;
        const PERFORMANCE = 1 << 2;
        const ERROR = 1 << 3;
        const DEBUG = 1 << 4;
    }
}

/// Descriptor for the diagnostic callback: which severities to report.
/// Pure data; built before instance creation and attached to it so
/// creation-time messages are captured best-effort.
#[derive(Debug, Clone)]
pub struct DebugOptions {
    pub severities: DebugSeverity,
}

impl Default for DebugOptions {
    fn default() -> Self {
        Self {
            severities: DebugSeverity::all(),
        }
    }
}

/// Tier assigned to a single driver message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageTier {
    Info,
    Warning,
    Performance,
    Error,
    Debug,
}

impl MessageTier {
    /// Classify a message by its severity and type bits. First matching
    /// tier wins, checked as info, warning, performance, error, debug.
    /// Performance warnings arrive as WARNING severity with the
    /// PERFORMANCE type bit set.
    pub fn classify(
        severity: vk::DebugUtilsMessageSeverityFlagsEXT,
        kind: vk::DebugUtilsMessageTypeFlagsEXT,
    ) -> Self {
        if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
            Self::Info
        } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
            if kind.contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE) {
                Self::Performance
            } else {
                Self::Warning
            }
        } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
            Self::Error
        } else {
            Self::Debug
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Performance => "PERFORMANCE",
            Self::Error => "ERROR",
            Self::Debug => "DEBUG",
        }
    }
}

/// Emit one log line for a driver message
pub fn emit(tier: MessageTier, message: &str) {
    match tier {
        MessageTier::Info => tracing::info!(target: "vk", "{}: {}", tier.label(), message),
        MessageTier::Warning => tracing::warn!(target: "vk", "{}: {}", tier.label(), message),
        MessageTier::Performance => tracing::warn!(target: "vk", "{}: {}", tier.label(), message),
        MessageTier::Error => tracing::error!(target: "vk", "{}: {}", tier.label(), message),
        MessageTier::Debug => tracing::debug!(target: "vk", "{}: {}", tier.label(), message),
    }
}

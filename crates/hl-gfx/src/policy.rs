//! Selection policies for adapters and queue families
//!
//! Named functions rather than inline choices, so an alternate policy can
//! be substituted without touching the construction protocol.

use crate::backend::{AdapterInfo, AdapterKind, QueueCaps, QueueFamilyInfo};

/// Chooses an index into the enumerated adapter list
pub type AdapterPolicy = fn(&[AdapterInfo]) -> Option<usize>;

/// Chooses a queue family index for graphics work
pub type QueueFamilyPolicy = fn(&[QueueFamilyInfo]) -> Option<u32>;

/// Take the first enumerated adapter. A known simplification: no scoring,
/// no preference for discrete over integrated parts.
pub fn first_adapter(adapters: &[AdapterInfo]) -> Option<usize> {
    if adapters.is_empty() {
        None
    } else {
        Some(0)
    }
}

/// Prefer the first discrete GPU, falling back to the first adapter
pub fn prefer_discrete(adapters: &[AdapterInfo]) -> Option<usize> {
    adapters
        .iter()
        .position(|adapter| adapter.kind == AdapterKind::DiscreteGpu)
        .or_else(|| first_adapter(adapters))
}

/// Lowest-indexed family whose capabilities include graphics
pub fn first_graphics_family(families: &[QueueFamilyInfo]) -> Option<u32> {
    families
        .iter()
        .position(|family| family.caps.contains(QueueCaps::GRAPHICS))
        .map(|index| index as u32)
}

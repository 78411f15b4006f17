//! Value-producing nodes of the attribute graph.
//!
//! ```text
//! ConstantElement ─┐
//! SimpleElement ───┼──▶ ComposableAttribute ──▶ (element of another attribute)
//! Relationship ────┘         │
//!      ▲                     │ change notification
//!      └─────────────────────┘
//! ```
//!
//! Every element carries the [`AggregateType`] that decides which phase of the
//! aggregation formula it joins. Values are pushed: a mutation recomputes
//! immediately and then notifies, so reading `value()` never recomputes.

pub mod composable;
pub mod constant;
pub mod notify;
pub mod relationship;

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

pub use composable::ComposableAttribute;
pub use constant::{ConstantElement, SimpleElement};
pub use notify::{ChangeCallback, ChangeNotifier, Subscription};
pub use relationship::{InputOperator, RelationshipElement, ResolvedOperand};

/// Aggregation phase an element participates in.
///
/// `value = (Σ AddRaw) × (Π Multiplicate, or 1) + (Σ AddFinal)`
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AggregateType {
    /// Summed first (base values, flat item bonuses).
    #[default]
    AddRaw,
    /// Multiplies the raw total (set bonuses, percentage buffs).
    Multiplicate,
    /// Added after scaling (rare item options).
    AddFinal,
}

impl AggregateType {
    /// Neutral value of this phase: 1 for `Multiplicate`, 0 otherwise.
    pub const fn identity(self) -> f32 {
        match self {
            Self::Multiplicate => 1.0,
            Self::AddRaw | Self::AddFinal => 0.0,
        }
    }
}

/// A value-producing, change-notifying node.
pub trait Element: Send + Sync {
    /// Last computed value. Never triggers recomputation.
    fn value(&self) -> f32;

    fn aggregate_type(&self) -> AggregateType;

    /// Registers a callback invoked after the value changed.
    ///
    /// The callback stays registered until the returned handle is dropped.
    fn subscribe(&self, callback: ChangeCallback) -> Subscription;
}

/// Identity comparison for shared elements (multiset membership).
pub fn same_element(a: &Arc<dyn Element>, b: &Arc<dyn Element>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// `f32` cell readable without locking.
#[derive(Debug)]
pub(crate) struct AtomicValue(AtomicU32);

impl AtomicValue {
    pub(crate) fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    pub(crate) fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Acquire))
    }

    /// Stores `value` and returns the previous one.
    pub(crate) fn swap(&self, value: f32) -> f32 {
        f32::from_bits(self.0.swap(value.to_bits(), Ordering::AcqRel))
    }
}

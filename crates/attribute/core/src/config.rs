/// Engine configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Cadence (milliseconds) the external scheduler uses for interval regeneration.
    pub regeneration_interval_ms: u64,
    /// Lightweight holders treat a current value below this magnitude as zero
    /// when seeding a dynamic override.
    pub seed_epsilon: f32,
}

impl EngineConfig {
    // ===== compile-time constants =====
    /// Minimum difference between two aggregates for a change to be propagated.
    pub const VALUE_EPSILON: f32 = f32::EPSILON;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_REGENERATION_INTERVAL_MS: u64 = 3000;
    pub const DEFAULT_SEED_EPSILON: f32 = 1e-4;

    pub fn new() -> Self {
        Self {
            regeneration_interval_ms: Self::DEFAULT_REGENERATION_INTERVAL_MS,
            seed_epsilon: Self::DEFAULT_SEED_EPSILON,
        }
    }

    pub fn with_seed_epsilon(mut self, seed_epsilon: f32) -> Self {
        self.seed_epsilon = seed_epsilon;
        self
    }

    pub fn with_regeneration_interval_ms(mut self, interval_ms: u64) -> Self {
        self.regeneration_interval_ms = interval_ms;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

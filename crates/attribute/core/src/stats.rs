//! Built-in attribute definitions the engine refers to directly.
//!
//! The full attribute space is open-ended and comes from content; these are
//! the few definitions that engine code (computed accessors, regeneration,
//! safe-zone toggling) needs to name. Each lives for the whole process.

use std::sync::{Arc, LazyLock};

use crate::definition::{AttributeDefinition, AttributeId};

macro_rules! builtin_stats {
    ($(
        $(#[$meta:meta])*
        $name:ident => ($id:literal, $designation:literal $(, min = $min:expr)? $(, max = $max:expr)?)
    ),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $name() -> &'static Arc<AttributeDefinition> {
                static DEFINITION: LazyLock<Arc<AttributeDefinition>> = LazyLock::new(|| {
                    let definition = AttributeDefinition::new(AttributeId($id), $designation);
                    $(let definition = definition.with_minimum($min);)?
                    $(let definition = definition.with_maximum($max);)?
                    Arc::new(definition)
                });
                &DEFINITION
            }
        )*

        /// Every built-in definition, in id order.
        pub fn all() -> Vec<Arc<AttributeDefinition>> {
            vec![$($name().clone()),*]
        }
    };
}

builtin_stats! {
    level => (1, "Level", min = 1.0),
    strength => (2, "Strength"),
    agility => (3, "Agility"),
    vitality => (4, "Vitality"),
    energy => (5, "Energy"),

    maximum_health => (10, "Maximum Health"),
    /// Live health; lightweight holders map this to instance state.
    current_health => (11, "Current Health", min = 0.0),
    maximum_mana => (12, "Maximum Mana"),
    current_mana => (13, "Current Mana", min = 0.0),
    maximum_shield => (14, "Maximum Shield"),
    current_shield => (15, "Current Shield", min = 0.0),
    maximum_ability => (16, "Maximum Ability"),
    current_ability => (17, "Current Ability", min = 0.0),

    health_recovery_multiplier => (20, "Health Recovery Multiplier"),
    health_recovery_absolute => (21, "Health Recovery Absolute"),
    mana_recovery_multiplier => (22, "Mana Recovery Multiplier"),
    mana_recovery_absolute => (23, "Mana Recovery Absolute"),
    shield_recovery_multiplier => (24, "Shield Recovery Multiplier"),
    shield_recovery_absolute => (25, "Shield Recovery Absolute"),
    ability_recovery_multiplier => (26, "Ability Recovery Multiplier"),
    ability_recovery_absolute => (27, "Ability Recovery Absolute"),

    health_after_monster_kill_multiplier => (30, "Health After Monster Kill Multiplier"),
    health_after_monster_kill_absolute => (31, "Health After Monster Kill"),
    mana_after_monster_kill_multiplier => (32, "Mana After Monster Kill Multiplier"),
    mana_after_monster_kill_absolute => (33, "Mana After Monster Kill"),

    defense_base => (40, "Base Defense"),
    attack_speed => (41, "Attack Speed"),
    /// Synthetic flag forced by the safe-zone plugin (0 or 1).
    is_in_safe_zone => (42, "Is In Safe Zone", min = 0.0, max = 1.0),
}

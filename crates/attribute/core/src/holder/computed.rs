//! Attributes backed by live instance state instead of the base table.

use std::sync::Arc;

use crate::definition::AttributeDefinition;

/// Maps one attribute to getter/setter functions on instance state `S`.
pub struct ComputedAccessor<S> {
    pub attribute: fn() -> &'static Arc<AttributeDefinition>,
    pub get: fn(&S) -> f32,
    pub set: Option<fn(&S, f32)>,
}

pub(crate) fn find<'a, S: 'static>(
    accessors: &'a [ComputedAccessor<S>],
    attribute: &AttributeDefinition,
) -> Option<&'a ComputedAccessor<S>> {
    accessors
        .iter()
        .find(|accessor| (accessor.attribute)().as_ref() == attribute)
}

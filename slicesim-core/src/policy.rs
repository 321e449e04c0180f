//! Slice policy table
//!
//! Maps a slice category to its QoS treatment. The table is populated
//! during the configure phase; the bearer activation engine looks policies
//! up when binding filters, and must never activate a bearer for a slice
//! with no declared policy.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use slicesim_common::{QosClass, SliceCategory};

/// Errors raised by the slice policy table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// A policy for this slice already exists.
    #[error("Duplicate policy: slice {0} already has a QoS policy")]
    DuplicatePolicy(SliceCategory),

    /// No policy declared for this slice.
    #[error("Undefined policy: slice {0} has no QoS policy")]
    UndefinedPolicy(SliceCategory),
}

/// QoS treatment for one slice category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlicePolicy {
    /// Slice the policy applies to
    pub slice: SliceCategory,
    /// QoS class bearers of this slice are bound to
    pub qos: QosClass,
}

/// Table of per-slice QoS policies, keyed by category.
#[derive(Debug, Default)]
pub struct SlicePolicyTable {
    policies: HashMap<SliceCategory, SlicePolicy>,
}

impl SlicePolicyTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the QoS policy for a slice.
    ///
    /// Fails with [`PolicyError::DuplicatePolicy`] if the slice already has
    /// one; exactly one policy per category is an invariant.
    pub fn define(&mut self, slice: SliceCategory, qos: QosClass) -> Result<(), PolicyError> {
        if self.policies.contains_key(&slice) {
            return Err(PolicyError::DuplicatePolicy(slice));
        }
        self.policies.insert(slice, SlicePolicy { slice, qos });
        debug!(%slice, %qos, five_qi = qos.five_qi(), "defined slice policy");
        Ok(())
    }

    /// Looks up the policy for a slice.
    pub fn lookup(&self, slice: SliceCategory) -> Result<&SlicePolicy, PolicyError> {
        self.policies
            .get(&slice)
            .ok_or(PolicyError::UndefinedPolicy(slice))
    }

    /// Number of declared policies.
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Returns true if no policy is declared.
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

//! Conditional strategy.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tracing::trace;

use crate::error::Result;

use super::{ConnectContext, Connection, Strategy};

// ============================================================================
// Condition
// ============================================================================

/// Test evaluated when an [`IfStrategy`] connects.
#[derive(Debug, Clone)]
pub enum Condition {
    /// `true` if the strategy is supported in the connect context.
    IsSupported(Arc<Strategy>),
    /// Fixed outcome.
    Constant(bool),
}

impl Condition {
    /// Evaluates the condition.
    #[must_use]
    pub fn evaluate(&self, ctx: &ConnectContext) -> bool {
        match self {
            Self::IsSupported(strategy) => strategy.is_supported(ctx),
            Self::Constant(value) => *value,
        }
    }
}

impl From<bool> for Condition {
    fn from(value: bool) -> Self {
        Self::Constant(value)
    }
}

// ============================================================================
// IfStrategy
// ============================================================================

/// Picks one of two branches at connect time.
#[derive(Debug)]
pub struct IfStrategy {
    condition: Condition,
    on_true: Arc<Strategy>,
    on_false: Arc<Strategy>,
}

impl IfStrategy {
    /// Creates a branch node.
    #[inline]
    #[must_use]
    pub fn new(condition: Condition, on_true: Arc<Strategy>, on_false: Arc<Strategy>) -> Self {
        Self {
            condition,
            on_true,
            on_false,
        }
    }

    #[inline]
    #[must_use]
    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    #[inline]
    #[must_use]
    pub fn on_true(&self) -> &Arc<Strategy> {
        &self.on_true
    }

    #[inline]
    #[must_use]
    pub fn on_false(&self) -> &Arc<Strategy> {
        &self.on_false
    }

    fn branch(&self, ctx: &ConnectContext) -> &Arc<Strategy> {
        if self.condition.evaluate(ctx) {
            &self.on_true
        } else {
            &self.on_false
        }
    }

    #[inline]
    pub(crate) fn is_supported(&self, ctx: &ConnectContext) -> bool {
        self.branch(ctx).is_supported(ctx)
    }

    /// Connects the branch chosen by the condition. The other is never started.
    pub async fn connect(&self, ctx: &ConnectContext) -> Result<Connection> {
        let branch = self.branch(ctx);
        trace!(branch = branch.kind_name(), "Condition evaluated");
        branch.connect(ctx).await
    }
}

// ============================================================================
// Tests
// ============================================================================

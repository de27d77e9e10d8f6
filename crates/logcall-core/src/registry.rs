//! Registration-time memoization of instrumented operations
//!
//! Specs are created once per operation and shared afterwards. The registry
//! guarantees a single spec per `Owner.operation` even when several threads
//! race to register the same operation.

use crate::context::CallSite;
use crate::spec::InstrumentationSpec;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

/// Identity of an instrumented operation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationKey {
    owner: String,
    operation: String,
}

impl OperationKey {
    pub fn new(owner: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            operation: operation.into(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner, self.operation)
    }
}

/// An operation together with its immutable spec
#[derive(Debug)]
pub struct InstrumentedOperation {
    key: OperationKey,
    spec: InstrumentationSpec,
}

impl InstrumentedOperation {
    pub fn key(&self) -> &OperationKey {
        &self.key
    }

    pub fn spec(&self) -> &InstrumentationSpec {
        &self.spec
    }

    /// Call site for this operation, ready for arguments
    pub fn site(&self) -> CallSite<'_> {
        CallSite::new(self.key.owner(), self.key.operation())
    }
}

/// Concurrent get-or-create map of instrumented operations
#[derive(Debug, Default)]
pub struct OperationRegistry {
    operations: DashMap<OperationKey, Arc<InstrumentedOperation>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the registered operation, creating it with `make_spec` if absent
    ///
    /// `make_spec` runs at most once per key; every caller receives the same
    /// shared operation.
    pub fn get_or_register<F>(
        &self,
        owner: &str,
        operation: &str,
        make_spec: F,
    ) -> Arc<InstrumentedOperation>
    where
        F: FnOnce() -> InstrumentationSpec,
    {
        let key = OperationKey::new(owner, operation);
        if let Some(existing) = self.operations.get(&key) {
            return Arc::clone(existing.value());
        }
        let entry = self.operations.entry(key.clone()).or_insert_with(|| {
            tracing::debug!(operation = %key, "registering instrumented operation");
            Arc::new(InstrumentedOperation {
                key,
                spec: make_spec(),
            })
        });
        Arc::clone(entry.value())
    }

    /// Register `spec` unless the operation already exists
    pub fn register(
        &self,
        owner: &str,
        operation: &str,
        spec: InstrumentationSpec,
    ) -> Arc<InstrumentedOperation> {
        self.get_or_register(owner, operation, || spec)
    }

    /// Register every `(key, spec)` pair, keeping existing registrations
    ///
    /// Returns how many operations were newly added.
    pub fn register_all<I>(&self, specs: I) -> usize
    where
        I: IntoIterator<Item = (OperationKey, InstrumentationSpec)>,
    {
        let mut added = 0;
        for (key, spec) in specs {
            if self.operations.contains_key(&key) {
                continue;
            }
            self.get_or_register(key.owner(), key.operation(), || {
                added += 1;
                spec
            });
        }
        added
    }

    pub fn get(&self, owner: &str, operation: &str) -> Option<Arc<InstrumentedOperation>> {
        self.operations
            .get(&OperationKey::new(owner, operation))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Registered keys in sorted order
    pub fn keys(&self) -> Vec<OperationKey> {
        let mut keys: Vec<_> = self.operations.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

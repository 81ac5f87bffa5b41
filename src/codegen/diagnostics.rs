//! Process-wide registry of generated sources for in-flight invocations
//!
//! While a compiled routine runs, its rendered source is registered here
//! under an identifier unique to that invocation, so a failure anywhere in
//! the process can be attributed to a specific generated program. Ids are
//! per-invocation (not per-routine), so concurrent failing invocations of
//! the same routine never clobber each other's registration. Deregistration
//! is guaranteed on every exit path by the guard's `Drop`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::Mutex;

lazy_static! {
    static ref REGISTRY: Mutex<HashMap<u64, RegisteredSource>> = Mutex::new(HashMap::new());
}

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// A registered generated source
#[derive(Debug, Clone)]
pub struct RegisteredSource {
    /// Routine name the source belongs to
    pub name: String,
    /// Full rendered program text
    pub source: Arc<str>,
}

/// RAII registration of one invocation's source
#[derive(Debug)]
pub struct SourceRegistration {
    id: u64,
}

impl SourceRegistration {
    /// Register `source` under a fresh invocation id
    pub fn register(name: &str, source: Arc<str>) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        REGISTRY.lock().insert(
            id,
            RegisteredSource {
                name: name.to_string(),
                source,
            },
        );
        SourceRegistration { id }
    }

    /// This invocation's id
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for SourceRegistration {
    fn drop(&mut self) {
        REGISTRY.lock().remove(&self.id);
    }
}

/// Look up a registered source by invocation id
pub fn lookup(id: u64) -> Option<RegisteredSource> {
    REGISTRY.lock().get(&id).cloned()
}

/// Number of invocations currently registered
pub fn active_registrations() -> usize {
    REGISTRY.lock().len()
}

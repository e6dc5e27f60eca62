//! Who is making the current changes
//!
//! The host sets an `AuditContext` at the start of a unit of work (an HTTP
//! request, a CLI command) and every entry written while it is active is
//! attributed to that actor. The context is per thread and restored when
//! the guard returned by [`enter`] is dropped, so scopes nest.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

/// Actor and origin of the current unit of work
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditContext {
    pub actor: Option<String>,
    pub remote_addr: Option<String>,
}

impl AuditContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn with_remote_addr(mut self, remote_addr: impl Into<String>) -> Self {
        self.remote_addr = Some(remote_addr.into());
        self
    }
}

thread_local! {
    static CURRENT: RefCell<Option<AuditContext>> = const { RefCell::new(None) };
}

/// Restores the previous context when dropped
#[must_use = "the context is cleared as soon as the guard is dropped"]
pub struct ContextGuard {
    previous: Option<AuditContext>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT.with(|current| *current.borrow_mut() = previous);
    }
}

/// Make `context` the current context for this thread
pub fn enter(context: AuditContext) -> ContextGuard {
    let previous = CURRENT.with(|current| current.borrow_mut().replace(context));
    ContextGuard { previous }
}

/// The context active on this thread, if any
pub fn current() -> Option<AuditContext> {
    CURRENT.with(|current| current.borrow().clone())
}

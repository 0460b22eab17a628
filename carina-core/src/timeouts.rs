//! Timeouts - Per-operation deadlines and the provider stop signal
//!
//! Every lifecycle operation runs inside an [`OperationContext`] that owns a
//! deadline and a child of the provider's stop token. Dropping the context
//! cancels the child token, so the scope is released on every exit path.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::provider::{ProviderError, ProviderResult};

/// Default timeout when a resource type does not declare its own
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20 * 60);

/// Lifecycle operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        write!(f, "{}", s)
    }
}

/// Timeouts for each lifecycle operation of a resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceTimeouts {
    pub create: Duration,
    pub read: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for ResourceTimeouts {
    fn default() -> Self {
        Self {
            create: DEFAULT_TIMEOUT,
            read: DEFAULT_TIMEOUT,
            update: DEFAULT_TIMEOUT,
            delete: DEFAULT_TIMEOUT,
        }
    }
}

impl ResourceTimeouts {
    pub fn get(&self, operation: Operation) -> Duration {
        match operation {
            Operation::Create => self.create,
            Operation::Read => self.read,
            Operation::Update => self.update,
            Operation::Delete => self.delete,
        }
    }

    pub fn with_create(mut self, timeout: Duration) -> Self {
        self.create = timeout;
        self
    }

    pub fn with_read(mut self, timeout: Duration) -> Self {
        self.read = timeout;
        self
    }

    pub fn with_update(mut self, timeout: Duration) -> Self {
        self.update = timeout;
        self
    }

    pub fn with_delete(mut self, timeout: Duration) -> Self {
        self.delete = timeout;
        self
    }
}

/// Scoped deadline and cancellation for a single lifecycle operation
#[derive(Debug)]
pub struct OperationContext {
    operation: Operation,
    timeout: Duration,
    deadline: Instant,
    token: CancellationToken,
}

impl OperationContext {
    /// Start a new operation scope derived from the provider's stop token
    pub fn new(operation: Operation, timeout: Duration, stop: &CancellationToken) -> Self {
        Self {
            operation,
            timeout,
            deadline: Instant::now() + timeout,
            token: stop.child_token(),
        }
    }

    /// Run a future under this scope's deadline and cancellation
    pub async fn run<T, F>(&self, future: F) -> ProviderResult<T>
    where
        F: Future<Output = ProviderResult<T>>,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(ProviderError::cancelled(self.operation)),
            result = tokio::time::timeout_at(self.deadline, future) => match result {
                Ok(result) => result,
                Err(_) => Err(ProviderError::timeout(self.operation, self.timeout)),
            },
        }
    }
}

impl Drop for OperationContext {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

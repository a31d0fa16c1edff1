//! Cancellation scopes tying async calls to the lifetime of a view.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::{RuneError, RuneResult};

/// Owned by whatever displays a reading; cancel it when the view goes away.
///
/// Dropping the scope cancels it too.
#[derive(Debug, Default)]
pub struct ReadingScope {
    token: CancellationToken,
}

impl ReadingScope {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Handle sharing this scope's cancellation, for spawned work
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Run `fut` unless the scope is cancelled first.
    pub async fn run<F, T>(&self, fut: F) -> RuneResult<T>
    where
        F: Future<Output = RuneResult<T>>,
    {
        if self.token.is_cancelled() {
            return Err(RuneError::Cancelled);
        }
        tokio::select! {
            _ = self.token.cancelled() => Err(RuneError::Cancelled),
            result = fut => result,
        }
    }
}

impl Drop for ReadingScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

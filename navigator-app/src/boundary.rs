use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Mutex;

use futures_util::FutureExt;
use serde::Serialize;
use tracing::error;

/// Replacement page shown after a render panicked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecoveryPage {
    pub title: &'static str,
    pub message: String,
    pub actions: [&'static str; 2],
}

impl RecoveryPage {
    fn new(message: String) -> Self {
        Self { title: "Something went wrong", message, actions: ["Try Again", "Go Home"] }
    }
}

/// Catches panics raised while rendering. Once tripped it keeps showing the
/// recovery page until `reset` is called. Async callbacks are not covered:
/// a panicking spawned task only takes its own task down.
#[derive(Default)]
pub struct ErrorBoundary {
    failure: Mutex<Option<String>>,
}

impl ErrorBoundary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tripped(&self) -> bool {
        self.failure.lock().map(|failure| failure.is_some()).unwrap_or(true)
    }

    pub async fn render<T, F, Fut>(&self, render: F) -> Result<T, RecoveryPage>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if let Some(message) = self.failure() {
            return Err(RecoveryPage::new(message));
        }

        match AssertUnwindSafe(render()).catch_unwind().await {
            Ok(rendered) => Ok(rendered),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("Render panicked: {}", message);
                if let Ok(mut failure) = self.failure.lock() {
                    *failure = Some(message.clone());
                }
                Err(RecoveryPage::new(message))
            }
        }
    }

    /// Forget the failure so the next render runs the real tree again.
    pub fn reset(&self) {
        match self.failure.lock() {
            Ok(mut failure) => *failure = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }

    fn failure(&self) -> Option<String> {
        match self.failure.lock() {
            Ok(failure) => failure.clone(),
            Err(_) => Some("Render state is unavailable".to_string()),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Unknown error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_panic_shows_recovery_until_reset() {
        let boundary = ErrorBoundary::new();
        let flag = AtomicBool::new(true);
        let broken = &flag;

        let render = move || async move {
            if broken.load(Ordering::SeqCst) {
                panic!("lounge list exploded");
            }
            "tree"
        };

        let page = boundary.render(render).await.unwrap_err();
        assert_eq!(page.message, "lounge list exploded");
        assert!(boundary.is_tripped());

        // Still tripped even though the cause is gone.
        broken.store(false, Ordering::SeqCst);
        assert!(boundary.render(render).await.is_err());

        boundary.reset();
        assert_eq!(boundary.render(render).await, Ok("tree"));
    }

    #[tokio::test]
    async fn test_formatted_panic_message() {
        let boundary = ErrorBoundary::new();
        let page = boundary
            .render(|| async {
                let code = "JFK";
                panic!("no airport {}", code);
            })
            .await
            .unwrap_err();
        assert_eq!(page.message, "no airport JFK");
    }
}

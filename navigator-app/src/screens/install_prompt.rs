use serde::Serialize;
use tracing::info;

use super::ScreenState;
use crate::state::AppContext;

#[derive(Debug, Clone, Default)]
struct PromptState {
    dismissed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallBanner {
    pub message: &'static str,
}

/// "Install the app" banner.
#[derive(Clone)]
pub struct InstallPrompt {
    ctx: AppContext,
    state: ScreenState<PromptState>,
}

impl InstallPrompt {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx, state: ScreenState::new(PromptState::default()) }
    }

    pub async fn is_visible(&self) -> bool {
        let install = &self.ctx.install;
        !install.is_standalone() && install.can_install() && !self.state.read(|s| s.dismissed).await
    }

    /// Shows the host dialog. The banner goes away when the user accepts.
    pub async fn accept(&self) -> bool {
        if !self.is_visible().await {
            return false;
        }
        let accepted = self.ctx.install.prompt_install().await;
        info!("Install prompt {}", if accepted { "accepted" } else { "declined" });
        if accepted {
            self.state.update(|s| s.dismissed = true).await;
        }
        accepted
    }

    pub async fn dismiss(&self) {
        self.state.update(|s| s.dismissed = true).await;
    }

    pub async fn render(&self) -> Option<InstallBanner> {
        self.is_visible()
            .await
            .then_some(InstallBanner { message: "Install Airport Navigator for quick access" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use navigator_core::platform::{Headless, InstallCapability};
    use navigator_core::MockAuthProvider;
    use navigator_store::InMemoryGateway;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct Installable {
        accept: bool,
        prompted: AtomicBool,
    }

    #[async_trait]
    impl InstallCapability for Installable {
        async fn register(&self) -> bool {
            true
        }

        fn is_standalone(&self) -> bool {
            false
        }

        fn can_install(&self) -> bool {
            true
        }

        async fn prompt_install(&self) -> bool {
            self.prompted.store(true, Ordering::SeqCst);
            self.accept
        }
    }

    fn prompt(accept: bool) -> (Arc<Installable>, InstallPrompt) {
        let install = Arc::new(Installable { accept, prompted: AtomicBool::new(false) });
        let ctx = AppContext::new(Arc::new(InMemoryGateway::new()), Arc::new(MockAuthProvider::new("s")))
            .with_platform(install.clone(), Arc::new(Headless));
        (install, InstallPrompt::new(ctx))
    }

    #[tokio::test]
    async fn test_accept_hides_banner() {
        let (install, prompt) = prompt(true);
        assert!(prompt.render().await.is_some());
        assert!(prompt.accept().await);
        assert!(install.prompted.load(Ordering::SeqCst));
        assert!(prompt.render().await.is_none());
    }

    #[tokio::test]
    async fn test_declined_keeps_banner_until_dismissed() {
        let (_, prompt) = prompt(false);
        assert!(!prompt.accept().await);
        assert!(prompt.render().await.is_some());
        prompt.dismiss().await;
        assert!(prompt.render().await.is_none());
    }

    #[tokio::test]
    async fn test_hidden_on_headless_host() {
        let ctx = AppContext::new(Arc::new(InMemoryGateway::new()), Arc::new(MockAuthProvider::new("s")));
        assert!(InstallPrompt::new(ctx).render().await.is_none());
    }
}

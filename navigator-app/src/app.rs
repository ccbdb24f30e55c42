use navigator_shared::Identity;
use serde::Serialize;
use tracing::info;

use crate::boundary::{ErrorBoundary, RecoveryPage};
use crate::error::{AppError, AppResult};
use crate::router::{MenuItem, Nav, Router, View};
use crate::screens::airport_search::AirportSearchView;
use crate::screens::dashboard::DashboardView;
use crate::screens::flight_tracker::TrackerView;
use crate::screens::install_prompt::InstallBanner;
use crate::screens::password_reset::PasswordResetView;
use crate::screens::pricing::PricingView;
use crate::screens::sign_in::SignInView;
use crate::screens::sign_up::SignUpView;
use crate::screens::{
    AirportSearch, Dashboard, FlightTracker, InstallPrompt, PasswordReset, Pricing, SignIn, SignUp,
};
use crate::state::AppContext;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeView {
    pub headline: &'static str,
    pub features: [&'static str; 4],
    pub signed_in: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Body {
    Home(HomeView),
    Find(AirportSearchView),
    SignIn(SignInView),
    Create(SignUpView),
    Pricing(PricingView),
    Tracker(TrackerView),
    Dashboard(DashboardView),
    Reset(PasswordResetView),
    Recovery(RecoveryPage),
}

/// Everything on screen after one render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub view: View,
    pub title: &'static str,
    pub menu: Vec<MenuItem>,
    pub user: Option<String>,
    pub install: Option<InstallBanner>,
    pub body: Body,
}

/// The controller behind the current view.
pub enum Mounted {
    Home,
    Find(AirportSearch),
    SignIn(SignIn),
    Create(SignUp),
    Pricing(Pricing),
    Tracker(FlightTracker),
    Dashboard(Dashboard),
    Reset(PasswordReset),
}

impl Mounted {
    fn mount(view: View, ctx: &AppContext) -> Self {
        let ctx = ctx.clone();
        match view {
            View::Home => Mounted::Home,
            View::Find => Mounted::Find(AirportSearch::new(ctx)),
            View::SignIn => Mounted::SignIn(SignIn::new(ctx)),
            View::Create => Mounted::Create(SignUp::new(ctx)),
            View::Pricing => Mounted::Pricing(Pricing::new(ctx)),
            View::Tracker => Mounted::Tracker(FlightTracker::new(ctx)),
            View::Dashboard => Mounted::Dashboard(Dashboard::new(ctx)),
            View::Reset => Mounted::Reset(PasswordReset::new(ctx)),
        }
    }

    async fn activate(&self) {
        match self {
            Mounted::Find(screen) => screen.activate().await,
            Mounted::Pricing(screen) => screen.activate().await,
            Mounted::Tracker(screen) => screen.activate().await,
            Mounted::Dashboard(screen) => screen.activate().await,
            Mounted::Home | Mounted::SignIn(_) | Mounted::Create(_) | Mounted::Reset(_) => {}
        }
    }

    fn unmount(&self) {
        match self {
            Mounted::Home => {}
            Mounted::Find(screen) => screen.unmount(),
            Mounted::SignIn(screen) => screen.unmount(),
            Mounted::Create(screen) => screen.unmount(),
            Mounted::Pricing(screen) => screen.unmount(),
            Mounted::Tracker(screen) => screen.unmount(),
            Mounted::Dashboard(screen) => screen.unmount(),
            Mounted::Reset(screen) => screen.unmount(),
        }
    }

    async fn render(&self, signed_in: bool) -> Body {
        match self {
            Mounted::Home => Body::Home(HomeView {
                headline: "Navigate Airports with Confidence",
                features: [
                    "Find airports, terminals and gates",
                    "Explore interactive airport maps",
                    "Discover lounges near your gate",
                    "Track flights in real time",
                ],
                signed_in,
            }),
            Mounted::Find(screen) => Body::Find(screen.render().await),
            Mounted::SignIn(screen) => Body::SignIn(screen.render().await),
            Mounted::Create(screen) => Body::Create(screen.render().await),
            Mounted::Pricing(screen) => Body::Pricing(screen.render().await),
            Mounted::Tracker(screen) => Body::Tracker(screen.render().await),
            Mounted::Dashboard(screen) => Body::Dashboard(screen.render().await),
            Mounted::Reset(screen) => Body::Reset(screen.render().await),
        }
    }
}

/// Router, mounted screen and error boundary glued together.
pub struct App {
    ctx: AppContext,
    router: Router,
    screen: Mounted,
    boundary: ErrorBoundary,
    install: InstallPrompt,
}

impl App {
    pub async fn start(ctx: AppContext) -> Self {
        if ctx.install.register().await {
            info!("Offline worker registered");
        }
        let install = InstallPrompt::new(ctx.clone());
        Self {
            ctx,
            router: Router::new(),
            screen: Mounted::Home,
            boundary: ErrorBoundary::new(),
            install,
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn view(&self) -> View {
        self.router.current()
    }

    pub fn screen(&self) -> &Mounted {
        &self.screen
    }

    pub fn install_prompt(&self) -> &InstallPrompt {
        &self.install
    }

    /// Unmounts the current screen, then mounts and activates the next one.
    pub async fn navigate(&mut self, nav: Nav) -> View {
        let next = self.router.dispatch(nav);
        self.screen.unmount();
        self.screen = Mounted::mount(next, &self.ctx);
        self.screen.activate().await;
        next
    }

    /// Submit the sign-in form; success moves to the dashboard.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> AppResult<Identity> {
        let Mounted::SignIn(screen) = &self.screen else {
            return Err(AppError::unavailable("Open the sign-in page first"));
        };
        let identity = screen.submit(email, password).await?;
        self.navigate(Nav::SignedIn).await;
        Ok(identity)
    }

    /// Always ends on the home view, even when the remote logout failed.
    pub async fn sign_out(&mut self) -> AppResult<()> {
        let result = self.ctx.session.sign_out().await;
        self.navigate(Nav::SignedOut).await;
        result.map_err(Into::into)
    }

    pub async fn render(&self) -> Page {
        let signed_in = self.ctx.session.is_signed_in();
        let body = match self.boundary.render(|| self.screen.render(signed_in)).await {
            Ok(body) => body,
            Err(recovery) => Body::Recovery(recovery),
        };
        let view = self.router.current();

        Page {
            view,
            title: view.title(),
            menu: self.router.menu(signed_in),
            user: self
                .ctx
                .session
                .identity()
                .map(|identity| identity.display_name.unwrap_or(identity.email)),
            install: self.install.render().await,
            body,
        }
    }

    /// "Try Again": clear the failure and render the same tree.
    pub async fn retry(&self) -> Page {
        self.boundary.reset();
        self.render().await
    }

    /// "Go Home": clear the failure and navigate home.
    pub async fn go_home(&mut self) -> Page {
        self.boundary.reset();
        self.navigate(Nav::Home).await;
        self.render().await
    }

    pub fn boundary(&self) -> &ErrorBoundary {
        &self.boundary
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.screen.unmount();
    }
}

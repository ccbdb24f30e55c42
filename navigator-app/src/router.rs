use std::str::FromStr;

use serde::Serialize;

/// The single screen on display. There is no history: every navigation
/// replaces the current view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Home,
    Find,
    SignIn,
    Create,
    Pricing,
    Tracker,
    Dashboard,
    Reset,
}

/// User actions that change the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Home,
    FindAirports,
    TrackFlights,
    OpenDashboard,
    OpenPricing,
    SignIn,
    CreateAccount,
    ForgotPassword,
    BackToSignIn,
    SignedIn,
    SignedOut,
    /// Direct jump, as from the menu.
    To(View),
}

impl View {
    pub fn navigate(self, nav: Nav) -> View {
        match nav {
            Nav::Home | Nav::SignedOut => View::Home,
            Nav::FindAirports => View::Find,
            Nav::TrackFlights => View::Tracker,
            Nav::OpenDashboard | Nav::SignedIn => View::Dashboard,
            Nav::OpenPricing => View::Pricing,
            Nav::SignIn | Nav::BackToSignIn => View::SignIn,
            Nav::CreateAccount => View::Create,
            Nav::ForgotPassword => View::Reset,
            Nav::To(view) => view,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Find => "Find Airports",
            View::SignIn => "Sign In",
            View::Create => "Create Account",
            View::Pricing => "Pricing",
            View::Tracker => "Track Flights",
            View::Dashboard => "Dashboard",
            View::Reset => "Reset Password",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown view '{0}'")]
pub struct UnknownView(String);

impl FromStr for View {
    type Err = UnknownView;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "home" => Ok(View::Home),
            "find" | "airports" => Ok(View::Find),
            "signin" | "sign-in" => Ok(View::SignIn),
            "create" | "signup" | "sign-up" => Ok(View::Create),
            "pricing" => Ok(View::Pricing),
            "tracker" | "flights" => Ok(View::Tracker),
            "dashboard" => Ok(View::Dashboard),
            "reset" => Ok(View::Reset),
            other => Err(UnknownView(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub label: &'static str,
    pub view: View,
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Router {
    current: View,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> View {
        self.current
    }

    pub fn dispatch(&mut self, nav: Nav) -> View {
        let next = self.current.navigate(nav);
        if next != self.current {
            tracing::debug!("View {:?} -> {:?}", self.current, next);
        }
        self.current = next;
        next
    }

    /// Header entries. Dashboard is only listed for a signed-in user; the
    /// account entry flips between sign in and sign out.
    pub fn menu(&self, signed_in: bool) -> Vec<MenuItem> {
        let mut views = vec![View::Home, View::Find, View::Tracker];
        if signed_in {
            views.push(View::Dashboard);
        }
        views.push(View::Pricing);
        if !signed_in {
            views.push(View::SignIn);
        }

        views
            .into_iter()
            .map(|view| MenuItem { label: view.title(), view, active: view == self.current })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_view_reaches_any_other() {
        let all = [
            View::Home,
            View::Find,
            View::SignIn,
            View::Create,
            View::Pricing,
            View::Tracker,
            View::Dashboard,
            View::Reset,
        ];
        for from in all {
            for to in all {
                assert_eq!(from.navigate(Nav::To(to)), to);
            }
        }
    }

    #[test]
    fn test_auth_transitions() {
        assert_eq!(View::SignIn.navigate(Nav::SignedIn), View::Dashboard);
        assert_eq!(View::Dashboard.navigate(Nav::SignedOut), View::Home);
        assert_eq!(View::SignIn.navigate(Nav::ForgotPassword), View::Reset);
        assert_eq!(View::Reset.navigate(Nav::BackToSignIn), View::SignIn);
    }

    #[test]
    fn test_menu_depends_on_identity() {
        let mut router = Router::new();
        router.dispatch(Nav::TrackFlights);

        let signed_out: Vec<_> = router.menu(false).iter().map(|item| item.view).collect();
        assert!(!signed_out.contains(&View::Dashboard));
        assert!(signed_out.contains(&View::SignIn));

        let signed_in = router.menu(true);
        assert!(signed_in.iter().any(|item| item.view == View::Dashboard));
        assert!(signed_in.iter().find(|item| item.active).is_some_and(|item| item.view == View::Tracker));
    }

    #[test]
    fn test_parse_view_names() {
        assert_eq!("Dashboard".parse::<View>(), Ok(View::Dashboard));
        assert_eq!("sign-up".parse::<View>(), Ok(View::Create));
        assert!("nowhere".parse::<View>().is_err());
    }
}

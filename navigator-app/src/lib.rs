pub mod app;
pub mod boundary;
pub mod error;
pub mod refresh;
pub mod router;
pub mod screens;
pub mod session;
pub mod state;

pub use app::{App, Body, Mounted, Page};
pub use error::{AppError, AppResult};
pub use router::{Nav, View};
pub use session::SessionStore;
pub use state::AppContext;

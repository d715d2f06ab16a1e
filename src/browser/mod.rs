//! Chrome/Chromium session backing [`PageNavigator`](crate::navigator::PageNavigator)

pub mod config;
pub mod session;

pub use config::{ConnectionOptions, LaunchOptions};
pub use session::BrowserSession;

use serde::Serialize;

pub mod history;
pub mod onboard;
pub mod session;

pub use history::HistoryScreen;
pub use onboard::OnboardScreen;
pub use session::SessionScreen;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusBarStyle {
    Dark,
    Light,
}

/// The mounted screen. Only the top of the navigation stack is mounted.
pub enum Screen {
    Onboard(OnboardScreen),
    Main(SessionScreen),
    PastSteps(HistoryScreen),
}

use serde::Serialize;

use crate::role::Role;

/// Presentation variant for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum View {
    Landing,
    BorrowerDashboard,
    LenderDashboard,
    AdminDashboard,
    UnregisteredNotice,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Landing => "Welcome",
            Self::BorrowerDashboard => "Borrower Dashboard",
            Self::LenderDashboard => "Lender Dashboard",
            Self::AdminDashboard => "Admin Dashboard",
            Self::UnregisteredNotice => "Not Registered",
        }
    }
}

pub fn select_view(is_connected: bool, role: Role) -> View {
    if !is_connected {
        return View::Landing;
    }
    match role {
        Role::Admin => View::AdminDashboard,
        Role::Lender => View::LenderDashboard,
        Role::Borrower => View::BorrowerDashboard,
        Role::Guest => View::UnregisteredNotice,
    }
}

/// State of the landing page's connect control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectAffordance {
    Enabled,
    /// A connection request is outstanding
    Pending,
    /// No wallet provider is configured
    Unavailable,
}

pub fn connect_affordance(provider_present: bool, connecting: bool) -> ConnectAffordance {
    match (provider_present, connecting) {
        (false, _) => ConnectAffordance::Unavailable,
        (true, true) => ConnectAffordance::Pending,
        (true, false) => ConnectAffordance::Enabled,
    }
}

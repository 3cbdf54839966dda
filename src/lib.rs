pub mod config;
pub mod contract;
pub mod dispatch;
pub mod error;
pub mod role;
pub mod state;
pub mod view;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testing;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use role::{resolve_role, Resolution, Role, RoleResolver};
pub use state::AppState;
pub use view::{connect_affordance, select_view, ConnectAffordance, View};

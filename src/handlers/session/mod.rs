// handlers/session - browser-facing routes behind `require_session`

pub mod auth;
pub mod portfolio;
pub mod templates_proxy;

pub use auth::{service_token, session};
pub use portfolio::portfolio;
pub use templates_proxy::templates_proxy;

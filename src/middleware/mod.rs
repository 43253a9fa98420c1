pub mod auth;

pub use auth::{AuthInterceptor, AuthenticatedUser, Claims};

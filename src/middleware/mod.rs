pub mod auth;
pub mod response;

pub use auth::{authenticate_middleware, AuthSettings, CurrentUser};
pub use response::{ApiResponse, ApiResult};

pub mod auth;
pub mod response;

pub use auth::{clear_session_cookie, extract_token, session_cookie};
pub use response::{ApiResponse, ApiResult};

//! HTTP 接口层

pub mod response;
pub mod routes;

pub use response::{OtpResponse, to_response};
pub use routes::{AppState, router};

//! 领域层

pub mod otp_request;

pub use otp_request::{OtpKind, OtpRequest, ValidatedRequest};

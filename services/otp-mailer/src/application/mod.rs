//! 应用层

pub mod message_composer;
pub mod send_otp_handler;

pub use message_composer::MessageComposer;
pub use send_otp_handler::{SendOtpHandler, SentOtp};

//! Authentication service models

pub mod forgot_password;
pub mod user;

// Re-export for convenience
pub use forgot_password::{ChangePassword, ForgotPassword, MailBody};
pub use user::{AuthResponse, LoginRequest, NewUser, RefreshTokenRequest, RegisterRequest, User};

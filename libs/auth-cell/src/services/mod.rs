pub mod auth;
pub mod credentials;
pub mod password;
pub mod user;

pub use auth::AuthService;
pub use password::PasswordService;
pub use user::UserService;

pub mod handlers;
pub mod password;
pub mod tokens;

mod identity;
mod jwt;
mod middleware;
mod password;
mod reset_token;
mod service;

pub use identity::*;
pub use jwt::*;
pub use middleware::*;
pub use password::*;
pub use reset_token::*;
pub use service::*;

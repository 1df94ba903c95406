mod forgot_password;
mod login;
mod logout;
mod posts;
mod register;
mod reset_password;
mod subreddits;
mod update_password;
mod user;

pub use forgot_password::*;
pub use login::*;
pub use logout::*;
pub use posts::*;
pub use register::*;
pub use reset_password::*;
pub use subreddits::*;
pub use update_password::*;
pub use user::*;

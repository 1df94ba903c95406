mod pagination;
mod post;
mod reset_token;
mod subreddit;
mod user;

pub use pagination::*;
pub use post::*;
pub use reset_token::*;
pub use subreddit::*;
pub use user::*;

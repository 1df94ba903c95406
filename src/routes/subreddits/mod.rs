mod delete;
mod get;
mod post;
mod put;

pub use delete::*;
pub use get::*;
pub use post::*;
pub use put::*;

//! Domain entities - the core business objects.

mod post;
mod tag;
mod user;

pub use post::{Author, NewPost, Post, PostChanges};
pub use tag::Tag;
pub use user::{NewUser, User, UserChanges};

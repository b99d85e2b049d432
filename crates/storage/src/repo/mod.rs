pub mod comments;
mod posts;
mod users;

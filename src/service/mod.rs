pub mod annotation;
pub mod text;
pub mod token;
pub mod user;

pub mod annotation;
pub mod login;
pub mod text;
pub mod token;

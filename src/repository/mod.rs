pub mod annotation;
pub use annotation::AnnotationRepository;
pub mod text;
pub use text::TextRepository;
pub mod user;
pub use user::UserRepository;

mod annotation;
pub use annotation::Annotation;
mod api_error;
pub use api_error::ApiError;
mod api_result;
pub use api_result::{ApiResponse, ApiResult};
mod text;
pub use text::Text;
mod user;
pub use user::User;

pub mod date;
pub mod extract;
pub mod request;
pub mod response;

pub use extract::JsonBody;
pub use response::{ApiResponse, ApiResult};

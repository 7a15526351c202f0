pub mod resume_data;
pub mod response;

pub use resume_data::*;
pub use response::*;

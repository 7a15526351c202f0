pub mod auth_handlers;
pub mod builder_handlers;
pub mod system_handlers;

pub use auth_handlers::*;
pub use builder_handlers::*;
pub use system_handlers::*;

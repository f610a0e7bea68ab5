pub mod errors;
pub mod id;
pub mod types;

pub use errors::{ConfigError, ViewpipeError, WindowError};
pub use id::{new_id, WindowId};
pub use types::{SizeHint, WindowState};

pub type Result<T> = std::result::Result<T, ViewpipeError>;

pub mod logging;
pub mod roman;

pub use roman::to_roman;

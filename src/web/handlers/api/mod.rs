//! API 处理器

pub mod history;
pub mod rate_limit;
pub mod translate;

pub use history::*;
pub use rate_limit::*;
pub use translate::*;

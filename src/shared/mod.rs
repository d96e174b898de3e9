//! Cross-cutting helpers shared by all layers

pub mod errors;
pub mod format;
pub mod locale;
pub mod time;

pub use errors::{ApiError, ApiResult, FlowError, FlowResult};
pub use locale::{Language, Locale};

pub mod api;
pub mod calc;
pub mod content;
pub mod logging;

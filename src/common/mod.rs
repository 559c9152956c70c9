// Shared building blocks used by every other module.
// The logger comes first so its macros are visible crate-wide.
#[macro_use]
pub mod logger;

pub mod constants;
pub mod utils;

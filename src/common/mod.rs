//! Cross-layer helpers.

pub mod time;

//! Result presentation: text for terminals, JSON for tooling

pub mod json;
pub mod text;

//! Core detection and sanitization engine

pub mod classifier;
pub mod detector;
pub mod driver;
pub mod sanitizer;

#[cfg(test)]
pub(crate) mod test_fixtures;

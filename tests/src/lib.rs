//! Integration tests.

#[cfg(test)]
pub mod flow;
pub mod shared;

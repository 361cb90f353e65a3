pub mod engine;
pub mod models;

pub use engine::run_dca;
pub use models::*;

#[cfg(test)]
mod tests;

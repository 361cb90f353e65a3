pub mod error;
pub mod traits;
pub mod types;

pub use error::*;
pub use traits::*;
pub use types::*;

/// Round a percentage (or any float) to 2 decimal digits.
///
/// Every derived percentage in the system is rounded with this before it is
/// returned to a caller.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

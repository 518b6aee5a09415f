pub mod calculator;
mod u256;

pub use calculator::*;
pub use u256::U256;

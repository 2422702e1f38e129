// Market data domain
pub mod candle;
pub mod interval;
pub mod symbol;

pub use candle::{Candle, Series};
pub use interval::Interval;
pub use symbol::Symbol;

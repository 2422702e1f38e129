// Indicator, signal and analysis result types
pub mod analysis;

// Domain-specific error types
pub mod errors;

// Symbols, intervals and candle series
pub mod market;

// Port interfaces
pub mod ports;

// Shared watch-list and mode state
pub mod watchlist;

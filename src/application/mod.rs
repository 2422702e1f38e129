// Pure computation
pub mod indicator_engine;
pub mod signal_classifier;

// Per-pass pipeline and its driver
pub mod orchestrator;
pub mod scheduler;

// Outbound text and the inbound command surface
pub mod commands;
pub mod formatter;

// System wiring
pub mod system;

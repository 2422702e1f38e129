pub mod smartcore_model;

pub use smartcore_model::{SmartCoreModel, load_policy};

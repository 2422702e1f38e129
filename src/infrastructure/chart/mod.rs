pub mod svg;

pub use svg::{NoopChartRenderer, SvgChartRenderer};

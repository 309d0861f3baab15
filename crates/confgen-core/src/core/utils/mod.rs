pub mod geometry;
pub mod minimizer;

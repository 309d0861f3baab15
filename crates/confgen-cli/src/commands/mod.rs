pub mod clean;
pub mod generate;
pub mod single;

pub mod data_sources;
pub mod generate;
pub mod templates;

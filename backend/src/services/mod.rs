pub mod cards;
pub mod data_sources;
pub mod design;
pub mod merge;
pub mod records;

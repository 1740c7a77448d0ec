//! The bulk pipeline: import, match, edit, check and export records.

pub mod archive;
pub mod exporter;
pub mod matcher;
pub mod parser;
pub mod store;
pub mod template;
pub mod validator;

pub mod card;
pub mod design;
pub mod export;
pub mod field;
pub mod photo;
pub mod record;
pub mod validation;

//! Local stand-ins for the external record store and object store used by the
//! single-card save flow.

mod cards;

pub use cards::CardRepository;

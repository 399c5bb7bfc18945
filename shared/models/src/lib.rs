//! Data model shared by every MediSense crate.
//!
//! Everything here is ephemeral and request-scoped except [`LiteratureItem`],
//! whose embedding and `{title, abstract}` payload are persisted in the vector
//! index keyed by PubMed id.

pub mod chat;
pub mod evidence;

pub use chat::*;
pub use evidence::*;

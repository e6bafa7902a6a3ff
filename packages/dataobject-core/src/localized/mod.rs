//! Localized entities: one primary row plus one content row per language.

mod entity;
mod fold;
mod record;
mod writes;

pub use entity::LocalizedEntity;
pub use record::{LocalizedContent, LocalizedRecord};

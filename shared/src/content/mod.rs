//! Content document model
//!
//! - [`ContentDocument`] - the whole site content
//! - [`Payload`] - tagged shape of an incoming section payload
//! - [`menu`] - menu section ids, field names and [`QuantityOption`]

mod document;
pub mod menu;
mod payload;

pub use document::{
    ContentDocument, KNOWN_SECTIONS, LAST_UPDATED, SECTION_ABOUT, SECTION_BUSINESS_INFO,
    SECTION_HERO, SECTION_HOURS, SECTION_IMAGES, SECTION_MENU,
};
pub use menu::QuantityOption;
pub use payload::{Payload, PayloadKind};

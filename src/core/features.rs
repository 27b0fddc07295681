//! Storefront features
//!
//! `translator` resolves what a piece of menu text shows in the selected
//! language; `menu` applies it to menu items and the restaurant header.

pub mod menu;
pub mod translator;

pub use menu::{LocalizedMenuItem, MenuCardBindings, MenuItem, MenuLocalizer};
pub use translator::AutoTranslator;

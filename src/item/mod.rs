// Item catalog module
//
// This module provides the immutable item descriptions used by the rest of the crate:
// - Item definitions and weapon properties
// - Item registry (catalog) for centralized storage and JSON loading
// - Catalog errors

pub mod definition;
pub mod error;
pub mod properties;
pub mod registry;

// Re-export main types for convenient access
pub use definition::{ItemDefinition, ItemRef};
pub use error::CatalogError;
pub use properties::{ItemProperties, WeaponAttributes};
pub use registry::ItemRegistry;

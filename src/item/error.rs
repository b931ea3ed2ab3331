use thiserror::Error;

/// Errors raised while building or loading the item catalog
///
/// Runtime inventory and equipment operations never fail; only content
/// (definitions coming from files) can be rejected.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// An item with this id is already registered
    #[error("item '{0}' already registered")]
    DuplicateItem(String),

    /// Item ids must contain at least one non-whitespace character
    #[error("item id is empty (name: '{0}')")]
    EmptyId(String),

    /// A weapon references an ammo id that is not in the catalog
    #[error("weapon '{weapon}' uses unknown ammo '{ammo}'")]
    UnknownAmmo { weapon: String, ammo: String },

    #[error("could not read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

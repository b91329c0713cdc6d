//! Error types for combo table construction

use thiserror::Error;

/// Errors that can occur when building a [`ComboTable`](crate::ComboTable)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// A combo was defined with no buttons at all
    #[error("Combo '{name}' has an empty sequence")]
    EmptySequence { name: String },

    /// The last button of a combo is not the action button
    #[error("Combo '{name}' must end with the action button")]
    MissingActionTerminator { name: String },

    /// Two combos share a name
    #[error("Combo '{name}' is defined more than once")]
    DuplicateName { name: String },

    /// Two combos share the exact same button sequence
    #[error("Combo '{name}' has the same sequence as '{existing}'")]
    DuplicateSequence { name: String, existing: String },
}

//! Named combo definitions

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::button::Button::{self, Action as A, Down as D, Left as L, Right as R, Up as U};
use crate::error::TableError;

/// The built-in combo list, in declaration order.
const BUILTIN: &[(&str, &[Button])] = &[
    ("Hadoken", &[R, R, R, A]),
    ("Shoryuken", &[U, D, U, R, A]),
    ("Tatsumaki", &[L, R, L, R, A]),
    ("Dragon Punch", &[U, U, D, R, A]),
    ("Hurricane Kick", &[R, D, R, R, A]),
    ("Giga Hadoken", &[R, R, R, D, U, R, A]),
    ("Ultra Shoryuken", &[R, R, D, R, U, D, R, A]),
    ("Mega Tatsumaki", &[U, U, D, R, R, R, R, A]),
    ("Final Dragon Punch", &[L, U, R, R, D, U, R, A]),
    ("Ultimate Hurricane Kick", &[R, R, U, D, R, U, R, R, A]),
];

/// A named button sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboDefinition {
    pub name: String,
    pub sequence: Vec<Button>,
}

impl ComboDefinition {
    pub fn new(name: impl Into<String>, sequence: impl Into<Vec<Button>>) -> Self {
        Self {
            name: name.into(),
            sequence: sequence.into(),
        }
    }

    /// The sequence as the raw glyphs an event source would emit.
    pub fn glyphs(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.sequence.iter().map(|b| b.glyph())
    }
}

impl fmt::Display for ComboDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.name)?;
        for (i, button) in self.sequence.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", button)?;
        }
        write!(f, "]")
    }
}

/// A validated, immutable set of combo definitions.
///
/// Every sequence is non-empty and ends with [`Button::Action`], names are
/// unique, and no two definitions share a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboTable {
    definitions: Vec<ComboDefinition>,
}

impl ComboTable {
    /// Validate and wrap a list of definitions.
    pub fn new(definitions: Vec<ComboDefinition>) -> Result<Self, TableError> {
        validate(&definitions)?;
        Ok(Self { definitions })
    }

    /// The ten built-in combos.
    pub fn builtin() -> Self {
        Self {
            definitions: BUILTIN
                .iter()
                .map(|(name, sequence)| ComboDefinition::new(*name, *sequence))
                .collect(),
        }
    }

    pub fn definitions(&self) -> &[ComboDefinition] {
        &self.definitions
    }

    /// Look up a definition by name.
    pub fn get(&self, name: &str) -> Option<&ComboDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn validate(definitions: &[ComboDefinition]) -> Result<(), TableError> {
    let mut names = HashSet::new();
    let mut sequences: HashMap<&[Button], &str> = HashMap::new();

    for definition in definitions {
        let name = &definition.name;
        match definition.sequence.last() {
            None => return Err(TableError::EmptySequence { name: name.clone() }),
            Some(Button::Action) => {}
            Some(_) => return Err(TableError::MissingActionTerminator { name: name.clone() }),
        }

        if !names.insert(name.as_str()) {
            return Err(TableError::DuplicateName { name: name.clone() });
        }

        if let Some(existing) = sequences.insert(&definition.sequence, name) {
            return Err(TableError::DuplicateSequence {
                name: name.clone(),
                existing: existing.to_string(),
            });
        }
    }

    Ok(())
}

impl Default for ComboTable {
    fn default() -> Self {
        Self::builtin()
    }
}

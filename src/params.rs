//! Parameter sets accumulated for the engine's parameter file.
//!
//! Most models reference parameter sets that already live in caller-managed
//! files, so the pipeline only collects the sets it *creates*: inline sets
//! carried by descriptors, synthesized synchronizer settings, and per-event
//! defaults.

use std::fmt;

use indexmap::IndexMap;

/// A single typed parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Number(f64),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{v}"),
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Number(v) => write!(f, "{v}"),
            ParamValue::Text(v) => write!(f, "{v}"),
        }
    }
}

/// One named parameter entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: ParamValue,
}

impl Parameter {
    pub fn new(name: &str, value: ParamValue) -> Self {
        Parameter {
            name: name.to_string(),
            value,
        }
    }
}

/// An identified, ordered list of parameter entries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParametersSet {
    pub id: String,
    pub entries: Vec<Parameter>,
}

impl ParametersSet {
    pub fn new(id: &str) -> Self {
        ParametersSet {
            id: id.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn with(mut self, name: &str, value: ParamValue) -> Self {
        self.entries.push(Parameter::new(name, value));
        self
    }
}

/// Insertion-ordered collection of parameter sets for one assembly run.
///
/// Set ids are unique: the first insertion of an id wins and later ones are
/// ignored, mirroring how identically-named connector templates collapse.
#[derive(Debug, Clone, Default)]
pub struct ParameterBank {
    sets: IndexMap<String, ParametersSet>,
}

impl ParameterBank {
    pub fn new() -> Self {
        ParameterBank::default()
    }

    /// Adds a set unless its id is already present. Returns whether the set
    /// was stored.
    pub fn insert(&mut self, set: ParametersSet) -> bool {
        if self.sets.contains_key(&set.id) {
            return false;
        }
        self.sets.insert(set.id.clone(), set);
        true
    }

    pub fn get(&self, id: &str) -> Option<&ParametersSet> {
        self.sets.get(id)
    }

    pub fn sets(&self) -> impl Iterator<Item = &ParametersSet> {
        self.sets.values()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

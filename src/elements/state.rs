//! Material state flag of an element

use serde::{Deserialize, Serialize};

/// Material regime reported by the last element evaluation.
///
/// Stored as an integer flag by element routines: 0 is elastic, 1 is
/// perfectly plastic or elastic-plastic. Other flags are carried through
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum ElementState {
    #[default]
    Elastic,
    Plastic,
    Undefined(i32),
}

impl ElementState {
    pub const ELASTIC_FLAG: i32 = 0;
    pub const PLASTIC_FLAG: i32 = 1;

    pub fn from_flag(flag: i32) -> Self {
        match flag {
            Self::ELASTIC_FLAG => ElementState::Elastic,
            Self::PLASTIC_FLAG => ElementState::Plastic,
            other => ElementState::Undefined(other),
        }
    }

    pub fn flag(&self) -> i32 {
        match self {
            ElementState::Elastic => Self::ELASTIC_FLAG,
            ElementState::Plastic => Self::PLASTIC_FLAG,
            ElementState::Undefined(flag) => *flag,
        }
    }
}

impl From<i32> for ElementState {
    fn from(flag: i32) -> Self {
        Self::from_flag(flag)
    }
}

impl From<ElementState> for i32 {
    fn from(state: ElementState) -> Self {
        state.flag()
    }
}

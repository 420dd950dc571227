//! Element families and their response-storage policies

use serde::{Deserialize, Serialize};

/// Element family, resolved from an attribute's type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ElementFamily {
    /// 2D frame (beam-column) element
    Frame2D,
    /// 3D frame (beam-column) element
    Frame3D,
    /// 4-node shell element
    Shell4N,
    /// 8-node shell element
    Shell8N,
    /// Fiber-section frame element
    Fiber,
    /// Any type tag not in the policy table
    #[default]
    Unclassified,
}

/// Load components whose maximum is stored as the element's max moment.
///
/// Indices are 1-based positions in the element's local nodal load vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxMomentPolicy {
    pub first: usize,
    pub second: usize,
}

impl MaxMomentPolicy {
    /// Max of the two components, or `None` if the load vector is too short
    pub fn evaluate(&self, nodal_loads: &[f64]) -> Option<f64> {
        let first = nodal_loads.get(self.first.checked_sub(1)?)?;
        let second = nodal_loads.get(self.second.checked_sub(1)?)?;
        Some(first.max(*second))
    }
}

/// What a family contributes to response storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyPolicy {
    pub family: ElementFamily,
    /// Type tag used in element attributes
    pub type_name: &'static str,
    /// Needs the shared per-integration-point tensor buffer
    pub tensor_buffer: bool,
    /// Needs the fiber-section state store
    pub fiber_store: bool,
    /// Derived max moment, if the family has one
    pub max_moment: Option<MaxMomentPolicy>,
}

/// Family-to-policy table
pub const FAMILY_POLICIES: &[FamilyPolicy] = &[
    FamilyPolicy {
        family: ElementFamily::Frame2D,
        type_name: "FRAME_2D",
        tensor_buffer: true,
        fiber_store: false,
        max_moment: Some(MaxMomentPolicy { first: 3, second: 6 }),
    },
    FamilyPolicy {
        family: ElementFamily::Frame3D,
        type_name: "FRAME_3D",
        tensor_buffer: true,
        fiber_store: false,
        max_moment: Some(MaxMomentPolicy { first: 6, second: 12 }),
    },
    FamilyPolicy {
        family: ElementFamily::Shell4N,
        type_name: "SHELL_4N",
        tensor_buffer: true,
        fiber_store: false,
        max_moment: None,
    },
    FamilyPolicy {
        family: ElementFamily::Shell8N,
        type_name: "SHELL_8N",
        tensor_buffer: true,
        fiber_store: false,
        max_moment: None,
    },
    FamilyPolicy {
        family: ElementFamily::Fiber,
        type_name: "FIBER",
        tensor_buffer: true,
        fiber_store: true,
        max_moment: None,
    },
];

const UNCLASSIFIED: FamilyPolicy = FamilyPolicy {
    family: ElementFamily::Unclassified,
    type_name: "",
    tensor_buffer: false,
    fiber_store: false,
    max_moment: None,
};

impl ElementFamily {
    /// Every family, in table order, followed by `Unclassified`
    pub const ALL: [ElementFamily; 6] = [
        ElementFamily::Frame2D,
        ElementFamily::Frame3D,
        ElementFamily::Shell4N,
        ElementFamily::Shell8N,
        ElementFamily::Fiber,
        ElementFamily::Unclassified,
    ];

    /// Resolve a type tag; unknown tags are `Unclassified`
    pub fn from_type_name(type_name: &str) -> Self {
        FAMILY_POLICIES
            .iter()
            .find(|p| p.type_name == type_name)
            .map(|p| p.family)
            .unwrap_or(ElementFamily::Unclassified)
    }

    /// Storage policy for this family
    pub fn policy(&self) -> &'static FamilyPolicy {
        FAMILY_POLICIES
            .iter()
            .find(|p| p.family == *self)
            .unwrap_or(&UNCLASSIFIED)
    }

    pub fn is_shell(&self) -> bool {
        matches!(self, ElementFamily::Shell4N | ElementFamily::Shell8N)
    }
}

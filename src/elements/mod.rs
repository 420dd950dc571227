//! Element descriptions and material state

mod attribute;
mod element;
mod family;
mod hardening;
mod state;

pub use attribute::ElementAttribute;
pub use element::Element;
pub use family::{ElementFamily, FamilyPolicy, MaxMomentPolicy, FAMILY_POLICIES};
pub use hardening::HardeningState;
pub use state::ElementState;

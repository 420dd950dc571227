//! Physical units attached to committed response quantities
//!
//! Only the parts the commit pass needs: a unit system selector, a
//! table of default unit descriptors, and the "check units" switch that
//! decides whether stress rows get tagged at all.

use serde::{Deserialize, Serialize};

/// Unit convention used for default units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnitSystem {
    /// SI (metric) units
    #[default]
    Si,
    /// US customary units
    Us,
}

impl UnitSystem {
    /// Name of the default pressure/stress unit in this system
    pub fn default_pressure_unit(&self) -> &'static str {
        match self {
            UnitSystem::Si => "Pa",
            UnitSystem::Us => "psi",
        }
    }

    /// Default pressure/stress unit descriptor in this system
    pub fn pressure_unit(&self) -> UnitDescriptor {
        match self {
            UnitSystem::Si => UnitDescriptor::new("Pa", 1.0, Dimension::PRESSURE),
            UnitSystem::Us => UnitDescriptor::new("psi", PSI_TO_PA, Dimension::PRESSURE),
        }
    }
}

const PSI_TO_PA: f64 = 6_894.757_293_168;
const LBF_TO_N: f64 = 4.448_221_615_260_5;
const INCH_TO_M: f64 = 0.0254;

/// Exponents of the base dimensions (length, mass, time)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dimension {
    pub length: i8,
    pub mass: i8,
    pub time: i8,
}

impl Dimension {
    pub const LENGTH: Dimension = Dimension { length: 1, mass: 0, time: 0 };
    pub const FORCE: Dimension = Dimension { length: 1, mass: 1, time: -2 };
    pub const PRESSURE: Dimension = Dimension { length: -1, mass: 1, time: -2 };
}

/// A named unit with its scale factor to the SI base unit of its dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDescriptor {
    /// Unit name, e.g. "Pa"
    pub name: String,
    /// Multiply a value in this unit by `scale_factor` to get SI
    pub scale_factor: f64,
    /// Physical dimension
    pub dimension: Dimension,
}

impl UnitDescriptor {
    /// Create a unit descriptor
    pub fn new(name: &str, scale_factor: f64, dimension: Dimension) -> Self {
        Self {
            name: name.to_string(),
            scale_factor,
            dimension,
        }
    }

    /// Look up one of the built-in default units by name
    pub fn default_units(name: &str) -> Option<Self> {
        let (scale, dimension) = match name {
            "Pa" => (1.0, Dimension::PRESSURE),
            "kPa" => (1.0e3, Dimension::PRESSURE),
            "MPa" => (1.0e6, Dimension::PRESSURE),
            "GPa" => (1.0e9, Dimension::PRESSURE),
            "psi" => (PSI_TO_PA, Dimension::PRESSURE),
            "ksi" => (PSI_TO_PA * 1.0e3, Dimension::PRESSURE),
            "N" => (1.0, Dimension::FORCE),
            "kN" => (1.0e3, Dimension::FORCE),
            "lbf" => (LBF_TO_N, Dimension::FORCE),
            "kips" => (LBF_TO_N * 1.0e3, Dimension::FORCE),
            "m" => (1.0, Dimension::LENGTH),
            "mm" => (1.0e-3, Dimension::LENGTH),
            "in" => (INCH_TO_M, Dimension::LENGTH),
            "ft" => (INCH_TO_M * 12.0, Dimension::LENGTH),
            _ => return None,
        };
        Some(Self::new(name, scale, dimension))
    }
}

/// Global units settings consulted by the commit pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnitsContext {
    /// Whether unit consistency checking (and tagging) is enabled
    pub check_enabled: bool,
    /// Active unit system
    pub system: UnitSystem,
}

impl UnitsContext {
    /// Units checking enabled with the given system
    pub fn checked(system: UnitSystem) -> Self {
        Self {
            check_enabled: true,
            system,
        }
    }

    /// Unit to tag stress rows with, if checking is enabled
    pub fn stress_unit(&self) -> Option<UnitDescriptor> {
        self.check_enabled.then(|| self.system.pressure_unit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pressure_units() {
        assert_eq!(UnitSystem::Si.default_pressure_unit(), "Pa");
        assert_eq!(UnitSystem::Us.default_pressure_unit(), "psi");
        assert_eq!(
            UnitSystem::Us.pressure_unit(),
            UnitDescriptor::default_units("psi").unwrap()
        );
    }

    #[test]
    fn test_unknown_unit() {
        assert!(UnitDescriptor::default_units("furlong").is_none());
    }

    #[test]
    fn test_ksi_scale() {
        let ksi = UnitDescriptor::default_units("ksi").unwrap();
        assert!((ksi.scale_factor - 6.894_757e6).abs() < 1.0);
        assert_eq!(ksi.dimension, Dimension::PRESSURE);
    }

    #[test]
    fn test_stress_unit_disabled() {
        assert!(UnitsContext::default().stress_unit().is_none());
        let ctx = UnitsContext::checked(UnitSystem::Si);
        assert_eq!(ctx.stress_unit().unwrap().name, "Pa");
    }
}

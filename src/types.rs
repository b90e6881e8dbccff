//! Constants, component model, and error types shared across the library.
//!
//! All physical constants are explicit named items rather than ambient
//! configuration, so every kernel stays a pure function of its inputs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Lateral beam model: 2 DOF per node (deflection, rotation).
pub const DOF_PER_NODE: usize = 2;
/// DOFs per element (2 nodes × 2 DOF/node).
pub const DOF_PER_ELEMENT: usize = 4;

/// Young's modulus of drillstring steel (lbf/in²).
pub const E_STEEL_PSI: f64 = 30.0e6;

/// Shear modulus of drillstring steel (lbf/in²), used for torsional stiffness.
pub const G_STEEL_PSI: f64 = 11.5e6;

/// Standard gravity in inch-pound-second units (in/s²).
pub const GRAVITY_IN_S2: f64 = 386.088;

/// Longitudinal wave speed in steel (ft/s), for axial bit-bounce resonance.
pub const SPEED_OF_SOUND_STEEL_FT_S: f64 = 16_850.0;

/// Mud density at which steel is neutrally buoyant (ppg).
pub const BUOYANCY_REFERENCE_PPG: f64 = 65.5;

/// Floor for the buoyancy factor; keeps the mass matrix positive definite
/// even for non-physical mud weights.
pub const MIN_BUOYANCY_FACTOR: f64 = 0.01;

/// Lateral point-spring stiffness (lbf/in) added at stabilizer nodes.
/// Large relative to any element stiffness so the node is effectively pinned.
pub const STABILIZER_SPRING_LBF_IN: f64 = 1.0e8;

/// Axial loads below this magnitude (lbf) produce an identically zero
/// geometric stiffness matrix.
pub const ZERO_LOAD_TOL: f64 = 1e-12;

/// Mode-shape peaks at or below this value skip unit normalization to avoid
/// dividing by numerical noise.
pub const SHAPE_NORMALIZATION_TOL: f64 = 1e-15;

/// Damping ratio anchored at the first two retained modes when building
/// Rayleigh proportional damping.
pub const RAYLEIGH_TARGET_ZETA: f64 = 0.02;

/// Type of BHA component. Purely a tag carried through to results; the beam
/// model reads only the geometric fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentKind {
    Bit,
    DrillCollar,
    HeavyWeight,
    Stabilizer,
    Sub,
    Mwd,
    DrillPipe,
}

/// One physical segment of the bottom-hole assembly.
///
/// Components are supplied in order from the bit (index 0) upward and are
/// immutable once handed to the assembler. Each component defines exactly one
/// beam element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BhaComponent {
    /// Outer diameter (in).
    pub od_in: f64,
    /// Inner diameter (in).
    pub id_in: f64,
    /// Length (ft).
    pub length_ft: f64,
    /// Air weight per foot (lb/ft).
    pub weight_per_ft: f64,
    pub kind: ComponentKind,
}

impl BhaComponent {
    /// Validate the geometric fields, naming the offending one.
    pub fn validate(&self, index: usize) -> DynamicsResult<()> {
        if self.length_ft <= 0.0 {
            return Err(DynamicsError::invalid_geometry(
                format!("components[{index}].length_ft"),
                self.length_ft,
                "component length must be positive",
            ));
        }
        if self.od_in <= 0.0 {
            return Err(DynamicsError::invalid_geometry(
                format!("components[{index}].od_in"),
                self.od_in,
                "outer diameter must be positive",
            ));
        }
        if self.id_in < 0.0 || self.id_in >= self.od_in {
            return Err(DynamicsError::invalid_geometry(
                format!("components[{index}].id_in"),
                self.id_in,
                "inner diameter must be non-negative and smaller than OD",
            ));
        }
        if self.weight_per_ft <= 0.0 {
            return Err(DynamicsError::invalid_geometry(
                format!("components[{index}].weight_per_ft"),
                self.weight_per_ft,
                "weight per foot must be positive",
            ));
        }
        Ok(())
    }
}

/// End constraints applied to the assembled model before the eigensolve.
///
/// The bit end is node 0; the top end is the last node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryCondition {
    /// Deflection = 0 at both ends, rotations free.
    PinnedPinned,
    /// Deflection and rotation = 0 at the bit end; deflection = 0 at the top.
    FixedPinned,
    /// Deflection and rotation = 0 at the bit end; top end unconstrained.
    FixedFree,
}

impl BoundaryCondition {
    /// Global DOF indices eliminated by this boundary condition.
    pub fn constrained_dofs(&self, num_nodes: usize) -> Vec<usize> {
        let top = DOF_PER_NODE * (num_nodes - 1);
        match self {
            BoundaryCondition::PinnedPinned => vec![0, top],
            BoundaryCondition::FixedPinned => vec![0, 1, top],
            BoundaryCondition::FixedFree => vec![0, 1],
        }
    }
}

/// Result type alias for all library operations.
pub type DynamicsResult<T> = Result<T, DynamicsError>;

/// Structured error type for the dynamics kernels.
///
/// Kernels run inside tight parameter sweeps, so errors are returned inline
/// and carry enough context for a caller to skip the offending cell.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum DynamicsError {
    /// A geometric input is non-physical (non-positive length, diameter, ...).
    #[error("Invalid geometry for '{field}': {value} - {reason}")]
    InvalidGeometry {
        field: String,
        value: f64,
        reason: String,
    },

    /// The constrained system has no free degrees of freedom left to solve.
    #[error("Degenerate system: {reason}")]
    DegenerateSystem { reason: String },

    /// An operating parameter is non-physical (non-positive RPM, ROP, ...).
    #[error("Invalid operating parameter '{field}': {value} - {reason}")]
    InvalidOperatingParameter {
        field: String,
        value: f64,
        reason: String,
    },
}

impl DynamicsError {
    pub fn invalid_geometry(
        field: impl Into<String>,
        value: f64,
        reason: impl Into<String>,
    ) -> Self {
        DynamicsError::InvalidGeometry {
            field: field.into(),
            value,
            reason: reason.into(),
        }
    }

    pub fn degenerate_system(reason: impl Into<String>) -> Self {
        DynamicsError::DegenerateSystem {
            reason: reason.into(),
        }
    }

    pub fn invalid_operating_parameter(
        field: impl Into<String>,
        value: f64,
        reason: impl Into<String>,
    ) -> Self {
        DynamicsError::InvalidOperatingParameter {
            field: field.into(),
            value,
            reason: reason.into(),
        }
    }

    /// Short error code for programmatic handling by callers.
    pub fn error_code(&self) -> &'static str {
        match self {
            DynamicsError::InvalidGeometry { .. } => "INVALID_GEOMETRY",
            DynamicsError::DegenerateSystem { .. } => "DEGENERATE_SYSTEM",
            DynamicsError::InvalidOperatingParameter { .. } => "INVALID_OPERATING_PARAMETER",
        }
    }
}

/// Buoyancy factor for steel in mud of the given density.
///
/// BF = 1 − ppg/65.5, floored at [`MIN_BUOYANCY_FACTOR`].
pub fn buoyancy_factor(mud_weight_ppg: f64) -> f64 {
    (1.0 - mud_weight_ppg / BUOYANCY_REFERENCE_PPG).max(MIN_BUOYANCY_FACTOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buoyancy_factor_matches_reference_values() {
        assert!((buoyancy_factor(0.0) - 1.0).abs() < 1e-12);
        assert!((buoyancy_factor(10.0) - (1.0 - 10.0 / 65.5)).abs() < 1e-12);
    }

    #[test]
    fn buoyancy_factor_is_floored_for_heavy_mud() {
        assert!((buoyancy_factor(100.0) - MIN_BUOYANCY_FACTOR).abs() < 1e-12);
    }

    #[test]
    fn constrained_dofs_per_boundary_condition() {
        assert_eq!(
            BoundaryCondition::PinnedPinned.constrained_dofs(11),
            vec![0, 20]
        );
        assert_eq!(
            BoundaryCondition::FixedPinned.constrained_dofs(11),
            vec![0, 1, 20]
        );
        assert_eq!(
            BoundaryCondition::FixedFree.constrained_dofs(11),
            vec![0, 1]
        );
    }

    #[test]
    fn component_validation_rejects_bad_geometry() {
        let good = BhaComponent {
            od_in: 6.75,
            id_in: 2.813,
            length_ft: 30.0,
            weight_per_ft: 83.0,
            kind: ComponentKind::DrillCollar,
        };
        assert!(good.validate(0).is_ok());

        let mut bad = good;
        bad.length_ft = 0.0;
        assert_eq!(
            bad.validate(2).unwrap_err().error_code(),
            "INVALID_GEOMETRY"
        );

        let mut bad = good;
        bad.id_in = 7.0;
        assert!(bad.validate(0).is_err());
    }

    #[test]
    fn error_serializes_with_tagged_variant() {
        let err = DynamicsError::invalid_operating_parameter("rpm", -10.0, "must be positive");
        let json = serde_json::to_string(&err).unwrap();
        let roundtrip: DynamicsError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, roundtrip);
    }
}

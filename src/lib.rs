//! Lateral vibration dynamics for drillstring bottom-hole assemblies.
//!
//! A 1-D Euler–Bernoulli finite-element core (stiffness, geometric stiffness
//! under weight on bit, consistent mass) with modal analysis, harmonic forced
//! response, and Campbell-diagram generation, plus closed-form estimators for
//! axial bit-bounce, lateral whirl, torsional stick-slip, and mechanical
//! specific energy. The estimators combine into a weighted stability index and
//! an RPM × WOB operating map.
//!
//! Units are the oilfield inch-lbf-second set: lengths in inches internally
//! (feet at the API surface where noted), forces in lbf, pressures in psi,
//! densities in ppg, frequencies in Hz, speeds in RPM.
//!
//! ```no_run
//! use bha_dynamics::{assemble, solve_modes, BhaComponent, BoundaryCondition, ComponentKind};
//!
//! let collars = vec![
//!     BhaComponent {
//!         od_in: 6.75,
//!         id_in: 2.813,
//!         length_ft: 30.0,
//!         weight_per_ft: 83.0,
//!         kind: ComponentKind::DrillCollar,
//!     };
//!     10
//! ];
//! let system = assemble(&collars, 10.0, 25.0, &[])?;
//! let modal = solve_modes(&system, BoundaryCondition::PinnedPinned, 6)?;
//! println!("f1 = {:.3} Hz", modal.modes[0].frequency_hz);
//! # Ok::<(), bha_dynamics::DynamicsError>(())
//! ```

pub mod assembly;
pub mod campbell;
pub mod element;
pub mod estimators;
pub mod modal;
pub mod response;
pub mod stability;
pub mod types;

pub use assembly::{assemble, GlobalSystem};
pub use campbell::{
    campbell, CampbellDiagram, ExcitationLine, ResonanceCrossing, RpmRange,
    BASE_EXCITATION_ORDERS,
};
pub use element::{polar_moment_annulus, second_moment_annulus, ElementProperties};
pub use estimators::{
    critical_rpm_axial, critical_rpm_lateral, critical_rpm_stick_slip,
    mechanical_specific_energy, AxialResult, LateralInputs, LateralResult, MseEfficiency,
    MseInputs, MseResult, StickSlipInputs, StickSlipResult, StickSlipSeverity, WhirlRisk,
};
pub use modal::{solve_modes, ModalResult, Mode};
pub use response::{forced_response, Excitation, ForcedResponse};
pub use stability::{
    stability_index, vibration_map, BhaGeometry, MapAxis, MapCell, OperatingConfig,
    OperatingMap, StabilityAssessment, VibrationStatus,
};
pub use types::{
    buoyancy_factor, BhaComponent, BoundaryCondition, ComponentKind, DynamicsError,
    DynamicsResult,
};

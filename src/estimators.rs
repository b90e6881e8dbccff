//! Closed-form critical-speed and drilling-efficiency estimators.
//!
//! Four independent analytical models, each a pure function of operating and
//! geometric parameters. They run standalone or as fast cross-checks against
//! the finite-element modes, and they run inside tight parameter sweeps, so
//! invalid inputs come back as inline `Err` values rather than panics:
//! - Axial bit-bounce: 1-D longitudinal wave resonance of the steel column.
//! - Lateral whirl (Paslay–Dawson): pinned-pinned bending critical speed from
//!   buoyed weight, bending stiffness, and length.
//! - Torsional stick-slip: angular-velocity fluctuation from bit friction
//!   torque against the string's torsional stiffness.
//! - Mechanical specific energy (Teale): rotary + thrust energy density.

use serde::{Deserialize, Serialize};

use crate::element::{polar_moment_annulus, second_moment_annulus};
use crate::types::{
    buoyancy_factor, DynamicsError, DynamicsResult, E_STEEL_PSI, GRAVITY_IN_S2, G_STEEL_PSI,
    SPEED_OF_SOUND_STEEL_FT_S,
};

/// Fractional margin kept clear of each axial resonance when deriving safe
/// operating bands.
pub const AXIAL_RESONANCE_MARGIN: f64 = 0.10;

/// Default bit-formation friction coefficient for stick-slip estimates.
pub const DEFAULT_BIT_FRICTION: f64 = 0.30;

/// Default confined compressive strength (psi) when no formation data exists.
pub const DEFAULT_CCS_PSI: f64 = 15_000.0;

/// Floor applied to the confined-compressive-strength baseline (psi).
pub const MIN_CCS_PSI: f64 = 5_000.0;

/// MSE above this multiple of CCS flags a founder point.
pub const FOUNDER_CCS_MULTIPLE: f64 = 3.0;

fn require_positive(field: &str, value: f64) -> DynamicsResult<()> {
    if value <= 0.0 {
        return Err(DynamicsError::invalid_operating_parameter(
            field,
            value,
            "must be positive",
        ));
    }
    Ok(())
}

fn require_positive_geometry(field: &str, value: f64) -> DynamicsResult<()> {
    if value <= 0.0 {
        return Err(DynamicsError::invalid_geometry(
            field,
            value,
            "must be positive",
        ));
    }
    Ok(())
}

// ============================================================================
// Axial (bit-bounce)
// ============================================================================

/// Axial resonance estimate for the steel column between bit and top.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxialResult {
    /// Fundamental longitudinal frequency c/(2L) (Hz).
    pub fundamental_hz: f64,
    /// Resonant rotary speeds (RPM) for harmonics 1x, 2x, 3x.
    pub critical_rpms: Vec<f64>,
    /// Safe rotary-speed bands (RPM) below and between the resonances.
    pub safe_bands: Vec<(f64, f64)>,
}

/// Critical axial (bit-bounce) speeds for a BHA of the given length.
///
/// Fundamental f₁ = c / (2·L) with harmonics at 2× and 3×; safe bands keep
/// [`AXIAL_RESONANCE_MARGIN`] clear of each resonance.
pub fn critical_rpm_axial(bha_length_ft: f64) -> DynamicsResult<AxialResult> {
    require_positive_geometry("bha_length_ft", bha_length_ft)?;

    let fundamental_hz = SPEED_OF_SOUND_STEEL_FT_S / (2.0 * bha_length_ft);
    let critical_rpms: Vec<f64> = (1..=3).map(|n| n as f64 * fundamental_hz * 60.0).collect();

    let lo = 1.0 - AXIAL_RESONANCE_MARGIN;
    let hi = 1.0 + AXIAL_RESONANCE_MARGIN;
    let mut safe_bands = vec![(0.0, lo * critical_rpms[0])];
    for pair in critical_rpms.windows(2) {
        safe_bands.push((hi * pair[0], lo * pair[1]));
    }

    Ok(AxialResult {
        fundamental_hz,
        critical_rpms,
        safe_bands,
    })
}

// ============================================================================
// Lateral whirl (Paslay–Dawson)
// ============================================================================

/// Whirl exposure at the evaluated rotary speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WhirlRisk {
    /// Well below the lateral critical speed.
    Low,
    /// Approaching critical from below; forward synchronous whirl risk.
    Forward,
    /// At or above critical; severe whirl expected.
    Severe,
}

/// Inputs for the lateral (Paslay–Dawson) whirl estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LateralInputs {
    pub bha_length_ft: f64,
    pub od_in: f64,
    pub id_in: f64,
    /// Air weight per foot (lb/ft); buoyancy is applied internally.
    pub weight_per_ft: f64,
    pub mud_weight_ppg: f64,
    pub operating_rpm: f64,
    /// Radial clearance between collar and wellbore wall (in).
    pub radial_clearance_in: f64,
    /// Hole inclination from vertical (deg).
    pub inclination_deg: f64,
}

/// Lateral whirl estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LateralResult {
    /// First lateral critical speed (RPM) of the buoyed pinned-pinned string.
    pub critical_rpm: f64,
    /// Equivalent frequency (Hz).
    pub frequency_hz: f64,
    pub whirl_risk: WhirlRisk,
    /// Dimensionless severity multiplier; grows with radial clearance and
    /// hole inclination (more room and more wall contact to whirl against).
    pub severity_factor: f64,
}

/// Closed-form lateral whirl critical speed.
///
/// Uses the simply-supported first bending mode of the buoyed string,
/// ω₁ = (π/L)²·√(EI/ρA), the same relation the FE model reproduces.
pub fn critical_rpm_lateral(inputs: &LateralInputs) -> DynamicsResult<LateralResult> {
    require_positive_geometry("bha_length_ft", inputs.bha_length_ft)?;
    require_positive_geometry("od_in", inputs.od_in)?;
    require_positive_geometry("weight_per_ft", inputs.weight_per_ft)?;
    require_positive("operating_rpm", inputs.operating_rpm)?;
    if inputs.id_in < 0.0 || inputs.id_in >= inputs.od_in {
        return Err(DynamicsError::invalid_geometry(
            "id_in",
            inputs.id_in,
            "inner diameter must be non-negative and smaller than OD",
        ));
    }
    if inputs.radial_clearance_in < 0.0 {
        return Err(DynamicsError::invalid_geometry(
            "radial_clearance_in",
            inputs.radial_clearance_in,
            "clearance cannot be negative",
        ));
    }

    let l_in = inputs.bha_length_ft * 12.0;
    let ei = E_STEEL_PSI * second_moment_annulus(inputs.od_in, inputs.id_in);
    let rho_a =
        buoyancy_factor(inputs.mud_weight_ppg) * inputs.weight_per_ft / 12.0 / GRAVITY_IN_S2;

    let omega = (std::f64::consts::PI / l_in).powi(2) * (ei / rho_a).sqrt();
    let frequency_hz = omega / (2.0 * std::f64::consts::PI);
    let critical_rpm = frequency_hz * 60.0;

    let ratio = inputs.operating_rpm / critical_rpm;
    let whirl_risk = if ratio < 0.7 {
        WhirlRisk::Low
    } else if ratio < 1.0 {
        WhirlRisk::Forward
    } else {
        WhirlRisk::Severe
    };

    let clearance_term = 1.0 + inputs.radial_clearance_in;
    let inclination_term = 1.0 + inputs.inclination_deg.clamp(0.0, 90.0) / 90.0;
    let severity_factor = clearance_term * inclination_term;

    Ok(LateralResult {
        critical_rpm,
        frequency_hz,
        whirl_risk,
        severity_factor,
    })
}

// ============================================================================
// Torsional stick-slip
// ============================================================================

/// Stick-slip severity classes by Δω/ω_avg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StickSlipSeverity {
    Mild,
    Moderate,
    Severe,
    Critical,
}

impl StickSlipSeverity {
    /// Classify a severity ratio. Boundaries use strict `<`, so a value of
    /// exactly 0.5/1.0/1.5 falls into the higher bucket.
    pub fn classify(severity: f64) -> Self {
        if severity < 0.5 {
            StickSlipSeverity::Mild
        } else if severity < 1.0 {
            StickSlipSeverity::Moderate
        } else if severity < 1.5 {
            StickSlipSeverity::Severe
        } else {
            StickSlipSeverity::Critical
        }
    }

    /// Operational recommendation for this class.
    pub fn recommendation(&self) -> &'static str {
        match self {
            StickSlipSeverity::Mild => "Continue drilling; monitor surface torque variance",
            StickSlipSeverity::Moderate => {
                "Increase RPM or reduce WOB to break the torsional cycle"
            }
            StickSlipSeverity::Severe => {
                "Reduce WOB immediately and raise RPM; consider a torque limiter"
            }
            StickSlipSeverity::Critical => {
                "Stop drilling: pick up off bottom, restart with low WOB and high RPM"
            }
        }
    }
}

/// Inputs for the stick-slip estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StickSlipInputs {
    pub bha_length_ft: f64,
    pub od_in: f64,
    pub id_in: f64,
    pub weight_per_ft: f64,
    pub wob_klb: f64,
    pub rpm: f64,
    pub bit_diameter_in: f64,
    /// Bit-formation friction coefficient (typically ~0.3).
    pub friction_coefficient: f64,
}

/// Stick-slip estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StickSlipResult {
    /// Angular-velocity fluctuation Δω (rad/s).
    pub delta_omega_rad_s: f64,
    /// Severity ratio Δω / ω_avg.
    pub severity: f64,
    pub classification: StickSlipSeverity,
    /// First torsional natural frequency of the string (Hz).
    pub torsional_frequency_hz: f64,
    #[serde(skip_deserializing)]
    pub recommendation: &'static str,
}

/// Estimate stick-slip severity from bit friction torque and the string's
/// torsional stiffness.
///
/// Friction torque T = (2/3)·μ·WOB·r_bit (flat-bit contact), torsional
/// stiffness k = G·J/L, polar inertia from the distributed mass, and the
/// stuck-release velocity swing Δω = T / √(k·I).
pub fn critical_rpm_stick_slip(inputs: &StickSlipInputs) -> DynamicsResult<StickSlipResult> {
    require_positive_geometry("bha_length_ft", inputs.bha_length_ft)?;
    require_positive_geometry("od_in", inputs.od_in)?;
    require_positive_geometry("bit_diameter_in", inputs.bit_diameter_in)?;
    require_positive_geometry("weight_per_ft", inputs.weight_per_ft)?;
    require_positive("rpm", inputs.rpm)?;
    require_positive("friction_coefficient", inputs.friction_coefficient)?;
    if inputs.wob_klb < 0.0 {
        return Err(DynamicsError::invalid_operating_parameter(
            "wob_klb",
            inputs.wob_klb,
            "weight on bit cannot be negative",
        ));
    }
    if inputs.id_in < 0.0 || inputs.id_in >= inputs.od_in {
        return Err(DynamicsError::invalid_geometry(
            "id_in",
            inputs.id_in,
            "inner diameter must be non-negative and smaller than OD",
        ));
    }

    let l_in = inputs.bha_length_ft * 12.0;
    let j_section = polar_moment_annulus(inputs.od_in, inputs.id_in);
    let torsional_stiffness = G_STEEL_PSI * j_section / l_in; // lbf·in/rad

    // Distributed polar mass inertia of the annular string.
    let mass_per_in = inputs.weight_per_ft / 12.0 / GRAVITY_IN_S2;
    let r_o = inputs.od_in / 2.0;
    let r_i = inputs.id_in / 2.0;
    let polar_inertia = mass_per_in * (r_o * r_o + r_i * r_i) / 2.0 * l_in; // lbf·in·s²

    let friction_torque = (2.0 / 3.0)
        * inputs.friction_coefficient
        * (inputs.wob_klb * 1000.0)
        * (inputs.bit_diameter_in / 2.0); // lbf·in

    let omega_n = (torsional_stiffness / polar_inertia).sqrt();
    let delta_omega_rad_s = friction_torque / (torsional_stiffness * polar_inertia).sqrt();
    let omega_avg = 2.0 * std::f64::consts::PI * inputs.rpm / 60.0;
    let severity = delta_omega_rad_s / omega_avg;
    let classification = StickSlipSeverity::classify(severity);

    Ok(StickSlipResult {
        delta_omega_rad_s,
        severity,
        classification,
        torsional_frequency_hz: omega_n / (2.0 * std::f64::consts::PI),
        recommendation: classification.recommendation(),
    })
}

// ============================================================================
// Mechanical specific energy (Teale)
// ============================================================================

/// Drilling efficiency classes by MSE level (psi).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MseEfficiency {
    Efficient,
    Normal,
    Inefficient,
    HighlyInefficient,
}

impl MseEfficiency {
    /// Classify an MSE value (psi) by the fixed 20000/50000/100000 thresholds.
    pub fn classify(mse_psi: f64) -> Self {
        if mse_psi < 20_000.0 {
            MseEfficiency::Efficient
        } else if mse_psi < 50_000.0 {
            MseEfficiency::Normal
        } else if mse_psi < 100_000.0 {
            MseEfficiency::Inefficient
        } else {
            MseEfficiency::HighlyInefficient
        }
    }
}

/// Inputs for the Teale MSE estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MseInputs {
    /// Surface torque (kft·lb).
    pub torque_kft_lb: f64,
    pub rpm: f64,
    pub bit_diameter_in: f64,
    /// Rate of penetration (ft/hr).
    pub rop_ft_hr: f64,
    pub wob_klb: f64,
    /// Confined compressive strength of the formation (psi).
    pub ccs_psi: f64,
}

/// MSE estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MseResult {
    /// Total mechanical specific energy (psi).
    pub mse_psi: f64,
    /// Rotary term 480·T·RPM/(D²·ROP) (psi).
    pub rotary_psi: f64,
    /// Thrust term 4·WOB/(π·D²) (psi).
    pub thrust_psi: f64,
    pub efficiency: MseEfficiency,
    /// True when MSE exceeds [`FOUNDER_CCS_MULTIPLE`] × the CCS baseline.
    pub founder: bool,
    pub founder_threshold_psi: f64,
}

/// Mechanical specific energy per Teale.
///
/// MSE = (480·T·RPM) / (D²·ROP) + (4·WOB) / (π·D²), torque in kft·lb and WOB
/// in klb converted internally, result in psi.
pub fn mechanical_specific_energy(inputs: &MseInputs) -> DynamicsResult<MseResult> {
    require_positive_geometry("bit_diameter_in", inputs.bit_diameter_in)?;
    require_positive("rpm", inputs.rpm)?;
    require_positive("rop_ft_hr", inputs.rop_ft_hr)?;
    if inputs.wob_klb < 0.0 {
        return Err(DynamicsError::invalid_operating_parameter(
            "wob_klb",
            inputs.wob_klb,
            "weight on bit cannot be negative",
        ));
    }
    if inputs.torque_kft_lb < 0.0 {
        return Err(DynamicsError::invalid_operating_parameter(
            "torque_kft_lb",
            inputs.torque_kft_lb,
            "torque cannot be negative",
        ));
    }

    let d_squared = inputs.bit_diameter_in * inputs.bit_diameter_in;
    let rotary_psi = 480.0 * inputs.torque_kft_lb * inputs.rpm / (d_squared * inputs.rop_ft_hr);
    let thrust_psi = 4.0 * inputs.wob_klb * 1000.0 / (std::f64::consts::PI * d_squared);
    let mse_psi = rotary_psi + thrust_psi;

    let founder_threshold_psi = FOUNDER_CCS_MULTIPLE * inputs.ccs_psi.max(MIN_CCS_PSI);

    Ok(MseResult {
        mse_psi,
        rotary_psi,
        thrust_psi,
        efficiency: MseEfficiency::classify(mse_psi),
        founder: mse_psi > founder_threshold_psi,
        founder_threshold_psi,
    })
}

//! Weighted vibration stability index and RPM × WOB operating map.
//!
//! Combines the four closed-form estimators into a single 0–100 stability
//! score per operating point. Higher is calmer. The torsional term carries the
//! largest weight because stick-slip is the dominant field failure mode for
//! rotary BHAs, followed by lateral whirl.

use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::estimators::{
    critical_rpm_axial, critical_rpm_lateral, critical_rpm_stick_slip, mechanical_specific_energy,
    AxialResult, LateralInputs, LateralResult, MseEfficiency, MseInputs, MseResult,
    StickSlipInputs, StickSlipResult, StickSlipSeverity, DEFAULT_BIT_FRICTION, DEFAULT_CCS_PSI,
};
use crate::types::{BhaComponent, DynamicsError, DynamicsResult};

/// Index weights for the four vibration mechanisms.
pub const AXIAL_WEIGHT: f64 = 0.20;
pub const LATERAL_WEIGHT: f64 = 0.30;
pub const TORSIONAL_WEIGHT: f64 = 0.35;
pub const MSE_WEIGHT: f64 = 0.15;

/// Score ceiling applied when MSE flags a founder point.
const FOUNDER_SCORE_CAP: f64 = 30.0;

/// Lumped BHA geometry for the closed-form estimators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BhaGeometry {
    pub length_ft: f64,
    pub od_in: f64,
    pub id_in: f64,
    /// Air weight per foot (lb/ft).
    pub weight_per_ft: f64,
    pub bit_diameter_in: f64,
}

impl BhaGeometry {
    /// Collapse a component list to an equivalent uniform string: total
    /// length, length-weighted section properties.
    pub fn from_components(
        components: &[BhaComponent],
        bit_diameter_in: f64,
    ) -> DynamicsResult<Self> {
        if components.is_empty() {
            return Err(DynamicsError::invalid_geometry(
                "components",
                0.0,
                "at least one BHA component is required",
            ));
        }
        for (idx, c) in components.iter().enumerate() {
            c.validate(idx)?;
        }

        let length_ft: f64 = components.iter().map(|c| c.length_ft).sum();
        let weighted = |f: fn(&BhaComponent) -> f64| -> f64 {
            components.iter().map(|c| f(c) * c.length_ft).sum::<f64>() / length_ft
        };

        Ok(BhaGeometry {
            length_ft,
            od_in: weighted(|c| c.od_in),
            id_in: weighted(|c| c.id_in),
            weight_per_ft: weighted(|c| c.weight_per_ft),
            bit_diameter_in,
        })
    }
}

/// Operating environment shared across the map cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatingConfig {
    pub mud_weight_ppg: f64,
    pub rop_ft_hr: f64,
    pub friction_coefficient: f64,
    pub ccs_psi: f64,
    pub radial_clearance_in: f64,
    pub inclination_deg: f64,
}

impl Default for OperatingConfig {
    fn default() -> Self {
        OperatingConfig {
            mud_weight_ppg: 10.0,
            rop_ft_hr: 60.0,
            friction_coefficient: DEFAULT_BIT_FRICTION,
            ccs_psi: DEFAULT_CCS_PSI,
            radial_clearance_in: 1.0,
            inclination_deg: 0.0,
        }
    }
}

/// Overall verdict for one operating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VibrationStatus {
    Stable,
    Marginal,
    Unstable,
    Critical,
}

impl VibrationStatus {
    /// Status bands for the weighted index. Boundaries belong to the better
    /// band (an index of exactly 80 is Stable).
    pub fn from_index(index: f64) -> Self {
        if index >= 80.0 {
            VibrationStatus::Stable
        } else if index >= 60.0 {
            VibrationStatus::Marginal
        } else if index >= 40.0 {
            VibrationStatus::Unstable
        } else {
            VibrationStatus::Critical
        }
    }
}

/// Full stability breakdown for one RPM / WOB operating point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StabilityAssessment {
    /// Weighted 0–100 index; higher is calmer.
    pub index: f64,
    pub status: VibrationStatus,
    pub axial_score: f64,
    pub lateral_score: f64,
    pub torsional_score: f64,
    pub mse_score: f64,
    pub axial: AxialResult,
    pub lateral: LateralResult,
    pub stick_slip: StickSlipResult,
    pub mse: MseResult,
}

/// Score axial bit-bounce exposure from proximity to the nearest resonant
/// harmonic. `p` is the relative distance |RPM − crit| / crit.
fn axial_score(rpm: f64, axial: &AxialResult) -> f64 {
    let p = axial
        .critical_rpms
        .iter()
        .map(|&crit| (rpm - crit).abs() / crit)
        .fold(f64::INFINITY, f64::min);
    if p < 0.05 {
        20.0
    } else if p < 0.10 {
        40.0
    } else if p < 0.20 {
        70.0
    } else {
        95.0
    }
}

/// Score lateral whirl exposure from the speed ratio against the first
/// lateral critical, derated by the clearance/inclination severity factor.
fn lateral_score(rpm: f64, lateral: &LateralResult) -> f64 {
    let ratio = rpm / lateral.critical_rpm;
    let base = if (ratio - 1.0).abs() < 0.1 {
        15.0
    } else if (ratio - 1.0).abs() < 0.2 {
        45.0
    } else if ratio < 0.8 {
        90.0
    } else {
        55.0
    };
    (base / lateral.severity_factor).max(5.0)
}

fn torsional_score(stick_slip: &StickSlipResult) -> f64 {
    match stick_slip.classification {
        StickSlipSeverity::Mild => 90.0,
        StickSlipSeverity::Moderate => 65.0,
        StickSlipSeverity::Severe => 40.0,
        StickSlipSeverity::Critical => 15.0,
    }
}

fn mse_score(mse: &MseResult) -> f64 {
    let base: f64 = match mse.efficiency {
        MseEfficiency::Efficient => 95.0,
        MseEfficiency::Normal => 70.0,
        MseEfficiency::Inefficient => 45.0,
        MseEfficiency::HighlyInefficient => 20.0,
    };
    if mse.founder {
        base.min(FOUNDER_SCORE_CAP)
    } else {
        base
    }
}

/// Evaluate the weighted stability index at one RPM / WOB operating point.
///
/// Surface torque for the MSE term is derived from the same bit friction
/// model the stick-slip estimate uses, T = (2/3)·μ·WOB·r_bit.
pub fn stability_index(
    geometry: &BhaGeometry,
    rpm: f64,
    wob_klb: f64,
    config: &OperatingConfig,
) -> DynamicsResult<StabilityAssessment> {
    let axial = critical_rpm_axial(geometry.length_ft)?;

    let lateral = critical_rpm_lateral(&LateralInputs {
        bha_length_ft: geometry.length_ft,
        od_in: geometry.od_in,
        id_in: geometry.id_in,
        weight_per_ft: geometry.weight_per_ft,
        mud_weight_ppg: config.mud_weight_ppg,
        operating_rpm: rpm,
        radial_clearance_in: config.radial_clearance_in,
        inclination_deg: config.inclination_deg,
    })?;

    let stick_slip = critical_rpm_stick_slip(&StickSlipInputs {
        bha_length_ft: geometry.length_ft,
        od_in: geometry.od_in,
        id_in: geometry.id_in,
        weight_per_ft: geometry.weight_per_ft,
        wob_klb,
        rpm,
        bit_diameter_in: geometry.bit_diameter_in,
        friction_coefficient: config.friction_coefficient,
    })?;

    let friction_torque_lbf_in = (2.0 / 3.0)
        * config.friction_coefficient
        * (wob_klb * 1000.0)
        * (geometry.bit_diameter_in / 2.0);
    let mse = mechanical_specific_energy(&MseInputs {
        torque_kft_lb: friction_torque_lbf_in / 12_000.0,
        rpm,
        bit_diameter_in: geometry.bit_diameter_in,
        rop_ft_hr: config.rop_ft_hr,
        wob_klb,
        ccs_psi: config.ccs_psi,
    })?;

    let axial_score = axial_score(rpm, &axial);
    let lateral_score = lateral_score(rpm, &lateral);
    let torsional_score = torsional_score(&stick_slip);
    let mse_score = mse_score(&mse);

    let index = AXIAL_WEIGHT * axial_score
        + LATERAL_WEIGHT * lateral_score
        + TORSIONAL_WEIGHT * torsional_score
        + MSE_WEIGHT * mse_score;

    Ok(StabilityAssessment {
        index,
        status: VibrationStatus::from_index(index),
        axial_score,
        lateral_score,
        torsional_score,
        mse_score,
        axial,
        lateral,
        stick_slip,
        mse,
    })
}

/// One inclusive linearly spaced sweep axis of the operating map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapAxis {
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl MapAxis {
    fn validate(&self, field: &str) -> DynamicsResult<()> {
        if self.count < 2 || self.max <= self.min || self.min <= 0.0 {
            return Err(DynamicsError::invalid_operating_parameter(
                field,
                self.min,
                "axis needs a positive start, a larger end, and at least two points",
            ));
        }
        Ok(())
    }

    fn values(&self) -> Vec<f64> {
        let step = (self.max - self.min) / (self.count - 1) as f64;
        (0..self.count).map(|i| self.min + i as f64 * step).collect()
    }
}

/// Default sweep: 60–200 RPM in 8 points by 5–45 klb WOB in 9 points.
pub const DEFAULT_RPM_AXIS: MapAxis = MapAxis {
    min: 60.0,
    max: 200.0,
    count: 8,
};
pub const DEFAULT_WOB_AXIS: MapAxis = MapAxis {
    min: 5.0,
    max: 45.0,
    count: 9,
};

/// One evaluated operating point of the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapCell {
    pub rpm: f64,
    pub wob_klb: f64,
    pub index: f64,
    pub status: VibrationStatus,
}

/// Stability index over an RPM × WOB grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatingMap {
    pub rpm_values: Vec<f64>,
    pub wob_values: Vec<f64>,
    /// Row-major cells: all WOB values for the first RPM, then the next RPM.
    pub cells: Vec<MapCell>,
    /// Highest-index cell, if any cell evaluated successfully.
    pub optimal: Option<MapCell>,
}

/// Sweep the stability index over an operating window.
///
/// Pass `None` for either axis to take the default grid. Cells whose
/// evaluation fails are logged and skipped rather than failing the sweep.
pub fn vibration_map(
    geometry: &BhaGeometry,
    config: &OperatingConfig,
    rpm_axis: Option<MapAxis>,
    wob_axis: Option<MapAxis>,
) -> DynamicsResult<OperatingMap> {
    let rpm_axis = rpm_axis.unwrap_or(DEFAULT_RPM_AXIS);
    let wob_axis = wob_axis.unwrap_or(DEFAULT_WOB_AXIS);
    rpm_axis.validate("rpm_axis")?;
    wob_axis.validate("wob_axis")?;

    let rpm_values = rpm_axis.values();
    let wob_values = wob_axis.values();

    let points: Vec<(f64, f64)> = rpm_values
        .iter()
        .flat_map(|&rpm| wob_values.iter().map(move |&wob| (rpm, wob)))
        .collect();

    let evaluate = |&(rpm, wob): &(f64, f64)| -> Option<MapCell> {
        match stability_index(geometry, rpm, wob, config) {
            Ok(assessment) => Some(MapCell {
                rpm,
                wob_klb: wob,
                index: assessment.index,
                status: assessment.status,
            }),
            Err(err) => {
                tracing::debug!(rpm, wob_klb = wob, error = %err, "skipping map cell");
                None
            }
        }
    };

    #[cfg(feature = "parallel")]
    let cells: Vec<MapCell> = points.par_iter().filter_map(evaluate).collect();
    #[cfg(not(feature = "parallel"))]
    let cells: Vec<MapCell> = points.iter().filter_map(evaluate).collect();

    let optimal = cells
        .iter()
        .copied()
        .max_by(|a, b| a.index.total_cmp(&b.index));

    Ok(OperatingMap {
        rpm_values,
        wob_values,
        cells,
        optimal,
    })
}

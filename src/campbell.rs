//! Campbell (frequency–speed interaction) diagram generation.
//!
//! Sweeps rotary speed over a caller-specified range and overlays the lateral
//! natural-frequency curves with excitation-order lines at `order × RPM / 60`.
//! RPM values where an order line meets a mode curve are candidate resonance
//! speeds to avoid.
//!
//! No gyroscopic or rotational stiffening term is modeled, so natural
//! frequencies are independent of RPM: the modal solve runs once and its
//! result is replicated across the sweep. This is a known simplification of
//! the planar lateral model.

use serde::{Deserialize, Serialize};

use crate::assembly::assemble;
use crate::modal::solve_modes;
use crate::types::{BhaComponent, BoundaryCondition, DynamicsError, DynamicsResult};

/// Excitation orders always present in the diagram (1x, 2x, 3x rotary).
pub const BASE_EXCITATION_ORDERS: [f64; 3] = [1.0, 2.0, 3.0];

/// Rotary-speed sweep request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RpmRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl RpmRange {
    fn validate(&self) -> DynamicsResult<()> {
        if self.min < 0.0 {
            return Err(DynamicsError::invalid_operating_parameter(
                "rpm_range.min",
                self.min,
                "sweep start must be non-negative",
            ));
        }
        if self.max <= self.min {
            return Err(DynamicsError::invalid_operating_parameter(
                "rpm_range.max",
                self.max,
                "sweep end must exceed sweep start",
            ));
        }
        if self.step <= 0.0 {
            return Err(DynamicsError::invalid_operating_parameter(
                "rpm_range.step",
                self.step,
                "sweep step must be positive",
            ));
        }
        Ok(())
    }

    /// Sweep values from min to max inclusive. The first and last entries are
    /// exactly the requested bounds even when the step does not divide the
    /// span evenly.
    fn values(&self) -> Vec<f64> {
        let mut values = Vec::new();
        let mut rpm = self.min;
        while rpm < self.max - 1e-9 {
            values.push(rpm);
            rpm += self.step;
        }
        values.push(self.max);
        values
    }
}

/// One excitation-order line sampled over the sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExcitationLine {
    /// Multiple of rotary speed (1x, 2x, ...).
    pub order: f64,
    /// Line frequency (Hz) at each sweep RPM: order × RPM / 60.
    pub frequencies_hz: Vec<f64>,
}

/// An RPM at which a mode curve meets an excitation-order line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResonanceCrossing {
    pub mode_index: usize,
    pub order: f64,
    /// Candidate resonance speed (RPM), interpolated between sweep points.
    pub rpm: f64,
    /// Frequency (Hz) at the crossing.
    pub frequency_hz: f64,
}

/// Full interaction diagram for one BHA and load case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampbellDiagram {
    pub rpm_values: Vec<f64>,
    /// One frequency curve (Hz vs RPM) per retained mode.
    pub frequency_curves: Vec<Vec<f64>>,
    pub excitation_lines: Vec<ExcitationLine>,
    pub crossings: Vec<ResonanceCrossing>,
}

/// Generate a Campbell diagram for the given BHA and operating window.
///
/// `hole_diameter_in` is checked against the largest component OD; the sweep
/// itself has no contact model, so the value participates only in that
/// geometry sanity check. `extra_orders` are appended to the standard 1x/2x/3x
/// lines.
pub fn campbell(
    components: &[BhaComponent],
    wob_klb: f64,
    mud_weight_ppg: f64,
    hole_diameter_in: f64,
    boundary_condition: BoundaryCondition,
    rpm_range: RpmRange,
    n_modes: usize,
    extra_orders: &[f64],
) -> DynamicsResult<CampbellDiagram> {
    rpm_range.validate()?;

    let max_od = components.iter().fold(0.0_f64, |acc, c| acc.max(c.od_in));
    if hole_diameter_in <= max_od {
        return Err(DynamicsError::invalid_geometry(
            "hole_diameter_in",
            hole_diameter_in,
            format!("hole must clear the largest component OD ({max_od} in)"),
        ));
    }

    let system = assemble(components, mud_weight_ppg, wob_klb, &[])?;
    let modal = solve_modes(&system, boundary_condition, n_modes)?;

    let rpm_values = rpm_range.values();
    let n_points = rpm_values.len();

    // Frequencies are RPM-independent here; replicate the static solve.
    let frequency_curves: Vec<Vec<f64>> = modal
        .modes
        .iter()
        .map(|m| vec![m.frequency_hz; n_points])
        .collect();

    let mut orders: Vec<f64> = BASE_EXCITATION_ORDERS.to_vec();
    for &o in extra_orders {
        if o > 0.0 && !orders.iter().any(|&b| (b - o).abs() < 1e-9) {
            orders.push(o);
        }
    }

    let excitation_lines: Vec<ExcitationLine> = orders
        .iter()
        .map(|&order| ExcitationLine {
            order,
            frequencies_hz: rpm_values.iter().map(|&rpm| order * rpm / 60.0).collect(),
        })
        .collect();

    let mut crossings = Vec::new();
    for (mode_index, mode) in modal.modes.iter().enumerate() {
        let f = mode.frequency_hz;
        if f <= 0.0 {
            continue;
        }
        for &order in &orders {
            // Signed distance between the order line and the mode curve.
            let d = |rpm: f64| order * rpm / 60.0 - f;
            for i in 0..n_points {
                let d1 = d(rpm_values[i]);
                if d1 == 0.0 {
                    crossings.push(ResonanceCrossing {
                        mode_index,
                        order,
                        rpm: rpm_values[i],
                        frequency_hz: f,
                    });
                } else if i + 1 < n_points {
                    let d2 = d(rpm_values[i + 1]);
                    if d1 * d2 < 0.0 {
                        let t = d1 / (d1 - d2);
                        let rpm = rpm_values[i] + t * (rpm_values[i + 1] - rpm_values[i]);
                        crossings.push(ResonanceCrossing {
                            mode_index,
                            order,
                            rpm,
                            frequency_hz: f,
                        });
                    }
                }
            }
        }
    }

    Ok(CampbellDiagram {
        rpm_values,
        frequency_curves,
        excitation_lines,
        crossings,
    })
}

//! Steady-state harmonic forced response by modal superposition.
//!
//! A single sinusoidal point force is applied at one node's deflection DOF
//! and the per-node displacement amplitude is accumulated over the retained
//! modes with Rayleigh (proportional) damping. Mode shapes coming out of the
//! modal solver are mass-normalized, so the modal participation factor is
//! simply φᵢ(excitation DOF)·F.

use serde::{Deserialize, Serialize};

use crate::assembly::GlobalSystem;
use crate::modal::solve_reduced;
use crate::types::{
    BoundaryCondition, DynamicsError, DynamicsResult, DOF_PER_NODE, RAYLEIGH_TARGET_ZETA,
};

/// A harmonic point excitation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Excitation {
    /// Node index where the lateral force acts.
    pub node: usize,
    /// Drive frequency (Hz).
    pub frequency_hz: f64,
    /// Force magnitude (lbf).
    pub force_lbf: f64,
}

/// Per-node steady-state amplitude under a harmonic point force.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForcedResponse {
    /// Lateral displacement amplitude per node (in). Constrained nodes are 0.
    pub node_amplitudes_in: Vec<f64>,
    /// Maximum amplitude across all nodes (in).
    pub max_amplitude_in: f64,
}

/// Rayleigh damping coefficients anchored so the first two retained modes see
/// [`RAYLEIGH_TARGET_ZETA`]. With a single usable mode the ratio is constant.
fn rayleigh_coefficients(omegas: &[f64]) -> (f64, f64) {
    let zeta = RAYLEIGH_TARGET_ZETA;
    match omegas {
        [w1, w2, ..] if *w2 > *w1 => {
            let alpha = 2.0 * zeta * w1 * w2 / (w1 + w2);
            let beta = 2.0 * zeta / (w1 + w2);
            (alpha, beta)
        }
        _ => (0.0, 0.0),
    }
}

fn damping_ratio(alpha: f64, beta: f64, omega: f64) -> f64 {
    if alpha == 0.0 && beta == 0.0 {
        RAYLEIGH_TARGET_ZETA
    } else {
        0.5 * (alpha / omega + beta * omega)
    }
}

/// Compute the steady-state harmonic response of the constrained system.
///
/// Superposes the lowest `n_modes` eigenpairs; modes whose eigenvalue is
/// non-positive (buckled or rigid) carry no resonant response and are skipped.
pub fn forced_response(
    system: &GlobalSystem,
    boundary_condition: BoundaryCondition,
    excitation: &Excitation,
    n_modes: usize,
) -> DynamicsResult<ForcedResponse> {
    let num_nodes = system.num_nodes();
    if excitation.node >= num_nodes {
        return Err(DynamicsError::invalid_geometry(
            "excitation.node",
            excitation.node as f64,
            format!("node index out of range (model has {num_nodes} nodes)"),
        ));
    }
    if excitation.frequency_hz <= 0.0 {
        return Err(DynamicsError::invalid_operating_parameter(
            "excitation.frequency_hz",
            excitation.frequency_hz,
            "drive frequency must be positive",
        ));
    }
    if !excitation.force_lbf.is_finite() {
        return Err(DynamicsError::invalid_operating_parameter(
            "excitation.force_lbf",
            excitation.force_lbf,
            "force must be finite",
        ));
    }

    let reduced = solve_reduced(system, boundary_condition, n_modes)?;
    let omega = 2.0 * std::f64::consts::PI * excitation.frequency_hz;
    let exc_dof = DOF_PER_NODE * excitation.node;

    let omegas: Vec<f64> = reduced
        .lambdas
        .iter()
        .filter(|&&l| l > 0.0)
        .map(|l| l.sqrt())
        .collect();
    let (alpha, beta) = rayleigh_coefficients(&omegas);

    let num_dofs = system.num_dofs();
    let mut real = vec![0.0_f64; num_dofs];
    let mut imag = vec![0.0_f64; num_dofs];

    for (lambda, phi) in reduced.lambdas.iter().zip(reduced.shapes.iter()) {
        if *lambda <= 0.0 {
            continue;
        }
        let omega_i = lambda.sqrt();
        let zeta_i = damping_ratio(alpha, beta, omega_i);
        let participation = phi[exc_dof] * excitation.force_lbf;

        let dr = omega_i * omega_i - omega * omega;
        let di = 2.0 * zeta_i * omega_i * omega;
        let denom = dr * dr + di * di;
        if denom == 0.0 {
            continue;
        }

        for dof in 0..num_dofs {
            let modal = phi[dof] * participation;
            real[dof] += modal * dr / denom;
            imag[dof] -= modal * di / denom;
        }
    }

    let node_amplitudes_in: Vec<f64> = (0..num_nodes)
        .map(|n| {
            let dof = DOF_PER_NODE * n;
            (real[dof] * real[dof] + imag[dof] * imag[dof]).sqrt()
        })
        .collect();
    let max_amplitude_in = node_amplitudes_in
        .iter()
        .fold(0.0_f64, |acc, v| acc.max(*v));

    Ok(ForcedResponse {
        node_amplitudes_in,
        max_amplitude_in,
    })
}

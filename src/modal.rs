//! Modal analysis: boundary-condition elimination and generalized eigensolve.
//!
//! Solves `(K − Kg)·φ = ω²·M·φ` on the free DOFs only. Constrained DOFs are
//! physically removed from the system (matrix reduction), then the problem is
//! transformed to standard symmetric form through a Cholesky factorization of
//! the mass matrix and handed to a dense symmetric eigensolver. Eigenvectors
//! recovered through the transform are mass-normalized (φᵀMφ = 1), which the
//! forced-response solver relies on.

use nalgebra::linalg::SymmetricEigen;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assembly::GlobalSystem;
use crate::types::{
    BoundaryCondition, DynamicsError, DynamicsResult, DOF_PER_NODE, SHAPE_NORMALIZATION_TOL,
};

/// One natural mode of the constrained system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mode {
    /// Natural frequency (Hz); non-positive eigenvalues are reported as 0.0.
    pub frequency_hz: f64,
    /// Equivalent critical rotary speed (RPM): frequency × 60.
    pub critical_rpm: f64,
    /// Lateral deflection per node, normalized to unit peak absolute value.
    /// Constrained nodes are exactly zero.
    pub shape: Vec<f64>,
}

/// Result of a modal solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModalResult {
    pub modes: Vec<Mode>,
    /// Node positions (ft) carried through for plotting against shapes.
    pub node_positions_ft: Vec<f64>,
}

/// Mass-normalized eigenpairs on the full DOF set, for internal reuse by the
/// forced-response solver.
#[derive(Debug, Clone)]
pub(crate) struct ReducedModes {
    /// Eigenvalues λ = ω² in ascending order (may be ≤ 0 under heavy load).
    pub lambdas: Vec<f64>,
    /// Mass-normalized eigenvectors scattered to the full DOF set
    /// (constrained DOFs = 0), one column per retained mode.
    pub shapes: Vec<DVector<f64>>,
}

/// Remove constrained DOFs from a pair of matrices.
///
/// Returns the reduced matrices and the surviving global DOF indices.
fn reduce_matrices(
    a: &DMatrix<f64>,
    m: &DMatrix<f64>,
    constrained_dofs: &[usize],
) -> (DMatrix<f64>, DMatrix<f64>, Vec<usize>) {
    let n = a.nrows();
    let free_dofs: Vec<usize> = (0..n)
        .filter(|dof| !constrained_dofs.contains(dof))
        .collect();

    let n_free = free_dofs.len();
    let mut a_red = DMatrix::<f64>::zeros(n_free, n_free);
    let mut m_red = DMatrix::<f64>::zeros(n_free, n_free);

    for (i, &gi) in free_dofs.iter().enumerate() {
        for (j, &gj) in free_dofs.iter().enumerate() {
            a_red[(i, j)] = a[(gi, gj)];
            m_red[(i, j)] = m[(gi, gj)];
        }
    }

    (a_red, m_red, free_dofs)
}

/// Cholesky factorization of the reduced mass matrix with a regularization
/// fallback for ill-conditioned systems.
fn mass_cholesky(m_red: &DMatrix<f64>) -> DynamicsResult<DMatrix<f64>> {
    let n = m_red.nrows();

    let mut m_reg = m_red.clone();
    for i in 0..n {
        m_reg[(i, i)] += 1e-12 * m_red[(i, i)].abs().max(1e-20);
    }

    let chol = match m_reg.clone().cholesky() {
        Some(c) => c,
        None => {
            debug!(dofs = n, "mass Cholesky failed, retrying with stronger regularization");
            for i in 0..n {
                m_reg[(i, i)] += 1e-8;
            }
            m_reg.cholesky().ok_or_else(|| {
                DynamicsError::degenerate_system(
                    "mass matrix is not positive definite after regularization",
                )
            })?
        }
    };

    chol.l()
        .try_inverse()
        .ok_or_else(|| DynamicsError::degenerate_system("mass Cholesky factor is singular"))
}

/// Solve the reduced generalized eigenproblem and scatter the mass-normalized
/// eigenvectors back to the full DOF set.
pub(crate) fn solve_reduced(
    system: &GlobalSystem,
    boundary_condition: BoundaryCondition,
    n_modes: usize,
) -> DynamicsResult<ReducedModes> {
    let num_dofs = system.num_dofs();
    let constrained = boundary_condition.constrained_dofs(system.num_nodes());

    // Effective stiffness: bending minus axial softening.
    let a = &system.k - &system.kg;
    let (a_red, m_red, free_dofs) = reduce_matrices(&a, &system.m, &constrained);

    if free_dofs.is_empty() {
        return Err(DynamicsError::degenerate_system(
            "no free degrees of freedom after boundary-condition elimination",
        ));
    }

    let l_inv = mass_cholesky(&m_red)?;

    // Standard form: K̃ = L⁻¹ A L⁻ᵀ, symmetrized against round-off.
    let a_tilde = &l_inv * &a_red * l_inv.transpose();
    let a_tilde_sym = (&a_tilde + a_tilde.transpose()) * 0.5;

    let eig = SymmetricEigen::new(a_tilde_sym);
    let eigenvalues = eig.eigenvalues;
    let eigenvectors = eig.eigenvectors;

    let n_free = free_dofs.len();
    let mut indices: Vec<usize> = (0..n_free).collect();
    indices.sort_by(|&a, &b| eigenvalues[a].total_cmp(&eigenvalues[b]));

    let retained = n_modes.min(n_free);
    let mut lambdas = Vec::with_capacity(retained);
    let mut shapes = Vec::with_capacity(retained);

    for &idx in indices.iter().take(retained) {
        lambdas.push(eigenvalues[idx]);

        // Back-transform: φ = L⁻ᵀ·y is mass-normalized since M = L·Lᵀ.
        let phi_red = l_inv.transpose() * eigenvectors.column(idx);
        let mut phi_full = DVector::<f64>::zeros(num_dofs);
        for (i, &gdof) in free_dofs.iter().enumerate() {
            phi_full[gdof] = phi_red[i];
        }
        shapes.push(phi_full);
    }

    Ok(ReducedModes { lambdas, shapes })
}

/// Compute the lowest `n_modes` lateral natural frequencies and mode shapes.
///
/// Frequencies are returned in ascending order; eigenvalues that are
/// non-positive (buckling-softened or numerical noise near zero) are reported
/// as 0.0 Hz rather than NaN. Mode shapes hold one deflection value per node,
/// normalized to unit peak absolute deflection unless the peak is numerically
/// zero.
pub fn solve_modes(
    system: &GlobalSystem,
    boundary_condition: BoundaryCondition,
    n_modes: usize,
) -> DynamicsResult<ModalResult> {
    let reduced = solve_reduced(system, boundary_condition, n_modes)?;
    let num_nodes = system.num_nodes();

    let modes = reduced
        .lambdas
        .iter()
        .zip(reduced.shapes.iter())
        .map(|(&lambda, phi)| {
            let frequency_hz = if lambda > 0.0 {
                lambda.sqrt() / (2.0 * std::f64::consts::PI)
            } else {
                0.0
            };

            let mut shape: Vec<f64> =
                (0..num_nodes).map(|n| phi[DOF_PER_NODE * n]).collect();
            let peak = shape.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
            if peak > SHAPE_NORMALIZATION_TOL {
                for v in &mut shape {
                    *v /= peak;
                }
            }

            Mode {
                frequency_hz,
                critical_rpm: frequency_hz * 60.0,
                shape,
            }
        })
        .collect();

    Ok(ModalResult {
        modes,
        node_positions_ft: system.node_positions_ft.clone(),
    })
}

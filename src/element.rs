//! Euler–Bernoulli beam element for planar lateral BHA vibration.
//!
//! Each BHA component becomes one 2-node element with 2 DOF per node:
//! - w: lateral deflection (in)
//! - θ: rotation (rad)
//!
//! ## Element DOF ordering
//! ```text
//! Node 1: [w1, θ1]
//! Node 2: [w2, θ2]
//! Element DOFs: [w1, θ1, w2, θ2]
//! ```
//!
//! Three matrices are produced per element:
//! - Ke: cubic-shape-function bending stiffness
//! - Kge: geometric (stress) stiffness under axial compression, which softens
//!   the element and drives the WOB-dependent drop in natural frequencies
//! - Me: consistent mass from the buoyed weight per foot
//!
//! Units are inch-pound-second throughout: EI in lbf·in², axial load in lbf,
//! mass per length in lbf·s²/in².

use nalgebra::SMatrix;

use crate::types::{BhaComponent, DynamicsError, DynamicsResult, E_STEEL_PSI, GRAVITY_IN_S2, ZERO_LOAD_TOL};

/// 4×4 element matrix.
pub type ElementMatrix = SMatrix<f64, 4, 4>;

/// Second moment of area for an annular cross-section (in⁴).
///
/// I = π/64 · (OD⁴ − ID⁴)
#[inline]
pub fn second_moment_annulus(od_in: f64, id_in: f64) -> f64 {
    std::f64::consts::PI / 64.0 * (od_in.powi(4) - id_in.powi(4))
}

/// Polar second moment of area for an annular cross-section (in⁴).
///
/// J = π/32 · (OD⁴ − ID⁴)
#[inline]
pub fn polar_moment_annulus(od_in: f64, id_in: f64) -> f64 {
    std::f64::consts::PI / 32.0 * (od_in.powi(4) - id_in.powi(4))
}

/// Validated per-element properties in consistent inch units.
#[derive(Debug, Clone, Copy)]
pub struct ElementProperties {
    /// Element length (in).
    pub length_in: f64,
    /// Bending stiffness EI (lbf·in²).
    pub ei: f64,
    /// Mass per unit length (lbf·s²/in²), formed from the buoyed weight.
    pub mass_per_in: f64,
    /// Axial compressive load (lbf).
    pub axial_load_lbf: f64,
}

impl ElementProperties {
    /// Build element properties from a component, applying the buoyancy
    /// factor to the distributed weight and converting to inch units.
    pub fn from_component(
        component: &BhaComponent,
        index: usize,
        buoyancy: f64,
        axial_load_lbf: f64,
    ) -> DynamicsResult<Self> {
        component.validate(index)?;

        let i = second_moment_annulus(component.od_in, component.id_in);
        if i <= 0.0 {
            return Err(DynamicsError::degenerate_system(format!(
                "components[{index}] has zero moment of inertia"
            )));
        }

        // lb/ft → lbf/in → (lbf·s²/in²)
        let buoyed_weight_per_in = buoyancy * component.weight_per_ft / 12.0;
        Ok(Self {
            length_in: component.length_ft * 12.0,
            ei: E_STEEL_PSI * i,
            mass_per_in: buoyed_weight_per_in / GRAVITY_IN_S2,
            axial_load_lbf,
        })
    }

    /// Element bending stiffness matrix Ke (4×4).
    ///
    /// Standard Euler–Bernoulli closed form; Ke[0,0] = 12·EI/L³.
    pub fn stiffness(&self) -> ElementMatrix {
        let l = self.length_in;
        let c = self.ei / (l * l * l);

        #[rustfmt::skip]
        let ke = ElementMatrix::from_row_slice(&[
            //  w1           θ1              w2           θ2
            c * 12.0,      c * 6.0 * l,    c * -12.0,    c * 6.0 * l,
            c * 6.0 * l,   c * 4.0 * l * l, c * -6.0 * l, c * 2.0 * l * l,
            c * -12.0,     c * -6.0 * l,   c * 12.0,     c * -6.0 * l,
            c * 6.0 * l,   c * 2.0 * l * l, c * -6.0 * l, c * 4.0 * l * l,
        ]);

        ke
    }

    /// Element geometric (stress) stiffness matrix Kge (4×4).
    ///
    /// Consistent formulation, linear in the axial compressive load P and
    /// proportional to 1/L. Identically zero when |P| < [`ZERO_LOAD_TOL`].
    pub fn geometric_stiffness(&self) -> ElementMatrix {
        let p = self.axial_load_lbf;
        if p.abs() < ZERO_LOAD_TOL {
            return ElementMatrix::zeros();
        }

        let l = self.length_in;
        let c = p / (30.0 * l);

        #[rustfmt::skip]
        let kge = ElementMatrix::from_row_slice(&[
            //  w1           θ1              w2           θ2
            c * 36.0,      c * 3.0 * l,     c * -36.0,    c * 3.0 * l,
            c * 3.0 * l,   c * 4.0 * l * l,  c * -3.0 * l, c * -l * l,
            c * -36.0,     c * -3.0 * l,    c * 36.0,     c * -3.0 * l,
            c * 3.0 * l,   c * -l * l,      c * -3.0 * l, c * 4.0 * l * l,
        ]);

        kge
    }

    /// Element consistent mass matrix Me (4×4).
    ///
    /// Me[0,0] = 156·ρA·L/420.
    pub fn mass(&self) -> ElementMatrix {
        let l = self.length_in;
        let c = self.mass_per_in * l / 420.0;

        #[rustfmt::skip]
        let me = ElementMatrix::from_row_slice(&[
            //  w1             θ1                w2             θ2
            c * 156.0,       c * 22.0 * l,     c * 54.0,      c * -13.0 * l,
            c * 22.0 * l,    c * 4.0 * l * l,   c * 13.0 * l,  c * -3.0 * l * l,
            c * 54.0,        c * 13.0 * l,     c * 156.0,     c * -22.0 * l,
            c * -13.0 * l,   c * -3.0 * l * l,  c * -22.0 * l, c * 4.0 * l * l,
        ]);

        me
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ComponentKind;

    const TOL: f64 = 1e-10;

    fn collar() -> BhaComponent {
        BhaComponent {
            od_in: 6.75,
            id_in: 2.813,
            length_ft: 30.0,
            weight_per_ft: 83.0,
            kind: ComponentKind::DrillCollar,
        }
    }

    fn props(axial_load_lbf: f64) -> ElementProperties {
        ElementProperties::from_component(&collar(), 0, 1.0, axial_load_lbf).unwrap()
    }

    fn assert_symmetric(m: &ElementMatrix, name: &str) {
        for row in 0..4 {
            for col in 0..4 {
                assert!(
                    (m[(row, col)] - m[(col, row)]).abs() < TOL * m[(row, row)].abs().max(1.0),
                    "{} not symmetric at ({}, {}): {} vs {}",
                    name,
                    row,
                    col,
                    m[(row, col)],
                    m[(col, row)]
                );
            }
        }
    }

    #[test]
    fn stiffness_corner_matches_closed_form() {
        let p = props(0.0);
        let ke = p.stiffness();
        let expected = 12.0 * p.ei / p.length_in.powi(3);
        assert!(
            (ke[(0, 0)] - expected).abs() < 1e-3,
            "Ke[0,0] = {} vs 12EI/L³ = {}",
            ke[(0, 0)],
            expected
        );
    }

    #[test]
    fn mass_corner_matches_closed_form() {
        let p = props(0.0);
        let me = p.mass();
        let expected = 156.0 * p.mass_per_in * p.length_in / 420.0;
        assert!(
            (me[(0, 0)] - expected).abs() < 1e-6,
            "Me[0,0] = {} vs 156ρAL/420 = {}",
            me[(0, 0)],
            expected
        );
    }

    #[test]
    fn element_matrices_are_symmetric() {
        let p = props(25_000.0);
        assert_symmetric(&p.stiffness(), "Ke");
        assert_symmetric(&p.geometric_stiffness(), "Kge");
        assert_symmetric(&p.mass(), "Me");
    }

    #[test]
    fn geometric_stiffness_vanishes_without_axial_load() {
        let kge = props(0.0).geometric_stiffness();
        for row in 0..4 {
            for col in 0..4 {
                assert_eq!(kge[(row, col)], 0.0, "Kge nonzero at ({}, {})", row, col);
            }
        }
    }

    #[test]
    fn geometric_stiffness_scales_linearly_with_load() {
        let kge_1 = props(10_000.0).geometric_stiffness();
        let kge_2 = props(20_000.0).geometric_stiffness();
        for row in 0..4 {
            for col in 0..4 {
                assert!(
                    (kge_2[(row, col)] - 2.0 * kge_1[(row, col)]).abs()
                        < TOL * kge_1[(0, 0)].abs(),
                    "Kge not linear in P at ({}, {})",
                    row,
                    col
                );
            }
        }
        assert!(kge_1[(0, 0)] != 0.0, "Kge should be nonzero under load");
    }

    #[test]
    fn annulus_section_properties() {
        let i = second_moment_annulus(6.75, 2.813);
        let expected =
            std::f64::consts::PI / 64.0 * (6.75f64.powi(4) - 2.813f64.powi(4));
        assert!((i - expected).abs() < 1e-12);
        assert!((polar_moment_annulus(6.75, 2.813) - 2.0 * i).abs() < 1e-9);
    }

    #[test]
    fn zero_length_component_is_rejected() {
        let mut bad = collar();
        bad.length_ft = -1.0;
        let err = ElementProperties::from_component(&bad, 3, 1.0, 0.0).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_GEOMETRY");
    }

    #[test]
    fn buoyancy_scales_mass_not_stiffness() {
        let air = ElementProperties::from_component(&collar(), 0, 1.0, 0.0).unwrap();
        let mud = ElementProperties::from_component(&collar(), 0, 0.8, 0.0).unwrap();
        assert!((mud.mass_per_in - 0.8 * air.mass_per_in).abs() < 1e-12);
        assert!((mud.ei - air.ei).abs() < 1e-12);
    }
}

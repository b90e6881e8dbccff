//! Global stiffness, geometric-stiffness, and mass assembly for a BHA.
//!
//! One beam element per component; consecutive elements overlap on the shared
//! node's 2 DOF. Node 0 is the bit end; node N is the top of the assembly.
//! Stabilizer contacts are modeled as large diagonal springs at the deflection
//! DOF of the named nodes rather than true multi-point constraints, which
//! slightly stiffens instead of exactly zeroing lateral motion there.

use nalgebra::DMatrix;

use crate::element::ElementProperties;
use crate::types::{
    buoyancy_factor, BhaComponent, DynamicsError, DynamicsResult, DOF_PER_ELEMENT, DOF_PER_NODE,
    STABILIZER_SPRING_LBF_IN,
};

/// Assembled global system for one analysis call.
///
/// Matrices are square of size 2×(component count + 1) and symmetric by
/// construction. Buffers are exclusively owned by the call that assembled
/// them; nothing here is shared or mutated after the eigensolve.
#[derive(Debug, Clone)]
pub struct GlobalSystem {
    /// Global bending stiffness K (lbf/in units on deflection DOFs).
    pub k: DMatrix<f64>,
    /// Global geometric stiffness Kg; scales with the axial compressive load.
    pub kg: DMatrix<f64>,
    /// Global consistent mass M.
    pub m: DMatrix<f64>,
    /// Node positions (ft), cumulative from the bit end, starting at 0.0.
    pub node_positions_ft: Vec<f64>,
}

impl GlobalSystem {
    pub fn num_nodes(&self) -> usize {
        self.node_positions_ft.len()
    }

    pub fn num_dofs(&self) -> usize {
        self.num_nodes() * DOF_PER_NODE
    }
}

/// Assemble global K, Kg, M and node positions for an ordered component list.
///
/// # Arguments
/// * `components` - BHA segments from bit (index 0) to top
/// * `mud_weight_ppg` - mud density; sets the buoyancy factor applied to the
///   distributed weight
/// * `wob_klb` - axial compressive load (weight on bit) in klb
/// * `stabilizer_nodes` - node indices receiving a lateral point spring
pub fn assemble(
    components: &[BhaComponent],
    mud_weight_ppg: f64,
    wob_klb: f64,
    stabilizer_nodes: &[usize],
) -> DynamicsResult<GlobalSystem> {
    if components.is_empty() {
        return Err(DynamicsError::invalid_geometry(
            "components",
            0.0,
            "at least one BHA component is required",
        ));
    }

    let num_nodes = components.len() + 1;
    let num_dofs = num_nodes * DOF_PER_NODE;
    let buoyancy = buoyancy_factor(mud_weight_ppg);
    let axial_load_lbf = wob_klb * 1000.0;

    for &node in stabilizer_nodes {
        if node >= num_nodes {
            return Err(DynamicsError::invalid_geometry(
                "stabilizer_nodes",
                node as f64,
                format!("node index out of range (model has {num_nodes} nodes)"),
            ));
        }
    }

    let mut k = DMatrix::<f64>::zeros(num_dofs, num_dofs);
    let mut kg = DMatrix::<f64>::zeros(num_dofs, num_dofs);
    let mut m = DMatrix::<f64>::zeros(num_dofs, num_dofs);
    let mut node_positions_ft = Vec::with_capacity(num_nodes);
    node_positions_ft.push(0.0);

    let mut position_ft = 0.0;
    for (idx, component) in components.iter().enumerate() {
        let props = ElementProperties::from_component(component, idx, buoyancy, axial_load_lbf)?;
        let ke = props.stiffness();
        let kge = props.geometric_stiffness();
        let me = props.mass();

        // Element DOFs [w1, θ1, w2, θ2] land on nodes idx and idx + 1.
        let base = DOF_PER_NODE * idx;
        let dof_map = [base, base + 1, base + 2, base + 3];

        for i in 0..DOF_PER_ELEMENT {
            for j in 0..DOF_PER_ELEMENT {
                let (gi, gj) = (dof_map[i], dof_map[j]);
                k[(gi, gj)] += ke[(i, j)];
                kg[(gi, gj)] += kge[(i, j)];
                m[(gi, gj)] += me[(i, j)];
            }
        }

        position_ft += component.length_ft;
        node_positions_ft.push(position_ft);
    }

    for &node in stabilizer_nodes {
        let dof = DOF_PER_NODE * node;
        k[(dof, dof)] += STABILIZER_SPRING_LBF_IN;
    }

    Ok(GlobalSystem {
        k,
        kg,
        m,
        node_positions_ft,
    })
}

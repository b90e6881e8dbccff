use bha_dynamics::{
    assemble, campbell, critical_rpm_axial, critical_rpm_lateral, critical_rpm_stick_slip,
    forced_response, mechanical_specific_energy, solve_modes, stability_index, vibration_map,
    BhaComponent, BhaGeometry, BoundaryCondition, ComponentKind, Excitation, LateralInputs,
    MseInputs, OperatingConfig, RpmRange, StickSlipInputs,
};

const COLLAR_OD_IN: f64 = 6.75;
const COLLAR_ID_IN: f64 = 2.813;
const COLLAR_LENGTH_FT: f64 = 30.0;
const COLLAR_WEIGHT_LB_FT: f64 = 83.0;
const HWDP_OD_IN: f64 = 5.0;
const HWDP_ID_IN: f64 = 3.0;
const HWDP_WEIGHT_LB_FT: f64 = 49.3;
const BIT_DIAMETER_IN: f64 = 8.5;
const MUD_WEIGHT_PPG: f64 = 10.0;
// Kept well under the Euler buckling load of the 450-ft pinned span so the
// fundamental stays positive.
const WOB_KLB: f64 = 0.2;
const N_MODES: usize = 6;

/// Ten 30-ft collars topped by five joints of heavy-weight pipe.
fn mixed_bha() -> Vec<BhaComponent> {
    let mut components: Vec<BhaComponent> = (0..10)
        .map(|_| BhaComponent {
            od_in: COLLAR_OD_IN,
            id_in: COLLAR_ID_IN,
            length_ft: COLLAR_LENGTH_FT,
            weight_per_ft: COLLAR_WEIGHT_LB_FT,
            kind: ComponentKind::DrillCollar,
        })
        .collect();
    components.extend((0..5).map(|_| BhaComponent {
        od_in: HWDP_OD_IN,
        id_in: HWDP_ID_IN,
        length_ft: COLLAR_LENGTH_FT,
        weight_per_ft: HWDP_WEIGHT_LB_FT,
        kind: ComponentKind::HeavyWeight,
    }));
    components
}

#[test]
fn full_modal_pipeline_on_a_mixed_string() {
    let components = mixed_bha();
    let system = assemble(&components, MUD_WEIGHT_PPG, WOB_KLB, &[]).unwrap();

    assert_eq!(system.num_nodes(), 16);
    assert_eq!(
        *system.node_positions_ft.last().unwrap(),
        15.0 * COLLAR_LENGTH_FT
    );

    let modal = solve_modes(&system, BoundaryCondition::PinnedPinned, N_MODES).unwrap();
    assert_eq!(modal.modes.len(), N_MODES);

    for pair in modal.modes.windows(2) {
        assert!(pair[0].frequency_hz <= pair[1].frequency_hz);
    }
    for mode in &modal.modes {
        assert!(mode.frequency_hz.is_finite());
        assert!(mode.frequency_hz >= 0.0);
        assert_eq!(mode.shape.len(), system.num_nodes());
    }

    let first = &modal.modes[0];
    assert!(first.frequency_hz > 0.0, "unbuckled string keeps f1 > 0");
    assert!((first.critical_rpm - first.frequency_hz * 60.0).abs() < 1e-9);
}

#[test]
fn stabilizers_raise_the_fundamental() {
    let components = mixed_bha();
    let bc = BoundaryCondition::PinnedPinned;

    let plain = assemble(&components, MUD_WEIGHT_PPG, WOB_KLB, &[]).unwrap();
    let stabilized = assemble(&components, MUD_WEIGHT_PPG, WOB_KLB, &[5, 10]).unwrap();

    let f_plain = solve_modes(&plain, bc, 1).unwrap().modes[0].frequency_hz;
    let f_stab = solve_modes(&stabilized, bc, 1).unwrap().modes[0].frequency_hz;

    assert!(
        f_stab > f_plain,
        "mid-string supports should stiffen the first mode: {} vs {}",
        f_stab,
        f_plain
    );
}

#[test]
fn forced_response_peaks_at_the_excited_interior() {
    let components = mixed_bha();
    let system = assemble(&components, MUD_WEIGHT_PPG, WOB_KLB, &[]).unwrap();
    let bc = BoundaryCondition::PinnedPinned;
    let f1 = solve_modes(&system, bc, 1).unwrap().modes[0].frequency_hz;

    let response = forced_response(
        &system,
        bc,
        &Excitation {
            node: 7,
            frequency_hz: 0.9 * f1,
            force_lbf: 1000.0,
        },
        N_MODES,
    )
    .unwrap();

    assert_eq!(response.node_amplitudes_in.len(), system.num_nodes());
    assert_eq!(response.node_amplitudes_in[0], 0.0);
    assert_eq!(*response.node_amplitudes_in.last().unwrap(), 0.0);
    assert!(response.max_amplitude_in > 0.0);
}

#[test]
fn campbell_crossings_sit_on_the_mode_curves() {
    let diagram = campbell(
        &mixed_bha(),
        WOB_KLB,
        MUD_WEIGHT_PPG,
        BIT_DIAMETER_IN,
        BoundaryCondition::PinnedPinned,
        RpmRange {
            min: 1.0,
            max: 240.0,
            step: 1.0,
        },
        N_MODES,
        &[],
    )
    .unwrap();

    assert_eq!(diagram.frequency_curves.len(), N_MODES);
    assert_eq!(diagram.excitation_lines.len(), 3);
    for curve in &diagram.frequency_curves {
        assert_eq!(curve.len(), diagram.rpm_values.len());
    }
    assert!(!diagram.crossings.is_empty());
    for crossing in &diagram.crossings {
        let line_hz = crossing.order * crossing.rpm / 60.0;
        assert!((line_hz - crossing.frequency_hz).abs() < 0.05);
    }
}

#[test]
fn estimators_agree_on_a_reference_operating_point() {
    const BHA_LENGTH_FT: f64 = 450.0;
    const RPM: f64 = 120.0;
    const WOB: f64 = 25.0;

    let axial = critical_rpm_axial(BHA_LENGTH_FT).unwrap();
    assert!(axial.fundamental_hz > 0.0);
    assert_eq!(axial.critical_rpms.len(), 3);

    let lateral = critical_rpm_lateral(&LateralInputs {
        bha_length_ft: BHA_LENGTH_FT,
        od_in: COLLAR_OD_IN,
        id_in: COLLAR_ID_IN,
        weight_per_ft: COLLAR_WEIGHT_LB_FT,
        mud_weight_ppg: MUD_WEIGHT_PPG,
        operating_rpm: RPM,
        radial_clearance_in: (BIT_DIAMETER_IN - COLLAR_OD_IN) / 2.0,
        inclination_deg: 0.0,
    })
    .unwrap();
    assert!(lateral.critical_rpm > 0.0);

    let stick_slip = critical_rpm_stick_slip(&StickSlipInputs {
        bha_length_ft: BHA_LENGTH_FT,
        od_in: COLLAR_OD_IN,
        id_in: COLLAR_ID_IN,
        weight_per_ft: COLLAR_WEIGHT_LB_FT,
        wob_klb: WOB,
        rpm: RPM,
        bit_diameter_in: BIT_DIAMETER_IN,
        friction_coefficient: 0.30,
    })
    .unwrap();
    assert!(stick_slip.severity > 0.0);
    assert!(stick_slip.torsional_frequency_hz > 0.0);

    let mse = mechanical_specific_energy(&MseInputs {
        torque_kft_lb: 15.0,
        rpm: RPM,
        bit_diameter_in: BIT_DIAMETER_IN,
        rop_ft_hr: 60.0,
        wob_klb: WOB,
        ccs_psi: 15_000.0,
    })
    .unwrap();
    assert!((mse.mse_psi - (mse.rotary_psi + mse.thrust_psi)).abs() < 1e-9);
}

#[test]
fn operating_map_built_from_the_modeled_string() {
    let geometry = BhaGeometry::from_components(&mixed_bha(), BIT_DIAMETER_IN).unwrap();
    assert_eq!(geometry.length_ft, 450.0);

    let config = OperatingConfig::default();
    let assessment = stability_index(&geometry, 120.0, 25.0, &config).unwrap();
    assert!(assessment.index >= 0.0 && assessment.index <= 100.0);

    let map = vibration_map(&geometry, &config, None, None).unwrap();
    assert_eq!(map.cells.len(), map.rpm_values.len() * map.wob_values.len());

    let optimal = map.optimal.expect("default grid evaluates everywhere");
    assert!(map.cells.iter().all(|c| c.index <= optimal.index));
    assert!(map
        .cells
        .iter()
        .any(|c| c.rpm == optimal.rpm && c.wob_klb == optimal.wob_klb));
}

//! Property-based tests for thickness mapping and shell generation.
//!
//! Run with: cargo test -p litho-shell -- proptest

use litho_mesh::MeshAdjacency;
use litho_shell::{
    CylinderSpec, EndCap, IntensityBuffer, MIN_FEATURE_MM, SurfaceInterpolator, ThicknessMapper,
    ThicknessParams, generate_lithophane,
};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_params() -> impl Strategy<Value = ThicknessParams> {
    (0.2..5.0f64, 0.2..2.0f64, 0.1..3.0f64, 0.0..3.0f64).prop_map(
        |(gamma, min, span, blend)| ThicknessParams {
            gamma,
            min_thickness_mm: min,
            max_thickness_mm: (min + span).min(5.0),
            edge_blend_width_mm: blend,
            resolution_mm: 0.5,
        },
    )
}

fn arb_buffer(max_side: usize) -> impl Strategy<Value = IntensityBuffer> {
    (1..=max_side, 1..=max_side).prop_flat_map(|(w, h)| {
        prop::collection::vec(0.0..=1.0f64, w * h)
            .prop_map(move |data| IntensityBuffer::new(w, h, data).unwrap())
    })
}

/// Margins including zero and values just above it.
fn arb_margin() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), 1e-12..1e-3f64, 0.0..4.0f64]
}

fn arb_cap() -> impl Strategy<Value = EndCap> {
    let thickness = prop_oneof![MIN_FEATURE_MM..0.1f64, 0.8..2.5f64];
    let bore = prop_oneof![Just(0.0), MIN_FEATURE_MM..0.1f64, 1.0..12.0f64];
    prop_oneof![
        Just(EndCap::Open),
        (thickness, bore).prop_map(|(thickness_mm, bore_diameter_mm)| EndCap::Closed {
            thickness_mm,
            bore_diameter_mm,
        }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn proptest_darker_is_never_thinner(params in arb_params(), a in 0.0..=1.0f64, b in 0.0..=1.0f64) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(params.thickness_for(lo) >= params.thickness_for(hi));
    }

    #[test]
    fn proptest_extremes_are_exact(mut params in arb_params()) {
        params.gamma = 1.0;
        prop_assert_eq!(params.thickness_for(0.0), params.max_thickness_mm);
        prop_assert_eq!(params.thickness_for(1.0), params.min_thickness_mm);
    }

    #[test]
    fn proptest_field_stays_in_range(params in arb_params(), buffer in arb_buffer(24)) {
        let mapping = ThicknessMapper::new(params.clone()).unwrap().map(&buffer).unwrap();
        let field = &mapping.field;
        prop_assert_eq!((field.width(), field.height()), (buffer.width(), buffer.height()));
        prop_assert!(2 * mapping.blend_columns <= buffer.width().max(1));
        for &t in field.values() {
            prop_assert!(t >= params.min_thickness_mm - 1e-12);
            prop_assert!(t <= params.max_thickness_mm + 1e-12);
        }
    }

    #[test]
    fn proptest_interpolator_reproduces_samples(buffer in arb_buffer(9)) {
        let interp = SurfaceInterpolator::from_grid(buffer.width(), buffer.height(), buffer.data().to_vec()).unwrap();
        for row in 0..buffer.height() {
            for col in 0..buffer.width() {
                let v = interp.sample(row as f64, col as f64).unwrap();
                prop_assert!((v - buffer.get(row, col)).abs() < 1e-9);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn proptest_any_valid_cylinder_is_watertight(
        coverage in 10.0..=360.0f64,
        center in -180.0..180.0f64,
        top_margin in arb_margin(),
        bottom_margin in arb_margin(),
        bottom_cap in arb_cap(),
        top_cap in arb_cap(),
        buffer in arb_buffer(12),
    ) {
        let spec = CylinderSpec {
            outer_diameter_mm: 30.0,
            height_mm: 20.0,
            wall_thickness_mm: 1.6,
            coverage_angle_deg: coverage,
            coverage_center_deg: center,
            top_margin_mm: top_margin,
            bottom_margin_mm: bottom_margin,
            resolution_mm: 1.0,
            bottom_cap,
            top_cap,
            ..Default::default()
        };
        prop_assume!(spec.validate().is_ok());

        let result = generate_lithophane(&buffer, &spec).unwrap();
        let adjacency = MeshAdjacency::build(&result.mesh.faces);
        prop_assert!(adjacency.is_watertight());
        prop_assert_eq!(adjacency.inconsistent_edge_count(), 0);
        prop_assert!(result.validation().volume > 0.0);
        prop_assert!(!result.validation().is_inside_out);
    }
}

use approx::{assert_abs_diff_eq, assert_relative_eq};
use insole_designer::align::rotation_to_length_axis;
use insole_designer::{
    AnthropometricParams, Axis, ElementRole, GeometryConfig, LayerKind, SupportLevel, align, fit_params_to_scan,
    generate, load_scan, measure_scan,
};
use insole_file_format::encode_binary;
use insole_kernel::geometry::point::Point3d;
use insole_kernel::geometry::vector::Vec3;
use insole_tessellation::TriangleMesh;
use insole_tessellation::primitives::frustum;

// ── Helper Functions ─────────────────────────────────────────────────────

/// A closed box spanning `[0, size]` on each axis.
fn box_scan(size: [f64; 3]) -> TriangleMesh {
    let [sx, sy, sz] = size;
    let p = |x: f64, y: f64, z: f64| Point3d::new(x * sx, y * sy, z * sz);
    let mut mesh = TriangleMesh::new();
    mesh.add_flat_quad(p(0., 0., 0.), p(0., 1., 0.), p(1., 1., 0.), p(1., 0., 0.));
    mesh.add_flat_quad(p(0., 0., 1.), p(1., 0., 1.), p(1., 1., 1.), p(0., 1., 1.));
    mesh.add_flat_quad(p(0., 0., 0.), p(1., 0., 0.), p(1., 0., 1.), p(0., 0., 1.));
    mesh.add_flat_quad(p(0., 1., 0.), p(0., 1., 1.), p(1., 1., 1.), p(1., 1., 0.));
    mesh.add_flat_quad(p(0., 0., 0.), p(0., 0., 1.), p(0., 1., 1.), p(0., 1., 0.));
    mesh.add_flat_quad(p(1., 0., 0.), p(1., 1., 0.), p(1., 1., 1.), p(1., 0., 1.));
    mesh
}

// ── Layer stack ──────────────────────────────────────────────────────────

#[test]
fn default_foot_builds_three_stacked_layers() {
    let params = AnthropometricParams {
        foot_length: 250.0,
        foot_width: 100.0,
        heel_width: 70.0,
        ..Default::default()
    };
    let model = generate(&params, &GeometryConfig::default(), None).unwrap();

    let kinds: Vec<_> = model.layers.iter().map(|l| l.kind).collect();
    assert_eq!(kinds, [LayerKind::Base, LayerKind::Support, LayerKind::Cushion]);
    assert_eq!(model.layers[0].offset, 0.0);
    assert_relative_eq!(model.layers[1].offset, 0.005);
    assert_relative_eq!(model.layers[2].offset, 0.006);
    assert_relative_eq!(model.stack_height, 0.009);
    for layer in &model.layers {
        assert!(layer.contour.is_closed(), "{:?}", layer.kind);
        assert!(!layer.mesh.is_empty());
        assert!(layer.mesh.is_finite());
    }
}

#[test]
fn support_layer_peaks_under_the_arch() {
    let model = generate(&AnthropometricParams::default(), &GeometryConfig::layers_only(), None).unwrap();
    let support = &model.layers[1];
    // highest vertex is in the central third
    let top = support
        .mesh
        .points()
        .max_by(|a, b| a.z.total_cmp(&b.z))
        .unwrap();
    assert!(top.x.abs() < 0.25 / 3.0);
    assert!(top.z > 0.001 + 0.005);
}

#[test]
fn stronger_support_lifts_more() {
    let peak = |level| {
        let params = AnthropometricParams {
            arch_support_level: level,
            ..Default::default()
        };
        let model = generate(&params, &GeometryConfig::layers_only(), None).unwrap();
        model.layers[1].mesh.bounding_box().max.z
    };
    assert!(peak(SupportLevel::Low) < peak(SupportLevel::Medium));
    assert!(peak(SupportLevel::High) < peak(SupportLevel::ExtraHigh));
}

#[test]
fn pointed_heel_still_generates() {
    let params = AnthropometricParams {
        heel_width: 0.0,
        heel_wedge_angle: 3.0,
        ..Default::default()
    };
    let model = generate(&params, &GeometryConfig::default(), None).unwrap();
    assert_eq!(model.layers.len(), 3);
    for layer in &model.layers {
        assert!(layer.contour.is_closed(), "{:?}", layer.kind);
        assert!(!layer.mesh.is_empty());
        assert!(layer.mesh.is_finite());
    }
    let roles: Vec<_> = model.elements.iter().map(|e| e.role).collect();
    assert_eq!(roles, [ElementRole::ArchSupport, ElementRole::MetatarsalPad]);
}

// ── Functional elements ──────────────────────────────────────────────────

#[test]
fn wedge_only_when_angled() {
    let roles = |angle: f64| {
        let params = AnthropometricParams {
            heel_wedge_angle: angle,
            ..Default::default()
        };
        generate(&params, &GeometryConfig::preview(), None)
            .unwrap()
            .elements
            .iter()
            .map(|e| e.role)
            .collect::<Vec<_>>()
    };
    assert!(!roles(0.0).contains(&ElementRole::HeelWedge));
    assert!(roles(-3.0).contains(&ElementRole::HeelWedge));
}

#[test]
fn elements_rest_on_the_stack() {
    let model = generate(&AnthropometricParams::default(), &GeometryConfig::default(), None).unwrap();
    for element in &model.elements {
        let bb = element.to_scene().bounding_box();
        // the tube is centered on its spline, so its radius dips below
        let slack = if element.role == ElementRole::ArchSupport { 0.0015 } else { 1e-6 };
        assert!(bb.min.y >= model.stack_height - slack, "{:?} at {}", element.role, bb.min.y);
    }
}

// ── Scan alignment ───────────────────────────────────────────────────────

#[test]
fn tall_scan_is_laid_along_the_foot() {
    let scan = box_scan([0.02, 0.30, 0.05]);
    let (aligned, t) = align(&scan, 250.0, 0.009).unwrap();
    assert_eq!(t.dominant_axis, Axis::Y);
    assert_relative_eq!(t.scale, 0.25 / 0.30, max_relative = 1e-6);
    assert_eq!(t.rotation, rotation_to_length_axis(Axis::Y));

    let bb = aligned.bounding_box();
    let size = bb.size();
    assert_abs_diff_eq!(size.z, 0.25, epsilon = 1e-6);
    assert_abs_diff_eq!(size.x, 0.02 * t.scale, epsilon = 1e-6);
    assert_abs_diff_eq!(size.y, 0.05 * t.scale, epsilon = 1e-6);
    assert_abs_diff_eq!(bb.min.y, 0.009, epsilon = 1e-6);
    assert_abs_diff_eq!(bb.center().x, 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(bb.center().z, 0.0, epsilon = 1e-6);
}

#[test]
fn scan_from_stl_bytes_fits_params() {
    let bytes = encode_binary(&box_scan([0.27, 0.06, 0.1]), "foot scan");
    let scan = load_scan(&bytes).unwrap();
    let model = generate(&AnthropometricParams::default(), &GeometryConfig::default(), Some(&scan)).unwrap();
    assert!(model.foot_preview.is_none());

    let aligned = model.scan.as_ref().unwrap();
    assert_eq!(aligned.transform.dominant_axis, Axis::X);

    let m = measure_scan(&aligned.mesh).unwrap();
    assert!((m.length - 250.0).abs() < 1e-3);
    let fitted = fit_params_to_scan(&model.params, &aligned.mesh).unwrap();
    assert_eq!(fitted.foot_length, 250.0);
    assert_eq!(fitted.foot_width, 93.0);
    assert_eq!(fitted.heel_width, 65.0);
}

#[test]
fn flat_scan_passes_through() {
    let mut flat = TriangleMesh::new();
    let a = flat.add_vertex(Point3d::new(0.0, 0.0, 0.0), Vec3::Z);
    let b = flat.add_vertex(Point3d::new(0.3, 0.0, 0.0), Vec3::Z);
    let c = flat.add_vertex(Point3d::new(0.0, 0.1, 0.0), Vec3::Z);
    flat.add_triangle(a, b, c);

    let model = generate(&AnthropometricParams::default(), &GeometryConfig::preview(), Some(&flat)).unwrap();
    let scan = model.scan.unwrap();
    assert_eq!(scan.mesh, flat);
    assert_eq!(scan.transform.scale, 1.0);
}

// ── Export ───────────────────────────────────────────────────────────────

#[test]
fn every_part_exports_as_stl() {
    let model = generate(&AnthropometricParams::default(), &GeometryConfig::preview(), None).unwrap();
    for (name, mesh) in model.scene_meshes() {
        let bytes = encode_binary(&mesh, &name);
        assert_eq!(bytes.len(), 84 + 50 * mesh.triangle_count(), "{name}");
        let back = load_scan(&bytes).unwrap();
        assert_eq!(back.triangle_count(), mesh.triangle_count());
    }
}

#[test]
fn heel_cup_frustum_matches_primitive() {
    let params = AnthropometricParams::default();
    let config = GeometryConfig::default();
    let model = generate(&params, &config, None).unwrap();
    let cup = model
        .elements
        .iter()
        .find(|e| e.role == ElementRole::HeelCup)
        .unwrap();
    let expected = frustum(0.07 / 3.0, 0.035, 0.01, config.heel_cup_segments).unwrap();
    assert_eq!(cup.mesh.triangle_count(), expected.triangle_count());
}

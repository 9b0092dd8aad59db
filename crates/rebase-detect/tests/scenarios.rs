//! End-to-end detection on synthetic printed modules.

use std::f64::consts::FRAC_PI_2;

use approx::assert_relative_eq;
use rebase_detect::{detect_bases, DetectSettings, Orientation};
use rebase_math::{Point3, Transform};
use rebase_mesh::{load_stl_bytes, TriangleMesh};

const BASE: f64 = 35.6;

/// A 2x1 module: two base pads under one body slab.
///
/// Pads are BASE x BASE x 5 centred at (21, 21) and (63, 21), the slab is
/// 84 x 42 x 20 on top. Every face other than the pad bottoms is either
/// hidden or far from base-sized.
fn two_base_module() -> TriangleMesh {
    let half = BASE / 2.0;
    let mut mesh = TriangleMesh::new();
    for cx in [21.0, 63.0] {
        mesh.merge(&TriangleMesh::cuboid(
            Point3::new(cx - half, 21.0 - half, 0.0),
            Point3::new(cx + half, 21.0 + half, 5.0),
        ));
    }
    mesh.merge(&TriangleMesh::cuboid(
        Point3::new(0.0, 0.0, 5.0),
        Point3::new(84.0, 42.0, 25.0),
    ));
    mesh
}

#[test]
fn upright_module_keeps_original_orientation() {
    let detection = detect_bases(&two_base_module(), &DetectSettings::default()).unwrap();

    assert_eq!(detection.orientation, Orientation::Original);
    assert_eq!(detection.badness, 0);
    assert_eq!(detection.base_count(), 2);
    assert_relative_eq!(detection.min_z, 0.0);

    let first = detection.shapes[0].centroid();
    let second = detection.shapes[1].centroid();
    assert_relative_eq!(first.x, 21.0, epsilon = 1e-9);
    assert_relative_eq!(first.y, 21.0, epsilon = 1e-9);
    assert_relative_eq!(second.x, 63.0, epsilon = 1e-9);

    // nothing else scores zero
    for candidate in &detection.candidates[1..] {
        assert!(candidate.badness > 0, "{:?}", candidate);
    }
}

#[test]
fn module_on_its_side_is_turned_back() {
    let tipped = two_base_module().transformed(&Transform::rotation_x(FRAC_PI_2));
    let detection = detect_bases(&tipped, &DetectSettings::default()).unwrap();

    assert_eq!(detection.orientation, Orientation::XNeg);
    assert_eq!(detection.badness, 0);
    assert_eq!(detection.base_count(), 2);
    assert!(detection.min_z.abs() < 1e-9);

    let first = detection.shapes[0].centroid();
    assert_relative_eq!(first.x, 21.0, epsilon = 1e-9);
    assert_relative_eq!(first.y, 21.0, epsilon = 1e-9);
}

#[test]
fn cube_ties_resolve_to_original() {
    let cube = TriangleMesh::cuboid(Point3::origin(), Point3::new(BASE, BASE, BASE));
    let detection = detect_bases(&cube, &DetectSettings::default()).unwrap();

    assert_eq!(detection.orientation, Orientation::Original);
    assert_eq!(detection.badness, 0);
    assert_eq!(detection.candidates.len(), 6);
    assert!(detection.candidates.iter().all(|c| c.badness == 0));
}

#[test]
fn detection_is_repeatable() {
    let mesh = two_base_module().transformed(&Transform::rotation_x(FRAC_PI_2));
    let settings = DetectSettings::default();
    let a = detect_bases(&mesh, &settings).unwrap();
    let b = detect_bases(&mesh, &settings).unwrap();

    assert_eq!(a.orientation, b.orientation);
    assert_eq!(a.shapes, b.shapes);
    assert_eq!(a.candidates, b.candidates);
}

#[test]
fn stl_round_trip_detects_the_same_bases() {
    let bytes = two_base_module().to_stl_bytes().unwrap();
    let mesh = load_stl_bytes(&bytes).unwrap();
    let detection = detect_bases(&mesh, &DetectSettings::default()).unwrap();

    assert_eq!(detection.orientation, Orientation::Original);
    assert_eq!(detection.base_count(), 2);
    assert_relative_eq!(detection.shapes[0].width(), BASE, epsilon = 1e-4);
}

#[test]
fn annotations_map_back_to_the_loaded_frame() {
    let tipped = two_base_module().transformed(&Transform::rotation_x(FRAC_PI_2));
    let detection = detect_bases(&tipped, &DetectSettings::default()).unwrap();
    let notes = detection.annotations();

    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].number, 1);
    assert_eq!(notes[1].number, 2);

    // (21, 21, 0) in the upright frame is (21, 0, 21) once tipped
    let anchor = notes[0].source_anchor;
    assert_relative_eq!(anchor.x, 21.0, epsilon = 1e-9);
    assert_relative_eq!(anchor.y, 0.0, epsilon = 1e-9);
    assert_relative_eq!(anchor.z, 21.0, epsilon = 1e-9);
}

#[test]
fn mesh_without_bases_still_reports() {
    // a flat plate: every orientation has one bad hull or a sliver
    let plate = TriangleMesh::cuboid(Point3::origin(), Point3::new(80.0, 60.0, 2.0));
    let detection = detect_bases(&plate, &DetectSettings::default()).unwrap();
    assert!(detection.badness > 0);
    assert_eq!(detection.orientation, Orientation::Original);
}

use cuff_types::{Dimension, EntityKind, FeatureKind, PropValue};
use model_engine::*;

fn engine_with_part(part: &str) -> RecordingEngine {
    let mut engine = RecordingEngine::new();
    engine
        .create(&Container::Model, part, FeatureKind::Part, Some(Dimension::Volumes))
        .unwrap();
    engine
}

// ── Creation ────────────────────────────────────────────────────────────

#[test]
fn create_records_command_in_order() {
    let mut engine = engine_with_part("part1");
    let at = Container::part("part1");
    engine.create(&at, "csel1", FeatureKind::CumulativeSelection, None).unwrap();
    engine.create(&at, "cyl1", FeatureKind::Cylinder, None).unwrap();

    assert_eq!(engine.command_count(), 3);
    let ids: Vec<_> = engine.features_in(&at).iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["csel1", "cyl1"]);
}

#[test]
fn duplicate_identifier_in_same_container_is_rejected() {
    let mut engine = engine_with_part("part1");
    let at = Container::part("part1");
    engine.create(&at, "cyl1", FeatureKind::Cylinder, None).unwrap();
    let err = engine.create(&at, "cyl1", FeatureKind::Cylinder, None).unwrap_err();
    assert!(matches!(err, EngineError::DuplicateIdentifier { .. }));
}

#[test]
fn same_identifier_in_different_containers_is_fine() {
    let mut engine = engine_with_part("part1");
    engine
        .create(&Container::Model, "part2", FeatureKind::Part, None)
        .unwrap();
    engine
        .create(&Container::part("part1"), "cyl1", FeatureKind::Cylinder, None)
        .unwrap();
    engine
        .create(&Container::part("part2"), "cyl1", FeatureKind::Cylinder, None)
        .unwrap();
}

#[test]
fn part_geometry_requires_existing_part() {
    let mut engine = RecordingEngine::new();
    let err = engine
        .create(&Container::part("part9"), "cyl1", FeatureKind::Cylinder, None)
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownFeature { .. }));
    assert_eq!(engine.command_count(), 0);
}

#[test]
fn work_plane_geometry_requires_work_plane_feature() {
    let mut engine = engine_with_part("part1");
    let part = Container::part("part1");
    let wp = part.work_plane("wp1");
    assert!(engine.create(&wp, "r1", FeatureKind::Rectangle, None).is_err());

    engine.create(&part, "wp1", FeatureKind::WorkPlane, None).unwrap();
    engine.create(&wp, "r1", FeatureKind::Rectangle, None).unwrap();
    assert!(engine.has_feature(&wp, "r1"));
}

// ── Selections ──────────────────────────────────────────────────────────

#[test]
fn contribute_to_unknown_selection_fails() {
    let mut engine = engine_with_part("part1");
    let at = Container::part("part1");
    engine.create(&at, "cyl1", FeatureKind::Cylinder, None).unwrap();
    let err = engine
        .set(&at, "cyl1", "contributeto", PropValue::expr("csel1"))
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownSelection { .. }));

    engine.create(&at, "csel1", FeatureKind::CumulativeSelection, None).unwrap();
    engine
        .set(&at, "cyl1", "contributeto", PropValue::expr("csel1"))
        .unwrap();
}

#[test]
fn part_selections_are_not_visible_from_shared_geometry() {
    let mut engine = engine_with_part("part1");
    engine
        .create(&Container::part("part1"), "csel1", FeatureKind::CumulativeSelection, None)
        .unwrap();
    engine
        .create(&Container::Geometry, "ext1", FeatureKind::Extrude, None)
        .unwrap();
    assert!(engine
        .select_named(&Container::Geometry, "ext1", Some("input"), "csel1")
        .is_err());
}

#[test]
fn keep_switch_exports_instance_selection() {
    let mut engine = engine_with_part("part1");
    engine
        .create(&Container::Geometry, "pi1", FeatureKind::PartInstance, None)
        .unwrap();
    let dom = keep_entry_key("pi1", "csel2", EntityKind::Domain);
    let pnt = keep_entry_key("pi1", "csel2", EntityKind::Point);
    engine
        .set_entry(&Container::Geometry, "pi1", "selkeepdom", &dom, "on".into())
        .unwrap();
    engine
        .set_entry(&Container::Geometry, "pi1", "selkeeppnt", &pnt, "off".into())
        .unwrap();

    let dom_name = imported_selection_name("pi1", "csel2", EntityKind::Domain);
    let pnt_name = imported_selection_name("pi1", "csel2", EntityKind::Point);
    assert_eq!(dom_name, "geom1_pi1_csel2_dom");
    assert!(engine.has_selection(&dom_name));
    assert!(!engine.has_selection(&pnt_name));

    engine
        .create(&Container::Materials, "matlnk1", FeatureKind::MaterialLink, None)
        .unwrap();
    engine
        .select_named(&Container::Materials, "matlnk1", None, &dom_name)
        .unwrap();
}

#[test]
fn shared_geometry_selection_is_visible_to_physics_with_suffix() {
    let mut engine = RecordingEngine::new();
    engine
        .create(&Container::Geometry, "csel4", FeatureKind::CumulativeSelection, None)
        .unwrap();
    engine
        .create(&Container::Physics, "ci1", FeatureKind::ContactImpedance, Some(Dimension::Surfaces))
        .unwrap();
    engine
        .select_named(&Container::Physics, "ci1", None, "geom1_csel4_bnd")
        .unwrap();
    assert!(!engine.has_selection("geom1_csel5_bnd"));
}

#[test]
fn configuring_unknown_feature_fails() {
    let mut engine = RecordingEngine::new();
    assert!(engine.label(&Container::Geometry, "cyl1", "Medium").is_err());
    assert!(engine
        .set(&Container::Geometry, "cyl1", "r", "radius".into())
        .is_err());
    assert_eq!(engine.command_count(), 0);
}

#[test]
fn run_is_recorded() {
    let mut engine = engine_with_part("part1");
    engine.run(&Container::part("part1")).unwrap();
    assert_eq!(engine.runs(), vec![&Container::part("part1")]);
}

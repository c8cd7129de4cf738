use cuff_types::{FeatureKind, PrimitiveKind, PropValue, UnionGroup};
use feature_graph::{submit, BranchKind, GraphBuilder, Identifier, IdentifierRegistry, Step};
use model_engine::{Container, RecordingEngine};
use part_library::nerve::{build_epi_circle, build_epi_trace, build_fascicle_ci, build_fascicle_mesh};
use part_library::{definition, TraceFile};

// ── Primitive templates ─────────────────────────────────────────────────

#[test]
fn every_primitive_builds_and_emits_cleanly() {
    let mut engine = RecordingEngine::new();
    for (i, kind) in PrimitiveKind::ALL.into_iter().enumerate() {
        let def = definition(kind);
        let template = def
            .build()
            .unwrap()
            .unwrap_or_else(|| panic!("{kind} registered nothing"));

        let labels: Vec<_> = template.catalog().labels().collect();
        let declared: Vec<_> = def.catalog.iter().map(|(l, _)| *l).collect();
        assert_eq!(labels, declared, "{kind}");
        assert_eq!(template.catalog().keep_vector(), def.keep_vector());

        let part = Identifier::new(format!("part{}", i + 1));
        template.emit(&part, &mut engine).unwrap();
        assert!(engine.has_feature(&Container::Model, part.as_str()));
    }
}

#[test]
fn catalog_selections_are_declared_before_geometry() {
    let template = definition(PrimitiveKind::RibbonContact).build().unwrap().unwrap();
    let steps = template.graph().steps();
    let first_geometry = steps
        .iter()
        .position(|s| !matches!(s, Step::Selection { .. }))
        .unwrap();
    assert_eq!(first_geometry, template.catalog().len());
}

#[test]
fn template_defaults_become_input_parameters() {
    let template = definition(PrimitiveKind::TubeCuff).build().unwrap().unwrap();
    let mut engine = RecordingEngine::new();
    template.emit(&Identifier::new("part1"), &mut engine).unwrap();
    assert_eq!(
        engine.entry(&Container::Model, "part1", "inputParam", "Tube_theta"),
        Some(&PropValue::expr("340 [deg]"))
    );
    assert_eq!(template.parameters().len(), 11);
}

#[test]
fn ribbon_recess_plane_has_local_selection() {
    let template = definition(PrimitiveKind::RibbonContact).build().unwrap().unwrap();
    let mut engine = RecordingEngine::new();
    template.emit(&Identifier::new("part1"), &mut engine).unwrap();

    let part = Container::part("part1");
    let recess_plane = template.registry().get("Recess Cross Section 1").unwrap();
    let plane = part.work_plane(recess_plane.as_str());
    let local = engine.features_of_kind(&plane, FeatureKind::CumulativeSelection);
    assert_eq!(local.len(), 1);
    assert_eq!(local[0].label.as_deref(), Some("wp RECESS CROSS SECTION"));
}

#[test]
fn wire_contact_source_is_catalog_entry_two() {
    let def = definition(PrimitiveKind::WireContact);
    let template = def.build().unwrap().unwrap();
    let src = def.point_source.unwrap();
    assert_eq!(template.catalog().label(src).unwrap(), "SRC");
}

#[test]
fn rectangle_outline_branches_inside_its_work_plane() {
    let template = definition(PrimitiveKind::RectangleContact).build().unwrap().unwrap();
    let mut engine = RecordingEngine::new();
    template.emit(&Identifier::new("part1"), &mut engine).unwrap();

    let part = Container::part("part1");
    let contact_plane = template.registry().get("Contact Cross Section").unwrap();
    let plane = part.work_plane(contact_plane.as_str());
    let kinds: Vec<_> = engine.features_in(&plane).iter().map(|f| f.kind).collect();
    assert_eq!(
        kinds,
        vec![
            FeatureKind::CumulativeSelection,
            FeatureKind::CumulativeSelection,
            FeatureKind::If,
            FeatureKind::Rectangle,
            FeatureKind::Fillet,
            FeatureKind::Scale,
            FeatureKind::ElseIf,
            FeatureKind::Rectangle,
            FeatureKind::Fillet,
            FeatureKind::EndIf,
            FeatureKind::Move,
        ]
    );
    let guard = engine.features_of_kind(&plane, FeatureKind::ElseIf);
    assert_eq!(guard[0].properties.get("condition"), Some(&PropValue::expr("Rect_def==2")));
}

#[test]
fn rectangle_recess_is_guarded_at_part_level() {
    let template = definition(PrimitiveKind::RectangleContact).build().unwrap().unwrap();
    let steps = template.graph().steps();
    let begin = steps
        .iter()
        .position(|s| s.label() == Some("If Recess"))
        .unwrap();
    let recess = template.registry().get("Recess Cross Section").unwrap();
    let end = steps
        .iter()
        .position(|s| matches!(s, Step::Branch { kind: BranchKind::EndIf, .. }))
        .unwrap();
    let plane = template.graph().position(&recess).unwrap();
    assert!(begin < plane && plane < end);
    let src = definition(PrimitiveKind::RectangleContact).point_source.unwrap();
    assert_eq!(template.catalog().label(src).unwrap(), "SRC");
}

#[test]
fn helical_parts_chain_on_end_faces() {
    let template = definition(PrimitiveKind::HelicalCuffnContact).build().unwrap().unwrap();
    let mut engine = RecordingEngine::new();
    template.emit(&Identifier::new("part1"), &mut engine).unwrap();

    let part = Container::part("part1");
    let end_p1 = template.registry().get("SEL END P1").unwrap();
    for label in [
        "Helical Insulator Cross Section Part 2",
        "Helical Conductor Cross Section Part 2",
    ] {
        let plane = template.registry().get(label).unwrap();
        let feature = engine.feature(&part, plane.as_str()).unwrap();
        assert_eq!(feature.inputs, vec![(Some("face".to_string()), end_p1.to_string())]);
    }
    assert_eq!(engine.features_of_kind(&part, FeatureKind::Sweep).len(), 4);
    assert_eq!(engine.features_of_kind(&part, FeatureKind::ParametricCurve).len(), 3);

    let union = template.registry().get("Union Silicone Parts").unwrap();
    let inputs = engine.property(&part, union.as_str(), "selection.input").unwrap();
    let sweeps: Vec<String> = ["Make Cuff Part 1", "Make Cuff Part 2", "Make Cuff Part 3"]
        .iter()
        .map(|l| template.registry().get(l).unwrap().to_string())
        .collect();
    assert_eq!(inputs, &PropValue::exprs(sweeps));
}

// ── Nerve parts ─────────────────────────────────────────────────────────

#[test]
fn fascicle_ci_uses_index_prefixed_labels() {
    let mut reg = IdentifierRegistry::new();
    let trace = TraceFile::new("fascicles/0/inners", "0.txt");
    let (built, graph) = {
        let mut g = GraphBuilder::new(&mut reg);
        let built = build_fascicle_ci(&mut g, 0, &trace, Some(0.02)).unwrap();
        (built, g.finish().unwrap())
    };
    assert!(reg.has("inner0_INNERS_CI"));
    assert!(reg.has("inner0_ENDONEURIUM"));
    assert_eq!(built.impedance_on.as_deref(), Some("inner0_ENDONEURIUM"));
    assert_eq!(
        built.contributions[0].groups,
        &[UnionGroup::AllNerveParts, UnionGroup::Endoneurium]
    );

    let mut engine = RecordingEngine::new();
    submit(&graph, &Container::Geometry, &mut engine).unwrap();
    let plane = Container::Geometry.work_plane("wp1");
    let curve = engine.features_of_kind(&plane, FeatureKind::InterpolationCurve);
    assert_eq!(curve.len(), 1);
    assert_eq!(curve[0].properties.get("rtol"), Some(&PropValue::Number(0.02)));
}

#[test]
fn two_fascicles_share_the_registry_without_collisions() {
    let mut reg = IdentifierRegistry::new();
    let mut g = GraphBuilder::new(&mut reg);
    let t0 = TraceFile::new("f/0/inners", "0.txt");
    let t1 = TraceFile::new("f/1/inners", "0.txt");
    build_fascicle_ci(&mut g, 0, &t0, None).unwrap();
    build_fascicle_ci(&mut g, 1, &t1, None).unwrap();
    let graph = g.finish().unwrap();

    let mut engine = RecordingEngine::new();
    submit(&graph, &Container::Geometry, &mut engine).unwrap();
    assert_eq!(
        engine
            .features_of_kind(&Container::Geometry, FeatureKind::Extrude)
            .len(),
        2
    );
}

#[test]
fn fascicle_mesh_contributes_peri_then_endo() {
    let mut reg = IdentifierRegistry::new();
    let inners = vec![
        TraceFile::new("f/2/inners", "0.txt"),
        TraceFile::new("f/2/inners", "1.txt"),
    ];
    let outer = TraceFile::new("f/2/outer", "0.txt");
    let (built, graph) = {
        let mut g = GraphBuilder::new(&mut reg);
        let built = build_fascicle_mesh(&mut g, 2, &inners, &outer, Some(0.01), None).unwrap();
        (built, g.finish().unwrap())
    };
    let features: Vec<_> = built.contributions.iter().map(|c| c.feature.as_str()).collect();
    assert_eq!(features, vec!["outer2 Make Perineurium", "outer2 Make Endoneurium"]);
    assert_eq!(built.catalog.labels().count(), 4);

    let mut engine = RecordingEngine::new();
    submit(&graph, &Container::Geometry, &mut engine).unwrap();
    let inner_plane = Container::Geometry.work_plane("wp1");
    assert_eq!(
        engine
            .features_of_kind(&inner_plane, FeatureKind::InterpolationCurve)
            .len(),
        2
    );
    let endo = reg.get("outer2 Make Endoneurium").unwrap();
    assert_eq!(
        engine.property(&Container::Geometry, endo.as_str(), "workplane"),
        Some(&PropValue::expr("wp1"))
    );
}

#[test]
fn epineurium_variants_collide_in_one_scope() {
    let mut reg = IdentifierRegistry::new();
    let mut g = GraphBuilder::new(&mut reg);
    build_epi_circle(&mut g).unwrap();
    let nerve = TraceFile::new("slides/0/0", "nerve.txt");
    assert!(build_epi_trace(&mut g, &nerve, 0.01).is_err());
}

#[test]
fn epi_trace_emits_extrusion_on_trace_plane() {
    let mut reg = IdentifierRegistry::new();
    let nerve = TraceFile::new("slides/0/0", "nerve.txt");
    let graph = {
        let mut g = GraphBuilder::new(&mut reg);
        build_epi_trace(&mut g, &nerve, 0.005).unwrap();
        g.finish().unwrap()
    };
    let mut engine = RecordingEngine::new();
    submit(&graph, &Container::Geometry, &mut engine).unwrap();
    let ext = reg.get("Make Epineurium").unwrap();
    assert_eq!(
        engine.property(&Container::Geometry, ext.as_str(), "distance"),
        Some(&PropValue::exprs(["z_nerve"]))
    );
}

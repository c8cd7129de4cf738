//! End-to-end scenarios through ScenarioBuilder against the recording engine.

use cuff_assembly::{AssemblyError, InstanceConfig, InstanceSpec, MaterialsConfig, ModelConfig, NervePart};
use cuff_types::{FeatureKind, KeepFlags, UnionGroup};
use feature_graph::{GraphBuilder, IdentifierRegistry};
use model_engine::Container;
use part_library::TraceFile;
use proptest::prelude::*;
use test_harness::assertions::*;
use test_harness::helpers::{empty_template, two_stage_template};
use test_harness::{HarnessError, ScenarioBuilder};

const TWO_STAGE: &str = "TwoStage_Primitive";

fn two_stage_instance(label: &str, keep: [bool; 2]) -> InstanceSpec {
    InstanceSpec::new(label, TWO_STAGE)
        .param("R_in", "r_in")
        .param("L", "len")
        .keep(keep)
}

// ── Scenario 1: two-stage template ──────────────────────────────────────

#[test]
fn scenario_two_stage_template() {
    let template = two_stage_template(TWO_STAGE).unwrap();
    assert_eq!(template.registry().count(), 2);
    assert!(template.registry().has("A"));
    assert!(template.registry().has("B"));
    assert_eq!(template.catalog().labels().collect::<Vec<_>>(), vec!["A", "B"]);
    assert_forward_only(template.graph()).unwrap();

    let mut s = ScenarioBuilder::new();
    let part = s.install(template, None).unwrap();
    assert_feature_count(
        s.engine(),
        &Container::part(part.as_str()),
        FeatureKind::CumulativeSelection,
        2,
        "two-stage part",
    )
    .unwrap();
}

#[test]
fn builder_that_binds_nothing_yields_no_template() {
    assert!(empty_template("Nothing").unwrap().is_none());
}

// ── Scenario 2: complementary keep flags ────────────────────────────────

#[test]
fn scenario_complementary_keep_flags() {
    let mut s = ScenarioBuilder::new();
    s.install(two_stage_template(TWO_STAGE).unwrap(), None).unwrap();
    s.instance(two_stage_instance("inst1", [true, false])).unwrap();
    s.instance(two_stage_instance("inst2", [false, true])).unwrap();

    s.assert_resolvable("inst1_A")
        .unwrap()
        .assert_unresolvable("inst1_B")
        .unwrap()
        .assert_unresolvable("inst2_A")
        .unwrap()
        .assert_resolvable("inst2_B")
        .unwrap();

    let reg = s.assembly().registry();
    assert_eq!(reg.get("inst1_A").unwrap().as_str(), "pi1_csel1");
    assert_eq!(reg.get("inst2_B").unwrap().as_str(), "pi2_csel2");
    assert_imported(s.engine(), "geom1_pi1_csel1_dom", "inst1").unwrap();
    assert_imported(s.engine(), "geom1_pi2_csel2_bnd", "inst2").unwrap();
    assert!(assert_imported(s.engine(), "geom1_pi1_csel2_dom", "inst1").is_err());
}

#[test]
fn two_instances_have_disjoint_namespaces() {
    let mut s = ScenarioBuilder::new();
    s.install(two_stage_template(TWO_STAGE).unwrap(), None).unwrap();
    s.instance(two_stage_instance("left", [true, true])).unwrap();
    s.instance(two_stage_instance("right", [true, true])).unwrap();
    assert_disjoint_namespaces(s.assembly().registry(), "left", "right").unwrap();
    s.assert_resolvable("left_B").unwrap().assert_resolvable("right_B").unwrap();
}

// ── Scenario 3: unknown pseudonym ───────────────────────────────────────

#[test]
fn scenario_nonexistent_pseudonym() {
    let mut s = ScenarioBuilder::new();
    let mark = s.mark();

    let err = s.template("Nonexistent").unwrap_err();
    assert!(matches!(
        err,
        HarnessError::Assembly(AssemblyError::UnsupportedPrimitive { .. })
    ));
    let err = s.instance(InstanceSpec::new("x", "Nonexistent")).unwrap_err();
    assert!(matches!(
        err,
        HarnessError::Assembly(AssemblyError::UnsupportedPrimitive { .. })
    ));

    s.assert_untouched_since(mark).unwrap();
    assert_eq!(s.assembly().registry().count(), 0);
}

#[test]
fn supported_but_unbuilt_template_is_missing() {
    let mut s = ScenarioBuilder::new();
    let err = s
        .instance(InstanceSpec::new("c", "TubeCuff_Primitive"))
        .unwrap_err();
    assert!(matches!(
        err,
        HarnessError::Assembly(AssemblyError::MissingTemplate { .. })
    ));
}

// ── Scenario 4: linking against a discarded selection ───────────────────

#[test]
fn scenario_link_to_discarded_selection_is_a_no_op() {
    let model = ModelConfig::from_json(r#"{ "conductivities": { "silicone": { "value": "1e-12", "unit": "[S/m]" } } }"#)
        .unwrap();
    let mut s = ScenarioBuilder::new();
    s.install(two_stage_template(TWO_STAGE).unwrap(), None).unwrap();
    s.material("silicone", &model, &MaterialsConfig::default()).unwrap();
    s.instance(two_stage_instance("inst1", [true, false])).unwrap();

    let mark = s.mark();
    let config = InstanceConfig::from_json(r#"{ "materials": [ { "label_index": 1, "info": "silicone" } ] }"#)
        .unwrap();
    let report = s.link("inst1", &config).unwrap();
    assert!(report.linked.is_empty());
    assert_eq!(report.skipped, vec!["B"]);
    s.assert_untouched_since(mark).unwrap();

    let config = InstanceConfig::from_json(r#"{ "materials": [ { "label_index": 0, "info": "silicone" } ] }"#)
        .unwrap();
    let report = s.link("inst1", &config).unwrap();
    assert_eq!(report.linked.len(), 1);
    assert_feature_count(s.engine(), &Container::Materials, FeatureKind::MaterialLink, 1, "links")
        .unwrap();
}

// ── Full build ──────────────────────────────────────────────────────────

#[test]
fn cuff_on_nerve_full_build() {
    let model = ModelConfig::from_json(
        r#"{
            "conductivities": {
                "insulator": { "value": "1e-12", "unit": "[S/m]", "label": "silicone" },
                "medium": { "value": "1.76", "unit": "[S/m]", "label": "saline" }
            },
            "medium": { "distant_ground": true },
            "inner_interp_tol": 0.01,
            "outer_interp_tol": 0.01,
            "nerve_interp_tol": 0.005
        }"#,
    )
    .unwrap();
    let library = MaterialsConfig::default();

    let mut s = ScenarioBuilder::new();
    s.template("Medium_Primitive").unwrap();
    s.template("TubeCuff_Primitive").unwrap();
    s.material("insulator", &model, &library).unwrap();
    s.material("medium", &model, &library).unwrap();

    s.nerve(
        &NervePart::EpiTrace {
            nerve: TraceFile::new("slides/0/0/nerve", "0.txt"),
        },
        &model,
    )
    .unwrap();
    s.nerve(
        &NervePart::FascicleMesh {
            index: 0,
            inners: vec![TraceFile::new("fascicles/0/inners", "0.txt")],
            outer: TraceFile::new("fascicles/0/outer", "0.txt"),
        },
        &model,
    )
    .unwrap();

    let cuff = InstanceSpec::cuff("Tube Cuff", "TubeCuff_Primitive", "CorTec", 0).params_from(
        &InstanceConfig::from_json(
            r#"{ "def": {
                "N_holes": "0", "Tube_theta": "360 [deg]", "Center": "z_center",
                "R_in": "r_cuff_in", "R_out": "r_cuff_out", "Tube_L": "L_cuff",
                "Rot_def": "0", "D_hole": "0", "Buffer_hole": "0",
                "L_holecenter_cuffseam": "0", "Pitch_holecenter_holecenter": "0"
            } }"#,
        )
        .unwrap(),
    );
    s.instance(cuff).unwrap();
    s.media(&model).unwrap();

    let links = InstanceConfig::from_json(r#"{ "materials": [ { "label_index": 2, "info": "insulator" } ] }"#)
        .unwrap();
    assert_eq!(s.link("Tube Cuff", &links).unwrap().linked.len(), 1);
    let medium = InstanceConfig::from_json(r#"{ "materials": [ { "label_index": 0, "info": "medium" } ] }"#)
        .unwrap();
    assert_eq!(s.link("ProximalMedium", &medium).unwrap().linked.len(), 1);

    let manifest = s.finish().unwrap();
    assert_eq!(manifest.unions["allNervePartsUnion"].len(), 3);
    assert_eq!(manifest.unions["endoUnion"].len(), 1);
    assert_eq!(manifest.material_links.len(), 2);
    assert_feature_count(s.engine(), &Container::Physics, FeatureKind::Ground, 1, "ground").unwrap();

    let text = s.report().to_text();
    assert!(text.contains("\"Tube Cuff\" of TubeCuff_Primitive"));
    assert!(text.contains("Tube Cuff/CUFF FINAL/insulator"));
    assert_eq!(s.history().len(), 11);
}

#[test]
fn union_membership_grows_with_every_fascicle() {
    let model = ModelConfig {
        trace_interp_tol: Some(0.01),
        ..Default::default()
    };
    let mut s = ScenarioBuilder::new();
    for index in 0..4 {
        s.nerve(
            &NervePart::FascicleCI {
                index,
                inner: TraceFile::new(&format!("fascicles/{index}/inners"), "0.txt"),
                rhos: None,
            },
            &model,
        )
        .unwrap();
        assert_eq!(
            s.assembly().unions().members(UnionGroup::Endoneurium).len(),
            index + 1
        );
    }
    assert_feature_count(
        s.engine(),
        &Container::Physics,
        FeatureKind::ContactImpedance,
        4,
        "impedances",
    )
    .unwrap();
}

// ── Registry properties ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn shared_labels_never_collide_across_instances(count in 1usize..6) {
        let mut s = ScenarioBuilder::new();
        s.install(two_stage_template(TWO_STAGE).unwrap(), None).unwrap();
        for i in 0..count {
            s.instance(two_stage_instance(&format!("inst{i}"), [true, true])).unwrap();
        }
        let reg = s.assembly().registry();
        let mut ids: Vec<String> = (0..count)
            .flat_map(|i| ["A", "B"].map(|l| reg.get(&format!("inst{i}_{l}")).unwrap().to_string()))
            .collect();
        let before = ids.len();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), before);
    }

    #[test]
    fn graph_builder_ids_are_unique_per_scope(labels in proptest::collection::btree_set("[a-z]{1,6}", 1..12)) {
        let mut reg = IdentifierRegistry::new();
        let graph = {
            let mut g = GraphBuilder::new(&mut reg);
            g.declare_catalog(labels.iter().map(|l| (l.as_str(), KeepFlags::NONE))).unwrap();
            g.finish().unwrap()
        };
        prop_assert_eq!(graph.len(), labels.len());
        prop_assert_eq!(reg.count(), labels.len());
        for l in &labels {
            prop_assert!(reg.has(l));
        }
    }
}

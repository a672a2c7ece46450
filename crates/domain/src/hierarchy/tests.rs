use std::collections::BTreeSet;

use proptest::prelude::*;

use crate::Role;

use super::{
    AggregateSource, FlatHierarchyRecord, HierarchyNodePayload, HierarchyPayload, HierarchyTree,
    MismatchScope, NodeIdPayload, StructuralError,
};

fn node(id: &str, direct: i64, subordinados: Vec<HierarchyNodePayload>) -> HierarchyNodePayload {
    HierarchyNodePayload {
        id: NodeIdPayload::from(id),
        nombre: format!("Líder {id}"),
        rol: "lider_zona".to_owned(),
        personas_directas: Some(direct),
        total_personas: None,
        total_subordinados: None,
        subordinados,
    }
}

fn payload(root: HierarchyNodePayload) -> HierarchyPayload {
    HierarchyPayload {
        lider_general: Some(root),
        ..HierarchyPayload::default()
    }
}

fn flat(id: &str, parent_id: Option<&str>, direct: i64) -> FlatHierarchyRecord {
    FlatHierarchyRecord {
        id: NodeIdPayload::from(id),
        nombre: format!("Líder {id}"),
        rol: "lider_comunal".to_owned(),
        personas_directas: direct,
        parent_id: parent_id.map(NodeIdPayload::from),
    }
}

fn build_or_panic(payload: &HierarchyPayload) -> HierarchyTree {
    HierarchyTree::build(payload).unwrap_or_else(|error| panic!("unexpected error: {error}"))
}

#[test]
fn root_with_two_leaf_children_aggregates_counts() {
    let tree = build_or_panic(&payload(node(
        "root",
        5,
        vec![node("a", 2, vec![]), node("b", 2, vec![])],
    )));

    let root = tree.root();
    assert_eq!(root.total_person_count(), 9);
    assert_eq!(root.total_subordinate_count(), 2);
    assert_eq!(tree.summary().levels, 2);
    assert_eq!(tree.summary().total_leaders, 3);
    assert_eq!(tree.summary().total_people, 9);
}

#[test]
fn leaves_carry_their_direct_count_and_no_subordinates() {
    let tree = build_or_panic(&payload(node("root", 1, vec![node("leaf", 7, vec![])])));

    let leaf = tree.find("leaf");
    assert!(leaf.is_some_and(|leaf| leaf.is_leaf()));
    assert_eq!(leaf.map(|leaf| leaf.total_person_count()), Some(7));
    assert_eq!(leaf.map(|leaf| leaf.total_subordinate_count()), Some(0));
}

#[test]
fn child_reusing_root_id_is_rejected() {
    let result = HierarchyTree::build(&payload(node(
        "root",
        5,
        vec![node("root", 2, vec![])],
    )));

    assert_eq!(
        result,
        Err(StructuralError::SelfReference {
            id: "root".to_owned()
        })
    );
}

#[test]
fn grandchild_pointing_at_ancestor_is_a_cycle() {
    let result = HierarchyTree::build(&payload(node(
        "root",
        1,
        vec![node("a", 1, vec![node("b", 1, vec![node("root", 1, vec![])])])],
    )));

    assert_eq!(
        result,
        Err(StructuralError::Cycle {
            id: "root".to_owned()
        })
    );
}

#[test]
fn duplicate_id_across_branches_is_rejected() {
    let result = HierarchyTree::build(&payload(node(
        "root",
        1,
        vec![node("a", 1, vec![node("x", 1, vec![])]), node("b", 1, vec![node("x", 1, vec![])])],
    )));

    assert_eq!(
        result,
        Err(StructuralError::DuplicateId { id: "x".to_owned() })
    );
}

#[test]
fn numeric_and_textual_ids_share_one_namespace() {
    let mut root = node("7", 1, vec![]);
    root.subordinados.push(HierarchyNodePayload {
        id: NodeIdPayload::Number(7),
        ..node("ignored", 1, vec![])
    });

    let result = HierarchyTree::build(&payload(root));
    assert!(matches!(result, Err(StructuralError::SelfReference { .. })));
}

#[test]
fn missing_root_is_rejected() {
    let result = HierarchyTree::build(&HierarchyPayload::default());
    assert_eq!(result, Err(StructuralError::MissingRoot));
}

#[test]
fn negative_person_count_is_rejected() {
    let result = HierarchyTree::build(&payload(node("root", 1, vec![node("a", -3, vec![])])));
    assert!(matches!(
        result,
        Err(StructuralError::NegativeCount { ref id, value: -3, .. }) if id == "a"
    ));
}

#[test]
fn negative_network_summary_is_rejected() {
    let mut invalid = payload(node("root", 1, vec![]));
    invalid.niveles_jerarquia = Some(-1);

    let result = HierarchyTree::build(&invalid);
    assert!(matches!(
        result,
        Err(StructuralError::NegativeSummaryCount {
            field: "niveles_jerarquia",
            ..
        })
    ));
}

#[test]
fn blank_identifier_is_rejected() {
    let result = HierarchyTree::build(&payload(node("root", 1, vec![node("  ", 1, vec![])])));
    assert_eq!(result, Err(StructuralError::EmptyIdentifier));
}

#[test]
fn unknown_role_is_rejected() {
    let mut root = node("root", 1, vec![]);
    root.rol = "coordinador".to_owned();

    let result = HierarchyTree::build(&payload(root));
    assert!(matches!(result, Err(StructuralError::UnknownRole { .. })));
}

#[test]
fn traversal_is_depth_first_in_input_order_and_restartable() {
    let tree = build_or_panic(&payload(node(
        "root",
        1,
        vec![
            node("a", 1, vec![node("a1", 1, vec![]), node("a2", 1, vec![])]),
            node("b", 1, vec![node("b1", 1, vec![])]),
        ],
    )));

    let walk: Vec<(String, usize)> = tree
        .traverse()
        .map(|(node, depth)| (node.id().to_owned(), depth))
        .collect();
    let expected = vec![
        ("root".to_owned(), 0),
        ("a".to_owned(), 1),
        ("a1".to_owned(), 2),
        ("a2".to_owned(), 2),
        ("b".to_owned(), 1),
        ("b1".to_owned(), 2),
    ];
    assert_eq!(walk, expected);

    let again: Vec<(String, usize)> = tree
        .traverse()
        .map(|(node, depth)| (node.id().to_owned(), depth))
        .collect();
    assert_eq!(again, walk);
    assert_eq!(tree.traverse().len(), 6);
}

#[test]
fn subtree_traversal_yields_relative_depths() {
    let tree = build_or_panic(&payload(node(
        "root",
        1,
        vec![
            node("a", 1, vec![node("a1", 1, vec![node("a11", 1, vec![])])]),
            node("b", 1, vec![]),
        ],
    )));

    let Some(branch) = tree.find("a") else {
        panic!("branch a must exist");
    };
    let walk: Vec<(&str, usize)> = tree
        .traverse_subtree(branch)
        .map(|(node, depth)| (node.id(), depth))
        .collect();
    assert_eq!(walk, vec![("a", 0), ("a1", 1), ("a11", 2)]);
}

#[test]
fn children_and_path_lookups_follow_the_tree() {
    let tree = build_or_panic(&payload(node(
        "root",
        1,
        vec![node("a", 1, vec![node("a1", 1, vec![])]), node("b", 1, vec![])],
    )));

    let children: Vec<&str> = tree
        .children(tree.root())
        .map(|child| child.id())
        .collect();
    assert_eq!(children, vec!["a", "b"]);

    let path: Vec<&str> = tree
        .path_to("a1")
        .unwrap_or_default()
        .into_iter()
        .map(|node| node.id())
        .collect();
    assert_eq!(path, vec!["root", "a", "a1"]);
    assert!(tree.path_to("zz").is_none());
    assert!(tree.parent(tree.root()).is_none());
}

#[test]
fn direct_count_is_derived_from_reported_totals_when_absent() {
    let mut root = node("root", 0, vec![node("a", 0, vec![]), node("b", 0, vec![])]);
    root.personas_directas = None;
    root.total_personas = Some(9);
    for (child, total) in root.subordinados.iter_mut().zip([2, 2]) {
        child.personas_directas = None;
        child.total_personas = Some(total);
    }

    let tree = build_or_panic(&payload(root));
    assert_eq!(tree.root().direct_person_count(), 5);
    assert_eq!(tree.root().total_person_count(), 9);
    assert!(tree.verify_reported().is_empty());
}

#[test]
fn reported_totals_below_children_are_rejected() {
    let mut root = node("root", 0, vec![node("a", 0, vec![])]);
    root.personas_directas = None;
    root.total_personas = Some(1);
    root.subordinados[0].total_personas = Some(4);

    let result = HierarchyTree::build(&payload(root));
    assert!(matches!(
        result,
        Err(StructuralError::NegativeCount {
            field: "personas_directas",
            value: -3,
            ..
        })
    ));
}

#[test]
fn verification_lists_reported_mismatches() {
    let mut root = node("root", 5, vec![node("a", 2, vec![])]);
    root.total_personas = Some(7);
    root.total_subordinados = Some(4);
    let mut tree_payload = payload(root);
    tree_payload.total_personas_red = Some(7);
    tree_payload.total_lideres_red = Some(2);
    tree_payload.niveles_jerarquia = Some(4);

    let tree = build_or_panic(&tree_payload);
    let mismatches = tree.verify_reported();
    assert_eq!(mismatches.len(), 2);
    assert!(mismatches.iter().any(|mismatch| {
        mismatch.scope == MismatchScope::Node("root".to_owned())
            && mismatch.field == "total_subordinados"
            && mismatch.reported == 4
            && mismatch.derived == 1
    }));
    assert!(mismatches.iter().any(|mismatch| {
        mismatch.scope == MismatchScope::Network
            && mismatch.field == "niveles_jerarquia"
            && mismatch.derived == 2
    }));

    assert_eq!(tree.summary_from(AggregateSource::Reported).levels, 4);
    assert_eq!(tree.summary_from(AggregateSource::Derived).levels, 2);
    assert_eq!(tree.root().subordinate_total(AggregateSource::Reported), 4);
    assert_eq!(tree.root().subordinate_total(AggregateSource::Derived), 1);
}

#[test]
fn payload_deserializes_from_upstream_json() {
    let json = r#"{
        "lider_general": {
            "id": 1,
            "nombre": "Ana",
            "rol": "lider_departamental",
            "total_personas": 12,
            "total_subordinados": 1,
            "subordinados": [
                {
                    "id": "2",
                    "nombre": "Luis",
                    "rol": "lider_municipal",
                    "total_personas": 4,
                    "total_subordinados": 0,
                    "subordinados": []
                }
            ]
        },
        "total_personas_red": 12,
        "total_lideres_red": 2,
        "niveles_jerarquia": 2
    }"#;

    let parsed = serde_json::from_str::<HierarchyPayload>(json);
    assert!(parsed.is_ok());
    let tree = build_or_panic(&parsed.unwrap_or_default());

    assert_eq!(tree.root().role(), Role::LiderDepartamental);
    assert_eq!(tree.root().direct_person_count(), 8);
    assert_eq!(tree.root().total_person_count(), 12);
    assert!(tree.verify_reported().is_empty());
}

#[test]
fn flat_roster_builds_in_input_child_order() {
    let tree = HierarchyTree::from_flat(&[
        flat("b", Some("root"), 2),
        flat("root", None, 5),
        flat("a", Some("root"), 2),
        flat("a1", Some("a"), 1),
    ])
    .unwrap_or_else(|error| panic!("unexpected error: {error}"));

    let ids: Vec<&str> = tree.traverse().map(|(node, _)| node.id()).collect();
    assert_eq!(ids, vec!["root", "b", "a", "a1"]);
    assert_eq!(tree.root().total_person_count(), 10);
    assert_eq!(tree.root().total_subordinate_count(), 3);
    assert_eq!(tree.summary().levels, 3);
}

#[test]
fn flat_roster_rejects_structural_errors() {
    assert_eq!(HierarchyTree::from_flat(&[]), Err(StructuralError::MissingRoot));
    assert!(matches!(
        HierarchyTree::from_flat(&[flat("a", None, 1), flat("b", None, 1)]),
        Err(StructuralError::MultipleRoots { .. })
    ));
    assert!(matches!(
        HierarchyTree::from_flat(&[flat("root", None, 1), flat("a", Some("a"), 1)]),
        Err(StructuralError::SelfReference { .. })
    ));
    assert!(matches!(
        HierarchyTree::from_flat(&[flat("root", None, 1), flat("a", Some("zz"), 1)]),
        Err(StructuralError::UnknownParent { .. })
    ));
    assert!(matches!(
        HierarchyTree::from_flat(&[flat("root", None, 1), flat("root", Some("root"), 1)]),
        Err(StructuralError::DuplicateId { .. })
    ));
    assert!(matches!(
        HierarchyTree::from_flat(&[
            flat("root", None, 1),
            flat("a", Some("b"), 1),
            flat("b", Some("a"), 1),
        ]),
        Err(StructuralError::Cycle { .. })
    ));
}

#[test]
fn structural_error_converts_to_unavailable_app_error() {
    let error = terreno_core::AppError::from(StructuralError::MissingRoot);
    assert!(matches!(error, terreno_core::AppError::Unavailable(_)));
}

/// Random tree shapes encoded as `parents[i] < i + 1` for node `i + 1`.
fn tree_shape() -> impl Strategy<Value = (Vec<usize>, Vec<i64>)> {
    (1..48_usize).prop_flat_map(|node_count| {
        let parents = (1..node_count)
            .map(|index| 0..index)
            .collect::<Vec<_>>();
        (parents, proptest::collection::vec(0..50_i64, node_count))
    })
}

fn nested_from_shape(parents: &[usize], directs: &[i64]) -> HierarchyPayload {
    fn assemble(index: usize, parents: &[usize], directs: &[i64]) -> HierarchyNodePayload {
        let children = parents
            .iter()
            .enumerate()
            .filter(|(_, parent)| **parent == index)
            .map(|(child, _)| assemble(child + 1, parents, directs))
            .collect();
        node(&format!("n{index}"), directs[index], children)
    }

    payload(assemble(0, parents, directs))
}

proptest! {
    #[test]
    fn prop_subordinate_total_counts_every_non_root_node((parents, directs) in tree_shape()) {
        let tree = HierarchyTree::build(&nested_from_shape(&parents, &directs));
        prop_assert!(tree.is_ok());
        let tree = tree.unwrap_or_else(|_| unreachable!());
        prop_assert_eq!(tree.root().total_subordinate_count(), parents.len() as u64);
        prop_assert_eq!(
            tree.root().total_person_count(),
            directs.iter().map(|value| *value as u64).sum::<u64>()
        );
    }

    #[test]
    fn prop_uniform_unit_counts_total_the_node_count((parents, _) in tree_shape()) {
        let ones = vec![1_i64; parents.len() + 1];
        let tree = HierarchyTree::build(&nested_from_shape(&parents, &ones));
        prop_assert!(tree.is_ok());
        let tree = tree.unwrap_or_else(|_| unreachable!());
        prop_assert_eq!(tree.root().total_person_count(), tree.len() as u64);
    }

    #[test]
    fn prop_aggregate_is_idempotent((parents, directs) in tree_shape()) {
        let tree = HierarchyTree::build(&nested_from_shape(&parents, &directs));
        prop_assert!(tree.is_ok());
        let tree = tree.unwrap_or_else(|_| unreachable!());
        let mut again = tree.clone();
        again.aggregate();
        again.aggregate();
        prop_assert_eq!(again, tree);
    }

    #[test]
    fn prop_levels_match_distinct_depths((parents, directs) in tree_shape()) {
        let tree = HierarchyTree::build(&nested_from_shape(&parents, &directs));
        prop_assert!(tree.is_ok());
        let tree = tree.unwrap_or_else(|_| unreachable!());
        let depths: BTreeSet<usize> = tree.traverse().map(|(_, depth)| depth).collect();
        prop_assert_eq!(tree.summary().levels, depths.len() as u64);
    }

    #[test]
    fn prop_every_node_total_matches_its_subtree((parents, directs) in tree_shape()) {
        let tree = HierarchyTree::build(&nested_from_shape(&parents, &directs));
        prop_assert!(tree.is_ok());
        let tree = tree.unwrap_or_else(|_| unreachable!());
        for (node, _) in tree.traverse() {
            let subtree: Vec<_> = tree.traverse_subtree(node).collect();
            prop_assert_eq!(node.total_subordinate_count(), subtree.len() as u64 - 1);
            prop_assert_eq!(
                node.total_person_count(),
                subtree.iter().map(|(member, _)| member.direct_person_count()).sum::<u64>()
            );
        }
    }

    #[test]
    fn prop_flat_and_nested_rosters_agree((parents, directs) in tree_shape()) {
        let records: Vec<FlatHierarchyRecord> = directs
            .iter()
            .enumerate()
            .map(|(index, direct)| FlatHierarchyRecord {
                id: NodeIdPayload::Text(format!("n{index}")),
                nombre: String::new(),
                rol: "lider_zona".to_owned(),
                personas_directas: *direct,
                parent_id: index
                    .checked_sub(1)
                    .map(|position| NodeIdPayload::Text(format!("n{}", parents[position]))),
            })
            .collect();

        let nested = HierarchyTree::build(&nested_from_shape(&parents, &directs));
        let flat = HierarchyTree::from_flat(&records);
        prop_assert!(nested.is_ok() && flat.is_ok());
        let nested = nested.unwrap_or_else(|_| unreachable!());
        let flat = flat.unwrap_or_else(|_| unreachable!());

        let nested_walk: Vec<(String, usize, u64)> = nested
            .traverse()
            .map(|(node, depth)| (node.id().to_owned(), depth, node.total_person_count()))
            .collect();
        let flat_walk: Vec<(String, usize, u64)> = flat
            .traverse()
            .map(|(node, depth)| (node.id().to_owned(), depth, node.total_person_count()))
            .collect();
        prop_assert_eq!(nested_walk, flat_walk);
    }
}

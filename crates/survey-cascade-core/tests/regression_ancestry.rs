// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Survey Cascade Contributors

use survey_cascade_core::ancestry::{build_chain, on_select, picker_levels};
use survey_cascade_core::hierarchy::rows_from_csv;
use survey_cascade_core::{HierarchyError, HierarchyStore};
use std::io::Cursor;

const ADMIN_CSV: &str = "id,name,parent,entity,full_path_name
1,Kenya,,,Kenya
2,Nairobi,1,,Kenya > Nairobi
3,Kisumu,1,,Kenya > Kisumu
4,Westlands,2,,Kenya > Nairobi > Westlands
5,Kibra,2,,Kenya > Nairobi > Kibra
6,Parklands,4,,Kenya > Nairobi > Westlands > Parklands
7,Kisumu Central,3,,Kenya > Kisumu > Kisumu Central
";

fn admin_store() -> HierarchyStore {
    HierarchyStore::from_rows(rows_from_csv(Cursor::new(ADMIN_CSV)).unwrap())
}

#[test]
fn test_every_chain_starts_at_root_and_ends_at_leaf() {
    let store = admin_store();
    for node in store.nodes() {
        let chain = build_chain(&store, node.id).unwrap();
        assert!(chain.first().unwrap().parent.is_none());
        assert_eq!(chain.last().unwrap().id, node.id);
        for pair in chain.windows(2) {
            assert_eq!(pair[1].parent, Some(pair[0].id));
        }
    }
}

#[test]
fn test_picker_follows_reassignment() {
    let store = admin_store();
    let chain = build_chain(&store, 6).unwrap();
    assert_eq!(picker_levels(&store, &chain).len(), 4);

    // Move the assignment to another county, then drill into it.
    let chain = on_select(&store, &chain, 1, 3).unwrap();
    let levels = picker_levels(&store, &chain);
    assert_eq!(levels.len(), 3);
    assert_eq!(levels[1].selected, Some(3));
    assert_eq!(levels[2].selected, None);
    assert_eq!(levels[2].options[0].name, "Kisumu Central");

    let chain = on_select(&store, &chain, 2, 7).unwrap();
    let levels = picker_levels(&store, &chain);
    assert_eq!(levels.len(), 3);
    assert_eq!(levels[2].selected, Some(7));
}

#[test]
fn test_cyclic_rows_are_a_hard_error() {
    let data = "id,name,parent\n1,A,2\n2,B,1\n3,C,2\n";
    let store = HierarchyStore::from_rows(rows_from_csv(Cursor::new(data)).unwrap());
    assert!(matches!(
        build_chain(&store, 3),
        Err(HierarchyError::CycleDetected { leaf: 3, .. })
    ));
}

#[test]
fn test_picker_rejects_selection_from_another_branch() {
    let store = admin_store();
    let chain = build_chain(&store, 4).unwrap();

    // Kisumu Central cannot sit under Nairobi.
    let err = on_select(&store, &chain, 2, 7).unwrap_err();
    assert!(matches!(
        err,
        HierarchyError::NotAChild {
            id: 7,
            expected: Some(2)
        }
    ));
    assert_eq!(err.to_string(), "Node 7 is not a child of Some(2)");

    assert!(matches!(
        on_select(&store, &chain, 4, 6),
        Err(HierarchyError::LevelOutOfRange { index: 4, len: 3 })
    ));

    // The chain passed in is untouched and still valid.
    let levels = picker_levels(&store, &chain);
    assert_eq!(levels[1].selected, Some(2));
    assert_eq!(levels[2].selected, Some(4));
}

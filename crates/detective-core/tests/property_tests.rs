//! # Property-Based Tests
//!
//! Invariants of the game store and the evidence board under arbitrary
//! action sequences.

use detective_core::{
    BoardKind, Entity, EntityType, EvidenceBoard, GameStore, GraphEdge, GraphNode, ItemKind,
    JsonMap, NeighborsResponse, PinnedItem, decode_state, encode_state,
};
use proptest::collection::{btree_set, vec};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn item_kind() -> impl Strategy<Value = ItemKind> {
    prop_oneof![
        Just(ItemKind::Document),
        Just(ItemKind::Entity),
        Just(ItemKind::Chunk),
    ]
}

fn pin(id: &str, kind: ItemKind) -> PinnedItem {
    PinnedItem::new(id, kind, "c1", format!("label {id}"))
}

fn entity(id: &str) -> Entity {
    Entity {
        entity_id: id.to_string(),
        case_id: "c1".to_string(),
        entity_type: EntityType::Person,
        name: format!("Person {id}"),
        attrs_json: JsonMap::new(),
    }
}

fn store(seed: u64) -> GameStore {
    let mut store = GameStore::with_seed(seed);
    store.set_current_case("c1");
    store
}

// =============================================================================
// STORE PROPERTIES
// =============================================================================

proptest! {
    /// Pinning distinct ids yields exactly one pin per id.
    #[test]
    fn distinct_pins_are_all_kept(ids in btree_set("[a-z0-9]{1,8}", 0..40), kind in item_kind()) {
        let mut store = store(1);
        for id in &ids {
            store.pin_item(pin(id, kind));
        }
        prop_assert_eq!(store.pinned_items().len(), ids.len());
    }

    /// Repeated pins never duplicate an id, pins or board items.
    #[test]
    fn pins_and_board_stay_id_unique(ids in vec("[a-c]", 0..60), kinds in vec(item_kind(), 60)) {
        let mut store = store(2);
        for (id, kind) in ids.iter().zip(kinds) {
            store.pin_item(pin(id, kind));
        }

        let pin_ids: BTreeSet<_> = store.pinned_items().iter().map(|p| p.id.clone()).collect();
        let board_ids: BTreeSet<_> = store.board_items().iter().map(|b| b.id.clone()).collect();
        prop_assert_eq!(pin_ids.len(), store.pinned_items().len());
        prop_assert_eq!(board_ids.len(), store.board_items().len());
    }

    /// Pin followed by unpin of a fresh id restores the pinned set.
    #[test]
    fn pin_unpin_round_trip(existing in btree_set("[a-z]{1,6}", 0..10), fresh in "[0-9]{1,6}", kind in item_kind()) {
        let mut store = store(3);
        for id in &existing {
            store.pin_item(pin(id, ItemKind::Document));
        }
        let before = store.pinned_items().to_vec();
        let board_before = store.board_items().to_vec();

        store.pin_item(pin(&fresh, kind));
        store.unpin_item(fresh.as_str());

        prop_assert_eq!(store.pinned_items(), before.as_slice());
        prop_assert_eq!(store.board_items(), board_before.as_slice());
    }

    /// Toggling a suspect twice restores its membership.
    #[test]
    fn toggle_suspect_is_an_involution(initial in btree_set("[a-e]", 0..5), x in "[a-e]") {
        let mut store = store(4);
        for id in &initial {
            store.toggle_suspect(id.as_str());
        }
        let was = store.is_suspected(&x);

        store.toggle_suspect(x.as_str());
        prop_assert_ne!(store.is_suspected(&x), was);
        store.toggle_suspect(x.as_str());
        prop_assert_eq!(store.is_suspected(&x), was);
        prop_assert_eq!(store.suspected_entities(), &initial);
    }

    /// Switching to a different case leaves nothing behind.
    #[test]
    fn case_switch_empties_collections(ids in vec("[a-z]{1,4}", 1..20), a in "[a-z]{3}", b in "[A-Z]{3}") {
        let mut store = GameStore::with_seed(5);
        store.set_current_case(a.as_str());
        for id in &ids {
            store.open_doc(id.as_str());
            store.pin_item(pin(id, ItemKind::Entity));
            store.toggle_suspect(id.as_str());
        }
        store.use_hint();

        store.set_current_case(b.as_str());

        prop_assert!(store.pinned_items().is_empty());
        prop_assert!(store.suspected_entities().is_empty());
        prop_assert!(store.opened_docs().is_empty());
        prop_assert!(store.board_items().is_empty());
        prop_assert_eq!(store.hints_used(), 0);
    }

    /// Snapshots survive the persistence envelope unchanged.
    #[test]
    fn state_envelope_round_trip(ids in vec("[a-z]{1,4}", 0..20), seed in any::<u64>()) {
        let mut store = store(seed);
        for id in &ids {
            store.pin_item(pin(id, ItemKind::Document));
            store.open_doc(id.as_str());
        }

        let bytes = encode_state(store.state()).expect("encode");
        let decoded: detective_core::GameState = decode_state(&bytes).expect("decode");
        prop_assert_eq!(&decoded, store.state());
    }
}

// =============================================================================
// BOARD PROPERTIES
// =============================================================================

proptest! {
    /// Adding the same entity any number of times yields one node per id.
    #[test]
    fn board_nodes_are_id_unique(ids in vec("[a-f]", 0..50), seed in any::<u64>()) {
        let mut board = EvidenceBoard::for_case("c1").seeded(seed);
        for id in &ids {
            board.add_entity(&entity(id), None);
        }

        let unique: BTreeSet<_> = ids.iter().collect();
        let node_ids: BTreeSet<_> = board.nodes().iter().map(|n| n.id.clone()).collect();
        prop_assert_eq!(board.nodes().len(), unique.len());
        prop_assert_eq!(node_ids.len(), unique.len());
    }

    /// Every edge on the board connects two nodes on the board.
    #[test]
    fn no_dangling_edges(
        links in vec(("[a-e]", "[a-e]"), 0..30),
        removals in vec("[a-e]", 0..5),
    ) {
        let mut board = EvidenceBoard::for_case("c1").seeded(9);
        board.add_entity(&entity("a"), None);

        let neighbors: BTreeSet<_> = links.iter().flat_map(|(s, t)| [s.clone(), t.clone()]).collect();
        let response = NeighborsResponse {
            entity_id: "a".into(),
            neighbors: neighbors
                .iter()
                .map(|id| GraphNode {
                    entity_id: id.clone(),
                    name: id.clone(),
                    entity_type: EntityType::Person,
                    properties: JsonMap::new(),
                })
                .collect(),
            edges: links
                .iter()
                .map(|(s, t)| GraphEdge {
                    source_id: s.clone(),
                    target_id: t.clone(),
                    relationship_type: "SENT".into(),
                    properties: JsonMap::new(),
                })
                .collect(),
            total: neighbors.len(),
        };
        board.apply_neighbors(&response);
        for id in &removals {
            board.remove(id);
        }

        for edge in board.edges() {
            prop_assert!(board.contains(&edge.source));
            prop_assert!(board.contains(&edge.target));
        }
    }

    /// Store mirroring never duplicates a node, however often it runs.
    #[test]
    fn repeated_sync_is_stable(ids in btree_set("[a-z]{1,4}", 0..15), rounds in 1usize..4) {
        let mut store = store(6);
        for id in &ids {
            store.pin_item(pin(id, ItemKind::Entity));
        }

        let mut board = EvidenceBoard::new().seeded(6);
        for _ in 0..rounds {
            board.sync_from_store(store.state());
        }
        prop_assert_eq!(board.nodes().len(), ids.len());
        prop_assert!(board.nodes().iter().all(|n| n.kind == BoardKind::Entity));
    }
}

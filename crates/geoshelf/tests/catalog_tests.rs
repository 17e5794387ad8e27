mod common;

use std::sync::Arc;

use geoshelf::{
    CatalogBackend, FileType, MemoryBackend, NodeId, ResourceStore, CATALOG_KEY,
    OUTPUT_CATALOG_KEY,
};

use common::builders::{empty_store, fixture};

#[test]
fn children_of_partitions_the_catalog() {
    let f = fixture();

    let root_children = f.store.children_of(&NodeId::root());
    let imagery_children = f.store.children_of(&f.imagery);

    // Every node appears under exactly one parent
    assert_eq!(root_children.len(), 2); // Imagery + the zip
    assert_eq!(imagery_children.len(), 2);
    for node in &imagery_children {
        assert!(root_children.iter().all(|r| r.id != node.id));
        assert_eq!(node.parent_id, f.imagery);
    }
}

#[test]
fn search_is_global_while_browsing_is_folder_scoped() {
    let f = fixture();

    // The GF1 raster is not listed at the root...
    assert!(f
        .store
        .children_of(&NodeId::root())
        .iter()
        .all(|n| !n.name.starts_with("GF1")));
    // ...but global search finds it from anywhere, case-insensitively
    let hits = f.store.search("gf1_pms2");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, f.gf1);
}

#[test]
fn save_is_idempotent() {
    let f = fixture();
    let snapshot = f.store.snapshot();

    f.backend.save(CATALOG_KEY, &snapshot).unwrap();
    f.backend.save(CATALOG_KEY, &snapshot).unwrap();

    let loaded = f.backend.load(CATALOG_KEY).unwrap();
    assert_eq!(loaded.len(), snapshot.len());
    for (a, b) in loaded.iter().zip(snapshot.iter()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.name, b.name);
    }
}

#[test]
fn never_written_key_yields_seed_catalog() {
    let backend = Arc::new(MemoryBackend::new());
    let store = ResourceStore::open(backend, CATALOG_KEY).unwrap();

    assert!(!store.is_empty());
    // The seed carries the PMS2-flavored sample acquisition
    assert_eq!(store.search("PMS2").len(), 1);
}

#[test]
fn catalog_keys_are_independent_stores() {
    let (backend, mut store) = empty_store();
    store
        .upload_file(&NodeId::root(), "input.tif", FileType::Raster, 0, None)
        .unwrap();

    // The output catalog key was never written: still the built-in seed
    let output = ResourceStore::open(backend, OUTPUT_CATALOG_KEY).unwrap();
    assert!(output.search("input.tif").is_empty());
}

#[test]
fn every_mutation_is_visible_to_a_freshly_opened_surface() {
    let (backend, mut store) = empty_store();
    let folder = store.create_folder(&NodeId::root(), "Scenes").unwrap();
    store.rename(&folder, "Acquisitions").unwrap();
    let file = store
        .upload_file(&folder, "a.tif", FileType::Raster, 1, None)
        .unwrap();
    store.remove(&file).unwrap();

    let reopened = ResourceStore::open(backend, CATALOG_KEY).unwrap();
    assert_eq!(reopened.get(&folder).unwrap().name, "Acquisitions");
    assert!(reopened.get(&file).is_none());
}

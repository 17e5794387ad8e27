//! Builder helpers for creating test catalogs programmatically.

#![allow(dead_code)]

use std::sync::Arc;

use geoshelf::{
    FileType, MemoryBackend, NodeId, ResourceStore, SatelliteConfig, CATALOG_KEY,
};

/// Opens a store over a fresh, initially empty in-memory backend.
pub fn empty_store() -> (Arc<MemoryBackend>, ResourceStore) {
    let backend = Arc::new(MemoryBackend::empty());
    let store = ResourceStore::open(backend.clone(), CATALOG_KEY).unwrap();
    (backend, store)
}

/// The canonical fixture: root contains an `Imagery` folder with one GF1
/// PMS2 raster and one ZY3 raster, plus an L2A archive at the root.
pub struct Fixture {
    pub backend: Arc<MemoryBackend>,
    pub store: ResourceStore,
    pub imagery: NodeId,
    pub gf1: NodeId,
    pub zy3: NodeId,
    pub l2a_zip: NodeId,
}

pub fn fixture() -> Fixture {
    let (backend, mut store) = empty_store();
    let imagery = store.create_folder(&NodeId::root(), "Imagery").unwrap();
    let gf1 = store
        .upload_file(
            &imagery,
            "GF1_PMS2_E115.9_N29.1_20240512_L1A0007654321_PMS2.tif",
            FileType::Raster,
            412,
            None,
        )
        .unwrap();
    let zy3 = store
        .upload_file(
            &imagery,
            "ZY302_TMS_E115.2_N28.7_20240315.tif",
            FileType::Raster,
            198,
            None,
        )
        .unwrap();
    let l2a_zip = store
        .upload_file(
            &NodeId::root(),
            "S2B_OPER_MSI_L2A_TL_T50RKU_20240601_SAFE.zip",
            FileType::Archive,
            734,
            None,
        )
        .unwrap();

    Fixture {
        backend,
        store,
        imagery,
        gf1,
        zy3,
        l2a_zip,
    }
}

/// GF1/PMS2 substring config with no regex.
pub fn pms2_config() -> SatelliteConfig {
    SatelliteConfig::new("GF1 PMS2", "GF1", "PMS2", "PMS2", "8m")
}

/// Regex-only config matching L2A zip archives.
pub fn l2a_regex_config() -> SatelliteConfig {
    SatelliteConfig::new("S2 L2A", "S2", "MSI", "L2A", "10m").with_regex(r".*_L2A_.*\.zip")
}

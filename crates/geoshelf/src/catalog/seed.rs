//! Built-in seed catalog, returned for store keys that have never been
//! written. Ids are fixed so repeated loads of an unwritten key agree.

use chrono::Utc;

use crate::catalog::node::{FileType, NodeId, NodeKind, ResourceNode};

fn seed_node(id: &str, name: &str, parent: NodeId, kind: NodeKind) -> ResourceNode {
    ResourceNode {
        id: NodeId::from(id),
        name: name.to_string(),
        parent_id: parent,
        kind,
        file_type: None,
        size: 0,
        modified_at: Utc::now(),
        satellite_type: None,
        sensor: None,
        code: None,
        resolution: None,
        published_services: vec![],
        content: None,
    }
}

pub fn seed_catalog() -> Vec<ResourceNode> {
    let root = NodeId::root();

    let imagery = seed_node("seed-imagery", "Imagery", root.clone(), NodeKind::Folder);
    let archives = seed_node("seed-archives", "Archives", root.clone(), NodeKind::Folder);

    let mut gf1 = seed_node(
        "seed-gf1-pms2",
        "GF1_PMS2_E115.9_N29.1_20240512_L1A0007654321_PMS2.tif",
        imagery.id.clone(),
        NodeKind::File,
    );
    gf1.file_type = Some(FileType::Raster);
    gf1.size = 412_873_728;
    gf1.satellite_type = Some("GF1".to_string());
    gf1.sensor = Some("PMS2".to_string());
    gf1.code = Some("PMS2".to_string());
    gf1.resolution = Some("8m".to_string());

    let mut zy3 = seed_node(
        "seed-zy3-tms",
        "ZY302_TMS_E115.2_N28.7_20240315_L1A0006120042.tif",
        imagery.id.clone(),
        NodeKind::File,
    );
    zy3.file_type = Some(FileType::Raster);
    zy3.size = 198_180_864;
    zy3.satellite_type = Some("ZY3".to_string());
    zy3.sensor = Some("TMS".to_string());
    zy3.code = Some("TMS".to_string());
    zy3.resolution = Some("2.5m".to_string());

    let mut s2 = seed_node(
        "seed-s2-l2a",
        "S2B_OPER_MSI_L2A_TL_T50RKU_20240601_SAFE.zip",
        archives.id.clone(),
        NodeKind::File,
    );
    s2.file_type = Some(FileType::Archive);
    s2.size = 734_003_200;
    s2.satellite_type = Some("S2".to_string());
    s2.sensor = Some("MSI".to_string());
    s2.code = Some("L2A".to_string());
    s2.resolution = Some("10m".to_string());

    let mut stats = seed_node(
        "seed-landcover-stats",
        "landcover_stats_2024.csv",
        root.clone(),
        NodeKind::File,
    );
    stats.file_type = Some(FileType::Tabular);
    stats.size = 58_412;
    stats.content = Some("class,area_km2\nforest,1280.4\nwater,214.9\n".to_string());

    let mut readme = seed_node("seed-readme", "README.md", root, NodeKind::File);
    readme.file_type = Some(FileType::Markup);
    readme.size = 1_024;
    readme.content = Some("# Catalog\n\nSample satellite acquisitions.\n".to_string());

    vec![imagery, archives, gf1, zy3, s2, stats, readme]
}

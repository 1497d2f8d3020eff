//! JSON shape of exported layer paths.

use serde::Serialize;
use stratum_slicer::{LayerPaths, SliceSettings, SliceStats, Slicer};

/// One layer of segments.
#[derive(Serialize)]
pub struct LayerRecord {
    pub level: usize,
    pub height: f64,
    pub raft: bool,
    /// Leading entries of `segments` that are walls.
    pub walls: usize,
    pub segments: Vec<[[f64; 3]; 2]>,
}

impl From<&LayerPaths> for LayerRecord {
    fn from(paths: &LayerPaths) -> Self {
        Self {
            level: paths.level,
            height: paths.height,
            raft: paths.raft,
            walls: paths.wall_count,
            segments: paths
                .segments
                .iter()
                .map(|[a, b]| [[a.x, a.y, a.z], [b.x, b.y, b.z]])
                .collect(),
        }
    }
}

/// Every layer of a run, with the settings and stats that produced it.
#[derive(Serialize)]
pub struct PathsDocument<'a> {
    pub settings: &'a SliceSettings,
    pub stats: &'a SliceStats,
    pub layers: Vec<LayerRecord>,
}

impl<'a> PathsDocument<'a> {
    pub fn new(slicer: &'a Slicer) -> Self {
        Self {
            settings: slicer.settings(),
            stats: slicer.stats(),
            layers: slicer.export_paths().iter().map(LayerRecord::from).collect(),
        }
    }

    pub fn segment_count(&self) -> usize {
        self.layers.iter().map(|l| l.segments.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratum_math::Point3;
    use stratum_mesh::Mesh;
    use stratum_slicer::FillType;

    #[test]
    fn test_document_serializes_every_layer() {
        let mesh = Mesh::cuboid(Point3::origin(), Point3::new(2.0, 2.0, 1.0));
        let mut settings = SliceSettings {
            slice_height: 0.5,
            ..Default::default()
        };
        settings.fill.fill_type = FillType::None;
        let slicer = Slicer::new(&mesh, settings).unwrap();
        let document = PathsDocument::new(&slicer);
        assert_eq!(document.layers.len(), 3);
        assert!(document.segment_count() > 0);

        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(value["layers"].as_array().unwrap().len(), 3);
        assert_eq!(value["settings"]["fill"]["fill_type"], "none");
        assert_eq!(value["stats"]["mesh_layers"], 3);
        let first = &value["layers"][0]["segments"][0][0];
        assert_eq!(first.as_array().unwrap().len(), 3);
        assert_eq!(first[2], 0.25);
    }
}

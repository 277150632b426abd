//! One batch of detector data: the point store, the doublet index and the cuts.
//!
//! An `Event` holds `num_layers` layers of points and `num_layers - 1` levels
//! of doublets. Level `L` links points of layer `L` (inner) to points of
//! layer `L + 1` (outer). Events are immutable once validated, and can be
//! snapshotted to disk with rkyv for fast re-runs.

use rkyv::{Archive, Deserialize, Serialize};
use tracing::info;

use crate::error::InputError;
use crate::{Cuts, DoubletLevel, Layer};

#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct Event {
    pub cuts: Cuts,
    /// Points, one entry per detector layer (innermost first).
    pub layers: Vec<Layer>,
    /// Doublets, one entry per level (`layers.len() - 1` entries).
    pub levels: Vec<DoubletLevel>,
}

impl Event {
    /// Assemble and validate an event.
    pub fn new(cuts: Cuts, layers: Vec<Layer>, levels: Vec<DoubletLevel>) -> Result<Self, InputError> {
        let event = Self {
            cuts,
            layers,
            levels,
        };
        event.validate()?;
        Ok(event)
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// Total number of hits over all layers.
    pub fn num_points(&self) -> usize {
        self.layers.iter().map(Layer::len).sum()
    }

    /// Total number of doublets over all levels.
    pub fn num_doublets(&self) -> usize {
        self.levels.iter().map(DoubletLevel::len).sum()
    }

    /// Check the structural invariants the finder relies on:
    /// one more layer than levels, equal-length id arrays per level,
    /// and every doublet endpoint referencing an existing point.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.layers.len() != self.levels.len() + 1 {
            return Err(InputError::LayerCount {
                expected: self.levels.len() + 1,
                found: self.layers.len(),
            });
        }
        for (level, doublets) in self.levels.iter().enumerate() {
            if doublets.inner_ids().len() != doublets.outer_ids().len() {
                return Err(InputError::UnevenLevel {
                    level,
                    inner: doublets.inner_ids().len(),
                    outer: doublets.outer_ids().len(),
                });
            }
            let inner_layer = &self.layers[level];
            let outer_layer = &self.layers[level + 1];
            for (i, d) in doublets.iter().enumerate() {
                if !inner_layer.contains(d.inner) {
                    return Err(InputError::PointOutOfRange {
                        level,
                        doublet: i,
                        point: d.inner,
                        layer: level,
                        len: inner_layer.len(),
                    });
                }
                if !outer_layer.contains(d.outer) {
                    return Err(InputError::PointOutOfRange {
                        level,
                        doublet: i,
                        point: d.outer,
                        layer: level + 1,
                        len: outer_layer.len(),
                    });
                }
            }
        }
        Ok(())
    }
}

// ── Snapshots ───────────────────────────────────────────────────────────────

impl Event {
    /// Serialize the event to bytes using rkyv.
    pub fn to_rkyv_bytes(&self) -> anyhow::Result<Vec<u8>> {
        let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map_err(|e| anyhow::anyhow!("rkyv serialization failed: {}", e))?;
        Ok(bytes.to_vec())
    }

    /// Save the event to a file using rkyv.
    pub fn save_to_file(&self, path: &str) -> anyhow::Result<()> {
        let bytes = self.to_rkyv_bytes()?;
        std::fs::write(path, &bytes)?;
        info!("Saved event snapshot to {} ({} bytes)", path, bytes.len());
        Ok(())
    }

    /// Load and validate an event from an rkyv snapshot.
    pub fn load_from_file(path: &str) -> anyhow::Result<Self> {
        let raw = std::fs::read(path)?;
        let mut bytes = rkyv::util::AlignedVec::<16>::with_capacity(raw.len());
        bytes.extend_from_slice(&raw);
        let event = rkyv::from_bytes::<Self, rkyv::rancor::Error>(&bytes)
            .map_err(|e| anyhow::anyhow!("rkyv deserialization failed: {}", e))?;
        event.validate()?;
        info!(
            "Loaded event snapshot: {} layers, {} points, {} doublets",
            event.num_layers(),
            event.num_points(),
            event.num_doublets()
        );
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;

    fn two_layer_event(outer_id: u32) -> Result<Event, InputError> {
        let inner = Layer::from_points(&[Point::new(1.0, 0.0, 0.0)]);
        let outer = Layer::from_points(&[Point::new(2.0, 0.0, 0.0), Point::new(0.0, 2.0, 0.0)]);
        Event::new(
            Cuts::wide(),
            vec![inner, outer],
            vec![DoubletLevel::from_pairs(&[(0, outer_id)])],
        )
    }

    #[test]
    fn validate_accepts_in_range_ids() {
        let event = two_layer_event(1).unwrap();
        assert_eq!(event.num_layers(), 2);
        assert_eq!(event.num_points(), 3);
        assert_eq!(event.num_doublets(), 1);
    }

    #[test]
    fn validate_rejects_out_of_range_ids() {
        let err = two_layer_event(2).unwrap_err();
        assert!(matches!(
            err,
            InputError::PointOutOfRange { level: 0, point: 2, layer: 1, .. }
        ));
    }

    #[test]
    fn validate_rejects_missing_layer() {
        let err = Event::new(Cuts::wide(), vec![Layer::default()], vec![DoubletLevel::default(); 2])
            .unwrap_err();
        assert!(matches!(err, InputError::LayerCount { expected: 3, found: 1 }));
    }

    #[test]
    fn snapshot_round_trip() {
        let event = two_layer_event(1).unwrap();
        let path = std::env::temp_dir().join(format!("tuplets-snapshot-{}.rkyv", std::process::id()));
        let path = path.to_str().unwrap();
        event.save_to_file(path).unwrap();
        let loaded = Event::load_from_file(path).unwrap();
        std::fs::remove_file(path).ok();
        assert_eq!(loaded, event);
    }
}

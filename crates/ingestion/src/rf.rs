//! RF-ranging records
//!
//! The backend reports anchor observations as parallel arrays. They are
//! rebuilt into structured records right after the call, and the array
//! lengths are checked at that point.

use std::collections::HashMap;

use contracts::{RfFamily, RfRangingData, Vector3};

use crate::error::{IngestionError, Result};

/// One anchor observation
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorObservation {
    pub anchor_id: String,
    pub position: Vector3,
    pub distance: f64,
    pub rssi: f64,
    pub timestamp: u64,
    pub valid_range: bool,
}

/// Packet received by one tag: indices into the observation list
#[derive(Debug, Clone, PartialEq)]
pub struct TagPacket {
    pub tag_id: String,
    pub position: Vector3,
    pub observations: Vec<usize>,
}

/// One anchor per packet after consolidation
///
/// Position, timestamp and validity come from the anchor's first observation
/// in the packet; distance and rssi from its strongest one.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidatedRange {
    pub anchor_id: String,
    pub position: Vector3,
    pub timestamp: u64,
    pub valid_range: bool,
    pub distance: f64,
    pub rssi: f64,
}

/// Structured view of one RF-ranging response
#[derive(Debug, Clone, PartialEq)]
pub struct RfSnapshot {
    pub family: RfFamily,
    pub observations: Vec<AnchorObservation>,
    pub tags: Vec<TagPacket>,
}

impl RfSnapshot {
    /// Rebuild records from parallel arrays
    ///
    /// # Errors
    /// `Protocol` when the parallel arrays differ in length or a packet
    /// references an observation that does not exist.
    pub fn from_raw(family: RfFamily, raw: RfRangingData) -> Result<Self> {
        let sensor_id = family.as_str();

        let n = raw.anchor_id.len();
        let anchor_lengths = [
            ("anchor_pos_x", raw.anchor_pos_x.len()),
            ("anchor_pos_y", raw.anchor_pos_y.len()),
            ("anchor_pos_z", raw.anchor_pos_z.len()),
            ("distance", raw.distance.len()),
            ("rssi", raw.rssi.len()),
            ("timestamp", raw.timestamp.len()),
            ("valid_range", raw.valid_range.len()),
        ];
        if let Some((name, len)) = anchor_lengths.iter().find(|(_, len)| *len != n) {
            return Err(IngestionError::protocol(
                sensor_id,
                format!("anchor array '{name}' has {len} entries, anchor_id has {n}"),
            ));
        }

        let t = raw.tag_ranges.len();
        let tag_lengths = [
            ("tag_id", raw.tag_id.len()),
            ("tag_pos_x", raw.tag_pos_x.len()),
            ("tag_pos_y", raw.tag_pos_y.len()),
            ("tag_pos_z", raw.tag_pos_z.len()),
        ];
        if let Some((name, len)) = tag_lengths.iter().find(|(_, len)| *len != t) {
            return Err(IngestionError::protocol(
                sensor_id,
                format!("tag array '{name}' has {len} entries, tag_ranges has {t}"),
            ));
        }

        if let Some(bad) = raw.tag_ranges.iter().flatten().find(|&&i| i >= n) {
            return Err(IngestionError::protocol(
                sensor_id,
                format!("packet references observation {bad}, only {n} present"),
            ));
        }

        let mut observations = Vec::with_capacity(n);
        for i in 0..n {
            observations.push(AnchorObservation {
                anchor_id: raw.anchor_id[i].clone(),
                position: Vector3::new(raw.anchor_pos_x[i], raw.anchor_pos_y[i], raw.anchor_pos_z[i]),
                distance: raw.distance[i],
                rssi: raw.rssi[i],
                timestamp: raw.timestamp[i],
                valid_range: raw.valid_range[i],
            });
        }

        let tags = raw
            .tag_ranges
            .into_iter()
            .zip(raw.tag_id)
            .enumerate()
            .map(|(i, (observations, tag_id))| TagPacket {
                tag_id,
                position: Vector3::new(raw.tag_pos_x[i], raw.tag_pos_y[i], raw.tag_pos_z[i]),
                observations,
            })
            .collect();

        Ok(Self {
            family,
            observations,
            tags,
        })
    }

    /// Unique anchors of one packet in first-occurrence order
    ///
    /// Among an anchor's observations the highest rssi wins; ties keep the
    /// earliest one.
    pub fn consolidate(&self, packet: &TagPacket) -> Vec<ConsolidatedRange> {
        let mut slots: HashMap<&str, usize> = HashMap::new();
        let mut out: Vec<ConsolidatedRange> = Vec::new();

        for &index in &packet.observations {
            let obs = &self.observations[index];
            match slots.get(obs.anchor_id.as_str()) {
                Some(&slot) => {
                    let best = &mut out[slot];
                    if obs.rssi > best.rssi {
                        best.rssi = obs.rssi;
                        best.distance = obs.distance;
                    }
                }
                None => {
                    slots.insert(obs.anchor_id.as_str(), out.len());
                    out.push(ConsolidatedRange {
                        anchor_id: obs.anchor_id.clone(),
                        position: obs.position,
                        timestamp: obs.timestamp,
                        valid_range: obs.valid_range,
                        distance: obs.distance,
                        rssi: obs.rssi,
                    });
                }
            }
        }

        out
    }
}

/// Anchor id as written to the output log
///
/// UWB ids are namespaced (`"<prefix>:<id>"`); only the last segment is kept.
pub fn output_anchor_id(family: RfFamily, anchor_id: &str) -> &str {
    match family {
        RfFamily::Uwb => anchor_id.rsplit(':').next().unwrap_or(anchor_id),
        RfFamily::Wifi => anchor_id,
    }
}

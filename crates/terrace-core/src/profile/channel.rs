//! Baseline channel long profile.

use crate::survey::ChannelRecord;

/// The baseline channel reduced to one elevation per distinct downstream
/// station, ascending. Elevation is the arithmetic mean of the rows
/// sharing that exact distance.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelProfile {
    /// Distinct downstream stations, metres, strictly ascending.
    pub distances: Vec<f64>,
    /// Mean channel bed elevation per station, metres.
    pub elevations: Vec<f64>,
}

impl ChannelProfile {
    /// Number of stations.
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Iterate (distance, elevation) pairs in ascending station order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.distances
            .iter()
            .copied()
            .zip(self.elevations.iter().copied())
    }
}

/// Reduce the channel table to its long profile.
///
/// Input rows may arrive in any order; the result is ascending by station
/// with duplicate distances averaged.
pub fn compute_channel_profile(records: &[ChannelRecord]) -> ChannelProfile {
    let mut points: Vec<(f64, f64)> = records
        .iter()
        .map(|r| (r.dist_along_baseline, r.elevation))
        .collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut distances = Vec::new();
    let mut elevations = Vec::new();
    let mut i = 0;
    while i < points.len() {
        let station = points[i].0;
        let mut sum = points[i].1;
        let mut count = 1usize;
        let mut j = i + 1;
        while j < points.len() && points[j].0 == station {
            sum += points[j].1;
            count += 1;
            j += 1;
        }
        distances.push(station);
        elevations.push(sum / count as f64);
        i = j;
    }

    ChannelProfile {
        distances,
        elevations,
    }
}

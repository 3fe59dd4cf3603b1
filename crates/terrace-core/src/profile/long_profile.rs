//! Terrace long profiles.
//!
//! Groups surveyed terrace points by terrace id, reduces each group to one
//! minimum elevation per distinct downstream station, and keeps only the
//! groups that pass the size and mean-slope heuristics. Rejected groups are
//! data-quality drops, not errors.

use std::collections::BTreeMap;

use crate::survey::TerraceRecord;

/// Acceptance thresholds for terrace point groups.
///
/// A group is kept only when it has strictly more than `min_points` rows,
/// a distinct-station count strictly between 1 and `max_stations`, and a
/// mean station-to-station slope strictly below `max_mean_slope`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileFilter {
    /// Minimum row count (exclusive) for a group to qualify.
    pub min_points: usize,
    /// Maximum distinct-station count (exclusive).
    pub max_stations: usize,
    /// Maximum mean slope (exclusive), metres of rise per metre of distance.
    pub max_mean_slope: f64,
}

impl Default for ProfileFilter {
    fn default() -> Self {
        Self {
            min_points: 50,
            max_stations: 1000,
            max_mean_slope: 10.0,
        }
    }
}

/// One terrace reduced to its long profile.
///
/// `distances` and `elevations` are parallel: entry i is the minimum
/// elevation observed at station `distances[i]`. Stations are unique and
/// strictly ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct TerraceProfile {
    pub terrace_id: i64,
    /// Distinct downstream stations, metres, strictly ascending.
    pub distances: Vec<f64>,
    /// Minimum surveyed elevation per station, metres.
    pub elevations: Vec<f64>,
}

impl TerraceProfile {
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

    /// Arithmetic mean of the station-to-station gradients,
    /// Δelevation / Δdistance. NaN for profiles with fewer than two
    /// stations.
    pub fn mean_slope(&self) -> f64 {
        if self.distances.len() < 2 {
            return f64::NAN;
        }
        let mut sum = 0.0;
        for i in 1..self.distances.len() {
            sum += (self.elevations[i] - self.elevations[i - 1])
                / (self.distances[i] - self.distances[i - 1]);
        }
        sum / (self.distances.len() - 1) as f64
    }
}

/// Outcome of one aggregation run.
#[derive(Debug, Clone, PartialEq)]
pub struct LongProfileSet {
    /// Accepted profiles, ascending terrace id.
    pub profiles: Vec<TerraceProfile>,
    /// Every distinct terrace id seen in the input, ascending, accepted
    /// or not.
    pub candidate_ids: Vec<i64>,
}

impl LongProfileSet {
    /// Ids of the accepted profiles, ascending.
    pub fn terrace_ids(&self) -> Vec<i64> {
        self.profiles.iter().map(|p| p.terrace_id).collect()
    }
}

/// Group terrace points by id and reduce each group to a long profile.
///
/// Groups are visited in ascending id order. Each surviving group is
/// reduced to one minimum elevation per distinct `dist_along_baseline`
/// value, stations ascending; groups failing the size or slope thresholds
/// are dropped without error. The size check runs before the reduction, so
/// a single-station group never reaches the slope division.
pub fn compute_long_profiles(records: &[TerraceRecord], filter: &ProfileFilter) -> LongProfileSet {
    let mut groups: BTreeMap<i64, Vec<(f64, f64)>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.terrace_id)
            .or_default()
            .push((record.dist_along_baseline, record.elevation));
    }

    let candidate_ids: Vec<i64> = groups.keys().copied().collect();

    let mut profiles = Vec::new();
    for (terrace_id, points) in groups {
        if let Some(profile) = reduce_group(terrace_id, points, filter) {
            profiles.push(profile);
        }
    }

    LongProfileSet {
        profiles,
        candidate_ids,
    }
}

/// Reduce one terrace's (distance, elevation) points to a profile, or None
/// if the group fails a filter.
fn reduce_group(
    terrace_id: i64,
    mut points: Vec<(f64, f64)>,
    filter: &ProfileFilter,
) -> Option<TerraceProfile> {
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    // Distinct stations, counted before any reduction happens.
    let mut stations = 0usize;
    for i in 0..points.len() {
        if i == 0 || points[i].0 != points[i - 1].0 {
            stations += 1;
        }
    }

    if points.len() <= filter.min_points || stations <= 1 || stations >= filter.max_stations {
        return None;
    }

    // Minimum elevation per run of equal distances.
    let mut distances = Vec::with_capacity(stations);
    let mut elevations = Vec::with_capacity(stations);
    let mut i = 0;
    while i < points.len() {
        let station = points[i].0;
        let mut min_elev = points[i].1;
        let mut j = i + 1;
        while j < points.len() && points[j].0 == station {
            min_elev = min_elev.min(points[j].1);
            j += 1;
        }
        distances.push(station);
        elevations.push(min_elev);
        i = j;
    }

    let profile = TerraceProfile {
        terrace_id,
        distances,
        elevations,
    };

    // Strict comparison; a NaN mean is rejected too.
    if !(profile.mean_slope() < filter.max_mean_slope) {
        return None;
    }

    Some(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build `rows` points for one terrace, cycling over `stations` distinct
    /// distances `spacing` apart and climbing `rise` metres per station.
    fn make_group(
        terrace_id: i64,
        rows: usize,
        stations: usize,
        spacing: f64,
        rise: f64,
    ) -> Vec<TerraceRecord> {
        let mut records = Vec::with_capacity(rows);
        for i in 0..rows {
            let station = i % stations;
            records.push(TerraceRecord {
                terrace_id,
                dist_along_baseline: station as f64 * spacing,
                dist_to_baseline: 5.0,
                elevation: 100.0 + station as f64 * rise,
            });
        }
        records
    }

    #[test]
    fn group_at_min_points_is_rejected() {
        let filter = ProfileFilter::default();
        let at_threshold = compute_long_profiles(&make_group(1, 50, 10, 50.0, 1.0), &filter);
        assert!(
            at_threshold.profiles.is_empty(),
            "50 rows must not pass the strict > 50 row filter"
        );

        let above = compute_long_profiles(&make_group(1, 51, 10, 50.0, 1.0), &filter);
        assert_eq!(above.profiles.len(), 1, "51 rows should qualify");
    }

    #[test]
    fn stations_are_strictly_ascending_and_unique() {
        let filter = ProfileFilter::default();
        // Feed rows in reverse so ordering comes from the reduction, not
        // the input.
        let mut records = make_group(1, 60, 12, 25.0, 0.5);
        records.reverse();
        let set = compute_long_profiles(&records, &filter);
        assert_eq!(set.profiles.len(), 1);

        let profile = &set.profiles[0];
        assert_eq!(profile.len(), 12);
        for w in profile.distances.windows(2) {
            assert!(
                w[0] < w[1],
                "Stations must ascend strictly, got {} then {}",
                w[0],
                w[1]
            );
        }
    }

    #[test]
    fn station_elevation_is_minimum_of_duplicates() {
        let filter = ProfileFilter::default();
        let mut records = make_group(3, 60, 10, 50.0, 1.0);
        // A higher reading at station 0 must lose to the lower one.
        records.push(TerraceRecord {
            terrace_id: 3,
            dist_along_baseline: 0.0,
            dist_to_baseline: 2.0,
            elevation: 250.0,
        });
        // A lower reading at station 1 must win.
        records.push(TerraceRecord {
            terrace_id: 3,
            dist_along_baseline: 50.0,
            dist_to_baseline: 2.0,
            elevation: 90.0,
        });

        let set = compute_long_profiles(&records, &filter);
        assert_eq!(set.profiles.len(), 1);
        let profile = &set.profiles[0];
        assert_eq!(profile.elevations[0], 100.0);
        assert_eq!(profile.elevations[1], 90.0);
    }

    #[test]
    fn steep_two_station_group_fails_slope_filter() {
        let filter = ProfileFilter::default();
        // 51 rows over 2 stations passes the size filter; slope is exactly
        // 10.0 m/m, which the strict < threshold must reject.
        let at_threshold = compute_long_profiles(&make_group(4, 51, 2, 1.0, 10.0), &filter);
        assert!(
            at_threshold.profiles.is_empty(),
            "Mean slope equal to the threshold must be rejected"
        );

        let below = compute_long_profiles(&make_group(4, 51, 2, 1.0, 9.9), &filter);
        assert_eq!(below.profiles.len(), 1, "Mean slope 9.9 should pass");
    }

    #[test]
    fn station_count_bound_is_exclusive() {
        let filter = ProfileFilter::default();
        let at_bound = compute_long_profiles(&make_group(5, 1000, 1000, 10.0, 0.1), &filter);
        assert!(
            at_bound.profiles.is_empty(),
            "1000 stations must not pass the strict < 1000 filter"
        );

        let below = compute_long_profiles(&make_group(5, 999, 999, 10.0, 0.1), &filter);
        assert_eq!(below.profiles.len(), 1, "999 stations should qualify");
        assert_eq!(below.profiles[0].len(), 999);
    }

    #[test]
    fn single_station_group_is_rejected_without_panic() {
        let filter = ProfileFilter::default();
        let set = compute_long_profiles(&make_group(6, 60, 1, 10.0, 0.0), &filter);
        assert!(set.profiles.is_empty());
        assert_eq!(set.candidate_ids, vec![6]);
    }

    #[test]
    fn profiles_come_back_in_ascending_id_order() {
        let filter = ProfileFilter::default();
        let mut records = make_group(9, 60, 10, 50.0, 1.0);
        records.extend(make_group(2, 60, 10, 50.0, 1.0));
        records.extend(make_group(4, 60, 10, 50.0, 1.0));

        let set = compute_long_profiles(&records, &filter);
        assert_eq!(set.terrace_ids(), vec![2, 4, 9]);
        assert_eq!(set.candidate_ids, vec![2, 4, 9]);
    }

    #[test]
    fn identical_input_gives_identical_output() {
        let filter = ProfileFilter::default();
        let mut records = make_group(1, 80, 20, 25.0, 0.5);
        records.extend(make_group(2, 51, 2, 1.0, 9.9));
        records.extend(make_group(3, 10, 5, 10.0, 1.0));

        let first = compute_long_profiles(&records, &filter);
        let second = compute_long_profiles(&records, &filter);
        assert_eq!(first, second);
    }

    #[test]
    fn row_order_does_not_change_the_result() {
        let filter = ProfileFilter::default();
        let mut records = make_group(1, 80, 20, 25.0, 0.5);
        records.extend(make_group(7, 60, 10, 50.0, 1.0));

        let forward = compute_long_profiles(&records, &filter);
        records.reverse();
        let reversed = compute_long_profiles(&records, &filter);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn mixed_survey_keeps_only_qualifying_terrace() {
        let filter = ProfileFilter::default();
        // Terrace 1: 60 rows over 10 stations, gentle 2 m/m mean slope.
        let mut records = make_group(1, 60, 10, 100.0, 200.0);
        // Terrace 2: 5 rows, far below the row threshold.
        records.extend(make_group(2, 5, 5, 10.0, 1.0));

        let set = compute_long_profiles(&records, &filter);
        assert_eq!(set.candidate_ids, vec![1, 2]);
        assert_eq!(set.profiles.len(), 1);

        let profile = &set.profiles[0];
        assert_eq!(profile.terrace_id, 1);
        assert_eq!(profile.len(), 10);
        for w in profile.distances.windows(2) {
            assert!(w[0] < w[1]);
        }
        assert!((profile.mean_slope() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn mean_slope_of_short_profile_is_nan() {
        let profile = TerraceProfile {
            terrace_id: 1,
            distances: vec![10.0],
            elevations: vec![100.0],
        };
        assert!(profile.mean_slope().is_nan());
    }

    #[test]
    fn custom_thresholds_are_honoured() {
        let filter = ProfileFilter {
            min_points: 3,
            max_stations: 10,
            max_mean_slope: 1.0,
        };
        let set = compute_long_profiles(&make_group(1, 8, 4, 10.0, 5.0), &filter);
        assert_eq!(set.profiles.len(), 1, "0.5 m/m should pass a 1.0 cap");

        let steep = compute_long_profiles(&make_group(1, 8, 4, 10.0, 15.0), &filter);
        assert!(steep.profiles.is_empty(), "1.5 m/m must fail a 1.0 cap");
    }
}

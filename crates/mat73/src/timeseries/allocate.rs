//! Stages 3, 5, and 6 — ordinal sort, stride selection, and allocation. Kept
//! as pure functions over already-extracted data so the algorithm itself is
//! testable without touching HDF5.

use crate::config::Mat73Config;

/// Stage 3: sorts `(composite_path, reference_index)` pairs ascending by
/// ordinal; position in the result is that timeseries' slot number.
pub fn sort_by_ordinal(mut timeseries: Vec<(String, i64)>) -> Vec<(String, i64)> {
    timeseries.sort_by_key(|(_, ref_idx)| *ref_idx);
    timeseries
}

/// Stage 5: picks which of `candidate_time_slots` are actually Time slots.
///
/// When Data payloads share the Time payload's canonical shape, candidates
/// alternate Time/Data and only every other one (starting at the first) is
/// a Time slot. The `1.5 * T` threshold is read from `cfg` rather than
/// hard-coded so a caller can override it for a file that lands right on
/// the boundary.
pub fn select_time_slots(
    candidate_time_slots: &[usize],
    timeseries_count: usize,
    columns_per_ts: usize,
    cfg: &Mat73Config,
) -> Vec<usize> {
    let looks_paired = columns_per_ts >= 2
        && timeseries_count > 0
        && (candidate_time_slots.len() as f64)
            >= cfg.stride_ratio_threshold * (timeseries_count as f64);

    if looks_paired {
        candidate_time_slots.iter().step_by(2).copied().collect()
    } else {
        candidate_time_slots.to_vec()
    }
}

/// Stage 6: position `i` in the ordinal-sorted timeseries list gets Time
/// slot `selected_time_slots[i]`, if one exists.
pub fn allocate_time_slots<'a>(
    sorted_timeseries: &'a [(String, i64)],
    selected_time_slots: &[usize],
) -> Vec<(&'a str, Option<usize>)> {
    sorted_timeseries
        .iter()
        .enumerate()
        .map(|(i, (name, _))| (name.as_str(), selected_time_slots.get(i).copied()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> Mat73Config {
        Mat73Config::default()
    }

    #[test]
    fn sorts_ascending_by_ordinal() {
        let input = vec![
            ("gamma".to_owned(), 30),
            ("alpha".to_owned(), 10),
            ("beta".to_owned(), 20),
        ];
        let sorted = sort_by_ordinal(input);
        let names: Vec<&str> = sorted.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn paired_layout_takes_every_other_slot() {
        // 3 timeseries, candidates >= 1.5*3 = 4.5 -> 6 candidates -> paired.
        let candidates = vec![1, 2, 4, 5, 7, 8];
        let selected = select_time_slots(&candidates, 3, 2, &cfg());
        assert_eq!(selected, vec![1, 4, 7]);
    }

    #[test]
    fn unpaired_layout_takes_all_candidates() {
        // Data has a different shape than Time: ratio stays low.
        let candidates = vec![1, 4, 7];
        let selected = select_time_slots(&candidates, 3, 2, &cfg());
        assert_eq!(selected, vec![1, 4, 7]);
    }

    #[test]
    fn time_only_layout_takes_all_candidates_regardless_of_ratio() {
        let candidates = vec![1, 2, 3, 4, 5, 6];
        let selected = select_time_slots(&candidates, 3, 1, &cfg());
        assert_eq!(selected, candidates);
    }

    #[test]
    fn allocation_maps_position_to_selected_slot() {
        let sorted = vec![
            ("alpha".to_owned(), 10),
            ("beta".to_owned(), 20),
            ("gamma".to_owned(), 30),
        ];
        let selected = vec![1, 4];
        let allocation = allocate_time_slots(&sorted, &selected);
        assert_eq!(
            allocation,
            vec![("alpha", Some(1)), ("beta", Some(4)), ("gamma", None)]
        );
    }
}

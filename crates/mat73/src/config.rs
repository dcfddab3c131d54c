/// Tunable knobs for the timeseries reconstructor.
///
/// The defaults are the ones the original allocation algorithm hard-codes;
/// both are named here rather than buried in stage functions because files
/// close to the stride-selection threshold can be mis-allocated and a
/// caller may need to override it after inspecting a specific file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat73Config {
    /// Stage 5: when `candidate_time_slots.len() >= stride_ratio_threshold * T`,
    /// payloads are assumed to alternate Time/Data and only every other
    /// candidate slot is a Time slot.
    pub stride_ratio_threshold: f64,
    /// Stage 7: how many MCOS slots after a Time slot to scan for its Data
    /// payload before giving up.
    pub data_search_window: usize,
}

impl Default for Mat73Config {
    fn default() -> Self {
        Self {
            stride_ratio_threshold: 1.5,
            data_search_window: 19,
        }
    }
}

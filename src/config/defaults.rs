use std::path::PathBuf;

pub(super) const MAX_EPOCHS: usize = 10_000;
pub(super) const MAX_TEST_FRACTION: f64 = 0.9;

pub(super) fn default_data_file() -> PathBuf {
    PathBuf::from("HR_comma_sep.csv")
}

pub(super) fn default_test_fraction() -> f64 {
    0.2
}

pub(super) fn default_seed() -> u64 {
    42
}

pub(super) fn default_epochs() -> usize {
    100
}

pub(super) fn default_learning_rate() -> f64 {
    0.1
}

pub(super) fn default_l2() -> f64 {
    1e-4
}

pub(super) fn default_batch_size() -> usize {
    64
}

pub(super) fn clamp_test_fraction(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, MAX_TEST_FRACTION)
    } else {
        default_test_fraction()
    }
}

pub(super) fn clamp_epochs(value: usize) -> usize {
    value.clamp(1, MAX_EPOCHS)
}

pub(super) fn positive_or_default(value: f64, default: fn() -> f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        default()
    }
}

pub(super) fn non_negative_or_default(value: f64, default: fn() -> f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        default()
    }
}

/// Calculates the Simple Moving Average (SMA) for a given data slice and window.
///
/// # Arguments
///
/// * `data` - A slice of f64 values, oldest first.
/// * `window` - Number of trailing values averaged at each position.
///
/// # Returns
///
/// A `Vec<Option<f64>>` aligned with `data`. The first `window - 1` values are
/// `None`; every value is `None` if `window` is zero or longer than `data`.
///
/// The running sum is kept relative to the first observation, so a constant
/// series averages back to exactly that constant.
pub fn moving_average(data: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 || window > data.len() {
        return vec![None; data.len()];
    }

    let anchor = data[0];
    let mut sma = Vec::with_capacity(data.len());

    // Warm-up: not enough history yet
    sma.extend(std::iter::repeat_n(None, window - 1));

    let mut sum: f64 = data.iter().take(window).map(|x| x - anchor).sum();
    sma.push(Some(anchor + sum / window as f64));

    for i in window..data.len() {
        sum += (data[i] - anchor) - (data[i - window] - anchor);
        sma.push(Some(anchor + sum / window as f64));
    }

    sma
}

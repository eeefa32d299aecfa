//! Rolling minimum over a trailing window.
//!
//! MIN(n)[i] = min(X[i-n+1..=i])
//! Warmup: first (n-1) values are undefined.
//!
//! Uses a monotonic deque of indices whose values increase from front to
//! back, so each element is pushed and popped at most once.

use std::collections::VecDeque;

pub fn calculate_rolling_min(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if period == 0 {
        out.resize(values.len(), None);
        return out;
    }

    let mut window: VecDeque<usize> = VecDeque::with_capacity(period);

    for (i, &value) in values.iter().enumerate() {
        while window.back().is_some_and(|&j| values[j] >= value) {
            window.pop_back();
        }
        window.push_back(i);

        if window.front().is_some_and(|&j| j + period <= i) {
            window.pop_front();
        }

        if i + 1 >= period {
            out.push(window.front().map(|&j| values[j]));
        } else {
            out.push(None);
        }
    }

    out
}

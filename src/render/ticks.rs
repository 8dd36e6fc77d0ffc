/// Upper bound on the number of ticks on one axis; denser requests fall back to
/// automatic spacing.
pub const MAX_TICKS: usize = 200;


/// Evenly spaced ticks bracketing `[min, max]`.
///
/// The lowest tick is the largest multiple of `increment` not above `min`, the
/// highest is one increment above the largest multiple not above `max`, and every
/// multiple in between is emitted. An unusable increment (non-positive, non-finite,
/// or one that would produce more than `MAX_TICKS` ticks) yields no ticks.
pub fn bracketing_ticks(min: f64, max: f64, increment: f64) -> Vec<f64> {
    if !(increment > 0.0 && increment.is_finite() && min.is_finite() && max.is_finite()) || min > max {
        return vec![];
    }

    let low  = (min / increment).floor();
    let high = (max / increment).floor() + 1.0;
    let span = (high - low).round();
    if !(span.is_finite() && span < MAX_TICKS as f64) {
        return vec![];
    }
    let nticks = span as usize + 1;

    (0 .. nticks)
        .map(|i| increment * (low + i as f64))
        .collect()
}


/// A 1-2-5 step giving roughly `target` intervals over `span`.
pub fn nice_increment(span: f64, target: usize) -> f64 {
    if !(span > 0.0 && span.is_finite()) || target == 0 {
        return 1.0;
    }

    let raw = span / target as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = match raw / magnitude {
        r if r <= 1.0 => 1.0,
        r if r <= 2.0 => 2.0,
        r if r <= 5.0 => 5.0,
        _             => 10.0,
    };
    step * magnitude
}


/// Ticks within `[min, max]` with a nice spacing, used when no explicit
/// positions are available.
pub fn auto_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    let increment = nice_increment(max - min, target);
    bracketing_ticks(min, max, increment)
        .into_iter()
        .filter(|&t| t >= min - 1E-9 * increment && t <= max + 1E-9 * increment)
        .collect()
}


/// Shortest rendering of a tick value: integers without decimals, others with at
/// most three decimals and no trailing zeros.
pub fn format_tick(v: f64) -> String {
    let v = if v.abs() < 1E-10 { 0.0 } else { v };
    if (v - v.round()).abs() < 1E-9 {
        format!("{:.0}", v)
    } else {
        let s = format!("{:.3}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_owned()
    }
}

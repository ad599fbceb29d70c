//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Return `num` evenly spaced values over the closed interval
/// `[start, end]`.
///
/// A single value is `start`, and with two or more values the last one is
/// exactly `end`.
pub fn linspace<T>(start: T, end: T, num: usize) -> Vec<T>
where
    T: Float,
{
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            // The unwrap is safe since any usize converts to a float
            let step = (end - start) / T::from(num - 1).unwrap();
            let mut values: Vec<T> = (0..num)
                .map(|i| start + step * T::from(i).unwrap())
                .collect();
            values[num - 1] = end;
            values
        }
    }
}

/// One dimensional piecewise-linear interpolation of `x` against the data
/// points (`xp`, `fp`).
///
/// `xp` must be increasing. Values of `x` outside the range of `xp` are
/// clamped to the end values of `fp`, so this never extrapolates. Returns
/// `None` if the inputs are empty or have different lengths.
pub fn interp<T>(x: T, xp: &[T], fp: &[T]) -> Option<T>
where
    T: Float,
{
    if xp.is_empty() || xp.len() != fp.len() {
        return None;
    }

    let last = xp.len() - 1;

    if x <= xp[0] {
        return Some(fp[0]);
    }
    if x >= xp[last] {
        return Some(fp[last]);
    }

    // First index with xp > x, which is in 1..=last given the checks above
    let upper = xp.partition_point(|&v| v <= x);
    let lower = upper - 1;

    let span = xp[upper] - xp[lower];
    if span <= T::zero() {
        return Some(fp[upper]);
    }

    let frac = (x - xp[lower]) / span;
    Some(fp[lower] + frac * (fp[upper] - fp[lower]))
}

/// Clamp `value` into the closed range `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: PartialOrd,
{
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// The standard logistic function, `1 / (1 + e^-x)`.
pub fn logistic<T>(x: T) -> T
where
    T: Float,
{
    T::one() / (T::one() + (-x).exp())
}

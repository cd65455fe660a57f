//! Rescaling property values into [0, 1] for display.

/// Options for [`normalize`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NormalizeOptions {
    /// Rescale in log10 space; non-positive values become NaN.
    pub use_logarithm: bool,
    /// For discrete data, map `code mod cycle` evenly over [0, 1].
    pub discrete_cycle: Option<u32>,
    /// Reuse recorded min/max instead of scanning the values.
    pub trust_min_max: bool,
    /// Output position of raw zero; bounds are widened to put it there.
    pub fix_zero_at: Option<f64>,
    /// Exclude masked elements from the bounds and emit NaN for them.
    pub masked: bool,
}

impl NormalizeOptions {
    pub fn logarithmic() -> Self {
        Self {
            use_logarithm: true,
            ..Self::default()
        }
    }

    pub fn cycle(cycle: u32) -> Self {
        Self {
            discrete_cycle: Some(cycle),
            ..Self::default()
        }
    }

    pub fn zero_at(fraction: f64) -> Self {
        Self {
            fix_zero_at: Some(fraction),
            ..Self::default()
        }
    }
}

/// Normalized values with the bounds used to produce them.
///
/// Bounds are in log10 space when logarithmic scaling was requested.
#[derive(Clone, Debug, PartialEq)]
pub struct Normalized {
    pub values: Vec<f64>,
    pub min: f64,
    pub max: f64,
}

/// Normalize raw values (nulls already NaN).
///
/// `mask` flags excluded elements and is only honoured when
/// `options.masked` is set. `recorded` bounds are used only with
/// `options.trust_min_max`.
pub fn normalize(
    values: &[f64],
    mask: Option<&[bool]>,
    discrete: bool,
    recorded: Option<(f64, f64)>,
    options: &NormalizeOptions,
) -> Normalized {
    let excluded = |i: usize| options.masked && mask.is_some_and(|m| m.get(i).copied().unwrap_or(false));

    if let (true, Some(cycle)) = (discrete, options.discrete_cycle) {
        let cycle = cycle.max(1) as i64;
        let span = (cycle - 1) as f64;
        let out = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                if excluded(i) || !v.is_finite() {
                    f64::NAN
                } else if span == 0.0 {
                    0.5
                } else {
                    (*v as i64).rem_euclid(cycle) as f64 / span
                }
            })
            .collect();
        return Normalized {
            values: out,
            min: 0.0,
            max: span,
        };
    }

    let scaled: Vec<f64> = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            if excluded(i) {
                f64::NAN
            } else if options.use_logarithm {
                if *v > 0.0 { v.log10() } else { f64::NAN }
            } else {
                *v
            }
        })
        .collect();

    let trusted = recorded.filter(|_| options.trust_min_max).and_then(|(lo, hi)| {
        if !options.use_logarithm {
            Some((lo, hi))
        } else if lo > 0.0 && hi > 0.0 {
            Some((lo.log10(), hi.log10()))
        } else {
            None
        }
    });
    let bounds = trusted.or_else(|| finite_bounds(&scaled));
    let Some((mut min, mut max)) = bounds else {
        return Normalized {
            values: vec![f64::NAN; values.len()],
            min: f64::NAN,
            max: f64::NAN,
        };
    };

    if let Some(f) = options.fix_zero_at {
        (min, max) = fix_zero(min, max, f);
    }

    let range = max - min;
    let out = scaled
        .iter()
        .map(|v| {
            if !v.is_finite() {
                f64::NAN
            } else if range == 0.0 {
                0.5
            } else {
                ((v - min) / range).clamp(0.0, 1.0)
            }
        })
        .collect();
    Normalized { values: out, min, max }
}

fn finite_bounds(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().filter(|v| v.is_finite()).fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Widen `(min, max)` so that zero lands at fraction `f` of the range.
fn fix_zero(min: f64, max: f64, f: f64) -> (f64, f64) {
    if f <= 0.0 {
        return (0.0, max);
    }
    if f >= 1.0 {
        return (min, 0.0);
    }
    let upper = max / (1.0 - f);
    let lower = -min / f;
    if upper >= lower {
        (-upper * f, max)
    } else {
        (min, lower * (1.0 - f))
    }
}

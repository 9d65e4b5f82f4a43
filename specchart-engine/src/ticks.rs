//! Axis tick generation.

#[cfg(feature = "serde")]
use serde::Serialize;

use specchart_core::YScaleMode;

use crate::scale::{LinearScale, YScale};

/// One axis tick; unlabelled ticks are minor.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Tick {
    pub value: f64,
    /// Position along the axis in plot-local pixels.
    pub px: f64,
    pub label: Option<String>,
}

impl Tick {
    #[must_use]
    pub fn is_major(&self) -> bool {
        self.label.is_some()
    }
}

/// Smallest `{1, 2, 5} x 10^k` that is at least `raw`.
#[must_use]
pub fn nice_step(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let mantissa = raw / magnitude;
    let nice = if mantissa <= 1.0 {
        1.0
    } else if mantissa <= 2.0 {
        2.0
    } else if mantissa <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Next larger nice step after `step`.
fn next_nice_step(step: f64) -> f64 {
    nice_step(step * 1.000_001)
}

/// Number of minor subdivisions for a nice step.
fn minor_divisions(step: f64) -> u32 {
    let mantissa = step / 10f64.powf(step.log10().floor());
    if (mantissa - 2.0).abs() < 1e-6 {
        4
    } else {
        5
    }
}

/// Formats `value` with as many decimals as `step` needs.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step > 0.0 && step < 1.0 {
        (-step.log10().floor()) as usize
    } else {
        0
    };
    let text = format!("{value:.decimals$}");
    if text.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
        text.trim_start_matches('-').to_string()
    } else {
        text
    }
}

fn drop_duplicate_labels(ticks: &mut [Tick]) {
    let mut seen: Vec<String> = Vec::new();
    for tick in ticks.iter_mut() {
        if let Some(label) = &tick.label {
            if seen.contains(label) {
                tick.label = None;
            } else {
                seen.push(label.clone());
            }
        }
    }
}

/// Ticks on a value axis whose labels are at least `min_spacing_px` apart.
///
/// `map` converts a value to a pixel; spacing is checked in pixel space so
/// non-linear mappings get enough room where values crowd together.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn value_ticks(
    domain: (f64, f64),
    pixel_span: f64,
    min_spacing_px: f64,
    map: impl Fn(f64) -> f64,
) -> Vec<Tick> {
    let (lo, hi) = domain;
    let span = hi - lo;
    if !span.is_finite() || span <= 0.0 || pixel_span <= 0.0 {
        return Vec::new();
    }
    let max_labels = (pixel_span / min_spacing_px.max(1.0)).floor().max(1.0);
    let mut step = nice_step(span / max_labels);

    let majors = loop {
        let first = (lo / step).ceil();
        let last = (hi / step).floor();
        let values: Vec<f64> = (0..=((last - first).max(-1.0) as i64))
            .map(|i| (first + i as f64) * step)
            .collect();
        let min_gap = values
            .windows(2)
            .map(|w| (map(w[1]) - map(w[0])).abs())
            .fold(f64::INFINITY, f64::min);
        if min_gap >= min_spacing_px || values.len() <= 1 {
            break values;
        }
        step = next_nice_step(step);
    };

    let minor_step = step / f64::from(minor_divisions(step));
    let mut ticks = Vec::new();
    let first_minor = (lo / minor_step).ceil() as i64;
    let last_minor = (hi / minor_step).floor() as i64;
    for i in first_minor..=last_minor {
        let value = i as f64 * minor_step;
        let is_major = majors
            .iter()
            .any(|m| (m - value).abs() < minor_step * 1e-6);
        ticks.push(Tick {
            value,
            px: map(value),
            label: is_major.then(|| format_tick(value, step)),
        });
    }
    drop_duplicate_labels(&mut ticks);
    ticks
}

/// Energy axis ticks.
#[must_use]
pub fn x_ticks(scale: &LinearScale, min_spacing_px: f64) -> Vec<Tick> {
    value_ticks(scale.domain(), scale.pixel_span().abs(), min_spacing_px, |v| {
        scale.map(v)
    })
}

/// Counts axis ticks for the scale's current mode.
#[must_use]
pub fn y_ticks(scale: &YScale, min_spacing_px: f64) -> Vec<Tick> {
    match scale.mode() {
        YScaleMode::Linear | YScaleMode::Sqrt => {
            value_ticks(scale.domain(), scale.height(), min_spacing_px, |v| {
                scale.map(v)
            })
        }
        YScaleMode::Log => log_ticks(scale, min_spacing_px),
    }
}

fn format_decade_value(value: f64) -> String {
    if (1.0..1e4).contains(&value) {
        format!("{value:.0}")
    } else if (1e-3..1.0).contains(&value) {
        format_tick(value, value)
    } else {
        format!("{value:.0e}")
    }
}

/// Log axis ticks: decades are major, 1..9 multiples are minor.
///
/// Fewer than three decades also label the 2x and 5x ticks; many decades
/// label only every n-th decade so labels keep their spacing.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn log_ticks(scale: &YScale, min_spacing_px: f64) -> Vec<Tick> {
    let (lo, hi) = scale.domain();
    if lo.is_nan() || hi.is_nan() || lo <= 0.0 || hi <= lo || scale.height() <= 0.0 {
        return Vec::new();
    }
    let decades = hi.log10() - lo.log10();
    let px_per_decade = scale.height() / decades;
    let label_every = (min_spacing_px / px_per_decade).ceil().max(1.0) as i64;
    let label_sub_decades = decades < 3.0;

    let first_decade = lo.log10().floor() as i64;
    let last_decade = hi.log10().ceil() as i64;
    let mut ticks = Vec::new();
    for decade in first_decade..=last_decade {
        let base = 10f64.powi(decade as i32);
        for multiple in 1..=9 {
            let value = base * f64::from(multiple);
            if value < lo * (1.0 - 1e-9) || value > hi * (1.0 + 1e-9) {
                continue;
            }
            let labelled = if multiple == 1 {
                decade.rem_euclid(label_every) == 0
            } else {
                label_sub_decades && (multiple == 2 || multiple == 5)
            };
            ticks.push(Tick {
                value,
                px: scale.map(value),
                label: labelled.then(|| format_decade_value(value)),
            });
        }
    }
    drop_duplicate_labels(&mut ticks);
    ticks
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_nice_step() {
        assert_relative_eq!(nice_step(0.7), 1.0);
        assert_relative_eq!(nice_step(1.3), 2.0);
        assert_relative_eq!(nice_step(3.0), 5.0);
        assert_relative_eq!(nice_step(7.0), 10.0);
        assert_relative_eq!(nice_step(230.0), 500.0);
        assert_relative_eq!(nice_step(0.013), 0.02, epsilon = 1e-12);
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(100.0, 50.0), "100");
        assert_eq!(format_tick(0.25, 0.05), "0.25");
        assert_eq!(format_tick(-0.0, 1.0), "0");
    }

    #[test]
    fn test_x_ticks_respect_spacing() {
        let scale = LinearScale::new((0.0, 3000.0), (0.0, 600.0));
        let ticks = x_ticks(&scale, 60.0);
        let labelled: Vec<_> = ticks.iter().filter(|t| t.is_major()).collect();
        assert!(labelled.len() >= 2);
        for pair in labelled.windows(2) {
            assert!(pair[1].px - pair[0].px >= 60.0 - 1e-9);
        }
        assert!(ticks.len() > labelled.len());
    }

    #[test]
    fn test_sqrt_ticks_spacing_in_pixels() {
        let scale = YScale::new(YScaleMode::Sqrt, (0.0, 10_000.0), 300.0);
        let ticks = y_ticks(&scale, 30.0);
        let labelled: Vec<_> = ticks.iter().filter(|t| t.is_major()).collect();
        for pair in labelled.windows(2) {
            assert!((pair[1].px - pair[0].px).abs() >= 30.0 - 1e-9);
        }
    }

    #[test]
    fn test_log_ticks_few_decades_label_sub_decades() {
        let scale = YScale::new(YScaleMode::Log, (1.0, 100.0), 300.0);
        let labels: Vec<_> = y_ticks(&scale, 20.0)
            .into_iter()
            .filter_map(|t| t.label)
            .collect();
        assert!(labels.contains(&"2".to_string()));
        assert!(labels.contains(&"50".to_string()));
        assert!(labels.contains(&"100".to_string()));
    }

    #[test]
    fn test_log_ticks_many_decades_thin_labels() {
        let scale = YScale::new(YScaleMode::Log, (1e-1, 1e9), 100.0);
        let ticks = y_ticks(&scale, 30.0);
        let labelled: Vec<_> = ticks.iter().filter(|t| t.is_major()).collect();
        assert!(labelled.len() < 10);
        for pair in labelled.windows(2) {
            assert!((pair[1].px - pair[0].px).abs() >= 30.0 - 1e-6);
        }
    }
}

//! Wheel and trackpad navigation.
//!
//! Consecutive wheel events accumulate into one session. The x domain
//! follows the accumulated delta immediately; the host hears about it once
//! the wheel has been quiet for the coalescing interval.

use std::mem;

use specchart_core::WheelEvent;

use super::{GestureContext, GestureEngine, GestureOutput, Interaction};
use crate::scale::clamp_to_bounds;

/// Accumulated state of one burst of wheel events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelSession {
    pub start_domain: (f64, f64),
    /// Sum of vertical deltas, clamped to the configured maximum. Positive
    /// zooms out.
    pub accumulated: f64,
    /// Sum of horizontal deltas in pixels.
    pub pan_px: f64,
    /// Cursor position as a fraction of the plot width.
    pub anchor_fraction: f64,
    /// Energy under the cursor when the session started.
    pub anchor_energy: f64,
    pub last_event_ms: f64,
}

/// X domain for a wheel session.
///
/// A full positive scroll reaches the data bounds, a full negative one a
/// window `min_width` wide; the anchor energy stays under the cursor.
#[must_use]
pub fn wheel_domain(
    session: &WheelSession,
    max_total: f64,
    bounds: (f64, f64),
    min_width: f64,
    plot_width: f64,
) -> (f64, f64) {
    let t = if max_total > 0.0 {
        (session.accumulated / max_total).clamp(-1.0, 1.0)
    } else {
        0.0
    };
    let start = session.start_domain;
    let start_width = start.1 - start.0;
    let target_width = if t >= 0.0 {
        (bounds.1 - bounds.0).max(start_width)
    } else {
        min_width.min(start_width)
    };
    let width = start_width + (target_width - start_width) * t.abs();
    let shift = session.pan_px * width / plot_width.max(1.0);
    let lo = session.anchor_energy - session.anchor_fraction * width + shift;
    clamp_to_bounds((lo, lo + width), bounds)
}

impl GestureEngine {
    /// Wheel or trackpad scroll over the chart.
    pub fn wheel(&mut self, ev: &WheelEvent, ctx: &mut GestureContext<'_>) -> GestureOutput {
        let mut out = GestureOutput::default();
        match self.interaction {
            Interaction::Idle => {
                if !ctx.layout.in_plot(ev.x, ev.y) {
                    return out;
                }
                let domain = ctx.scales.x_domain();
                let fraction = (ctx.local_x(ev.x) / ctx.layout.plot.width.max(1.0)).clamp(0.0, 1.0);
                self.interaction = Interaction::Wheel(WheelSession {
                    start_domain: domain,
                    accumulated: 0.0,
                    pan_px: 0.0,
                    anchor_fraction: fraction,
                    anchor_energy: domain.0 + fraction * (domain.1 - domain.0),
                    last_event_ms: ev.time_ms,
                });
                log::debug!("wheel session started at {:.1} keV", domain.0 + fraction * (domain.1 - domain.0));
            }
            Interaction::Wheel(_) => {}
            _ => return out,
        }
        let Interaction::Wheel(session) = &mut self.interaction else {
            return out;
        };
        let max_total = ctx.options.wheel.max_scroll_total;
        session.accumulated = (session.accumulated + ev.delta_y).clamp(-max_total, max_total);
        session.pan_px += ev.delta_x;
        session.last_event_ms = ev.time_ms;
        let target = wheel_domain(session, max_total, ctx.bounds(), ctx.min_width(), ctx.layout.plot.width);
        ctx.set_x_live(target, &mut out);
        out
    }

    /// Ends the wheel session, notifying the host if the domain moved.
    pub(super) fn commit_wheel(&mut self, ctx: &mut GestureContext<'_>) -> GestureOutput {
        let mut out = GestureOutput::default();
        match mem::take(&mut self.interaction) {
            Interaction::Wheel(session) => {
                log::debug!("wheel session committed");
                ctx.notify_if_changed(session.start_domain, &mut out);
            }
            other => self.interaction = other,
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn session(accumulated: f64, pan_px: f64) -> WheelSession {
        WheelSession {
            start_domain: (400.0, 600.0),
            accumulated,
            pan_px,
            anchor_fraction: 0.5,
            anchor_energy: 500.0,
            last_event_ms: 0.0,
        }
    }

    #[test]
    fn test_full_scroll_out_reaches_bounds() {
        let d = wheel_domain(&session(1500.0, 0.0), 1500.0, (0.0, 1000.0), 3.0, 500.0);
        assert_relative_eq!(d.0, 0.0);
        assert_relative_eq!(d.1, 1000.0);
    }

    #[test]
    fn test_full_scroll_in_reaches_min_width() {
        let d = wheel_domain(&session(-1500.0, 0.0), 1500.0, (0.0, 1000.0), 3.0, 500.0);
        assert_relative_eq!(d.1 - d.0, 3.0);
        assert_relative_eq!(d.0, 498.5);
    }

    #[test]
    fn test_half_scroll_keeps_anchor() {
        let d = wheel_domain(&session(-750.0, 0.0), 1500.0, (0.0, 1000.0), 0.0, 500.0);
        assert_relative_eq!(d.1 - d.0, 100.0);
        assert_relative_eq!((d.0 + d.1) / 2.0, 500.0);
    }

    #[test]
    fn test_lateral_scroll_pans() {
        let d = wheel_domain(&session(0.0, 250.0), 1500.0, (0.0, 1000.0), 3.0, 500.0);
        assert_relative_eq!(d.0, 500.0);
        assert_relative_eq!(d.1, 700.0);
    }
}

//! Overview (slider) chart controller.
//!
//! A full-extent, reduced-height copy of the main chart. It keeps its own
//! scales and rebin caches and maps presses on it to new main-chart x
//! domains.

#[cfg(feature = "serde")]
use serde::Serialize;

use specchart_core::{Color, Spectrum, SpectrumType, YPadding, YScaleMode};

use crate::path::{step_path, Path, Rect};
use crate::rebin::{rebin, RebinState};
use crate::scale::{clamp_to_bounds, padded_y_domain, visible_y_range, LinearScale, YScale};

/// Pointer distance from a selection edge that grabs the edge.
pub const EDGE_GRAB_PX: f64 = 5.0;

/// Part of the overview under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverviewHit {
    LowerEdge,
    UpperEdge,
    Inside,
    Outside,
}

/// One overview trace.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct OverviewLine {
    pub spectrum_type: SpectrumType,
    pub color: Option<Color>,
    pub path: Path,
}

/// Paint-ready overview geometry; paths are overview-local pixels.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct OverviewFrame {
    /// Container-space rectangle of the overview.
    pub rect: Rect,
    pub lines: Vec<OverviewLine>,
    /// Pixel span of the main chart's x domain.
    pub selection: (f64, f64),
}

#[derive(Debug, Clone, Default)]
pub struct OverviewChart {
    x: LinearScale,
    y: YScale,
    states: Vec<RebinState>,
}

impl OverviewChart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn x(&self) -> &LinearScale {
        &self.x
    }

    /// Drops every cached rebin result.
    pub fn invalidate(&mut self) {
        self.states.clear();
    }

    /// Rebins `spectra` over `bounds` and builds the overview geometry.
    pub fn update(
        &mut self,
        spectra: &[&Spectrum],
        bounds: (f64, f64),
        rect: Rect,
        line_width_px: f64,
        main_domain: (f64, f64),
    ) -> OverviewFrame {
        self.x = LinearScale::new(bounds, (0.0, rect.width));
        self.states.resize_with(spectra.len(), RebinState::new);

        for (spectrum, state) in spectra.iter().zip(self.states.iter_mut()) {
            rebin(spectrum, bounds, rect.width, line_width_px, state);
        }
        let raw = visible_y_range(self.states.iter().map(RebinState::points), bounds.1);
        let (lo, hi) = raw.map_or((0.0, 1.0), |r| {
            padded_y_domain(r, YScaleMode::Linear, YPadding::new(0.05, 0.0))
        });
        self.y = YScale::new(YScaleMode::Linear, (lo.min(0.0), hi), rect.height);

        let lines = spectra
            .iter()
            .zip(&self.states)
            .map(|(spectrum, state)| OverviewLine {
                spectrum_type: spectrum.spectrum_type,
                color: spectrum.line_color,
                path: step_path(state.points(), state.upper_edge(), &self.x, &self.y),
            })
            .collect();

        OverviewFrame {
            rect,
            lines,
            selection: self.selection_px(main_domain),
        }
    }

    /// Pixel span of `domain` on the overview.
    #[must_use]
    pub fn selection_px(&self, domain: (f64, f64)) -> (f64, f64) {
        (self.x.map(domain.0), self.x.map(domain.1))
    }

    /// Classifies an overview-local pixel against the selection.
    #[must_use]
    pub fn hit_test(&self, px: f64, domain: (f64, f64)) -> OverviewHit {
        let (lo, hi) = self.selection_px(domain);
        if (px - lo).abs() <= EDGE_GRAB_PX {
            OverviewHit::LowerEdge
        } else if (px - hi).abs() <= EDGE_GRAB_PX {
            OverviewHit::UpperEdge
        } else if px > lo && px < hi {
            OverviewHit::Inside
        } else {
            OverviewHit::Outside
        }
    }

    /// Domain of the same width centred on overview pixel `px`.
    #[must_use]
    pub fn recenter(&self, px: f64, domain: (f64, f64)) -> (f64, f64) {
        let centre = self.x.invert(px);
        let half = (domain.1 - domain.0) / 2.0;
        clamp_to_bounds((centre - half, centre + half), self.x.domain())
    }

    /// Main-chart domain after dragging `hit` from `start_px` to `current_px`.
    #[must_use]
    pub fn drag_domain(
        &self,
        hit: OverviewHit,
        start_domain: (f64, f64),
        start_px: f64,
        current_px: f64,
    ) -> (f64, f64) {
        let bounds = self.x.domain();
        let delta = self.x.pixels_to_span(current_px - start_px);
        let min_width = self.x.pixels_to_span(2.0 * EDGE_GRAB_PX).max(f64::EPSILON);
        match hit {
            OverviewHit::Inside | OverviewHit::Outside => clamp_to_bounds(
                (start_domain.0 + delta, start_domain.1 + delta),
                bounds,
            ),
            OverviewHit::LowerEdge => {
                let lo = (start_domain.0 + delta).clamp(bounds.0, start_domain.1 - min_width);
                (lo, start_domain.1)
            }
            OverviewHit::UpperEdge => {
                let hi = (start_domain.1 + delta).clamp(start_domain.0 + min_width, bounds.1);
                (start_domain.0, hi)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn chart() -> OverviewChart {
        let spectrum = Spectrum::from_counts(vec![1.0; 1000]);
        let mut chart = OverviewChart::new();
        let frame = chart.update(
            &[&spectrum],
            (0.0, 1000.0),
            Rect::new(0.0, 0.0, 500.0, 50.0),
            1.0,
            (100.0, 200.0),
        );
        assert_eq!(frame.lines.len(), 1);
        assert_relative_eq!(frame.selection.0, 50.0);
        assert_relative_eq!(frame.selection.1, 100.0);
        chart
    }

    #[test]
    fn test_hit_test() {
        let c = chart();
        let domain = (100.0, 200.0);
        assert_eq!(c.hit_test(52.0, domain), OverviewHit::LowerEdge);
        assert_eq!(c.hit_test(98.0, domain), OverviewHit::UpperEdge);
        assert_eq!(c.hit_test(75.0, domain), OverviewHit::Inside);
        assert_eq!(c.hit_test(300.0, domain), OverviewHit::Outside);
    }

    #[test]
    fn test_drag_moves_and_clamps() {
        let c = chart();
        let moved = c.drag_domain(OverviewHit::Inside, (100.0, 200.0), 75.0, 125.0);
        assert_relative_eq!(moved.0, 200.0);
        assert_relative_eq!(moved.1, 300.0);

        let clamped = c.drag_domain(OverviewHit::Inside, (100.0, 200.0), 75.0, 0.0);
        assert_relative_eq!(clamped.0, 0.0);
        assert_relative_eq!(clamped.1, 100.0);

        let edge = c.drag_domain(OverviewHit::UpperEdge, (100.0, 200.0), 100.0, 400.0);
        assert_relative_eq!(edge.1, 800.0);
        let edge = c.drag_domain(OverviewHit::LowerEdge, (100.0, 200.0), 50.0, 400.0);
        assert!(edge.0 < edge.1);
    }

    #[test]
    fn test_recenter() {
        let c = chart();
        let d = c.recenter(250.0, (100.0, 200.0));
        assert_relative_eq!(d.0, 450.0);
        assert_relative_eq!(d.1, 550.0);
        let d = c.recenter(499.0, (100.0, 200.0));
        assert_relative_eq!(d.1, 1000.0);
    }
}

//! Touch tracking and two-finger gestures.
//!
//! One finger pans, taps and long-presses. Two fingers start undecided and
//! lock into a [`TouchMode`] as soon as the movement is unambiguous.

use std::collections::BTreeMap;
use std::mem;

use specchart_core::{HostEvent, TouchEvent, TouchPoint};

use super::{
    abandon, pan, peak_fit_final, peaks_hint, BoxDrag, DragOrigin, Effect, GestureContext,
    GestureEngine, GestureOutput, Interaction, Mode, Overlay, OverlayKind,
};
use crate::layout::Layout;
use crate::scale::{clamp_to_bounds, ScaleManager, YScale};
use crate::throttle::Throttle;

/// Movement needed before a two-finger gesture is classified.
const CLASSIFY_PX: f64 = 20.0;

/// One finger, container pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchTrack {
    pub start_x: f64,
    pub start_y: f64,
    pub x: f64,
    pub y: f64,
    pub page_x: f64,
    pub page_y: f64,
}

impl TouchTrack {
    fn new(p: &TouchPoint) -> Self {
        Self {
            start_x: p.x,
            start_y: p.y,
            x: p.x,
            y: p.y,
            page_x: p.page_x,
            page_y: p.page_y,
        }
    }

    #[must_use]
    pub fn dx(&self) -> f64 {
        self.x - self.start_x
    }

    #[must_use]
    pub fn dy(&self) -> f64 {
        self.y - self.start_y
    }
}

/// Active touches keyed by identifier.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TouchTracker {
    tracks: BTreeMap<u64, TouchTrack>,
}

impl TouchTracker {
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: u64) -> Option<&TouchTrack> {
        self.tracks.get(&id)
    }

    pub fn insert(&mut self, p: &TouchPoint) {
        self.tracks.insert(p.id, TouchTrack::new(p));
    }

    /// Moves a known touch; unknown identifiers are ignored.
    pub fn update(&mut self, p: &TouchPoint) {
        if let Some(track) = self.tracks.get_mut(&p.id) {
            track.x = p.x;
            track.y = p.y;
            track.page_x = p.page_x;
            track.page_y = p.page_y;
        }
    }

    pub fn remove(&mut self, id: u64) {
        self.tracks.remove(&id);
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    /// Makes every current position the new start.
    pub fn rebase(&mut self) {
        for track in self.tracks.values_mut() {
            track.start_x = track.x;
            track.start_y = track.y;
        }
    }

    #[must_use]
    pub fn first(&self) -> Option<TouchTrack> {
        self.tracks.values().next().copied()
    }

    /// The two lowest-id touches.
    #[must_use]
    pub fn pair(&self) -> Option<(TouchTrack, TouchTrack)> {
        let mut it = self.tracks.values();
        Some((*it.next()?, *it.next()?))
    }
}

/// What a two-finger gesture turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchMode {
    /// Parallel swipe to the right.
    PeakFit,
    /// Parallel vertical swipe.
    DeletePeaks,
    /// Parallel swipe to the left.
    CountGammas,
    /// Pinch with mostly vertical spread.
    ZoomY,
    /// Pinch with mostly horizontal spread.
    ZoomX,
}

impl TouchMode {
    #[must_use]
    pub fn as_mode(self) -> Mode {
        match self {
            Self::PeakFit => Mode::PeakFit,
            Self::DeletePeaks => Mode::DeletePeaks,
            Self::CountGammas => Mode::CountGammas,
            Self::ZoomY => Mode::ZoomY,
            Self::ZoomX => Mode::ZoomX,
        }
    }
}

/// Classifies two fingers, or `None` while the movement is too small to
/// tell.
#[must_use]
pub fn classify_two_finger(a: &TouchTrack, b: &TouchTrack) -> Option<TouchMode> {
    let start_sep = ((a.start_x - b.start_x).abs(), (a.start_y - b.start_y).abs());
    let sep = ((a.x - b.x).abs(), (a.y - b.y).abs());
    let spread = ((sep.0 - start_sep.0).abs(), (sep.1 - start_sep.1).abs());
    let shift = ((a.dx() + b.dx()) / 2.0, (a.dy() + b.dy()) / 2.0);

    let spread_max = spread.0.max(spread.1);
    let shift_max = shift.0.abs().max(shift.1.abs());
    if spread_max < CLASSIFY_PX && shift_max < CLASSIFY_PX {
        return None;
    }
    if spread_max > shift_max {
        return Some(if spread.1 > spread.0 {
            TouchMode::ZoomY
        } else {
            TouchMode::ZoomX
        });
    }
    if shift.0.abs() > shift.1.abs() {
        Some(if shift.0 > 0.0 {
            TouchMode::PeakFit
        } else {
            TouchMode::CountGammas
        })
    } else {
        Some(TouchMode::DeletePeaks)
    }
}

/// State of a two-finger gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiTouch {
    /// Centroid and domains when the second finger landed.
    pub origin: DragOrigin,
    pub start_separation: (f64, f64),
    pub centroid: (f64, f64),
    pub centroid_page: (f64, f64),
    pub separation: (f64, f64),
    /// Horizontal extent covered by the fingers right now.
    pub x_extent: (f64, f64),
    pub mode: Option<TouchMode>,
    pub previews: Throttle<HostEvent>,
}

impl MultiTouch {
    fn new(a: &TouchTrack, b: &TouchTrack, time_ms: f64, scales: &ScaleManager, interval_ms: f64) -> Self {
        let centroid = ((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
        let page = ((a.page_x + b.page_x) / 2.0, (a.page_y + b.page_y) / 2.0);
        let separation = ((a.x - b.x).abs(), (a.y - b.y).abs());
        Self {
            origin: DragOrigin::capture(centroid.0, centroid.1, page, time_ms, scales),
            start_separation: separation,
            centroid,
            centroid_page: page,
            separation,
            x_extent: (a.x.min(b.x), a.x.max(b.x)),
            mode: None,
            previews: Throttle::new(interval_ms),
        }
    }

    fn update(&mut self, a: &TouchTrack, b: &TouchTrack) {
        self.centroid = ((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
        self.centroid_page = ((a.page_x + b.page_x) / 2.0, (a.page_y + b.page_y) / 2.0);
        self.separation = ((a.x - b.x).abs(), (a.y - b.y).abs());
        self.x_extent = (a.x.min(b.x), a.x.max(b.x));
    }

    /// The centroid's path as a drag, for events shared with the mouse.
    fn as_drag(&self) -> BoxDrag {
        BoxDrag {
            origin: self.origin,
            current_x: self.centroid.0,
            current_y: self.centroid.1,
            page_x: self.centroid_page.0,
            page_y: self.centroid_page.1,
            moved: true,
        }
    }

    /// Energies the gesture covers.
    fn energy_range(&self, ctx: &GestureContext<'_>) -> (f64, f64) {
        match self.mode {
            Some(TouchMode::DeletePeaks) => (ctx.energy_at(self.x_extent.0), ctx.energy_at(self.x_extent.1)),
            _ => self.as_drag().energy_range(ctx),
        }
    }

    fn fit_event(&self, ctx: &GestureContext<'_>, is_final: bool) -> HostEvent {
        let (lower, upper) = self.energy_range(ctx);
        HostEvent::FitRoiDrag {
            lower,
            upper,
            num_peaks_hint: peaks_hint(self.origin.y - self.centroid.1),
            is_final,
            page_x: self.centroid_page.0,
            page_y: self.centroid_page.1,
        }
    }

    /// X domain for a horizontal pinch, keeping the energy that started
    /// under the centroid under it.
    fn pinch_x(&self, ctx: &GestureContext<'_>) -> (f64, f64) {
        let start = self.origin.x_domain;
        let ratio = self.start_separation.0.max(1.0) / self.separation.0.max(1.0);
        let width = ((start.1 - start.0) * ratio).max(ctx.min_width());
        let plot_width = ctx.layout.plot.width.max(1.0);
        let anchor = start.0 + ctx.local_x(self.origin.x) / plot_width * (start.1 - start.0);
        let lo = anchor - ctx.local_x(self.centroid.0) / plot_width * width;
        clamp_to_bounds((lo, lo + width), ctx.bounds())
    }

    /// Y domain for a vertical pinch with the bottom of the axis fixed.
    fn pinch_y(&self, ctx: &GestureContext<'_>) -> (f64, f64) {
        let ratio = self.start_separation.1.max(1.0) / self.separation.1.max(1.0);
        let height = ctx.layout.plot.height;
        let start = YScale::new(ctx.scales.y().mode(), self.origin.y_domain, height);
        (self.origin.y_domain.0, start.invert(height - height * ratio))
    }

    /// Closes a gesture that did not complete.
    pub(super) fn abandon(self, ctx: &mut GestureContext<'_>) -> GestureOutput {
        let mut out = GestureOutput::default();
        ctx.restore(&self.origin);
        if self.mode == Some(TouchMode::PeakFit) && self.previews.has_emitted() {
            let (lower, upper) = self.energy_range(ctx);
            out.emit(HostEvent::FitRoiDrag {
                lower,
                upper,
                num_peaks_hint: 0,
                is_final: true,
                page_x: self.centroid_page.0,
                page_y: self.centroid_page.1,
            });
        }
        out
    }

    fn commit(mut self, ctx: &mut GestureContext<'_>, out: &mut GestureOutput) {
        match self.mode {
            None => {}
            Some(TouchMode::PeakFit) => {
                self.previews.discard();
                out.emit(peak_fit_final(&self.as_drag(), ctx));
            }
            Some(TouchMode::DeletePeaks) => {
                let (low_energy, high_energy) = self.energy_range(ctx);
                out.emit(HostEvent::ShiftKeyDragged {
                    low_energy,
                    high_energy,
                });
            }
            Some(TouchMode::CountGammas) => {
                let (low_energy, high_energy) = self.energy_range(ctx);
                out.emit(HostEvent::ShiftAltKeyDragged {
                    low_energy,
                    high_energy,
                });
            }
            Some(TouchMode::ZoomX) => ctx.notify_if_changed(self.origin.x_domain, out),
            Some(TouchMode::ZoomY) => out.effect(Effect::Redraw),
        }
        out.effect(Effect::Overlay);
    }

    pub(super) fn overlay(&self, layout: &Layout, scales: &ScaleManager) -> Option<Overlay> {
        let kind = match self.mode? {
            TouchMode::PeakFit => OverlayKind::PeakFit,
            TouchMode::DeletePeaks => OverlayKind::DeletePeaks,
            TouchMode::CountGammas => OverlayKind::CountGammas,
            TouchMode::ZoomX | TouchMode::ZoomY => return None,
        };
        let clamp = |v: f64| (v - layout.plot.x).clamp(0.0, layout.plot.width);
        let (a, b) = match self.mode {
            Some(TouchMode::DeletePeaks) => (clamp(self.x_extent.0), clamp(self.x_extent.1)),
            _ => (clamp(self.origin.x), clamp(self.centroid.0)),
        };
        let (x0, x1) = (a.min(b), a.max(b));
        Some(Overlay {
            kind,
            x0,
            x1,
            y0: 0.0,
            y1: layout.plot.height,
            text: format!("{:.1} - {:.1} keV", scales.x().invert(x0), scales.x().invert(x1)),
        })
    }
}

impl GestureEngine {
    /// Fingers landed.
    pub fn touch_start(&mut self, ev: &TouchEvent, ctx: &mut GestureContext<'_>) -> GestureOutput {
        let mut out = GestureOutput::default();
        match self.interaction {
            Interaction::Idle | Interaction::TouchPan { .. } | Interaction::TouchMulti(_) => {}
            Interaction::Wheel(_) => out.merge(self.commit_wheel(ctx)),
            _ => out.merge(self.cancel(ctx)),
        }
        for p in &ev.touches {
            self.touches.insert(p);
        }

        match self.touches.len() {
            1 => {
                let first = self.touches.first().filter(|_| self.is_idle());
                if let Some(t) = first {
                    if ctx.layout.in_plot(t.x, t.y) {
                        let origin = DragOrigin::capture(t.x, t.y, (t.page_x, t.page_y), ev.time_ms, ctx.scales);
                        self.interaction = Interaction::TouchPan {
                            drag: BoxDrag::new(origin),
                            long_press_fired: false,
                        };
                    }
                }
            }
            2 => {
                if matches!(self.interaction, Interaction::TouchMulti(_)) {
                    return out;
                }
                if matches!(self.interaction, Interaction::TouchPan { .. }) {
                    out.merge(self.cancel(ctx));
                }
                self.touches.rebase();
                if let Some((a, b)) = self.touches.pair() {
                    if ctx.layout.in_plot((a.x + b.x) / 2.0, (a.y + b.y) / 2.0) {
                        self.interaction = Interaction::TouchMulti(MultiTouch::new(
                            &a,
                            &b,
                            ev.time_ms,
                            ctx.scales,
                            ctx.interval(),
                        ));
                    }
                }
            }
            _ => {
                if self.interaction != Interaction::Idle {
                    log::debug!("{} touches; abandoning gesture", self.touches.len());
                    out.merge(self.cancel(ctx));
                }
            }
        }
        out
    }

    /// Fingers moved.
    pub fn touch_move(&mut self, ev: &TouchEvent, ctx: &mut GestureContext<'_>) -> GestureOutput {
        for p in &ev.touches {
            self.touches.update(p);
        }
        let mut out = GestureOutput::default();
        let tolerance = ctx.tolerance();
        match &mut self.interaction {
            Interaction::TouchPan { drag, .. } => {
                if let Some(t) = self.touches.first() {
                    drag.update(t.x, t.y, (t.page_x, t.page_y), tolerance);
                    pan(drag, ctx, &mut out);
                }
            }
            Interaction::TouchMulti(multi) => {
                let Some((a, b)) = self.touches.pair() else {
                    return out;
                };
                multi.update(&a, &b);
                if multi.mode.is_none() {
                    multi.mode = classify_two_finger(&a, &b);
                    if let Some(mode) = multi.mode {
                        log::debug!("two-finger gesture classified as {mode:?}");
                    }
                }
                match multi.mode {
                    Some(TouchMode::PeakFit) if ctx.options.fit_roi_on_ctrl_drag => {
                        let event = multi.fit_event(ctx, false);
                        if let Some(event) = multi.previews.offer(event, ev.time_ms) {
                            out.emit(event);
                        }
                    }
                    Some(TouchMode::ZoomX) => {
                        let target = multi.pinch_x(ctx);
                        ctx.set_x_live(target, &mut out);
                    }
                    Some(TouchMode::ZoomY) => {
                        let (lo, hi) = multi.pinch_y(ctx);
                        ctx.scales.set_y_override(lo, hi);
                        out.effect(Effect::Redraw);
                    }
                    _ => {}
                }
                out.effect(Effect::Overlay);
            }
            _ => {}
        }
        out
    }

    /// Fingers lifted.
    pub fn touch_end(&mut self, ev: &TouchEvent, ctx: &mut GestureContext<'_>) -> GestureOutput {
        for p in &ev.touches {
            self.touches.remove(p.id);
        }
        let mut out = GestureOutput::default();
        match mem::take(&mut self.interaction) {
            Interaction::TouchPan {
                drag,
                long_press_fired,
            } if self.touches.is_empty() => {
                let held = ev.time_ms - drag.origin.time_ms;
                if drag.moved {
                    ctx.notify_if_changed(drag.origin.x_domain, &mut out);
                } else if !long_press_fired && held < ctx.options.click.long_press_ms {
                    let page = (drag.origin.page_x, drag.origin.page_y);
                    self.click(drag.origin.x, drag.origin.y, page, ev.time_ms, ctx, &mut out);
                }
            }
            Interaction::TouchMulti(multi) if self.touches.len() < 2 => multi.commit(ctx, &mut out),
            other => self.interaction = other,
        }
        out
    }

    /// The platform took the touches away.
    pub fn touch_cancel(&mut self, ctx: &mut GestureContext<'_>) -> GestureOutput {
        self.touches.clear();
        let state = mem::take(&mut self.interaction);
        let mut out = abandon(state, ctx);
        out.effect(Effect::Redraw);
        out
    }
}

//! Gesture/Mode State Machine.
//!
//! All pointer, touch and wheel state lives in one [`Interaction`] value, so
//! at most one mode is active at a time. Handlers take the input event plus a
//! [`GestureContext`] (the scales and the geometry needed for hit tests) and
//! return a [`GestureOutput`]: host events to forward and [`Effect`]s the
//! chart applies.
//!
//! Left-button drags in the plot pick their mode from the held modifiers on
//! every move, in this order:
//!
//! 1. ctrl: peak fit
//! 2. shift: delete peaks
//! 3. alt + shift: count gammas
//! 4. alt + ctrl: recalibrate
//! 5. meta (alt on Windows): zoom y
//! 6. press within grab distance of a ROI edge: ROI edge drag
//! 7. otherwise: zoom x (zoom out when dragged left of the start)
//!
//! The right button always pans.

mod touch;
mod wheel;

use std::mem;

#[cfg(feature = "serde")]
use serde::Serialize;

use specchart_core::{
    ChartOptions, HostEvent, Modifiers, Platform, PointerButton, PointerEvent, Spectrum,
    SpectrumType, YScaleMode,
};

use crate::layout::Layout;
use crate::overview::{OverviewChart, OverviewHit};
use crate::scale::{clamp_to_bounds, ScaleManager};
use crate::scaler::ScalerSlider;
use crate::throttle::Throttle;

pub use touch::{classify_two_finger, MultiTouch, TouchMode, TouchTrack, TouchTracker};
pub use wheel::{wheel_domain, WheelSession};

/// Upward drag distance that adds one peak to the fit hint.
const PEAKS_HINT_STEP_PX: f64 = 25.0;
const MAX_PEAKS_HINT: u32 = 10;

/// The mode a gesture is in, for callers that only need to know what is
/// going on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Mode {
    ZoomX,
    ZoomOut,
    ZoomY,
    DeletePeaks,
    CountGammas,
    Recalibrate,
    PeakFit,
    RoiDrag,
    Pan,
    ScalerDrag,
    YAxisDrag,
    OverviewDrag,
    Wheel,
}

/// Which boundary of a ROI is grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoiEdge {
    Lower,
    Upper,
}

/// Hit-test geometry of a drawn ROI, plot-local pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoiHandle {
    pub spectrum_type: SpectrumType,
    pub roi_index: usize,
    pub lower_energy: f64,
    pub upper_energy: f64,
    pub lower_px: f64,
    pub upper_px: f64,
    /// `(top, bottom)` pixel rows the ROI occupies.
    pub vertical_px_range: (f64, f64),
}

/// A ROI edge under the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoiGrab {
    pub handle: RoiHandle,
    pub edge: RoiEdge,
}

/// Nearest ROI edge within `grab_px` of plot-local `(x, y)`.
#[must_use]
pub fn roi_edge_at(handles: &[RoiHandle], x: f64, y: f64, grab_px: f64) -> Option<RoiGrab> {
    handles
        .iter()
        .filter(|h| y >= h.vertical_px_range.0 && y <= h.vertical_px_range.1)
        .filter_map(|h| {
            let to_lower = (x - h.lower_px).abs();
            let to_upper = (x - h.upper_px).abs();
            let (edge, distance) = if to_lower <= to_upper {
                (RoiEdge::Lower, to_lower)
            } else {
                (RoiEdge::Upper, to_upper)
            };
            (distance <= grab_px).then_some((RoiGrab { handle: *h, edge }, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(grab, _)| grab)
}

/// Changes the chart applies on behalf of the state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Domains changed; run the full render pipeline.
    Redraw,
    /// Only the scale factor changed; run the partial pipeline.
    PartialRedraw,
    /// Only the transient overlay changed.
    Overlay,
    SetScaleFactor {
        spectrum_type: SpectrumType,
        factor: f64,
    },
    /// A left click or tap landed at `energy`.
    LeftClick { energy: f64 },
    /// Animate the x domain towards `to`.
    Animate {
        from: (f64, f64),
        to: (f64, f64),
        start_ms: f64,
    },
}

/// Host events and effects produced by one handler call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GestureOutput {
    pub events: Vec<HostEvent>,
    pub effects: Vec<Effect>,
}

impl GestureOutput {
    fn emit(&mut self, event: HostEvent) {
        self.events.push(event);
    }

    fn effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    fn merge(&mut self, other: GestureOutput) {
        self.events.extend(other.events);
        self.effects.extend(other.effects);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.effects.is_empty()
    }
}

/// Everything a handler may read or mutate besides its own state.
pub struct GestureContext<'a> {
    pub scales: &'a mut ScaleManager,
    pub layout: &'a Layout,
    pub options: &'a ChartOptions,
    /// Energy extent of the loaded data.
    pub data_bounds: Option<(f64, f64)>,
    /// Typical channel width of the foreground, keV.
    pub channel_width: f64,
    pub roi_handles: &'a [RoiHandle],
    pub scalers: &'a [ScalerSlider],
    pub overview: Option<&'a OverviewChart>,
    pub foreground: Option<&'a Spectrum>,
}

impl GestureContext<'_> {
    fn local_x(&self, x: f64) -> f64 {
        x - self.layout.plot.x
    }

    fn local_y(&self, y: f64) -> f64 {
        y - self.layout.plot.y
    }

    /// Energy under container pixel column `x`.
    fn energy_at(&self, x: f64) -> f64 {
        self.scales.x().invert(self.local_x(x))
    }

    /// Scaled foreground counts in the channel at `energy`.
    fn counts_at(&self, energy: f64) -> f64 {
        self.foreground
            .map_or(0.0, |s| s.counts_at(energy) * s.y_scale_factor)
    }

    fn bounds(&self) -> (f64, f64) {
        self.data_bounds.unwrap_or_else(|| self.scales.x_domain())
    }

    fn tolerance(&self) -> f64 {
        self.options.click.move_tolerance_px
    }

    #[allow(clippy::cast_precision_loss)]
    fn min_width(&self) -> f64 {
        (self.channel_width * self.options.wheel.min_bins as f64).max(f64::EPSILON)
    }

    fn interval(&self) -> f64 {
        self.options.host_event_interval_ms
    }

    fn x_range_event(&self) -> HostEvent {
        let (min, max) = self.scales.x_domain();
        HostEvent::XRangeChanged {
            min,
            max,
            width_px: self.layout.plot.width,
            height_px: self.layout.plot.height,
        }
    }

    /// Emits `xrangechanged` if the domain moved away from `start`.
    #[allow(clippy::float_cmp)]
    fn notify_if_changed(&self, start: (f64, f64), out: &mut GestureOutput) {
        if self.scales.x_domain() != start {
            out.emit(self.x_range_event());
        }
    }

    /// Applies a live x-domain change.
    fn set_x_live(&mut self, target: (f64, f64), out: &mut GestureOutput) {
        if self.scales.set_x_range(target.0, target.1) {
            out.effect(Effect::Redraw);
        }
    }

    /// Commits a new x domain, animating when allowed and configured.
    fn commit_x(&mut self, target: (f64, f64), time_ms: f64, animate: bool, out: &mut GestureOutput) {
        let current = self.scales.x_domain();
        if target.0.is_nan() || target.1.is_nan() || target.0 >= target.1 {
            return;
        }
        if (target.0 - current.0).abs() + (target.1 - current.1).abs() <= f64::EPSILON {
            return;
        }
        if animate && self.options.animation_duration_ms > 0.0 {
            out.effect(Effect::Animate {
                from: current,
                to: target,
                start_ms: time_ms,
            });
        } else if self.scales.set_x_range(target.0, target.1) {
            out.emit(self.x_range_event());
            out.effect(Effect::Redraw);
        }
    }

    /// Puts both domains back to how they were at `origin`.
    fn restore(&mut self, origin: &DragOrigin) {
        self.scales.set_x_range(origin.x_domain.0, origin.x_domain.1);
        self.scales.restore_y(origin.y_domain, origin.y_override);
    }
}

/// State captured when a gesture starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOrigin {
    /// Container pixels.
    pub x: f64,
    pub y: f64,
    pub page_x: f64,
    pub page_y: f64,
    pub time_ms: f64,
    pub x_domain: (f64, f64),
    pub y_domain: (f64, f64),
    pub y_override: Option<(f64, f64)>,
    /// ROI edge under the press, if any.
    pub roi_grab: Option<RoiGrab>,
}

impl DragOrigin {
    fn capture(x: f64, y: f64, page: (f64, f64), time_ms: f64, scales: &ScaleManager) -> Self {
        Self {
            x,
            y,
            page_x: page.0,
            page_y: page.1,
            time_ms,
            x_domain: scales.x_domain(),
            y_domain: scales.y_domain(),
            y_override: scales.y_override(),
            roi_grab: None,
        }
    }
}

/// A press-drag-release in container pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxDrag {
    pub origin: DragOrigin,
    pub current_x: f64,
    pub current_y: f64,
    pub page_x: f64,
    pub page_y: f64,
    /// Movement exceeded the click tolerance at some point.
    pub moved: bool,
}

impl BoxDrag {
    fn new(origin: DragOrigin) -> Self {
        Self {
            origin,
            current_x: origin.x,
            current_y: origin.y,
            page_x: origin.page_x,
            page_y: origin.page_y,
            moved: false,
        }
    }

    fn update(&mut self, x: f64, y: f64, page: (f64, f64), tolerance: f64) {
        self.current_x = x;
        self.current_y = y;
        self.page_x = page.0;
        self.page_y = page.1;
        if (x - self.origin.x).abs() >= tolerance || (y - self.origin.y).abs() >= tolerance {
            self.moved = true;
        }
    }

    /// Energies under the start and current columns, ascending.
    fn energy_range(&self, ctx: &GestureContext<'_>) -> (f64, f64) {
        let a = ctx.energy_at(self.origin.x);
        let b = ctx.energy_at(self.current_x);
        (a.min(b), a.max(b))
    }
}

/// The single active interaction.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    ZoomX(BoxDrag),
    ZoomY(BoxDrag),
    DeletePeaks(BoxDrag),
    CountGammas(BoxDrag),
    Recalibrate(BoxDrag),
    PeakFit {
        drag: BoxDrag,
        previews: Throttle<HostEvent>,
    },
    RoiDrag {
        drag: BoxDrag,
        grab: RoiGrab,
        proposal: (f64, f64),
        previews: Throttle<HostEvent>,
    },
    Pan(BoxDrag),
    ScalerDrag {
        origin: DragOrigin,
        slider: ScalerSlider,
        factor: f64,
        previews: Throttle<HostEvent>,
    },
    YAxisDrag {
        origin: DragOrigin,
        /// Counts value grabbed at the press.
        value: f64,
        moved: bool,
    },
    OverviewDrag {
        origin: DragOrigin,
        hit: OverviewHit,
        start_px: f64,
        start_domain: (f64, f64),
    },
    TouchPan {
        drag: BoxDrag,
        long_press_fired: bool,
    },
    TouchMulti(MultiTouch),
    Wheel(WheelSession),
}

/// Left-button plot modes, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LeftKind {
    PeakFit,
    DeletePeaks,
    CountGammas,
    Recalibrate,
    ZoomY,
    RoiDrag,
    ZoomX,
}

fn left_kind(m: Modifiers, platform: Platform, on_roi_edge: bool) -> LeftKind {
    let y_zoom = match platform {
        Platform::Windows => m.alt && !m.ctrl && !m.shift && !m.meta,
        Platform::Other => m.meta && !m.ctrl && !m.shift && !m.alt,
    };
    if m.ctrl && !m.alt && !m.meta && !m.shift {
        LeftKind::PeakFit
    } else if m.shift && !m.alt && !m.ctrl && !m.meta {
        LeftKind::DeletePeaks
    } else if m.alt && m.shift && !m.ctrl && !m.meta {
        LeftKind::CountGammas
    } else if m.alt && m.ctrl && !m.shift && !m.meta {
        LeftKind::Recalibrate
    } else if y_zoom {
        LeftKind::ZoomY
    } else if on_roi_edge && m.is_none() {
        LeftKind::RoiDrag
    } else {
        LeftKind::ZoomX
    }
}

impl Interaction {
    fn left_kind(&self) -> Option<LeftKind> {
        Some(match self {
            Self::ZoomX(_) => LeftKind::ZoomX,
            Self::ZoomY(_) => LeftKind::ZoomY,
            Self::DeletePeaks(_) => LeftKind::DeletePeaks,
            Self::CountGammas(_) => LeftKind::CountGammas,
            Self::Recalibrate(_) => LeftKind::Recalibrate,
            Self::PeakFit { .. } => LeftKind::PeakFit,
            Self::RoiDrag { .. } => LeftKind::RoiDrag,
            _ => return None,
        })
    }

    fn left_drag_mut(&mut self) -> Option<&mut BoxDrag> {
        match self {
            Self::ZoomX(d)
            | Self::ZoomY(d)
            | Self::DeletePeaks(d)
            | Self::CountGammas(d)
            | Self::Recalibrate(d)
            | Self::PeakFit { drag: d, .. }
            | Self::RoiDrag { drag: d, .. } => Some(d),
            _ => None,
        }
    }

    fn left(kind: LeftKind, drag: BoxDrag, interval_ms: f64) -> Self {
        match (kind, drag.origin.roi_grab) {
            (LeftKind::ZoomY, _) => Self::ZoomY(drag),
            (LeftKind::DeletePeaks, _) => Self::DeletePeaks(drag),
            (LeftKind::CountGammas, _) => Self::CountGammas(drag),
            (LeftKind::Recalibrate, _) => Self::Recalibrate(drag),
            (LeftKind::PeakFit, _) => Self::PeakFit {
                drag,
                previews: Throttle::new(interval_ms),
            },
            (LeftKind::RoiDrag, Some(grab)) => Self::RoiDrag {
                drag,
                grab,
                proposal: (grab.handle.lower_energy, grab.handle.upper_energy),
                previews: Throttle::new(interval_ms),
            },
            (LeftKind::RoiDrag | LeftKind::ZoomX, _) => Self::ZoomX(drag),
        }
    }

    /// The active mode, if any.
    #[must_use]
    pub fn mode(&self) -> Option<Mode> {
        match self {
            Self::Idle => None,
            Self::ZoomX(d) => Some(if d.moved && d.current_x < d.origin.x {
                Mode::ZoomOut
            } else {
                Mode::ZoomX
            }),
            Self::ZoomY(_) => Some(Mode::ZoomY),
            Self::DeletePeaks(_) => Some(Mode::DeletePeaks),
            Self::CountGammas(_) => Some(Mode::CountGammas),
            Self::Recalibrate(_) => Some(Mode::Recalibrate),
            Self::PeakFit { .. } => Some(Mode::PeakFit),
            Self::RoiDrag { .. } => Some(Mode::RoiDrag),
            Self::Pan(_) | Self::TouchPan { .. } => Some(Mode::Pan),
            Self::ScalerDrag { .. } => Some(Mode::ScalerDrag),
            Self::YAxisDrag { .. } => Some(Mode::YAxisDrag),
            Self::OverviewDrag { .. } => Some(Mode::OverviewDrag),
            Self::TouchMulti(m) => m.mode.map(TouchMode::as_mode),
            Self::Wheel(_) => Some(Mode::Wheel),
        }
    }
}

/// Kind of transient overlay drawn during a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum OverlayKind {
    ZoomIn,
    ZoomOut,
    ZoomY,
    DeletePeaks,
    CountGammas,
    Recalibrate,
    PeakFit,
    RoiEdge,
}

/// Transient rectangle in plot-local pixels.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Overlay {
    pub kind: OverlayKind,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ClickRecord {
    time_ms: f64,
    x: f64,
    y: f64,
}

/// Owner of the active interaction and the touch bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct GestureEngine {
    interaction: Interaction,
    touches: TouchTracker,
    last_click: Option<ClickRecord>,
}

impl GestureEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    #[must_use]
    pub fn active_mode(&self) -> Option<Mode> {
        self.interaction.mode()
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.interaction == Interaction::Idle
    }

    #[must_use]
    pub fn touches(&self) -> &TouchTracker {
        &self.touches
    }

    /// Reports a left click or tap and detects double clicks.
    fn click(
        &mut self,
        x: f64,
        y: f64,
        page: (f64, f64),
        time_ms: f64,
        ctx: &GestureContext<'_>,
        out: &mut GestureOutput,
    ) {
        let energy = ctx.energy_at(x);
        let count = ctx.counts_at(energy);
        out.emit(HostEvent::LeftClicked {
            energy,
            count,
            page_x: page.0,
            page_y: page.1,
        });
        out.effect(Effect::LeftClick { energy });

        let limits = ctx.options.click;
        let is_double = self.last_click.is_some_and(|c| {
            time_ms - c.time_ms <= limits.double_click_ms
                && (x - c.x).hypot(y - c.y) <= limits.double_click_px
        });
        if is_double {
            out.emit(HostEvent::DoubleClicked {
                energy,
                count,
                page_x: page.0,
                page_y: page.1,
            });
            self.last_click = None;
        } else {
            self.last_click = Some(ClickRecord { time_ms, x, y });
        }
    }

    fn right_click(x: f64, page: (f64, f64), ctx: &GestureContext<'_>, out: &mut GestureOutput) {
        let energy = ctx.energy_at(x);
        out.emit(HostEvent::RightClicked {
            energy,
            count: ctx.counts_at(energy),
            page_x: page.0,
            page_y: page.1,
        });
    }

    /// Mouse button pressed.
    pub fn pointer_down(&mut self, ev: &PointerEvent, ctx: &mut GestureContext<'_>) -> GestureOutput {
        let mut out = GestureOutput::default();
        match self.interaction {
            Interaction::Idle => {}
            Interaction::Wheel(_) => out.merge(self.commit_wheel(ctx)),
            _ => return out,
        }

        let layout = ctx.layout;
        let page = (ev.page_x, ev.page_y);
        let mut origin = DragOrigin::capture(ev.x, ev.y, page, ev.time_ms, ctx.scales);

        match ev.button {
            PointerButton::Secondary if layout.in_plot(ev.x, ev.y) => {
                self.interaction = Interaction::Pan(BoxDrag::new(origin));
            }
            PointerButton::Primary if layout.in_overview(ev.x, ev.y) => {
                self.start_overview_drag(origin, ctx, &mut out);
            }
            PointerButton::Primary if layout.in_y_axis(ev.x, ev.y) => {
                let value = ctx.scales.y().invert(ctx.local_y(ev.y));
                ctx.scales.set_y_drag_active(true);
                self.interaction = Interaction::YAxisDrag {
                    origin,
                    value,
                    moved: false,
                };
            }
            PointerButton::Primary if layout.in_plot(ev.x, ev.y) => {
                let (lx, ly) = layout.to_plot(ev.x, ev.y);
                if let Some(slider) = ctx.scalers.iter().find(|s| s.hit(lx, ly)) {
                    self.interaction = Interaction::ScalerDrag {
                        origin,
                        slider: *slider,
                        factor: slider.factor,
                        previews: Throttle::new(ctx.interval()),
                    };
                } else {
                    origin.roi_grab = roi_edge_at(ctx.roi_handles, lx, ly, ctx.options.roi_edge_grab_px);
                    let kind = left_kind(ev.modifiers, ctx.options.platform, origin.roi_grab.is_some());
                    self.interaction = Interaction::left(kind, BoxDrag::new(origin), ctx.interval());
                }
            }
            _ => {}
        }
        if let Some(mode) = self.active_mode() {
            log::debug!("pointer down at ({}, {}) starts {mode:?}", ev.x, ev.y);
        }
        out
    }

    fn start_overview_drag(&mut self, origin: DragOrigin, ctx: &mut GestureContext<'_>, out: &mut GestureOutput) {
        let (Some(overview), Some(rect)) = (ctx.overview, ctx.layout.overview) else {
            return;
        };
        let px = origin.x - rect.x;
        let mut hit = overview.hit_test(px, origin.x_domain);
        if hit == OverviewHit::Outside {
            let centred = overview.recenter(px, origin.x_domain);
            ctx.set_x_live(centred, out);
            hit = OverviewHit::Inside;
        }
        self.interaction = Interaction::OverviewDrag {
            origin,
            hit,
            start_px: px,
            start_domain: ctx.scales.x_domain(),
        };
    }

    /// Pointer moved with a button held (or hovering, which does nothing here).
    pub fn pointer_move(&mut self, ev: &PointerEvent, ctx: &mut GestureContext<'_>) -> GestureOutput {
        if self.interaction.left_kind().is_some() {
            return self.left_move(ev, ctx, true);
        }
        let mut out = GestureOutput::default();
        let tolerance = ctx.tolerance();
        let page = (ev.page_x, ev.page_y);
        match &mut self.interaction {
            Interaction::Pan(drag) => {
                drag.update(ev.x, ev.y, page, tolerance);
                pan(drag, ctx, &mut out);
            }
            Interaction::ScalerDrag {
                slider,
                factor,
                previews,
                ..
            } => {
                let next = slider.factor_at(ctx.local_y(ev.y));
                if (next - *factor).abs() > f64::EPSILON {
                    *factor = next;
                    out.effect(Effect::SetScaleFactor {
                        spectrum_type: slider.spectrum_type,
                        factor: next,
                    });
                    out.effect(Effect::PartialRedraw);
                    let event = HostEvent::YScaled {
                        factor: next,
                        spectrum_type: slider.spectrum_type,
                    };
                    if let Some(event) = previews.offer(event, ev.time_ms) {
                        out.emit(event);
                    }
                }
            }
            Interaction::YAxisDrag { origin, value, moved } => {
                if (ev.y - origin.y).abs() >= tolerance {
                    *moved = true;
                }
                let local = ctx.local_y(ev.y);
                if let Some((lo, hi)) =
                    drag_y_domain(ctx.scales.y().mode(), origin.y_domain, *value, local, ctx.layout.plot.height)
                {
                    ctx.scales.set_y_domain_live(lo, hi);
                    out.effect(Effect::Redraw);
                }
            }
            Interaction::OverviewDrag {
                hit,
                start_px,
                start_domain,
                ..
            } => {
                if let (Some(overview), Some(rect)) = (ctx.overview, ctx.layout.overview) {
                    let px = ev.x - rect.x;
                    let target = overview.drag_domain(*hit, *start_domain, *start_px, px);
                    ctx.set_x_live(target, &mut out);
                }
            }
            _ => {}
        }
        out
    }

    /// Updates a left-button drag, switching modes when the modifiers ask
    /// for a different one.
    fn left_move(&mut self, ev: &PointerEvent, ctx: &mut GestureContext<'_>, stream: bool) -> GestureOutput {
        let mut out = GestureOutput::default();
        let Some(current) = self.interaction.left_kind() else {
            return out;
        };
        let tolerance = ctx.tolerance();
        let Some(drag) = self.interaction.left_drag_mut() else {
            return out;
        };
        drag.update(ev.x, ev.y, (ev.page_x, ev.page_y), tolerance);
        let drag = *drag;

        let desired = left_kind(ev.modifiers, ctx.options.platform, drag.origin.roi_grab.is_some());
        if desired != current {
            log::debug!("modifiers changed: {current:?} -> {desired:?}");
            let previous = mem::take(&mut self.interaction);
            out.merge(abandon(previous, ctx));
            self.interaction = Interaction::left(desired, drag, ctx.interval());
        }

        if !drag.moved {
            return out;
        }
        match &mut self.interaction {
            Interaction::PeakFit { drag, previews } if stream && ctx.options.fit_roi_on_ctrl_drag => {
                let event = fit_event(drag, ctx, false);
                if let Some(event) = previews.offer(event, ev.time_ms) {
                    out.emit(event);
                }
            }
            Interaction::RoiDrag {
                drag,
                grab,
                proposal,
                previews,
            } => {
                *proposal = roi_proposal(grab, drag.current_x, ctx);
                if stream {
                    let event = roi_event(grab, *proposal, ctx, false);
                    if let Some(event) = previews.offer(event, ev.time_ms) {
                        out.emit(event);
                    }
                }
            }
            _ => {}
        }
        out.effect(Effect::Overlay);
        out
    }

    /// Mouse button released.
    pub fn pointer_up(&mut self, ev: &PointerEvent, ctx: &mut GestureContext<'_>) -> GestureOutput {
        let mut out = GestureOutput::default();
        if self.interaction.left_kind().is_some() {
            out.merge(self.left_move(ev, ctx, false));
        } else {
            out.merge(self.pointer_move(ev, ctx));
        }
        let page = (ev.page_x, ev.page_y);
        let state = mem::take(&mut self.interaction);
        match state {
            Interaction::ZoomX(drag)
            | Interaction::ZoomY(drag)
            | Interaction::DeletePeaks(drag)
            | Interaction::CountGammas(drag)
            | Interaction::Recalibrate(drag)
            | Interaction::PeakFit { drag, .. }
            | Interaction::RoiDrag { drag, .. }
                if !drag.moved =>
            {
                self.click(ev.x, ev.y, page, ev.time_ms, ctx, &mut out);
            }
            Interaction::ZoomX(drag) => zoom_x_commit(&drag, ev.time_ms, ctx, &mut out),
            Interaction::ZoomY(drag) => {
                let y0 = ctx.local_y(drag.origin.y).clamp(0.0, ctx.layout.plot.height);
                let y1 = ctx.local_y(drag.current_y).clamp(0.0, ctx.layout.plot.height);
                if y1 > y0 {
                    let max = ctx.scales.y().invert(y0);
                    let min = ctx.scales.y().invert(y1);
                    ctx.scales.set_y_override(min, max);
                } else {
                    ctx.scales.clear_y_override();
                }
                out.effect(Effect::Redraw);
            }
            Interaction::DeletePeaks(drag) => {
                let (low_energy, high_energy) = drag.energy_range(ctx);
                out.emit(HostEvent::ShiftKeyDragged {
                    low_energy,
                    high_energy,
                });
            }
            Interaction::CountGammas(drag) => {
                let (low_energy, high_energy) = drag.energy_range(ctx);
                out.emit(HostEvent::ShiftAltKeyDragged {
                    low_energy,
                    high_energy,
                });
            }
            Interaction::Recalibrate(drag) => {
                out.emit(HostEvent::RightMouseDragged {
                    start_energy: ctx.energy_at(drag.origin.x),
                    end_energy: ctx.energy_at(drag.current_x),
                });
            }
            Interaction::PeakFit { drag, mut previews } => {
                previews.discard();
                out.emit(peak_fit_final(&drag, ctx));
            }
            Interaction::RoiDrag {
                grab,
                proposal,
                mut previews,
                ..
            } => {
                previews.discard();
                out.emit(roi_event(&grab, proposal, ctx, true));
            }
            Interaction::Pan(drag) => {
                if drag.moved {
                    ctx.notify_if_changed(drag.origin.x_domain, &mut out);
                } else {
                    Self::right_click(ev.x, page, ctx, &mut out);
                }
            }
            Interaction::ScalerDrag {
                slider,
                factor,
                mut previews,
                ..
            } => {
                previews.discard();
                if (factor - slider.factor).abs() > f64::EPSILON {
                    out.emit(HostEvent::YScaled {
                        factor,
                        spectrum_type: slider.spectrum_type,
                    });
                }
            }
            Interaction::YAxisDrag { origin, moved, .. } => {
                ctx.scales.set_y_drag_active(false);
                if moved {
                    let (lo, hi) = ctx.scales.y_domain();
                    ctx.scales.set_y_override(lo, hi);
                } else {
                    ctx.scales.restore_y(origin.y_domain, origin.y_override);
                }
                out.effect(Effect::Redraw);
            }
            Interaction::OverviewDrag { origin, .. } => {
                ctx.notify_if_changed(origin.x_domain, &mut out);
            }
            other => self.interaction = other,
        }
        out.effect(Effect::Overlay);
        out
    }

    /// Escape or lost capture: ends the active mode and restores whatever
    /// it changed.
    pub fn cancel(&mut self, ctx: &mut GestureContext<'_>) -> GestureOutput {
        let state = mem::take(&mut self.interaction);
        if state == Interaction::Idle {
            return GestureOutput::default();
        }
        log::debug!("cancelling {:?}", state.mode());
        let mut out = abandon(state, ctx);
        out.effect(Effect::Redraw);
        out
    }

    /// Periodic callback: wheel commit, long press, trailing previews.
    pub fn tick(&mut self, now_ms: f64, ctx: &mut GestureContext<'_>) -> GestureOutput {
        let mut out = GestureOutput::default();
        let wheel_due = matches!(
            &self.interaction,
            Interaction::Wheel(session) if now_ms - session.last_event_ms >= ctx.options.wheel.coalesce_ms
        );
        if wheel_due {
            out.merge(self.commit_wheel(ctx));
            return out;
        }
        match &mut self.interaction {
            Interaction::TouchPan {
                drag,
                long_press_fired,
            } => {
                let held = now_ms - drag.origin.time_ms;
                if !drag.moved && !*long_press_fired && held >= ctx.options.click.long_press_ms {
                    *long_press_fired = true;
                    Self::right_click(drag.origin.x, (drag.origin.page_x, drag.origin.page_y), ctx, &mut out);
                }
            }
            Interaction::PeakFit { previews, .. }
            | Interaction::RoiDrag { previews, .. }
            | Interaction::ScalerDrag { previews, .. } => {
                if let Some(event) = previews.poll(now_ms) {
                    out.emit(event);
                }
            }
            Interaction::TouchMulti(multi) => {
                if let Some(event) = multi.previews.poll(now_ms) {
                    out.emit(event);
                }
            }
            _ => {}
        }
        out
    }

    /// Transient overlay for the active mode, plot-local pixels.
    #[must_use]
    pub fn overlay(&self, layout: &Layout, scales: &ScaleManager) -> Option<Overlay> {
        let x = scales.x();
        let width = layout.plot.width;
        let height = layout.plot.height;
        let lx = |v: f64| (v - layout.plot.x).clamp(0.0, width);
        let band = |kind, drag: &BoxDrag, text: String| {
            let (a, b) = (lx(drag.origin.x), lx(drag.current_x));
            Overlay {
                kind,
                x0: a.min(b),
                x1: a.max(b),
                y0: 0.0,
                y1: height,
                text,
            }
        };
        let span_text = |drag: &BoxDrag| {
            let a = x.invert(lx(drag.origin.x));
            let b = x.invert(lx(drag.current_x));
            format!("{:.1} - {:.1} keV", a.min(b), a.max(b))
        };
        match &self.interaction {
            Interaction::ZoomX(d) if d.moved => Some(if d.current_x < d.origin.x {
                band(OverlayKind::ZoomOut, d, "Zoom Out".to_string())
            } else {
                band(OverlayKind::ZoomIn, d, span_text(d))
            }),
            Interaction::ZoomY(d) if d.moved => {
                let ly = |v: f64| (v - layout.plot.y).clamp(0.0, height);
                let (a, b) = (ly(d.origin.y), ly(d.current_y));
                Some(Overlay {
                    kind: OverlayKind::ZoomY,
                    x0: 0.0,
                    x1: width,
                    y0: a.min(b),
                    y1: a.max(b),
                    text: if b > a { "Zoom In Y" } else { "Reset Y" }.to_string(),
                })
            }
            Interaction::DeletePeaks(d) if d.moved => {
                Some(band(OverlayKind::DeletePeaks, d, "Delete Peaks".to_string()))
            }
            Interaction::CountGammas(d) if d.moved => Some(band(OverlayKind::CountGammas, d, span_text(d))),
            Interaction::Recalibrate(d) if d.moved => {
                let shift = x.invert(lx(d.current_x)) - x.invert(lx(d.origin.x));
                Some(band(OverlayKind::Recalibrate, d, format!("Shift {shift:+.1} keV")))
            }
            Interaction::PeakFit { drag, .. } if drag.moved => {
                let hint = peaks_hint(drag.origin.y - drag.current_y);
                Some(band(OverlayKind::PeakFit, drag, format!("Fit {hint} peak(s)")))
            }
            Interaction::RoiDrag { drag, proposal, .. } if drag.moved => Some(Overlay {
                kind: OverlayKind::RoiEdge,
                x0: x.map(proposal.0),
                x1: x.map(proposal.1),
                y0: 0.0,
                y1: height,
                text: format!("{:.1} - {:.1} keV", proposal.0, proposal.1),
            }),
            Interaction::TouchMulti(multi) => multi.overlay(layout, scales),
            _ => None,
        }
    }
}

/// Drags the x domain along with the pointer, inside the data bounds.
fn pan(drag: &BoxDrag, ctx: &mut GestureContext<'_>, out: &mut GestureOutput) {
    if !drag.moved {
        return;
    }
    let start = drag.origin.x_domain;
    let per_px = (start.1 - start.0) / ctx.layout.plot.width.max(1.0);
    let shift = (drag.current_x - drag.origin.x) * per_px;
    let target = clamp_to_bounds((start.0 - shift, start.1 - shift), ctx.bounds());
    ctx.set_x_live(target, out);
}

/// Ends `state` without committing it: restores live domain or factor
/// changes and closes preview streams the host has seen.
fn abandon(state: Interaction, ctx: &mut GestureContext<'_>) -> GestureOutput {
    let mut out = GestureOutput::default();
    match state {
        Interaction::PeakFit { drag, previews } if previews.has_emitted() => {
            let (lower, upper) = drag.energy_range(ctx);
            out.emit(HostEvent::FitRoiDrag {
                lower,
                upper,
                num_peaks_hint: 0,
                is_final: true,
                page_x: drag.page_x,
                page_y: drag.page_y,
            });
        }
        Interaction::RoiDrag { grab, previews, .. } if previews.has_emitted() => {
            let original = (grab.handle.lower_energy, grab.handle.upper_energy);
            out.emit(roi_event(&grab, original, ctx, true));
        }
        Interaction::Pan(drag) | Interaction::TouchPan { drag, .. } => ctx.restore(&drag.origin),
        Interaction::OverviewDrag { origin, .. } => ctx.restore(&origin),
        Interaction::ScalerDrag {
            slider,
            factor,
            previews,
            ..
        } => {
            if (factor - slider.factor).abs() > f64::EPSILON {
                out.effect(Effect::SetScaleFactor {
                    spectrum_type: slider.spectrum_type,
                    factor: slider.factor,
                });
                out.effect(Effect::PartialRedraw);
            }
            if previews.has_emitted() {
                out.emit(HostEvent::YScaled {
                    factor: slider.factor,
                    spectrum_type: slider.spectrum_type,
                });
            }
        }
        Interaction::YAxisDrag { origin, .. } => {
            ctx.scales.set_y_drag_active(false);
            ctx.scales.restore_y(origin.y_domain, origin.y_override);
        }
        Interaction::TouchMulti(multi) => out.merge(multi.abandon(ctx)),
        Interaction::Wheel(session) => {
            ctx.scales.set_x_range(session.start_domain.0, session.start_domain.1);
        }
        _ => {}
    }
    out
}

/// Fit-hint: one peak plus one per [`PEAKS_HINT_STEP_PX`] dragged upward.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn peaks_hint(upward_px: f64) -> u32 {
    let extra = (upward_px.max(0.0) / PEAKS_HINT_STEP_PX).floor();
    (1 + extra.min(f64::from(MAX_PEAKS_HINT)) as u32).min(MAX_PEAKS_HINT)
}

fn fit_event(drag: &BoxDrag, ctx: &GestureContext<'_>, is_final: bool) -> HostEvent {
    let (lower, upper) = drag.energy_range(ctx);
    HostEvent::FitRoiDrag {
        lower,
        upper,
        num_peaks_hint: peaks_hint(drag.origin.y - drag.current_y),
        is_final,
        page_x: drag.page_x,
        page_y: drag.page_y,
    }
}

/// Event sent when a peak-fit drag is released.
fn peak_fit_final(drag: &BoxDrag, ctx: &GestureContext<'_>) -> HostEvent {
    if ctx.options.fit_roi_on_ctrl_drag {
        fit_event(drag, ctx, true)
    } else {
        let (low_energy, high_energy) = drag.energy_range(ctx);
        HostEvent::ControlKeyDragged {
            low_energy,
            high_energy,
            page_x: drag.page_x,
            page_y: drag.page_y,
        }
    }
}

/// Proposed ROI bounds with the grabbed edge under column `x`.
fn roi_proposal(grab: &RoiGrab, x: f64, ctx: &GestureContext<'_>) -> (f64, f64) {
    let energy = ctx.energy_at(x);
    let min_gap = ctx.scales.x().pixels_to_span(1.0).abs().max(f64::EPSILON);
    let (lower, upper) = (grab.handle.lower_energy, grab.handle.upper_energy);
    match grab.edge {
        RoiEdge::Lower => (energy.min(upper - min_gap), upper),
        RoiEdge::Upper => (lower, energy.max(lower + min_gap)),
    }
}

fn roi_event(grab: &RoiGrab, bounds: (f64, f64), ctx: &GestureContext<'_>, is_final: bool) -> HostEvent {
    HostEvent::RoiDrag {
        new_lower: bounds.0,
        new_upper: bounds.1,
        new_lower_px: ctx.scales.x().map(bounds.0),
        new_upper_px: ctx.scales.x().map(bounds.1),
        original_lower: grab.handle.lower_energy,
        is_final,
    }
}

/// Commits a released zoom box: left-to-right zooms into the box,
/// right-to-left zooms out towards the full extent. Boxes narrower than
/// the move tolerance change nothing.
fn zoom_x_commit(drag: &BoxDrag, time_ms: f64, ctx: &mut GestureContext<'_>, out: &mut GestureOutput) {
    if (drag.current_x - drag.origin.x).abs() < ctx.tolerance() {
        return;
    }
    let width = ctx.layout.plot.width;
    let x0 = ctx.local_x(drag.origin.x).clamp(0.0, width);
    let x1 = ctx.local_x(drag.current_x).clamp(0.0, width);
    let bounds = ctx.bounds();
    if drag.current_x > drag.origin.x {
        let lo = ctx.scales.x().invert(x0).max(bounds.0);
        let hi = ctx.scales.x().invert(x1).min(bounds.1);
        if hi > lo {
            ctx.commit_x((lo, hi), time_ms, true, out);
        }
    } else {
        let fraction = ((x0 - x1) / x0.max(1.0)).clamp(0.0, 1.0);
        let start = drag.origin.x_domain;
        let target = (
            start.0 + (bounds.0.min(start.0) - start.0) * fraction,
            start.1 + (bounds.1.max(start.1) - start.1) * fraction,
        );
        ctx.commit_x(target, time_ms, false, out);
    }
}

/// Y domain that keeps `value` under plot-local row `y` while holding the
/// bottom of the axis.
#[must_use]
pub fn drag_y_domain(
    mode: YScaleMode,
    domain: (f64, f64),
    value: f64,
    y: f64,
    height: f64,
) -> Option<(f64, f64)> {
    let below = height - y;
    if below < 1.0 || !value.is_finite() {
        return None;
    }
    let stretch = height / below;
    let lo = domain.0;
    let hi = match mode {
        YScaleMode::Linear => {
            if value <= lo {
                return None;
            }
            lo + (value - lo) * stretch
        }
        YScaleMode::Sqrt => {
            let s_lo = lo.max(0.0).sqrt();
            let s_value = value.max(0.0).sqrt();
            if s_value <= s_lo {
                return None;
            }
            (s_lo + (s_value - s_lo) * stretch).powi(2)
        }
        YScaleMode::Log => {
            if lo <= 0.0 || value <= lo {
                return None;
            }
            let l_lo = lo.log10();
            10f64.powf(l_lo + (value.log10() - l_lo) * stretch)
        }
    };
    (hi.is_finite() && hi > lo).then_some((lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_precedence() {
        let m = |shift, ctrl, alt, meta| Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        let other = Platform::Other;
        assert_eq!(left_kind(m(false, true, false, false), other, true), LeftKind::PeakFit);
        assert_eq!(left_kind(m(true, false, false, false), other, true), LeftKind::DeletePeaks);
        assert_eq!(left_kind(m(true, false, true, false), other, false), LeftKind::CountGammas);
        assert_eq!(left_kind(m(false, true, true, false), other, false), LeftKind::Recalibrate);
        assert_eq!(left_kind(m(false, false, false, true), other, false), LeftKind::ZoomY);
        assert_eq!(left_kind(m(false, false, true, false), other, false), LeftKind::ZoomX);
        assert_eq!(
            left_kind(m(false, false, true, false), Platform::Windows, false),
            LeftKind::ZoomY
        );
        assert_eq!(left_kind(Modifiers::NONE, other, true), LeftKind::RoiDrag);
        assert_eq!(left_kind(Modifiers::NONE, other, false), LeftKind::ZoomX);
    }

    #[test]
    fn test_peaks_hint() {
        assert_eq!(peaks_hint(-40.0), 1);
        assert_eq!(peaks_hint(24.0), 1);
        assert_eq!(peaks_hint(50.0), 3);
        assert_eq!(peaks_hint(10_000.0), MAX_PEAKS_HINT);
    }

    #[test]
    fn test_roi_edge_hit() {
        let handle = RoiHandle {
            spectrum_type: SpectrumType::Foreground,
            roi_index: 0,
            lower_energy: 100.0,
            upper_energy: 200.0,
            lower_px: 100.0,
            upper_px: 200.0,
            vertical_px_range: (50.0, 300.0),
        };
        let hit = roi_edge_at(&[handle], 104.0, 100.0, 5.0);
        assert_eq!(hit.map(|g| g.edge), Some(RoiEdge::Lower));
        let hit = roi_edge_at(&[handle], 197.0, 100.0, 5.0);
        assert_eq!(hit.map(|g| g.edge), Some(RoiEdge::Upper));
        assert!(roi_edge_at(&[handle], 110.0, 100.0, 5.0).is_none());
        assert!(roi_edge_at(&[handle], 100.0, 20.0, 5.0).is_none());
    }

    #[test]
    fn test_drag_y_domain_keeps_value_under_pointer() {
        let height = 200.0;
        for mode in [YScaleMode::Linear, YScaleMode::Sqrt, YScaleMode::Log] {
            let domain = (1.0, 1000.0);
            let (lo, hi) = drag_y_domain(mode, domain, 100.0, 50.0, height).unwrap_or(domain);
            let scale = crate::scale::YScale::new(mode, (lo, hi), height);
            assert_relative_eq!(scale.map(100.0), 50.0, epsilon = 1e-6);
            assert_relative_eq!(lo, 1.0);
        }
        assert!(drag_y_domain(YScaleMode::Linear, (0.0, 10.0), 5.0, 200.0, 200.0).is_none());
    }
}

//! The chart facade a host drives.
//!
//! [`SpectrumChart`] owns the data, the scales and the gesture state. Host
//! setters and input events only mark the chart dirty; [`SpectrumChart::render`]
//! runs the pipeline in a fixed order:
//!
//! rebin, y domain, axes, overview, ROI overlays, reference lines, feature
//! markers, spectrum lines.
//!
//! A scale-factor slider drag takes a shorter path that skips the y domain,
//! the axes and the overview. Host events collect in a queue drained with
//! [`SpectrumChart::take_events`] or [`SpectrumChart::flush_to`].

use std::mem;

use specchart_core::{
    ChartOptions, DisplayPoint, HighlightRegion, HostEvent, HostSink, InputEvent, Key,
    MarkerOptions, Peak, PeakType, PointerEvent, ReferenceLineSet, Roi, SearchWindow, Spectrum,
    SpectrumType, YScaleMode,
};

use crate::animation::{AnimationStep, FrameHandle, ZoomAnimation};
use crate::frame::{Frame, HoverInfo, LegendEntry, RoiOverlay, SpectrumLine};
use crate::geometry::{compute_roi_paths, place_labels, LabelMetrics, LabelRequest};
use crate::gesture::{roi_edge_at, Effect, GestureContext, GestureEngine, GestureOutput, Mode, RoiHandle};
use crate::layout::Layout;
use crate::markers::feature_markers;
use crate::overlays::{highlight_bands, hovered_reference_line, reference_line_geometry, search_window_bands};
use crate::overview::OverviewChart;
use crate::path::{step_path, Rect};
use crate::rebin::{background_subtract, rebin, RebinState};
use crate::scale::{visible_y_range, ScaleManager, DEFAULT_X_DOMAIN};
use crate::scaler::layout_sliders;
use crate::ticks::{x_ticks, y_ticks, Tick};

/// Label spacing factor for the compact x axis.
const COMPACT_X_SPACING: f64 = 0.75;

/// How much of the frame is stale, in increasing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
enum Redraw {
    #[default]
    None,
    /// Hover readout, markers and gesture overlay.
    Transient,
    /// Geometry and lines; axes stay.
    Partial,
    Full,
}

/// A loaded spectrum with its rebin cache.
#[derive(Debug, Clone)]
struct Slot {
    spectrum: Spectrum,
    rebin: RebinState,
    /// Background-subtracted points, when that view is active.
    subtracted: Option<Vec<DisplayPoint>>,
}

impl Slot {
    fn new(spectrum: Spectrum) -> Self {
        Self {
            spectrum,
            rebin: RebinState::new(),
            subtracted: None,
        }
    }

    fn spectrum_type(&self) -> SpectrumType {
        self.spectrum.spectrum_type
    }

    /// Points the spectrum is drawn from.
    fn display_points(&self) -> &[DisplayPoint] {
        self.subtracted.as_deref().unwrap_or_else(|| self.rebin.points())
    }
}

/// Interactive gamma-spectrum chart.
#[derive(Debug)]
pub struct SpectrumChart {
    options: ChartOptions,
    width: f64,
    height: f64,
    layout: Layout,
    scales: ScaleManager,
    slots: Vec<Slot>,
    reference_lines: Vec<ReferenceLineSet>,
    search_windows: Vec<SearchWindow>,
    highlights: Vec<HighlightRegion>,
    gestures: GestureEngine,
    overview: OverviewChart,
    animation: Option<ZoomAnimation>,
    next_frame: u64,
    /// Energy of the last left click, for the sum-peak marker.
    sum_anchor: Option<f64>,
    /// Hovering pointer, container pixels.
    hover: Option<(f64, f64)>,
    legend_visible: bool,
    roi_handles: Vec<RoiHandle>,
    events: Vec<HostEvent>,
    frame: Frame,
    redraw: Redraw,
}

fn checked_options(options: ChartOptions) -> ChartOptions {
    match options.validate() {
        Ok(()) => options,
        Err(e) => {
            log::warn!("invalid chart options ({e}); using defaults");
            ChartOptions::default()
        }
    }
}

/// Drops ROIs and peaks that fail validation.
fn valid_rois(rois: Vec<Roi>) -> Vec<Roi> {
    rois.into_iter()
        .filter_map(|mut roi| {
            if let Err(e) = roi.validate() {
                log::warn!(
                    "skipping ROI [{}, {}]: {e}",
                    roi.lower_energy,
                    roi.upper_energy
                );
                return None;
            }
            roi.peaks.retain(|peak| match peak.validate() {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("skipping peak at {} keV: {e}", peak.mean);
                    false
                }
            });
            Some(roi)
        })
        .collect()
}

/// Text lines of a peak label under the current options.
fn label_lines(options: &ChartOptions, peak: &Peak) -> Vec<String> {
    let mut lines = Vec::new();
    if options.show_user_labels {
        if let Some(label) = peak.user_label.as_ref().filter(|l| !l.is_empty()) {
            lines.push(label.clone());
        }
    }
    if let Some(nuclide) = &peak.nuclide {
        match (options.show_nuclide_names, options.show_nuclide_energies) {
            (true, true) => lines.push(format!("{} {:.2} keV", nuclide.name, nuclide.energy)),
            (true, false) => lines.push(nuclide.name.clone()),
            (false, true) => lines.push(format!("{:.2} keV", nuclide.energy)),
            (false, false) => {}
        }
    }
    if options.show_peak_labels {
        lines.push(format!("{:.2} keV", peak.mean));
        lines.push(format!("FWHM {:.2}", peak.fwhm()));
        if peak.peak_type == PeakType::GaussianDefined {
            lines.push(format!("Area {:.1}", peak.amplitude));
        }
    }
    lines
}

impl SpectrumChart {
    /// Creates an empty chart for a `width` x `height` pixel container.
    ///
    /// Invalid options are replaced by the defaults.
    #[must_use]
    pub fn new(width: f64, height: f64, options: ChartOptions) -> Self {
        let options = checked_options(options);
        let layout = Layout::compute(width, height, &options);
        let scales = ScaleManager::new(layout.plot.width, layout.plot.height, options.y_scale_mode);
        Self {
            legend_visible: options.show_legend,
            options,
            width,
            height,
            layout,
            scales,
            slots: Vec::new(),
            reference_lines: Vec::new(),
            search_windows: Vec::new(),
            highlights: Vec::new(),
            gestures: GestureEngine::new(),
            overview: OverviewChart::new(),
            animation: None,
            next_frame: 0,
            sum_anchor: None,
            hover: None,
            roi_handles: Vec::new(),
            events: Vec::new(),
            frame: Frame::default(),
            redraw: Redraw::Full,
        }
    }

    fn mark(&mut self, level: Redraw) {
        self.redraw = self.redraw.max(level);
    }

    // ---- data ----

    /// Replaces the spectrum of `spectrum_type`, or adds it.
    ///
    /// `None` or an invalid spectrum removes that type instead. The x domain
    /// resets to the data extent when `reset_domain` is set or the chart was
    /// empty.
    pub fn set_spectrum_data(
        &mut self,
        spectrum: Option<Spectrum>,
        reset_domain: bool,
        spectrum_type: SpectrumType,
        id: Option<String>,
        background_id: Option<String>,
    ) {
        let Some(mut spectrum) = spectrum else {
            log::warn!("no {spectrum_type} spectrum supplied; removing it");
            self.remove_spectrum_data_by_type(reset_domain, spectrum_type);
            return;
        };
        if let Err(e) = spectrum.validate() {
            log::warn!("rejecting {spectrum_type} spectrum: {e}");
            self.remove_spectrum_data_by_type(reset_domain, spectrum_type);
            return;
        }
        spectrum.spectrum_type = spectrum_type;
        if id.is_some() {
            spectrum.id = id;
        }
        if background_id.is_some() {
            spectrum.background_id = background_id;
        }
        spectrum.rois = valid_rois(mem::take(&mut spectrum.rois));

        let was_empty = self.slots.is_empty();
        let slot = Slot::new(spectrum);
        match self.slots.iter_mut().find(|s| s.spectrum_type() == spectrum_type) {
            Some(existing) => *existing = slot,
            None => self.slots.push(slot),
        }
        self.data_changed(reset_domain || was_empty);
    }

    /// Removes the spectrum of `spectrum_type`.
    pub fn remove_spectrum_data_by_type(&mut self, reset_domain: bool, spectrum_type: SpectrumType) {
        let before = self.slots.len();
        self.slots.retain(|s| s.spectrum_type() != spectrum_type);
        if self.slots.len() != before {
            self.data_changed(reset_domain);
        }
    }

    fn data_changed(&mut self, reset_domain: bool) {
        self.scales.clear_y_override();
        self.overview.invalidate();
        if reset_domain {
            self.stop_animation();
            let (lo, hi) = self.data_bounds().unwrap_or(DEFAULT_X_DOMAIN);
            self.scales.set_x_range(lo, hi);
        }
        self.mark(Redraw::Full);
    }

    /// Replaces the ROIs of the spectrum of `spectrum_type`.
    pub fn set_roi_data(&mut self, rois: Vec<Roi>, spectrum_type: SpectrumType) {
        let rois = valid_rois(rois);
        match self.slots.iter_mut().find(|s| s.spectrum_type() == spectrum_type) {
            Some(slot) => {
                slot.spectrum.rois = rois;
                self.mark(Redraw::Full);
            }
            None => log::warn!("no {spectrum_type} spectrum to attach {} ROI(s) to", rois.len()),
        }
    }

    pub fn set_reference_lines(&mut self, sets: Vec<ReferenceLineSet>) {
        self.reference_lines = sets
            .into_iter()
            .filter(|set| match set.validate() {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("skipping reference lines for {}: {e}", set.parent);
                    false
                }
            })
            .collect();
        self.mark(Redraw::Full);
    }

    pub fn clear_reference_lines(&mut self) {
        self.reference_lines.clear();
        self.mark(Redraw::Full);
    }

    pub fn set_search_windows(&mut self, windows: Vec<SearchWindow>) {
        self.search_windows = windows;
        self.mark(Redraw::Full);
    }

    pub fn set_highlight_regions(&mut self, regions: Vec<HighlightRegion>) {
        self.highlights = regions;
        self.mark(Redraw::Full);
    }

    // ---- axes ----

    /// Sets the visible energy range.
    ///
    /// With `notify` set, a domain that actually changed is reported as
    /// `xrangechanged`.
    pub fn set_x_axis_range(&mut self, min: f64, max: f64, notify: bool) {
        self.stop_animation();
        if self.scales.set_x_range(min, max) {
            if notify {
                let event = self.x_range_event();
                self.events.push(event);
            }
            self.mark(Redraw::Full);
        }
    }

    pub fn set_x_axis_minimum(&mut self, min: f64, notify: bool) {
        let (_, max) = self.scales.x_domain();
        self.set_x_axis_range(min, max, notify);
    }

    pub fn set_x_axis_maximum(&mut self, max: f64, notify: bool) {
        let (min, _) = self.scales.x_domain();
        self.set_x_axis_range(min, max, notify);
    }

    /// Pins the counts range until the x domain, y mode or data change.
    pub fn set_y_axis_range(&mut self, min: f64, max: f64) {
        self.scales.set_y_override(min, max);
        self.mark(Redraw::Full);
    }

    pub fn set_y_axis_minimum(&mut self, min: f64) {
        let (_, max) = self.scales.y_domain();
        self.set_y_axis_range(min, max);
    }

    pub fn set_y_axis_maximum(&mut self, max: f64) {
        let (min, _) = self.scales.y_domain();
        self.set_y_axis_range(min, max);
    }

    pub fn set_y_scale_mode(&mut self, mode: YScaleMode) {
        self.options.y_scale_mode = mode;
        self.scales.set_y_mode(mode);
        self.mark(Redraw::Full);
    }

    pub fn set_log_y(&mut self) {
        self.set_y_scale_mode(YScaleMode::Log);
    }

    pub fn set_linear_y(&mut self) {
        self.set_y_scale_mode(YScaleMode::Linear);
    }

    pub fn set_sqrt_y(&mut self) {
        self.set_y_scale_mode(YScaleMode::Sqrt);
    }

    // ---- display options ----

    fn update_options(&mut self, change: impl FnOnce(&mut ChartOptions)) {
        change(&mut self.options);
        self.mark(Redraw::Full);
    }

    pub fn set_grid_x(&mut self, on: bool) {
        self.update_options(|o| o.grid_x = on);
    }

    pub fn set_grid_y(&mut self, on: bool) {
        self.update_options(|o| o.grid_y = on);
    }

    pub fn set_compact_x_axis(&mut self, on: bool) {
        self.update_options(|o| o.compact_x_axis = on);
    }

    pub fn set_show_legend(&mut self, on: bool) {
        self.legend_visible = on;
        self.update_options(|o| o.show_legend = on);
    }

    pub fn set_show_peak_labels(&mut self, on: bool) {
        self.update_options(|o| o.show_peak_labels = on);
    }

    pub fn set_show_user_labels(&mut self, on: bool) {
        self.update_options(|o| o.show_user_labels = on);
    }

    pub fn set_show_nuclide_names(&mut self, on: bool) {
        self.update_options(|o| o.show_nuclide_names = on);
    }

    pub fn set_show_nuclide_energies(&mut self, on: bool) {
        self.update_options(|o| o.show_nuclide_energies = on);
    }

    pub fn set_show_reference_lines(&mut self, on: bool) {
        self.update_options(|o| o.show_reference_lines = on);
    }

    pub fn set_show_scaler(&mut self, on: bool) {
        self.update_options(|o| o.show_scaler = on);
    }

    pub fn set_show_mouse_stats(&mut self, on: bool) {
        self.update_options(|o| o.show_mouse_stats = on);
    }

    pub fn set_show_overview(&mut self, on: bool) {
        self.options.show_overview = on;
        self.relayout();
    }

    pub fn set_markers(&mut self, markers: MarkerOptions) {
        if !markers.sum_peak {
            self.sum_anchor = None;
        }
        self.update_options(|o| o.markers = markers);
    }

    pub fn set_background_subtract(&mut self, on: bool) {
        self.scales.clear_y_override();
        self.update_options(|o| o.background_subtract = on);
    }

    /// Replaces every option at once; invalid options fall back to defaults.
    pub fn set_options(&mut self, options: ChartOptions) {
        self.options = checked_options(options);
        self.legend_visible = self.options.show_legend;
        self.scales.set_y_mode(self.options.y_scale_mode);
        self.relayout();
    }

    /// Re-derives the pixel geometry for a resized container.
    pub fn handle_resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.relayout();
    }

    fn relayout(&mut self) {
        self.layout = Layout::compute(self.width, self.height, &self.options);
        self.scales.set_plot_size(self.layout.plot.width, self.layout.plot.height);
        self.overview.invalidate();
        self.mark(Redraw::Full);
    }

    /// Hides the legend and tells the host.
    pub fn close_legend(&mut self) {
        if self.legend_visible {
            self.legend_visible = false;
            self.events.push(HostEvent::LegendClosed);
            self.mark(Redraw::Full);
        }
    }

    // ---- input ----

    /// Feeds one input event through the gesture state machine.
    pub fn handle_input(&mut self, input: &InputEvent) {
        match input {
            InputEvent::PointerDown(ev) => {
                self.interrupt_animation();
                self.drive(|g, ctx| g.pointer_down(ev, ctx));
            }
            InputEvent::PointerMove(ev) => self.pointer_moved(ev),
            InputEvent::PointerUp(ev) => self.drive(|g, ctx| g.pointer_up(ev, ctx)),
            InputEvent::PointerCancel => {
                self.hover = None;
                self.mark(Redraw::Transient);
                self.drive(|g, ctx| g.cancel(ctx));
            }
            InputEvent::TouchStart(ev) => {
                self.interrupt_animation();
                self.hover = None;
                self.drive(|g, ctx| g.touch_start(ev, ctx));
            }
            InputEvent::TouchMove(ev) => self.drive(|g, ctx| g.touch_move(ev, ctx)),
            InputEvent::TouchEnd(ev) => self.drive(|g, ctx| g.touch_end(ev, ctx)),
            InputEvent::TouchCancel => self.drive(|g, ctx| g.touch_cancel(ctx)),
            InputEvent::Wheel(ev) => {
                self.interrupt_animation();
                self.drive(|g, ctx| g.wheel(ev, ctx));
            }
            InputEvent::KeyDown { key: Key::Escape, .. } => self.escape(),
            InputEvent::KeyDown { .. } => {}
            InputEvent::Tick { time_ms } => self.tick(*time_ms),
            InputEvent::Resize { width, height } => self.handle_resize(*width, *height),
        }
    }

    fn pointer_moved(&mut self, ev: &PointerEvent) {
        self.hover = self.layout.in_plot(ev.x, ev.y).then_some((ev.x, ev.y));
        if self.gestures.is_idle() {
            self.mark(Redraw::Transient);
        } else {
            self.drive(|g, ctx| g.pointer_move(ev, ctx));
        }
    }

    /// Escape: stops any animation at its start and cancels the gesture.
    fn escape(&mut self) {
        if let Some(mut animation) = self.animation.take() {
            animation.cancel();
            let (lo, hi) = animation.start_domain();
            self.scales.set_x_range(lo, hi);
            self.mark(Redraw::Full);
        }
        self.drive(|g, ctx| g.cancel(ctx));
    }

    /// Frame callback: advances the zoom animation, commits idle wheel
    /// sessions, fires long presses and trailing throttled events.
    pub fn tick(&mut self, now_ms: f64) {
        if let Some(animation) = self.animation.as_mut() {
            match animation.step(now_ms) {
                AnimationStep::InProgress((lo, hi)) => {
                    self.scales.set_x_range(lo, hi);
                    self.mark(Redraw::Full);
                }
                AnimationStep::Finished((lo, hi)) => {
                    self.animation = None;
                    self.scales.set_x_range(lo, hi);
                    let event = self.x_range_event();
                    self.events.push(event);
                    self.mark(Redraw::Full);
                }
                AnimationStep::Idle => self.animation = None,
            }
        }
        self.drive(|g, ctx| g.tick(now_ms, ctx));
    }

    /// Runs a gesture handler against the current scales and geometry.
    fn drive<F>(&mut self, handler: F)
    where
        F: FnOnce(&mut GestureEngine, &mut GestureContext<'_>) -> GestureOutput,
    {
        self.refresh();
        let data_bounds = self.data_bounds();
        let channel_width = self.channel_width();
        let overview = self.layout.overview.map(|_| &self.overview);
        let foreground = self
            .slots
            .iter()
            .map(|s| &s.spectrum)
            .find(|s| s.spectrum_type == SpectrumType::Foreground);
        let mut ctx = GestureContext {
            scales: &mut self.scales,
            layout: &self.layout,
            options: &self.options,
            data_bounds,
            channel_width,
            roi_handles: &self.roi_handles,
            scalers: &self.frame.scalers,
            overview,
            foreground,
        };
        let output = handler(&mut self.gestures, &mut ctx);
        self.apply(output);
    }

    fn apply(&mut self, output: GestureOutput) {
        for effect in output.effects {
            match effect {
                Effect::Redraw => self.mark(Redraw::Full),
                Effect::PartialRedraw => self.mark(Redraw::Partial),
                Effect::Overlay => self.mark(Redraw::Transient),
                Effect::SetScaleFactor {
                    spectrum_type,
                    factor,
                } => {
                    if let Some(slot) = self.slots.iter_mut().find(|s| s.spectrum_type() == spectrum_type) {
                        slot.spectrum.y_scale_factor = factor;
                        slot.rebin.invalidate();
                    }
                }
                Effect::LeftClick { energy } => {
                    if self.options.markers.sum_peak {
                        self.sum_anchor = Some(energy);
                        self.mark(Redraw::Transient);
                    }
                }
                Effect::Animate { from, to, start_ms } => self.start_animation(from, to, start_ms),
            }
        }
        self.events.extend(output.events);
    }

    fn start_animation(&mut self, from: (f64, f64), to: (f64, f64), start_ms: f64) {
        self.stop_animation();
        self.next_frame += 1;
        log::debug!("animating x domain {from:?} -> {to:?}");
        self.animation = Some(ZoomAnimation::new(
            from,
            to,
            start_ms,
            self.options.animation_duration_ms,
            FrameHandle(self.next_frame),
        ));
    }

    fn stop_animation(&mut self) {
        if let Some(mut animation) = self.animation.take() {
            animation.cancel();
        }
    }

    /// A new gesture keeps the domain reached so far and reports it.
    #[allow(clippy::float_cmp)]
    fn interrupt_animation(&mut self) {
        if let Some(mut animation) = self.animation.take() {
            animation.cancel();
            if self.scales.x_domain() != animation.start_domain() {
                let event = self.x_range_event();
                self.events.push(event);
            }
        }
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

    // ---- events ----

    /// Removes and returns every queued host event.
    pub fn take_events(&mut self) -> Vec<HostEvent> {
        mem::take(&mut self.events)
    }

    /// Sends every queued host event to `sink`.
    pub fn flush_to<S: HostSink + ?Sized>(&mut self, sink: &mut S) {
        for event in self.events.drain(..) {
            sink.emit(event);
        }
    }

    #[must_use]
    pub fn pending_events(&self) -> &[HostEvent] {
        &self.events
    }

    // ---- accessors ----

    #[must_use]
    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    #[must_use]
    pub fn x_domain(&self) -> (f64, f64) {
        self.scales.x_domain()
    }

    #[must_use]
    pub fn y_domain(&self) -> (f64, f64) {
        self.scales.y_domain()
    }

    #[must_use]
    pub fn y_scale_mode(&self) -> YScaleMode {
        self.scales.y().mode()
    }

    #[must_use]
    pub fn y_override(&self) -> Option<(f64, f64)> {
        self.scales.y_override()
    }

    #[must_use]
    pub fn spectrum(&self, spectrum_type: SpectrumType) -> Option<&Spectrum> {
        self.slot(spectrum_type).map(|s| &s.spectrum)
    }

    /// Rebin cache of a spectrum, as of the last render.
    #[must_use]
    pub fn rebin_state(&self, spectrum_type: SpectrumType) -> Option<&RebinState> {
        self.slot(spectrum_type).map(|s| &s.rebin)
    }

    /// Points a spectrum is drawn from, as of the last render.
    #[must_use]
    pub fn display_points(&self, spectrum_type: SpectrumType) -> Option<&[DisplayPoint]> {
        self.slot(spectrum_type).map(Slot::display_points)
    }

    #[must_use]
    pub fn reference_lines(&self) -> &[ReferenceLineSet] {
        &self.reference_lines
    }

    #[must_use]
    pub fn active_mode(&self) -> Option<Mode> {
        self.gestures.active_mode()
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.animation.as_ref().is_some_and(ZoomAnimation::is_active)
    }

    #[must_use]
    pub fn sum_anchor(&self) -> Option<f64> {
        self.sum_anchor
    }

    /// Energy extent of all loaded spectra.
    #[must_use]
    pub fn data_bounds(&self) -> Option<(f64, f64)> {
        self.slots
            .iter()
            .map(|s| (s.spectrum.lower_energy(), s.spectrum.upper_energy()))
            .reduce(|a, b| (a.0.min(b.0), a.1.max(b.1)))
            .filter(|(lo, hi)| hi > lo)
    }

    fn slot(&self, spectrum_type: SpectrumType) -> Option<&Slot> {
        self.slots.iter().find(|s| s.spectrum_type() == spectrum_type)
    }

    /// Mean channel width of the foreground (or first) spectrum.
    #[allow(clippy::cast_precision_loss)]
    fn channel_width(&self) -> f64 {
        self.slot(SpectrumType::Foreground)
            .or_else(|| self.slots.first())
            .map_or(1.0, |s| {
                let n = s.spectrum.num_channels().max(1) as f64;
                (s.spectrum.upper_energy() - s.spectrum.lower_energy()) / n
            })
    }

    /// Slot index of the background linked to slot `index`.
    fn background_index(&self, index: usize) -> Option<usize> {
        let spectrum = &self.slots[index].spectrum;
        match &spectrum.background_id {
            Some(id) => self
                .slots
                .iter()
                .position(|s| s.spectrum.id.as_deref() == Some(id.as_str())),
            None => self
                .slots
                .iter()
                .position(|s| s.spectrum_type() == SpectrumType::Background),
        }
        .filter(|&b| b != index)
    }

    /// The foreground is drawn background-subtracted and the background
    /// itself is hidden.
    fn subtracting(&self) -> bool {
        self.options.background_subtract && self.slots.iter().any(|s| s.subtracted.is_some())
    }

    // ---- render pipeline ----

    /// Brings the frame up to date and returns it.
    pub fn render(&mut self) -> &Frame {
        self.refresh();
        &self.frame
    }

    fn refresh(&mut self) {
        match mem::take(&mut self.redraw) {
            Redraw::Full => self.full_redraw(),
            Redraw::Partial => self.partial_redraw(),
            Redraw::Transient => self.update_transient(),
            Redraw::None => {}
        }
    }

    fn full_redraw(&mut self) {
        self.rebin_all();
        self.update_y_domain();
        self.update_axes();
        self.update_overview();
        self.update_geometry();
        log::debug!(
            "full redraw: x {:?}, y {:?}, {} line(s), {} ROI(s)",
            self.frame.x_domain,
            self.frame.y_domain,
            self.frame.lines.len(),
            self.frame.rois.len()
        );
    }

    fn partial_redraw(&mut self) {
        self.rebin_all();
        self.update_geometry();
    }

    fn update_geometry(&mut self) {
        self.update_rois();
        self.update_reference_lines();
        self.update_markers();
        self.update_lines();
        self.update_decorations();
        self.update_transient();
    }

    fn rebin_all(&mut self) {
        let domain = self.scales.x_domain();
        let width = self.layout.plot.width;
        let line_width = self.options.line_width_px;
        for slot in &mut self.slots {
            rebin(&slot.spectrum, domain, width, line_width, &mut slot.rebin);
        }
        for index in 0..self.slots.len() {
            let background = (self.options.background_subtract
                && self.slots[index].spectrum_type() == SpectrumType::Foreground)
                .then(|| self.background_index(index))
                .flatten();
            let subtracted = background
                .map(|b| background_subtract(self.slots[index].rebin.points(), self.slots[b].rebin.points()));
            self.slots[index].subtracted = subtracted;
        }
    }

    fn update_y_domain(&mut self) {
        let hide_background = self.subtracting();
        let x_max = self.scales.x_domain().1;
        let raw = visible_y_range(
            self.slots
                .iter()
                .filter(|s| !(hide_background && s.spectrum_type() == SpectrumType::Background))
                .map(Slot::display_points),
            x_max,
        );
        let padding = self.options.y_padding(self.scales.y().mode());
        self.scales.recompute_y_domain(raw, padding);
    }

    fn update_axes(&mut self) {
        let spacing = if self.options.compact_x_axis {
            self.options.x_label_spacing_px * COMPACT_X_SPACING
        } else {
            self.options.x_label_spacing_px
        };
        let frame = &mut self.frame;
        frame.layout = self.layout;
        frame.x_domain = self.scales.x_domain();
        frame.y_domain = self.scales.y_domain();
        frame.y_mode = self.scales.y().mode();
        frame.x_ticks = x_ticks(self.scales.x(), spacing);
        frame.y_ticks = y_ticks(self.scales.y(), self.options.y_label_spacing_px);
        let major = |ticks: &[Tick]| ticks.iter().filter(|t| t.is_major()).map(|t| t.px).collect();
        frame.grid_x = if self.options.grid_x { major(&frame.x_ticks) } else { Vec::new() };
        frame.grid_y = if self.options.grid_y { major(&frame.y_ticks) } else { Vec::new() };
    }

    fn update_overview(&mut self) {
        let hide_background = self.subtracting();
        self.frame.overview = match (self.layout.overview, self.data_bounds()) {
            (Some(rect), Some(bounds)) => {
                let spectra: Vec<&Spectrum> = self
                    .slots
                    .iter()
                    .filter(|s| !(hide_background && s.spectrum_type() == SpectrumType::Background))
                    .map(|s| &s.spectrum)
                    .collect();
                Some(self.overview.update(
                    &spectra,
                    bounds,
                    rect,
                    self.options.line_width_px,
                    self.scales.x_domain(),
                ))
            }
            _ => None,
        };
    }

    fn update_rois(&mut self) {
        let x = *self.scales.x();
        let y = *self.scales.y();
        let (lo, hi) = x.domain();
        let plot = self.layout.plot;
        let mut rois = Vec::new();
        let mut handles = Vec::new();
        let mut requests = Vec::new();

        for (index, slot) in self.slots.iter().enumerate() {
            let background = if slot.subtracted.is_some() {
                self.background_index(index).map(|b| self.slots[b].rebin.points())
            } else {
                None
            };
            let points = slot.display_points();
            let spectrum = &slot.spectrum;
            for (roi_index, roi) in spectrum.rois.iter().enumerate() {
                if roi.upper_energy < lo || roi.lower_energy > hi {
                    continue;
                }
                let paths = compute_roi_paths(
                    roi,
                    points,
                    slot.rebin.upper_edge(),
                    spectrum.y_scale_factor,
                    background,
                    &x,
                    &y,
                );
                handles.push(RoiHandle {
                    spectrum_type: spectrum.spectrum_type,
                    roi_index,
                    lower_energy: roi.lower_energy,
                    upper_energy: roi.upper_energy,
                    lower_px: paths.lower_px,
                    upper_px: paths.upper_px,
                    vertical_px_range: (paths.vertical_px_range.0.min(plot.height), plot.height),
                });
                for anchor in &paths.label_anchors {
                    let lines = label_lines(&self.options, &roi.peaks[anchor.peak_index]);
                    if !lines.is_empty() {
                        requests.push(LabelRequest {
                            anchor: *anchor,
                            lines,
                            zone: (0.0, plot.width),
                        });
                    }
                }
                rois.push(RoiOverlay {
                    spectrum_type: spectrum.spectrum_type,
                    roi_index,
                    lower_energy: roi.lower_energy,
                    upper_energy: roi.upper_energy,
                    peak_colors: paths
                        .peak_order
                        .iter()
                        .map(|&p| roi.peaks[p].line_color.or(spectrum.peak_color))
                        .collect(),
                    paths,
                });
            }
        }

        // Each label may only shift within the space halfway to its neighbours.
        requests.sort_by(|a, b| a.anchor.x_px.total_cmp(&b.anchor.x_px));
        let centres: Vec<f64> = requests.iter().map(|r| r.anchor.x_px).collect();
        for (i, request) in requests.iter_mut().enumerate() {
            let left = if i == 0 { 0.0 } else { (centres[i - 1] + centres[i]) / 2.0 };
            let right = centres.get(i + 1).map_or(plot.width, |next| (centres[i] + next) / 2.0);
            request.zone = (left, right);
        }
        let metrics = LabelMetrics {
            char_width: self.options.label_char_width_px,
            line_height: self.options.label_line_height_px,
            min_top: 0.0,
        };
        self.frame.labels = place_labels(&requests, Rect::new(0.0, 0.0, plot.width, plot.height), metrics);
        self.frame.rois = rois;
        self.roi_handles = handles;
    }

    fn update_reference_lines(&mut self) {
        self.frame.reference_lines = if self.options.show_reference_lines {
            reference_line_geometry(&self.reference_lines, self.scales.x(), self.layout.plot.height)
        } else {
            Vec::new()
        };
    }

    fn update_markers(&mut self) {
        let energy = self
            .hover
            .map(|(x, _)| self.scales.x().invert(x - self.layout.plot.x));
        self.frame.markers = match energy {
            Some(energy) if self.options.markers.any() => {
                feature_markers(energy, self.sum_anchor, &self.options.markers, self.scales.x())
            }
            _ => Vec::new(),
        };
    }

    fn update_lines(&mut self) {
        let hide_background = self.subtracting();
        let (x, y) = (self.scales.x(), self.scales.y());
        self.frame.lines = self
            .slots
            .iter()
            .filter(|s| !(hide_background && s.spectrum_type() == SpectrumType::Background))
            .map(|slot| SpectrumLine {
                spectrum_type: slot.spectrum_type(),
                title: slot.spectrum.title.clone(),
                color: slot.spectrum.line_color,
                bin_factor: slot.rebin.bin_factor(),
                point_count: slot.display_points().len(),
                background_subtracted: slot.subtracted.is_some(),
                path: step_path(slot.display_points(), slot.rebin.upper_edge(), x, y),
            })
            .collect();
    }

    /// Search windows, highlight regions, scaler sliders and the legend.
    fn update_decorations(&mut self) {
        let x = self.scales.x();
        self.frame.search_windows = search_window_bands(&self.search_windows, x);
        self.frame.highlights = highlight_bands(&self.highlights, x);

        self.frame.scalers = if self.options.show_scaler {
            let entries: Vec<(SpectrumType, f64, f64)> = self
                .slots
                .iter()
                .filter(|s| s.spectrum_type() != SpectrumType::Foreground)
                .map(|s| (s.spectrum_type(), s.spectrum.y_scale_factor, self.options.scaler_max))
                .collect();
            layout_sliders(&entries, self.layout.plot.width, self.layout.plot.height)
        } else {
            Vec::new()
        };

        self.frame.legend = self.legend_visible.then(|| {
            self.slots
                .iter()
                .map(|slot| {
                    let s = &slot.spectrum;
                    let mut details = Vec::new();
                    if let Some(live) = s.live_time {
                        details.push(format!("Live Time {live:.1} s"));
                    }
                    if let Some(real) = s.real_time {
                        details.push(format!("Real Time {real:.1} s"));
                    }
                    if let Some(neutrons) = s.neutrons {
                        details.push(format!("{neutrons:.0} neutrons"));
                    }
                    if (s.y_scale_factor - 1.0).abs() > f64::EPSILON {
                        details.push(format!("Scaled by {:.3}", s.y_scale_factor));
                    }
                    LegendEntry {
                        spectrum_type: s.spectrum_type,
                        title: if s.title.is_empty() {
                            s.spectrum_type.as_str().to_string()
                        } else {
                            s.title.clone()
                        },
                        color: s.line_color,
                        details,
                    }
                })
                .collect()
        });
    }

    /// Hover readout, feature markers and the gesture overlay.
    fn update_transient(&mut self) {
        self.update_markers();
        let local = self
            .hover
            .filter(|_| self.gestures.is_idle())
            .map(|(x, y)| self.layout.to_plot(x, y));
        self.frame.hovered_reference = local.and_then(|(x, _)| hovered_reference_line(&self.frame.reference_lines, x));
        self.frame.roi_edge_hover =
            local.is_some_and(|(x, y)| roi_edge_at(&self.roi_handles, x, y, self.options.roi_edge_grab_px).is_some());
        self.frame.hover = local.map(|(x, y)| self.hover_info(x, y));
        self.frame.overlay = self.gestures.overlay(&self.layout, &self.scales);
        self.frame.mode = self.gestures.active_mode();
    }

    fn hover_info(&self, x: f64, y: f64) -> HoverInfo {
        let energy = self.scales.x().invert(x);
        let counts: Vec<(SpectrumType, f64)> = self
            .slots
            .iter()
            .map(|s| (s.spectrum_type(), s.spectrum.counts_at(energy) * s.spectrum.y_scale_factor))
            .collect();
        let text = if self.options.show_mouse_stats {
            std::iter::once(format!("{energy:.2} keV"))
                .chain(counts.iter().map(|(t, c)| format!("{t}: {c:.1} counts")))
                .collect()
        } else {
            Vec::new()
        };
        HoverInfo {
            x_px: x,
            y_px: y,
            energy,
            counts,
            text,
        }
    }
}

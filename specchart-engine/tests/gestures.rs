#![allow(clippy::float_cmp)]
use approx::assert_relative_eq;
use specchart_core::{
    ChartOptions, ContinuumType, HostEvent, InputEvent, Key, Modifiers, Padding, Platform,
    PointerButton, PointerEvent, Roi, Spectrum, SpectrumType, TouchEvent, TouchPoint, WheelEvent,
};
use specchart_engine::{Mode, SpectrumChart};

/// A 1000 x 400 plot showing 1000 one-keV channels, one keV per pixel.
fn chart_with(options: ChartOptions, counts: Vec<f64>) -> SpectrumChart {
    let options = options.with_padding(Padding {
        left: 0.0,
        right: 0.0,
        top: 0.0,
        bottom: 0.0,
    });
    let mut chart = SpectrumChart::new(1000.0, 400.0, options);
    chart.set_spectrum_data(
        Some(Spectrum::from_counts(counts)),
        true,
        SpectrumType::Foreground,
        None,
        None,
    );
    chart.render();
    chart
}

fn flat_chart() -> SpectrumChart {
    chart_with(ChartOptions::default(), vec![10.0; 1000])
}

#[allow(clippy::cast_precision_loss)]
fn sawtooth() -> Vec<f64> {
    (0..1000).map(|i| (i % 20) as f64).collect()
}

fn down(x: f64, y: f64, t: f64) -> InputEvent {
    InputEvent::PointerDown(PointerEvent::at(x, y, t))
}

fn moved(x: f64, y: f64, t: f64) -> InputEvent {
    InputEvent::PointerMove(PointerEvent::at(x, y, t))
}

fn up(x: f64, y: f64, t: f64) -> InputEvent {
    InputEvent::PointerUp(PointerEvent::at(x, y, t))
}

fn near(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn with_mods(event: PointerEvent, modifiers: Modifiers) -> PointerEvent {
    event.with_modifiers(modifiers)
}

#[test]
fn test_ctrl_drag_streams_fit_previews_then_final() {
    let mut chart = flat_chart();
    let ctrl = Modifiers::CTRL;
    chart.handle_input(&InputEvent::PointerDown(with_mods(PointerEvent::at(300.0, 300.0, 0.0), ctrl)));
    chart.handle_input(&InputEvent::PointerMove(with_mods(PointerEvent::at(400.0, 240.0, 10.0), ctrl)));
    assert_eq!(chart.active_mode(), Some(Mode::PeakFit));
    chart.handle_input(&InputEvent::PointerUp(with_mods(PointerEvent::at(400.0, 240.0, 20.0), ctrl)));

    let events = chart.take_events();
    assert_eq!(events.len(), 2, "{events:?}");
    match (&events[0], &events[1]) {
        (
            HostEvent::FitRoiDrag {
                lower,
                upper,
                num_peaks_hint,
                is_final: false,
                ..
            },
            HostEvent::FitRoiDrag { is_final: true, .. },
        ) => {
            assert_relative_eq!(*lower, 300.0, epsilon = 1e-9);
            assert_relative_eq!(*upper, 400.0, epsilon = 1e-9);
            assert_eq!(*num_peaks_hint, 3);
        }
        other => panic!("unexpected events {other:?}"),
    }
    assert_eq!(chart.active_mode(), None);
}

#[test]
fn test_ctrl_drag_without_live_fit_sends_single_request() {
    let mut options = ChartOptions::default();
    options.fit_roi_on_ctrl_drag = false;
    let mut chart = chart_with(options, vec![10.0; 1000]);
    let ctrl = Modifiers::CTRL;
    chart.handle_input(&InputEvent::PointerDown(with_mods(PointerEvent::at(300.0, 300.0, 0.0), ctrl)));
    chart.handle_input(&InputEvent::PointerMove(with_mods(PointerEvent::at(350.0, 300.0, 10.0), ctrl)));
    chart.handle_input(&InputEvent::PointerUp(with_mods(PointerEvent::at(350.0, 300.0, 20.0), ctrl)));
    let events = chart.take_events();
    assert!(
        matches!(events.as_slice(), [HostEvent::ControlKeyDragged { low_energy, high_energy, .. }]
            if near(*low_energy, 300.0) && near(*high_energy, 350.0)),
        "{events:?}"
    );
}

#[test]
fn test_shift_drag_reports_ordered_range() {
    let mut chart = flat_chart();
    let shift = Modifiers::SHIFT;
    chart.handle_input(&InputEvent::PointerDown(with_mods(PointerEvent::at(400.0, 200.0, 0.0), shift)));
    chart.handle_input(&InputEvent::PointerMove(with_mods(PointerEvent::at(300.0, 200.0, 10.0), shift)));
    assert_eq!(chart.active_mode(), Some(Mode::DeletePeaks));
    chart.handle_input(&InputEvent::PointerUp(with_mods(PointerEvent::at(300.0, 200.0, 20.0), shift)));
    let events = chart.take_events();
    assert!(
        matches!(events.as_slice(), [HostEvent::ShiftKeyDragged { low_energy, high_energy }]
            if near(*low_energy, 300.0) && near(*high_energy, 400.0)),
        "{events:?}"
    );
}

#[test]
fn test_alt_shift_drag_counts_gammas() {
    let mut chart = flat_chart();
    let mods = Modifiers::ALT.with(Modifiers::SHIFT);
    chart.handle_input(&InputEvent::PointerDown(with_mods(PointerEvent::at(100.0, 200.0, 0.0), mods)));
    chart.handle_input(&InputEvent::PointerMove(with_mods(PointerEvent::at(180.0, 200.0, 10.0), mods)));
    assert_eq!(chart.active_mode(), Some(Mode::CountGammas));
    chart.handle_input(&InputEvent::PointerUp(with_mods(PointerEvent::at(180.0, 200.0, 20.0), mods)));
    let events = chart.take_events();
    assert!(
        matches!(events.as_slice(), [HostEvent::ShiftAltKeyDragged { low_energy, high_energy }]
            if near(*low_energy, 100.0) && near(*high_energy, 180.0)),
        "{events:?}"
    );
}

#[test]
fn test_alt_ctrl_drag_requests_recalibration() {
    let mut chart = flat_chart();
    let mods = Modifiers::ALT.with(Modifiers::CTRL);
    chart.handle_input(&InputEvent::PointerDown(with_mods(PointerEvent::at(660.0, 200.0, 0.0), mods)));
    chart.handle_input(&InputEvent::PointerMove(with_mods(PointerEvent::at(670.0, 200.0, 10.0), mods)));
    assert_eq!(chart.active_mode(), Some(Mode::Recalibrate));
    chart.handle_input(&InputEvent::PointerUp(with_mods(PointerEvent::at(670.0, 200.0, 20.0), mods)));
    let events = chart.take_events();
    assert!(
        matches!(events.as_slice(), [HostEvent::RightMouseDragged { start_energy, end_energy }]
            if near(*start_energy, 660.0) && near(*end_energy, 670.0)),
        "{events:?}"
    );
}

#[test]
fn test_switching_modifiers_closes_fit_preview() {
    let mut chart = flat_chart();
    chart.handle_input(&InputEvent::PointerDown(with_mods(
        PointerEvent::at(300.0, 300.0, 0.0),
        Modifiers::CTRL,
    )));
    chart.handle_input(&InputEvent::PointerMove(with_mods(
        PointerEvent::at(350.0, 300.0, 10.0),
        Modifiers::CTRL,
    )));
    chart.handle_input(&InputEvent::PointerMove(with_mods(
        PointerEvent::at(380.0, 300.0, 20.0),
        Modifiers::SHIFT,
    )));
    assert_eq!(chart.active_mode(), Some(Mode::DeletePeaks));
    chart.handle_input(&InputEvent::PointerUp(with_mods(
        PointerEvent::at(380.0, 300.0, 30.0),
        Modifiers::SHIFT,
    )));

    let events = chart.take_events();
    assert_eq!(events.len(), 3, "{events:?}");
    assert!(matches!(events[0], HostEvent::FitRoiDrag { is_final: false, .. }));
    assert!(matches!(
        events[1],
        HostEvent::FitRoiDrag {
            is_final: true,
            num_peaks_hint: 0,
            ..
        }
    ));
    assert!(matches!(events[2], HostEvent::ShiftKeyDragged { .. }));
}

#[test]
fn test_meta_drag_sets_and_resets_y_zoom() {
    let mut chart = chart_with(ChartOptions::default().with_platform(Platform::Other), sawtooth());
    let meta = Modifiers::META;
    chart.handle_input(&InputEvent::PointerDown(with_mods(PointerEvent::at(500.0, 100.0, 0.0), meta)));
    chart.handle_input(&InputEvent::PointerMove(with_mods(PointerEvent::at(500.0, 300.0, 10.0), meta)));
    assert_eq!(chart.active_mode(), Some(Mode::ZoomY));
    chart.handle_input(&InputEvent::PointerUp(with_mods(PointerEvent::at(500.0, 300.0, 20.0), meta)));
    let (lo, hi) = chart.y_override().expect("y override installed");
    assert!(lo < hi);
    assert_eq!(chart.render().y_domain, (lo, hi));

    chart.handle_input(&InputEvent::PointerDown(with_mods(PointerEvent::at(500.0, 300.0, 100.0), meta)));
    chart.handle_input(&InputEvent::PointerMove(with_mods(PointerEvent::at(500.0, 100.0, 110.0), meta)));
    chart.handle_input(&InputEvent::PointerUp(with_mods(PointerEvent::at(500.0, 100.0, 120.0), meta)));
    assert!(chart.y_override().is_none());
    assert!(chart.take_events().is_empty());
}

#[test]
fn test_pan_then_escape_restores_domain_silently() {
    let mut chart = flat_chart();
    chart.set_x_axis_range(200.0, 800.0, false);
    let right = |x: f64, t: f64| PointerEvent::at(x, 200.0, t).with_button(PointerButton::Secondary);
    chart.handle_input(&InputEvent::PointerDown(right(500.0, 0.0)));
    chart.handle_input(&InputEvent::PointerMove(right(600.0, 10.0)));
    assert_eq!(chart.active_mode(), Some(Mode::Pan));
    let (lo, hi) = chart.x_domain();
    assert_relative_eq!(lo, 140.0, epsilon = 1e-9);
    assert_relative_eq!(hi, 740.0, epsilon = 1e-9);

    // A left press during the pan is ignored.
    chart.handle_input(&down(300.0, 200.0, 15.0));
    assert_eq!(chart.active_mode(), Some(Mode::Pan));

    chart.handle_input(&InputEvent::KeyDown {
        key: Key::Escape,
        time_ms: 20.0,
    });
    assert_eq!(chart.active_mode(), None);
    let (lo, hi) = chart.x_domain();
    assert!(near(lo, 200.0) && near(hi, 800.0));
    assert!(chart.take_events().is_empty());
}

#[test]
fn test_pan_release_reports_range_once() {
    let mut chart = flat_chart();
    chart.set_x_axis_range(200.0, 800.0, false);
    let right = |x: f64, t: f64| PointerEvent::at(x, 200.0, t).with_button(PointerButton::Secondary);
    chart.handle_input(&InputEvent::PointerDown(right(500.0, 0.0)));
    chart.handle_input(&InputEvent::PointerMove(right(450.0, 10.0)));
    chart.handle_input(&InputEvent::PointerMove(right(400.0, 20.0)));
    chart.handle_input(&InputEvent::PointerUp(right(400.0, 30.0)));
    let events = chart.take_events();
    assert_eq!(events.len(), 1, "{events:?}");
    assert!(matches!(events[0], HostEvent::XRangeChanged { min, max, .. } if near(min, 260.0) && near(max, 860.0)));
}

#[test]
fn test_right_click_without_movement() {
    let mut chart = flat_chart();
    let right = PointerEvent::at(250.0, 200.0, 0.0).with_button(PointerButton::Secondary);
    chart.handle_input(&InputEvent::PointerDown(right));
    chart.handle_input(&InputEvent::PointerUp(right));
    let events = chart.take_events();
    assert!(
        matches!(events.as_slice(), [HostEvent::RightClicked { energy, count, .. }]
            if near(*energy, 250.0) && near(*count, 10.0)),
        "{events:?}"
    );
}

#[test]
fn test_roi_edge_drag_is_throttled_with_final_event() {
    let mut chart = chart_with(ChartOptions::default(), sawtooth());
    chart.set_roi_data(
        vec![Roi::polynomial(ContinuumType::Linear, 100.0, 200.0, vec![5.0, 0.0])],
        SpectrumType::Foreground,
    );
    chart.render();

    chart.handle_input(&down(101.0, 395.0, 0.0));
    chart.handle_input(&moved(120.0, 395.0, 10.0));
    assert_eq!(chart.active_mode(), Some(Mode::RoiDrag));
    chart.handle_input(&moved(130.0, 395.0, 100.0));
    chart.handle_input(&moved(140.0, 395.0, 200.0));
    chart.handle_input(&InputEvent::Tick { time_ms: 600.0 });
    chart.handle_input(&up(150.0, 395.0, 700.0));

    let drags: Vec<(f64, f64, bool)> = chart
        .take_events()
        .into_iter()
        .filter_map(|e| match e {
            HostEvent::RoiDrag {
                new_lower,
                new_upper,
                original_lower,
                is_final,
                ..
            } => {
                assert!(near(original_lower, 100.0));
                Some((new_lower, new_upper, is_final))
            }
            _ => None,
        })
        .collect();
    let expected = [(120.0, false), (140.0, false), (150.0, true)];
    assert_eq!(drags.len(), expected.len(), "{drags:?}");
    for (&(lower, upper, is_final), &(want, want_final)) in drags.iter().zip(&expected) {
        assert_relative_eq!(lower, want, epsilon = 1e-9);
        assert_relative_eq!(upper, 200.0, epsilon = 1e-9);
        assert_eq!(is_final, want_final);
    }
    // The ROI itself only changes when the host sends new data.
    let roi = &chart.spectrum(SpectrumType::Foreground).expect("spectrum").rois[0];
    assert_eq!(roi.lower_energy, 100.0);
}

#[test]
fn test_click_then_double_click() {
    let mut chart = flat_chart();
    chart.handle_input(&down(500.0, 200.0, 0.0));
    chart.handle_input(&up(500.0, 200.0, 10.0));
    chart.handle_input(&down(501.0, 200.0, 100.0));
    chart.handle_input(&up(501.0, 200.0, 110.0));
    let events = chart.take_events();
    assert_eq!(events.len(), 3, "{events:?}");
    assert!(matches!(events[0], HostEvent::LeftClicked { energy, count, .. } if near(energy, 500.0) && near(count, 10.0)));
    assert!(matches!(events[1], HostEvent::LeftClicked { energy, .. } if near(energy, 501.0)));
    assert!(matches!(events[2], HostEvent::DoubleClicked { energy, .. } if near(energy, 501.0)));
}

#[test]
fn test_slow_clicks_are_not_double() {
    let mut chart = flat_chart();
    chart.handle_input(&down(500.0, 200.0, 0.0));
    chart.handle_input(&up(500.0, 200.0, 10.0));
    chart.handle_input(&down(500.0, 200.0, 900.0));
    chart.handle_input(&up(500.0, 200.0, 910.0));
    let events = chart.take_events();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| matches!(e, HostEvent::LeftClicked { .. })));
}

#[test]
fn test_wheel_commits_after_quiet_period() {
    let mut chart = flat_chart();
    let wheel = |delta_y: f64, time_ms: f64| {
        InputEvent::Wheel(WheelEvent {
            x: 500.0,
            y: 200.0,
            delta_y,
            time_ms,
            ..WheelEvent::default()
        })
    };
    chart.handle_input(&wheel(-300.0, 0.0));
    chart.handle_input(&wheel(-300.0, 50.0));
    assert_eq!(chart.active_mode(), Some(Mode::Wheel));
    let (lo, hi) = chart.x_domain();
    assert!(hi - lo < 1000.0);
    assert!(lo < 500.0 && hi > 500.0);

    chart.handle_input(&InputEvent::Tick { time_ms: 100.0 });
    assert!(chart.take_events().is_empty());
    chart.handle_input(&InputEvent::Tick { time_ms: 400.0 });
    let events = chart.take_events();
    assert!(
        matches!(events.as_slice(), [HostEvent::XRangeChanged { min, max, .. }] if *min == lo && *max == hi),
        "{events:?}"
    );
    assert_eq!(chart.active_mode(), None);
}

#[test]
fn test_tap_clicks_and_long_press_right_clicks() {
    let mut chart = flat_chart();
    let finger = |t: f64| TouchEvent::new(vec![TouchPoint::new(7, 400.0, 200.0)], t);
    chart.handle_input(&InputEvent::TouchStart(finger(0.0)));
    chart.handle_input(&InputEvent::TouchEnd(finger(80.0)));
    assert!(matches!(
        chart.take_events().as_slice(),
        [HostEvent::LeftClicked { energy, .. }] if near(*energy, 400.0)
    ));

    chart.handle_input(&InputEvent::TouchStart(finger(2000.0)));
    chart.handle_input(&InputEvent::Tick { time_ms: 2700.0 });
    chart.handle_input(&InputEvent::TouchEnd(finger(2800.0)));
    assert!(matches!(
        chart.take_events().as_slice(),
        [HostEvent::RightClicked { energy, .. }] if near(*energy, 400.0)
    ));
}

#[test]
fn test_scaler_drag_rescales_background() {
    let mut chart = chart_with(ChartOptions::default().with_scaler(true), vec![10.0; 1000]);
    chart.set_spectrum_data(
        Some(Spectrum::from_counts(vec![2.0; 1000])),
        false,
        SpectrumType::Background,
        None,
        None,
    );
    let slider = chart.render().scalers[0];
    assert_eq!(slider.spectrum_type, SpectrumType::Background);

    chart.handle_input(&down(slider.x_px, slider.handle_y, 0.0));
    assert_eq!(chart.active_mode(), Some(Mode::ScalerDrag));
    chart.handle_input(&moved(slider.x_px, slider.handle_y - 38.0, 10.0));
    chart.handle_input(&up(slider.x_px, slider.handle_y - 38.0, 20.0));

    let factor = chart
        .spectrum(SpectrumType::Background)
        .expect("background")
        .y_scale_factor;
    assert_relative_eq!(factor, 2.0, epsilon = 1e-9);
    let events = chart.take_events();
    assert_eq!(events.len(), 2, "{events:?}");
    assert!(events
        .iter()
        .all(|e| matches!(e, HostEvent::YScaled { spectrum_type: SpectrumType::Background, .. })));

    chart.render();
    let points = chart
        .display_points(SpectrumType::Background)
        .expect("background points");
    assert!(points.iter().all(|p| (p.y - 4.0).abs() < 1e-6));
}

fn escape(time_ms: f64) -> InputEvent {
    InputEvent::KeyDown {
        key: Key::Escape,
        time_ms,
    }
}

fn assert_idle(chart: &mut SpectrumChart) {
    assert_eq!(chart.active_mode(), None);
    assert!(chart.render().overlay.is_none());
}

#[test]
fn test_escape_restores_y_axis_drag() {
    let options = ChartOptions::default().with_padding(Padding {
        left: 60.0,
        right: 0.0,
        top: 0.0,
        bottom: 0.0,
    });
    let mut chart = SpectrumChart::new(1000.0, 400.0, options);
    chart.set_spectrum_data(
        Some(Spectrum::from_counts(sawtooth())),
        true,
        SpectrumType::Foreground,
        None,
        None,
    );
    let before = chart.render().y_domain;

    chart.handle_input(&down(30.0, 200.0, 0.0));
    assert_eq!(chart.active_mode(), Some(Mode::YAxisDrag));
    chart.handle_input(&moved(30.0, 300.0, 10.0));
    assert_ne!(chart.render().y_domain, before);

    chart.handle_input(&escape(20.0));
    assert_idle(&mut chart);
    assert!(chart.y_override().is_none());
    let (lo, hi) = chart.render().y_domain;
    assert!(near(lo, before.0) && near(hi, before.1));
    assert!(chart.take_events().is_empty());
}

#[test]
fn test_escape_restores_scale_factor() {
    let mut chart = chart_with(ChartOptions::default().with_scaler(true), vec![10.0; 1000]);
    chart.set_spectrum_data(
        Some(Spectrum::from_counts(vec![2.0; 1000])),
        false,
        SpectrumType::Background,
        None,
        None,
    );
    let slider = chart.render().scalers[0];
    chart.handle_input(&down(slider.x_px, slider.handle_y, 0.0));
    chart.handle_input(&moved(slider.x_px, slider.handle_y - 38.0, 10.0));
    let factor = |chart: &SpectrumChart| {
        chart
            .spectrum(SpectrumType::Background)
            .expect("background")
            .y_scale_factor
    };
    assert_relative_eq!(factor(&chart), 2.0, epsilon = 1e-9);

    chart.handle_input(&escape(20.0));
    assert_idle(&mut chart);
    assert_relative_eq!(factor(&chart), 1.0, epsilon = 1e-12);
    let events = chart.take_events();
    assert!(
        matches!(events.last(), Some(HostEvent::YScaled { factor, spectrum_type: SpectrumType::Background })
            if near(*factor, 1.0)),
        "{events:?}"
    );
}

#[test]
fn test_escape_discards_wheel_session() {
    let mut chart = flat_chart();
    let wheel = InputEvent::Wheel(WheelEvent {
        x: 500.0,
        y: 200.0,
        delta_y: -300.0,
        time_ms: 0.0,
        ..WheelEvent::default()
    });
    chart.handle_input(&wheel);
    assert_eq!(chart.active_mode(), Some(Mode::Wheel));
    assert_ne!(chart.x_domain(), (0.0, 1000.0));

    chart.handle_input(&escape(50.0));
    assert_idle(&mut chart);
    assert_eq!(chart.x_domain(), (0.0, 1000.0));
    chart.handle_input(&InputEvent::Tick { time_ms: 500.0 });
    assert!(chart.take_events().is_empty());
}

#[test]
fn test_escape_stops_zoom_animation_at_its_start() {
    let mut chart = chart_with(
        ChartOptions::default().with_animation_duration(200.0),
        vec![10.0; 1000],
    );
    chart.handle_input(&down(100.0, 200.0, 0.0));
    chart.handle_input(&moved(300.0, 200.0, 10.0));
    chart.handle_input(&up(300.0, 200.0, 20.0));
    assert!(chart.is_animating());
    chart.handle_input(&InputEvent::Tick { time_ms: 120.0 });
    let (lo, hi) = chart.x_domain();
    assert!(lo > 0.0 && hi < 1000.0);

    chart.handle_input(&escape(130.0));
    assert!(!chart.is_animating());
    assert_idle(&mut chart);
    assert_eq!(chart.x_domain(), (0.0, 1000.0));
    chart.handle_input(&InputEvent::Tick { time_ms: 400.0 });
    assert_eq!(chart.x_domain(), (0.0, 1000.0));
    assert!(chart.take_events().is_empty());
}

#[test]
fn test_escape_restores_pinch_zoom() {
    let mut chart = flat_chart();
    let fingers = |a: f64, b: f64, t: f64| {
        TouchEvent::new(
            vec![TouchPoint::new(1, a, 200.0), TouchPoint::new(2, b, 200.0)],
            t,
        )
    };
    chart.handle_input(&InputEvent::TouchStart(fingers(400.0, 600.0, 0.0)));
    chart.handle_input(&InputEvent::TouchMove(fingers(300.0, 700.0, 10.0)));
    assert_eq!(chart.active_mode(), Some(Mode::ZoomX));
    let (lo, hi) = chart.x_domain();
    assert!(hi - lo < 1000.0);

    chart.handle_input(&escape(20.0));
    assert_idle(&mut chart);
    assert_eq!(chart.x_domain(), (0.0, 1000.0));
    assert!(chart.take_events().is_empty());
}

#[test]
fn test_touch_cancels_mouse_zoom_box() {
    let mut chart = flat_chart();
    chart.handle_input(&down(100.0, 200.0, 0.0));
    chart.handle_input(&moved(300.0, 200.0, 10.0));
    assert_eq!(chart.active_mode(), Some(Mode::ZoomX));
    assert!(chart.render().overlay.is_some());

    let finger = TouchEvent::new(vec![TouchPoint::new(3, 500.0, 200.0)], 20.0);
    chart.handle_input(&InputEvent::TouchStart(finger));
    assert_eq!(chart.active_mode(), Some(Mode::Pan));
    assert!(chart.render().overlay.is_none());
    assert_eq!(chart.x_domain(), (0.0, 1000.0));
    assert!(chart.take_events().is_empty());
}

#[test]
fn test_vertical_drag_does_not_zoom() {
    let mut chart = flat_chart();
    chart.set_x_axis_range(200.0, 800.0, false);
    chart.handle_input(&down(500.0, 100.0, 0.0));
    chart.handle_input(&moved(499.0, 300.0, 10.0));
    chart.handle_input(&up(499.0, 300.0, 20.0));
    assert_idle(&mut chart);
    assert_eq!(chart.x_domain(), (200.0, 800.0));
    assert!(chart.take_events().is_empty());
}

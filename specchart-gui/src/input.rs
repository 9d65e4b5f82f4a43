//! Translation of egui input into chart input events.
//!
//! Positions are made relative to the chart's top-left corner; the page
//! position stays in window coordinates so host popups land under the
//! pointer.

use eframe::egui;
use specchart_core::{
    InputEvent, Key, Modifiers, PointerButton, PointerEvent, TouchEvent, TouchPoint, WheelEvent,
};

/// Pixels per wheel "line" step.
const LINE_PX: f64 = 40.0;

pub fn modifiers(m: egui::Modifiers) -> Modifiers {
    Modifiers {
        shift: m.shift,
        ctrl: m.ctrl,
        alt: m.alt,
        meta: m.mac_cmd,
    }
}

pub fn button(b: egui::PointerButton) -> Option<PointerButton> {
    match b {
        egui::PointerButton::Primary => Some(PointerButton::Primary),
        egui::PointerButton::Secondary => Some(PointerButton::Secondary),
        egui::PointerButton::Middle => Some(PointerButton::Middle),
        egui::PointerButton::Extra1 | egui::PointerButton::Extra2 => None,
    }
}

/// Wheel delta in DOM convention: positive `y` scrolls down (zooms out).
pub fn wheel_delta(unit: egui::MouseWheelUnit, delta: egui::Vec2, page_height: f64) -> (f64, f64) {
    let scale = match unit {
        egui::MouseWheelUnit::Point => 1.0,
        egui::MouseWheelUnit::Line => LINE_PX,
        egui::MouseWheelUnit::Page => page_height,
    };
    (
        -f64::from(delta.x) * scale,
        -f64::from(delta.y) * scale,
    )
}

/// Stateful translator for one chart widget.
#[derive(Debug, Default)]
pub struct InputTranslator {
    /// Last pointer position in window coordinates.
    pointer: Option<egui::Pos2>,
    /// A button went down inside the chart and has not been released.
    pressed: bool,
    touches: usize,
}

impl InputTranslator {
    /// Whether a press or touch sequence is in progress.
    pub fn is_active(&self) -> bool {
        self.pressed || self.touches > 0
    }

    fn pointer_event(
        origin: egui::Pos2,
        pos: egui::Pos2,
        time_ms: f64,
        mods: egui::Modifiers,
    ) -> PointerEvent {
        PointerEvent {
            x: f64::from(pos.x - origin.x),
            y: f64::from(pos.y - origin.y),
            page_x: f64::from(pos.x),
            page_y: f64::from(pos.y),
            button: PointerButton::Primary,
            modifiers: modifiers(mods),
            time_ms,
        }
    }

    /// Converts one egui event; `rect` is the chart's screen rectangle.
    ///
    /// Presses outside `rect` are ignored, but moves and releases of a press
    /// that started inside keep flowing so drags survive leaving the chart.
    pub fn translate(
        &mut self,
        event: &egui::Event,
        rect: egui::Rect,
        time_ms: f64,
        mods: egui::Modifiers,
    ) -> Option<InputEvent> {
        let origin = rect.min;
        match event {
            egui::Event::PointerMoved(pos) => {
                self.pointer = Some(*pos);
                if !self.pressed && !rect.contains(*pos) {
                    return None;
                }
                Some(InputEvent::PointerMove(Self::pointer_event(
                    origin, *pos, time_ms, mods,
                )))
            }
            egui::Event::PointerButton {
                pos,
                button: b,
                pressed,
                modifiers: m,
            } => {
                let b = button(*b)?;
                let ev = Self::pointer_event(origin, *pos, time_ms, *m).with_button(b);
                if *pressed {
                    if !rect.contains(*pos) {
                        return None;
                    }
                    self.pressed = true;
                    Some(InputEvent::PointerDown(ev))
                } else if std::mem::take(&mut self.pressed) {
                    Some(InputEvent::PointerUp(ev))
                } else {
                    None
                }
            }
            egui::Event::PointerGone => {
                self.pointer = None;
                self.pressed = false;
                Some(InputEvent::PointerCancel)
            }
            egui::Event::MouseWheel {
                unit,
                delta,
                modifiers: m,
            } => {
                let pos = self.pointer.filter(|p| rect.contains(*p))?;
                let (delta_x, delta_y) = wheel_delta(*unit, *delta, f64::from(rect.height()));
                Some(InputEvent::Wheel(WheelEvent {
                    x: f64::from(pos.x - origin.x),
                    y: f64::from(pos.y - origin.y),
                    delta_x,
                    delta_y,
                    modifiers: modifiers(*m),
                    time_ms,
                }))
            }
            egui::Event::Key {
                key, pressed: true, ..
            } => Some(InputEvent::KeyDown {
                key: if *key == egui::Key::Escape {
                    Key::Escape
                } else {
                    Key::Other
                },
                time_ms,
            }),
            egui::Event::Touch { id, phase, pos, .. } => {
                let point = TouchPoint {
                    id: id.0,
                    x: f64::from(pos.x - origin.x),
                    y: f64::from(pos.y - origin.y),
                    page_x: f64::from(pos.x),
                    page_y: f64::from(pos.y),
                };
                let ev = TouchEvent::new(vec![point], time_ms);
                match phase {
                    egui::TouchPhase::Start if rect.contains(*pos) => {
                        self.touches += 1;
                        Some(InputEvent::TouchStart(ev))
                    }
                    egui::TouchPhase::Start => None,
                    egui::TouchPhase::Move => Some(InputEvent::TouchMove(ev)),
                    egui::TouchPhase::End => {
                        self.touches = self.touches.saturating_sub(1);
                        Some(InputEvent::TouchEnd(ev))
                    }
                    egui::TouchPhase::Cancel => {
                        self.touches = 0;
                        Some(InputEvent::TouchCancel)
                    }
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart_rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::pos2(100.0, 50.0), egui::vec2(400.0, 300.0))
    }

    #[test]
    fn test_press_is_relative_to_chart() {
        let mut t = InputTranslator::default();
        let ev = egui::Event::PointerButton {
            pos: egui::pos2(150.0, 70.0),
            button: egui::PointerButton::Secondary,
            pressed: true,
            modifiers: egui::Modifiers::SHIFT,
        };
        let Some(InputEvent::PointerDown(p)) =
            t.translate(&ev, chart_rect(), 5.0, egui::Modifiers::NONE)
        else {
            panic!("expected pointer down");
        };
        assert_eq!((p.x, p.y), (50.0, 20.0));
        assert_eq!((p.page_x, p.page_y), (150.0, 70.0));
        assert_eq!(p.button, PointerButton::Secondary);
        assert!(p.modifiers.shift);
    }

    #[test]
    fn test_release_without_press_is_dropped() {
        let mut t = InputTranslator::default();
        let up = egui::Event::PointerButton {
            pos: egui::pos2(150.0, 70.0),
            button: egui::PointerButton::Primary,
            pressed: false,
            modifiers: egui::Modifiers::NONE,
        };
        assert!(t.translate(&up, chart_rect(), 0.0, egui::Modifiers::NONE).is_none());

        let outside = egui::Event::PointerButton {
            pos: egui::pos2(10.0, 10.0),
            button: egui::PointerButton::Primary,
            pressed: true,
            modifiers: egui::Modifiers::NONE,
        };
        assert!(t
            .translate(&outside, chart_rect(), 0.0, egui::Modifiers::NONE)
            .is_none());
    }

    #[test]
    fn test_drag_continues_outside_chart() {
        let mut t = InputTranslator::default();
        let down = egui::Event::PointerButton {
            pos: egui::pos2(200.0, 100.0),
            button: egui::PointerButton::Primary,
            pressed: true,
            modifiers: egui::Modifiers::NONE,
        };
        let rect = chart_rect();
        assert!(t.translate(&down, rect, 0.0, egui::Modifiers::NONE).is_some());
        let away = egui::Event::PointerMoved(egui::pos2(900.0, 100.0));
        assert!(matches!(
            t.translate(&away, rect, 10.0, egui::Modifiers::NONE),
            Some(InputEvent::PointerMove(_))
        ));
    }

    #[test]
    fn test_wheel_uses_dom_direction() {
        let (dx, dy) = wheel_delta(egui::MouseWheelUnit::Line, egui::vec2(0.0, -1.0), 300.0);
        assert_eq!(dx, 0.0);
        assert_eq!(dy, LINE_PX);
    }

    #[test]
    fn test_escape_maps_to_key() {
        let mut t = InputTranslator::default();
        let ev = egui::Event::Key {
            key: egui::Key::Escape,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers::NONE,
        };
        assert!(matches!(
            t.translate(&ev, chart_rect(), 0.0, egui::Modifiers::NONE),
            Some(InputEvent::KeyDown {
                key: Key::Escape,
                ..
            })
        ));
    }
}

//! Input events delivered by the host.
//!
//! Coordinates are in container pixels (origin at the chart container's top
//! left), page coordinates are passed through untouched for events that
//! report them back to the host. Timestamps are host milliseconds from any
//! monotonic origin.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Keyboard modifier state at the time of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };
    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };
    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };
    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };
    pub const META: Self = Self {
        meta: true,
        ..Self::NONE
    };

    /// Combines two modifier sets.
    #[must_use]
    pub const fn with(self, other: Self) -> Self {
        Self {
            shift: self.shift || other.shift,
            ctrl: self.ctrl || other.ctrl,
            alt: self.alt || other.alt,
            meta: self.meta || other.meta,
        }
    }

    /// No modifier held.
    #[must_use]
    pub const fn is_none(self) -> bool {
        !(self.shift || self.ctrl || self.alt || self.meta)
    }
}

/// Mouse button that started a pointer sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

/// Mouse pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    pub page_x: f64,
    pub page_y: f64,
    pub button: PointerButton,
    pub modifiers: Modifiers,
    pub time_ms: f64,
}

impl PointerEvent {
    /// Event at container position `(x, y)`; page position mirrors it.
    #[must_use]
    pub fn at(x: f64, y: f64, time_ms: f64) -> Self {
        Self {
            x,
            y,
            page_x: x,
            page_y: y,
            time_ms,
            ..Self::default()
        }
    }

    /// Same event with a different button.
    #[must_use]
    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    /// Same event with different modifiers.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// One finger on the touch surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TouchPoint {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub page_x: f64,
    pub page_y: f64,
}

impl TouchPoint {
    #[must_use]
    pub fn new(id: u64, x: f64, y: f64) -> Self {
        Self {
            id,
            x,
            y,
            page_x: x,
            page_y: y,
        }
    }
}

/// Touch event carrying the touches that changed.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TouchEvent {
    pub touches: Vec<TouchPoint>,
    pub time_ms: f64,
}

impl TouchEvent {
    #[must_use]
    pub fn new(touches: Vec<TouchPoint>, time_ms: f64) -> Self {
        Self { touches, time_ms }
    }
}

/// Mouse wheel or trackpad scroll.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WheelEvent {
    pub x: f64,
    pub y: f64,
    /// Lateral scroll; pans the x axis.
    pub delta_x: f64,
    /// Vertical scroll; positive zooms out.
    pub delta_y: f64,
    pub modifiers: Modifiers,
    pub time_ms: f64,
}

/// Keys the chart reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Key {
    Escape,
    Other,
}

/// Every input the chart accepts, for hosts that queue events.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum InputEvent {
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    PointerUp(PointerEvent),
    /// Pointer left the chart or capture was lost.
    PointerCancel,
    TouchStart(TouchEvent),
    TouchMove(TouchEvent),
    TouchEnd(TouchEvent),
    TouchCancel,
    Wheel(WheelEvent),
    KeyDown { key: Key, time_ms: f64 },
    /// Animation-frame / timer callback.
    Tick { time_ms: f64 },
    Resize { width: f64, height: f64 },
}

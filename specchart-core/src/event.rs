//! Notifications sent from the chart to its host.
//!
//! Each event has a fixed wire name and positional arguments, matching how
//! host controllers subscribe to chart signals.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::SpectrumType;

/// A named event with positional arguments.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "event", rename_all = "camelCase"))]
pub enum HostEvent {
    /// Visible energy range changed.
    XRangeChanged {
        min: f64,
        max: f64,
        width_px: f64,
        height_px: f64,
    },
    /// Scale factor of a non-foreground spectrum changed.
    YScaled {
        factor: f64,
        spectrum_type: SpectrumType,
    },
    LeftClicked {
        energy: f64,
        count: f64,
        page_x: f64,
        page_y: f64,
    },
    RightClicked {
        energy: f64,
        count: f64,
        page_x: f64,
        page_y: f64,
    },
    DoubleClicked {
        energy: f64,
        count: f64,
        page_x: f64,
        page_y: f64,
    },
    /// Request to delete the peaks inside the range.
    ShiftKeyDragged { low_energy: f64, high_energy: f64 },
    /// Request to count gammas inside the range.
    ShiftAltKeyDragged { low_energy: f64, high_energy: f64 },
    /// Request to fit peaks inside the range.
    ControlKeyDragged {
        low_energy: f64,
        high_energy: f64,
        page_x: f64,
        page_y: f64,
    },
    /// Request to recalibrate so `start_energy` moves to `end_energy`.
    RightMouseDragged { start_energy: f64, end_energy: f64 },
    /// Proposed ROI bounds while an edge is dragged.
    RoiDrag {
        new_lower: f64,
        new_upper: f64,
        new_lower_px: f64,
        new_upper_px: f64,
        original_lower: f64,
        is_final: bool,
    },
    /// Proposed ROI for a live fit while ctrl-dragging.
    FitRoiDrag {
        lower: f64,
        upper: f64,
        num_peaks_hint: u32,
        is_final: bool,
        page_x: f64,
        page_y: f64,
    },
    LegendClosed,
}

/// Positional event argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventArg {
    Number(f64),
    Bool(bool),
    Text(&'static str),
}

impl HostEvent {
    /// Wire name of the event.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::XRangeChanged { .. } => "xrangechanged",
            Self::YScaled { .. } => "yscaled",
            Self::LeftClicked { .. } => "leftclicked",
            Self::RightClicked { .. } => "rightclicked",
            Self::DoubleClicked { .. } => "doubleclicked",
            Self::ShiftKeyDragged { .. } => "shiftkeydragged",
            Self::ShiftAltKeyDragged { .. } => "shiftaltkeydragged",
            Self::ControlKeyDragged { .. } => "controlkeydragged",
            Self::RightMouseDragged { .. } => "rightmousedragged",
            Self::RoiDrag { .. } => "roiDrag",
            Self::FitRoiDrag { .. } => "fitRoiDrag",
            Self::LegendClosed => "legendClosed",
        }
    }

    /// Positional arguments in wire order.
    #[must_use]
    pub fn args(&self) -> Vec<EventArg> {
        use EventArg::{Bool, Number, Text};
        match *self {
            Self::XRangeChanged {
                min,
                max,
                width_px,
                height_px,
            } => vec![Number(min), Number(max), Number(width_px), Number(height_px)],
            Self::YScaled {
                factor,
                spectrum_type,
            } => vec![Number(factor), Text(spectrum_type.as_str())],
            Self::LeftClicked {
                energy,
                count,
                page_x,
                page_y,
            }
            | Self::RightClicked {
                energy,
                count,
                page_x,
                page_y,
            }
            | Self::DoubleClicked {
                energy,
                count,
                page_x,
                page_y,
            } => vec![Number(energy), Number(count), Number(page_x), Number(page_y)],
            Self::ShiftKeyDragged {
                low_energy,
                high_energy,
            }
            | Self::ShiftAltKeyDragged {
                low_energy,
                high_energy,
            } => vec![Number(low_energy), Number(high_energy)],
            Self::ControlKeyDragged {
                low_energy,
                high_energy,
                page_x,
                page_y,
            } => vec![
                Number(low_energy),
                Number(high_energy),
                Number(page_x),
                Number(page_y),
            ],
            Self::RightMouseDragged {
                start_energy,
                end_energy,
            } => vec![Number(start_energy), Number(end_energy)],
            Self::RoiDrag {
                new_lower,
                new_upper,
                new_lower_px,
                new_upper_px,
                original_lower,
                is_final,
            } => vec![
                Number(new_lower),
                Number(new_upper),
                Number(new_lower_px),
                Number(new_upper_px),
                Number(original_lower),
                Bool(is_final),
            ],
            Self::FitRoiDrag {
                lower,
                upper,
                num_peaks_hint,
                is_final,
                page_x,
                page_y,
            } => vec![
                Number(lower),
                Number(upper),
                Number(f64::from(num_peaks_hint)),
                Bool(is_final),
                Number(page_x),
                Number(page_y),
            ],
            Self::LegendClosed => Vec::new(),
        }
    }
}

/// Opaque receiver of host events.
pub trait HostSink {
    /// Delivers one event.
    fn emit(&mut self, event: HostEvent);
}

impl HostSink for Vec<HostEvent> {
    fn emit(&mut self, event: HostEvent) {
        self.push(event);
    }
}

impl<F: FnMut(HostEvent)> HostSink for F {
    fn emit(&mut self, event: HostEvent) {
        self(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_and_args() {
        let ev = HostEvent::XRangeChanged {
            min: 1.0,
            max: 2.0,
            width_px: 300.0,
            height_px: 200.0,
        };
        assert_eq!(ev.name(), "xrangechanged");
        assert_eq!(ev.args().len(), 4);

        let ev = HostEvent::YScaled {
            factor: 0.5,
            spectrum_type: SpectrumType::Background,
        };
        assert_eq!(
            ev.args(),
            vec![EventArg::Number(0.5), EventArg::Text("BACKGROUND")]
        );
        assert!(HostEvent::LegendClosed.args().is_empty());
    }

    #[test]
    fn test_sinks() {
        let mut sink: Vec<HostEvent> = Vec::new();
        sink.emit(HostEvent::LegendClosed);
        assert_eq!(sink.len(), 1);

        let mut names = Vec::new();
        let mut closure = |ev: HostEvent| names.push(ev.name());
        closure.emit(HostEvent::LegendClosed);
        assert_eq!(names, vec!["legendClosed"]);
    }
}

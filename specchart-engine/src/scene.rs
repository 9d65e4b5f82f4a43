//! Self-contained chart descriptions.
//!
//! A [`Scene`] bundles container size, options and every dataset a host
//! would push through the setters, so a chart can be rebuilt from a file.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use specchart_core::{
    ChartOptions, HighlightRegion, ReferenceLineSet, Result, SearchWindow, Spectrum,
};

use crate::SpectrumChart;

/// A chart description.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub options: ChartOptions,
    /// Spectra in load order; each carries its own `spectrum_type`.
    pub spectra: Vec<Spectrum>,
    pub reference_lines: Vec<ReferenceLineSet>,
    pub search_windows: Vec<SearchWindow>,
    pub highlights: Vec<HighlightRegion>,
    /// Initial x domain; the data extent when absent.
    pub x_range: Option<(f64, f64)>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 450.0,
            options: ChartOptions::default(),
            spectra: Vec::new(),
            reference_lines: Vec::new(),
            search_windows: Vec::new(),
            highlights: Vec::new(),
            x_range: None,
        }
    }
}

impl Scene {
    /// Checks options and every dataset, stopping at the first invalid one.
    ///
    /// # Errors
    /// Returns the first validation error found.
    pub fn validate(&self) -> Result<()> {
        self.options.validate()?;
        for spectrum in &self.spectra {
            spectrum.validate()?;
            for roi in &spectrum.rois {
                roi.validate()?;
            }
        }
        for set in &self.reference_lines {
            set.validate()?;
        }
        Ok(())
    }

    /// Builds a chart showing this scene. `size` overrides the stored
    /// container dimensions when given.
    #[must_use]
    pub fn build(&self, size: (Option<f64>, Option<f64>)) -> SpectrumChart {
        let width = size.0.unwrap_or(self.width);
        let height = size.1.unwrap_or(self.height);
        let mut chart = SpectrumChart::new(width, height, self.options.clone());
        for spectrum in &self.spectra {
            chart.set_spectrum_data(
                Some(spectrum.clone()),
                true,
                spectrum.spectrum_type,
                spectrum.id.clone(),
                spectrum.background_id.clone(),
            );
        }
        if !self.reference_lines.is_empty() {
            chart.set_reference_lines(self.reference_lines.clone());
        }
        chart.set_search_windows(self.search_windows.clone());
        chart.set_highlight_regions(self.highlights.clone());
        if let Some((min, max)) = self.x_range {
            chart.set_x_axis_range(min, max, false);
        }
        chart
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use specchart_core::SpectrumType;

    #[test]
    fn test_build_applies_range_and_spectra() {
        let scene = Scene {
            spectra: vec![
                Spectrum::from_counts(vec![2.0; 300]),
                Spectrum::from_counts(vec![1.0; 300]).with_type(SpectrumType::Background),
            ],
            x_range: Some((50.0, 150.0)),
            ..Scene::default()
        };
        assert!(scene.validate().is_ok());
        let chart = scene.build((Some(640.0), None));
        assert_eq!(chart.x_domain(), (50.0, 150.0));
        assert!(chart.spectrum(SpectrumType::Background).is_some());
        assert!(chart.layout().plot.width < 640.0);
    }

    #[test]
    fn test_validate_rejects_bad_spectrum() {
        let scene = Scene {
            spectra: vec![Spectrum::new(vec![0.0, 2.0, 1.0], vec![1.0, 1.0, 1.0])],
            ..Scene::default()
        };
        assert!(scene.validate().is_err());
    }
}

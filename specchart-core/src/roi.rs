//! Regions of interest, their continua, and the peaks fitted inside them.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Color, Error, Result};

/// Model of the baseline underneath a ROI's peaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ContinuumType {
    /// No continuum; peaks sit on zero.
    NoOffset,
    Constant,
    #[default]
    Linear,
    Quadratic,
    Cubic,
    /// Piecewise continuum supplied as per-bin counts.
    External,
}

impl ContinuumType {
    /// Whether the continuum is a polynomial in `(E - reference_energy)`.
    #[must_use]
    pub fn is_polynomial(self) -> bool {
        matches!(
            self,
            Self::Constant | Self::Linear | Self::Quadratic | Self::Cubic
        )
    }

    /// Nominal number of polynomial coefficients for this kind.
    #[must_use]
    pub fn nominal_coefficients(self) -> usize {
        match self {
            Self::NoOffset | Self::External => 0,
            Self::Constant => 1,
            Self::Linear => 2,
            Self::Quadratic => 3,
            Self::Cubic => 4,
        }
    }
}

/// How a peak's shape is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PeakType {
    #[default]
    GaussianDefined,
    /// Peak area is whatever the data shows above the continuum.
    DataDefined,
}

/// Nuclide assignment for a peak.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NuclideRef {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(alias = "decayParent"))]
    pub decay_parent: String,
    #[cfg_attr(feature = "serde", serde(alias = "decayChild"))]
    pub decay_child: String,
    /// Source gamma/x-ray energy in keV.
    pub energy: f64,
    /// Particle kind, e.g. "gamma" or "xray".
    #[cfg_attr(feature = "serde", serde(alias = "type"))]
    pub kind: String,
}

/// A fitted peak. Belongs to exactly one [`Roi`].
///
/// Deserialises from either the flat field names or the host's
/// `Centroid`/`Width`/`Amplitude`/`Chi2` arrays of `[value, uncertainty]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "PeakRecord"))]
pub struct Peak {
    pub peak_type: PeakType,
    pub mean: f64,
    pub mean_uncertainty: Option<f64>,
    pub sigma: f64,
    pub sigma_uncertainty: Option<f64>,
    /// Peak area in counts.
    pub amplitude: f64,
    pub amplitude_uncertainty: Option<f64>,
    pub chi2: Option<f64>,
    pub nuclide: Option<NuclideRef>,
    pub user_label: Option<String>,
    pub line_color: Option<Color>,
}

impl Default for Peak {
    fn default() -> Self {
        Self {
            peak_type: PeakType::GaussianDefined,
            mean: 0.0,
            mean_uncertainty: None,
            sigma: 1.0,
            sigma_uncertainty: None,
            amplitude: 0.0,
            amplitude_uncertainty: None,
            chi2: None,
            nuclide: None,
            user_label: None,
            line_color: None,
        }
    }
}

#[cfg(feature = "serde")]
#[derive(Deserialize, Default)]
#[serde(default)]
struct PeakRecord {
    #[serde(alias = "type")]
    peak_type: PeakType,
    mean: Option<f64>,
    mean_uncertainty: Option<f64>,
    sigma: Option<f64>,
    sigma_uncertainty: Option<f64>,
    amplitude: Option<f64>,
    amplitude_uncertainty: Option<f64>,
    chi2: Option<f64>,
    #[serde(rename = "Centroid")]
    centroid: Vec<f64>,
    #[serde(rename = "Width")]
    width: Vec<f64>,
    #[serde(rename = "Amplitude")]
    area: Vec<f64>,
    #[serde(rename = "Chi2")]
    chi2_values: Vec<f64>,
    nuclide: Option<NuclideRef>,
    #[serde(alias = "userLabel")]
    user_label: Option<String>,
    #[serde(alias = "lineColor")]
    line_color: Option<Color>,
}

#[cfg(feature = "serde")]
impl From<PeakRecord> for Peak {
    fn from(r: PeakRecord) -> Self {
        let nth = |values: &[f64], i: usize| values.get(i).copied();
        let defaults = Self::default();
        Self {
            peak_type: r.peak_type,
            mean: r.mean.or_else(|| nth(&r.centroid, 0)).unwrap_or(defaults.mean),
            mean_uncertainty: r.mean_uncertainty.or_else(|| nth(&r.centroid, 1)),
            sigma: r.sigma.or_else(|| nth(&r.width, 0)).unwrap_or(defaults.sigma),
            sigma_uncertainty: r.sigma_uncertainty.or_else(|| nth(&r.width, 1)),
            amplitude: r
                .amplitude
                .or_else(|| nth(&r.area, 0))
                .unwrap_or(defaults.amplitude),
            amplitude_uncertainty: r.amplitude_uncertainty.or_else(|| nth(&r.area, 1)),
            chi2: r.chi2.or_else(|| nth(&r.chi2_values, 0)),
            nuclide: r.nuclide,
            user_label: r.user_label,
            line_color: r.line_color,
        }
    }
}

impl Peak {
    /// Creates a Gaussian peak.
    #[must_use]
    pub fn gaussian(mean: f64, sigma: f64, amplitude: f64) -> Self {
        Self {
            mean,
            sigma,
            amplitude,
            ..Self::default()
        }
    }

    /// Creates a data-defined peak centred at `mean`.
    #[must_use]
    pub fn data_defined(mean: f64, sigma: f64) -> Self {
        Self {
            peak_type: PeakType::DataDefined,
            mean,
            sigma,
            ..Self::default()
        }
    }

    /// Full width at half maximum.
    #[must_use]
    pub fn fwhm(&self) -> f64 {
        2.354_820_045 * self.sigma
    }

    /// Checks that the shape parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPeak`] for non-finite parameters or a
    /// non-positive Gaussian width.
    pub fn validate(&self) -> Result<()> {
        if !self.mean.is_finite() || !self.amplitude.is_finite() || !self.sigma.is_finite() {
            return Err(Error::InvalidPeak(format!(
                "non-finite parameters (mean {}, sigma {}, amplitude {})",
                self.mean, self.sigma, self.amplitude
            )));
        }
        if self.peak_type == PeakType::GaussianDefined && self.sigma <= 0.0 {
            return Err(Error::InvalidPeak(format!(
                "gaussian peak at {} has sigma {}",
                self.mean, self.sigma
            )));
        }
        Ok(())
    }
}

/// Region of interest: an energy range with a continuum and its peaks.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Roi {
    #[cfg_attr(feature = "serde", serde(alias = "type"))]
    pub continuum_type: ContinuumType,
    #[cfg_attr(feature = "serde", serde(alias = "lowerEnergy"))]
    pub lower_energy: f64,
    #[cfg_attr(feature = "serde", serde(alias = "upperEnergy"))]
    pub upper_energy: f64,
    /// Origin of the continuum polynomial.
    #[cfg_attr(feature = "serde", serde(alias = "referenceEnergy"))]
    pub reference_energy: f64,
    /// Polynomial coefficients, lowest order first.
    pub coeffs: Vec<f64>,
    /// Lower edges of the external continuum bins.
    #[cfg_attr(feature = "serde", serde(alias = "continuumEnergies"))]
    pub continuum_energies: Vec<f64>,
    /// Counts per external continuum bin.
    #[cfg_attr(feature = "serde", serde(alias = "continuumCounts"))]
    pub continuum_counts: Vec<f64>,
    pub peaks: Vec<Peak>,
}

impl Roi {
    /// Creates a polynomial-continuum ROI with the reference energy at the
    /// lower bound.
    #[must_use]
    pub fn polynomial(
        continuum_type: ContinuumType,
        lower_energy: f64,
        upper_energy: f64,
        coeffs: Vec<f64>,
    ) -> Self {
        Self {
            continuum_type,
            lower_energy,
            upper_energy,
            reference_energy: lower_energy,
            coeffs,
            ..Self::default()
        }
    }

    /// Sets the polynomial reference energy.
    #[must_use]
    pub fn with_reference_energy(mut self, reference_energy: f64) -> Self {
        self.reference_energy = reference_energy;
        self
    }

    /// Adds a peak.
    #[must_use]
    pub fn with_peak(mut self, peak: Peak) -> Self {
        self.peaks.push(peak);
        self
    }

    /// Width of the ROI in keV.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper_energy - self.lower_energy
    }

    /// Whether `energy` lies inside the ROI bounds.
    #[must_use]
    pub fn contains(&self, energy: f64) -> bool {
        energy >= self.lower_energy && energy <= self.upper_energy
    }

    /// Checks bounds and the continuum definition.
    ///
    /// Individual peaks are validated separately so a single bad peak does
    /// not hide the rest of the ROI.
    ///
    /// # Errors
    ///
    /// Returns an error for reversed or non-finite bounds, or a continuum
    /// that cannot be evaluated.
    pub fn validate(&self) -> Result<()> {
        if !self.lower_energy.is_finite()
            || !self.upper_energy.is_finite()
            || self.lower_energy >= self.upper_energy
        {
            return Err(Error::InvalidRoiBounds {
                lower: self.lower_energy,
                upper: self.upper_energy,
            });
        }
        if self.continuum_type.is_polynomial() {
            if self.coeffs.is_empty() {
                return Err(Error::InvalidContinuum(format!(
                    "{:?} continuum without coefficients",
                    self.continuum_type
                )));
            }
            if !self.reference_energy.is_finite() || self.coeffs.iter().any(|c| !c.is_finite()) {
                return Err(Error::InvalidContinuum(
                    "non-finite polynomial coefficient or reference energy".to_string(),
                ));
            }
        }
        if self.continuum_type == ContinuumType::External {
            let n_e = self.continuum_energies.len();
            let n_c = self.continuum_counts.len();
            if n_c == 0 || (n_e != n_c && n_e != n_c + 1) {
                return Err(Error::InvalidContinuum(format!(
                    "external continuum has {n_e} energies and {n_c} counts"
                )));
            }
            if self
                .continuum_energies
                .windows(2)
                .any(|w| !w[0].is_finite() || !w[1].is_finite() || w[1] < w[0])
            {
                return Err(Error::InvalidContinuum(
                    "external continuum energies are not monotonic".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roi_validation() {
        let roi = Roi::polynomial(ContinuumType::Linear, 0.0, 100.0, vec![10.0, 0.0]);
        assert!(roi.validate().is_ok());

        let reversed = Roi::polynomial(ContinuumType::Linear, 100.0, 0.0, vec![10.0]);
        assert!(matches!(
            reversed.validate(),
            Err(Error::InvalidRoiBounds { .. })
        ));

        let no_coeffs = Roi::polynomial(ContinuumType::Quadratic, 0.0, 1.0, vec![]);
        assert!(matches!(
            no_coeffs.validate(),
            Err(Error::InvalidContinuum(_))
        ));

        let external = Roi {
            continuum_type: ContinuumType::External,
            lower_energy: 0.0,
            upper_energy: 3.0,
            continuum_energies: vec![0.0, 1.0, 2.0, 3.0],
            continuum_counts: vec![1.0, 1.0, 1.0],
            ..Roi::default()
        };
        assert!(external.validate().is_ok());
    }

    #[test]
    fn test_peak_validation() {
        assert!(Peak::gaussian(50.0, 5.0, 100.0).validate().is_ok());
        assert!(Peak::gaussian(50.0, 0.0, 100.0).validate().is_err());
        assert!(Peak::gaussian(f64::NAN, 1.0, 1.0).validate().is_err());
        assert!(Peak::data_defined(50.0, 0.0).validate().is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_peak_loads_from_host_arrays() {
        let json = r#"{
            "type": "Linear", "lowerEnergy": 640.0, "upperEnergy": 690.0,
            "referenceEnergy": 640.0, "coeffs": [12.0, -0.1],
            "peaks": [{
                "type": "GaussianDefined",
                "Centroid": [661.7, 0.05],
                "Width": [1.8, 0.02],
                "Amplitude": [2500.0, 51.0],
                "Chi2": [1.1],
                "nuclide": {"name": "Cs137", "decayParent": "Cs137", "decayChild": "Ba137m",
                            "energy": 661.657, "type": "gamma"},
                "userLabel": "photopeak"
            }]
        }"#;
        let roi: Roi = serde_json::from_str(json).expect("host ROI");
        assert_eq!(roi.continuum_type, ContinuumType::Linear);
        assert!((roi.upper_energy - 690.0).abs() < 1e-12);
        let peak = &roi.peaks[0];
        assert!((peak.mean - 661.7).abs() < 1e-12);
        assert_eq!(peak.mean_uncertainty, Some(0.05));
        assert!((peak.sigma - 1.8).abs() < 1e-12);
        assert!((peak.amplitude - 2500.0).abs() < 1e-12);
        assert_eq!(peak.amplitude_uncertainty, Some(51.0));
        assert_eq!(peak.chi2, Some(1.1));
        assert_eq!(peak.user_label.as_deref(), Some("photopeak"));
        let nuclide = peak.nuclide.as_ref().expect("nuclide");
        assert_eq!(nuclide.decay_child, "Ba137m");
        assert_eq!(nuclide.kind, "gamma");

        let flat = serde_json::to_string(peak).expect("serialise");
        let back: Peak = serde_json::from_str(&flat).expect("flat peak");
        assert!((back.sigma - peak.sigma).abs() < 1e-9);
        assert_eq!(back.nuclide.map(|n| n.name), Some("Cs137".to_string()));
    }

    #[test]
    fn test_fwhm() {
        let peak = Peak::gaussian(0.0, 1.0, 1.0);
        assert!((peak.fwhm() - 2.354_820_045).abs() < 1e-9);
    }
}

//! Built-in scene shown before any file is opened.

use specchart_core::{
    Color, ContinuumType, NuclideRef, Peak, ReferenceLine, ReferenceLineSet, Roi, Spectrum,
    SpectrumType,
};
use specchart_engine::Scene;

const CHANNELS: usize = 1024;
const KEV_PER_CHANNEL: f64 = 3.0;
const CS137_KEV: f64 = 661.657;
const K40_KEV: f64 = 1460.82;

fn gaussian(e: f64, mean: f64, sigma: f64, area: f64) -> f64 {
    let z = (e - mean) / sigma;
    area / (sigma * (2.0 * std::f64::consts::PI).sqrt()) * (-0.5 * z * z).exp()
}

fn resolution(e: f64) -> f64 {
    0.5 + 0.03 * e.sqrt()
}

#[allow(clippy::cast_precision_loss)]
fn energies() -> Vec<f64> {
    (0..=CHANNELS).map(|i| i as f64 * KEV_PER_CHANNEL).collect()
}

/// Counts per channel for a smooth continuum plus the given lines.
fn counts(x: &[f64], continuum: f64, lines: &[(f64, f64)]) -> Vec<f64> {
    x.windows(2)
        .map(|w| {
            let e = 0.5 * (w[0] + w[1]);
            let width = w[1] - w[0];
            let mut c = continuum * (-e / 600.0).exp() + 2.0;
            for &(mean, area) in lines {
                c += gaussian(e, mean, resolution(mean), area) * width;
            }
            c.round()
        })
        .collect()
}

fn cs137_roi() -> Roi {
    let sigma = resolution(CS137_KEV);
    Roi::polynomial(ContinuumType::Linear, 620.0, 705.0, vec![130.0, -0.9])
        .with_reference_energy(620.0)
        .with_peak(Peak {
            nuclide: Some(NuclideRef {
                name: "Cs137".to_string(),
                energy: CS137_KEV,
                ..NuclideRef::default()
            }),
            user_label: Some("Cs-137".to_string()),
            ..Peak::gaussian(CS137_KEV, sigma, 25_000.0)
        })
}

/// Foreground with Cs-137 and K-40, a scaled background, and Cs-137 lines.
pub fn demo_scene() -> Scene {
    let x = energies();
    let mut foreground = Spectrum::new(
        x.clone(),
        counts(&x, 900.0, &[(CS137_KEV, 25_000.0), (K40_KEV, 4_000.0)]),
    )
    .with_id("demo-fg")
    .with_rois(vec![cs137_roi()]);
    foreground.title = "Demo foreground".to_string();
    foreground.live_time = Some(300.0);
    foreground.real_time = Some(302.5);
    foreground.background_id = Some("demo-bg".to_string());

    let mut background = Spectrum::new(x.clone(), counts(&x, 450.0, &[(K40_KEV, 2_000.0)]))
        .with_type(SpectrumType::Background)
        .with_id("demo-bg")
        .with_scale_factor(2.0);
    background.title = "Demo background".to_string();
    background.live_time = Some(150.0);

    let cs = ReferenceLineSet {
        parent: "Cs137".to_string(),
        color: Color::FIREBRICK,
        lines: vec![
            ReferenceLine::new(CS137_KEV, 0.851),
            ReferenceLine::new(31.8, 0.02),
            ReferenceLine::new(32.2, 0.037),
        ],
        ..ReferenceLineSet::default()
    };

    Scene {
        spectra: vec![foreground, background],
        reference_lines: vec![cs],
        ..Scene::default()
    }
}

use glissconf::RoughnessConfig;
use serde::{Deserialize, Serialize};

/// Vassilakis sensory roughness model.
///
/// Each pair of partials contributes
/// `X^0.1 · 0.5 · Y^3.11 · Z`, where `X` is the amplitude product, `Y` the
/// amplitude fluctuation degree and `Z` the Plomp-Levelt curve scaled to
/// the critical band at the lower frequency. Amplitudes are fixed at 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoughnessModel {
    pub b1: f64,
    pub b2: f64,
    pub s1: f64,
    pub s2: f64,
    pub d_max: f64,
}

impl Default for RoughnessModel {
    fn default() -> Self {
        Self::from(&RoughnessConfig::default())
    }
}

impl From<&RoughnessConfig> for RoughnessModel {
    fn from(config: &RoughnessConfig) -> Self {
        Self {
            b1: config.b1,
            b2: config.b2,
            s1: config.s1,
            s2: config.s2,
            d_max: config.d_max,
        }
    }
}

impl RoughnessModel {
    /// Total roughness over every unordered pair of `freqs`.
    pub fn roughness(&self, freqs: &[f64]) -> f64 {
        let mut total = 0.0;
        for (i, &a) in freqs.iter().enumerate() {
            for &b in &freqs[i + 1..] {
                total += self.pair(a, b);
            }
        }
        total
    }

    /// Roughness of a single pair of unit-amplitude partials.
    pub fn pair(&self, a: f64, b: f64) -> f64 {
        let (f_min, f_max) = if a <= b { (a, b) } else { (b, a) };
        self.weighted_pair(f_min, 1.0, f_max, 1.0)
    }

    fn weighted_pair(&self, f_min: f64, a_min: f64, f_max: f64, a_max: f64) -> f64 {
        let amp_sum = a_min + a_max;
        if amp_sum <= 0.0 {
            return 0.0;
        }
        let x = a_min * a_max;
        let y = 2.0 * a_min / amp_sum;
        // s depends only on f_min, so coincident partials give Z = 0 exactly
        let s = self.d_max / (self.s1 * f_min + self.s2);
        let df = f_max - f_min;
        let z = (-self.b1 * s * df).exp() - (-self.b2 * s * df).exp();
        x.powf(0.1) * 0.5 * y.powf(3.11) * z
    }
}

/// Total roughness of `freqs` with the default coefficients.
pub fn calc_roughness(freqs: &[f64]) -> f64 {
    RoughnessModel::default().roughness(freqs)
}

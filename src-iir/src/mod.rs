#![doc = include_str!("../README.md")]

use ndarray::Array1;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

// Constants
/// Reference sample rate used to normalize angular frequencies.
///
/// Curves are computed in continuous-frequency terms, this value is a
/// convention shared with the reference curves and not a playback rate.
pub const REFERENCE_SRATE: f64 = 44100.0;
/// Default Q factor for high/low pass filters
pub const DEFAULT_Q_HIGH_LOW_PASS: f64 = 1.0 / std::f64::consts::SQRT_2;
/// Default Q factor for high/low shelf filters
pub const DEFAULT_Q_HIGH_LOW_SHELF: f64 = 1.0668676536332304; // Value of bw2q(0.9)
/// Attenuation slope of the simplified pass filters, in dB per octave
pub const PASS_ROLLOFF_DB_PER_OCTAVE: f64 = 12.0;

/// Filter types for parametric EQ stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    /// Peaking (bell) filter
    Peaking,
    /// Low-shelf filter
    LowShelf,
    /// High-shelf filter
    HighShelf,
    /// Low-pass filter
    Lowpass,
    /// High-pass filter
    Highpass,
}

impl FilterType {
    /// All filter types, in display order.
    pub const ALL: [FilterType; 5] = [
        FilterType::Peaking,
        FilterType::LowShelf,
        FilterType::HighShelf,
        FilterType::Lowpass,
        FilterType::Highpass,
    ];

    /// Returns the short string representation of the filter type (e.g., "LP").
    pub fn short_name(&self) -> &'static str {
        match self {
            FilterType::Peaking => "PK",
            FilterType::LowShelf => "LS",
            FilterType::HighShelf => "HS",
            FilterType::Lowpass => "LP",
            FilterType::Highpass => "HP",
        }
    }

    /// Returns the wire name of the filter type (e.g., "low_shelf").
    pub fn long_name(&self) -> &'static str {
        match self {
            FilterType::Peaking => "peaking",
            FilterType::LowShelf => "low_shelf",
            FilterType::HighShelf => "high_shelf",
            FilterType::Lowpass => "lowpass",
            FilterType::Highpass => "highpass",
        }
    }

    /// Whether a gain value is required to compute this filter's response.
    pub fn uses_gain(&self) -> bool {
        matches!(
            self,
            FilterType::Peaking | FilterType::LowShelf | FilterType::HighShelf
        )
    }

    /// Whether a Q factor is required to compute this filter's response.
    pub fn uses_q(&self) -> bool {
        matches!(
            self,
            FilterType::Peaking | FilterType::Lowpass | FilterType::Highpass
        )
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.long_name())
    }
}

/// Error returned when a filter type name is not recognised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFilterType(pub String);

impl fmt::Display for UnknownFilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown filter type '{}'", self.0)
    }
}

impl std::error::Error for UnknownFilterType {}

impl FromStr for FilterType {
    type Err = UnknownFilterType;

    /// Accepts both wire names ("low_shelf") and short names ("LS").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        FilterType::ALL
            .iter()
            .find(|t| t.long_name() == lowered || t.short_name().eq_ignore_ascii_case(&lowered))
            .copied()
            .ok_or_else(|| UnknownFilterType(s.to_string()))
    }
}

/// Which response model to evaluate a filter with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseModel {
    /// Peaking evaluated as a biquad; shelves and pass filters use the
    /// piecewise approximations of the reference curves.
    #[default]
    Simplified,
    /// Every filter type evaluated as its RBJ biquad.
    Exact,
}

/// Represents a single biquad IIR filter.
#[derive(Debug, Clone)]
pub struct Biquad {
    /// The type of filter
    pub filter_type: FilterType,
    /// Center frequency in Hz
    pub freq: f64,
    /// Sample rate in Hz
    pub srate: f64,
    /// Q factor (quality factor)
    pub q: f64,
    /// Gain in dB (for peaking and shelving filters)
    pub db_gain: f64,
    /// Normalized filter coefficients
    a1: f64,
    a2: f64,
    b0: f64,
    b1: f64,
    b2: f64,
}

impl Biquad {
    /// Creates and initializes a new Biquad filter.
    pub fn new(filter_type: FilterType, freq: f64, srate: f64, q: f64, db_gain: f64) -> Self {
        let mut biquad = Biquad {
            filter_type,
            freq,
            srate,
            q,
            db_gain,
            a1: 0.0,
            a2: 0.0,
            b0: 0.0,
            b1: 0.0,
            b2: 0.0,
        };

        if biquad.q == 0.0 {
            match biquad.filter_type {
                FilterType::Highpass | FilterType::Lowpass => {
                    biquad.q = DEFAULT_Q_HIGH_LOW_PASS;
                }
                FilterType::LowShelf | FilterType::HighShelf => {
                    biquad.q = DEFAULT_Q_HIGH_LOW_SHELF;
                }
                FilterType::Peaking => {}
            }
        }

        // Safety clamp: ensure strictly positive Q to avoid division by zero in alpha = sn/(2*q)
        if biquad.q <= 0.0 {
            biquad.q = 1.0e-2;
        }

        biquad.compute_coeffs();
        biquad
    }

    fn compute_coeffs(&mut self) {
        // Intermediate variables
        let a = 10.0_f64.powf(self.db_gain / 40.0);
        let omega = 2.0 * PI * self.freq / self.srate;
        let sn = omega.sin();
        let cs = omega.cos();
        let alpha = sn / (2.0 * self.q);
        let beta = 2.0 * a.sqrt() * alpha;

        // Raw coefficients
        let (b0, b1, b2, a0, a1, a2);

        match self.filter_type {
            FilterType::Lowpass => {
                b0 = (1.0 - cs) / 2.0;
                b1 = 1.0 - cs;
                b2 = (1.0 - cs) / 2.0;
                a0 = 1.0 + alpha;
                a1 = -2.0 * cs;
                a2 = 1.0 - alpha;
            }
            FilterType::Highpass => {
                b0 = (1.0 + cs) / 2.0;
                b1 = -(1.0 + cs);
                b2 = (1.0 + cs) / 2.0;
                a0 = 1.0 + alpha;
                a1 = -2.0 * cs;
                a2 = 1.0 - alpha;
            }
            FilterType::Peaking => {
                b0 = 1.0 + (alpha * a);
                b1 = -2.0 * cs;
                b2 = 1.0 - (alpha * a);
                a0 = 1.0 + (alpha / a);
                a1 = -2.0 * cs;
                a2 = 1.0 - (alpha / a);
            }
            FilterType::LowShelf => {
                b0 = a * ((a + 1.0) - (a - 1.0) * cs + beta);
                b1 = 2.0 * a * ((a - 1.0) - (a + 1.0) * cs);
                b2 = a * ((a + 1.0) - (a - 1.0) * cs - beta);
                a0 = (a + 1.0) + (a - 1.0) * cs + beta;
                a1 = -2.0 * ((a - 1.0) + (a + 1.0) * cs);
                a2 = (a + 1.0) + (a - 1.0) * cs - beta;
            }
            FilterType::HighShelf => {
                b0 = a * ((a + 1.0) + (a - 1.0) * cs + beta);
                b1 = -2.0 * a * ((a - 1.0) + (a + 1.0) * cs);
                b2 = a * ((a + 1.0) + (a - 1.0) * cs - beta);
                a0 = (a + 1.0) - (a - 1.0) * cs + beta;
                a1 = 2.0 * ((a - 1.0) - (a + 1.0) * cs);
                a2 = (a + 1.0) - (a - 1.0) * cs - beta;
            }
        }

        // Normalize coefficients
        self.b0 = b0 / a0;
        self.b1 = b1 / a0;
        self.b2 = b2 / a0;
        self.a1 = a1 / a0;
        self.a2 = a2 / a0;
    }

    /// Evaluates the transfer function H(z) on the unit circle at frequency `f`.
    pub fn transfer(&self, f: f64) -> Complex64 {
        let omega = 2.0 * PI * f / self.srate;
        let z1 = Complex64::from_polar(1.0, -omega);
        let z2 = z1 * z1;
        let numerator = self.b0 + z1 * self.b1 + z2 * self.b2;
        let denominator = 1.0 + z1 * self.a1 + z2 * self.a2;
        numerator / denominator
    }

    /// Calculates the filter's magnitude response at a single frequency `f`.
    pub fn result(&self, f: f64) -> f64 {
        self.transfer(f).norm()
    }

    /// Calculates the filter's response in dB at a single frequency `f`.
    pub fn log_result(&self, f: f64) -> f64 {
        let result = self.result(f);
        if result > 0.0 {
            20.0 * result.log10()
        } else {
            -200.0 // Return a large negative number for silence
        }
    }

    /// Vectorized version to compute the SPL response for a vector of frequencies.
    pub fn np_log_result(&self, freq: &Array1<f64>) -> Array1<f64> {
        // Clip to a minimum value to avoid log(0), then calculate dB
        let min_val = 1.0e-10;
        freq.mapv(|f| 20.0 * self.result(f).max(min_val).log10())
    }

    /// Returns the filter coefficients as a tuple.
    pub fn constants(&self) -> (f64, f64, f64, f64, f64) {
        (self.a1, self.a2, self.b0, self.b1, self.b2)
    }
}

/// Implement the Display trait for pretty-printing.
impl fmt::Display for Biquad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Type:{},Freq:{:.1},Rate:{:.1},Q:{:.1},Gain:{:.1}",
            self.filter_type.short_name(),
            self.freq,
            self.srate,
            self.q,
            self.db_gain
        )
    }
}

fn is_positive(x: f64) -> bool {
    x.is_finite() && x > 0.0
}

fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() { x } else { 0.0 }
}

/// Gain in dB of a peaking filter at `freq`, evaluated as an RBJ biquad.
///
/// Degenerate inputs (non-positive frequencies or Q, non-finite gain)
/// contribute 0 dB.
pub fn peaking_gain(freq: f64, filter_freq: f64, gain: f64, q: f64) -> f64 {
    if !is_positive(freq) || !is_positive(filter_freq) || !is_positive(q) || !gain.is_finite() {
        return 0.0;
    }
    let bq = Biquad::new(FilterType::Peaking, filter_freq, REFERENCE_SRATE, q, gain);
    finite_or_zero(bq.log_result(freq))
}

/// Gain in dB of the simplified low shelf: full gain at or below the
/// corner, `gain * (filter_freq / freq)^2` above it.
pub fn low_shelf_gain(freq: f64, filter_freq: f64, gain: f64) -> f64 {
    if !is_positive(freq) || !is_positive(filter_freq) || !gain.is_finite() {
        return 0.0;
    }
    if freq <= filter_freq {
        gain
    } else {
        gain * (filter_freq / freq).powi(2)
    }
}

/// Gain in dB of the simplified high shelf, mirror of [`low_shelf_gain`].
pub fn high_shelf_gain(freq: f64, filter_freq: f64, gain: f64) -> f64 {
    if !is_positive(freq) || !is_positive(filter_freq) || !gain.is_finite() {
        return 0.0;
    }
    if freq >= filter_freq {
        gain
    } else {
        gain * (freq / filter_freq).powi(2)
    }
}

/// Attenuation in dB of the simplified lowpass: flat in the pass band,
/// 12 dB per octave above the cutoff.
pub fn lowpass_gain(freq: f64, filter_freq: f64) -> f64 {
    if !is_positive(freq) || !is_positive(filter_freq) || freq <= filter_freq {
        return 0.0;
    }
    -PASS_ROLLOFF_DB_PER_OCTAVE * (freq / filter_freq).log2()
}

/// Attenuation in dB of the simplified highpass, mirror of [`lowpass_gain`].
pub fn highpass_gain(freq: f64, filter_freq: f64) -> f64 {
    if !is_positive(freq) || !is_positive(filter_freq) || freq >= filter_freq {
        return 0.0;
    }
    -PASS_ROLLOFF_DB_PER_OCTAVE * (filter_freq / freq).log2()
}

/// Parameters of one EQ stage, as needed to compute its response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stage {
    /// Type of the stage
    pub filter_type: FilterType,
    /// Center or cutoff frequency in Hz
    pub freq: f64,
    /// Gain in dB, required for peaking and shelves
    pub gain: Option<f64>,
    /// Q factor, required for peaking and pass filters
    pub q: Option<f64>,
}

impl Stage {
    /// Returns true when every parameter the filter type needs is present.
    pub fn is_complete(&self) -> bool {
        (!self.filter_type.uses_gain() || self.gain.is_some())
            && (!self.filter_type.uses_q() || self.q.is_some())
    }

    /// Builds the RBJ biquad for this stage at the reference sample rate.
    ///
    /// Missing parameters fall back to 0 dB gain and the type's default Q.
    pub fn biquad(&self) -> Biquad {
        Biquad::new(
            self.filter_type,
            self.freq,
            REFERENCE_SRATE,
            self.q.unwrap_or(0.0),
            self.gain.unwrap_or(0.0),
        )
    }

    /// Contribution of this stage in dB at `freq`.
    ///
    /// Returns `None` when a required parameter is missing; the stage must
    /// then be skipped by the caller. The value is always finite.
    pub fn response(&self, freq: f64, model: ResponseModel) -> Option<f64> {
        if !self.is_complete() {
            return None;
        }
        let gain = self.gain.unwrap_or(0.0);
        let q = self.q.unwrap_or(0.0);
        let db = match (model, self.filter_type) {
            (_, FilterType::Peaking) => peaking_gain(freq, self.freq, gain, q),
            (ResponseModel::Simplified, FilterType::LowShelf) => {
                low_shelf_gain(freq, self.freq, gain)
            }
            (ResponseModel::Simplified, FilterType::HighShelf) => {
                high_shelf_gain(freq, self.freq, gain)
            }
            (ResponseModel::Simplified, FilterType::Lowpass) => lowpass_gain(freq, self.freq),
            (ResponseModel::Simplified, FilterType::Highpass) => highpass_gain(freq, self.freq),
            (ResponseModel::Exact, _) => {
                if !is_positive(freq)
                    || !is_positive(self.freq)
                    || !gain.is_finite()
                    || (self.filter_type.uses_q() && !is_positive(q))
                {
                    0.0
                } else {
                    self.biquad().log_result(freq)
                }
            }
        };
        Some(finite_or_zero(db))
    }
}

/// Compute the combined response (in dB) of several stages on a frequency grid.
///
/// Incomplete stages are skipped.
///
/// # Arguments
/// * `freqs` - Frequency points for evaluation (Hz)
/// * `stages` - EQ stages to sum
/// * `model` - Response model used for every stage
///
/// # Returns
/// Summed gain in dB at the specified frequency points
pub fn compute_stages_response(
    freqs: &Array1<f64>,
    stages: &[Stage],
    model: ResponseModel,
) -> Array1<f64> {
    let mut response = Array1::zeros(freqs.len());
    for stage in stages.iter().filter(|s| s.is_complete()) {
        response += &freqs.mapv(|f| stage.response(f, model).unwrap_or(0.0));
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn filter_type_parses_wire_and_short_names() {
        assert_eq!("peaking".parse::<FilterType>(), Ok(FilterType::Peaking));
        assert_eq!("LOW_SHELF".parse::<FilterType>(), Ok(FilterType::LowShelf));
        assert_eq!("hs".parse::<FilterType>(), Ok(FilterType::HighShelf));
        assert_eq!("LP".parse::<FilterType>(), Ok(FilterType::Lowpass));
        assert!("bandpass".parse::<FilterType>().is_err());
    }

    #[test]
    fn filter_type_serializes_snake_case() {
        let json = serde_json::to_string(&FilterType::HighShelf).unwrap();
        assert_eq!(json, "\"high_shelf\"");
        let back: FilterType = serde_json::from_str("\"lowpass\"").unwrap();
        assert_eq!(back, FilterType::Lowpass);
    }

    #[test]
    fn peaking_reaches_full_gain_at_center() {
        let g = peaking_gain(1_000.0, 1_000.0, 6.0, 1.0);
        assert!(approx_eq(g, 6.0, 1e-9), "gain at center = {}", g);
    }

    #[test]
    fn peaking_is_flat_far_from_center() {
        assert!(peaking_gain(20.0, 1_000.0, 6.0, 1.0).abs() < 0.05);
        assert!(peaking_gain(20_000.0, 1_000.0, 6.0, 1.0).abs() < 0.05);
    }

    #[test]
    fn peaking_cut_mirrors_boost() {
        for f in [200.0, 700.0, 1_000.0, 3_000.0] {
            let boost = peaking_gain(f, 1_000.0, 4.0, 2.0);
            let cut = peaking_gain(f, 1_000.0, -4.0, 2.0);
            assert!(approx_eq(boost, -cut, 1e-9), "f={} boost={} cut={}", f, boost, cut);
        }
    }

    #[test]
    fn shelves_follow_piecewise_policy() {
        assert_eq!(low_shelf_gain(50.0, 100.0, 3.0), 3.0);
        assert_eq!(low_shelf_gain(100.0, 100.0, 3.0), 3.0);
        assert!(approx_eq(low_shelf_gain(1_000.0, 100.0, 3.0), 0.03, 1e-12));
        assert_eq!(high_shelf_gain(10_000.0, 5_000.0, -2.0), -2.0);
        assert!(approx_eq(high_shelf_gain(2_500.0, 5_000.0, -2.0), -0.5, 1e-12));
    }

    #[test]
    fn pass_filters_roll_off_twelve_db_per_octave() {
        assert_eq!(lowpass_gain(500.0, 1_000.0), 0.0);
        assert_eq!(lowpass_gain(1_000.0, 1_000.0), 0.0);
        assert!(approx_eq(lowpass_gain(2_000.0, 1_000.0), -12.0, 1e-12));
        assert!(approx_eq(lowpass_gain(4_000.0, 1_000.0), -24.0, 1e-12));
        assert_eq!(highpass_gain(2_000.0, 1_000.0), 0.0);
        assert!(approx_eq(highpass_gain(500.0, 1_000.0), -12.0, 1e-12));
    }

    #[test]
    fn degenerate_inputs_contribute_nothing() {
        assert_eq!(peaking_gain(1_000.0, 0.0, 6.0, 1.0), 0.0);
        assert_eq!(peaking_gain(1_000.0, 1_000.0, 6.0, 0.0), 0.0);
        assert_eq!(peaking_gain(0.0, 1_000.0, 6.0, 1.0), 0.0);
        assert_eq!(peaking_gain(f64::NAN, 1_000.0, 6.0, 1.0), 0.0);
        assert_eq!(low_shelf_gain(100.0, -5.0, 3.0), 0.0);
        assert_eq!(high_shelf_gain(100.0, 1_000.0, f64::INFINITY), 0.0);
        assert_eq!(lowpass_gain(1_000.0, 0.0), 0.0);
        assert_eq!(highpass_gain(-1.0, 1_000.0), 0.0);
    }

    #[test]
    fn stage_without_required_parameter_is_skipped() {
        let peak = Stage {
            filter_type: FilterType::Peaking,
            freq: 1_000.0,
            gain: Some(6.0),
            q: None,
        };
        assert_eq!(peak.response(1_000.0, ResponseModel::Simplified), None);

        // shelves do not need Q, pass filters do not need gain
        let shelf = Stage {
            filter_type: FilterType::LowShelf,
            freq: 100.0,
            gain: Some(3.0),
            q: None,
        };
        assert_eq!(shelf.response(50.0, ResponseModel::Simplified), Some(3.0));
        let lp = Stage {
            filter_type: FilterType::Lowpass,
            freq: 1_000.0,
            gain: None,
            q: Some(0.7),
        };
        assert_eq!(lp.response(500.0, ResponseModel::Simplified), Some(0.0));
    }

    #[test]
    fn exact_model_matches_biquad_shapes() {
        let shelf = Stage {
            filter_type: FilterType::LowShelf,
            freq: 200.0,
            gain: Some(6.0),
            q: None,
        };
        let low = shelf.response(20.0, ResponseModel::Exact).unwrap();
        let high = shelf.response(15_000.0, ResponseModel::Exact).unwrap();
        assert!(approx_eq(low, 6.0, 0.2), "low shelf plateau = {}", low);
        assert!(high.abs() < 0.2, "low shelf far above corner = {}", high);

        let lp = Stage {
            filter_type: FilterType::Lowpass,
            freq: 1_000.0,
            gain: None,
            q: Some(DEFAULT_Q_HIGH_LOW_PASS),
        };
        let at_cutoff = lp.response(1_000.0, ResponseModel::Exact).unwrap();
        assert!(approx_eq(at_cutoff, -3.01, 0.05), "butterworth -3 dB point = {}", at_cutoff);
    }

    #[test]
    fn test_biquad_np_log_result_is_finite() {
        let bq = Biquad::new(FilterType::Peaking, 1_000.0, REFERENCE_SRATE, 1.0, 6.0);
        let freqs = array![20.0, 100.0, 1_000.0, 10_000.0, 20_000.0];
        let resp = bq.np_log_result(&freqs);
        for (i, v) in resp.iter().enumerate() {
            assert!(v.is_finite(), "response at idx {} not finite: {}", i, v);
        }
    }

    #[test]
    fn compute_stages_response_sums_complete_stages() {
        let freqs = array![50.0, 100.0, 1_000.0];
        let stages = [
            Stage {
                filter_type: FilterType::LowShelf,
                freq: 100.0,
                gain: Some(3.0),
                q: None,
            },
            Stage {
                filter_type: FilterType::HighShelf,
                freq: 1_000.0,
                gain: None,
                q: None,
            },
        ];
        let resp = compute_stages_response(&freqs, &stages, ResponseModel::Simplified);
        assert!(approx_eq(resp[0], 3.0, 1e-12));
        assert!(approx_eq(resp[1], 3.0, 1e-12));
        assert!(approx_eq(resp[2], 0.03, 1e-12));
    }
}

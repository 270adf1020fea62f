use crate::am::carrier_at;
use crate::config::ModemConfig;
use crate::error::{AmModemError, Result};
use crate::BITS_PER_SYMBOL;
use std::f64::consts::PI;

/// Energy sum below which a window is considered to carry neither tone
const MIN_TONE_ENERGY: f64 = 1e-12;

/// Per-window decision statistic used by the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Discriminator {
    /// Coherent envelope detection followed by Goertzel energy at both
    /// sub-carriers. The statistic is the energy-weighted frequency estimate
    /// in Hz.
    #[default]
    Envelope,
    /// Plain mean of the window samples (legacy statistic).
    ///
    /// The mean of an AM waveform does not depend on the sub-carrier
    /// frequency, so this cannot tell the two tones apart.
    MeanAmplitude,
}

/// Outcome of demodulating one bit window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowDecision {
    /// Bit index inside the byte, 0 being the least-significant bit
    pub index: usize,
    /// Value compared against the threshold
    pub statistic: f64,
    pub bit: bool,
}

/// Assemble 8 bit decisions into a byte, index 0 being the least-significant bit
pub fn bits_to_byte(bits: &[bool; BITS_PER_SYMBOL]) -> u8 {
    bits.iter()
        .enumerate()
        .fold(0u8, |byte, (i, &bit)| if bit { byte | (1 << i) } else { byte })
}

/// Goertzel power at an arbitrary frequency
///
/// Uses the exact angular frequency rather than the nearest DFT bin so that
/// tones which do not complete an integer number of cycles in the window are
/// still measured at the right place.
fn tone_power(samples: &[f64], frequency: f64, sample_rate: f64) -> f64 {
    let omega = 2.0 * PI * frequency / sample_rate;
    let coeff = 2.0 * omega.cos();

    let mut q1 = 0.0;
    let mut q2 = 0.0;
    for &sample in samples {
        let q0 = coeff * q1 - q2 + sample;
        q2 = q1;
        q1 = q0;
    }

    (q1 * q1 + q2 * q2 - coeff * q1 * q2).max(0.0)
}

/// Decoder recovering one byte from an AM symbol waveform
///
/// The waveform is split into 8 windows of `samples_per_bit` samples. Each
/// window yields a statistic that is compared against the midpoint of the two
/// sub-carrier frequencies.
#[derive(Debug, Clone)]
pub struct Decoder {
    config: ModemConfig,
    discriminator: Discriminator,
}

impl Decoder {
    pub fn new(config: ModemConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            discriminator: Discriminator::default(),
        })
    }

    pub fn with_discriminator(config: ModemConfig, discriminator: Discriminator) -> Result<Self> {
        let mut decoder = Self::new(config)?;
        decoder.discriminator = discriminator;
        Ok(decoder)
    }

    pub fn config(&self) -> &ModemConfig {
        &self.config
    }

    pub fn discriminator(&self) -> Discriminator {
        self.discriminator
    }

    /// Decode a symbol waveform back to the byte it carries
    pub fn decode(&self, samples: &[f64]) -> Result<u8> {
        let mut bits = [false; BITS_PER_SYMBOL];
        for decision in self.decide_windows(samples)? {
            bits[decision.index] = decision.bit;
        }
        Ok(bits_to_byte(&bits))
    }

    /// Run the per-window decision over a full symbol waveform
    ///
    /// `samples.len()` must be exactly `8 * samples_per_bit`; anything else is
    /// rejected rather than decoded partially.
    pub fn decide_windows(&self, samples: &[f64]) -> Result<Vec<WindowDecision>> {
        let expected = self.config.symbol_samples();
        if samples.len() != expected {
            return Err(AmModemError::InvalidInputLength {
                expected,
                actual: samples.len(),
            });
        }

        let threshold = self.config.decision_threshold();
        let decisions = samples
            .chunks_exact(self.config.samples_per_bit())
            .enumerate()
            .map(|(index, window)| {
                let (statistic, bit) = match self.discriminator {
                    Discriminator::Envelope => {
                        let estimate = self.estimate_subcarrier(window, index);
                        let bit = if self.config.freq1 > self.config.freq0 {
                            estimate > threshold
                        } else {
                            estimate < threshold
                        };
                        (estimate, bit)
                    }
                    Discriminator::MeanAmplitude => {
                        let avg = window.iter().sum::<f64>() / window.len() as f64;
                        (avg, avg > threshold)
                    }
                };
                log::debug!(
                    "window {}: statistic {:.3} vs threshold {:.3} -> {}",
                    index,
                    statistic,
                    threshold,
                    bit as u8
                );
                WindowDecision {
                    index,
                    statistic,
                    bit,
                }
            })
            .collect();

        Ok(decisions)
    }

    /// Energy-weighted estimate of which sub-carrier modulates this window
    fn estimate_subcarrier(&self, window: &[f64], index: usize) -> f64 {
        let ModemConfig {
            carrier_frequency,
            freq0,
            freq1,
            sample_rate,
            ..
        } = self.config;

        // Mixing with the carrier moves the envelope back to baseband
        let mut baseband: Vec<f64> = window
            .iter()
            .enumerate()
            .map(|(i, &sample)| sample * carrier_at(i, carrier_frequency, sample_rate))
            .collect();

        // Remove the cos² DC term so it does not leak into the sub-carrier bins
        // when the window holds a fractional number of cycles
        let mean = baseband.iter().sum::<f64>() / baseband.len() as f64;
        for sample in baseband.iter_mut() {
            *sample -= mean;
        }

        let energy0 = tone_power(&baseband, freq0, sample_rate);
        let energy1 = tone_power(&baseband, freq1, sample_rate);
        let total = energy0 + energy1;

        if !total.is_finite() {
            log::warn!("window {} contains non-finite samples", index);
            return self.config.decision_threshold();
        }
        if total < MIN_TONE_ENERGY {
            log::warn!("window {} carries no energy at either sub-carrier", index);
            return self.config.decision_threshold();
        }

        (energy0 * freq0 + energy1 * freq1) / total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::Encoder;

    fn small_config() -> ModemConfig {
        ModemConfig {
            carrier_frequency: 10_000.0,
            freq0: 100.0,
            freq1: 200.0,
            sample_rate: 48_000.0,
            bit_duration: 0.02,
            modulation_index: 0.5,
            ..ModemConfig::default()
        }
    }

    #[test]
    fn test_bits_to_byte_lsb_first() {
        let mut bits = [false; 8];
        bits[0] = true;
        assert_eq!(bits_to_byte(&bits), 0x01);

        let mut bits = [false; 8];
        bits[7] = true;
        assert_eq!(bits_to_byte(&bits), 0x80);

        assert_eq!(bits_to_byte(&[true; 8]), 0xFF);
    }

    #[test]
    fn test_tone_power_peaks_at_tone() {
        let sample_rate = 8000.0;
        let samples: Vec<f64> = (0..800)
            .map(|i| (2.0 * PI * 500.0 * i as f64 / sample_rate).sin())
            .collect();

        let on_tone = tone_power(&samples, 500.0, sample_rate);
        let off_tone = tone_power(&samples, 1000.0, sample_rate);
        assert!(
            on_tone > off_tone * 1000.0,
            "on_tone={} off_tone={}",
            on_tone,
            off_tone
        );
    }

    #[test]
    fn test_roundtrip_all_bytes_small_config() {
        let encoder = Encoder::new(small_config()).unwrap();
        let decoder = Decoder::new(small_config()).unwrap();

        for byte in 0..=255u8 {
            let samples = encoder.encode(byte);
            let decoded = decoder.decode(&samples).unwrap();
            assert_eq!(decoded, byte, "Failed roundtrip for {:#04X}", byte);
        }
    }

    #[test]
    fn test_roundtrip_with_swapped_subcarriers() {
        let config = ModemConfig {
            freq0: 200.0,
            freq1: 100.0,
            ..small_config()
        };
        let encoder = Encoder::new(config).unwrap();
        let decoder = Decoder::new(config).unwrap();

        for byte in [0x00, 0x01, 0x41, 0xA5, 0xFF] {
            assert_eq!(decoder.decode(&encoder.encode(byte)).unwrap(), byte);
        }
    }

    #[test]
    fn test_envelope_statistic_near_subcarrier() {
        let config = small_config();
        let encoder = Encoder::new(config).unwrap();
        let decoder = Decoder::new(config).unwrap();

        let decisions = decoder.decide_windows(&encoder.encode(0x0F)).unwrap();
        assert_eq!(decisions.len(), 8);
        for decision in &decisions {
            let expected = if decision.index < 4 { 200.0 } else { 100.0 };
            assert!(
                (decision.statistic - expected).abs() < 5.0,
                "window {} estimated {} Hz",
                decision.index,
                decision.statistic
            );
        }
    }

    #[test]
    fn test_silent_windows_decode_as_zero() {
        let config = small_config();
        let decoder = Decoder::new(config).unwrap();
        let silence = vec![0.0; config.symbol_samples()];

        let decisions = decoder.decide_windows(&silence).unwrap();
        for decision in decisions {
            assert_eq!(decision.statistic, config.decision_threshold());
            assert!(!decision.bit);
        }
        assert_eq!(decoder.decode(&silence).unwrap(), 0x00);
    }

    #[test]
    fn test_non_finite_window_decodes_as_zero() {
        let config = small_config();
        let encoder = Encoder::new(config).unwrap();
        let decoder = Decoder::new(config).unwrap();
        let spb = config.samples_per_bit();

        let mut samples = encoder.encode(0xFF);
        samples[3 * spb + 17] = f64::NAN;
        samples[5 * spb] = f64::INFINITY;

        let decisions = decoder.decide_windows(&samples).unwrap();
        for decision in &decisions {
            if decision.index == 3 || decision.index == 5 {
                assert_eq!(decision.statistic, config.decision_threshold());
                assert!(!decision.bit);
            } else {
                assert!(decision.bit, "window {} lost its bit", decision.index);
            }
        }
        assert_eq!(decoder.decode(&samples).unwrap(), 0xD7);
    }

    #[test]
    fn test_mean_amplitude_does_not_discriminate() {
        let config = small_config();
        let encoder = Encoder::new(config).unwrap();
        let decoder = Decoder::with_discriminator(config, Discriminator::MeanAmplitude).unwrap();
        assert_eq!(decoder.discriminator(), Discriminator::MeanAmplitude);

        for byte in [0x00, 0x41, 0xFF] {
            let decoded = decoder.decode(&encoder.encode(byte)).unwrap();
            assert_eq!(decoded, 0x00);
        }
    }

    #[test]
    fn test_mean_amplitude_thresholds_raw_mean() {
        let config = small_config();
        let decoder = Decoder::with_discriminator(config, Discriminator::MeanAmplitude).unwrap();
        let spb = config.samples_per_bit();

        // Only window 2 sits above the 150 threshold
        let mut samples = vec![0.0; config.symbol_samples()];
        for s in &mut samples[2 * spb..3 * spb] {
            *s = 151.0;
        }
        assert_eq!(decoder.decode(&samples).unwrap(), 0x04);
    }

    #[test]
    fn test_decode_length_validation() {
        let config = small_config();
        let decoder = Decoder::new(config).unwrap();
        let spb = config.samples_per_bit();

        assert_eq!(
            decoder.decode(&[]),
            Err(AmModemError::InvalidInputLength {
                expected: 8 * spb,
                actual: 0
            })
        );

        // Not a multiple of the window
        assert!(decoder.decode(&vec![0.0; 8 * spb - 1]).is_err());
        assert!(decoder.decode(&vec![0.0; 8 * spb + 100]).is_err());

        // Whole windows, wrong count
        assert!(decoder.decode(&vec![0.0; 7 * spb]).is_err());
        assert!(decoder.decode(&vec![0.0; 16 * spb]).is_err());
    }

    #[test]
    fn test_new_rejects_equal_subcarriers() {
        let config = ModemConfig {
            freq1: 100.0,
            ..small_config()
        };
        assert!(matches!(
            Decoder::new(config),
            Err(AmModemError::InvalidConfig(_))
        ));
    }
}

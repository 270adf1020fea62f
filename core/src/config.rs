use crate::error::{AmModemError, Result};
use crate::{
    BITS_PER_SYMBOL, BIT_DURATION, CARRIER_FREQUENCY, FREQ_0, FREQ_1, MAX_SAMPLES_PER_BIT,
    MODULATION_INDEX, SAMPLE_RATE, SINGULARITY_THRESHOLD,
};

/// Parameters shared by the encoder and the decoder.
///
/// Both sides must be built from the same value: the window length used by the
/// decoder is derived from `sample_rate * bit_duration`, so any disagreement
/// misaligns every bit after the first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModemConfig {
    /// Carrier frequency in Hz
    pub carrier_frequency: f64,
    /// Sub-carrier tone for a 0 bit in Hz
    pub freq0: f64,
    /// Sub-carrier tone for a 1 bit in Hz
    pub freq1: f64,
    /// Sample rate in Hz
    pub sample_rate: f64,
    /// Duration of one bit in seconds
    pub bit_duration: f64,
    /// AM modulation depth
    pub modulation_index: f64,
    /// Carrier magnitude below which envelope recovery is treated as singular
    pub singularity_threshold: f64,
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            carrier_frequency: CARRIER_FREQUENCY,
            freq0: FREQ_0,
            freq1: FREQ_1,
            sample_rate: SAMPLE_RATE,
            bit_duration: BIT_DURATION,
            modulation_index: MODULATION_INDEX,
            singularity_threshold: SINGULARITY_THRESHOLD,
        }
    }
}

impl ModemConfig {
    /// Number of samples in one bit window: `round(sample_rate * bit_duration)`
    pub fn samples_per_bit(&self) -> usize {
        (self.sample_rate * self.bit_duration).round() as usize
    }

    /// Number of samples in a full 8-bit symbol
    ///
    /// Saturates instead of overflowing for configurations that `validate`
    /// would reject.
    pub fn symbol_samples(&self) -> usize {
        self.samples_per_bit().saturating_mul(BITS_PER_SYMBOL)
    }

    /// Midpoint between the two sub-carrier tones, used as the bit threshold
    pub fn decision_threshold(&self) -> f64 {
        (self.freq0 + self.freq1) / 2.0
    }

    /// Check every parameter, failing on the first one that makes encoding or
    /// decoding meaningless.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("carrier_frequency", self.carrier_frequency),
            ("freq0", self.freq0),
            ("freq1", self.freq1),
            ("sample_rate", self.sample_rate),
            ("bit_duration", self.bit_duration),
            ("modulation_index", self.modulation_index),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(AmModemError::InvalidConfig(format!(
                    "{} must be a positive finite number, got {}",
                    name, value
                )));
            }
        }

        if !self.singularity_threshold.is_finite() || self.singularity_threshold < 0.0 {
            return Err(AmModemError::InvalidConfig(format!(
                "singularity_threshold must be a non-negative finite number, got {}",
                self.singularity_threshold
            )));
        }

        if self.freq0 == self.freq1 {
            return Err(AmModemError::InvalidConfig(format!(
                "freq0 and freq1 must differ, both are {}",
                self.freq0
            )));
        }

        // Checked in f64 before anything is cast to usize
        let samples = (self.sample_rate * self.bit_duration).round();
        if samples < 1.0 {
            return Err(AmModemError::InvalidConfig(format!(
                "sample_rate * bit_duration rounds to zero samples per bit ({} * {})",
                self.sample_rate, self.bit_duration
            )));
        }
        if !samples.is_finite() || samples > MAX_SAMPLES_PER_BIT as f64 {
            return Err(AmModemError::InvalidConfig(format!(
                "sample_rate * bit_duration ({} * {}) exceeds the {} samples per bit limit",
                self.sample_rate, self.bit_duration, MAX_SAMPLES_PER_BIT
            )));
        }

        let nyquist = self.sample_rate / 2.0;
        for (name, freq) in [
            ("carrier_frequency", self.carrier_frequency),
            ("freq0", self.freq0),
            ("freq1", self.freq1),
        ] {
            if freq >= nyquist {
                log::warn!(
                    "{} {} Hz is at or above Nyquist ({} Hz) and will alias",
                    name,
                    freq,
                    nyquist
                );
            }
        }

        Ok(())
    }
}

use crate::config::ModemConfig;
use crate::error::Result;
use std::f64::consts::PI;

// Double-sideband AM with a sub-carrier tone as the modulating signal:
//
//   sample[i] = (1 + m * sin(2π f_sub t)) * cos(2π f_c t),  t = i / sample_rate
//
// The time index restarts at zero for every bit, so any consumer that needs
// the carrier again must use the sample's position inside its own bit window.

/// Carrier value at a given sample index within a bit window.
///
/// Every use site calls this directly instead of keeping a carrier value
/// around from another loop.
pub fn carrier_at(sample_index: usize, carrier_frequency: f64, sample_rate: f64) -> f64 {
    let t = sample_index as f64 / sample_rate;
    (2.0 * PI * carrier_frequency * t).cos()
}

/// Modulating tone value at a given sample index within a bit window
pub fn modulating_at(sample_index: usize, subcarrier_frequency: f64, sample_rate: f64) -> f64 {
    let t = sample_index as f64 / sample_rate;
    (2.0 * PI * subcarrier_frequency * t).sin()
}

/// AM bit synthesizer
///
/// Produces one bit window of `samples_per_bit` samples for the chosen
/// sub-carrier. Output is neither normalized nor clipped: peaks reach
/// `1 + modulation_index`.
#[derive(Debug, Clone)]
pub struct AmModulator {
    config: ModemConfig,
}

impl AmModulator {
    pub fn new(config: ModemConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ModemConfig {
        &self.config
    }

    /// Sub-carrier frequency representing `bit`
    pub fn subcarrier_for(&self, bit: bool) -> f64 {
        if bit {
            self.config.freq1
        } else {
            self.config.freq0
        }
    }

    /// Synthesize one bit window modulated by `subcarrier_frequency`
    pub fn modulate_bit(&self, subcarrier_frequency: f64) -> Vec<f64> {
        let ModemConfig {
            carrier_frequency,
            sample_rate,
            modulation_index,
            ..
        } = self.config;

        (0..self.config.samples_per_bit())
            .map(|i| {
                let modulating = modulating_at(i, subcarrier_frequency, sample_rate);
                let carrier = carrier_at(i, carrier_frequency, sample_rate);
                (1.0 + modulation_index * modulating) * carrier
            })
            .collect()
    }
}

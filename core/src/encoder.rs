use crate::am::{carrier_at, AmModulator};
use crate::config::ModemConfig;
use crate::error::{AmModemError, Result};
use crate::BITS_PER_SYMBOL;

/// How the modulating tone is pulled back out of a modulated waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryMode {
    /// `(sample / carrier - 1) / modulation_index`, yields the unit sub-carrier tone
    #[default]
    Normalized,
    /// `sample / carrier - 1 / modulation_index`, the legacy offset form; the
    /// result is the tone scaled by the index and shifted by `1 - 1 / index`
    Offset,
}

/// Diagnostic modulating signal recovered from a symbol waveform
///
/// Samples taken where the carrier is too close to zero to divide by are
/// stored as NaN and their indices are listed in `singular_indices`.
#[derive(Debug, Clone, Default)]
pub struct ModulatingTrace {
    pub samples: Vec<f64>,
    pub singular_indices: Vec<usize>,
}

impl ModulatingTrace {
    /// True when no sample hit a carrier zero-crossing
    pub fn is_clean(&self) -> bool {
        self.singular_indices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Split a byte into its 8 bits, index 0 being the least-significant bit
pub fn byte_to_bits(byte: u8) -> [bool; BITS_PER_SYMBOL] {
    let mut bits = [false; BITS_PER_SYMBOL];
    for (i, bit) in bits.iter_mut().enumerate() {
        *bit = (byte >> i) & 1 == 1;
    }
    bits
}

/// Encoder producing one AM symbol per byte
///
/// Each of the 8 bits (LSB first) becomes one bit window whose envelope is
/// modulated by `freq1` for a 1 and `freq0` for a 0. The windows are laid out
/// back to back, each with its own time origin.
#[derive(Debug, Clone)]
pub struct Encoder {
    am: AmModulator,
    recovery: RecoveryMode,
}

impl Encoder {
    pub fn new(config: ModemConfig) -> Result<Self> {
        Ok(Self {
            am: AmModulator::new(config)?,
            recovery: RecoveryMode::default(),
        })
    }

    pub fn config(&self) -> &ModemConfig {
        self.am.config()
    }

    pub fn recovery_mode(&self) -> RecoveryMode {
        self.recovery
    }

    pub fn set_recovery_mode(&mut self, mode: RecoveryMode) {
        self.recovery = mode;
    }

    /// Encode one byte into a symbol waveform of `8 * samples_per_bit` samples
    pub fn encode(&self, byte: u8) -> Vec<f64> {
        let mut samples = Vec::with_capacity(self.config().symbol_samples());

        for (i, bit) in byte_to_bits(byte).into_iter().enumerate() {
            let subcarrier = self.am.subcarrier_for(bit);
            log::debug!("bit {}: {} -> {} Hz sub-carrier", i, bit as u8, subcarrier);
            samples.extend(self.am.modulate_bit(subcarrier));
        }

        samples
    }

    /// Encode a byte and return only the recovered modulating signal
    pub fn modulating_signal(&self, byte: u8) -> ModulatingTrace {
        let samples = self.encode(byte);
        // Length is exact by construction
        self.recover(&samples)
    }

    /// Recover the modulating signal from a symbol waveform
    ///
    /// The carrier is recomputed for every sample at its position inside its
    /// own bit window, matching the time index used during synthesis.
    pub fn recover_modulating(&self, samples: &[f64]) -> Result<ModulatingTrace> {
        let expected = self.config().symbol_samples();
        if samples.len() != expected {
            return Err(AmModemError::InvalidInputLength {
                expected,
                actual: samples.len(),
            });
        }
        Ok(self.recover(samples))
    }

    fn recover(&self, samples: &[f64]) -> ModulatingTrace {
        let config = self.config();
        let samples_per_bit = config.samples_per_bit();
        let mut trace = ModulatingTrace {
            samples: Vec::with_capacity(samples.len()),
            singular_indices: Vec::new(),
        };

        for (index, &sample) in samples.iter().enumerate() {
            let carrier = carrier_at(
                index % samples_per_bit,
                config.carrier_frequency,
                config.sample_rate,
            );

            if carrier.abs() < config.singularity_threshold {
                trace.samples.push(f64::NAN);
                trace.singular_indices.push(index);
                continue;
            }

            let ratio = sample / carrier;
            let value = match self.recovery {
                RecoveryMode::Normalized => (ratio - 1.0) / config.modulation_index,
                RecoveryMode::Offset => ratio - 1.0 / config.modulation_index,
            };
            trace.samples.push(value);
        }

        if !trace.is_clean() {
            log::warn!(
                "{} of {} samples fall on a carrier zero-crossing (|cos| < {}); reported as NaN",
                trace.singular_indices.len(),
                trace.samples.len(),
                config.singularity_threshold
            );
        }

        trace
    }
}

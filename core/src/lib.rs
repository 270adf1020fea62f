//! Single-byte AM modem
//!
//! Each bit of a byte is sent as one window of a double-sideband AM carrier
//! whose envelope is modulated by one of two sub-carrier tones. The decoder
//! splits the waveform back into 8 windows and decides each bit against the
//! midpoint of the two sub-carrier frequencies.

pub mod am;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;

pub use am::{carrier_at, modulating_at, AmModulator};
pub use config::ModemConfig;
pub use decoder::{bits_to_byte, Decoder, Discriminator, WindowDecision};
pub use encoder::{byte_to_bits, Encoder, ModulatingTrace, RecoveryMode};
pub use error::{AmModemError, Result};

// Default signal parameters
pub const CARRIER_FREQUENCY: f64 = 1_000_000.0; // Hz
pub const FREQ_0: f64 = 1_000.0; // Hz, sub-carrier for a 0 bit
pub const FREQ_1: f64 = 2_000.0; // Hz, sub-carrier for a 1 bit
pub const SAMPLE_RATE: f64 = 5_000_000.0; // Hz
pub const BIT_DURATION: f64 = 0.01; // seconds
pub const MODULATION_INDEX: f64 = 0.5;

/// Bits carried by one symbol
pub const BITS_PER_SYMBOL: usize = 8;

/// Carrier magnitude under which envelope recovery reports NaN
pub const SINGULARITY_THRESHOLD: f64 = 1e-3;

/// Largest bit window accepted by `ModemConfig::validate`
pub const MAX_SAMPLES_PER_BIT: usize = 100_000_000;

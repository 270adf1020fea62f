mod config;
mod error;

use amchar_core::{Decoder, Discriminator, Encoder, ModemConfig, RecoveryMode};
use clap::{Parser, ValueEnum};
use config::ConfigFile;
use error::CliError;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "amchar")]
#[command(about = "Encode one character as an AM waveform and decode it back")]
struct Cli {
    /// Character to send (must fit in one byte)
    #[arg(short, long, default_value = "A", conflicts_with = "byte")]
    char: char,

    /// Raw byte value to send instead of a character
    #[arg(short, long)]
    byte: Option<u8>,

    /// JSON file with signal parameters (camelCase keys)
    #[arg(long, value_name = "CONFIG.JSON")]
    config: Option<PathBuf>,

    /// Carrier frequency in Hz
    #[arg(long)]
    carrier_frequency: Option<f64>,

    /// Sub-carrier frequency for a 0 bit in Hz
    #[arg(long)]
    freq0: Option<f64>,

    /// Sub-carrier frequency for a 1 bit in Hz
    #[arg(long)]
    freq1: Option<f64>,

    /// Sample rate in Hz
    #[arg(long)]
    sample_rate: Option<f64>,

    /// Bit duration in seconds
    #[arg(long)]
    bit_duration: Option<f64>,

    /// AM modulation index
    #[arg(long)]
    modulation_index: Option<f64>,

    /// Per-bit decision statistic
    #[arg(long, value_enum, default_value_t = DiscriminatorArg::Envelope)]
    discriminator: DiscriminatorArg,

    /// Formula used for the printed modulating signal
    #[arg(long, value_enum, default_value_t = RecoveryArg::Normalized)]
    recovery: RecoveryArg,

    /// Number of modulating samples to print
    #[arg(long, default_value = "10")]
    preview: usize,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DiscriminatorArg {
    /// Coherent envelope detection with Goertzel tone energy
    Envelope,
    /// Window mean, legacy statistic (does not separate the tones)
    MeanAmplitude,
}

impl From<DiscriminatorArg> for Discriminator {
    fn from(arg: DiscriminatorArg) -> Self {
        match arg {
            DiscriminatorArg::Envelope => Discriminator::Envelope,
            DiscriminatorArg::MeanAmplitude => Discriminator::MeanAmplitude,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RecoveryArg {
    /// (sample / carrier - 1) / modulation_index
    Normalized,
    /// sample / carrier - 1 / modulation_index
    Offset,
}

impl From<RecoveryArg> for RecoveryMode {
    fn from(arg: RecoveryArg) -> Self {
        match arg {
            RecoveryArg::Normalized => RecoveryMode::Normalized,
            RecoveryArg::Offset => RecoveryMode::Offset,
        }
    }
}

impl Cli {
    fn input_byte(&self) -> Result<u8, CliError> {
        match self.byte {
            Some(byte) => Ok(byte),
            None => u8::try_from(self.char).map_err(|_| CliError::CharOutOfRange(self.char)),
        }
    }

    /// Defaults, then the config file, then individual flags
    fn modem_config(&self) -> Result<ModemConfig, CliError> {
        let mut config = ModemConfig::default();
        if let Some(path) = &self.config {
            config = ConfigFile::load(path)?.apply(config);
            log::info!("Loaded signal parameters from {}", path.display());
        }

        let overrides = ConfigFile {
            carrier_frequency: self.carrier_frequency,
            freq0: self.freq0,
            freq1: self.freq1,
            sample_rate: self.sample_rate,
            bit_duration: self.bit_duration,
            modulation_index: self.modulation_index,
            singularity_threshold: None,
        };
        Ok(overrides.apply(config))
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let byte = cli.input_byte()?;
    let config = cli.modem_config()?;
    log::debug!("Signal parameters: {:?}", config);

    let mut encoder = Encoder::new(config)?;
    encoder.set_recovery_mode(cli.recovery.into());
    let decoder = Decoder::with_discriminator(config, cli.discriminator.into())?;

    let samples = encoder.encode(byte);
    log::info!("Encoded {:#04X} to {} samples", byte, samples.len());

    let trace = encoder.recover_modulating(&samples)?;
    println!(
        "Modulating signal for byte {} (first {} samples):",
        describe(byte),
        cli.preview.min(trace.len())
    );
    let preview: Vec<String> = trace
        .samples
        .iter()
        .take(cli.preview)
        .map(|s| s.to_string())
        .collect();
    println!("{}", preview.join(" "));
    if !trace.is_clean() {
        println!(
            "{} samples fell on a carrier zero-crossing and are reported as NaN",
            trace.singular_indices.len()
        );
    }

    let recovered = decoder.decode(&samples)?;
    println!("Recovered byte: {}", describe(recovered));

    Ok(())
}

fn describe(byte: u8) -> String {
    if byte.is_ascii_graphic() || byte == b' ' {
        format!("'{}' ({:#04X})", byte as char, byte)
    } else {
        format!("{:#04X}", byte)
    }
}

//! Volux CLI - Signal-Path Inspector
//!
//! Command-line front end for inspecting the volume curves, the EQ's
//! displayed frequency response, and for rendering a test tone through
//! the signal graph to a WAV file.

use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use volux::curve::{self, CurveMode, DEFAULT_CURVE_POINTS};
use volux::eq::{self, EqConfig, DEFAULT_RESPONSE_POINTS};
use volux::platform::OfflinePlatform;
use volux::session::AudioSession;
use volux::transport::SilentTransport;
use volux::{Result, VoluxError};

#[derive(Parser)]
#[command(name = "volux-cli", version, about = "Perceptual volume control inspector")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Linear,
    Exponential,
}

impl From<ModeArg> for CurveMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Linear => CurveMode::Linear,
            ModeArg::Exponential => CurveMode::Exponential,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Map a slider position to its output gain
    Gain {
        /// Slider position in [0,1]
        slider: f64,
        #[arg(long, value_enum, default_value_t = ModeArg::Exponential)]
        mode: ModeArg,
    },
    /// Print the chart points for a volume curve
    Curve {
        #[arg(long, value_enum, default_value_t = ModeArg::Exponential)]
        mode: ModeArg,
        #[arg(long, default_value_t = DEFAULT_CURVE_POINTS)]
        points: usize,
    },
    /// Print the equalizer's displayed frequency response
    Response {
        /// Compute with the EQ enabled (disabled shows the flat reference)
        #[arg(long)]
        enabled: bool,
        #[arg(long, default_value_t = DEFAULT_RESPONSE_POINTS)]
        points: usize,
    },
    /// Render a sine tone through the signal graph to a WAV file
    Render {
        /// Output WAV path
        output: PathBuf,
        /// Tone frequency in Hz
        #[arg(long, default_value_t = 440.0)]
        freq: f64,
        /// Duration in seconds
        #[arg(long, default_value_t = 2.0)]
        secs: f64,
        /// Slider position in [0,1]
        #[arg(long, default_value_t = 0.5)]
        slider: f64,
        #[arg(long, value_enum, default_value_t = ModeArg::Exponential)]
        mode: ModeArg,
        /// Route through the equalized path
        #[arg(long)]
        eq: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Gain { slider, mode } => {
            let gain = curve::gain(slider, mode.into())?;
            println!("{gain:.6}");
            Ok(())
        }
        Commands::Curve { mode, points } => {
            println!("position\tgain");
            for (x, gain) in curve::curve_samples(mode.into(), points)? {
                println!("{x:.4}\t{gain:.6}");
            }
            Ok(())
        }
        Commands::Response { enabled, points } => {
            let config = EqConfig {
                enabled,
                ..EqConfig::default()
            };
            println!("frequency_hz\tdb");
            for (freq, db) in eq::frequency_response(&config, points)? {
                println!("{freq:.2}\t{db:+.3}");
            }
            Ok(())
        }
        Commands::Render {
            output,
            freq,
            secs,
            slider,
            mode,
            eq,
        } => render(&output, freq, secs, slider, mode.into(), eq),
    }
}

const RENDER_SAMPLE_RATE: u32 = 48_000;
const RENDER_BLOCK: usize = 512;

fn render(
    output: &PathBuf,
    freq: f64,
    secs: f64,
    slider: f64,
    mode: CurveMode,
    eq: bool,
) -> Result<()> {
    let mut session = AudioSession::new(
        Box::new(SilentTransport::new()),
        Box::new(OfflinePlatform::new(RENDER_SAMPLE_RATE)),
    );
    session.set_curve_mode(mode)?;
    session.set_slider_value(slider)?;
    session.play()?;
    if eq {
        session.toggle_eq()?;
    }
    info!(
        "Rendering {secs:.1}s of {freq:.1} Hz at gain {:.4} ({})",
        session.output_gain(),
        if eq { "equalized" } else { "direct" }
    );

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: RENDER_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer =
        hound::WavWriter::create(output, spec).map_err(|e| VoluxError::Io {
            reason: format!("cannot create {}: {e}", output.display()),
        })?;

    let total = (secs * RENDER_SAMPLE_RATE as f64) as usize;
    let mut block = vec![0.0_f32; RENDER_BLOCK];
    let mut written = 0;
    while written < total {
        let len = RENDER_BLOCK.min(total - written);
        for (i, sample) in block[..len].iter_mut().enumerate() {
            let t = (written + i) as f64 / RENDER_SAMPLE_RATE as f64;
            *sample = (2.0 * std::f64::consts::PI * freq * t).sin() as f32 * 0.5;
        }
        session.process_block(&mut block[..len]);
        for sample in &block[..len] {
            let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer
                .write_sample(value)
                .map_err(|e| VoluxError::Io {
                    reason: format!("write failed: {e}"),
                })?;
        }
        written += len;
    }
    writer.finalize().map_err(|e| VoluxError::Io {
        reason: format!("finalize failed: {e}"),
    })?;
    info!("Wrote {} samples to {}", total, output.display());
    Ok(())
}

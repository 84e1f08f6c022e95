use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use serialmidi::timing::{SystemClock, TimeBarrier};
use serialmidi::{Config, Patch, PlaybackOutcome, Sequencer, SerialSink, Song};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Plays a MIDI file on a synthesizer attached to a serial port",
    after_help = "The serial port name will be something like COM1 on Windows and /dev/ttyS1 on Linux"
)]
struct Args {
    /// Serial port the synthesizer is attached to
    #[arg(required_unless_present = "list_ports")]
    port: Option<String>,

    /// Standard MIDI File to play
    #[arg(required_unless_present = "list_ports")]
    song: Option<PathBuf>,

    /// Patch bank uploaded before playback (exactly 0x1800 bytes)
    patch: Option<PathBuf>,

    /// RON file with serial settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides the configured baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// List the serial ports found on this system and exit
    #[arg(short, long)]
    list_ports: bool,

    /// More output (-v for every sent message, -vv for per-tick progress)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.list_ports {
        for port in serialmidi::available_ports()? {
            println!("{}", port);
        }
        return Ok(());
    }

    let (Some(port), Some(song_path)) = (args.port, args.song) else {
        bail!("a serial port and a MIDI file are required");
    };

    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(baud) = args.baud {
        config.serial.baud_rate = baud;
    }

    // Validate every input before the device sees a single byte.
    let song = Song::load(&song_path)?;
    info!(
        tracks = song.tracks().len(),
        events = song.event_count(),
        ticks_per_beat = song.ticks_per_beat(),
        "loaded {}",
        song_path.display()
    );
    let patch = args.patch.as_deref().map(Patch::load).transpose()?;

    let mut sink = SerialSink::open(&port, &config.serial)?;

    if let Some(patch) = &patch {
        patch.upload(&mut sink).context("uploading patch")?;
        info!("patch uploaded");
    }

    let (stop_tx, stop_rx) = crossbeam::channel::bounded(1);
    ctrlc::set_handler(move || {
        let _ = stop_tx.try_send(());
    })
    .context("installing Ctrl-C handler")?;

    let mut sequencer =
        Sequencer::new(&song, TimeBarrier::new(SystemClock::new())).with_stop_signal(stop_rx);

    info!("Playing MIDI...");
    match sequencer.run(&mut sink)? {
        PlaybackOutcome::Finished { iterations } => info!(iterations, "finished"),
        PlaybackOutcome::Interrupted { tick } => info!(tick, "interrupted"),
    }

    Ok(())
}

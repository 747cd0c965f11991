use anyhow::Result;
use eegscope::{sidecar_event_path, write_event_file, RecordingWriter, VirtualRecordingReader};
use log::info;
use std::env;
use std::path::PathBuf;

struct Config {
    channels: usize,
    duration_s: f64,
    sampling_frequency_hz: f64,
    seed: u64,
    output_file: Option<String>,
    use_brotli: bool,
    write_events: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            channels: 8,
            duration_s: 120.0,
            sampling_frequency_hz: 256.0,
            seed: 42,
            output_file: None,
            use_brotli: false,
            write_events: true,
        }
    }
}

fn next_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str> {
    *i += 1;
    match args.get(*i) {
        Some(value) => Ok(value.as_str()),
        None => anyhow::bail!("{} requires an argument", flag),
    }
}

fn parse_args() -> Result<Config> {
    let args: Vec<String> = env::args().collect();
    let mut config = Config::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-channels" => config.channels = next_value(&args, &mut i, "-channels")?.parse()?,
            "-duration" => config.duration_s = next_value(&args, &mut i, "-duration")?.parse()?,
            "-fs" => config.sampling_frequency_hz = next_value(&args, &mut i, "-fs")?.parse()?,
            "-seed" => config.seed = next_value(&args, &mut i, "-seed")?.parse()?,
            "-out" => config.output_file = Some(next_value(&args, &mut i, "-out")?.to_string()),
            "-brotli" => config.use_brotli = true,
            "-no_events" => config.write_events = false,
            "-h" | "-help" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => log::warn!("unknown argument: {}", other),
        }
        i += 1;
    }

    if config.channels == 0 {
        anyhow::bail!("-channels must be at least 1");
    }
    if !(config.sampling_frequency_hz.is_finite() && config.sampling_frequency_hz > 0.0) {
        anyhow::bail!("-fs must be a positive number");
    }
    if !(config.duration_s.is_finite() && config.duration_s > 0.0) {
        anyhow::bail!("-duration must be a positive number of seconds");
    }

    Ok(config)
}

fn print_help() {
    println!("Synthetic EEG Recording Generator");
    println!("Usage: eegscope-siggen [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -channels <N>          Number of channels (default: 8)");
    println!("  -duration <S>          Duration in seconds (default: 120)");
    println!("  -fs <HZ>               Sampling frequency (default: 256)");
    println!("  -seed <N>              Random seed (default: 42)");
    println!("  -out <FILE>            Output file path (default: synthetic.eegj)");
    println!("  -brotli                Write compressed recording (output: *.eegj.br)");
    println!("  -no_events             Do not write the sidecar .evt file");
    println!("  -h, -help, --help      Show this help message");
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = parse_args()?;

    let output_path = PathBuf::from(config.output_file.clone().unwrap_or_else(|| {
        if config.use_brotli {
            "synthetic.eegj.br".to_string()
        } else {
            "synthetic.eegj".to_string()
        }
    }));

    let reader = VirtualRecordingReader::with_config(
        config.channels,
        config.duration_s,
        config.sampling_frequency_hz,
        config.seed,
    );
    let source = reader.generate()?;

    let mut writer = RecordingWriter::new(&output_path)?;
    writer.write_source(&source)?;
    info!(
        "wrote {} samples x {} channels to {}",
        writer.sample_count(),
        config.channels,
        output_path.display()
    );
    drop(writer);

    if config.write_events {
        if let Some(event_path) = sidecar_event_path(&output_path) {
            let events = reader.generate_events();
            write_event_file(&event_path, &events)?;
            info!("wrote {} events to {}", events.len(), event_path.display());
        }
    }

    Ok(())
}

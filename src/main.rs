use clap::{arg, ArgMatches, Command};
use indicatif::ProgressBar;

use wavecleaner::denoise::BlockDenoiser;
use wavecleaner::error::DenoiseError;
use wavecleaner::profiler::{extract_noise_profile, ProfilerConfig};
use wavecleaner::signal::{generate_signal, SignalType};
use wavecleaner::utils::add_noise;
use wavecleaner::wav::{self, read_wav, save_wav, BlockReader, BlockWriter};
use wavecleaner::wavelet::Wavelet;

mod eval;
use eval::run;

fn main() {
    let matches = Command::new("Audio De-noising CLI")
        .version("0.1")
        .about("Wavelet-shrinkage denoising and noise-profile extraction")
        .subcommand(
            Command::new("denoise")
                .about("De-noise a WAV file block by block (VISU Shrink)")
                .arg(arg!(-i --"input" <FILE> "Input WAV").required(true))
                .arg(arg!(-b --"basis" <BASIS> "Wavelet basis: db4|db8").default_value("db4"))
                .arg(arg!(-o --"out-file" <FILE> "Output WAV path").default_value("denoised.wav")),
        )
        .subcommand(
            Command::new("noise-profile")
                .about("Extract a full-duration noise-only waveform")
                .arg(arg!(-i --"input" <FILE> "Input WAV").required(true))
                .arg(arg!(-w --"window" <SECS> "Window length in seconds").default_value("0.1"))
                .arg(arg!(-p --"percentile" <P> "RMS percentile level").default_value("95"))
                .arg(arg!(-o --"out-file" <FILE> "Output WAV path").default_value("noise.wav")),
        )
        .subcommand(
            Command::new("sig-gen")
                .about("Generate signal and save to WAV")
                .arg(arg!(-t --"type" <TYPE> "Signal type, e.g., white|sine,440.0|chirp,200,800").required(true))
                .arg(arg!(-d --"duration" <DUR> "Duration in seconds").required(true))
                .arg(arg!(-r --"rate" <HZ> "Sample rate in Hz").default_value("44100"))
                .arg(arg!(-o --"out-file" <FILE> "Output WAV path").default_value("output.wav")),
        )
        .subcommand(
            Command::new("mix")
                .about("Mix clean and noise signals")
                .arg(arg!(-c --"clean" <FILE> "Path to clean WAV").required(true))
                .arg(arg!(-n --"noise" <FILE> "Path to noise WAV").required(true))
                .arg(arg!(-l --"noise-level" <VAL> "Noise level multiplier").default_value("1.0"))
                .arg(arg!(-o --"out-file" <FILE> "Output WAV path").default_value("mixed.wav")),
        )
        .subcommand(
            Command::new("eval")
                .about("Run the benchmark harness over test-case directories")
                .arg(arg!(-t --"test-dir" <DIR> "Directory of test cases").default_value("./test"))
                .arg(arg!(-w --"workdir" <DIR> "Output directory").default_value("./workdir")),
        )
        .get_matches();

    let result = match matches.subcommand() {
        Some(("denoise", m)) => handle_denoise(m),
        Some(("noise-profile", m)) => handle_noise_profile(m),
        Some(("sig-gen", m)) => handle_sig_gen(m),
        Some(("mix", m)) => handle_mix(m),
        Some(("eval", m)) => {
            run(
                m.get_one::<String>("test-dir").unwrap(),
                m.get_one::<String>("workdir").unwrap(),
            )
            .unwrap();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command. Use --help.");
            return;
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn parse_wavelet(s: &str) -> Wavelet {
    match s.to_lowercase().as_str() {
        "db4" => Wavelet::Db4,
        "db8" => Wavelet::Db8,
        other => panic!("Unknown basis: {}", other),
    }
}

fn handle_denoise(m: &ArgMatches) -> Result<(), DenoiseError> {
    let input = m.get_one::<String>("input").unwrap();
    let out_file = m.get_one::<String>("out-file").unwrap();
    let wavelet = parse_wavelet(m.get_one::<String>("basis").unwrap());

    let (total_samples, rate) = wav::info(input)?;
    if total_samples == 0 {
        return Err(DenoiseError::Config("input recording is empty".into()));
    }
    let block_samples = (total_samples / 10).max(1);

    let reader = BlockReader::open(input, block_samples)?;
    let bar = ProgressBar::new(reader.block_count() as u64);
    let denoiser = BlockDenoiser::new(wavelet);
    let mut writer = BlockWriter::create(out_file, rate)?;

    for block in reader {
        let block = block?;
        // trailing remainder blocks too short to decompose pass through
        let clean = if denoiser.supports(block.len()) {
            denoiser.denoise_block(&block)?
        } else {
            block
        };
        writer.write_block(&clean)?;
        bar.inc(1);
    }
    writer.finalize()?;
    bar.finish();

    println!("De-noising done -> {}", out_file);
    Ok(())
}

fn handle_noise_profile(m: &ArgMatches) -> Result<(), DenoiseError> {
    let input = m.get_one::<String>("input").unwrap();
    let out_file = m.get_one::<String>("out-file").unwrap();
    let window_secs: f64 = m.get_one::<String>("window").unwrap().parse().unwrap();
    let percentile: f64 = m.get_one::<String>("percentile").unwrap().parse().unwrap();

    let config = ProfilerConfig {
        window_secs,
        percentile,
    };
    extract_noise_profile(input, out_file, config)?;

    println!("Noise profile extracted -> {}", out_file);
    Ok(())
}

fn handle_sig_gen(m: &ArgMatches) -> Result<(), DenoiseError> {
    let sig_type = m.get_one::<String>("type").unwrap();
    let duration: f64 = m.get_one::<String>("duration").unwrap().parse().unwrap();
    let rate: u32 = m.get_one::<String>("rate").unwrap().parse().unwrap();
    let out_file = m.get_one::<String>("out-file").unwrap();

    let st = parse_signal_type(sig_type);
    let len = (duration * f64::from(rate)) as usize;
    let sig = generate_signal(len, st, f64::from(rate));
    save_wav(&sig, rate, out_file)?;

    println!("Generated {}-second {} -> {}", duration, sig_type, out_file);
    Ok(())
}

fn handle_mix(m: &ArgMatches) -> Result<(), DenoiseError> {
    let clean_file = m.get_one::<String>("clean").unwrap();
    let noise_file = m.get_one::<String>("noise").unwrap();
    let noise_level: f64 = m
        .get_one::<String>("noise-level")
        .unwrap()
        .parse()
        .expect("Invalid noise-level");
    let out_file = m.get_one::<String>("out-file").unwrap();

    let (clean, rate) = read_wav(clean_file)?;
    let (noise, _) = read_wav(noise_file)?;
    let sig_len = clean.len().min(noise.len());
    let mixed = add_noise(&clean[..sig_len], &noise[..sig_len], noise_level);
    save_wav(&mixed, rate, out_file)?;

    println!(
        "Mixed {} + {} * {} -> {}",
        clean_file, noise_file, noise_level, out_file
    );
    Ok(())
}

fn parse_signal_type(s: &str) -> SignalType {
    let s = s.to_lowercase();
    if s == "white" {
        SignalType::WhiteNoise
    } else if s.starts_with("sine,") {
        let f = s["sine,".len()..].parse().unwrap();
        SignalType::Sinusoidal(f)
    } else if s.starts_with("chirp,") {
        let parts: Vec<f64> = s["chirp,".len()..]
            .split(',')
            .map(|x| x.parse().unwrap())
            .collect();
        SignalType::Chirp(parts[0], parts[1])
    } else {
        panic!("Unknown type: {}", s)
    }
}

//! Benchmark harness: runs the block denoiser and the noise profiler over
//! test-case directories and records SNR improvement and timing in a CSV.
//!
//! Each case directory holds a `clean*.wav` and a `mixed*.wav` (as produced
//! by the `sig-gen` and `mix` commands).

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use csv::Writer;

use wavecleaner::denoise::BlockDenoiser;
use wavecleaner::error::DenoiseError;
use wavecleaner::profiler::{NoiseProfiler, ProfilerConfig};
use wavecleaner::utils::{snr_improvement, snr_improvement_db};
use wavecleaner::wav::{read_wav, save_wav};
use wavecleaner::wavelet::Wavelet;

/// Helper: find the first file in `case_path` whose stem starts with `prefix`
fn find_file(case_path: &Path, prefix: &str) -> Option<PathBuf> {
    fs::read_dir(case_path)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .find(|path| {
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .map(|s| s.starts_with(prefix))
                .unwrap_or(false)
        })
}

/// Load the mixed and clean WAV signals for a given test case, truncated to a
/// common length.
fn load_case_signals(case_dir: &Path) -> (Vec<f64>, Vec<f64>, u32) {
    let noisy_path =
        find_file(case_dir, "mixed").unwrap_or_else(|| panic!("No 'mixed*.wav' file in {:?}", case_dir));
    let clean_path =
        find_file(case_dir, "clean").unwrap_or_else(|| panic!("No 'clean*.wav' file in {:?}", case_dir));

    let (noisy_signal, rate) = read_wav(noisy_path.to_str().unwrap()).unwrap();
    let (clean_signal, _) = read_wav(clean_path.to_str().unwrap()).unwrap();

    let len = noisy_signal.len().min(clean_signal.len());
    (
        noisy_signal[..len].to_vec(),
        clean_signal[..len].to_vec(),
        rate,
    )
}

/// Denoise an in-memory signal in ~10% blocks, the same split the file
/// streaming path uses.
fn denoise_signal(noisy: &[f64], wavelet: Wavelet) -> Result<Vec<f64>, DenoiseError> {
    let block_samples = (noisy.len() / 10).max(1);
    let denoiser = BlockDenoiser::new(wavelet);
    let mut out = Vec::with_capacity(noisy.len());
    for block in noisy.chunks(block_samples) {
        if denoiser.supports(block.len()) {
            out.extend(denoiser.denoise_block(block)?);
        } else {
            out.extend_from_slice(block);
        }
    }
    Ok(out)
}

/// Run wavelet denoising with each basis for one test case
fn process_denoising(
    case_name: &str,
    noisy: &[f64],
    clean: &[f64],
    rate: u32,
    workdir: &Path,
    csv_writer: &mut Writer<std::fs::File>,
) -> Result<(), Box<dyn Error>> {
    for (wavelet, alg_str) in [(Wavelet::Db4, "Denoise-db4"), (Wavelet::Db8, "Denoise-db8")] {
        let start = Instant::now();
        let denoised = denoise_signal(noisy, wavelet)?;
        let duration_sec = start.elapsed().as_secs_f64();

        let snr_lin = snr_improvement(clean, noisy, &denoised);
        let snr_db = snr_improvement_db(clean, noisy, &denoised);

        let filename = format!("{}_{}.wav", case_name, alg_str.to_lowercase());
        let out_path = workdir.join(&filename);
        save_wav(&denoised, rate, out_path.to_str().unwrap())?;

        csv_writer.write_record(&[
            case_name,
            alg_str,
            &snr_lin.to_string(),
            &snr_db.to_string(),
            &duration_sec.to_string(),
        ])?;
    }

    Ok(())
}

/// Extract the noise profile of the mixed signal for one test case
fn process_noise_profile(
    case_name: &str,
    noisy: &[f64],
    rate: u32,
    workdir: &Path,
    csv_writer: &mut Writer<std::fs::File>,
) -> Result<(), Box<dyn Error>> {
    let start = Instant::now();
    let profiler = NoiseProfiler::new(noisy, rate, ProfilerConfig::default())?;
    let profile = profiler.noise_profile()?;
    let duration_sec = start.elapsed().as_secs_f64();

    let filename = format!("{}_noise_profile.wav", case_name);
    let out_path = workdir.join(&filename);
    save_wav(&profile, rate, out_path.to_str().unwrap())?;

    csv_writer.write_record(&[case_name, "NoiseProfile", "", "", &duration_sec.to_string()])?;

    Ok(())
}

pub fn run(test_dir: &str, workdir: &str) -> Result<(), Box<dyn Error>> {
    let test_dir = Path::new(test_dir);
    let workdir = Path::new(workdir);

    // every subdirectory of the test dir is a case
    let mut cases: Vec<PathBuf> = fs::read_dir(test_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    cases.sort();

    let mut csv_writer = Writer::from_path("results.csv")?;
    csv_writer.write_record(&["case", "algorithm", "snr_linear", "snr_db", "time_sec"])?;

    for case_path in &cases {
        let case_name = case_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("case")
            .to_string();
        println!("Running case {}", case_name);

        let case_out = workdir.join(&case_name);
        fs::create_dir_all(&case_out)?;

        let (noisy_signal, clean_signal, rate) = load_case_signals(case_path);

        process_denoising(
            &case_name,
            &noisy_signal,
            &clean_signal,
            rate,
            &case_out,
            &mut csv_writer,
        )?;

        process_noise_profile(&case_name, &noisy_signal, rate, &case_out, &mut csv_writer)?;
    }

    csv_writer.flush()?;
    println!(
        "All cases completed. Outputs in '{}', SNR results in 'results.csv'.",
        workdir.display()
    );

    Ok(())
}

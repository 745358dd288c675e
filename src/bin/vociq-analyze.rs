//! Command-line frontend: analyze one WAV recording and print the
//! resulting record as JSON on stdout.

use std::fs;
use std::path::PathBuf;

use hound::SampleFormat;
use thiserror::Error;

use vociq::engine::{AnalysisEngine, AnalysisInput, Transcript};
use vociq::{AnalysisError, EngineConfig, logging};

const USAGE: &str = "usage: vociq-analyze <input.wav> [options]

options:
  --transcript <file>     UTF-8 transcript of the recording
  --session-type <name>   caller context echoed into the record
  --topic <name>          caller context echoed into the record
  --log-dir <dir>         also write logs to a timestamped file
  --pretty                pretty-print the JSON output";

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}\n\n{USAGE}")]
    Usage(String),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode wav: {0}")]
    Wav(#[from] hound::Error),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Logging(#[from] logging::LoggingError),
    #[error("failed to serialize record: {0}")]
    Json(#[from] serde_json::Error),
}

struct CliArgs {
    input: PathBuf,
    transcript: Option<PathBuf>,
    session_type: Option<String>,
    topic: Option<String>,
    log_dir: Option<PathBuf>,
    pretty: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let args = parse_args(std::env::args().skip(1).collect())?;
    logging::init(args.log_dir.as_deref())?;

    let (samples, sample_rate) = load_wav(&args.input)?;
    let mut input = AnalysisInput::new(samples, sample_rate);
    input.session_type = args.session_type;
    input.topic = args.topic;
    if let Some(path) = &args.transcript {
        let text = fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.clone(),
            source,
        })?;
        input.transcript = Some(Transcript::from_text(text.trim(), 1.0));
    }

    let engine = AnalysisEngine::new(EngineConfig::default());
    let record = engine.analyze(input)?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&record)?
    } else {
        serde_json::to_string(&record)?
    };
    println!("{json}");
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<CliArgs, CliError> {
    let mut input = None;
    let mut transcript = None;
    let mut session_type = None;
    let mut topic = None;
    let mut log_dir = None;
    let mut pretty = false;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--transcript" => transcript = Some(PathBuf::from(expect_value(&mut iter, &arg)?)),
            "--session-type" => session_type = Some(expect_value(&mut iter, &arg)?),
            "--topic" => topic = Some(expect_value(&mut iter, &arg)?),
            "--log-dir" => log_dir = Some(PathBuf::from(expect_value(&mut iter, &arg)?)),
            "--pretty" => pretty = true,
            "--help" | "-h" => return Err(CliError::Usage(String::new())),
            other if other.starts_with("--") => {
                return Err(CliError::Usage(format!("unknown option {other}")));
            }
            _ if input.is_none() => input = Some(PathBuf::from(arg)),
            other => {
                return Err(CliError::Usage(format!("unexpected argument {other}")));
            }
        }
    }

    let input = input.ok_or_else(|| CliError::Usage("missing input wav".into()))?;
    Ok(CliArgs {
        input,
        transcript,
        session_type,
        topic,
        log_dir,
        pretty,
    })
}

fn expect_value(
    iter: &mut impl Iterator<Item = String>,
    flag: &str,
) -> Result<String, CliError> {
    iter.next()
        .ok_or_else(|| CliError::Usage(format!("{flag} requires a value")))
}

/// Decode a WAV file into mono f32 samples, averaging the channels.
fn load_wav(path: &PathBuf) -> Result<(Vec<f32>, u32), CliError> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = (1i64 << spec.bits_per_sample.saturating_sub(1)).max(1) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    let mono = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };
    Ok((mono, spec.sample_rate))
}

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use dnn_gop::{
    DecodableMatrix, GopConfig, GopError, GopInput, GopScorer, GopScorerBuilder, PhoneId, StateId,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Phones come with per-phone frame counts.
    Segmented,
    /// Phones are a transcript; segmentation comes from forced alignment.
    Aligned,
}

#[derive(Debug, Parser)]
#[command(name = "compute_gop")]
#[command(about = "Compute Goodness of Pronunciation scores from acoustic log-likelihoods")]
struct Args {
    /// Transition model JSON.
    #[arg(long, env = "DNN_GOP_MODEL")]
    model: PathBuf,
    /// Context tree JSON.
    #[arg(long, env = "DNN_GOP_TREE")]
    tree: PathBuf,
    /// Utterances, one JSON object per line.
    #[arg(long)]
    input: PathBuf,
    /// Scores, one JSON object per line.
    #[arg(long)]
    out: PathBuf,
    #[arg(long, value_enum, default_value_t = Mode::Segmented)]
    mode: Mode,
    #[arg(long, default_value_t = GopConfig::DEFAULT_BEAM)]
    beam: f32,
    #[arg(long)]
    max_active: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct Utterance {
    id: String,
    log_likelihoods: Vec<Vec<f32>>,
    phones: Vec<PhoneId>,
    #[serde(default)]
    frame_counts: Option<Vec<usize>>,
}

#[derive(Debug, Serialize)]
struct UtteranceScores {
    id: String,
    phones: Vec<PhoneId>,
    gop: Vec<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_log_likelihoods: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alignment: Option<Vec<StateId>>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    let config = GopConfig {
        model_path: args.model.to_string_lossy().to_string(),
        tree_path: args.tree.to_string_lossy().to_string(),
        beam: args.beam,
        max_active: args.max_active.unwrap_or(usize::MAX),
        ..GopConfig::default()
    };
    let scorer = GopScorerBuilder::new(config)
        .build()
        .map_err(|e| format!("failed to load model: {e}"))?;

    let lines = BufReader::new(
        File::open(&args.input).map_err(|e| format!("open {}: {e}", args.input.display()))?,
    )
    .lines()
    .collect::<Result<Vec<_>, _>>()
    .map_err(|e| format!("read {}: {e}", args.input.display()))?;
    let mut writer = BufWriter::new(
        File::create(&args.out).map_err(|e| format!("create {}: {e}", args.out.display()))?,
    );

    let progress = ProgressBar::new(lines.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    let mut done = 0usize;
    let mut skipped = 0usize;
    for (line_no, line) in lines.iter().enumerate() {
        progress.inc(1);
        if line.trim().is_empty() {
            continue;
        }
        let utt: Utterance = match serde_json::from_str(line) {
            Ok(utt) => utt,
            Err(e) => {
                tracing::warn!(line = line_no + 1, "skipping malformed utterance record: {e}");
                skipped += 1;
                continue;
            }
        };
        progress.set_message(utt.id.clone());
        tracing::info!(utterance = utt.id.as_str(), "processing utterance");

        match score_utterance(&scorer, args.mode, utt) {
            Ok(Some(scores)) => {
                let json = serde_json::to_string(&scores)
                    .map_err(|e| format!("serialize {}: {e}", scores.id))?;
                writeln!(writer, "{json}").map_err(|e| format!("write output: {e}"))?;
                done += 1;
            }
            Ok(None) => skipped += 1,
            Err((id, err)) => {
                tracing::warn!(utterance = id.as_str(), "skipping utterance: {err}");
                skipped += 1;
            }
        }
    }
    progress.finish_and_clear();
    writer.flush().map_err(|e| format!("flush output: {e}"))?;
    tracing::info!(done, skipped, "done");
    Ok(())
}

fn score_utterance(
    scorer: &GopScorer,
    mode: Mode,
    utt: Utterance,
) -> Result<Option<UtteranceScores>, (String, GopError)> {
    let Utterance {
        id,
        log_likelihoods,
        phones,
        frame_counts,
    } = utt;
    let source = DecodableMatrix::new(scorer.model().shared_transitions(), log_likelihoods)
        .map_err(|e| (id.clone(), e))?;

    match mode {
        Mode::Segmented => {
            let Some(frame_counts) = frame_counts else {
                tracing::warn!(utterance = id.as_str(), "can not find alignment for utterance");
                return Ok(None);
            };
            let out = scorer
                .compute(&source, &GopInput { phones, frame_counts })
                .map_err(|e| (id.clone(), e))?;
            Ok(Some(UtteranceScores {
                id,
                phones: out.phones,
                gop: out.scores,
                phone_log_likelihoods: None,
                alignment: None,
            }))
        }
        Mode::Aligned => {
            let out = scorer
                .compute_aligned(&source, &phones)
                .map_err(|e| (id.clone(), e))?;
            Ok(Some(UtteranceScores {
                id,
                phones: out.gop.phones,
                gop: out.gop.scores,
                phone_log_likelihoods: Some(out.phone_log_likelihoods),
                alignment: Some(out.alignment),
            }))
        }
    }
}

//! Transcription application entry point.
//!
//! Orchestrates the complete flow:
//! fetch audio → chunk → recognize → assemble → merge → translate → save

use crate::artifact::Artifact;
use crate::captions::{CaptionReviewer, CaptionSource, ReviewedCaption, YoutubeCaptionSource};
use crate::config::Config;
use crate::defaults;
use crate::error::Result;
use crate::media::download::{extract_video_id, fetch_audio};
use crate::media::executor::SystemCommandExecutor;
use crate::media::extract::FfmpegChunkExtractor;
use crate::media::probe::probe_duration;
use crate::remote::{AnthropicChat, CloudSpeechRecognizer, CloudTranslator};
use crate::transcript::{PipelineOptions, TranscriptionPipeline};
use crate::translate::TranslationStage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// CLI overrides applied on top of the loaded configuration.
#[derive(Debug, Default, Clone)]
pub struct TranscribeOverrides {
    pub target_lang: Option<String>,
    pub no_translate: bool,
    pub chunk_secs: Option<f64>,
    pub overlap_secs: Option<f64>,
    pub max_chunks: Option<usize>,
    pub output_dir: Option<PathBuf>,
}

/// Fold CLI overrides into the configuration.
pub fn apply_overrides(config: &mut Config, overrides: &TranscribeOverrides) {
    if let Some(lang) = &overrides.target_lang {
        config.translate.target_language = lang.clone();
    }
    if overrides.no_translate {
        config.translate.enabled = false;
    }
    if let Some(secs) = overrides.chunk_secs {
        config.audio.chunk_secs = secs;
    }
    if let Some(secs) = overrides.overlap_secs {
        config.audio.overlap_secs = secs;
    }
    if let Some(n) = overrides.max_chunks {
        config.audio.max_chunks = n;
    }
    if let Some(dir) = &overrides.output_dir {
        config.output.dir = dir.clone();
    }
}

/// Run the transcribe command: fetch → chunked recognition → merged,
/// speaker-attributed sentences → artifact.
///
/// # Arguments
/// * `config` - Base configuration (overrides already folded in elsewhere)
/// * `source` - Video URL or local audio file
/// * `deadline` - Optional wall-clock budget for chunk dispatch
/// * `print_json` - Print the artifact JSON to stdout as well
/// * `quiet` - Suppress status messages
/// * `verbosity` - Verbosity level (0=default, 1=per-chunk progress)
pub async fn run_transcribe_command(
    config: Config,
    source: &str,
    deadline: Option<Duration>,
    print_json: bool,
    quiet: bool,
    verbosity: u8,
) -> Result<()> {
    config.validate()?;
    // Fail on missing credentials before any download happens
    config.recognizer_key()?;
    if config.translate.enabled {
        config.translate_key()?;
    }

    let run_dir = config
        .work_dir()
        .join(format!("polysub-{}", std::process::id()));
    std::fs::create_dir_all(&run_dir)?;

    let result = transcribe_source(
        &config, source, &run_dir, deadline, print_json, quiet, verbosity,
    )
    .await;

    // Removes the downloaded audio and any chunk left behind by truncation
    let _ = std::fs::remove_dir_all(&run_dir);
    result
}

async fn transcribe_source(
    config: &Config,
    source: &str,
    run_dir: &Path,
    deadline: Option<Duration>,
    print_json: bool,
    quiet: bool,
    verbosity: u8,
) -> Result<()> {
    let executor = Arc::new(SystemCommandExecutor::new());

    if !quiet {
        eprintln!("Fetching audio for {}...", source);
    }
    let audio_path = fetch_audio(executor.clone(), source, run_dir).await?;

    let total_secs = match probe_duration(executor.clone(), &audio_path).await {
        Ok(secs) => {
            if verbosity > 0 {
                eprintln!("Source duration: {:.1}s", secs);
            }
            Some(secs)
        }
        Err(e) => {
            if !quiet {
                eprintln!(
                    "{}; treating the duration as unknown (cap {} chunks).",
                    e, config.audio.max_chunks
                );
            }
            None
        }
    };

    let recognizer = CloudSpeechRecognizer::new(
        &config.recognizer.endpoint,
        config.recognizer_key()?,
        &config.recognizer.language,
    )?;
    let options = PipelineOptions {
        chunk_secs: config.audio.chunk_secs,
        overlap_secs: config.audio.overlap_secs,
        max_chunks: config.audio.max_chunks,
        max_concurrent: config.recognizer.max_concurrent,
        deadline,
        work_dir: run_dir.to_path_buf(),
        quiet,
        verbose: verbosity,
    };
    let pipeline = TranscriptionPipeline::new(
        Arc::new(FfmpegChunkExtractor::new(executor)),
        Arc::new(recognizer),
        options,
    );

    let mut report = pipeline.run(&audio_path, total_secs).await;

    if !quiet {
        if report.truncated {
            eprintln!("Deadline reached; the transcription is truncated.");
        }
        if !report.failed_chunks.is_empty() {
            eprintln!(
                "{} chunk(s) produced no sentences; see messages above.",
                report.failed_chunks.len()
            );
        }
        if report.sentences.is_empty() {
            eprintln!("No transcribable speech found.");
        }
    }

    if config.translate.enabled && !report.sentences.is_empty() {
        let translator = CloudTranslator::new(&config.translate.endpoint, config.translate_key()?)?;
        let stage = TranslationStage::new(
            Arc::new(translator),
            &config.translate.target_language,
            config.translate.max_concurrent,
            quiet,
        );
        report.translation_failures = stage.apply(&mut report.sentences).await;
        if !quiet && report.translation_failures > 0 {
            eprintln!(
                "{} sentence(s) left untranslated.",
                report.translation_failures
            );
        }
    }

    let video_id =
        extract_video_id(source).unwrap_or_else(|| defaults::UNKNOWN_VIDEO_ID.to_string());
    let sentence_count = report.sentences.len();
    let artifact = Artifact::new(source, report.sentences);

    std::fs::create_dir_all(&config.output.dir)?;
    let path = artifact.save(&config.output.dir, &video_id)?;
    if !quiet {
        eprintln!("{} sentences written to {}", sentence_count, path.display());
    }
    if print_json {
        println!("{}", artifact.to_json()?);
    }
    Ok(())
}

/// Run the captions command: fetch the existing caption track, optionally
/// review it through the chat model.
pub async fn run_captions_command(
    config: Config,
    video: &str,
    review: bool,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let source = YoutubeCaptionSource::new()?;
    run_captions_with_source(&source, config, video, review, json, quiet).await
}

async fn run_captions_with_source(
    source: &dyn CaptionSource,
    config: Config,
    video: &str,
    review: bool,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let video_id = resolve_caption_video_id(video);
    if !quiet {
        eprintln!("Fetching captions for {}...", video_id);
    }
    let captions = source.fetch(&video_id).await?;

    if review {
        let chat = AnthropicChat::new(
            &config.review.endpoint,
            config.review_key()?,
            &config.review.model,
            config.review.max_tokens,
            config.review.temperature,
        )?;
        let reviewer = CaptionReviewer::new(Arc::new(chat), &config.translate.target_language);
        match reviewer.review(&captions).await {
            Ok(reviewed) => {
                print_reviewed(&reviewed, json)?;
                return Ok(());
            }
            Err(e) => {
                // Review is best-effort; fall back to the raw track
                if !quiet {
                    eprintln!("{}; printing the captions unreviewed.", e);
                }
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&captions)?);
    } else {
        for caption in &captions {
            println!("[{:.2}s] {}", caption.offset_secs, caption.text);
        }
    }
    Ok(())
}

fn print_reviewed(reviewed: &[ReviewedCaption], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reviewed)?);
    } else {
        for caption in reviewed {
            println!("[{:.2}s] {}", caption.offset, caption.text);
            println!("         {}", caption.translated);
        }
    }
    Ok(())
}

/// A captions argument can be a bare video id or any URL form.
fn resolve_caption_video_id(arg: &str) -> String {
    extract_video_id(arg).unwrap_or_else(|| arg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captions::{Caption, MockCaptionSource};
    use crate::error::PolysubError;

    #[test]
    fn test_apply_overrides_all_fields() {
        let mut config = Config::default();
        let overrides = TranscribeOverrides {
            target_lang: Some("ja".to_string()),
            no_translate: false,
            chunk_secs: Some(30.0),
            overlap_secs: Some(2.0),
            max_chunks: Some(8),
            output_dir: Some(PathBuf::from("/data/out")),
        };
        apply_overrides(&mut config, &overrides);

        assert_eq!(config.translate.target_language, "ja");
        assert!(config.translate.enabled);
        assert_eq!(config.audio.chunk_secs, 30.0);
        assert_eq!(config.audio.overlap_secs, 2.0);
        assert_eq!(config.audio.max_chunks, 8);
        assert_eq!(config.output.dir, PathBuf::from("/data/out"));
    }

    #[test]
    fn test_apply_overrides_empty_keeps_config() {
        let mut config = Config::default();
        apply_overrides(&mut config, &TranscribeOverrides::default());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_apply_overrides_no_translate_disables() {
        let mut config = Config::default();
        assert!(config.translate.enabled);
        apply_overrides(
            &mut config,
            &TranscribeOverrides {
                no_translate: true,
                ..Default::default()
            },
        );
        assert!(!config.translate.enabled);
    }

    #[test]
    fn test_resolve_caption_video_id_from_url() {
        assert_eq!(
            resolve_caption_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            resolve_caption_video_id("https://youtu.be/dQw4w9WgXcQ"),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_resolve_caption_video_id_bare_id_passes_through() {
        assert_eq!(resolve_caption_video_id("dQw4w9WgXcQ"), "dQw4w9WgXcQ");
    }

    #[tokio::test]
    async fn test_transcribe_rejects_missing_recognizer_key() {
        let config = Config::default();
        let err = run_transcribe_command(config, "video.webm", None, false, true, 0)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("recognizer.api_key"));
    }

    #[tokio::test]
    async fn test_transcribe_rejects_missing_translate_key_when_enabled() {
        let mut config = Config::default();
        config.recognizer.api_key = Some("k".to_string());
        let err = run_transcribe_command(config, "video.webm", None, false, true, 0)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("translate.api_key"));
    }

    #[tokio::test]
    async fn test_captions_fetch_error_propagates() {
        let source = MockCaptionSource::new().with_error("no caption track on watch page");
        let err =
            run_captions_with_source(&source, Config::default(), "dQw4w9WgXcQ", false, false, true)
                .await
                .unwrap_err();
        assert!(matches!(err, PolysubError::CaptionFetch { .. }));
        assert_eq!(source.requests(), vec!["dQw4w9WgXcQ"]);
    }

    #[tokio::test]
    async fn test_captions_prints_fetched_track() {
        let source = MockCaptionSource::new().with_captions(vec![Caption {
            text: "cue".to_string(),
            offset_secs: 0.0,
            duration_secs: 1.0,
        }]);
        run_captions_with_source(&source, Config::default(), "dQw4w9WgXcQ", false, false, true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_captions_review_needs_credential() {
        let source = MockCaptionSource::new().with_captions(vec![Caption {
            text: "cue".to_string(),
            offset_secs: 0.0,
            duration_secs: 1.0,
        }]);
        let err =
            run_captions_with_source(&source, Config::default(), "dQw4w9WgXcQ", true, false, true)
                .await
                .unwrap_err();
        assert!(err.to_string().contains("review.api_key"));
    }
}

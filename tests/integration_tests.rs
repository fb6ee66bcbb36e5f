//! Integration tests: WAV file → analysis → beatmap → gameplay

use beatlane::beatmap::{Difficulty, GameMode};
use beatlane::gameplay::engine::GamePhase;
use beatlane::{
    analyze_audio, analyze_in_background, generate_all_difficulties, generate_beat_map,
    AnalysisConfig, AudioSamples, BeatAnalysis, GameEngine, Grade, Judgment,
};
use std::path::Path;

/// Write a mono 16-bit click track
fn write_click_track(
    path: &Path,
    duration_seconds: f32,
    bpm: f32,
    sample_rate: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;

    let num_samples = (duration_seconds * sample_rate as f32) as usize;
    let interval = (60.0 / bpm * sample_rate as f32) as usize;
    let click_len = (0.02 * sample_rate as f32) as usize;

    for n in 0..num_samples {
        let i = n % interval;
        let value = if i < click_len {
            let decay = (-(i as f32) / click_len as f32 * 5.0).exp();
            decay * if i % 2 == 0 { 0.9 } else { -0.9 }
        } else {
            0.0
        };
        writer.write_sample((value * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Load a WAV file as per-channel samples
fn load_wav(path: &Path) -> Result<AudioSamples, Box<dyn std::error::Error>> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let max_value = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / max_value))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    Ok(AudioSamples::from_interleaved(
        &interleaved,
        spec.channels as usize,
        spec.sample_rate,
    )?)
}

fn analyze_click_track(bpm: f32, seconds: f32) -> (BeatAnalysis, f64) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("click.wav");
    write_click_track(&path, seconds, bpm, 22050).expect("Failed to write click track");

    let samples = load_wav(&path).expect("Failed to read click track");
    let duration = samples.duration_seconds();
    let analysis = analyze_audio(&samples, AnalysisConfig::default()).expect("Analysis should succeed");
    (analysis, duration)
}

#[test]
fn test_click_track_round_trip_through_wav() {
    let (analysis, duration) = analyze_click_track(120.0, 20.0);

    assert!((duration - 20.0).abs() < 0.01, "duration {}", duration);
    assert!(
        (analysis.bpm - 120.0).abs() <= 2.0,
        "BPM should be close to 120, got {:.2}",
        analysis.bpm
    );
    assert!(analysis.beats.len() >= 16, "Only {} beats", analysis.beats.len());
    assert!(analysis.confidence > 0.0 && analysis.confidence <= 1.0);

    let interval = analysis.beat_interval();
    assert!(
        (interval - 0.5).abs() < 0.05,
        "Beat interval should be ~0.5s, got {:.3}",
        interval
    );
    for beat in &analysis.beats {
        assert!(*beat >= 0.0 && *beat <= duration);
    }
}

#[test]
fn test_harder_difficulties_have_more_notes() {
    let (analysis, _) = analyze_click_track(120.0, 20.0);
    let maps = generate_all_difficulties("click", &analysis, GameMode::Classic);

    assert_eq!(maps.len(), 4);
    let counts: Vec<usize> = maps.iter().map(|(_, map)| map.len()).collect();
    for pair in counts.windows(2) {
        assert!(pair[0] <= pair[1], "Note counts should grow with difficulty: {:?}", counts);
    }
    assert!(counts[0] < counts[3]);

    for (_, map) in &maps {
        assert_eq!(map.song_id, "click");
        for pair in map.notes.windows(2) {
            assert!(pair[0].time <= pair[1].time);
        }
    }
}

#[test]
fn test_autoplay_generated_map_scores_perfect() {
    let (analysis, duration) = analyze_click_track(120.0, 20.0);
    let map = generate_beat_map("click", &analysis, GameMode::Classic, Difficulty::Hard);
    assert!(!map.is_empty());

    let mut notes = map.notes.clone();
    notes.sort_by(|a, b| a.time.total_cmp(&b.time));

    let mut engine = GameEngine::new(map, "Click", duration);
    engine.start();

    for note in &notes {
        engine.update(note.time);
        let result = engine
            .handle_input(note.lane, note.time)
            .expect("Autoplay press should always hit");
        assert_eq!(result.judgment, Judgment::Perfect);
    }

    engine.update(duration + 2.0);
    assert_eq!(engine.phase(), GamePhase::Finished);

    let score = engine.finish();
    assert_eq!(score.perfects, notes.len());
    assert_eq!(score.misses, 0);
    assert_eq!(score.accuracy, 100.0);
    assert_eq!(score.grade, Grade::S);
    assert_eq!(score.max_combo as usize, notes.len());

    let json = serde_json::to_string(&score).expect("GameScore should serialize");
    assert!(json.contains("\"grade\":\"S\""));
}

#[test]
fn test_idle_player_misses_everything() {
    let (analysis, duration) = analyze_click_track(120.0, 20.0);
    let map = generate_beat_map("click", &analysis, GameMode::Trackpad, Difficulty::Easy);
    let total = map.len();

    let mut engine = GameEngine::new(map, "Click", duration);
    engine.start();

    let mut t = 0.0;
    while !engine.is_finished() {
        t += 1.0 / 60.0;
        engine.update(t);
    }

    let score = engine.finish();
    assert_eq!(score.misses, total);
    assert_eq!(score.accuracy, 0.0);
    assert_eq!(score.grade, Grade::C);
    assert_eq!(score.score, 0);
}

#[test]
fn test_background_worker_matches_direct_analysis() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("click.wav");
    write_click_track(&path, 12.0, 100.0, 22050).expect("Failed to write click track");
    let samples = load_wav(&path).expect("Failed to read click track");

    let direct = analyze_audio(&samples, AnalysisConfig::default()).expect("Direct analysis");
    let background =
        analyze_in_background(samples, AnalysisConfig::default()).expect("Background analysis");

    assert_eq!(direct, background);
}

#[test]
fn test_beatmap_json_round_trip() {
    let (analysis, _) = analyze_click_track(120.0, 10.0);
    let map = generate_beat_map("click", &analysis, GameMode::Classic, Difficulty::Expert);

    let json = serde_json::to_string(&map).expect("BeatMap should serialize");
    let restored: beatlane::BeatMap =
        serde_json::from_str(&json).expect("BeatMap should deserialize");

    assert_eq!(restored.len(), map.len());
    for (a, b) in restored.notes.iter().zip(&map.notes) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.lane, b.lane);
        assert_eq!(a.kind, b.kind);
        assert!((a.time - b.time).abs() < 1e-9);
        assert_eq!(a.duration.is_some(), b.duration.is_some());
    }
}

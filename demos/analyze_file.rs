//! Example: Analyze an audio file, chart it for every difficulty and autoplay
//! the hard chart
//!
//! ```text
//! cargo run --release --example analyze_file -- song.mp3 [--trackpad] [--json]
//! ```
//!
//! Without a path a synthetic 128 BPM click track is analyzed instead.

use beatlane::analysis::service::BeatAnalysisService;
use beatlane::analysis::worker::AnalysisWorker;
use beatlane::beatmap::{Difficulty, GameMode};
use beatlane::{generate_beat_map, AnalysisConfig, AudioSamples, BeatMap, GameEngine, GameScore};
use rayon::prelude::*;
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decode any container/codec symphonia knows into planar samples
fn decode_audio_file(path: &Path) -> Result<AudioSamples, Box<dyn std::error::Error>> {
    let src = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or("No supported audio tracks found")?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
    let mut channel_count = track.codec_params.channels.map_or(0, |c| c.count());

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut interleaved: Vec<f32> = Vec::new();

    while let Ok(packet) = format.next_packet() {
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = spec.rate;
                channel_count = spec.channels.count();

                let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buf.copy_interleaved_ref(decoded);
                interleaved.extend_from_slice(buf.samples());
            }
            // Corrupt packets are skipped
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(Box::new(e)),
        }
    }

    Ok(AudioSamples::from_interleaved(
        &interleaved,
        channel_count.max(1),
        sample_rate,
    )?)
}

fn synthetic_click_track(bpm: f32, seconds: f32, sample_rate: u32) -> AudioSamples {
    let interval = (60.0 / bpm * sample_rate as f32) as usize;
    let click_len = (0.015 * sample_rate as f32) as usize;
    let samples = (0..(seconds * sample_rate as f32) as usize)
        .map(|n| {
            let i = n % interval;
            if i < click_len {
                (-(i as f32) / click_len as f32 * 6.0).exp() * if i % 2 == 0 { 0.8 } else { -0.8 }
            } else {
                0.0
            }
        })
        .collect();
    AudioSamples::from_mono(samples, sample_rate).expect("Synthetic audio is valid")
}

/// Press every note on time and release every hold at its end
fn autoplay(song_name: &str, map: &BeatMap, song_duration: f64) -> GameScore {
    let mut actions: Vec<(f64, bool, usize)> = Vec::with_capacity(map.len() * 2);
    for (index, note) in map.notes.iter().enumerate() {
        actions.push((note.time, true, index));
        if note.is_hold() {
            actions.push((note.end_time(), false, index));
        }
    }
    actions.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut engine = GameEngine::new(map.clone(), song_name, song_duration);
    engine.start();
    for (time, press, index) in actions {
        let lane = map.notes[index].lane;
        engine.update(time);
        if press {
            engine.handle_input(lane, time);
        } else {
            engine.handle_release(lane, time);
        }
    }
    engine.update(song_duration + 2.0);
    engine.finish()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mode = if args.iter().any(|a| a == "--trackpad") {
        GameMode::Trackpad
    } else {
        GameMode::Classic
    };
    let as_json = args.iter().any(|a| a == "--json");
    let path = args.iter().find(|a| !a.starts_with("--"));

    let (song_id, samples) = match path {
        Some(path) => {
            let path = Path::new(path);
            let id = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("song")
                .to_string();
            (id, decode_audio_file(path)?)
        }
        None => ("click-128".to_string(), synthetic_click_track(128.0, 30.0, 44100)),
    };

    eprintln!(
        "Analyzing '{}': {:.1}s, {} channel(s) at {} Hz",
        song_id,
        samples.duration_seconds(),
        samples.channel_count(),
        samples.sample_rate()
    );

    let duration = samples.duration_seconds();
    let worker = AnalysisWorker::new(BeatAnalysisService::new(AnalysisConfig::default()));
    let analysis = worker.spawn(samples)?.wait_with_progress(&mut |update| {
        eprintln!("  [{:>3}%] {}", update.percent, update.stage.label());
    })?;

    let maps: Vec<(Difficulty, BeatMap)> = Difficulty::ALL
        .par_iter()
        .map(|&difficulty| {
            (
                difficulty,
                generate_beat_map(&song_id, &analysis, mode, difficulty),
            )
        })
        .collect();

    let autoplay_score = maps
        .iter()
        .find(|(difficulty, _)| *difficulty == Difficulty::Hard)
        .map(|(_, map)| autoplay(&song_id, map, duration));

    if as_json {
        let output = serde_json::json!({
            "analysis": analysis,
            "beatmaps": maps.iter().map(|(_, map)| map).collect::<Vec<_>>(),
            "autoplay": autoplay_score,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Analysis Results:");
    println!("  BPM: {:.0} (confidence: {:.2})", analysis.bpm, analysis.confidence);
    println!("  Beats: {}", analysis.beats.len());
    for (difficulty, map) in &maps {
        let holds = map.notes.iter().filter(|n| n.is_hold()).count();
        println!("  {:<7} {:>5} notes ({} holds)", difficulty.name(), map.len(), holds);
    }
    if let Some(score) = autoplay_score {
        println!(
            "Autoplay (hard): {} points, {:.1}% accuracy, grade {:?}, max combo {}",
            score.score, score.accuracy, score.grade, score.max_combo
        );
    }

    Ok(())
}

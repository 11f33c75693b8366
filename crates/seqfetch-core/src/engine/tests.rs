//! Engine scenarios against a scripted source.

use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use image::{ColorType, DynamicImage, ImageFormat, Rgba, RgbaImage};

use super::*;
use crate::request::NamingMode;
use crate::retry::ProbeError;

#[derive(Clone)]
enum Reply {
    Body(Vec<u8>),
    Status(u32),
}

/// Replies per URL; unknown URLs are 404. With several replies queued for one
/// URL they are served in order and the last one repeats.
#[derive(Default)]
struct ScriptedSource {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<String>>,
    cancel_on: Option<(String, CancelToken)>,
}

impl ScriptedSource {
    fn reply(self, url: &str, reply: Reply) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ImageSource for ScriptedSource {
    fn get(&self, url: &str) -> Result<Vec<u8>, ProbeError> {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some((trigger, token)) = &self.cancel_on {
            if trigger == url {
                token.cancel();
            }
        }
        let mut replies = self.replies.lock().unwrap();
        let reply = match replies.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap_or(Reply::Status(404)),
            None => Reply::Status(404),
        };
        match reply {
            Reply::Body(b) => Ok(b),
            Reply::Status(code) => Err(ProbeError::Http(code)),
        }
    }
}

const BASE: &str = "https://cdn.example.com/38706";

fn png_bytes() -> Vec<u8> {
    let img = RgbaImage::from_pixel(6, 4, Rgba([200, 100, 50, 255]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

fn request(start: u64) -> FetchRequest {
    FetchRequest::new(BASE, "tok", "album", start, 3, NamingMode::TokenQuery).unwrap()
}

fn url(index: u64, ext: &str) -> String {
    format!("{}/album-{:03}{}?tok", BASE, index, ext)
}

fn options(threshold: u32, exts: &[&str]) -> EngineOptions {
    EngineOptions {
        failure_threshold: threshold,
        extensions: exts.iter().map(|e| e.parse().unwrap()).collect(),
        ..EngineOptions::default()
    }
}

fn run_collect<S: ImageSource>(engine: &Engine<S>) -> (Result<RunSummary, EngineError>, Vec<ProgressEvent>) {
    let mut events = Vec::new();
    let res = engine.run(&CancelToken::new(), &mut |e: ProgressEvent| events.push(e));
    (res, events)
}

fn dir_names(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn falls_back_to_png_after_two_misses() {
    let out = tempfile::tempdir().unwrap();
    let source = Arc::new(
        ScriptedSource::default()
            .reply(&url(5, ".jpg"), Reply::Status(404))
            .reply(&url(5, ".webp"), Reply::Status(404))
            .reply(&url(5, ".png"), Reply::Body(png_bytes())),
    );
    let engine = Engine::new(
        request(5),
        out.path(),
        options(2, &[".jpg", ".webp", ".png"]),
        Arc::clone(&source),
    );
    let (res, events) = run_collect(&engine);
    let summary = res.unwrap();

    assert_eq!(dir_names(out.path()), vec!["album-005.jpg"]);
    assert_eq!(summary.total_saved, 1);
    assert_eq!(summary.reason, StopReason::FailureStreak);
    assert_eq!(summary.last_index, Some(7));

    let calls = source.calls();
    assert_eq!(
        &calls[..3],
        &[url(5, ".jpg"), url(5, ".webp"), url(5, ".png")]
    );
    assert_eq!(calls.len(), 3 + 3 + 3, "indices 6 and 7 tried every extension");

    let saved_idx = events
        .iter()
        .position(|e| matches!(e, ProgressEvent::Saved { index: 5, .. }))
        .expect("saved event");
    assert!(events[..saved_idx]
        .iter()
        .any(|e| matches!(e, ProgressEvent::Converting { index: 5, .. })));
    assert!(events.iter().any(|e| matches!(
        e,
        ProgressEvent::IndexExhausted {
            index: 6,
            consecutive_failures: 1
        }
    )));

    let saved = std::fs::read(out.path().join("album-005.jpg")).unwrap();
    assert_eq!(image::guess_format(&saved).unwrap(), ImageFormat::Jpeg);
    assert_eq!(image::load_from_memory(&saved).unwrap().color(), ColorType::Rgb8);
}

#[test]
fn stops_after_threshold_consecutive_misses() {
    let out = tempfile::tempdir().unwrap();
    let source = Arc::new(
        ScriptedSource::default()
            .reply(&url(8, ".jpg"), Reply::Body(png_bytes()))
            .reply(&url(9, ".png"), Reply::Body(png_bytes())),
    );
    let engine = Engine::new(request(8), out.path(), options(5, &[".jpg", ".png"]), Arc::clone(&source));
    let (res, events) = run_collect(&engine);
    let summary = res.unwrap();

    assert_eq!(summary.total_saved, 2);
    assert_eq!(summary.last_index, Some(14));
    assert_eq!(summary.consecutive_failures, 5);
    assert_eq!(summary.reason, StopReason::FailureStreak);
    assert!(
        !source.calls().iter().any(|u| u.contains("album-015")),
        "index 15 must never be requested"
    );
    match events.last() {
        Some(ProgressEvent::Finished { summary: s }) => assert_eq!(s, &summary),
        other => panic!("expected Finished last, got {:?}", other),
    }
    assert_eq!(dir_names(out.path()), vec!["album-008.jpg", "album-009.jpg"]);
}

#[test]
fn undecodable_body_falls_back_like_network_failure() {
    let out = tempfile::tempdir().unwrap();
    let source = Arc::new(
        ScriptedSource::default()
            .reply(&url(1, ".jpg"), Reply::Body(b"<html>blocked</html>".to_vec()))
            .reply(&url(1, ".webp"), Reply::Body(png_bytes())),
    );
    let engine = Engine::new(request(1), out.path(), options(1, &[".jpg", ".webp"]), Arc::clone(&source));
    let (res, events) = run_collect(&engine);

    assert_eq!(res.unwrap().total_saved, 1);
    assert_eq!(&source.calls()[..2], &[url(1, ".jpg"), url(1, ".webp")]);
    assert!(events.iter().any(|e| matches!(
        e,
        ProgressEvent::AttemptFailed { index: 1, extension, .. } if extension == ".jpg"
    )));
    assert_eq!(dir_names(out.path()), vec!["album-001.jpg"]);
}

#[test]
fn streak_resets_on_success() {
    // S F F S F F F with threshold 3: the middle gap must not end the run.
    let out = tempfile::tempdir().unwrap();
    let source = Arc::new(
        ScriptedSource::default()
            .reply(&url(1, ".jpg"), Reply::Body(png_bytes()))
            .reply(&url(4, ".jpg"), Reply::Body(png_bytes())),
    );
    let engine = Engine::new(request(1), out.path(), options(3, &[".jpg"]), Arc::clone(&source));
    let (res, _) = run_collect(&engine);
    let summary = res.unwrap();
    assert_eq!(summary.total_saved, 2);
    assert_eq!(summary.last_index, Some(7));
    assert_eq!(source.calls().len(), 7);
}

#[test]
fn rerun_overwrites_same_file() {
    let out = tempfile::tempdir().unwrap();
    let source = Arc::new(ScriptedSource::default().reply(&url(3, ".png"), Reply::Body(png_bytes())));
    let engine = Engine::new(request(3), out.path(), options(1, &[".png"]), Arc::clone(&source));
    run_collect(&engine).0.unwrap();
    run_collect(&engine).0.unwrap();
    assert_eq!(dir_names(out.path()), vec!["album-003.jpg"]);
}

#[test]
fn path_only_mode_never_sends_token() {
    let out = tempfile::tempdir().unwrap();
    let req = FetchRequest::new(BASE, "secret", "album", 1, 2, NamingMode::PathOnly).unwrap();
    let source = Arc::new(ScriptedSource::default());
    let engine = Engine::new(req, out.path(), options(1, &[".jpg"]), Arc::clone(&source));
    run_collect(&engine).0.unwrap();
    assert_eq!(source.calls(), vec![format!("{}/album-01.jpg", BASE)]);
}

#[test]
fn throttled_address_is_retried_when_policy_set() {
    let out = tempfile::tempdir().unwrap();
    let source = Arc::new(
        ScriptedSource::default()
            .reply(&url(1, ".jpg"), Reply::Status(429))
            .reply(&url(1, ".jpg"), Reply::Body(png_bytes())),
    );
    let mut opts = options(1, &[".jpg", ".png"]);
    opts.throttle = Some(ThrottlePolicy {
        max_attempts: 3,
        base_delay: std::time::Duration::ZERO,
        max_delay: std::time::Duration::ZERO,
    });
    let engine = Engine::new(request(1), out.path(), opts, Arc::clone(&source));
    let (res, _) = run_collect(&engine);
    assert_eq!(res.unwrap().total_saved, 1);
    assert_eq!(&source.calls()[..2], &[url(1, ".jpg"), url(1, ".jpg")]);
}

#[test]
fn throttled_without_policy_moves_to_next_extension() {
    let out = tempfile::tempdir().unwrap();
    let source = Arc::new(
        ScriptedSource::default()
            .reply(&url(1, ".jpg"), Reply::Status(429))
            .reply(&url(1, ".jpg"), Reply::Body(png_bytes())),
    );
    let engine = Engine::new(request(1), out.path(), options(1, &[".jpg", ".png"]), Arc::clone(&source));
    let (res, _) = run_collect(&engine);
    assert_eq!(res.unwrap().total_saved, 0);
    assert_eq!(&source.calls()[..2], &[url(1, ".jpg"), url(1, ".png")]);
}

#[test]
fn cancelled_before_start_makes_no_requests() {
    let out = tempfile::tempdir().unwrap();
    let source = Arc::new(ScriptedSource::default());
    let engine = Engine::new(request(1), out.path(), options(5, &[".jpg"]), Arc::clone(&source));
    let cancel = CancelToken::new();
    cancel.cancel();
    let mut events = Vec::new();
    let summary = engine.run(&cancel, &mut |e: ProgressEvent| events.push(e)).unwrap();
    assert_eq!(summary.reason, StopReason::Cancelled);
    assert_eq!(summary.last_index, None);
    assert!(source.calls().is_empty());
    assert!(matches!(events.first(), Some(ProgressEvent::Started { .. })));
    assert!(matches!(events.last(), Some(ProgressEvent::Finished { .. })));
}

#[test]
fn cancel_is_checked_between_attempts() {
    let out = tempfile::tempdir().unwrap();
    let cancel = CancelToken::new();
    let source = Arc::new(ScriptedSource {
        cancel_on: Some((url(2, ".jpg"), cancel.clone())),
        ..ScriptedSource::default()
    }
    .reply(&url(1, ".jpg"), Reply::Body(png_bytes())));
    let engine = Engine::new(request(1), out.path(), options(5, &[".jpg", ".png"]), Arc::clone(&source));
    let summary = engine.run(&cancel, &mut |_: ProgressEvent| {}).unwrap();
    assert_eq!(summary.reason, StopReason::Cancelled);
    assert_eq!(summary.total_saved, 1);
    assert_eq!(summary.last_index, Some(1));
    assert_eq!(source.calls(), vec![url(1, ".jpg"), url(2, ".jpg")]);
}

#[test]
fn output_dir_creation_failure_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let blocker = tmp.path().join("file");
    std::fs::write(&blocker, b"x").unwrap();
    let source = Arc::new(ScriptedSource::default());
    let engine = Engine::new(request(1), blocker.join("out"), options(5, &[".jpg"]), Arc::clone(&source));
    let (res, events) = run_collect(&engine);
    let err = res.unwrap_err();
    assert!(err.is_environment());
    assert!(matches!(err, EngineError::CreateOutputDir { .. }));
    assert!(events.is_empty());
    assert!(source.calls().is_empty());
}

#[test]
fn options_from_config() {
    let mut cfg = SeqfetchConfig::default();
    cfg.extensions = vec!["png".into(), ".jpg".into()];
    cfg.failure_threshold = 8;
    let opts = EngineOptions::from_config(&cfg).unwrap();
    assert_eq!(opts.failure_threshold, 8);
    let exts: Vec<&str> = opts.extensions.iter().map(|e| e.as_str()).collect();
    assert_eq!(exts, vec![".png", ".jpg"]);
    assert!(opts.throttle.is_none());

    cfg.extensions = vec!["bad/ext".into()];
    assert!(EngineOptions::from_config(&cfg).is_err());
}

#[tokio::test]
async fn spawned_run_streams_events_and_completes() {
    let out = tempfile::tempdir().unwrap();
    let source = Arc::new(
        ScriptedSource::default()
            .reply(&url(1, ".jpg"), Reply::Body(png_bytes()))
            .reply(&url(2, ".jpg"), Reply::Body(png_bytes())),
    );
    let engine = Engine::new(request(1), out.path().to_path_buf(), options(2, &[".jpg"]), Arc::clone(&source));
    let mut handle = engine.spawn();

    let mut events = Vec::new();
    while let Some(ev) = handle.next_event().await {
        events.push(ev);
    }
    let summary = handle.wait().await.unwrap();
    assert_eq!(summary.total_saved, 2);
    assert_eq!(summary.last_index, Some(4));
    let progress: Vec<u64> = events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::Progress { next_index, .. } => Some(*next_index),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![2, 3, 4, 5]);
    assert!(matches!(events.last(), Some(ProgressEvent::Finished { .. })));
}

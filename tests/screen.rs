//! Behaviour of `ConversionScreen` with in-memory pickers, camera, service
//! and notice sink. No network involved.

use async_trait::async_trait;
use imgtxt::{
    CameraCapture, CaptureOutcome, ClientConfig, ConversionScreen, ConversionService,
    DocumentPicker, ImgTxtError, LocalCamera, Notice, NoticeSink, OutputFormat, Phase,
    PermissionStatus, PickOutcome, PickedDocument, Platform, RecognitionLanguage, UploadRequest,
    UploadResponse,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

// ── Fakes ────────────────────────────────────────────────────────────────────

/// Answers uploads from a script and records every request.
#[derive(Default)]
struct ScriptedService {
    replies: Mutex<VecDeque<Result<UploadResponse, ImgTxtError>>>,
    requests: Mutex<Vec<UploadRequest>>,
}

impl ScriptedService {
    fn with(replies: Vec<Result<UploadResponse, ImgTxtError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::default(),
        })
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ConversionService for ScriptedService {
    async fn upload(&self, request: &UploadRequest) -> Result<UploadResponse, ImgTxtError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ImgTxtError::upload("script exhausted")))
    }
}

/// Blocks every upload until released.
#[derive(Default)]
struct GatedService {
    gate: Notify,
    calls: AtomicUsize,
}

#[async_trait]
impl ConversionService for GatedService {
    async fn upload(&self, _request: &UploadRequest) -> Result<UploadResponse, ImgTxtError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(UploadResponse {
            text: Some("done".into()),
            download_url: None,
        })
    }
}

/// Never answers the first upload; answers every later one.
#[derive(Default)]
struct StallsOnceService {
    calls: AtomicUsize,
}

#[async_trait]
impl ConversionService for StallsOnceService {
    async fn upload(&self, _request: &UploadRequest) -> Result<UploadResponse, ImgTxtError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            std::future::pending::<()>().await;
        }
        Ok(UploadResponse {
            text: Some("retried".into()),
            download_url: None,
        })
    }
}

/// Hands out one scripted outcome per pick.
#[derive(Default)]
struct ScriptedPicker {
    outcomes: Mutex<VecDeque<Result<PickOutcome, ImgTxtError>>>,
}

impl ScriptedPicker {
    fn with(outcomes: Vec<Result<PickOutcome, ImgTxtError>>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into()),
        })
    }
}

#[async_trait]
impl DocumentPicker for ScriptedPicker {
    async fn pick(&self, _accept: &[&str]) -> Result<PickOutcome, ImgTxtError> {
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(PickOutcome::Cancelled))
    }
}

struct BrokenCamera;

#[async_trait]
impl CameraCapture for BrokenCamera {
    async fn request_permission(&self) -> Result<PermissionStatus, ImgTxtError> {
        Ok(PermissionStatus::Granted)
    }

    async fn capture(&self) -> Result<CaptureOutcome, ImgTxtError> {
        Err(ImgTxtError::acquisition("sensor busy"))
    }
}

#[derive(Default)]
struct Recorder(Mutex<Vec<Notice>>);

impl Recorder {
    fn titles(&self) -> Vec<String> {
        self.0.lock().unwrap().iter().map(|n| n.title.clone()).collect()
    }
}

impl NoticeSink for Recorder {
    fn notify(&self, notice: &Notice) {
        self.0.lock().unwrap().push(notice.clone());
    }
}

// ── Test helpers ─────────────────────────────────────────────────────────────

const BASE: &str = "https://convert.example";

fn config() -> ClientConfig {
    ClientConfig::builder()
        .base_url(BASE)
        .platform(Platform::Other)
        .build()
        .unwrap()
}

fn picked(name: &str) -> Result<PickOutcome, ImgTxtError> {
    Ok(PickOutcome::Picked(vec![PickedDocument {
        uri: format!("file:///tmp/{name}"),
        name: name.into(),
        mime_type: Some("image/png".into()),
    }]))
}

fn reply(text: Option<&str>, link: Option<&str>) -> Result<UploadResponse, ImgTxtError> {
    Ok(UploadResponse {
        text: text.map(str::to_string),
        download_url: link.map(str::to_string),
    })
}

fn screen(
    service: Arc<dyn ConversionService>,
    picker: Arc<dyn DocumentPicker>,
) -> (ConversionScreen, Arc<Recorder>) {
    let notices = Arc::new(Recorder::default());
    let screen = ConversionScreen::new(config(), service)
        .with_picker(picker)
        .with_notice_sink(notices.clone());
    (screen, notices)
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upload_without_file_makes_no_request() {
    let service = ScriptedService::with(vec![]);
    let (screen, notices) = screen(service.clone(), ScriptedPicker::with(vec![]));

    let err = screen.upload().await.unwrap_err();
    assert!(matches!(err, ImgTxtError::NoFileSelected));
    assert_eq!(service.calls(), 0);
    assert_eq!(*notices.0.lock().unwrap(), vec![Notice::no_file_selected()]);
    assert_eq!(screen.state().phase(), Phase::Empty);
}

#[tokio::test]
async fn successful_upload_shows_text_and_link() {
    let service = ScriptedService::with(vec![reply(
        Some("hello"),
        Some("https://host/files/out.docx"),
    )]);
    let (screen, notices) = screen(service.clone(), ScriptedPicker::with(vec![picked("a.png")]));

    screen.pick_file().await.unwrap();
    let result = screen.upload().await.unwrap();

    assert_eq!(result.recognized_text, "hello");
    assert_eq!(result.download_url.as_deref(), Some("https://convert.example/download/out.docx"));
    let view = screen.view();
    assert_eq!(view.text.as_deref(), Some("hello"));
    assert_eq!(view.download_url, result.download_url);
    assert_eq!(screen.state().phase(), Phase::Resulted);
    assert_eq!(notices.titles(), vec!["Success"]);
}

#[tokio::test]
async fn success_notice_even_for_an_empty_reply() {
    let service = ScriptedService::with(vec![reply(None, None)]);
    let (screen, notices) = screen(service, ScriptedPicker::with(vec![picked("a.png")]));

    screen.pick_file().await.unwrap();
    screen.upload().await.unwrap();

    assert!(screen.view().is_blank());
    assert_eq!(*notices.0.lock().unwrap(), vec![Notice::success()]);
}

#[tokio::test]
async fn selected_language_and_format_reach_the_request() {
    let service = ScriptedService::with(vec![reply(Some("x"), None)]);
    let (screen, _) = screen(service.clone(), ScriptedPicker::with(vec![picked("a.png")]));

    screen.pick_file().await.unwrap();
    screen.set_language(RecognitionLanguage::Fra);
    screen.set_format(OutputFormat::Txt);
    screen.upload().await.unwrap();

    let req = service.requests.lock().unwrap()[0].clone();
    assert_eq!(req.text_fields(), [("language", "fra"), ("format", "txt")]);
    assert_eq!(req.file.file_name, "a.png");
    assert_eq!(req.file.uri, "file:///tmp/a.png");
}

#[tokio::test]
async fn failed_upload_keeps_previous_result() {
    let service = ScriptedService::with(vec![
        reply(Some("first"), Some("/out/first.docx")),
        Err(ImgTxtError::upload("connection reset")),
    ]);
    let (screen, notices) = screen(service, ScriptedPicker::with(vec![picked("a.png")]));

    screen.pick_file().await.unwrap();
    screen.upload().await.unwrap();
    let before = screen.view();

    let err = screen.upload().await.unwrap_err();
    assert!(matches!(err, ImgTxtError::UploadFailed { .. }));
    assert_eq!(screen.view(), before);
    assert_eq!(screen.state().phase(), Phase::Selected);
    assert!(screen.state().artifact().is_some());
    assert_eq!(notices.titles(), vec!["Success", "Upload Failed"]);
}

#[tokio::test]
async fn reacquiring_clears_result_immediately() {
    let service = ScriptedService::with(vec![reply(Some("first"), Some("/out/first.docx"))]);
    let (screen, _) = screen(
        service.clone(),
        ScriptedPicker::with(vec![picked("a.png"), picked("b.png")]),
    );

    screen.pick_file().await.unwrap();
    screen.upload().await.unwrap();
    assert!(!screen.view().is_blank());

    screen.pick_file().await.unwrap();
    let view = screen.view();
    assert!(view.is_blank());
    assert_eq!(view.selected.as_deref(), Some("b.png"));
    assert_eq!(service.calls(), 1);
}

#[tokio::test]
async fn cancelled_pick_leaves_state_alone() {
    let service = ScriptedService::with(vec![reply(Some("kept"), None)]);
    let (screen, notices) = screen(
        service,
        ScriptedPicker::with(vec![picked("a.png"), Ok(PickOutcome::Cancelled)]),
    );

    screen.pick_file().await.unwrap();
    screen.upload().await.unwrap();
    let before = screen.state();

    assert_eq!(screen.pick_file().await.unwrap(), None);
    assert_eq!(screen.state(), before);
    assert_eq!(notices.titles(), vec!["Success"]);
}

#[tokio::test]
async fn picker_failure_notifies_and_leaves_state_alone() {
    let service = ScriptedService::with(vec![]);
    let (screen, notices) = screen(
        service,
        ScriptedPicker::with(vec![picked("a.png"), Err(ImgTxtError::acquisition("io"))]),
    );

    screen.pick_file().await.unwrap();
    let before = screen.state();
    assert!(screen.pick_file().await.is_err());
    assert_eq!(screen.state(), before);
    assert_eq!(*notices.0.lock().unwrap(), vec![Notice::pick_failed()]);
}

#[tokio::test]
async fn camera_permission_denied_changes_nothing() {
    let notices = Arc::new(Recorder::default());
    let screen = ConversionScreen::new(config(), ScriptedService::with(vec![]))
        .with_camera(Arc::new(LocalCamera::denied()))
        .with_notice_sink(notices.clone());

    let err = screen.capture_from_camera().await.unwrap_err();
    assert!(matches!(err, ImgTxtError::PermissionDenied));
    assert_eq!(screen.state().phase(), Phase::Empty);
    assert_eq!(*notices.0.lock().unwrap(), vec![Notice::permission_denied()]);
}

#[tokio::test]
async fn camera_failure_uses_capture_notice() {
    let notices = Arc::new(Recorder::default());
    let screen = ConversionScreen::new(config(), ScriptedService::with(vec![]))
        .with_camera(Arc::new(BrokenCamera))
        .with_notice_sink(notices.clone());

    assert!(screen.capture_from_camera().await.is_err());
    assert_eq!(*notices.0.lock().unwrap(), vec![Notice::capture_failed()]);
}

#[tokio::test]
async fn second_trigger_is_ignored_while_submitting() {
    let service = Arc::new(GatedService::default());
    let (screen, notices) = screen(service.clone(), ScriptedPicker::with(vec![picked("a.png")]));
    let screen = Arc::new(screen);

    screen.pick_file().await.unwrap();
    let first = {
        let screen = screen.clone();
        tokio::spawn(async move { screen.upload().await })
    };
    while !screen.state().is_submitting() {
        tokio::task::yield_now().await;
    }

    assert!(screen.view().busy);
    let err = screen.upload().await.unwrap_err();
    assert!(matches!(err, ImgTxtError::UploadInProgress));
    assert!(matches!(
        screen.pick_file().await.unwrap_err(),
        ImgTxtError::UploadInProgress
    ));

    service.gate.notify_one();
    let result = first.await.unwrap().unwrap();
    assert_eq!(result.recognized_text, "done");
    assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    assert_eq!(screen.state().phase(), Phase::Resulted);
    assert_eq!(notices.titles(), vec!["Success"]);
}

#[tokio::test]
async fn abandoned_upload_returns_to_selected() {
    let service = Arc::new(StallsOnceService::default());
    let (screen, notices) = screen(
        service.clone(),
        ScriptedPicker::with(vec![picked("a.png"), picked("b.png")]),
    );

    screen.pick_file().await.unwrap();
    let timed_out = tokio::time::timeout(Duration::from_millis(50), screen.upload()).await;
    assert!(timed_out.is_err());
    assert_eq!(screen.state().phase(), Phase::Selected);
    assert!(!screen.view().busy);

    let result = screen.upload().await.unwrap();
    assert_eq!(result.recognized_text, "retried");
    assert_eq!(service.calls.load(Ordering::SeqCst), 2);

    let repicked = screen.pick_file().await.unwrap().unwrap();
    assert_eq!(repicked.name(), "b.png");
    assert_eq!(notices.titles(), vec!["Success"]);
}

//! The conversion screen: one selection, two acquisition adapters, one
//! upload client, and a notice sink, driven by discrete user actions.
//!
//! State lives in a [`SelectionState`] snapshot behind a mutex that is only
//! held while swapping snapshots, never across an `.await`. Each action
//! reads the current snapshot, applies one transition and stores the result.
//! Because `upload` moves the state to `Submitting` before awaiting the
//! service, a second trigger that arrives meanwhile sees `Submitting` and is
//! refused instead of starting a parallel request. If the upload future is
//! dropped mid-flight, the state falls back to `Selected`.
//!
//! Every failure is reported twice: as a [`Notice`] for the user and as the
//! returned `Err` for the caller. None of them end the session.

use crate::acquire::{self, CameraCapture, DocumentPicker, LocalCamera, LocalDocumentPicker};
use crate::artifact::{ConversionResult, InputArtifact, OutputFormat, RecognitionLanguage};
use crate::config::ClientConfig;
use crate::error::ImgTxtError;
use crate::notice::{NoopNoticeSink, Notice, SharedNoticeSink};
use crate::presenter::ResultView;
use crate::state::SelectionState;
use crate::upload::{self, ConversionService};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

/// A single conversion screen session.
pub struct ConversionScreen {
    config: ClientConfig,
    service: Arc<dyn ConversionService>,
    picker: Arc<dyn DocumentPicker>,
    camera: Arc<dyn CameraCapture>,
    notices: SharedNoticeSink,
    state: Mutex<SelectionState>,
}

impl ConversionScreen {
    /// New session with no picker, camera or notice sink attached.
    ///
    /// The default picker and camera always report cancellation.
    pub fn new(config: ClientConfig, service: Arc<dyn ConversionService>) -> Self {
        let state = SelectionState::new(config.language, config.format);
        Self {
            config,
            service,
            picker: Arc::new(LocalDocumentPicker::default()),
            camera: Arc::new(LocalCamera::new(None)),
            notices: Arc::new(NoopNoticeSink),
            state: Mutex::new(state),
        }
    }

    pub fn with_picker(mut self, picker: Arc<dyn DocumentPicker>) -> Self {
        self.picker = picker;
        self
    }

    pub fn with_camera(mut self, camera: Arc<dyn CameraCapture>) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_notice_sink(mut self, sink: SharedNoticeSink) -> Self {
        self.notices = sink;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, SelectionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current snapshot.
    pub fn state(&self) -> SelectionState {
        self.lock().clone()
    }

    /// What the result area shows right now.
    pub fn view(&self) -> ResultView {
        ResultView::from_state(&self.lock())
    }

    pub fn set_language(&self, language: RecognitionLanguage) {
        let mut state = self.lock();
        *state = state.with_language(language);
    }

    pub fn set_format(&self, format: OutputFormat) {
        let mut state = self.lock();
        *state = state.with_format(format);
    }

    fn report(&self, notice: Notice) {
        self.notices.notify(&notice);
    }

    /// Store a freshly acquired artifact, clearing the old result.
    fn adopt(&self, artifact: InputArtifact) -> Result<InputArtifact, ImgTxtError> {
        let mut state = self.lock();
        *state = state.acquire(artifact.clone())?;
        info!("Selected '{}'", artifact.name());
        Ok(artifact)
    }

    fn refuse_while_submitting(&self) -> Result<(), ImgTxtError> {
        if self.lock().is_submitting() {
            warn!("Ignoring acquisition while an upload is in flight");
            return Err(ImgTxtError::UploadInProgress);
        }
        Ok(())
    }

    /// Run the document picker. `Ok(None)` means cancelled; state unchanged.
    pub async fn pick_file(&self) -> Result<Option<InputArtifact>, ImgTxtError> {
        self.refuse_while_submitting()?;
        match acquire::pick_file(self.picker.as_ref()).await {
            Ok(Some(artifact)) => self.adopt(artifact).map(Some),
            Ok(None) => Ok(None),
            Err(e) => {
                warn!("Document pick failed: {e}");
                self.report(Notice::pick_failed());
                Err(e)
            }
        }
    }

    /// Run the camera. `Ok(None)` means cancelled; state unchanged.
    pub async fn capture_from_camera(&self) -> Result<Option<InputArtifact>, ImgTxtError> {
        self.refuse_while_submitting()?;
        match acquire::capture_from_camera(self.camera.as_ref()).await {
            Ok(Some(artifact)) => self.adopt(artifact).map(Some),
            Ok(None) => Ok(None),
            Err(ImgTxtError::PermissionDenied) => {
                self.report(Notice::permission_denied());
                Err(ImgTxtError::PermissionDenied)
            }
            Err(e) => {
                warn!("Camera capture failed: {e}");
                self.report(Notice::capture_failed());
                Err(e)
            }
        }
    }

    /// Upload the selected artifact with the current language and format.
    ///
    /// With nothing selected no request is made. While another upload is
    /// outstanding the trigger is ignored and `UploadInProgress` returned.
    pub async fn upload(&self) -> Result<ConversionResult, ImgTxtError> {
        let submission = {
            let mut state = self.lock();
            let submitted = state.submit();
            match submitted {
                Ok((next, submission)) => {
                    *state = next;
                    submission
                }
                Err(ImgTxtError::NoFileSelected) => {
                    drop(state);
                    self.report(Notice::no_file_selected());
                    return Err(ImgTxtError::NoFileSelected);
                }
                Err(e) => {
                    warn!("Ignoring upload trigger: {e}");
                    return Err(e);
                }
            }
        };
        let in_flight = InFlight {
            screen: self,
            armed: true,
        };

        let outcome = upload::convert(
            self.service.as_ref(),
            &self.config,
            &submission.artifact,
            submission.language,
            submission.format,
        )
        .await;
        in_flight.disarm();

        match outcome {
            Ok(result) => {
                {
                    let mut state = self.lock();
                    *state = state.succeed(result.clone());
                }
                self.report(Notice::success());
                Ok(result)
            }
            Err(e) => {
                warn!("Upload of '{}' failed: {e}", submission.artifact.name());
                {
                    let mut state = self.lock();
                    *state = state.fail();
                }
                self.report(Notice::upload_failed());
                Err(e)
            }
        }
    }
}

/// Puts the state back to `Selected` if an upload future is dropped before
/// it resolves (timeout, `select!`, aborted task).
struct InFlight<'a> {
    screen: &'a ConversionScreen,
    armed: bool,
}

impl InFlight<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("Upload abandoned before completion");
            let mut state = self.screen.lock();
            *state = state.fail();
        }
    }
}

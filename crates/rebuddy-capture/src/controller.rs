//! Capture workflow state machine.
//!
//! # Design
//! - Four phases: `Capture -> Label -> Uploading -> Result`, back to `Capture` on reset.
//! - Triggers are typed methods; an undefined trigger returns an error and changes nothing.
//! - The controller exclusively owns the captured asset and its preview. Every exit path
//!   that leaves it without an asset (reset, replacement, drop) releases the preview.
//! - Uploading is left only through `upload_settled`; the pipeline itself never sees this state.

use std::fmt::{self, Display, Formatter};

use tracing::{debug, info};

use crate::asset::{CapturedAsset, CapturedFile};
use crate::error::TransitionError;
use crate::preview::{PreviewHandle, PreviewRegistry, PreviewStore};
use crate::upload::{UploadJob, UploadOutcome, UploadPipeline};

/// Workflow step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Waiting for a photo.
    #[default]
    Capture,
    /// Photo captured, waiting for a label.
    Label,
    /// Upload in flight.
    Uploading,
    /// Upload settled; outcome available.
    Result,
}

impl Phase {
    /// Lowercase phase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Capture => "capture",
            Self::Label => "label",
            Self::Uploading => "uploading",
            Self::Result => "result",
        }
    }
}

impl Display for Phase {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Drives one photo at a time through capture, labelling, and upload.
#[derive(Debug)]
pub struct CaptureController<S: PreviewStore = PreviewRegistry> {
    phase: Phase,
    asset: Option<CapturedAsset>,
    chosen_label: Option<String>,
    outcome: Option<UploadOutcome>,
    previews: S,
}

impl CaptureController {
    /// Controller backed by an in-memory [`PreviewRegistry`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_store(PreviewRegistry::new())
    }
}

impl Default for CaptureController {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PreviewStore> CaptureController<S> {
    /// Controller backed by a custom preview store.
    #[must_use]
    pub const fn with_store(previews: S) -> Self {
        Self {
            phase: Phase::Capture,
            asset: None,
            chosen_label: None,
            outcome: None,
            previews,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Captured asset, present in every phase except `Capture`.
    #[must_use]
    pub const fn asset(&self) -> Option<&CapturedAsset> {
        self.asset.as_ref()
    }

    /// Preview of the captured asset.
    #[must_use]
    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.asset.as_ref().map(CapturedAsset::preview)
    }

    /// Label chosen for the in-flight or settled upload.
    #[must_use]
    pub fn chosen_label(&self) -> Option<&str> {
        self.chosen_label.as_deref()
    }

    /// Outcome of the last upload, present only in `Result`.
    #[must_use]
    pub const fn outcome(&self) -> Option<&UploadOutcome> {
        self.outcome.as_ref()
    }

    /// The preview store.
    #[must_use]
    pub const fn previews(&self) -> &S {
        &self.previews
    }

    /// Capture a photo, replacing any photo awaiting a label.
    ///
    /// # Errors
    /// Fails outside the `Capture` and `Label` phases.
    pub fn select_file(&mut self, file: CapturedFile) -> Result<&PreviewHandle, TransitionError> {
        self.require("select a file", &[Phase::Capture, Phase::Label])?;

        self.release_asset();
        let preview = self.previews.create(&file);
        self.chosen_label = None;
        self.outcome = None;
        info!(file = %file.name(), from = %self.phase, "photo captured");
        self.phase = Phase::Label;
        Ok(&self.asset.insert(CapturedAsset { file, preview }).preview)
    }

    /// Commit to a label and enter `Uploading`.
    ///
    /// Returns the job for the upload pipeline.
    ///
    /// # Errors
    /// Fails outside `Label`, for a blank label, or without an asset.
    pub fn choose_label(&mut self, label: &str) -> Result<UploadJob, TransitionError> {
        self.require("choose a label", &[Phase::Label])?;
        if label.trim().is_empty() {
            return Err(TransitionError::EmptyLabel);
        }
        let file = self
            .asset
            .as_ref()
            .map(|asset| asset.file.clone())
            .ok_or(TransitionError::MissingAsset)?;

        self.chosen_label = Some(label.to_string());
        self.phase = Phase::Uploading;
        info!(%label, "upload started");
        Ok(UploadJob {
            file,
            label: label.to_string(),
        })
    }

    /// Record the outcome of the in-flight upload and enter `Result`.
    ///
    /// # Errors
    /// Fails outside `Uploading`.
    pub fn upload_settled(&mut self, outcome: UploadOutcome) -> Result<(), TransitionError> {
        self.require("settle an upload", &[Phase::Uploading])?;
        info!(success = outcome.is_success(), "upload settled");
        self.outcome = Some(outcome);
        self.phase = Phase::Result;
        Ok(())
    }

    /// Discard the photo and return to `Capture`.
    ///
    /// A no-op in `Capture`.
    ///
    /// # Errors
    /// Fails while an upload is in flight.
    pub fn reset(&mut self) -> Result<(), TransitionError> {
        self.require("reset", &[Phase::Capture, Phase::Label, Phase::Result])?;
        if self.phase == Phase::Capture {
            return Ok(());
        }
        self.release_asset();
        self.chosen_label = None;
        self.outcome = None;
        info!(from = %self.phase, "workflow reset");
        self.phase = Phase::Capture;
        Ok(())
    }

    /// Choose `label`, run the upload, and record its outcome.
    ///
    /// # Errors
    /// Fails when `label` cannot be chosen in the current phase. Upload
    /// failures are not errors; they land in the returned outcome.
    pub async fn submit(
        &mut self,
        label: &str,
        pipeline: &UploadPipeline,
    ) -> Result<&UploadOutcome, TransitionError> {
        let job = self.choose_label(label)?;
        let outcome = pipeline.run(&job).await;
        self.upload_settled(outcome)?;
        self.outcome.as_ref().ok_or(TransitionError::InvalidTransition {
            trigger: "settle an upload",
            phase: self.phase,
        })
    }

    fn require(&self, trigger: &'static str, allowed: &[Phase]) -> Result<(), TransitionError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            debug!(trigger, phase = %self.phase, "transition rejected");
            Err(TransitionError::InvalidTransition {
                trigger,
                phase: self.phase,
            })
        }
    }

    fn release_asset(&mut self) {
        if let Some(asset) = self.asset.take() {
            self.previews.release(asset.preview);
        }
    }
}

impl<S: PreviewStore> Drop for CaptureController<S> {
    fn drop(&mut self) {
        self.release_asset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubApi, UploadReply};
    use rebuddy_test_support::jpeg_bytes;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;
    use std::sync::Arc;
    use uuid::Uuid;

    #[derive(Debug, Default)]
    struct Ledger {
        created: Vec<Uuid>,
        releases: HashMap<Uuid, usize>,
    }

    impl Ledger {
        fn live(&self) -> usize {
            self.created
                .iter()
                .filter(|id| !self.releases.contains_key(id))
                .count()
        }

        fn each_released_once(&self) -> bool {
            self.created
                .iter()
                .all(|id| self.releases.get(id) == Some(&1))
        }
    }

    #[derive(Debug, Clone, Default)]
    struct CountingStore(Rc<RefCell<Ledger>>);

    impl PreviewStore for CountingStore {
        fn create(&mut self, _file: &CapturedFile) -> PreviewHandle {
            let handle = PreviewHandle::generate();
            self.0.borrow_mut().created.push(handle.id());
            handle
        }

        fn release(&mut self, handle: PreviewHandle) {
            *self.0.borrow_mut().releases.entry(handle.id()).or_default() += 1;
        }
    }

    fn photo() -> CapturedFile {
        CapturedFile::from_bytes("photo.jpg", jpeg_bytes())
    }

    #[tokio::test]
    async fn successful_upload_reaches_result_with_confirmed_label() {
        let pipeline = UploadPipeline::new(Arc::new(StubApi::echoing("k1")));
        let mut controller = CaptureController::new();

        controller.select_file(photo()).expect("select");
        assert_eq!(controller.phase(), Phase::Label);

        let outcome = controller
            .submit("recyclable", &pipeline)
            .await
            .expect("submit")
            .clone();
        assert_eq!(controller.phase(), Phase::Result);
        assert_eq!(
            outcome,
            UploadOutcome::Uploaded {
                s3_key: "k1".into(),
                label: "recyclable".into(),
            }
        );
        assert_eq!(controller.chosen_label(), Some("recyclable"));
    }

    #[tokio::test]
    async fn server_error_reaches_result_with_status_in_message() {
        let pipeline = UploadPipeline::new(Arc::new(StubApi::with_upload(UploadReply::Status {
            status: 500,
            body: "Failed to upload image".into(),
        })));
        let mut controller = CaptureController::new();
        controller.select_file(photo()).expect("select");

        let outcome = controller
            .submit("recyclable", &pipeline)
            .await
            .expect("submit");
        assert!(!outcome.is_success());
        assert!(outcome.message().is_some_and(|message| message.contains("500")));
        assert_eq!(controller.phase(), Phase::Result);
    }

    #[tokio::test]
    async fn reset_from_result_clears_state_and_releases_preview() {
        let pipeline = UploadPipeline::new(Arc::new(StubApi::echoing("k1")));
        let mut controller = CaptureController::new();
        controller.select_file(photo()).expect("select");
        controller
            .submit("recyclable", &pipeline)
            .await
            .expect("submit");

        controller.reset().expect("reset");
        assert_eq!(controller.phase(), Phase::Capture);
        assert!(controller.asset().is_none());
        assert!(controller.outcome().is_none());
        assert!(controller.chosen_label().is_none());
        assert_eq!(controller.previews().live_count(), 0);
        assert_eq!(controller.previews().released_count(), 1);
    }

    #[test]
    fn replacing_the_photo_releases_the_previous_preview_first() {
        let ledger = CountingStore::default();
        let mut controller = CaptureController::with_store(ledger.clone());

        let first = controller.select_file(photo()).expect("first").id();
        let second = controller.select_file(photo()).expect("second").id();
        assert_ne!(first, second);
        assert_eq!(ledger.0.borrow().releases.get(&first), Some(&1));
        assert_eq!(ledger.0.borrow().live(), 1);
        assert_eq!(controller.phase(), Phase::Label);
    }

    #[test]
    fn uploading_only_exits_through_settlement() {
        let mut controller = CaptureController::new();
        controller.select_file(photo()).expect("select");
        controller.choose_label("tin-can").expect("choose");

        assert!(controller.reset().is_err());
        assert!(controller.select_file(photo()).is_err());
        assert!(controller.choose_label("tin-can").is_err());
        assert_eq!(controller.phase(), Phase::Uploading);

        controller
            .upload_settled(UploadOutcome::Failed {
                message: "offline".into(),
            })
            .expect("settle");
        assert_eq!(controller.phase(), Phase::Result);
    }

    #[test]
    fn choose_label_requires_a_label() {
        let mut controller = CaptureController::new();
        assert_eq!(
            controller.choose_label("recyclable"),
            Err(TransitionError::InvalidTransition {
                trigger: "choose a label",
                phase: Phase::Capture,
            })
        );
        controller.select_file(photo()).expect("select");
        assert_eq!(controller.choose_label("  "), Err(TransitionError::EmptyLabel));
        assert_eq!(controller.phase(), Phase::Label);
    }

    #[test]
    fn reset_in_capture_is_a_no_op() {
        let mut controller = CaptureController::new();
        assert!(controller.reset().is_ok());
        assert_eq!(controller.phase(), Phase::Capture);
        assert_eq!(controller.previews().created_count(), 0);
    }

    #[test]
    fn dropping_the_controller_releases_the_live_preview() {
        let ledger = CountingStore::default();
        {
            let mut controller = CaptureController::with_store(ledger.clone());
            controller.select_file(photo()).expect("select");
            assert_eq!(ledger.0.borrow().live(), 1);
        }
        assert_eq!(ledger.0.borrow().live(), 0);
        assert!(ledger.0.borrow().each_released_once());
    }

    #[derive(Debug, Clone, Copy)]
    enum Trigger {
        Select,
        Choose,
        Settle,
        Reset,
    }

    const TRIGGERS: [Trigger; 4] = [Trigger::Select, Trigger::Choose, Trigger::Settle, Trigger::Reset];

    fn fire(controller: &mut CaptureController<CountingStore>, trigger: Trigger) -> bool {
        match trigger {
            Trigger::Select => controller.select_file(photo()).is_ok(),
            Trigger::Choose => controller.choose_label("glass-jar").is_ok(),
            Trigger::Settle => controller
                .upload_settled(UploadOutcome::Uploaded {
                    s3_key: "k".into(),
                    label: "glass-jar".into(),
                })
                .is_ok(),
            Trigger::Reset => controller.reset().is_ok(),
        }
    }

    fn assert_invariants(controller: &CaptureController<CountingStore>, ledger: &Ledger) {
        let phase = controller.phase();
        assert_eq!(controller.asset().is_some(), phase != Phase::Capture);
        assert_eq!(controller.outcome().is_some(), phase == Phase::Result);
        assert_eq!(
            controller.chosen_label().is_some(),
            matches!(phase, Phase::Uploading | Phase::Result)
        );
        assert_eq!(ledger.live(), usize::from(controller.asset().is_some()));
        assert!(ledger.releases.values().all(|count| *count == 1));
    }

    #[test]
    fn every_trigger_sequence_preserves_invariants() {
        let depth = 6;
        let total = TRIGGERS.len().pow(depth);
        let mut reached_uploading = false;

        for mut code in 0..total {
            let store = CountingStore::default();
            let mut controller = CaptureController::with_store(store.clone());
            for _ in 0..depth {
                let trigger = TRIGGERS[code % TRIGGERS.len()];
                code /= TRIGGERS.len();

                let before = controller.phase();
                let applied = fire(&mut controller, trigger);
                if !applied {
                    assert_eq!(controller.phase(), before, "{trigger:?} changed a rejected phase");
                }
                if before == Phase::Uploading && controller.phase() != Phase::Uploading {
                    assert!(matches!(trigger, Trigger::Settle));
                }
                reached_uploading |= controller.phase() == Phase::Uploading;
                assert_invariants(&controller, &store.0.borrow());
            }
            drop(controller);
            let ledger = store.0.borrow();
            assert_eq!(ledger.live(), 0);
            assert!(ledger.each_released_once());
        }
        assert!(reached_uploading);
    }
}

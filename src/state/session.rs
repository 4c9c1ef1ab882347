/// The upload → preview → processing → success/error state machine.
///
/// `Stage` carries the data of each phase, so the invariants hold by
/// construction: a processed image exists only in `Success`, an error
/// message only in `Error`, and there is never more than one source image.
///
/// Every request is tagged with the session generation active at dispatch
/// time. `select` and `reset` bump the generation, so a response that
/// arrives after the user moved on no longer matches and is dropped.
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::data::{ProcessedImage, SourceImage};
use super::settings::Credential;
use crate::error::RemovalError;

/// Identifies one session (one uploaded image, from selection to reset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }
}

/// The five observable application states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Preview,
    Processing,
    Success,
    Error,
}

/// Phase plus the data that only exists in that phase
#[derive(Debug, Default)]
pub enum Stage {
    #[default]
    Idle,
    Preview {
        source: SourceImage,
    },
    Processing {
        source: SourceImage,
    },
    Success {
        source: SourceImage,
        processed: ProcessedImage,
    },
    Error {
        source: SourceImage,
        message: String,
    },
}

/// Everything the remote client needs for one removal request.
#[derive(Debug, Clone)]
pub struct Job {
    /// Session the request belongs to
    pub ticket: Generation,
    pub path: PathBuf,
    pub mime_type: String,
    /// Custom focus instruction, possibly empty
    pub instruction: String,
    pub credential: Option<Credential>,
}

/// Outcome of asking to start processing
#[derive(Debug)]
pub enum Start {
    /// Entered `Processing`; the job must be dispatched.
    Dispatch(Job),
    /// No credential is available; the settings dialog should open.
    NeedsCredential,
    /// Not allowed from the current phase.
    Ignored,
}

/// Outcome of delivering a response
#[derive(Debug, PartialEq, Eq)]
pub enum Finish {
    Succeeded,
    /// Moved to `Error`; `prompt_credential` asks for the settings dialog.
    Failed { prompt_credential: bool },
    /// The response belongs to a session that no longer exists.
    Stale,
}

/// A file was offered while the session was not idle.
#[derive(Debug, thiserror::Error)]
#[error("an image is already loaded; reset before choosing another")]
pub struct NotIdle;

/// The running session
#[derive(Debug, Default)]
pub struct Session {
    generation: Generation,
    instruction: String,
    stage: Stage,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        match self.stage {
            Stage::Idle => Phase::Idle,
            Stage::Preview { .. } => Phase::Preview,
            Stage::Processing { .. } => Phase::Processing,
            Stage::Success { .. } => Phase::Success,
            Stage::Error { .. } => Phase::Error,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// The original image, in every phase but `Idle`.
    pub fn source(&self) -> Option<&SourceImage> {
        match &self.stage {
            Stage::Idle => None,
            Stage::Preview { source }
            | Stage::Processing { source }
            | Stage::Success { source, .. }
            | Stage::Error { source, .. } => Some(source),
        }
    }

    /// The result, only in `Success`.
    pub fn processed(&self) -> Option<&ProcessedImage> {
        match &self.stage {
            Stage::Success { processed, .. } => Some(processed),
            _ => None,
        }
    }

    /// The failure message, only in `Error`.
    pub fn error(&self) -> Option<&str> {
        match &self.stage {
            Stage::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Idle → Preview with a freshly picked image.
    pub fn select(&mut self, source: SourceImage) -> Result<(), NotIdle> {
        if self.phase() != Phase::Idle {
            warn!("Ignoring {}: session is {:?}", source.file_name, self.phase());
            return Err(NotIdle);
        }

        info!("🖼️  Selected {} ({})", source.file_name, source.mime_type);
        self.generation = self.generation.next();
        self.instruction.clear();
        self.stage = Stage::Preview { source };
        Ok(())
    }

    /// Edit the custom instruction. Locked while processing.
    pub fn set_instruction(&mut self, text: String) {
        match self.phase() {
            Phase::Preview | Phase::Error | Phase::Success => self.instruction = text,
            Phase::Idle | Phase::Processing => {}
        }
    }

    /// Preview/Error → Processing, or a request for a credential.
    ///
    /// From `Error` this is the retry path: the same source and the
    /// current instruction are sent again.
    pub fn start(&mut self, credential: Option<&Credential>) -> Start {
        if !matches!(self.phase(), Phase::Preview | Phase::Error) {
            debug!("Start ignored in {:?}", self.phase());
            return Start::Ignored;
        }

        let Some(credential) = credential else {
            info!("🔑 No API key available, asking for one");
            return Start::NeedsCredential;
        };

        let source = match std::mem::take(&mut self.stage) {
            Stage::Preview { source } | Stage::Error { source, .. } => source,
            other => {
                self.stage = other;
                return Start::Ignored;
            }
        };

        let job = Job {
            ticket: self.generation,
            path: source.path().to_path_buf(),
            mime_type: source.mime_type.clone(),
            instruction: self.instruction.clone(),
            credential: Some(credential.clone()),
        };
        self.stage = Stage::Processing { source };

        info!("🚀 Processing {} (session {:?})", job.path.display(), job.ticket);
        Start::Dispatch(job)
    }

    /// Deliver the response for `ticket`.
    pub fn finish(
        &mut self,
        ticket: Generation,
        result: Result<ProcessedImage, RemovalError>,
    ) -> Finish {
        if ticket != self.generation || self.phase() != Phase::Processing {
            debug!(
                "Dropping stale response for {:?} (current {:?}, {:?})",
                ticket,
                self.generation,
                self.phase()
            );
            return Finish::Stale;
        }

        let Stage::Processing { source } = std::mem::take(&mut self.stage) else {
            return Finish::Stale;
        };

        match result {
            Ok(processed) => {
                info!("✅ Watermark removal succeeded ({}x{})", processed.width, processed.height);
                self.stage = Stage::Success { source, processed };
                Finish::Succeeded
            }
            Err(err) => {
                warn!("⚠️  Watermark removal failed: {}", err);
                let prompt_credential = err.is_credential_related();
                self.stage = Stage::Error {
                    source,
                    message: err.to_string(),
                };
                Finish::Failed { prompt_credential }
            }
        }
    }

    /// Success → Preview to tweak the instruction and run again.
    pub fn adjust(&mut self) {
        if let Stage::Success { source, .. } = std::mem::take(&mut self.stage) {
            self.stage = Stage::Preview { source };
        }
    }

    /// Any phase → Idle. Releases the source image.
    pub fn reset(&mut self) {
        if self.phase() != Phase::Idle {
            info!("↩️  Session reset from {:?}", self.phase());
        }
        self.generation = self.generation.next();
        self.instruction.clear();
        self.stage = Stage::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::tests::{png_bytes, png_data_url};

    fn source() -> SourceImage {
        SourceImage::new(
            PathBuf::from("/tmp/in.png"),
            "image/png".into(),
            (4, 4),
            png_bytes(4, 4),
        )
    }

    fn key() -> Credential {
        Credential::new("test-key").unwrap()
    }

    fn processed() -> ProcessedImage {
        ProcessedImage::from_data_url(png_data_url(4, 4)).unwrap()
    }

    fn dispatch(session: &mut Session) -> Job {
        match session.start(Some(&key())) {
            Start::Dispatch(job) => job,
            other => panic!("expected dispatch, got {:?}", other),
        }
    }

    #[test]
    fn test_select_from_idle_enters_preview() {
        let mut session = Session::new();
        session.select(source()).unwrap();
        assert_eq!(session.phase(), Phase::Preview);
        assert!(session.source().is_some());
        assert!(session.processed().is_none());
        assert!(session.error().is_none());
    }

    #[test]
    fn test_select_outside_idle_is_rejected() {
        let mut session = Session::new();
        session.select(source()).unwrap();
        let before = session.generation();
        assert!(session.select(source()).is_err());
        assert_eq!(session.phase(), Phase::Preview);
        assert_eq!(session.generation(), before);
    }

    #[test]
    fn test_select_clears_instruction() {
        let mut session = Session::new();
        session.select(source()).unwrap();
        session.set_instruction("top right corner".into());
        session.reset();
        session.select(source()).unwrap();
        assert_eq!(session.instruction(), "");
    }

    #[test]
    fn test_start_without_credential_keeps_preview() {
        let mut session = Session::new();
        session.select(source()).unwrap();
        assert!(matches!(session.start(None), Start::NeedsCredential));
        assert_eq!(session.phase(), Phase::Preview);
    }

    #[test]
    fn test_start_from_idle_or_processing_is_ignored() {
        let mut session = Session::new();
        assert!(matches!(session.start(Some(&key())), Start::Ignored));

        session.select(source()).unwrap();
        dispatch(&mut session);
        assert!(matches!(session.start(Some(&key())), Start::Ignored));
        assert_eq!(session.phase(), Phase::Processing);
    }

    #[test]
    fn test_processing_keeps_original_visible() {
        let mut session = Session::new();
        session.select(source()).unwrap();
        session.set_instruction("the logo".into());
        let job = dispatch(&mut session);

        assert_eq!(session.phase(), Phase::Processing);
        assert!(session.source().is_some());
        assert_eq!(job.instruction, "the logo");
        assert_eq!(job.mime_type, "image/png");
        assert_eq!(job.ticket, session.generation());
    }

    #[test]
    fn test_instruction_locked_while_processing() {
        let mut session = Session::new();
        session.select(source()).unwrap();
        dispatch(&mut session);
        session.set_instruction("late edit".into());
        assert_eq!(session.instruction(), "");
    }

    #[test]
    fn test_success_holds_processed_image() {
        let mut session = Session::new();
        session.select(source()).unwrap();
        let job = dispatch(&mut session);

        assert_eq!(session.finish(job.ticket, Ok(processed())), Finish::Succeeded);
        assert_eq!(session.phase(), Phase::Success);
        assert!(session.processed().unwrap().data_url.starts_with("data:image/png;base64,"));
        assert!(session.error().is_none());
    }

    #[test]
    fn test_credential_failure_prompts_settings() {
        let mut session = Session::new();
        session.select(source()).unwrap();
        let job = dispatch(&mut session);

        let outcome = session.finish(job.ticket, Err(RemovalError::InvalidCredential));
        assert_eq!(outcome, Finish::Failed { prompt_credential: true });
        assert_eq!(session.phase(), Phase::Error);
        assert!(session.error().unwrap().contains("invalid"));
        assert!(session.processed().is_none());
    }

    #[test]
    fn test_retry_from_error_reissues_same_source() {
        let mut session = Session::new();
        session.select(source()).unwrap();
        let first = dispatch(&mut session);
        session.finish(first.ticket, Err(RemovalError::NoImageReturned));
        assert_eq!(session.finish(first.ticket, Ok(processed())), Finish::Stale);

        let retry = dispatch(&mut session);
        assert_eq!(retry.path, first.path);
        assert_eq!(retry.ticket, first.ticket);
        assert_eq!(session.phase(), Phase::Processing);
        assert!(session.error().is_none());
    }

    #[test]
    fn test_response_after_reset_is_dropped() {
        let mut session = Session::new();
        session.select(source()).unwrap();
        let job = dispatch(&mut session);

        session.reset();
        session.select(source()).unwrap();

        assert_eq!(session.finish(job.ticket, Ok(processed())), Finish::Stale);
        assert_eq!(session.phase(), Phase::Preview);
        assert!(session.processed().is_none());
    }

    #[test]
    fn test_reset_is_idempotent_from_every_phase() {
        let mut session = Session::new();
        session.reset();
        session.reset();
        assert_eq!(session.phase(), Phase::Idle);

        session.select(source()).unwrap();
        let job = dispatch(&mut session);
        session.finish(job.ticket, Ok(processed()));
        session.reset();
        session.reset();

        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.source().is_none());
        assert!(session.processed().is_none());
        assert!(session.error().is_none());
    }

    #[test]
    fn test_adjust_returns_to_preview() {
        let mut session = Session::new();
        session.select(source()).unwrap();
        let job = dispatch(&mut session);
        session.finish(job.ticket, Ok(processed()));

        session.adjust();
        assert_eq!(session.phase(), Phase::Preview);
        assert!(session.processed().is_none());
        assert!(session.source().is_some());

        // Only valid from Success
        session.adjust();
        assert_eq!(session.phase(), Phase::Preview);
    }
}

use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{info, warn};

use super::config::SessionConfig;
use crate::audio::{AudioBuffer, AudioCapture};
use crate::control::ControlSignal;
use crate::engine::{SpeechToText, SummaryModel, TranscriptOutcome};
use crate::error::PipelineError;
use crate::text;

/// Session lifecycle. `Failed` is reachable from every active state,
/// `Cancelled` only while recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Recording,
    Stopped,
    Transcribing,
    Summarizing,
    Done,
    Failed,
    Cancelled,
}

impl SessionState {
    pub fn can_transition(self, next: SessionState) -> bool {
        use SessionState::*;
        match (self, next) {
            (Idle, Recording) => true,
            (Recording, Stopped) => true,
            (Recording, Cancelled) => true,
            // Empty capture skips the engines entirely.
            (Stopped, Done) => true,
            (Stopped, Transcribing) => true,
            // No-speech ends the session without summarizing.
            (Transcribing, Done) => true,
            (Transcribing, Summarizing) => true,
            (Summarizing, Done) => true,
            (from, Failed) => !matches!(from, Idle | Done | Failed | Cancelled),
            _ => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Done | SessionState::Failed | SessionState::Cancelled
        )
    }
}

/// How a session ended. Cancellation and no-speech are normal exits, kept
/// apart from errors so they are reported differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Summary written to the given path.
    Summarized(PathBuf),
    /// The engine found no usable speech; nothing was written.
    NoSpeech,
    /// The user quit; nothing was written.
    Cancelled,
}

/// One record -> transcribe -> summarize cycle.
///
/// Owns the capture backend and both engine handles for its lifetime; the
/// control channel is the only way in from the outside.
pub struct Session {
    config: SessionConfig,
    capture: Box<dyn AudioCapture>,
    transcriber: Box<dyn SpeechToText>,
    summarizer: Box<dyn SummaryModel>,
    state: SessionState,
}

impl Session {
    pub fn new(
        config: SessionConfig,
        capture: Box<dyn AudioCapture>,
        transcriber: Box<dyn SpeechToText>,
        summarizer: Box<dyn SummaryModel>,
    ) -> Self {
        Self {
            config,
            capture,
            transcriber,
            summarizer,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn set_state(&mut self, next: SessionState) {
        debug_assert!(
            self.state.can_transition(next),
            "illegal transition {:?} -> {next:?}",
            self.state
        );
        info!("session {}: {:?} -> {next:?}", self.config.name, self.state);
        self.state = next;
    }

    /// Drive the session to a terminal state.
    ///
    /// Waits for the start signal, records until stop/quit/ceiling, then runs
    /// the transcribe/summarize pipeline. Transient artifacts are removed on
    /// every exit path; only a successful summary survives.
    pub async fn run(
        mut self,
        mut control: mpsc::Receiver<ControlSignal>,
    ) -> Result<SessionOutcome, PipelineError> {
        // Idle: nothing exists yet, so quitting here is a plain exit.
        loop {
            match control.recv().await {
                Some(ControlSignal::Toggle) => break,
                Some(ControlSignal::Quit) | None => {
                    info!("quit before recording started");
                    return Ok(SessionOutcome::Cancelled);
                }
            }
        }

        let recording = match self.record(&mut control).await {
            Ok(Some(buffer)) => buffer,
            Ok(None) => {
                self.set_state(SessionState::Cancelled);
                return Ok(SessionOutcome::Cancelled);
            }
            Err(e) => {
                self.set_state(SessionState::Failed);
                return Err(e);
            }
        };

        self.set_state(SessionState::Stopped);

        match self.process(recording).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!("session failed during {}: {e}", e.stage());
                self.set_state(SessionState::Failed);
                Err(e)
            }
        }
    }

    /// Capture audio until a stop signal, a quit signal, or the duration
    /// ceiling. Returns `None` when the user quit mid-recording.
    async fn record(
        &mut self,
        control: &mut mpsc::Receiver<ControlSignal>,
    ) -> Result<Option<AudioBuffer>, PipelineError> {
        self.set_state(SessionState::Recording);
        let mut frames = self.capture.start().await?;
        let started = Utc::now();

        println!("\nRecording started on {}...", self.capture.name());
        println!(
            "Maximum recording time is {} minutes; recording stops automatically if not stopped manually.",
            self.config.max_duration.as_secs() / 60
        );

        let deadline = Instant::now() + self.config.max_duration;
        let mut samples: Vec<i16> = Vec::new();
        let mut native_rate: u32 = 0;
        let mut native_channels: u16 = 0;
        let mut cancelled = false;

        loop {
            tokio::select! {
                signal = control.recv() => match signal {
                    Some(ControlSignal::Toggle) => {
                        println!("\nRecording stopped manually. Processing...");
                        break;
                    }
                    Some(ControlSignal::Quit) | None => {
                        println!("\nDiscarding recording...");
                        cancelled = true;
                        break;
                    }
                },
                frame = frames.recv() => match frame {
                    Some(frame) => {
                        if native_rate == 0 {
                            native_rate = frame.sample_rate;
                            native_channels = frame.channels;
                        }
                        samples.extend_from_slice(&frame.samples);
                    }
                    None => {
                        warn!("audio stream ended before a stop signal");
                        break;
                    }
                },
                _ = tokio::time::sleep_until(deadline) => {
                    println!("\nMaximum recording time reached. Stopping automatically...");
                    break;
                }
            }
        }

        self.capture.stop().await?;

        // Frames may still be queued after the device stops; keep them so the
        // buffer duration tracks the elapsed recording time.
        while let Ok(frame) = frames.try_recv() {
            if cancelled {
                break;
            }
            if native_rate == 0 {
                native_rate = frame.sample_rate;
                native_channels = frame.channels;
            }
            samples.extend_from_slice(&frame.samples);
        }

        if cancelled {
            return Ok(None);
        }

        let buffer = AudioBuffer::new(samples, native_rate.max(1), native_channels.max(1));
        info!(
            "captured {:.1}s of audio ({}Hz, {} ch), started {}",
            buffer.duration_seconds(),
            buffer.sample_rate,
            buffer.channels,
            started.to_rfc3339()
        );

        Ok(Some(buffer))
    }

    /// Transcribe and summarize a stopped recording.
    async fn process(&mut self, recording: AudioBuffer) -> Result<SessionOutcome, PipelineError> {
        if recording.is_empty() {
            println!("\nNo audio captured; nothing to transcribe.");
            self.set_state(SessionState::Done);
            return Ok(SessionOutcome::NoSpeech);
        }

        let audio_path = self.config.audio_path();
        let mut guard = CleanupGuard::new();

        let converted = recording.converted(
            self.config.target_sample_rate,
            self.config.target_channels,
        );
        guard.register(audio_path.clone());
        converted.write_wav(&audio_path)?;

        if let Some(sidecar) = self.transcriber.sidecar_path(&audio_path) {
            guard.register(sidecar);
        }

        self.set_state(SessionState::Transcribing);
        println!("\nTranscribing audio with {}...", self.transcriber.name());

        let transcript = match self.transcriber.transcribe(&audio_path).await? {
            TranscriptOutcome::Text(text) => text,
            TranscriptOutcome::NoSpeech => {
                println!("\nNo speech detected in the recording; no summary will be written.");
                guard.sweep();
                self.set_state(SessionState::Done);
                return Ok(SessionOutcome::NoSpeech);
            }
        };

        // The audio file is spent once a transcript exists; from here at most
        // the transcript remains on disk.
        guard.remove_now(&audio_path);

        self.set_state(SessionState::Summarizing);
        println!("Generating summary with {}...", self.summarizer.name());

        let summary = self.summarizer.summarize(&transcript).await?;
        let wrapped = text::wrap(&summary, self.config.wrap_width);

        let summary_path = self.config.summary_path();
        std::fs::write(&summary_path, &wrapped).map_err(|e| PipelineError::Storage {
            path: summary_path.clone(),
            message: e.to_string(),
        })?;

        let bar = "=".repeat(if self.config.wrap_width == 0 {
            80
        } else {
            self.config.wrap_width
        });
        println!("\n{bar}");
        println!("LECTURE SUMMARY");
        println!("{bar}");
        println!("{wrapped}");
        println!("{bar}");
        println!("\nSummary saved to {}", summary_path.display());

        guard.sweep();
        self.set_state(SessionState::Done);

        Ok(SessionOutcome::Summarized(summary_path))
    }
}

/// Tracks transient artifacts and removes whatever still exists when the
/// session reaches a terminal state, including early error returns. The
/// summary file is never registered, so the pipeline cannot delete it.
struct CleanupGuard {
    paths: Vec<PathBuf>,
}

impl CleanupGuard {
    fn new() -> Self {
        Self { paths: Vec::new() }
    }

    fn register(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    /// Remove one artifact immediately and stop tracking it.
    fn remove_now(&mut self, path: &Path) {
        self.paths.retain(|p| p != path);
        remove_if_exists(path);
    }

    /// Remove all remaining artifacts now.
    fn sweep(&mut self) {
        for path in std::mem::take(&mut self.paths) {
            remove_if_exists(&path);
        }
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        self.sweep();
    }
}

fn remove_if_exists(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => info!("removed {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("could not remove {}: {e}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::SessionState::*;

    #[test]
    fn happy_path_transitions_are_legal() {
        assert!(Idle.can_transition(Recording));
        assert!(Recording.can_transition(Stopped));
        assert!(Stopped.can_transition(Transcribing));
        assert!(Transcribing.can_transition(Summarizing));
        assert!(Summarizing.can_transition(Done));
    }

    #[test]
    fn cancel_is_only_reachable_from_recording() {
        assert!(Recording.can_transition(Cancelled));
        assert!(!Idle.can_transition(Cancelled));
        assert!(!Stopped.can_transition(Cancelled));
        assert!(!Transcribing.can_transition(Cancelled));
        assert!(!Summarizing.can_transition(Cancelled));
    }

    #[test]
    fn failure_is_reachable_from_every_active_state() {
        assert!(Recording.can_transition(Failed));
        assert!(Stopped.can_transition(Failed));
        assert!(Transcribing.can_transition(Failed));
        assert!(Summarizing.can_transition(Failed));
        assert!(!Idle.can_transition(Failed));
        assert!(!Done.can_transition(Failed));
        assert!(!Cancelled.can_transition(Failed));
    }

    #[test]
    fn no_speech_short_circuits_to_done() {
        assert!(Stopped.can_transition(Done));
        assert!(Transcribing.can_transition(Done));
    }

    #[test]
    fn terminal_states_admit_nothing() {
        for terminal in [Done, Failed, Cancelled] {
            assert!(terminal.is_terminal());
            for next in [Idle, Recording, Stopped, Transcribing, Summarizing, Done, Cancelled] {
                assert!(!terminal.can_transition(next));
            }
        }
    }
}

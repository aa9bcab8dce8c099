use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use pymolopt::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let pb = ProgressBar::new_spinner()
            .with_style(Self::spinner_style())
            .with_message("Initializing...");
        pb.set_draw_target(target);
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();

        Box::new(move |progress: Progress| {
            let Ok(pb_guard) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::PhaseStart(phase) => {
                    pb_guard.reset();
                    pb_guard.set_style(Self::spinner_style());
                    pb_guard.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb_guard.set_message(phase.label());
                }
                Progress::PhaseFinish(phase) => {
                    pb_guard.disable_steady_tick();
                    pb_guard.finish_with_message(format!("✓ {}", phase.label()));
                }
                Progress::Message(msg) => {
                    if pb_guard.is_finished() {
                        pb_guard.set_message(msg);
                    } else {
                        pb_guard.println(format!("  {}", msg));
                    }
                }
            }
        })
    }

    /// Stops the spinner wherever it is, e.g. when a phase failed.
    pub fn abandon(&self) {
        if let Ok(pb) = self.pb.lock() {
            if !pb.is_finished() {
                pb.abandon_with_message("✗ Failed");
            }
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}]")
            .expect("Failed to create spinner style template")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pymolopt::engine::progress::Phase;
    use std::thread;

    fn hidden_handler() -> CliProgressHandler {
        CliProgressHandler::with_draw_target(ProgressDrawTarget::hidden())
    }

    #[test]
    fn handler_initializes_in_a_finished_state() {
        let handler = hidden_handler();
        let pb = handler.pb.lock().unwrap();
        assert!(pb.is_finished());
    }

    #[test]
    fn callback_tracks_phase_lifecycle() {
        let handler = hidden_handler();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart(Phase::RunTool));
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.message(), "Minimizing with PyMOL");
            assert!(!pb.is_finished());
        }

        callback(Progress::PhaseFinish(Phase::RunTool));
        {
            let pb = handler.pb.lock().unwrap();
            assert!(pb.is_finished());
            assert_eq!(pb.message(), "✓ Minimizing with PyMOL");
        }

        callback(Progress::Message("PyMOL finished in 1.2s".to_string()));
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.message(), "PyMOL finished in 1.2s");
        }
    }

    #[test]
    fn abandon_marks_running_phase_as_failed() {
        let handler = hidden_handler();
        let callback = handler.get_callback();
        callback(Progress::PhaseStart(Phase::WriteScript));

        handler.abandon();

        let pb = handler.pb.lock().unwrap();
        assert!(pb.is_finished());
        assert_eq!(pb.message(), "✗ Failed");
    }

    #[test]
    fn callback_is_thread_safe() {
        let handler = hidden_handler();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::PhaseStart(Phase::RegisterOutput));
            callback(Progress::PhaseFinish(Phase::RegisterOutput));
        })
        .join()
        .unwrap();

        let pb = handler.pb.lock().unwrap();
        assert!(pb.is_finished());
        assert_eq!(pb.message(), "✓ Registering optimized structure");
    }
}

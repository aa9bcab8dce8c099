use std::fmt;

/// The visible stages of a local optimization run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    WriteScript,
    RunTool,
    RegisterOutput,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Self::WriteScript => "Writing PML script",
            Self::RunTool => "Minimizing with PyMOL",
            Self::RegisterOutput => "Registering optimized structure",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    PhaseStart(Phase),
    PhaseFinish(Phase),
    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    /// Runs `f` bracketed by start/finish events. A failing phase never reports finish.
    pub fn phase<T, E>(&self, phase: Phase, f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        self.report(Progress::PhaseStart(phase));
        let value = f()?;
        self.report(Progress::PhaseFinish(phase));
        Ok(value)
    }
}

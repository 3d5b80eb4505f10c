//! Progress reporting for round table execution

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use roundtable_application::ProgressNotifier;
use roundtable_domain::{Phase, TaskId, TaskState};
use std::sync::Mutex;

/// Reports progress with one bar per phase
pub struct ProgressReporter {
    multi: MultiProgress,
    phase_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            phase_bar: Mutex::new(None),
        }
    }

    fn phase_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn with_bar(&self, f: impl FnOnce(&mut Option<ProgressBar>)) {
        if let Ok(mut bar) = self.phase_bar.lock() {
            f(&mut bar);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_phase_start(&self, _task_id: &TaskId, phase: Phase, total_agents: usize) {
        let pb = self.multi.add(ProgressBar::new(total_agents as u64));
        pb.set_style(Self::phase_style());
        pb.set_prefix(phase.display_name().to_string());
        pb.set_message("waiting for agents");
        self.with_bar(|bar| *bar = Some(pb));
    }

    fn on_agent_complete(&self, _task_id: &TaskId, _phase: Phase, agent: &str, accepted: bool) {
        self.with_bar(|bar| {
            if let Some(pb) = bar.as_ref() {
                let status = if accepted {
                    format!("{} {}", "v".green(), agent)
                } else {
                    format!("{} {}", "x".red(), agent)
                };
                pb.set_message(status);
                pb.inc(1);
            }
        });
    }

    fn on_phase_complete(&self, _task_id: &TaskId, phase: Phase) {
        self.with_bar(|bar| {
            if let Some(pb) = bar.take() {
                pb.finish_with_message(format!("{} done", phase.display_name().green()));
            }
        });
    }

    fn on_task_finished(&self, _task_id: &TaskId, state: TaskState) {
        self.with_bar(|bar| {
            if let Some(pb) = bar.take() {
                pb.abandon_with_message(format!("{}", state.to_string().red()));
            }
        });
    }
}

use crate::error::{AppError, Result};
use crate::model::{StudySession, Subject};
use chrono::Utc;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Focus,
    ShortBreak,
    LongBreak,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct FocusSettings {
    pub focus_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break_minutes: u32,
    pub cycles_before_long_break: u32,
}

impl Default for FocusSettings {
    fn default() -> Self {
        Self {
            focus_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            cycles_before_long_break: 4,
        }
    }
}

impl FocusSettings {
    pub fn validate(&self) -> Result<()> {
        if self.focus_minutes == 0 || self.short_break_minutes == 0 || self.long_break_minutes == 0 {
            return Err(AppError::Validation("phase lengths must be positive".to_string()));
        }
        if self.cycles_before_long_break == 0 {
            return Err(AppError::Validation(
                "cycles_before_long_break must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn phase_secs(&self, phase: Phase) -> u64 {
        let minutes = match phase {
            Phase::Focus => self.focus_minutes,
            Phase::ShortBreak => self.short_break_minutes,
            Phase::LongBreak => self.long_break_minutes,
        };
        minutes as u64 * 60
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct PhaseChange {
    pub from: Phase,
    pub to: Phase,
    /// Active-recall prompt, set when a focus phase just completed.
    pub recall_prompt: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct FocusTimer {
    pub id: Uuid,
    pub student_id: i64,
    pub subject: Subject,
    pub settings: FocusSettings,
    pub phase: Phase,
    pub remaining_secs: u64,
    pub running: bool,
    pub cycles_completed: u32,
    pub focus_secs: u64,
    pub recall_prompts: Vec<String>,
}

impl FocusTimer {
    pub fn new(student_id: i64, subject: Subject, settings: FocusSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            student_id,
            subject,
            settings,
            phase: Phase::Focus,
            remaining_secs: settings.phase_secs(Phase::Focus),
            running: true,
            cycles_completed: 0,
            focus_secs: 0,
            recall_prompts: Vec::new(),
        })
    }

    pub fn pause(&mut self) -> Result<()> {
        if !self.running {
            return Err(AppError::InvalidState("focus timer already paused".to_string()));
        }
        self.running = false;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        if self.running {
            return Err(AppError::InvalidState("focus timer already running".to_string()));
        }
        self.running = true;
        Ok(())
    }

    /// Restarts the current phase from its full length.
    pub fn reset(&mut self) {
        self.remaining_secs = self.settings.phase_secs(self.phase);
    }

    /// Ends the current phase early. A skipped focus phase does not count as
    /// a completed cycle and earns no recall prompt.
    pub fn skip(&mut self) -> PhaseChange {
        self.advance(false)
    }

    pub fn tick(&mut self) -> Option<PhaseChange> {
        if !self.running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.phase == Phase::Focus {
            self.focus_secs += 1;
        }
        if self.remaining_secs == 0 {
            Some(self.advance(true))
        } else {
            None
        }
    }

    fn advance(&mut self, completed: bool) -> PhaseChange {
        let from = self.phase;
        let mut recall_prompt = None;
        let to = match from {
            Phase::Focus if !completed => Phase::ShortBreak,
            Phase::Focus => {
                self.cycles_completed += 1;
                let prompt = recall_prompt_for(self.subject);
                self.recall_prompts.push(prompt.clone());
                recall_prompt = Some(prompt);
                if self.cycles_completed % self.settings.cycles_before_long_break == 0 {
                    Phase::LongBreak
                } else {
                    Phase::ShortBreak
                }
            }
            Phase::ShortBreak | Phase::LongBreak => Phase::Focus,
        };
        self.phase = to;
        self.remaining_secs = self.settings.phase_secs(to);
        PhaseChange { from, to, recall_prompt }
    }

    pub fn finish(self, id: i64) -> StudySession {
        StudySession {
            id,
            student_id: self.student_id,
            subject: self.subject,
            focus_minutes: (self.focus_secs / 60) as u32,
            cycles_completed: self.cycles_completed,
            recall_notes: self.recall_prompts,
            finished_at: Utc::now(),
        }
    }
}

const RECALL_GENERIC: &[&str] = &[
    "Close your notes and write down the three key ideas from this session.",
    "Explain what you just studied out loud as if teaching a friend.",
    "List every formula you used in this session from memory.",
];

fn recall_prompt_for(subject: Subject) -> String {
    let specific = match subject {
        Subject::Physics => "Sketch a free-body diagram for the last problem type you solved and state the governing equation.",
        Subject::Chemistry => "Write the reaction or mechanism you studied without looking, then check each step.",
        Subject::Mathematics => "Re-derive the key result you used today and solve one similar problem blind.",
    };
    let mut pool: Vec<&str> = RECALL_GENERIC.to_vec();
    pool.push(specific);
    pool.choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(specific)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_settings() -> FocusSettings {
        FocusSettings {
            focus_minutes: 1,
            short_break_minutes: 1,
            long_break_minutes: 2,
            cycles_before_long_break: 2,
        }
    }

    fn run_phase(timer: &mut FocusTimer) -> PhaseChange {
        loop {
            if let Some(change) = timer.tick() {
                return change;
            }
        }
    }

    #[test]
    fn cycles_through_short_and_long_breaks() {
        let mut timer = FocusTimer::new(1, Subject::Physics, quick_settings()).unwrap();

        let change = run_phase(&mut timer);
        assert_eq!(change.to, Phase::ShortBreak);
        assert!(change.recall_prompt.is_some());

        assert_eq!(run_phase(&mut timer).to, Phase::Focus);
        let change = run_phase(&mut timer);
        assert_eq!(change.to, Phase::LongBreak);
        assert_eq!(timer.remaining_secs, 120);
        assert_eq!(timer.cycles_completed, 2);
    }

    #[test]
    fn paused_timer_does_not_tick() {
        let mut timer = FocusTimer::new(1, Subject::Chemistry, quick_settings()).unwrap();
        timer.pause().unwrap();
        assert!(timer.tick().is_none());
        assert_eq!(timer.remaining_secs, 60);
        assert!(timer.pause().is_err());
        timer.resume().unwrap();
        timer.tick();
        assert_eq!(timer.remaining_secs, 59);
        timer.reset();
        assert_eq!(timer.remaining_secs, 60);
    }

    #[test]
    fn finish_reports_focus_minutes() {
        let mut timer = FocusTimer::new(3, Subject::Mathematics, quick_settings()).unwrap();
        run_phase(&mut timer);
        timer.skip();
        let session = timer.finish(9);
        assert_eq!(session.focus_minutes, 1);
        assert_eq!(session.cycles_completed, 1);
        assert_eq!(session.recall_notes.len(), 1);
    }

    #[test]
    fn skipping_focus_earns_no_cycle() {
        let mut timer = FocusTimer::new(4, Subject::Physics, quick_settings()).unwrap();
        let change = timer.skip();
        assert_eq!(change.to, Phase::ShortBreak);
        assert!(change.recall_prompt.is_none());
        assert_eq!(timer.cycles_completed, 0);
        assert!(timer.recall_prompts.is_empty());

        assert_eq!(timer.skip().to, Phase::Focus);
        assert_eq!(run_phase(&mut timer).to, Phase::ShortBreak);
        assert_eq!(timer.cycles_completed, 1);
    }

    #[test]
    fn rejects_zero_length_phases() {
        let settings = FocusSettings { focus_minutes: 0, ..FocusSettings::default() };
        assert!(FocusTimer::new(1, Subject::Physics, settings).is_err());
    }
}

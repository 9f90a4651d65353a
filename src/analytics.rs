use crate::model::{Subject, TestAttempt};
use crate::syllabus::StudentProgress;
use crate::test_session::accuracy;
use serde::Serialize;
use std::collections::BTreeMap;

const TREND_BAND: f64 = 5.0;
const WEAK_ACCURACY: u32 = 60;

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

#[derive(Serialize, Clone, Debug)]
pub struct StudentAnalytics {
    pub total_attempts: usize,
    pub average_score_percent: f64,
    pub best_score_percent: f64,
    pub average_accuracy: f64,
    pub total_time_secs: u64,
    pub trend: Trend,
    pub subject_accuracy: BTreeMap<Subject, u32>,
    pub weak_subjects: Vec<Subject>,
    pub syllabus_completion: BTreeMap<Subject, f64>,
    pub chart_data: ChartData,
}

// Chart series, one point per attempt in submission order
#[derive(Serialize, Clone, Debug, Default)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub score_percent: Vec<f64>,
    pub accuracy: Vec<u32>,
    pub time_minutes: Vec<f64>,
}

#[derive(Serialize, Clone, Debug)]
pub struct PlatformOverview {
    pub users_by_role: BTreeMap<String, usize>,
    pub total_tests: usize,
    pub total_questions: usize,
    pub total_attempts: usize,
    pub average_score_percent: f64,
}

pub struct AttemptAnalyzer;

impl AttemptAnalyzer {
    pub fn new() -> Self {
        AttemptAnalyzer
    }

    pub fn student_analytics(&self, attempts: &[TestAttempt], progress: &StudentProgress) -> StudentAnalytics {
        let mut ordered: Vec<&TestAttempt> = attempts.iter().collect();
        ordered.sort_by_key(|a| a.submitted_at);

        let percents: Vec<f64> = ordered.iter().map(|a| round1(a.percentage())).collect();
        let total_attempts = ordered.len();
        let average_score_percent = round1(mean(&percents));
        let best_score_percent = percents.iter().cloned().fold(0.0, f64::max);
        let average_accuracy = round1(mean(
            &ordered.iter().map(|a| a.accuracy as f64).collect::<Vec<_>>(),
        ));
        let total_time_secs = ordered.iter().map(|a| a.time_spent_secs).sum();

        let subject_accuracy = self.subject_accuracy(&ordered);
        let weak_subjects = subject_accuracy
            .iter()
            .filter(|(_, &acc)| acc < WEAK_ACCURACY)
            .map(|(subject, _)| *subject)
            .collect();

        StudentAnalytics {
            total_attempts,
            average_score_percent,
            best_score_percent,
            average_accuracy,
            total_time_secs,
            trend: self.determine_trend(&percents),
            subject_accuracy,
            weak_subjects,
            syllabus_completion: progress.subject_percentages(),
            chart_data: self.generate_chart_data(&ordered),
        }
    }

    pub fn platform_overview(
        &self,
        users_by_role: BTreeMap<String, usize>,
        total_tests: usize,
        total_questions: usize,
        attempts: &[TestAttempt],
    ) -> PlatformOverview {
        let percents: Vec<f64> = attempts.iter().map(|a| a.percentage()).collect();
        PlatformOverview {
            users_by_role,
            total_tests,
            total_questions,
            total_attempts: attempts.len(),
            average_score_percent: round1(mean(&percents)),
        }
    }

    fn subject_accuracy(&self, attempts: &[&TestAttempt]) -> BTreeMap<Subject, u32> {
        let mut totals: BTreeMap<Subject, (u32, u32)> = BTreeMap::new();
        for attempt in attempts {
            for (subject, score) in &attempt.by_subject {
                let entry = totals.entry(*subject).or_insert((0, 0));
                entry.0 += score.correct;
                entry.1 += score.correct + score.incorrect;
            }
        }
        totals
            .into_iter()
            .map(|(subject, (correct, attempted))| (subject, accuracy(correct, attempted)))
            .collect()
    }

    fn generate_chart_data(&self, attempts: &[&TestAttempt]) -> ChartData {
        ChartData {
            labels: attempts
                .iter()
                .enumerate()
                .map(|(i, a)| format!("#{} {}", i + 1, a.submitted_at.format("%d %b")))
                .collect(),
            score_percent: attempts.iter().map(|a| round1(a.percentage())).collect(),
            accuracy: attempts.iter().map(|a| a.accuracy).collect(),
            time_minutes: attempts.iter().map(|a| round1(a.time_spent_secs as f64 / 60.0)).collect(),
        }
    }

    fn determine_trend(&self, percents: &[f64]) -> Trend {
        if percents.len() < 2 {
            return Trend::Stable;
        }
        let first = percents[0];
        let last = percents[percents.len() - 1];
        if last > first + TREND_BAND {
            Trend::Improving
        } else if last < first - TREND_BAND {
            Trend::Declining
        } else {
            Trend::Stable
        }
    }
}

impl Default for AttemptAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

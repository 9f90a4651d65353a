use crate::error::{AppError, Result};
use crate::model::{
    Question, QuestionView, Subject, SubjectScore, SubmissionKind, Test, TestAttempt,
};
use chrono::Utc;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    NotStarted,
    InProgress,
    Finished,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "direction", content = "index")]
pub enum Navigation {
    Next,
    Previous,
    Jump(usize),
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ScoreCard {
    pub score: i64,
    pub max_score: i64,
    pub correct: u32,
    pub incorrect: u32,
    pub unattempted: u32,
    pub accuracy: u32,
    pub by_subject: BTreeMap<Subject, SubjectScore>,
}

/// Scores an answer map against the questions of a test.
///
/// Each correct answer earns `marks_correct`, each wrong attempted answer
/// loses `marks_incorrect`, unattempted questions count zero. The total never
/// drops below zero.
pub fn score_answers(
    questions: &[Question],
    answers: &HashMap<i64, usize>,
    marks_correct: u32,
    marks_incorrect: u32,
) -> ScoreCard {
    let mut by_subject: BTreeMap<Subject, (u32, u32, u32)> = BTreeMap::new();

    for question in questions {
        let tally = by_subject.entry(question.subject).or_insert((0, 0, 0));
        match answers.get(&question.id) {
            Some(&choice) if choice == question.correct_option => tally.0 += 1,
            Some(_) => tally.1 += 1,
            None => tally.2 += 1,
        }
    }

    let (correct, incorrect, unattempted) = by_subject
        .values()
        .fold((0, 0, 0), |acc, t| (acc.0 + t.0, acc.1 + t.1, acc.2 + t.2));
    let raw = correct as i64 * marks_correct as i64 - incorrect as i64 * marks_incorrect as i64;

    ScoreCard {
        score: raw.max(0),
        max_score: questions.len() as i64 * marks_correct as i64,
        correct,
        incorrect,
        unattempted,
        accuracy: accuracy(correct, correct + incorrect),
        by_subject: by_subject
            .into_iter()
            .map(|(subject, (c, i, u))| {
                let score = SubjectScore {
                    correct: c,
                    incorrect: i,
                    unattempted: u,
                    accuracy: accuracy(c, c + i),
                };
                (subject, score)
            })
            .collect(),
    }
}

/// Rounded percentage of attempted questions answered correctly.
pub fn accuracy(correct: u32, attempted: u32) -> u32 {
    if attempted == 0 {
        0
    } else {
        (correct as f64 / attempted as f64 * 100.0).round() as u32
    }
}

#[derive(Debug, Clone)]
pub struct TestSession {
    pub id: Uuid,
    pub student_id: i64,
    test: Test,
    questions: Vec<Question>,
    status: SessionStatus,
    current: usize,
    answers: HashMap<i64, usize>,
    remaining_secs: u64,
    elapsed_secs: u64,
}

#[derive(Debug, Serialize, Clone)]
pub struct ReviewItem {
    pub question: Question,
    pub selected: Option<usize>,
    pub is_correct: bool,
}

#[derive(Debug, Serialize, Clone)]
pub struct SessionView {
    pub id: Uuid,
    pub test_id: i64,
    pub test_name: String,
    pub status: SessionStatus,
    pub current_index: usize,
    pub total_questions: usize,
    pub remaining_secs: u64,
    pub current_question: Option<QuestionView>,
    pub answers: HashMap<i64, usize>,
    pub answered: usize,
}

impl TestSession {
    pub fn new(student_id: i64, test: Test, mut questions: Vec<Question>) -> Result<Self> {
        if questions.is_empty() {
            return Err(AppError::Validation(format!("test {} has no questions", test.id)));
        }
        if test.duration_minutes == 0 {
            return Err(AppError::Validation(format!("test {} has no duration", test.id)));
        }
        if test.shuffle {
            questions.shuffle(&mut rand::thread_rng());
        }
        let remaining_secs = test.duration_minutes as u64 * 60;
        Ok(Self {
            id: Uuid::new_v4(),
            student_id,
            test,
            questions,
            status: SessionStatus::NotStarted,
            current: 0,
            answers: HashMap::new(),
            remaining_secs,
            elapsed_secs: 0,
        })
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn start(&mut self) -> Result<()> {
        if self.status != SessionStatus::NotStarted {
            return Err(AppError::InvalidState(format!("session {} already started", self.id)));
        }
        self.status = SessionStatus::InProgress;
        Ok(())
    }

    fn ensure_in_progress(&self) -> Result<()> {
        if self.status != SessionStatus::InProgress {
            return Err(AppError::InvalidState(format!("session {} is not in progress", self.id)));
        }
        Ok(())
    }

    fn question(&self, question_id: i64) -> Result<&Question> {
        self.questions
            .iter()
            .find(|q| q.id == question_id)
            .ok_or_else(|| AppError::not_found("question in session", question_id))
    }

    /// Records an answer; selecting again overwrites the previous choice.
    pub fn select_answer(&mut self, question_id: i64, option: usize) -> Result<()> {
        self.ensure_in_progress()?;
        let question = self.question(question_id)?;
        if option >= question.options.len() {
            return Err(AppError::Validation(format!(
                "option {} out of range for question {}",
                option, question_id
            )));
        }
        self.answers.insert(question_id, option);
        Ok(())
    }

    pub fn clear_answer(&mut self, question_id: i64) -> Result<()> {
        self.ensure_in_progress()?;
        self.question(question_id)?;
        self.answers.remove(&question_id);
        Ok(())
    }

    pub fn navigate(&mut self, nav: Navigation) -> Result<usize> {
        self.ensure_in_progress()?;
        let last = self.questions.len() - 1;
        self.current = match nav {
            Navigation::Next => (self.current + 1).min(last),
            Navigation::Previous => self.current.saturating_sub(1),
            Navigation::Jump(index) if index <= last => index,
            Navigation::Jump(index) => {
                return Err(AppError::Validation(format!(
                    "question index {} out of range 0..={}",
                    index, last
                )))
            }
        };
        Ok(self.current)
    }

    /// Advances the countdown by one second. Returns the attempt when this
    /// tick ran the clock out.
    pub fn tick(&mut self) -> Option<TestAttempt> {
        if self.status != SessionStatus::InProgress {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        self.elapsed_secs += 1;
        if self.remaining_secs == 0 {
            Some(self.finish(SubmissionKind::Auto))
        } else {
            None
        }
    }

    /// Manual submit. Only the first transition out of `InProgress` produces an
    /// attempt.
    pub fn submit(&mut self) -> Result<TestAttempt> {
        self.ensure_in_progress()?;
        Ok(self.finish(SubmissionKind::Manual))
    }

    fn finish(&mut self, submission: SubmissionKind) -> TestAttempt {
        self.status = SessionStatus::Finished;
        let card = score_answers(
            &self.questions,
            &self.answers,
            self.test.marks_correct,
            self.test.marks_incorrect,
        );
        TestAttempt {
            id: 0,
            student_id: self.student_id,
            test_id: self.test.id,
            test_name: self.test.name.clone(),
            score: card.score,
            max_score: card.max_score,
            correct: card.correct,
            incorrect: card.incorrect,
            unattempted: card.unattempted,
            accuracy: card.accuracy,
            time_spent_secs: self.elapsed_secs,
            by_subject: card.by_subject,
            submission,
            submitted_at: Utc::now(),
        }
    }

    /// Answer key with the student's choices. Withheld until the session is
    /// finished.
    pub fn review(&self) -> Result<Vec<ReviewItem>> {
        if self.status != SessionStatus::Finished {
            return Err(AppError::InvalidState(format!("session {} is not finished", self.id)));
        }
        Ok(self
            .questions
            .iter()
            .map(|q| {
                let selected = self.answers.get(&q.id).copied();
                ReviewItem {
                    question: q.clone(),
                    selected,
                    is_correct: selected == Some(q.correct_option),
                }
            })
            .collect())
    }

    pub fn view(&self) -> SessionView {
        let current_question = match self.status {
            SessionStatus::InProgress => self.questions.get(self.current).map(QuestionView::from),
            _ => None,
        };
        SessionView {
            id: self.id,
            test_id: self.test.id,
            test_name: self.test.name.clone(),
            status: self.status,
            current_index: self.current,
            total_questions: self.questions.len(),
            remaining_secs: self.remaining_secs,
            current_question,
            answers: self.answers.clone(),
            answered: self.answers.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: i64, subject: Subject, correct: usize) -> Question {
        Question {
            id,
            subject,
            text: format!("Question {}", id),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct_option: correct,
            explanation: None,
        }
    }

    fn sample_test(minutes: u32) -> Test {
        Test {
            id: 1,
            name: "Mock".to_string(),
            subject: None,
            question_ids: vec![1, 2, 3, 4],
            duration_minutes: minutes,
            marks_correct: 4,
            marks_incorrect: 1,
            published: true,
            shuffle: false,
            created_at: Utc::now(),
        }
    }

    fn sample_questions() -> Vec<Question> {
        vec![
            question(1, Subject::Physics, 0),
            question(2, Subject::Physics, 1),
            question(3, Subject::Chemistry, 2),
            question(4, Subject::Mathematics, 3),
        ]
    }

    #[test]
    fn scores_with_negative_marking() {
        let answers = HashMap::from([(1, 0), (2, 3), (3, 2)]);
        let card = score_answers(&sample_questions(), &answers, 4, 1);
        assert_eq!(card.correct, 2);
        assert_eq!(card.incorrect, 1);
        assert_eq!(card.unattempted, 1);
        assert_eq!(card.score, 7);
        assert_eq!(card.max_score, 16);
        assert_eq!(card.accuracy, 67);
        assert_eq!(card.by_subject[&Subject::Physics].accuracy, 50);
    }

    #[test]
    fn score_is_clamped_at_zero() {
        let answers = HashMap::from([(1, 1), (2, 0), (3, 0)]);
        let card = score_answers(&sample_questions(), &answers, 4, 1);
        assert_eq!(card.score, 0);
        assert_eq!(card.incorrect, 3);
    }

    #[test]
    fn accuracy_is_zero_without_attempts() {
        let card = score_answers(&sample_questions(), &HashMap::new(), 4, 1);
        assert_eq!(card.accuracy, 0);
        assert_eq!(card.unattempted, 4);
        assert_eq!(accuracy(1, 3), 33);
    }

    #[test]
    fn answers_require_a_running_session() {
        let mut session = TestSession::new(10, sample_test(1), sample_questions()).unwrap();
        assert!(session.select_answer(1, 0).is_err());
        session.start().unwrap();
        session.select_answer(1, 2).unwrap();
        session.select_answer(1, 0).unwrap();
        assert_eq!(session.view().answers[&1], 0);
        assert!(matches!(session.select_answer(1, 9), Err(AppError::Validation(_))));
        assert!(matches!(session.select_answer(99, 0), Err(AppError::NotFound(_))));
    }

    #[test]
    fn navigation_is_bounded() {
        let mut session = TestSession::new(10, sample_test(1), sample_questions()).unwrap();
        session.start().unwrap();
        assert_eq!(session.navigate(Navigation::Previous).unwrap(), 0);
        assert_eq!(session.navigate(Navigation::Jump(3)).unwrap(), 3);
        assert_eq!(session.navigate(Navigation::Next).unwrap(), 3);
        assert!(session.navigate(Navigation::Jump(4)).is_err());
        assert_eq!(session.current_index(), 3);
    }

    #[test]
    fn countdown_auto_submits_exactly_once() {
        let mut session = TestSession::new(10, sample_test(1), sample_questions()).unwrap();
        session.start().unwrap();
        session.select_answer(1, 0).unwrap();

        let mut attempts = Vec::new();
        for _ in 0..120 {
            if let Some(attempt) = session.tick() {
                attempts.push(attempt);
            }
        }
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].submission, SubmissionKind::Auto);
        assert_eq!(attempts[0].score, 4);
        assert_eq!(attempts[0].time_spent_secs, 60);
        assert_eq!(session.status(), SessionStatus::Finished);
        assert!(session.submit().is_err());
    }

    #[test]
    fn manual_submit_stops_the_clock() {
        let mut session = TestSession::new(10, sample_test(1), sample_questions()).unwrap();
        session.start().unwrap();
        session.tick();
        let attempt = session.submit().unwrap();
        assert_eq!(attempt.submission, SubmissionKind::Manual);
        assert_eq!(attempt.time_spent_secs, 1);
        assert!(session.tick().is_none());
        assert!(session.view().current_question.is_none());
    }

    #[test]
    fn rejects_empty_tests() {
        assert!(TestSession::new(10, sample_test(1), Vec::new()).is_err());
        assert!(TestSession::new(10, sample_test(0), sample_questions()).is_err());
    }

    #[test]
    fn review_is_withheld_until_finished() {
        let mut session = TestSession::new(10, sample_test(1), sample_questions()).unwrap();
        session.start().unwrap();
        session.select_answer(1, 0).unwrap();
        assert!(session.review().is_err());
        session.submit().unwrap();
        let review = session.review().unwrap();
        assert_eq!(review.len(), 4);
        let first = review.iter().find(|r| r.question.id == 1).unwrap();
        assert_eq!(first.selected, Some(0));
        assert!(review.iter().filter(|r| r.question.id != 1).all(|r| r.selected.is_none()));
    }
}

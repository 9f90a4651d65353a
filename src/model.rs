use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Parent,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Student => "student",
            Role::Parent => "parent",
            Role::Admin => "admin",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub institute: Option<String>,
    pub target_year: Option<i32>,
    pub phone: Option<String>,
    /// Set on parent accounts only.
    pub student_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub institute: Option<String>,
    #[serde(default)]
    pub target_year: Option<i32>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub student_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub institute: Option<String>,
    pub target_year: Option<i32>,
    pub phone: Option<String>,
    pub student_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Physics,
    Chemistry,
    Mathematics,
}

impl Subject {
    pub const ALL: [Subject; 3] = [Subject::Physics, Subject::Chemistry, Subject::Mathematics];

    pub fn name(&self) -> &'static str {
        match self {
            Subject::Physics => "Physics",
            Subject::Chemistry => "Chemistry",
            Subject::Mathematics => "Mathematics",
        }
    }

    pub fn parse(raw: &str) -> Option<Subject> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "physics" | "phy" => Some(Subject::Physics),
            "chemistry" | "chem" => Some(Subject::Chemistry),
            "mathematics" | "maths" | "math" => Some(Subject::Mathematics),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TopicStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Exercise {
    #[serde(rename = "exercise_1")]
    Exercise1,
    #[serde(rename = "exercise_2")]
    Exercise2,
    Miscellaneous,
    Examples,
}

impl Exercise {
    pub fn parse(raw: &str) -> Option<Exercise> {
        match raw {
            "exercise_1" | "ex1" => Some(Exercise::Exercise1),
            "exercise_2" | "ex2" => Some(Exercise::Exercise2),
            "miscellaneous" | "misc" => Some(Exercise::Miscellaneous),
            "examples" => Some(Exercise::Examples),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExerciseCounter {
    pub solved: u32,
    pub total: u32,
}

impl ExerciseCounter {
    /// Builds a counter from raw signed input: negatives become zero and
    /// `solved` never exceeds `total`.
    pub fn clamped(solved: i64, total: i64) -> Self {
        let total = total.clamp(0, u32::MAX as i64) as u32;
        let solved = solved.clamp(0, total as i64) as u32;
        Self { solved, total }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct TopicProgress {
    pub status: TopicStatus,
    pub exercises: BTreeMap<Exercise, ExerciseCounter>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Question {
    pub id: i64,
    pub subject: Subject,
    pub text: String,
    pub options: Vec<String>,
    pub correct_option: usize,
    pub explanation: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NewQuestion {
    pub subject: Subject,
    pub text: String,
    pub options: Vec<String>,
    pub correct_option: usize,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// A question as shown to a student mid-test.
#[derive(Debug, Serialize, Clone)]
pub struct QuestionView {
    pub id: i64,
    pub subject: Subject,
    pub text: String,
    pub options: Vec<String>,
}

impl From<&Question> for QuestionView {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            subject: q.subject,
            text: q.text.clone(),
            options: q.options.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Test {
    pub id: i64,
    pub name: String,
    pub subject: Option<Subject>,
    pub question_ids: Vec<i64>,
    pub duration_minutes: u32,
    pub marks_correct: u32,
    pub marks_incorrect: u32,
    pub published: bool,
    #[serde(default)]
    pub shuffle: bool,
    pub created_at: DateTime<Utc>,
}

fn default_marks_correct() -> u32 {
    4
}

fn default_marks_incorrect() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NewTest {
    pub name: String,
    #[serde(default)]
    pub subject: Option<Subject>,
    pub question_ids: Vec<i64>,
    pub duration_minutes: u32,
    #[serde(default = "default_marks_correct")]
    pub marks_correct: u32,
    #[serde(default = "default_marks_incorrect")]
    pub marks_incorrect: u32,
    #[serde(default = "default_true")]
    pub published: bool,
    #[serde(default)]
    pub shuffle: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionKind {
    Manual,
    Auto,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SubjectScore {
    pub correct: u32,
    pub incorrect: u32,
    pub unattempted: u32,
    pub accuracy: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TestAttempt {
    pub id: i64,
    pub student_id: i64,
    pub test_id: i64,
    pub test_name: String,
    pub score: i64,
    pub max_score: i64,
    pub correct: u32,
    pub incorrect: u32,
    pub unattempted: u32,
    pub accuracy: u32,
    pub time_spent_secs: u64,
    pub by_subject: BTreeMap<Subject, SubjectScore>,
    pub submission: SubmissionKind,
    pub submitted_at: DateTime<Utc>,
}

impl TestAttempt {
    pub fn percentage(&self) -> f64 {
        if self.max_score <= 0 {
            0.0
        } else {
            self.score as f64 / self.max_score as f64 * 100.0
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Info,
    Warning,
    Success,
    Exam,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    All,
    Student,
    Parent,
    Admin,
}

impl Audience {
    pub fn includes(&self, role: Role) -> bool {
        matches!(
            (self, role),
            (Audience::All, _)
                | (Audience::Student, Role::Student)
                | (Audience::Parent, Role::Parent)
                | (Audience::Admin, Role::Admin)
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Notification {
    pub id: i64,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub target: Audience,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    #[serde(default = "default_audience")]
    pub target: Audience,
}

fn default_audience() -> Audience {
    Audience::All
}

/// A fixed window of the day, e.g. school or coaching hours.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TimetableConfig {
    pub wake_time: NaiveTime,
    pub sleep_time: NaiveTime,
    #[serde(default)]
    pub school: Option<TimeWindow>,
    #[serde(default)]
    pub coaching: Option<TimeWindow>,
    pub study_block_minutes: u32,
    pub break_minutes: u32,
    pub subjects: Vec<Subject>,
}

impl Default for TimetableConfig {
    fn default() -> Self {
        let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default();
        Self {
            wake_time: at(6, 0),
            sleep_time: at(22, 30),
            school: Some(TimeWindow { start: at(8, 0), end: at(14, 0) }),
            coaching: Some(TimeWindow { start: at(16, 0), end: at(19, 0) }),
            study_block_minutes: 60,
            break_minutes: 10,
            subjects: Subject::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StudySession {
    pub id: i64,
    pub student_id: i64,
    pub subject: Subject,
    pub focus_minutes: u32,
    pub cycles_completed: u32,
    pub recall_notes: Vec<String>,
    pub finished_at: DateTime<Utc>,
}

use crate::error::{AppError, Result};
use crate::focus::FocusTimer;
use crate::model::{
    NewNotification, NewQuestion, NewTest, NewUser, Notification, Question, Role, StudySession,
    Test, TestAttempt, TimetableConfig, User, UserUpdate,
};
use crate::syllabus::StudentProgress;
use crate::test_session::TestSession;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

/// All application state for one process. Nothing here survives a restart.
#[derive(Debug, Default)]
pub struct Store {
    next_id: i64,
    users: BTreeMap<i64, User>,
    progress: HashMap<i64, StudentProgress>,
    questions: BTreeMap<i64, Question>,
    tests: BTreeMap<i64, Test>,
    attempts: Vec<TestAttempt>,
    notifications: Vec<Notification>,
    timetables: HashMap<i64, TimetableConfig>,
    sessions: HashMap<Uuid, TestSession>,
    focus: HashMap<i64, FocusTimer>,
    study_sessions: Vec<StudySession>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    // ---- users ----

    pub fn users(&self) -> Vec<User> {
        self.users.values().cloned().collect()
    }

    pub fn user(&self, id: i64) -> Result<&User> {
        self.users.get(&id).ok_or_else(|| AppError::not_found("user", id))
    }

    pub fn student(&self, id: i64) -> Result<&User> {
        let user = self.user(id)?;
        if user.role != Role::Student {
            return Err(AppError::Validation(format!("user {} is not a student", id)));
        }
        Ok(user)
    }

    pub fn find_user_by_email(&self, email: &str, role: Role) -> Option<&User> {
        self.users
            .values()
            .find(|u| u.role == role && u.email.eq_ignore_ascii_case(email))
    }

    pub fn create_user(&mut self, new: NewUser) -> Result<User> {
        let email = new.email.trim().to_ascii_lowercase();
        if new.name.trim().is_empty() || !email.contains('@') {
            return Err(AppError::Validation("name and a valid email are required".to_string()));
        }
        if self.users.values().any(|u| u.email == email) {
            return Err(AppError::Conflict(format!("email {} already registered", email)));
        }
        if let Some(student_id) = new.student_id {
            self.student(student_id)?;
        }
        let user = User {
            id: self.allocate_id(),
            name: new.name.trim().to_string(),
            email,
            role: new.role,
            institute: new.institute,
            target_year: new.target_year,
            phone: new.phone,
            student_id: if new.role == Role::Parent { new.student_id } else { None },
            created_at: Utc::now(),
        };
        if user.role == Role::Student {
            self.progress.insert(user.id, StudentProgress::new());
        }
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn update_user(&mut self, id: i64, update: UserUpdate) -> Result<User> {
        if let Some(student_id) = update.student_id {
            self.student(student_id)?;
        }
        let user = self.users.get_mut(&id).ok_or_else(|| AppError::not_found("user", id))?;
        if let Some(name) = update.name.filter(|n| !n.trim().is_empty()) {
            user.name = name.trim().to_string();
        }
        if update.institute.is_some() {
            user.institute = update.institute;
        }
        if update.target_year.is_some() {
            user.target_year = update.target_year;
        }
        if update.phone.is_some() {
            user.phone = update.phone;
        }
        if user.role == Role::Parent && update.student_id.is_some() {
            user.student_id = update.student_id;
        }
        Ok(user.clone())
    }

    pub fn delete_user(&mut self, id: i64) -> Result<User> {
        let user = self.users.remove(&id).ok_or_else(|| AppError::not_found("user", id))?;
        self.progress.remove(&id);
        self.timetables.remove(&id);
        self.focus.remove(&id);
        self.sessions.retain(|_, session| session.student_id != id);
        self.attempts.retain(|attempt| attempt.student_id != id);
        self.study_sessions.retain(|session| session.student_id != id);
        for parent in self.users.values_mut() {
            if parent.student_id == Some(id) {
                parent.student_id = None;
            }
        }
        Ok(user)
    }

    // ---- syllabus progress ----

    pub fn progress(&self, student_id: i64) -> Result<StudentProgress> {
        self.student(student_id)?;
        Ok(self.progress.get(&student_id).cloned().unwrap_or_default())
    }

    pub fn progress_mut(&mut self, student_id: i64) -> Result<&mut StudentProgress> {
        self.student(student_id)?;
        Ok(self.progress.entry(student_id).or_default())
    }

    // ---- questions ----

    pub fn questions(&self) -> Vec<Question> {
        self.questions.values().cloned().collect()
    }

    pub fn question(&self, id: i64) -> Result<&Question> {
        self.questions.get(&id).ok_or_else(|| AppError::not_found("question", id))
    }

    fn check_question(new: &NewQuestion) -> Result<()> {
        if new.text.trim().is_empty() {
            return Err(AppError::Validation("question text is required".to_string()));
        }
        if new.options.len() < 2 {
            return Err(AppError::Validation("a question needs at least two options".to_string()));
        }
        if new.correct_option >= new.options.len() {
            return Err(AppError::Validation(format!(
                "correct option {} out of range",
                new.correct_option
            )));
        }
        Ok(())
    }

    pub fn create_question(&mut self, new: NewQuestion) -> Result<Question> {
        Self::check_question(&new)?;
        let question = Question {
            id: self.allocate_id(),
            subject: new.subject,
            text: new.text,
            options: new.options,
            correct_option: new.correct_option,
            explanation: new.explanation,
        };
        self.questions.insert(question.id, question.clone());
        Ok(question)
    }

    /// Adds a batch of questions. Nothing is stored unless every one is valid.
    pub fn import_questions(&mut self, batch: Vec<NewQuestion>) -> Result<Vec<Question>> {
        for (index, new) in batch.iter().enumerate() {
            Self::check_question(new).map_err(|e| match e {
                AppError::Validation(msg) => {
                    AppError::Validation(format!("question {}: {}", index + 1, msg))
                }
                other => other,
            })?;
        }
        batch.into_iter().map(|new| self.create_question(new)).collect()
    }

    pub fn update_question(&mut self, id: i64, new: NewQuestion) -> Result<Question> {
        Self::check_question(&new)?;
        let question = self.questions.get_mut(&id).ok_or_else(|| AppError::not_found("question", id))?;
        question.subject = new.subject;
        question.text = new.text;
        question.options = new.options;
        question.correct_option = new.correct_option;
        question.explanation = new.explanation;
        Ok(question.clone())
    }

    /// Removes the question and drops it from every test that referenced it.
    pub fn delete_question(&mut self, id: i64) -> Result<Question> {
        let question = self.questions.remove(&id).ok_or_else(|| AppError::not_found("question", id))?;
        for test in self.tests.values_mut() {
            test.question_ids.retain(|qid| *qid != id);
        }
        Ok(question)
    }

    // ---- tests ----

    pub fn tests(&self, published_only: bool) -> Vec<Test> {
        self.tests
            .values()
            .filter(|t| !published_only || t.published)
            .cloned()
            .collect()
    }

    pub fn test(&self, id: i64) -> Result<&Test> {
        self.tests.get(&id).ok_or_else(|| AppError::not_found("test", id))
    }

    fn check_test(&self, new: &NewTest) -> Result<()> {
        if new.name.trim().is_empty() {
            return Err(AppError::Validation("test name is required".to_string()));
        }
        if new.duration_minutes == 0 {
            return Err(AppError::Validation("duration must be positive".to_string()));
        }
        let mut seen = HashSet::new();
        for qid in &new.question_ids {
            if !seen.insert(*qid) {
                return Err(AppError::Validation(format!("question {} listed twice", qid)));
            }
            self.question(*qid)?;
        }
        Ok(())
    }

    pub fn create_test(&mut self, new: NewTest) -> Result<Test> {
        self.check_test(&new)?;
        let test = Test {
            id: self.allocate_id(),
            name: new.name.trim().to_string(),
            subject: new.subject,
            question_ids: new.question_ids,
            duration_minutes: new.duration_minutes,
            marks_correct: new.marks_correct,
            marks_incorrect: new.marks_incorrect,
            published: new.published,
            shuffle: new.shuffle,
            created_at: Utc::now(),
        };
        self.tests.insert(test.id, test.clone());
        Ok(test)
    }

    pub fn update_test(&mut self, id: i64, new: NewTest) -> Result<Test> {
        self.check_test(&new)?;
        let test = self.tests.get_mut(&id).ok_or_else(|| AppError::not_found("test", id))?;
        test.name = new.name.trim().to_string();
        test.subject = new.subject;
        test.question_ids = new.question_ids;
        test.duration_minutes = new.duration_minutes;
        test.marks_correct = new.marks_correct;
        test.marks_incorrect = new.marks_incorrect;
        test.published = new.published;
        test.shuffle = new.shuffle;
        Ok(test.clone())
    }

    pub fn delete_test(&mut self, id: i64) -> Result<Test> {
        self.tests.remove(&id).ok_or_else(|| AppError::not_found("test", id))
    }

    pub fn test_questions(&self, test: &Test) -> Result<Vec<Question>> {
        test.question_ids
            .iter()
            .map(|qid| self.question(*qid).cloned())
            .collect()
    }

    // ---- test sessions and attempts ----

    pub fn begin_session(&mut self, student_id: i64, test_id: i64) -> Result<&TestSession> {
        self.student(student_id)?;
        let test = self.test(test_id)?.clone();
        if !test.published {
            return Err(AppError::InvalidState(format!("test {} is not published", test_id)));
        }
        let questions = self.test_questions(&test)?;
        let mut session = TestSession::new(student_id, test, questions)?;
        session.start()?;
        let session = self.sessions.entry(session.id).or_insert(session);
        Ok(&*session)
    }

    pub fn session(&self, id: Uuid) -> Result<&TestSession> {
        self.sessions.get(&id).ok_or_else(|| AppError::not_found("session", id))
    }

    pub fn session_mut(&mut self, id: Uuid) -> Result<&mut TestSession> {
        self.sessions.get_mut(&id).ok_or_else(|| AppError::not_found("session", id))
    }

    /// Appends a finished attempt to history, assigning its id.
    pub fn record_attempt(&mut self, mut attempt: TestAttempt) -> TestAttempt {
        attempt.id = self.allocate_id();
        self.attempts.push(attempt.clone());
        attempt
    }

    pub fn attempts_for(&self, student_id: i64) -> Vec<TestAttempt> {
        self.attempts
            .iter()
            .filter(|a| a.student_id == student_id)
            .cloned()
            .collect()
    }

    pub fn all_attempts(&self) -> &[TestAttempt] {
        &self.attempts
    }

    // ---- notifications ----

    pub fn notifications(&self, role: Option<Role>) -> Vec<Notification> {
        let mut list: Vec<Notification> = self
            .notifications
            .iter()
            .filter(|n| role.map_or(true, |r| n.target.includes(r)))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        list
    }

    pub fn create_notification(&mut self, new: NewNotification) -> Result<Notification> {
        if new.title.trim().is_empty() || new.message.trim().is_empty() {
            return Err(AppError::Validation("title and message are required".to_string()));
        }
        let notification = Notification {
            id: self.allocate_id(),
            title: new.title,
            message: new.message,
            kind: new.kind,
            target: new.target,
            created_at: Utc::now(),
        };
        self.notifications.push(notification.clone());
        Ok(notification)
    }

    pub fn delete_notification(&mut self, id: i64) -> Result<Notification> {
        let index = self
            .notifications
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| AppError::not_found("notification", id))?;
        Ok(self.notifications.remove(index))
    }

    // ---- timetable ----

    pub fn timetable_config(&self, student_id: i64) -> Result<TimetableConfig> {
        self.student(student_id)?;
        Ok(self.timetables.get(&student_id).cloned().unwrap_or_default())
    }

    pub fn save_timetable_config(&mut self, student_id: i64, config: TimetableConfig) -> Result<()> {
        self.student(student_id)?;
        self.timetables.insert(student_id, config);
        Ok(())
    }

    // ---- focus timer ----

    pub fn start_focus(&mut self, timer: FocusTimer) -> Result<&FocusTimer> {
        self.student(timer.student_id)?;
        if self.focus.contains_key(&timer.student_id) {
            return Err(AppError::InvalidState(format!(
                "student {} already has a focus session",
                timer.student_id
            )));
        }
        let timer = self.focus.entry(timer.student_id).or_insert(timer);
        Ok(&*timer)
    }

    pub fn focus(&self, student_id: i64) -> Result<&FocusTimer> {
        self.focus
            .get(&student_id)
            .ok_or_else(|| AppError::not_found("focus session for student", student_id))
    }

    pub fn focus_mut(&mut self, student_id: i64) -> Result<&mut FocusTimer> {
        self.focus
            .get_mut(&student_id)
            .ok_or_else(|| AppError::not_found("focus session for student", student_id))
    }

    pub fn finish_focus(&mut self, student_id: i64) -> Result<StudySession> {
        let timer = self
            .focus
            .remove(&student_id)
            .ok_or_else(|| AppError::not_found("focus session for student", student_id))?;
        let session = timer.finish(self.allocate_id());
        self.study_sessions.push(session.clone());
        Ok(session)
    }

    pub fn study_sessions(&self, student_id: i64) -> Vec<StudySession> {
        self.study_sessions
            .iter()
            .filter(|s| s.student_id == student_id)
            .cloned()
            .collect()
    }

    pub fn user_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for user in self.users.values() {
            *counts.entry(user.role.to_string()).or_insert(0) += 1;
        }
        counts
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}

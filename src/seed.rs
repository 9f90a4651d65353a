use crate::error::Result;
use crate::model::{
    Audience, Exercise, NewNotification, NewQuestion, NewTest, NewUser, NotificationKind, Role,
    Subject, SubmissionKind, TestAttempt, TopicStatus,
};
use crate::store::Store;
use crate::test_session::score_answers;
use chrono::{Duration, Utc};
use std::collections::HashMap;

struct DemoQuestion {
    subject: Subject,
    text: &'static str,
    options: [&'static str; 4],
    correct: usize,
    explanation: &'static str,
}

const DEMO_QUESTIONS: &[DemoQuestion] = &[
    DemoQuestion { subject: Subject::Physics, text: "A body moves with constant velocity. The net force on it is", options: ["Zero", "Constant and non-zero", "Increasing", "Decreasing"], correct: 0, explanation: "Newton's first law: no acceleration means no net force." },
    DemoQuestion { subject: Subject::Physics, text: "The dimensional formula of work is", options: ["[MLT^-2]", "[ML^2T^-2]", "[ML^2T^-3]", "[MLT^-1]"], correct: 1, explanation: "Work = force x distance." },
    DemoQuestion { subject: Subject::Physics, text: "A projectile has maximum range when launched at", options: ["30 degrees", "45 degrees", "60 degrees", "90 degrees"], correct: 1, explanation: "R = u^2 sin(2θ)/g is maximum at 2θ = 90 degrees." },
    DemoQuestion { subject: Subject::Physics, text: "The SI unit of capacitance is", options: ["Henry", "Tesla", "Farad", "Weber"], correct: 2, explanation: "Capacitance is measured in farads." },
    DemoQuestion { subject: Subject::Chemistry, text: "The number of moles in 22 g of CO2 is", options: ["0.25", "0.5", "1", "2"], correct: 1, explanation: "Molar mass of CO2 is 44 g/mol." },
    DemoQuestion { subject: Subject::Chemistry, text: "The shape of a methane molecule is", options: ["Square planar", "Trigonal planar", "Tetrahedral", "Linear"], correct: 2, explanation: "sp3 hybridisation gives a tetrahedral geometry." },
    DemoQuestion { subject: Subject::Chemistry, text: "Which quantum number describes orbital shape?", options: ["Principal", "Azimuthal", "Magnetic", "Spin"], correct: 1, explanation: "The azimuthal quantum number l fixes the subshell shape." },
    DemoQuestion { subject: Subject::Chemistry, text: "A first-order reaction has a half-life that", options: ["Depends on initial concentration", "Is independent of concentration", "Doubles each period", "Is always one second"], correct: 1, explanation: "t1/2 = 0.693/k for first-order kinetics." },
    DemoQuestion { subject: Subject::Mathematics, text: "The derivative of sin(x) is", options: ["-cos(x)", "cos(x)", "tan(x)", "-sin(x)"], correct: 1, explanation: "d/dx sin x = cos x." },
    DemoQuestion { subject: Subject::Mathematics, text: "The sum of the first 10 natural numbers is", options: ["45", "50", "55", "100"], correct: 2, explanation: "n(n+1)/2 with n = 10." },
    DemoQuestion { subject: Subject::Mathematics, text: "The modulus of 3 + 4i is", options: ["5", "7", "1", "25"], correct: 0, explanation: "sqrt(3^2 + 4^2) = 5." },
    DemoQuestion { subject: Subject::Mathematics, text: "The determinant of the 2x2 identity matrix is", options: ["0", "1", "2", "-1"], correct: 1, explanation: "The product of the diagonal entries is 1." },
];

/// Populates an empty store with the demo accounts, question bank, tests and
/// a short attempt history.
pub fn seed_demo(store: &mut Store) -> Result<()> {
    store.create_user(NewUser {
        name: "Admin".to_string(),
        email: "admin@jeeprep.dev".to_string(),
        role: Role::Admin,
        institute: None,
        target_year: None,
        phone: None,
        student_id: None,
    })?;
    let student = store.create_user(NewUser {
        name: "Aarav Sharma".to_string(),
        email: "student@jeeprep.dev".to_string(),
        role: Role::Student,
        institute: Some("Kota Coaching Centre".to_string()),
        target_year: Some(2027),
        phone: Some("+91 98765 43210".to_string()),
        student_id: None,
    })?;
    store.create_user(NewUser {
        name: "Meera Sharma".to_string(),
        email: "parent@jeeprep.dev".to_string(),
        role: Role::Parent,
        institute: None,
        target_year: None,
        phone: Some("+91 98765 43211".to_string()),
        student_id: Some(student.id),
    })?;

    let mut question_ids: HashMap<Subject, Vec<i64>> = HashMap::new();
    for demo in DEMO_QUESTIONS {
        let question = store.create_question(NewQuestion {
            subject: demo.subject,
            text: demo.text.to_string(),
            options: demo.options.iter().map(|o| o.to_string()).collect(),
            correct_option: demo.correct,
            explanation: Some(demo.explanation.to_string()),
        })?;
        question_ids.entry(demo.subject).or_default().push(question.id);
    }

    let mut full_mock: Vec<i64> = Vec::new();
    for subject in Subject::ALL {
        full_mock.extend(question_ids.get(&subject).cloned().unwrap_or_default());
    }
    let mock = store.create_test(NewTest {
        name: "JEE Main Mock Test 1".to_string(),
        subject: None,
        question_ids: full_mock,
        duration_minutes: 30,
        marks_correct: 4,
        marks_incorrect: 1,
        published: true,
        shuffle: false,
    })?;
    store.create_test(NewTest {
        name: "Physics Chapter Test: Mechanics".to_string(),
        subject: Some(Subject::Physics),
        question_ids: question_ids.get(&Subject::Physics).cloned().unwrap_or_default(),
        duration_minutes: 10,
        marks_correct: 4,
        marks_incorrect: 1,
        published: true,
        shuffle: true,
    })?;

    let progress = store.progress_mut(student.id)?;
    progress.set_status("phy-02-a", TopicStatus::Completed)?;
    progress.set_status("phy-03-a", TopicStatus::InProgress)?;
    progress.update_counter("phy-03-a", Exercise::Exercise1, 12, 20)?;
    progress.update_counter("che-01-a", Exercise::Examples, 8, 10)?;
    progress.set_status("mat-08-a", TopicStatus::InProgress)?;
    progress.update_counter("mat-08-a", Exercise::Exercise2, 5, 15)?;

    // three past runs of the mock test with improving answer sheets
    let questions = store.test_questions(&mock)?;
    let sheets: [&[usize]; 3] = [
        &[0, 2, 1, 2, 1, 0, 1, 0, 1, 2],
        &[0, 1, 1, 2, 1, 2, 0, 1, 1, 2, 0],
        &[0, 1, 1, 2, 1, 2, 1, 1, 1, 2, 0, 1],
    ];
    for (days_ago, sheet) in [(6i64, sheets[0]), (4, sheets[1]), (1, sheets[2])] {
        let answers: HashMap<i64, usize> = questions
            .iter()
            .zip(sheet.iter())
            .map(|(q, choice)| (q.id, *choice))
            .collect();
        let card = score_answers(&questions, &answers, mock.marks_correct, mock.marks_incorrect);
        store.record_attempt(TestAttempt {
            id: 0,
            student_id: student.id,
            test_id: mock.id,
            test_name: mock.name.clone(),
            score: card.score,
            max_score: card.max_score,
            correct: card.correct,
            incorrect: card.incorrect,
            unattempted: card.unattempted,
            accuracy: card.accuracy,
            time_spent_secs: 1_200 + days_ago as u64 * 60,
            by_subject: card.by_subject,
            submission: SubmissionKind::Manual,
            submitted_at: Utc::now() - Duration::days(days_ago),
        });
    }

    store.create_notification(NewNotification {
        title: "Mock Test 1 is live".to_string(),
        message: "Attempt the full-syllabus mock before Sunday.".to_string(),
        kind: NotificationKind::Exam,
        target: Audience::Student,
    })?;
    store.create_notification(NewNotification {
        title: "Parent-teacher meeting".to_string(),
        message: "Progress review on Saturday at 10 AM.".to_string(),
        kind: NotificationKind::Info,
        target: Audience::Parent,
    })?;

    Ok(())
}

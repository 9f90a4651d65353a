use crate::error::{AppError, Result};
use crate::model::{NewQuestion, Subject, TestAttempt};
use csv::{ReaderBuilder, Writer};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct QuestionRow {
    subject: String,
    text: String,
    option_a: String,
    option_b: String,
    #[serde(default)]
    option_c: String,
    #[serde(default)]
    option_d: String,
    correct: String,
    #[serde(default)]
    explanation: String,
}

/// Parses a question bank CSV with header
/// `subject,text,option_a,option_b,option_c,option_d,correct,explanation`.
/// `correct` is a letter (A-D) or a zero-based index.
pub fn load_questions(csv_text: &str) -> Result<Vec<NewQuestion>> {
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::All).from_reader(csv_text.as_bytes());
    let mut questions = Vec::new();

    for (line, result) in rdr.deserialize::<QuestionRow>().enumerate() {
        let row = result?;
        let row_no = line + 2;
        let subject = Subject::parse(&row.subject).ok_or_else(|| {
            AppError::Validation(format!("row {}: unknown subject {:?}", row_no, row.subject))
        })?;
        let mut options = vec![row.option_a, row.option_b, row.option_c, row.option_d];
        while options.last().is_some_and(|o| o.is_empty()) {
            options.pop();
        }
        if options.iter().any(|o| o.is_empty()) {
            return Err(AppError::Validation(format!(
                "row {}: blank option before a filled one",
                row_no
            )));
        }
        let correct_option = parse_correct(&row.correct)
            .filter(|idx| *idx < options.len())
            .ok_or_else(|| {
                AppError::Validation(format!("row {}: bad correct option {:?}", row_no, row.correct))
            })?;
        questions.push(NewQuestion {
            subject,
            text: row.text,
            options,
            correct_option,
            explanation: Some(row.explanation).filter(|e| !e.is_empty()),
        });
    }

    if questions.is_empty() {
        return Err(AppError::Validation("no questions found in CSV".to_string()));
    }
    Ok(questions)
}

fn parse_correct(raw: &str) -> Option<usize> {
    match raw.to_ascii_uppercase().as_str() {
        "A" => Some(0),
        "B" => Some(1),
        "C" => Some(2),
        "D" => Some(3),
        other => other.parse().ok(),
    }
}

pub fn export_attempts(attempts: &[TestAttempt]) -> Result<String> {
    let mut wtr = Writer::from_writer(Vec::new());
    wtr.write_record([
        "attempt_id",
        "student_id",
        "test_id",
        "test_name",
        "score",
        "max_score",
        "correct",
        "incorrect",
        "unattempted",
        "accuracy",
        "time_spent_secs",
        "submission",
        "submitted_at",
    ])?;
    for a in attempts {
        let submission = match a.submission {
            crate::model::SubmissionKind::Manual => "manual",
            crate::model::SubmissionKind::Auto => "auto",
        };
        wtr.write_record([
            a.id.to_string(),
            a.student_id.to_string(),
            a.test_id.to_string(),
            a.test_name.clone(),
            a.score.to_string(),
            a.max_score.to_string(),
            a.correct.to_string(),
            a.incorrect.to_string(),
            a.unattempted.to_string(),
            a.accuracy.to_string(),
            a.time_spent_secs.to_string(),
            submission.to_string(),
            a.submitted_at.to_rfc3339(),
        ])?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| AppError::Validation(format!("csv: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Validation(format!("csv: {}", e)))
}

use crate::error::{AppError, Result};
use crate::model::{Subject, TimeWindow, TimetableConfig};
use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const MIN_BLOCK_MINUTES: i64 = 15;
const ROUTINE_MINUTES: i64 = 30;
const LUNCH_MINUTES: i64 = 45;
const DINNER_MINUTES: i64 = 30;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Routine,
    School,
    Coaching,
    Meal,
    Study,
    Break,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScheduleBlock {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub kind: BlockKind,
    pub subject: Option<Subject>,
    pub label: String,
    pub minutes: i64,
}

impl ScheduleBlock {
    fn new(start: NaiveTime, end: NaiveTime, kind: BlockKind, label: &str) -> Self {
        Self {
            start,
            end,
            kind,
            subject: None,
            label: label.to_string(),
            minutes: (end - start).num_minutes(),
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct DailySchedule {
    pub blocks: Vec<ScheduleBlock>,
    pub total_study_minutes: i64,
    pub study_minutes_by_subject: BTreeMap<Subject, i64>,
}

fn at(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

/// Adds minutes without wrapping past midnight.
fn add_minutes(time: NaiveTime, minutes: i64) -> Option<NaiveTime> {
    let (next, wrapped) = time.overflowing_add_signed(Duration::minutes(minutes));
    (wrapped == 0).then_some(next)
}

fn overlaps(a: &ScheduleBlock, b: &ScheduleBlock) -> bool {
    a.start < b.end && b.start < a.end
}

fn validate_window(name: &str, window: &TimeWindow, config: &TimetableConfig) -> Result<()> {
    if window.start >= window.end {
        return Err(AppError::Validation(format!("{} window must end after it starts", name)));
    }
    if window.start < config.wake_time || window.end > config.sleep_time {
        return Err(AppError::Validation(format!(
            "{} window must fall between wake and sleep time",
            name
        )));
    }
    Ok(())
}

pub fn validate(config: &TimetableConfig) -> Result<()> {
    if config.sleep_time <= config.wake_time {
        return Err(AppError::Validation("sleep time must be after wake time".to_string()));
    }
    if (config.study_block_minutes as i64) < MIN_BLOCK_MINUTES {
        return Err(AppError::Validation(format!(
            "study blocks must be at least {} minutes",
            MIN_BLOCK_MINUTES
        )));
    }
    if config.subjects.is_empty() {
        return Err(AppError::Validation("at least one subject is required".to_string()));
    }
    if let Some(school) = &config.school {
        validate_window("school", school, config)?;
    }
    if let Some(coaching) = &config.coaching {
        validate_window("coaching", coaching, config)?;
    }
    if let (Some(school), Some(coaching)) = (&config.school, &config.coaching) {
        if school.start < coaching.end && coaching.start < school.end {
            return Err(AppError::Validation("school and coaching windows overlap".to_string()));
        }
    }
    Ok(())
}

fn fixed_blocks(config: &TimetableConfig) -> Vec<ScheduleBlock> {
    let mut fixed = Vec::new();
    if let Some(school) = config.school {
        fixed.push(ScheduleBlock::new(school.start, school.end, BlockKind::School, "School"));
    }
    if let Some(coaching) = config.coaching {
        fixed.push(ScheduleBlock::new(coaching.start, coaching.end, BlockKind::Coaching, "Coaching"));
    }

    let lunch_start = config.school.map(|s| s.end).unwrap_or_else(|| at(13, 0));
    let optional = [
        (config.wake_time, ROUTINE_MINUTES, BlockKind::Routine, "Morning routine"),
        (lunch_start, LUNCH_MINUTES, BlockKind::Meal, "Lunch"),
        (at(20, 0), DINNER_MINUTES, BlockKind::Meal, "Dinner"),
    ];
    for (start, minutes, kind, label) in optional {
        let Some(end) = add_minutes(start, minutes) else { continue };
        if start < config.wake_time || end > config.sleep_time {
            continue;
        }
        let block = ScheduleBlock::new(start, end, kind, label);
        // skipped when it collides with school or coaching
        if !fixed.iter().any(|other| overlaps(other, &block)) {
            fixed.push(block);
        }
    }

    fixed.sort_by_key(|block| block.start);
    fixed
}

/// Builds one day's timetable: fixed commitments first, every free gap then
/// filled with study blocks separated by breaks, rotating subjects.
pub fn generate(config: &TimetableConfig) -> Result<DailySchedule> {
    validate(config)?;

    let fixed = fixed_blocks(config);
    let mut blocks = Vec::new();
    let mut rotation = config.subjects.iter().cycle();
    let mut cursor = config.wake_time;

    let mut fill_gap = |from: NaiveTime, to: NaiveTime, blocks: &mut Vec<ScheduleBlock>| {
        let mut start = from;
        while (to - start).num_minutes() >= MIN_BLOCK_MINUTES {
            let length = (config.study_block_minutes as i64).min((to - start).num_minutes());
            let Some(end) = add_minutes(start, length) else { break };
            let subject = rotation.next().copied();
            blocks.push(ScheduleBlock {
                subject,
                label: format!("Study: {}", subject.map(|s| s.name()).unwrap_or("Revision")),
                ..ScheduleBlock::new(start, end, BlockKind::Study, "")
            });
            start = end;

            let Some(after_break) = add_minutes(start, config.break_minutes as i64) else { break };
            if config.break_minutes == 0 {
                continue;
            }
            if after_break >= to || (to - after_break).num_minutes() < MIN_BLOCK_MINUTES {
                break;
            }
            blocks.push(ScheduleBlock::new(start, after_break, BlockKind::Break, "Break"));
            start = after_break;
        }
    };

    for block in &fixed {
        if block.start > cursor {
            fill_gap(cursor, block.start, &mut blocks);
        }
        cursor = cursor.max(block.end);
        blocks.push(block.clone());
    }
    if config.sleep_time > cursor {
        fill_gap(cursor, config.sleep_time, &mut blocks);
    }

    let mut study_minutes_by_subject = BTreeMap::new();
    for block in blocks.iter().filter(|b| b.kind == BlockKind::Study) {
        if let Some(subject) = block.subject {
            *study_minutes_by_subject.entry(subject).or_insert(0) += block.minutes;
        }
    }

    Ok(DailySchedule {
        total_study_minutes: study_minutes_by_subject.values().sum(),
        study_minutes_by_subject,
        blocks,
    })
}

use crate::error::{AppError, Result};
use crate::model::{Exercise, ExerciseCounter, Subject, TopicProgress, TopicStatus};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Serialize, Clone, Copy)]
pub struct Topic {
    pub id: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Serialize, Clone, Copy)]
pub struct Chapter {
    pub id: &'static str,
    pub subject: Subject,
    pub name: &'static str,
    pub topics: &'static [Topic],
}

macro_rules! chapter {
    ($subject:ident, $id:literal, $name:literal, [$(($tid:literal, $tname:literal)),+ $(,)?]) => {
        Chapter {
            id: $id,
            subject: Subject::$subject,
            name: $name,
            topics: &[$(Topic { id: $tid, name: $tname }),+],
        }
    };
}

static CATALOG: &[Chapter] = &[
    chapter!(Physics, "phy-01", "Units and Measurements", [("phy-01-a", "Dimensional Analysis")]),
    chapter!(Physics, "phy-02", "Kinematics", [("phy-02-a", "Motion in One Dimension"), ("phy-02-b", "Projectile Motion")]),
    chapter!(Physics, "phy-03", "Laws of Motion", [("phy-03-a", "Newton's Laws"), ("phy-03-b", "Friction")]),
    chapter!(Physics, "phy-04", "Work, Energy and Power", [("phy-04-a", "Work-Energy Theorem"), ("phy-04-b", "Collisions")]),
    chapter!(Physics, "phy-05", "Rotational Motion", [("phy-05-a", "Moment of Inertia"), ("phy-05-b", "Angular Momentum")]),
    chapter!(Physics, "phy-06", "Gravitation", [("phy-06-a", "Orbital Motion")]),
    chapter!(Physics, "phy-07", "Thermodynamics", [("phy-07-a", "Laws of Thermodynamics"), ("phy-07-b", "Heat Engines")]),
    chapter!(Physics, "phy-08", "Oscillations and Waves", [("phy-08-a", "Simple Harmonic Motion"), ("phy-08-b", "Standing Waves")]),
    chapter!(Physics, "phy-09", "Electrostatics", [("phy-09-a", "Gauss's Law"), ("phy-09-b", "Capacitors")]),
    chapter!(Physics, "phy-10", "Current Electricity", [("phy-10-a", "Kirchhoff's Laws")]),
    chapter!(Physics, "phy-11", "Magnetism and EMI", [("phy-11-a", "Biot-Savart Law"), ("phy-11-b", "Faraday's Law")]),
    chapter!(Physics, "phy-12", "Optics", [("phy-12-a", "Ray Optics"), ("phy-12-b", "Wave Optics")]),
    chapter!(Chemistry, "che-01", "Some Basic Concepts", [("che-01-a", "Mole Concept")]),
    chapter!(Chemistry, "che-02", "Atomic Structure", [("che-02-a", "Quantum Numbers"), ("che-02-b", "Bohr Model")]),
    chapter!(Chemistry, "che-03", "Chemical Bonding", [("che-03-a", "VSEPR Theory"), ("che-03-b", "Molecular Orbital Theory")]),
    chapter!(Chemistry, "che-04", "Chemical Thermodynamics", [("che-04-a", "Enthalpy and Entropy")]),
    chapter!(Chemistry, "che-05", "Equilibrium", [("che-05-a", "Chemical Equilibrium"), ("che-05-b", "Ionic Equilibrium")]),
    chapter!(Chemistry, "che-06", "Electrochemistry", [("che-06-a", "Nernst Equation")]),
    chapter!(Chemistry, "che-07", "Chemical Kinetics", [("che-07-a", "Rate Laws")]),
    chapter!(Chemistry, "che-08", "Periodic Table", [("che-08-a", "Periodic Trends")]),
    chapter!(Chemistry, "che-09", "Coordination Compounds", [("che-09-a", "Crystal Field Theory")]),
    chapter!(Chemistry, "che-10", "Hydrocarbons", [("che-10-a", "Alkanes and Alkenes"), ("che-10-b", "Aromatic Compounds")]),
    chapter!(Chemistry, "che-11", "Organic Reaction Mechanisms", [("che-11-a", "Substitution Reactions"), ("che-11-b", "Elimination Reactions")]),
    chapter!(Mathematics, "mat-01", "Sets, Relations and Functions", [("mat-01-a", "Functions")]),
    chapter!(Mathematics, "mat-02", "Complex Numbers", [("mat-02-a", "Argand Plane"), ("mat-02-b", "De Moivre's Theorem")]),
    chapter!(Mathematics, "mat-03", "Quadratic Equations", [("mat-03-a", "Nature of Roots")]),
    chapter!(Mathematics, "mat-04", "Sequences and Series", [("mat-04-a", "Arithmetic Progressions"), ("mat-04-b", "Geometric Progressions")]),
    chapter!(Mathematics, "mat-05", "Permutations and Combinations", [("mat-05-a", "Counting Principles")]),
    chapter!(Mathematics, "mat-06", "Matrices and Determinants", [("mat-06-a", "Determinants"), ("mat-06-b", "Inverse of a Matrix")]),
    chapter!(Mathematics, "mat-07", "Limits and Continuity", [("mat-07-a", "Limits")]),
    chapter!(Mathematics, "mat-08", "Differentiation", [("mat-08-a", "Applications of Derivatives"), ("mat-08-b", "Maxima and Minima")]),
    chapter!(Mathematics, "mat-09", "Integral Calculus", [("mat-09-a", "Definite Integrals"), ("mat-09-b", "Area Under Curves")]),
    chapter!(Mathematics, "mat-10", "Coordinate Geometry", [("mat-10-a", "Straight Lines"), ("mat-10-b", "Conic Sections")]),
    chapter!(Mathematics, "mat-11", "Vectors and 3D Geometry", [("mat-11-a", "Vector Algebra")]),
];

pub fn catalog() -> &'static [Chapter] {
    CATALOG
}

pub fn find_topic(topic_id: &str) -> Option<(&'static Chapter, &'static Topic)> {
    CATALOG.iter().find_map(|chapter| {
        chapter
            .topics
            .iter()
            .find(|topic| topic.id == topic_id)
            .map(|topic| (chapter, topic))
    })
}

pub fn topic_count() -> usize {
    CATALOG.iter().map(|chapter| chapter.topics.len()).sum()
}

#[derive(Debug, Serialize, Clone)]
pub struct ProgressReport {
    pub overall_percent: f64,
    pub completed_topics: usize,
    pub total_topics: usize,
    pub subjects: Vec<SubjectProgress>,
}

#[derive(Debug, Serialize, Clone)]
pub struct SubjectProgress {
    pub subject: Subject,
    pub percent: f64,
    pub chapters: Vec<ChapterProgress>,
}

#[derive(Debug, Serialize, Clone)]
pub struct ChapterProgress {
    pub id: &'static str,
    pub name: &'static str,
    pub percent: f64,
    pub topics: Vec<TopicReport>,
}

#[derive(Debug, Serialize, Clone)]
pub struct TopicReport {
    pub id: &'static str,
    pub name: &'static str,
    pub percent: f64,
    #[serde(flatten)]
    pub progress: TopicProgress,
}

/// One student's checklist state, keyed by topic id.
#[derive(Debug, Clone, Default)]
pub struct StudentProgress {
    topics: HashMap<&'static str, TopicProgress>,
}

impl StudentProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn topic(&self, topic_id: &str) -> TopicProgress {
        self.topics.get(topic_id).cloned().unwrap_or_default()
    }

    fn entry(&mut self, topic_id: &str) -> Result<&mut TopicProgress> {
        let (_, topic) =
            find_topic(topic_id).ok_or_else(|| AppError::not_found("topic", topic_id))?;
        Ok(self.topics.entry(topic.id).or_default())
    }

    pub fn set_status(&mut self, topic_id: &str, status: TopicStatus) -> Result<TopicProgress> {
        let entry = self.entry(topic_id)?;
        entry.status = status;
        Ok(entry.clone())
    }

    pub fn update_counter(
        &mut self,
        topic_id: &str,
        exercise: Exercise,
        solved: i64,
        total: i64,
    ) -> Result<TopicProgress> {
        let entry = self.entry(topic_id)?;
        entry.exercises.insert(exercise, ExerciseCounter::clamped(solved, total));
        Ok(entry.clone())
    }

    /// Steps the solved count by `delta`, staying within `0..=total`.
    pub fn adjust_counter(
        &mut self,
        topic_id: &str,
        exercise: Exercise,
        delta: i64,
    ) -> Result<TopicProgress> {
        let entry = self.entry(topic_id)?;
        let counter = entry.exercises.entry(exercise).or_default();
        *counter = ExerciseCounter::clamped(counter.solved as i64 + delta, counter.total as i64);
        Ok(entry.clone())
    }

    pub fn topic_percent(&self, topic_id: &str) -> f64 {
        percent_of(&self.topic(topic_id))
    }

    pub fn report(&self) -> ProgressReport {
        let mut subjects = Vec::new();
        let mut all_percents = Vec::new();
        let mut completed_topics = 0;

        for subject in Subject::ALL {
            let mut subject_percents = Vec::new();
            let chapters: Vec<ChapterProgress> = CATALOG
                .iter()
                .filter(|chapter| chapter.subject == subject)
                .map(|chapter| {
                    let topics: Vec<TopicReport> = chapter
                        .topics
                        .iter()
                        .map(|topic| {
                            let progress = self.topic(topic.id);
                            if progress.status == TopicStatus::Completed {
                                completed_topics += 1;
                            }
                            TopicReport {
                                id: topic.id,
                                name: topic.name,
                                percent: round1(percent_of(&progress)),
                                progress,
                            }
                        })
                        .collect();
                    let percents: Vec<f64> = topics.iter().map(|t| t.percent).collect();
                    subject_percents.extend_from_slice(&percents);
                    ChapterProgress {
                        id: chapter.id,
                        name: chapter.name,
                        percent: round1(mean(&percents)),
                        topics,
                    }
                })
                .collect();
            all_percents.extend_from_slice(&subject_percents);
            subjects.push(SubjectProgress {
                subject,
                percent: round1(mean(&subject_percents)),
                chapters,
            });
        }

        ProgressReport {
            overall_percent: round1(mean(&all_percents)),
            completed_topics,
            total_topics: topic_count(),
            subjects,
        }
    }

    pub fn subject_percentages(&self) -> BTreeMap<Subject, f64> {
        self.report()
            .subjects
            .into_iter()
            .map(|s| (s.subject, s.percent))
            .collect()
    }
}

fn percent_of(progress: &TopicProgress) -> f64 {
    if progress.status == TopicStatus::Completed {
        return 100.0;
    }
    let (solved, total) = progress
        .exercises
        .values()
        .fold((0u64, 0u64), |(s, t), c| (s + c.solved as u64, t + c.total as u64));
    if total == 0 {
        0.0
    } else {
        solved as f64 / total as f64 * 100.0
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_expected_shape() {
        assert_eq!(catalog().len(), 34);
        assert_eq!(topic_count(), 54);
        let mut ids: Vec<&str> = catalog().iter().flat_map(|c| c.topics.iter().map(|t| t.id)).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 54);
    }

    #[test]
    fn counters_never_go_negative() {
        let mut progress = StudentProgress::new();
        progress.update_counter("phy-02-a", Exercise::Exercise1, -5, -2).unwrap();
        let topic = progress.adjust_counter("phy-02-a", Exercise::Exercise1, -3).unwrap();
        assert_eq!(topic.exercises[&Exercise::Exercise1], ExerciseCounter { solved: 0, total: 0 });
    }

    #[test]
    fn adjust_stays_within_total() {
        let mut progress = StudentProgress::new();
        progress.update_counter("mat-09-a", Exercise::Examples, 8, 10).unwrap();
        let topic = progress.adjust_counter("mat-09-a", Exercise::Examples, 5).unwrap();
        assert_eq!(topic.exercises[&Exercise::Examples].solved, 10);
        let topic = progress.adjust_counter("mat-09-a", Exercise::Examples, -4).unwrap();
        assert_eq!(topic.exercises[&Exercise::Examples].solved, 6);
    }

    #[test]
    fn unknown_topic_is_not_found() {
        let mut progress = StudentProgress::new();
        let err = progress.set_status("bio-01-a", TopicStatus::Completed).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn percentages_roll_up() {
        let mut progress = StudentProgress::new();
        progress.update_counter("che-01-a", Exercise::Exercise1, 5, 10).unwrap();
        assert_eq!(progress.topic_percent("che-01-a"), 50.0);

        progress.set_status("che-02-a", TopicStatus::Completed).unwrap();
        let report = progress.report();
        assert_eq!(report.completed_topics, 1);
        let chemistry = report.subjects.iter().find(|s| s.subject == Subject::Chemistry).unwrap();
        let atomic = chemistry.chapters.iter().find(|c| c.id == "che-02").unwrap();
        assert_eq!(atomic.percent, 50.0);
        assert!(report.overall_percent > 0.0);
    }
}

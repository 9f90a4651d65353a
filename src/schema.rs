/// Relational layout a persistence backend is expected to keep. Served as
/// documentation only; nothing in this service executes it.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    role TEXT NOT NULL CHECK (role IN ('student', 'parent', 'admin')),
    phone TEXT,
    created_at DATETIME NOT NULL
);

CREATE TABLE IF NOT EXISTS students (
    user_id INTEGER PRIMARY KEY,
    institute TEXT,
    target_year INTEGER,
    FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS parents (
    user_id INTEGER PRIMARY KEY,
    student_id INTEGER,
    FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE,
    FOREIGN KEY (student_id) REFERENCES students (user_id) ON DELETE SET NULL
);

CREATE TABLE IF NOT EXISTS subjects (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS chapters (
    id TEXT PRIMARY KEY,
    subject_id TEXT NOT NULL,
    name TEXT NOT NULL,
    FOREIGN KEY (subject_id) REFERENCES subjects (id)
);

CREATE TABLE IF NOT EXISTS topics (
    id TEXT PRIMARY KEY,
    chapter_id TEXT NOT NULL,
    name TEXT NOT NULL,
    FOREIGN KEY (chapter_id) REFERENCES chapters (id)
);

CREATE TABLE IF NOT EXISTS topic_progress (
    student_id INTEGER NOT NULL,
    topic_id TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'not_started',
    exercise TEXT NOT NULL,
    solved INTEGER NOT NULL DEFAULT 0 CHECK (solved >= 0),
    total INTEGER NOT NULL DEFAULT 0 CHECK (total >= 0),
    updated_at DATETIME NOT NULL,
    PRIMARY KEY (student_id, topic_id, exercise),
    FOREIGN KEY (student_id) REFERENCES students (user_id) ON DELETE CASCADE,
    FOREIGN KEY (topic_id) REFERENCES topics (id)
);

CREATE TABLE IF NOT EXISTS questions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    subject_id TEXT NOT NULL,
    text TEXT NOT NULL,
    options TEXT NOT NULL,
    correct_option INTEGER NOT NULL,
    explanation TEXT,
    FOREIGN KEY (subject_id) REFERENCES subjects (id)
);

CREATE TABLE IF NOT EXISTS tests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    subject_id TEXT,
    duration_minutes INTEGER NOT NULL,
    marks_correct INTEGER NOT NULL DEFAULT 4,
    marks_incorrect INTEGER NOT NULL DEFAULT 1,
    published BOOLEAN NOT NULL DEFAULT TRUE,
    created_at DATETIME NOT NULL
);

CREATE TABLE IF NOT EXISTS test_questions (
    test_id INTEGER NOT NULL,
    question_id INTEGER NOT NULL,
    position INTEGER NOT NULL,
    PRIMARY KEY (test_id, question_id),
    FOREIGN KEY (test_id) REFERENCES tests (id) ON DELETE CASCADE,
    FOREIGN KEY (question_id) REFERENCES questions (id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS attempts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id INTEGER NOT NULL,
    test_id INTEGER NOT NULL,
    score INTEGER NOT NULL,
    max_score INTEGER NOT NULL,
    correct INTEGER NOT NULL,
    incorrect INTEGER NOT NULL,
    unattempted INTEGER NOT NULL,
    accuracy INTEGER NOT NULL,
    time_spent_secs INTEGER NOT NULL,
    submission TEXT NOT NULL,
    submitted_at DATETIME NOT NULL,
    FOREIGN KEY (student_id) REFERENCES students (user_id),
    FOREIGN KEY (test_id) REFERENCES tests (id)
);

CREATE TABLE IF NOT EXISTS planner (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id INTEGER NOT NULL,
    subject_id TEXT NOT NULL,
    focus_minutes INTEGER NOT NULL,
    cycles_completed INTEGER NOT NULL,
    finished_at DATETIME NOT NULL,
    FOREIGN KEY (student_id) REFERENCES students (user_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS timetable_config (
    student_id INTEGER PRIMARY KEY,
    config TEXT NOT NULL,
    updated_at DATETIME NOT NULL,
    FOREIGN KEY (student_id) REFERENCES students (user_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS notifications (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    message TEXT NOT NULL,
    kind TEXT NOT NULL,
    target TEXT NOT NULL DEFAULT 'all',
    created_at DATETIME NOT NULL
);
"#;

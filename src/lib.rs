pub mod analytics;
pub mod assistant;
pub mod backend;
pub mod config;
pub mod data;
pub mod error;
pub mod focus;
pub mod handlers;
pub mod model;
pub mod schema;
pub mod seed;
pub mod state;
pub mod store;
pub mod syllabus;
pub mod test_session;
pub mod timer;
pub mod timetable;

pub use config::Config;
pub use error::{AppError, Result};
pub use handlers::configure;
pub use state::AppState;

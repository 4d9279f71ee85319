//! Repository modules for database access

pub mod schedule;

pub use schedule::SqlScheduleRepository;

pub mod digest;
pub mod poll;
pub mod schedule;
pub mod version_watch;

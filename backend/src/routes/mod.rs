pub mod alerts;
pub mod import;
pub mod replacements;
pub mod rotation;
pub mod schedules;

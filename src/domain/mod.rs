pub mod error;
pub mod forms;
pub mod search;
pub mod syllabus;
pub mod upload;
pub mod user;

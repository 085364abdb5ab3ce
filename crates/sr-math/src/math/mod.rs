//! Core math modules.

pub mod moments;
pub mod rank;
pub mod regression;
pub mod special;
pub mod student_t;

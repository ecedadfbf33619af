//! Result reporting

pub mod report;

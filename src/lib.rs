pub mod dashboard;
pub mod db;
pub mod error;
pub mod history;
pub mod labels;
pub mod models;
pub mod report;
pub mod sample;
pub mod source;

pub mod chart;
pub mod document;
pub mod pdf;
pub mod text;

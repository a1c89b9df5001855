// handlers/records/mod.rs - record mutations
//
// forms: HTML form posts under /record/*, answered with redirects
// api:   the same operations as JSON under /api/*

pub mod api;
pub mod forms;

// handlers/mod.rs - request handlers by surface
//
// public:  no session required (/login, /logout, /health, /api/auth/login)
// pages:   server-rendered HTML, each handler gates on the session itself
// records: form posts under /record/* and the JSON API under /api/*

pub mod pages;
pub mod public;
pub mod records;

// handlers/public/mod.rs - handlers that need no session
//
// Login and logout set or clear the session cookie; /api/auth/login hands the
// same token back as JSON for API clients and the CLI.

pub mod health;
pub mod login;

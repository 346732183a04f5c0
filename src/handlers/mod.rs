// Handlers are grouped by operation class: public (no auth), auth (session
// management), reader (any authenticated user), author (role + ownership),
// admin (superadmin only).
pub mod admin;
pub mod auth;
pub mod author;
pub mod public;
pub mod reader;

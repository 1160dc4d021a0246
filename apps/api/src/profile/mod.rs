// Candidate profile score: persistence, recompute service and HTTP handlers.
// All score math lives in `crate::scoring`; this module only moves data.

pub mod handlers;
pub mod record;
pub mod repository;
pub mod service;

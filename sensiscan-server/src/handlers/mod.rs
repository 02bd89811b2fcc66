//! Thin HTTP handlers (component "thin request/response shell"). Each
//! handler deserializes its request, delegates to `sensiscan-logic`, and
//! serializes the response; no business logic lives here.

pub mod findings;
pub mod health;
pub mod jobs;
pub mod scan;

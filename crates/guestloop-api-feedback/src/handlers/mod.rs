//! HTTP handlers for feedback endpoints.

pub mod approvals;
pub mod feedback;
pub mod jobs;
pub mod responses;

pub mod findings;
pub mod job_objects;
pub mod jobs;
pub mod sea_orm_active_enums;

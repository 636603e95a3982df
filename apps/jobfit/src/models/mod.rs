pub mod job;
pub mod profile;
pub mod skills;
pub mod user;

pub use job::{Category, Company, JobListing, Location, SearchResponse};
pub use profile::{ProfileRecord, ProfileUpdate, ResumeBlob, PROFILE_RECORD_ID};
pub use skills::{RoadmapStep, SkillReport};
pub use user::{Session, User, UserId, UserPatch};

use serde::{Deserialize, Serialize};

/// Skill-gap analysis for the user's target role, as computed by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillReport {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub roadmap: Vec<RoadmapStep>,
}

/// One day of the learning roadmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapStep {
    #[serde(rename = "Notes", default)]
    pub notes: String,
    #[serde(rename = "Resource", default)]
    pub resource: Option<String>,
}

impl SkillReport {
    /// True when the backend found nothing left to learn.
    pub fn is_complete(&self) -> bool {
        self.skills.is_empty() && self.roadmap.is_empty()
    }
}

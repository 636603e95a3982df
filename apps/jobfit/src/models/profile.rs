use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::errors::{ClientError, FieldError};

/// The profile store holds a single record under this key.
pub const PROFILE_RECORD_ID: u32 = 1;

/// Upload types accepted for a resume, by extension.
const RESUME_TYPES: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
];

/// A resume file held as an opaque binary object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeBlob {
    pub file_name: String,
    pub content_type: String,
    #[serde(with = "base64_bytes")]
    pub bytes: Bytes,
}

impl ResumeBlob {
    /// Builds a blob from a user-selected file, rejecting anything that is not
    /// a non-empty PDF or Word document.
    pub fn from_upload(file_name: &str, bytes: impl Into<Bytes>) -> Result<Self, ClientError> {
        let bytes = bytes.into();
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        let Some((_, content_type)) = RESUME_TYPES.iter().find(|(e, _)| *e == ext) else {
            return Err(ClientError::Validation(vec![FieldError::new(
                "resume",
                "Resume must be a .pdf, .doc or .docx file",
            )]));
        };
        if bytes.is_empty() {
            return Err(ClientError::Validation(vec![FieldError::new(
                "resume",
                "Resume file is empty",
            )]));
        }

        Ok(Self {
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            bytes,
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// The locally cached profile: target role plus the last uploaded resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: u32,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub resume: Option<ResumeBlob>,
}

impl ProfileRecord {
    /// The shape returned when nothing has been saved yet.
    pub fn empty() -> Self {
        Self {
            id: PROFILE_RECORD_ID,
            role: String::new(),
            resume: None,
        }
    }

    pub fn resume_file_name(&self) -> &str {
        self.resume.as_ref().map(|r| r.file_name.as_str()).unwrap_or("")
    }

    /// Shallow merge. `None` fields in the update leave the stored value alone,
    /// so a missing resume never erases one saved earlier.
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(role) = update.role {
            self.role = role;
        }
        if let Some(resume) = update.resume {
            self.resume = Some(resume);
        }
    }
}

impl Default for ProfileRecord {
    fn default() -> Self {
        Self::empty()
    }
}

/// Fields to merge into the profile record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub role: Option<String>,
    pub resume: Option<ResumeBlob>,
}

impl ProfileUpdate {
    pub fn role(role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            resume: None,
        }
    }

    pub fn resume(resume: ResumeBlob) -> Self {
        Self {
            role: None,
            resume: Some(resume),
        }
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Bytes, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Bytes, D::Error> {
        let encoded = String::deserialize(d)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map(Bytes::from)
            .map_err(serde::de::Error::custom)
    }
}

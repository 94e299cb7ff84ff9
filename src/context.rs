//! Per-invocation request context: which host instance served the request.
//!
//! The context is populated once from an [`InstanceMetadata`] source and then
//! passed explicitly to every renderer. When the source fails, the context
//! falls back to a fixed fake identity so pages still render.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

pub const FALLBACK_INSTANCE_ID: &str = "i-fakeinstance";
pub const FALLBACK_AVAILABILITY_ZONE: &str = "us-fake-1a";

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("no instance metadata source configured")]
    NotConfigured,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed identity document: {0}")]
    Json(#[from] serde_json::Error),
}

/// The fields of an instance identity document the directory displays.
///
/// Other fields in the document are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceIdentity {
    pub instance_id: String,
    pub availability_zone: String,
}

/// A source of instance identity.
pub trait InstanceMetadata {
    fn identity(&self) -> Result<InstanceIdentity, MetadataError>;
}

/// Reads an identity document (JSON) from disk on every call.
pub struct DocumentMetadata {
    pub path: PathBuf,
}

impl InstanceMetadata for DocumentMetadata {
    fn identity(&self) -> Result<InstanceIdentity, MetadataError> {
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// A fixed identity.
pub struct StaticMetadata(pub InstanceIdentity);

impl InstanceMetadata for StaticMetadata {
    fn identity(&self) -> Result<InstanceIdentity, MetadataError> {
        Ok(self.0.clone())
    }
}

/// No metadata source; always falls back.
pub struct NoMetadata;

impl InstanceMetadata for NoMetadata {
    fn identity(&self) -> Result<InstanceIdentity, MetadataError> {
        Err(MetadataError::NotConfigured)
    }
}

/// Context shown in every page footer and on the info page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub instance_id: String,
    pub availability_zone: String,
}

impl RequestContext {
    pub fn fallback() -> Self {
        Self {
            instance_id: FALLBACK_INSTANCE_ID.to_string(),
            availability_zone: FALLBACK_AVAILABILITY_ZONE.to_string(),
        }
    }

    /// Ask `source` for the instance identity, falling back on any failure.
    pub fn populate(source: &dyn InstanceMetadata) -> Self {
        match source.identity() {
            Ok(identity) => Self {
                instance_id: identity.instance_id,
                availability_zone: identity.availability_zone,
            },
            Err(MetadataError::NotConfigured) => {
                log::debug!("no instance metadata source, using fallback identity");
                Self::fallback()
            }
            Err(e) => {
                log::warn!("instance metadata unavailable ({}), using fallback identity", e);
                Self::fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn static_metadata_populates_context() {
        let source = StaticMetadata(InstanceIdentity {
            instance_id: "i-0abc".into(),
            availability_zone: "eu-west-1b".into(),
        });
        let ctx = RequestContext::populate(&source);
        assert_eq!(ctx.instance_id, "i-0abc");
        assert_eq!(ctx.availability_zone, "eu-west-1b");
    }

    #[test]
    fn no_metadata_falls_back() {
        assert_eq!(RequestContext::populate(&NoMetadata), RequestContext::fallback());
    }

    #[test]
    fn document_metadata_reads_camel_case_fields() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("identity.json");
        fs::write(
            &path,
            r#"{"accountId":"1234","instanceId":"i-0def","availabilityZone":"us-east-2c","region":"us-east-2"}"#,
        )
        .unwrap();
        let ctx = RequestContext::populate(&DocumentMetadata { path });
        assert_eq!(ctx.instance_id, "i-0def");
        assert_eq!(ctx.availability_zone, "us-east-2c");
    }

    #[test]
    fn missing_document_falls_back() {
        let tmp = TempDir::new().unwrap();
        let source = DocumentMetadata {
            path: tmp.path().join("absent.json"),
        };
        assert!(matches!(source.identity(), Err(MetadataError::Io(_))));
        let ctx = RequestContext::populate(&source);
        assert_eq!(ctx.instance_id, FALLBACK_INSTANCE_ID);
        assert_eq!(ctx.availability_zone, FALLBACK_AVAILABILITY_ZONE);
    }

    #[test]
    fn malformed_document_falls_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("identity.json");
        fs::write(&path, r#"{"instanceId": 5}"#).unwrap();
        let source = DocumentMetadata { path };
        assert!(matches!(source.identity(), Err(MetadataError::Json(_))));
        assert_eq!(RequestContext::populate(&source), RequestContext::fallback());
    }
}

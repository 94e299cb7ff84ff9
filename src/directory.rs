//! The directory service: list, view, save and delete employees.
//!
//! [`Directory`] wires the photo normalizer, a [`RecordStore`] and an
//! [`ObjectStore`] together. Failures that only affect the photo are
//! absorbed here and logged:
//!
//! - a photo URL that cannot be signed renders as no photo
//! - an upload that does not decode, or cannot be stored, leaves the record
//!   saved without a new photo key
//!
//! Validation and record-store failures are returned as [`DirectoryError`].

use crate::badges;
use crate::config::PhotosConfig;
use crate::imaging::{CanvasError, CanvasSpec, ImageBackend, normalize_photo};
use crate::objects::ObjectStore;
use crate::store::{RecordStore, StoreError};
use crate::types::{Employee, EmployeeFields, EmployeeView};
use rand::RngCore;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("missing required field(s): {}", .0.join(", "))]
    Validation(Vec<&'static str>),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// How uploads are normalized, named and served.
#[derive(Debug, Clone)]
pub struct PhotoSettings {
    pub canvas: CanvasSpec,
    pub key_bytes: usize,
    pub key_prefix: String,
    pub url_expiry: Duration,
}

impl PhotoSettings {
    pub fn from_config(config: &PhotosConfig) -> Result<Self, CanvasError> {
        Ok(Self {
            canvas: config.canvas_spec()?,
            key_bytes: config.key_bytes,
            key_prefix: config.key_prefix.clone(),
            url_expiry: config.url_expiry(),
        })
    }
}

impl Default for PhotoSettings {
    fn default() -> Self {
        Self {
            canvas: CanvasSpec::default(),
            key_bytes: 8,
            key_prefix: "employee_pic/".to_string(),
            url_expiry: Duration::from_secs(3600),
        }
    }
}

/// A submitted add/edit form.
#[derive(Debug, Clone, Default)]
pub struct SaveRequest {
    /// Blank or absent means a new employee.
    pub employee_id: Option<String>,
    pub fields: EmployeeFields,
    /// Raw upload bytes. An empty upload counts as no upload.
    pub photo: Option<Vec<u8>>,
}

/// What happened to the photo attached to a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoOutcome {
    NotProvided,
    Stored { key: String },
    /// The record was saved but the photo was dropped.
    Rejected { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub id: String,
    pub created: bool,
    pub photo: PhotoOutcome,
}

/// Lowercase hex of `n_bytes` random bytes (`2 * n_bytes` characters).
pub fn random_hex(n_bytes: usize) -> String {
    let mut buf = vec![0u8; n_bytes];
    rand::rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

/// Required fields that are blank after trimming, in form order.
pub fn missing_fields(fields: &EmployeeFields) -> Vec<&'static str> {
    [
        ("full_name", &fields.full_name),
        ("location", &fields.location),
        ("job_title", &fields.job_title),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| name)
    .collect()
}

pub struct Directory<B: ImageBackend> {
    records: Arc<dyn RecordStore>,
    objects: Arc<dyn ObjectStore>,
    backend: B,
    photos: PhotoSettings,
}

impl<B: ImageBackend> Directory<B> {
    pub fn new(
        records: Arc<dyn RecordStore>,
        objects: Arc<dyn ObjectStore>,
        backend: B,
        photos: PhotoSettings,
    ) -> Self {
        Self {
            records,
            objects,
            backend,
            photos,
        }
    }

    pub fn photo_settings(&self) -> &PhotoSettings {
        &self.photos
    }

    /// All employees, ordered by name, each with a photo URL when possible.
    pub fn list(&self) -> Result<Vec<EmployeeView>, DirectoryError> {
        Ok(self
            .records
            .list()?
            .into_iter()
            .map(|e| self.to_view(e))
            .collect())
    }

    pub fn load(&self, id: &str) -> Result<Option<Employee>, DirectoryError> {
        Ok(self.records.load(id)?)
    }

    pub fn view(&self, id: &str) -> Result<Option<EmployeeView>, DirectoryError> {
        Ok(self.records.load(id)?.map(|e| self.to_view(e)))
    }

    fn to_view(&self, employee: Employee) -> EmployeeView {
        let photo_url = employee
            .object_key
            .as_deref()
            .and_then(|key| match self.objects.signed_url(key, self.photos.url_expiry) {
                Ok(url) => Some(url),
                Err(e) => {
                    log::warn!("no photo URL for employee {}: {}", employee.id, e);
                    None
                }
            });
        EmployeeView {
            badges: badges::resolve(&employee.badges),
            photo_url,
            employee,
        }
    }

    /// Validate, store any photo, then create or update the record.
    ///
    /// Nothing is written when validation fails or when an update names an
    /// unknown id.
    pub fn save(&self, request: SaveRequest) -> Result<SaveOutcome, DirectoryError> {
        let missing = missing_fields(&request.fields);
        if !missing.is_empty() {
            return Err(DirectoryError::Validation(missing));
        }

        let existing = request
            .employee_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());
        // An upload for a record that does not exist would never be referenced
        if let Some(id) = existing {
            if self.records.load(id)?.is_none() {
                return Err(StoreError::NotFound(id.to_string()).into());
            }
        }

        let photo = match request.photo.as_deref() {
            Some(bytes) if !bytes.is_empty() => self.store_photo(bytes),
            _ => PhotoOutcome::NotProvided,
        };
        let photo_key = match &photo {
            PhotoOutcome::Stored { key } => Some(key.as_str()),
            _ => None,
        };

        let (id, created) = match existing {
            Some(id) => {
                self.records.update(id, photo_key, &request.fields)?;
                (id.to_string(), false)
            }
            None => (self.records.create(photo_key, &request.fields)?, true),
        };
        log::info!(
            "{} employee {} ({})",
            if created { "created" } else { "updated" },
            id,
            request.fields.full_name
        );

        Ok(SaveOutcome { id, created, photo })
    }

    /// Normalize and upload a photo. Never fails; problems become
    /// [`PhotoOutcome::Rejected`].
    pub fn store_photo(&self, bytes: &[u8]) -> PhotoOutcome {
        let normalized = match normalize_photo(&self.backend, bytes, self.photos.canvas) {
            Ok(photo) => photo,
            Err(e) => {
                log::warn!("photo upload discarded: {}", e);
                return PhotoOutcome::Rejected {
                    reason: e.to_string(),
                };
            }
        };

        let key = format!(
            "{}{}.png",
            self.photos.key_prefix,
            random_hex(self.photos.key_bytes)
        );
        match self.objects.put(&key, &normalized.bytes) {
            Ok(()) => PhotoOutcome::Stored { key },
            Err(e) => {
                log::warn!("photo upload to {} failed: {}", key, e);
                PhotoOutcome::Rejected {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn delete(&self, id: &str) -> Result<(), DirectoryError> {
        self.records.delete(id)?;
        log::info!("deleted employee {}", id);
        Ok(())
    }
}

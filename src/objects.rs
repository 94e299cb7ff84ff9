//! Object storage for normalized photos.
//!
//! [`ObjectStore`] is the seam between the directory service and blob
//! storage. [`FsObjectStore`] keeps each bucket as a directory under the
//! data dir and issues signed URLs of the form
//!
//! ```text
//! {base_url}/{bucket}/{key}?expires={unix_secs}&signature={hex}
//! ```
//!
//! The signature is HMAC-SHA256 over `"{bucket}\n{key}\n{expires}"` keyed
//! with the configured signing secret. Whatever serves the bucket checks it
//! with [`FsObjectStore::verify_signature`].

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObjectError {
    #[error("invalid object key: {0:?}")]
    InvalidKey(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no signing secret configured, cannot sign URLs")]
    Unsigned,
    #[error("signing secret rejected by HMAC")]
    InvalidSecret,
}

type HmacSha256 = Hmac<Sha256>;

/// Blob storage with time-limited read URLs.
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key`, replacing any existing object.
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), ObjectError>;

    /// A URL granting read access to `key` for `expiry` from now.
    fn signed_url(&self, key: &str, expiry: Duration) -> Result<String, ObjectError>;
}

/// Keys are relative paths made of `[A-Za-z0-9._/-]`, with no `..` segment
/// and no leading `/`.
pub fn validate_key(key: &str) -> Result<(), ObjectError> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '/' | '-');
    let valid = !key.is_empty()
        && key.chars().all(allowed)
        && !key.starts_with('/')
        && !key.ends_with('/')
        && key.split('/').all(|seg| !seg.is_empty() && seg != "." && seg != "..");
    if valid {
        Ok(())
    } else {
        Err(ObjectError::InvalidKey(key.to_string()))
    }
}

fn keyed_mac(secret: &[u8], message: &[u8]) -> Result<HmacSha256, ObjectError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| ObjectError::InvalidSecret)?;
    mac.update(message);
    Ok(mac)
}

/// HMAC-SHA256 of `message` keyed with `secret`.
pub fn hmac_sha256(secret: &[u8], message: &[u8]) -> Result<[u8; 32], ObjectError> {
    Ok(keyed_mac(secret, message)?.finalize().into_bytes().into())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Filesystem-backed object store.
pub struct FsObjectStore {
    root: PathBuf,
    bucket: String,
    base_url: String,
    secret: Option<String>,
}

impl FsObjectStore {
    /// `root` holds one directory per bucket.
    pub fn new(
        root: impl Into<PathBuf>,
        bucket: impl Into<String>,
        base_url: impl Into<String>,
        secret: Option<String>,
    ) -> Self {
        Self {
            root: root.into(),
            bucket: bucket.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn bucket_dir(&self) -> PathBuf {
        self.root.join(&self.bucket)
    }

    /// Filesystem path of a stored object.
    pub fn object_path(&self, key: &str) -> Result<PathBuf, ObjectError> {
        validate_key(key)?;
        Ok(self.bucket_dir().join(Path::new(key)))
    }

    fn signed_message(&self, key: &str, expires: u64) -> String {
        format!("{}\n{}\n{}", self.bucket, key, expires)
    }

    /// Signed URL valid until `expires` (unix seconds).
    pub fn signed_url_until(&self, key: &str, expires: u64) -> Result<String, ObjectError> {
        validate_key(key)?;
        let secret = self.secret.as_deref().ok_or(ObjectError::Unsigned)?;
        let mac = hmac_sha256(
            secret.as_bytes(),
            self.signed_message(key, expires).as_bytes(),
        )?;
        Ok(format!(
            "{}/{}/{}?expires={}&signature={}",
            self.base_url,
            self.bucket,
            key,
            expires,
            hex::encode(mac)
        ))
    }

    /// Check a signature issued by this store, as of `now` (unix seconds).
    ///
    /// False when unsigned, expired, or tampered with.
    pub fn verify_signature(&self, key: &str, expires: u64, signature: &str, now: u64) -> bool {
        let Some(secret) = self.secret.as_deref() else {
            return false;
        };
        if now > expires || validate_key(key).is_err() {
            return false;
        }
        let Ok(claimed) = hex::decode(signature) else {
            return false;
        };
        keyed_mac(secret.as_bytes(), self.signed_message(key, expires).as_bytes())
            .map(|mac| mac.verify_slice(&claimed).is_ok())
            .unwrap_or(false)
    }
}

impl ObjectStore for FsObjectStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), ObjectError> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        log::debug!("stored {} bytes at {}/{}", bytes.len(), self.bucket, key);
        Ok(())
    }

    fn signed_url(&self, key: &str, expiry: Duration) -> Result<String, ObjectError> {
        self.signed_url_until(key, unix_now().saturating_add(expiry.as_secs()))
    }
}

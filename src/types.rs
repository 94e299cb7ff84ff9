//! Shared types passed between the stores, the directory service and the
//! renderers.

use serde::{Deserialize, Serialize};

use crate::badges::{self, Badge};

/// A persisted employee record.
///
/// `id` is backend-specific: a decimal rowid for the SQL store, a UUID for
/// the key-value store. Callers treat it as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub full_name: String,
    pub location: String,
    pub job_title: String,
    /// Badge ids in the order they were entered.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub badges: Vec<String>,
    /// Object store key of the normalized photo, if one was ever stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_key: Option<String>,
}

/// The editable fields of an employee, as submitted by a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeFields {
    pub full_name: String,
    pub location: String,
    pub job_title: String,
    /// Comma-separated badge ids.
    pub badges: String,
}

impl EmployeeFields {
    /// Badge ids parsed from the CSV field.
    pub fn badge_list(&self) -> Vec<String> {
        badges::parse_badges(&self.badges)
    }
}

impl From<&Employee> for EmployeeFields {
    fn from(employee: &Employee) -> Self {
        Self {
            full_name: employee.full_name.clone(),
            location: employee.location.clone(),
            job_title: employee.job_title.clone(),
            badges: badges::join_badges(&employee.badges),
        }
    }
}

/// An employee ready for display: the record, a signed photo URL when one
/// could be issued, and the badges that resolve against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeView {
    pub employee: Employee,
    pub photo_url: Option<String>,
    pub badges: Vec<&'static Badge>,
}

//! Badge parsing and the catalog of known badges.
//!
//! Badges are stored as an ordered list of short ids and edited as a
//! comma-separated string. Ids not in [`CATALOG`] are kept on the record
//! but have nothing to render.

/// A badge known to the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub id: &'static str,
    pub label: &'static str,
}

pub const CATALOG: &[Badge] = &[
    Badge {
        id: "coffee",
        label: "Coffee Snob",
    },
    Badge {
        id: "trophy",
        label: "Employee of the Month",
    },
    Badge {
        id: "bug",
        label: "Bug Squasher",
    },
    Badge {
        id: "camera",
        label: "Photographer",
    },
    Badge {
        id: "plane",
        label: "Frequent Flyer",
    },
    Badge {
        id: "bike",
        label: "Cyclist",
    },
];

/// Split a comma-separated badge field into ids.
///
/// Whitespace around each id is trimmed and empty entries are dropped, so
/// `" coffee, ,bug,"` yields `["coffee", "bug"]`.
pub fn parse_badges(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

pub fn join_badges(badges: &[String]) -> String {
    badges.join(",")
}

pub fn lookup(id: &str) -> Option<&'static Badge> {
    CATALOG.iter().find(|b| b.id == id)
}

/// Resolve ids against the catalog, preserving order and skipping unknowns.
pub fn resolve(ids: &[String]) -> Vec<&'static Badge> {
    ids.iter().filter_map(|id| lookup(id)).collect()
}

//! Closed capability enumerations: operation categories and ACL
//! categories.
//!
//! Both serialize as lowercase snake_case strings. Parsing never drops
//! an unrecognized value; it is reported as a validation error on the
//! field it came from.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{KeygateError, KeygateResult};

/// Coarse capability class gating handler access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    Read,
    Write,
    Delete,
}

impl Op {
    pub const ALL: [Op; 3] = [Op::Read, Op::Write, Op::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Read => "read",
            Op::Write => "write",
            Op::Delete => "delete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == s)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse endpoint/resource class gating handler access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Acl {
    Analytics,
    Bulk,
    Cat,
    Cluster,
    Count,
    Create,
    Docs,
    Get,
    Indices,
    Permission,
    Reindex,
    Rules,
    Scripts,
    Search,
    Suggestions,
    Templates,
    User,
}

impl Acl {
    pub const ALL: [Acl; 17] = [
        Acl::Analytics,
        Acl::Bulk,
        Acl::Cat,
        Acl::Cluster,
        Acl::Count,
        Acl::Create,
        Acl::Docs,
        Acl::Get,
        Acl::Indices,
        Acl::Permission,
        Acl::Reindex,
        Acl::Rules,
        Acl::Scripts,
        Acl::Search,
        Acl::Suggestions,
        Acl::Templates,
        Acl::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Acl::Analytics => "analytics",
            Acl::Bulk => "bulk",
            Acl::Cat => "cat",
            Acl::Cluster => "cluster",
            Acl::Count => "count",
            Acl::Create => "create",
            Acl::Docs => "docs",
            Acl::Get => "get",
            Acl::Indices => "indices",
            Acl::Permission => "permission",
            Acl::Reindex => "reindex",
            Acl::Rules => "rules",
            Acl::Scripts => "scripts",
            Acl::Search => "search",
            Acl::Suggestions => "suggestions",
            Acl::Templates => "templates",
            Acl::User => "user",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|acl| acl.as_str() == s)
    }
}

impl fmt::Display for Acl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse raw operation names into a set, failing on the first unknown
/// value.
pub fn parse_ops<I, S>(field: &str, values: I) -> KeygateResult<BTreeSet<Op>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|v| {
            let v = v.as_ref();
            Op::parse(v).ok_or_else(|| {
                KeygateError::validation(field, format!("unknown operation category `{v}`"))
            })
        })
        .collect()
}

/// Parse raw ACL names into a set, failing on the first unknown value.
pub fn parse_acls<I, S>(field: &str, values: I) -> KeygateResult<BTreeSet<Acl>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|v| {
            let v = v.as_ref();
            Acl::parse(v).ok_or_else(|| {
                KeygateError::validation(field, format!("unknown ACL category `{v}`"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_serde_name() {
        for acl in Acl::ALL {
            let json = serde_json::to_string(&acl).unwrap();
            assert_eq!(json, format!("\"{acl}\""));
        }
        for op in Op::ALL {
            let json = serde_json::to_string(&op).unwrap();
            assert_eq!(json, format!("\"{op}\""));
        }
    }

    #[test]
    fn unknown_values_are_rejected_not_dropped() {
        let err = parse_ops("ops", ["read", "admin"]).unwrap_err();
        match err {
            KeygateError::Validation { field, message } => {
                assert_eq!(field, "ops");
                assert!(message.contains("admin"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        assert!(parse_acls("acls", ["search", "Search"]).is_err());
    }

    #[test]
    fn duplicates_collapse() {
        let ops = parse_ops("ops", ["read", "read", "write"]).unwrap();
        assert_eq!(ops.len(), 2);
    }
}

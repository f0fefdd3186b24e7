//! Enumerated query criteria with an explicit local/remote split.
//!
//! The shadow schema can answer queries over its own columns whose values it
//! is authoritative enough for (the id, the unique national identifier and
//! the authorization flags). Everything else — including mirrored profile
//! columns, which are only a read-refreshed cache — is resolved against the
//! remote authority first, and the local query is then restricted to the
//! returned id set. The split is static; no query ever relies on a runtime
//! field-lookup failure.

use orbit_identity_client::FilterCriteria;

/// One query predicate over the user set.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    Id(i64),
    NationalId(String),
    IsStaff(bool),
    IsSuperuser(bool),
    Username(String),
    Email(String),
    Phone(String),
    Role(String),
    Department(String),
}

impl Criterion {
    /// Whether the local schema can answer this predicate by itself.
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Criterion::Id(_)
                | Criterion::NationalId(_)
                | Criterion::IsStaff(_)
                | Criterion::IsSuperuser(_)
        )
    }

    /// The field this predicate refers to.
    #[must_use]
    pub fn field_name(&self) -> &'static str {
        match self {
            Criterion::Id(_) => "id",
            Criterion::NationalId(_) => "national_id",
            Criterion::IsStaff(_) => "is_staff",
            Criterion::IsSuperuser(_) => "is_superuser",
            Criterion::Username(_) => "username",
            Criterion::Email(_) => "email",
            Criterion::Phone(_) => "phone",
            Criterion::Role(_) => "role",
            Criterion::Department(_) => "department",
        }
    }
}

/// Split criteria into the locally-answerable and remote-resolvable parts.
#[must_use]
pub fn split_local_remote(criteria: &[Criterion]) -> (Vec<Criterion>, Vec<Criterion>) {
    let (local, remote): (Vec<_>, Vec<_>) =
        criteria.iter().cloned().partition(Criterion::is_local);
    (local, remote)
}

/// Build the remote filter for the remote-resolvable criteria.
#[must_use]
pub fn to_filter_criteria(remote: &[Criterion]) -> FilterCriteria {
    let mut filter = FilterCriteria::default();
    for criterion in remote {
        match criterion {
            Criterion::Username(value) => filter.username = Some(value.clone()),
            Criterion::Email(value) => filter.email = Some(value.clone()),
            Criterion::Phone(value) => filter.phone = Some(value.clone()),
            Criterion::Role(value) => filter.role = Some(value.clone()),
            Criterion::Department(value) => filter.department = Some(value.clone()),
            Criterion::NationalId(value) => filter.national_id = Some(value.clone()),
            // Local-only predicates are applied by the restricted local
            // query, not by the authority.
            Criterion::Id(_) | Criterion::IsStaff(_) | Criterion::IsSuperuser(_) => {}
        }
    }
    filter
}

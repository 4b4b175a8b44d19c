// Name resolution
//
// Turns a human-facing name ("ADMINISTRATOR@CORP.LOCAL", "WS01") into an
// object ID using the search endpoint, then optionally fetches the entity.
//
// Principals (users, computers, groups) get two extra allowances: a
// `name@domain` input with no hits is retried as `name`, and a single
// non-exact candidate is accepted. Other kinds need an exact match.

use tracing::debug;
use uuid::Uuid;

use crate::error::Error;
use crate::v2::client::BloodHoundClient;
use crate::v2::entity::{
    AdUser, AzureGroup, AzureUser, AzureVm, Computer, Container, Domain, Entity,
    EntityProperties, Gpo, Group, Ou,
};
use crate::v2::kinds::EntityKind;
use crate::v2::models::SearchResult;

const SID_PREFIX: &str = "S-1-5-";

/// `true` if `value` is already an object ID (SID or GUID) and needs no search.
pub fn is_object_id(value: &str) -> bool {
    let value = value.trim();
    let is_sid = value
        .get(..SID_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(SID_PREFIX));
    is_sid || Uuid::parse_str(value).is_ok()
}

/// Choose the winning candidate for `name` from search results.
///
/// `account` is the part before `@`, when the kind allows the account
/// fallback and the name has one.
fn pick_candidate(
    kind: EntityKind,
    name: &str,
    account: Option<&str>,
    candidates: &[SearchResult],
) -> Result<String, Error> {
    let wanted = name.to_lowercase();
    let wanted_account = account.map(str::to_lowercase);

    let exact = candidates.iter().find(|c| {
        let got = c.name.to_lowercase();
        got == wanted || wanted_account.as_deref() == Some(got.as_str())
    });
    if let Some(hit) = exact {
        return Ok(hit.object_id.clone());
    }

    match candidates {
        [only] if kind.allows_account_fallback() => {
            debug!(%kind, name, candidate = %only.name, "accepting sole non-exact candidate");
            Ok(only.object_id.clone())
        }
        [] | [_] => Err(Error::NotFound {
            kind: kind.to_string(),
            name: name.to_owned(),
        }),
        _ => Err(Error::AmbiguousName {
            kind: kind.to_string(),
            name: name.to_owned(),
            candidates: candidates.len(),
        }),
    }
}

impl BloodHoundClient {
    /// Resolve a name to an object ID.
    ///
    /// SIDs and GUIDs are returned unchanged without a request, so resolving
    /// an already-resolved ID is a no-op.
    pub async fn resolve_object_id(&self, kind: EntityKind, name: &str) -> Result<String, Error> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidArgument(format!("{kind} name is empty")));
        }
        if is_object_id(name) {
            return Ok(name.to_owned());
        }

        let account = if kind.allows_account_fallback() {
            name.split_once('@')
                .map(|(account, _)| account)
                .filter(|account| !account.is_empty())
        } else {
            None
        };

        let mut candidates = self.search(name, Some(kind.object_type()), None).await?;
        if candidates.is_empty() {
            if let Some(account) = account {
                debug!(%kind, name, account, "no hits for qualified name, retrying unqualified");
                candidates = self
                    .search(account, Some(kind.object_type()), None)
                    .await?;
            }
        }

        let object_id = pick_candidate(kind, name, account, &candidates)?;
        debug!(%kind, name, %object_id, "resolved");
        Ok(object_id)
    }

    /// Resolve `name`, then fetch the entity.
    ///
    /// A 404 on the fetch after a successful resolve is reported as
    /// [`Error::NotFound`].
    pub async fn get_entity_by_name<P: EntityProperties>(
        &self,
        name: &str,
    ) -> Result<Entity<P>, Error> {
        let object_id = self.resolve_object_id(P::KIND, name).await?;
        match self.get_entity::<P>(&object_id).await {
            Err(Error::Api { status: 404, .. }) => Err(Error::NotFound {
                kind: P::KIND.to_string(),
                name: name.trim().to_owned(),
            }),
            other => other,
        }
    }

    pub async fn get_ad_user_by_name(&self, name: &str) -> Result<AdUser, Error> {
        self.get_entity_by_name(name).await
    }

    pub async fn get_computer_by_name(&self, name: &str) -> Result<Computer, Error> {
        self.get_entity_by_name(name).await
    }

    pub async fn get_group_by_name(&self, name: &str) -> Result<Group, Error> {
        self.get_entity_by_name(name).await
    }

    pub async fn get_domain_by_name(&self, name: &str) -> Result<Domain, Error> {
        self.get_entity_by_name(name).await
    }

    pub async fn get_ou_by_name(&self, name: &str) -> Result<Ou, Error> {
        self.get_entity_by_name(name).await
    }

    pub async fn get_gpo_by_name(&self, name: &str) -> Result<Gpo, Error> {
        self.get_entity_by_name(name).await
    }

    pub async fn get_container_by_name(&self, name: &str) -> Result<Container, Error> {
        self.get_entity_by_name(name).await
    }

    pub async fn get_azure_user_by_name(&self, name: &str) -> Result<AzureUser, Error> {
        self.get_entity_by_name(name).await
    }

    pub async fn get_azure_group_by_name(&self, name: &str) -> Result<AzureGroup, Error> {
        self.get_entity_by_name(name).await
    }

    pub async fn get_azure_vm_by_name(&self, name: &str) -> Result<AzureVm, Error> {
        self.get_entity_by_name(name).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn hit(name: &str, id: &str) -> SearchResult {
        SearchResult {
            object_id: id.into(),
            name: name.into(),
            object_type: "User".into(),
            system_tags: String::new(),
        }
    }

    #[test]
    fn sids_and_guids_bypass_search() {
        assert!(is_object_id("S-1-5-21-123-456-500"));
        assert!(is_object_id("s-1-5-32-544"));
        assert!(is_object_id("2F3B1C6E-9A44-4D7B-8F2A-0123456789AB"));
        assert!(!is_object_id("ADMINISTRATOR@CORP.LOCAL"));
        assert!(!is_object_id("S-1-"));
        assert!(!is_object_id(""));
    }

    #[test]
    fn exact_match_is_case_insensitive() {
        let hits = [
            hit("ADMINISTRATOR@CORP.LOCAL", "S-1-5-21-1-500"),
            hit("ADMINISTRATOR@LAB.LOCAL", "S-1-5-21-2-500"),
        ];
        let id = pick_candidate(EntityKind::User, "administrator@lab.local", None, &hits).unwrap();
        assert_eq!(id, "S-1-5-21-2-500");
    }

    #[test]
    fn first_exact_match_wins() {
        let hits = [hit("DUP", "first"), hit("dup", "second")];
        let id = pick_candidate(EntityKind::Group, "Dup", None, &hits).unwrap();
        assert_eq!(id, "first");
    }

    #[test]
    fn account_prefix_counts_as_exact() {
        let hits = [hit("JDOE", "S-1-5-21-1-1105"), hit("JDOE2", "S-1-5-21-1-1106")];
        let id =
            pick_candidate(EntityKind::User, "jdoe@corp.local", Some("jdoe"), &hits).unwrap();
        assert_eq!(id, "S-1-5-21-1-1105");
    }

    #[test]
    fn sole_candidate_accepted_for_principals_only() {
        let hits = [hit("WS01.CORP.LOCAL", "S-1-5-21-1-1104")];
        let id = pick_candidate(EntityKind::Computer, "WS01", None, &hits).unwrap();
        assert_eq!(id, "S-1-5-21-1-1104");

        let err = pick_candidate(EntityKind::Domain, "CORP", None, &hits).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn no_candidates_is_not_found() {
        let err = pick_candidate(EntityKind::User, "ghost", None, &[]).unwrap_err();
        match err {
            Error::NotFound { kind, name } => {
                assert_eq!(kind, "User");
                assert_eq!(name, "ghost");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn several_inexact_candidates_are_ambiguous() {
        let hits = [hit("ADMIN1", "a"), hit("ADMIN2", "b"), hit("ADMIN3", "c")];
        let err = pick_candidate(EntityKind::User, "admin", None, &hits).unwrap_err();
        assert!(matches!(err, Error::AmbiguousName { candidates: 3, .. }));

        let err = pick_candidate(EntityKind::Ou, "admin", None, &hits[..2]).unwrap_err();
        assert!(matches!(err, Error::AmbiguousName { candidates: 2, .. }));
    }
}

use std::collections::HashMap;

use crate::core::error::{CatalogError, MatchError};
use crate::models::{IdentityId, Participant, PreferenceId};

/// Identities a preference label accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admits {
    Any,
    Only(Vec<String>),
}

/// One preference label and the identities it admits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceRule {
    pub label: String,
    pub admits: Admits,
}

impl PreferenceRule {
    pub fn new(label: impl Into<String>, admits: Admits) -> Self {
        Self {
            label: label.into(),
            admits,
        }
    }

    pub fn only<I, S>(label: impl Into<String>, identities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(label, Admits::Only(identities.into_iter().map(Into::into).collect()))
    }
}

/// Closed sets of identity and preference labels plus the admissibility table
///
/// Labels are interned to dense ids once per run so the predicate is a
/// table lookup.
#[derive(Debug, Clone)]
pub struct LabelCatalog {
    identities: Vec<String>,
    preferences: Vec<String>,
    identity_ids: HashMap<String, IdentityId>,
    preference_ids: HashMap<String, PreferenceId>,
    // None admits every identity
    admits: Vec<Option<Vec<bool>>>,
}

impl LabelCatalog {
    /// Build a catalog from identity labels and preference rules
    pub fn new<S: Into<String>>(
        identities: impl IntoIterator<Item = S>,
        rules: impl IntoIterator<Item = PreferenceRule>,
    ) -> Result<Self, CatalogError> {
        let identities: Vec<String> = identities.into_iter().map(Into::into).collect();

        let mut identity_ids = HashMap::with_capacity(identities.len());
        for (id, label) in identities.iter().enumerate() {
            let id = label_id(id, "identity")?;
            if identity_ids.insert(label.clone(), IdentityId(id)).is_some() {
                return Err(CatalogError::DuplicateIdentity(label.clone()));
            }
        }

        let mut preferences = Vec::new();
        let mut preference_ids = HashMap::new();
        let mut admits = Vec::new();

        for rule in rules {
            let id = PreferenceId(label_id(preferences.len(), "preference")?);
            if preference_ids.insert(rule.label.clone(), id).is_some() {
                return Err(CatalogError::DuplicatePreference(rule.label));
            }

            let mask = match rule.admits {
                Admits::Any => None,
                Admits::Only(accepted) => {
                    let mut mask = vec![false; identities.len()];
                    for identity in accepted {
                        match identity_ids.get(&identity) {
                            Some(IdentityId(idx)) => mask[*idx as usize] = true,
                            None => {
                                return Err(CatalogError::UnknownAdmittedIdentity {
                                    preference: rule.label,
                                    identity,
                                })
                            }
                        }
                    }
                    Some(mask)
                }
            };

            preferences.push(rule.label);
            admits.push(mask);
        }

        Ok(Self {
            identities,
            preferences,
            identity_ids,
            preference_ids,
            admits,
        })
    }

    pub fn identities(&self) -> &[String] {
        &self.identities
    }

    pub fn preferences(&self) -> &[String] {
        &self.preferences
    }

    pub fn identity_id(&self, label: &str) -> Option<IdentityId> {
        self.identity_ids.get(label).copied()
    }

    pub fn preference_id(&self, label: &str) -> Option<PreferenceId> {
        self.preference_ids.get(label).copied()
    }

    pub fn identity_label(&self, id: IdentityId) -> &str {
        &self.identities[id.0 as usize]
    }

    pub fn preference_label(&self, id: PreferenceId) -> &str {
        &self.preferences[id.0 as usize]
    }

    /// Whether a subject with `subject_preference` admits a candidate of
    /// `candidate_identity`
    ///
    /// Only the subject's preference is consulted; mutual compatibility is
    /// not required. The subject's own identity is accepted so the rule
    /// table can grow identity-dependent entries without changing callers.
    #[inline]
    pub fn compatible(
        &self,
        _subject_identity: IdentityId,
        subject_preference: PreferenceId,
        candidate_identity: IdentityId,
    ) -> bool {
        match &self.admits[subject_preference.0 as usize] {
            None => true,
            Some(mask) => mask[candidate_identity.0 as usize],
        }
    }

    /// Directional check for an ordered pair of resolved participants
    #[inline]
    pub fn admits(&self, subject: &Participant, candidate: &Participant) -> bool {
        self.compatible(subject.identity, subject.preference, candidate.identity)
    }

    /// Resolve raw labels into participants, failing on the first unknown label
    pub fn resolve<I, P>(&self, identities: &[I], preferences: &[P]) -> Result<Vec<Participant>, MatchError>
    where
        I: AsRef<str>,
        P: AsRef<str>,
    {
        identities
            .iter()
            .zip(preferences)
            .enumerate()
            .map(|(index, (identity, preference))| -> Result<Participant, MatchError> {
                let identity = identity.as_ref();
                let preference = preference.as_ref();

                let identity = self
                    .identity_id(identity)
                    .ok_or_else(|| MatchError::UnknownIdentity {
                        index,
                        label: identity.to_string(),
                    })?;
                let preference = self
                    .preference_id(preference)
                    .ok_or_else(|| MatchError::UnknownPreference {
                        index,
                        label: preference.to_string(),
                    })?;

                Ok(Participant { identity, preference })
            })
            .collect()
    }
}

fn label_id(index: usize, kind: &'static str) -> Result<u16, CatalogError> {
    u16::try_from(index).map_err(|_| CatalogError::TooManyLabels {
        kind,
        count: index + 1,
        limit: usize::from(u16::MAX) + 1,
    })
}

impl Default for LabelCatalog {
    /// `Male`/`Female`/`Non-binary` identities; `Men`, `Women`, `Bisexual` preferences
    fn default() -> Self {
        Self {
            identities: vec!["Male".into(), "Female".into(), "Non-binary".into()],
            preferences: vec!["Men".into(), "Women".into(), "Bisexual".into()],
            identity_ids: HashMap::from([
                ("Male".to_string(), IdentityId(0)),
                ("Female".to_string(), IdentityId(1)),
                ("Non-binary".to_string(), IdentityId(2)),
            ]),
            preference_ids: HashMap::from([
                ("Men".to_string(), PreferenceId(0)),
                ("Women".to_string(), PreferenceId(1)),
                ("Bisexual".to_string(), PreferenceId(2)),
            ]),
            admits: vec![
                Some(vec![true, false, false]),
                Some(vec![false, true, false]),
                None,
            ],
        }
    }
}

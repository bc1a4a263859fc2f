//! Team-to-entity resolution by external identifier.

use std::collections::BTreeMap;

use crate::external_id_for_team;

/// Outcome of looking up the single vault entity that belongs to a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// Exactly one entity carries the team's external identifier.
    Resolved(T),
    /// Two or more entities carry the team's external identifier.
    Duplicate,
    /// No entity carries the team's external identifier.
    Missing,
}

impl<T> Resolution<T> {
    /// Returns the resolved value, if any.
    #[must_use]
    pub fn resolved(&self) -> Option<&T> {
        match self {
            Self::Resolved(value) => Some(value),
            Self::Duplicate | Self::Missing => None,
        }
    }

    /// Returns whether more than one entity matched.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate)
    }

    /// Returns whether no entity matched.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Borrows the resolved value.
    #[must_use]
    pub fn as_ref(&self) -> Resolution<&T> {
        match self {
            Self::Resolved(value) => Resolution::Resolved(value),
            Self::Duplicate => Resolution::Duplicate,
            Self::Missing => Resolution::Missing,
        }
    }

    fn record(self, candidate: T) -> Self {
        match self {
            Self::Missing => Self::Resolved(candidate),
            Self::Resolved(_) | Self::Duplicate => Self::Duplicate,
        }
    }
}

/// Per-team resolutions built from one scan of vault entities.
///
/// Teams with no matching entity are absent and resolve to
/// [`Resolution::Missing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamIndex<T> {
    entries: BTreeMap<String, Resolution<T>>,
}

impl<T> TeamIndex<T> {
    /// Matches each entity's external identifier against the teams'.
    pub fn build<I>(teams: &[String], entities: I) -> Self
    where
        I: IntoIterator<Item = (Option<String>, T)>,
    {
        let teams_by_external_id: BTreeMap<String, &String> = teams
            .iter()
            .map(|team| (external_id_for_team(team), team))
            .collect();

        let mut entries: BTreeMap<String, Resolution<T>> = BTreeMap::new();
        for (external_id, entity) in entities {
            let Some(team) = external_id
                .as_deref()
                .and_then(|external_id| teams_by_external_id.get(external_id))
            else {
                continue;
            };

            let current = entries
                .remove(team.as_str())
                .unwrap_or(Resolution::Missing);
            entries.insert((*team).clone(), current.record(entity));
        }

        Self { entries }
    }

    /// Returns the resolution for one team.
    #[must_use]
    pub fn get(&self, team: &str) -> Resolution<&T> {
        self.entries
            .get(team)
            .map_or(Resolution::Missing, Resolution::as_ref)
    }

    /// Returns the entity for a team only when exactly one matched.
    #[must_use]
    pub fn resolved(&self, team: &str) -> Option<&T> {
        self.entries.get(team).and_then(Resolution::resolved)
    }

    /// Returns the first team, in input order, whose entity is duplicated.
    #[must_use]
    pub fn first_duplicate<'a>(&self, teams: &'a [String]) -> Option<&'a str> {
        teams
            .iter()
            .map(String::as_str)
            .find(|team| self.get(team).is_duplicate())
    }

    /// Returns teams with no matching entity, in input order, without repeats.
    #[must_use]
    pub fn missing_teams(&self, teams: &[String]) -> Vec<String> {
        let mut missing: Vec<String> = Vec::new();
        for team in teams {
            if self.get(team).is_missing() && !missing.contains(team) {
                missing.push(team.clone());
            }
        }
        missing
    }

    /// Number of teams that matched at least one entity.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no team matched any entity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

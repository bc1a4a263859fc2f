use super::*;

impl ReconciliationService {
    /// Resolves each team to its group id by external identifier.
    pub async fn list_existing_groups(&self, teams: &[String]) -> AppResult<TeamIndex<String>> {
        let groups = self.vault_directory.list_groups().await?;

        Ok(TeamIndex::build(
            teams,
            groups
                .into_iter()
                .map(|group| (group.external_id, group.id)),
        ))
    }

    /// Returns the managed group ids for the teams, creating missing groups.
    ///
    /// Fails on a duplicated group or collection before creating anything.
    pub async fn collate_user_group_ids(
        &self,
        teams: &[String],
        groups: &TeamIndex<String>,
        collections: &TeamIndex<CollectionRef>,
    ) -> AppResult<Vec<String>> {
        ensure_no_duplicates(teams, groups, collections)?;

        let mut group_ids: Vec<String> = Vec::new();
        let mut seen_teams: Vec<&str> = Vec::new();

        for team in teams {
            if seen_teams.contains(&team.as_str()) {
                continue;
            }
            seen_teams.push(team.as_str());

            let collection = collections.resolved(team).cloned();
            let group_id = match groups.resolved(team) {
                Some(group_id) => group_id.clone(),
                None => {
                    if let Err(error) = validate_group_name(team) {
                        warn!(team = %team, error = %error, "skipping team with invalid group name");
                        continue;
                    }
                    let granted = collection
                        .iter()
                        .map(|collection| CollectionAccess::read_write(collection.id.as_str()))
                        .collect();
                    let group_id = self
                        .vault_directory
                        .create_group(NewGroup {
                            name: team.clone(),
                            external_id: external_id_for_team(team),
                            collections: granted,
                        })
                        .await?;
                    info!(team = %team, group_id = %group_id, "created team group");
                    group_id
                }
            };

            if let Some(collection) = collection {
                self.sync_collection_group(collection.id.as_str(), group_id.as_str())
                    .await?;
            }

            group_ids.push(group_id);
        }

        Ok(group_ids)
    }

    /// Ids of organisation groups not named after a directory team.
    pub async fn custom_group_ids(&self) -> AppResult<Vec<String>> {
        let groups = self.vault_directory.list_groups().await?;
        let team_names = self.team_directory.get_teams().await?;

        Ok(custom_group_ids(&groups, &team_names))
    }

    /// Sets the member's groups to the managed ids plus the custom groups they already had.
    ///
    /// Returns whether the group list was written.
    pub async fn associate_user_to_groups(
        &self,
        member_id: &str,
        managed_group_ids: &[String],
        custom_group_ids: &[String],
    ) -> AppResult<bool> {
        let existing = self.vault_directory.get_member_group_ids(member_id).await?;
        let group_ids = final_group_ids(managed_group_ids, &existing, custom_group_ids);

        if group_ids == existing {
            info!(member_id, "member groups already up to date");
            return Ok(false);
        }

        self.vault_directory
            .update_member_group_ids(member_id, &group_ids)
            .await?;
        info!(member_id, group_count = group_ids.len(), "member groups updated");
        Ok(true)
    }
}

use super::*;

impl MaintenanceService {
    /// Removes members with no vault activity in the last `inactivity_days` days.
    ///
    /// Protected members are kept. On a dry run nothing is removed.
    pub async fn offboard_inactive_members(
        &self,
        inactivity_days: u32,
        now: DateTime<Utc>,
    ) -> AppResult<InactiveMemberReport> {
        let start = now - Duration::days(i64::from(inactivity_days));
        let active_users = self
            .vault_directory
            .list_active_user_ids(start, now)
            .await?;
        info!(inactivity_days, active_users = active_users.len(), "compiled active users");

        let members = self.vault_directory.list_members().await?;
        let inactive: Vec<&Member> = members
            .iter()
            .filter(|member| {
                member
                    .user_id
                    .as_ref()
                    .is_some_and(|user_id| !active_users.contains(user_id))
            })
            .collect();
        let protected = self.protected_member_ids(&members).await?;
        info!(
            members = members.len(),
            inactive = inactive.len(),
            protected = protected.len(),
            "compiled inactive members"
        );

        let mut report = InactiveMemberReport {
            active_users: active_users.len(),
            dry_run: self.settings.dry_run,
            ..InactiveMemberReport::default()
        };
        let mut failures = Vec::new();

        for member in inactive {
            report.inactive_members.push(member.id.clone());

            if protected.contains(&member.id) {
                info!(member_id = %member.id, "skipping protected member");
                report.protected_members.push(member.id.clone());
                continue;
            }

            if self.settings.dry_run {
                info!(member_id = %member.id, "dry run, would remove inactive member");
                continue;
            }

            match self.vault_directory.remove_member(member.id.as_str()).await {
                Ok(()) => {
                    info!(member_id = %member.id, "removed inactive member");
                    report.removed_members.push(member.id.clone());
                }
                Err(error) => {
                    warn!(member_id = %member.id, error = %error, "failed to remove inactive member");
                    failures.push(error);
                }
            }
        }

        AppError::from_failures("offboard inactive users", failures)?;
        Ok(report)
    }

    async fn protected_member_ids(&self, members: &[Member]) -> AppResult<BTreeSet<String>> {
        let mut protected = BTreeSet::new();

        match self
            .collection_id_by_name(self.settings.protected_collection_name.as_str())
            .await?
        {
            Some(collection_id) => protected.extend(
                members
                    .iter()
                    .filter(|member| {
                        member
                            .collections
                            .iter()
                            .any(|access| access.id == collection_id)
                    })
                    .map(|member| member.id.clone()),
            ),
            None => warn!(
                collection = %self.settings.protected_collection_name,
                "protected collection not found"
            ),
        }

        let groups = self.vault_directory.list_groups().await?;
        for group in groups
            .iter()
            .filter(|group| group.name == self.settings.protected_group_name)
        {
            protected.extend(
                self.vault_directory
                    .list_group_member_ids(group.id.as_str())
                    .await?,
            );
        }

        let support_admins = self
            .team_directory
            .get_team_admin_users(&[self.settings.support_admin_team.clone()])
            .await?;
        protected.extend(
            members
                .iter()
                .filter(|member| {
                    member
                        .external_id
                        .as_ref()
                        .is_some_and(|username| support_admins.contains(username))
                })
                .map(|member| member.id.clone()),
        );

        Ok(protected)
    }
}

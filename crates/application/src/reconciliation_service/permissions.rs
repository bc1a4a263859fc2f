use super::*;

impl ReconciliationService {
    /// Lets team administrators manage their teams' collections.
    ///
    /// Returns the member as it now stands in the vault.
    pub async fn grant_manage_permission_to_team_collections(
        &self,
        mut member: Member,
        user: &DirectoryUser,
        teams: &[String],
        collections: &TeamIndex<CollectionRef>,
    ) -> AppResult<Member> {
        let mut changes = 0_usize;

        for team in teams {
            if !user.can_manage_team_collection(team) {
                continue;
            }
            let Some(collection) = collections.resolved(team) else {
                continue;
            };

            match member
                .collections
                .iter_mut()
                .find(|access| access.id == collection.id)
            {
                Some(access) if access.manage => {}
                Some(access) => {
                    access.manage = true;
                    changes += 1;
                }
                None => {
                    member
                        .collections
                        .push(CollectionAccess::managing(collection.id.as_str()));
                    changes += 1;
                }
            }
        }

        if changes == 0 {
            return Ok(member);
        }

        self.vault_directory.update_member(&member).await?;
        info!(
            username = %user.username,
            collections = changes,
            "granted manage permission on team collections"
        );
        Ok(member)
    }

    /// Gives members of the support team the support administrator role.
    ///
    /// Any permissions the member had are replaced.
    pub async fn assign_custom_permissions_to_support_admin(
        &self,
        mut member: Member,
        teams: &[String],
    ) -> AppResult<Member> {
        if !qualifies_for_support_permissions(
            teams,
            self.support_admin_team.as_str(),
            member.member_type,
        ) {
            return Ok(member);
        }

        member.member_type = MemberType::Custom;
        member.permissions = Some(MemberPermissions::support_admin());
        self.vault_directory.update_member(&member).await?;
        info!(member_id = %member.id, "assigned support administrator permissions");
        Ok(member)
    }
}

use super::*;

impl LifecycleService {
    /// Re-sends or withdraws expired invitations.
    ///
    /// Invitations with no history are withdrawn. Failures are collected per
    /// member and reported together.
    pub async fn reinvite_pending_members(&self, today: NaiveDate) -> AppResult<()> {
        let members = self.vault_directory.list_members().await?;
        let mut failures = Vec::new();

        for member in members
            .iter()
            .filter(|member| member.status == MemberStatus::Invited)
        {
            let Some(username) = member.external_id.as_deref() else {
                info!(member_id = %member.id, "invited member has no external id, skipping");
                continue;
            };

            if let Err(error) = self
                .process_invitation(member.id.as_str(), username, today)
                .await
            {
                warn!(username, error = %error, "failed to process invitation");
                failures.push(AppError::Upstream(format!("{username}: {error}")));
            }
        }

        AppError::from_failures("reinvite users", failures)
    }

    async fn process_invitation(
        &self,
        member_id: &str,
        username: &str,
        today: NaiveDate,
    ) -> AppResult<()> {
        let Some(record) = self.invite_store.get(username).await? else {
            info!(username, "no invitation record, removing member");
            return self.vault_directory.remove_member(member_id).await;
        };

        match record.decide(today) {
            ReinviteDecision::Keep => Ok(()),
            ReinviteDecision::Reinvite => {
                self.vault_directory.reinvite_member(member_id).await?;
                self.invite_store.put(&record.reinvited(today)).await?;
                info!(username, total_invites = record.total_invites + 1, "invitation re-sent");
                Ok(())
            }
            ReinviteDecision::Remove => {
                self.vault_directory.remove_member(member_id).await?;
                self.invite_store.delete(username).await?;
                info!(username, "invitation allowance spent, member removed");
                Ok(())
            }
        }
    }
}

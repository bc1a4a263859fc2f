use super::*;

impl LifecycleService {
    /// Confirms accepted members whose email domain is allowed.
    ///
    /// Returns the confirmed member ids. Disallowed domains and failed
    /// confirmations are reported together after every member was tried.
    pub async fn confirm_members(&self, allowed_domains: &[String]) -> AppResult<Vec<String>> {
        let pending = self.vault_session.list_unconfirmed_members().await?;
        let mut confirmed = Vec::new();
        let mut failures = Vec::new();

        for member in pending {
            let domain = member
                .email
                .rsplit_once('@')
                .map(|(_, domain)| domain)
                .unwrap_or_default();

            if !allowed_domains.iter().any(|allowed| allowed == domain) {
                warn!(member_id = %member.id, domain, "email domain not allowed");
                failures.push(AppError::Validation(format!(
                    "invalid domain '{domain}' for member {}",
                    member.id
                )));
                continue;
            }

            match self.vault_session.confirm_member(member.id.as_str()).await {
                Ok(()) => {
                    info!(member_id = %member.id, "member confirmed");
                    confirmed.push(member.id);
                }
                Err(error) => {
                    warn!(member_id = %member.id, error = %error, "member confirmation failed");
                    failures.push(error);
                }
            }
        }

        AppError::from_failures("confirm users", failures)?;
        Ok(confirmed)
    }
}

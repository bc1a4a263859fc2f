use super::*;

impl ReconciliationService {
    /// Resolves each team to its collection by external identifier.
    pub async fn list_existing_collections(
        &self,
        teams: &[String],
    ) -> AppResult<TeamIndex<CollectionRef>> {
        let collections = self.vault_directory.list_collections().await?;

        Ok(TeamIndex::build(
            teams,
            collections.into_iter().map(|collection| {
                let reference = CollectionRef {
                    id: collection.id,
                    external_id: collection.external_id.clone().unwrap_or_default(),
                };
                (collection.external_id, reference)
            }),
        ))
    }

    /// Creates a collection for each team that has none.
    pub async fn create_missing_collections(&self, missing: &[String]) -> AppResult<()> {
        if missing.is_empty() {
            info!("no missing collections to create");
            return Ok(());
        }

        info!(count = missing.len(), "creating missing team collections");
        self.vault_session.create_collections(missing).await
    }

    /// Grants a team group access to its collection, keeping existing access entries.
    pub async fn sync_collection_group(&self, collection_id: &str, group_id: &str) -> AppResult<()> {
        let mut collection = self.vault_directory.get_collection(collection_id).await?;

        if collection.is_manually_created() {
            info!(collection_id, "collection was created manually, leaving its groups untouched");
            return Ok(());
        }

        if collection.has_group(group_id) {
            info!(collection_id, group_id, "group already has access to collection");
            return Ok(());
        }

        collection.groups.push(CollectionAccess::read_write(group_id));
        self.vault_directory.update_collection(&collection).await
    }
}

use super::*;

impl MaintenanceService {
    /// Returns the details of the member provisioned for `username`.
    pub async fn user_details(&self, username: &str) -> AppResult<Option<MemberDetails>> {
        let members = self.vault_directory.list_members().await?;
        let Some(member) = members
            .into_iter()
            .find(|member| member.has_external_id(username))
        else {
            return Ok(None);
        };

        let member = self.vault_directory.get_member(member.id.as_str()).await?;
        Ok(Some(MemberDetails::from(member)))
    }

    /// Lists the item names of the collection called `collection_name`.
    pub async fn list_collection_items(
        &self,
        collection_name: &str,
    ) -> AppResult<Option<CollectionItems>> {
        let Some(collection_id) = self.collection_id_by_name(collection_name).await? else {
            return Ok(None);
        };

        let items = self
            .vault_session
            .list_items(collection_id.as_str())
            .await?;
        Ok(Some(CollectionItems {
            collection: collection_name.to_owned(),
            items: items.into_iter().map(|item| item.name).collect(),
        }))
    }

    pub(super) async fn collection_id_by_name(&self, name: &str) -> AppResult<Option<String>> {
        let collections = self.vault_session.list_collections().await?;
        Ok(collections
            .into_iter()
            .find(|collection| collection.name == name)
            .map(|collection| collection.id))
    }
}

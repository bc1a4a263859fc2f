//! In-memory port fakes shared by service tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use warden_core::{AppError, AppResult};
use warden_domain::{
    Collection, CollectionAccess, DirectoryRole, Group, InviteRecord, Member, MemberStatus,
    MemberType, external_id_for_team,
};

use crate::{
    BlobStore, InviteStore, MemberInvite, NewGroup, PendingMember, SessionCollection,
    TeamDirectory, VaultDirectory, VaultItem, VaultSession,
};

pub fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

pub fn member(id: &str, username: &str) -> Member {
    Member {
        id: id.to_owned(),
        user_id: Some(format!("user-{id}")),
        name: None,
        email: format!("{username}@example.com"),
        two_factor_enabled: false,
        status: MemberStatus::Confirmed,
        member_type: MemberType::User,
        external_id: Some(username.to_owned()),
        reset_password_enrolled: true,
        permissions: None,
        collections: Vec::new(),
    }
}

pub fn team_group(id: &str, team: &str) -> Group {
    Group {
        id: id.to_owned(),
        name: team.to_owned(),
        external_id: Some(external_id_for_team(team)),
        collections: Vec::new(),
    }
}

pub fn custom_group(id: &str, name: &str) -> Group {
    Group {
        id: id.to_owned(),
        name: name.to_owned(),
        external_id: None,
        collections: Vec::new(),
    }
}

pub fn team_collection(id: &str, team: &str) -> Collection {
    Collection {
        id: id.to_owned(),
        external_id: Some(external_id_for_team(team)),
        groups: Vec::new(),
    }
}

#[derive(Default)]
pub struct FakeTeamDirectory {
    pub user_teams: Mutex<BTreeMap<String, Vec<String>>>,
    pub teams: Mutex<Vec<String>>,
    pub roles: Mutex<BTreeMap<(String, String), DirectoryRole>>,
    pub failing_users: Mutex<BTreeSet<String>>,
}

impl FakeTeamDirectory {
    pub async fn add_user(&self, username: &str, teams: &[&str]) {
        self.user_teams
            .lock()
            .await
            .insert(username.to_owned(), names(teams));

        let mut known = self.teams.lock().await;
        let mut roles = self.roles.lock().await;
        for team in teams {
            if !known.iter().any(|known_team| known_team == team) {
                known.push((*team).to_owned());
            }
            roles
                .entry((username.to_owned(), (*team).to_owned()))
                .or_insert(DirectoryRole::User);
        }
    }

    pub async fn set_role(&self, username: &str, team: &str, role: DirectoryRole) {
        self.roles
            .lock()
            .await
            .insert((username.to_owned(), team.to_owned()), role);
    }
}

#[async_trait]
impl TeamDirectory for FakeTeamDirectory {
    async fn get_user_teams(&self, username: &str) -> AppResult<Vec<String>> {
        if self.failing_users.lock().await.contains(username) {
            return Err(AppError::Upstream(format!(
                "directory unavailable for {username}"
            )));
        }

        Ok(self
            .user_teams
            .lock()
            .await
            .get(username)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_teams(&self) -> AppResult<Vec<String>> {
        Ok(self.teams.lock().await.clone())
    }

    async fn get_user_role_by_team(
        &self,
        username: &str,
        team: &str,
    ) -> AppResult<Option<DirectoryRole>> {
        Ok(self
            .roles
            .lock()
            .await
            .get(&(username.to_owned(), team.to_owned()))
            .copied())
    }

    async fn get_team_admin_users(&self, teams: &[String]) -> AppResult<Vec<String>> {
        let roles = self.roles.lock().await;
        let mut admins: Vec<String> = Vec::new();
        for team in teams {
            for ((username, role_team), role) in roles.iter() {
                if role_team == team
                    && role.can_manage_team_collection()
                    && !admins.contains(username)
                {
                    admins.push(username.clone());
                }
            }
        }
        Ok(admins)
    }
}

#[derive(Default)]
pub struct FakeVaultDirectory {
    pub members: Mutex<Vec<Member>>,
    pub groups: Mutex<Vec<Group>>,
    pub collections: Mutex<Vec<Collection>>,
    pub member_groups: Mutex<BTreeMap<String, Vec<String>>>,
    pub group_members: Mutex<BTreeMap<String, Vec<String>>>,
    pub active_user_ids: Mutex<BTreeSet<String>>,
    pub failing_removals: Mutex<BTreeSet<String>>,
    pub writes: Mutex<Vec<String>>,
    pub member_updates: Mutex<Vec<Member>>,
    pub next_id: Mutex<u32>,
}

impl FakeVaultDirectory {
    pub async fn writes(&self) -> Vec<String> {
        self.writes.lock().await.clone()
    }

    pub async fn collection(&self, collection_id: &str) -> Option<Collection> {
        self.collections
            .lock()
            .await
            .iter()
            .find(|collection| collection.id == collection_id)
            .cloned()
    }

    pub async fn get_member_for_test(&self, member_id: &str) -> Member {
        self.members
            .lock()
            .await
            .iter()
            .find(|member| member.id == member_id)
            .cloned()
            .unwrap_or_else(|| unreachable!())
    }

    pub async fn groups_of(&self, member_id: &str) -> Vec<String> {
        self.member_groups
            .lock()
            .await
            .get(member_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn next_id(&self, prefix: &str) -> String {
        let mut next_id = self.next_id.lock().await;
        *next_id += 1;
        format!("{prefix}-new-{next_id}")
    }

    async fn record(&self, write: String) {
        self.writes.lock().await.push(write);
    }
}

#[async_trait]
impl VaultDirectory for FakeVaultDirectory {
    async fn list_members(&self) -> AppResult<Vec<Member>> {
        Ok(self.members.lock().await.clone())
    }

    async fn get_member(&self, member_id: &str) -> AppResult<Member> {
        self.members
            .lock()
            .await
            .iter()
            .find(|member| member.id == member_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("member '{member_id}'")))
    }

    async fn invite_member(&self, invite: MemberInvite) -> AppResult<String> {
        let existing = self
            .members
            .lock()
            .await
            .iter()
            .find(|member| member.email == invite.email)
            .map(|member| member.id.clone());
        if let Some(member_id) = existing {
            return Ok(member_id);
        }

        let member_id = self.next_id("member").await;
        self.members.lock().await.push(Member {
            id: member_id.clone(),
            user_id: None,
            name: None,
            email: invite.email,
            two_factor_enabled: false,
            status: MemberStatus::Invited,
            member_type: invite.member_type,
            external_id: Some(invite.external_id),
            reset_password_enrolled: invite.reset_password_enrolled,
            permissions: None,
            collections: invite.collections,
        });
        self.record(format!("invite:{member_id}")).await;
        Ok(member_id)
    }

    async fn reinvite_member(&self, member_id: &str) -> AppResult<()> {
        self.record(format!("reinvite:{member_id}")).await;
        Ok(())
    }

    async fn remove_member(&self, member_id: &str) -> AppResult<()> {
        if self.failing_removals.lock().await.contains(member_id) {
            return Err(AppError::Upstream(format!(
                "failed to remove member '{member_id}'"
            )));
        }

        self.members
            .lock()
            .await
            .retain(|member| member.id != member_id);
        self.record(format!("remove:{member_id}")).await;
        Ok(())
    }

    async fn update_member(&self, member: &Member) -> AppResult<()> {
        let mut members = self.members.lock().await;
        let Some(stored) = members.iter_mut().find(|stored| stored.id == member.id) else {
            return Err(AppError::NotFound(format!("member '{}'", member.id)));
        };
        *stored = member.clone();
        self.member_updates.lock().await.push(member.clone());
        self.record(format!("update_member:{}", member.id)).await;
        Ok(())
    }

    async fn get_member_group_ids(&self, member_id: &str) -> AppResult<Vec<String>> {
        Ok(self.groups_of(member_id).await)
    }

    async fn update_member_group_ids(
        &self,
        member_id: &str,
        group_ids: &[String],
    ) -> AppResult<()> {
        self.member_groups
            .lock()
            .await
            .insert(member_id.to_owned(), group_ids.to_vec());
        self.record(format!("update_member_group_ids:{member_id}"))
            .await;
        Ok(())
    }

    async fn list_groups(&self) -> AppResult<Vec<Group>> {
        Ok(self.groups.lock().await.clone())
    }

    async fn create_group(&self, group: NewGroup) -> AppResult<String> {
        let group_id = self.next_id("group").await;

        let mut collections = self.collections.lock().await;
        for access in &group.collections {
            if let Some(collection) = collections
                .iter_mut()
                .find(|collection| collection.id == access.id)
            {
                collection
                    .groups
                    .push(CollectionAccess::read_write(group_id.as_str()));
            }
        }
        drop(collections);

        self.groups.lock().await.push(Group {
            id: group_id.clone(),
            name: group.name.clone(),
            external_id: Some(group.external_id),
            collections: group.collections,
        });
        self.record(format!("create_group:{}", group.name)).await;
        Ok(group_id)
    }

    async fn list_group_member_ids(&self, group_id: &str) -> AppResult<Vec<String>> {
        Ok(self
            .group_members
            .lock()
            .await
            .get(group_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_collections(&self) -> AppResult<Vec<Collection>> {
        Ok(self.collections.lock().await.clone())
    }

    async fn get_collection(&self, collection_id: &str) -> AppResult<Collection> {
        self.collection(collection_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("collection '{collection_id}'")))
    }

    async fn update_collection(&self, collection: &Collection) -> AppResult<()> {
        let mut collections = self.collections.lock().await;
        let Some(stored) = collections
            .iter_mut()
            .find(|stored| stored.id == collection.id)
        else {
            return Err(AppError::NotFound(format!(
                "collection '{}'",
                collection.id
            )));
        };
        *stored = collection.clone();
        drop(collections);
        self.record(format!("update_collection:{}", collection.id))
            .await;
        Ok(())
    }

    async fn list_active_user_ids(
        &self,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> AppResult<BTreeSet<String>> {
        Ok(self.active_user_ids.lock().await.clone())
    }
}

pub struct FakeVaultSession {
    pub directory: Arc<FakeVaultDirectory>,
    pub created_collections: Mutex<Vec<String>>,
    pub collections: Mutex<Vec<SessionCollection>>,
    pub items: Mutex<BTreeMap<String, Vec<VaultItem>>>,
    pub pending_members: Mutex<Vec<PendingMember>>,
    pub confirmed: Mutex<Vec<String>>,
    pub failing_confirmations: Mutex<BTreeSet<String>>,
    pub export_bytes: Mutex<Option<Vec<u8>>>,
    pub logouts: Mutex<u32>,
}

impl FakeVaultSession {
    pub fn new(directory: Arc<FakeVaultDirectory>) -> Self {
        Self {
            directory,
            created_collections: Mutex::new(Vec::new()),
            collections: Mutex::new(Vec::new()),
            items: Mutex::new(BTreeMap::new()),
            pending_members: Mutex::new(Vec::new()),
            confirmed: Mutex::new(Vec::new()),
            failing_confirmations: Mutex::new(BTreeSet::new()),
            export_bytes: Mutex::new(Some(b"{\"encrypted\":true}".to_vec())),
            logouts: Mutex::new(0),
        }
    }
}

#[async_trait]
impl VaultSession for FakeVaultSession {
    async fn export(&self) -> AppResult<Vec<u8>> {
        self.export_bytes
            .lock()
            .await
            .clone()
            .ok_or_else(|| AppError::Upstream("export failed".to_owned()))
    }

    async fn create_collections(&self, teams: &[String]) -> AppResult<()> {
        let mut collections = self.directory.collections.lock().await;
        for team in teams {
            collections.push(team_collection(&format!("col-{team}"), team));
        }
        drop(collections);

        self.created_collections
            .lock()
            .await
            .extend(teams.iter().cloned());
        Ok(())
    }

    async fn list_collections(&self) -> AppResult<Vec<SessionCollection>> {
        Ok(self.collections.lock().await.clone())
    }

    async fn list_items(&self, collection_id: &str) -> AppResult<Vec<VaultItem>> {
        Ok(self
            .items
            .lock()
            .await
            .get(collection_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_unconfirmed_members(&self) -> AppResult<Vec<PendingMember>> {
        Ok(self.pending_members.lock().await.clone())
    }

    async fn confirm_member(&self, member_id: &str) -> AppResult<()> {
        if self.failing_confirmations.lock().await.contains(member_id) {
            return Err(AppError::Upstream(format!(
                "confirm exited with status 1 for {member_id}"
            )));
        }
        self.confirmed.lock().await.push(member_id.to_owned());
        Ok(())
    }

    async fn logout(&self) -> AppResult<()> {
        *self.logouts.lock().await += 1;
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeInviteStore {
    pub records: Mutex<BTreeMap<String, InviteRecord>>,
}

#[async_trait]
impl InviteStore for FakeInviteStore {
    async fn get(&self, username: &str) -> AppResult<Option<InviteRecord>> {
        Ok(self.records.lock().await.get(username).cloned())
    }

    async fn put(&self, record: &InviteRecord) -> AppResult<()> {
        self.records
            .lock()
            .await
            .insert(record.username.clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, username: &str) -> AppResult<()> {
        self.records.lock().await.remove(username);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeBlobStore {
    pub blobs: Mutex<BTreeMap<String, Vec<u8>>>,
}

#[async_trait]
impl BlobStore for FakeBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> AppResult<()> {
        self.blobs.lock().await.insert(key.to_owned(), bytes);
        Ok(())
    }
}

pub struct Fakes {
    pub team_directory: Arc<FakeTeamDirectory>,
    pub vault_directory: Arc<FakeVaultDirectory>,
    pub vault_session: Arc<FakeVaultSession>,
    pub invite_store: Arc<FakeInviteStore>,
    pub blob_store: Arc<FakeBlobStore>,
}

impl Fakes {
    pub fn new() -> Self {
        let vault_directory = Arc::new(FakeVaultDirectory::default());
        Self {
            team_directory: Arc::new(FakeTeamDirectory::default()),
            vault_session: Arc::new(FakeVaultSession::new(vault_directory.clone())),
            vault_directory,
            invite_store: Arc::new(FakeInviteStore::default()),
            blob_store: Arc::new(FakeBlobStore::default()),
        }
    }
}

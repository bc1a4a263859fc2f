use chrono::NaiveDate;
use warden_core::AppError;
use warden_domain::{InviteRecord, MemberStatus};

use crate::ReconciliationService;
use crate::test_support::{Fakes, member, names};
use crate::vault_ports::PendingMember;

use super::LifecycleService;

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap_or_else(|| unreachable!())
}

fn service(fakes: &Fakes) -> LifecycleService {
    let reconciliation = ReconciliationService::new(
        fakes.team_directory.clone(),
        fakes.vault_directory.clone(),
        fakes.vault_session.clone(),
        "Platform Security",
    );
    LifecycleService::new(
        fakes.vault_directory.clone(),
        fakes.vault_session.clone(),
        fakes.invite_store.clone(),
        reconciliation,
    )
}

async fn seed_invited(fakes: &Fakes, member_id: &str, username: &str) {
    let mut invited = member(member_id, username);
    invited.status = MemberStatus::Invited;
    invited.user_id = None;
    fakes.vault_directory.members.lock().await.push(invited);
}

async fn seed_record(fakes: &Fakes, record: InviteRecord) {
    fakes
        .invite_store
        .records
        .lock()
        .await
        .insert(record.username.clone(), record);
}

#[tokio::test]
async fn onboard_invites_records_and_reconciles() {
    let fakes = Fakes::new();
    fakes.team_directory.add_user("user.one", &["Team A"]).await;

    let result = service(&fakes)
        .onboard("user.one", "user.one@example.com", date(3, 1))
        .await;
    assert!(result.is_ok());
    let member_id = result.unwrap_or_else(|_| unreachable!());

    let stored = fakes.vault_directory.get_member_for_test(&member_id).await;
    assert_eq!(stored.external_id.as_deref(), Some("user.one"));
    assert!(stored.reset_password_enrolled);

    assert_eq!(
        fakes.invite_store.records.lock().await.get("user.one"),
        Some(&InviteRecord::first("user.one", date(3, 1)))
    );
    assert_eq!(fakes.vault_directory.groups_of(&member_id).await.len(), 1);
}

#[tokio::test]
async fn onboarding_an_already_invited_user_reuses_the_member() {
    let fakes = Fakes::new();
    fakes.team_directory.add_user("user.one", &[]).await;
    seed_invited(&fakes, "mem-1", "user.one").await;

    let result = service(&fakes)
        .onboard("user.one", "user.one@example.com", date(3, 1))
        .await;

    assert!(matches!(result.as_deref(), Ok("mem-1")));
    assert_eq!(fakes.vault_directory.members.lock().await.len(), 1);
}

#[tokio::test]
async fn offboard_removes_member_and_invite_record() {
    let fakes = Fakes::new();
    fakes
        .vault_directory
        .members
        .lock()
        .await
        .push(member("mem-1", "user.one"));
    seed_record(&fakes, InviteRecord::first("user.one", date(3, 1))).await;

    let result = service(&fakes).offboard("user.one").await;

    assert!(matches!(result, Ok(true)));
    assert_eq!(fakes.vault_directory.writes().await, names(&["remove:mem-1"]));
    assert!(fakes.invite_store.records.lock().await.is_empty());
}

#[tokio::test]
async fn offboarding_an_absent_member_still_clears_the_record() {
    let fakes = Fakes::new();
    seed_record(&fakes, InviteRecord::first("user.one", date(3, 1))).await;

    let result = service(&fakes).offboard("user.one").await;

    assert!(matches!(result, Ok(false)));
    assert!(fakes.vault_directory.writes().await.is_empty());
    assert!(fakes.invite_store.records.lock().await.is_empty());
}

#[tokio::test]
async fn reinvite_handles_each_pending_invitation() {
    let fakes = Fakes::new();
    seed_invited(&fakes, "mem-fresh", "fresh").await;
    seed_invited(&fakes, "mem-expired", "expired").await;
    seed_invited(&fakes, "mem-spent", "spent").await;
    seed_invited(&fakes, "mem-unknown", "unknown").await;
    fakes
        .vault_directory
        .members
        .lock()
        .await
        .push(member("mem-confirmed", "confirmed"));

    seed_record(&fakes, InviteRecord::first("fresh", date(3, 8))).await;
    seed_record(&fakes, InviteRecord::first("expired", date(3, 1))).await;
    seed_record(
        &fakes,
        InviteRecord::first("spent", date(3, 1)).reinvited(date(3, 2)),
    )
    .await;

    let result = service(&fakes).reinvite_pending_members(date(3, 10)).await;
    assert!(result.is_ok());

    assert_eq!(
        fakes.vault_directory.writes().await,
        names(&["reinvite:mem-expired", "remove:mem-spent", "remove:mem-unknown"])
    );

    let records = fakes.invite_store.records.lock().await;
    assert_eq!(
        records.get("expired"),
        Some(&InviteRecord {
            username: "expired".to_owned(),
            invite_date: date(3, 10),
            reinvites: 1,
            total_invites: 2,
        })
    );
    assert_eq!(records.get("fresh"), Some(&InviteRecord::first("fresh", date(3, 8))));
    assert!(records.get("spent").is_none());
}

#[tokio::test]
async fn reinvite_reports_every_failed_member() {
    let fakes = Fakes::new();
    seed_invited(&fakes, "mem-1", "user.one").await;
    seed_invited(&fakes, "mem-2", "user.two").await;
    {
        let mut failing = fakes.vault_directory.failing_removals.lock().await;
        failing.insert("mem-1".to_owned());
        failing.insert("mem-2".to_owned());
    }

    let result = service(&fakes).reinvite_pending_members(date(3, 10)).await;

    assert!(matches!(
        result,
        Err(AppError::Batch { ref failures, .. }) if failures.len() == 2
    ));
}

#[tokio::test]
async fn confirm_accepts_allowed_domains_and_reports_the_rest() {
    let fakes = Fakes::new();
    fakes.vault_session.pending_members.lock().await.extend([
        PendingMember {
            id: "mem-1".to_owned(),
            email: "one@example.com".to_owned(),
        },
        PendingMember {
            id: "mem-2".to_owned(),
            email: "two@evil.example".to_owned(),
        },
        PendingMember {
            id: "mem-3".to_owned(),
            email: "three@example.com".to_owned(),
        },
    ]);
    fakes
        .vault_session
        .failing_confirmations
        .lock()
        .await
        .insert("mem-3".to_owned());

    let result = service(&fakes)
        .confirm_members(&names(&["example.com"]))
        .await;

    assert!(matches!(
        result,
        Err(AppError::Batch { ref failures, .. })
            if failures.len() == 2 && failures[0].contains("evil.example")
    ));
    assert_eq!(*fakes.vault_session.confirmed.lock().await, names(&["mem-1"]));
}

#[tokio::test]
async fn confirm_uses_text_after_last_at_sign() {
    let fakes = Fakes::new();
    fakes.vault_session.pending_members.lock().await.push(PendingMember {
        id: "mem-1".to_owned(),
        email: "odd@name@example.com".to_owned(),
    });

    let result = service(&fakes)
        .confirm_members(&names(&["example.com"]))
        .await;

    assert!(result.is_ok());
    assert_eq!(result.unwrap_or_else(|_| unreachable!()), names(&["mem-1"]));
}

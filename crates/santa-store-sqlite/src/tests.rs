//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, TimeZone, Utc};
use santa_core::{
  group::{Assignment, ExclusionSet, Group, GroupId, GroupStatus},
  participant::{Participant, ParticipantId, Profile, RecoveryCode},
  store::GroupStore,
  tenant::TenantId,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn tenant() -> TenantId { TenantId::from_credential("password") }

fn other_tenant() -> TenantId { TenantId::from_credential("password2") }

fn pid(s: &str) -> ParticipantId { ParticipantId::from(s) }

fn group(id: &str, offset_secs: i64) -> Group {
  Group {
    group_id:     GroupId::new(id),
    name:         format!("Group {id}"),
    budget:       Some("20".into()),
    admin_id:     Some(pid("alice")),
    status:       GroupStatus::Setup,
    participants: vec![
      Participant {
        participant_id: pid("alice"),
        name:           "Alice".into(),
      },
      Participant {
        participant_id: pid("bob"),
        name:           "Bob".into(),
      },
    ],
    exclusions:   [(pid("alice"), pid("bob"))].into_iter().collect::<ExclusionSet>(),
    assignment:   Assignment::new(),
    created_at:   Utc.timestamp_opt(1_700_000_000, 0).unwrap()
      + Duration::seconds(offset_secs),
    drawn_at:     None,
  }
}

fn profile(id: &str, code: &str) -> Profile {
  Profile::new(
    pid(id),
    id.to_uppercase(),
    RecoveryCode::parse(code),
    Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
  )
}

// ─── Groups ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_and_get_group() {
  let s = store().await;
  let g = group("123456", 0);

  s.save_group(&tenant(), &g).await.unwrap();

  let fetched = s.get_group(&tenant(), &g.group_id).await.unwrap();
  assert_eq!(fetched, Some(g));
}

#[tokio::test]
async fn get_group_missing_returns_none() {
  let s = store().await;
  let result = s.get_group(&tenant(), &GroupId::new("999999")).await.unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn save_group_replaces_whole_record() {
  let s = store().await;
  let mut g = group("123456", 0);
  s.save_group(&tenant(), &g).await.unwrap();

  g.status = GroupStatus::Drawn;
  g.exclusions = ExclusionSet::new();
  g.assignment = [(pid("alice"), pid("bob")), (pid("bob"), pid("alice"))]
    .into_iter()
    .collect();
  g.drawn_at = Some(Utc::now());
  s.save_group(&tenant(), &g).await.unwrap();

  let fetched = s.get_group(&tenant(), &g.group_id).await.unwrap().unwrap();
  assert_eq!(fetched, g);
  assert_eq!(s.list_groups(&tenant()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn list_groups_oldest_first() {
  let s = store().await;
  s.save_group(&tenant(), &group("300000", 30)).await.unwrap();
  s.save_group(&tenant(), &group("100000", 10)).await.unwrap();
  s.save_group(&tenant(), &group("200000", 20)).await.unwrap();

  let ids: Vec<String> = s
    .list_groups(&tenant())
    .await
    .unwrap()
    .into_iter()
    .map(|g| g.group_id.to_string())
    .collect();
  assert_eq!(ids, ["100000", "200000", "300000"]);
}

#[tokio::test]
async fn groups_are_isolated_per_tenant() {
  let s = store().await;
  let g = group("123456", 0);
  s.save_group(&tenant(), &g).await.unwrap();

  assert!(s.get_group(&other_tenant(), &g.group_id).await.unwrap().is_none());
  assert!(s.list_groups(&other_tenant()).await.unwrap().is_empty());
}

#[tokio::test]
async fn same_group_id_in_two_tenants() {
  let s = store().await;
  let mut a = group("123456", 0);
  let mut b = group("123456", 0);
  a.name = "Tenant A".into();
  b.name = "Tenant B".into();
  s.save_group(&tenant(), &a).await.unwrap();
  s.save_group(&other_tenant(), &b).await.unwrap();

  let fetched_a = s.get_group(&tenant(), &a.group_id).await.unwrap().unwrap();
  let fetched_b = s.get_group(&other_tenant(), &b.group_id).await.unwrap().unwrap();
  assert_eq!(fetched_a.name, "Tenant A");
  assert_eq!(fetched_b.name, "Tenant B");
}

#[tokio::test]
async fn delete_group() {
  let s = store().await;
  let g = group("123456", 0);
  s.save_group(&tenant(), &g).await.unwrap();

  assert!(s.delete_group(&tenant(), &g.group_id).await.unwrap());
  assert!(s.get_group(&tenant(), &g.group_id).await.unwrap().is_none());
  assert!(!s.delete_group(&tenant(), &g.group_id).await.unwrap());
}

// ─── Profiles ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_and_get_profile() {
  let s = store().await;
  let p = profile("alice", "ABC234");
  s.save_profile(&tenant(), &p).await.unwrap();

  let fetched = s.get_profile(&tenant(), &p.participant_id).await.unwrap();
  assert_eq!(fetched, Some(p));
}

#[tokio::test]
async fn save_profile_updates_existing() {
  let s = store().await;
  let mut p = profile("alice", "ABC234");
  s.save_profile(&tenant(), &p).await.unwrap();

  p.wishlist = "books".into();
  p.dislikes = "candles".into();
  s.save_profile(&tenant(), &p).await.unwrap();

  let fetched = s.get_profile(&tenant(), &p.participant_id).await.unwrap().unwrap();
  assert_eq!(fetched.wishlist, "books");
  assert_eq!(fetched.dislikes, "candles");
  assert_eq!(s.list_profiles(&tenant()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn list_profiles_is_tenant_scoped() {
  let s = store().await;
  s.save_profile(&tenant(), &profile("alice", "AAAAAA")).await.unwrap();
  s.save_profile(&tenant(), &profile("bob", "BBBBBB")).await.unwrap();
  s.save_profile(&other_tenant(), &profile("carol", "CCCCCC")).await.unwrap();

  assert_eq!(s.list_profiles(&tenant()).await.unwrap().len(), 2);
  assert_eq!(s.list_profiles(&other_tenant()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn recovery_code_lookup_spans_tenants() {
  let s = store().await;
  s.save_profile(&tenant(), &profile("alice", "AAAAAA")).await.unwrap();
  s.save_profile(&other_tenant(), &profile("carol", "CCCCCC")).await.unwrap();

  let (found_tenant, found) = s
    .find_by_recovery_code(&RecoveryCode::parse("cccccc"))
    .await
    .unwrap()
    .expect("profile for code");
  assert_eq!(found_tenant, other_tenant());
  assert_eq!(found.participant_id, pid("carol"));

  let missing = s
    .find_by_recovery_code(&RecoveryCode::parse("ZZZZZZ"))
    .await
    .unwrap();
  assert!(missing.is_none());
}

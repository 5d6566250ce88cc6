//! Runs against a live PostgreSQL: `DATABASE_URL=... cargo test -p nexus-database -- --ignored`

use std::sync::Arc;

use nexus_common::ModuleClient;
use nexus_database::{init_schema, PgStore, PostgresClient};
use nexus_runtime::{
    CreateCategory, CreateProject, CreateReply, CreateReport, CreateThread, ExperienceAwarder,
    FavoriteToggler, NexusError, NexusStore, RatingAggregator, ReportStatus, ReviewReport, Target,
    TargetType, UserRole, OWNER_ROLE,
};

async fn store() -> Arc<PgStore> {
    dotenv::dotenv().ok();
    let client = PostgresClient::setup_connection().await.unwrap();
    let store = PgStore::from_client(&client);
    init_schema(store.pool(), false, true).await.unwrap();
    Arc::new(store)
}

fn unique(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{prefix}_{nanos}")
}

#[tokio::test]
#[ignore]
async fn usernames_conflict_ignoring_case() {
    let store = store().await;
    let name = unique("Raven");
    store.create_user(&name, "x", UserRole::User).await.unwrap();
    let err = store.create_user(&name.to_lowercase(), "x", UserRole::User).await.unwrap_err();
    assert!(matches!(err, NexusError::Conflict(_)));
    assert!(store.find_user_by_username(&name.to_uppercase()).await.unwrap().is_some());
}

#[tokio::test]
#[ignore]
async fn ratings_and_favorites_round_trip() {
    let store = store().await;
    let alice = store.create_user(&unique("alice"), "x", UserRole::User).await.unwrap();
    let bob = store.create_user(&unique("bob"), "x", UserRole::User).await.unwrap();
    let target = Target::new(TargetType::Project, alice.id * 1000);

    let ratings = RatingAggregator::new(store.clone());
    ratings.rate(target, alice.id, 5).await.unwrap();
    ratings.rate(target, bob.id, 2).await.unwrap();
    ratings.rate(target, bob.id, 4).await.unwrap();
    let summary = ratings.average(target).await.unwrap();
    assert_eq!(summary.count, 2);
    assert!((summary.average - 4.5).abs() < f64::EPSILON);

    let favorites = FavoriteToggler::new(store.clone());
    favorites.add(target, alice.id).await.unwrap();
    favorites.add(target, alice.id).await.unwrap();
    assert_eq!(favorites.list_for_user(alice.id).await.unwrap().len(), 1);
    assert_eq!(favorites.remove(target, alice.id).await.unwrap().len(), 1);
    assert!(favorites.remove(target, alice.id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore]
async fn experience_levels_persist() {
    let store = store().await;
    let user = store.create_user(&unique("grinder"), "x", UserRole::User).await.unwrap();
    let awarded = ExperienceAwarder::new(store.clone()).award(user.id, 450).await.unwrap();
    assert_eq!((awarded.experience, awarded.level), (450, 3));
    let reloaded = store.get_user(user.id).await.unwrap().unwrap();
    assert_eq!(reloaded.level, 3);
}

#[tokio::test]
#[ignore]
async fn reply_bumps_thread_and_missing_thread_is_not_found() {
    let store = store().await;
    let user = store.create_user(&unique("poster"), "x", UserRole::User).await.unwrap();
    let category = store
        .create_category(&CreateCategory {
            name: "General".into(),
            description: "Anything".into(),
            slug: unique("general"),
            icon: None,
            order: 1,
        })
        .await
        .unwrap();
    let thread = store
        .create_thread(user.id, &CreateThread { category_id: category.id, title: "Hi".into(), content: "First".into() })
        .await
        .unwrap();

    store.create_reply(thread.id, user.id, &CreateReply { content: "Second".into() }).await.unwrap();
    let bumped = store.get_thread(thread.id).await.unwrap().unwrap();
    assert!(bumped.updated_at >= thread.updated_at);
    assert_eq!(store.list_replies(thread.id).await.unwrap().len(), 1);

    let err = store.create_reply(-1, user.id, &CreateReply { content: "x".into() }).await.unwrap_err();
    assert!(matches!(err, NexusError::NotFound(_)));
}

#[tokio::test]
#[ignore]
async fn concurrent_reviews_apply_once() {
    let store = store().await;
    let reporter = store.create_user(&unique("reporter"), "x", UserRole::User).await.unwrap();
    let first = store.create_user(&unique("mod_a"), "x", UserRole::Moderator).await.unwrap();
    let second = store.create_user(&unique("mod_b"), "x", UserRole::Moderator).await.unwrap();
    let report = store
        .create_report(
            reporter.id,
            &CreateReport { target: Target::new(TargetType::Post, 1), reason: "spam".into() },
        )
        .await
        .unwrap();

    let accept = ReviewReport { status: ReportStatus::Accepted, resolution: Some("removed".into()) };
    let reject = ReviewReport { status: ReportStatus::Rejected, resolution: None };
    let (a, b) = tokio::join!(
        store.review_report(report.id, first.id, &accept),
        store.review_report(report.id, second.id, &reject),
    );
    let winner = match (a, b) {
        (Ok(report), Err(NexusError::Conflict(_))) | (Err(NexusError::Conflict(_)), Ok(report)) => report,
        other => panic!("expected exactly one review to apply, got {other:?}"),
    };

    let stored = store.get_report(report.id).await.unwrap().unwrap();
    assert_eq!(stored.status, winner.status);
    assert_eq!(stored.moderator_id, winner.moderator_id);
    assert!(matches!(store.review_report(-1, first.id, &accept).await, Err(NexusError::NotFound(_))));
}

#[tokio::test]
#[ignore]
async fn project_is_created_with_its_owner() {
    let store = store().await;
    let owner = store.create_user(&unique("founder"), "x", UserRole::User).await.unwrap();
    let project = store
        .create_project(
            owner.id,
            &CreateProject {
                name: unique("Nexus Map"),
                description: "A shared atlas".into(),
                repository: None,
                website_url: None,
            },
        )
        .await
        .unwrap();
    let members = store.list_project_members(project.id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!((members[0].user_id, members[0].role.as_str()), (owner.id, OWNER_ROLE));
}

use std::sync::Arc;

use nexus_runtime::{
    next_level_experience, AccountSettings, CreatePost, Credentials, MemoryStore, Nexus,
    NexusError, SearchKind, SearchResults, Target, TargetType,
};

fn nexus() -> Nexus {
    Nexus::new(
        Arc::new(MemoryStore::new()),
        AccountSettings {
            secret: "flow-secret".into(),
            session_ttl_secs: 600,
            admin_usernames: vec![],
        },
    )
}

#[tokio::test]
async fn a_new_member_posts_and_levels_up() {
    let nexus = nexus();
    let session = nexus
        .accounts
        .register(&Credentials { username: "kage".into(), password: "umbra-umbra".into() })
        .await
        .unwrap();
    let caller = nexus.accounts.authenticate(&session.token).await.unwrap();

    for i in 0..40 {
        let post = CreatePost { content: format!("shadow log #{i}"), image: None, tags: vec![] };
        nexus.feed.create(caller.id, &post).await.unwrap();
    }

    let info = nexus.accounts.level_info(caller.id).await.unwrap();
    assert_eq!(info.experience, 400);
    assert_eq!(info.level, 3);
    assert_eq!(info.next_level_experience, next_level_experience(3));

    match nexus.search.run(SearchKind::Posts, "LOG #3").await.unwrap() {
        SearchResults::Posts(posts) => assert!(posts.iter().all(|p| p.content.contains("#3"))),
        other => panic!("unexpected results: {other:?}"),
    }
}

#[tokio::test]
async fn ratings_are_one_per_user_and_target() {
    let nexus = nexus();
    let target = Target::new(TargetType::Template, 3);

    nexus.ratings.rate(target, 1, 3).await.unwrap();
    nexus.ratings.rate(target, 1, 5).await.unwrap();
    nexus.ratings.rate(target, 2, 1).await.unwrap();

    let summary = nexus.ratings.average(target).await.unwrap();
    assert_eq!(summary.count, 2);
    assert!((summary.average - 3.0).abs() < f64::EPSILON);

    assert!(matches!(nexus.ratings.rate(target, 1, 0).await, Err(NexusError::InvalidArgument(_))));
}

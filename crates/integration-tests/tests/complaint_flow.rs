use std::sync::Arc;

use chrono::Utc;
use domains::{Caller, Category, ComplaintDraft, ComplaintOrder, DomainError, User};
use integration_tests::Harness;
use services::{seed, ComplaintEvent};
use tokio::task::JoinSet;

fn draft() -> ComplaintDraft {
    ComplaintDraft::new(
        "Árbol caído en la vía",
        "Un árbol bloquea la calle desde la tormenta de anoche",
        Category::Environment,
    )
}

#[tokio::test]
async fn demo_data_sorts_and_filters() {
    let h = Harness::demo().with_demo_data().await;

    let by_likes = h.complaints.list(ComplaintOrder::Likes).await.unwrap();
    let likes: Vec<u32> = by_likes.iter().map(|c| c.likes).collect();
    assert_eq!(likes, vec![47, 32, 28, 19, 15, 12, 8, 6]);

    let by_date = h.complaints.list(ComplaintOrder::Date).await.unwrap();
    assert!(by_date
        .windows(2)
        .all(|pair| pair[0].created_at >= pair[1].created_at));

    let by_comments = h.complaints.list(ComplaintOrder::Comments).await.unwrap();
    assert_eq!(by_comments[0].comment_ids.len(), 3);

    let popular = h.complaints.popular(3).await.unwrap();
    assert_eq!(popular.len(), 3);
    assert_eq!(popular[0].likes, 47);

    let hits = h.complaints.search("SEMÁFORO").await.unwrap();
    assert_eq!(hits.len(), 1);

    let stats = h.complaints.stats().await.unwrap();
    assert_eq!(stats.total_complaints, 8);
    assert_eq!(stats.total_comments, 11);
    assert_eq!(stats.total_likes, 47 + 32 + 28 + 19 + 15 + 12 + 8 + 6);
    assert_eq!(stats.by_category.len(), 8);
}

#[tokio::test]
async fn seeding_twice_changes_nothing() {
    let h = Harness::demo().with_demo_data().await;
    let again = seed::load(
        seed::demo_dataset(Utc::now()),
        h.stores.complaints.as_ref(),
        h.stores.users.as_ref(),
    )
    .await
    .unwrap();
    assert_eq!(again, seed::SeedReport::default());
    assert_eq!(h.complaints.list_all().await.unwrap().len(), 8);
    assert_eq!(h.complaints.stats().await.unwrap().total_comments, 11);
}

#[tokio::test]
async fn seeded_likes_can_be_withdrawn() {
    let h = Harness::demo().with_demo_data().await;
    let admin = h.demo_admin();

    let liked = h.complaints.liked_by(Some(&admin)).await.unwrap();
    assert_eq!(liked.len(), 2);
    let target = liked.iter().find(|c| c.likes == 28).unwrap().id;

    let outcome = h.complaints.toggle_like(Some(&admin), target).await.unwrap();
    assert!(!outcome.liked);
    assert_eq!(outcome.likes, 27);
    assert!(!h.complaints.has_liked(Some(&admin), target).await.unwrap());

    let profile = h.stores.users.get_user(admin.user_id).await.unwrap().unwrap();
    assert!(!profile.has_liked(target));
}

#[tokio::test]
async fn mutations_update_the_author_profile() {
    let h = Harness::demo();
    let user = User::new("ciudadano", "ciudadano@email.com", Utc::now());
    h.stores.users.insert_user(user.clone()).await.unwrap();
    let caller = user.caller();

    let complaint = h.complaints.create(Some(&caller), draft()).await.unwrap();
    h.complaints.toggle_like(Some(&caller), complaint.id).await.unwrap();
    let comment = h
        .complaints
        .add_comment(Some(&caller), complaint.id, "Sigue ahí esta mañana")
        .await
        .unwrap();

    let profile = h.stores.users.get_user(user.id).await.unwrap().unwrap();
    let stats = profile.stats();
    assert_eq!(stats.created_complaints, 1);
    assert_eq!(stats.liked_complaints, 1);
    assert_eq!(stats.comments, 1);
    assert_eq!(profile.comments, vec![comment.id]);

    let mine = h.complaints.mine(Some(&caller)).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert!(h.complaints.mine(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_profile_does_not_block_creation() {
    let h = Harness::demo();
    let ghost = Caller {
        user_id: uuid::Uuid::new_v4(),
        username: "fantasma".into(),
    };
    let complaint = h.complaints.create(Some(&ghost), draft()).await.unwrap();
    assert_eq!(complaint.author_id, ghost.user_id);
}

#[tokio::test]
async fn anonymous_callers_cannot_mutate() {
    let h = Harness::demo().with_demo_data().await;
    let any = h.complaints.list_all().await.unwrap()[0].id;

    assert!(matches!(
        h.complaints.create(None, draft()).await,
        Err(DomainError::Unauthorized(_))
    ));
    assert!(matches!(
        h.complaints.toggle_like(None, any).await,
        Err(DomainError::Unauthorized(_))
    ));
    assert!(matches!(
        h.complaints.add_comment(None, any, "hola").await,
        Err(DomainError::Unauthorized(_))
    ));
    assert!(!h.complaints.has_liked(None, any).await.unwrap());
}

#[tokio::test]
async fn subscribers_see_every_mutation() {
    let h = Harness::demo();
    let caller = h.demo_admin();
    let mut events = h.complaints.events().subscribe();

    let complaint = h.complaints.create(Some(&caller), draft()).await.unwrap();
    h.complaints.toggle_like(Some(&caller), complaint.id).await.unwrap();
    h.complaints
        .add_comment(Some(&caller), complaint.id, "Confirmo")
        .await
        .unwrap();

    assert!(matches!(events.recv().await.unwrap(), ComplaintEvent::Created(c) if c.id == complaint.id));
    assert!(matches!(
        events.recv().await.unwrap(),
        ComplaintEvent::LikeToggled { outcome, .. } if outcome.liked && outcome.likes == 1
    ));
    assert!(matches!(
        events.recv().await.unwrap(),
        ComplaintEvent::CommentAdded { complaint_id, .. } if complaint_id == complaint.id
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_likes_from_distinct_users_all_count() {
    let h = Harness::demo();
    let author = h.demo_admin();
    let complaint = h.complaints.create(Some(&author), draft()).await.unwrap();

    let service = Arc::clone(&h.complaints);
    let mut tasks = JoinSet::new();
    for i in 0..50 {
        let service = Arc::clone(&service);
        tasks.spawn(async move {
            let caller = Caller {
                user_id: uuid::Uuid::new_v4(),
                username: format!("vecino{i}"),
            };
            service.toggle_like(Some(&caller), complaint.id).await
        });
    }
    while let Some(result) = tasks.join_next().await {
        assert!(result.unwrap().unwrap().liked);
    }

    let stored = h.complaints.get(complaint.id).await.unwrap().unwrap();
    assert_eq!(stored.likes, 50);
    assert_eq!(stored.liked_by.len(), 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_comments_are_all_attached() {
    let h = Harness::demo();
    let author = h.demo_admin();
    let complaint = h.complaints.create(Some(&author), draft()).await.unwrap();

    let mut tasks = JoinSet::new();
    for i in 0..20 {
        let service = Arc::clone(&h.complaints);
        let caller = author.clone();
        tasks.spawn(async move {
            service
                .add_comment(Some(&caller), complaint.id, &format!("comentario {i}"))
                .await
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap().unwrap();
    }

    let stored = h.complaints.get(complaint.id).await.unwrap().unwrap();
    assert_eq!(stored.comment_ids.len(), 20);
    assert_eq!(h.complaints.comments_for(complaint.id).await.unwrap().len(), 20);
}

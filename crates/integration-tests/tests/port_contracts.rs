//! Behaviour every adapter behind the ports must share, checked against the
//! in-memory stores, plus service reactions to failing ports via mocks.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    Caller, Category, Comment, ComplaintDraft, ComplaintRepo, DomainError, MockComplaintRepo,
    MockUserRepo, User, UserActivity, UserRepo,
};
use services::ComplaintService;
use storage_adapters::Stores;
use uuid::Uuid;

fn complaint(author: Uuid) -> domains::Complaint {
    ComplaintDraft::new(
        "Fuga de agua en la esquina",
        "El agua corre por la calle desde hace dos días",
        Category::PublicServices,
    )
    .into_complaint(author, Utc::now())
    .unwrap()
}

async fn complaint_repo_contract(repo: Arc<dyn ComplaintRepo>) {
    let author = Uuid::new_v4();
    let stored = complaint(author);
    repo.insert_complaint(stored.clone()).await.unwrap();

    assert!(matches!(
        repo.insert_complaint(stored.clone()).await,
        Err(DomainError::Conflict(_))
    ));
    assert_eq!(repo.get_complaint(stored.id).await.unwrap(), Some(stored.clone()));
    assert!(repo.get_complaint(Uuid::new_v4()).await.unwrap().is_none());

    let liker = Uuid::new_v4();
    assert!(repo.toggle_like(stored.id, liker).await.unwrap().liked);
    let outcome = repo.toggle_like(stored.id, liker).await.unwrap();
    assert!(!outcome.liked);
    assert_eq!(outcome.likes, 0);
    assert!(matches!(
        repo.toggle_like(Uuid::new_v4(), liker).await,
        Err(DomainError::NotFound { .. })
    ));

    let comment = Comment::new(stored.id, author, "Ya avisé a la empresa", Utc::now()).unwrap();
    repo.attach_comment(comment.clone()).await.unwrap();
    let orphan = Comment::new(Uuid::new_v4(), author, "Sin denuncia", Utc::now()).unwrap();
    assert!(matches!(
        repo.attach_comment(orphan).await,
        Err(DomainError::NotFound { .. })
    ));

    assert_eq!(repo.list_comments(stored.id).await.unwrap(), vec![comment.clone()]);
    assert_eq!(repo.count_comments().await.unwrap(), 1);
    let parent = repo.get_complaint(stored.id).await.unwrap().unwrap();
    assert_eq!(parent.comment_ids, vec![comment.id]);
}

async fn user_repo_contract(repo: Arc<dyn UserRepo>) {
    let user = User::new("vecina", "Vecina@Email.com", Utc::now());
    repo.insert_user(user.clone()).await.unwrap();

    let twin = User::new("otra", "vecina@email.com", Utc::now());
    assert!(matches!(
        repo.insert_user(twin).await,
        Err(DomainError::Conflict(_))
    ));
    let namesake = User::new("vecina", "otra@email.com", Utc::now());
    assert!(matches!(
        repo.insert_user(namesake).await,
        Err(DomainError::Conflict(_))
    ));

    assert_eq!(
        repo.find_by_login("VECINA@EMAIL.COM").await.unwrap().map(|u| u.id),
        Some(user.id)
    );
    assert_eq!(
        repo.find_by_login("vecina").await.unwrap().map(|u| u.id),
        Some(user.id)
    );
    assert!(repo.find_by_login("nadie").await.unwrap().is_none());

    let target = Uuid::new_v4();
    assert!(repo
        .apply_activity(user.id, UserActivity::Created(target))
        .await
        .unwrap());
    assert!(!repo
        .apply_activity(Uuid::new_v4(), UserActivity::Created(target))
        .await
        .unwrap());
    assert!(repo
        .update_settings(Uuid::new_v4(), Default::default())
        .await
        .unwrap()
        .is_none());

    let stored = repo.get_user(user.id).await.unwrap().unwrap();
    assert_eq!(stored.stats().created_complaints, 1);
}

#[tokio::test]
async fn memory_complaint_repo_honours_the_contract() {
    complaint_repo_contract(Stores::memory().complaints).await;
}

#[tokio::test]
async fn memory_user_repo_honours_the_contract() {
    user_repo_contract(Stores::memory().users).await;
}

#[tokio::test]
async fn memory_credentials_overwrite_the_previous_hash() {
    let credentials = Stores::memory().credentials;
    let id = Uuid::new_v4();
    assert!(credentials.password_hash(id).await.unwrap().is_none());

    credentials.set_password_hash(id, "uno".into()).await.unwrap();
    credentials.set_password_hash(id, "dos".into()).await.unwrap();
    assert_eq!(credentials.password_hash(id).await.unwrap().as_deref(), Some("dos"));
}

fn caller() -> Caller {
    Caller {
        user_id: Uuid::new_v4(),
        username: "vecino".into(),
    }
}

#[tokio::test]
async fn store_failures_surface_from_the_service() {
    let mut repo = MockComplaintRepo::new();
    repo.expect_list_complaints()
        .returning(|| Err(DomainError::internal("connection reset")));
    let service = ComplaintService::new(Arc::new(repo), Arc::new(MockUserRepo::new()));

    assert!(matches!(service.search("agua").await, Err(DomainError::Internal(_))));
    assert!(matches!(service.popular(3).await, Err(DomainError::Internal(_))));
}

#[tokio::test]
async fn profile_failures_do_not_undo_a_created_complaint() {
    let mut repo = MockComplaintRepo::new();
    repo.expect_insert_complaint().times(1).returning(|_| Ok(()));
    let mut users = MockUserRepo::new();
    users
        .expect_apply_activity()
        .times(1)
        .returning(|_, _| Err(DomainError::internal("profile store down")));
    let service = ComplaintService::new(Arc::new(repo), Arc::new(users));

    let draft = ComplaintDraft::new(
        "Contenedor desbordado",
        "La basura se acumula frente al colegio",
        Category::Environment,
    );
    let created = service.create(Some(&caller()), draft).await.unwrap();
    assert_eq!(created.likes, 0);
}

#[tokio::test]
async fn invalid_drafts_never_reach_the_store() {
    let mut repo = MockComplaintRepo::new();
    repo.expect_insert_complaint().never();
    let service = ComplaintService::new(Arc::new(repo), Arc::new(MockUserRepo::new()));

    let draft = ComplaintDraft::new("Poco", "Muy corta", Category::Other);
    let err = service.create(Some(&caller()), draft).await.unwrap_err();
    assert_eq!(err.errores().len(), 2);
}

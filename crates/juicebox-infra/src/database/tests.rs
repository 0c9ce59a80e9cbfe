use juicebox_core::domain::{NewPost, NewUser, Post, PostChanges, User, UserChanges};
use juicebox_core::error::RepoError;
use juicebox_core::ports::{PostRepository, TagRepository, UserRepository};
use sea_orm::{
    ConnectionTrait, Database, DatabaseBackend, DbConn, EntityTrait, MockDatabase, Schema,
};

use crate::database::entity::{post, post_tag, tag, user};
use crate::database::postgres_repo::{
    PostgresPostRepository, PostgresTagRepository, PostgresUserRepository, RepositoryOptions,
};
use crate::database::{ReadStrategy, post_reader, post_tag_linker, tag_registry};

async fn setup() -> DbConn {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    db.execute(backend.build(&schema.create_table_from_entity(user::Entity)))
        .await
        .unwrap();
    db.execute(backend.build(&schema.create_table_from_entity(post::Entity)))
        .await
        .unwrap();
    db.execute(backend.build(&schema.create_table_from_entity(tag::Entity)))
        .await
        .unwrap();
    db.execute(backend.build(&schema.create_table_from_entity(post_tag::Entity)))
        .await
        .unwrap();

    db
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn albert() -> NewUser {
    NewUser {
        username: "albert".to_string(),
        password: "bertie99".to_string(),
        name: "Al Bert".to_string(),
        location: "Sidney, Australia".to_string(),
    }
}

fn sandra() -> NewUser {
    NewUser {
        username: "sandra".to_string(),
        password: "2sandy4me".to_string(),
        name: "Just Sandra".to_string(),
        location: "Ain't tellin'".to_string(),
    }
}

async fn create_user(db: &DbConn, new_user: NewUser) -> User {
    PostgresUserRepository::new(db.clone())
        .create(new_user)
        .await
        .unwrap()
        .unwrap()
}

async fn first_post(db: &DbConn, author: &User) -> Post {
    PostgresPostRepository::new(db.clone())
        .create(
            NewPost::new(
                author.id,
                "First Post",
                "This is my first post. I hope I love writing blogs as much as I love writing them.",
            )
            .with_tags(["#happy", "#youcandoanything"]),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_register_empty_touches_no_storage() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let tags = tag_registry::register(&db, &[]).await.unwrap();

    assert!(tags.is_empty());
    assert!(db.into_transaction_log().is_empty());
}

#[tokio::test]
async fn test_get_missing_post_is_none() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    assert!(repo.get_by_id(42).await.unwrap().is_none());
}

#[tokio::test]
async fn test_unresolvable_author_is_integrity_fault() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post::Model {
            id: 1,
            author_id: 99,
            title: "Orphan".to_owned(),
            content: "Content".to_owned(),
            active: true,
        }]])
        .append_query_results([Vec::<tag::Model>::new()])
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();

    let err = post_reader::get_by_id(&db, 1).await.unwrap_err();

    assert!(matches!(err, RepoError::Integrity(_)));
}

#[tokio::test]
async fn test_register_is_idempotent() {
    let db = setup().await;
    let list = names(&["#happy", "#worst-day-ever", "#youcandoanything"]);

    let mut first = tag_registry::register(&db, &list).await.unwrap();
    let mut second = tag_registry::register(&db, &list).await.unwrap();
    first.sort();
    second.sort();

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_register_collapses_duplicate_names() {
    let db = setup().await;

    let tags = tag_registry::register(&db, &names(&["#happy", "#happy"]))
        .await
        .unwrap();

    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].name, "#happy");
    assert_eq!(tag_registry::list_all(&db).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_register_unions_existing_and_new_tags() {
    let db = setup().await;
    let existing = tag_registry::register(&db, &names(&["#happy"])).await.unwrap();

    let tags = tag_registry::register(&db, &names(&["#happy", "#canmandoeverything"]))
        .await
        .unwrap();

    assert_eq!(tags.len(), 2);
    let happy = tags.iter().find(|t| t.name == "#happy").unwrap();
    assert_eq!(happy.id, existing[0].id);
}

#[tokio::test]
async fn test_link_twice_is_a_no_op() {
    let db = setup().await;
    let author = create_user(&db, albert()).await;
    let post = first_post(&db, &author).await;
    let tags = post.tags.clone();

    post_tag_linker::link(&db, post.id, &tags).await.unwrap();
    post_tag_linker::link(&db, post.id, &tags).await.unwrap();

    let links = post_tag::Entity::find().all(&db).await.unwrap();
    assert_eq!(links.len(), 2);
}

#[tokio::test]
async fn test_created_post_is_fully_assembled() {
    let db = setup().await;
    let author = create_user(&db, albert()).await;
    let created = first_post(&db, &author).await;

    let post = PostgresPostRepository::new(db.clone())
        .get_by_id(created.id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(post, created);
    assert!(post.active);
    assert_eq!(post.author.username, "albert");
    assert_eq!(post.author.location, "Sidney, Australia");
    assert_eq!(post.tag_names(), vec!["#happy", "#youcandoanything"]);
}

#[tokio::test]
async fn test_create_without_tags_creates_no_tags() {
    let db = setup().await;
    let author = create_user(&db, albert()).await;

    let post = PostgresPostRepository::new(db.clone())
        .create(NewPost::new(author.id, "Untagged", "Nothing to see"))
        .await
        .unwrap();

    assert!(post.tags.is_empty());
    assert!(tag_registry::list_all(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_tags_reconciles_exactly() {
    let db = setup().await;
    let author = create_user(&db, albert()).await;
    let post = first_post(&db, &author).await;
    let repo = PostgresPostRepository::new(db.clone());

    let updated = repo
        .update(
            post.id,
            PostChanges {
                tags: Some(names(&["#happy"])),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.tag_names(), vec!["#happy"]);
    assert_eq!(updated.title, "First Post");

    let reread = repo.get_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(reread.tag_names(), vec!["#happy"]);
}

#[tokio::test]
async fn test_reconcile_adds_and_removes() {
    let db = setup().await;
    let author = create_user(&db, albert()).await;
    let post = first_post(&db, &author).await;

    let desired = tag_registry::register(&db, &names(&["#youcandoanything", "#catmandoeverything"]))
        .await
        .unwrap();
    post_tag_linker::reconcile(&db, post.id, &desired).await.unwrap();

    let reread = post_reader::get_by_id(&db, post.id).await.unwrap().unwrap();
    assert_eq!(
        reread.tag_names(),
        vec!["#catmandoeverything", "#youcandoanything"]
    );
}

#[tokio::test]
async fn test_reconcile_to_empty_strips_all_tags() {
    let db = setup().await;
    let author = create_user(&db, albert()).await;
    let post = first_post(&db, &author).await;

    post_tag_linker::reconcile(&db, post.id, &[]).await.unwrap();

    let reread = post_reader::get_by_id(&db, post.id).await.unwrap().unwrap();
    assert!(reread.tags.is_empty());
    // Tags themselves are never deleted.
    assert_eq!(tag_registry::list_all(&db).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_update_with_no_changes_returns_current_post() {
    let db = setup().await;
    let author = create_user(&db, albert()).await;
    let post = first_post(&db, &author).await;
    let repo = PostgresPostRepository::new(db.clone());

    let before = repo.get_by_id(post.id).await.unwrap().unwrap();
    let mut after = repo.update(post.id, PostChanges::default()).await.unwrap();
    let mut expected = before;
    after.tags.sort();
    expected.tags.sort();

    assert_eq!(after, expected);
}

#[tokio::test]
async fn test_update_scalars_leaves_tags_untouched() {
    let db = setup().await;
    let author = create_user(&db, albert()).await;
    let post = first_post(&db, &author).await;

    let updated = PostgresPostRepository::new(db.clone())
        .update(
            post.id,
            PostChanges {
                title: Some("First Post (edited)".to_string()),
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "First Post (edited)");
    assert_eq!(updated.content, post.content);
    assert!(!updated.active);
    assert_eq!(updated.tag_names(), vec!["#happy", "#youcandoanything"]);
}

#[tokio::test]
async fn test_update_missing_post_is_not_found() {
    let db = setup().await;
    let repo = PostgresPostRepository::new(db);

    let retitle = repo
        .update(
            7,
            PostChanges {
                title: Some("Ghost".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    let retag = repo
        .update(
            7,
            PostChanges {
                tags: Some(names(&["#happy"])),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(retitle.is_not_found());
    assert!(retag.is_not_found());
}

#[tokio::test]
async fn test_atomic_create_rolls_back_on_link_failure() {
    let db = setup().await;
    let author = create_user(&db, albert()).await;
    db.execute_unprepared("DROP TABLE post_tags").await.unwrap();

    let result = PostgresPostRepository::new(db.clone())
        .create(NewPost::new(author.id, "Doomed", "Never lands").with_tags(["#happy"]))
        .await;

    assert!(matches!(result, Err(RepoError::Query(_))));
    assert!(post::Entity::find().all(&db).await.unwrap().is_empty());
    assert!(tag::Entity::find().all(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_non_atomic_create_keeps_partial_post() {
    let db = setup().await;
    let author = create_user(&db, albert()).await;
    db.execute_unprepared("DROP TABLE post_tags").await.unwrap();

    let options = RepositoryOptions {
        atomic_mutations: false,
        ..Default::default()
    };
    let result = PostgresPostRepository::with_options(db.clone(), options)
        .create(NewPost::new(author.id, "Doomed", "Half lands").with_tags(["#happy"]))
        .await;

    assert!(result.is_err());
    assert_eq!(post::Entity::find().all(&db).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_listing_strategies_agree() {
    let db = setup().await;
    let albert = create_user(&db, albert()).await;
    let sandra = create_user(&db, sandra()).await;
    let posts = PostgresPostRepository::new(db.clone());
    first_post(&db, &albert).await;
    posts
        .create(
            NewPost::new(sandra.id, "How does this work?", "Seriously, does this even do anything?")
                .with_tags(["#happy", "#worst-day-ever"]),
        )
        .await
        .unwrap();
    posts
        .create(NewPost::new(sandra.id, "Quiet day", "No tags today"))
        .await
        .unwrap();

    let normalize = |mut list: Vec<Post>| {
        for post in &mut list {
            post.tags.sort();
        }
        list.sort_by_key(|p| p.id);
        list
    };

    for strategy in [ReadStrategy::PerPost, ReadStrategy::Batched] {
        let all = normalize(post_reader::list_all(&db, strategy).await.unwrap());
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].tags, vec![]);

        let by_sandra = post_reader::list_by_author(&db, sandra.id, strategy)
            .await
            .unwrap();
        assert_eq!(by_sandra.len(), 2);
        assert!(by_sandra.iter().all(|p| p.author.username == "sandra"));

        let happy = normalize(
            post_reader::list_by_tag_name(&db, "#happy", strategy)
                .await
                .unwrap(),
        );
        assert_eq!(happy.len(), 2);
        assert_eq!(happy[0].tag_names(), vec!["#happy", "#youcandoanything"]);
        assert_eq!(happy[1].tag_names(), vec!["#happy", "#worst-day-ever"]);

        let none = post_reader::list_by_tag_name(&db, "#unused", strategy)
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    let per_post = normalize(post_reader::list_all(&db, ReadStrategy::PerPost).await.unwrap());
    let batched = normalize(post_reader::list_all(&db, ReadStrategy::Batched).await.unwrap());
    assert_eq!(per_post, batched);
}

#[tokio::test]
async fn test_duplicate_username_is_ignored() {
    let db = setup().await;
    let repo = PostgresUserRepository::new(db.clone());
    let original = repo.create(albert()).await.unwrap().unwrap();

    let again = repo
        .create(NewUser {
            name: "Impostor".to_string(),
            ..albert()
        })
        .await
        .unwrap();

    assert!(again.is_none());
    let stored = repo.get_by_id(original.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Al Bert");
}

#[tokio::test]
async fn test_list_users_has_public_fields_only() {
    let db = setup().await;
    let repo = PostgresUserRepository::new(db.clone());
    repo.create(albert()).await.unwrap();
    repo.create(sandra()).await.unwrap();

    let users = repo.list().await.unwrap();

    assert_eq!(users.len(), 2);
    assert_eq!(users[0].username, "albert");
    assert!(users.iter().all(|u| u.active && u.posts.is_none()));
}

#[tokio::test]
async fn test_user_by_id_carries_posts() {
    let db = setup().await;
    let repo = PostgresUserRepository::new(db.clone());
    let albert = repo.create(albert()).await.unwrap().unwrap();
    let sandra = repo.create(sandra()).await.unwrap().unwrap();
    first_post(&db, &albert).await;

    let with_post = repo.get_by_id(albert.id).await.unwrap().unwrap();
    let without = repo.get_by_id(sandra.id).await.unwrap().unwrap();

    assert_eq!(with_post.posts.as_ref().map(Vec::len), Some(1));
    assert_eq!(without.posts, Some(vec![]));
    assert!(repo.get_by_id(1234).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_user() {
    let db = setup().await;
    let repo = PostgresUserRepository::new(db.clone());
    let albert = repo.create(albert()).await.unwrap().unwrap();

    let noop = repo.update(albert.id, UserChanges::default()).await.unwrap();
    let moved = repo
        .update(
            albert.id,
            UserChanges {
                location: Some("Perth, Australia".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    let missing = repo
        .update(
            999,
            UserChanges {
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(noop.is_none());
    assert_eq!(moved.location, "Perth, Australia");
    assert_eq!(moved.name, "Al Bert");
    assert!(missing.is_not_found());
}

#[cfg(feature = "auth")]
#[tokio::test]
async fn test_configured_hasher_never_stores_plain_password() {
    use std::sync::Arc;

    use juicebox_core::ports::PasswordService;

    use crate::auth::Argon2PasswordService;

    let db = setup().await;
    let hasher = Arc::new(Argon2PasswordService::new());
    let repo = PostgresUserRepository::new(db.clone()).with_passwords(hasher.clone());

    let albert = repo.create(albert()).await.unwrap().unwrap();

    let row = user::Entity::find_by_id(albert.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_ne!(row.password, "bertie99");
    assert!(hasher.verify("bertie99", &row.password).unwrap());
}

#[tokio::test]
async fn test_tag_repository_lists_registered_tags() {
    let db = setup().await;
    let repo = PostgresTagRepository::new(db);

    repo.register(&names(&["#worst-day-ever", "#happy"]))
        .await
        .unwrap();

    let all: Vec<String> = repo
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(all, vec!["#happy", "#worst-day-ever"]);
}

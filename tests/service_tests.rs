// tests/service_tests.rs
//
// Business rules exercised directly against the in-memory store.

use status_board::{
    error::AppError,
    models::{
        category::CategoryRequest,
        status::{NewStatus, StatusListParams, StatusPatch},
        user::{NewUser, Role},
    },
    services::{admin, bulk, category, status},
    store::{MemoryStore, StatusRepository, UserRepository},
    utils::access::Caller,
};
use serde_json::json;

async fn user(store: &MemoryStore, email: &str, role: Role) -> Caller {
    let user = store
        .insert_user(NewUser {
            name: email.split('@').next().unwrap_or("user").to_string(),
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role,
        })
        .await
        .unwrap();
    Caller { id: user.id, role }
}

fn new_status(title: &str, category: &str) -> NewStatus {
    NewStatus {
        title: title.to_string(),
        description: format!("{} body", title),
        category: category.to_string(),
    }
}

fn name(n: &str) -> CategoryRequest {
    CategoryRequest { name: n.to_string() }
}

fn params(page: i64, limit: i64) -> StatusListParams {
    StatusListParams {
        page: Some(page),
        limit: Some(limit),
        ..Default::default()
    }
}

#[tokio::test]
async fn create_requires_every_field() {
    let store = MemoryStore::new();
    let owner = user(&store, "a@example.com", Role::User).await;

    for bad in [new_status("", "c"), new_status("t", "")] {
        let err = status::create(&store, &owner, bad).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    let mut missing_description = new_status("t", "c");
    missing_description.description.clear();
    assert!(matches!(
        status::create(&store, &owner, missing_description).await,
        Err(AppError::BadRequest(_))
    ));

    let created = status::create(&store, &owner, new_status("t", "c")).await.unwrap();
    assert_eq!(created.user_id, owner.id);
}

#[tokio::test]
async fn total_pages_is_ceiling_and_overflow_is_empty() {
    let store = MemoryStore::new();
    let owner = user(&store, "a@example.com", Role::User).await;
    for i in 0..7 {
        status::create(&store, &owner, new_status(&format!("s{}", i), "c"))
            .await
            .unwrap();
    }

    let page = status::list(&store, params(1, 3)).await.unwrap();
    assert_eq!(page.total, 7);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.statuses.len(), 3);
    assert_eq!(page.statuses[0].title, "s6");

    let last = status::list(&store, params(3, 3)).await.unwrap();
    assert_eq!(last.statuses.len(), 1);
    assert_eq!(last.statuses[0].title, "s0");

    let beyond = status::list(&store, params(4, 3)).await.unwrap();
    assert!(beyond.statuses.is_empty());
    assert_eq!(beyond.current_page, 4);
}

#[tokio::test]
async fn search_matches_any_field_case_insensitively() {
    let store = MemoryStore::new();
    let owner = user(&store, "a@example.com", Role::User).await;
    status::create(&store, &owner, new_status("Happy Monday", "Mood")).await.unwrap();
    status::create(&store, &owner, new_status("Quiet", "MONDAY blues")).await.unwrap();
    status::create(&store, &owner, new_status("Tuesday", "Mood")).await.unwrap();

    let page = status::list(
        &store,
        StatusListParams {
            search: Some("monday".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(page.total, 2);

    let literal = status::list(
        &store,
        StatusListParams {
            search: Some("m.nday".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(literal.total, 0);
}

#[tokio::test]
async fn non_owner_update_and_delete_are_forbidden() {
    let store = MemoryStore::new();
    let owner = user(&store, "owner@example.com", Role::User).await;
    let other = user(&store, "other@example.com", Role::User).await;
    let created = status::create(&store, &owner, new_status("Keep", "c")).await.unwrap();

    let patch = StatusPatch {
        title: Some("Changed".to_string()),
        ..Default::default()
    };
    let err = status::update(&store, created.id, Some(&other), patch.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = status::delete(&store, created.id, Some(&other)).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let unchanged = store.find_status(created.id).await.unwrap().unwrap();
    assert_eq!(unchanged.title, "Keep");

    let err = status::update(&store, created.id, None, patch).await.unwrap_err();
    assert!(matches!(err, AppError::AuthError(_)));
}

#[tokio::test]
async fn unknown_status_is_not_found_before_authorization() {
    let store = MemoryStore::new();
    let stranger = user(&store, "s@example.com", Role::User).await;

    let err = status::update(&store, 404, Some(&stranger), StatusPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    let err = status::delete(&store, 404, Some(&stranger)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn admin_overrides_ownership() {
    let store = MemoryStore::new();
    let owner = user(&store, "owner@example.com", Role::User).await;
    let boss = user(&store, "boss@example.com", Role::Admin).await;
    let created = status::create(&store, &owner, new_status("Old", "c")).await.unwrap();

    let updated = status::update(
        &store,
        created.id,
        Some(&boss),
        StatusPatch {
            category: Some("moved".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.category, "moved");
    assert_eq!(updated.user_id, owner.id);

    status::delete(&store, created.id, Some(&boss)).await.unwrap();
    assert!(store.find_status(created.id).await.unwrap().is_none());
}

#[tokio::test]
async fn text_is_sanitized_before_storage() {
    let store = MemoryStore::new();
    let owner = user(&store, "a@example.com", Role::User).await;

    let created = status::create(
        &store,
        &owner,
        NewStatus {
            title: "Hi<script>alert(1)</script>".to_string(),
            description: "<b>bold</b>".to_string(),
            category: "c".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(created.title, "Hi");
    assert_eq!(created.description, "bold");

    let only_script = status::create(
        &store,
        &owner,
        NewStatus {
            title: "<script>x</script>".to_string(),
            description: "d".to_string(),
            category: "c".to_string(),
        },
    )
    .await;
    assert!(matches!(only_script, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn plain_text_is_stored_as_typed_and_searchable() {
    let store = MemoryStore::new();
    let owner = user(&store, "a@example.com", Role::User).await;

    let created = status::create(
        &store,
        &owner,
        NewStatus {
            title: "Tom & Jerry".to_string(),
            description: "5 < 6".to_string(),
            category: "Cartoons".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(created.title, "Tom & Jerry");
    assert_eq!(created.description, "5 < 6");

    let found = status::list(
        &store,
        StatusListParams {
            search: Some("tom & jerry".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(found.total, 1);
    assert_eq!(found.statuses[0].title, "Tom & Jerry");

    // Length limits count the characters the user typed, not their entities.
    let ampersands = status::create(&store, &owner, new_status(&"&".repeat(30), "c")).await;
    assert_eq!(ampersands.unwrap().title, "&".repeat(30));
}

#[tokio::test]
async fn long_free_form_categories_are_accepted() {
    let store = MemoryStore::new();
    let owner = user(&store, "a@example.com", Role::User).await;
    let long = "c".repeat(80);

    let created = status::create(&store, &owner, new_status("t", &long)).await.unwrap();
    assert_eq!(created.category, long);
}

#[tokio::test]
async fn distinct_categories_ignore_the_category_collection() {
    let store = MemoryStore::new();
    let owner = user(&store, "a@example.com", Role::User).await;
    category::create(&store, name("Listed")).await.unwrap();

    assert!(status::distinct_categories(&store).await.unwrap().is_empty());

    status::create(&store, &owner, new_status("x", "Unlisted")).await.unwrap();
    status::create(&store, &owner, new_status("y", "Unlisted")).await.unwrap();

    assert_eq!(
        status::distinct_categories(&store).await.unwrap(),
        vec!["Unlisted".to_string()]
    );
}

#[tokio::test]
async fn category_rename_cascades_to_statuses() {
    let store = MemoryStore::new();
    let owner = user(&store, "a@example.com", Role::User).await;
    let happy = category::create(&store, name("Happy")).await.unwrap();
    status::create(&store, &owner, new_status("one", "Happy")).await.unwrap();
    status::create(&store, &owner, new_status("two", "Happy")).await.unwrap();
    status::create(&store, &owner, new_status("three", "Other")).await.unwrap();

    let renamed = category::update(&store, happy.id, name("Joy")).await.unwrap();
    assert_eq!(renamed.name, "Joy");

    assert_eq!(store.count_statuses_in_category("Happy").await.unwrap(), 0);
    assert_eq!(store.count_statuses_in_category("Joy").await.unwrap(), 2);
    assert_eq!(store.count_statuses_in_category("Other").await.unwrap(), 1);
}

#[tokio::test]
async fn category_rename_validation() {
    let store = MemoryStore::new();
    let a = category::create(&store, name("A")).await.unwrap();
    category::create(&store, name("B")).await.unwrap();

    assert!(matches!(
        category::update(&store, a.id, name("")).await,
        Err(AppError::BadRequest(_))
    ));
    assert!(matches!(
        category::update(&store, 999, name("C")).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        category::update(&store, a.id, name("B")).await,
        Err(AppError::Conflict(_))
    ));

    // Keeping the same name is not a conflict with itself.
    assert_eq!(category::update(&store, a.id, name("A")).await.unwrap().name, "A");
}

#[tokio::test]
async fn category_delete_respects_live_usage() {
    let store = MemoryStore::new();
    let owner = user(&store, "a@example.com", Role::User).await;
    let used = category::create(&store, name("Used")).await.unwrap();
    let created = status::create(&store, &owner, new_status("x", "Used")).await.unwrap();

    assert!(matches!(
        category::delete(&store, used.id).await,
        Err(AppError::Conflict(_))
    ));

    status::delete(&store, created.id, Some(&owner)).await.unwrap();
    category::delete(&store, used.id).await.unwrap();
    assert!(category::list(&store).await.unwrap().is_empty());

    assert!(matches!(
        category::delete(&store, used.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn categories_list_newest_first() {
    let store = MemoryStore::new();
    for n in ["first", "second", "third"] {
        category::create(&store, name(n)).await.unwrap();
    }

    let names: Vec<String> = category::list(&store)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn bulk_import_counts_duplicates_as_failures() {
    let store = MemoryStore::new();

    let report = bulk::import_categories(&store, json!([{ "name": "A" }, { "name": "A" }]))
        .await
        .unwrap();
    assert_eq!(report.success_count(), 1);
    assert_eq!(report.error_count(), 1);
    assert!(report.errors[0].1.contains("already exists"));

    let err = bulk::import_categories(&store, json!([{ "name": "A" }, "junk"]))
        .await
        .unwrap_err();
    assert_eq!(err.message(), "All categories failed to create");
}

#[tokio::test]
async fn bulk_status_import_continues_after_failures() {
    let store = MemoryStore::new();
    let owner = user(&store, "a@example.com", Role::User).await;

    let report = bulk::import_statuses(
        &store,
        &owner,
        json!([
            { "title": "", "description": "d", "category": "c" },
            { "title": "ok", "description": "d", "category": "c" },
            42,
        ]),
    )
    .await
    .unwrap();

    assert_eq!(report.success_count(), 1);
    assert_eq!(report.error_count(), 2);
    assert_eq!(report.created[0].user_id, owner.id);
    assert_eq!(report.errors[1].0, json!(42));
}

#[tokio::test]
async fn admin_role_changes() {
    let store = MemoryStore::new();
    let member = user(&store, "m@example.com", Role::User).await;

    let promoted = admin::set_user_role(&store, member.id, Role::Admin).await.unwrap();
    assert_eq!(promoted.role, Role::Admin);

    assert!(matches!(
        admin::set_user_role(&store, 31337, Role::Admin).await,
        Err(AppError::NotFound(_))
    ));

    let serialized = serde_json::to_value(&promoted).unwrap();
    assert!(serialized.get("password").is_none());
    assert_eq!(serialized["role"], "admin");
}

#[tokio::test]
async fn admin_status_listing_projects_owner() {
    let store = MemoryStore::new();
    let owner = user(&store, "writer@example.com", Role::User).await;
    status::create(&store, &owner, new_status("a", "c")).await.unwrap();
    status::create(&store, &owner, new_status("b", "c")).await.unwrap();

    let all = admin::list_all_statuses(&store).await.unwrap();
    assert_eq!(all.len(), 2);
    let projected = all[0].user.as_ref().unwrap();
    assert_eq!(projected.name, "writer");
    assert_eq!(projected.email, "writer@example.com");
}

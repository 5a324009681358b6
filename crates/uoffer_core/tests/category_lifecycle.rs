use rusqlite::Connection;
use uoffer_core::db::open_db_in_memory;
use uoffer_core::{
    CategoryDeleteMode, CategoryRepository, CategoryService, NewAnalytic, NewPost, PostFilter,
    PostRepository, ServiceError, SqliteCategoryRepository, SqlitePostRepository,
    SqliteServices, WordProjectionPolicy,
};

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn category_service(conn: &Connection) -> CategoryService<SqliteCategoryRepository<'_>> {
    CategoryService::new(SqliteCategoryRepository::try_new(conn).unwrap())
}

fn insert_post(conn: &Connection, category: &str, title: &str, is_public: bool) -> i64 {
    let repo = SqlitePostRepository::try_new(conn).unwrap();
    repo.create_post(&NewPost::new(category, title, "body", is_public))
        .unwrap()
        .id
}

fn category_titles(conn: &Connection) -> Vec<String> {
    SqliteCategoryRepository::try_new(conn)
        .unwrap()
        .list_categories()
        .unwrap()
        .into_iter()
        .map(|category| category.title)
        .collect()
}

#[test]
fn add_category_trims_and_persists_title() {
    let conn = setup();
    let service = category_service(&conn);

    let created = service.add_category("  Backend  ").unwrap();
    assert_eq!(created.title, "Backend");
    assert_eq!(category_titles(&conn), vec!["Backend".to_string()]);
}

#[test]
fn duplicate_titles_are_rejected_without_touching_storage() {
    let conn = setup();
    let service = category_service(&conn);
    let original = service.add_category("Backend").unwrap();

    for attempt in ["Backend", " Backend "] {
        let err = service.add_category(attempt).unwrap_err();
        assert!(matches!(err, ServiceError::CategoryAlreadyExists(ref title) if title == "Backend"));
    }

    let stored = SqliteCategoryRepository::try_new(&conn)
        .unwrap()
        .get_category("Backend")
        .unwrap()
        .unwrap();
    assert_eq!(stored, original);
    assert_eq!(category_titles(&conn).len(), 1);
}

#[test]
fn blank_title_is_rejected() {
    let conn = setup();
    let service = category_service(&conn);

    assert!(matches!(
        service.add_category("   ").unwrap_err(),
        ServiceError::InvalidTitle
    ));
}

#[test]
fn rename_propagates_to_posts() {
    let conn = setup();
    let service = category_service(&conn);
    service.add_category("Rust").unwrap();
    let post_id = insert_post(&conn, "Rust", "Ownership", true);

    let renamed = service.update_category("Rust", "Rust jobs").unwrap();
    assert_eq!(renamed.title, "Rust jobs");

    let posts = SqlitePostRepository::try_new(&conn).unwrap();
    let post = posts.get_post(post_id).unwrap().unwrap();
    assert_eq!(post.category, "Rust jobs");
    assert_eq!(category_titles(&conn), vec!["Rust jobs".to_string()]);
}

#[test]
fn rename_missing_category_returns_not_found() {
    let conn = setup();
    let service = category_service(&conn);

    let err = service.update_category("Ghost", "Anything").unwrap_err();
    assert!(matches!(err, ServiceError::CategoryNotFound(Some(ref title)) if title == "Ghost"));
}

#[test]
fn rename_onto_existing_title_is_rejected() {
    let conn = setup();
    let service = category_service(&conn);
    service.add_category("Go").unwrap();
    service.add_category("Rust").unwrap();

    let err = service.update_category("Go", "Rust").unwrap_err();
    assert!(matches!(err, ServiceError::CategoryAlreadyExists(_)));
    assert_eq!(
        category_titles(&conn),
        vec!["Go".to_string(), "Rust".to_string()]
    );
}

#[test]
fn rename_to_same_title_is_a_noop() {
    let conn = setup();
    let service = category_service(&conn);
    let created = service.add_category("Rust").unwrap();

    assert_eq!(service.update_category("Rust", " Rust ").unwrap(), created);
}

#[test]
fn restrict_delete_refuses_while_posts_exist() {
    let conn = setup();
    let service = category_service(&conn);
    service.add_category("Rust").unwrap();
    let post_id = insert_post(&conn, "Rust", "Lifetimes", false);

    let err = service
        .delete_category("Rust", CategoryDeleteMode::Restrict)
        .unwrap_err();
    assert!(matches!(err, ServiceError::CategoryInUse { posts: 1, .. }));

    let posts = SqlitePostRepository::try_new(&conn).unwrap();
    assert!(posts.post_exists(post_id).unwrap());
    assert_eq!(category_titles(&conn), vec!["Rust".to_string()]);
}

#[test]
fn restrict_delete_removes_unused_category() {
    let conn = setup();
    let service = category_service(&conn);
    service.add_category("Empty").unwrap();

    service
        .delete_category("Empty", CategoryDeleteMode::Restrict)
        .unwrap();
    assert!(category_titles(&conn).is_empty());
}

#[test]
fn cascade_delete_removes_posts_and_their_analytics() {
    let conn = setup();
    let services = SqliteServices::try_new(&conn, WordProjectionPolicy::default()).unwrap();
    services.categories.add_category("Rust").unwrap();
    services.categories.add_category("Go").unwrap();
    let doomed = insert_post(&conn, "Rust", "Traits", true);
    let kept = insert_post(&conn, "Go", "Goroutines", true);
    services
        .analytics
        .add_analytic(&NewAnalytic::for_post(doomed))
        .unwrap();

    services
        .categories
        .delete_category("Rust", CategoryDeleteMode::Cascade)
        .unwrap();

    let remaining = services.posts.list_posts(PostFilter::All).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, kept);
    assert!(remaining.iter().all(|post| post.category != "Rust"));

    let analytics: i64 = conn
        .query_row("SELECT COUNT(*) FROM analytics;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(analytics, 0);
}

#[test]
fn delete_missing_category_returns_not_found() {
    let conn = setup();
    let service = category_service(&conn);

    for mode in [CategoryDeleteMode::Restrict, CategoryDeleteMode::Cascade] {
        let err = service.delete_category("Ghost", mode).unwrap_err();
        assert!(matches!(err, ServiceError::CategoryNotFound(Some(_))));
    }
}

#[test]
fn get_all_categories_orders_by_title_and_reports_empty_store() {
    let conn = setup();
    let service = category_service(&conn);

    assert!(matches!(
        service.get_all_categories().unwrap_err(),
        ServiceError::CategoryNotFound(None)
    ));

    service.add_category("Rust").unwrap();
    service.add_category("Go").unwrap();
    let titles = service
        .get_all_categories()
        .unwrap()
        .into_iter()
        .map(|category| category.title)
        .collect::<Vec<_>>();
    assert_eq!(titles, vec!["Go".to_string(), "Rust".to_string()]);
}

#[test]
fn posts_cannot_reference_missing_category() {
    let conn = setup();
    let repo = SqlitePostRepository::try_new(&conn).unwrap();

    let err = repo
        .create_post(&NewPost::new("Ghost", "Orphan", "", true))
        .unwrap_err();
    assert!(matches!(err, uoffer_core::RepoError::CategoryNotFound(_)));
}

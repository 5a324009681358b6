//! Use-case API for the transport layer.
//!
//! # Responsibility
//! - Expose one function per core operation with a status + JSON envelope.
//! - Resolve the caller role claim before role-aware operations.
//! - Hide internal failure details behind an incident reference.
//!
//! # Invariants
//! - Exported functions never panic and never return `Result`; failures are
//!   encoded in `ApiResponse::status`.
//! - Named domain errors are returned as-is and not logged.
//! - Every `Unexpected` failure is logged exactly once with the reference
//!   returned to the caller.

use crate::status::{status_for, CREATED, INTERNAL_ERROR, NO_CONTENT, OK};
use log::{error, info};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::{json, Value};
use std::error::Error;
use uoffer_core::db::{open_db, DbError};
use uoffer_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AnalyticId, AnalyticUpdate, CategoryDeleteMode, CoreConfig, ErrorKind, NewAnalytic, PostId,
    Role, ServiceError, ServiceResult, SqliteServices,
};
use uuid::Uuid;

/// Minimal health-check API.
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Core crate version.
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// Returns an empty string on success and the error message otherwise.
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Per-request caller information supplied by the authorization layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Raw role claim, if the caller presented one.
    pub role: Option<String>,
}

impl RequestContext {
    pub fn with_role(role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
        }
    }
}

/// Resolves the role claim of `ctx`; unknown claims count as absent.
pub fn resolve_role(ctx: &RequestContext) -> Option<Role> {
    ctx.role.as_deref().and_then(Role::parse)
}

/// Status code plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// `null` for `204`, `{ "error", "kind" }` for failures.
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn success<T: Serialize>(op: &'static str, status: u16, value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Self { status, body },
            Err(err) => Self::internal(op, &err),
        }
    }

    fn failure(op: &'static str, err: &ServiceError) -> Self {
        let kind = err.kind();
        if kind == ErrorKind::Unexpected {
            return Self::internal(op, err);
        }
        Self {
            status: status_for(kind),
            body: json!({ "error": err.to_string(), "kind": kind }),
        }
    }

    fn internal(op: &'static str, err: &dyn Error) -> Self {
        let reference = Uuid::new_v4();
        error!(
            "event=api_call module=api status=error op={} ref={} error={}",
            op,
            reference,
            error_chain(err)
        );
        Self {
            status: INTERNAL_ERROR,
            body: json!({
                "error": format!("internal error (ref={reference})"),
                "kind": ErrorKind::Unexpected,
            }),
        }
    }
}

/// Renders `err` and every cause not already part of its message on one line.
///
/// The full text is kept; only line breaks are flattened so one failure stays
/// one log record.
fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": caused by: ");
            message.push_str(&text);
        }
        cause = inner.source();
    }
    message.replace(['\r', '\n'], " ")
}

/// Request handler bound to one database connection.
///
/// Posts are written by an external collaborator; the handler only reads
/// them. `connection()` gives that collaborator access to the same store.
pub struct ApiHandler {
    conn: Connection,
    config: CoreConfig,
}

impl ApiHandler {
    /// Opens the database named by `config.db_path`.
    pub fn open(config: CoreConfig) -> Result<Self, DbError> {
        let conn = open_db(&config.db_path)?;
        info!(
            "event=api_open module=api status=ok db_path={} category_delete={:?}",
            config.db_path.display(),
            config.category_delete
        );
        Ok(Self::with_connection(conn, config))
    }

    /// Wraps an already migrated connection.
    pub fn with_connection(conn: Connection, config: CoreConfig) -> Self {
        Self { conn, config }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Creates a category. `201` with the stored category.
    pub fn add_category(&self, title: &str) -> ApiResponse {
        self.call("add_category", CREATED, |services| {
            services.categories.add_category(title)
        })
    }

    /// Renames a category. `200` with the renamed category.
    pub fn update_category(&self, old_title: &str, new_title: &str) -> ApiResponse {
        self.call("update_category", OK, |services| {
            services.categories.update_category(old_title, new_title)
        })
    }

    /// Deletes a category with `mode`, or the configured mode when `None`.
    pub fn delete_category(&self, title: &str, mode: Option<CategoryDeleteMode>) -> ApiResponse {
        let mode = mode.unwrap_or(self.config.category_delete);
        self.call("delete_category", NO_CONTENT, |services| {
            services.categories.delete_category(title, mode)
        })
    }

    pub fn get_all_categories(&self) -> ApiResponse {
        self.call("get_all_categories", OK, |services| {
            services.categories.get_all_categories()
        })
    }

    pub fn get_categories_with_public_posts(&self) -> ApiResponse {
        self.call("get_categories_with_public_posts", OK, |services| {
            services.projections.categories_with_public_posts()
        })
    }

    /// Administrative aggregate including private posts.
    pub fn get_categories_with_posts(&self) -> ApiResponse {
        self.call("get_categories_with_posts", OK, |services| {
            services.projections.categories_with_posts()
        })
    }

    pub fn add_analytic(&self, analytic: &NewAnalytic) -> ApiResponse {
        self.call("add_analytic", OK, |services| {
            services.analytics.add_analytic(analytic)
        })
    }

    pub fn update_analytic(&self, id: AnalyticId, update: &AnalyticUpdate) -> ApiResponse {
        self.call("update_analytic", OK, |services| {
            services.analytics.update_analytic(id, update)
        })
    }

    pub fn delete_analytic(&self, id: AnalyticId) -> ApiResponse {
        self.call("delete_analytic", NO_CONTENT, |services| {
            services.analytics.delete_analytic(id)
        })
    }

    /// Analytic of `post_id` with words shaped by the caller role.
    ///
    /// `401` when the context carries no recognised role.
    pub fn get_analytic_with_words(&self, ctx: &RequestContext, post_id: PostId) -> ApiResponse {
        let role = resolve_role(ctx);
        self.call("get_analytic_with_words", OK, |services| {
            services.projections.analytic_with_words(post_id, role)
        })
    }

    fn call<T: Serialize>(
        &self,
        op: &'static str,
        success: u16,
        f: impl FnOnce(&SqliteServices<'_>) -> ServiceResult<T>,
    ) -> ApiResponse {
        let result = SqliteServices::try_new(&self.conn, self.config.word_projection)
            .map_err(ServiceError::from)
            .and_then(|services| f(&services));
        match result {
            Ok(value) => ApiResponse::success(op, success, &value),
            Err(err) => ApiResponse::failure(op, &err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, error_chain, init_logging, ping, resolve_role, ApiHandler, RequestContext,
    };
    use std::error::Error;
    use std::fmt::{Display, Formatter};
    use uoffer_core::db::{open_db_in_memory, DbError};
    use uoffer_core::{RepoError, ServiceError};
    use uoffer_core::{
        derive_word_stats, AnalyticUpdate, CategoryDeleteMode, CoreConfig, NewAnalytic, NewPost,
        PostRepository, Role, SqlitePostRepository,
    };

    fn handler() -> ApiHandler {
        ApiHandler::with_connection(open_db_in_memory().unwrap(), CoreConfig::default())
    }

    fn insert_post(handler: &ApiHandler, category: &str, content: &str, public: bool) -> i64 {
        let repo = SqlitePostRepository::try_new(handler.connection()).unwrap();
        let post = repo
            .create_post(&NewPost::new(category, "title", content, public))
            .unwrap();
        repo.replace_post_words(post.id, &derive_word_stats(content))
            .unwrap();
        post.id
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/uoffer-logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn unknown_role_claim_counts_as_absent() {
        assert_eq!(resolve_role(&RequestContext::default()), None);
        assert_eq!(resolve_role(&RequestContext::with_role("root")), None);
        assert_eq!(
            resolve_role(&RequestContext::with_role("ADMIN")),
            Some(Role::Admin)
        );
    }

    #[test]
    fn category_lifecycle_statuses() {
        let handler = handler();

        let created = handler.add_category("Rust");
        assert_eq!(created.status, 201);
        assert_eq!(created.body["title"], "Rust");

        let duplicate = handler.add_category("Rust");
        assert_eq!(duplicate.status, 409);
        assert_eq!(duplicate.body["kind"], "category_already_exists");

        assert_eq!(handler.update_category("Ghost", "Other").status, 404);
        assert_eq!(handler.update_category("Rust", "Go").status, 200);
        assert_eq!(handler.add_category("  ").status, 400);

        let listed = handler.get_all_categories();
        assert_eq!(listed.status, 200);
        assert_eq!(listed.body[0]["title"], "Go");

        let deleted = handler.delete_category("Go", None);
        assert_eq!(deleted.status, 204);
        assert!(deleted.body.is_null());
        assert_eq!(handler.get_all_categories().status, 404);
    }

    #[test]
    fn restrict_delete_reports_conflict() {
        let handler = handler();
        handler.add_category("Rust");
        insert_post(&handler, "Rust", "", true);

        let refused = handler.delete_category("Rust", None);
        assert_eq!(refused.status, 409);
        assert_eq!(refused.body["kind"], "category_in_use");

        let cascaded = handler.delete_category("Rust", Some(CategoryDeleteMode::Cascade));
        assert_eq!(cascaded.status, 204);
    }

    #[test]
    fn analytic_statuses_follow_error_table() {
        let handler = handler();
        handler.add_category("Rust");
        let post_id = insert_post(&handler, "Rust", "", true);

        let created = handler.add_analytic(&NewAnalytic::for_post(post_id));
        assert_eq!(created.status, 200);
        let analytic_id = created.body["id"].as_i64().unwrap();

        assert_eq!(handler.add_analytic(&NewAnalytic::for_post(post_id)).status, 400);
        assert_eq!(handler.add_analytic(&NewAnalytic::for_post(999)).status, 409);
        assert_eq!(
            handler
                .update_analytic(analytic_id, &AnalyticUpdate::default())
                .status,
            400
        );

        let update = AnalyticUpdate {
            views: Some(3),
            ..AnalyticUpdate::default()
        };
        let updated = handler.update_analytic(analytic_id, &update);
        assert_eq!(updated.status, 200);
        assert_eq!(updated.body["views"], 3);

        assert_eq!(handler.delete_analytic(analytic_id).status, 204);
        assert_eq!(handler.delete_analytic(analytic_id).status, 404);
    }

    #[test]
    fn analytic_with_words_requires_recognised_role() {
        let handler = handler();
        handler.add_category("Rust");
        let post_id = insert_post(&handler, "Rust", "rust rust borrow", true);
        handler.add_analytic(&NewAnalytic::for_post(post_id));

        let anonymous = handler.get_analytic_with_words(&RequestContext::default(), post_id);
        assert_eq!(anonymous.status, 401);
        assert_eq!(anonymous.body["kind"], "missing_role");

        let admin = handler.get_analytic_with_words(&RequestContext::with_role("admin"), post_id);
        assert_eq!(admin.status, 200);
        assert_eq!(admin.body["words"]["granularity"], "full");
        assert_eq!(admin.body["words"]["words"][0]["word"], "rust");

        let missing = handler.get_analytic_with_words(&RequestContext::with_role("user"), 404);
        assert_eq!(missing.status, 404);
    }

    #[test]
    fn aggregates_map_empty_result_to_not_found() {
        let handler = handler();
        handler.add_category("Rust");
        assert_eq!(handler.get_categories_with_posts().status, 404);

        insert_post(&handler, "Rust", "", false);
        assert_eq!(handler.get_categories_with_public_posts().status, 404);

        let all = handler.get_categories_with_posts();
        assert_eq!(all.status, 200);
        assert_eq!(all.body["Rust"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn unexpected_failure_hides_details_behind_reference() {
        let handler = handler();
        handler
            .connection()
            .execute_batch("DROP TABLE analytics;")
            .unwrap();

        let response = handler.get_all_categories();
        assert_eq!(response.status, 500);
        assert_eq!(response.body["kind"], "unexpected");
        let message = response.body["error"].as_str().unwrap();
        assert!(message.starts_with("internal error (ref="));
        assert!(!message.contains("analytics"));
    }

    #[derive(Debug)]
    struct Wrapped(DbError);

    impl Display for Wrapped {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            write!(f, "bootstrap failed")
        }
    }

    impl Error for Wrapped {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn error_chain_keeps_long_messages_on_one_line() {
        let detail = format!("{}\nsecond line", "x".repeat(400));
        let err = ServiceError::Unexpected(RepoError::InvalidData(detail));

        let chain = error_chain(&err);
        assert!(!chain.contains('\n'));
        assert!(chain.contains(&"x".repeat(400)));
        assert!(chain.ends_with("second line"));
    }

    #[test]
    fn error_chain_appends_causes_missing_from_the_message() {
        let err = Wrapped(DbError::Migration {
            version: 2,
            name: "analytics",
            source: rusqlite::Error::QueryReturnedNoRows,
        });

        let chain = error_chain(&err);
        assert!(chain.starts_with("bootstrap failed: caused by: migration 0002 (analytics)"));
        let no_rows = rusqlite::Error::QueryReturnedNoRows.to_string();
        assert_eq!(chain.matches(no_rows.as_str()).count(), 1);
    }
}

//! Category lifecycle use-cases.
//!
//! # Responsibility
//! - Normalize titles and enforce title uniqueness on create and rename.
//! - Apply the configured deletion policy for categories with posts.
//!
//! # Invariants
//! - No post is ever left pointing at a missing category.
//! - An empty category store is reported as `CategoryNotFound`.

use crate::model::category::{normalize_title, Category};
use crate::repo::category_repo::CategoryRepository;
use crate::service::error::{ServiceError, ServiceResult};
use serde::{Deserialize, Serialize};

/// Deletion policy for categories still referenced by posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryDeleteMode {
    /// Refuse while any post references the category.
    #[default]
    Restrict,
    /// Delete the category's posts (and their analytics) as well.
    Cascade,
}

/// Category service facade.
pub struct CategoryService<R: CategoryRepository> {
    repo: R,
}

impl<R: CategoryRepository> CategoryService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds a category; the title must not exist yet.
    pub fn add_category(&self, title: &str) -> ServiceResult<Category> {
        let title = normalize_title(title).ok_or(ServiceError::InvalidTitle)?;
        self.repo.create_category(title.as_str()).map_err(Into::into)
    }

    /// Renames `old_title` to `new_title`, carrying post references along.
    pub fn update_category(&self, old_title: &str, new_title: &str) -> ServiceResult<Category> {
        let old_title = normalize_title(old_title)
            .ok_or_else(|| ServiceError::CategoryNotFound(Some(old_title.to_string())))?;
        let new_title = normalize_title(new_title).ok_or(ServiceError::InvalidTitle)?;
        self.repo
            .rename_category(old_title.as_str(), new_title.as_str())
            .map_err(Into::into)
    }

    /// Deletes a category according to `mode`.
    pub fn delete_category(&self, title: &str, mode: CategoryDeleteMode) -> ServiceResult<()> {
        let title = normalize_title(title)
            .ok_or_else(|| ServiceError::CategoryNotFound(Some(title.to_string())))?;
        match mode {
            CategoryDeleteMode::Restrict => self.repo.delete_category_restrict(title.as_str())?,
            CategoryDeleteMode::Cascade => self.repo.delete_category_cascade(title.as_str())?,
        }
        Ok(())
    }

    /// Returns every category ordered by title.
    pub fn get_all_categories(&self) -> ServiceResult<Vec<Category>> {
        let categories = self.repo.list_categories()?;
        if categories.is_empty() {
            return Err(ServiceError::CategoryNotFound(None));
        }
        Ok(categories)
    }
}

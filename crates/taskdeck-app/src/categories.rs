//! The category manager dialog.

use std::sync::Arc;

use taskdeck_core::category::{Category, CategoryDraft};
use taskdeck_core::collaborators::{ConfirmOptions, Confirmer, NotificationKind, Notifier};
use taskdeck_core::error::{InvalidArgument, TodoError, TodoResult};
use taskdeck_core::identifiers::CategoryId;
use taskdeck_core::validation::TextRules;
use taskdeck_store::CategoryRepository;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::feedback::report;
use crate::liveness::Liveness;
use crate::{IdGenerator, MAX_ID_ATTEMPTS, default_id_generator};

/// Names offered when the user has no idea what to call a category.
pub const SUGGESTED_CATEGORIES: [&str; 6] = [
    "Self-care",
    "Focus sprint",
    "Brain dump",
    "Weird & wonderful",
    "Errands",
    "Study lab",
];

/// Create, rename and delete categories.
///
/// Starts closed; [`CategoryManager::open`] loads the list. Results of a
/// fetch that finishes after [`CategoryManager::close`] are dropped.
pub struct CategoryManager {
    repo: Arc<dyn CategoryRepository>,
    confirmer: Arc<dyn Confirmer>,
    notifier: Arc<dyn Notifier>,
    ids: IdGenerator,
    categories: RwLock<Vec<Category>>,
    liveness: Liveness,
}

impl CategoryManager {
    pub fn new(
        repo: Arc<dyn CategoryRepository>,
        confirmer: Arc<dyn Confirmer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            repo,
            confirmer,
            notifier,
            ids: default_id_generator(),
            categories: RwLock::new(Vec::new()),
            liveness: Liveness::closed(),
        }
    }

    pub fn with_id_generator(mut self, ids: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    pub async fn open(&self) -> TodoResult<bool> {
        self.liveness.revive();
        self.refresh().await
    }

    pub fn close(&self) {
        self.liveness.kill();
    }

    pub fn is_open(&self) -> bool {
        self.liveness.is_alive()
    }

    /// Reload the category list. Returns `false` if the result was stale.
    pub async fn refresh(&self) -> TodoResult<bool> {
        let ticket = self.liveness.begin();

        let fetched = match self.repo.list().await {
            Ok(found) => found,
            Err(e) if !self.liveness.is_alive() => return Err(e),
            Err(e) => {
                return Err(report(
                    &*self.notifier,
                    "Failed to load categories",
                    None,
                    e,
                ));
            }
        };

        let mut categories = self.categories.write().await;
        if !self.liveness.accepts(ticket) {
            debug!(count = fetched.len(), "Discarding stale category list");
            return Ok(false);
        }
        *categories = fetched;
        Ok(true)
    }

    /// Insert a new category or rename an existing one.
    pub async fn save(&self, draft: CategoryDraft) -> TodoResult<Category> {
        let name = TextRules::category_name(&draft.name).map_err(|e| {
            report(&*self.notifier, "Please enter a category name", None, e.into())
        })?;

        let result = match &draft.category_id {
            Some(id) => self.repo.update(&Category::new(id.clone(), name)).await,
            None => self.insert_with_fresh_id(name).await,
        };

        let saved = result.map_err(|e| match e {
            TodoError::InvalidArgument(InvalidArgument::DuplicateName { .. }) => report(
                &*self.notifier,
                "Category already exists",
                Some("Try another playful name."),
                e,
            ),
            e => report(&*self.notifier, "Failed to save category", None, e),
        })?;

        info!(
            category_id = %saved.category_id,
            name = %saved.category_name,
            created = draft.is_new(),
            "Category saved"
        );
        self.refresh_after_mutation().await;
        self.notifier.success(if draft.is_new() {
            "Category added successfully!"
        } else {
            "Category updated successfully!"
        });
        Ok(saved)
    }

    async fn insert_with_fresh_id(&self, name: String) -> TodoResult<Category> {
        let mut attempt = 1;
        loop {
            let raw = (self.ids)();
            let category_id = CategoryId::parse(&raw).map_err(|e| InvalidArgument::InvalidId {
                id: raw.clone(),
                reason: e.to_string(),
            })?;

            match self.repo.insert(&Category::new(category_id, name.clone())).await {
                Err(TodoError::InvalidArgument(InvalidArgument::DuplicateId { id }))
                    if attempt < MAX_ID_ATTEMPTS =>
                {
                    warn!(category_id = %id, attempt, "Generated id already in use; regenerating");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// Delete a category after the user confirms. Tasks keep their category
    /// text. Returns whether the category was deleted.
    pub async fn delete(&self, category_id: &CategoryId) -> TodoResult<bool> {
        let options = ConfirmOptions::new("Delete this category?")
            .with_description("Tasks won't be removed, but they will lose this tag.")
            .with_labels("Delete", "Keep it")
            .destructive();

        if !self.confirmer.confirm(options).await {
            self.notifier.notify(
                NotificationKind::Info,
                "Deletion cancelled.",
                Some("Your category is still available."),
            );
            return Ok(false);
        }

        self.repo
            .delete(category_id)
            .await
            .map_err(|e| report(&*self.notifier, "Failed to delete category", None, e))?;

        info!(category_id = %category_id, "Category deleted");
        self.refresh_after_mutation().await;
        self.notifier.success("Category deleted successfully!");
        Ok(true)
    }

    async fn refresh_after_mutation(&self) {
        if let Err(e) = self.refresh().await {
            debug!(error = %e, "Refresh after mutation failed");
        }
    }

    /// Categories from the last accepted refresh.
    pub async fn categories(&self) -> Vec<Category> {
        self.categories.read().await.clone()
    }

    pub fn suggestions(&self) -> &'static [&'static str] {
        &SUGGESTED_CATEGORIES
    }
}

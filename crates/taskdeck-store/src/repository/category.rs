use async_trait::async_trait;
use taskdeck_core::category::Category;
use taskdeck_core::error::{CollectionName, TodoError, TodoResult};
use taskdeck_core::identifiers::CategoryId;
use taskdeck_core::validation::TextRules;
use tracing::debug;

use super::{CategoryRepository, ensure_unique_name};
use crate::client::StoreClient;
use crate::collection::AccessMode;

const CATEGORIES: CollectionName = CollectionName::Categories;

/// Categories stored in the `categories` collection, keyed by `category_id`.
///
/// The name check reads the collection inside the same immediate transaction
/// that writes the record, so two concurrent saves of the same name cannot
/// both succeed.
#[derive(Debug, Clone)]
pub struct SqliteCategoryRepository {
    client: StoreClient,
}

impl SqliteCategoryRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CategoryRepository for SqliteCategoryRepository {
    async fn list(&self) -> TodoResult<Vec<Category>> {
        self.client
            .run(CATEGORIES, AccessMode::ReadOnly, |h| h.get_all::<Category>())
            .await
    }

    async fn get_by_id(&self, category_id: &CategoryId) -> TodoResult<Category> {
        let key = category_id.clone();
        self.client
            .run(CATEGORIES, AccessMode::ReadOnly, move |h| {
                h.get::<Category>(key.as_str())?
                    .ok_or_else(|| TodoError::not_found(CATEGORIES, key.as_str()))
            })
            .await
    }

    async fn insert(&self, category: &Category) -> TodoResult<Category> {
        let record = Category::new(
            category.category_id.clone(),
            TextRules::category_name(&category.category_name)?,
        );

        let stored = self
            .client
            .run(CATEGORIES, AccessMode::ReadWrite, move |h| {
                let existing: Vec<Category> = h.get_all()?;
                ensure_unique_name(&existing, &record.category_name, None)?;
                h.insert(record.category_id.as_str(), &record)?;
                Ok(record)
            })
            .await?;

        debug!(category_id = %stored.category_id, name = %stored.category_name, "Inserted category");
        Ok(stored)
    }

    async fn update(&self, category: &Category) -> TodoResult<Category> {
        let record = Category::new(
            category.category_id.clone(),
            TextRules::category_name(&category.category_name)?,
        );

        let stored = self
            .client
            .run(CATEGORIES, AccessMode::ReadWrite, move |h| {
                let existing: Vec<Category> = h.get_all()?;
                if !existing.iter().any(|c| c.category_id == record.category_id) {
                    return Err(TodoError::not_found(
                        CATEGORIES,
                        record.category_id.as_str(),
                    ));
                }
                ensure_unique_name(
                    &existing,
                    &record.category_name,
                    Some(&record.category_id),
                )?;
                h.replace(record.category_id.as_str(), &record)?;
                Ok(record)
            })
            .await?;

        debug!(category_id = %stored.category_id, name = %stored.category_name, "Renamed category");
        Ok(stored)
    }

    async fn delete(&self, category_id: &CategoryId) -> TodoResult<()> {
        let key = category_id.clone();
        let removed = self
            .client
            .run(CATEGORIES, AccessMode::ReadWrite, move |h| {
                h.delete(key.as_str())
            })
            .await?;

        debug!(category_id = %category_id, removed, "Deleted category");
        Ok(())
    }
}

use super::{TaskStore, required_id};
use crate::error::AppError;
use crate::model::{Category, Tag};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub color: String,
    pub icon: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDraft {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TagUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
}

// Categories and tags never cascade into tasks: removing one leaves the
// referencing ids dangling.
impl TaskStore {
    pub fn add_category(&mut self, draft: CategoryDraft) -> Result<Category, AppError> {
        let id = slug_id(&draft.name)?;
        if self.categories.iter().any(|category| category.id == id) {
            return Err(AppError::conflict(
                "a category with this name already exists",
            ));
        }

        let category = Category {
            id,
            name: draft.name.trim().to_string(),
            color: draft.color,
            icon: draft.icon,
        };
        debug!(category_id = %category.id, "category added");
        self.categories.push(category.clone());
        Ok(category)
    }

    pub fn update_category(
        &mut self,
        id: &str,
        update: CategoryUpdate,
    ) -> Result<Category, AppError> {
        let id = required_id(id, "category id")?;
        let category = self
            .categories
            .iter_mut()
            .find(|category| category.id == id)
            .ok_or_else(|| AppError::not_found(format!("category '{id}' not found")))?;

        if let Some(name) = update.name {
            category.name = name;
        }
        if let Some(color) = update.color {
            category.color = color;
        }
        if let Some(icon) = update.icon {
            category.icon = icon;
        }

        Ok(category.clone())
    }

    pub fn delete_category(&mut self, id: &str) -> Result<Category, AppError> {
        let id = required_id(id, "category id")?;
        let index = self
            .categories
            .iter()
            .position(|category| category.id == id)
            .ok_or_else(|| AppError::not_found(format!("category '{id}' not found")))?;

        debug!(category_id = %id, "category deleted");
        Ok(self.categories.remove(index))
    }

    pub fn add_tag(&mut self, draft: TagDraft) -> Result<Tag, AppError> {
        let id = slug_id(&draft.name)?;
        if self.tags.iter().any(|tag| tag.id == id) {
            return Err(AppError::conflict("a tag with this name already exists"));
        }

        let tag = Tag {
            id,
            name: draft.name.trim().to_string(),
            color: draft.color,
        };
        debug!(tag_id = %tag.id, "tag added");
        self.tags.push(tag.clone());
        Ok(tag)
    }

    pub fn update_tag(&mut self, id: &str, update: TagUpdate) -> Result<Tag, AppError> {
        let id = required_id(id, "tag id")?;
        let tag = self
            .tags
            .iter_mut()
            .find(|tag| tag.id == id)
            .ok_or_else(|| AppError::not_found(format!("tag '{id}' not found")))?;

        if let Some(name) = update.name {
            tag.name = name;
        }
        if let Some(color) = update.color {
            tag.color = color;
        }

        Ok(tag.clone())
    }

    pub fn delete_tag(&mut self, id: &str) -> Result<Tag, AppError> {
        let id = required_id(id, "tag id")?;
        let index = self
            .tags
            .iter()
            .position(|tag| tag.id == id)
            .ok_or_else(|| AppError::not_found(format!("tag '{id}' not found")))?;

        debug!(tag_id = %id, "tag deleted");
        Ok(self.tags.remove(index))
    }
}

/// `"Side Projects"` becomes `"side-projects"`.
fn slug_id(name: &str) -> Result<String, AppError> {
    let slug = name
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        return Err(AppError::invalid_input("name is required"));
    }
    Ok(slug)
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use serde::Serialize;
use thiserror::Error;

use crate::entity::generation;
use crate::models::shared::escape_like;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history store failed: {0}")]
    Database(#[from] DbErr),
}

/// Fields of a history entry supplied by the pipeline.
#[derive(Debug, Clone)]
pub struct NewGeneration {
    pub prompt: String,
    pub original_url: Option<String>,
    pub generated_url: String,
    pub user: String,
}

/// A persisted history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRecord {
    pub id: i32,
    pub prompt: String,
    pub original_url: Option<String>,
    pub generated_url: String,
    pub user: String,
    pub created_at: DateTime<Utc>,
}

impl From<generation::Model> for GenerationRecord {
    fn from(m: generation::Model) -> Self {
        Self {
            id: m.id,
            prompt: m.prompt,
            original_url: m.original_url,
            generated_url: m.generated_url,
            user: m.user,
            created_at: m.created_at,
        }
    }
}

/// Criteria for a history query. Every field is optional; bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    /// Case-insensitive substring of the prompt.
    pub prompt_contains: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub user: Option<String>,
}

impl HistoryFilter {
    fn prompt_term(&self) -> Option<String> {
        self.prompt_contains
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }

    /// Whether `record` satisfies every criterion. Mirrors `select` for the
    /// in-memory history used in tests.
    #[cfg(test)]
    pub(crate) fn matches(&self, record: &GenerationRecord) -> bool {
        self.prompt_term()
            .is_none_or(|t| record.prompt.to_lowercase().contains(&t))
            && self.created_from.is_none_or(|from| record.created_at >= from)
            && self.created_to.is_none_or(|to| record.created_at <= to)
            && self.user.as_ref().is_none_or(|u| &record.user == u)
    }
}

/// One page of history, newest first.
#[derive(Debug, Clone)]
pub struct HistoryPage {
    pub rows: Vec<GenerationRecord>,
    /// Matching rows across all pages.
    pub total: u64,
}

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    async fn insert(&self, new: NewGeneration) -> Result<GenerationRecord, HistoryError>;

    /// Return page `page` (1-based) of `page_size` rows matching `filter`,
    /// ordered by creation time descending.
    async fn query(
        &self,
        filter: &HistoryFilter,
        page: u64,
        page_size: u64,
    ) -> Result<HistoryPage, HistoryError>;
}

/// History backed by the `generation` table.
#[derive(Clone)]
pub struct SeaOrmHistory {
    db: DatabaseConnection,
}

impl SeaOrmHistory {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn select(filter: &HistoryFilter) -> Select<generation::Entity> {
        let mut select = generation::Entity::find();

        if let Some(term) = filter.prompt_term() {
            let term = escape_like(&term);
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(generation::Column::Prompt)))
                    .like(LikeExpr::new(format!("%{}%", term)).escape('\\')),
            );
        }
        if let Some(from) = filter.created_from {
            select = select.filter(generation::Column::CreatedAt.gte(from));
        }
        if let Some(to) = filter.created_to {
            select = select.filter(generation::Column::CreatedAt.lte(to));
        }
        if let Some(ref user) = filter.user {
            select = select.filter(generation::Column::User.eq(user.as_str()));
        }
        select
    }
}

#[async_trait]
impl HistoryRepository for SeaOrmHistory {
    async fn insert(&self, new: NewGeneration) -> Result<GenerationRecord, HistoryError> {
        let row = generation::ActiveModel {
            prompt: Set(new.prompt),
            original_url: Set(new.original_url),
            generated_url: Set(new.generated_url),
            user: Set(new.user),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let model = row.insert(&self.db).await?;
        Ok(model.into())
    }

    async fn query(
        &self,
        filter: &HistoryFilter,
        page: u64,
        page_size: u64,
    ) -> Result<HistoryPage, HistoryError> {
        let page = Ord::max(page, 1);
        let page_size = Ord::max(page_size, 1);
        let select = Self::select(filter);

        let total = select
            .clone()
            .paginate(&self.db, page_size)
            .num_items()
            .await?;

        let rows = select
            .order_by_desc(generation::Column::CreatedAt)
            .order_by_desc(generation::Column::Id)
            .offset(Some((page - 1) * page_size))
            .limit(Some(page_size))
            .all(&self.db)
            .await?
            .into_iter()
            .map(GenerationRecord::from)
            .collect();

        Ok(HistoryPage { rows, total })
    }
}

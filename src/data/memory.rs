use crate::domain::models::{Expense, sort_newest_first};
use crate::domain::repository::ExpenseRepository;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

#[derive(Clone)]
pub struct InMemoryExpenseRepository {
    storage: Arc<RwLock<HashMap<String, Expense>>>,
}

impl InMemoryExpenseRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryExpenseRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExpenseRepository for InMemoryExpenseRepository {
    #[instrument(
        skip(self, expense),
        fields(expense_id = %expense.id, owner_id = %expense.owner_id)
    )]
    async fn insert(&self, expense: Expense) -> Result<()> {
        let mut storage = self.storage.write().await;
        storage.insert(expense.id.clone(), expense);
        debug!("Expense inserted");
        Ok(())
    }

    async fn find_for_owner(&self, owner_id: &str, id: &str) -> Result<Option<Expense>> {
        let storage = self.storage.read().await;
        Ok(storage
            .get(id)
            .filter(|expense| expense.owner_id == owner_id)
            .cloned())
    }

    #[instrument(skip(self))]
    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Expense>> {
        let storage = self.storage.read().await;
        let mut expenses: Vec<Expense> = storage
            .values()
            .filter(|expense| expense.owner_id == owner_id)
            .cloned()
            .collect();
        sort_newest_first(&mut expenses);
        trace!(count = expenses.len(), "Listed expenses");
        Ok(expenses)
    }

    async fn replace(&self, expense: Expense) -> Result<bool> {
        let mut storage = self.storage.write().await;
        match storage.get_mut(&expense.id) {
            Some(existing) if existing.owner_id == expense.owner_id => {
                *existing = expense;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    #[instrument(skip(self))]
    async fn delete_for_owner(&self, owner_id: &str, id: &str) -> Result<bool> {
        let mut storage = self.storage.write().await;
        let owned = storage
            .get(id)
            .is_some_and(|expense| expense.owner_id == owner_id);
        if owned {
            storage.remove(id);
            debug!("Expense removed");
        }
        Ok(owned)
    }
}

use crate::domain::error::DomainError;
use crate::domain::models::{
    CreateExpense, Expense, ExpenseQuery, ExpenseSummary, UpdateExpense,
};
use crate::domain::repository::ExpenseRepository;
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Expense operations. Every method takes the owner id of the
/// authenticated caller and never touches records owned by anyone else.
pub struct ExpenseService<R: ExpenseRepository> {
    repository: Arc<R>,
}

impl<R: ExpenseRepository> ExpenseService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, query))]
    pub async fn list_expenses(
        &self,
        owner_id: &str,
        query: &ExpenseQuery,
    ) -> Result<Vec<Expense>> {
        let expenses: Vec<Expense> = self
            .repository
            .list_for_owner(owner_id)
            .await?
            .into_iter()
            .filter(|expense| query.matches(expense))
            .collect();
        debug!(count = expenses.len(), "Expenses listed");
        Ok(expenses)
    }

    pub async fn get_expense(&self, owner_id: &str, id: &str) -> Result<Expense> {
        self.repository
            .find_for_owner(owner_id, id)
            .await?
            .ok_or_else(|| not_found(id).into())
    }

    #[instrument(skip(self, req))]
    pub async fn create_expense(&self, owner_id: &str, req: CreateExpense) -> Result<Expense> {
        let draft = req.validate()?;
        let now = Utc::now();
        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            amount: draft.amount,
            category: draft.category,
            date: draft.date,
            description: draft.description,
            created_at: now,
            updated_at: now,
        };
        self.repository.insert(expense.clone()).await?;
        info!(expense_id = %expense.id, amount = expense.amount, "Expense created");
        Ok(expense)
    }

    #[instrument(skip(self, req))]
    pub async fn update_expense(
        &self,
        owner_id: &str,
        id: &str,
        req: UpdateExpense,
    ) -> Result<Expense> {
        let changes = req.validate()?;
        let mut expense = self.get_expense(owner_id, id).await?;
        expense.apply(changes, Utc::now());

        // The record may have been deleted in between.
        if !self.repository.replace(expense.clone()).await? {
            return Err(not_found(id).into());
        }
        info!("Expense updated");
        Ok(expense)
    }

    #[instrument(skip(self))]
    pub async fn delete_expense(&self, owner_id: &str, id: &str) -> Result<()> {
        if !self.repository.delete_for_owner(owner_id, id).await? {
            return Err(not_found(id).into());
        }
        info!("Expense deleted");
        Ok(())
    }

    pub async fn summarize(&self, owner_id: &str) -> Result<ExpenseSummary> {
        let expenses = self.repository.list_for_owner(owner_id).await?;
        Ok(ExpenseSummary::from_expenses(&expenses))
    }
}

fn not_found(id: &str) -> DomainError {
    DomainError::NotFound(format!("Expense not found: {}", id))
}

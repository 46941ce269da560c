use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::error::{DomainError, FieldError};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Expense {
    pub id: String,
    pub owner_id: String,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    pub fn apply(&mut self, changes: ExpenseChanges, now: DateTime<Utc>) {
        if let Some(amount) = changes.amount {
            self.amount = amount;
        }
        if let Some(category) = changes.category {
            self.category = category;
        }
        if let Some(date) = changes.date {
            self.date = date;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        self.updated_at = now;
    }
}

/// Request body for a new expense. Fields are loosely typed so every problem
/// can be reported per field instead of as one deserialization failure.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateExpense {
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A create request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    pub description: String,
}

impl CreateExpense {
    pub fn validate(self) -> Result<ExpenseDraft, DomainError> {
        let mut errors = Vec::new();

        let amount = match &self.amount {
            Some(raw) => parse_amount(raw).map_err(|e| errors.push(e)).ok(),
            None => {
                errors.push(FieldError::new("amount", "amount is required"));
                None
            }
        };
        let category = match self.category.as_deref() {
            Some(raw) => parse_category(raw).map_err(|e| errors.push(e)).ok(),
            None => {
                errors.push(FieldError::new("category", "category is required"));
                None
            }
        };
        let date = match self.date.as_deref() {
            Some(raw) => parse_date(raw).map_err(|e| errors.push(e)).ok(),
            None => {
                errors.push(FieldError::new("date", "date is required"));
                None
            }
        };

        match (amount, category, date) {
            (Some(amount), Some(category), Some(date)) if errors.is_empty() => Ok(ExpenseDraft {
                amount,
                category,
                date,
                description: self.description.map(|d| d.trim().to_string()).unwrap_or_default(),
            }),
            _ => Err(DomainError::InvalidFields(errors)),
        }
    }
}

/// Partial update body. Absent (or null) fields are left unchanged.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateExpense {
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseChanges {
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
}

impl UpdateExpense {
    pub fn validate(self) -> Result<ExpenseChanges, DomainError> {
        let mut errors = Vec::new();

        let amount = match self.amount.as_ref().filter(|v| !v.is_null()) {
            Some(raw) => parse_amount(raw).map_err(|e| errors.push(e)).ok(),
            None => None,
        };
        let category = match self.category.as_deref() {
            Some(raw) => parse_category(raw).map_err(|e| errors.push(e)).ok(),
            None => None,
        };
        let date = match self.date.as_deref() {
            Some(raw) => parse_date(raw).map_err(|e| errors.push(e)).ok(),
            None => None,
        };

        if !errors.is_empty() {
            return Err(DomainError::InvalidFields(errors));
        }

        Ok(ExpenseChanges {
            amount,
            category,
            date,
            description: self.description.map(|d| d.trim().to_string()),
        })
    }
}

/// Query-string filters for the expense list.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ExpenseQuery {
    pub category: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ExpenseQuery {
    pub fn matches(&self, expense: &Expense) -> bool {
        if let Some(category) = self.category.as_deref().map(str::trim) {
            if !category.is_empty() && !expense.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if self.from.is_some_and(|from| expense.date < from) {
            return false;
        }
        if self.to.is_some_and(|to| expense.date > to) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExpenseSummary {
    pub count: usize,
    pub total: f64,
    pub by_category: BTreeMap<String, f64>,
}

impl ExpenseSummary {
    pub fn from_expenses(expenses: &[Expense]) -> Self {
        let mut summary = Self::default();
        for expense in expenses {
            summary.count += 1;
            summary.total += expense.amount;
            *summary
                .by_category
                .entry(expense.category.clone())
                .or_insert(0.0) += expense.amount;
        }
        summary
    }
}

/// Newest first; records on the same date keep creation order, newest first.
pub fn sort_newest_first(expenses: &mut [Expense]) {
    expenses.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

fn parse_amount(raw: &Value) -> Result<f64, FieldError> {
    let amount = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| FieldError::new("amount", "amount must be a number"))?;

    if !amount.is_finite() {
        return Err(FieldError::new("amount", "amount must be a finite number"));
    }
    if amount < 0.0 {
        return Err(FieldError::new("amount", "amount must not be negative"));
    }
    Ok(amount)
}

fn parse_category(raw: &str) -> Result<String, FieldError> {
    let category = raw.trim();
    if category.is_empty() {
        return Err(FieldError::new("category", "category must not be empty"));
    }
    Ok(category.to_string())
}

fn parse_date(raw: &str) -> Result<NaiveDate, FieldError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| FieldError::new("date", "date must be YYYY-MM-DD or an RFC 3339 timestamp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create(body: Value) -> CreateExpense {
        serde_json::from_value(body).unwrap()
    }

    fn field_names(err: DomainError) -> Vec<String> {
        match err {
            DomainError::InvalidFields(fields) => fields.into_iter().map(|f| f.field).collect(),
            other => panic!("expected field errors, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_accepts_complete_expense() {
        let draft = create(json!({
            "amount": 42.5,
            "category": " food ",
            "date": "2024-01-01",
            "description": "lunch"
        }))
        .validate()
        .unwrap();

        assert_eq!(draft.amount, 42.5);
        assert_eq!(draft.category, "food");
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(draft.description, "lunch");
    }

    #[test]
    fn test_validate_accepts_zero_amount() {
        let draft = create(json!({"amount": 0, "category": "misc", "date": "2024-02-29"}))
            .validate()
            .unwrap();
        assert_eq!(draft.amount, 0.0);
        assert_eq!(draft.description, "");
    }

    #[test]
    fn test_validate_rejects_negative_amount() {
        let err = create(json!({"amount": -0.01, "category": "food", "date": "2024-01-01"}))
            .validate()
            .unwrap_err();
        assert_eq!(field_names(err), vec!["amount"]);
    }

    #[test]
    fn test_validate_accepts_numeric_string_amount() {
        let draft = create(json!({"amount": "12.75", "category": "travel", "date": "2024-03-01"}))
            .validate()
            .unwrap();
        assert_eq!(draft.amount, 12.75);
    }

    #[test]
    fn test_validate_rejects_non_numeric_amount() {
        let err = create(json!({"amount": "lots", "category": "food", "date": "2024-01-01"}))
            .validate()
            .unwrap_err();
        assert_eq!(field_names(err), vec!["amount"]);
    }

    #[test]
    fn test_validate_reports_all_missing_fields() {
        let err = create(json!({})).validate().unwrap_err();
        assert_eq!(field_names(err), vec!["amount", "category", "date"]);
    }

    #[test]
    fn test_validate_rejects_blank_category_and_bad_date() {
        let err = create(json!({"amount": 1, "category": "   ", "date": "2024-13-45"}))
            .validate()
            .unwrap_err();
        assert_eq!(field_names(err), vec!["category", "date"]);
    }

    #[test]
    fn test_validate_accepts_rfc3339_date() {
        let draft = create(json!({
            "amount": 3,
            "category": "coffee",
            "date": "2024-05-06T08:30:00Z"
        }))
        .validate()
        .unwrap();
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2024, 5, 6).unwrap());
    }

    #[test]
    fn test_update_validate_ignores_absent_fields() {
        let changes: UpdateExpense =
            serde_json::from_value(json!({"category": "rent", "amount": null})).unwrap();
        let changes = changes.validate().unwrap();
        assert_eq!(changes.category.as_deref(), Some("rent"));
        assert!(changes.amount.is_none());
        assert!(changes.date.is_none());
    }

    #[test]
    fn test_update_validate_rejects_negative_amount() {
        let changes: UpdateExpense = serde_json::from_value(json!({"amount": -5})).unwrap();
        assert_eq!(field_names(changes.validate().unwrap_err()), vec!["amount"]);
    }

    fn expense(id: &str, date: (i32, u32, u32), category: &str, amount: f64) -> Expense {
        let now = Utc::now();
        Expense {
            id: id.to_string(),
            owner_id: "owner".to_string(),
            amount,
            category: category.to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            description: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_sort_newest_first_orders_by_date_then_creation() {
        let mut older = expense("a", (2024, 1, 1), "food", 1.0);
        let mut same_day_first = expense("b", (2024, 3, 1), "food", 1.0);
        let mut same_day_second = expense("c", (2024, 3, 1), "food", 1.0);
        let base = Utc::now();
        older.created_at = base;
        same_day_first.created_at = base + chrono::Duration::seconds(1);
        same_day_second.created_at = base + chrono::Duration::seconds(2);

        let mut list = vec![older, same_day_first, same_day_second];
        sort_newest_first(&mut list);

        let ids: Vec<_> = list.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_query_filters_by_category_and_range() {
        let query = ExpenseQuery {
            category: Some("FOOD".to_string()),
            from: NaiveDate::from_ymd_opt(2024, 1, 1),
            to: NaiveDate::from_ymd_opt(2024, 1, 31),
        };

        assert!(query.matches(&expense("a", (2024, 1, 1), "food", 1.0)));
        assert!(query.matches(&expense("b", (2024, 1, 31), "Food", 1.0)));
        assert!(!query.matches(&expense("c", (2024, 2, 1), "food", 1.0)));
        assert!(!query.matches(&expense("d", (2024, 1, 15), "rent", 1.0)));
    }

    #[test]
    fn test_summary_totals_by_category() {
        let list = vec![
            expense("a", (2024, 1, 1), "food", 10.0),
            expense("b", (2024, 1, 2), "food", 2.5),
            expense("c", (2024, 1, 3), "rent", 500.0),
        ];

        let summary = ExpenseSummary::from_expenses(&list);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.total, 512.5);
        assert_eq!(summary.by_category["food"], 12.5);
        assert_eq!(summary.by_category["rent"], 500.0);
    }
}

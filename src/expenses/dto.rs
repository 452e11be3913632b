use crate::expenses::repo::{ExpenseBill, ExpenseCategory};
use serde::{Deserialize, Serialize};
use time::serde::rfc3339;
use time::OffsetDateTime;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCategoryRequest {
    pub circle_id: i64,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
}

impl From<&ExpenseCategory> for CategoryResponse {
    fn from(category: &ExpenseCategory) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
        }
    }
}

/// `amount` is in cents; clients render the decimal point.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBillRequest {
    pub circle_id: i64,
    pub amount: i64,
    pub description: String,
    #[serde(default)]
    pub category_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillActionRequest {
    pub id: i64,
    pub circle_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillResponse {
    pub id: i64,
    pub amount: i64,
    pub description: String,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    #[serde(with = "rfc3339")]
    pub created_on: OffsetDateTime,
}

impl From<&ExpenseBill> for BillResponse {
    fn from(bill: &ExpenseBill) -> Self {
        Self {
            id: bill.id,
            amount: bill.amount_cents,
            description: bill.description.clone(),
            category_id: bill.category_id,
            category_name: bill.category_name.clone(),
            created_on: bill.created_on,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedResponse {
    pub removed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_bill_request_accepts_camel_case_without_category() {
        let request: AddBillRequest = serde_json::from_str(
            r#"{"circleId": 4, "amount": 1250, "description": "groceries"}"#,
        )
        .unwrap();

        assert_eq!(request.circle_id, 4);
        assert_eq!(request.amount, 1250);
        assert!(request.category_id.is_none());
    }

    #[test]
    fn bill_response_uses_camel_case_keys() {
        let bill = ExpenseBill {
            id: 9,
            circle_id: 4,
            category_id: Some(2),
            category_name: Some("food".into()),
            amount_cents: 1250,
            description: "groceries".into(),
            created_by: 7,
            created_on: OffsetDateTime::now_utc(),
        };

        let json = serde_json::to_value(BillResponse::from(&bill)).unwrap();
        assert_eq!(json["amount"], 1250);
        assert_eq!(json["categoryName"], "food");
        assert!(json["createdOn"].is_string());
    }
}

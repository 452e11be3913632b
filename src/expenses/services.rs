use crate::auth::repo_types::User;
use crate::circles::authz;
use crate::circles::services::{require_admin, require_member};
use crate::error::ApiError;
use crate::expenses::dto::{
    AddBillRequest, AddCategoryRequest, BillActionRequest, BillResponse, CategoryResponse,
    RemovedResponse,
};
use crate::expenses::repo;
use crate::state::AppState;
use tracing::info;

pub async fn add_category(
    state: &AppState,
    user: &User,
    request: AddCategoryRequest,
) -> Result<CategoryResponse, ApiError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation(vec![
            "category name must not be blank".into(),
        ]));
    }
    require_member(state, user.id, request.circle_id).await?;

    let category = repo::add_category(&state.db, request.circle_id, name, user.id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::Conflict("category already exists for this circle".into()))?;

    info!(category_id = category.id, circle_id = category.circle_id, "expense category added");
    Ok(CategoryResponse::from(&category))
}

pub async fn categories(
    state: &AppState,
    user: &User,
    circle_id: i64,
) -> Result<Vec<CategoryResponse>, ApiError> {
    require_member(state, user.id, circle_id).await?;
    let categories = repo::list_categories(&state.db, circle_id)
        .await
        .map_err(ApiError::internal)?;
    Ok(categories.iter().map(CategoryResponse::from).collect())
}

pub async fn add_bill(
    state: &AppState,
    user: &User,
    request: AddBillRequest,
) -> Result<BillResponse, ApiError> {
    let mut problems = Vec::new();
    if request.amount <= 0 {
        problems.push("amount must be a positive number of cents".to_string());
    }
    if request.description.trim().is_empty() {
        problems.push("description must not be blank".to_string());
    }
    if !problems.is_empty() {
        return Err(ApiError::Validation(problems));
    }
    require_member(state, user.id, request.circle_id).await?;

    // The category is resolved up front so a bill can never point into
    // another circle's category list.
    if let Some(category_id) = request.category_id {
        let category = repo::find_category(&state.db, category_id)
            .await
            .map_err(ApiError::internal)?
            .ok_or_else(|| ApiError::NotFound("category not found".into()))?;
        if category.circle_id != request.circle_id {
            return Err(ApiError::NotFound("category not found".into()));
        }
    }

    let bill = repo::add_bill(
        &state.db,
        request.circle_id,
        request.category_id,
        request.amount,
        request.description.trim(),
        user.id,
    )
    .await
    .map_err(ApiError::internal)?;

    info!(bill_id = bill.id, circle_id = bill.circle_id, "expense bill added");
    Ok(BillResponse::from(&bill))
}

pub async fn bills_for_circle(
    state: &AppState,
    user: &User,
    circle_id: i64,
) -> Result<Vec<BillResponse>, ApiError> {
    require_member(state, user.id, circle_id).await?;
    let bills = repo::list_bills(&state.db, circle_id)
        .await
        .map_err(ApiError::internal)?;
    Ok(bills.iter().map(BillResponse::from).collect())
}

/// Soft-remove a bill; the creator may always remove their own bill,
/// anyone else needs admin standing.
pub async fn remove_bill(
    state: &AppState,
    user: &User,
    request: BillActionRequest,
) -> Result<RemovedResponse, ApiError> {
    let bill = repo::find_bill(&state.db, request.id)
        .await
        .map_err(ApiError::internal)?
        .filter(|b| b.circle_id == request.circle_id)
        .ok_or_else(|| ApiError::NotFound("bill not found".into()))?;

    if authz::removal_needs_admin(bill.created_by, user.id) {
        require_admin(state, user.id, bill.circle_id).await?;
    } else {
        require_member(state, user.id, bill.circle_id).await?;
    }

    let removed = repo::remove_bill(&state.db, bill.id, bill.circle_id, user.id)
        .await
        .map_err(ApiError::internal)?;
    if !removed {
        return Err(ApiError::NotFound("bill not found".into()));
    }
    Ok(RemovedResponse { removed })
}

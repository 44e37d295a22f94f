use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};

use stockroom_core::ItemId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/lowstock", get(low_stock_items))
        .route("/items/highstock", get(high_stock_items))
        .route("/items/categories", get(list_categories))
        .route("/items/report", get(stock_report))
        .route("/items/by-name/:name", get(get_item_by_name))
        .route(
            "/items/:id",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/items/:id/quantity", patch(adjust_quantity))
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ListItemsQuery>,
) -> axum::response::Response {
    match services.items.items_by_category(query.category.as_deref()).await {
        Ok(items) => Json(items).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_item_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.items.get_item(id).await {
        Ok(item) => Json(item).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_item_by_name(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
) -> axum::response::Response {
    match services.items.get_item_by_name(&name).await {
        Ok(item) => Json(item).into_response(),
        Err(stockroom_infra::ServiceError::NotFound) => errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("item with name '{name}' not found"),
        ),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateItemRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let id = ItemId::new(body.item_id);
    let fields = body.into_fields();

    match services.items.create_item(id, fields).await {
        Ok(item) => (
            StatusCode::CREATED,
            [(header::LOCATION, format!("/items/{}", item.item_id))],
            Json(item),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateItemRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let id = match errors::parse_item_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let fields = match body.into_fields() {
        Ok(fields) => fields,
        Err(field) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                format!("{field} is required"),
            );
        }
    };

    match services.items.update_item(id, fields).await {
        Ok(item) => Json(serde_json::json!({
            "message": "item updated",
            "item": item,
        }))
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn adjust_quantity(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::AdjustQuantityRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let id = match errors::parse_item_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.items.adjust_quantity(id, body.quantity).await {
        Ok(item) => Json(item).into_response(),
        Err(e) => errors::quantity_error_to_response(id, e),
    }
}

pub async fn low_stock_items(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.items.low_stock_items().await {
        Ok(items) => Json(items).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn high_stock_items(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.items.high_stock_items().await {
        Ok(items) => Json(items).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.items.categories().await {
        Ok(categories) => Json(categories).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn stock_report(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ReportQuery>,
) -> axum::response::Response {
    let kind = match query.kind() {
        Ok(kind) => kind,
        Err(e) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_report_kind", e.detail());
        }
    };

    match services.items.stock_report(kind).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_item_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.items.delete_item(id).await {
        Ok(true) => Json(serde_json::json!({
            "message": format!("item with id {id} deleted"),
        }))
        .into_response(),
        Ok(false) => errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("item with id {id} not found"),
        ),
        Err(e) => errors::service_error_to_response(e),
    }
}

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::{
        admin::{ActionResponse, MarkSoldRequest},
        product::{ProductFields, ProductUpload, ProductView},
    },
    error::AppError,
    routes::admin::admin_only,
    services::{product_service, upload_service::ImageUpload},
    state::SharedState,
};

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const IMAGE_FIELD: &str = "image";

/// Catalog management and lifecycle transitions; admin only.
pub fn router(state: SharedState) -> Router<SharedState> {
    admin_only(
        state,
        Router::new()
            .route("/api/products", get(list_products).post(create_product))
            .route("/api/products/{id}", put(update_product).delete(delete_product))
            .route("/api/products/{id}/current", post(set_current))
            .route("/api/products/{id}/live", post(set_current))
            .route("/api/products/{id}/sold", post(mark_sold))
            .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
    )
}

/// Every product, newest first, fully disclosed.
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "products",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by /admin/login")),
    responses((status = 200, description = "Catalog", body = [ProductView]))
)]
pub async fn list_products(State(state): State<SharedState>) -> Json<Vec<ProductView>> {
    Json(product_service::list_products(&state).await)
}

/// Add a product. The image part is required.
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "products",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by /admin/login")),
    request_body(content = ProductUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Product created", body = ProductView),
        (status = 400, description = "Missing field or image")
    )
)]
pub async fn create_product(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ProductView>), AppError> {
    let (fields, image) = read_product_form(multipart).await?;
    let product = product_service::create_product(&state, fields, image).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Edit a product; the image is only replaced when one is sent.
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "products",
    params(
        ("X-Admin-Token" = String, Header, description = "Admin token issued by /admin/login"),
        ("id" = Uuid, Path, description = "Product identifier")
    ),
    request_body(content = ProductUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Product updated", body = ProductView),
        (status = 404, description = "Unknown product")
    )
)]
pub async fn update_product(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ProductView>, AppError> {
    let (fields, image) = read_product_form(multipart).await?;
    Ok(Json(
        product_service::update_product(&state, id, fields, image).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "products",
    params(
        ("X-Admin-Token" = String, Header, description = "Admin token issued by /admin/login"),
        ("id" = Uuid, Path, description = "Product identifier")
    ),
    responses(
        (status = 200, description = "Product deleted", body = ActionResponse),
        (status = 404, description = "Unknown product")
    )
)]
pub async fn delete_product(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionResponse>, AppError> {
    product_service::delete_product(&state, id).await?;
    Ok(Json(ActionResponse::new("Product deleted successfully")))
}

/// Open a product for bidding. Also served as `/api/products/{id}/live`.
#[utoipa::path(
    post,
    path = "/api/products/{id}/current",
    tag = "products",
    params(
        ("X-Admin-Token" = String, Header, description = "Admin token issued by /admin/login"),
        ("id" = Uuid, Path, description = "Product identifier")
    ),
    responses(
        (status = 200, description = "Product is live", body = ProductView),
        (status = 404, description = "Unknown product")
    )
)]
pub async fn set_current(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductView>, AppError> {
    Ok(Json(product_service::set_current(&state, id).await?))
}

/// Close the sale and reward the winner.
#[utoipa::path(
    post,
    path = "/api/products/{id}/sold",
    tag = "products",
    params(
        ("X-Admin-Token" = String, Header, description = "Admin token issued by /admin/login"),
        ("id" = Uuid, Path, description = "Product identifier")
    ),
    request_body = MarkSoldRequest,
    responses(
        (status = 200, description = "Product sold", body = ProductView),
        (status = 404, description = "Unknown product or team")
    )
)]
pub async fn mark_sold(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<MarkSoldRequest>>,
) -> Result<Json<ProductView>, AppError> {
    Ok(Json(
        product_service::mark_sold(&state, id, &payload.winner_team).await?,
    ))
}

/// Split a product form into its text fields and the optional image part.
/// An empty file part counts as no image.
async fn read_product_form(
    mut multipart: Multipart,
) -> Result<(ProductFields, Option<ImageUpload>), AppError> {
    let mut fields = ProductFields::default();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(format!("invalid multipart body: {err}")))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        if name == IMAGE_FIELD {
            let file_name = field.file_name().unwrap_or(IMAGE_FIELD).to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|err| AppError::BadRequest(format!("invalid image part: {err}")))?;
            if !bytes.is_empty() {
                image = Some(ImageUpload {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
        } else {
            let value = field
                .text()
                .await
                .map_err(|err| AppError::BadRequest(format!("invalid `{name}` part: {err}")))?;
            fields.set(&name, value);
        }
    }

    Ok((fields, image))
}

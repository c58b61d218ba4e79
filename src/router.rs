use crate::{
    catalog::{ClassLevel, MaterialRequest, MaterialType},
    error::HubError,
    page::PageView,
    state::Hub,
    student::{StudentForm, SuggestionForm, SuggestionRecord},
};
use axum::{
    extract::{Path, State},
    http::{header, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, get_service, post},
    Form, Router,
};
use axum_macros::debug_handler;
use tower_http::{cors::CorsLayer, services::ServeFile, trace::TraceLayer};
use tracing::info;

pub fn router(hub: Hub) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST]);

    Router::new()
        .route("/", get(index))
        .route("/materials", post(submit_details))
        .route("/materials/:class/:material/:file", get(download))
        .route("/suggestions", post(submit_suggestion))
        .route(
            "/sidebar-image",
            get_service(ServeFile::new(&hub.sidebar_image)),
        )
        .with_state(hub)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[debug_handler]
pub async fn index(State(hub): State<Hub>) -> Result<Html<String>, HubError> {
    Ok(Html(hub.render(&PageView::default())?))
}

#[debug_handler]
pub async fn submit_details(
    State(hub): State<Hub>,
    Form(form): Form<StudentForm>,
) -> Result<Response, HubError> {
    let request = form.request();

    let record = match form.validate() {
        Ok(record) => record,
        Err(HubError::InvalidInput(message)) => {
            info!("Rejected student form: {message}");
            let page = hub.render(&PageView::rejected(message))?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response());
        }
        Err(e) => return Err(e),
    };

    info!(
        "Listing {} for {}",
        request.material.label(),
        request.class.label()
    );

    let cards = hub.material_cards(request).await?;

    hub.downloads.append(&record.row()).await?;

    let page = hub.render(&PageView::materials(&record.name, &request, cards))?;
    Ok(Html(page).into_response())
}

#[debug_handler]
pub async fn submit_suggestion(
    State(hub): State<Hub>,
    Form(form): Form<SuggestionForm>,
) -> Result<Html<String>, HubError> {
    let record = SuggestionRecord::from(form);

    hub.suggestions.append(&record.row()).await?;

    Ok(Html(hub.render(&PageView::suggestion_received())?))
}

#[debug_handler]
pub async fn download(
    State(hub): State<Hub>,
    Path((class, material, file_name)): Path<(ClassLevel, MaterialType, String)>,
) -> Result<Response, HubError> {
    let request = MaterialRequest::new(class, material);

    let Some(path) = hub.catalog.locate(&request, &file_name)? else {
        return Err(HubError::NotFound(file_name));
    };

    info!("Sending {}", path.display());

    let content = tokio::fs::read(&path).await?;
    let disposition = format!(
        "attachment; filename*=UTF-8''{}",
        urlencoding::encode(&file_name)
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        content,
    )
        .into_response())
}

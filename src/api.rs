use actix_web::{http::header, web, HttpResponse};
use serde::Deserialize;

use crate::error::{Result, TodoError};
use crate::server::AppState;
use crate::trace::TraceId;
use crate::ui::CreateForm;

#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    pub id: u64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteTodoRequest {
    pub id: u64,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/get").route(web::get().to(get_todos)))
        .service(web::resource("/create").route(web::post().to(create_todo)))
        .service(web::resource("/update").route(web::post().to(update_todo)))
        .service(web::resource("/delete").route(web::post().to(delete_todo)));
}

async fn get_todos(state: web::Data<AppState>) -> Result<HttpResponse> {
    let todos = state.store.list().await?;
    Ok(HttpResponse::Ok().json(todos))
}

async fn create_todo(
    state: web::Data<AppState>,
    trace_id: TraceId,
    form: web::Form<CreateForm>,
) -> Result<HttpResponse> {
    if form.description.trim().is_empty() {
        return Err(TodoError::invalid("Description cannot be empty"));
    }
    let todo = state.store.add(form.into_inner().description).await?;
    tracing::info!(id = todo.id, trace_id = trace_id.as_str(), "New to-do added");

    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/get"))
        .finish())
}

/// Applies whichever of `description` and `status` are present and non-empty
/// in one store step, then answers the whole list.
async fn update_todo(
    state: web::Data<AppState>,
    payload: web::Json<UpdateTodoRequest>,
) -> Result<HttpResponse> {
    let request = payload.into_inner();
    let description = request.description.filter(|d| !d.is_empty());
    let status = request.status.filter(|s| !s.is_empty());
    if description.is_none() && status.is_none() {
        return Err(TodoError::invalid("No valid update provided"));
    }

    let todos = state.store.update(request.id, description, status).await?;
    Ok(HttpResponse::Ok().json(todos))
}

async fn delete_todo(
    state: web::Data<AppState>,
    payload: web::Json<DeleteTodoRequest>,
) -> Result<HttpResponse> {
    state.store.delete(payload.id).await?;
    let todos = state.store.list().await?;
    Ok(HttpResponse::Ok().json(todos))
}

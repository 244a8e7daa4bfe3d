//! HTML form front end: one page listing the items plus form endpoints that
//! redirect back to it.

use std::path::{Component, Path, PathBuf};

use actix_web::{http::header, web, HttpResponse};
use serde::Deserialize;
use tracing::{error, warn};

use crate::error::{Result, TodoError};
use crate::model::TodoItem;
use crate::server::AppState;

const ABOUT: &str = "This is a simple to-do application. Manage your tasks easily and track their progress!";

#[derive(Debug, Deserialize)]
pub struct CreateForm {
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateForm {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub id: String,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(index)))
        .service(
            web::resource("/create")
                .route(web::post().to(create))
                .default_service(web::to(redirect_home)),
        )
        .service(
            web::resource("/update")
                .route(web::post().to(update))
                .default_service(web::to(redirect_home)),
        )
        .service(
            web::resource("/delete")
                .route(web::post().to(delete))
                .default_service(web::to(redirect_home)),
        )
        .service(web::resource("/static/{path:.*}").route(web::get().to(static_file)));
}

async fn index(state: web::Data<AppState>) -> Result<HttpResponse> {
    let todos = state.store.list().await?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(render_page(&todos)))
}

async fn create(state: web::Data<AppState>, form: web::Form<CreateForm>) -> Result<HttpResponse> {
    if form.description.trim().is_empty() {
        return Err(TodoError::invalid("Description is required"));
    }
    state.store.add(form.into_inner().description).await?;
    Ok(redirect_home().await)
}

async fn update(state: web::Data<AppState>, form: web::Form<UpdateForm>) -> Result<HttpResponse> {
    let form = form.into_inner();
    let id = parse_id(&form.id)?;
    let description = non_empty(form.description);
    let status = non_empty(form.status);
    if description.is_none() && status.is_none() {
        return Err(TodoError::invalid("ID and description are required"));
    }

    skip_missing(state.store.update(id, description, status).await.map(drop))?;
    Ok(redirect_home().await)
}

async fn delete(state: web::Data<AppState>, form: web::Form<DeleteForm>) -> Result<HttpResponse> {
    let id = parse_id(&form.id)?;
    skip_missing(state.store.delete(id).await.map(drop))?;
    Ok(redirect_home().await)
}

async fn redirect_home() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/"))
        .finish()
}

async fn static_file(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let Some(path) = resolve_static(&state.static_dir, &path) else {
        return HttpResponse::NotFound().finish();
    };

    match tokio::fs::read(&path).await {
        Ok(content) => {
            let mime_type = mime_guess::from_path(&path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime_type.as_ref())
                .body(content)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => HttpResponse::NotFound().finish(),
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to read static file");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Joins `requested` onto `root`, refusing anything that could leave it.
fn resolve_static(root: &Path, requested: &str) -> Option<PathBuf> {
    let requested = Path::new(requested);
    let safe = requested
        .components()
        .all(|component| matches!(component, Component::Normal(_)));
    if !safe || requested.as_os_str().is_empty() {
        return None;
    }
    Some(root.join(requested))
}

fn parse_id(raw: &str) -> Result<u64> {
    if raw.trim().is_empty() {
        return Err(TodoError::invalid("ID is required"));
    }
    raw.trim()
        .parse()
        .map_err(|_| TodoError::invalid("Invalid ID format"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// The page still redirects when the item vanished in the meantime.
fn skip_missing(result: Result<()>) -> Result<()> {
    match result {
        Err(TodoError::NotFound(id)) => {
            warn!(id, "Form referenced a missing to-do");
            Ok(())
        }
        other => other,
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn render_item(todo: &TodoItem) -> String {
    format!(
        r#"      <li>
        <span class="id">{id}</span>
        <span class="description">{description}</span>
        <span class="status">{status}</span>
        <form method="post" action="/update">
          <input type="hidden" name="id" value="{id}">
          <input type="text" name="description" value="{description}">
          <input type="text" name="status" value="{status}">
          <button type="submit">Update</button>
        </form>
        <form method="post" action="/delete">
          <input type="hidden" name="id" value="{id}">
          <button type="submit">Delete</button>
        </form>
      </li>
"#,
        id = todo.id,
        description = escape(&todo.description),
        status = escape(&todo.status),
    )
}

pub fn render_page(todos: &[TodoItem]) -> String {
    let items = if todos.is_empty() {
        "      <li class=\"empty\">Nothing to do yet.</li>\n".to_string()
    } else {
        todos.iter().map(render_item).collect()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>To-do list</title>
    <link rel="stylesheet" href="/static/style.css">
  </head>
  <body>
    <h1>To-do list</h1>
    <form method="post" action="/create">
      <input type="text" name="description" placeholder="What needs doing?">
      <button type="submit">Add</button>
    </form>
    <ul class="todos">
{items}    </ul>
    <h2>About</h2>
    <p>{about}</p>
  </body>
</html>
"#,
        about = ABOUT,
    )
}

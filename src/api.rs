use actix_web::{delete, get, post, put, web, HttpResponse};
use mongodb::bson::oid::ObjectId;

use crate::db::TodoRepository;
use crate::dto::{NewTodoDto, Response, TodoDto, TodoListDto};
use crate::error::ApiError;

#[get("/")]
pub async fn get_todos(db: web::Data<dyn TodoRepository>) -> Result<HttpResponse, ApiError> {
    let todos = db.get_todos().await.map_err(|err| {
        tracing::error!(error = %err, "could not fetch todos");
        ApiError::Fetch
    })?;
    Ok(HttpResponse::Ok().json(TodoListDto::from(todos)))
}

#[post("/")]
pub async fn create_todo(
    db: web::Data<dyn TodoRepository>,
    new_todo: web::Json<NewTodoDto>,
) -> Result<HttpResponse, ApiError> {
    let text = match new_todo.into_inner().text {
        Some(text) if !text.is_empty() => text,
        _ => return Err(ApiError::MissingText),
    };

    let todo = db.create_todo(text).await.map_err(|err| {
        tracing::error!(error = %err, "could not create todo");
        ApiError::Create
    })?;
    Ok(HttpResponse::Created().json(TodoDto::from(&todo)))
}

/// Marks a todo as completed. A missing todo is reported like any other
/// storage failure.
#[put("/todo/{id}")]
pub async fn update_todo(
    db: web::Data<dyn TodoRepository>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&id)?;
    let todo = match db.complete_todo(id).await {
        Ok(Some(todo)) => todo,
        Ok(None) => {
            tracing::warn!(%id, "no todo to update");
            return Err(ApiError::Update);
        }
        Err(err) => {
            tracing::error!(%id, error = %err, "could not update todo");
            return Err(ApiError::Update);
        }
    };
    Ok(HttpResponse::Ok().json(TodoDto::from(&todo)))
}

#[delete("/todo/{id}")]
pub async fn delete_todo(
    db: web::Data<dyn TodoRepository>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&id)?;
    let deleted = db.delete_todo(id).await.map_err(|err| {
        tracing::error!(%id, error = %err, "could not delete todo");
        ApiError::Delete
    })?;
    if deleted == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(HttpResponse::Ok().json(Response::new("Todo deleted successfully")))
}

fn parse_id(id: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id).map_err(|_| ApiError::InvalidId)
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(get_todos)
        .service(create_todo)
        .service(
            web::scope("/api")
                .service(update_todo)
                .service(delete_todo),
        );
}

use serde::{Deserialize, Serialize};

use crate::model::Todo;

/// Wire representation of a todo: the `ObjectId` travels as a hex string.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct TodoDto {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

/// Body accepted by `POST /`. Anything besides `text` is ignored.
#[derive(Debug, Deserialize)]
pub struct NewTodoDto {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodoListDto {
    pub data: Vec<TodoDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&Todo> for TodoDto {
    fn from(value: &Todo) -> Self {
        Self {
            id: value.id.map(|id| id.to_hex()).unwrap_or_default(),
            text: value.text.clone(),
            completed: value.completed,
        }
    }
}

impl From<Vec<Todo>> for TodoListDto {
    fn from(value: Vec<Todo>) -> Self {
        Self {
            data: value.iter().map(TodoDto::from).collect(),
        }
    }
}

impl Response {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A todo as it is stored in the `todos` collection.
///
/// `id` is `None` until MongoDB assigns one on insert, so it is left out of
/// the serialized document rather than written as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub completed: bool,
    pub text: String,
}

impl Todo {
    pub fn new(text: String) -> Self {
        Self {
            id: None,
            completed: false,
            text,
        }
    }
}

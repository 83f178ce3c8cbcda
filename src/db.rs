use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::{self, doc, oid::ObjectId, RawDocument};
use mongodb::options::{ClientOptions, FindOneAndUpdateOptions, ReturnDocument};
use mongodb::{Client, Collection};

use crate::config::Config;
use crate::error::StoreError;
use crate::model::Todo;
use crate::APP_NAME;

/// Upper bound for every single storage call, measured from its start.
pub const OPERATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Storage operations the handlers depend on.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Every stored todo in storage order. Documents that fail to decode are
    /// skipped.
    async fn get_todos(&self) -> Result<Vec<Todo>, StoreError>;

    /// Inserts a new, not yet completed todo and returns it with its id.
    async fn create_todo(&self, text: String) -> Result<Todo, StoreError>;

    /// Sets `completed` and returns the updated todo, or `None` when no
    /// document has this id.
    async fn complete_todo(&self, id: ObjectId) -> Result<Option<Todo>, StoreError>;

    /// Number of deleted documents, zero or one.
    async fn delete_todo(&self, id: ObjectId) -> Result<u64, StoreError>;
}

#[derive(Clone, Debug)]
pub struct MongoDbClient {
    client: Client,
    database: String,
    collection: String,
}

impl MongoDbClient {
    /// Connects and pings the server once. Fails if MongoDB cannot be reached
    /// within [`OPERATION_TIMEOUT`].
    pub async fn new(config: &Config) -> Result<Self, StoreError> {
        let mut client_options = ClientOptions::parse(&config.mongodb_uri).await?;
        client_options.app_name = Some(APP_NAME.to_string());
        let client = Client::with_options(client_options)?;

        let mongodb_client = Self {
            client,
            database: config.database.clone(),
            collection: config.collection.clone(),
        };
        mongodb_client.ping().await?;
        Ok(mongodb_client)
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        with_timeout(OPERATION_TIMEOUT, async {
            self.client
                .database("admin")
                .run_command(doc! { "ping": 1 }, None)
                .await?;
            Ok::<_, StoreError>(())
        })
        .await
    }

    /// Closes the driver's connection pools.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }

    fn get_todos_collection(&self) -> Collection<Todo> {
        let db = self.client.database(&self.database);
        db.collection(&self.collection)
    }
}

#[async_trait]
impl TodoRepository for MongoDbClient {
    async fn get_todos(&self) -> Result<Vec<Todo>, StoreError> {
        with_timeout(OPERATION_TIMEOUT, async {
            let mut cursor = self.get_todos_collection().find(None, None).await?;
            let mut todos = Vec::new();
            while cursor.advance().await? {
                if let Some(todo) = decode_todo(cursor.current()) {
                    todos.push(todo);
                }
            }
            Ok::<_, StoreError>(todos)
        })
        .await
    }

    async fn create_todo(&self, text: String) -> Result<Todo, StoreError> {
        let mut todo = Todo::new(text);
        let result = with_timeout(OPERATION_TIMEOUT, async {
            Ok::<_, StoreError>(self.get_todos_collection().insert_one(&todo, None).await?)
        })
        .await?;

        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StoreError::UnexpectedId(result.inserted_id.clone()))?;
        todo.id = Some(id);
        tracing::debug!(%id, "created todo");
        Ok(todo)
    }

    async fn complete_todo(&self, id: ObjectId) -> Result<Option<Todo>, StoreError> {
        let filter = doc! { "_id": id };
        let update = doc! { "$set": { "completed": true } };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        with_timeout(OPERATION_TIMEOUT, async move {
            Ok::<_, StoreError>(self
                .get_todos_collection()
                .find_one_and_update(filter, update, options)
                .await?)
        })
        .await
    }

    async fn delete_todo(&self, id: ObjectId) -> Result<u64, StoreError> {
        let filter = doc! { "_id": id };
        let result = with_timeout(OPERATION_TIMEOUT, async move {
            Ok::<_, StoreError>(self.get_todos_collection().delete_one(filter, None).await?)
        })
        .await?;
        Ok(result.deleted_count)
    }
}

/// Decodes one stored document, logging and dropping it when it does not fit
/// the model.
fn decode_todo(document: &RawDocument) -> Option<Todo> {
    match bson::from_slice(document.as_bytes()) {
        Ok(todo) => Some(todo),
        Err(err) => {
            let id = document.get_object_id("_id").ok();
            tracing::warn!(?id, error = %err, "skipping malformed todo document");
            None
        }
    }
}

/// Runs a storage call, failing with [`StoreError::Timeout`] once `limit`
/// has elapsed. Nothing is retried.
pub async fn with_timeout<T, F>(limit: Duration, operation: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(limit, operation)
        .await
        .map_err(|_| StoreError::Timeout(limit))?
}

mod api;
mod config;
mod db;
mod dto;
mod error;
mod model;
mod telemetry;

use std::sync::Arc;

use actix_web::{get, web, App, HttpResponse, HttpServer, Responder, Result};
use anyhow::Context;
use tracing_actix_web::TracingLogger;

use crate::config::Config;
use crate::db::{MongoDbClient, TodoRepository};
use crate::dto::Response;

pub(crate) const APP_NAME: &str = "rust-actix-web-mongodb-todo";

#[get("/health")]
async fn healthcheck() -> impl Responder {
    HttpResponse::Ok().json(Response::new("Everything is working fine"))
}

async fn not_found() -> Result<HttpResponse> {
    Ok(HttpResponse::NotFound().json(Response::new("Resource not found")))
}

/// Connects to MongoDB and wraps the client as handler data. The bare client
/// is handed back so it can be shut down once the server stops.
async fn setup(config: &Config) -> anyhow::Result<(MongoDbClient, web::Data<dyn TodoRepository>)> {
    let client = MongoDbClient::new(config)
        .await
        .context("cannot connect to MongoDB")?;
    let repository: Arc<dyn TodoRepository> = Arc::new(client.clone());
    Ok((client, web::Data::from(repository)))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_subscriber(APP_NAME)?;

    let config = Config::from_env()?;
    let (client, data) = setup(&config).await?;
    tracing::info!(
        database = %config.database,
        collection = %config.collection,
        "connected to MongoDB"
    );

    tracing::info!(host = %config.host, port = config.port, "starting server");
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(data.clone())
            .service(healthcheck)
            .configure(api::config)
            .default_service(web::route().to(not_found))
    })
    .bind((config.host.clone(), config.port))
    .with_context(|| format!("cannot listen on {}:{}", config.host, config.port))?
    .run();

    let result = server.await;
    client.shutdown().await;
    result.context("server stopped with an error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use mongodb::bson::doc;
    use testcontainers::core::{IntoContainerPort, WaitFor};
    use testcontainers::runners::AsyncRunner;
    use testcontainers::GenericImage;

    use crate::dto::{TodoDto, TodoListDto};

    #[actix_web::test]
    async fn test_healthcheck() {
        let app = test::init_service(App::new().service(healthcheck)).await;
        let req = TestRequest::default().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(StatusCode::OK, resp.status());
        let body: Response = test::read_body_json(resp).await;
        assert_eq!(body.message, "Everything is working fine");
    }

    #[actix_web::test]
    async fn test_not_found() {
        let app = test::init_service(
            App::new()
                .service(healthcheck)
                .default_service(web::route().to(not_found)),
        )
        .await;
        let req = TestRequest::default().uri("/nope").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(StatusCode::NOT_FOUND, resp.status());
        let body: Response = test::read_body_json(resp).await;
        assert_eq!(body.message, "Resource not found");
    }

    #[actix_web::test]
    #[ignore = "starts a MongoDB container; needs a Docker daemon"]
    async fn test_todos_against_mongodb() {
        let node = GenericImage::new("mongo", "6.0.7")
            .with_exposed_port(27017.tcp())
            .with_wait_for(WaitFor::message_on_stdout("Waiting for connections"))
            .start()
            .await
            .unwrap();
        let port = node.get_host_port_ipv4(27017.tcp()).await.unwrap();
        let uri = format!("mongodb://localhost:{port}");

        let (client, data) = setup(&Config::new_mongodb_uri(uri.clone())).await.unwrap();
        let app = test::init_service(App::new().app_data(data).configure(api::config)).await;

        let req = TestRequest::post()
            .uri("/")
            .set_json(serde_json::json!({ "text": "buy milk" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(StatusCode::CREATED, resp.status());
        let created: TodoDto = test::read_body_json(resp).await;
        assert_eq!(created.text, "buy milk");
        assert!(!created.completed);

        // A document the model cannot decode must not break listing.
        let raw = mongodb::Client::with_uri_str(&uri).await.unwrap();
        raw.database("todos")
            .collection::<mongodb::bson::Document>("todos")
            .insert_one(doc! { "text": 5 }, None)
            .await
            .unwrap();

        let resp = test::call_service(&app, TestRequest::get().uri("/").to_request()).await;
        assert_eq!(StatusCode::OK, resp.status());
        let list: TodoListDto = test::read_body_json(resp).await;
        assert_eq!(list.data, vec![created]);

        let id = &list.data[0].id;
        let req = TestRequest::put().uri(&format!("/api/todo/{id}")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(StatusCode::OK, resp.status());
        let updated: TodoDto = test::read_body_json(resp).await;
        assert!(updated.completed);

        let req = TestRequest::put()
            .uri(&format!("/api/todo/{}", mongodb::bson::oid::ObjectId::new()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, resp.status());

        let req = TestRequest::delete().uri(&format!("/api/todo/{id}")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(StatusCode::OK, resp.status());

        let req = TestRequest::delete().uri(&format!("/api/todo/{id}")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(StatusCode::NOT_FOUND, resp.status());

        client.shutdown().await;
    }
}

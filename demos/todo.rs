//! A todo list API with CORS enabled.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example todo
//!
//! Try:
//!   curl http://localhost:5000/todos
//!   curl http://localhost:5000/todos/1.json
//!   curl -X POST http://localhost:5000/todos \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"read"}'
//!   curl -X PATCH http://localhost:5000/todos/1 -d 'name=rest'
//!   curl -X DELETE http://localhost:5000/todos/2
//!   curl -X OPTIONS http://localhost:5000/todos \
//!        -H 'origin: http://localhost:8000' \
//!        -H 'access-control-request-method: POST' -i

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;
use restkit::{
    Api, CollectionOptions, Config, Error, FormatSuffix, HttpError, Request, Resource, Server,
};
use serde_json::{Map, Value, json};

static TODOS: Lazy<Mutex<BTreeMap<u64, Value>>> = Lazy::new(|| {
    Mutex::new(BTreeMap::from([
        (1, json!({"id": 1, "name": "work"})),
        (2, json!({"id": 2, "name": "sleep"})),
    ]))
});

fn todos() -> MutexGuard<'static, BTreeMap<u64, Value>> {
    TODOS.lock().unwrap_or_else(PoisonError::into_inner)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config { middleware_classes: vec!["cors".into()], ..Config::from_env()? };
    restkit::logging::init(&config);

    let mut api = Api::new(config)?;
    api.register(
        Resource::new("todos")
            .index(index)
            .create(create)
            .read(read)
            .replace(replace)
            .update(update)
            .delete(delete),
        CollectionOptions {
            pk: "{pk:int}".into(),
            format_suffix: FormatSuffix::Optional,
            ..Default::default()
        },
    )?;

    Server::bind("0.0.0.0:5000")?.serve(api).await
}

/// The request body with `id` set, or 400 if the body is not an object.
fn item(req: &Request, id: u64) -> Result<Value, HttpError> {
    let Value::Object(fields) = req.data() else {
        return Err(HttpError::bad_request("Invalid request data."));
    };
    let mut item = Map::from_iter([("id".to_owned(), json!(id))]);
    item.extend(fields.iter().filter(|(k, _)| *k != "id").map(|(k, v)| (k.clone(), v.clone())));
    Ok(Value::Object(item))
}

fn not_found(pk: u64) -> HttpError {
    HttpError::not_found(format!("Todo {pk} not found."))
}

// GET /todos
async fn index(_: Request) -> Value {
    Value::Array(todos().values().cloned().collect())
}

// POST /todos → 201
async fn create(req: Request) -> Result<(Value, u16), HttpError> {
    let mut todos = todos();
    let id = todos.keys().next_back().map_or(1, |max| max + 1);
    todos.insert(id, item(&req, id)?);
    Ok((json!({"id": id}), 201))
}

// GET /todos/{pk}
async fn read(req: Request) -> Result<Value, HttpError> {
    let pk = req.param_as("pk")?;
    todos().get(&pk).cloned().ok_or_else(|| not_found(pk))
}

// PUT /todos/{pk} → 204
async fn replace(req: Request) -> Result<(Value, u16), HttpError> {
    let pk = req.param_as("pk")?;
    todos().insert(pk, item(&req, pk)?);
    Ok((json!(""), 204))
}

// PATCH /todos/{pk} → 204
async fn update(req: Request) -> Result<(Value, u16), HttpError> {
    let pk = req.param_as("pk")?;
    let patch = item(&req, pk)?;
    let mut todos = todos();
    let todo = todos.get_mut(&pk).ok_or_else(|| not_found(pk))?;
    if let (Value::Object(todo), Value::Object(patch)) = (todo, patch) {
        todo.extend(patch);
    }
    Ok((json!(""), 204))
}

// DELETE /todos/{pk} → 204
async fn delete(req: Request) -> Result<(Value, u16), HttpError> {
    let pk = req.param_as("pk")?;
    todos().remove(&pk).ok_or_else(|| not_found(pk))?;
    Ok((json!(""), 204))
}

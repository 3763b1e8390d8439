use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use restkit::testing::Client;
use restkit::{
    ActionMap, Api, CollectionOptions, Config, Error, HttpError, Method, Middleware, Registry,
    Reply, Request, Resource, Response, RouteOptions,
};
use serde_json::{Value, json};

async fn echo(req: Request) -> Value {
    req.data().clone()
}

async fn reject(_: Request) -> Result<Value, HttpError> {
    Err(HttpError::bad_request("Invalid request data."))
}

fn client(resource: Resource) -> Client {
    client_with(Config::default(), resource)
}

fn client_with(config: Config, resource: Resource) -> Client {
    let mut api = Api::new(config).unwrap();
    api.register(resource, CollectionOptions::default()).unwrap();
    Client::new(api)
}

#[tokio::test]
async fn read_only_resource_answers_patch_with_405() {
    let client = client(Resource::new("notes").read(echo));
    let res = client.patch("/notes/1").json(&json!({"x": 1})).send().await.unwrap();

    assert_eq!(res.status_code(), 405);
    assert_eq!(res.body(), br#"{"message":"Method not allowed."}"#);
    assert_eq!(res.header("content-type"), Some("application/json"));
}

#[tokio::test]
async fn bad_request_from_action_becomes_400() {
    let client = client(Resource::new("todos").create(reject));
    let res = client.post("/todos").json(&json!({"name": ""})).send().await.unwrap();

    assert_eq!(res.status_code(), 400);
    assert_eq!(res.body(), br#"{"message":"Invalid request data."}"#);
}

#[tokio::test]
async fn parsed_body_reaches_the_action() {
    let client = client(Resource::new("echo").create(echo).update(echo));

    let res = client.post("/echo").json(&json!({"hello": "world"})).send().await.unwrap();
    assert_eq!(res.json::<Value>().unwrap(), json!({"hello": "world"}));

    let res = client.patch("/echo/1").form(&[("hello", "form")]).send().await.unwrap();
    assert_eq!(res.json::<Value>().unwrap(), json!({"hello": "form"}));

    let res = client
        .post("/echo")
        .body("application/json; charset=utf-8", "[1,2]")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status_code(), 200);
}

#[tokio::test]
async fn empty_body_is_an_empty_object_whatever_the_content_type() {
    let client = client(Resource::new("echo").create(echo));
    let res = client.post("/echo").header("content-type", "text/csv").send().await.unwrap();
    assert_eq!(res.status_code(), 200);
    assert_eq!(res.body(), b"{}");
}

#[tokio::test]
async fn unknown_content_type_is_415() {
    let client = client(Resource::new("echo").create(echo));
    let res = client.post("/echo").body("text/csv", "a,b").send().await.unwrap();
    assert_eq!(res.status_code(), 415);
    assert_eq!(res.json::<Value>().unwrap()["message"], "Unsupported media type \"text/csv\" in request.");
}

#[tokio::test]
async fn malformed_json_is_400() {
    let client = client(Resource::new("echo").create(echo));
    let res = client.post("/echo").body("application/json", "{nope").send().await.unwrap();
    assert_eq!(res.status_code(), 400);
    assert_eq!(res.body(), br#"{"message":"JSON data is invalid"}"#);
}

#[tokio::test]
async fn status_and_headers_from_the_action_are_kept() {
    async fn create(_: Request) -> Response {
        Response::builder().status(201).header("location", "/todos/3").data(json!({"id": 3}))
    }
    async fn delete(_: Request) -> (Value, u16) {
        (json!(""), 204)
    }

    let client = client(Resource::new("todos").create(create).delete(delete));

    let res = client.post("/todos").send().await.unwrap();
    assert_eq!(res.status_line(), "201 Created");
    assert_eq!(res.header("location"), Some("/todos/3"));

    let res = client.delete("/todos/3").send().await.unwrap();
    assert_eq!(res.status_code(), 204);
    assert!(res.body().is_empty());
    assert!(res.header("content-type").is_none());
}

#[tokio::test]
async fn http_error_headers_reach_the_client() {
    async fn read(_: Request) -> Result<Value, HttpError> {
        Err(HttpError::new(restkit::ErrorKind::Unauthorized, "Token expired.")
            .with_header("www-authenticate", "Bearer"))
    }
    let client = client(Resource::new("me").read(read));
    let res = client.get("/me/1").send().await.unwrap();
    assert_eq!(res.status_code(), 401);
    assert_eq!(res.header("www-authenticate"), Some("Bearer"));
}

#[tokio::test]
async fn format_suffix_selects_renderer() {
    let mut api = Api::new(Config::default()).unwrap();
    api.register(
        Resource::new("todos").index(echo),
        CollectionOptions { format_suffix: restkit::FormatSuffix::Optional, ..Default::default() },
    )
    .unwrap();
    let client = Client::new(api);

    let res = client.get("/todos.json").send().await.unwrap();
    assert_eq!(res.status_code(), 200);
    assert_eq!(res.header("content-type"), Some("application/json"));

    let res = client.get("/todos.xml").send().await.unwrap();
    assert_eq!(res.status_code(), 404);
    assert_eq!(res.body(), br#"{"message":"Resource not found."}"#);
}

#[tokio::test]
async fn no_renderers_is_406() {
    let config = Config { renderer_classes: Vec::new(), ..Config::default() };
    let client = client_with(config, Resource::new("todos").index(echo));
    let res = client.get("/todos").send().await.unwrap();
    assert_eq!(res.status_code(), 406);
    assert_eq!(res.body(), br#"{"message":"Could not satisfy the request format."}"#);
}

#[tokio::test]
async fn unmapped_method_is_a_dispatch_error() {
    let mut api = Api::new(Config {
        action_map: ActionMap::new().with(Method::Get, "read"),
        ..Config::default()
    })
    .unwrap();
    api.add_route(Resource::new("things").read(echo), "/things", "things", Some(&[Method::Get, Method::Delete]), None)
        .unwrap();
    let client = Client::new(api);

    assert!(client.get("/things").send().await.is_ok());
    let err = client.delete("/things").send().await.unwrap_err();
    assert!(matches!(err, Error::UnmappedMethod(Method::Delete)));
}

#[tokio::test]
async fn missing_response_and_application_errors_propagate() {
    async fn nothing(_: Request) -> Option<Value> {
        None
    }
    async fn broken(_: Request) -> Result<Value, Error> {
        Err(Error::custom("database is down"))
    }

    let client = client(Resource::new("things").index(nothing).read(broken));
    assert!(matches!(client.get("/things").send().await, Err(Error::NoResponse)));
    let err = client.get("/things/1").send().await.unwrap_err();
    assert_eq!(err.to_string(), "database is down");
}

#[tokio::test]
async fn head_falls_back_to_get_only_when_enabled() {
    let resource = || Resource::new("todos").read(echo);

    let client = client(resource());
    let res = client.head("/todos/1").send().await.unwrap();
    assert_eq!(res.status_code(), 405);

    let client = client_with(Config { head_fallback_to_get: true, ..Config::default() }, resource());
    let res = client.head("/todos/1").send().await.unwrap();
    assert_eq!(res.status_code(), 200);
}

#[tokio::test]
async fn custom_action_names_via_overrides() {
    async fn search(req: Request) -> Value {
        json!({"q": req.arg("q")})
    }
    let mut api = Api::new(Config::default()).unwrap();
    api.route(
        Resource::new("search").action("search", search),
        RouteOptions {
            methods: Some(vec![Method::Get]),
            actions: Some(ActionMap::new().with(Method::Get, "search")),
            ..Default::default()
        },
    )
    .unwrap();
    let client = Client::new(api);

    let res = client.get("/search?q=rust").send().await.unwrap();
    assert_eq!(res.json::<Value>().unwrap(), json!({"q": "rust"}));
}

// ── Middleware ───────────────────────────────────────────────────────────────

type Log = Arc<Mutex<Vec<String>>>;

struct Recorder {
    name: &'static str,
    log: Log,
    stop: bool,
}

#[async_trait]
impl Middleware for Recorder {
    async fn process_request(&self, _: &mut Request) -> Result<Option<Reply>, Error> {
        self.log.lock().unwrap().push(format!("pre {}", self.name));
        Ok(self.stop.then(|| Reply::WithStatus(json!({"stopped_by": self.name}), 202)))
    }

    async fn process_response(&self, _: &Request, mut res: Response) -> Result<Response, Error> {
        self.log.lock().unwrap().push(format!("post {}", self.name));
        res.set_header(&format!("x-seen-{}", self.name.to_lowercase()), "1");
        Ok(res)
    }
}

fn recorded_api(log: &Log, stop_at: Option<&'static str>) -> Client {
    let registry = ["A", "B"].into_iter().fold(Registry::with_builtins(), |registry, name| {
        let log = log.clone();
        registry.middleware(name, move |_: &Config| Recorder { name, log: log.clone(), stop: stop_at == Some(name) })
    });
    let config = Config { middleware_classes: vec!["A".into(), "B".into()], ..Config::default() };

    let action_log = log.clone();
    let resource = Resource::new("items")
        .index(move |_: Request| {
            let log = action_log.clone();
            async move {
                log.lock().unwrap().push("action".to_owned());
                json!([])
            }
        })
        .middleware(Recorder { name: "C", log: log.clone(), stop: stop_at == Some("C") });

    let mut api = Api::with_registry(config, &registry).unwrap();
    api.register(resource, CollectionOptions::default()).unwrap();
    Client::new(api)
}

#[tokio::test]
async fn global_then_resource_middleware_wraps_the_action() {
    let log = Log::default();
    let client = recorded_api(&log, None);

    let res = client.get("/items").send().await.unwrap();
    assert_eq!(res.status_code(), 200);
    assert_eq!(
        *log.lock().unwrap(),
        ["pre A", "pre B", "pre C", "action", "post C", "post B", "post A"]
    );
}

#[tokio::test]
async fn short_circuit_skips_action_but_runs_every_post_hook() {
    let log = Log::default();
    let client = recorded_api(&log, Some("B"));

    let res = client.get("/items").send().await.unwrap();
    assert_eq!(res.status_code(), 202);
    assert_eq!(res.json::<Value>().unwrap(), json!({"stopped_by": "B"}));
    for name in ["a", "b", "c"] {
        assert_eq!(res.header(&format!("x-seen-{name}")), Some("1"));
    }
    assert_eq!(*log.lock().unwrap(), ["pre A", "pre B", "post C", "post B", "post A"]);
}

#[tokio::test]
async fn unknown_middleware_name_fails_at_startup() {
    let config = Config { middleware_classes: vec!["gzip".into()], ..Config::default() };
    assert!(matches!(Api::new(config), Err(Error::UnknownComponent { .. })));
}

use std::sync::Arc;
use waypost::{Dispatch, Error, HandlerChain, Lookup, Method, Request, ResponseWriter, Router, Routes};

fn send(router: &Router, method: &str, target: &str) -> (Dispatch, ResponseWriter) {
    let mut writer = ResponseWriter::new();
    let outcome = router.serve(Request::new(Method::from_wire(method), target), &mut writer);
    (outcome, writer)
}

#[test]
fn exact_match_property() {
    let mut router = Router::new();
    router
        .get("/users", |ctx| ctx.text(200, "list"))
        .post("/users", |ctx| ctx.text(201, "created"))
        .delete("/users/1", |ctx| ctx.text(204, ""));

    let registered = [("GET", "/users", 200), ("POST", "/users", 201), ("DELETE", "/users/1", 204)];
    for (method, path, status) in registered {
        let (outcome, res) = send(&router, method, path);
        assert_eq!(outcome, Dispatch::Handled, "{} {}", method, path);
        assert_eq!(res.status(), status);
    }

    for method in ["PUT", "PATCH", "HEAD", "OPTIONS"] {
        let (outcome, res) = send(&router, method, "/users");
        assert_eq!(outcome, Dispatch::MethodNotAllowed);
        assert_eq!(res.status(), 405);
    }

    for path in ["/users/", "/Users", "/users/2", "/", ""] {
        let (outcome, res) = send(&router, "GET", path);
        assert_eq!(outcome, Dispatch::NotFound, "{:?}", path);
        assert_eq!(res.status(), 404);
    }
}

#[test]
fn last_registration_wins() {
    let mut router = Router::new();
    router.get("/version", |ctx| ctx.text(200, "v1"));
    router.get("/version", |ctx| ctx.text(200, "v2"));

    let (_, res) = send(&router, "GET", "/version");
    assert_eq!(res.body_string(), "v2");
    assert_eq!(router.routes().len(), 1);
}

#[test]
fn lookup_is_idempotent() {
    let mut router = Router::new();
    router.get("/stable", |ctx| ctx.text(200, "same"));

    let first = match router.lookup(&Method::GET, "/stable") {
        Lookup::Matched(handler) => Arc::clone(handler),
        _ => panic!("expected a match"),
    };
    for _ in 0..3 {
        match router.lookup(&Method::GET, "/stable") {
            Lookup::Matched(handler) => assert!(Arc::ptr_eq(handler, &first)),
            _ => panic!("expected a match"),
        }
    }
}

#[test]
fn group_prefix_is_concatenated() {
    let mut router = Router::new();
    {
        let mut api = router.group("/api");
        assert_eq!(api.base_path(), "/api");
        api.get("/users", |ctx| ctx.text(200, "users"));
        api.get("health", |ctx| ctx.text(200, "no separator added"));
    }

    let (_, res) = send(&router, "GET", "/api/users");
    assert_eq!(res.body_string(), "users");
    let (_, res) = send(&router, "GET", "/apihealth");
    assert_eq!(res.body_string(), "no separator added");
    let (outcome, _) = send(&router, "GET", "/api/health");
    assert_eq!(outcome, Dispatch::NotFound);
}

#[test]
fn nested_groups_compose_prefixes() {
    let mut router = Router::new();
    {
        let mut api = router.group("/api");
        let mut v1 = api.group("/v1");
        assert_eq!(v1.base_path(), "/api/v1");
        v1.get("/items", |ctx| ctx.text(200, "v1 items"));
    }
    let (_, res) = send(&router, "GET", "/api/v1/items");
    assert_eq!(res.body_string(), "v1 items");
}

#[test]
fn group_registrations_land_in_one_flat_table() {
    let mut router = Router::new();
    router.get("/", |ctx| ctx.text(200, "root"));
    router.group("/a").get("/x", |ctx| ctx.text(200, "ax"));
    router.group("/b").post("/y", |ctx| ctx.text(200, "by"));

    let mut paths: Vec<&str> = router.routes().paths().collect();
    paths.sort();
    assert_eq!(paths, vec!["/", "/a/x", "/b/y"]);
}

#[test]
fn invalid_tokens_are_rejected_at_registration() {
    let mut router = Router::new();
    for token in ["get", "G3T", "", "GET-X"] {
        let chain = HandlerChain::from_handler(waypost::handler_fn(|ctx| ctx.text(200, "x")));
        let err = router.group("/g").try_handle(token, "/x", chain).unwrap_err();
        assert!(matches!(err, Error::InvalidMethod(_)), "{:?}", token);
        assert!(err.is_configuration());
    }
    assert!(router.routes().is_empty());
}

#[test]
#[should_panic(expected = "is not valid")]
fn group_handle_panics_on_invalid_token() {
    let mut router = Router::new();
    router
        .group("/api")
        .handle("G3T", "/x", waypost::handlers![|ctx| ctx.text(200, "x")]);
}

#[test]
#[should_panic(expected = "no handlers supplied for GET /empty")]
fn empty_handler_list_panics() {
    let mut router = Router::new();
    router.handle("GET", "/empty", HandlerChain::new());
}

#[test]
fn method_not_allowed_lists_registered_methods() {
    let mut router = Router::new();
    router
        .get("/doc", |ctx| ctx.text(200, "doc"))
        .put("/doc", |ctx| ctx.text(200, "doc"))
        .head("/doc", |ctx| {
            ctx.status(200);
        });
    let (_, res) = send(&router, "POST", "/doc");
    assert_eq!(res.header("Allow"), Some("GET, HEAD, PUT"));
    assert_eq!(res.header("Content-Type"), Some("application/json"));
}

#[test]
fn handler_that_writes_nothing_yields_empty_ok() {
    let mut router = Router::new();
    router.options("/quiet", |_ctx| {});
    let (outcome, res) = send(&router, "OPTIONS", "/quiet");
    assert_eq!(outcome, Dispatch::Handled);
    assert_eq!(res.status(), 200);
    assert!(res.body().is_empty());
}

#[test]
fn context_reads_forms_and_query() {
    let mut router = Router::new();
    router.patch("/profile", |ctx| {
        let name = ctx.form_value("name").unwrap_or("anonymous").to_string();
        let lang = ctx.form_value("lang").unwrap_or("en").to_string();
        ctx.json(200, &waypost::json!({ "name": name, "lang": lang }));
    });

    let request = Request::new(Method::PATCH, "/profile?lang=fr&name=ignored").with_body(waypost::Body::from_bytes(
        "application/x-www-form-urlencoded",
        b"name=Ada+Lovelace".to_vec(),
    ));
    let mut writer = ResponseWriter::new();
    router.serve(request, &mut writer);
    let body: waypost::Value = waypost::serde_json::from_slice(writer.body()).unwrap();
    assert_eq!(body, waypost::json!({ "name": "Ada Lovelace", "lang": "fr" }));
}

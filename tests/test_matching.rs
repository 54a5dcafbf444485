use std::{sync::Arc, thread};

use route_matcher::{
    fn_predicate, Attributes, Captures, ConfigError, MatchError, ParamValue, PredicateError,
    Rejection, RouteSpec, Verdict,
};
use serde::Deserialize;

fn attrs() -> Attributes {
    Attributes::new()
}

#[test]
fn recompiling_yields_identical_pattern() {
    let spec = RouteSpec::new("/blog/{year}/{slug}{/page}").with_wildcard("rest");

    let first = spec.compile().unwrap().as_str().to_owned();
    let second = spec.compile().unwrap().as_str().to_owned();
    let fresh = spec.clone().with_routable(true).compile().unwrap().as_str().to_owned();

    assert_eq!(first, second);
    assert_eq!(first, fresh);
}

#[test]
fn substituted_template_matches() {
    let spec = RouteSpec::new("/{lang}/users/{user}/posts/{post}.html");

    let values = [("lang", "en"), ("user", "ann"), ("post", "hello-world")];
    let path = values
        .iter()
        .fold(spec.path().to_owned(), |path, (name, value)| {
            path.replace(&format!("{{{}}}", name), value)
        });
    assert_eq!(path, "/en/users/ann/posts/hello-world.html");

    let attempt = spec.evaluate(&path, &attrs()).unwrap();
    assert!(attempt.is_match());
    for (name, value) in values {
        assert_eq!(attempt.params().get_str(name), Some(value));
    }
}

#[test]
fn optional_group_suffix_chain() {
    let spec = RouteSpec::new("/foo{/bar,baz}");

    let attempt = spec.evaluate("/foo", &attrs()).unwrap();
    assert!(attempt.is_match());
    assert!(attempt.params()["bar"].is_null());
    assert!(attempt.params()["baz"].is_null());

    let attempt = spec.evaluate("/foo/1", &attrs()).unwrap();
    assert!(attempt.is_match());
    assert_eq!(attempt.params().get_str("bar"), Some("1"));
    assert!(attempt.params()["baz"].is_null());

    let attempt = spec.evaluate("/foo/1/2", &attrs()).unwrap();
    assert!(attempt.is_match());
    assert_eq!(attempt.params().get_str("bar"), Some("1"));
    assert_eq!(attempt.params().get_str("baz"), Some("2"));

    let attempt = spec.evaluate("/foo/1/2/3", &attrs()).unwrap();
    assert!(!attempt.is_match());
    assert_eq!(attempt.debug(), ["not a regex match."]);
}

#[test]
fn leading_optional_group() {
    let spec = RouteSpec::new("{/controller,action}")
        .with_value("controller", "home")
        .with_value("action", "index");

    let params = spec.evaluate("/", &attrs()).unwrap().into_params();
    assert_eq!(params.get_str("controller"), Some("home"));
    assert_eq!(params.get_str("action"), Some("index"));

    let params = spec.evaluate("/blog/read", &attrs()).unwrap().into_params();
    assert_eq!(params.get_str("controller"), Some("blog"));
    assert_eq!(params.get_str("action"), Some("read"));

    assert!(!spec.is_match("//read", &attrs()).unwrap());
}

#[test]
fn wildcard_tail() {
    let spec = RouteSpec::new("/foo/{id}").with_wildcard("path");

    let attempt = spec.evaluate("/foo/5/a/b", &attrs()).unwrap();
    assert!(attempt.is_match());
    assert_eq!(attempt.params().get_str("id"), Some("5"));
    assert_eq!(
        attempt.params().get("path"),
        Some(&ParamValue::from(vec!["a", "b"]))
    );

    let attempt = spec.evaluate("/foo/5", &attrs()).unwrap();
    assert!(attempt.is_match());
    assert_eq!(attempt.params().get_seq("path"), Some(&[][..]));
}

#[test]
fn wildcard_tail_is_split_after_decoding() {
    let spec = RouteSpec::new("/files/").with_wildcard("path");

    let attempt = spec.evaluate("/files/a%2Fb", &attrs()).unwrap();
    assert_eq!(
        attempt.params().get("path"),
        Some(&ParamValue::from(vec!["a", "b"]))
    );

    let attempt = spec.evaluate("/files/x%2541", &attrs()).unwrap();
    assert_eq!(
        attempt.params().get("path"),
        Some(&ParamValue::from(vec!["xA"]))
    );
}

#[test]
fn secure_mismatch() {
    let spec = RouteSpec::new("/account").with_secure(true);

    let insecure = attrs().with_https(false).with_port(8080);
    let attempt = spec.evaluate("/account", &insecure).unwrap();
    assert!(!attempt.is_match());
    assert_eq!(attempt.debug(), ["not a secure match."]);
    assert!(attempt.params().is_empty());
}

#[test]
fn accept_negotiation() {
    let spec = RouteSpec::new("/page").with_accept("text/html");

    let accepts = |header: &str| {
        spec.evaluate("/page", &attrs().with_accept(header))
            .unwrap()
            .is_match()
    };

    assert!(accepts("text/html;q=0.8"));
    assert!(accepts("*/*"));
    assert!(!accepts("text/html;q=0.0"));
    assert!(accepts("text/html;q=0.00"));

    let attempt = spec
        .evaluate("/page", &attrs().with_accept("text/html;q=0.0"))
        .unwrap();
    assert_eq!(attempt.rejection(), Some(&Rejection::Accept));
    assert_eq!(attempt.debug(), ["not an accept match."]);
}

#[test]
fn empty_optional_capture_is_absent() {
    let spec = RouteSpec::new("/report{/format}").with_token("format", "[a-z]*");

    let params = spec.evaluate("/report/", &attrs()).unwrap().into_params();
    assert!(params["format"].is_null());
    assert_ne!(params.get("format"), Some(&ParamValue::from("")));
}

#[test]
fn percent_encoded_values_are_decoded() {
    let spec = RouteSpec::new("/file/{name}");

    let attempt = spec.evaluate("/file/a%2Fb", &attrs()).unwrap();
    assert!(attempt.is_match());
    assert_eq!(attempt.params().get_str("name"), Some("a/b"));
    // raw captures stay as matched
    assert_eq!(attempt.captures()["name"], "a%2Fb");
}

#[test]
fn full_pipeline() {
    let spec = RouteSpec::new("/api/{version}/orders/{id}")
        .with_name("order_detail")
        .with_token("version", "v[0-9]+")
        .with_token("id", r"\d+")
        .with_value("format", "json")
        .with_secure(true)
        .with_methods(["GET", "HEAD"])
        .with_accepts(["application/json", "text/html"])
        .with_server("HTTP_HOST", r"^api\.example\.com$")
        .with_predicate(fn_predicate(|attrs, _| attrs.get("HTTP_AUTHORIZATION").is_some()));

    let request = Attributes::new()
        .with_method("GET")
        .with_https(true)
        .with_accept("application/json")
        .with_var("HTTP_HOST", "api.example.com")
        .with_var("HTTP_AUTHORIZATION", "Bearer t0k3n");

    let attempt = spec.evaluate("/api/v2/orders/17", &request).unwrap();
    assert!(attempt.is_match(), "{:?}", attempt.debug());

    #[derive(Debug, Deserialize)]
    struct Order {
        version: String,
        id: u64,
        format: String,
        #[serde(rename = "HTTP_HOST")]
        host: String,
    }

    let order: Order = attempt.params().load().unwrap();
    assert_eq!(order.version, "v2");
    assert_eq!(order.id, 17);
    assert_eq!(order.format, "json");
    assert_eq!(order.host, "api.example.com");

    let anonymous = request
        .iter()
        .filter(|(name, _)| *name != "HTTP_AUTHORIZATION")
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect::<Attributes>();
    let attempt = spec.evaluate("/api/v2/orders/17", &anonymous).unwrap();
    assert_eq!(attempt.rejection(), Some(&Rejection::Custom));
}

#[test]
fn predicate_sees_snapshot_and_returns_captures() {
    let spec = RouteSpec::new("/tenant/{slug}").with_predicate(
        |attrs: &Attributes, captures: &Captures| -> Result<Verdict, PredicateError> {
            let tenant = match attrs.get("HTTP_X_TENANT") {
                Some(tenant) => tenant,
                None => return Ok(Verdict::fail()),
            };

            let mut captures = captures.clone();
            captures.insert("tenant".to_owned(), tenant.to_owned());
            Ok(Verdict::pass().with_captures(captures))
        },
    );

    let attempt = spec
        .evaluate("/tenant/acme", &attrs().with_var("HTTP_X_TENANT", "t-1"))
        .unwrap();
    assert!(attempt.is_match());
    assert_eq!(attempt.params().get_str("slug"), Some("acme"));
    assert_eq!(attempt.params().get_str("tenant"), Some("t-1"));

    let attempt = spec.evaluate("/tenant/acme", &attrs()).unwrap();
    assert_eq!(attempt.debug(), ["not a custom match."]);
}

#[test]
fn predicate_fault_propagates() {
    let spec = RouteSpec::new("/").with_predicate(
        |_: &Attributes, _: &Captures| -> Result<Verdict, PredicateError> {
            Err("backend unavailable".into())
        },
    );

    match spec.evaluate("/", &attrs()) {
        Err(MatchError::Predicate(err)) => assert_eq!(err.to_string(), "backend unavailable"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn malformed_template_is_config_error() {
    let spec = RouteSpec::new("/items{/}");

    assert!(matches!(
        spec.compile(),
        Err(ConfigError::EmptyOptionalGroup { .. })
    ));
    assert!(matches!(
        spec.evaluate("/items", &attrs()),
        Err(MatchError::Config(ConfigError::EmptyOptionalGroup { .. }))
    ));
}

#[test]
fn concurrent_evaluation() {
    let spec = Arc::new(
        RouteSpec::new("/items/{id}")
            .with_token("id", r"\d+")
            .with_method("GET"),
    );

    let handles = (0..8)
        .map(|n| {
            let spec = Arc::clone(&spec);
            thread::spawn(move || {
                let path = format!("/items/{}", n);
                let attempt = spec
                    .evaluate(&path, &Attributes::new().with_method("GET"))
                    .unwrap();
                attempt.params().get_str("id").map(str::to_owned)
            })
        })
        .collect::<Vec<_>>();

    for (n, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), Some(n.to_string()));
    }
}

#[cfg(feature = "http")]
#[test]
fn attributes_from_http_request() {
    let req = http::Request::get("https://example.com/blog/7")
        .header(http::header::ACCEPT, "text/html")
        .body(())
        .unwrap();
    let (parts, _) = req.into_parts();

    let spec = RouteSpec::new("/blog/{id}")
        .with_secure(true)
        .with_method("GET")
        .with_accept("text/html")
        .with_server("HTTP_ACCEPT", "html");

    let attempt = spec
        .evaluate(parts.uri.path(), &Attributes::from_request_parts(&parts))
        .unwrap();
    assert!(attempt.is_match(), "{:?}", attempt.debug());
    assert_eq!(attempt.params().get_str("id"), Some("7"));
}

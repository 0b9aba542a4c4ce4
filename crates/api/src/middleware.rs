use axum::extract::{Query, Request};
use axum::http::{Method, Uri};
use serde::Deserialize;

/// Query string of a form that asks for a different method (`?_method=PUT`).
#[derive(Debug, Deserialize)]
struct OverrideQuery {
    #[serde(rename = "_method")]
    method: Option<String>,
}

/// Rewrite `POST ...?_method=PUT|PATCH|DELETE` into the requested method.
///
/// Must run before routing, so it wraps the whole router rather than being added
/// with `Router::layer`. Only `POST` is eligible; any other override value is ignored.
pub fn method_override(mut req: Request) -> Request {
    if req.method() != Method::POST {
        return req;
    }

    if let Some(method) = override_from_uri(req.uri()) {
        tracing::debug!(%method, path = %req.uri().path(), "method override");
        *req.method_mut() = method;
    }

    req
}

fn override_from_uri(uri: &Uri) -> Option<Method> {
    // Percent-decoded, so `%5Fmethod=DELETE` counts too.
    let Query(query) = Query::<OverrideQuery>::try_from_uri(uri).ok()?;
    let value = query.method?;

    match value.to_ascii_uppercase().as_str() {
        "PUT" => Some(Method::PUT),
        "PATCH" => Some(Method::PATCH),
        "DELETE" => Some(Method::DELETE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(method: Method, uri: &str) -> Request {
        axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn post_with_override_becomes_put() {
        let req = method_override(request(Method::POST, "/products/1?_method=PUT"));
        assert_eq!(req.method(), Method::PUT);
        assert_eq!(req.uri().path(), "/products/1");
    }

    #[test]
    fn override_value_is_case_insensitive() {
        let req = method_override(request(Method::POST, "/products/1?x=1&_method=delete"));
        assert_eq!(req.method(), Method::DELETE);
    }

    #[test]
    fn encoded_override_key_and_value_are_decoded() {
        let req = method_override(request(Method::POST, "/products/1?%5Fmethod=DELETE"));
        assert_eq!(req.method(), Method::DELETE);

        let req = method_override(request(Method::POST, "/products/1?_method=%50UT"));
        assert_eq!(req.method(), Method::PUT);
    }

    #[test]
    fn only_post_is_overridden() {
        let req = method_override(request(Method::GET, "/products/1?_method=DELETE"));
        assert_eq!(req.method(), Method::GET);
    }

    #[test]
    fn unknown_or_missing_override_is_ignored() {
        for uri in ["/products", "/products?_method=GET", "/products?_method", "/products?method=PUT"] {
            let req = method_override(request(Method::POST, uri));
            assert_eq!(req.method(), Method::POST, "{uri}");
        }
    }
}

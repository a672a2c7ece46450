use axum::extract::Request;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use terreno_core::SessionIdentity;

pub const ROLE_HEADER: &str = "x-terreno-role";
pub const SUBJECT_HEADER: &str = "x-terreno-subject";

/// Attaches the caller's identity, as forwarded by the identity provider.
///
/// Missing headers leave the session anonymous; visibility then resolves to hidden.
pub async fn resolve_session_identity(mut request: Request, next: Next) -> Response {
    let identity = session_identity_from_headers(request.headers());
    request.extensions_mut().insert(identity);
    next.run(request).await
}

fn session_identity_from_headers(headers: &HeaderMap) -> SessionIdentity {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };

    SessionIdentity::new(header_value(SUBJECT_HEADER), header_value(ROLE_HEADER))
}

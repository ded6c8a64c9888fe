use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use vigia_core::UserIdentity;

use crate::error::ApiResult;
use crate::state::AppState;

/// Header carrying the operator's subject identifier.
pub const SUBJECT_HEADER: &str = "x-console-subject";
/// Header carrying the operator's display name.
pub const NAME_HEADER: &str = "x-console-name";
/// Header carrying the operator's console role.
pub const ROLE_HEADER: &str = "x-console-role";

/// Resolves the acting operator from console headers.
///
/// Real authentication is out of scope for this slice; the console frontend
/// supplies the identity it already holds, and missing headers fall back to
/// the development operator so local workflows keep working.
pub async fn resolve_identity(mut request: Request, next: Next) -> ApiResult<Response> {
    let headers = request.headers();
    let subject = header_or(headers, SUBJECT_HEADER, "dev-operator");
    let display_name = header_or(headers, NAME_HEADER, "Dev Operator");
    let role = header_or(headers, ROLE_HEADER, "operator");

    let identity = UserIdentity::new(subject, display_name, role);
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        let headers = request.headers();

        if let Some(fetch_site) = headers.get("sec-fetch-site") {
            if fetch_site == HeaderValue::from_static("cross-site") {
                return Err(
                    vigia_core::AppError::Unauthorized("cross-site request blocked".to_owned())
                        .into(),
                );
            }
        }

        let origin = headers
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let referer = headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        let allowed_origin = state.frontend_url;
        let origin_is_allowed = origin == allowed_origin;
        let referer_is_allowed = referer.starts_with(&allowed_origin);

        if !origin_is_allowed && !referer_is_allowed {
            return Err(
                vigia_core::AppError::Unauthorized("origin validation failed".to_owned()).into(),
            );
        }
    }

    Ok(next.run(request).await)
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

fn header_or(headers: &axum::http::HeaderMap, name: &str, fallback: &str) -> String {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(fallback)
        .to_owned()
}

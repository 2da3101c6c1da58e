use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;

use crate::api::rest::extract::RequestCtx;
use crate::api::rest::problem::{FieldError, Problem, ProblemResponse};
use crate::contract::model::EntityKind;
use crate::domain::error::DomainError;

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    ctx: &RequestCtx,
) -> Problem {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.example.com/{}", code))
        .with_code(code)
        .with_instance(ctx.instance.as_str());

    match &ctx.request_id {
        Some(id) => problem.with_request_id(id.as_str()),
        None => problem,
    }
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, ctx: &RequestCtx) -> ProblemResponse {
    let problem = match e {
        DomainError::NotFound { kind, id } => {
            let code = match kind {
                EntityKind::User => "USERS_NOT_FOUND",
                EntityKind::Project => "PROJECTS_NOT_FOUND",
            };
            from_parts(
                StatusCode::NOT_FOUND,
                code,
                &format!("{kind} not found"),
                format!("{kind} with id {id} was not found"),
                ctx,
            )
        }
        DomainError::Conflict { field, value } => from_parts(
            StatusCode::CONFLICT,
            "USERS_UNIQUE_CONFLICT",
            "Unique constraint violated",
            format!("{field} '{value}' is already in use"),
            ctx,
        )
        .with_errors(vec![FieldError::new(field, "already in use")]),
        DomainError::Validation { field, message } => from_parts(
            StatusCode::UNPROCESSABLE_ENTITY,
            "USERS_PROJECTS_VALIDATION",
            "Validation error",
            format!("{field}: {message}"),
            ctx,
        )
        .with_errors(vec![FieldError::new(field, message.as_str())]),
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Database error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_DB",
                "Internal error",
                "An internal database error occurred",
                ctx,
            )
        }
    };
    ProblemResponse(problem)
}

/// Map a body extraction failure to a Problem.
///
/// Shape errors (syntax, types, missing or unknown fields) are validation
/// failures and use 422, same as domain validation.
pub fn map_json_rejection(rejection: &JsonRejection, ctx: &RequestCtx) -> ProblemResponse {
    let problem = match rejection {
        JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => from_parts(
            StatusCode::UNPROCESSABLE_ENTITY,
            "USERS_PROJECTS_INVALID_BODY",
            "Invalid request body",
            rejection.body_text(),
            ctx,
        ),
        JsonRejection::MissingJsonContentType(_) => from_parts(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "USERS_PROJECTS_UNSUPPORTED_MEDIA_TYPE",
            "Unsupported media type",
            rejection.body_text(),
            ctx,
        ),
        // Unreadable bodies keep axum's status (413 when over the size limit).
        _ => from_parts(
            rejection.status(),
            "USERS_PROJECTS_BAD_REQUEST",
            rejection.status().canonical_reason().unwrap_or("Bad request"),
            rejection.body_text(),
            ctx,
        ),
    };
    ProblemResponse(problem)
}

/// Map a path parameter failure (`/api/users/abc`) to a Problem, keeping
/// axum's status.
pub fn map_path_rejection(rejection: &PathRejection, ctx: &RequestCtx) -> ProblemResponse {
    ProblemResponse(from_parts(
        rejection.status(),
        "USERS_PROJECTS_INVALID_PATH",
        "Invalid path parameter",
        rejection.body_text(),
        ctx,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RequestCtx {
        RequestCtx {
            instance: "/api/projects/1".to_string(),
            request_id: Some("req-1".to_string()),
        }
    }

    #[test]
    fn not_found_maps_to_404() {
        let p = map_domain_error(&DomainError::not_found(EntityKind::Project, 1), &ctx()).0;
        assert_eq!(p.status, 404);
        assert_eq!(p.code, "PROJECTS_NOT_FOUND");
        assert_eq!(p.instance, "/api/projects/1");
        assert_eq!(p.request_id.as_deref(), Some("req-1"));
    }

    #[test]
    fn conflict_maps_to_409_with_pointer() {
        let p = map_domain_error(&DomainError::conflict("email", "a@b.io"), &ctx()).0;
        assert_eq!(p.status, 409);
        assert_eq!(p.errors.unwrap()[0].pointer, "/email");
    }

    #[test]
    fn owner_validation_maps_to_422() {
        let e = DomainError::validation("owner_id", "User 9 does not exist");
        let p = map_domain_error(&e, &ctx()).0;
        assert_eq!(p.status, 422);
        assert_eq!(p.errors.unwrap()[0].pointer, "/owner_id");
    }

    #[test]
    fn database_error_hides_details() {
        let p = map_domain_error(&DomainError::database("disk on fire"), &ctx()).0;
        assert_eq!(p.status, 500);
        assert!(!p.detail.contains("disk"));
    }
}

use crate::models::ProfileState;

/// Only same-origin paths survive. Anything that could bounce the browser to
/// another host (absolute URLs, protocol-relative `//host` forms) is dropped.
pub fn sanitize_next(next: Option<&str>) -> Option<String> {
    let next = next?;
    if next.starts_with('/') && !next.starts_with("//") && !next.contains("://") {
        Some(next.to_string())
    } else {
        None
    }
}

/// Redirect decision after a successful code exchange. Pure so the whole
/// table is unit-testable without a running auth provider.
///
/// A missing profile lands on onboarding; the caller is expected to have
/// created the default row before redirecting.
pub fn decide_redirect(profile: &ProfileState, next: Option<&str>) -> String {
    match profile {
        ProfileState::Missing => "/onboarding".to_string(),
        ProfileState::Exists {
            role,
            onboarding_completed,
        } => match role.as_str() {
            "doctor" => "/doctor/dashboard".to_string(),
            "admin" => "/admin/dashboard".to_string(),
            _ if !onboarding_completed => "/onboarding".to_string(),
            _ => sanitize_next(next).unwrap_or_else(|| "/dashboard".to_string()),
        },
    }
}

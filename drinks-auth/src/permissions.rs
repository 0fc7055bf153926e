use crate::claims::Claims;
use crate::error::AuthError;

/// Checks that `claims` grant `required`.
///
/// Membership is exact and case-sensitive. A token carrying no
/// `permissions` claim is reported separately from one that simply lacks
/// the permission, since the former points at identity provider setup.
pub fn check_permission(claims: &Claims, required: &str) -> Result<(), AuthError> {
    let granted = claims
        .permissions
        .as_ref()
        .ok_or(AuthError::PermissionsClaimMissing)?;

    if granted.contains(required) {
        Ok(())
    } else {
        Err(AuthError::PermissionDenied(required.to_string()))
    }
}

use tonic::{Request, Status};
use uuid::Uuid;

use crate::middleware::AuthenticatedUser;

/// Owner id every ledger query of this request is scoped to.
///
/// Only the auth interceptor can supply it; there is no header fallback.
pub fn owner_from_request<T>(request: &Request<T>) -> Result<Uuid, Status> {
    request
        .extensions()
        .get::<AuthenticatedUser>()
        .map(|user| user.user_id)
        .ok_or_else(|| Status::unauthenticated("Authentication required"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn test_owner_from_extensions() {
        let user_id = Uuid::new_v4();
        let mut request = Request::new(());
        request.extensions_mut().insert(AuthenticatedUser { user_id });
        assert_eq!(owner_from_request(&request).unwrap(), user_id);
    }

    #[test]
    fn test_missing_user_is_unauthenticated() {
        let request = Request::new(());
        assert_eq!(owner_from_request(&request).unwrap_err().code(), Code::Unauthenticated);
    }
}

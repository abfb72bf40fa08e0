//! Authorization context
//!
//! Identity and role of the caller, resolved per request from the session
//! token. Nothing is cached between requests.

use crate::auth::auth_service::SessionClaims;
use crate::shared::error::{PlatformError, Result};
use crate::user::entity::{Capability, Role};

#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub role: Role,
}

impl AuthContext {
    pub fn from_claims(claims: &SessionClaims) -> Self {
        Self {
            user_id: claims.user_id.clone(),
            role: claims.role,
        }
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.role.has_capability(capability)
    }

    pub fn require(&self, capability: Capability) -> Result<()> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(PlatformError::forbidden("Access denied. Organizer role required."))
        }
    }
}

/// Type-level capability requirements for the `Authorized` extractor
pub mod caps {
    use crate::user::entity::Capability;

    pub trait RequiredCapability: Send + Sync + 'static {
        const CAPABILITY: Capability;
    }

    pub struct ManageShifts;
    pub struct ManageVolunteers;
    pub struct ViewStatistics;

    impl RequiredCapability for ManageShifts {
        const CAPABILITY: Capability = Capability::ManageShifts;
    }

    impl RequiredCapability for ManageVolunteers {
        const CAPABILITY: Capability = Capability::ManageVolunteers;
    }

    impl RequiredCapability for ViewStatistics {
        const CAPABILITY: Capability = Capability::ViewStatistics;
    }
}

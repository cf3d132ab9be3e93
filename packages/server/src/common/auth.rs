//! The authenticated caller, as seen by domain logic.

use serde::{Deserialize, Serialize};

use super::entity_ids::UserId;

/// Who is performing an operation. Built by the JWT middleware and passed
/// down into the domain layer so authorization decisions live next to the
/// logic they guard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub is_admin: bool,
}

impl Actor {
    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: false,
        }
    }

    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: true,
        }
    }

    /// True when the actor owns the resource or is an admin.
    pub fn can_manage(&self, owner: UserId) -> bool {
        self.is_admin || self.user_id == owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_can_manage_own_resource() {
        let owner = UserId::new();
        assert!(Actor::user(owner).can_manage(owner));
    }

    #[test]
    fn stranger_cannot_manage() {
        assert!(!Actor::user(UserId::new()).can_manage(UserId::new()));
    }

    #[test]
    fn admin_can_manage_anything() {
        assert!(Actor::admin(UserId::new()).can_manage(UserId::new()));
    }
}

use uuid::Uuid;

use super::errors::SessionError;
use super::value_objects::{Permission, Role, StaffMember};

/// The signed-in staff member, passed to every operation that needs it
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    staff: StaffMember,
    role: Role,
}

impl SessionContext {
    pub fn new(staff: StaffMember, role: Role) -> Self {
        Self { staff, role }
    }

    pub fn staff(&self) -> &StaffMember {
        &self.staff
    }

    pub fn staff_id(&self) -> Uuid {
        self.staff.id
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.staff.active && self.role.grants(permission)
    }

    pub fn ensure(&self, permission: Permission) -> Result<(), SessionError> {
        if !self.staff.active {
            return Err(SessionError::Deactivated(self.staff.id));
        }
        if !self.role.grants(permission) {
            return Err(SessionError::Forbidden(permission));
        }
        Ok(())
    }

    /// Drives the enabled state of the "deactivate" button on a staff row
    pub fn can_deactivate(&self, target: &StaffMember) -> bool {
        target.id != self.staff.id && target.active && self.can(Permission::ManageStaff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clerk() -> SessionContext {
        SessionContext::new(
            StaffMember::new("Tran Thi Mai", "mai@saigonsteps.vn"),
            Role::new("Warehouse clerk", [Permission::ProcessOrders]),
        )
    }

    #[test]
    fn test_permissions_follow_role() {
        let session = clerk();
        assert!(session.ensure(Permission::ProcessOrders).is_ok());
        assert_eq!(
            session.ensure(Permission::ManageStatuses),
            Err(SessionError::Forbidden(Permission::ManageStatuses))
        );
    }

    #[test]
    fn test_deactivated_staff_can_do_nothing() {
        let mut staff = StaffMember::new("Le Van Hung", "hung@saigonsteps.vn");
        staff.active = false;
        let session = SessionContext::new(staff.clone(), Role::administrator());

        assert!(!session.can(Permission::ChatWithCustomers));
        assert_eq!(session.ensure(Permission::ProcessOrders), Err(SessionError::Deactivated(staff.id)));
    }

    #[test]
    fn test_no_self_deactivation() {
        let admin = SessionContext::new(
            StaffMember::new("Nguyen Van An", "an@saigonsteps.vn"),
            Role::administrator(),
        );
        let other = StaffMember::new("Pham Thu Ha", "ha@saigonsteps.vn");

        assert!(!admin.can_deactivate(admin.staff()));
        assert!(admin.can_deactivate(&other));
        assert!(!clerk().can_deactivate(&other));
    }
}

use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::errors::SessionError;
use super::session::SessionContext;
use super::value_objects::{Permission, Role, StaffMember};

/// Staff accounts and their roles
#[derive(Debug, Default)]
pub struct StaffDirectory {
    members: RwLock<HashMap<Uuid, (StaffMember, Role)>>,
}

impl StaffDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, member: StaffMember, role: Role) -> StaffMember {
        tracing::info!(staff_id = %member.id, role = %role.name, "Staff member registered");
        self.members.write().await.insert(member.id, (member.clone(), role));
        member
    }

    /// Session for an existing staff member; deactivated accounts are refused
    pub async fn session_for(&self, staff_id: Uuid) -> Result<SessionContext, SessionError> {
        let members = self.members.read().await;
        let (member, role) = members.get(&staff_id).ok_or(SessionError::UnknownStaff(staff_id))?;

        if !member.active {
            return Err(SessionError::Deactivated(staff_id));
        }

        Ok(SessionContext::new(member.clone(), role.clone()))
    }

    pub async fn list(&self) -> Vec<StaffMember> {
        let mut members: Vec<_> = self
            .members
            .read()
            .await
            .values()
            .map(|(member, _)| member.clone())
            .collect();
        members.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        members
    }

    pub async fn deactivate(&self, session: &SessionContext, target: Uuid) -> Result<StaffMember, SessionError> {
        session.ensure(Permission::ManageStaff)?;
        if target == session.staff_id() {
            return Err(SessionError::SelfDeactivation);
        }

        let mut members = self.members.write().await;
        let (member, _) = members.get_mut(&target).ok_or(SessionError::UnknownStaff(target))?;
        member.active = false;

        tracing::info!(staff_id = %target, by = %session.staff_id(), "Staff member deactivated");
        Ok(member.clone())
    }
}

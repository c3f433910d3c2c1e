use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Permission {
    ManageStatuses,
    ProcessOrders,
    ManageStaff,
    ChatWithCustomers,
    ManageProducts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub name: String,
    pub permissions: BTreeSet<Permission>,
}

impl Role {
    pub fn new(name: impl Into<String>, permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            name: name.into(),
            permissions: permissions.into_iter().collect(),
        }
    }

    pub fn administrator() -> Self {
        Self::new(
            "Administrator",
            [
                Permission::ManageStatuses,
                Permission::ProcessOrders,
                Permission::ManageStaff,
                Permission::ChatWithCustomers,
                Permission::ManageProducts,
            ],
        )
    }

    pub fn grants(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub active: bool,
}

impl StaffMember {
    pub fn new(full_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name: full_name.into(),
            email: email.into(),
            active: true,
        }
    }
}

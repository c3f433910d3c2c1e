use uuid::Uuid;

use super::value_objects::Permission;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("Missing permission: {0:?}")]
    Forbidden(Permission),

    #[error("Unknown staff member: {0}")]
    UnknownStaff(Uuid),

    #[error("Staff account {0} is deactivated")]
    Deactivated(Uuid),

    #[error("Staff members cannot deactivate their own account")]
    SelfDeactivation,
}

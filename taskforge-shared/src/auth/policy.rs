/// Role-based authorization policy
///
/// This module is the single decision point for every mutating operation in
/// TaskForge. Handlers build an [`Action`] carrying whatever target fields the
/// rule needs (assignee, author, target user) and call [`authorize`]; a denial
/// carries the exact message the caller sees.
///
/// # Permission Model
///
/// | Action | Allowed |
/// |---|---|
/// | Create project | Admin, Manager |
/// | Delete project | Admin |
/// | Create task | Admin, Manager |
/// | Update task status | Admin, Manager; Developer only on their own task |
/// | Delete task | Admin, Manager |
/// | Create comment | any authenticated user |
/// | Delete comment | the author, or Admin |
/// | Create user | Admin |
/// | Update user role | Admin |
/// | Delete user | Admin, never themselves |
///
/// Task *visibility* is not an allow/deny decision and lives on
/// [`Role::can_view_all_tasks`] instead: Developers list only their own
/// assignments, Admins and Managers list everything.
///
/// # Example
///
/// ```
/// use taskforge_shared::auth::policy::{authorize, Action, Caller};
/// use taskforge_shared::models::user::Role;
///
/// let manager = Caller { id: 7, role: Role::Manager };
/// assert!(authorize(&manager, &Action::CreateProject).is_ok());
/// assert!(authorize(&manager, &Action::DeleteProject).is_err());
/// ```

use crate::models::user::Role;

/// The authenticated identity a request acts as
///
/// Built by the auth middleware from a validated token, with the role read
/// fresh from the user row rather than trusted from the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    /// User ID (the token's subject)
    pub id: i64,

    /// Current role
    pub role: Role,
}

/// A mutating operation submitted for a policy decision
///
/// Variants carry the target fields their rule depends on, nothing more, so
/// decisions stay pure and unit-testable without a database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateProject,
    DeleteProject,
    CreateTask,

    /// Status change on a task with the given assignee (None = unassigned)
    UpdateTaskStatus { assignee: Option<i64> },

    DeleteTask,
    CreateComment,

    /// Deletion of a comment authored by the given user
    DeleteComment { author: i64 },

    CreateUser,
    UpdateUserRole,

    /// Deletion of the given user account
    DeleteUser { target: i64 },
}

/// A denied policy decision
///
/// The display text is the caller-visible message; the API layer maps every
/// variant to 403.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    /// Project creation is limited to Admin and Manager
    #[error("Unauthorized. Only Admin and Manager can create projects.")]
    ProjectCreateDenied,

    /// Project deletion is limited to Admin
    #[error("Unauthorized. Only Admin can delete projects.")]
    ProjectDeleteDenied,

    /// Task creation is limited to Admin and Manager
    #[error("Unauthorized. Only Admin and Manager can create tasks.")]
    TaskCreateDenied,

    /// A Developer tried to move a task assigned to someone else
    #[error("You can only update your own tasks")]
    NotTaskAssignee,

    /// An Admin tried to delete their own account
    #[error("You cannot delete your own account.")]
    SelfDeletion,

    /// Any other denial
    #[error("Unauthorized")]
    NotPermitted,
}

/// Decides whether `caller` may perform `action`
///
/// Pure function of the caller's role/id and the action's target fields. A
/// denial has no side effect; the caller maps it straight to a 403 response.
pub fn authorize(caller: &Caller, action: &Action) -> Result<(), PolicyError> {
    match action {
        Action::CreateProject => match caller.role {
            Role::Admin | Role::Manager => Ok(()),
            Role::Developer => Err(PolicyError::ProjectCreateDenied),
        },

        Action::DeleteProject => match caller.role {
            Role::Admin => Ok(()),
            Role::Manager | Role::Developer => Err(PolicyError::ProjectDeleteDenied),
        },

        Action::CreateTask => match caller.role {
            Role::Admin | Role::Manager => Ok(()),
            Role::Developer => Err(PolicyError::TaskCreateDenied),
        },

        Action::UpdateTaskStatus { assignee } => match caller.role {
            Role::Admin | Role::Manager => Ok(()),
            Role::Developer if *assignee == Some(caller.id) => Ok(()),
            Role::Developer => Err(PolicyError::NotTaskAssignee),
        },

        Action::DeleteTask => match caller.role {
            Role::Admin | Role::Manager => Ok(()),
            Role::Developer => Err(PolicyError::NotPermitted),
        },

        Action::CreateComment => Ok(()),

        Action::DeleteComment { author } => {
            if caller.role == Role::Admin || *author == caller.id {
                Ok(())
            } else {
                Err(PolicyError::NotPermitted)
            }
        }

        Action::CreateUser | Action::UpdateUserRole => match caller.role {
            Role::Admin => Ok(()),
            Role::Manager | Role::Developer => Err(PolicyError::NotPermitted),
        },

        Action::DeleteUser { target } => match caller.role {
            Role::Admin if *target == caller.id => Err(PolicyError::SelfDeletion),
            Role::Admin => Ok(()),
            Role::Manager | Role::Developer => Err(PolicyError::NotPermitted),
        },
    }
}

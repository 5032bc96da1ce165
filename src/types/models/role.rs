use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Workspace-scoped role, totally ordered by privilege.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Role {
    Owner,
    Admin,
    Editor,
    Viewer,
}

impl Role {
    pub fn rank(self) -> u8 {
        match self {
            Role::Owner => 4,
            Role::Admin => 3,
            Role::Editor => 2,
            Role::Viewer => 1,
        }
    }

    pub fn at_least(self, threshold: Role) -> bool {
        self.rank() >= threshold.rank()
    }

    pub fn can_invite_members(self) -> bool {
        self.at_least(Role::Admin)
    }

    pub fn can_manage_members(self) -> bool {
        self.at_least(Role::Admin)
    }
}

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// 利用者の役割（表示件数の既定値が異なる）
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    /// 1ページの既定件数
    pub fn default_page_size(&self) -> usize {
        match self {
            Role::Admin => 5,
            Role::User => 10,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

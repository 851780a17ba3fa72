//! # Access Policy
//!
//! Roles, the authenticated caller, and which role may do what.
//!
//! ```text
//! ┌──────────────────────────────┬───────┬─────────────┐
//! │ action                       │ admin │ storekeeper │
//! ├──────────────────────────────┼───────┼─────────────┤
//! │ manage products              │   ✓   │      ✗      │
//! │ view products                │   ✓   │      ✓      │
//! │ record sale                  │   ✗   │      ✓      │
//! │ view own sales               │   ✗   │      ✓      │
//! │ view all sales               │   ✓   │      ✗      │
//! │ view today's sales / summary │   ✓   │      ✓      │
//! │ delete sale                  │   ✓   │      ✗      │
//! └──────────────────────────────┴───────┴─────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};

// =============================================================================
// Role
// =============================================================================

/// A staff role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Storekeeper,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Storekeeper => "storekeeper",
        }
    }

    /// Whether this role may perform `action`.
    pub const fn permits(&self, action: Action) -> bool {
        match action {
            Action::ViewProducts | Action::ViewTodaysSales | Action::ViewSummary => true,
            Action::ManageProducts | Action::ViewAllSales | Action::DeleteSale => {
                matches!(self, Role::Admin)
            }
            Action::RecordSale | Action::ViewOwnSales => matches!(self, Role::Storekeeper),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "storekeeper" => Ok(Role::Storekeeper),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec!["admin".to_string(), "storekeeper".to_string()],
            }),
        }
    }
}

// =============================================================================
// Action
// =============================================================================

/// Something a caller may attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ManageProducts,
    ViewProducts,
    RecordSale,
    ViewOwnSales,
    ViewAllSales,
    ViewTodaysSales,
    ViewSummary,
    DeleteSale,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::ManageProducts => "manage products",
            Action::ViewProducts => "view products",
            Action::RecordSale => "record sales",
            Action::ViewOwnSales => "view own sales",
            Action::ViewAllSales => "view all sales",
            Action::ViewTodaysSales => "view today's sales",
            Action::ViewSummary => "view the sales summary",
            Action::DeleteSale => "delete sales",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Principal
// =============================================================================

/// The authenticated caller, as asserted by the upstream gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: String,
    pub tenant_id: String,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, tenant_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            tenant_id: tenant_id.into(),
            role,
        }
    }

    /// Fails with [`CoreError::Forbidden`] unless the role permits `action`.
    pub fn authorize(&self, action: Action) -> CoreResult<()> {
        if self.role.permits(action) {
            Ok(())
        } else {
            Err(CoreError::Forbidden {
                role: self.role.to_string(),
                action: action.to_string(),
            })
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! Caller identity as supplied by the upstream identity layer.

use crate::model::Order;
use crate::order_actor::OrderError;

/// Role token that grants access to other customers' orders.
pub const ADMIN_ROLE: &str = "admin";

/// Opaque caller id and role string, both already vetted upstream.
///
/// Only presence and content are checked here; no credential verification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Caller {
    pub id: Option<String>,
    pub roles: Option<String>,
}

impl Caller {
    /// A request that carried no identity.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            roles: None,
        }
    }

    pub fn with_roles(mut self, roles: impl Into<String>) -> Self {
        self.roles = Some(roles.into());
        self
    }

    /// The caller id, or [`OrderError::Unauthenticated`] when absent or blank.
    pub fn identity(&self) -> Result<&str, OrderError> {
        self.id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(OrderError::Unauthenticated)
    }

    /// Roles are a comma or whitespace separated list; matching is per token.
    pub fn is_admin(&self) -> bool {
        self.roles.as_deref().is_some_and(|roles| {
            roles
                .split(|c: char| c == ',' || c.is_whitespace())
                .any(|role| role.eq_ignore_ascii_case(ADMIN_ROLE))
        })
    }

    /// Owner or admin may act on `order`.
    pub fn authorize(&self, order: &Order) -> Result<(), OrderError> {
        let identity = self.identity()?;
        if order.is_owned_by(identity) || self.is_admin() {
            Ok(())
        } else {
            Err(OrderError::Forbidden(format!("order {} belongs to another customer", order.id)))
        }
    }
}

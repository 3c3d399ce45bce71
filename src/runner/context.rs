use crate::utils::config::Users;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which configured account a credential belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Regular,
}

impl Role {
    /// Resolve the role by matching `email` against the configured fixtures
    pub fn of(email: &str, users: &Users) -> Option<Role> {
        if email.eq_ignore_ascii_case(&users.admin.email) {
            Some(Role::Admin)
        } else if email.eq_ignore_ascii_case(&users.regular.email) {
            Some(Role::Regular)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Lost,
    Found,
}

impl ItemKind {
    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Lost => "Lost",
            ItemKind::Found => "Found",
        }
    }

    /// Value of the `type` field in admin moderation requests
    pub fn api_type(&self) -> &'static str {
        match self {
            ItemKind::Lost => "lost",
            ItemKind::Found => "found",
        }
    }
}

#[derive(Debug, Default)]
struct ItemLedger {
    /// One slot per create attempt, in test-data order; `None` if it failed
    created: Vec<Option<i64>>,
    deleted: HashSet<i64>,
}

/// IDs the API assigned during a run, for the results file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEntities {
    pub admin_user_id: Option<i64>,
    pub regular_user_id: Option<i64>,
    pub lost_items: Vec<Option<i64>>,
    pub found_items: Vec<Option<i64>>,
}

/// Session state threaded through the stages of one run
#[derive(Debug, Default)]
pub struct RunContext {
    user_token: Option<String>,
    admin_token: Option<String>,
    pub admin_user_id: Option<i64>,
    pub regular_user_id: Option<i64>,
    lost: ItemLedger,
    found: ItemLedger,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the token for `role`. Only successful logins call this, so a
    /// token is only ever replaced, never cleared.
    pub fn set_token(&mut self, role: Role, token: String) {
        match role {
            Role::Admin => self.admin_token = Some(token),
            Role::Regular => self.user_token = Some(token),
        }
    }

    pub fn token(&self, role: Role) -> Option<&str> {
        match role {
            Role::Admin => self.admin_token.as_deref(),
            Role::Regular => self.user_token.as_deref(),
        }
    }

    pub fn set_user_id(&mut self, role: Role, id: i64) {
        match role {
            Role::Admin => self.admin_user_id = Some(id),
            Role::Regular => self.regular_user_id = Some(id),
        }
    }

    fn ledger(&self, kind: ItemKind) -> &ItemLedger {
        match kind {
            ItemKind::Lost => &self.lost,
            ItemKind::Found => &self.found,
        }
    }

    fn ledger_mut(&mut self, kind: ItemKind) -> &mut ItemLedger {
        match kind {
            ItemKind::Lost => &mut self.lost,
            ItemKind::Found => &mut self.found,
        }
    }

    /// Record the outcome of a create call, in creation order
    pub fn record_item(&mut self, kind: ItemKind, id: Option<i64>) {
        self.ledger_mut(kind).created.push(id);
    }

    /// ID of the `position`-th (1-based) item created this run
    pub fn item(&self, kind: ItemKind, position: usize) -> Option<i64> {
        position
            .checked_sub(1)
            .and_then(|idx| self.ledger(kind).created.get(idx).copied().flatten())
    }

    /// Created and not yet deleted, in creation order
    pub fn live_items(&self, kind: ItemKind) -> Vec<i64> {
        let ledger = self.ledger(kind);
        ledger
            .created
            .iter()
            .flatten()
            .copied()
            .filter(|id| !ledger.deleted.contains(id))
            .collect()
    }

    pub fn mark_deleted(&mut self, kind: ItemKind, id: i64) {
        self.ledger_mut(kind).deleted.insert(id);
    }

    /// Every created ID, in order, including failed attempts as `None`
    pub fn created_items(&self, kind: ItemKind) -> &[Option<i64>] {
        &self.ledger(kind).created
    }

    pub fn entities(&self) -> CreatedEntities {
        CreatedEntities {
            admin_user_id: self.admin_user_id,
            regular_user_id: self.regular_user_id,
            lost_items: self.lost.created.clone(),
            found_items: self.found.created.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::UserFixture;

    fn users() -> Users {
        let fixture = |email: &str| UserFixture {
            email: email.to_string(),
            password: "pw".to_string(),
            profile: Default::default(),
        };
        Users {
            admin: fixture("admin@lnf.io"),
            regular: fixture("john@lnf.io"),
        }
    }

    #[test]
    fn test_role_by_identity() {
        let users = users();
        assert_eq!(Role::of("admin@lnf.io", &users), Some(Role::Admin));
        assert_eq!(Role::of("JOHN@lnf.io", &users), Some(Role::Regular));
        assert_eq!(Role::of("someone@else.io", &users), None);
    }

    #[test]
    fn test_tokens_per_role() {
        let mut ctx = RunContext::new();
        assert!(ctx.token(Role::Admin).is_none());
        ctx.set_token(Role::Regular, "u1".into());
        ctx.set_token(Role::Admin, "a1".into());
        ctx.set_token(Role::Regular, "u2".into());
        assert_eq!(ctx.token(Role::Regular), Some("u2"));
        assert_eq!(ctx.token(Role::Admin), Some("a1"));
    }

    #[test]
    fn test_item_ledger() {
        let mut ctx = RunContext::new();
        ctx.record_item(ItemKind::Lost, Some(10));
        ctx.record_item(ItemKind::Lost, None);
        ctx.record_item(ItemKind::Lost, Some(12));

        assert_eq!(ctx.item(ItemKind::Lost, 1), Some(10));
        assert_eq!(ctx.item(ItemKind::Lost, 2), None);
        assert_eq!(ctx.item(ItemKind::Lost, 0), None);
        assert_eq!(ctx.item(ItemKind::Lost, 9), None);

        ctx.mark_deleted(ItemKind::Lost, 12);
        assert_eq!(ctx.live_items(ItemKind::Lost), vec![10]);
        assert!(ctx.live_items(ItemKind::Found).is_empty());
    }
}

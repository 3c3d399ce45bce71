use super::items::no_item;
use super::{WorkflowDriver, STAGE_ADMIN};
use crate::client::{ApiRequest, Endpoint, Method};
use crate::runner::context::{ItemKind, Role};
use serde_json::json;

/// Moderation endpoints, exercised with the admin token
pub async fn run(driver: &mut WorkflowDriver<'_>) {
    driver.reporter.set_stage(STAGE_ADMIN);

    set_ban(driver, "Ban User", true).await;
    set_ban(driver, "Unban User", false).await;

    let live = driver.ctx.live_items(ItemKind::Lost);
    for (position, name) in ["Update Lost Item Status", "Update Another Lost Item Status"]
        .into_iter()
        .enumerate()
    {
        match live.get(position).copied() {
            Some(id) => approve(driver, name, id, ItemKind::Lost).await,
            None => driver.fail_unrunnable(name, &no_item(ItemKind::Lost)),
        }
    }

    let request = ApiRequest::new(Method::Get, Endpoint::AdminReports)
        .bearer(driver.ctx.token(Role::Admin));
    driver
        .expect_status("Get System Reports", request, 200)
        .await;

    // Regular accounts must be turned away from admin endpoints
    let request = ApiRequest::new(Method::Get, Endpoint::AdminReports)
        .bearer(driver.ctx.token(Role::Regular));
    driver
        .expect_status("Deny System Reports To Regular User", request, 403)
        .await;
}

async fn set_ban(driver: &mut WorkflowDriver<'_>, name: &str, banned: bool) {
    let Some(user_id) = driver.ctx.regular_user_id else {
        driver.fail_unrunnable(name, "Regular user was not registered in this run");
        return;
    };

    let request = ApiRequest::new(Method::Patch, Endpoint::AdminUser(user_id))
        .json(json!({ "is_banned": banned }))
        .bearer(driver.ctx.token(Role::Admin));
    driver.expect_status(name, request, 200).await;
}

async fn approve(driver: &mut WorkflowDriver<'_>, name: &str, id: i64, kind: ItemKind) {
    let request = ApiRequest::new(Method::Patch, Endpoint::AdminItem(id))
        .json(json!({ "status": "approved", "type": kind.api_type() }))
        .bearer(driver.ctx.token(Role::Admin));
    driver.expect_status(name, request, 200).await;
}

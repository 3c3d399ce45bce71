use super::{WorkflowDriver, STAGE_AUTH};
use crate::client::{ApiRequest, ApiResponse, Endpoint, Method};
use crate::runner::assertions::{assert_json_key, assert_status};
use crate::runner::context::Role;
use crate::utils::config::UserFixture;
use serde_json::Value;

/// Register both accounts, promote the admin, log both in
pub async fn run(driver: &mut WorkflowDriver<'_>) {
    driver.reporter.set_stage(STAGE_AUTH);
    let config = driver.config;
    let users = &config.users;

    register(driver, "Register Admin User", &users.admin, Role::Admin).await;
    set_admin_role(driver, &users.admin.email).await;
    register(driver, "Register Regular User", &users.regular, Role::Regular).await;
    login(driver, "Login Regular User", &users.regular).await;
    login(driver, "Login Admin User", &users.admin).await;
}

async fn register(driver: &mut WorkflowDriver<'_>, name: &str, user: &UserFixture, role: Role) {
    let request = ApiRequest::new(Method::Post, Endpoint::Signup).json(user.signup_payload());

    if let Some(response) = driver.expect_status(name, request, 201).await {
        if let Some(id) = response.data_id() {
            driver.ctx.set_user_id(role, id);
        }
    }
}

async fn set_admin_role(driver: &mut WorkflowDriver<'_>, email: &str) {
    let name = "Set Admin Role";
    let start = driver.reporter.start_test(name);

    match driver.db.set_admin_role(email).await {
        Ok(()) => driver
            .reporter
            .end_test(name, start, true, "Successfully set admin role"),
        Err(e) => driver.reporter.end_test(
            name,
            start,
            false,
            format!("Failed to set admin role: {}", e),
        ),
    }
}

/// Log in with `user` and keep the token under the role its email maps to
async fn login(driver: &mut WorkflowDriver<'_>, name: &str, user: &UserFixture) {
    let request = ApiRequest::new(Method::Post, Endpoint::Login(driver.config.login_path.clone()))
        .json(user.credentials());

    let response = driver
        .run_test(name, request, |r| {
            assert_status(r, 200).and_then(|| assert_json_key(r.data(), "token", None))
        })
        .await;

    let Some(token) = response.as_ref().and_then(extract_token) else {
        return;
    };
    match Role::of(&user.email, &driver.config.users) {
        Some(role) => driver.ctx.set_token(role, token),
        None => log::warn!("Logged in as unknown account {}, token discarded", user.email),
    }
}

/// `data.token` from the envelope, falling back to top-level fields
fn extract_token(response: &ApiResponse) -> Option<String> {
    response
        .data()
        .and_then(|d| d.get("token"))
        .or_else(|| response.body.as_ref().and_then(|b| b.get("token")))
        .or_else(|| response.body.as_ref().and_then(|b| b.get("jwt_token")))
        .and_then(Value::as_str)
        .map(str::to_string)
}

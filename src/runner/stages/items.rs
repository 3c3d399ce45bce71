use super::{WorkflowDriver, STAGE_FOUND_ITEMS, STAGE_LOST_ITEMS};
use crate::client::{ApiRequest, Endpoint, Method};
use crate::runner::assertions::{assert_json_key, assert_status};
use crate::runner::context::{ItemKind, Role};
use serde_json::Value;

/// The API answers deletes with a JSON confirmation, not 204
const DELETE_STATUS: u16 = 200;

pub async fn run_lost(driver: &mut WorkflowDriver<'_>) {
    driver.reporter.set_stage(STAGE_LOST_ITEMS);
    run_crud(driver, ItemKind::Lost).await;
}

pub async fn run_found(driver: &mut WorkflowDriver<'_>) {
    driver.reporter.set_stage(STAGE_FOUND_ITEMS);
    run_crud(driver, ItemKind::Found).await;
}

fn create_endpoint(kind: ItemKind) -> Endpoint {
    match kind {
        ItemKind::Lost => Endpoint::CreateLostItem,
        ItemKind::Found => Endpoint::CreateFoundItem,
    }
}

fn item_endpoint(kind: ItemKind, id: i64) -> Endpoint {
    match kind {
        ItemKind::Lost => Endpoint::LostItem(id),
        ItemKind::Found => Endpoint::FoundItem(id),
    }
}

/// Create every payload, read the first, apply updates, delete the last
async fn run_crud(driver: &mut WorkflowDriver<'_>, kind: ItemKind) {
    let data = driver.data;
    let (payloads, updates) = match kind {
        ItemKind::Lost => (&data.lost_items, &data.lost_item_updates),
        ItemKind::Found => (&data.found_items, &data.found_item_updates),
    };
    let label = kind.label();

    for (i, payload) in payloads.iter().enumerate() {
        let name = format!("Create {} Item {}", label, i + 1);
        let request = ApiRequest::new(Method::Post, create_endpoint(kind))
            .json(payload.clone())
            .bearer(driver.ctx.token(Role::Regular));

        let id = driver
            .expect_status(&name, request, 201)
            .await
            .and_then(|r| r.data_id());
        driver.ctx.record_item(kind, id);
    }

    let name = format!("Get {} Item by ID", label);
    match driver.ctx.live_items(kind).first().copied() {
        Some(id) => {
            let request = ApiRequest::new(Method::Get, item_endpoint(kind, id));
            driver
                .run_test(&name, request, |r| {
                    assert_status(r, 200)
                        .and_then(|| assert_json_key(r.data(), "id", Some(&Value::from(id))))
                })
                .await;
        }
        None => driver.fail_unrunnable(&name, &no_item(kind)),
    }

    for update in updates {
        let name = format!("Update {} Item {}", label, update.target);
        match driver.ctx.item(kind, update.target) {
            Some(id) => {
                let request = ApiRequest::new(Method::Patch, item_endpoint(kind, id))
                    .json(update.payload())
                    .bearer(driver.ctx.token(Role::Regular));
                driver.expect_status(&name, request, 200).await;
            }
            None => driver.fail_unrunnable(
                &name,
                &format!(
                    "{} item #{} was not created in this run",
                    label, update.target
                ),
            ),
        }
    }

    let name = format!("Delete {} Item", label);
    match driver.ctx.live_items(kind).last().copied() {
        Some(id) => {
            let request = ApiRequest::new(Method::Delete, item_endpoint(kind, id))
                .bearer(driver.ctx.token(Role::Regular));
            if driver.expect_status(&name, request, DELETE_STATUS).await.is_some() {
                driver.ctx.mark_deleted(kind, id);
            }
        }
        None => driver.fail_unrunnable(&name, &no_item(kind)),
    }
}

pub(super) fn no_item(kind: ItemKind) -> String {
    format!("No {} item was created in this run", kind.api_type())
}

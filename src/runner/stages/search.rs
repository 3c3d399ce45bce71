use super::{WorkflowDriver, STAGE_SEARCH};
use crate::client::{ApiRequest, Endpoint, Method};
use serde_json::{Map, Value};

pub async fn run(driver: &mut WorkflowDriver<'_>) {
    driver.reporter.set_stage(STAGE_SEARCH);

    let data = driver.data;
    let queries = &data.search_queries;
    for (i, query) in queries.iter().enumerate() {
        let name = if queries.len() == 1 {
            "Search Items".to_string()
        } else {
            format!("Search Items {}", i + 1)
        };
        driver.expect_status(&name, search_request(query), 200).await;
    }

    driver
        .expect_status("Get All Items", ApiRequest::new(Method::Get, Endpoint::Items), 200)
        .await;
    driver
        .expect_status(
            "Get Items Statistics",
            ApiRequest::new(Method::Get, Endpoint::ItemStats),
            200,
        )
        .await;
}

/// Flatten a query object into `?key=value` pairs; nulls are dropped
fn search_request(query: &Map<String, Value>) -> ApiRequest {
    query
        .iter()
        .fold(ApiRequest::new(Method::Get, Endpoint::Search), |req, (key, value)| {
            match value {
                Value::Null => req,
                Value::String(s) => req.query(key, s),
                other => req.query(key, &other.to_string()),
            }
        })
}

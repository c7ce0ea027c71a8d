//! Resource request commands

use futures::future::join_all;
use serde_json::{Map, Value};

use erpnext_client::Result;

use super::CommandContext;

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_body(data: &str) -> Result<Value> {
    Ok(serde_json::from_str(data)?)
}

/// Fetch every endpoint concurrently with the same query parameters.
///
/// A single endpoint prints its response as-is; several are printed as one
/// object keyed by endpoint.
pub async fn get(
    ctx: &CommandContext,
    endpoints: &[String],
    params: &[(String, String)],
) -> Result<()> {
    let params: Vec<(&str, &str)> = params
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect();

    let results = join_all(
        endpoints
            .iter()
            .map(|endpoint| ctx.client.get(endpoint, &params)),
    )
    .await;

    let bodies = results.into_iter().collect::<Result<Vec<_>>>()?;
    if let [body] = bodies.as_slice() {
        return print_json(body);
    }

    let combined: Map<String, Value> = endpoints.iter().cloned().zip(bodies).collect();
    print_json(&Value::Object(combined))
}

pub async fn post(ctx: &CommandContext, endpoint: &str, data: &str) -> Result<()> {
    let body = parse_body(data)?;
    print_json(&ctx.client.post(endpoint, body).await?)
}

pub async fn put(ctx: &CommandContext, endpoint: &str, data: &str) -> Result<()> {
    let body = parse_body(data)?;
    print_json(&ctx.client.put(endpoint, body).await?)
}

pub async fn delete(ctx: &CommandContext, endpoint: &str) -> Result<()> {
    print_json(&ctx.client.delete(endpoint).await?)
}

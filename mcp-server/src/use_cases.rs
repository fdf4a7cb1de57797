use anyhow::Result;
use lotto_checker::{Draw, DrawRepository, HttpDrawSource, check_response, collect_latest};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Arguments the caller got wrong, as opposed to a failure while running the tool.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct InvalidParams(pub String);

impl InvalidParams {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

fn required_str<'a>(arguments: &'a HashMap<String, Value>, key: &str) -> Result<&'a str> {
    arguments
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| InvalidParams::new(format!("Missing {} parameter", key)).into())
}

pub struct DrawUseCase {
    repository: Arc<DrawRepository>,
}

impl DrawUseCase {
    pub fn new(repository: Arc<DrawRepository>) -> Self {
        Self { repository }
    }

    pub async fn save_draw(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        let draw_id = required_str(arguments, "draw_id")?;
        let draw_json = arguments
            .get("draw")
            .ok_or_else(|| InvalidParams::new("Missing draw parameter"))?;
        let draw: Draw = serde_json::from_value(draw_json.clone())
            .map_err(|e| InvalidParams::new(format!("Invalid draw: {}", e)))?;

        self.repository.save(draw_id, &draw)?;

        Ok(json!({
            "success": true,
            "draw_id": draw_id,
            "draw_date": draw.date,
            "message": format!("Lottery draw {} saved successfully", draw_id)
        })
        .to_string())
    }

    pub async fn get_latest_draw(&self, _arguments: &HashMap<String, Value>) -> Result<String> {
        let result = self.repository.get_latest_record()?;

        Ok(json!({
            "success": true,
            "found": result.is_some(),
            "result": result
        })
        .to_string())
    }

    pub async fn get_draw_by_id(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        let draw_id = required_str(arguments, "draw_id")?;
        let result = self.repository.get_record_by_draw_id(draw_id)?;

        Ok(json!({
            "success": true,
            "found": result.is_some(),
            "result": result
        })
        .to_string())
    }

    pub async fn list_draws(&self, _arguments: &HashMap<String, Value>) -> Result<String> {
        let results = self.repository.list_draws()?;

        Ok(json!({
            "success": true,
            "results": results
        })
        .to_string())
    }
}

pub struct CheckUseCase {
    repository: Arc<DrawRepository>,
}

impl CheckUseCase {
    pub fn new(repository: Arc<DrawRepository>) -> Self {
        Self { repository }
    }

    pub async fn check_tickets(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        let numbers = arguments
            .get("numbers")
            .and_then(|v| v.as_array())
            .ok_or_else(|| InvalidParams::new("Missing numbers parameter"))?;
        if numbers.is_empty() {
            return Err(InvalidParams::new("numbers must contain at least one ticket").into());
        }
        let tickets = numbers
            .iter()
            .map(|n| {
                n.as_str()
                    .ok_or_else(|| InvalidParams::new("Ticket numbers must be strings"))
            })
            .collect::<Result<Vec<&str>, _>>()?;

        let draw = match arguments.get("draw_id").and_then(|v| v.as_str()) {
            Some(draw_id) => self.repository.get_by_draw_id(draw_id)?,
            None => self.repository.get_latest()?,
        };

        let Some(draw) = draw else {
            return Ok(json!({
                "success": false,
                "found": false,
                "message": "No lottery draw stored yet"
            })
            .to_string());
        };

        Ok(json!({
            "success": true,
            "found": true,
            "response": check_response(&tickets, &draw)
        })
        .to_string())
    }
}

pub struct CollectUseCase {
    repository: Arc<DrawRepository>,
    source: Arc<HttpDrawSource>,
}

impl CollectUseCase {
    pub fn new(repository: Arc<DrawRepository>, source: Arc<HttpDrawSource>) -> Self {
        Self { repository, source }
    }

    pub async fn collect_latest(&self, _arguments: &HashMap<String, Value>) -> Result<String> {
        let outcome = collect_latest(self.source.as_ref(), &self.repository).await?;

        Ok(json!({
            "success": true,
            "result": outcome
        })
        .to_string())
    }
}

//! Delete command handler.

use std::io::{self, BufRead, Write};

use color_eyre::Result;
use serde_json::json;

use crate::models::Entity;
use crate::services::{DeleteService, DeleteStart};

use super::{parse_key, print_json, App};

impl App {
    /// Run the delete command: check, ask for confirmation, re-check, delete.
    pub async fn run_delete(
        &self,
        entity_type: &str,
        key: &str,
        label: Option<&str>,
        yes: bool,
    ) -> Result<()> {
        let key = parse_key(key)?;
        let label = label.map(str::to_string).unwrap_or_else(|| key.to_string());
        let ctx = self.context()?;
        let deletes: DeleteService = ctx.resolve();

        let ticket = match deletes
            .begin_delete(Entity::new(entity_type, key, label))
            .await?
        {
            DeleteStart::Blocked(outcome) => return print_json(&outcome),
            DeleteStart::AwaitingConfirmation(ticket) => ticket,
        };

        let prompt = format!(
            "Are you sure you want to delete {} \"{}\"? This action cannot be undone.",
            ticket.entity_type().noun(),
            ticket.entity().label
        );
        if !yes && !confirm(&prompt)? {
            let message = format!("Delete of \"{}\" cancelled.", ticket.entity().label);
            deletes.cancel(ticket)?;
            return print_json(&json!({ "outcome": "cancelled", "message": message }));
        }

        let outcome = deletes.confirm(ticket).await?;
        print_json(&outcome)
    }
}

/// Ask on stderr, read the answer from stdin. Only `y`/`yes` confirms.
fn confirm(prompt: &str) -> Result<bool> {
    let mut stderr = io::stderr();
    write!(stderr, "{} [y/N] ", prompt)?;
    stderr.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

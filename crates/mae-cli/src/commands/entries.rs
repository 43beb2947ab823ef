//! Category commands. Each one restores the session, applies the guard and
//! drives a `Resource` for the requested category.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use mae_core::catalog::{self, CategorySchema};
use mae_core::{Confirm, DeleteOutcome, EntryForm, EntryId, Resource};
use mae_infrastructure::HttpBackend;

use super::{App, Connected, login_required, output, prompt};

/// Parses a `--set field=value` argument.
pub fn parse_assignment(raw: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing field name in '{}'", raw));
    }
    Ok((name.to_string(), value.to_string()))
}

fn apply(form: &mut EntryForm, values: Vec<(String, String)>) {
    for (name, value) in values {
        form.set(name, value);
    }
}

fn resource(connected: &Connected, schema: &'static CategorySchema) -> Resource<HttpBackend> {
    Resource::new(schema, Arc::clone(&connected.backend))
}

pub fn categories() -> Result<ExitCode> {
    output::categories(catalog::all());
    Ok(ExitCode::SUCCESS)
}

pub async fn list(app: &App, category: &str) -> Result<ExitCode> {
    let schema = catalog::find(category)?;
    let connected = app.connect().await?;
    let Some(credential) = connected.credential().await? else {
        return Ok(login_required());
    };

    let entries = resource(&connected, schema).list(&credential).await?;
    output::entries(schema, &entries);
    Ok(ExitCode::SUCCESS)
}

pub async fn add(app: &App, category: &str, values: Vec<(String, String)>) -> Result<ExitCode> {
    let schema = catalog::find(category)?;
    let connected = app.connect().await?;
    let Some(credential) = connected.credential().await? else {
        return Ok(login_required());
    };

    let resource = resource(&connected, schema);
    // Defaults such as the next number depend on the current collection
    resource.list(&credential).await?;
    let mut form = resource.new_form().await;
    apply(&mut form, values);

    let entries = resource.create(&credential, &mut form).await?;
    output::success("Entrée ajoutée");
    output::entries(schema, &entries);
    Ok(ExitCode::SUCCESS)
}

pub async fn edit(
    app: &App,
    category: &str,
    id: &str,
    values: Vec<(String, String)>,
) -> Result<ExitCode> {
    let schema = catalog::find(category)?;
    let connected = app.connect().await?;
    let Some(credential) = connected.credential().await? else {
        return Ok(login_required());
    };

    let id = EntryId::new(id);
    let resource = resource(&connected, schema);
    resource.list(&credential).await?;
    let mut form = resource.edit_form(&id).await?;
    apply(&mut form, values);

    let entries = resource.update(&credential, &id, &mut form).await?;
    output::success("Entrée mise à jour");
    output::entries(schema, &entries);
    Ok(ExitCode::SUCCESS)
}

pub async fn delete(app: &App, category: &str, id: &str, yes: bool) -> Result<ExitCode> {
    let schema = catalog::find(category)?;
    let connected = app.connect().await?;
    let Some(credential) = connected.credential().await? else {
        return Ok(login_required());
    };

    let confirm: Box<dyn Confirm> = if yes {
        Box::new(|_: &str| true)
    } else {
        Box::new(prompt::confirm)
    };

    let resource = resource(&connected, schema);
    match resource
        .delete(&credential, &EntryId::new(id), confirm.as_ref())
        .await?
    {
        DeleteOutcome::Deleted => {
            output::success("Entrée supprimée");
            output::entries(schema, &resource.entries().await);
        }
        DeleteOutcome::Cancelled => output::info("Suppression annulée"),
    }
    Ok(ExitCode::SUCCESS)
}

pub async fn roll(app: &App, category: &str) -> Result<ExitCode> {
    let schema = catalog::find(category)?;
    let connected = app.connect().await?;
    let Some(credential) = connected.credential().await? else {
        return Ok(login_required());
    };

    let resource = resource(&connected, schema);
    resource.list(&credential).await?;
    let entry = resource.pick_random().await?;
    output::roll(schema, &entry);
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("text=a=b").unwrap(),
            ("text".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_assignment(" notes =").unwrap(),
            ("notes".to_string(), String::new())
        );
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn test_apply_overrides_defaults() {
        let schema = catalog::find("de10").unwrap();
        let mut form = EntryForm::with_defaults(schema, 3);
        apply(&mut form, vec![("text".to_string(), "Danser".to_string())]);

        assert_eq!(form.get("number"), Some("4"));
        assert_eq!(form.get("text"), Some("Danser"));
    }
}

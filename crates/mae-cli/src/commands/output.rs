//! Terminal rendering: toasts, entry tables and the category list.

use colored::Colorize;
use mae_core::catalog::{CategorySchema, FieldKind};
use mae_core::{Entry, MaeError};

pub fn success(message: &str) {
    println!("{}", message.green());
}

pub fn info(message: &str) {
    println!("{}", message.cyan());
}

/// Error toast. Domain errors print their own message, anything else the
/// whole context chain.
pub fn error(err: &anyhow::Error) {
    let message = match err.downcast_ref::<MaeError>() {
        Some(e) => describe(e),
        None => format!("{:#}", err),
    };
    eprintln!("{}", format!("Erreur: {}", message).red());
}

pub fn login_required() {
    eprintln!(
        "{}",
        "Vous n'êtes pas connecté. Lancez `mae login <email>`.".yellow()
    );
}

/// User-facing text for domain errors.
pub fn describe(err: &MaeError) -> String {
    match err {
        MaeError::Authentication(message) => message.clone(),
        MaeError::Backend { message, .. } => message.clone(),
        MaeError::NoOptions { .. } => "Ajoutez des options d'abord".to_string(),
        other => other.to_string(),
    }
}

pub fn entries(schema: &CategorySchema, entries: &[Entry]) {
    println!("{}", format!("{} ({})", schema.title, entries.len()).bold());
    if entries.is_empty() {
        println!("{}", "  Aucune entrée".dimmed());
        return;
    }
    for entry in entries {
        println!("{}", entry_line(schema, entry));
    }
}

/// One entry as `[id] field: value | field: value`, empty fields omitted.
pub fn entry_line(schema: &CategorySchema, entry: &Entry) -> String {
    let values: Vec<String> = schema
        .fields
        .iter()
        .filter_map(|field| {
            let value = entry.text(field.name);
            if value.is_empty() {
                None
            } else {
                Some(format!("{}: {}", field.label, single_line(&value)))
            }
        })
        .collect();

    format!("  [{}] {}", entry.id.as_str().dimmed(), values.join(" | "))
}

pub fn roll(schema: &CategorySchema, entry: &Entry) {
    let number = entry
        .number("number")
        .map(|n| n.to_string())
        .unwrap_or_else(|| entry.id.to_string());
    println!("{}", format!("Résultat: {}", number).bold().magenta());
    let text = entry.text("text");
    if !text.is_empty() {
        println!("{}", text);
    }
    tracing::debug!("[Cli] Rolled {} in {}", entry.id, schema.key);
}

pub fn categories(schemas: &[CategorySchema]) {
    for schema in schemas {
        let mut flags = Vec::new();
        if !schema.editable {
            flags.push("sans édition");
        }
        if schema.dice {
            flags.push("dé");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" ({})", flags.join(", "))
        };
        println!("{}{}", format!("{:<12} {}", schema.key, schema.title).bold(), flags);

        for field in schema.fields {
            let kind = match field.kind {
                FieldKind::Choice(options) => format!("{}: {}", field.kind.label(), options.join("/")),
                kind => kind.label().to_string(),
            };
            let required = if field.required { "*" } else { "" };
            println!("    {}{} [{}] {}", field.name, required, kind, field.label.dimmed());
        }
    }
}

fn single_line(value: &str) -> String {
    value.lines().collect::<Vec<_>>().join(" / ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mae_core::catalog;
    use serde_json::json;

    #[test]
    fn test_entry_line_skips_empty_fields() {
        colored::control::set_override(false);
        let schema = catalog::find("liens").unwrap();
        let entry = Entry::from_document(json!({
            "_id": "l-1",
            "title": "Docs",
            "url": "https://example.com",
            "description": ""
        }))
        .unwrap();

        let line = entry_line(schema, &entry);
        assert!(line.starts_with("  [l-1] "));
        assert!(line.contains("Titre: Docs"));
        assert!(!line.contains("Description"));
    }

    #[test]
    fn test_describe_uses_backend_message() {
        assert_eq!(
            describe(&MaeError::backend(400, "Un compte avec cet email existe déjà")),
            "Un compte avec cet email existe déjà"
        );
        assert_eq!(
            describe(&MaeError::NoOptions { category: "de10" }),
            "Ajoutez des options d'abord"
        );
    }

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("a\nb"), "a / b");
    }
}

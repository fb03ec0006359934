//! Default values from `ifabsent`
//!
//! Turns a slot's `ifabsent` action into the Python expression used as the
//! field default.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use linkml_core::types::{IfAbsentAction, SlotDefinition};
use linkml_core::utils::expand_curie;
use tracing::debug;

use crate::generator::base::BaseCodeFormatter;
use crate::generator::traits::{GeneratorError, GeneratorResult};
use crate::schema_view::SchemaView;

/// Python expression for the `ifabsent` default of `slot` on `class_name`
///
/// Returns `None` when the slot has no `ifabsent`.
///
/// # Errors
///
/// Returns [`GeneratorError::SchemaIntegrity`] for malformed dates or when a
/// class or slot URI cannot be resolved.
pub fn ifabsent_value_declaration(
    view: &SchemaView,
    slot: &SlotDefinition,
    class_name: &str,
) -> GeneratorResult<Option<String>> {
    let Some(action) = &slot.ifabsent else {
        return Ok(None);
    };
    let quoted = |s: &str| BaseCodeFormatter::python_string(s);
    let schema = view.schema();

    let declaration = match action {
        IfAbsentAction::String(s) | IfAbsentAction::Uri(s) | IfAbsentAction::Curie(s) => quoted(s),
        IfAbsentAction::Int(i) => i.to_string(),
        IfAbsentAction::Float(f) => format_float(*f),
        IfAbsentAction::Bool(true) => "True".to_string(),
        IfAbsentAction::Bool(false) => "False".to_string(),
        IfAbsentAction::Date(text) => {
            let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|e| {
                GeneratorError::integrity(format!("invalid ifabsent date '{text}' on slot '{}': {e}", slot.name))
            })?;
            format!("date({}, {}, {})", date.year(), date.month(), date.day())
        }
        IfAbsentAction::Datetime(text) => {
            let dt = parse_datetime(text).ok_or_else(|| {
                GeneratorError::integrity(format!(
                    "invalid ifabsent datetime '{text}' on slot '{}'",
                    slot.name
                ))
            })?;
            format!(
                "datetime({}, {}, {}, {}, {}, {})",
                dt.year(),
                dt.month(),
                dt.day(),
                dt.hour(),
                dt.minute(),
                dt.second()
            )
        }
        IfAbsentAction::Bnode => {
            debug!(slot = %slot.name, "bnode defaults are left to the loader");
            "None".to_string()
        }
        IfAbsentAction::ClassCurie => quoted(&view.class_uri(class_name, false)?),
        IfAbsentAction::ClassUri => quoted(&view.class_uri(class_name, true)?),
        IfAbsentAction::ClassName => quoted(class_name),
        IfAbsentAction::SlotName => quoted(&slot.name),
        IfAbsentAction::SlotCurie => quoted(&slot_curie(view, slot)),
        IfAbsentAction::SlotUri => {
            let curie = slot_curie(view, slot);
            let uri = expand_curie(&curie, &schema.prefixes)
                .unwrap_or_else(|_| format!("{}/{}", schema.id.trim_end_matches('/'), slot.name));
            quoted(&uri)
        }
        IfAbsentAction::DefaultRange => match &schema.default_range {
            Some(range) => quoted(range),
            None => "None".to_string(),
        },
        IfAbsentAction::DefaultNs => match &schema.default_prefix {
            Some(prefix) => quoted(prefix),
            None => "None".to_string(),
        },
    };
    Ok(Some(declaration))
}

fn slot_curie(view: &SchemaView, slot: &SlotDefinition) -> String {
    slot.slot_uri.clone().unwrap_or_else(|| {
        let schema = view.schema();
        let prefix = schema.default_prefix.as_deref().unwrap_or(&schema.name);
        format!("{prefix}:{}", slot.name)
    })
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.naive_local())
        })
}

fn format_float(f: f64) -> String {
    let text = f.to_string();
    if text.contains(['.', 'e', 'E']) || !f.is_finite() {
        text
    } else {
        format!("{text}.0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkml_core::types::SchemaDefinition;
    use pretty_assertions::assert_eq;

    fn view() -> SchemaView {
        let schema = SchemaDefinition::from_yaml(
            r"
id: https://example.org/cfg
name: cfg
default_prefix: cfg
default_range: string
prefixes:
  cfg: https://example.org/cfg/
classes:
  Setting:
    slots: [label]
slots:
  label: {}
",
        )
        .expect("test schema parses");
        SchemaView::new(schema)
    }

    fn declare(view: &SchemaView, expr: &str) -> GeneratorResult<Option<String>> {
        let slot = SlotDefinition {
            ifabsent: Some(expr.parse()?),
            ..SlotDefinition::new("label")
        };
        ifabsent_value_declaration(view, &slot, "Setting")
    }

    #[test]
    fn test_literals() -> GeneratorResult<()> {
        let view = view();
        assert_eq!(declare(&view, "string(he said \"hi\")")?.as_deref(), Some("\"he said \\\"hi\\\"\""));
        assert_eq!(declare(&view, "int(42)")?.as_deref(), Some("42"));
        assert_eq!(declare(&view, "float(2)")?.as_deref(), Some("2.0"));
        assert_eq!(declare(&view, "true")?.as_deref(), Some("True"));
        assert_eq!(declare(&view, "False")?.as_deref(), Some("False"));
        assert_eq!(declare(&view, "bnode")?.as_deref(), Some("None"));
        Ok(())
    }

    #[test]
    fn test_dates() -> GeneratorResult<()> {
        let view = view();
        assert_eq!(declare(&view, "date(2020-01-31)")?.as_deref(), Some("date(2020, 1, 31)"));
        assert_eq!(
            declare(&view, "datetime(2020-01-31T03:04:05)")?.as_deref(),
            Some("datetime(2020, 1, 31, 3, 4, 5)")
        );
        assert!(matches!(declare(&view, "date(2020-13-45)"), Err(GeneratorError::SchemaIntegrity(_))));
        Ok(())
    }

    #[test]
    fn test_schema_relative_values() -> GeneratorResult<()> {
        let view = view();
        assert_eq!(declare(&view, "class_curie")?.as_deref(), Some("\"cfg:Setting\""));
        assert_eq!(
            declare(&view, "class_uri")?.as_deref(),
            Some("\"https://example.org/cfg/Setting\"")
        );
        assert_eq!(declare(&view, "slot_curie")?.as_deref(), Some("\"cfg:label\""));
        assert_eq!(declare(&view, "slot_uri")?.as_deref(), Some("\"https://example.org/cfg/label\""));
        assert_eq!(declare(&view, "class_name")?.as_deref(), Some("\"Setting\""));
        assert_eq!(declare(&view, "default_range")?.as_deref(), Some("\"string\""));
        assert_eq!(declare(&view, "default_ns")?.as_deref(), Some("\"cfg\""));
        Ok(())
    }

    #[test]
    fn test_absent() -> GeneratorResult<()> {
        let view = view();
        assert!(ifabsent_value_declaration(&view, &SlotDefinition::new("label"), "Setting")?.is_none());
        Ok(())
    }
}

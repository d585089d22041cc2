//! Generic entity console component.
//!
//! Every entity screen is the same machine - fetch a list, render it as a
//! table, open a dialog with a schema-bound form - so the rendering side is
//! one set of view types parameterized per entity, not five copies. A screen
//! module supplies its columns, its pre-formatted row cells, and its
//! [`FormSchema`]; the shared `console/index.html` and `console/new.html`
//! templates do the rest.

use std::collections::HashMap;

use crate::forms::{FieldErrors, FieldKind, FormSchema};

/// One renderable form field: descriptor plus current value and error.
#[derive(Debug, Clone)]
pub struct FieldView {
    pub name: String,
    pub label: String,
    pub input_type: String,
    pub multiline: bool,
    pub checkbox: bool,
    pub required: bool,
    pub value: String,
    pub checked: bool,
    pub error: Option<String>,
}

/// A renderable form: the schema joined with values and errors.
#[derive(Debug, Clone, Default)]
pub struct FormView {
    pub fields: Vec<FieldView>,
}

impl FormView {
    /// Empty form for a fresh dialog.
    #[must_use]
    pub fn blank(schema: &FormSchema) -> Self {
        Self::build(schema, &HashMap::new(), &FieldErrors::default())
    }

    /// Form prefilled from an existing entity (edit dialogs).
    #[must_use]
    pub fn prefilled(schema: &FormSchema, values: &HashMap<String, String>) -> Self {
        Self::build(schema, values, &FieldErrors::default())
    }

    /// Form re-rendered after a failed submit: the operator's in-progress
    /// values are preserved and field errors sit next to their inputs.
    #[must_use]
    pub fn build(
        schema: &FormSchema,
        values: &HashMap<String, String>,
        errors: &FieldErrors,
    ) -> Self {
        let fields = schema
            .fields()
            .iter()
            .map(|field| {
                let value = values.get(field.name()).cloned().unwrap_or_default();
                FieldView {
                    name: field.name().to_string(),
                    label: field.label().to_string(),
                    input_type: field.kind().input_type().to_string(),
                    multiline: field.kind() == FieldKind::TextArea,
                    checkbox: field.kind() == FieldKind::Bool,
                    required: field.is_required(),
                    checked: matches!(value.as_str(), "on" | "true" | "1"),
                    value,
                    error: errors.get(field.name()).map(ToString::to_string),
                }
            })
            .collect();
        Self { fields }
    }
}

/// An inline create dialog on a list screen.
#[derive(Debug, Clone)]
pub struct CreateDialog {
    /// POST target for the create form.
    pub action: String,
    /// Whether the dialog renders open (after a failed submit).
    pub open: bool,
    pub form: FormView,
}

/// One table row with its edit and delete sub-flows.
#[derive(Debug, Clone)]
pub struct RowView {
    /// Pre-formatted cell text, one entry per column.
    pub cells: Vec<String>,
    /// POST target for the edit form.
    pub edit_action: String,
    /// Whether the edit dialog renders open (after a failed submit).
    pub edit_open: bool,
    pub edit: FormView,
    /// POST target for the delete confirmation.
    pub delete_action: String,
    /// Confirmation prompt naming the record about to be removed.
    pub delete_prompt: String,
}

/// Everything the shared list template needs for one entity.
#[derive(Debug, Clone)]
pub struct ConsoleView {
    /// Screen heading, e.g. "Users".
    pub title: String,
    /// Singular noun for buttons, e.g. "user".
    pub singular: String,
    /// Column headings.
    pub columns: Vec<String>,
    pub rows: Vec<RowView>,
    /// Inline create dialog, for entities created from the list screen.
    pub create: Option<CreateDialog>,
    /// Link to a dedicated creation screen, for entities with large forms.
    pub new_path: Option<String>,
}

impl ConsoleView {
    /// Console with the given heading and columns, no rows yet.
    #[must_use]
    pub fn new(title: &str, singular: &str, columns: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            singular: singular.to_string(),
            columns: columns.iter().map(ToString::to_string).collect(),
            rows: Vec::new(),
            create: None,
            new_path: None,
        }
    }

    /// Attach the row set.
    #[must_use]
    pub fn rows(mut self, rows: Vec<RowView>) -> Self {
        self.rows = rows;
        self
    }

    /// Attach an inline create dialog.
    #[must_use]
    pub fn create_dialog(mut self, action: &str, form: FormView, open: bool) -> Self {
        self.create = Some(CreateDialog {
            action: action.to_string(),
            open,
            form,
        });
        self
    }

    /// Attach a link to a dedicated creation screen.
    #[must_use]
    pub fn new_screen(mut self, path: &str) -> Self {
        self.new_path = Some(path.to_string());
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::forms::FieldSchema;

    use super::*;

    fn schema() -> FormSchema {
        FormSchema::new()
            .field(FieldSchema::text("name", "Name").required())
            .field(FieldSchema::email("email", "E-mail").required())
            .field(FieldSchema::checkbox("signedContract", "Signed contract"))
            .field(FieldSchema::text_area("additionalNotes", "Notes"))
    }

    #[test]
    fn test_blank_form_has_empty_values_and_no_errors() {
        let form = FormView::blank(&schema());
        assert_eq!(form.fields.len(), 4);
        assert!(form.fields.iter().all(|f| f.value.is_empty()));
        assert!(form.fields.iter().all(|f| f.error.is_none()));
    }

    #[test]
    fn test_build_preserves_values_and_attaches_errors() {
        let mut values = HashMap::new();
        values.insert("name".to_string(), "Ana".to_string());
        values.insert("email".to_string(), "broken".to_string());
        let errors = schema()
            .validate(&values)
            .expect_err("email should fail validation");

        let form = FormView::build(&schema(), &values, &errors);
        let email = form.fields.iter().find(|f| f.name == "email").unwrap();
        // The operator's in-progress input is not lost on a failed submit.
        assert_eq!(email.value, "broken");
        assert!(email.error.is_some());

        let name = form.fields.iter().find(|f| f.name == "name").unwrap();
        assert_eq!(name.value, "Ana");
        assert!(name.error.is_none());
    }

    #[test]
    fn test_checkbox_and_textarea_render_flags() {
        let mut values = HashMap::new();
        values.insert("signedContract".to_string(), "on".to_string());
        let form = FormView::prefilled(&schema(), &values);

        let checkbox = form
            .fields
            .iter()
            .find(|f| f.name == "signedContract")
            .unwrap();
        assert!(checkbox.checkbox);
        assert!(checkbox.checked);

        let notes = form
            .fields
            .iter()
            .find(|f| f.name == "additionalNotes")
            .unwrap();
        assert!(notes.multiline);
    }

    #[test]
    fn test_console_builder() {
        let view = ConsoleView::new("Users", "user", &["ID", "Name"])
            .create_dialog("/users", FormView::blank(&schema()), false)
            .rows(vec![]);
        assert_eq!(view.title, "Users");
        assert_eq!(view.columns, vec!["ID".to_string(), "Name".to_string()]);
        assert!(view.create.is_some());
        assert!(view.new_path.is_none());
    }
}

use serde::{Deserialize, Serialize};

/// A form input discovered on the page. Read-only for the resolution core:
/// it is only ever inspected to infer a question and pick a value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormField {
    pub r#type: String,
    pub label: String,
    pub placeholder: String,
    pub name: String,
    pub id: String,
    pub value: String,
    pub required: bool,
    pub visible: bool,
    pub selector: String,
}

impl FormField {
    /// The question this field is asking, inferred in priority order:
    /// label, placeholder, name, id. Underscores and hyphens in attribute
    /// names are normalized to spaces.
    pub fn question(&self) -> String {
        let label = self.label.trim();
        if !label.is_empty() {
            return label.to_string();
        }
        let placeholder = self.placeholder.trim();
        if !placeholder.is_empty() {
            return placeholder.to_string();
        }
        let name = normalize_attr(&self.name);
        if !name.is_empty() {
            return name;
        }
        normalize_attr(&self.id)
    }
}

fn normalize_attr(raw: &str) -> String {
    raw.replace(['_', '-'], " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_wins_over_everything() {
        let field = FormField {
            label: "  Full Name  ".into(),
            placeholder: "Enter name".into(),
            name: "applicant_name".into(),
            id: "field-1".into(),
            ..Default::default()
        };
        assert_eq!(field.question(), "Full Name");
    }

    #[test]
    fn placeholder_is_second_choice() {
        let field = FormField {
            placeholder: "Your email".into(),
            name: "email".into(),
            ..Default::default()
        };
        assert_eq!(field.question(), "Your email");
    }

    #[test]
    fn name_attribute_is_normalized() {
        let field = FormField {
            name: "cover_letter-text".into(),
            ..Default::default()
        };
        assert_eq!(field.question(), "cover letter text");
    }

    #[test]
    fn id_is_last_resort() {
        let field = FormField {
            id: "phone-number".into(),
            ..Default::default()
        };
        assert_eq!(field.question(), "phone number");
    }

    #[test]
    fn everything_empty_yields_empty_question() {
        assert_eq!(FormField::default().question(), "");
    }
}

use super::TypeSchema;
use std::fmt;

/// Renders a schema as an indented tree, one property per line.
///
/// ```text
/// └── object Person
///     ├── name: string String (required)
///     └── friends: array Vec<Person>
///         └── []: object Person
/// ```
pub struct DisplaySchema<'a> {
    pub schema: &'a TypeSchema,
}

impl<'a> fmt::Display for DisplaySchema<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_as_tree(self.schema, None, false, f, "", true)
    }
}

impl<'a> DisplaySchema<'a> {
    fn fmt_as_tree(
        &self,
        schema: &TypeSchema,
        label: Option<&str>,
        required: bool,
        f: &mut fmt::Formatter<'_>,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let node_marker = if is_last { "└── " } else { "├── " };
        write!(f, "{}{}", prefix, node_marker)?;
        if let Some(label) = label {
            write!(f, "{}: ", label)?;
        }
        write!(f, "{}", schema.kind.as_str())?;
        if !schema.title.is_empty() {
            write!(f, " {}", schema.title)?;
        }
        if required {
            write!(f, " (required)")?;
        }
        writeln!(f)?;

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });

        let mut children: Vec<(String, &TypeSchema, bool)> = schema
            .ordered_properties()
            .into_iter()
            .map(|(key, child)| (key.to_string(), child, schema.is_required(key)))
            .collect();
        if let Some(items) = &schema.items {
            children.push(("[]".to_string(), items, false));
        }
        if let Some(values) = &schema.additional_properties {
            children.push(("{}".to_string(), values, false));
        }

        let count = children.len();
        for (index, (key, child, required)) in children.into_iter().enumerate() {
            self.fmt_as_tree(child, Some(&key), required, f, &child_prefix, index + 1 == count)?;
        }
        Ok(())
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, ValidationError, ValidationIssue, ValidationReport};
use crate::message::{MessageObject, scalar_matches};
use crate::model::{Children, Content, ContentVariable, Service, VariableType};

/// Strictness applied while validating a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Accept fields and list elements the schema does not declare.
    pub allow_additional_fields: bool,
    /// Accept absent fields, short lists and null segments.
    pub allow_missing_fields: bool,
}

impl ValidationOptions {
    pub fn new(allow_additional_fields: bool, allow_missing_fields: bool) -> Self {
        Self {
            allow_additional_fields,
            allow_missing_fields,
        }
    }

    /// Exact match: nothing missing, nothing extra.
    pub fn strict() -> Self {
        Self::new(false, false)
    }

    pub fn lenient() -> Self {
        Self::new(true, true)
    }
}

/// Validate a message against the outputs of a service.
///
/// Returns the first error found, walking schema outputs in order and then
/// object keys and list elements in message order.
pub fn validate(msg: &MessageObject, service: &Service, options: ValidationOptions) -> Result<()> {
    validate_contents(msg, &service.outputs, options)
}

/// Validate a message against an explicit list of contents.
pub fn validate_contents(
    msg: &MessageObject,
    contents: &[Content],
    options: ValidationOptions,
) -> Result<()> {
    let mut validation = Validation {
        options,
        report: None,
    };
    validation
        .object_fields(msg, variables_of(contents), Path::ROOT)
        .inspect_err(|err| debug!(code = err.code(), error = %err, "message rejected"))
}

/// Validate a message and collect every issue instead of stopping at the first.
pub fn validate_report(
    msg: &MessageObject,
    service: &Service,
    options: ValidationOptions,
) -> ValidationReport {
    validate_report_contents(msg, &service.outputs, options)
}

pub fn validate_report_contents(
    msg: &MessageObject,
    contents: &[Content],
    options: ValidationOptions,
) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut validation = Validation {
        options,
        report: Some(&mut report),
    };
    // Collecting mode records issues instead of returning them.
    let _ = validation.object_fields(msg, variables_of(contents), Path::ROOT);
    debug!(issues = report.issues.len(), "validation report built");
    report
}

fn variables_of(contents: &[Content]) -> impl Iterator<Item = &ContentVariable> + Clone {
    contents.iter().map(|content| &content.content_variable)
}

/// JSON-pointer style location, built on the stack while walking.
#[derive(Clone, Copy)]
struct Path<'p> {
    parent: Option<&'p Path<'p>>,
    segment: &'p str,
}

impl Path<'static> {
    const ROOT: Path<'static> = Path {
        parent: None,
        segment: "",
    };
}

impl<'p> Path<'p> {
    fn child(&'p self, segment: &'p str) -> Path<'p> {
        Path {
            parent: Some(self),
            segment,
        }
    }

    fn render(&self) -> String {
        let mut segments = Vec::new();
        let mut current = Some(self);
        while let Some(path) = current {
            if path.parent.is_some() {
                segments.push(path.segment);
            }
            current = path.parent;
        }
        if segments.is_empty() {
            return "/".to_string();
        }
        segments
            .iter()
            .rev()
            .map(|segment| format!("/{segment}"))
            .collect()
    }
}

struct Validation<'r> {
    options: ValidationOptions,
    report: Option<&'r mut ValidationReport>,
}

impl Validation<'_> {
    /// Fail fast, or record the issue and keep walking when building a report.
    fn fail(&mut self, path: Path<'_>, error: ValidationError) -> Result<()> {
        match self.report.as_deref_mut() {
            Some(report) => {
                report.push(ValidationIssue::from_error(path.render(), &error));
                Ok(())
            }
            None => Err(error),
        }
    }

    fn object_fields<'s, I>(
        &mut self,
        object: &MessageObject,
        variables: I,
        path: Path<'_>,
    ) -> Result<()>
    where
        I: IntoIterator<Item = &'s ContentVariable> + Clone,
    {
        for variable in variables.clone() {
            let field_path = path.child(&variable.name);
            match object.get(&variable.name) {
                Some(segment) => self.segment(segment, variable, field_path)?,
                None if self.options.allow_missing_fields => {}
                None => self.fail(
                    field_path,
                    ValidationError::MissingField(variable.name.clone()),
                )?,
            }
        }

        if !self.options.allow_additional_fields {
            for key in object.keys() {
                let declared = variables
                    .clone()
                    .into_iter()
                    .any(|variable| variable.name == *key);
                if !declared {
                    self.fail(path.child(key), ValidationError::UnexpectedField(key.clone()))?;
                }
            }
        }

        Ok(())
    }

    fn segment(&mut self, segment: &Value, variable: &ContentVariable, path: Path<'_>) -> Result<()> {
        match segment {
            Value::Null => {
                if self.options.allow_missing_fields {
                    Ok(())
                } else {
                    self.fail(path, ValidationError::unexpected_type(variable, segment))
                }
            }
            Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                if scalar_matches(variable.variable_type, segment) {
                    Ok(())
                } else {
                    self.fail(path, ValidationError::unexpected_type(variable, segment))
                }
            }
            Value::Object(object) => {
                if variable.variable_type != VariableType::Structure {
                    return self.fail(path, ValidationError::unexpected_type(variable, segment));
                }
                match &variable.children {
                    Children::Wildcard(template) => {
                        for (key, value) in object {
                            self.segment(value, template, path.child(key))?;
                        }
                        Ok(())
                    }
                    Children::Named(children) => self.object_fields(object, children, path),
                }
            }
            Value::Array(items) => {
                if variable.variable_type != VariableType::List {
                    return self.fail(path, ValidationError::unexpected_type(variable, segment));
                }
                match &variable.children {
                    Children::Wildcard(template) => {
                        for (index, item) in items.iter().enumerate() {
                            let index = index.to_string();
                            self.segment(item, template, path.child(&index))?;
                        }
                        Ok(())
                    }
                    Children::Named(children) => self.list_items(items, children, path),
                }
            }
        }
    }

    /// Children are matched by parsed index, so their declaration order is irrelevant.
    fn list_items(
        &mut self,
        items: &[Value],
        children: &[ContentVariable],
        path: Path<'_>,
    ) -> Result<()> {
        let mut indexed = Vec::with_capacity(children.len());
        for child in children {
            match child.list_index() {
                Ok(index) => indexed.push((index, child)),
                Err(err) => self.fail(path.child(&child.name), err)?,
            }
        }

        if !self.options.allow_additional_fields {
            let surplus =
                (0..items.len()).find(|position| !indexed.iter().any(|(index, _)| index == position));
            if let Some(position) = surplus {
                let position = position.to_string();
                self.fail(
                    path.child(&position),
                    ValidationError::UnexpectedField(position.clone()),
                )?;
            }
        }
        if !self.options.allow_missing_fields {
            let first_absent = indexed
                .iter()
                .filter(|(index, _)| *index >= items.len())
                .min_by_key(|(index, _)| *index);
            if let Some((_, child)) = first_absent {
                self.fail(
                    path.child(&child.name),
                    ValidationError::MissingField(child.name.clone()),
                )?;
            }
        }

        for (index, child) in &indexed {
            if let Some(item) = items.get(*index) {
                self.segment(item, child, path.child(&child.name))?;
            }
        }

        Ok(())
    }
}

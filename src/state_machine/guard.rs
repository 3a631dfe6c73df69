//! Guard resolvers
//!
//! One pure function per node kind. Each decides what a single input does on the
//! current node; none of them touch the graph, so target existence is checked
//! later when the transition lands.

use super::date::{elapsed_days, parse_strict_date};
use super::input::NormalizedInput;
use super::state::{CapturedField, FormCapture};
use crate::config::{EngineConfig, Messages};
use crate::flow::{FlowNode, FormDefinition};
use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Identifier-shaped input: national ID, order number
static NUMERIC_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{7,12}$").expect("identifier pattern is valid"));

/// Input the current node cannot act on. The session stays put and the user retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GuardFailure {
    #[error("input is not a DD/MM/YYYY calendar date")]
    InvalidDateFormat,
    #[error("input matches no option of the current node")]
    UnrecognizedOption,
}

impl GuardFailure {
    pub fn message(self, messages: &Messages) -> &str {
        match self {
            GuardFailure::InvalidDateFormat => &messages.invalid_date,
            GuardFailure::UnrecognizedOption => &messages.not_understood,
        }
    }
}

/// What one input does on the current node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Land on `target`, after emitting `preface` if any
    Transition {
        target: String,
        preface: Option<String>,
    },
    /// Stay on the node and explain why
    Retry(GuardFailure),
    /// A form field was stored; stay and ask for the next one
    FormProgress {
        capture: FormCapture,
        prompt: Option<String>,
    },
    /// The last form field was stored
    FormComplete {
        message: String,
        target: String,
        fields: Vec<CapturedField>,
    },
}

impl Resolution {
    fn to(target: impl Into<String>) -> Self {
        Resolution::Transition {
            target: target.into(),
            preface: None,
        }
    }

    fn to_with(target: impl Into<String>, preface: impl Into<String>) -> Self {
        Resolution::Transition {
            target: target.into(),
            preface: Some(preface.into()),
        }
    }
}

/// Exit tokens first, then store the literal as the next field
pub fn resolve_form(
    capture: &FormCapture,
    form: &FormDefinition,
    input: &NormalizedInput,
    config: &EngineConfig,
) -> Resolution {
    if input.folded == config.menu_token.to_uppercase() {
        return Resolution::to(&config.root);
    }
    if input.folded == config.back_token.to_uppercase() {
        return Resolution::to(form.back_target.as_deref().unwrap_or(&config.root));
    }

    let mut capture = capture.clone();
    if let Some(field) = form.fields.get(capture.step) {
        capture.fields.push(CapturedField {
            name: field.name.clone(),
            value: input.literal.clone(),
        });
        capture.step += 1;
    }

    match form.fields.get(capture.step) {
        Some(next) => Resolution::FormProgress {
            prompt: next.prompt.clone(),
            capture,
        },
        None => {
            let template = form
                .completion_message
                .as_deref()
                .unwrap_or(&config.messages.form_completed);
            Resolution::FormComplete {
                message: fill_template(template, &capture.fields),
                target: form.completion_target.clone(),
                fields: capture.fields,
            }
        }
    }
}

/// Early dates go to the shared early target, later ones to this node's own target
pub fn resolve_date(
    late_target: &str,
    input: &NormalizedInput,
    now: NaiveDateTime,
    config: &EngineConfig,
) -> Resolution {
    let Some(date) = parse_strict_date(&input.literal) else {
        return Resolution::Retry(GuardFailure::InvalidDateFormat);
    };

    let days = elapsed_days(date, now);
    tracing::debug!(%date, days, "Date branch evaluated");
    if days <= config.date_branches.early_threshold_days {
        Resolution::to(&config.date_branches.early_target)
    } else {
        Resolution::to(late_target)
    }
}

/// Content of the input is ignored
pub fn resolve_auto(target: &str) -> Resolution {
    Resolution::to(target)
}

/// Identifier-shaped input goes to `target`, anything else is an option lookup
pub fn resolve_dynamic(
    target: &str,
    node: &FlowNode,
    input: &NormalizedInput,
    config: &EngineConfig,
) -> Resolution {
    if is_numeric_identifier(&input.literal) {
        Resolution::to(target)
    } else {
        resolve_options(node, input, config)
    }
}

pub fn resolve_options(
    node: &FlowNode,
    input: &NormalizedInput,
    config: &EngineConfig,
) -> Resolution {
    let Some(options) = &node.options else {
        return Resolution::to_with(&config.root, &config.messages.no_options);
    };
    if let Some(target) = node.option_target(&input.folded) {
        return Resolution::to(target);
    }
    if options.is_empty() {
        // Free-text node: whatever was typed is accepted
        Resolution::to_with(&config.root, &config.messages.acknowledgment)
    } else {
        Resolution::Retry(GuardFailure::UnrecognizedOption)
    }
}

pub fn is_numeric_identifier(literal: &str) -> bool {
    NUMERIC_IDENTIFIER.is_match(literal)
}

/// Replace `{name}` placeholders with captured values
fn fill_template(template: &str, fields: &[CapturedField]) -> String {
    fields.iter().fold(template.to_string(), |text, field| {
        text.replace(&format!("{{{}}}", field.name), &field.value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::FormField;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn input(raw: &str) -> NormalizedInput {
        NormalizedInput::new(raw).unwrap()
    }

    fn contact_form() -> FormDefinition {
        FormDefinition {
            fields: vec![
                FormField {
                    name: "nombre".to_string(),
                    prompt: None,
                },
                FormField {
                    name: "correo".to_string(),
                    prompt: Some("¿Tu correo?".to_string()),
                },
            ],
            completion_message: Some("Gracias {nombre}, te escribimos a {correo}.".to_string()),
            completion_target: "gracias".to_string(),
            back_target: Some("soporte".to_string()),
        }
    }

    fn node_with_options(options: Option<&[(&str, &str)]>) -> FlowNode {
        FlowNode {
            message: "menu".to_string(),
            options: options.map(|pairs| {
                pairs
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect::<HashMap<_, _>>()
            }),
            ..FlowNode::default()
        }
    }

    #[test]
    fn test_form_stores_literal_and_prompts_next() {
        let config = EngineConfig::default();
        let resolution = resolve_form(
            &FormCapture::new("registro"),
            &contact_form(),
            &input("  Jane Doe "),
            &config,
        );

        match resolution {
            Resolution::FormProgress { capture, prompt } => {
                assert_eq!(capture.step, 1);
                assert_eq!(capture.value("nombre"), Some("Jane Doe"));
                assert_eq!(prompt.as_deref(), Some("¿Tu correo?"));
            }
            other => panic!("expected progress, got {other:?}"),
        }
    }

    #[test]
    fn test_form_completion_fills_template() {
        let config = EngineConfig::default();
        let mut capture = FormCapture::new("registro");
        capture.fields.push(CapturedField {
            name: "nombre".to_string(),
            value: "Jane".to_string(),
        });
        capture.step = 1;

        let resolution = resolve_form(&capture, &contact_form(), &input("jane@x.com"), &config);
        assert_eq!(
            resolution,
            Resolution::FormComplete {
                message: "Gracias Jane, te escribimos a jane@x.com.".to_string(),
                target: "gracias".to_string(),
                fields: vec![
                    CapturedField {
                        name: "nombre".to_string(),
                        value: "Jane".to_string()
                    },
                    CapturedField {
                        name: "correo".to_string(),
                        value: "jane@x.com".to_string()
                    },
                ],
            }
        );
    }

    #[test]
    fn test_form_exit_tokens_are_case_insensitive() {
        let config = EngineConfig::default();
        let capture = FormCapture::new("registro");

        assert_eq!(
            resolve_form(&capture, &contact_form(), &input("menu"), &config),
            Resolution::to("menuPrincipal")
        );
        assert_eq!(
            resolve_form(&capture, &contact_form(), &input("Volver"), &config),
            Resolution::to("soporte")
        );

        let mut no_back = contact_form();
        no_back.back_target = None;
        assert_eq!(
            resolve_form(&capture, &no_back, &input("VOLVER"), &config),
            Resolution::to("menuPrincipal")
        );
    }

    #[test]
    fn test_date_branch_thresholds() {
        let config = EngineConfig::default();
        let feb_20 = NaiveDate::from_ymd_opt(2024, 2, 20)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let feb_26 = NaiveDate::from_ymd_opt(2024, 2, 26)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        assert_eq!(
            resolve_date("garantiaTienda", &input("15/02/2024"), feb_20, &config),
            Resolution::to("cambioDOA")
        );
        assert_eq!(
            resolve_date("garantiaTienda", &input("15/02/2024"), feb_26, &config),
            Resolution::to("garantiaTienda")
        );
        assert_eq!(
            resolve_date("garantiaTienda", &input("31/02/2024"), feb_20, &config),
            Resolution::Retry(GuardFailure::InvalidDateFormat)
        );
    }

    #[test]
    fn test_numeric_identifier_band() {
        assert!(is_numeric_identifier("1234567"));
        assert!(is_numeric_identifier("123456789012"));
        assert!(!is_numeric_identifier("123456"));
        assert!(!is_numeric_identifier("1234567890123"));
        assert!(!is_numeric_identifier("1234567A"));
        assert!(!is_numeric_identifier("1234 5678"));
    }

    #[test]
    fn test_dynamic_falls_back_to_options() {
        let config = EngineConfig::default();
        let node = node_with_options(Some(&[("1", "pedidos")]));

        assert_eq!(
            resolve_dynamic("consulta", &node, &input("12345678"), &config),
            Resolution::to("consulta")
        );
        assert_eq!(
            resolve_dynamic("consulta", &node, &input("1"), &config),
            Resolution::to("pedidos")
        );
        assert_eq!(
            resolve_dynamic("consulta", &node, &input("1234567A"), &config),
            Resolution::Retry(GuardFailure::UnrecognizedOption)
        );
    }

    #[test]
    fn test_option_misses() {
        let config = EngineConfig::default();

        assert_eq!(
            resolve_options(&node_with_options(None), &input("hola"), &config),
            Resolution::to_with("menuPrincipal", config.messages.no_options.clone())
        );
        assert_eq!(
            resolve_options(&node_with_options(Some(&[])), &input("mi pedido 42"), &config),
            Resolution::to_with("menuPrincipal", config.messages.acknowledgment.clone())
        );
        assert_eq!(
            resolve_options(&node_with_options(Some(&[("a", "x")])), &input("b"), &config),
            Resolution::Retry(GuardFailure::UnrecognizedOption)
        );
        assert_eq!(
            resolve_options(&node_with_options(Some(&[("a", "x")])), &input("A"), &config),
            Resolution::to("x")
        );
    }
}

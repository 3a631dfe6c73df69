//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use crate::config::EngineConfig;
use crate::flow::{FlowDocument, FlowGraph, FormField, FormDefinition};
use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

const NODES: &[&str] = &[
    "menuPrincipal",
    "pedido",
    "automatico",
    "registro",
    "fechaCompraTienda",
    "nota",
];

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 2, 20)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn test_context() -> FlowContext {
    let mut config = EngineConfig::default();
    config.forms.insert(
        "registro".to_string(),
        FormDefinition {
            fields: vec![
                FormField {
                    name: "nombre".to_string(),
                    prompt: None,
                },
                FormField {
                    name: "correo".to_string(),
                    prompt: Some("¿Correo?".to_string()),
                },
            ],
            completion_message: None,
            completion_target: "menuPrincipal".to_string(),
            back_target: None,
        },
    );

    let document = FlowDocument {
        origin: "proptest.json".to_string(),
        nodes: serde_json::from_value(serde_json::json!({
            "menuPrincipal": {
                "message": "Menú",
                "options": { "pedidos": "pedido", "Auto": "automatico", "r": "registro" }
            },
            "pedido": {
                "message": "Número de pedido",
                "options": { "volver": "menuPrincipal" },
                "dynamicInput": "encontrado"
            },
            "encontrado": { "message": "Encontrado" },
            "automatico": { "message": "Cuéntanos", "options": { "__AUTO__": "nota" } },
            "nota": { "message": "Anotado", "options": {} },
            "registro": { "message": "¿Nombre?" },
            "fechaCompraTienda": { "message": "¿Fecha?" },
            "cambioDOA": { "message": "DOA" },
            "garantiaTienda": { "message": "Garantía" }
        }))
        .unwrap(),
    };
    let graph = FlowGraph::build([document], &config);
    FlowContext::new("proptest", Arc::new(graph), Arc::new(config))
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_state() -> impl Strategy<Value = SessionState> {
    (prop::sample::select(NODES), any::<bool>()).prop_map(|(node, capturing)| {
        let mut state = SessionState::at(node);
        if capturing && node == "registro" {
            state.form_capture = Some(FormCapture::new(node));
        }
        state
    })
}

fn arb_whitespace() -> impl Strategy<Value = String> {
    "[ \t\r\n]{0,8}"
}

/// Random upper/lower casing of `token`
fn arb_casing(token: &'static str) -> impl Strategy<Value = String> {
    proptest::collection::vec(any::<bool>(), token.len()).prop_map(move |upper| {
        token
            .chars()
            .zip(upper)
            .map(|(c, up)| {
                if up {
                    c.to_ascii_uppercase()
                } else {
                    c.to_ascii_lowercase()
                }
            })
            .collect()
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_whitespace_input_is_noop(state in arb_state(), text in arb_whitespace()) {
        let context = test_context();
        let result = transition(&state, &context, Event::user_input(text, now())).unwrap();
        prop_assert_eq!(result.new_state, state);
        prop_assert!(result.effects.is_empty());
    }

    #[test]
    fn prop_option_casing_is_irrelevant(token in arb_casing("pedidos")) {
        let context = test_context();
        let state = SessionState::at("menuPrincipal");
        let result = transition(&state, &context, Event::user_input(token, now())).unwrap();
        prop_assert_eq!(result.new_state, SessionState::at("pedido"));
    }

    #[test]
    fn prop_identifiers_follow_dynamic_input(id in "[0-9]{7,12}") {
        let context = test_context();
        let state = SessionState::at("pedido");
        let result = transition(&state, &context, Event::user_input(id, now())).unwrap();
        prop_assert_eq!(result.new_state, SessionState::at("encontrado"));
    }

    #[test]
    fn prop_short_or_lettered_ids_stay(id in "[0-9]{1,6}|[0-9]{3,6}[A-Za-z][0-9]{3,5}") {
        let context = test_context();
        let state = SessionState::at("pedido");
        let result = transition(&state, &context, Event::user_input(id, now())).unwrap();
        prop_assert_eq!(result.new_state, state);
    }

    #[test]
    fn prop_auto_accepts_anything(text in "[a-zA-Z0-9 ]{0,20}[a-zA-Z0-9]") {
        let context = test_context();
        let state = SessionState::at("automatico");
        let result = transition(&state, &context, Event::user_input(text, now())).unwrap();
        prop_assert_eq!(result.new_state, SessionState::at("nota"));
    }

    #[test]
    fn prop_non_dates_never_leave_date_node(text in "[0-9/]{1,12}") {
        prop_assume!(date::parse_strict_date(&text).is_none());
        let context = test_context();
        let state = SessionState::at("fechaCompraTienda");
        let result = transition(&state, &context, Event::user_input(text, now())).unwrap();
        prop_assert_eq!(result.new_state, state);
    }

    #[test]
    fn prop_every_transition_lands_on_existing_node(state in arb_state(), text in "[a-zA-Z0-9 /]{1,14}") {
        let context = test_context();
        let result = transition(&state, &context, Event::user_input(text, now())).unwrap();
        prop_assert!(context.graph.contains(&result.new_state.current_node));
        if let Some(capture) = &result.new_state.form_capture {
            prop_assert_eq!(&capture.node, &result.new_state.current_node);
        }
    }
}

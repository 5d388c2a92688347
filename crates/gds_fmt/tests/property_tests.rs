//! Property-based tests for the formatter.
//!
//! Generates synthetic GDScript and verifies the formatter's contract:
//!
//! 1. Idempotence: `format(format(code)) == format(code)`
//! 2. Parse-ability: formatted output parses again
//! 3. Exactly one trailing newline, never two consecutive blank lines
//! 4. Comment preservation
//! 5. Width bound (content past the indentation stays within budget)
//! 6. Binary operators carry one space on each side in flat form

use gds_fmt::{format, FormatConfig};
use proptest::prelude::*;

fn config() -> FormatConfig {
    FormatConfig {
        line_length_maximum: 100,
        indent_in_multiline_block: 1,
    }
}

fn is_keyword(s: &str) -> bool {
    matches!(
        s,
        "class"
            | "class_name"
            | "extends"
            | "func"
            | "static"
            | "var"
            | "const"
            | "signal"
            | "enum"
            | "if"
            | "elif"
            | "else"
            | "for"
            | "while"
            | "match"
            | "break"
            | "continue"
            | "pass"
            | "return"
            | "breakpoint"
            | "assert"
            | "await"
            | "and"
            | "or"
            | "not"
            | "in"
            | "is"
            | "as"
            | "self"
            | "super"
            | "true"
            | "false"
            | "null"
            | "void"
            | "preload"
            | "set"
            | "get"
    )
}

// -- Code generation strategies --

fn identifier_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,12}")
        .expect("valid regex")
        .prop_filter("not a keyword", |s| !is_keyword(s))
}

fn int_literal_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (0i64..=100_000).prop_map(|n| n.to_string()),
        Just("0x1F".to_string()),
        Just("0b1010".to_string()),
    ]
}

fn float_literal_strategy() -> impl Strategy<Value = String> {
    (0.0f64..1000.0).prop_map(|f| format!("{f:.2}"))
}

fn string_literal_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 _]{0,20}")
        .expect("valid regex")
        .prop_map(|s| format!("\"{s}\""))
}

fn simple_expr_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        int_literal_strategy(),
        float_literal_strategy(),
        string_literal_strategy(),
        identifier_strategy(),
        Just("true".to_string()),
        Just("false".to_string()),
        Just("null".to_string()),
        Just("self".to_string()),
    ]
}

fn binary_op_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("+".to_string()),
        Just("-".to_string()),
        Just("*".to_string()),
        Just("/".to_string()),
        Just("%".to_string()),
        Just("==".to_string()),
        Just("!=".to_string()),
        Just("<".to_string()),
        Just(">=".to_string()),
        Just("and".to_string()),
        Just("or".to_string()),
    ]
}

fn binary_expr_strategy() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(simple_expr_strategy(), 2..6),
        prop::collection::vec(binary_op_strategy(), 1..5),
    )
        .prop_map(|(operands, ops)| {
            let mut out = operands[0].clone();
            for (i, op) in ops.iter().enumerate() {
                if i + 1 < operands.len() {
                    out.push_str(&format!(" {op} {}", operands[i + 1]));
                }
            }
            out
        })
}

fn array_expr_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(simple_expr_strategy(), 0..8)
        .prop_map(|items| format!("[{}]", items.join(", ")))
}

fn dict_expr_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        (string_literal_strategy(), simple_expr_strategy()),
        0..5,
    )
    .prop_map(|entries| {
        let body = entries
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{{{body}}}")
    })
}

fn call_expr_strategy() -> impl Strategy<Value = String> {
    (
        identifier_strategy(),
        prop::collection::vec(simple_expr_strategy(), 0..4),
    )
        .prop_map(|(name, args)| format!("{name}({})", args.join(", ")))
}

fn value_expr_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        simple_expr_strategy(),
        binary_expr_strategy(),
        array_expr_strategy(),
        dict_expr_strategy(),
        call_expr_strategy(),
    ]
}

fn var_member_strategy() -> impl Strategy<Value = String> {
    (identifier_strategy(), value_expr_strategy(), any::<bool>()).prop_map(
        |(name, value, infer)| {
            if infer {
                format!("var {name} := {value}")
            } else {
                format!("var {name} = {value}")
            }
        },
    )
}

fn const_member_strategy() -> impl Strategy<Value = String> {
    (identifier_strategy(), value_expr_strategy())
        .prop_map(|(name, value)| format!("const {} = {value}", name.to_uppercase()))
}

fn signal_member_strategy() -> impl Strategy<Value = String> {
    (
        identifier_strategy(),
        prop::collection::vec(identifier_strategy(), 0..4),
    )
        .prop_map(|(name, params)| {
            if params.is_empty() {
                format!("signal {name}")
            } else {
                format!("signal {name}({})", params.join(", "))
            }
        })
}

fn statement_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("pass".to_string()),
        (identifier_strategy(), value_expr_strategy())
            .prop_map(|(name, value)| format!("{name} = {value}")),
        value_expr_strategy().prop_map(|value| format!("return {value}")),
        (identifier_strategy(), value_expr_strategy())
            .prop_map(|(name, value)| format!("var {name} = {value}")),
    ]
}

fn func_member_strategy() -> impl Strategy<Value = String> {
    (
        identifier_strategy(),
        prop::collection::vec(identifier_strategy(), 0..3),
        prop::collection::vec(statement_strategy(), 1..4),
    )
        .prop_map(|(name, params, body)| {
            let body = body
                .iter()
                .map(|stmt| format!("\t{stmt}"))
                .collect::<Vec<_>>()
                .join("\n");
            format!("func {name}({}):\n{body}", params.join(", "))
        })
}

fn module_strategy() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(const_member_strategy(), 0..3),
        prop::collection::vec(signal_member_strategy(), 0..2),
        prop::collection::vec(var_member_strategy(), 0..3),
        prop::collection::vec(func_member_strategy(), 0..3),
    )
        .prop_map(|(consts, signals, vars, funcs)| {
            let mut parts = Vec::new();
            parts.extend(consts);
            parts.extend(signals);
            parts.extend(vars);
            parts.extend(funcs);
            parts.join("\n")
        })
        .prop_filter("non-empty module", |s| !s.trim().is_empty())
}

fn commented_module_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        (
            var_member_strategy(),
            prop::string::string_regex("[a-zA-Z ]{1,20}").expect("valid regex"),
        ),
        1..4,
    )
    .prop_map(|members| {
        members
            .iter()
            .map(|(member, note)| format!("# {note}\n{member} # {note}"))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

// -- Helpers --

fn format_ok(source: &str) -> Option<String> {
    format(source, &config()).ok()
}

fn assert_idempotent(source: &str) {
    let Some(first) = format_ok(source) else {
        // Generated code the parser rejects is out of scope here.
        return;
    };
    let second = format(&first, &config())
        .unwrap_or_else(|e| panic!("output failed to re-parse: {e}\n--- output ---\n{first}"));
    assert_eq!(second, first, "not idempotent for input:\n{source}");
}

fn line_content_width(line: &str) -> usize {
    line.trim_start_matches('\t').chars().count()
}

// -- Property tests --

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    })]

    #[test]
    fn prop_var_idempotence(member in var_member_strategy()) {
        assert_idempotent(&member);
    }

    #[test]
    fn prop_binary_chain_idempotence(expr in binary_expr_strategy()) {
        assert_idempotent(&format!("var value = {expr}"));
    }

    #[test]
    fn prop_collection_idempotence(expr in prop_oneof![array_expr_strategy(), dict_expr_strategy()]) {
        assert_idempotent(&format!("var value = {expr}"));
    }

    #[test]
    fn prop_function_idempotence(func in func_member_strategy()) {
        assert_idempotent(&func);
    }

    #[test]
    fn prop_module_idempotence(module in module_strategy()) {
        assert_idempotent(&module);
    }

    #[test]
    fn prop_trailing_newline(module in module_strategy()) {
        if let Some(output) = format_ok(&module) {
            prop_assert!(output.ends_with('\n'), "missing trailing newline");
            prop_assert!(!output.ends_with("\n\n"), "trailing blank line");
        }
    }

    #[test]
    fn prop_blank_line_bound(module in module_strategy()) {
        if let Some(output) = format_ok(&module) {
            prop_assert!(
                !output.contains("\n\n\n\n"),
                "more than two consecutive blank lines:\n{output}"
            );
        }
    }

    #[test]
    fn prop_output_reparses(module in module_strategy()) {
        if let Some(output) = format_ok(&module) {
            prop_assert!(format(&output, &config()).is_ok(), "output failed to parse");
        }
    }

    #[test]
    fn prop_comment_preservation(module in commented_module_strategy()) {
        if let Some(output) = format_ok(&module) {
            for line in module.lines() {
                if let Some(idx) = line.find('#') {
                    let content = line[idx..].trim_end();
                    prop_assert!(
                        output.contains(content),
                        "comment {content:?} lost in output:\n{output}"
                    );
                }
            }
        }
    }

    #[test]
    fn prop_width_bound(module in module_strategy()) {
        // Atoms generated here stay short, so every line's content must
        // fit the budget once its leading indentation is set aside.
        if let Some(output) = format_ok(&module) {
            for line in output.lines() {
                prop_assert!(
                    line_content_width(line) <= 100,
                    "line exceeds budget: {line:?}"
                );
            }
        }
    }

    #[test]
    fn prop_operator_spacing(
        lhs in int_literal_strategy(),
        rhs in int_literal_strategy(),
        op in binary_op_strategy()
    ) {
        let source = format!("var value = {lhs}{op}{rhs}");
        // Symbol operators lex without spaces; keyword operators need them.
        let source = if op.chars().all(|c| c.is_ascii_alphabetic()) {
            format!("var value = {lhs} {op} {rhs}")
        } else {
            source
        };
        if let Some(output) = format_ok(&source) {
            prop_assert!(
                output.contains(&format!(" {op} ")),
                "operator not surrounded by spaces in {output:?}"
            );
        }
    }
}

// -- Deterministic regressions --

#[test]
fn test_format_empty_input() {
    assert_eq!(format("", &config()).unwrap(), "\n");
}

#[test]
fn test_format_single_newline() {
    assert_eq!(format("\n", &config()).unwrap(), "\n");
}

#[test]
fn test_semicolon_separators_become_newlines() {
    assert_eq!(
        format("func f():\n\tvar a = 1; var b = 2", &config()).unwrap(),
        "func f():\n\tvar a = 1\n\tvar b = 2\n",
    );
}

#[test]
fn test_line_continuation_joins_logical_line() {
    assert_eq!(
        format("var x = 1 + \\\n\t2", &config()).unwrap(),
        "var x = 1 + 2\n",
    );
}

#[test]
fn test_block_string_preserved() {
    let source = "var s = \"\"\"multi\nline\"\"\"";
    assert_eq!(format(source, &config()).unwrap(), "var s = \"\"\"multi\nline\"\"\"\n");
}

#[test]
fn test_compound_assignment_operators() {
    assert_eq!(
        format("func f():\n\tx+=1\n\tx<<=2", &config()).unwrap(),
        "func f():\n\tx += 1\n\tx <<= 2\n",
    );
}

#[test]
fn test_bitwise_and_shift_precedence() {
    assert_eq!(
        format("var x = 1 << 2 | 3 & 4", &config()).unwrap(),
        "var x = 1 << 2 | 3 & 4\n",
    );
}

#[test]
fn test_in_and_is_operators() {
    assert_eq!(
        format("func f():\n\tif item in inventory and node is Sprite2D:\n\t\tpass", &config()).unwrap(),
        "func f():\n\tif item in inventory and node is Sprite2D:\n\t\tpass\n",
    );
}

#[test]
fn test_not_in_operator() {
    assert_eq!(
        format("func f():\n\tif item not in inventory:\n\t\tpass", &config()).unwrap(),
        "func f():\n\tif item not in inventory:\n\t\tpass\n",
    );
}

#[test]
fn test_symbol_logical_operators_preserved() {
    assert_eq!(
        format("var x = a && b || !c", &config()).unwrap(),
        "var x = a && b || !c\n",
    );
}

#[test]
fn test_unary_over_binary_parenthesization() {
    assert_eq!(
        format("var x = -(a + b)", &config()).unwrap(),
        "var x = -(a + b)\n",
    );
}

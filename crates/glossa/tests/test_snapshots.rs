//! Rendered modules for a small project

use glossa::{
    config::Config,
    model::{Bundle, Declaration, Message, PatternPart, ProjectSettings, Variant},
    orchestrator::Orchestrator,
    output::{ENTRY_MODULE, Output},
};
use insta::assert_snapshot;

fn output() -> Output {
    let bundle = Bundle {
        id: "greeting".to_string(),
        declarations: vec![Declaration::input("name")],
        messages: vec![
            Message::new("greeting", "en").with_variant(Variant::new(
                vec![],
                vec![
                    PatternPart::text("Hello "),
                    PatternPart::variable("name"),
                    PatternPart::text("!"),
                ],
            )),
        ],
    };
    Orchestrator::new(Config::default())
        .compile(&ProjectSettings::new("en", &["en", "de"]), &[bundle])
        .expect("project compiles")
}

#[test]
fn test_locale_module_snapshot() {
    let rendered = output().render();
    assert_snapshot!("greeting_en", &rendered["messages/en.js"]);
    assert_snapshot!("greeting_de", &rendered["messages/de.js"]);
}

#[test]
fn test_entry_module_snapshot() {
    let rendered = output().render();
    assert_snapshot!("entry", &rendered[ENTRY_MODULE]);
}

use criterion::{Criterion, criterion_group, criterion_main};
use glossa::{
    config::Config,
    model::{Bundle, Declaration, Markup, Match, Message, PatternPart, ProjectSettings, Variant},
    orchestrator::Orchestrator,
};

const LOCALES: &[&str] = &["en", "de", "de-CH", "fr", "it", "ja"];

fn synthetic_bundles(count: usize) -> Vec<Bundle> {
    (0..count)
        .map(|index| {
            let id = format!("message_{index}");
            let messages = LOCALES
                .iter()
                .skip(index % 2)
                .map(|locale| {
                    Message::new(id.as_str(), *locale)
                        .with_variant(Variant::new(
                            vec![Match::literal("count", "1")],
                            vec![
                                PatternPart::MarkupStart(Markup::new("b")),
                                PatternPart::text("one"),
                                PatternPart::MarkupEnd(Markup::new("b")),
                                PatternPart::text(" item for "),
                                PatternPart::variable("name"),
                            ],
                        ))
                        .with_variant(Variant::new(
                            vec![],
                            vec![
                                PatternPart::variable("count"),
                                PatternPart::text(" items for "),
                                PatternPart::variable("name"),
                            ],
                        ))
                })
                .collect();
            Bundle {
                id,
                declarations: vec![Declaration::input("count"), Declaration::input("name")],
                messages,
            }
        })
        .collect()
}

fn benchmark_compile(c: &mut Criterion) {
    let settings = ProjectSettings::new("en", LOCALES);
    let bundles = synthetic_bundles(200);
    let orchestrator = Orchestrator::new(Config {
        warn_shadowed_variants: false,
        ..Config::default()
    });

    let mut group = c.benchmark_group("compile");
    group.bench_function("compile_200_bundles", |b| {
        b.iter(|| {
            orchestrator
                .compile(&settings, &bundles)
                .expect("synthetic project compiles")
        });
    });
    group.bench_function("compile_and_render_200_bundles", |b| {
        b.iter(|| {
            orchestrator
                .compile(&settings, &bundles)
                .expect("synthetic project compiles")
                .render()
        });
    });
    group.finish();
}

criterion_group!(benches, benchmark_compile);
criterion_main!(benches);

mod common;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pystack::{compiler, lexer, parser};

fn bench_frontend(c: &mut Criterion) {
    for (name, path) in common::WORKLOADS {
        let source = common::load_source(path);

        c.bench_function(&format!("tokenize_{name}"), |b| {
            b.iter(|| {
                let tokens = lexer::tokenize(black_box(&source));
                black_box(tokens);
            })
        });

        c.bench_function(&format!("parse_{name}"), |b| {
            let tokens = lexer::tokenize(&source);
            b.iter(|| {
                let module =
                    parser::parse_tokens(black_box(tokens.clone())).expect("parse");
                black_box(module);
            })
        });

        c.bench_function(&format!("compile_{name}"), |b| {
            let module = common::load_module(path);
            b.iter(|| {
                let code = compiler::compile(black_box(&module)).expect("compile");
                black_box(code);
            })
        });
    }
}

criterion_group!(benches, bench_frontend);
criterion_main!(benches);

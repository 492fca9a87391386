use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use crossgen_core::grid_config::GeneratorConfig;
use crossgen_core::{Generator, WordList};

const WORDS: [&str; 24] = [
    "cab", "ore", "wed", "cow", "are", "bed", "abc", "defg", "hijk", "lmn", "dhl", "aeim",
    "bfjn", "cgk", "ate", "tea", "eat", "tan", "ant", "net", "ten", "era", "ear", "rat",
];

fn generator(grid_size: usize) -> Generator {
    let config = GeneratorConfig {
        seed: Some(1),
        ..GeneratorConfig::new(grid_size)
    };
    Generator::new(config, WordList::from_words(&WORDS, &[] as &[&str])).unwrap()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("line_universe_7", |b| {
        b.iter(|| black_box(generator(7).all_possible_lines(7).unwrap().max_possibilities()));
    });

    c.bench_function("all_grids_3x3", |b| {
        b.iter(|| black_box(generator(3).possible_grids().count()));
    });

    c.bench_function("first_ten_grids_4x4", |b| {
        b.iter(|| black_box(generator(4).possible_grids().take(10).count()));
    });

    c.bench_function("constrained_grids_4x4", |b| {
        b.iter(|| {
            let mut constrained = generator(4);
            let grids = constrained
                .possible_grids_with_constraints(&["#   ", "    ", "    ", "   #"], false)
                .unwrap();
            black_box(grids.count())
        });
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

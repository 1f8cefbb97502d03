//! Criterion benchmarks for structured_logger

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use structured_logger::core::level_resolver::parse_levels_str;
use structured_logger::core::output_format::{ColoredRenderer, JsonRenderer, PlainRenderer};
use structured_logger::prelude::*;
use structured_logger::{EventDict, LogRecord, Pipeline, Renderer, Sink};

fn registry_with_null_sink(root_level: LogLevel) -> Arc<LoggerRegistry> {
    let registry = Arc::new(LoggerRegistry::new());
    registry.set_level("", root_level);
    registry.add_sink(
        "",
        Sink::new(
            LogLevel::Debug,
            ConsoleAppender::to_writer(std::io::sink(), OutputFormat::Plain),
        ),
    );
    registry
}

fn sample_event() -> EventDict {
    Pipeline::default().run(Arc::new(
        LogRecord::new("app.http", LogLevel::Info, "Request processed").with_context(
            LogContext::new()
                .with_field("status", 200)
                .with_field("path", "/health")
                .with_field("latency_ms", 4.2),
        ),
    ))
}

// ============================================================================
// Emission Benchmarks
// ============================================================================

fn bench_emission(c: &mut Criterion) {
    let mut group = c.benchmark_group("emission");
    group.throughput(Throughput::Elements(1));

    let registry = registry_with_null_sink(LogLevel::Debug);
    let logger = registry.get_logger("app.http");

    group.bench_function("info", |b| {
        b.iter(|| {
            logger.info(black_box("Info message"));
        });
    });

    group.bench_function("info_with_context", |b| {
        b.iter(|| {
            logger.info_with_context(
                black_box("Request processed"),
                LogContext::new()
                    .with_field("status", 200)
                    .with_field("path", "/health"),
            );
        });
    });

    let bound = logger.bind("request_id", "r-42").bind("user", "alice");
    group.bench_function("bound_logger", |b| {
        b.iter(|| {
            bound.info(black_box("Bound message"));
        });
    });

    group.bench_function("builder", |b| {
        b.iter(|| {
            logger
                .info_builder()
                .message(black_box("retry %d of %d"))
                .arg(1)
                .arg(3)
                .field("backoff_ms", 200)
                .log();
        });
    });

    group.finish();
}

// ============================================================================
// Level Filtering Benchmarks
// ============================================================================

fn bench_level_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_filtering");

    let registry = registry_with_null_sink(LogLevel::Warning);
    for depth in [1usize, 4, 8] {
        let name = (0..depth)
            .map(|i| format!("n{}", i))
            .collect::<Vec<_>>()
            .join(".");
        let logger = registry.get_logger(&name);

        group.bench_with_input(BenchmarkId::new("filtered_debug", depth), &logger, |b, logger| {
            b.iter(|| {
                logger.debug(black_box("dropped"));
            });
        });
    }

    group.finish();
}

// ============================================================================
// Pipeline and Renderer Benchmarks
// ============================================================================

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.throughput(Throughput::Elements(1));

    let pipeline = Pipeline::default();
    group.bench_function("standard", |b| {
        b.iter(|| {
            let record = LogRecord::new("app.http", LogLevel::Info, black_box("message"));
            black_box(pipeline.run(Arc::new(record)))
        });
    });

    group.finish();
}

fn bench_renderers(c: &mut Criterion) {
    let mut group = c.benchmark_group("renderers");
    group.throughput(Throughput::Elements(1));

    let event = sample_event();
    let renderers: [(&str, Box<dyn Renderer>); 3] = [
        ("plain", Box::new(PlainRenderer)),
        ("colored", Box::new(ColoredRenderer)),
        ("json", Box::new(JsonRenderer)),
    ];

    for (name, renderer) in &renderers {
        group.bench_function(*name, |b| {
            b.iter(|| black_box(renderer.render(black_box(&event))));
        });
    }

    group.finish();
}

// ============================================================================
// Configuration Benchmarks
// ============================================================================

fn bench_override_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("override_parsing");

    let json = r#"{"uvicorn": {"access": "WARNING", "error": "INFO"}, "httpx": "warn"}"#;
    let yaml = "uvicorn:\n  access: WARNING\n  error: INFO\nhttpx: warn\n";

    group.bench_function("inline_json", |b| {
        b.iter(|| black_box(parse_levels_str(black_box(json))));
    });

    group.bench_function("inline_yaml", |b| {
        b.iter(|| black_box(parse_levels_str(black_box(yaml))));
    });

    group.finish();
}

// ============================================================================
// Concurrent Logging Benchmarks
// ============================================================================

fn bench_concurrent_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_logging");

    for num_threads in [2usize, 4] {
        group.throughput(Throughput::Elements((num_threads * 100) as u64));
        group.bench_with_input(
            BenchmarkId::new("threads", num_threads),
            &num_threads,
            |b, &num_threads| {
                let registry = registry_with_null_sink(LogLevel::Info);
                b.iter(|| {
                    let handles: Vec<_> = (0..num_threads)
                        .map(|t| {
                            let logger = registry.get_logger(&format!("worker{}", t));
                            std::thread::spawn(move || {
                                for i in 0..100 {
                                    logger.info(format!("message {}", i));
                                }
                            })
                        })
                        .collect();
                    for handle in handles {
                        let _ = handle.join();
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_emission,
    bench_level_filtering,
    bench_pipeline,
    bench_renderers,
    bench_override_parsing,
    bench_concurrent_logging,
);

criterion_main!(benches);

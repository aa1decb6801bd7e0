//! Performance benchmarks for class registration and lookup.
//!
//! - Registration: building a registry with a deep hierarchy
//! - Lookup: method, property and inheritance queries
//! - Dispatch: calling methods and accessors on live objects
//!
//! ## Profiling with Puffin
//!
//! Run with the `profile-with-puffin` feature to collect per-scope timings:
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```

use classdb::prelude::*;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;

#[cfg(feature = "profile-with-puffin")]
use std::collections::HashMap;

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

/// Call at the end of each benchmark iteration to flush profiling data.
#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

/// Print the average time spent in each top-level scope.
#[cfg(feature = "profile-with-puffin")]
fn print_profiling_stats() {
    use puffin::Reader;

    let Some(frame_view) = FRAME_VIEW.get() else {
        println!("Profiler not initialized");
        return;
    };

    let view = frame_view.lock();
    let scope_collection = view.scope_collection();
    let mut scope_timings: HashMap<String, i64> = HashMap::new();
    let mut frame_count = 0i64;

    for frame in view.recent_frames() {
        frame_count += 1;
        let Ok(unpacked) = frame.unpacked() else {
            continue;
        };
        for (_thread_info, stream_info) in unpacked.thread_streams.iter() {
            let reader = Reader::from_start(&stream_info.stream);
            let Ok(scopes) = reader.read_top_scopes() else {
                continue;
            };
            for scope in scopes {
                if let Some(details) = scope_collection.fetch_by_id(&scope.id) {
                    *scope_timings.entry(details.name().to_string()).or_insert(0) +=
                        scope.record.duration_ns;
                }
            }
        }
    }

    println!("\n=== Profiling Summary ({} frames) ===", frame_count);
    let mut entries: Vec<_> = scope_timings.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    for (name, ns) in entries {
        let avg_ns = if frame_count > 0 { ns / frame_count } else { ns };
        println!(
            "  {:30} {:>10.2?} avg",
            name,
            std::time::Duration::from_nanos(avg_ns as u64)
        );
    }
    println!("=====================================\n");
}

#[cfg(not(feature = "profile-with-puffin"))]
fn print_profiling_stats() {}

// ============================================================================
// Fixture
// ============================================================================

/// Hierarchy depth used by the lookup benchmarks.
const DEPTH: usize = 16;

/// Methods bound on each level.
const METHODS_PER_CLASS: usize = 8;

fn level_name(level: usize) -> String {
    format!("Level{}", level)
}

/// Register `Object -> Level0 -> ... -> Level{DEPTH-1}`, each level with its
/// own methods, one property and one constant.
fn build_hierarchy() -> ClassDb {
    let db = ClassDb::with_core_classes().unwrap();
    let mut parent = String::from("Object");

    for level in 0..DEPTH {
        let class = level_name(level);
        db.add_class(&class, &parent).unwrap();

        for m in 0..METHODS_PER_CLASS {
            let bind = MethodBind::raw(format!("level{}_method{}", level, m), MethodKind::Instance, |ctx| {
                let value = ctx.arg::<i64>(0)?;
                ctx.set_return(value + 1);
                Ok(())
            })
            .with_arguments([PropertyInfo::new(VariantType::Int, "value")])
            .with_return(PropertyInfo::returning(VariantType::Int));
            db.bind_method_custom(&class, bind).unwrap();
        }

        let getter = MethodBind::raw(format!("get_level{}", level), MethodKind::Instance, move |ctx| {
            ctx.set_return(level as i64);
            Ok(())
        })
        .with_return(PropertyInfo::returning(VariantType::Int));
        let setter = MethodBind::raw(format!("set_level{}", level), MethodKind::Instance, |_ctx| Ok(()))
            .with_arguments([PropertyInfo::new(VariantType::Int, "value")]);
        db.bind_method_custom(&class, getter).unwrap();
        db.bind_method_custom(&class, setter).unwrap();
        db.add_property(
            &class,
            PropertyInfo::new(VariantType::Int, format!("level{}", level)),
            &format!("set_level{}", level),
            &format!("get_level{}", level),
            -1,
        )
        .unwrap();
        db.bind_integer_constant(&class, "", &format!("LEVEL{}", level), level as i64)
            .unwrap();
        db.register_concrete(&class, || Box::new(BaseObject::new()) as Box<dyn Object>)
            .unwrap();

        parent = class;
    }
    db
}

// ============================================================================
// Benchmarks
// ============================================================================

fn registration_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let mut group = c.benchmark_group("registry/registration");
    group.bench_function("hierarchy_16_levels", |b| {
        b.iter(|| {
            let db = build_hierarchy();
            end_profiling_frame();
            black_box(db.class_count())
        });
    });
    group.finish();
}

fn lookup_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let db = Arc::new(build_hierarchy());
    let leaf = level_name(DEPTH - 1);

    let mut group = c.benchmark_group("registry/lookup");
    group.bench_function("method_own_class", |b| {
        b.iter(|| black_box(db.get_method(black_box(&leaf), "level15_method3").is_ok()));
    });
    group.bench_function("method_root_class", |b| {
        b.iter(|| black_box(db.get_method(black_box(&leaf), "get_class").is_ok()));
    });
    group.bench_function("is_parent_class", |b| {
        b.iter(|| black_box(db.is_parent_class(black_box(&leaf), "Level0")));
    });
    group.bench_function("method_list", |b| {
        b.iter(|| black_box(db.get_method_list(black_box(&leaf), false, false).map(|l| l.len())));
    });
    group.bench_function("property_list", |b| {
        b.iter(|| black_box(db.get_property_list(black_box(&leaf), false).map(|l| l.len())));
    });
    group.bench_function("api_hash", |b| {
        b.iter(|| black_box(db.get_api_hash(ApiType::Core)));
    });
    group.finish();

    end_profiling_frame();
}

fn dispatch_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let db = build_hierarchy();
    let bind = db.get_method("Level3", "level3_method0").unwrap();
    let mut object = BaseObject::new();
    let target: &mut (dyn Object + 'static) = &mut object;
    let args = [Variant::Int(41)];

    let mut group = c.benchmark_group("registry/dispatch");
    group.bench_function("call_bound_method", |b| {
        b.iter(|| black_box(bind.call(Some(&mut *target), black_box(&args))));
    });
    group.bench_function("instantiate", |b| {
        b.iter(|| black_box(db.instantiate("Level7").is_ok()));
    });
    group.bench_function("property_info_inherited", |b| {
        b.iter(|| black_box(db.get_property_info("Level9", "level4", false).is_ok()));
    });
    group.finish();

    end_profiling_frame();
    print_profiling_stats();
}

criterion_group!(
    benches,
    registration_benchmarks,
    lookup_benchmarks,
    dispatch_benchmarks
);
criterion_main!(benches);

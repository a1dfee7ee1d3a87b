//! Criterion benchmarks for the gesture hot path.
//!
//! Every touch-move event on the phone runs through [`GestureEngine::handle`]
//! and the resulting message is framed for the channel, so both have to stay
//! far below one display frame (16ms).
//!
//! Run with:
//! ```bash
//! cargo bench --package trackpad-core --bench engine_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use trackpad_core::{
    protocol::codec::{decode_packet, encode_event},
    ContactPhase, ContactSample, GestureConfig, GestureEngine, PointerKind, WireMessage,
};

// ── Fixtures ──────────────────────────────────────────────────────────────────

fn sample(phase: ContactPhase, id: i64, x: f64, y: f64, time: u64) -> ContactSample {
    ContactSample {
        phase,
        id,
        x,
        y,
        pointer_type: PointerKind::Touch,
        time,
    }
}

/// An engine with `fingers` contacts already down and throttling disabled, so
/// every iteration does the full classification work.
fn engine_with_fingers(fingers: i64) -> GestureEngine {
    let mut cfg = GestureConfig::default();
    cfg.set_move_throttle_ms(0);
    let mut engine = GestureEngine::new(cfg);
    let downs: Vec<_> = (0..fingers)
        .map(|id| sample(ContactPhase::Start, id, id as f64 * 40.0, 100.0, 0))
        .collect();
    engine.handle(&downs);
    engine
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_move_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_move_batch");

    for fingers in [1i64, 2, 3] {
        let mut engine = engine_with_fingers(fingers);
        let mut t = 0u64;
        group.bench_with_input(BenchmarkId::new("fingers", fingers), &fingers, |b, &n| {
            b.iter(|| {
                t += 1;
                let y = 100.0 + (t % 50) as f64;
                let batch: Vec<_> = (0..n)
                    .map(|id| sample(ContactPhase::Move, id, id as f64 * 40.0, y, t))
                    .collect();
                black_box(engine.handle(black_box(&batch)))
            })
        });
    }

    group.finish();
}

fn bench_tap(c: &mut Criterion) {
    let mut engine = GestureEngine::default();
    let mut t = 0u64;

    c.bench_function("engine_tap_cycle", |b| {
        b.iter(|| {
            t += 1_000;
            engine.handle(&[sample(ContactPhase::Start, 1, 10.0, 10.0, t)]);
            black_box(engine.handle(&[sample(ContactPhase::End, 1, 10.0, 10.0, t + 50)]))
        })
    });
}

fn bench_channel_framing(c: &mut Criterion) {
    let msg = WireMessage::Scroll(trackpad_core::protocol::messages::ScrollDelta {
        scroll_x: 0.0,
        scroll_y: -30.0,
    });
    let mut group = c.benchmark_group("channel_framing");

    group.bench_function("encode_scroll_event", |b| {
        b.iter(|| {
            let env = black_box(&msg).envelope().ok()?;
            encode_event(env.event, &env.channel_body).ok()
        })
    });

    let frame = format!(
        "42{}",
        serde_json::to_string(&json!(["status", {"ok": true}])).unwrap_or_default()
    );
    group.bench_function("decode_event_frame", |b| {
        b.iter(|| decode_packet(black_box(&frame)))
    });

    group.finish();
}

criterion_group!(benches, bench_move_batch, bench_tap, bench_channel_framing);
criterion_main!(benches);

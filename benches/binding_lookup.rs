use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ratatui::crossterm::event::KeyCode;
use rebind::{BindingSpec, FrameInput, Manager, Profile};

fn profile_with(count: usize) -> Profile {
    Profile::with_specs(
        "Bench",
        (0..count).map(|i| {
            if i % 4 == 0 {
                BindingSpec::analog(format!("Axis{i}"), format!("Stick{i}"))
            } else {
                BindingSpec::digital(format!("Action{i}"), KeyCode::F((i % 12) as u8 + 1))
            }
        }),
    )
}

fn input_for(count: usize) -> FrameInput {
    let mut input = FrameInput::new();
    for i in (0..count).step_by(4) {
        input.register_axis(format!("Stick{i}"));
        input.set_axis(format!("Stick{i}"), 0.5, 1.0);
    }
    input.begin_frame();
    input.press(KeyCode::F(2));
    input
}

fn bench_button_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("button_queries");

    for count in [8, 64, 512] {
        let mut manager = Manager::with_profiles([profile_with(count)]);
        manager.initialize_all();
        let input = input_for(count);

        group.bench_with_input(BenchmarkId::new("get_button_down", count), &count, |b, _| {
            b.iter(|| black_box(manager.get_button_down(&input, black_box("Action1"))))
        });
        group.bench_with_input(BenchmarkId::new("get_axis", count), &count, |b, _| {
            b.iter(|| black_box(manager.get_axis(&input, black_box("Axis0"))))
        });
    }

    group.finish();
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");

    for count in [8, 64, 512] {
        group.bench_with_input(BenchmarkId::new("synced_tick", count), &count, |b, &count| {
            let mut manager = Manager::with_profiles([profile_with(count)]);
            manager.initialize_all();
            b.iter(|| black_box(manager.tick()))
        });

        group.bench_with_input(BenchmarkId::new("full_diff", count), &count, |b, &count| {
            let mut profile = profile_with(count);
            profile.initialize();
            b.iter(|| {
                profile.push_spec(BindingSpec::unbound("Extra"));
                let added = profile.reconcile_full();
                profile.remove_spec("Extra");
                let removed = profile.reconcile_full();
                black_box((added, removed))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_button_queries, bench_reconcile);
criterion_main!(benches);

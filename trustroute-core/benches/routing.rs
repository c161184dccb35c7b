use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use trustroute_core::config::AgentConfig;
use trustroute_core::{
    NetworkState, QRoutingAgent, RoutingAlgorithm, RoutingContext, TrafficClass, TrustModel,
};

fn bench_find_path(c: &mut Criterion) {
    let network = NetworkState::create_topology(100, 0.08, 42).unwrap_or_else(|e| panic!("{e}"));
    let trust = TrustModel::default();
    let mut agent = QRoutingAgent::new(&network.node_ids(), &AgentConfig::default(), 42)
        .unwrap_or_else(|e| panic!("{e}"));

    let mut group = c.benchmark_group("find_path");
    for algorithm in RoutingAlgorithm::ALL {
        let strategy = algorithm.build(&AgentConfig::default());
        group.bench_with_input(BenchmarkId::from_parameter(algorithm), &algorithm, |b, _| {
            b.iter(|| {
                let mut ctx = RoutingContext::new(&network, &trust, &mut agent);
                black_box(strategy.find_path(&mut ctx, black_box(0), black_box(99)))
            });
        });
    }
    group.finish();
}

fn bench_deliver_packet(c: &mut Criterion) {
    let mut network =
        NetworkState::create_topology(100, 0.08, 42).unwrap_or_else(|e| panic!("{e}"));
    let trust = TrustModel::default();
    let mut agent = QRoutingAgent::new(&network.node_ids(), &AgentConfig::default(), 42)
        .unwrap_or_else(|e| panic!("{e}"));
    let path = {
        let mut ctx = RoutingContext::new(&network, &trust, &mut agent);
        RoutingAlgorithm::HopCount
            .build(&AgentConfig::default())
            .find_path(&mut ctx, 0, 99)
            .unwrap_or_default()
    };
    let mut trust = trust;

    c.bench_function("deliver_packet", |b| {
        b.iter(|| {
            black_box(network.deliver_packet(&path, Some(&mut trust), TrafficClass::Data))
        });
    });

    c.bench_function("evolve_congestion", |b| {
        b.iter(|| black_box(network.evolve_congestion()));
    });
}

criterion_group!(benches, bench_find_path, bench_deliver_packet);
criterion_main!(benches);

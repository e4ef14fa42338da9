use netsynth::{generate_device, SynthesisError};
use par::config::{BackendKind, PnrConfig};
use par::Layout;
use test_log::test;
use uniquify::NameGenerator;

use crate::shared::*;

#[test]
fn synthesized_device_lays_out_on_fixed_grid() {
    let mut device = flow_device("mixing");
    let mut names = NameGenerator::new();
    let synthesis = generate_device(mixing_graph(), &mut device, &mut names).unwrap();
    assert_eq!(synthesis.connections.len(), 2);
    assert_eq!(device.components().count(), 4);
    assert_eq!(device.connections().count(), 3);

    let config = PnrConfig {
        backend: BackendKind::FixedGrid,
        ..Default::default()
    };
    let report = Layout::new(config).unwrap().run(&mut device, None).unwrap();

    assert!(report.issues.is_empty(), "{}", report.issues);
    assert_eq!(report.routes.len(), 3);
    let xs: Vec<_> = device.components().map(|c| c.position()).collect();
    assert_eq!(xs, vec![(0, 0), (2, 0), (4, 0), (6, 0)]);
    assert!(device.connections().all(|c| c.paths().is_empty()));
}

#[test]
fn synthesized_device_lays_out_with_external_engine() {
    let mut device = flow_device("mixing");
    let synthesis =
        generate_device(mixing_graph(), &mut device, &mut NameGenerator::new()).unwrap();

    let mut engine = DiagonalEngine {
        pitch: 3,
        ..Default::default()
    };
    let report = Layout::new(PnrConfig::default())
        .unwrap()
        .run(&mut device, Some(&mut engine))
        .unwrap();

    assert_eq!(engine.cells, 4);
    assert_eq!(engine.routes, 3);
    assert_eq!(report.bounds.map(|b| b.has_negative()), Some(false));
    for (i, component) in device.components().enumerate() {
        let d = i as i64 * 3;
        assert_eq!(component.position(), (d, d));
    }
    for connection in device.connections() {
        assert_eq!(connection.paths().len(), 1, "{}", connection.id);
        assert_eq!(connection.paths()[0].len(), 2);
    }

    let inlet = &synthesis.produced["inlet"][0];
    let first = device.connection(&synthesis.connections[0]).unwrap();
    assert_eq!(&first.source.component, inlet);
    assert_eq!(first.paths()[0][0], (2, 1));
}

#[test]
fn synthesis_errors_stop_before_layout() {
    let mut graph = mixing_graph();
    graph.add_node(netsynth::ConstructionNode::new("dangling"));
    graph.add_edge("outlet", "dangling").unwrap();

    let mut device = flow_device("broken");
    let err = generate_device(graph, &mut device, &mut NameGenerator::new()).unwrap_err();
    assert_eq!(err, SynthesisError::MissingPrimitive("dangling".into()));
    assert_eq!(device, flow_device("broken"));

    let config = PnrConfig {
        backend: BackendKind::FixedGrid,
        ..Default::default()
    };
    let report = Layout::new(config).unwrap().run(&mut device, None).unwrap();
    assert!(report.routes.is_empty());
    assert_eq!(report.bounds, None);
}

#[test]
fn layout_configuration_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pnr.toml");
    std::fs::write(
        &path,
        "lambda = 250\nbackend = \"fixed-grid\"\nfixed_cell_size = 8\n",
    )
    .unwrap();
    let config = PnrConfig::from_file(&path).unwrap();

    let mut device = flow_device("mixing");
    generate_device(mixing_graph(), &mut device, &mut NameGenerator::new()).unwrap();
    let report = Layout::new(config).unwrap().run(&mut device, None).unwrap();

    let bounds = report.bounds.unwrap();
    // Cells sit 8 apart; the mixers are 8 wide and the ports 4.
    assert_eq!(bounds.max_x, 28);
    assert_eq!(bounds.max_y, 4);
}

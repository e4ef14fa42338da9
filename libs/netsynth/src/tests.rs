use devir::{Component, Connection, Device, Layer, LayerKind, Netlist, Port, Target};
use test_log::test;
use uniquify::NameGenerator;

use crate::*;

fn device() -> Device {
    let mut device = Device::new("chip");
    device.add_layer(Layer::new("flow", LayerKind::Flow));
    device
}

fn component(base: &str, ports: &[&str]) -> ComponentPrimitive {
    ports.iter().fold(
        ComponentPrimitive::new("MIXER", base, 1000, 1000),
        |p, port| p.with_port(Port::new(*port, 0, 0)),
    )
}

/// A sub-netlist of two mixers joined by one channel.
fn mixer_pair() -> NetlistPrimitive {
    NetlistPrimitive::new(Netlist {
        components: vec![
            Component::new("mix1", "MIXER", 100, 100).with_port(Port::new("in", 0, 50)),
            Component::new("mix2", "MIXER", 100, 100).with_port(Port::new("out", 100, 50)),
        ],
        connections: vec![Connection::new(
            "ch1",
            Target::new("mix1", "out"),
            [Target::new("mix2", "in")],
        )],
    })
}

#[test]
fn two_components_one_edge() {
    let mut graph = ConstructionGraph::new();
    graph.add_node(
        ConstructionNode::new("A")
            .with_primitive(component("c", &["out"]))
            .with_output(ConnectingOption::new(["out"])),
    );
    graph.add_node(
        ConstructionNode::new("B")
            .with_primitive(component("c", &["in"]))
            .with_input(ConnectingOption::new(["in"])),
    );
    graph.add_edge("A", "B").unwrap();

    let mut device = device();
    let mut names = NameGenerator::new();
    let report = generate_device(graph, &mut device, &mut names).unwrap();

    assert_eq!(report.produced["A"], vec!["c1"]);
    assert_eq!(report.produced["B"], vec!["c2"]);
    assert_eq!(report.connections.len(), 1);

    let connection = device.connection(&report.connections[0]).unwrap();
    assert_eq!(connection.source, Target::new("c1", "out"));
    assert_eq!(connection.sinks, vec![Target::new("c2", "in")]);
    assert_eq!(connection.layer.as_deref(), Some("flow"));
    assert_eq!(device.component("c1").unwrap().layers, vec!["flow"]);
}

#[test]
fn missing_primitive_is_fatal() {
    let mut graph = ConstructionGraph::new();
    graph.add_node(ConstructionNode::new("A").with_primitive(component("c", &[])));
    graph.add_node(ConstructionNode::new("B"));
    graph.add_edge("A", "B").unwrap();

    let err = generate_device(graph, &mut device(), &mut NameGenerator::new()).unwrap_err();
    assert_eq!(err, SynthesisError::MissingPrimitive("B".into()));
}

#[test]
fn exhausted_options_are_fatal() {
    let mut graph = ConstructionGraph::new();
    graph.add_node(
        ConstructionNode::new("A")
            .with_primitive(component("c", &["out"]))
            .with_output(ConnectingOption::new(["out"])),
    );
    graph.add_node(
        ConstructionNode::new("B")
            .with_primitive(component("c", &["in"]))
            .with_input(ConnectingOption::new(["in"])),
    );
    graph.add_edge("A", "B").unwrap();
    graph.add_edge("A", "B").unwrap();

    let err = generate_device(graph, &mut device(), &mut NameGenerator::new()).unwrap_err();
    assert_eq!(
        err,
        SynthesisError::ExhaustedConnectingOptions {
            node: "A".into(),
            side: OptionSide::Output,
        }
    );
}

#[test]
fn options_are_consumed_last_first() {
    let mut graph = ConstructionGraph::new();
    graph.add_node(
        ConstructionNode::new("A")
            .with_primitive(component("c", &["o1", "o2"]))
            .with_output(ConnectingOption::new(["o1"]))
            .with_output(ConnectingOption::new(["o2"])),
    );
    graph.add_node(
        ConstructionNode::new("B")
            .with_primitive(component("c", &["i1"]))
            .with_input(ConnectingOption::new(["i1"])),
    );
    graph.add_edge("A", "B").unwrap();

    let mut device = device();
    let report = generate_device(graph, &mut device, &mut NameGenerator::new()).unwrap();
    let connection = device.connection(&report.connections[0]).unwrap();
    assert_eq!(connection.source, Target::new("c1", "o2"));
}

#[test]
fn self_reference_into_netlist_is_ambiguous() {
    let mut graph = ConstructionGraph::new();
    graph.add_node(
        ConstructionNode::new("N")
            .with_primitive(mixer_pair())
            .with_output(ConnectingOption::new(["out"])),
    );
    graph.add_node(
        ConstructionNode::new("B")
            .with_primitive(component("c", &["in"]))
            .with_input(ConnectingOption::new(["in"])),
    );
    graph.add_edge("N", "B").unwrap();

    let err = generate_device(graph, &mut device(), &mut NameGenerator::new()).unwrap_err();
    assert_eq!(
        err,
        SynthesisError::AmbiguousComponent {
            node: "N".into(),
            count: 2,
        }
    );
}

#[test]
fn hinted_names_resolve_through_netlist_scope() {
    let mut graph = ConstructionGraph::new();
    graph.add_node(
        ConstructionNode::new("N")
            .with_primitive(mixer_pair())
            .with_output(ConnectingOption::named("mix2", ["out"])),
    );
    graph.add_node(
        ConstructionNode::new("M")
            .with_primitive(mixer_pair())
            .with_input(ConnectingOption::named("mix1", ["in"])),
    );
    graph.add_edge("N", "M").unwrap();

    let mut device = device();
    let mut names = NameGenerator::new();
    let report = generate_device(graph, &mut device, &mut names).unwrap();

    assert_eq!(report.produced["N"], vec!["mix1", "mix2"]);
    assert_eq!(report.produced["M"], vec!["mix3", "mix4"]);
    assert_eq!(device.components().count(), 4);
    // Two internal channels plus the edge.
    assert_eq!(device.connections().count(), 3);

    let internal = device.connection("ch2").unwrap();
    assert_eq!(internal.source, Target::new("mix3", "out"));
    assert_eq!(internal.sinks, vec![Target::new("mix4", "in")]);

    let edge = device.connection(&report.connections[0]).unwrap();
    assert_eq!(edge.source, Target::new("mix2", "out"));
    assert_eq!(edge.sinks, vec![Target::new("mix3", "in")]);
}

#[test]
fn unknown_hint_is_unresolved() {
    let mut graph = ConstructionGraph::new();
    graph.add_node(
        ConstructionNode::new("N")
            .with_primitive(mixer_pair())
            .with_output(ConnectingOption::named("valve", ["out"])),
    );
    graph.add_node(
        ConstructionNode::new("B")
            .with_primitive(component("c", &["in"]))
            .with_input(ConnectingOption::new(["in"])),
    );
    graph.add_edge("N", "B").unwrap();

    let err = generate_device(graph, &mut device(), &mut NameGenerator::new()).unwrap_err();
    assert_eq!(
        err,
        SynthesisError::UnresolvedName {
            node: "N".into(),
            name: "valve".into(),
        }
    );
}

#[test]
fn fanout_is_rejected_not_truncated() {
    for (outs, ins, kind) in [
        (&["a", "b"][..], &["x", "y"][..], Fanout::Bus),
        (&["a"][..], &["x", "y"][..], Fanout::OneToMany),
        (&["a", "b"][..], &["x"][..], Fanout::ManyToOne),
        (&["a", "b", "c"][..], &["x", "y"][..], Fanout::Mismatched),
    ] {
        let mut graph = ConstructionGraph::new();
        graph.add_node(
            ConstructionNode::new("A")
                .with_primitive(component("c", outs))
                .with_output(ConnectingOption::new(outs.iter().copied())),
        );
        graph.add_node(
            ConstructionNode::new("B")
                .with_primitive(component("c", ins))
                .with_input(ConnectingOption::new(ins.iter().copied())),
        );
        graph.add_edge("A", "B").unwrap();

        let mut device = device();
        let err = generate_device(graph, &mut device, &mut NameGenerator::new()).unwrap_err();
        assert_eq!(
            err,
            SynthesisError::UnsupportedFanout {
                kind,
                from: "A".into(),
                to: "B".into(),
                sources: outs.len(),
                targets: ins.len(),
            }
        );
        assert_eq!(device.connections().count(), 0);
    }
}

#[test]
fn fanout_classification() {
    assert_eq!(Fanout::classify(1, 1), None);
    assert_eq!(Fanout::classify(3, 3), Some(Fanout::Bus));
    assert_eq!(Fanout::classify(1, 0), Some(Fanout::Mismatched));
    assert_eq!(Fanout::classify(0, 0), Some(Fanout::Mismatched));
}

#[test]
fn cycles_are_rejected_before_expansion() {
    let mut graph = ConstructionGraph::new();
    for id in ["A", "B", "C"] {
        graph.add_node(ConstructionNode::new(id).with_primitive(component("c", &[])));
    }
    graph.add_edge("A", "B").unwrap();
    graph.add_edge("B", "C").unwrap();
    graph.add_edge("C", "A").unwrap();

    let mut device = device();
    let err = generate_device(graph, &mut device, &mut NameGenerator::new()).unwrap_err();
    assert!(matches!(err, SynthesisError::Cycle(_)));
    assert_eq!(device.components().count(), 0);
}

#[test]
fn dfs_preorder_follows_insertion_order() {
    let mut graph = ConstructionGraph::new();
    for id in ["A", "B", "C", "D", "E"] {
        graph.add_node(ConstructionNode::new(id));
    }
    graph.add_edge("A", "C").unwrap();
    graph.add_edge("C", "D").unwrap();
    graph.add_edge("A", "B").unwrap();
    graph.add_edge("E", "B").unwrap();

    let order: Vec<_> = graph.dfs_preorder().into_iter().map(|s| s.to_string()).collect();
    assert_eq!(order, vec!["A", "C", "D", "B", "E"]);
    assert!(graph.ensure_acyclic().is_ok());

    let edges: Vec<_> = graph
        .edges()
        .map(|(s, t)| format!("{s}->{t}"))
        .collect();
    assert_eq!(edges, vec!["A->C", "A->B", "C->D", "E->B"]);
}

#[test]
fn edges_require_known_nodes() {
    let mut graph = ConstructionGraph::new();
    graph.add_node(ConstructionNode::new("A"));
    assert_eq!(
        graph.add_edge("A", "Z").unwrap_err(),
        SynthesisError::UnknownNode("Z".into())
    );
    assert_eq!(
        graph.add_edge("Z", "A").unwrap_err(),
        SynthesisError::UnknownNode("Z".into())
    );
}

#[test]
fn existing_device_names_are_reserved() {
    let mut device = device();
    device
        .add_component(Component::new("c1", "PORT", 10, 10))
        .unwrap();
    let mut graph = ConstructionGraph::new();
    graph.add_node(ConstructionNode::new("A").with_primitive(component("c", &[])));

    let report = generate_device(graph, &mut device, &mut NameGenerator::new()).unwrap();
    assert_eq!(report.produced["A"], vec!["c2"]);
}

#[test]
fn device_without_layers_fails() {
    let mut graph = ConstructionGraph::new();
    graph.add_node(ConstructionNode::new("A").with_primitive(component("c", &[])));
    let err = generate_device(graph, &mut Device::new("bare"), &mut NameGenerator::new())
        .unwrap_err();
    assert!(matches!(err, SynthesisError::Device(_)));
}

#[test]
fn failed_expansion_leaves_device_untouched() {
    let mut graph = ConstructionGraph::new();
    graph.add_node(
        ConstructionNode::new("A")
            .with_primitive(component("c", &["out"]))
            .with_output(ConnectingOption::new(["out"])),
    );
    graph.add_node(ConstructionNode::new("B").with_input(ConnectingOption::new(["in"])));
    graph.add_edge("A", "B").unwrap();

    let mut device = device();
    device
        .add_component(Component::new("inlet1", "PORT", 10, 10))
        .unwrap();
    let before = device.clone();
    let mut names = NameGenerator::new();

    let err = generate_device(graph, &mut device, &mut names).unwrap_err();
    assert_eq!(err, SynthesisError::MissingPrimitive("B".into()));
    assert_eq!(device, before);
    assert!(!names.is_used("c1"));
    assert!(!names.is_used("inlet1"));
}

#[test]
fn failed_second_edge_discards_first_connection() {
    let mut graph = ConstructionGraph::new();
    graph.add_node(
        ConstructionNode::new("A")
            .with_primitive(component("c", &["out"]))
            .with_output(ConnectingOption::new(["out"])),
    );
    graph.add_node(
        ConstructionNode::new("B")
            .with_primitive(component("c", &["in", "a", "b"]))
            .with_input(ConnectingOption::new(["in"]))
            .with_output(ConnectingOption::new(["a", "b"])),
    );
    graph.add_node(
        ConstructionNode::new("C")
            .with_primitive(component("c", &["in"]))
            .with_input(ConnectingOption::new(["in"])),
    );
    graph.add_edge("A", "B").unwrap();
    graph.add_edge("B", "C").unwrap();

    let mut device = device();
    let before = device.clone();
    let mut names = NameGenerator::new();
    let err = generate_device(graph, &mut device, &mut names).unwrap_err();

    assert!(matches!(
        err,
        SynthesisError::UnsupportedFanout {
            kind: Fanout::ManyToOne,
            ..
        }
    ));
    assert_eq!(device, before);
    assert_eq!(device.connections().count(), 0);
    assert!(!names.is_used("channel1"));
}

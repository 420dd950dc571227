use fea_response::prelude::*;
use fea_response::response::{allocate, classify};

/// Fiber allocator that records what it was asked for
#[derive(Default)]
struct RecordingFiberState {
    calls: Vec<usize>,
    fail: bool,
}

impl FiberStateAllocator for RecordingFiberState {
    fn allocate_fiber_state(&mut self, fiber_elements: usize, _mesh: &Mesh) -> ResponseResult<()> {
        self.calls.push(fiber_elements);
        if self.fail {
            return Err(ResponseError::InvalidInput("fiber sections missing".to_string()));
        }
        Ok(())
    }
}

fn mesh_with(types: &[(&str, usize)]) -> Mesh {
    let mut mesh = Mesh::new(6, 8);
    for (ty, count) in types {
        mesh.add_attribute(ty, ElementAttribute::new(ty))
            .unwrap();
        for _ in 0..*count {
            mesh.add_element(Element::new(ty)).unwrap();
        }
    }
    mesh
}

#[test]
fn buffer_shape_follows_integration_scheme_for_every_family() {
    let mesh = mesh_with(&[
        ("FRAME_2D", 2),
        ("FRAME_3D", 1),
        ("SHELL_4N", 3),
        ("SHELL_8N", 1),
        ("FIBER", 1),
    ]);

    for (in_plane, thickness) in [(1, 1), (4, 2), (9, 3), (4, 5)] {
        let scheme = IntegrationScheme::new(in_plane, thickness).unwrap();
        let mut fiber = RecordingFiberState::default();
        let allocation =
            allocate(&mesh, scheme, TensorBufferGuard::default(), &mut fiber).unwrap();
        let points = in_plane * thickness;
        assert_eq!(allocation.integration_points, points);

        let buffer = allocation.buffer.expect("tensor buffer allocated");
        assert_eq!(buffer.len(), 8);
        for slot in buffer.slots() {
            assert_eq!(slot.stress.nrows(), 9);
            assert_eq!(slot.stress.ncols(), points);
            assert_eq!(slot.plastic_strain.shape(), (9, points));
            assert_eq!(slot.plastic_strain_increment.shape(), (9, points));
            assert_eq!(slot.load_curve.back_stress.nrows(), 6);
            assert_eq!(slot.load_curve.back_stress.ncols(), points);
            assert_eq!(slot.effective_plastic_strain.len(), points);
            assert_eq!(slot.forces.shape(), (6, 8));
        }
    }
}

#[test]
fn missing_attribute_fails_before_anything_is_allocated() {
    let mut mesh = mesh_with(&[("FIBER", 2)]);
    mesh.add_element(Element::new("UNDECLARED")).unwrap();

    let mut fiber = RecordingFiberState::default();
    let result = allocate(
        &mesh,
        IntegrationScheme::default(),
        TensorBufferGuard::Always,
        &mut fiber,
    );

    match result {
        Err(ResponseError::AttributeNotFound { element, attribute }) => {
            assert_eq!(element, 3);
            assert_eq!(attribute, "UNDECLARED");
        }
        other => panic!("expected AttributeNotFound, got {other:?}"),
    }
    assert!(fiber.calls.is_empty(), "fiber store must not be touched");
    assert!(AnalysisSession::new(mesh, AnalysisOptions::default()).is_err());
}

#[test]
fn shell_only_mesh_under_each_guard() {
    let mesh = mesh_with(&[("SHELL_4N", 2), ("SHELL_8N", 2)]);
    let counts = classify(&mesh).unwrap();
    assert_eq!(counts.shell(), 4);
    assert_eq!(counts.fiber, 0);

    let session = AnalysisSession::new(mesh.clone(), AnalysisOptions::default()).unwrap();
    assert!(session.buffer().is_some());

    // FiberElements keys the tensor buffer on fiber elements only.
    let options = AnalysisOptions::default().with_buffer_guard(TensorBufferGuard::FiberElements);
    let session = AnalysisSession::new(mesh, options).unwrap();
    assert!(session.buffer().is_none());
    assert_eq!(session.responses().len(), 4);
}

#[test]
fn fiber_allocator_called_only_with_fiber_elements() {
    let mut fiber = RecordingFiberState::default();
    let mesh = mesh_with(&[("FRAME_2D", 3)]);
    allocate(&mesh, IntegrationScheme::default(), TensorBufferGuard::default(), &mut fiber).unwrap();
    assert!(fiber.calls.is_empty());

    let mesh = mesh_with(&[("FRAME_2D", 3), ("FIBER", 2)]);
    let allocation =
        allocate(&mesh, IntegrationScheme::default(), TensorBufferGuard::default(), &mut fiber)
            .unwrap();
    assert_eq!(fiber.calls, vec![2]);
    assert!(allocation.fiber_store);
    assert_eq!(allocation.counts.fiber, 2);
}

#[test]
fn fiber_allocator_failure_propagates() {
    let mut fiber = RecordingFiberState {
        fail: true,
        ..Default::default()
    };
    let mesh = mesh_with(&[("FIBER", 1)]);
    let result = AnalysisSession::with_fiber_allocator(mesh, AnalysisOptions::default(), &mut fiber);
    assert!(matches!(result, Err(ResponseError::InvalidInput(_))));
}

#[test]
fn unclassified_elements_still_get_slots() {
    let mesh = mesh_with(&[("FRAME_2D", 1), ("TRUSS_3D", 2)]);
    let session = AnalysisSession::new(mesh, AnalysisOptions::default()).unwrap();
    assert_eq!(session.family_counts().unclassified, 2);
    assert_eq!(session.buffer().unwrap().len(), 3);
}

#[test]
fn mesh_loaded_from_json() {
    let json = r#"{
        "dof_per_node": 3,
        "nodes_per_element": 2,
        "attributes": { "beam": { "element_type": "FRAME_2D" } },
        "elements": [ { "attribute": "beam", "nodes": [1, 2] } ]
    }"#;
    let mesh: Mesh = serde_json::from_str(json).unwrap();
    let counts = classify(&mesh).unwrap();
    assert_eq!(counts.frame_2d, 1);
}

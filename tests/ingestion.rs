//! End-to-end reconstruction of exported sensor sessions.
//!
//! Two sensors on opposite walls observe one person walking across the
//! room. Their exports are parsed, calibrated and merged into one world
//! trajectory.

#![cfg(feature = "serde")]

use approx::assert_relative_eq;
use serde::Serialize;
use spatial_reconstruction::{
    ingest_frames, parse_frames, read_frames, reconstruct, CalibrationStore, Dataset,
    ReconstructionConfig, ReconstructionError,
};

// =============================================================================
// EXPORT BUILDERS
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ExportJoint {
    x: f64,
    y: f64,
    z: f64,
    tracking_state: &'static str,
}

const CALIBRATION_JSON: &str = r#"[
    {"sensor_id": "kinect_a", "origin_x": 0.0, "origin_y": 0.0, "rotation_deg": 0.0},
    {"sensor_id": "kinect_b", "origin_x": 0.0, "origin_y": 8.0, "rotation_deg": 180.0}
]"#;

/// Serialize one exported frame for `camera` with the body at world `(wx, wy)`.
///
/// `kinect_b` sits at `(0, 8)` turned half a turn, so its local frame is the
/// world frame mirrored through that point.
fn export_frame(camera: &str, body: u64, wx: f64, wy: f64, shoulders: bool) -> serde_json::Value {
    let (lx, lz) = match camera {
        "kinect_b" => (-wx, 8.0 - wy),
        _ => (wx, wy),
    };

    let mut joints = serde_json::Map::new();
    let mut put = |name: &str, x: f64, z: f64| {
        let joint = ExportJoint {
            x,
            y: 0.4,
            z,
            tracking_state: "Tracked",
        };
        joints.insert(name.to_string(), serde_json::to_value(joint).unwrap());
    };
    put("SpineMid", lx, lz);
    if shoulders {
        put("ShoulderLeft", lx - 0.2, lz);
        put("ShoulderRight", lx + 0.2, lz);
    }

    serde_json::json!({
        "CameraId": camera,
        "Timestamp": format!("2024-05-21T10:31:{:02}.000", body % 60),
        "BodyId": body,
        "Joints": joints,
    })
}

/// A walk along `y` seen by both sensors, one frame each per step.
fn export_walk(steps: usize, drop_shoulders_at: Option<usize>) -> String {
    let mut frames = Vec::new();
    for step in 0..steps {
        let wy = 1.0 + step as f64 * 0.5;
        let shoulders = drop_shoulders_at != Some(step);
        frames.push(export_frame("kinect_a", step as u64, 1.5, wy, shoulders));
        frames.push(export_frame("kinect_b", step as u64, 1.5, wy, true));
    }
    serde_json::to_string(&frames).unwrap()
}

// =============================================================================
// TESTS
// =============================================================================

#[test]
fn test_sensors_agree_in_world_frame() {
    let store = CalibrationStore::from_json_str(CALIBRATION_JSON).unwrap();
    let frames = parse_frames(&export_walk(8, None)).unwrap();
    let dataset = ingest_frames(&frames, &store, &ReconstructionConfig::default()).unwrap();

    let world = reconstruct(&dataset, &ReconstructionConfig::default()).unwrap();
    assert_eq!(world.len(), 16);

    for pair in world.rows.chunks(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert_eq!(a.observation.sensor_id, "kinect_a");
        assert_eq!(b.observation.sensor_id, "kinect_b");
        assert_relative_eq!(a.global_x, b.global_x, epsilon = 1e-9);
        assert_relative_eq!(a.global_y, b.global_y, epsilon = 1e-9);
        assert_relative_eq!(a.global_x, 1.5, epsilon = 1e-9);
    }

    let counts = world.rows_per_sensor();
    assert_eq!(counts.get("kinect_a"), Some(&8));
    assert_eq!(counts.get("kinect_b"), Some(&8));
}

#[test]
fn test_body_angles_referenced_to_world() {
    let store = CalibrationStore::from_json_str(CALIBRATION_JSON).unwrap();
    let frames = parse_frames(&export_walk(2, None)).unwrap();
    let dataset = ingest_frames(&frames, &store, &ReconstructionConfig::default()).unwrap();
    let world = reconstruct(&dataset, &ReconstructionConfig::default()).unwrap();

    // Both exports report the body facing the sensor (90 degrees locally)
    for row in world.iter() {
        assert_eq!(row.observation.measured_body_angle_deg, Some(90.0));
    }
    assert_eq!(world.rows[0].global_body_angle_deg, Some(-90.0));
    assert_eq!(world.rows[1].global_body_angle_deg, Some(90.0));
}

#[test]
fn test_frames_without_shoulders_are_dropped() {
    let store = CalibrationStore::from_json_str(CALIBRATION_JSON).unwrap();
    let frames = parse_frames(&export_walk(6, Some(3))).unwrap();
    let dataset = ingest_frames(&frames, &store, &ReconstructionConfig::default()).unwrap();

    let world = reconstruct(&dataset, &ReconstructionConfig::default()).unwrap();
    assert_eq!(world.len(), 11);
    assert_eq!(world.dropped_rows, 1);
    assert!(world.iter().all(|r| r.observation.sample_index != 6));

    let positions = reconstruct(&dataset, &ReconstructionConfig::positions_only()).unwrap();
    assert_eq!(positions.len(), 12);
}

#[test]
fn test_read_frames_from_reader() {
    let json = export_walk(3, None);
    let frames = read_frames(json.as_bytes()).unwrap();
    assert_eq!(frames.len(), 6);
    assert_eq!(frames[1].camera_id, "kinect_b");

    let store = CalibrationStore::from_reader(CALIBRATION_JSON.as_bytes()).unwrap();
    assert_eq!(store.len(), 2);
}

#[test]
fn test_unknown_sensor_in_export() {
    let store = CalibrationStore::from_json_str(
        r#"[{"sensor_id": "kinect_a", "origin_x": 0.0, "origin_y": 0.0, "rotation_deg": 0.0}]"#,
    )
    .unwrap();
    let frames = parse_frames(&export_walk(1, None)).unwrap();

    match ingest_frames(&frames, &store, &ReconstructionConfig::default()) {
        Err(ReconstructionError::UnknownSensor(id)) => assert_eq!(id, "kinect_b"),
        other => panic!("expected unknown sensor, got {other:?}"),
    }
}

#[test]
fn test_reconstructed_rows_serialize() {
    let store = CalibrationStore::from_json_str(CALIBRATION_JSON).unwrap();
    let frames = parse_frames(&export_walk(1, None)).unwrap();
    let dataset = ingest_frames(&frames, &store, &ReconstructionConfig::default()).unwrap();
    let world = reconstruct(&dataset, &ReconstructionConfig::default()).unwrap();

    let value = serde_json::to_value(&world.rows[0]).unwrap();
    assert_eq!(value["sensor_id"], "kinect_a");
    assert!(value["global_x"].is_number());
    assert!(value["global_body_angle_deg"].is_number());

    let round: Dataset = serde_json::from_str(&serde_json::to_string(&dataset).unwrap()).unwrap();
    assert_eq!(round, dataset);
}

#[test]
fn test_measured_angle_column_is_required() {
    let missing = r#"[{"sensor_id": "k1", "local_x": 1.0, "local_y": 2.0,
        "origin_x": 0.0, "origin_y": 0.0, "rotation_deg": 0.0}]"#;
    assert!(serde_json::from_str::<Dataset>(missing).is_err());

    let null = r#"[{"sensor_id": "k1", "local_x": 1.0, "local_y": 2.0,
        "origin_x": 0.0, "origin_y": 0.0, "rotation_deg": 0.0,
        "measured_body_angle_deg": null}]"#;
    let dataset: Dataset = serde_json::from_str(null).unwrap();
    assert_eq!(dataset.rows()[0].measured_body_angle_deg, None);

    let world = reconstruct(&dataset, &ReconstructionConfig::default()).unwrap();
    assert!(world.is_empty());
    assert_eq!(world.dropped_rows, 1);

    let positions = reconstruct(&dataset, &ReconstructionConfig::positions_only()).unwrap();
    assert_relative_eq!(positions.rows[0].global_y, 2.0);
}

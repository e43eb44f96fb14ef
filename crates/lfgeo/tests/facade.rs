use lfgeo::prelude::*;

#[test]
fn prelude_reaches_both_entry_points() {
    let params = CameraParameters::default();

    let r = refo(&params).unwrap();
    assert!((r.distance - 962.7459).abs() < 5e-5);
    assert!(r.message().is_empty());

    let t = tria(&params).unwrap();
    assert!((t.baseline - 3.7956).abs() < 5e-5);
    assert!((t.distance - 5869.2898).abs() < 5e-5);
}

#[test]
fn parameters_from_short_names() {
    let params: CameraParameters =
        serde_json::from_str(r#"{ "fU": 193.2935, "df": "inf", "a": 2, "M": 13 }"#).unwrap();
    assert_eq!(params.focus_distance, Real::INFINITY);

    let r = refo(&params).unwrap();
    assert_eq!(r.branch, RefocusBranch::InRange);
    assert!((r.distance - 473.6384).abs() < 5e-5);
}

#[test]
fn results_serialize_infinity_as_text() {
    let params = CameraParameters {
        refocus: 0.0,
        ..CameraParameters::default()
    };
    let r = refo(&params).unwrap();
    assert_eq!(r.branch, RefocusBranch::AtInfinity);
    assert!(r.diagnostics.contains(&Diagnostic::RefocusedPlaneAtInfinity));

    let json = serde_json::to_value(&r).unwrap();
    assert_eq!(json["distance"], "inf");
    assert_eq!(json["branch"], "at_infinity");
}

#[test]
fn sweep_through_facade() {
    let planes = refocus_sweep(
        &CameraParameters::default(),
        1..3,
        &SensorSize::default(),
        &EngineOptions::default(),
    )
    .unwrap();
    assert_eq!(planes.len(), 2);
    assert!(planes.iter().all(|p: &DepthPlane| p.distance.is_finite()));
}

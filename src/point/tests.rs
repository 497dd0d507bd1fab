use super::*;

#[test]
fn parse_integer() {
    assert_eq!(PointValue::parse("76"), PointValue::Integer(76));
    assert_eq!(PointValue::parse("-3"), PointValue::Integer(-3));
}

#[test]
fn parse_float() {
    assert_eq!(PointValue::parse("0.125"), PointValue::Number(0.125));
}

#[test]
fn parse_falls_back_to_text() {
    assert_eq!(
        PointValue::parse("1,2,3,4"),
        PointValue::Text("1,2,3,4".to_string())
    );
    assert_eq!(
        PointValue::parse("Data not found"),
        PointValue::Text("Data not found".to_string())
    );
}

#[test]
fn json_shape_is_flat() {
    let point =
        TelemetryPoint::new("follower_batt.lvl", 1_700_000_000_000i64, PointValue::Integer(76));
    let json = serde_json::to_value(&point).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "timestamp": 1_700_000_000_000i64,
            "id": "follower_batt.lvl",
            "value": 76
        })
    );
}

#[test]
fn text_value_serializes_as_string() {
    let point = TelemetryPoint::new("p", 1, PointValue::Text("0,0,0,1".to_string()));
    let json = serde_json::to_value(&point).unwrap();
    assert_eq!(json["value"], serde_json::json!("0,0,0,1"));
}

#[test]
fn round_trips_through_json() {
    let point = TelemetryPoint::new("leader_adcs.mag", 42, PointValue::Number(1.5));
    let json = serde_json::to_string(&point).unwrap();
    let back: TelemetryPoint = serde_json::from_str(&json).unwrap();
    assert_eq!(back, point);
}

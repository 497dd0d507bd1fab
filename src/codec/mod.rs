//! Normalization of raw source values into telemetry points.
//!
//! A raw value is a string pulled from the value store. Encoding applies
//! exactly one of four rules, in priority order: boolean false, boolean
//! true, comma-delimited vector/quaternion (raw point plus one derived
//! point per axis), or plain pass-through. The vector/quaternion branch
//! discriminates on COMMA COUNT, not component count: a 3-comma string
//! has four substrings but only the first three are read as x/y/z, and a
//! 4-comma string has five substrings with the first four read as
//! a/b/c/d. Downstream consumers depend on that counting.

use crate::point::{now_ms, PointValue, TelemetryPoint};


/// Axis letters for vector3 component points.
pub const VECTOR_AXES: [&str; 3] = ["x", "y", "z"];

/// Axis letters for quaternion4 component points.
pub const QUATERNION_AXES: [&str; 4] = ["a", "b", "c", "d"];

/// Encode one raw value into one or more telemetry points, stamped now.
pub fn encode(entity_tag: &str, point_id: &str, raw: &str) -> Vec<TelemetryPoint> {
    encode_at(entity_tag, point_id, raw, now_ms())
}

/// Encode with an explicit timestamp. Pure; every point produced by one
/// call carries the same timestamp.
pub fn encode_at(
    entity_tag: &str,
    point_id: &str,
    raw: &str,
    timestamp: i64,
) -> Vec<TelemetryPoint> {
    if raw == "false" {
        return vec![TelemetryPoint::new(point_id, timestamp, PointValue::Integer(0))];
    }
    if raw == "true" {
        return vec![TelemetryPoint::new(point_id, timestamp, PointValue::Integer(1))];
    }

    let axes: &[&str] = match comma_count(raw) {
        3 => &VECTOR_AXES,
        4 => &QUATERNION_AXES,
        _ => {
            return vec![TelemetryPoint::new(
                point_id,
                timestamp,
                PointValue::parse(raw),
            )];
        }
    };

    // Raw point unchanged, then one derived point per axis.
    let mut points = Vec::with_capacity(axes.len() + 1);
    points.push(TelemetryPoint::new(
        point_id,
        timestamp,
        PointValue::Text(raw.to_string()),
    ));
    for (ordinal, axis) in axes.iter().enumerate() {
        points.push(TelemetryPoint::new(
            derived_id(entity_tag, point_id, axis),
            timestamp,
            PointValue::Text(coord(raw, ordinal + 1).to_string()),
        ));
    }
    points
}

/// Derived component id: `<tag>_<axis>_<suffix>` where the suffix is the
/// point id with its `<tag>_` prefix stripped.
fn derived_id(entity_tag: &str, point_id: &str, axis: &str) -> String {
    let suffix = point_id
        .strip_prefix(entity_tag)
        .and_then(|rest| rest.strip_prefix('_'))
        .unwrap_or(point_id);
    format!("{}_{}_{}", entity_tag, axis, suffix)
}

fn comma_count(s: &str) -> usize {
    s.matches(',').count()
}

/// The `n`th (1-indexed) comma-delimited field of `s`. When fewer than
/// `n` fields exist the whole remaining substring is returned; never
/// fails on degenerate input.
pub fn coord(s: &str, n: usize) -> &str {
    let mut rest = s;
    let mut remaining = n;
    loop {
        match rest.find(',') {
            None => return rest,
            Some(i) if remaining <= 1 => return &rest[..i],
            Some(i) => {
                rest = &rest[i + 1..];
                remaining -= 1;
            }
        }
    }
}

/// A derived-axis point id recognized by the range-query entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSelector {
    /// 1-indexed comma field holding the requested component
    pub ordinal: usize,
    /// Underlying point id with the axis infix removed (`<tag>_<field>`)
    pub source_id: String,
}

impl AxisSelector {
    /// Detect an axis-component id of the form `<tag>_<axis>_<field>`.
    /// Returns None for plain (non-derived) point ids.
    pub fn detect(point_id: &str) -> Option<AxisSelector> {
        let (tag, rest) = point_id.split_once('_')?;
        let (axis, field) = rest.split_once('_')?;
        let ordinal = if let Some(i) = VECTOR_AXES.iter().position(|a| *a == axis) {
            i + 1
        } else if let Some(i) = QUATERNION_AXES.iter().position(|a| *a == axis) {
            i + 1
        } else {
            return None;
        };
        Some(AxisSelector {
            ordinal,
            source_id: format!("{}_{}", tag, field),
        })
    }

    /// Extract the selected component from a raw range-query value,
    /// reusing the same counting rules as live encoding.
    pub fn select<'a>(&self, raw: &'a str) -> &'a str {
        coord(raw, self.ordinal)
    }
}

/// Strip the `<tag>_` entity prefix from a point id, recovering the
/// underlying source field name.
pub fn strip_entity_prefix(point_id: &str) -> &str {
    match point_id.split_once('_') {
        Some((_, field)) => field,
        None => point_id,
    }
}

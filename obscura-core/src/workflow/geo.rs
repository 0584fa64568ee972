//! Target coordinate projection
//!
//! Projects the dialled bearing and distance from the city origin to
//! the coordinate the artwork depicts. Pure integer math: a
//! quarter-wave sine table with linear interpolation, coordinates in
//! 1e-6 degree units. At telescope distances (under 50 km) the flat
//! local approximation is well inside one part in a thousand, which is
//! far finer than the artwork resolves.

use obscura_protocol::GeoPoint;

/// sin(5° * k) scaled by 10000, k = 0..=18
const SINE_TABLE: [i32; 19] = [
    0, 872, 1736, 2588, 3420, 4226, 5000, 5736, 6428, 7071, 7660, 8192, 8660, 9063, 9397, 9659,
    9848, 9962, 10000,
];

/// Metres per degree of latitude
const METRES_PER_DEGREE: i64 = 111_320;

/// Table step in centidegrees (5 degrees)
const TABLE_STEP_CD: i32 = 500;

/// sin(angle) scaled by 10000, angle in centidegrees
pub fn sin_x10000(angle_cd: i32) -> i32 {
    let angle = angle_cd.rem_euclid(36_000);

    // Quadrant reduction to 0..=9000
    let (reduced, negate) = match angle {
        0..=8_999 => (angle, false),
        9_000..=17_999 => (18_000 - angle, false),
        18_000..=26_999 => (angle - 18_000, true),
        _ => (36_000 - angle, true),
    };

    let idx = (reduced / TABLE_STEP_CD) as usize;
    let rem = reduced % TABLE_STEP_CD;
    let below = SINE_TABLE[idx];
    let value = if rem == 0 {
        below
    } else {
        let above = SINE_TABLE[idx + 1];
        below + (above - below) * rem / TABLE_STEP_CD
    };

    if negate {
        -value
    } else {
        value
    }
}

/// cos(angle) scaled by 10000, angle in centidegrees
pub fn cos_x10000(angle_cd: i32) -> i32 {
    sin_x10000(9_000 - angle_cd)
}

/// Project `distance_m` along `bearing_cd` from `origin`
///
/// Bearing is clockwise from north in centidegrees. Latitude is
/// clamped at the poles; longitude wraps across the antimeridian.
pub fn project_target(origin: GeoPoint, bearing_cd: u16, distance_m: u32) -> GeoPoint {
    let dist = i64::from(distance_m);
    let bearing = i32::from(bearing_cd);

    // Displacement in metres, scaled by 10000
    let north = dist * i64::from(cos_x10000(bearing));
    let east = dist * i64::from(sin_x10000(bearing));

    let dlat_e6 = north * 100 / METRES_PER_DEGREE;

    // Longitude degrees shrink with latitude
    let lat_cd = i64::from(origin.lat_e6) / 10_000;
    let cos_lat = i64::from(cos_x10000(lat_cd as i32)).max(100);
    let dlon_e6 = east * 1_000_000 / (METRES_PER_DEGREE * cos_lat);

    let lat_e6 = (i64::from(origin.lat_e6) + dlat_e6).clamp(-90_000_000, 90_000_000) as i32;
    let lon_e6 = wrap_lon_e6(i64::from(origin.lon_e6) + dlon_e6);

    GeoPoint { lat_e6, lon_e6 }
}

/// Wrap a longitude into (-180, 180] degrees
fn wrap_lon_e6(lon_e6: i64) -> i32 {
    let mut wrapped = (lon_e6 + 180_000_000).rem_euclid(360_000_000) - 180_000_000;
    if wrapped == -180_000_000 {
        wrapped = 180_000_000;
    }
    wrapped as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONDON: GeoPoint = GeoPoint {
        lat_e6: 51_507_400,
        lon_e6: -127_800,
    };

    #[test]
    fn sine_table_quadrants() {
        assert_eq!(sin_x10000(0), 0);
        assert_eq!(sin_x10000(9_000), 10_000);
        assert_eq!(sin_x10000(18_000), 0);
        assert_eq!(sin_x10000(27_000), -10_000);
        assert_eq!(sin_x10000(3_000), 5_000);
        assert_eq!(sin_x10000(15_000), 5_000);
        assert_eq!(sin_x10000(-9_000), -10_000);
    }

    #[test]
    fn sine_interpolation_accuracy() {
        // sin(10.5 deg) = 0.18224
        let value = sin_x10000(1_050);
        assert!((value - 1_822).abs() <= 5, "{value}");
        // sin(47.5 deg) = 0.73728; chord sag dominates mid-segment
        let value = sin_x10000(4_750);
        assert!((value - 7_373).abs() <= 10, "{value}");
    }

    #[test]
    fn cosine_identity() {
        assert_eq!(cos_x10000(0), 10_000);
        assert_eq!(cos_x10000(9_000), 0);
        assert_eq!(cos_x10000(18_000), -10_000);
    }

    #[test]
    fn ten_km_due_north() {
        let target = project_target(LONDON, 0, 10_000);
        // 10 km is 89831 micro-degrees of latitude
        assert_eq!(target.lat_e6 - LONDON.lat_e6, 89_831);
        assert_eq!(target.lon_e6, LONDON.lon_e6);
    }

    #[test]
    fn ten_km_due_east_stretches_with_latitude() {
        let target = project_target(LONDON, 9_000, 10_000);
        assert_eq!(target.lat_e6, LONDON.lat_e6);

        let dlon = target.lon_e6 - LONDON.lon_e6;
        // cos(51.5 deg) = 0.6225, so ~144300 micro-degrees
        assert!((dlon - 144_300).abs() < 1_500, "{dlon}");
    }

    #[test]
    fn equator_east_matches_north_scale() {
        let equator = GeoPoint::default();
        let north = project_target(equator, 0, 10_000);
        let east = project_target(equator, 9_000, 10_000);
        assert_eq!(north.lat_e6, east.lon_e6);
    }

    #[test]
    fn opposite_bearings_cancel() {
        let out = project_target(LONDON, 4_500, 20_000);
        let back = project_target(out, 22_500, 20_000);
        assert!((back.lat_e6 - LONDON.lat_e6).abs() < 200, "{}", back.lat_e6);
        assert!((back.lon_e6 - LONDON.lon_e6).abs() < 1_000, "{}", back.lon_e6);
    }

    #[test]
    fn longitude_wraps_at_antimeridian() {
        let fiji = GeoPoint {
            lat_e6: -17_700_000,
            lon_e6: 179_950_000,
        };
        let target = project_target(fiji, 9_000, 20_000);
        assert!(target.lon_e6 < -179_000_000, "{}", target.lon_e6);
    }

    #[test]
    fn latitude_clamps_at_pole() {
        let near_pole = GeoPoint {
            lat_e6: 89_999_000,
            lon_e6: 0,
        };
        let target = project_target(near_pole, 0, 50_000);
        assert_eq!(target.lat_e6, 90_000_000);
    }
}

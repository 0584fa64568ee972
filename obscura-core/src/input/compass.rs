//! Integer heading math for the telescope bearing
//!
//! The magnetometer gives raw x/y field counts; the captions need a
//! stable compass heading and a 16-wind name. Everything here is
//! integer fixed-point in centidegrees (1/100 degree): an atan lookup
//! table with linear interpolation, an exponential smoother that is
//! aware of the 0/360 seam, and a hysteresis band so the wind name
//! does not chatter when the telescope rests on a sector boundary.

/// atan(k/16) in centidegrees, k = 0..=16
///
/// Octant reduction keeps the argument in 0..=1, so 17 entries with
/// linear interpolation stay within ~3 centidegrees of true.
const ATAN_TABLE: [i32; 17] = [
    0, 358, 713, 1062, 1404, 1735, 2056, 2363, 2657, 2936, 3201, 3451, 3687, 3909, 4119, 4315,
    4500,
];

/// The 16 compass winds, clockwise from north
pub const WIND_NAMES: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Width of one wind sector in centidegrees
const SECTOR_CD: i32 = 2250;

/// How far past a sector boundary the heading must move before the
/// displayed wind changes
const WIND_HYSTERESIS_CD: i32 = 300;

/// atan(min/max) in centidegrees via table lookup with interpolation
///
/// Requires `0 <= min <= max` and `max > 0`.
fn atan_ratio_cd(min: i32, max: i32) -> i32 {
    let scaled = min * 16;
    let idx = (scaled / max) as usize;
    if idx >= 16 {
        return ATAN_TABLE[16];
    }
    let rem = scaled % max;
    let below = ATAN_TABLE[idx];
    let above = ATAN_TABLE[idx + 1];
    below + (above - below) * rem / max
}

/// Compass heading in centidegrees clockwise from north
///
/// Axes follow the installation mounting: +y points at magnetic north,
/// +x points east. Inputs are raw field counts after hard-iron offset
/// subtraction. Returns 0 for a zero field.
pub fn heading_centideg(x: i32, y: i32) -> u16 {
    if x == 0 && y == 0 {
        return 0;
    }

    let ax = x.abs();
    let ay = y.abs();

    // Angle from the vertical axis, 0..=9000
    let from_axis = if ax <= ay {
        atan_ratio_cd(ax, ay)
    } else {
        9000 - atan_ratio_cd(ay, ax)
    };

    let heading = match (x >= 0, y >= 0) {
        (true, true) => from_axis,
        (true, false) => 18_000 - from_axis,
        (false, false) => 18_000 + from_axis,
        (false, true) => 36_000 - from_axis,
    };
    (heading.rem_euclid(36_000)) as u16
}

/// Exponential smoothing across the 0/360 seam
///
/// Quarter-weight EMA: each update moves the filtered heading a
/// quarter of the way to the new sample, along the short arc.
#[derive(Debug, Clone, Default)]
pub struct HeadingFilter {
    filtered_cd: Option<i32>,
}

impl HeadingFilter {
    /// Create an empty filter; the first sample is taken as-is
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one heading sample, returning the smoothed heading
    pub fn update(&mut self, heading_cd: u16) -> u16 {
        let sample = i32::from(heading_cd);
        let filtered = match self.filtered_cd {
            None => sample,
            Some(current) => {
                // Shortest signed arc from current to sample
                let mut diff = (sample - current).rem_euclid(36_000);
                if diff > 18_000 {
                    diff -= 36_000;
                }
                (current + diff / 4).rem_euclid(36_000)
            }
        };
        self.filtered_cd = Some(filtered);
        filtered as u16
    }

    /// Smoothed heading, if any sample has been fed
    pub fn heading_cd(&self) -> Option<u16> {
        self.filtered_cd.map(|cd| cd as u16)
    }

    /// Forget the history (used after a sensor fault recovery)
    pub fn reset(&mut self) {
        self.filtered_cd = None;
    }
}

/// Hysteresis-banded 16-wind classifier
#[derive(Debug, Clone, Default)]
pub struct WindRose {
    sector: Option<usize>,
}

impl WindRose {
    /// Create an unclassified rose; the first heading snaps directly
    pub fn new() -> Self {
        Self::default()
    }

    /// Nominal sector for a heading, ignoring hysteresis
    fn nominal_sector(heading_cd: u16) -> usize {
        // Sector 0 (N) is centered on 0, spanning -1125..1125
        let shifted = (i32::from(heading_cd) + SECTOR_CD / 2).rem_euclid(36_000);
        (shifted / SECTOR_CD) as usize
    }

    /// Classify a heading, returning the sector index 0..16
    ///
    /// The sector only changes once the heading is more than the
    /// hysteresis margin past the shared boundary.
    pub fn update(&mut self, heading_cd: u16) -> usize {
        let current = match self.sector {
            None => {
                let sector = Self::nominal_sector(heading_cd);
                self.sector = Some(sector);
                return sector;
            }
            Some(sector) => sector,
        };

        let center = current as i32 * SECTOR_CD;
        let mut dist = (i32::from(heading_cd) - center).rem_euclid(36_000);
        if dist > 18_000 {
            dist -= 36_000;
        }

        if dist.abs() > SECTOR_CD / 2 + WIND_HYSTERESIS_CD {
            self.sector = Some(Self::nominal_sector(heading_cd));
        }
        // sector is always Some here
        self.sector.unwrap_or(current)
    }

    /// Wind name for the current sector
    pub fn name(&self) -> Option<&'static str> {
        self.sector.map(|s| WIND_NAMES[s])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cardinal_headings() {
        assert_eq!(heading_centideg(0, 1000), 0); // north
        assert_eq!(heading_centideg(1000, 0), 9_000); // east
        assert_eq!(heading_centideg(0, -1000), 18_000); // south
        assert_eq!(heading_centideg(-1000, 0), 27_000); // west
    }

    #[test]
    fn diagonal_headings() {
        assert_eq!(heading_centideg(1000, 1000), 4_500);
        assert_eq!(heading_centideg(1000, -1000), 13_500);
        assert_eq!(heading_centideg(-1000, -1000), 22_500);
        assert_eq!(heading_centideg(-1000, 1000), 31_500);
    }

    #[test]
    fn interpolated_heading_accuracy() {
        // atan(1/2) = 26.565 degrees
        let heading = heading_centideg(500, 1000);
        assert!((i32::from(heading) - 2657).abs() <= 3, "{heading}");

        // atan(3/4) = 36.870 degrees
        let heading = heading_centideg(750, 1000);
        assert!((i32::from(heading) - 3687).abs() <= 3, "{heading}");
    }

    #[test]
    fn zero_field_is_north() {
        assert_eq!(heading_centideg(0, 0), 0);
    }

    #[test]
    fn heading_is_always_in_range() {
        for x in [-1000, -1, 0, 1, 1000] {
            for y in [-1000, -1, 0, 1, 1000] {
                assert!(heading_centideg(x, y) < 36_000);
            }
        }
    }

    #[test]
    fn filter_seeds_with_first_sample() {
        let mut filter = HeadingFilter::new();
        assert_eq!(filter.update(12_345), 12_345);
    }

    #[test]
    fn filter_converges_toward_sample() {
        let mut filter = HeadingFilter::new();
        filter.update(0);
        let mut last = 0;
        for _ in 0..40 {
            last = filter.update(9_000);
        }
        assert!((i32::from(last) - 9_000).abs() < 100, "{last}");
    }

    #[test]
    fn filter_crosses_the_seam_the_short_way() {
        let mut filter = HeadingFilter::new();
        filter.update(35_500);
        // 1000 is 1500 cd clockwise; a naive average would swing south
        let next = filter.update(1_000);
        assert!(next >= 35_500 || next <= 1_000, "{next}");
    }

    #[test]
    fn wind_rose_basic_classification() {
        let mut rose = WindRose::new();
        assert_eq!(rose.update(0), 0); // N
        assert_eq!(rose.update(9_000), 4); // E
        assert_eq!(WIND_NAMES[rose.update(18_000)], "S");
        assert_eq!(rose.name(), Some("S"));
    }

    #[test]
    fn wind_rose_holds_on_boundary_chatter() {
        let mut rose = WindRose::new();
        rose.update(0);
        // N/NNE boundary is at 1125; wobble around it must not switch
        assert_eq!(rose.update(1_200), 0);
        assert_eq!(rose.update(1_050), 0);
        assert_eq!(rose.update(1_400), 0);
        // A decisive move past the margin does switch
        assert_eq!(rose.update(1_500), 1);
        // And wobbling back across the boundary keeps NNE
        assert_eq!(rose.update(1_050), 1);
    }

    #[test]
    fn wind_rose_handles_seam_sector() {
        let mut rose = WindRose::new();
        assert_eq!(rose.update(35_900), 0); // just west of north is still N
        assert_eq!(rose.update(100), 0);
    }
}

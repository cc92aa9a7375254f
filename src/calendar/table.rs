//! Fixed period-to-week lookup table.

/// Half-open week range `[start, end)`.
pub type WeekRange = (i64, i64);

/// Month name to week-index ranges over a two-cycle horizon.
///
/// Weeks are counted on a flattened 52-week-per-year timeline: the first
/// cycle's November starts at week 44 and the second cycle's January
/// starts at week 53. November and December appear in both cycles so a
/// section viable "November to April" resolves to a single run of
/// indices across the year boundary.
///
/// Ranges for the same period are sorted and disjoint.
pub const WEEK_TABLE: &[(&str, &[WeekRange])] = &[
    ("January", &[(53, 57)]),
    ("February", &[(57, 61)]),
    ("March", &[(61, 65)]),
    ("April", &[(65, 70)]),
    ("May", &[(70, 74)]),
    ("June", &[(74, 78)]),
    ("July", &[(78, 83)]),
    ("August", &[(83, 87)]),
    ("September", &[(87, 92)]),
    ("October", &[(92, 96)]),
    ("November", &[(44, 48), (96, 100)]),
    ("December", &[(48, 53), (100, 104)]),
];

/// Weeks per calendar cycle.
pub const WEEKS_PER_CYCLE: i64 = 52;

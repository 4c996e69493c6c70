//! Quality flags of a single trajectory point.
//!
//! Each point of a reconstructed track carries a 32-flag [`FlagSet`] and
//! the index of the hit it originates from. Flags fall into two groups,
//! each meant to be filled by one stage of the reconstruction:
//! - trajectory: [`flags::NO_POINT`] to [`flags::DETECTOR_ISSUE`]
//! - track fit: [`flags::EXCLUDED_FROM_FIT`] to [`flags::REINTERPRETED`]
//!
//! Indices from [`flags::EXPERIMENT_RESERVED_BEGIN`] are left to the
//! experiment, and from [`flags::USER_RESERVED_BEGIN`] to the user.

use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::bitmask::{BitMask, Bits, Flag};
use crate::flagset::FlagSet;

/// Flag indices.
pub mod flags {
    use crate::bitmask::Flag;

    /// Hit was not included in the computation of the trajectory.
    pub const HIT_IGNORED: Flag<u32> = Flag::new(0);
    /// Point has no valid position.
    pub const NO_POINT: Flag<u32> = Flag::new(1);
    /// Point is suspicious for reasons not covered by other flags.
    pub const SUSPICIOUS: Flag<u32> = Flag::new(2);
    /// Hit might be merged with another one.
    pub const MERGED: Flag<u32> = Flag::new(3);
    /// Hit is shared with another trajectory.
    pub const SHARED: Flag<u32> = Flag::new(4);
    /// Hit is likely a delta ray.
    pub const DELTA_RAY: Flag<u32> = Flag::new(5);
    /// Hit sits on a known detector problem.
    pub const DETECTOR_ISSUE: Flag<u32> = Flag::new(6);
    /// Point was excluded from the track fit.
    pub const EXCLUDED_FROM_FIT: Flag<u32> = Flag::new(7);
    /// Hit was rejected by the track fit.
    pub const REJECTED: Flag<u32> = Flag::new(8);
    /// Hit was reinterpreted by the track fit.
    pub const REINTERPRETED: Flag<u32> = Flag::new(9);

    /// First index reserved to the experiment.
    pub const EXPERIMENT_RESERVED_BEGIN: u32 = 16;
    /// First index reserved to the user.
    pub const USER_RESERVED_BEGIN: u32 = 24;
    /// Number of supported flags.
    pub const MAX_FLAGS: u32 = 32;
}

/// Flag set type of a trajectory point.
pub type PointFlagSet = FlagSet<u32, 32>;

/// Origin hit index of a point not associated with any hit.
pub const INVALID_HIT_INDEX: u32 = u32::MAX;

static FLAG_NAMES: Lazy<Vec<String>> = Lazy::new(|| {
    const ASSIGNED: [&str; 10] = [
        "HitIgnored",
        "NoPoint",
        "Suspicious",
        "Merged",
        "Shared",
        "DeltaRay",
        "DetectorIssue",
        "ExcludedFromFit",
        "Rejected",
        "Reinterpreted",
    ];

    (0..flags::MAX_FLAGS)
        .map(|index| match ASSIGNED.get(index as usize) {
            Some(name) => (*name).to_string(),
            None if index >= flags::USER_RESERVED_BEGIN => {
                format!("UserReserved{:02}", index - flags::USER_RESERVED_BEGIN)
            }
            None if index >= flags::EXPERIMENT_RESERVED_BEGIN => {
                format!("ExperimentReserved{:02}", index - flags::EXPERIMENT_RESERVED_BEGIN)
            }
            None => format!("Unassigned{index:02}"),
        })
        .collect()
});

/// Name of a point flag, or `None` for an index beyond the supported ones.
pub fn flag_name(flag: Flag<u32>) -> Option<&'static str> {
    FLAG_NAMES.get(flag.index() as usize).map(String::as_str)
}

/// Flags of a trajectory point, plus the hit it was built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrajectoryPointFlags {
    flags: PointFlagSet,
    from_hit: u32,
}

impl Default for TrajectoryPointFlags {
    fn default() -> Self {
        Self {
            flags: Self::default_flags(),
            from_hit: INVALID_HIT_INDEX,
        }
    }
}

impl TrajectoryPointFlags {
    /// Flags of a default point: only [`flags::NO_POINT`] set.
    pub fn default_flags() -> PointFlagSet {
        PointFlagSet::from_mask(BitMask::from(flags::NO_POINT))
    }

    /// Point built from hit `from_hit` with the default flags.
    pub fn from_hit(from_hit: u32) -> Self {
        Self {
            from_hit,
            ..Self::default()
        }
    }

    /// Point built from hit `from_hit`, with `mask` applied over the
    /// default flags.
    pub fn with_mask(from_hit: u32, mask: BitMask<u32>) -> Self {
        Self {
            flags: PointFlagSet::from_mask(Self::default_flags().mask() + mask),
            from_hit,
        }
    }

    /// The flag set.
    #[inline]
    pub fn flags(&self) -> &PointFlagSet {
        &self.flags
    }

    /// Mutable access to the flag set.
    #[inline]
    pub fn flags_mut(&mut self) -> &mut PointFlagSet {
        &mut self.flags
    }

    /// Index of the originating hit, [`INVALID_HIT_INDEX`] if none.
    #[inline]
    pub fn origin_hit_index(&self) -> u32 {
        self.from_hit
    }

    /// Whether the point is associated with a hit.
    #[inline]
    pub fn has_origin_hit_index(&self) -> bool {
        self.from_hit != INVALID_HIT_INDEX
    }

    /// Associate the point with a hit.
    pub fn set_origin_hit_index(&mut self, from_hit: u32) {
        self.from_hit = from_hit;
    }

    /// Hit was ignored by the fit.
    pub fn is_hit_ignored(&self) -> bool {
        self.flags.is_set(flags::HIT_IGNORED)
    }

    /// Point carries a measurement (NoPoint is not set).
    pub fn is_point_valid(&self) -> bool {
        !self.flags.is_set(flags::NO_POINT)
    }

    /// Hit merges charge from several particles.
    pub fn is_merged(&self) -> bool {
        self.flags.is_set(flags::MERGED)
    }

    /// Hit is shared with another trajectory.
    pub fn is_shared(&self) -> bool {
        self.flags.is_set(flags::SHARED)
    }

    /// Hit is attributed to a delta ray.
    pub fn is_delta_ray(&self) -> bool {
        self.flags.is_set(flags::DELTA_RAY)
    }

    /// Hit sits in a problematic detector region.
    pub fn has_detector_issues(&self) -> bool {
        self.flags.is_set(flags::DETECTOR_ISSUE)
    }

    /// Hit is suspicious for some other reason.
    pub fn is_otherwise_suspicious(&self) -> bool {
        self.flags.is_set(flags::SUSPICIOUS)
    }

    /// Hit is neither merged nor shared.
    pub fn is_exclusive(&self) -> bool {
        self.flags.none_set_in(flags::MERGED | flags::SHARED)
    }

    /// Point was excluded from the fit or its hit rejected.
    pub fn is_excluded_from_fit(&self) -> bool {
        self.flags.any_set_in(flags::EXCLUDED_FROM_FIT | flags::REJECTED)
    }

    /// Hit was not rejected from the trajectory.
    pub fn belongs_to_track(&self) -> bool {
        !self.flags.is_set(flags::REJECTED)
    }

    /// Hit was reinterpreted by the fit.
    pub fn is_hit_reinterpreted(&self) -> bool {
        self.flags.is_set(flags::REINTERPRETED)
    }

    /// Point takes part in the fit.
    pub fn is_included_in_fit(&self) -> bool {
        !self.is_excluded_from_fit()
    }

    /// Point carries any of the trajectory-level problem flags.
    pub fn is_point_flawed(&self) -> bool {
        self.flags.any_set_in(Self::flaw_flags())
    }

    /// Point is valid and carries no problem flag.
    pub fn is_point_flawless(&self) -> bool {
        self.is_point_valid() && !self.is_point_flawed()
    }

    fn flaw_flags() -> Bits<u32> {
        Bits::from_flags([
            flags::SUSPICIOUS,
            flags::MERGED,
            flags::SHARED,
            flags::DELTA_RAY,
            flags::DETECTOR_ISSUE,
        ])
    }
}

impl fmt::Display for TrajectoryPointFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        let mut first = true;
        for index in 0..flags::MAX_FLAGS {
            let flag = Flag::new(index);
            if self.flags.is_undefined(flag) {
                continue;
            }
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            if self.flags.is_unset(flag) {
                f.write_str("!")?;
            }
            f.write_str(flag_name(flag).unwrap_or("?"))?;
        }
        f.write_str("}")?;

        if self.has_origin_hit_index() {
            write!(f, " from hit #{}", self.from_hit)
        } else {
            f.write_str(" (no hit)")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(flag_name(flags::HIT_IGNORED), Some("HitIgnored"));
        assert_eq!(flag_name(flags::REINTERPRETED), Some("Reinterpreted"));
        assert_eq!(flag_name(Flag::new(12)), Some("Unassigned12"));
        assert_eq!(flag_name(Flag::new(17)), Some("ExperimentReserved01"));
        assert_eq!(flag_name(Flag::new(31)), Some("UserReserved07"));
        assert_eq!(flag_name(Flag::new(32)), None);
    }

    #[test]
    fn test_default_is_no_point() {
        let point = TrajectoryPointFlags::default();
        assert!(!point.is_point_valid());
        assert!(!point.has_origin_hit_index());
        assert_eq!(point.flags().count_defined(), 1);
        assert!(point.flags().is_set(flags::NO_POINT));

        assert!(point.is_exclusive());
        assert!(point.is_included_in_fit());
        assert!(point.belongs_to_track());
        assert!(!point.is_point_flawed());
        assert!(!point.is_point_flawless());
    }

    #[test]
    fn test_valid_flawless_point() {
        let point = TrajectoryPointFlags::with_mask(12, -flags::NO_POINT);
        assert!(point.is_point_valid());
        assert!(point.is_point_flawless());
        assert_eq!(point.origin_hit_index(), 12);
        assert_eq!(point.flags().test(flags::NO_POINT), Ok(false));
    }

    #[test]
    fn test_flawed_point() {
        for flag in [
            flags::SUSPICIOUS,
            flags::MERGED,
            flags::SHARED,
            flags::DELTA_RAY,
            flags::DETECTOR_ISSUE,
        ] {
            let point =
                TrajectoryPointFlags::with_mask(0, -flags::NO_POINT + BitMask::from(flag));
            assert!(point.is_point_flawed(), "{flag}");
            assert!(!point.is_point_flawless(), "{flag}");
        }
    }

    #[test]
    fn test_exclusive() {
        let mut point = TrajectoryPointFlags::from_hit(3);
        point.flags_mut().set(flags::SHARED);
        assert!(point.is_shared());
        assert!(!point.is_exclusive());

        point.flags_mut().unset(flags::SHARED).set(flags::MERGED);
        assert!(point.is_merged());
        assert!(!point.is_exclusive());
    }

    #[test]
    fn test_fit_flags() {
        let mut point = TrajectoryPointFlags::from_hit(3);
        point.flags_mut().set(flags::REJECTED);
        assert!(point.is_excluded_from_fit());
        assert!(!point.is_included_in_fit());
        assert!(!point.belongs_to_track());

        let mut point = TrajectoryPointFlags::from_hit(3);
        point.flags_mut().set(flags::EXCLUDED_FROM_FIT);
        assert!(point.is_excluded_from_fit());
        assert!(point.belongs_to_track());

        point.flags_mut().set(flags::REINTERPRETED);
        assert!(point.is_hit_reinterpreted());
    }

    #[test]
    fn test_single_flag_predicates() {
        let mut point = TrajectoryPointFlags::default();
        point
            .flags_mut()
            .set(flags::HIT_IGNORED)
            .set(flags::DELTA_RAY)
            .set(flags::DETECTOR_ISSUE)
            .set(flags::SUSPICIOUS);
        assert!(point.is_hit_ignored());
        assert!(point.is_delta_ray());
        assert!(point.has_detector_issues());
        assert!(point.is_otherwise_suspicious());
    }

    #[test]
    fn test_display() {
        let point = TrajectoryPointFlags::default();
        assert_eq!(point.to_string(), "{NoPoint} (no hit)");

        let mut point = TrajectoryPointFlags::with_mask(7, -flags::NO_POINT);
        point.flags_mut().set(flags::MERGED);
        assert_eq!(point.to_string(), "{!NoPoint, Merged} from hit #7");
    }

    #[test]
    fn test_set_origin_hit_index() {
        let mut point = TrajectoryPointFlags::default();
        point.set_origin_hit_index(42);
        assert!(point.has_origin_hit_index());
        point.set_origin_hit_index(INVALID_HIT_INDEX);
        assert!(!point.has_origin_hit_index());
    }
}

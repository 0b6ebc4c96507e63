//! Directional survey integration by the minimum curvature method.
//!
//! Each pair of consecutive stations is joined by a circular arc. The arc's
//! dogleg angle `β` yields a ratio factor that bends the average of the two
//! station tangents onto the arc.
//!
//! # Formula
//! ```text
//! β    = acos( cos(I2 − I1) − sin I1 · sin I2 · (1 − cos(A2 − A1)) )
//! RF   = 1                  if |β| ≤ min_dogleg
//!      = 2 · tan(β/2) / β   otherwise
//! dTVD = ½ · dMD · (cos I1 + cos I2) · RF
//! dN   = ½ · dMD · (sin I1 · cos A1 + sin I2 · cos A2) · RF
//! dE   = ½ · dMD · (sin I1 · sin A1 + sin I2 · sin A2) · RF
//! DLS  = β · 30               (β in radians)
//! ```
//!
//! # Reference
//! Sawaryn & Thorogood, "A Compendium of Directional Calculations Based on
//! the Minimum Curvature Method", SPE-84246-PA

use glam::DVec3;
use tracing::info;

use crate::channel::{Channel, ChannelFile};
use crate::config::Tolerances;
use crate::error::SurveyError;

/// Inclination and azimuth of one station, in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    pub inclination: f64,
    pub azimuth: f64,
}

impl Orientation {
    pub fn from_degrees(inclination: f64, azimuth: f64) -> Self {
        Self {
            inclination: inclination.to_radians(),
            azimuth: azimuth.to_radians(),
        }
    }

    fn is_valid(&self) -> bool {
        !self.inclination.is_nan() && !self.azimuth.is_nan()
    }

    /// Unit tangent as `(north, east, down)`.
    fn tangent(&self) -> DVec3 {
        let (sin_i, cos_i) = self.inclination.sin_cos();
        let (sin_a, cos_a) = self.azimuth.sin_cos();
        DVec3::new(sin_i * cos_a, sin_i * sin_a, cos_i)
    }
}

/// Displacement between two stations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurveyStep {
    pub north: f64,
    pub east: f64,
    pub tvd: f64,
    /// Dogleg angle `β` in radians.
    pub dogleg: f64,
    pub ratio_factor: f64,
}

/// Minimum curvature displacement over `course_length` of measured depth.
pub fn minimum_curvature_step(
    course_length: f64,
    from: Orientation,
    to: Orientation,
    min_dogleg: f64,
) -> SurveyStep {
    let (i1, a1) = (from.inclination, from.azimuth);
    let (i2, a2) = (to.inclination, to.azimuth);

    // Rounding can push the cosine just past ±1.
    let cos_dogleg = ((i2 - i1).cos() - i1.sin() * i2.sin() * (1.0 - (a2 - a1).cos()))
        .clamp(-1.0, 1.0);
    let dogleg = cos_dogleg.acos();
    let ratio_factor = if dogleg.abs() <= min_dogleg {
        1.0
    } else {
        2.0 * (dogleg / 2.0).tan() / dogleg
    };

    let offset = (from.tangent() + to.tangent()) * (0.5 * course_length * ratio_factor);
    SurveyStep {
        north: offset.x,
        east: offset.y,
        tvd: offset.z,
        dogleg,
        ratio_factor,
    }
}

/// Integrated well path, one entry per station.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyPath {
    pub north: Vec<f64>,
    pub east: Vec<f64>,
    pub tvd: Vec<f64>,
    pub dls: Vec<f64>,
}

impl SurveyPath {
    fn nan(len: usize) -> Self {
        Self {
            north: vec![f64::NAN; len],
            east: vec![f64::NAN; len],
            tvd: vec![f64::NAN; len],
            dls: vec![f64::NAN; len],
        }
    }
}

/// Derives spatial channels from the survey channels of one file.
///
/// Depth comes from the file's index channel; angle channels are in degrees.
pub struct SurveyIntegrator<'a, F: ?Sized> {
    file: &'a mut F,
    tolerances: Tolerances,
}

impl<'a, F: ChannelFile + ?Sized> SurveyIntegrator<'a, F> {
    pub fn new(file: &'a mut F) -> Self {
        Self::with_tolerances(file, Tolerances::default())
    }

    pub fn with_tolerances(file: &'a mut F, tolerances: Tolerances) -> Self {
        Self { file, tolerances }
    }

    /// Integrate the survey and write northing, easting, TVD and DLS.
    ///
    /// Output channels are created (or reused) before anything is written,
    /// so a failure leaves existing data untouched. Traversal starts from
    /// the shallow end: top-down for an ascending index, bottom-up otherwise.
    pub fn compute(
        &mut self,
        azimuth: &str,
        tilt: &str,
        northing: &str,
        easting: &str,
        tvd: &str,
        dls: &str,
    ) -> Result<(), SurveyError> {
        let azimuths = self.input(azimuth)?;
        let tilts = self.input(tilt)?;

        let depth_unit = self.file.index().unit.clone();
        // DLS is the dogleg angle in radians scaled by the course length.
        let dls_unit = format!("rad*{}", self.tolerances.dogleg_course_length);
        let outputs = [
            (northing, depth_unit.as_str(), "Northing"),
            (easting, depth_unit.as_str(), "Easting"),
            (tvd, depth_unit.as_str(), "True vertical depth"),
            (dls, dls_unit.as_str(), "Dogleg severity"),
        ];
        for (name, unit, description) in outputs {
            self.output(name, unit, description)?;
        }

        let depths = self.file.index().data().to_vec();
        let path = if is_ascending(&depths) {
            info!(stations = depths.len(), "integrating survey from top");
            self.compute_from_top(&depths, &azimuths, &tilts)
        } else {
            info!(stations = depths.len(), "integrating survey from bottom");
            self.compute_from_bottom(&depths, &azimuths, &tilts)
        };

        let SurveyPath {
            north,
            east,
            tvd: vertical,
            dls: severity,
        } = path;
        let written = [
            (outputs[0], north),
            (outputs[1], east),
            (outputs[2], vertical),
            (outputs[3], severity),
        ];
        for ((name, unit, description), values) in written {
            self.output(name, unit, description)?.set_data(values);
        }
        Ok(())
    }

    /// Integrate from station 0 towards the last station.
    pub fn compute_from_top(
        &self,
        depths: &[f64],
        azimuths: &[f64],
        tilts: &[f64],
    ) -> SurveyPath {
        self.integrate(depths, azimuths, tilts, 0..depths.len())
    }

    /// Integrate from the last station towards station 0.
    pub fn compute_from_bottom(
        &self,
        depths: &[f64],
        azimuths: &[f64],
        tilts: &[f64],
    ) -> SurveyPath {
        self.integrate(depths, azimuths, tilts, (0..depths.len()).rev())
    }

    /// Shift a channel so its first sample equals `tie_in`.
    pub fn correct_to_tiein(&mut self, name: &str, tie_in: f64) -> Result<(), SurveyError> {
        let channel = self
            .file
            .channel_mut(name)
            .ok_or_else(|| SurveyError::MissingChannel(name.to_string()))?;
        let Some(&first) = channel.data().first() else {
            return Ok(());
        };
        let shift = tie_in - first;
        for value in channel.data_mut() {
            *value += shift;
        }
        channel.refresh_statistics();
        Ok(())
    }

    /// Horizontal displacement `sqrt(N² + E²)` per station.
    pub fn compute_displacement(
        &mut self,
        north: &str,
        east: &str,
        displacement: &str,
    ) -> Result<(), SurveyError> {
        let unit = self.unit_of(north)?;
        let norths = self.input(north)?;
        let easts = self.input(east)?;
        let values = (0..norths.len().max(easts.len()))
            .map(|i| {
                let n = norths.get(i).copied().unwrap_or(f64::NAN);
                let e = easts.get(i).copied().unwrap_or(f64::NAN);
                n.hypot(e)
            })
            .collect();
        self.write(displacement, &unit, "Horizontal displacement", values)
    }

    /// Vertical datum shift: `tvd − correction` per station.
    pub fn compute_tvd(
        &mut self,
        tvd: &str,
        output: &str,
        correction: f64,
    ) -> Result<(), SurveyError> {
        let unit = self.unit_of(tvd)?;
        let values = self.input(tvd)?.iter().map(|v| v - correction).collect();
        self.write(output, &unit, "True vertical depth below datum", values)
    }

    fn integrate(
        &self,
        depths: &[f64],
        azimuths: &[f64],
        tilts: &[f64],
        order: impl IntoIterator<Item = usize>,
    ) -> SurveyPath {
        let mut path = SurveyPath::nan(depths.len());
        // Stations without a depth are skipped and stay NaN.
        let mut order = order.into_iter().filter(|&i| !depths[i].is_nan());
        let Some(anchor) = order.next() else {
            return path;
        };

        let orientation = |i: usize| {
            Orientation::from_degrees(
                tilts.get(i).copied().unwrap_or(f64::NAN),
                azimuths.get(i).copied().unwrap_or(f64::NAN),
            )
        };

        let mut position = DVec3::new(0.0, 0.0, depths[anchor]);
        path.north[anchor] = 0.0;
        path.east[anchor] = 0.0;
        path.tvd[anchor] = depths[anchor];
        path.dls[anchor] = 0.0;

        let mut previous = anchor;
        for station in order {
            let (from, to) = fill_missing(orientation(previous), orientation(station));
            let step = minimum_curvature_step(
                depths[station] - depths[previous],
                from,
                to,
                self.tolerances.min_dogleg,
            );
            position += DVec3::new(step.north, step.east, step.tvd);

            path.north[station] = position.x;
            path.east[station] = position.y;
            path.tvd[station] = position.z;
            path.dls[station] = step.dogleg * self.tolerances.dogleg_course_length;
            previous = station;
        }
        path
    }

    fn input(&self, name: &str) -> Result<Vec<f64>, SurveyError> {
        self.file
            .channel(name)
            .map(|channel| channel.data().to_vec())
            .ok_or_else(|| SurveyError::MissingChannel(name.to_string()))
    }

    fn unit_of(&self, name: &str) -> Result<String, SurveyError> {
        self.file
            .channel(name)
            .map(|channel| channel.unit.clone())
            .ok_or_else(|| SurveyError::MissingChannel(name.to_string()))
    }

    fn output(
        &mut self,
        name: &str,
        unit: &str,
        description: &str,
    ) -> Result<&mut Channel, SurveyError> {
        self.file
            .get_or_create_channel(name, unit, description, "")
            .map_err(|source| SurveyError::ChannelCreation {
                name: name.to_string(),
                source,
            })
    }

    fn write(
        &mut self,
        name: &str,
        unit: &str,
        description: &str,
        values: Vec<f64>,
    ) -> Result<(), SurveyError> {
        self.output(name, unit, description)?.set_data(values);
        Ok(())
    }
}

/// A station with a missing angle borrows the other station's orientation,
/// turning the segment into a straight line.
fn fill_missing(from: Orientation, to: Orientation) -> (Orientation, Orientation) {
    if !from.is_valid() {
        (to, to)
    } else if !to.is_valid() {
        (from, from)
    } else {
        (from, to)
    }
}

/// First valid depth at or above the last valid depth.
fn is_ascending(depths: &[f64]) -> bool {
    let first = depths.iter().find(|d| !d.is_nan());
    let last = depths.iter().rfind(|d| !d.is_nan());
    match (first, last) {
        (Some(first), Some(last)) => first <= last,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use super::*;
    use crate::channel::LogFile;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_vertical_step_has_unit_ratio_factor() {
        let vertical = Orientation::from_degrees(0.0, 0.0);
        let step = minimum_curvature_step(10.0, vertical, vertical, 1e-5);
        assert_eq!(step.ratio_factor, 1.0);
        assert!(step.dogleg.abs() < EPSILON);
        assert!((step.tvd - 10.0).abs() < EPSILON);
        assert!(step.north.abs() < EPSILON);
        assert!(step.east.abs() < EPSILON);
    }

    #[test]
    fn test_quarter_circle_build() {
        // Build from vertical to horizontal on a 100 m radius arc.
        let course_length = 100.0 * FRAC_PI_2;
        let step = minimum_curvature_step(
            course_length,
            Orientation::from_degrees(0.0, 0.0),
            Orientation::from_degrees(90.0, 0.0),
            1e-5,
        );
        assert!((step.dogleg - FRAC_PI_2).abs() < EPSILON);
        assert!((step.ratio_factor - 4.0 / PI).abs() < EPSILON);
        assert!((step.tvd - 100.0).abs() < 1e-6);
        assert!((step.north - 100.0).abs() < 1e-6);
        assert!(step.east.abs() < 1e-6);
    }

    #[test]
    fn test_horizontal_east_turn() {
        let step = minimum_curvature_step(
            10.0,
            Orientation::from_degrees(90.0, 90.0),
            Orientation::from_degrees(90.0, 90.0),
            1e-5,
        );
        assert!((step.east - 10.0).abs() < EPSILON);
        assert!(step.north.abs() < EPSILON);
        assert!(step.tvd.abs() < EPSILON);
    }

    #[test]
    fn test_missing_angles_borrow_other_station() {
        let valid = Orientation::from_degrees(30.0, 45.0);
        let missing = Orientation::from_degrees(f64::NAN, 45.0);
        assert_eq!(fill_missing(missing, valid), (valid, valid));
        assert_eq!(fill_missing(valid, missing), (valid, valid));
    }

    #[test]
    fn test_is_ascending() {
        assert!(is_ascending(&[f64::NAN, 1.0, 2.0]));
        assert!(!is_ascending(&[3.0, 2.0, f64::NAN]));
        assert!(is_ascending(&[]));
    }

    fn make_survey(depths: Vec<f64>, tilts: Vec<f64>, azimuths: Vec<f64>) -> LogFile {
        LogFile::new(Channel::with_data("DEPT", "m", depths))
            .with_channel(Channel::with_data("AZIM", "deg", azimuths))
            .and_then(|f| f.with_channel(Channel::with_data("TILT", "deg", tilts)))
            .unwrap()
    }

    #[test]
    fn test_compute_vertical_well() {
        let mut file = make_survey(vec![100.0, 150.0, 200.0], vec![0.0; 3], vec![0.0; 3]);
        SurveyIntegrator::new(&mut file)
            .compute("AZIM", "TILT", "NORTH", "EAST", "TVD", "DLS")
            .unwrap();

        assert_eq!(file.channel("TVD").unwrap().data(), &[100.0, 150.0, 200.0]);
        assert_eq!(file.channel("NORTH").unwrap().data(), &[0.0; 3]);
        assert_eq!(file.channel("EAST").unwrap().data(), &[0.0; 3]);
        assert_eq!(file.channel("DLS").unwrap().data(), &[0.0; 3]);
        assert_eq!(file.channel("DLS").unwrap().unit, "rad*30");
    }

    #[test]
    fn test_compute_missing_input_fails_without_writing() {
        let mut file = make_survey(vec![0.0, 1.0], vec![0.0; 2], vec![0.0; 2]);
        let err = SurveyIntegrator::new(&mut file)
            .compute("AZIM", "INCL", "NORTH", "EAST", "TVD", "DLS")
            .unwrap_err();
        assert!(matches!(err, SurveyError::MissingChannel(ref name) if name == "INCL"));
        assert_eq!(file.channel_count(), 2);
    }

    #[test]
    fn test_compute_uncreatable_output_fails() {
        let mut file = make_survey(vec![0.0, 1.0], vec![0.0; 2], vec![0.0; 2]);
        let err = SurveyIntegrator::new(&mut file)
            .compute("AZIM", "TILT", "NORTH", "EAST", "DEPT", "DLS")
            .unwrap_err();
        assert!(matches!(err, SurveyError::ChannelCreation { ref name, .. } if name == "DEPT"));
    }

    #[test]
    fn test_top_and_bottom_traversals_agree() {
        let depths = [0.0, 100.0, 200.0, 300.0, 400.0];
        let tilts = [0.0, 5.0, 15.0, 30.0, 42.0];
        let azimuths = [0.0, 45.0, 60.0, 80.0, 95.0];
        fn reversed(values: &[f64]) -> Vec<f64> {
            values.iter().rev().copied().collect()
        }

        let mut file = LogFile::new(Channel::new("DEPT", "m"));
        let integrator = SurveyIntegrator::new(&mut file);
        let top = integrator.compute_from_top(&depths, &azimuths, &tilts);
        let bottom = integrator.compute_from_bottom(
            &reversed(&depths),
            &reversed(&azimuths),
            &reversed(&tilts),
        );

        for (forward, backward) in [
            (&top.north, &bottom.north),
            (&top.east, &bottom.east),
            (&top.tvd, &bottom.tvd),
            (&top.dls, &bottom.dls),
        ] {
            for (a, b) in forward.iter().zip(reversed(backward)) {
                assert!((a - b).abs() < 1e-9, "{a} vs {b}");
            }
        }
        assert!(top.north[4] > 0.0 && top.east[4] > 0.0);
        assert!(top.tvd[4] < 400.0);
    }

    #[test]
    fn test_nan_station_makes_straight_segment() {
        let integrator_file = &mut LogFile::new(Channel::new("DEPT", "m"));
        let integrator = SurveyIntegrator::new(integrator_file);
        let path = integrator.compute_from_top(
            &[0.0, 10.0, 20.0],
            &[90.0, f64::NAN, 90.0],
            &[90.0, 90.0, 90.0],
        );
        assert!((path.east[1] - 10.0).abs() < EPSILON);
        assert!((path.east[2] - 20.0).abs() < EPSILON);
        assert!((path.tvd[2] - 0.0).abs() < EPSILON);
    }

    #[test]
    fn test_missing_depths_are_skipped_when_anchoring() {
        let integrator_file = &mut LogFile::new(Channel::new("DEPT", "m"));
        let integrator = SurveyIntegrator::new(integrator_file);

        let top = integrator.compute_from_top(&[f64::NAN, 10.0, 20.0, 30.0], &[0.0; 4], &[0.0; 4]);
        assert!(top.tvd[0].is_nan() && top.north[0].is_nan());
        assert_eq!(&top.tvd[1..], &[10.0, 20.0, 30.0]);
        assert_eq!(&top.north[1..], &[0.0; 3]);
        assert_eq!(&top.dls[1..], &[0.0; 3]);

        let bottom =
            integrator.compute_from_bottom(&[30.0, 20.0, 10.0, f64::NAN], &[0.0; 4], &[0.0; 4]);
        assert!(bottom.tvd[3].is_nan());
        assert_eq!(&bottom.tvd[..3], &[30.0, 20.0, 10.0]);
    }

    #[test]
    fn test_compute_with_leading_missing_depth() {
        let mut file = make_survey(vec![f64::NAN, 100.0, 150.0], vec![0.0; 3], vec![0.0; 3]);
        SurveyIntegrator::new(&mut file)
            .compute("AZIM", "TILT", "NORTH", "EAST", "TVD", "DLS")
            .unwrap();

        let tvd = file.channel("TVD").unwrap().data();
        assert!(tvd[0].is_nan());
        assert_eq!(&tvd[1..], &[100.0, 150.0]);
    }

    #[test]
    fn test_dls_is_radians_times_course_length() {
        let mut file = make_survey(vec![0.0, 10.0], vec![0.0, 10.0], vec![0.0; 2]);
        SurveyIntegrator::new(&mut file)
            .compute("AZIM", "TILT", "NORTH", "EAST", "TVD", "DLS")
            .unwrap();

        let dls = file.channel("DLS").unwrap();
        assert_eq!(dls.unit, "rad*30");
        assert!((dls.data()[1] - 10.0_f64.to_radians() * 30.0).abs() < EPSILON);
    }

    #[test]
    fn test_correct_to_tiein_preserves_deltas() {
        let mut file = make_survey(vec![0.0, 1.0, 2.0], vec![1.0, 3.0, 7.0], vec![0.0; 3]);
        SurveyIntegrator::new(&mut file)
            .correct_to_tiein("TILT", 100.0)
            .unwrap();
        assert_eq!(file.channel("TILT").unwrap().data(), &[100.0, 102.0, 106.0]);
    }

    #[test]
    fn test_correct_to_tiein_missing_channel() {
        let mut file = make_survey(vec![0.0], vec![0.0], vec![0.0]);
        let err = SurveyIntegrator::new(&mut file)
            .correct_to_tiein("NORTH", 5.0)
            .unwrap_err();
        assert!(matches!(err, SurveyError::MissingChannel(_)));
    }

    #[test]
    fn test_displacement_and_datum_shift() {
        let mut file = LogFile::new(Channel::with_data("DEPT", "m", vec![0.0, 1.0]))
            .with_channel(Channel::with_data("N", "m", vec![3.0, -6.0]))
            .and_then(|f| f.with_channel(Channel::with_data("E", "m", vec![4.0, 8.0])))
            .and_then(|f| f.with_channel(Channel::with_data("TVD", "m", vec![10.0, 20.0])))
            .unwrap();

        let mut integrator = SurveyIntegrator::new(&mut file);
        integrator.compute_displacement("N", "E", "DISP").unwrap();
        integrator.compute_tvd("TVD", "TVDSS", 25.0).unwrap();

        assert_eq!(file.channel("DISP").unwrap().data(), &[5.0, 10.0]);
        assert_eq!(file.channel("TVDSS").unwrap().data(), &[-15.0, -5.0]);
        assert_eq!(file.channel("TVDSS").unwrap().unit, "m");
    }
}

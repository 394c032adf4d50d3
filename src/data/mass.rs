use thiserror::Error;

use super::model::{EventDataset, FourMomentum};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure of the invariant-mass calculation.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MassError {
    /// The pair's mass squared is negative (or NaN after overflow), so no
    /// real mass exists.
    #[error("negative mass squared ({mass_squared}), invalid calculation")]
    NonPhysicalResult { mass_squared: f64 },
}

impl FourMomentum {
    /// Invariant mass, `sqrt(E² - |p|²)`.
    pub fn mass(&self) -> Result<f64, MassError> {
        let mass_squared = self.mass_squared();
        if mass_squared.is_nan() || mass_squared < 0.0 {
            return Err(MassError::NonPhysicalResult { mass_squared });
        }
        Ok(mass_squared.sqrt())
    }
}

// ---------------------------------------------------------------------------
// Mass recalculation
// ---------------------------------------------------------------------------

/// Invariant mass of a two-particle system.
pub fn pair_mass(p1: FourMomentum, p2: FourMomentum) -> Result<f64, MassError> {
    (p1 + p2).mass()
}

/// Invariant mass from the raw per-particle components:
///
/// `M² = (E1+E2)² - (px1+px2)² - (py1+py2)² - (pz1+pz2)²`
#[allow(clippy::too_many_arguments)]
pub fn invariant_mass(
    e1: f64,
    e2: f64,
    px1: f64,
    px2: f64,
    py1: f64,
    py2: f64,
    pz1: f64,
    pz2: f64,
) -> Result<f64, MassError> {
    pair_mass(
        FourMomentum::new(e1, px1, py1, pz1),
        FourMomentum::new(e2, px2, py2, pz2),
    )
}

/// `M_New` and `delta_M`, one entry per event in dataset order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedColumns {
    /// Recomputed mass; `None` when undefined.
    pub m_new: Vec<Option<f64>>,
    /// `M - M_New`; `None` when either side is undefined.
    pub delta_m: Vec<Option<f64>>,
    /// Rows whose mass squared came out negative.
    pub non_physical: usize,
    /// Rows lacking one of the kinematic inputs.
    pub missing_input: usize,
}

impl DerivedColumns {
    pub fn len(&self) -> usize {
        self.m_new.len()
    }

    pub fn is_empty(&self) -> bool {
        self.m_new.is_empty()
    }

    /// Rows whose `M_New` is undefined for any reason.
    pub fn undefined(&self) -> usize {
        self.m_new.iter().filter(|m| m.is_none()).count()
    }
}

/// Recompute `M_New` for every event and derive `delta_M`.
///
/// A non-physical event becomes `None` and processing continues; no row
/// affects another.
pub fn recompute(dataset: &EventDataset) -> DerivedColumns {
    let mut derived = DerivedColumns {
        m_new: Vec::with_capacity(dataset.len()),
        delta_m: Vec::with_capacity(dataset.len()),
        ..Default::default()
    };

    for ev in &dataset.events {
        let m_new = match ev.four_momenta() {
            Some((p1, p2)) => match pair_mass(p1, p2) {
                Ok(mass) => Some(mass),
                Err(e) => {
                    log::debug!(
                        "Row {}: error in invariant mass calculation for {p1} + {p2}: {e}",
                        ev.row
                    );
                    derived.non_physical += 1;
                    None
                }
            },
            None => {
                derived.missing_input += 1;
                None
            }
        };
        let delta_m = match (ev.m, m_new) {
            (Some(m), Some(m_new)) => Some(m - m_new),
            _ => None,
        };
        derived.m_new.push(m_new);
        derived.delta_m.push(delta_m);
    }

    if derived.non_physical > 0 {
        log::warn!(
            "{} of {} events have a negative mass squared; M_New left undefined",
            derived.non_physical,
            dataset.len()
        );
    }
    derived
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::data::model::Event;

    fn event(row: usize, components: [f64; 8], m: Option<f64>) -> Event {
        let [e1, e2, px1, px2, py1, py2, pz1, pz2] = components;
        Event {
            row,
            e1: Some(e1),
            e2: Some(e2),
            px1: Some(px1),
            px2: Some(px2),
            py1: Some(py1),
            py2: Some(py2),
            pz1: Some(pz1),
            pz2: Some(pz2),
            m,
            ..Default::default()
        }
    }

    #[test]
    fn back_to_back_pair_has_mass_100() {
        let m = invariant_mass(50.0, 50.0, 30.0, -30.0, 0.0, 0.0, 0.0, 0.0).unwrap();
        assert_relative_eq!(m, 100.0);
    }

    #[test]
    fn negative_mass_squared_is_non_physical() {
        let err = invariant_mass(1.0, 1.0, 10.0, 0.0, 0.0, 0.0, 0.0, 0.0).unwrap_err();
        assert_eq!(err, MassError::NonPhysicalResult { mass_squared: -96.0 });
    }

    #[test]
    fn matches_formula() {
        let (e1, e2): (f64, f64) = (45.3, 38.9);
        let (px1, px2, py1, py2, pz1, pz2): (f64, f64, f64, f64, f64, f64) =
            (-12.1, 9.8, 20.4, -17.6, 31.0, -5.2);
        let expected = ((e1 + e2).powi(2)
            - (px1 + px2).powi(2)
            - (py1 + py2).powi(2)
            - (pz1 + pz2).powi(2))
        .sqrt();
        let m = invariant_mass(e1, e2, px1, px2, py1, py2, pz1, pz2).unwrap();
        assert_relative_eq!(m, expected, epsilon = 1e-12);
    }

    #[test]
    fn exchanging_particles_keeps_the_mass() {
        let p1 = FourMomentum::new(58.7, -7.3, 21.9, 40.1);
        let p2 = FourMomentum::new(37.2, 3.6, -19.4, 12.8);
        assert_relative_eq!(
            pair_mass(p1, p2).unwrap(),
            pair_mass(p2, p1).unwrap(),
            epsilon = 1e-12
        );

        let bad1 = FourMomentum::new(1.0, 10.0, 0.0, 0.0);
        let bad2 = FourMomentum::new(1.0, 0.0, 0.0, 0.0);
        assert_eq!(pair_mass(bad1, bad2), pair_mass(bad2, bad1));
    }

    #[test]
    fn overflowing_components_are_non_physical() {
        // (2e160)² overflows on both sides: inf - inf = NaN.
        let err = invariant_mass(1e160, 1e160, 1e160, 1e160, 0.0, 0.0, 0.0, 0.0).unwrap_err();
        let MassError::NonPhysicalResult { mass_squared } = err;
        assert!(mass_squared.is_nan());

        let derived = recompute(&EventDataset::new(
            vec![event(0, [1e160, 1e160, 1e160, 1e160, 0.0, 0.0, 0.0, 0.0], Some(91.2))],
            Vec::new(),
        ));
        assert_eq!(derived.m_new, vec![None]);
        assert_eq!(derived.delta_m, vec![None]);
        assert_eq!(derived.non_physical, 1);
        assert_eq!(derived.undefined(), 1);
    }

    #[test]
    fn zero_mass_squared_is_defined() {
        let m = invariant_mass(5.0, 0.0, 3.0, 0.0, 4.0, 0.0, 0.0, 0.0).unwrap();
        assert_eq!(m, 0.0);
    }

    #[test]
    fn recompute_continues_past_non_physical_rows() {
        let dataset = EventDataset::new(
            vec![
                event(0, [50.0, 50.0, 30.0, -30.0, 0.0, 0.0, 0.0, 0.0], Some(100.5)),
                event(1, [1.0, 1.0, 10.0, 0.0, 0.0, 0.0, 0.0, 0.0], Some(3.0)),
                event(2, [50.0, 50.0, 30.0, -30.0, 0.0, 0.0, 0.0, 0.0], None),
            ],
            Vec::new(),
        );

        let derived = recompute(&dataset);

        assert_eq!(derived.len(), 3);
        assert_eq!(derived.m_new, vec![Some(100.0), None, Some(100.0)]);
        assert_relative_eq!(derived.delta_m[0].unwrap(), 0.5);
        assert_eq!(derived.delta_m[1], None);
        assert_eq!(derived.delta_m[2], None);
        assert_eq!(derived.non_physical, 1);
        assert_eq!(derived.missing_input, 0);
        assert_eq!(derived.undefined(), 1);
    }

    #[test]
    fn recompute_leaves_rows_with_missing_inputs_undefined() {
        let mut ev = event(0, [50.0, 50.0, 30.0, -30.0, 0.0, 0.0, 0.0, 0.0], Some(100.0));
        ev.pz1 = None;
        let derived = recompute(&EventDataset::new(vec![ev], Vec::new()));
        assert_eq!(derived.m_new, vec![None]);
        assert_eq!(derived.missing_input, 1);
        assert_eq!(derived.non_physical, 0);
    }
}

// src/services/calculations.rs
use log::warn;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{FipeError, Result};
use crate::models::{PriceChange, PriceHistory, PricePoint, VehicleHistory};

/// `None` for a zero base or when the ratio does not fit in a `Decimal`.
fn percent_change(previous: Decimal, current: Decimal) -> Option<Decimal> {
    if previous.is_zero() {
        return None;
    }
    current
        .checked_sub(previous)?
        .checked_div(previous)?
        .checked_mul(Decimal::ONE_HUNDRED)
}

fn difference(previous: &PricePoint, current: &PricePoint) -> Result<Decimal> {
    current.price.checked_sub(previous.price).ok_or_else(|| {
        FipeError::InvalidPrice(format!(
            "change from {} to {} overflows",
            previous.price, current.price
        ))
    })
}

impl PriceHistory {
    /// Builds the history from raw observations in any order.
    ///
    /// Points are sorted by reference code, the oldest one seeds the first
    /// delta and is then dropped from `changes`.
    pub fn from_points(points: Vec<PricePoint>) -> Result<Self> {
        let mut sorted = points;
        sorted.sort_by_key(|p| p.reference);

        if sorted.len() < 2 {
            warn!("Insufficient price points ({}) for delta calculation", sorted.len());
            return Err(FipeError::InsufficientData { points: sorted.len() });
        }

        let changes = sorted
            .windows(2)
            .map(|pair| {
                let (previous, current) = (&pair[0], &pair[1]);
                Ok(PriceChange {
                    reference: current.reference,
                    month: current.month.clone(),
                    price: current.price,
                    delta: difference(previous, current)?,
                    delta_percent: percent_change(previous.price, current.price),
                })
            })
            .collect::<Result<Vec<PriceChange>>>()?;

        let seed = sorted.remove(0);
        let (current_price, last_change) = match changes.last() {
            Some(last) => (last.price, last.delta),
            None => return Err(FipeError::InsufficientData { points: 1 }),
        };
        let cumulative_change = current_price.checked_sub(seed.price).ok_or_else(|| {
            FipeError::InvalidPrice(format!("change from {} to {} overflows", seed.price, current_price))
        })?;

        Ok(PriceHistory {
            cumulative_change,
            cumulative_percent: percent_change(seed.price, current_price),
            seed,
            changes,
            current_price,
            last_change,
        })
    }

    pub fn deltas(&self) -> Vec<Decimal> {
        self.changes.iter().map(|c| c.delta).collect()
    }

    pub fn percentages(&self) -> Vec<Option<Decimal>> {
        self.changes.iter().map(|c| c.delta_percent).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedVehicle {
    pub label: String,
    pub initial_price: Decimal,
    pub final_price: Decimal,
    pub change: Decimal,
    pub change_percent: Option<Decimal>,
}

impl From<&VehicleHistory> for RankedVehicle {
    fn from(entry: &VehicleHistory) -> Self {
        RankedVehicle {
            label: entry.vehicle.label(),
            initial_price: entry.history.seed.price,
            final_price: entry.history.current_price,
            change: entry.history.cumulative_change,
            change_percent: entry.history.cumulative_percent,
        }
    }
}

/// Biggest cumulative percentage gain first; vehicles without a percentage
/// (zero seed price) go last.
pub fn rank_by_change(histories: &[VehicleHistory]) -> Vec<RankedVehicle> {
    let mut ranked: Vec<RankedVehicle> = histories.iter().map(RankedVehicle::from).collect();
    ranked.sort_by(|a, b| match (a.change_percent, b.change_percent) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatalogEntry, ResolvedVehicle};
    use rust_decimal_macros::dec;

    fn point(reference: u32, price: Decimal) -> PricePoint {
        PricePoint {
            reference,
            month: format!("ref {}", reference),
            price,
        }
    }

    #[test]
    fn computes_period_and_percentage_deltas() {
        let history = PriceHistory::from_points(vec![
            point(1, dec!(100)),
            point(2, dec!(110)),
            point(3, dec!(121)),
        ])
        .unwrap();

        assert_eq!(history.deltas(), vec![dec!(10), dec!(11)]);
        assert_eq!(history.percentages(), vec![Some(dec!(10)), Some(dec!(10))]);
        assert_eq!(history.seed.reference, 1);
        assert_eq!(history.changes.len(), 2);
        assert_eq!(history.current_price, dec!(121));
        assert_eq!(history.last_change, dec!(11));
        assert_eq!(history.cumulative_change, dec!(21));
        assert_eq!(history.cumulative_percent, Some(dec!(21)));
    }

    #[test]
    fn sorts_by_reference_before_diffing() {
        // Upstream lists the newest reference first.
        let history = PriceHistory::from_points(vec![
            point(310, dec!(121)),
            point(309, dec!(110)),
            point(308, dec!(100)),
        ])
        .unwrap();

        let refs: Vec<u32> = history.changes.iter().map(|c| c.reference).collect();
        assert_eq!(refs, vec![309, 310]);
        assert_eq!(history.deltas(), vec![dec!(10), dec!(11)]);
    }

    #[test]
    fn fewer_than_two_points_is_insufficient() {
        assert!(matches!(
            PriceHistory::from_points(vec![]),
            Err(FipeError::InsufficientData { points: 0 })
        ));
        assert!(matches!(
            PriceHistory::from_points(vec![point(1, dec!(100))]),
            Err(FipeError::InsufficientData { points: 1 })
        ));
    }

    #[test]
    fn zero_previous_price_has_no_percentage() {
        let history = PriceHistory::from_points(vec![point(1, dec!(0)), point(2, dec!(50))]).unwrap();
        assert_eq!(history.deltas(), vec![dec!(50)]);
        assert_eq!(history.percentages(), vec![None]);
        assert_eq!(history.cumulative_percent, None);
    }

    #[test]
    fn price_drops_are_negative() {
        let history = PriceHistory::from_points(vec![point(1, dec!(200)), point(2, dec!(150))]).unwrap();
        assert_eq!(history.last_change, dec!(-50));
        assert_eq!(history.cumulative_percent, Some(dec!(-25)));
    }

    #[test]
    fn extreme_prices_do_not_panic() {
        // The ratio overflows, the difference still fits.
        let history = PriceHistory::from_points(vec![
            point(1, dec!(0.01)),
            point(2, Decimal::MAX),
        ])
        .unwrap();
        assert_eq!(history.percentages(), vec![None]);
        assert_eq!(history.cumulative_percent, None);

        // Here the difference itself overflows.
        let result = PriceHistory::from_points(vec![point(1, Decimal::MIN), point(2, Decimal::MAX)]);
        assert!(matches!(result, Err(FipeError::InvalidPrice(_))));
    }

    #[test]
    fn parsed_extreme_prices_do_not_panic() {
        use crate::services::currency::parse_brl;

        let tiny = parse_brl("0,01").unwrap();
        let huge = parse_brl("79.228.162.514.264.337.593.543.950.335").unwrap();
        let history = PriceHistory::from_points(vec![point(1, tiny), point(2, huge)]).unwrap();
        assert_eq!(history.changes[0].delta_percent, None);

        let negative = parse_brl("-79.228.162.514.264.337.593.543.950.335").unwrap();
        assert!(PriceHistory::from_points(vec![point(1, negative), point(2, huge)]).is_err());
    }

    fn vehicle(name: &str, prices: &[Decimal]) -> VehicleHistory {
        let points = prices
            .iter()
            .enumerate()
            .map(|(i, p)| point(i as u32 + 1, *p))
            .collect();
        VehicleHistory {
            vehicle: ResolvedVehicle {
                brand: CatalogEntry::new("Nissan", "43"),
                model: CatalogEntry::new(name, "1"),
                year: CatalogEntry::new("2012 Gasolina", "2012-1"),
            },
            history: PriceHistory::from_points(points).unwrap(),
        }
    }

    #[test]
    fn ranks_by_cumulative_percentage() {
        let histories = vec![
            vehicle("March", &[dec!(100), dec!(95)]),
            vehicle("Sentra", &[dec!(100), dec!(120)]),
            vehicle("Versa", &[dec!(0), dec!(10)]),
            vehicle("Tiida", &[dec!(100), dec!(105)]),
        ];
        let ranked = rank_by_change(&histories);
        let labels: Vec<&str> = ranked.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Nissan - Sentra (2012 Gasolina)",
                "Nissan - Tiida (2012 Gasolina)",
                "Nissan - March (2012 Gasolina)",
                "Nissan - Versa (2012 Gasolina)",
            ]
        );
        assert_eq!(ranked[0].change, dec!(20));
        assert_eq!(ranked[0].initial_price, dec!(100));
    }
}

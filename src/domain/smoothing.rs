// Smoothing pass - Centered moving average over chart points
use super::chart::ChartPoint;

/// Replace each designated field with the mean of its defined values within
/// `radius` points on either side.
///
/// Windows are clamped at the edges, never padded. Series shorter than one
/// full window come back unchanged. Points where a field is absent keep it
/// absent.
pub fn smooth<S: AsRef<str>>(points: &[ChartPoint], fields: &[S], radius: usize) -> Vec<ChartPoint> {
    if radius == 0 || points.len() < radius.saturating_mul(2).saturating_add(1) {
        return points.to_vec();
    }

    let last = points.len() - 1;
    points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let neighbours = &points[i.saturating_sub(radius)..=i.saturating_add(radius).min(last)];
            let mut smoothed = point.clone();

            for field in fields {
                let field = field.as_ref();
                if point.get(field).is_none() {
                    continue;
                }

                let (sum, count) = neighbours
                    .iter()
                    .filter_map(|p| p.get(field))
                    .fold((0.0, 0u32), |(sum, count), v| (sum + v, count + 1));

                smoothed.fields.insert(field.to_string(), sum / f64::from(count));
            }

            smoothed
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDateTime};

    fn series(values: &[Option<f64>]) -> Vec<ChartPoint> {
        let start = NaiveDateTime::parse_from_str("2024-03-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let point = ChartPoint::new(start + Duration::hours(i as i64));
                match v {
                    Some(v) => point.with("depth10", *v),
                    None => point,
                }
            })
            .collect()
    }

    fn values(points: &[ChartPoint]) -> Vec<Option<f64>> {
        points.iter().map(|p| p.get("depth10")).collect()
    }

    #[test]
    fn test_radius_one_over_three_points() {
        let points = series(&[Some(10.0), Some(20.0), Some(30.0)]);
        let smoothed = smooth(&points, &["depth10"], 1);

        assert_eq!(values(&smoothed), vec![Some(15.0), Some(20.0), Some(25.0)]);
    }

    #[test]
    fn test_radius_zero_is_identity() {
        let points = series(&[Some(1.0), Some(7.0), None, Some(3.0)]);
        assert_eq!(smooth(&points, &["depth10"], 0), points);
    }

    #[test]
    fn test_short_series_passes_through() {
        let points = series(&[Some(10.0), Some(20.0), Some(30.0), Some(40.0)]);
        assert_eq!(smooth(&points, &["depth10"], 2), points);
    }

    #[test]
    fn test_huge_radius_passes_through() {
        let points = series(&[Some(10.0), Some(20.0), Some(30.0)]);
        assert_eq!(smooth(&points, &["depth10"], usize::MAX), points);
        assert_eq!(smooth(&points, &["depth10"], usize::MAX / 2), points);
    }

    #[test]
    fn test_absent_values_skipped_and_kept_absent() {
        let points = series(&[Some(10.0), None, Some(30.0), Some(50.0)]);
        let smoothed = smooth(&points, &["depth10"], 1);

        assert_eq!(values(&smoothed), vec![Some(10.0), None, Some(40.0), Some(40.0)]);
    }

    #[test]
    fn test_only_designated_fields_change() {
        let points: Vec<ChartPoint> = series(&[Some(10.0), Some(20.0), Some(30.0)])
            .into_iter()
            .enumerate()
            .map(|(i, p)| p.with("rain", i as f64))
            .collect();

        let smoothed = smooth(&points, &["depth10"], 1);

        let rain: Vec<_> = smoothed.iter().map(|p| p.get("rain")).collect();
        assert_eq!(rain, vec![Some(0.0), Some(1.0), Some(2.0)]);
    }

    #[test]
    fn test_boundary_uses_available_neighbours_only() {
        let points = series(&[Some(0.0), Some(10.0), Some(20.0), Some(30.0), Some(40.0)]);
        let smoothed = smooth(&points, &["depth10"], 2);

        // index 0 sees indices 0..=2, index 4 sees 2..=4
        assert_eq!(smoothed[0].get("depth10"), Some(10.0));
        assert_eq!(smoothed[2].get("depth10"), Some(20.0));
        assert_eq!(smoothed[4].get("depth10"), Some(30.0));
    }
}

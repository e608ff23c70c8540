//! Great-circle math and the proximity view used by the shelter map.

pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub const DEFAULT_RADIUS_KM: f64 = 50.0;
pub const MAX_RADIUS_KM: f64 = 500.0;


#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Coord {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coord {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Coord { latitude, longitude }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude >= -90.0 && self.latitude <= 90.0
            && self.longitude >= -180.0 && self.longitude <= 180.0
    }
}


pub fn haversine_km(from: Coord, to: Coord) -> f64 {
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + from.latitude.to_radians().cos()
        * to.latitude.to_radians().cos()
        * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

pub fn format_distance_km(distance: f64) -> String {
    format!("{:.1} km", distance)
}

pub fn clamp_radius(radius: Option<f64>) -> f64 {
    match radius {
        Some(r) if r < 0.0 => 0.0,
        Some(r) if r > MAX_RADIUS_KM => MAX_RADIUS_KM,
        Some(r) => r,
        None => DEFAULT_RADIUS_KM,
    }
}

/// Re-derives the "nearby" view from its three inputs.
///
/// Without a user coordinate every entry passes through undistanced and
/// unfiltered. With one, entries lacking a coordinate are dropped, the
/// rest get a distance, entries beyond the radius are dropped and the
/// result is sorted nearest-first.
pub fn proximity_view<I>(entries: I, user: Option<Coord>, radius_km: f64)
    -> Vec<(i32, Option<f64>)>
    where I: IntoIterator<Item = (i32, Option<Coord>)> {

    match user {
        Some(origin) => {
            let mut view = entries.into_iter()
                .filter_map(|(id, coord)| coord.map(|c| (id, c)))
                .map(|(id, coord)| (id, haversine_km(origin, coord)))
                .filter(|&(_, dist)| dist <= radius_km)
                .map(|(id, dist)| (id, Some(dist)))
                .collect::<Vec<_>>();

            view.sort_by(|a, b| {
                a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal)
            });

            view
        },
        None => {
            entries.into_iter()
                .map(|(id, _)| (id, None))
                .collect()
        },
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    // Netaji Indoor Stadium and Salt Lake Stadium, about 6.7km apart.
    const KOLKATA_A: Coord = Coord { latitude: 22.5726, longitude: 88.3439 };
    const KOLKATA_B: Coord = Coord { latitude: 22.5691, longitude: 88.4091 };

    fn sample_entries() -> Vec<(i32, Option<Coord>)> {
        vec![
            (1, Some(KOLKATA_A)),
            (2, Some(KOLKATA_B)),
            (3, Some(Coord::new(27.0360, 88.2627))),    // Darjeeling, ~490km
            (4, None),
        ]
    }

    #[test]
    fn zero_distance_for_identical_points() {
        assert!(haversine_km(KOLKATA_A, KOLKATA_A).abs() < 1e-9);
    }

    #[test]
    fn known_reference_distance() {
        let dist = haversine_km(KOLKATA_A, KOLKATA_B);
        assert!((dist - 6.7).abs() < 0.3, "got {}", dist);
    }

    #[test]
    fn distance_is_symmetric() {
        let there = haversine_km(KOLKATA_A, KOLKATA_B);
        let back = haversine_km(KOLKATA_B, KOLKATA_A);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn format_uses_one_decimal() {
        assert_eq!(format_distance_km(6.666), "6.7 km");
        assert_eq!(format_distance_km(0.0), "0.0 km");
    }

    #[test]
    fn radius_clamped_to_allowed_range() {
        assert_eq!(clamp_radius(None), DEFAULT_RADIUS_KM);
        assert_eq!(clamp_radius(Some(-3.0)), 0.0);
        assert_eq!(clamp_radius(Some(9000.0)), MAX_RADIUS_KM);
        assert_eq!(clamp_radius(Some(120.0)), 120.0);
    }

    #[test]
    fn without_user_location_everything_passes_through() {
        let view = proximity_view(sample_entries(), None, 10.0);
        assert_eq!(view.len(), 4);
        assert!(view.iter().all(|&(_, dist)| dist.is_none()));
    }

    #[test]
    fn radius_filters_and_sorts_nearest_first() {
        let user = Coord::new(22.57, 88.35);
        let view = proximity_view(sample_entries(), Some(user), 10.0);

        let ids = view.iter().map(|&(id, _)| id).collect::<Vec<_>>();
        assert_eq!(ids, vec![1, 2]);
        assert!(view[0].1.unwrap() < view[1].1.unwrap());
    }

    #[test]
    fn growing_radius_never_shrinks_the_view() {
        let user = Coord::new(22.57, 88.35);
        let mut last_len = 0;

        for radius in &[0.0, 1.0, 10.0, 100.0, 500.0] {
            let len = proximity_view(sample_entries(), Some(user), *radius).len();
            assert!(len >= last_len, "radius {} shrank the view", radius);
            last_len = len;
        }
    }

    #[test]
    fn missing_coordinate_excluded_when_user_known() {
        let user = Coord::new(22.57, 88.35);
        let view = proximity_view(sample_entries(), Some(user), MAX_RADIUS_KM);
        assert!(view.iter().all(|&(id, _)| id != 4));
    }

    #[test]
    fn coord_validity_bounds() {
        assert!(Coord::new(22.57, 88.35).is_valid());
        assert!(!Coord::new(91.0, 0.0).is_valid());
        assert!(!Coord::new(0.0, -181.0).is_valid());
    }
}

use des_core::position::{Euclidean2D, Position};

#[test]
fn coordinates_round_trip() {
    let p = Euclidean2D::from_coordinates(&[3.0, 4.0]).expect("build");
    assert_eq!(p.coordinates(), vec![3.0, 4.0]);
    assert_eq!(Euclidean2D::dimensions(), 2);
}

#[test]
fn arity_is_enforced() {
    let err = Euclidean2D::from_coordinates(&[1.0]).unwrap_err();
    assert_eq!(err.info().code, "position-arity");
}

#[test]
fn plus_minus_cancel() {
    let a = Euclidean2D::new(1.5, -2.0);
    let b = Euclidean2D::new(0.5, 3.0);
    assert_eq!(a.plus(&b).minus(&b), a);
}

#[test]
fn distance_matches_pythagoras() {
    let origin = Euclidean2D::new(0.0, 0.0);
    let p = Euclidean2D::new(3.0, 4.0);
    assert!((origin.distance_to(&p) - 5.0).abs() < 1e-12);
}

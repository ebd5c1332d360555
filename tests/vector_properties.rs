use approx::assert_relative_eq;
use lanevec::prelude::*;
use proptest::prelude::*;
use std::sync::Arc;

fn any_scalars(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1.0e6f64..1.0e6, 0..=max_len)
}

fn any_pair(max_len: usize) -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (0..=max_len).prop_flat_map(|len| {
        let scalars = || prop::collection::vec(-1.0e6f64..1.0e6, len);
        (scalars(), scalars())
    })
}

#[test]
fn round_trip_by_index() {
    let scalars = [1.0, 2.0, 3.0, 4.0, 5.0];
    let v = Vector::<f32x4>::from_scalars(&scalars);
    for (idx, &x) in scalars.iter().enumerate() {
        assert_eq!(v[idx], x);
        assert_eq!(v.get(idx), Ok(x));
    }
    assert_eq!(v.iter().collect::<Vec<_>>(), scalars);
}

#[test]
fn extrema_ignore_padding() {
    let v = Vector::<f32x4>::from_scalars(&[1.0, 2.0, 3.0]);
    assert_eq!(v.max(), Ok(3.0));
    assert_eq!(v.min(), Ok(1.0));
    let v = Vector::<f32x4>::from_scalars(&[-1.0, -2.0, -3.0]);
    assert_eq!(v.max(), Ok(-1.0));
}

#[test]
fn slicing_does_not_clamp() {
    let v = Vector::<f64x2>::from_scalars(&[10.0, 20.0, 30.0, 40.0]);
    assert_eq!(v.subvector(1, Some(3)).unwrap().to_vec(), [20.0, 30.0]);
    assert_eq!(
        v.subvector(0, Some(10)),
        Err(Error::InvalidRange {
            start: 0,
            end: 10,
            len: 4
        })
    );
}

#[test]
fn normalize_and_rescale() {
    let unit = Vector::<f64x2>::from_scalars(&[3.0, 4.0])
        .normalize(Norm::Euclidean)
        .unwrap();
    assert_relative_eq!(unit[0], 0.6);
    assert_relative_eq!(unit[1], 0.8);

    let rescaled = Vector::<f32x4>::from_scalars(&[2.0, 4.0, 6.0]).rescale().unwrap();
    assert_eq!(rescaled.to_vec(), [0.0, 0.5, 1.0]);
}

#[test]
fn vector_times_identity() {
    let identity = DenseMatrix::<f64x2>::from_flat(2, 2, &[1.0, 0.0, 0.0, 1.0]).unwrap();
    let v = Vector::<f64x2>::ones(2);
    assert_eq!(v.mul_matrix(&identity).unwrap().to_vec(), [1.0, 1.0]);
}

#[test]
fn empty_vector() {
    let v = Vector::<f32x4>::empty();
    assert_eq!(v.len(), 0);
    assert_eq!(v.sum(), 0.0);
    assert_eq!(v.mean(), Err(Error::EmptyVector));
    assert_eq!(v.max(), Err(Error::EmptyVector));
}

#[test]
fn memoized_results_are_stable() {
    let v = Vector::<f64x2>::random_seeded(33, -10.0..10.0, 1234).unwrap();
    let norm = v.norm(Norm::Euclidean);
    assert_eq!(norm.to_bits(), v.norm(Norm::Euclidean).to_bits());
    let clone = v.clone();
    assert_eq!(norm.to_bits(), clone.norm(Norm::Euclidean).to_bits());
    assert_eq!(v.hash_code(), clone.hash_code());
}

#[test]
fn lane_construction_is_zero_copy() {
    let lanes: Arc<[f32x4]> = vec![
        f32x4::from_array([1.0, 2.0, 3.0, 4.0]),
        f32x4::from_array([5.0, 0.0, 0.0, 0.0]),
    ]
    .into();
    let v = Vector::<f32x4>::from_lanes(lanes.clone(), 5).unwrap();
    assert!(Arc::ptr_eq(&lanes, &v.buffer().shared_lanes()));
    assert_eq!(v.to_vec(), [1.0, 2.0, 3.0, 4.0, 5.0]);
}

#[test]
fn vectors_are_shareable_across_threads() {
    let v = Vector::<f32x4>::from_scalars(&[4.0, -1.0, 2.0]);
    let handles = (0..4)
        .map(|_| {
            let v = v.clone();
            std::thread::spawn(move || (v.max().unwrap(), v.norm(Norm::Manhattan)))
        })
        .collect::<Vec<_>>();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), (4.0, 7.0));
    }
}

proptest! {
    #[test]
    fn add_sub_round_trip_and_commute((a, b) in any_pair(21)) {
        let (a, b) = (Vector::<f64x2>::from(a), Vector::<f64x2>::from(b));
        let back = a.add(&b).unwrap().sub(&b).unwrap();
        for (x, y) in back.iter().zip(a.iter()) {
            assert_relative_eq!(x, y, epsilon = 1e-6);
        }
        prop_assert_eq!(a.add(&b).unwrap(), b.add(&a).unwrap());
    }

    #[test]
    fn scaling_round_trips(a in any_scalars(21), s in 1.0e-3f64..1.0e3) {
        let a = Vector::<f64x2>::from(a);
        let back = a.mul(s).unwrap().div(s).unwrap();
        for (x, y) in back.iter().zip(a.iter()) {
            assert_relative_eq!(x, y, max_relative = 1e-12);
        }
    }

    #[test]
    fn sums_and_norms(n in 0usize..64, a in any_scalars(21)) {
        prop_assert_eq!(Vector::<f32x4>::ones(n).sum(), n as f32);
        prop_assert_eq!(Vector::<f64x2>::zeros(n).norm(Norm::Euclidean), 0.0);
        let a = Vector::<f64x2>::from(a);
        prop_assert_eq!(a.norm(Norm::Manhattan), a.abs().sum());
    }

    #[test]
    fn extrema_bound_scalars(a in any_scalars(21)) {
        let a = Vector::<f32x4>::from_iter(a.into_iter().map(|x| x as f32));
        if let (Ok(max), Ok(min)) = (a.max(), a.min()) {
            prop_assert!(a.iter().all(|x| min <= x && x <= max));
        } else {
            prop_assert!(a.is_empty());
        }
    }

    #[test]
    fn dot_is_sum_of_products((a, b) in any_pair(21)) {
        let (a, b) = (Vector::<f64x2>::from(a), Vector::<f64x2>::from(b));
        prop_assert_eq!(a.dot(&b).unwrap(), a.mul(&b).unwrap().sum());
    }

    #[test]
    fn equal_vectors_hash_alike(a in any_scalars(21)) {
        let v = Vector::<f64x2>::from_scalars(&a);
        let w = Vector::<f64x2>::from_iter(a.iter().copied());
        prop_assert_eq!(&v, &w);
        prop_assert_eq!(v.hash_code(), w.hash_code());
    }
}

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{AnnexError, Result};
use crate::util::cancel::CancellationToken;
use crate::vector::core::distance::DistanceMetric;
use crate::vector::core::point::Point;
use crate::vector::core::vector::Vector;
use crate::vector::index::config::HnswConfig;
use crate::vector::index::hnsw::HnswIndex;

fn random_points(count: usize, dim: usize, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    Point::from_pairs((0..count).map(|i| {
        let data: Vec<f32> = (0..dim).map(|_| rng.random::<f32>()).collect();
        (format!("doc_{i}"), Vector::new(data))
    }))
}

fn brute_force(points: &[Point], query: &[f32], k: usize) -> Vec<usize> {
    let metric = DistanceMetric::SquaredEuclidean;
    let mut scored: Vec<(f32, usize)> = points
        .iter()
        .map(|p| (metric.distance_unchecked(query, &p.vector.data), p.handle))
        .collect();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    scored.into_iter().take(k).map(|(_, handle)| handle).collect()
}

#[test]
fn test_recall_at_default_parameters() -> Result<()> {
    let points = random_points(2000, 16, 1);
    let queries = random_points(50, 16, 2);
    let k = 10;

    let index = HnswIndex::build(points.clone(), HnswConfig::default())?;
    index.validate()?;

    let mut hits = 0;
    for query in &queries {
        let truth = brute_force(&points, &query.vector.data, k);
        let found = index.search(&query.vector.data, k)?.handles();
        hits += found.iter().filter(|h| truth.contains(h)).count();
    }

    let recall = hits as f64 / (queries.len() * k) as f64;
    assert!(recall >= 0.9, "recall {recall} below 0.9");
    Ok(())
}

#[test]
fn test_identical_input_gives_identical_graph_and_results() -> Result<()> {
    let points = random_points(300, 8, 3);
    let config = HnswConfig::default().with_seed(99);

    let first = HnswIndex::build(points.clone(), config.clone())?;
    let second = HnswIndex::build(points.clone(), config)?;

    assert_eq!(first.entry_point(), second.entry_point());
    assert_eq!(first.max_level(), second.max_level());
    for handle in 0..first.len() {
        for layer in 0..=first.max_level() {
            assert_eq!(first.neighbors(handle, layer), second.neighbors(handle, layer));
        }
    }

    for query in random_points(10, 8, 4) {
        assert_eq!(
            first.search(&query.vector.data, 5)?,
            second.search(&query.vector.data, 5)?
        );
    }
    Ok(())
}

#[test]
fn test_distances_are_non_decreasing() -> Result<()> {
    let index = HnswIndex::build(random_points(500, 4, 5), HnswConfig::default())?;
    for query in random_points(20, 4, 6) {
        let result = index.search(&query.vector.data, 25)?;
        assert!(
            result
                .neighbors
                .windows(2)
                .all(|w| w[0].distance <= w[1].distance)
        );
    }
    Ok(())
}

#[test]
fn test_result_cardinality() -> Result<()> {
    let small = HnswIndex::build(random_points(3, 4, 7), HnswConfig::default())?;
    assert_eq!(small.search(&[0.5; 4], 5)?.len(), 3);

    let large = HnswIndex::build(random_points(200, 4, 8), HnswConfig::default())?;
    assert_eq!(large.search(&[0.5; 4], 5)?.len(), 5);
    assert_eq!(large.search(&[0.5; 4], 80)?.len(), 80);
    assert!(large.search(&[0.5; 4], 0)?.is_empty());
    Ok(())
}

#[test]
fn test_query_dimension_mismatch() -> Result<()> {
    let index = HnswIndex::build(random_points(10, 4, 9), HnswConfig::default())?;
    let err = index.search(&[0.0, 0.0, 0.0], 1).unwrap_err();
    assert!(matches!(
        err,
        AnnexError::DimensionMismatch {
            expected: 4,
            actual: 3
        }
    ));
    Ok(())
}

#[test]
fn test_non_finite_query_rejected() -> Result<()> {
    let index = HnswIndex::build(random_points(10, 2, 18), HnswConfig::default())?;
    assert!(matches!(
        index.search(&[f32::NAN, 0.0], 1),
        Err(AnnexError::InvalidArgument(_))
    ));
    Ok(())
}

#[test]
fn test_self_query_returns_point_first() -> Result<()> {
    let points = random_points(400, 6, 10);
    let index = HnswIndex::build(points.clone(), HnswConfig::default())?;

    for point in points.iter().step_by(37) {
        let result = index.search(&point.vector.data, 3)?;
        let best = result.best().expect("non-empty result");
        assert_eq!(best.handle, point.handle);
        assert_eq!(best.distance, 0.0);
    }
    Ok(())
}

#[test]
fn test_batch_search_preserves_order() -> Result<()> {
    let index = HnswIndex::build(random_points(300, 5, 11), HnswConfig::default())?;
    let queries: Vec<Vec<f32>> = random_points(12, 5, 12)
        .into_iter()
        .map(|p| p.vector.data)
        .collect();

    let forward = index.batch_search(&queries, 4);
    let reversed_queries: Vec<Vec<f32>> = queries.iter().rev().cloned().collect();
    let mut backward = index.batch_search(&reversed_queries, 4);
    backward.reverse();

    for ((query, a), b) in queries.iter().zip(&forward).zip(&backward) {
        let single = index.search(query, 4)?;
        assert_eq!(a.as_ref().unwrap(), &single);
        assert_eq!(b.as_ref().unwrap(), &single);
    }
    Ok(())
}

#[test]
fn test_batch_search_isolates_failures() -> Result<()> {
    let index = HnswIndex::build(random_points(50, 3, 13), HnswConfig::default())?;
    let queries = vec![vec![0.1, 0.2, 0.3], vec![0.1, 0.2], vec![0.9, 0.9, 0.9]];

    let results = index.batch_search(&queries, 2);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(AnnexError::DimensionMismatch { .. })));
    assert_eq!(results[2].as_ref().unwrap().len(), 2);
    Ok(())
}

#[test]
fn test_larger_ef_does_not_reduce_recall() -> Result<()> {
    let points = random_points(1000, 12, 14);
    let index = HnswIndex::build(points.clone(), HnswConfig::default().with_m(8))?;
    let k = 10;

    let mut narrow_hits = 0;
    let mut wide_hits = 0;
    for query in random_points(30, 12, 15) {
        let truth = brute_force(&points, &query.vector.data, k);
        let narrow = index.search_with_ef(&query.vector.data, k, k)?.handles();
        let wide = index.search_with_ef(&query.vector.data, k, 200)?.handles();
        narrow_hits += narrow.iter().filter(|h| truth.contains(h)).count();
        wide_hits += wide.iter().filter(|h| truth.contains(h)).count();
    }
    assert!(wide_hits >= narrow_hits);
    Ok(())
}

#[test]
fn test_euclidean_metric_reports_plain_distance() -> Result<()> {
    let points = Point::from_pairs(vec![
        ("origin", Vector::new(vec![0.0, 0.0])),
        ("far", Vector::new(vec![3.0, 4.0])),
    ]);
    let config = HnswConfig::default().with_distance_metric(DistanceMetric::Euclidean);
    let index = HnswIndex::build(points, config)?;

    let result = index.search(&[0.0, 0.0], 2)?;
    assert_eq!(result.handles(), vec![0, 1]);
    assert_eq!(result.neighbors[1].distance, 5.0);
    Ok(())
}

#[test]
fn test_cancelled_searcher() -> Result<()> {
    let index = HnswIndex::build(random_points(20, 2, 16), HnswConfig::default())?;
    let token = CancellationToken::new();
    let searcher = index.searcher().with_cancellation(token.clone());
    assert!(searcher.search(&[0.5, 0.5], 3).is_ok());

    token.cancel();
    assert!(matches!(
        searcher.search(&[0.5, 0.5], 3),
        Err(AnnexError::OperationCancelled(_))
    ));
    Ok(())
}

#[test]
fn test_stats() -> Result<()> {
    let index = HnswIndex::build(random_points(100, 4, 17), HnswConfig::default())?;
    let stats = index.stats();

    assert_eq!(stats.total_points, 100);
    assert_eq!(stats.dimension, 4);
    assert_eq!(stats.layer_sizes[0], 100);
    assert_eq!(stats.levels, stats.layer_sizes.len());
    assert!(stats.layer_sizes.windows(2).all(|w| w[0] >= w[1]));
    assert!(stats.avg_degree_layer0 > 0.0);
    assert!(stats.memory_usage_bytes > 0);
    Ok(())
}

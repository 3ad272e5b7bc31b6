use packed_hll::{HyperLogLog, Precision};

fn main() {
    let precision = Precision::new(12);

    let mut estimator1 = HyperLogLog::new(precision);
    for i in 0..10 {
        estimator1.insert(&i);
    }
    println!("estimator1 estimate = {}", estimator1.estimate());

    let mut estimator2 = HyperLogLog::new(precision);
    for i in 5..15 {
        estimator2.insert(&i);
    }
    println!("estimator2 estimate = {}", estimator2.estimate());

    estimator1.merge(&estimator2);
    println!(
        "merged estimate = {:.2} ({:?})",
        estimator1.estimated_unique_count(),
        estimator1
    );
}

use std::collections::HashMap;

use swipedeck::catalog::{normalize_catalog, Candidate, CandidateId, CandidateKind, Level};
use swipedeck::config::{FilterConfig, KeywordMode};
use swipedeck::decisions::Direction;
use swipedeck::error::EngineError;
use swipedeck::kernel::filter::{
    DecisionIndex, FilterCriteria, FilterPipeline, LevelFilter, PriceBucket, RawFilter,
};

fn priced(id: &str, price: f64) -> Candidate {
    Candidate::new(id, CandidateKind::Teacher, price, Level::Beginner)
}

fn studio() -> Vec<Candidate> {
    vec![
        Candidate::new("piano-1", CandidateKind::Teacher, 400.0, Level::Beginner)
            .with_text("Classical Piano for kids")
            .with_tags(["piano"]),
        Candidate::new("guitar-1", CandidateKind::Teacher, 800.0, Level::Intermediate)
            .with_text("Jazz guitar")
            .with_tags(["Guitar", "jazz"]),
        Candidate::new("room-1", CandidateKind::Classroom, 1600.0, Level::Advanced)
            .with_text("Soundproof room with grand piano")
            .with_tags(["room"]),
        Candidate::new("voice-1", CandidateKind::Teacher, 1500.0, Level::Intermediate)
            .with_text("Jazz voice coaching"),
    ]
}

fn ids(pipeline: &FilterPipeline, all: &[Candidate], decided: &DecisionIndex, criteria: &FilterCriteria) -> Vec<String> {
    pipeline
        .compute_queue(all, decided, criteria)
        .ids()
        .into_iter()
        .map(|id| id.0)
        .collect()
}

#[test]
fn test_low_bucket_boundary() {
    let all: Vec<Candidate> = [499.0, 500.0, 501.0, 1500.0, 1501.0]
        .iter()
        .map(|p| priced(&format!("p{}", p), *p))
        .collect();
    let pipeline = FilterPipeline::default();
    let criteria = FilterCriteria::any().with_price(PriceBucket::Low);

    let queue = pipeline.compute_queue(&all, &HashMap::new(), &criteria);
    let prices: Vec<f64> = queue.iter().map(|c| c.price).collect();

    assert_eq!(prices, vec![499.0, 500.0], "Low bucket is price <= 500");
}

#[test]
fn test_buckets_never_double_count() {
    let prices = [0.0, 499.0, 500.0, 500.01, 1500.0, 1500.01, 99_999.0];
    for price in prices {
        let hits = [PriceBucket::Low, PriceBucket::Medium, PriceBucket::High]
            .iter()
            .filter(|b| b.contains(price))
            .count();
        assert_eq!(hits, 1, "price {} must land in exactly one bucket", price);
        assert!(PriceBucket::Any.contains(price));
    }

    assert!(PriceBucket::Medium.contains(1500.0));
    assert!(!PriceBucket::Medium.contains(500.0));
    assert!(PriceBucket::High.contains(1500.5));
}

#[test]
fn test_decided_candidates_never_in_queue() {
    let all = studio();
    let pipeline = FilterPipeline::default();
    let mut decided: DecisionIndex = HashMap::new();
    decided.insert(CandidateId::from("piano-1"), Direction::Reject);
    decided.insert(CandidateId::from("room-1"), Direction::Accept);

    let criteria_set = vec![
        FilterCriteria::any(),
        FilterCriteria::any().with_keywords(["piano"]),
        FilterCriteria::any().with_price(PriceBucket::Low),
        FilterCriteria::any().with_price(PriceBucket::High),
        FilterCriteria::any().with_level(LevelFilter::Only(Level::Advanced)),
    ];

    for criteria in &criteria_set {
        let queue = ids(&pipeline, &all, &decided, criteria);
        assert!(!queue.contains(&"piano-1".to_string()), "rejected reappeared under {:?}", criteria);
        assert!(!queue.contains(&"room-1".to_string()), "accepted reappeared under {:?}", criteria);
    }
}

#[test]
fn test_compute_queue_is_pure() {
    let all = studio();
    let pipeline = FilterPipeline::new(KeywordMode::Any);
    let criteria = FilterCriteria::any().with_keywords(["jazz", "piano"]);
    let decided: DecisionIndex = HashMap::new();

    let first = pipeline.compute_queue(&all, &decided, &criteria);
    let second = pipeline.compute_queue(&all, &decided, &criteria);

    assert_eq!(first, second);
    assert_eq!(first.ids(), second.ids());
}

#[test]
fn test_catalog_order_is_preserved() {
    let all = studio();
    let queue = ids(&FilterPipeline::default(), &all, &HashMap::new(), &FilterCriteria::any());
    assert_eq!(queue, vec!["piano-1", "guitar-1", "room-1", "voice-1"]);
}

#[test]
fn test_keywords_or_by_default() {
    let all = studio();
    let criteria = FilterCriteria::any().with_keywords(["jazz", "piano"]);

    let queue = ids(&FilterPipeline::default(), &all, &HashMap::new(), &criteria);

    // piano-1 and room-1 mention piano; guitar-1 and voice-1 mention jazz.
    assert_eq!(queue, vec!["piano-1", "guitar-1", "room-1", "voice-1"]);
}

#[test]
fn test_keywords_and_mode() {
    let all = studio();
    let criteria = FilterCriteria::any().with_keywords(["jazz", "guitar"]);

    let queue = ids(&FilterPipeline::new(KeywordMode::All), &all, &HashMap::new(), &criteria);

    assert_eq!(queue, vec!["guitar-1"]);
}

#[test]
fn test_keyword_match_is_case_insensitive_on_text_and_tags() {
    let all = studio();
    let pipeline = FilterPipeline::default();

    let upper = FilterCriteria::any().with_keywords(["  GUITAR "]);
    assert_eq!(ids(&pipeline, &all, &HashMap::new(), &upper), vec!["guitar-1"]);

    let partial = FilterCriteria::any().with_keywords(["sound"]);
    assert_eq!(ids(&pipeline, &all, &HashMap::new(), &partial), vec!["room-1"]);
}

#[test]
fn test_combined_criteria() {
    let all = studio();
    let criteria = FilterCriteria::any()
        .with_keywords(["jazz"])
        .with_price(PriceBucket::Medium)
        .with_level(LevelFilter::Only(Level::Intermediate));

    let queue = ids(&FilterPipeline::default(), &all, &HashMap::new(), &criteria);

    assert_eq!(queue, vec!["guitar-1", "voice-1"]);
}

#[test]
fn test_empty_result_is_valid() {
    let all = studio();
    let criteria = FilterCriteria::any().with_keywords(["theremin"]);

    let queue = FilterPipeline::default().compute_queue(&all, &HashMap::new(), &criteria);

    assert!(queue.is_empty());
    assert_eq!(queue.first(), None);
}

#[test]
fn test_raw_filter_parsing() {
    let raw = RawFilter {
        keywords: vec!["Piano".into(), "   ".into(), "jazz".into()],
        price_bucket: "MEDIUM".into(),
        level: "Advanced".into(),
    };

    let criteria = FilterCriteria::from_raw(&raw, &FilterConfig::default()).unwrap();

    assert_eq!(criteria.keywords.len(), 2, "blank keyword dropped");
    assert!(criteria.keywords.contains("piano"));
    assert_eq!(criteria.price_bucket, PriceBucket::Medium);
    assert_eq!(criteria.level, LevelFilter::Only(Level::Advanced));

    let defaults = FilterCriteria::from_raw(&RawFilter::default(), &FilterConfig::default()).unwrap();
    assert_eq!(defaults, FilterCriteria::any());
}

#[test]
fn test_raw_filter_rejects_unknown_values() {
    let config = FilterConfig::default();

    let bad_bucket = RawFilter { price_bucket: "cheap".into(), ..RawFilter::default() };
    assert!(matches!(
        FilterCriteria::from_raw(&bad_bucket, &config),
        Err(EngineError::Validation(_))
    ));

    let bad_level = RawFilter { level: "expert".into(), ..RawFilter::default() };
    assert!(matches!(
        FilterCriteria::from_raw(&bad_level, &config),
        Err(EngineError::Validation(_))
    ));
}

#[test]
fn test_vocabulary_restricts_keywords() {
    let config = FilterConfig {
        keyword_mode: KeywordMode::Any,
        vocabulary: vec!["piano".into(), "guitar".into()],
    };

    let known = RawFilter { keywords: vec!["PIANO".into()], ..RawFilter::default() };
    assert!(FilterCriteria::from_raw(&known, &config).is_ok());

    let unknown = RawFilter { keywords: vec!["piano".into(), "kazoo".into()], ..RawFilter::default() };
    assert_eq!(
        FilterCriteria::from_raw(&unknown, &config),
        Err(EngineError::Validation("unknown keyword 'kazoo'".into()))
    );
}

#[test]
fn test_normalize_catalog_drops_bad_records() {
    let raw = vec![
        priced("a", 100.0),
        priced("", 100.0),
        priced("b", f64::NAN),
        priced("c", -1.0),
        priced("a", 999.0),
        priced("d", 0.0),
    ];

    let kept = normalize_catalog(raw);
    let kept_ids: Vec<&str> = kept.iter().map(|c| c.id.as_str()).collect();

    assert_eq!(kept_ids, vec!["a", "d"]);
    assert_eq!(kept[0].price, 100.0, "first occurrence wins");
}

#[test]
fn test_level_parse_is_case_insensitive() {
    assert_eq!(Level::parse("BEGINNER"), Some(Level::Beginner));
    assert_eq!(Level::parse(" intermediate "), Some(Level::Intermediate));
    assert_eq!(Level::parse("pro"), None);
    assert_eq!(LevelFilter::parse("Any"), Some(LevelFilter::Any));
}

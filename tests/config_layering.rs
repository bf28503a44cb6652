use std::collections::HashMap;
use std::io::Write;

use guest_signal::FeedbackAnalyzer;
use guest_signal::config::Config;

#[test]
fn toml_file_then_env_overrides() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[analysis]
alert_threshold_sentiment = -0.6
flagged_keywords = ["Leak", "cockroach"]
max_topics = 80

[analytics]
window_days = 7

[models]
sentiment_backend = "LEXICON"
phrase_backend = "none"
"#
    )
    .unwrap();

    let content = std::fs::read_to_string(file.path()).unwrap();
    let mut config = Config::from_toml_str(&content).unwrap();
    let env = HashMap::from([("GUEST_SIGNAL_WINDOW_DAYS", "14")]);
    config.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));
    config.validate().unwrap();

    assert_eq!(config.analysis.alert_threshold_sentiment, -0.6);
    assert_eq!(config.analysis.flagged_keywords, vec!["leak", "cockroach"]);
    assert_eq!(config.analysis.max_topics, 50);
    assert_eq!(config.analytics.window_days, 14);
    assert_eq!(config.models.sentiment_backend, "lexicon");
}

#[tokio::test]
async fn rule_based_models_initialize_without_files() {
    let mut config = Config::default();
    config.models = guest_signal::config::ModelConfig::rule_based();
    let analyzer = FeedbackAnalyzer::initialize(&config).await;
    let summary = analyzer.backend_summary();
    assert_eq!(summary.sentiment, "lexicon");
    assert!(summary.linguistic);
    assert!(!summary.phrase_ranking);
    assert!(
        analyzer
            .policy()
            .keywords()
            .contains(&"terrible".to_string())
    );
}
